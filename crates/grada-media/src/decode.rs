use std::future::Future;
use std::pin::Pin;

use grada_core::frame::Frame;
use tracing::debug;

use crate::error::MediaError;

pub type DecodeFuture = Pin<Box<dyn Future<Output = Result<Frame, MediaError>> + Send>>;

/// Asynchronous image decoding. The returned future owns everything it
/// needs so it can be awaited without borrowing the adapter.
pub trait ImageDecoder {
    fn decode(&self, uri: String) -> DecodeFuture;
}

/// Reads local files with `tokio::fs` and decodes on the blocking pool.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileImageDecoder;

impl ImageDecoder for FileImageDecoder {
    fn decode(&self, uri: String) -> DecodeFuture {
        Box::pin(async move {
            let bytes = tokio::fs::read(&uri).await.map_err(|source| MediaError::Io {
                uri: uri.clone(),
                source,
            })?;
            let label = uri.clone();
            tokio::task::spawn_blocking(move || decode_bytes(&uri, &bytes))
                .await
                .map_err(|e| MediaError::decode(&label, e))?
        })
    }
}

/// Decode an in-memory encoded image (JPEG, PNG, TIFF) to a float frame.
pub fn decode_bytes(uri: &str, bytes: &[u8]) -> Result<Frame, MediaError> {
    let img = image::load_from_memory(bytes).map_err(|e| MediaError::decode(uri, e))?;
    debug!(uri, width = img.width(), height = img.height(), "decoded image");
    Ok(Frame::from_dynamic_image(&img))
}

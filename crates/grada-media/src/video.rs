use std::future::Future;
use std::pin::Pin;

use grada_core::frame::Frame;

use crate::error::MediaError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
}

/// Result of opening a video: a live playback handle plus its dimensions.
#[derive(Debug)]
pub struct VideoOpened<H> {
    pub handle: H,
    pub metadata: VideoMetadata,
    pub first_frame: Option<Frame>,
}

pub type OpenFuture<H> = Pin<Box<dyn Future<Output = Result<VideoOpened<H>, MediaError>> + Send>>;

/// Playback seam. A handle stands for an open decoder or media element and
/// must be passed back to [`release`](Self::release) exactly once.
pub trait VideoBackend {
    type Handle: Send + 'static;

    /// Open the source and wait for its metadata.
    fn open(&self, uri: String) -> OpenFuture<Self::Handle>;

    /// Latest decoded frame, or `None` when playback has not advanced.
    fn current_frame(&self, handle: &mut Self::Handle) -> Result<Option<Frame>, MediaError>;

    fn release(&self, handle: Self::Handle);
}

/// Backend for builds without a video decoder: every open fails, so video
/// sources resolve to the placeholder.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnsupportedVideo;

impl VideoBackend for UnsupportedVideo {
    type Handle = ();

    fn open(&self, uri: String) -> OpenFuture<()> {
        Box::pin(async move { Err(MediaError::Unsupported(format!("video playback: {uri}"))) })
    }

    fn current_frame(&self, _handle: &mut ()) -> Result<Option<Frame>, MediaError> {
        Ok(None)
    }

    fn release(&self, _handle: ()) {}
}

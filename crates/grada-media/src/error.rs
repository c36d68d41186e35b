use std::io;

use thiserror::Error;

/// Failure of a media load. The adapter never surfaces these as hard
/// errors to the grading pipeline; a failed load leaves the placeholder
/// bound and the adapter in [`LoadState::Failed`](crate::LoadState::Failed).
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("failed to decode {uri}: {message}")]
    Decode { uri: String, message: String },

    #[error("failed to read {uri}")]
    Io {
        uri: String,
        #[source]
        source: io::Error,
    },

    #[error("video metadata unavailable for {uri}: {message}")]
    Metadata { uri: String, message: String },

    #[error("video seek failed for {uri}: {message}")]
    Seek { uri: String, message: String },

    #[error("texture upload failed: {0}")]
    Upload(String),

    #[error("unsupported media source: {0}")]
    Unsupported(String),

    #[error("frame source adapter has been disposed")]
    Disposed,
}

impl MediaError {
    pub fn decode(uri: &str, message: impl ToString) -> Self {
        Self::Decode {
            uri: uri.to_string(),
            message: message.to_string(),
        }
    }
}

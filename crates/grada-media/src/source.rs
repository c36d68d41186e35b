use std::fmt;
use std::path::Path;

use grada_core::resolve::MediaKind;
use serde::{Deserialize, Serialize};

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "m4v", "mov", "webm", "mkv", "avi"];

/// A decodable media reference: a file path or URL plus what kind of media it is.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "uri", rename_all = "lowercase")]
pub enum MediaSource {
    Image(String),
    Video(String),
}

impl MediaSource {
    pub fn image(uri: impl Into<String>) -> Self {
        Self::Image(uri.into())
    }

    pub fn video(uri: impl Into<String>) -> Self {
        Self::Video(uri.into())
    }

    /// Classify a local path by extension; anything not a known video
    /// container is treated as an image.
    pub fn from_path(path: &Path) -> Self {
        let uri = path.to_string_lossy().into_owned();
        let is_video = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                VIDEO_EXTENSIONS
                    .iter()
                    .any(|v| v.eq_ignore_ascii_case(ext))
            });
        if is_video {
            Self::Video(uri)
        } else {
            Self::Image(uri)
        }
    }

    pub fn uri(&self) -> &str {
        match self {
            Self::Image(uri) | Self::Video(uri) => uri,
        }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            Self::Image(_) => MediaKind::Image,
            Self::Video(_) => MediaKind::Video,
        }
    }

    pub fn id(&self) -> MediaId {
        MediaId::of(self)
    }
}

/// Stable identity of a media source, derived from its kind and URI.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MediaId(blake3::Hash);

impl MediaId {
    fn of(source: &MediaSource) -> Self {
        let tag: &[u8] = match source {
            MediaSource::Image(_) => b"image\0",
            MediaSource::Video(_) => b"video\0",
        };
        let mut hasher = blake3::Hasher::new();
        hasher.update(tag);
        hasher.update(source.uri().as_bytes());
        Self(hasher.finalize())
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form is enough for logs.
        let hex = self.0.to_hex();
        f.write_str(&hex[..12])
    }
}

impl fmt::Debug for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MediaId({self})")
    }
}

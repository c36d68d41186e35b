//! Frame source adapter: turns an image or video reference into the texture
//! the grading program samples, with placeholder, replacement and teardown
//! rules plus the "processing" signal UI spinners observe.

pub mod adapter;
pub mod config;
pub mod decode;
pub mod error;
pub mod factory;
pub mod processing;
pub mod slot;
pub mod source;
pub mod video;

pub use adapter::{FrameSourceAdapter, LoadOutcome, LoadState, Loaded, PendingLoad};
pub use config::AdapterConfig;
pub use decode::{DecodeFuture, FileImageDecoder, ImageDecoder};
pub use error::MediaError;
pub use factory::{GpuTextureFactory, TextureFactory};
pub use processing::{ProcessingSignal, ProcessingTracker};
pub use slot::TextureSlot;
pub use source::{MediaId, MediaSource};
pub use video::{OpenFuture, UnsupportedVideo, VideoBackend, VideoMetadata, VideoOpened};

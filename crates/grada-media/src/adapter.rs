use std::fmt;
use std::future::Future;
use std::pin::Pin;

use grada_core::frame::Frame;
use tracing::{debug, info, warn};

use crate::config::AdapterConfig;
use crate::decode::ImageDecoder;
use crate::error::MediaError;
use crate::factory::TextureFactory;
use crate::processing::{ProcessingSignal, ProcessingTracker};
use crate::slot::TextureSlot;
use crate::source::{MediaId, MediaSource};
use crate::video::{VideoBackend, VideoOpened};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing has been loaded yet; no texture is bound.
    Empty,
    /// Placeholder bound, decode or metadata pending.
    Loading,
    Ready,
    /// The last load failed; the placeholder stays bound.
    Failed,
    Disposed,
}

/// Decoded payload of a finished load, not yet on the GPU.
pub enum Loaded<H> {
    Image(Frame),
    Video(VideoOpened<H>),
}

type LoadFuture<H> = Pin<Box<dyn Future<Output = Result<Loaded<H>, MediaError>> + Send>>;

/// An in-flight load detached from the adapter. Await [`resolve`](Self::resolve)
/// anywhere, then hand the outcome back to [`FrameSourceAdapter::complete`].
#[must_use = "a pending load does nothing until resolved and completed"]
pub struct PendingLoad<H> {
    generation: u64,
    source: MediaSource,
    future: LoadFuture<H>,
}

impl<H> PendingLoad<H> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn source(&self) -> &MediaSource {
        &self.source
    }

    pub async fn resolve(self) -> LoadOutcome<H> {
        let result = self.future.await;
        LoadOutcome {
            generation: self.generation,
            source: self.source,
            result,
        }
    }
}

impl<H> fmt::Debug for PendingLoad<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingLoad")
            .field("generation", &self.generation)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

pub struct LoadOutcome<H> {
    pub generation: u64,
    pub source: MediaSource,
    pub result: Result<Loaded<H>, MediaError>,
}

/// Supplies the frame the grading program samples for one media slot.
///
/// Exactly one texture is live per adapter. [`replace`](Self::replace)
/// binds a 1x1 placeholder before the previous texture and video handle are
/// released, so a render never sees an unbound input. Loads are tagged with
/// a generation; an outcome from a superseded load is released instead of
/// installed.
pub struct FrameSourceAdapter<F, D, V>
where
    F: TextureFactory,
    D: ImageDecoder,
    V: VideoBackend,
{
    factory: F,
    decoder: D,
    video: V,
    slot: TextureSlot<F::Texture>,
    video_handle: Option<V::Handle>,
    source: Option<MediaSource>,
    generation: u64,
    state: LoadState,
    last_error: Option<MediaError>,
    processing: ProcessingTracker,
}

impl<F, D, V> FrameSourceAdapter<F, D, V>
where
    F: TextureFactory,
    D: ImageDecoder,
    V: VideoBackend,
{
    pub fn new(
        factory: F,
        decoder: D,
        video: V,
        signal: ProcessingSignal,
        config: &AdapterConfig,
    ) -> Self {
        Self {
            factory,
            decoder,
            video,
            slot: TextureSlot::new(),
            video_handle: None,
            source: None,
            generation: 0,
            state: LoadState::Empty,
            last_error: None,
            processing: ProcessingTracker::new(signal, config.min_processing()),
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn source(&self) -> Option<&MediaSource> {
        self.source.as_ref()
    }

    pub fn media_id(&self) -> Option<MediaId> {
        self.source.as_ref().map(MediaSource::id)
    }

    /// Texture to bind for the next render: the real frame, the placeholder
    /// while loading or after a failure, or `None` before the first load.
    pub fn texture(&self) -> Option<&F::Texture> {
        self.slot.current()
    }

    pub fn last_error(&self) -> Option<&MediaError> {
        self.last_error.as_ref()
    }

    pub fn processing(&self) -> &ProcessingSignal {
        self.processing.signal()
    }

    pub fn has_video(&self) -> bool {
        self.video_handle.is_some()
    }

    /// Switch to a new source. The placeholder is bound and the previous
    /// texture and video handle are released before this returns.
    pub fn replace(&mut self, source: MediaSource) -> Result<PendingLoad<V::Handle>, MediaError> {
        if self.state == LoadState::Disposed {
            return Err(MediaError::Disposed);
        }

        let placeholder = self.factory.create(&Frame::placeholder(), "placeholder")?;

        self.generation += 1;
        if let Some(handle) = self.video_handle.take() {
            self.video.release(handle);
        }
        if let Some(old) = self.slot.install(placeholder) {
            self.factory.release(old);
        }

        info!(
            media = %source.id(),
            uri = source.uri(),
            generation = self.generation,
            "loading media"
        );
        self.state = LoadState::Loading;
        self.last_error = None;
        self.source = Some(source.clone());
        self.processing.begin();

        let future: LoadFuture<V::Handle> = match &source {
            MediaSource::Image(uri) => {
                let decode = self.decoder.decode(uri.clone());
                Box::pin(async move { decode.await.map(Loaded::Image) })
            }
            MediaSource::Video(uri) => {
                let open = self.video.open(uri.clone());
                Box::pin(async move { open.await.map(Loaded::Video) })
            }
        };

        Ok(PendingLoad {
            generation: self.generation,
            source,
            future,
        })
    }

    /// Apply a finished load. Returns `true` when the real texture was
    /// installed; stale or failed outcomes return `false`.
    pub fn complete(&mut self, outcome: LoadOutcome<V::Handle>) -> bool {
        if self.state == LoadState::Disposed || outcome.generation != self.generation {
            debug!(
                generation = outcome.generation,
                current = self.generation,
                uri = outcome.source.uri(),
                "discarding stale load"
            );
            if let Ok(Loaded::Video(opened)) = outcome.result {
                self.video.release(opened.handle);
            }
            return false;
        }

        let installed = match outcome.result {
            Ok(Loaded::Image(frame)) => self.install_frame(&frame),
            Ok(Loaded::Video(opened)) => {
                let VideoOpened {
                    handle,
                    metadata,
                    first_frame,
                } = opened;
                let frame = first_frame.unwrap_or_else(|| {
                    Frame::filled(metadata.width, metadata.height, [0.0, 0.0, 0.0, 1.0])
                });
                match self.install_frame(&frame) {
                    Ok(()) => {
                        self.video_handle = Some(handle);
                        Ok(())
                    }
                    Err(e) => {
                        self.video.release(handle);
                        Err(e)
                    }
                }
            }
            Err(e) => Err(e),
        };

        match installed {
            Ok(()) => {
                info!(uri = outcome.source.uri(), "media ready");
                self.state = LoadState::Ready;
                self.processing.finish();
                true
            }
            Err(e) => {
                warn!(uri = outcome.source.uri(), error = %e, "media load failed");
                self.state = LoadState::Failed;
                self.last_error = Some(e);
                self.processing.release_now();
                false
            }
        }
    }

    /// Replace, await and complete in one step.
    ///
    /// A rejected replace changes nothing: the previous source, texture and
    /// state stay live and the error is kept in [`last_error`](Self::last_error).
    pub async fn load(&mut self, source: MediaSource) -> LoadState {
        match self.replace(source) {
            Ok(pending) => {
                let outcome = pending.resolve().await;
                self.complete(outcome);
            }
            Err(e) => {
                warn!(error = %e, state = ?self.state, "media load rejected, keeping current source");
                if self.state != LoadState::Disposed {
                    self.last_error = Some(e);
                }
            }
        }
        self.state
    }

    fn install_frame(&mut self, frame: &Frame) -> Result<(), MediaError> {
        let label = match &self.source {
            Some(MediaSource::Video(_)) => "video_frame",
            _ => "image_frame",
        };
        let texture = self.factory.create(frame, label)?;
        if let Some(old) = self.slot.install(texture) {
            self.factory.release(old);
        }
        Ok(())
    }

    /// Pull the latest video frame into the bound texture. Call once per
    /// repaint; returns whether the texture changed.
    pub fn refresh_video_frame(&mut self) -> Result<bool, MediaError> {
        if self.state != LoadState::Ready {
            return Ok(false);
        }
        let Some(handle) = self.video_handle.as_mut() else {
            return Ok(false);
        };
        let Some(frame) = self.video.current_frame(handle)? else {
            return Ok(false);
        };

        let same_size = self
            .slot
            .current()
            .is_some_and(|t| self.factory.dimensions(t) == (frame.width, frame.height));
        if !same_size {
            self.install_frame(&frame)?;
        } else if let Some(texture) = self.slot.current() {
            self.factory.update(texture, &frame)?;
        }
        Ok(true)
    }

    /// Release the texture and video handle and drop the processing signal
    /// immediately. Further loads are rejected.
    pub fn dispose(&mut self) {
        if self.state == LoadState::Disposed {
            return;
        }
        self.generation += 1;
        if let Some(handle) = self.video_handle.take() {
            self.video.release(handle);
        }
        if let Some(texture) = self.slot.take() {
            self.factory.release(texture);
        }
        self.source = None;
        self.state = LoadState::Disposed;
        self.processing.release_now();
        debug!("frame source adapter disposed");
    }
}

impl<F, D, V> Drop for FrameSourceAdapter<F, D, V>
where
    F: TextureFactory,
    D: ImageDecoder,
    V: VideoBackend,
{
    fn drop(&mut self) {
        self.dispose();
    }
}

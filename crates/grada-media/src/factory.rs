use std::sync::Arc;

use grada_core::frame::Frame;
use grada_gpu::context::GpuContext;
use grada_gpu::texture::GpuTexture;
use tracing::debug;

use crate::error::MediaError;

/// Creates and releases the sampled textures the adapter binds.
pub trait TextureFactory {
    type Texture;

    fn create(&self, frame: &Frame, label: &str) -> Result<Self::Texture, MediaError>;

    /// Overwrite an existing texture of the same size with a new frame.
    fn update(&self, texture: &Self::Texture, frame: &Frame) -> Result<(), MediaError>;

    fn dimensions(&self, texture: &Self::Texture) -> (u32, u32);

    fn release(&self, texture: Self::Texture);
}

/// Uploads frames as RGBA8 wgpu textures.
#[derive(Clone)]
pub struct GpuTextureFactory {
    ctx: Arc<GpuContext>,
}

impl GpuTextureFactory {
    pub fn new(ctx: Arc<GpuContext>) -> Self {
        Self { ctx }
    }
}

impl TextureFactory for GpuTextureFactory {
    type Texture = GpuTexture;

    fn create(&self, frame: &Frame, label: &str) -> Result<GpuTexture, MediaError> {
        GpuTexture::from_frame(&self.ctx.device, &self.ctx.queue, frame, label)
            .map_err(|e| MediaError::Upload(format!("{e:#}")))
    }

    fn update(&self, texture: &GpuTexture, frame: &Frame) -> Result<(), MediaError> {
        texture
            .write_frame(&self.ctx.queue, frame)
            .map_err(|e| MediaError::Upload(format!("{e:#}")))
    }

    fn dimensions(&self, texture: &GpuTexture) -> (u32, u32) {
        (texture.width, texture.height)
    }

    fn release(&self, texture: GpuTexture) {
        debug!(width = texture.width, height = texture.height, "releasing frame texture");
        texture.destroy();
    }
}

use anyhow::Result;
use grada_core::curve::{CurveLut, LUT_SIZE};
use tracing::debug;

use crate::context::GpuContext;
use crate::texture::GpuTexture;

/// A compiled tone-curve table resident on the GPU as a 256x1 RGBA8 texture.
pub struct CurveLutTexture {
    texture: GpuTexture,
    revision: u64,
}

impl CurveLutTexture {
    pub fn upload(ctx: &GpuContext, lut: &CurveLut, revision: u64) -> Result<Self> {
        debug!(revision, "uploading curve LUT");
        let texture = GpuTexture::from_rgba8(
            &ctx.device,
            &ctx.queue,
            LUT_SIZE as u32,
            1,
            lut.as_bytes(),
            "curve_lut",
        )?;
        Ok(Self { texture, revision })
    }

    /// Revision of the session curve set this table was built from.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.texture.view
    }

    pub fn destroy(self) {
        debug!(revision = self.revision, "releasing curve LUT");
        self.texture.destroy();
    }
}

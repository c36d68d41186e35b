use anyhow::Result;

use crate::frame::Frame;
use crate::pipeline::module::{GradingStage, StageContext};

/// Final clamp of RGB to [0,1]. Alpha comes straight from the source.
pub struct ClampOutput;

impl GradingStage for ClampOutput {
    fn name(&self) -> &str {
        "clamp_output"
    }

    fn process_cpu(&self, mut working: Frame, ctx: &StageContext) -> Result<Frame> {
        anyhow::ensure!(
            working.data.len() == ctx.source.data.len(),
            "working frame has {} floats, source has {}",
            working.data.len(),
            ctx.source.data.len()
        );
        for (px, src) in working
            .data
            .chunks_exact_mut(4)
            .zip(ctx.source.data.chunks_exact(4))
        {
            px[0] = px[0].clamp(0.0, 1.0);
            px[1] = px[1].clamp(0.0, 1.0);
            px[2] = px[2].clamp(0.0, 1.0);
            px[3] = src[3];
        }
        Ok(working)
    }
}

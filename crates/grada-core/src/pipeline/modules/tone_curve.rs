use anyhow::Result;

use crate::frame::Frame;
use crate::pipeline::module::{GradingStage, StageContext, map_rgb};

/// Per-channel lookup through the compiled curve table. Each channel is
/// clamped to [0,1] and read from its own lane.
pub struct ToneCurve;

impl GradingStage for ToneCurve {
    fn name(&self) -> &str {
        "tone_curve"
    }

    fn process_cpu(&self, mut working: Frame, ctx: &StageContext) -> Result<Frame> {
        let Some(lut) = ctx.curves else {
            return Ok(working);
        };
        map_rgb(&mut working, |rgb| lut.apply(rgb));
        Ok(working)
    }
}

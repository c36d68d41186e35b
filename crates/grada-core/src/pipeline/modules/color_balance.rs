use anyhow::Result;

use crate::frame::Frame;
use crate::pipeline::module::{GradingStage, StageContext, map_rgb};

/// Additive per-channel offset.
pub struct ColorBalanceOffset;

impl GradingStage for ColorBalanceOffset {
    fn name(&self) -> &str {
        "color_balance"
    }

    fn process_cpu(&self, mut working: Frame, ctx: &StageContext) -> Result<Frame> {
        let offset = ctx.state.color_balance;
        if offset == [0.0; 3] {
            return Ok(working);
        }
        map_rgb(&mut working, |[r, g, b]| [r + offset[0], g + offset[1], b + offset[2]]);
        Ok(working)
    }
}

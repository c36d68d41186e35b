use anyhow::Result;

use crate::frame::Frame;
use crate::pipeline::module::{GradingStage, StageContext, map_rgb};

/// Shift red and blue in opposite directions, then clamp to [0,1].
///
/// The clamp always runs, so this stage also bounds the working values
/// before the detail stages.
pub struct Temperature;

impl GradingStage for Temperature {
    fn name(&self) -> &str {
        "temperature"
    }

    fn process_cpu(&self, mut working: Frame, ctx: &StageContext) -> Result<Frame> {
        let shift = ctx.state.temperature / 100.0 * 0.1;
        map_rgb(&mut working, |[r, g, b]| {
            [r + shift, g, b - shift].map(|c| c.clamp(0.0, 1.0))
        });
        Ok(working)
    }
}

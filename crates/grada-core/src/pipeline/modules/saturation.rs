use anyhow::Result;

use crate::color::luma;
use crate::frame::Frame;
use crate::pipeline::module::{GradingStage, StageContext, map_rgb};

pub struct Saturation;

impl GradingStage for Saturation {
    fn name(&self) -> &str {
        "saturation"
    }

    fn process_cpu(&self, mut working: Frame, ctx: &StageContext) -> Result<Frame> {
        let sat = ctx.state.saturation;
        if sat == 1.0 {
            return Ok(working);
        }

        map_rgb(&mut working, |rgb| {
            let y = luma(rgb);
            rgb.map(|c| y + (c - y) * sat)
        });
        Ok(working)
    }
}

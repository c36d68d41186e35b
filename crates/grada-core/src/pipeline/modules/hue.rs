use anyhow::Result;

use crate::color::hue_rotate;
use crate::frame::Frame;
use crate::pipeline::module::{GradingStage, StageContext, map_rgb};

/// Angles at or below this (radians) skip the rotation entirely.
const HUE_EPSILON: f32 = 1e-4;

pub struct HueRotate;

impl GradingStage for HueRotate {
    fn name(&self) -> &str {
        "hue_rotate"
    }

    fn process_cpu(&self, mut working: Frame, ctx: &StageContext) -> Result<Frame> {
        let angle = ctx.state.hue_radians();
        if angle.abs() <= HUE_EPSILON {
            return Ok(working);
        }
        map_rgb(&mut working, |rgb| hue_rotate(rgb, angle));
        Ok(working)
    }
}

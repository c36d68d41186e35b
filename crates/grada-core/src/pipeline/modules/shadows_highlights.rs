use anyhow::Result;

use crate::frame::Frame;
use crate::pipeline::module::{GradingStage, StageContext, map_rgb};

/// Approximate lift/gain. Negative shadows pull toward black, positive
/// highlights push toward white; the other signs do nothing.
pub struct ShadowsHighlights;

impl GradingStage for ShadowsHighlights {
    fn name(&self) -> &str {
        "shadows_highlights"
    }

    fn process_cpu(&self, mut working: Frame, ctx: &StageContext) -> Result<Frame> {
        let crush = (-ctx.state.shadows).max(0.0);
        let lift = ctx.state.highlights.max(0.0);
        if crush == 0.0 && lift == 0.0 {
            return Ok(working);
        }

        map_rgb(&mut working, |rgb| {
            rgb.map(|c| {
                let c = c + (0.0 - c) * crush;
                c + (1.0 - c) * lift
            })
        });
        Ok(working)
    }
}

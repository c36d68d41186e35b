use anyhow::Result;

use crate::color::limited_to_full;
use crate::frame::Frame;
use crate::params::InputRange;
use crate::pipeline::module::{GradingStage, StageContext, map_rgb};

/// Stretch broadcast limited range (16..235) to full [0,1]. Runs first.
pub struct RangeExpand;

impl GradingStage for RangeExpand {
    fn name(&self) -> &str {
        "range_expand"
    }

    fn process_cpu(&self, mut working: Frame, ctx: &StageContext) -> Result<Frame> {
        if ctx.state.input_range == InputRange::Full {
            return Ok(working);
        }
        map_rgb(&mut working, |rgb| rgb.map(limited_to_full));
        Ok(working)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{LIMITED_BLACK, LIMITED_WHITE};
    use crate::pipeline::modules::test_support::{identity, pixel, run};

    #[test]
    fn full_range_is_noop() {
        let out = run(&RangeExpand, pixel([0.1, 0.5, 0.9]), &identity());
        assert_eq!(out.data, vec![0.1, 0.5, 0.9, 1.0]);
    }

    #[test]
    fn limited_black_and_white_map_to_extremes() {
        let mut state = identity();
        state.input_range = InputRange::Limited;
        let out = run(&RangeExpand, pixel([LIMITED_BLACK, LIMITED_WHITE, 0.5]), &state);
        assert!(out.data[0].abs() < 1e-6, "black -> {}", out.data[0]);
        assert!((out.data[1] - 1.0).abs() < 1e-6, "white -> {}", out.data[1]);
        assert_eq!(out.data[3], 1.0);
    }
}

use anyhow::Result;

use crate::frame::Frame;
use crate::pipeline::module::{GradingStage, StageContext, map_rgb};

/// Additive brightness offset.
pub struct Brightness;

impl GradingStage for Brightness {
    fn name(&self) -> &str {
        "brightness"
    }

    fn process_cpu(&self, mut working: Frame, ctx: &StageContext) -> Result<Frame> {
        let offset = ctx.state.brightness;
        if offset == 0.0 {
            return Ok(working);
        }
        map_rgb(&mut working, |rgb| rgb.map(|c| c + offset));
        Ok(working)
    }
}

/// Scale distance from mid-gray.
pub struct Contrast;

impl GradingStage for Contrast {
    fn name(&self) -> &str {
        "contrast"
    }

    fn process_cpu(&self, mut working: Frame, ctx: &StageContext) -> Result<Frame> {
        let factor = ctx.state.contrast;
        if factor == 1.0 {
            return Ok(working);
        }
        map_rgb(&mut working, |rgb| rgb.map(|c| (c - 0.5) * factor + 0.5));
        Ok(working)
    }
}

/// `c^(1/gamma)`. Skipped for gamma <= 0. Negative inputs clamp to 0 first.
pub struct Gamma;

impl GradingStage for Gamma {
    fn name(&self) -> &str {
        "gamma"
    }

    fn process_cpu(&self, mut working: Frame, ctx: &StageContext) -> Result<Frame> {
        let gamma = ctx.state.gamma;
        if gamma <= 0.0 || gamma == 1.0 {
            return Ok(working);
        }
        let exponent = 1.0 / gamma;
        map_rgb(&mut working, |rgb| rgb.map(|c| c.max(0.0).powf(exponent)));
        Ok(working)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::modules::test_support::{identity, pixel, run};

    #[test]
    fn identity_values_are_noops() {
        let state = identity();
        for stage in [&Brightness as &dyn GradingStage, &Contrast, &Gamma] {
            let out = run(stage, pixel([0.1, 0.5, 0.9]), &state);
            assert_eq!(out.data, vec![0.1, 0.5, 0.9, 1.0], "{}", stage.name());
        }
    }

    #[test]
    fn brightness_adds_offset() {
        let mut state = identity();
        state.brightness = 0.1;
        let out = run(&Brightness, pixel([0.2, 0.5, 0.95]), &state);
        assert!((out.data[0] - 0.3).abs() < 1e-6);
        // No clamping until the output stage.
        assert!((out.data[2] - 1.05).abs() < 1e-6);
    }

    #[test]
    fn contrast_pivots_on_mid_gray() {
        let mut state = identity();
        state.contrast = 1.5;
        let out = run(&Contrast, pixel([0.5, 0.7, 0.3]), &state);
        assert!((out.data[0] - 0.5).abs() < 1e-6);
        assert!((out.data[1] - 0.8).abs() < 1e-6);
        assert!((out.data[2] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn zero_contrast_is_flat_gray() {
        let mut state = identity();
        state.contrast = 0.0;
        let out = run(&Contrast, pixel([0.1, 0.9, 0.4]), &state);
        assert!(out.data[..3].iter().all(|&v| (v - 0.5).abs() < 1e-6));
    }

    #[test]
    fn gamma_above_one_brightens() {
        let mut state = identity();
        state.gamma = 2.0;
        let out = run(&Gamma, pixel([0.25, 0.0, 1.0]), &state);
        assert!((out.data[0] - 0.5).abs() < 1e-6);
        assert_eq!(out.data[1], 0.0);
        assert!((out.data[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn gamma_handles_negative_input() {
        let mut state = identity();
        state.gamma = 1.1;
        let out = run(&Gamma, pixel([-0.2, 0.5, 0.5]), &state);
        assert!(out.data.iter().all(|v| v.is_finite()));
        assert_eq!(out.data[0], 0.0);
    }

    #[test]
    fn non_positive_gamma_is_skipped() {
        let mut state = identity();
        state.gamma = 0.0;
        let out = run(&Gamma, pixel([0.3, 0.3, 0.3]), &state);
        assert_eq!(out.data[0], 0.3);
    }
}

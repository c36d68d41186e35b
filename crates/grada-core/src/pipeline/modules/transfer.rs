use anyhow::Result;

use crate::frame::Frame;
use crate::params::ColorSpace;
use crate::pipeline::module::{GradingStage, StageContext, map_rgb};

/// Decode the stored transfer function into linear light.
pub struct DecodeTransfer;

impl GradingStage for DecodeTransfer {
    fn name(&self) -> &str {
        "decode_transfer"
    }

    fn process_cpu(&self, mut working: Frame, ctx: &StageContext) -> Result<Frame> {
        let space = ctx.state.color_space;
        if space == ColorSpace::Linear {
            return Ok(working);
        }
        map_rgb(&mut working, |rgb| space.to_linear_rgb(rgb));
        Ok(working)
    }
}

/// Re-encode linear light into the resolved color space.
pub struct EncodeTransfer;

impl GradingStage for EncodeTransfer {
    fn name(&self) -> &str {
        "encode_transfer"
    }

    fn process_cpu(&self, mut working: Frame, ctx: &StageContext) -> Result<Frame> {
        let space = ctx.state.color_space;
        if space == ColorSpace::Linear {
            return Ok(working);
        }
        map_rgb(&mut working, |rgb| space.from_linear_rgb(rgb));
        Ok(working)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::modules::test_support::{identity, pixel, run};

    #[test]
    fn decode_then_encode_roundtrips() {
        for space in [ColorSpace::Srgb, ColorSpace::Rec709] {
            let mut state = identity();
            state.color_space = space;
            let linear = run(&DecodeTransfer, pixel([0.2, 0.5, 0.8]), &state);
            assert!(linear.data[1] < 0.5, "{space:?} mid-gray should darken in linear");
            let back = run(&EncodeTransfer, linear, &state);
            for (c, expected) in [0.2, 0.5, 0.8].iter().enumerate() {
                assert!((back.data[c] - expected).abs() < 1e-5, "{space:?} channel {c}");
            }
        }
    }

    #[test]
    fn linear_space_is_untouched() {
        let out = run(&DecodeTransfer, pixel([0.3, 0.6, 0.9]), &identity());
        assert_eq!(out.data, vec![0.3, 0.6, 0.9, 1.0]);
    }

    #[test]
    fn srgb_and_rec709_decode_differently() {
        let mut srgb = identity();
        srgb.color_space = ColorSpace::Srgb;
        let mut rec = identity();
        rec.color_space = ColorSpace::Rec709;
        let a = run(&DecodeTransfer, pixel([0.5; 3]), &srgb);
        let b = run(&DecodeTransfer, pixel([0.5; 3]), &rec);
        assert!((a.data[0] - b.data[0]).abs() > 0.01);
    }
}

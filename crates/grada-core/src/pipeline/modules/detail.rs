use std::borrow::Cow;

use anyhow::Result;

use crate::frame::Frame;
use crate::pipeline::module::{GradingStage, StageContext};

const UNSHARP_EPSILON: f32 = 1e-4;
const BLUR_EPSILON: f32 = 0.01;

fn blurred_source<'a>(ctx: &StageContext<'a>, working: &Frame) -> Result<Cow<'a, Frame>> {
    let blurred = match ctx.source_blurred {
        Some(frame) => Cow::Borrowed(frame),
        None => Cow::Owned(ctx.source.box_blur_3x3()),
    };
    anyhow::ensure!(
        blurred.width == working.width && blurred.height == working.height,
        "source is {}x{} but working frame is {}x{}",
        blurred.width,
        blurred.height,
        working.width,
        working.height
    );
    Ok(blurred)
}

/// Unsharp mask in linear light against a 3x3 box blur of the raw source.
///
/// The blurred source is decoded with the resolved color space but never
/// range-expanded.
pub struct UnsharpMask;

impl GradingStage for UnsharpMask {
    fn name(&self) -> &str {
        "unsharp_mask"
    }

    fn process_cpu(&self, mut working: Frame, ctx: &StageContext) -> Result<Frame> {
        let amount = ctx.state.unsharp_amount;
        if amount <= UNSHARP_EPSILON {
            return Ok(working);
        }

        let blurred = blurred_source(ctx, &working)?;
        let space = ctx.state.color_space;
        for (px, bl) in working
            .data
            .chunks_exact_mut(4)
            .zip(blurred.data.chunks_exact(4))
        {
            let lin = space.to_linear_rgb([bl[0], bl[1], bl[2]]);
            for c in 0..3 {
                px[c] += (px[c] - lin[c]) * amount;
            }
        }
        Ok(working)
    }
}

/// Blend toward a 3x3 box blur of the raw source by `blur / 10`.
pub struct BoxBlur;

impl GradingStage for BoxBlur {
    fn name(&self) -> &str {
        "box_blur"
    }

    fn process_cpu(&self, mut working: Frame, ctx: &StageContext) -> Result<Frame> {
        let blur = ctx.state.blur;
        if blur <= BLUR_EPSILON {
            return Ok(working);
        }

        let weight = blur / 10.0;
        let blurred = blurred_source(ctx, &working)?;
        for (px, bl) in working
            .data
            .chunks_exact_mut(4)
            .zip(blurred.data.chunks_exact(4))
        {
            for c in 0..3 {
                px[c] += (bl[c] - px[c]) * weight;
            }
        }
        Ok(working)
    }
}

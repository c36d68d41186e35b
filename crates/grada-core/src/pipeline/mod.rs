pub mod module;
pub mod modules;

use anyhow::Result;
use tracing::debug;

use crate::curve::CurveLut;
use crate::frame::Frame;
use crate::resolve::{RenderPlan, ResolvedGradingState};
use crate::session::GradingSnapshot;
use module::{GradingStage, StageContext};

/// CPU reference of the grading program.
///
/// ```text
/// Range -> Decode -> Brightness -> Contrast -> Saturation -> Balance -> Hue
///   -> Curves -> Shadows/Highlights -> Temperature -> Unsharp -> Blur
///   -> Gamma -> Encode -> Clamp
/// ```
///
/// The order is fixed and matches the GPU fragment program stage for stage.
/// Every stage runs over the whole frame before the next one starts.
pub struct Pipeline {
    stages: Vec<Box<dyn GradingStage>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            stages: vec![
                Box::new(modules::RangeExpand),
                Box::new(modules::DecodeTransfer),
                Box::new(modules::Brightness),
                Box::new(modules::Contrast),
                Box::new(modules::Saturation),
                Box::new(modules::ColorBalanceOffset),
                Box::new(modules::HueRotate),
                Box::new(modules::ToneCurve),
                Box::new(modules::ShadowsHighlights),
                Box::new(modules::Temperature),
                Box::new(modules::UnsharpMask),
                Box::new(modules::BoxBlur),
                Box::new(modules::Gamma),
                Box::new(modules::EncodeTransfer),
                Box::new(modules::ClampOutput),
            ],
        }
    }

    pub fn stage_names(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().map(|s| s.name())
    }

    /// Run every stage on `input`. `Passthrough` returns the input untouched.
    pub fn process_cpu(
        &self,
        input: Frame,
        plan: &RenderPlan,
        curves: Option<&CurveLut>,
    ) -> Result<Frame> {
        match plan {
            RenderPlan::Passthrough => Ok(input),
            RenderPlan::Graded(state) => self.grade(input, state, curves),
        }
    }

    /// Grade with everything a session snapshot carries.
    pub fn process_snapshot(&self, input: Frame, snapshot: &GradingSnapshot) -> Result<Frame> {
        self.process_cpu(input, &snapshot.plan, snapshot.curves.as_deref())
    }

    fn grade(
        &self,
        input: Frame,
        state: &ResolvedGradingState,
        curves: Option<&CurveLut>,
    ) -> Result<Frame> {
        let needs_blur = state.unsharp_amount > 1e-4 || state.blur > 0.01;
        let source_blurred = needs_blur.then(|| input.box_blur_3x3());
        let ctx = StageContext {
            state,
            curves,
            source: &input,
            source_blurred: source_blurred.as_ref(),
        };

        let mut current = input.clone();
        for stage in &self.stages {
            debug!(stage = stage.name(), "grading");
            current = stage.process_cpu(current, &ctx)?;
        }
        Ok(current)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::curve::compile;
    use crate::params::{ColorSpace, Curve, CurveChannel, InputRange};
    use crate::resolve::{MediaKind, Overrides, resolve};
    use crate::session::GradingSession;

    fn gradient() -> Frame {
        let mut data = Vec::new();
        for i in 0..16 {
            let v = i as f32 / 15.0;
            data.extend_from_slice(&[v, 1.0 - v, (v * 0.5 + 0.25), 1.0]);
        }
        Frame::from_data(4, 4, data).unwrap()
    }

    fn graded(state: ResolvedGradingState, curves: Option<&CurveLut>, input: Frame) -> Frame {
        Pipeline::new()
            .process_cpu(input, &RenderPlan::Graded(state), curves)
            .unwrap()
    }

    #[test]
    fn passthrough_returns_input_unchanged() {
        let input = gradient();
        let expected = input.clone();
        let out = Pipeline::new()
            .process_cpu(input, &RenderPlan::Passthrough, None)
            .unwrap();
        assert_eq!(out, expected);
    }

    #[test]
    fn identity_preset_is_noop_for_srgb_and_rec709() {
        let identity = Catalog::builtin().identity().unwrap();
        for media in [MediaKind::Image, MediaKind::Video] {
            let plan = resolve(Some(identity.as_ref()), &Overrides::default(), media);
            let input = gradient();
            let out = Pipeline::new().process_cpu(input.clone(), &plan, None).unwrap();
            assert_eq!(out.to_rgba8(), input.to_rgba8(), "{media:?}");
            for (a, b) in out.data.iter().zip(&input.data) {
                assert!((a - b).abs() < 1e-4, "{media:?}: {a} vs {b}");
            }
        }
    }

    #[test]
    fn stage_ordering() {
        let pipeline = Pipeline::new();
        let names: Vec<&str> = pipeline.stage_names().collect();
        assert_eq!(
            names,
            vec![
                "range_expand",
                "decode_transfer",
                "brightness",
                "contrast",
                "saturation",
                "color_balance",
                "hue_rotate",
                "tone_curve",
                "shadows_highlights",
                "temperature",
                "unsharp_mask",
                "box_blur",
                "gamma",
                "encode_transfer",
                "clamp_output",
            ]
        );
    }

    #[test]
    fn limited_range_expands_before_anything_else() {
        let state = ResolvedGradingState::identity(ColorSpace::Rec709, InputRange::Limited);
        let black = 16.0 / 255.0;
        let white = 235.0 / 255.0;
        let input = Frame::from_data(2, 1, vec![black, black, black, 1.0, white, white, white, 1.0]).unwrap();
        let out = graded(state, None, input);
        for c in 0..3 {
            assert!(out.pixel(0, 0)[c].abs() < 1e-5, "black -> {:?}", out.pixel(0, 0));
            assert!((out.pixel(1, 0)[c] - 1.0).abs() < 1e-5, "white -> {:?}", out.pixel(1, 0));
        }
    }

    #[test]
    fn mono_classic_keeps_mid_gray_achromatic() {
        let preset = Catalog::builtin().get("mono_classic").unwrap();
        let plan = resolve(Some(preset.as_ref()), &Overrides::default(), MediaKind::Image);
        let lut = compile(&preset.params.curves);
        let input = Frame::filled(2, 2, [0.5, 0.5, 0.5, 1.0]);
        let out = Pipeline::new().process_cpu(input, &plan, lut.as_ref()).unwrap();
        let [r, g, b, a] = out.pixel(0, 0);
        assert!((r - g).abs() < 1e-6 && (g - b).abs() < 1e-6, "not achromatic: {r} {g} {b}");
        assert_eq!(a, 1.0);
        // Linear 0.214 + 0.03 = 0.244, contrast -> 0.206, curve -> 0.216, sRGB -> 0.502.
        assert!((r - 0.502).abs() < 0.005, "mid-gray drifted to {r}");
    }

    #[test]
    fn mono_classic_desaturates_color() {
        let preset = Catalog::builtin().get("mono_classic").unwrap();
        let plan = resolve(Some(preset.as_ref()), &Overrides::default(), MediaKind::Image);
        let lut = compile(&preset.params.curves);
        let input = Frame::filled(1, 1, [0.8, 0.3, 0.1, 1.0]);
        let out = Pipeline::new().process_cpu(input, &plan, lut.as_ref()).unwrap();
        let [r, g, b, _] = out.pixel(0, 0);
        assert!((r - g).abs() < 1e-6 && (g - b).abs() < 1e-6, "{r} {g} {b}");
    }

    #[test]
    fn curve_is_skipped_without_lut_and_applied_with_it() {
        let state = ResolvedGradingState::identity(ColorSpace::Linear, InputRange::Full);
        let lut = compile(&[Curve::new(CurveChannel::All, &[(0.0, 0.0), (0.5, 0.7), (1.0, 1.0)])]);
        let input = Frame::filled(1, 1, [0.5, 0.5, 0.5, 1.0]);
        let plain = graded(state, None, input.clone());
        let curved = graded(state, lut.as_ref(), input);
        assert_eq!(plain.pixel(0, 0)[0], 0.5);
        assert!(curved.pixel(0, 0)[0] > 0.65, "{}", curved.pixel(0, 0)[0]);
    }

    #[test]
    fn output_is_always_in_range() {
        let mut state = ResolvedGradingState::identity(ColorSpace::Srgb, InputRange::Limited);
        state.brightness = 0.5;
        state.contrast = 3.0;
        state.saturation = 3.0;
        state.hue_degrees = 90.0;
        state.unsharp_amount = 2.0;
        state.gamma = 0.5;
        let out = graded(state, None, gradient());
        assert!(out.data.iter().all(|v| v.is_finite() && (0.0..=1.0).contains(v)));
    }

    #[test]
    fn preserves_dimensions_and_alpha() {
        let mut state = ResolvedGradingState::identity(ColorSpace::Srgb, InputRange::Full);
        state.blur = 4.0;
        let mut input = gradient();
        input.data[3] = 0.5;
        let out = graded(state, None, input);
        assert_eq!((out.width, out.height), (4, 4));
        assert_eq!(out.data[3], 0.5);
    }

    #[test]
    fn session_snapshot_drives_pipeline() {
        let mut session = GradingSession::new(MediaKind::Image);
        let input = gradient();
        let untouched = Pipeline::new()
            .process_snapshot(input.clone(), &session.snapshot())
            .unwrap();
        assert_eq!(untouched, input);

        session.select_preset(Catalog::builtin().get("vintage_fade").unwrap().clone());
        let out = Pipeline::new()
            .process_snapshot(input.clone(), &session.snapshot())
            .unwrap();
        assert_ne!(out, input);
    }

    #[test]
    fn warm_temperature_shifts_red_over_blue() {
        let mut state = ResolvedGradingState::identity(ColorSpace::Srgb, InputRange::Full);
        state.temperature = 80.0;
        let out = graded(state, None, Frame::filled(1, 1, [0.5, 0.5, 0.5, 1.0]));
        let [r, g, b, _] = out.pixel(0, 0);
        assert!(r > g && g > b, "{r} {g} {b}");
    }
}

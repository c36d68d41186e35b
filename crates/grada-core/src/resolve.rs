use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::FilterPreset;
use crate::params::{ColorSpace, FilterParams, InputRange};

/// What kind of media the frame comes from. Drives the color-space default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Image,
    Video,
}

impl MediaKind {
    pub fn default_color_space(self) -> ColorSpace {
        match self {
            MediaKind::Image => ColorSpace::Srgb,
            MediaKind::Video => ColorSpace::Rec709,
        }
    }
}

/// Every user-adjustable control. `Sharpness` drives the unsharp amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Control {
    Brightness,
    Contrast,
    Saturation,
    Gamma,
    Hue,
    ColorBalance,
    Sharpness,
    Shadows,
    Highlights,
    Temperature,
    Blur,
}

impl Control {
    pub const ALL: [Control; 11] = [
        Control::Brightness,
        Control::Contrast,
        Control::Saturation,
        Control::Gamma,
        Control::Hue,
        Control::ColorBalance,
        Control::Sharpness,
        Control::Shadows,
        Control::Highlights,
        Control::Temperature,
        Control::Blur,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Control::Brightness => "Brightness",
            Control::Contrast => "Contrast",
            Control::Saturation => "Saturation",
            Control::Gamma => "Gamma",
            Control::Hue => "Hue",
            Control::ColorBalance => "Color Balance",
            Control::Sharpness => "Sharpness",
            Control::Shadows => "Shadows",
            Control::Highlights => "Highlights",
            Control::Temperature => "Temperature",
            Control::Blur => "Blur",
        }
    }

    /// Editor slider range in native units. Color balance is per channel.
    pub fn range(self) -> (f32, f32) {
        match self {
            Control::Brightness => (-0.5, 0.5),
            Control::Contrast => (0.0, 3.0),
            Control::Saturation => (0.0, 3.0),
            Control::Gamma => (0.5, 3.0),
            Control::Hue => (-180.0, 180.0),
            Control::ColorBalance => (-0.5, 0.5),
            Control::Sharpness => (0.0, 2.0),
            Control::Shadows | Control::Highlights => (-1.0, 1.0),
            Control::Temperature => (-100.0, 100.0),
            Control::Blur => (0.0, 10.0),
        }
    }

    /// Native value -> slider position in 0..100. Out-of-range values clamp.
    pub fn to_slider(self, value: f32) -> f32 {
        let (lo, hi) = self.range();
        (value.clamp(lo, hi) - lo) / (hi - lo) * 100.0
    }

    /// Slider position in 0..100 -> native value.
    pub fn from_slider(self, slider: f32) -> f32 {
        let (lo, hi) = self.range();
        slider.clamp(0.0, 100.0) / 100.0 * (hi - lo) + lo
    }
}

/// Live per-control override values. Unset controls fall through to the preset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Overrides {
    pub brightness: Option<f32>,
    pub contrast: Option<f32>,
    pub saturation: Option<f32>,
    pub gamma: Option<f32>,
    pub hue: Option<f32>,
    pub color_balance: Option<[f32; 3]>,
    pub sharpness: Option<f32>,
    pub shadows: Option<f32>,
    pub highlights: Option<f32>,
    pub temperature: Option<f32>,
    pub blur: Option<f32>,
}

impl Overrides {
    /// Every control set to the preset's resolved value, as an editor reset does.
    pub fn seeded_from(params: &FilterParams) -> Self {
        let s = resolve_state(params, &Overrides::default(), MediaKind::Image);
        Self {
            brightness: Some(s.brightness),
            contrast: Some(s.contrast),
            saturation: Some(s.saturation),
            gamma: Some(s.gamma),
            hue: Some(s.hue_degrees),
            color_balance: Some(s.color_balance),
            sharpness: Some(s.unsharp_amount),
            shadows: Some(s.shadows),
            highlights: Some(s.highlights),
            temperature: Some(s.temperature),
            blur: Some(s.blur),
        }
    }

    fn scalar_mut(&mut self, control: Control) -> Option<&mut Option<f32>> {
        match control {
            Control::Brightness => Some(&mut self.brightness),
            Control::Contrast => Some(&mut self.contrast),
            Control::Saturation => Some(&mut self.saturation),
            Control::Gamma => Some(&mut self.gamma),
            Control::Hue => Some(&mut self.hue),
            Control::Sharpness => Some(&mut self.sharpness),
            Control::Shadows => Some(&mut self.shadows),
            Control::Highlights => Some(&mut self.highlights),
            Control::Temperature => Some(&mut self.temperature),
            Control::Blur => Some(&mut self.blur),
            Control::ColorBalance => None,
        }
    }

    /// Set a scalar control. `ColorBalance` is a triple and is ignored
    /// here; use [`set_color_balance`](Self::set_color_balance).
    pub fn set(&mut self, control: Control, value: f32) {
        match self.scalar_mut(control) {
            Some(slot) => *slot = Some(value),
            None => warn!(value, "color balance needs set_color_balance, ignoring scalar set"),
        }
    }

    pub fn set_color_balance(&mut self, rgb: [f32; 3]) {
        self.color_balance = Some(rgb);
    }

    /// Scalar override value. Always `None` for `ColorBalance`; read
    /// [`color_balance`](Self::color_balance) instead.
    pub fn get(&self, control: Control) -> Option<f32> {
        match control {
            Control::Brightness => self.brightness,
            Control::Contrast => self.contrast,
            Control::Saturation => self.saturation,
            Control::Gamma => self.gamma,
            Control::Hue => self.hue,
            Control::Sharpness => self.sharpness,
            Control::Shadows => self.shadows,
            Control::Highlights => self.highlights,
            Control::Temperature => self.temperature,
            Control::Blur => self.blur,
            Control::ColorBalance => None,
        }
    }

    pub fn clear(&mut self, control: Control) {
        match self.scalar_mut(control) {
            Some(slot) => *slot = None,
            None => self.color_balance = None,
        }
    }

    pub fn clear_all(&mut self) {
        *self = Self::default();
    }

    pub fn is_set(&self, control: Control) -> bool {
        match control {
            Control::ColorBalance => self.color_balance.is_some(),
            other => self.get(other).is_some(),
        }
    }

    pub fn is_empty(&self) -> bool {
        Control::ALL.iter().all(|&c| !self.is_set(c))
    }
}

/// Concrete numeric values fed to the grading program for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedGradingState {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub gamma: f32,
    pub hue_degrees: f32,
    pub color_balance: [f32; 3],
    pub unsharp_amount: f32,
    pub shadows: f32,
    pub highlights: f32,
    pub temperature: f32,
    pub blur: f32,
    pub color_space: ColorSpace,
    pub input_range: InputRange,
}

impl ResolvedGradingState {
    /// All adjustments at their identity values.
    pub fn identity(color_space: ColorSpace, input_range: InputRange) -> Self {
        Self {
            brightness: 0.0,
            contrast: 1.0,
            saturation: 1.0,
            gamma: 1.0,
            hue_degrees: 0.0,
            color_balance: [0.0; 3],
            unsharp_amount: 0.0,
            shadows: 0.0,
            highlights: 0.0,
            temperature: 0.0,
            blur: 0.0,
            color_space,
            input_range,
        }
    }

    pub fn hue_radians(&self) -> f32 {
        self.hue_degrees.to_radians()
    }

    /// Resolved value of a scalar control. `ColorBalance` returns the red channel.
    pub fn value(&self, control: Control) -> f32 {
        match control {
            Control::Brightness => self.brightness,
            Control::Contrast => self.contrast,
            Control::Saturation => self.saturation,
            Control::Gamma => self.gamma,
            Control::Hue => self.hue_degrees,
            Control::ColorBalance => self.color_balance[0],
            Control::Sharpness => self.unsharp_amount,
            Control::Shadows => self.shadows,
            Control::Highlights => self.highlights,
            Control::Temperature => self.temperature,
            Control::Blur => self.blur,
        }
    }
}

/// What the grading program should do with the next frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RenderPlan {
    /// No preset active: show the source unmodified.
    Passthrough,
    Graded(ResolvedGradingState),
}

impl RenderPlan {
    pub fn state(&self) -> Option<&ResolvedGradingState> {
        match self {
            RenderPlan::Passthrough => None,
            RenderPlan::Graded(state) => Some(state),
        }
    }

    pub fn is_passthrough(&self) -> bool {
        matches!(self, RenderPlan::Passthrough)
    }
}

/// Resolve the plan for one frame: passthrough without a preset, otherwise
/// each field from override, then preset, then identity.
pub fn resolve(preset: Option<&FilterPreset>, overrides: &Overrides, media: MediaKind) -> RenderPlan {
    match preset {
        None => RenderPlan::Passthrough,
        Some(preset) => RenderPlan::Graded(resolve_state(&preset.params, overrides, media)),
    }
}

pub fn resolve_state(params: &FilterParams, overrides: &Overrides, media: MediaKind) -> ResolvedGradingState {
    let pick = |over: Option<f32>, preset: Option<f32>, default: f32| over.or(preset).unwrap_or(default);

    ResolvedGradingState {
        brightness: pick(overrides.brightness, params.brightness, 0.0),
        contrast: pick(overrides.contrast, params.contrast, 1.0),
        saturation: pick(overrides.saturation, params.saturation, 1.0),
        gamma: pick(overrides.gamma, params.gamma, 1.0),
        hue_degrees: pick(overrides.hue, params.hue, 0.0),
        color_balance: overrides
            .color_balance
            .or_else(|| params.color_balance.map(|cb| cb.to_array()))
            .unwrap_or([0.0; 3]),
        unsharp_amount: pick(overrides.sharpness, params.unsharp_amount(), 0.0),
        shadows: pick(overrides.shadows, params.shadows, 0.0),
        highlights: pick(overrides.highlights, params.highlights, 0.0),
        temperature: pick(overrides.temperature, params.temperature, 0.0),
        blur: pick(overrides.blur, params.blur, 0.0),
        color_space: params.color_space.unwrap_or(media.default_color_space()),
        input_range: params.input_range.unwrap_or_default(),
    }
}

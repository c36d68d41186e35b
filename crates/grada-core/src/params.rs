use serde::{Deserialize, Serialize};

/// Transfer function the stored pixel values are encoded with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    #[default]
    Srgb,
    Rec709,
    Linear,
}

/// Signal range of the source: full 0..255 or broadcast 16..235.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputRange {
    #[default]
    Full,
    Limited,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveChannel {
    /// Fallback for any of r/g/b without an explicit curve.
    #[default]
    All,
    R,
    G,
    B,
}

/// Tone-curve control point, both coordinates in [0,1].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub x: f32,
    pub y: f32,
}

impl CurvePoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    #[serde(default)]
    pub channel: CurveChannel,
    pub points: Vec<CurvePoint>,
}

impl Curve {
    pub fn new(channel: CurveChannel, points: &[(f32, f32)]) -> Self {
        Self {
            channel,
            points: points.iter().map(|&(x, y)| CurvePoint::new(x, y)).collect(),
        }
    }
}

/// Additive per-channel offsets. Missing channels mean 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorBalance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub g: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b: Option<f32>,
}

impl ColorBalance {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: Some(r),
            g: Some(g),
            b: Some(b),
        }
    }

    pub fn to_array(self) -> [f32; 3] {
        [
            self.r.unwrap_or(0.0),
            self.g.unwrap_or(0.0),
            self.b.unwrap_or(0.0),
        ]
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UnsharpParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f32>,
    /// Kernel radius as authored. The grading program always uses a 3x3 kernel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f32>,
}

/// Declarative filter parameters. Every field is optional; an absent field
/// means that adjustment's identity value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contrast: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturation: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gamma: Option<f32>,
    /// Hue rotation in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hue: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_balance: Option<ColorBalance>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub curves: Vec<Curve>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unsharp: Option<UnsharpParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadows: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlights: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blur: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_space: Option<ColorSpace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_range: Option<InputRange>,
    /// Effect composition the preset was authored against. Documentation only;
    /// the grading program always runs its own fixed order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order: Vec<String>,
}

impl FilterParams {
    pub fn unsharp_amount(&self) -> Option<f32> {
        self.unsharp.and_then(|u| u.amount)
    }

    pub fn has_curves(&self) -> bool {
        !self.curves.is_empty()
    }
}

use crate::params::ColorSpace;

/// Rec.709 luma weights.
pub const LUMA_WEIGHTS: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// Broadcast limited-range black level (16/255).
pub const LIMITED_BLACK: f32 = 16.0 / 255.0;
/// Broadcast limited-range white level (235/255).
pub const LIMITED_WHITE: f32 = 235.0 / 255.0;

/// Inverse sRGB EOTF (IEC 61966-2-1): linear light [0,1] -> perceptual sRGB [0,1].
pub fn linear_to_srgb(x: f32) -> f32 {
    if x < 0.0031308 {
        12.92 * x
    } else {
        1.055 * x.powf(1.0 / 2.4) - 0.055
    }
}

/// sRGB EOTF (IEC 61966-2-1): perceptual sRGB [0,1] -> linear light [0,1].
pub fn srgb_to_linear(x: f32) -> f32 {
    if x < 0.04045 {
        x / 12.92
    } else {
        ((x + 0.055) / 1.055).powf(2.4)
    }
}

/// Rec.709 OETF (ITU-R BT.709): linear light -> encoded signal.
pub fn linear_to_rec709(x: f32) -> f32 {
    if x < 0.018 {
        4.5 * x
    } else {
        1.099 * x.powf(0.45) - 0.099
    }
}

/// Inverse Rec.709 OETF: encoded signal -> linear light.
pub fn rec709_to_linear(x: f32) -> f32 {
    if x < 0.081 {
        x / 4.5
    } else {
        ((x + 0.099) / 1.099).powf(1.0 / 0.45)
    }
}

impl ColorSpace {
    /// Decode one encoded channel value into linear light.
    pub fn to_linear(self, x: f32) -> f32 {
        match self {
            ColorSpace::Srgb => srgb_to_linear(x),
            ColorSpace::Rec709 => rec709_to_linear(x),
            ColorSpace::Linear => x,
        }
    }

    /// Encode one linear channel value back into this space.
    pub fn from_linear(self, x: f32) -> f32 {
        match self {
            ColorSpace::Srgb => linear_to_srgb(x),
            ColorSpace::Rec709 => linear_to_rec709(x),
            ColorSpace::Linear => x,
        }
    }

    pub fn to_linear_rgb(self, rgb: [f32; 3]) -> [f32; 3] {
        rgb.map(|c| self.to_linear(c))
    }

    pub fn from_linear_rgb(self, rgb: [f32; 3]) -> [f32; 3] {
        rgb.map(|c| self.from_linear(c))
    }
}

/// Remap limited (16..235) range to full [0,1]. Values outside are not clamped.
pub fn limited_to_full(x: f32) -> f32 {
    (x - LIMITED_BLACK) / (LIMITED_WHITE - LIMITED_BLACK)
}

pub fn luma(rgb: [f32; 3]) -> f32 {
    LUMA_WEIGHTS[0] * rgb[0] + LUMA_WEIGHTS[1] * rgb[1] + LUMA_WEIGHTS[2] * rgb[2]
}

// ── YIQ ──────────────────────────────────────────────────────────────────
//
// NTSC YIQ, rows are output components. Hue rotation spins the (I, Q)
// chroma plane around the Y axis. Keep them row-major: loaded as
// column-major `mat3` literals they transpose and tint neutral grays.

const RGB_TO_YIQ: [[f32; 3]; 3] = [
    [0.299, 0.587, 0.114],
    [0.596, -0.274, -0.322],
    [0.211, -0.523, 0.312],
];

const YIQ_TO_RGB: [[f32; 3]; 3] = [
    [1.0, 0.956, 0.621],
    [1.0, -0.272, -0.647],
    [1.0, -1.105, 1.702],
];

fn mul3(m: &[[f32; 3]; 3], v: [f32; 3]) -> [f32; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

/// Rotate hue by `angle` radians in YIQ space.
pub fn hue_rotate(rgb: [f32; 3], angle: f32) -> [f32; 3] {
    let [y, i, q] = mul3(&RGB_TO_YIQ, rgb);
    let (sn, cs) = angle.sin_cos();
    let rotated = [y, i * cs - q * sn, i * sn + q * cs];
    mul3(&YIQ_TO_RGB, rotated)
}

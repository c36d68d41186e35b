use tracing::debug;

use crate::params::{Curve, CurveChannel, CurvePoint};

/// Number of texels in the tone-curve lookup table.
pub const LUT_SIZE: usize = 256;

const IDENTITY: [CurvePoint; 2] = [CurvePoint::new(0.0, 0.0), CurvePoint::new(1.0, 1.0)];

/// Point lists resolved per output channel.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelCurves {
    pub r: Vec<CurvePoint>,
    pub g: Vec<CurvePoint>,
    pub b: Vec<CurvePoint>,
}

/// Pick the point list for each of r/g/b.
///
/// An explicit channel curve beats an `all` curve regardless of list order.
/// Within each kind the first curve in the list wins. Channels with nothing
/// applicable get the identity `[(0,0),(1,1)]`. Curves without points are ignored.
pub fn channel_points(curves: &[Curve]) -> ChannelCurves {
    let first = |channel: CurveChannel| {
        curves
            .iter()
            .find(|c| c.channel == channel && !c.points.is_empty())
            .map(|c| c.points.clone())
    };
    let all = first(CurveChannel::All);
    let pick = |channel| {
        first(channel)
            .or_else(|| all.clone())
            .unwrap_or_else(|| IDENTITY.to_vec())
    };
    ChannelCurves {
        r: pick(CurveChannel::R),
        g: pick(CurveChannel::G),
        b: pick(CurveChannel::B),
    }
}

/// Natural cubic spline through a set of knots.
#[derive(Clone, Debug)]
pub struct Spline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Second derivative at each knot.
    m: Vec<f64>,
}

impl Spline {
    /// Build from control points. Points are sorted by x (stable) first.
    /// An empty point list yields the identity curve.
    pub fn new(points: &[CurvePoint]) -> Self {
        let mut pts = if points.is_empty() {
            IDENTITY.to_vec()
        } else {
            points.to_vec()
        };
        pts.sort_by(|a, b| a.x.total_cmp(&b.x));
        let xs: Vec<f64> = pts.iter().map(|p| p.x as f64).collect();
        let ys: Vec<f64> = pts.iter().map(|p| p.y as f64).collect();
        let m = second_derivatives(&xs, &ys);
        Self { xs, ys, m }
    }

    pub fn second_derivatives(&self) -> &[f64] {
        &self.m
    }

    /// Evaluate at `t`. Outside the knot domain the end values are held.
    pub fn eval(&self, t: f64) -> f64 {
        let n = self.xs.len();
        if t <= self.xs[0] {
            return self.ys[0];
        }
        if t >= self.xs[n - 1] {
            return self.ys[n - 1];
        }

        // Point counts are tiny; a linear scan is enough.
        let i = (0..n - 1)
            .find(|&k| t >= self.xs[k] && t <= self.xs[k + 1])
            .unwrap_or(0);

        let h = self.xs[i + 1] - self.xs[i];
        if h == 0.0 {
            return self.ys[i];
        }

        let a = (self.xs[i + 1] - t) / h;
        let b = (t - self.xs[i]) / h;
        a * self.ys[i]
            + b * self.ys[i + 1]
            + ((a * a * a - a) * self.m[i] + (b * b * b - b) * self.m[i + 1]) * (h * h) / 6.0
    }
}

/// Thomas solve of the natural-spline tridiagonal system. Fewer than three
/// knots, or any zero-width interval, gives all zeros (piecewise linear).
fn second_derivatives(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let n = xs.len();
    let mut m = vec![0.0; n];
    if n < 3 {
        return m;
    }

    let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
    if h.iter().any(|&w| w <= 0.0) {
        return m;
    }

    let mut mu = vec![0.0; n];
    let mut z = vec![0.0; n];
    for i in 1..n - 1 {
        let lower = h[i - 1];
        let diag = 2.0 * (h[i - 1] + h[i]);
        let rhs = 6.0 * ((ys[i + 1] - ys[i]) / h[i] - (ys[i] - ys[i - 1]) / h[i - 1]);
        let l = diag - lower * mu[i - 1];
        mu[i] = h[i] / l;
        z[i] = (rhs - lower * z[i - 1]) / l;
    }

    for j in (1..n - 1).rev() {
        m[j] = z[j] - mu[j] * m[j + 1];
    }
    m
}

fn to_byte(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// 256x1 RGBA8 tone-curve lookup table. Alpha is always 255.
#[derive(Clone, PartialEq, Eq)]
pub struct CurveLut {
    texels: Box<[u8; LUT_SIZE * 4]>,
}

impl std::fmt::Debug for CurveLut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurveLut")
            .field("first", &self.texel(0))
            .field("last", &self.texel(LUT_SIZE - 1))
            .finish()
    }
}

impl CurveLut {
    pub fn from_channels(channels: &ChannelCurves) -> Self {
        let splines = [
            Spline::new(&channels.r),
            Spline::new(&channels.g),
            Spline::new(&channels.b),
        ];
        let mut texels = Box::new([0u8; LUT_SIZE * 4]);
        for (i, texel) in texels.chunks_exact_mut(4).enumerate() {
            let t = i as f64 / (LUT_SIZE - 1) as f64;
            for (c, spline) in splines.iter().enumerate() {
                texel[c] = to_byte(spline.eval(t));
            }
            texel[3] = 255;
        }
        Self { texels }
    }

    /// Raw RGBA bytes, ready for a 256x1 texture upload.
    pub fn as_bytes(&self) -> &[u8] {
        &self.texels[..]
    }

    pub fn texel(&self, i: usize) -> [u8; 4] {
        let o = i * 4;
        [
            self.texels[o],
            self.texels[o + 1],
            self.texels[o + 2],
            self.texels[o + 3],
        ]
    }

    /// Sample one channel lane at normalized coordinate `u`, emulating a
    /// linearly filtered, clamp-to-edge 256-texel texture.
    pub fn sample(&self, channel: usize, u: f32) -> f32 {
        let x = (u.clamp(0.0, 1.0) * LUT_SIZE as f32 - 0.5).clamp(0.0, (LUT_SIZE - 1) as f32);
        let i0 = x.floor() as usize;
        let i1 = (i0 + 1).min(LUT_SIZE - 1);
        let frac = x - i0 as f32;
        let v0 = self.texels[i0 * 4 + channel] as f32 / 255.0;
        let v1 = self.texels[i1 * 4 + channel] as f32 / 255.0;
        v0 + (v1 - v0) * frac
    }

    /// Look up r, g and b each in its own lane.
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        [self.sample(0, rgb[0]), self.sample(1, rgb[1]), self.sample(2, rgb[2])]
    }
}

/// Compile a curve list into a lookup table. `None` when no curve is present,
/// in which case the lookup stage is skipped entirely.
pub fn compile(curves: &[Curve]) -> Option<CurveLut> {
    if curves.iter().all(|c| c.points.is_empty()) {
        return None;
    }
    let lut = CurveLut::from_channels(&channel_points(curves));
    debug!(curves = curves.len(), "compiled tone curve LUT");
    Some(lut)
}

mod color_balance;
mod detail;
mod hue;
mod output;
mod range;
mod saturation;
mod shadows_highlights;
mod temperature;
mod tone;
mod tone_curve;
mod transfer;

pub use color_balance::ColorBalanceOffset;
pub use detail::{BoxBlur, UnsharpMask};
pub use hue::HueRotate;
pub use output::ClampOutput;
pub use range::RangeExpand;
pub use saturation::Saturation;
pub use shadows_highlights::ShadowsHighlights;
pub use temperature::Temperature;
pub use tone::{Brightness, Contrast, Gamma};
pub use tone_curve::ToneCurve;
pub use transfer::{DecodeTransfer, EncodeTransfer};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use grada_core::catalog::Catalog;
use grada_core::resolve::{Control, MediaKind};
use grada_core::session::GradingSession;

#[derive(Parser, Debug)]
#[command(name = "grada")]
#[command(version, about = "Render a color-graded preview of an image")]
#[command(long_about = "
Apply a filter preset plus optional per-control overrides to an image and
write the graded frame as PNG.

Examples:
  grada --list
  grada photo.jpg --preset mono_classic
  grada photo.jpg --preset golden_hour --contrast 1.2 -o out.png
  grada clip_still.png --brightness 0.05 --color-balance 0.02,0,-0.02 --cpu
")]
pub struct Args {
    /// Source image
    #[arg(required_unless_present = "list")]
    pub input: Option<PathBuf>,

    /// Preset key to apply
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Load presets from a JSON catalog instead of the built-in table
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// List presets and exit
    #[arg(long)]
    pub list: bool,

    /// Output PNG (default: <input>_graded.png)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Grade on the CPU instead of the GPU
    #[arg(long)]
    pub cpu: bool,

    #[arg(long, allow_hyphen_values = true)]
    pub brightness: Option<f32>,
    #[arg(long)]
    pub contrast: Option<f32>,
    #[arg(long)]
    pub saturation: Option<f32>,
    #[arg(long)]
    pub gamma: Option<f32>,
    /// Hue rotation in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub hue: Option<f32>,
    /// Per-channel offsets as R,G,B
    #[arg(long, value_delimiter = ',', num_args = 3, allow_hyphen_values = true)]
    pub color_balance: Option<Vec<f32>>,
    /// Unsharp mask amount
    #[arg(long)]
    pub sharpness: Option<f32>,
    #[arg(long, allow_hyphen_values = true)]
    pub shadows: Option<f32>,
    #[arg(long, allow_hyphen_values = true)]
    pub highlights: Option<f32>,
    #[arg(long, allow_hyphen_values = true)]
    pub temperature: Option<f32>,
    #[arg(long)]
    pub blur: Option<f32>,
}

impl Args {
    /// Scalar control overrides given on the command line.
    pub fn overrides(&self) -> Vec<(Control, f32)> {
        [
            (Control::Brightness, self.brightness),
            (Control::Contrast, self.contrast),
            (Control::Saturation, self.saturation),
            (Control::Gamma, self.gamma),
            (Control::Hue, self.hue),
            (Control::Sharpness, self.sharpness),
            (Control::Shadows, self.shadows),
            (Control::Highlights, self.highlights),
            (Control::Temperature, self.temperature),
            (Control::Blur, self.blur),
        ]
        .into_iter()
        .filter_map(|(control, value)| value.map(|v| (control, v)))
        .collect()
    }

    pub fn has_overrides(&self) -> bool {
        self.color_balance.is_some() || !self.overrides().is_empty()
    }

    /// Session for the requested preset and overrides. Overrides without a
    /// preset grade on top of the catalog's identity entry, since a session
    /// with no preset renders the input untouched.
    pub fn build_session(&self, catalog: &Catalog, media: MediaKind) -> Result<GradingSession> {
        let mut session = GradingSession::new(media);
        let preset = match &self.preset {
            Some(key) => Some(
                catalog
                    .get(key)
                    .with_context(|| format!("unknown preset: {key}"))?,
            ),
            None if self.has_overrides() => Some(
                catalog
                    .identity()
                    .context("overrides need --preset: catalog has no identity preset")?,
            ),
            None => None,
        };
        if let Some(preset) = preset {
            session.select_preset(Arc::clone(preset));
        }

        for (control, value) in self.overrides() {
            session.set_override(control, value);
        }
        if let Some(balance) = &self.color_balance {
            for (channel, value) in balance.iter().enumerate() {
                session.set_color_balance_channel(channel, *value);
            }
        }
        Ok(session)
    }

    pub fn output_path(&self, input: &Path) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "frame".to_string());
            input.with_file_name(format!("{stem}_graded.png"))
        })
    }
}

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::params::{ColorBalance, Curve, CurveChannel, FilterParams, UnsharpParams};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterCategory {
    #[default]
    None,
    #[serde(rename = "Color Boost")]
    ColorBoost,
    Nature,
    #[serde(rename = "Black & White")]
    BlackAndWhite,
    Cinematic,
    Landscape,
    Lifestyle,
    Moody,
    Portrait,
}

impl FilterCategory {
    pub fn label(self) -> &'static str {
        match self {
            FilterCategory::None => "None",
            FilterCategory::ColorBoost => "Color Boost",
            FilterCategory::Nature => "Nature",
            FilterCategory::BlackAndWhite => "Black & White",
            FilterCategory::Cinematic => "Cinematic",
            FilterCategory::Landscape => "Landscape",
            FilterCategory::Lifestyle => "Lifestyle",
            FilterCategory::Moody => "Moody",
            FilterCategory::Portrait => "Portrait",
        }
    }
}

impl std::fmt::Display for FilterCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A named, immutable bundle of grading parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterPreset {
    pub name: String,
    /// Stable lookup key. `None` only for a key-less identity entry.
    pub key: Option<String>,
    pub category: FilterCategory,
    #[serde(default)]
    pub params: FilterParams,
}

impl FilterPreset {
    pub fn new(name: &str, key: &str, category: FilterCategory, params: FilterParams) -> Self {
        Self {
            name: name.to_string(),
            key: Some(key.to_string()),
            category,
            params,
        }
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }
}

/// Ordered, read-only preset catalog.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    presets: Vec<Arc<FilterPreset>>,
}

static BUILTIN: LazyLock<Catalog> = LazyLock::new(|| Catalog {
    presets: builtin_presets().into_iter().map(Arc::new).collect(),
});

impl Catalog {
    /// Process-wide built-in catalog, built on first access.
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    /// Build a catalog from presets, rejecting duplicate keys, more than one
    /// key-less entry, or curve points outside [0,1].
    pub fn new(presets: Vec<FilterPreset>) -> Result<Self> {
        validate(&presets)?;
        Ok(Self {
            presets: presets.into_iter().map(Arc::new).collect(),
        })
    }

    /// Parse a `{name, key, category, params}[]` table.
    pub fn from_json(json: &str) -> Result<Self> {
        let presets: Vec<FilterPreset> =
            serde_json::from_str(json).context("failed to parse preset catalog")?;
        Self::new(presets)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read preset catalog {}", path.display()))?;
        let catalog = Self::from_json(&json)
            .with_context(|| format!("invalid preset catalog {}", path.display()))?;
        info!(path = %path.display(), presets = catalog.len(), "loaded preset catalog");
        Ok(catalog)
    }

    pub fn to_json(&self) -> Result<String> {
        let presets: Vec<&FilterPreset> = self.presets.iter().map(Arc::as_ref).collect();
        serde_json::to_string_pretty(&presets).context("failed to serialize preset catalog")
    }

    pub fn get(&self, key: &str) -> Option<&Arc<FilterPreset>> {
        self.presets.iter().find(|p| p.key() == Some(key))
    }

    /// The identity entry: key `"none"`, or the key-less preset.
    pub fn identity(&self) -> Option<&Arc<FilterPreset>> {
        self.get("none")
            .or_else(|| self.presets.iter().find(|p| p.key.is_none()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<FilterPreset>> {
        self.presets.iter()
    }

    pub fn by_category(&self, category: FilterCategory) -> impl Iterator<Item = &Arc<FilterPreset>> {
        self.presets.iter().filter(move |p| p.category == category)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

fn validate(presets: &[FilterPreset]) -> Result<()> {
    let mut keys = HashSet::new();
    let mut keyless = 0;
    for preset in presets {
        match preset.key() {
            Some(key) => anyhow::ensure!(
                keys.insert(key),
                "duplicate preset key {key:?} ({})",
                preset.name
            ),
            None => keyless += 1,
        }
        for curve in &preset.params.curves {
            for p in &curve.points {
                anyhow::ensure!(
                    (0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y),
                    "curve point ({}, {}) in preset {:?} is outside [0,1]",
                    p.x,
                    p.y,
                    preset.name
                );
            }
        }
    }
    anyhow::ensure!(keyless <= 1, "{keyless} presets have no key, at most one is allowed");
    Ok(())
}

fn order(steps: &[&str]) -> Vec<String> {
    steps.iter().map(|s| s.to_string()).collect()
}

fn all_curve(points: &[(f32, f32)]) -> Vec<Curve> {
    vec![Curve::new(CurveChannel::All, points)]
}

fn builtin_presets() -> Vec<FilterPreset> {
    use FilterCategory::*;

    vec![
        FilterPreset::new("Original", "none", None, FilterParams::default()),
        // Color boost
        FilterPreset::new(
            "Vivid Pop",
            "vivid_pop",
            ColorBoost,
            FilterParams {
                brightness: Some(0.08),
                saturation: Some(1.45),
                contrast: Some(1.35),
                gamma: Some(1.1),
                color_balance: Some(ColorBalance::rgb(0.05, 0.02, -0.03)),
                order: order(&["colorBalance", "eq"]),
                ..Default::default()
            },
        ),
        FilterPreset::new(
            "Vibrance Boost",
            "vibrance_boost",
            ColorBoost,
            FilterParams {
                brightness: Some(0.1),
                saturation: Some(1.5),
                contrast: Some(1.3),
                curves: all_curve(&[(0.0, 0.0), (0.3, 0.4), (0.7, 0.75), (1.0, 1.0)]),
                order: order(&["curves", "eq"]),
                ..Default::default()
            },
        ),
        FilterPreset::new(
            "Ultra Clarity",
            "ultra_clarity",
            ColorBoost,
            FilterParams {
                saturation: Some(1.1),
                contrast: Some(1.3),
                brightness: Some(0.08),
                unsharp: Some(UnsharpParams {
                    amount: Some(1.2),
                    radius: Some(3.0),
                    threshold: Option::None,
                }),
                color_balance: Some(ColorBalance::rgb(0.03, 0.01, -0.02)),
                order: order(&["unsharp", "colorBalance", "eq"]),
                ..Default::default()
            },
        ),
        // Lifestyle
        FilterPreset::new(
            "Soft Vibes",
            "soft_vibes",
            Lifestyle,
            FilterParams {
                contrast: Some(1.12),
                saturation: Some(0.89),
                brightness: Some(0.04),
                curves: all_curve(&[(0.0, 0.01), (0.5, 0.5), (1.0, 0.98)]),
                color_balance: Some(ColorBalance::rgb(0.02, 0.01, 0.005)),
                order: order(&["curves", "colorBalance", "eq"]),
                ..Default::default()
            },
        ),
        FilterPreset::new(
            "Vintage Fade",
            "vintage_fade",
            Lifestyle,
            FilterParams {
                curves: all_curve(&[(0.0, 0.0), (0.5, 0.7), (1.0, 1.0)]),
                color_balance: Some(ColorBalance::rgb(0.1, 0.05, -0.1)),
                order: order(&["curves", "colorBalance"]),
                ..Default::default()
            },
        ),
        // Moody
        FilterPreset::new(
            "Dark Fade",
            "dark_fade",
            Moody,
            FilterParams {
                curves: all_curve(&[(0.0, 0.05), (0.5, 0.48), (1.0, 1.0)]),
                saturation: Some(0.8),
                contrast: Some(1.17),
                color_balance: Some(ColorBalance::rgb(0.02, 0.01, 0.04)),
                order: order(&["curves", "colorBalance", "eq"]),
                ..Default::default()
            },
        ),
        FilterPreset::new(
            "Dusty Film",
            "dusty_film",
            Moody,
            FilterParams {
                color_balance: Some(ColorBalance {
                    r: Some(0.1),
                    g: Option::None,
                    b: Some(-0.1),
                }),
                contrast: Some(0.95),
                saturation: Some(0.85),
                order: order(&["colorBalance", "eq"]),
                ..Default::default()
            },
        ),
        // Portrait
        FilterPreset::new(
            "Soft Skin",
            "soft_skin",
            Portrait,
            FilterParams {
                contrast: Some(1.3),
                saturation: Some(0.92),
                brightness: Some(0.1),
                order: order(&["eq"]),
                ..Default::default()
            },
        ),
        FilterPreset::new(
            "Warm Portrait",
            "warm_portrait",
            Portrait,
            FilterParams {
                brightness: Some(0.03),
                saturation: Some(1.1),
                color_balance: Some(ColorBalance {
                    r: Some(0.2),
                    g: Some(0.1),
                    b: Option::None,
                }),
                order: order(&["colorBalance", "eq"]),
                ..Default::default()
            },
        ),
        // Black & white
        FilterPreset::new(
            "Mono Classic",
            "mono_classic",
            BlackAndWhite,
            FilterParams {
                saturation: Some(0.0),
                contrast: Some(1.15),
                brightness: Some(0.03),
                curves: all_curve(&[(0.0, 0.0), (0.5, 0.52), (1.0, 1.0)]),
                order: order(&["curves", "eq"]),
                ..Default::default()
            },
        ),
        FilterPreset::new(
            "Silver Punch",
            "silver_punch",
            BlackAndWhite,
            FilterParams {
                saturation: Some(0.0),
                contrast: Some(1.4),
                brightness: Some(0.08),
                curves: all_curve(&[(0.0, 0.05), (0.3, 0.25), (0.7, 0.8), (1.0, 1.0)]),
                order: order(&["curves", "eq"]),
                ..Default::default()
            },
        ),
        // Cinematic
        FilterPreset::new(
            "Teal & Orange",
            "teal_orange",
            Cinematic,
            FilterParams {
                saturation: Some(1.1),
                color_balance: Some(ColorBalance {
                    r: Some(0.2),
                    g: Option::None,
                    b: Some(-0.2),
                }),
                order: order(&["colorBalance", "eq"]),
                ..Default::default()
            },
        ),
        FilterPreset::new(
            "Muted Shadows",
            "muted_shadows",
            Cinematic,
            FilterParams {
                saturation: Some(0.8),
                curves: all_curve(&[(0.0, 0.0), (0.5, 0.55), (1.0, 1.0)]),
                order: order(&["curves", "eq"]),
                ..Default::default()
            },
        ),
        FilterPreset::new(
            "Gold Rush",
            "gold_rush",
            Cinematic,
            FilterParams {
                contrast: Some(0.95),
                saturation: Some(1.2),
                brightness: Some(0.05),
                curves: vec![
                    Curve::new(CurveChannel::R, &[(0.0, 0.0), (0.5, 0.65), (1.0, 1.0)]),
                    Curve::new(CurveChannel::G, &[(0.0, 0.0), (0.5, 0.6), (1.0, 1.0)]),
                ],
                color_balance: Some(ColorBalance::rgb(0.35, 0.15, -0.25)),
                order: order(&["curves", "colorBalance", "eq"]),
                ..Default::default()
            },
        ),
        // Nature
        FilterPreset::new(
            "Green Pop",
            "green_pop",
            Nature,
            FilterParams {
                color_balance: Some(ColorBalance::rgb(-0.2, 0.2, -0.1)),
                order: order(&["colorBalance"]),
                ..Default::default()
            },
        ),
        FilterPreset::new(
            "Sunny Day",
            "sunny_day",
            Nature,
            FilterParams {
                brightness: Some(0.07),
                saturation: Some(1.2),
                contrast: Some(1.1),
                order: order(&["eq"]),
                ..Default::default()
            },
        ),
        // Landscape
        FilterPreset::new(
            "Blue Skies",
            "blue_skies",
            Landscape,
            FilterParams {
                brightness: Some(0.08),
                saturation: Some(1.3),
                contrast: Some(1.1),
                curves: vec![Curve::new(
                    CurveChannel::B,
                    &[(0.0, 0.0), (0.4, 0.5), (0.8, 0.9), (1.0, 1.0)],
                )],
                color_balance: Some(ColorBalance::rgb(-0.05, 0.02, 0.15)),
                order: order(&["curves", "colorBalance", "eq"]),
                ..Default::default()
            },
        ),
        FilterPreset::new(
            "Golden Hour",
            "golden_hour",
            Landscape,
            FilterParams {
                brightness: Some(0.05),
                saturation: Some(1.15),
                color_balance: Some(ColorBalance {
                    r: Some(0.3),
                    g: Some(0.2),
                    b: Option::None,
                }),
                order: order(&["colorBalance", "eq"]),
                ..Default::default()
            },
        ),
    ]
}

use std::sync::Arc;

use tracing::debug;

use crate::catalog::FilterPreset;
use crate::curve::{self, CurveLut};
use crate::params::Curve;
use crate::resolve::{self, Control, MediaKind, Overrides, RenderPlan};

/// A consistent view of everything one render needs.
#[derive(Clone, Debug)]
pub struct GradingSnapshot {
    /// Bumped on every session change.
    pub revision: u64,
    pub plan: RenderPlan,
    /// Compiled tone curves; `None` when no curve is active.
    pub curves: Option<Arc<CurveLut>>,
    /// Bumped only when the compiled curve table changes.
    pub curve_revision: u64,
}

#[derive(Debug, Default)]
struct CurveCache {
    source: Vec<Curve>,
    lut: Option<Arc<CurveLut>>,
    revision: u64,
}

impl CurveCache {
    fn update(&mut self, curves: &[Curve]) {
        if self.source == curves {
            return;
        }
        self.source = curves.to_vec();
        self.lut = curve::compile(curves).map(Arc::new);
        self.revision += 1;
        debug!(
            revision = self.revision,
            active = self.lut.is_some(),
            "tone curve set changed"
        );
    }
}

/// Grading state for one displayed media slot: active preset, live
/// overrides and media kind. Owned by the caller and passed where needed.
#[derive(Debug, Default)]
pub struct GradingSession {
    preset: Option<Arc<FilterPreset>>,
    overrides: Overrides,
    media: MediaKind,
    revision: u64,
    curves: CurveCache,
}

impl GradingSession {
    pub fn new(media: MediaKind) -> Self {
        Self {
            media,
            ..Default::default()
        }
    }

    pub fn preset(&self) -> Option<&Arc<FilterPreset>> {
        self.preset.as_ref()
    }

    pub fn overrides(&self) -> &Overrides {
        &self.overrides
    }

    pub fn media_kind(&self) -> MediaKind {
        self.media
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Activate a preset. Live overrides are dropped.
    pub fn select_preset(&mut self, preset: Arc<FilterPreset>) {
        debug!(preset = %preset.name, "preset selected");
        self.curves.update(&preset.params.curves);
        self.preset = Some(preset);
        self.overrides.clear_all();
        self.bump();
    }

    pub fn clear_preset(&mut self) {
        self.preset = None;
        self.curves.update(&[]);
        self.bump();
    }

    pub fn set_override(&mut self, control: Control, value: f32) {
        self.overrides.set(control, value);
        self.bump();
    }

    /// Change one color-balance channel (0 = r, 1 = g, 2 = b). The other two
    /// keep their currently resolved values.
    pub fn set_color_balance_channel(&mut self, channel: usize, value: f32) {
        let mut rgb = self
            .overrides
            .color_balance
            .or_else(|| self.plan().state().map(|s| s.color_balance))
            .unwrap_or([0.0; 3]);
        if let Some(slot) = rgb.get_mut(channel) {
            *slot = value;
            self.overrides.set_color_balance(rgb);
            self.bump();
        }
    }

    pub fn clear_override(&mut self, control: Control) {
        self.overrides.clear(control);
        self.bump();
    }

    /// Set every override to the active preset's value.
    pub fn reset_to_preset(&mut self) {
        self.overrides = match &self.preset {
            Some(preset) => Overrides::seeded_from(&preset.params),
            None => Overrides::default(),
        };
        self.bump();
    }

    pub fn set_media_kind(&mut self, media: MediaKind) {
        if self.media != media {
            self.media = media;
            self.bump();
        }
    }

    pub fn plan(&self) -> RenderPlan {
        resolve::resolve(self.preset.as_deref(), &self.overrides, self.media)
    }

    pub fn snapshot(&self) -> GradingSnapshot {
        let plan = self.plan();
        let curves = if plan.is_passthrough() {
            None
        } else {
            self.curves.lut.clone()
        };
        GradingSnapshot {
            revision: self.revision,
            plan,
            curves,
            curve_revision: self.curves.revision,
        }
    }

    fn bump(&mut self) {
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::params::ColorSpace;

    fn preset(key: &str) -> Arc<FilterPreset> {
        Catalog::builtin().get(key).unwrap().clone()
    }

    #[test]
    fn fresh_session_is_passthrough() {
        let session = GradingSession::new(MediaKind::Image);
        let snap = session.snapshot();
        assert!(snap.plan.is_passthrough());
        assert!(snap.curves.is_none());
        assert_eq!(snap.revision, 0);
    }

    #[test]
    fn selecting_preset_grades_and_compiles_curves() {
        let mut session = GradingSession::new(MediaKind::Image);
        session.select_preset(preset("mono_classic"));
        let snap = session.snapshot();
        let state = snap.plan.state().unwrap();
        assert_eq!(state.saturation, 0.0);
        assert!(snap.curves.is_some());
    }

    #[test]
    fn preset_without_curves_has_no_lut() {
        let mut session = GradingSession::new(MediaKind::Image);
        session.select_preset(preset("sunny_day"));
        assert!(session.snapshot().curves.is_none());
    }

    #[test]
    fn select_preset_clears_overrides() {
        let mut session = GradingSession::new(MediaKind::Image);
        session.select_preset(preset("vivid_pop"));
        session.set_override(Control::Contrast, 0.5);
        assert_eq!(session.snapshot().plan.state().unwrap().contrast, 0.5);
        session.select_preset(preset("soft_skin"));
        assert!(session.overrides().is_empty());
        assert_eq!(session.snapshot().plan.state().unwrap().contrast, 1.3);
    }

    #[test]
    fn lut_is_recompiled_only_when_curves_change() {
        let mut session = GradingSession::new(MediaKind::Image);
        session.select_preset(preset("mono_classic"));
        let first = session.snapshot();

        session.set_override(Control::Brightness, 0.2);
        session.set_media_kind(MediaKind::Video);
        let second = session.snapshot();
        assert_eq!(first.curve_revision, second.curve_revision);
        assert!(Arc::ptr_eq(
            first.curves.as_ref().unwrap(),
            second.curves.as_ref().unwrap()
        ));
        assert!(second.revision > first.revision);

        // Re-selecting the same preset keeps the compiled table.
        session.select_preset(preset("mono_classic"));
        assert_eq!(session.snapshot().curve_revision, first.curve_revision);

        session.select_preset(preset("gold_rush"));
        let third = session.snapshot();
        assert_ne!(third.curve_revision, first.curve_revision);
        assert_ne!(third.curves.unwrap().as_bytes(), first.curves.unwrap().as_bytes());
    }

    #[test]
    fn clearing_preset_releases_lut() {
        let mut session = GradingSession::new(MediaKind::Image);
        session.select_preset(preset("vintage_fade"));
        assert!(session.snapshot().curves.is_some());
        session.clear_preset();
        let snap = session.snapshot();
        assert!(snap.plan.is_passthrough());
        assert!(snap.curves.is_none());
    }

    #[test]
    fn media_kind_changes_default_color_space() {
        let mut session = GradingSession::new(MediaKind::Image);
        session.select_preset(preset("sunny_day"));
        assert_eq!(session.snapshot().plan.state().unwrap().color_space, ColorSpace::Srgb);
        session.set_media_kind(MediaKind::Video);
        assert_eq!(session.snapshot().plan.state().unwrap().color_space, ColorSpace::Rec709);
    }

    #[test]
    fn color_balance_channel_seeds_from_preset() {
        let mut session = GradingSession::new(MediaKind::Image);
        session.select_preset(preset("gold_rush"));
        session.set_color_balance_channel(2, 0.0);
        let state = *session.snapshot().plan.state().unwrap();
        assert_eq!(state.color_balance, [0.35, 0.15, 0.0]);

        session.set_color_balance_channel(0, -0.1);
        let state = *session.snapshot().plan.state().unwrap();
        assert_eq!(state.color_balance, [-0.1, 0.15, 0.0]);
    }

    #[test]
    fn out_of_range_channel_is_ignored() {
        let mut session = GradingSession::new(MediaKind::Image);
        session.select_preset(preset("gold_rush"));
        let before = session.revision();
        session.set_color_balance_channel(3, 1.0);
        assert_eq!(session.revision(), before);
        assert!(!session.overrides().is_set(Control::ColorBalance));
    }

    #[test]
    fn reset_to_preset_seeds_every_control() {
        let mut session = GradingSession::new(MediaKind::Image);
        session.select_preset(preset("warm_portrait"));
        let before = session.snapshot().plan;
        session.reset_to_preset();
        assert!(Control::ALL.iter().all(|&c| session.overrides().is_set(c)));
        assert_eq!(session.snapshot().plan, before);
    }
}

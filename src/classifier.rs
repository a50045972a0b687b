//! Signals to expression labels.
//!
//! Two modes:
//! - **Threshold mode** for blendshape-sourced signals, which live in stable
//!   model-native units, so fixed thresholds work.
//! - **Adaptive mode** for landmark-sourced signals, whose scale varies per
//!   face and camera; thresholds are placed inside the range observed so far
//!   this session.
//!
//! Both evaluate in the same order: scream, smile, squint, else neutral.

use serde::{Deserialize, Serialize};

use crate::types::{Blendshapes, ExpressionLabel, ExpressionSignals};

/// Fixed thresholds for threshold mode.
///
/// A negative value flips its comparison: `mouth_open_scream = -0.2` means
/// "mouth open *below* 0.2".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub mouth_open_scream: f64,
    pub smile: f64,
    pub mouth_open_smile_max: f64,
    pub eye_open_squint: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            mouth_open_scream: 0.28,
            smile: 0.35,
            mouth_open_smile_max: 0.25,
            eye_open_squint: 0.45,
        }
    }
}

/// Fractions of the observed per-session range used by adaptive mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveConfig {
    /// Below this span on every signal, everything is NEUTRAL.
    pub min_range: f64,
    pub scream_fraction: f64,
    pub smile_fraction: f64,
    pub squint_fraction: f64,
    /// Smile and squint require the mouth below this fraction of its range.
    pub mouth_ceiling_fraction: f64,
    /// Dead zone added past the scream/smile cut and half of it below the
    /// squint cut.
    pub margin_fraction: f64,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            min_range: 0.05,
            scream_fraction: 0.70,
            smile_fraction: 0.75,
            squint_fraction: 0.40,
            mouth_ceiling_fraction: 0.60,
            margin_fraction: 0.08,
        }
    }
}

/// Empirically tuned cut-offs for the "showing teeth" smile variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToothyConfig {
    /// Mouth open beyond this fraction of its range (or scream threshold).
    pub mouth_fraction: f64,
    pub upper_lip_raise_min: f64,
    pub jaw_open_min: f64,
}

impl Default for ToothyConfig {
    fn default() -> Self {
        Self {
            mouth_fraction: 0.60,
            upper_lip_raise_min: 0.25,
            jaw_open_min: 0.15,
        }
    }
}

/// Label plus the toothy indicator computed alongside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classification {
    pub label: ExpressionLabel,
    pub toothy: bool,
}

fn exceeds(value: f64, threshold: f64) -> bool {
    if threshold < 0.0 {
        value < -threshold
    } else {
        value > threshold
    }
}

fn falls_below(value: f64, threshold: f64) -> bool {
    if threshold < 0.0 {
        value > -threshold
    } else {
        value < threshold
    }
}

/// Threshold-mode label.
pub fn label_for_thresholds(signals: &ExpressionSignals, t: &Thresholds) -> ExpressionLabel {
    if exceeds(signals.mouth_open, t.mouth_open_scream) {
        ExpressionLabel::Scream
    } else if exceeds(signals.smile, t.smile) && falls_below(signals.mouth_open, t.mouth_open_smile_max) {
        ExpressionLabel::Smile
    } else if falls_below(signals.eye_open, t.eye_open_squint) {
        ExpressionLabel::Squint
    } else {
        ExpressionLabel::Neutral
    }
}

fn is_toothy(mouth_open: f64, mouth_cutoff: f64, blendshapes: Option<&Blendshapes>, cfg: &ToothyConfig) -> bool {
    if mouth_open > mouth_cutoff {
        return true;
    }
    blendshapes.is_some_and(|bs| bs.upper_lip_raise() > cfg.upper_lip_raise_min || bs.jaw_open() > cfg.jaw_open_min)
}

/// Threshold mode with the toothy indicator.
pub fn classify_thresholds(
    signals: &ExpressionSignals,
    thresholds: &Thresholds,
    blendshapes: Option<&Blendshapes>,
    toothy: &ToothyConfig,
) -> Classification {
    let cutoff = thresholds.mouth_open_scream.abs() * toothy.mouth_fraction;
    Classification {
        label: label_for_thresholds(signals, thresholds),
        toothy: is_toothy(signals.mouth_open, cutoff, blendshapes, toothy),
    }
}

/// Running min/max of one signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min: f64,
    pub max: f64,
}

impl Extent {
    fn new(value: f64) -> Self {
        Self { min: value, max: value }
    }

    fn include(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Value at `fraction` of the way from min to max.
    pub fn at(&self, fraction: f64) -> f64 {
        self.min + fraction * self.span()
    }
}

/// Per-session extremes of the landmark-sourced signals.
#[derive(Debug, Clone, Default)]
pub struct RangeTracker {
    mouth_open: Option<Extent>,
    smile: Option<Extent>,
    eye_open: Option<Extent>,
}

impl RangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker pre-seeded with known bounds.
    pub fn with_bounds(min: &ExpressionSignals, max: &ExpressionSignals) -> Self {
        let mut tracker = Self::new();
        tracker.update(min);
        tracker.update(max);
        tracker
    }

    pub fn update(&mut self, signals: &ExpressionSignals) {
        fn include(slot: &mut Option<Extent>, v: f64) {
            *slot = Some(slot.map_or(Extent::new(v), |mut extent| {
                extent.include(v);
                extent
            }));
        }
        include(&mut self.mouth_open, signals.mouth_open);
        include(&mut self.smile, signals.smile);
        include(&mut self.eye_open, signals.eye_open);
    }

    pub fn mouth_open(&self) -> Option<Extent> {
        self.mouth_open
    }

    pub fn smile(&self) -> Option<Extent> {
        self.smile
    }

    pub fn eye_open(&self) -> Option<Extent> {
        self.eye_open
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Adaptive-mode label.
    pub fn label_for(&self, signals: &ExpressionSignals, cfg: &AdaptiveConfig) -> ExpressionLabel {
        let (Some(mouth), Some(smile), Some(eye)) = (self.mouth_open, self.smile, self.eye_open) else {
            return ExpressionLabel::Neutral;
        };

        if mouth.span() < cfg.min_range && smile.span() < cfg.min_range && eye.span() < cfg.min_range {
            return ExpressionLabel::Neutral;
        }

        let scream_cut = mouth.at(cfg.scream_fraction) + cfg.margin_fraction * mouth.span();
        let smile_cut = smile.at(cfg.smile_fraction) + cfg.margin_fraction * smile.span();
        let squint_cut = eye.at(cfg.squint_fraction) - cfg.margin_fraction * eye.span() / 2.0;
        let mouth_ceiling = mouth.at(cfg.mouth_ceiling_fraction);
        let mouth_closed_enough = signals.mouth_open < mouth_ceiling;

        if signals.mouth_open > scream_cut {
            ExpressionLabel::Scream
        } else if signals.smile > smile_cut && mouth_closed_enough {
            ExpressionLabel::Smile
        } else if signals.eye_open < squint_cut && mouth_closed_enough {
            ExpressionLabel::Squint
        } else {
            ExpressionLabel::Neutral
        }
    }

    /// Adaptive mode with the toothy indicator.
    pub fn classify(
        &self,
        signals: &ExpressionSignals,
        cfg: &AdaptiveConfig,
        blendshapes: Option<&Blendshapes>,
        toothy: &ToothyConfig,
    ) -> Classification {
        let cutoff = self
            .mouth_open
            .map_or(f64::INFINITY, |m| m.at(toothy.mouth_fraction));
        Classification {
            label: self.label_for(signals, cfg),
            toothy: is_toothy(signals.mouth_open, cutoff, blendshapes, toothy),
        }
    }
}

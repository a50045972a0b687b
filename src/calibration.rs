//! Neutral-face baseline for debug readouts. Never affects classification.

use serde::Serialize;
use tracing::debug;

use crate::types::ExpressionSignals;

pub const DEFAULT_CALIBRATION_FRAMES: u32 = 15;

/// Running mean of the first `target` landmark-sourced signal vectors.
#[derive(Debug, Clone)]
pub struct Calibration {
    target: u32,
    samples: u32,
    baseline: ExpressionSignals,
    /// Set without sampling when the session runs on blendshapes.
    skipped: bool,
}

/// Calibration progress for debug output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalibrationState {
    pub calibrated: bool,
    pub samples: u32,
    pub target: u32,
    /// Current signals minus baseline, once calibrated from samples.
    pub delta: Option<ExpressionSignals>,
}

fn running_mean(old: f64, n: u32, sample: f64) -> f64 {
    (old * n as f64 + sample) / (n as f64 + 1.0)
}

impl Calibration {
    pub fn new(target: u32) -> Self {
        Self {
            target,
            samples: 0,
            baseline: ExpressionSignals::default(),
            skipped: false,
        }
    }

    /// Fold one landmark-sourced sample into the baseline. No-op once calibrated.
    pub fn push(&mut self, sample: &ExpressionSignals) {
        if self.is_calibrated() {
            return;
        }
        let n = self.samples;
        let b = &mut self.baseline;
        b.face_width_ref = running_mean(b.face_width_ref, n, sample.face_width_ref);
        b.mouth_open = running_mean(b.mouth_open, n, sample.mouth_open);
        b.smile = running_mean(b.smile, n, sample.smile);
        b.eye_open = running_mean(b.eye_open, n, sample.eye_open);
        self.samples += 1;

        if self.samples == self.target {
            debug!(samples = self.samples, baseline = ?self.baseline, "calibration complete");
        }
    }

    /// Blendshape sessions need no baseline.
    pub fn mark_calibrated(&mut self) {
        self.skipped = true;
    }

    pub fn is_calibrated(&self) -> bool {
        self.skipped || self.samples >= self.target
    }

    pub fn samples(&self) -> u32 {
        self.samples
    }

    /// Baseline once enough samples have accrued.
    pub fn baseline(&self) -> Option<&ExpressionSignals> {
        (self.samples >= self.target).then_some(&self.baseline)
    }

    pub fn state(&self, current: &ExpressionSignals) -> CalibrationState {
        CalibrationState {
            calibrated: self.is_calibrated(),
            samples: self.samples,
            target: self.target,
            delta: self.baseline().map(|b| current.delta(b)),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.target);
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::new(DEFAULT_CALIBRATION_FRAMES)
    }
}

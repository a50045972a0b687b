//! Debounce over the per-frame label stream.

use tracing::debug;

use crate::types::ExpressionLabel;

pub const DEFAULT_STABLE_FRAMES: u32 = 5;
pub const DEFAULT_COOLDOWN_MS: f64 = 600.0;

/// Accepts a new label only after it has repeated for `stable_frames`
/// consecutive updates and at least `cooldown_ms` has passed since the
/// previous switch.
#[derive(Debug, Clone)]
pub struct LabelStabilizer {
    stable_frames: u32,
    cooldown_ms: f64,
    current: ExpressionLabel,
    pending: Option<ExpressionLabel>,
    pending_frames: u32,
    /// `None` until the first committed switch.
    last_switch_at: Option<f64>,
}

impl LabelStabilizer {
    pub fn new(stable_frames: u32, cooldown_ms: f64) -> Self {
        Self {
            stable_frames,
            cooldown_ms,
            current: ExpressionLabel::Neutral,
            pending: None,
            pending_frames: 0,
            last_switch_at: None,
        }
    }

    pub fn update(&mut self, label: ExpressionLabel, now_ms: f64) -> ExpressionLabel {
        if label == self.current {
            self.pending = None;
            self.pending_frames = 0;
            return self.current;
        }

        if self.pending != Some(label) {
            self.pending = Some(label);
            self.pending_frames = 1;
            return self.current;
        }

        self.pending_frames += 1;
        let cooled = self
            .last_switch_at
            .map_or(true, |at| now_ms - at >= self.cooldown_ms);

        if self.pending_frames >= self.stable_frames && cooled {
            debug!(from = %self.current, to = %label, frames = self.pending_frames, "label switch");
            self.current = label;
            self.pending = None;
            self.pending_frames = 0;
            self.last_switch_at = Some(now_ms);
        }

        self.current
    }

    pub fn current(&self) -> ExpressionLabel {
        self.current
    }

    pub fn pending(&self) -> Option<ExpressionLabel> {
        self.pending
    }

    /// Back to the initial NEUTRAL state with no switch history.
    pub fn reset(&mut self) {
        self.current = ExpressionLabel::Neutral;
        self.pending = None;
        self.pending_frames = 0;
        self.last_switch_at = None;
    }
}

impl Default for LabelStabilizer {
    fn default() -> Self {
        Self::new(DEFAULT_STABLE_FRAMES, DEFAULT_COOLDOWN_MS)
    }
}

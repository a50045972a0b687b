//! Everything the pipeline mutates between cycles, in one place.

use crate::calibration::Calibration;
use crate::classifier::RangeTracker;
use crate::config::Config;
use crate::presence::{PresenceGate, StreamWatchdog};
use crate::smoothing::SignalSmoother;
use crate::source::SourceKind;
use crate::stabilizer::LabelStabilizer;
use crate::tongue::TongueHold;

/// Per-session state, owned by [`ReactionPipeline`](crate::ReactionPipeline).
///
/// A restart replaces the whole struct so no extremes, baseline or timers
/// survive into the next session.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Geometry and blendshape signals live on different scales, so each
    /// source keeps its own smoothing history.
    pub landmark_smoother: SignalSmoother,
    pub blendshape_smoother: SignalSmoother,
    pub stabilizer: LabelStabilizer,
    /// Observed extremes for adaptive classification.
    pub ranges: RangeTracker,
    pub calibration: Calibration,
    pub tongue_hold: TongueHold,
    pub presence: PresenceGate,
    pub watchdog: StreamWatchdog,
    /// Asset key shown after the last cycle.
    pub last_key: String,
}

impl SessionState {
    pub fn new(config: &Config) -> Self {
        Self {
            landmark_smoother: SignalSmoother::new(config.smoothing.alpha),
            blendshape_smoother: SignalSmoother::new(config.smoothing.alpha),
            stabilizer: LabelStabilizer::new(
                config.stabilizer.stable_frames,
                config.stabilizer.cooldown_ms,
            ),
            ranges: RangeTracker::new(),
            calibration: Calibration::new(config.calibration.frames),
            tongue_hold: TongueHold::new(config.tongue.hold_ms, config.tongue.min_mouth_open),
            presence: PresenceGate::new(config.presence.hold_ms),
            watchdog: StreamWatchdog::new(config.presence.stall_ms),
            last_key: config.assets.neutral().to_string(),
        }
    }

    pub fn smoother_for(&mut self, kind: SourceKind) -> &mut SignalSmoother {
        match kind {
            SourceKind::Landmarks => &mut self.landmark_smoother,
            SourceKind::Blendshapes => &mut self.blendshape_smoother,
        }
    }

    /// Face gone: drop the committed label and show the neutral asset.
    ///
    /// Extremes and calibration are kept; they only go away on restart.
    pub fn clear_for_absence(&mut self, neutral_key: &str) {
        self.stabilizer.reset();
        self.tongue_hold.reset();
        self.last_key = neutral_key.to_string();
    }
}

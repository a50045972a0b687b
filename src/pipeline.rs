//! Per-cycle driver: one detection result in, one asset key out.
//!
//! Order of work for a cycle:
//!
//! 1. Stream check and presence gating. An absent face clears the
//!    stabilizer and shows the neutral asset.
//! 2. Source selection between geometry and blendshape signals.
//! 3. EMA smoothing of the chosen vector.
//! 4. Calibration and range update (geometry) or skip (blendshapes).
//! 5. Adaptive (geometry) or threshold (blendshapes) classification.
//! 6. Tongue override.
//! 7. Stabilizer, then the asset map with the grin override.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::calibration::CalibrationState;
use crate::classifier::{classify_thresholds, Classification};
use crate::config::Config;
use crate::frame::FrameAccess;
use crate::landmarks::signals_from_landmarks;
use crate::presence::Presence;
use crate::session::SessionState;
use crate::source::{select_source, SignalSource, SourceKind};
use crate::tongue::{red_fraction, tongue_from_blendshapes};
use crate::types::{CaptureStatus, DetectionResult, ExpressionLabel, ExpressionSignals, Landmarks};

/// Lifecycle of a pipeline as seen by a UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    /// No usable frame processed yet.
    #[default]
    Loading,
    Running,
    Stopped,
}

/// Structured snapshot of one cycle for a debug overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugRecord {
    pub presence: Presence,
    pub source: Option<SourceKind>,
    /// Smoothed signals the classifier saw.
    pub signals: Option<ExpressionSignals>,
    pub landmark_signals: Option<ExpressionSignals>,
    pub calibration: Option<CalibrationState>,
    pub blendshapes: BTreeMap<&'static str, f64>,
    pub tongue_confidence: Option<f64>,
    pub tongue_hold: bool,
    pub raw_label: Option<ExpressionLabel>,
    pub stable_label: ExpressionLabel,
    pub toothy: bool,
}

impl DebugRecord {
    /// Record for a cycle that ran no classification.
    fn idle(presence: Presence, stable_label: ExpressionLabel) -> Self {
        Self {
            presence,
            source: None,
            signals: None,
            landmark_signals: None,
            calibration: None,
            blendshapes: BTreeMap::new(),
            tongue_confidence: None,
            tongue_hold: false,
            raw_label: None,
            stable_label,
            toothy: false,
        }
    }
}

/// What a cycle hands to the display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameOutput {
    pub timestamp_ms: f64,
    /// Asset key to display.
    pub key: String,
    /// Stabilized label.
    pub label: ExpressionLabel,
    pub presence: Presence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<DebugRecord>,
}

/// Owns the config and the session state; everything runs inside
/// [`process`](Self::process).
#[derive(Debug, Clone)]
pub struct ReactionPipeline {
    config: Config,
    session: SessionState,
    status: PipelineStatus,
}

impl ReactionPipeline {
    pub fn new(config: Config) -> Self {
        let session = SessionState::new(&config);
        Self {
            config,
            session,
            status: PipelineStatus::Loading,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn status(&self) -> PipelineStatus {
        self.status
    }

    /// Key shown after the most recent cycle.
    pub fn current_key(&self) -> &str {
        &self.session.last_key
    }

    pub fn set_stopped(&mut self) {
        if self.status != PipelineStatus::Stopped {
            info!("pipeline stopped");
        }
        self.status = PipelineStatus::Stopped;
    }

    /// Fresh session for a reacquired capture device.
    pub fn reset_session(&mut self) {
        debug!("session reset");
        self.session = SessionState::new(&self.config);
        self.status = PipelineStatus::Loading;
    }

    /// Run one detection cycle. Never fails; bad input reads as no face.
    pub fn process(
        &mut self,
        now_ms: f64,
        capture: &CaptureStatus,
        detection: &DetectionResult,
        frame: Option<&dyn FrameAccess>,
    ) -> FrameOutput {
        let usable = self.session.watchdog.stream_usable(now_ms, capture);
        if usable && self.status != PipelineStatus::Running {
            info!(now_ms, "pipeline running");
            self.status = PipelineStatus::Running;
        }

        let face = if usable { detection.face() } else { None };
        let presence = if usable {
            self.session.presence.update(now_ms, face.is_some())
        } else {
            self.session.presence.force_absent()
        };

        if presence == Presence::Absent {
            self.session.clear_for_absence(self.config.assets.neutral());
            return self.output(now_ms, presence, Some(DebugRecord::idle(presence, ExpressionLabel::Neutral)));
        }

        let Some(landmarks) = face else {
            // Dropout inside the hold window: keep showing what we had.
            let stable = self.session.stabilizer.current();
            return self.output(now_ms, presence, Some(DebugRecord::idle(presence, stable)));
        };

        let record = self.classify(now_ms, landmarks, detection, frame);
        self.output(now_ms, presence, Some(record))
    }

    fn classify(
        &mut self,
        now_ms: f64,
        landmarks: &Landmarks,
        detection: &DetectionResult,
        frame: Option<&dyn FrameAccess>,
    ) -> DebugRecord {
        let cfg = &self.config;
        let session = &mut self.session;

        let landmark_signals = signals_from_landmarks(landmarks);
        let blendshapes = detection.blendshapes.as_ref().filter(|bs| !bs.is_empty());
        let source = select_source(landmark_signals, blendshapes, cfg.source.min_blend_strength);

        let smoothed = ExpressionSignals::from_map(
            &session
                .smoother_for(source.kind())
                .update(&source.signals().to_map()),
        );
        let source = source.with_signals(smoothed);

        let Classification { label, toothy } = match source {
            SignalSource::Landmarks(signals) => {
                session.calibration.push(&signals);
                session.ranges.update(&signals);
                session
                    .ranges
                    .classify(&signals, &cfg.adaptive, blendshapes, &cfg.toothy)
            }
            SignalSource::Blendshapes(signals) => {
                session.calibration.mark_calibrated();
                classify_thresholds(&signals, &cfg.thresholds, blendshapes, &cfg.toothy)
            }
        };

        let mut raw_label = label;
        let mut tongue_confidence = None;
        let mut tongue_hold = false;
        if cfg.tongue.enabled {
            let from_blendshapes =
                blendshapes.is_some_and(|bs| tongue_from_blendshapes(bs, label, &cfg.tongue));
            tongue_confidence = frame.and_then(|f| red_fraction(f, landmarks));
            let from_color = tongue_confidence.is_some_and(|c| c >= cfg.tongue.color_min_fraction);
            if from_blendshapes || from_color {
                session.tongue_hold.arm(now_ms);
            }
            tongue_hold = session
                .tongue_hold
                .is_active(now_ms, landmark_signals.mouth_open);
            if tongue_hold {
                raw_label = ExpressionLabel::Freaky;
            }
        }

        let stable = session.stabilizer.update(raw_label, now_ms);
        session.last_key = cfg.assets.reaction_for(stable, toothy).to_string();

        DebugRecord {
            presence: Presence::Present,
            source: Some(source.kind()),
            signals: Some(smoothed),
            landmark_signals: Some(landmark_signals),
            calibration: Some(session.calibration.state(&smoothed)),
            blendshapes: blendshapes
                .map(|bs| bs.tracked_scores().into_iter().collect())
                .unwrap_or_default(),
            tongue_confidence,
            tongue_hold,
            raw_label: Some(raw_label),
            stable_label: stable,
            toothy,
        }
    }

    fn output(&self, now_ms: f64, presence: Presence, record: Option<DebugRecord>) -> FrameOutput {
        FrameOutput {
            timestamp_ms: now_ms,
            key: self.session.last_key.clone(),
            label: self.session.stabilizer.current(),
            presence,
            debug: record.filter(|_| self.config.debug),
        }
    }
}

impl Default for ReactionPipeline {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blendshapes::categories::*;
    use crate::types::{Blendshapes, Point};

    fn flat_face() -> Landmarks {
        Landmarks::new(vec![Point::new(0.5, 0.5); 468])
    }

    fn detected(blendshapes: Option<Blendshapes>) -> DetectionResult {
        DetectionResult {
            landmarks: Some(flat_face()),
            blendshapes,
        }
    }

    #[test]
    fn first_usable_cycle_starts_running() {
        let mut pipeline = ReactionPipeline::default();
        assert_eq!(pipeline.status(), PipelineStatus::Loading);

        let not_ready = CaptureStatus {
            ready: false,
            ..CaptureStatus::live(0.0)
        };
        pipeline.process(0.0, &not_ready, &DetectionResult::empty(), None);
        assert_eq!(pipeline.status(), PipelineStatus::Loading);

        pipeline.process(80.0, &CaptureStatus::live(80.0), &DetectionResult::empty(), None);
        assert_eq!(pipeline.status(), PipelineStatus::Running);

        pipeline.set_stopped();
        assert_eq!(pipeline.status(), PipelineStatus::Stopped);

        // driven again after a stop
        pipeline.process(160.0, &CaptureStatus::live(160.0), &DetectionResult::empty(), None);
        assert_eq!(pipeline.status(), PipelineStatus::Running);
    }

    #[test]
    fn no_face_shows_neutral() {
        let mut pipeline = ReactionPipeline::default();
        let out = pipeline.process(0.0, &CaptureStatus::live(0.0), &DetectionResult::empty(), None);
        assert_eq!(out.key, "neutral");
        assert_eq!(out.presence, Presence::Absent);
        assert!(out.debug.is_none());
    }

    #[test]
    fn debug_record_only_when_enabled() {
        let config = Config {
            debug: true,
            ..Config::default()
        };
        let mut pipeline = ReactionPipeline::new(config);
        let bs: Blendshapes = [(JAW_OPEN, 0.4)].into_iter().collect();
        let out = pipeline.process(0.0, &CaptureStatus::live(0.0), &detected(Some(bs)), None);

        let record = out.debug.unwrap();
        assert_eq!(record.source, Some(SourceKind::Blendshapes));
        assert_eq!(record.raw_label, Some(ExpressionLabel::Scream));
        assert!((record.blendshapes[JAW_OPEN] - 0.4).abs() < 1e-12);
        // blendshape sessions need no baseline
        assert!(record.calibration.unwrap().calibrated);
    }

    #[test]
    fn weak_blendshapes_fall_back_to_geometry() {
        let config = Config {
            debug: true,
            ..Config::default()
        };
        let mut pipeline = ReactionPipeline::new(config);
        let bs: Blendshapes = [(JAW_OPEN, 0.05)].into_iter().collect();
        let out = pipeline.process(0.0, &CaptureStatus::live(0.0), &detected(Some(bs)), None);

        let record = out.debug.unwrap();
        assert_eq!(record.source, Some(SourceKind::Landmarks));
        assert_eq!(pipeline.session().calibration.samples(), 1);
        // a single sample has no range yet
        assert_eq!(record.raw_label, Some(ExpressionLabel::Neutral));
    }

    #[test]
    fn reset_session_forgets_everything() {
        let mut pipeline = ReactionPipeline::default();
        for i in 0..3 {
            let t = i as f64 * 80.0;
            pipeline.process(t, &CaptureStatus::live(t), &detected(None), None);
        }
        assert_eq!(pipeline.session().calibration.samples(), 3);
        assert!(pipeline.session().ranges.mouth_open().is_some());

        pipeline.reset_session();
        assert_eq!(pipeline.status(), PipelineStatus::Loading);
        assert_eq!(pipeline.session().calibration.samples(), 0);
        assert!(pipeline.session().ranges.mouth_open().is_none());
        assert_eq!(pipeline.session().presence.state(), Presence::Absent);
    }
}

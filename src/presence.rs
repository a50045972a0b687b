//! Face-presence gating.
//!
//! A face stays PRESENT through short detection dropouts and only goes
//! ABSENT after `hold_ms` without a detection, or immediately when the
//! capture stream itself is unusable.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::types::CaptureStatus;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    /// Detection gap tolerated before a face counts as gone.
    pub hold_ms: f64,
    /// Video time frozen for longer than this means a stalled stream.
    pub stall_ms: f64,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            hold_ms: 500.0,
            stall_ms: 600.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Presence {
    #[default]
    Absent,
    Present,
}

#[derive(Debug, Clone)]
pub struct PresenceGate {
    hold_ms: f64,
    state: Presence,
    last_detected_at: Option<f64>,
}

impl PresenceGate {
    pub fn new(hold_ms: f64) -> Self {
        Self {
            hold_ms,
            state: Presence::Absent,
            last_detected_at: None,
        }
    }

    /// Feed one cycle's detection outcome.
    pub fn update(&mut self, now_ms: f64, face_detected: bool) -> Presence {
        if face_detected {
            self.last_detected_at = Some(now_ms);
            if self.state == Presence::Absent {
                debug!(now_ms, "face present");
            }
            self.state = Presence::Present;
        } else if self.state == Presence::Present {
            let gone = self
                .last_detected_at
                .map_or(true, |at| now_ms - at > self.hold_ms);
            if gone {
                debug!(now_ms, "face absent");
                self.state = Presence::Absent;
            }
        }
        self.state
    }

    /// Absent regardless of detections (stream not usable).
    pub fn force_absent(&mut self) -> Presence {
        self.state = Presence::Absent;
        self.last_detected_at = None;
        self.state
    }

    pub fn state(&self) -> Presence {
        self.state
    }

    pub fn reset(&mut self) {
        self.force_absent();
    }
}

impl Default for PresenceGate {
    fn default() -> Self {
        Self::new(PresenceConfig::default().hold_ms)
    }
}

/// Detects a video whose playback time has stopped advancing.
#[derive(Debug, Clone)]
pub struct StreamWatchdog {
    stall_ms: f64,
    last_video_time: Option<f64>,
    last_advance_at: f64,
}

impl StreamWatchdog {
    pub fn new(stall_ms: f64) -> Self {
        Self {
            stall_ms,
            last_video_time: None,
            last_advance_at: 0.0,
        }
    }

    /// Record the capture's video time; true when it has been frozen too long.
    pub fn observe(&mut self, now_ms: f64, video_time_ms: f64) -> bool {
        if self.last_video_time != Some(video_time_ms) {
            self.last_video_time = Some(video_time_ms);
            self.last_advance_at = now_ms;
            return false;
        }
        now_ms - self.last_advance_at > self.stall_ms
    }

    /// Whether the capture can feed detection at all this cycle.
    pub fn stream_usable(&mut self, now_ms: f64, capture: &CaptureStatus) -> bool {
        if !capture.ready || !capture.track_live {
            // stall timing restarts once the stream comes back
            self.reset();
            return false;
        }
        let stalled = self.observe(now_ms, capture.video_time_ms);
        if stalled {
            warn!(now_ms, video_time_ms = capture.video_time_ms, "video stream stalled");
        }
        !stalled
    }

    pub fn reset(&mut self) {
        self.last_video_time = None;
        self.last_advance_at = 0.0;
    }
}

impl Default for StreamWatchdog {
    fn default() -> Self {
        Self::new(PresenceConfig::default().stall_ms)
    }
}

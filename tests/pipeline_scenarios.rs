//! End-to-end sequences through the public pipeline API.

mod common;

use common::{detection, face, open_face, relaxed_face, STEP_MS};
use meme_face::{
    categories::*, CaptureStatus, Config, DetectionResult, ExpressionLabel, FrameAccess, FrameOutput,
    Presence, ReactionPipeline, RgbFrame, SourceKind,
};

/// Drives a pipeline on a fixed clock with a live, advancing stream.
struct Replay {
    pipeline: ReactionPipeline,
    t: f64,
}

impl Replay {
    fn new(config: Config) -> Self {
        Self {
            pipeline: ReactionPipeline::new(config),
            t: 0.0,
        }
    }

    fn step_with(&mut self, capture: CaptureStatus, det: &DetectionResult, frame: Option<&RgbFrame>) -> FrameOutput {
        let out = self
            .pipeline
            .process(self.t, &capture, det, frame.map(|f| f as &dyn FrameAccess));
        self.t += STEP_MS;
        out
    }

    fn step(&mut self, det: &DetectionResult) -> FrameOutput {
        let capture = CaptureStatus::live(self.t);
        self.step_with(capture, det, None)
    }

    fn run(&mut self, det: &DetectionResult, frames: usize) -> FrameOutput {
        let mut last = None;
        for _ in 0..frames {
            last = Some(self.step(det));
        }
        last.expect("at least one frame")
    }
}

#[test]
fn wide_open_mouth_blendshapes_show_scream() {
    let mut replay = Replay::new(Config::default());
    let scream = detection(relaxed_face(), &[(JAW_OPEN, 0.4)]);

    let keys: Vec<String> = (0..6).map(|_| replay.step(&scream).key).collect();
    assert_eq!(keys[..4], ["neutral", "neutral", "neutral", "neutral"]);
    assert_eq!(keys[4], "scream");
    assert_eq!(keys[5], "scream");
}

#[test]
fn short_dropout_keeps_reaction_long_gap_clears_it() {
    let mut replay = Replay::new(Config::default());
    let scream = detection(relaxed_face(), &[(JAW_OPEN, 0.4)]);
    replay.run(&scream, 6); // last face at t=400

    // 80..480ms without a face: inside the 500ms hold
    for _ in 0..6 {
        let out = replay.step(&DetectionResult::empty());
        assert_eq!(out.presence, Presence::Present);
        assert_eq!(out.key, "scream");
    }

    // t=960: 560ms since the last face
    let out = replay.step(&DetectionResult::empty());
    assert_eq!(out.presence, Presence::Absent);
    assert_eq!(out.key, "neutral");
    assert_eq!(out.label, ExpressionLabel::Neutral);

    // the stabilizer starts over when the face returns
    let keys: Vec<String> = (0..5).map(|_| replay.step(&scream).key).collect();
    assert_eq!(keys[3], "neutral");
    assert_eq!(keys[4], "scream");
}

#[test]
fn stalled_video_forces_absent() {
    let mut replay = Replay::new(Config::default());
    let scream = detection(relaxed_face(), &[(JAW_OPEN, 0.4)]);

    let frozen = CaptureStatus::live(0.0);
    let mut keys = Vec::new();
    for _ in 0..9 {
        keys.push(replay.step_with(frozen, &scream, None).key);
    }
    // committed at t=320, stream declared stalled once frozen for >600ms
    assert_eq!(keys[4], "scream");
    assert_eq!(keys[7], "scream");
    assert_eq!(keys[8], "neutral");
}

#[test]
fn dead_track_forces_absent_immediately() {
    let mut replay = Replay::new(Config::default());
    let scream = detection(relaxed_face(), &[(JAW_OPEN, 0.4)]);
    assert_eq!(replay.run(&scream, 5).key, "scream");

    let dead = CaptureStatus {
        track_live: false,
        ..CaptureStatus::live(replay.t)
    };
    let out = replay.step_with(dead, &scream, None);
    assert_eq!(out.presence, Presence::Absent);
    assert_eq!(out.key, "neutral");
}

#[test]
fn toothy_smile_becomes_grin() {
    let mut replay = Replay::new(Config::default());
    let toothy = detection(
        relaxed_face(),
        &[(MOUTH_SMILE_LEFT, 0.7), (MOUTH_SMILE_RIGHT, 0.7), (JAW_OPEN, 0.2)],
    );
    let out = replay.run(&toothy, 5);
    assert_eq!(out.label, ExpressionLabel::Smile);
    assert_eq!(out.key, "grin");

    let mut replay = Replay::new(Config::default());
    let closed = detection(
        relaxed_face(),
        &[(MOUTH_SMILE_LEFT, 0.7), (MOUTH_SMILE_RIGHT, 0.7), (JAW_OPEN, 0.05)],
    );
    let out = replay.run(&closed, 5);
    assert_eq!(out.label, ExpressionLabel::Smile);
    assert_eq!(out.key, "smile");
}

#[test]
fn tongue_hold_outlasts_detection_then_releases() {
    let mut replay = Replay::new(Config::default());
    let tongue = detection(open_face(), &[(JAW_OPEN, 0.4), (TONGUE_OUT, 0.5)]);
    let jaw_only = detection(open_face(), &[(JAW_OPEN, 0.4)]);

    // last positive detection at t=320
    assert_eq!(replay.run(&tongue, 5).key, "freaky");

    // hold covers t=400..960 (under 700ms since 320)
    let out = replay.run(&jaw_only, 8);
    assert_eq!(replay.t - STEP_MS, 960.0);
    assert_eq!(out.key, "freaky");

    // released at t=1040, scream commits five frames later
    let keys: Vec<String> = (0..5).map(|_| replay.step(&jaw_only).key).collect();
    assert_eq!(keys[3], "freaky");
    assert_eq!(keys[4], "scream");
}

#[test]
fn tongue_hold_needs_open_mouth() {
    let mut replay = Replay::new(Config::default());
    // geometry says the mouth is shut (mouth-open ~0.03 < 0.08)
    let shut = detection(relaxed_face(), &[(JAW_OPEN, 0.4), (TONGUE_OUT, 0.5)]);
    assert_eq!(replay.run(&shut, 6).key, "scream");
}

#[test]
fn disabled_tongue_never_freaky() {
    let mut config = Config::default();
    config.tongue.enabled = false;
    let mut replay = Replay::new(config);
    let tongue = detection(open_face(), &[(JAW_OPEN, 0.4), (TONGUE_OUT, 0.5)]);
    assert_eq!(replay.run(&tongue, 6).key, "scream");
}

#[test]
fn red_mouth_crop_triggers_tongue() {
    let config = Config {
        debug: true,
        ..Config::default()
    };
    let mut replay = Replay::new(config);
    let red = RgbFrame::from_fn(100, 100, |_, _| [210, 50, 60]);
    let geometry_only = detection(open_face(), &[]);

    let mut out = None;
    for _ in 0..5 {
        let capture = CaptureStatus::live(replay.t);
        out = Some(replay.step_with(capture, &geometry_only, Some(&red)));
    }
    let out = out.unwrap();
    assert_eq!(out.key, "freaky");

    let record = out.debug.unwrap();
    assert_eq!(record.source, Some(SourceKind::Landmarks));
    assert_eq!(record.tongue_confidence, Some(1.0));
    assert!(record.tongue_hold);
}

#[test]
fn geometry_ranges_adapt_to_the_face() {
    let config = Config {
        debug: true,
        ..Config::default()
    };
    let mut replay = Replay::new(config);
    let closed = detection(relaxed_face(), &[]);
    let wide = detection(face(0.15, 0.2, 0.03), &[]);

    let out = replay.run(&closed, 10);
    assert_eq!(out.key, "neutral");
    // no dynamic range yet
    assert_eq!(out.debug.unwrap().raw_label, Some(ExpressionLabel::Neutral));

    let out = replay.run(&wide, 20);
    assert_eq!(out.key, "scream");
    let record = out.debug.unwrap();
    assert_eq!(record.source, Some(SourceKind::Landmarks));
    let calibration = record.calibration.unwrap();
    assert!(calibration.calibrated);
    assert!(calibration.delta.unwrap().mouth_open > 0.3);

    let out = replay.run(&closed, 20);
    assert_eq!(out.key, "neutral");
}

#[test]
fn restart_starts_a_clean_session() {
    let mut replay = Replay::new(Config::default());
    let closed = detection(relaxed_face(), &[]);
    let wide = detection(face(0.15, 0.2, 0.03), &[]);
    replay.run(&closed, 5);
    replay.run(&wide, 10);
    assert!(replay.pipeline.session().ranges.mouth_open().unwrap().span() > 0.3);

    replay.pipeline.reset_session();
    assert!(replay.pipeline.session().ranges.mouth_open().is_none());
    assert_eq!(replay.pipeline.current_key(), "neutral");

    // a single wide frame has no range to be judged against
    let out = replay.step(&wide);
    assert_eq!(out.key, "neutral");
}

#[test]
fn switching_to_geometry_does_not_inherit_blendshape_history() {
    let mut replay = Replay::new(Config::default());
    let scream = detection(relaxed_face(), &[(JAW_OPEN, 0.4)]);
    let closed = detection(relaxed_face(), &[]);

    replay.run(&scream, 3);
    assert!(replay.pipeline.session().ranges.mouth_open().is_none());

    replay.run(&closed, 3);
    // only the closed mouth's geometry was ever tracked
    let extent = replay.pipeline.session().ranges.mouth_open().unwrap();
    assert!(extent.max < 0.05, "{extent:?}");
    assert!(extent.min > 0.02, "{extent:?}");
}

#[test]
fn custom_asset_keys() {
    let mut config = Config::default();
    config.assets.scream = "aaaa.gif".into();
    config.assets.neutral = "idle.gif".into();
    let mut replay = Replay::new(config);

    assert_eq!(replay.step(&DetectionResult::empty()).key, "idle.gif");
    let scream = detection(relaxed_face(), &[(JAW_OPEN, 0.4)]);
    assert_eq!(replay.run(&scream, 5).key, "aaaa.gif");
}

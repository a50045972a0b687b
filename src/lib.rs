//! # meme-face
//!
//! Webcam facial expression signals, debounced classification and reaction
//! selection.
//!
//! This crate provides:
//! - **Signal extraction**: mouth-open, smile and eye-open from a 468-point
//!   face mesh or from model blendshape scores
//! - **Source selection**: blendshapes when they carry signal, geometry otherwise
//! - **Classification**: fixed thresholds for blendshapes, per-session
//!   adaptive ranges for geometry, plus a tongue-out override
//! - **Stabilization**: EMA smoothing and a frame-count/cooldown debounce
//! - **Presence gating**: short dropouts are ignored, stalled streams are not
//!
//! The face model and the camera live outside the crate, behind the
//! [`FaceLandmarker`] and [`CaptureSource`] traits.
//!
//! ## Pipeline Overview
//!
//! 1. Check the stream and decide whether a face is present
//! 2. Extract signals from landmarks and blendshapes, pick one source
//! 3. Smooth, then classify into NEUTRAL / SMILE / SCREAM / SQUINT / FREAKY
//! 4. Debounce the label and map it to a reaction asset key
//!
//! ## Quick Start
//!
//! ```rust
//! use meme_face::{categories, Blendshapes, CaptureStatus, DetectionResult, Landmarks, Point, ReactionPipeline};
//!
//! let mut pipeline = ReactionPipeline::default();
//! let detection = DetectionResult {
//!     landmarks: Some(Landmarks::new(vec![Point::new(0.5, 0.5); 468])),
//!     blendshapes: Some([(categories::JAW_OPEN, 0.4)].into_iter().collect::<Blendshapes>()),
//! };
//!
//! let mut key = String::new();
//! for i in 0..6 {
//!     let t = i as f64 * 80.0;
//!     key = pipeline.process(t, &CaptureStatus::live(t), &detection, None).key;
//! }
//! assert_eq!(key, "scream");
//! ```
//!
//! ## Custom Frame Types
//!
//! Implement [`FrameAccess`] to give the tongue heuristic pixel access
//! without copying:
//!
//! ```rust
//! use meme_face::FrameAccess;
//!
//! struct MyFrame { /* ... */ }
//!
//! impl FrameAccess for MyFrame {
//!     fn pixel(&self, x: i32, y: i32) -> [u8; 3] {
//!         // Return RGB at (x, y), black when out of bounds
//!         [0, 0, 0]
//!     }
//!     fn width(&self) -> u32 { 640 }
//!     fn height(&self) -> u32 { 480 }
//! }
//! ```

pub mod blendshapes;
pub mod calibration;
pub mod classifier;
pub mod config;
mod error;
mod frame;
pub mod landmarks;
pub mod pipeline;
pub mod presence;
pub mod reaction;
pub mod runner;
pub mod session;
pub mod smoothing;
pub mod source;
pub mod stabilizer;
pub mod tongue;
mod types;

pub use blendshapes::{categories, signals_from_blendshapes};
pub use calibration::{Calibration, CalibrationState};
pub use classifier::{AdaptiveConfig, Classification, RangeTracker, Thresholds, ToothyConfig};
pub use config::Config;
pub use error::{Error, Result};
pub use frame::{FrameAccess, RgbFrame};
pub use landmarks::{mesh_indices, signals_from_landmarks};
pub use pipeline::{DebugRecord, FrameOutput, PipelineStatus, ReactionPipeline};
pub use presence::{Presence, PresenceGate, StreamWatchdog};
pub use reaction::AssetMap;
pub use runner::{CaptureSource, FaceLandmarker, RunnerHandle};
pub use session::SessionState;
pub use smoothing::{EmaSmoother, SignalSmoother};
pub use source::{select_source, SignalSource, SourceKind};
pub use stabilizer::LabelStabilizer;
pub use tongue::TongueHold;
pub use types::{
    Blendshapes, BoundingBox, CaptureStatus, DetectionResult, ExpressionLabel, ExpressionSignals,
    Landmarks, Point,
};

//! Periodic detection loop.
//!
//! One tokio task ticks at `frame_rate_hz`, pulls a frame from the
//! [`CaptureSource`], runs the [`FaceLandmarker`] on it and feeds the result
//! through the owned [`ReactionPipeline`]. Each cycle runs to completion
//! before the next tick is awaited, so the pipeline is never shared.
//!
//! ```no_run
//! # async fn demo(capture: impl meme_face::CaptureSource + 'static,
//! #               landmarker: impl meme_face::FaceLandmarker + 'static) -> meme_face::Result<()> {
//! use meme_face::{runner, ReactionPipeline};
//!
//! let handle = runner::spawn(ReactionPipeline::default(), capture, landmarker);
//! let mut outputs = handle.subscribe();
//! outputs.changed().await.ok();
//! println!("showing {}", outputs.borrow().key);
//!
//! // the returned pipeline can be handed to `spawn` again for a new session
//! let pipeline = handle.stop().await?;
//! println!("stopped on {}", pipeline.current_key());
//! # Ok(())
//! # }
//! ```

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::frame::{FrameAccess, RgbFrame};
use crate::pipeline::{FrameOutput, ReactionPipeline};
use crate::presence::Presence;
use crate::types::{CaptureStatus, DetectionResult};

/// External face model. Called at most once per cycle.
pub trait FaceLandmarker: Send {
    fn detect(&mut self, frame: Option<&RgbFrame>, timestamp_ms: f64) -> Result<DetectionResult>;
}

/// Camera or video stream the loop samples.
pub trait CaptureSource: Send {
    fn status(&self) -> CaptureStatus;

    /// Current pixels, when the stream can provide them.
    fn current_frame(&self) -> Option<RgbFrame>;
}

/// Handle to a running loop. Dropping it cancels the loop.
#[derive(Debug)]
pub struct RunnerHandle {
    token: CancellationToken,
    task: Option<JoinHandle<ReactionPipeline>>,
    outputs: watch::Receiver<FrameOutput>,
}

impl RunnerHandle {
    /// Receiver for the latest cycle output.
    pub fn subscribe(&self) -> watch::Receiver<FrameOutput> {
        self.outputs.clone()
    }

    /// Most recent output.
    pub fn latest(&self) -> FrameOutput {
        self.outputs.borrow().clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |t| t.is_finished())
    }

    /// Cancel the loop, wait for the in-flight cycle and take the pipeline
    /// back, marked stopped.
    pub async fn stop(mut self) -> Result<ReactionPipeline> {
        self.token.cancel();
        let task = self
            .task
            .take()
            .ok_or_else(|| Error::Runner("runner already stopped".into()))?;
        task.await.map_err(|e| Error::Runner(e.to_string()))
    }
}

impl Drop for RunnerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Start the detection loop on the current tokio runtime.
///
/// The pipeline's session is reset first: the loop runs on its own clock
/// starting at zero, so nothing from an earlier run may carry over.
pub fn spawn<C, L>(mut pipeline: ReactionPipeline, capture: C, landmarker: L) -> RunnerHandle
where
    C: CaptureSource + 'static,
    L: FaceLandmarker + 'static,
{
    pipeline.reset_session();
    let token = CancellationToken::new();
    let initial = FrameOutput {
        timestamp_ms: 0.0,
        key: pipeline.current_key().to_string(),
        label: pipeline.session().stabilizer.current(),
        presence: Presence::Absent,
        debug: None,
    };
    let (tx, outputs) = watch::channel(initial);
    let task = tokio::spawn(run(pipeline, capture, landmarker, tx, token.child_token()));

    RunnerHandle {
        token,
        task: Some(task),
        outputs,
    }
}

async fn run<C, L>(
    mut pipeline: ReactionPipeline,
    capture: C,
    mut landmarker: L,
    tx: watch::Sender<FrameOutput>,
    token: CancellationToken,
) -> ReactionPipeline
where
    C: CaptureSource,
    L: FaceLandmarker,
{
    let period = pipeline.config().frame_interval();
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let start = Instant::now();
    info!(period_ms = period.as_millis() as u64, "runner started");

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = interval.tick() => {}
        }

        let now_ms = start.elapsed().as_secs_f64() * 1000.0;
        let status = capture.status();
        let frame = if status.ready { capture.current_frame() } else { None };

        let detection = if status.ready {
            landmarker.detect(frame.as_ref(), now_ms).unwrap_or_else(|err| {
                warn!(%err, now_ms, "detection failed, treating as no face");
                DetectionResult::empty()
            })
        } else {
            DetectionResult::empty()
        };

        let output = pipeline.process(now_ms, &status, &detection, frame.as_ref().map(|f| f as &dyn FrameAccess));
        tx.send_replace(output);
    }

    pipeline.set_stopped();
    info!("runner stopped");
    pipeline
}

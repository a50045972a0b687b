//! Expression signals from model blendshape scores.

use crate::types::{Blendshapes, ExpressionSignals};

/// Blendshape category names read by the pipeline.
pub mod categories {
    pub const JAW_OPEN: &str = "jawOpen";
    pub const MOUTH_FUNNEL: &str = "mouthFunnel";
    pub const MOUTH_SMILE_LEFT: &str = "mouthSmileLeft";
    pub const MOUTH_SMILE_RIGHT: &str = "mouthSmileRight";
    pub const EYE_SQUINT_LEFT: &str = "eyeSquintLeft";
    pub const EYE_SQUINT_RIGHT: &str = "eyeSquintRight";
    pub const MOUTH_UPPER_UP_LEFT: &str = "mouthUpperUpLeft";
    pub const MOUTH_UPPER_UP_RIGHT: &str = "mouthUpperUpRight";
    pub const TONGUE_OUT: &str = "tongueOut";

    pub const ALL: [&str; 9] = [
        JAW_OPEN,
        MOUTH_FUNNEL,
        MOUTH_SMILE_LEFT,
        MOUTH_SMILE_RIGHT,
        EYE_SQUINT_LEFT,
        EYE_SQUINT_RIGHT,
        MOUTH_UPPER_UP_LEFT,
        MOUTH_UPPER_UP_RIGHT,
        TONGUE_OUT,
    ];
}

use categories::*;

impl Blendshapes {
    pub fn jaw_open(&self) -> f64 {
        self.score(JAW_OPEN)
    }

    pub fn mouth_funnel(&self) -> f64 {
        self.score(MOUTH_FUNNEL)
    }

    /// Mean of left and right smile.
    pub fn mouth_smile(&self) -> f64 {
        (self.score(MOUTH_SMILE_LEFT) + self.score(MOUTH_SMILE_RIGHT)) / 2.0
    }

    /// Mean of left and right squint.
    pub fn eye_squint(&self) -> f64 {
        (self.score(EYE_SQUINT_LEFT) + self.score(EYE_SQUINT_RIGHT)) / 2.0
    }

    /// Mean of left and right upper-lip raise.
    pub fn upper_lip_raise(&self) -> f64 {
        (self.score(MOUTH_UPPER_UP_LEFT) + self.score(MOUTH_UPPER_UP_RIGHT)) / 2.0
    }

    pub fn tongue_out(&self) -> f64 {
        self.score(TONGUE_OUT)
    }

    /// Raw activation used to decide whether the scores are informative:
    /// `jawOpen + mouthSmile + eyeSquint`.
    pub fn strength(&self) -> f64 {
        self.jaw_open() + self.mouth_smile() + self.eye_squint()
    }

    /// Scores of the categories the pipeline reads, for debug output.
    pub fn tracked_scores(&self) -> Vec<(&'static str, f64)> {
        categories::ALL.iter().map(|&name| (name, self.score(name))).collect()
    }
}

/// Derive normalized signals from blendshape scores.
///
/// Returns `None` when the model scored no categories this frame.
pub fn signals_from_blendshapes(blendshapes: &Blendshapes) -> Option<ExpressionSignals> {
    if blendshapes.is_empty() {
        return None;
    }

    Some(ExpressionSignals {
        face_width_ref: 1.0,
        mouth_open: (blendshapes.jaw_open() + 0.5 * blendshapes.mouth_funnel()).min(1.0),
        smile: blendshapes.mouth_smile().min(1.0),
        eye_open: (1.0 - blendshapes.eye_squint()).max(0.0),
    })
}

//! Synthetic inputs shared by the integration tests.
#![allow(dead_code)]

use meme_face::{mesh_indices::*, Blendshapes, DetectionResult, Landmarks, Point};

/// Frame spacing of a 12.5 Hz loop.
pub const STEP_MS: f64 = 80.0;

/// Front-facing mesh: eye corners 0.4 apart, nose to chin 0.3, mouth centered
/// at (0.5, 0.7).
pub fn face(mouth_gap: f64, mouth_width: f64, eye_gap: f64) -> Landmarks {
    let mut points = vec![Point::zero(); 468];
    points[LEFT_EYE_OUTER] = Point::new(0.30, 0.40);
    points[LEFT_EYE_INNER] = Point::new(0.40, 0.40);
    points[LEFT_EYE_TOP] = Point::new(0.35, 0.40 - eye_gap / 2.0);
    points[LEFT_EYE_BOTTOM] = Point::new(0.35, 0.40 + eye_gap / 2.0);
    points[RIGHT_EYE_INNER] = Point::new(0.60, 0.40);
    points[RIGHT_EYE_OUTER] = Point::new(0.70, 0.40);
    points[RIGHT_EYE_TOP] = Point::new(0.65, 0.40 - eye_gap / 2.0);
    points[RIGHT_EYE_BOTTOM] = Point::new(0.65, 0.40 + eye_gap / 2.0);
    points[NOSE_TIP] = Point::new(0.50, 0.55);
    points[CHIN] = Point::new(0.50, 0.85);
    points[MOUTH_LEFT] = Point::new(0.50 - mouth_width / 2.0, 0.70);
    points[MOUTH_RIGHT] = Point::new(0.50 + mouth_width / 2.0, 0.70);
    points[UPPER_LIP] = Point::new(0.50, 0.70 - mouth_gap / 2.0);
    points[LOWER_LIP] = Point::new(0.50, 0.70 + mouth_gap / 2.0);
    Landmarks::new(points)
}

/// Relaxed face: mouth nearly shut (mouth-open ~0.03).
pub fn relaxed_face() -> Landmarks {
    face(0.01, 0.2, 0.03)
}

/// Mouth open wide enough for the tongue hold (mouth-open 0.2).
pub fn open_face() -> Landmarks {
    face(0.06, 0.2, 0.03)
}

pub fn blendshapes(scores: &[(&str, f64)]) -> Blendshapes {
    scores.iter().map(|&(name, score)| (name, score)).collect()
}

pub fn detection(landmarks: Landmarks, scores: &[(&str, f64)]) -> DetectionResult {
    DetectionResult {
        landmarks: Some(landmarks),
        blendshapes: (!scores.is_empty()).then(|| blendshapes(scores)),
    }
}

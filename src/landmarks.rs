//! Expression signals from face-mesh geometry.
//!
//! Distances are planar and normalized against the face itself so the
//! signals do not depend on how far the user sits from the camera: mouth
//! opening against nose-to-chin height, mouth width against the outer eye
//! corner distance, eye opening against each eye's own width.

use crate::types::{ExpressionSignals, Landmarks, Point};

/// Smallest denominator used for any ratio.
pub const MIN_DISTANCE: f64 = 1e-6;

/// MediaPipe face-mesh indices read by the landmark path.
pub mod mesh_indices {
    pub const LEFT_EYE_OUTER: usize = 33;
    pub const LEFT_EYE_INNER: usize = 133;
    pub const LEFT_EYE_TOP: usize = 159;
    pub const LEFT_EYE_BOTTOM: usize = 145;

    pub const RIGHT_EYE_OUTER: usize = 263;
    pub const RIGHT_EYE_INNER: usize = 362;
    pub const RIGHT_EYE_TOP: usize = 386;
    pub const RIGHT_EYE_BOTTOM: usize = 374;

    pub const MOUTH_LEFT: usize = 61;
    pub const MOUTH_RIGHT: usize = 291;
    pub const UPPER_LIP: usize = 13;
    pub const LOWER_LIP: usize = 14;

    pub const NOSE_TIP: usize = 1;
    pub const CHIN: usize = 152;
}

use mesh_indices::*;

fn floored_distance(a: Point, b: Point) -> f64 {
    a.distance(&b).max(MIN_DISTANCE)
}

/// Derive normalized signals from a landmark mesh.
///
/// Never fails: missing points read as the origin and every denominator is
/// floored at [`MIN_DISTANCE`].
pub fn signals_from_landmarks(landmarks: &Landmarks) -> ExpressionSignals {
    let face_width_ref = floored_distance(landmarks.get(LEFT_EYE_OUTER), landmarks.get(RIGHT_EYE_OUTER));
    let face_height = floored_distance(landmarks.get(NOSE_TIP), landmarks.get(CHIN));

    let mouth_open = landmarks.get(UPPER_LIP).distance(&landmarks.get(LOWER_LIP)) / face_height;
    let smile = landmarks.get(MOUTH_LEFT).distance(&landmarks.get(MOUTH_RIGHT)) / face_width_ref;

    let left_eye = eye_openness(landmarks, LEFT_EYE_TOP, LEFT_EYE_BOTTOM, LEFT_EYE_OUTER, LEFT_EYE_INNER);
    let right_eye = eye_openness(landmarks, RIGHT_EYE_TOP, RIGHT_EYE_BOTTOM, RIGHT_EYE_OUTER, RIGHT_EYE_INNER);

    ExpressionSignals {
        face_width_ref,
        mouth_open,
        smile,
        eye_open: (left_eye + right_eye) / 2.0,
    }
}

fn eye_openness(landmarks: &Landmarks, top: usize, bottom: usize, outer: usize, inner: usize) -> f64 {
    let vertical = landmarks.get(top).distance(&landmarks.get(bottom));
    let horizontal = floored_distance(landmarks.get(outer), landmarks.get(inner));
    vertical / horizontal
}

/// Mouth outline used to locate the tongue crop: left corner, right corner,
/// upper lip, lower lip.
pub fn mouth_outline(landmarks: &Landmarks) -> [Point; 4] {
    [
        landmarks.get(MOUTH_LEFT),
        landmarks.get(MOUTH_RIGHT),
        landmarks.get(UPPER_LIP),
        landmarks.get(LOWER_LIP),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(mouth_gap: f64, mouth_width: f64, eye_gap: f64) -> Landmarks {
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

    #[test]
    fn ratios_from_geometry() {
        let s = signals_from_landmarks(&face(0.06, 0.2, 0.03));

        // eye corners 0.4 apart, nose->chin 0.3
        assert!((s.face_width_ref - 0.4).abs() < 1e-9);
        assert!((s.mouth_open - 0.2).abs() < 1e-9);
        assert!((s.smile - 0.5).abs() < 1e-9);
        // each eye 0.03 / 0.1
        assert!((s.eye_open - 0.3).abs() < 1e-9);
    }

    #[test]
    fn wider_open_mouth_increases_signal() {
        let closed = signals_from_landmarks(&face(0.01, 0.2, 0.03));
        let open = signals_from_landmarks(&face(0.12, 0.2, 0.03));
        assert!(open.mouth_open > closed.mouth_open);
        assert!((open.smile - closed.smile).abs() < 1e-12);
    }

    #[test]
    fn degenerate_mesh_does_not_blow_up() {
        let s = signals_from_landmarks(&Landmarks::new(vec![Point::new(0.5, 0.5); 3]));
        assert!(s.mouth_open.is_finite());
        assert!(s.smile.is_finite());
        assert!(s.eye_open.is_finite());
        assert_eq!(s.face_width_ref, MIN_DISTANCE);

        let empty = signals_from_landmarks(&Landmarks::default());
        assert_eq!(empty.mouth_open, 0.0);
    }
}

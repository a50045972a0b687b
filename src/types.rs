use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A landmark coordinate. `x`/`y` are normalized to [0,1] of the frame, `z` is
/// the model's relative depth and never enters a distance.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0, z: 0.0 }
    }

    /// Planar Euclidean distance.
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A bounding box defined by top-left corner, width, and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest box containing every point. `None` for an empty slice.
    pub fn enclosing(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// A box of the given size centered on `center`.
    pub fn centered(center: Point, width: f64, height: f64) -> Self {
        Self::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }

    /// Convert a point from normalized coordinates [0,1] to coordinates
    /// within this bounding box.
    pub fn denormalize_point(&self, p: Point) -> Point {
        Point::new(self.x + p.x * self.width, self.y + p.y * self.height)
    }
}

/// One face's landmark mesh, indexed by the model's fixed anatomical scheme.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Landmarks {
    pub points: Vec<Point>,
}

impl Landmarks {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn num_landmarks(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Point at `idx`, or the origin when the mesh is shorter than expected.
    pub fn get(&self, idx: usize) -> Point {
        self.points.get(idx).copied().unwrap_or_default()
    }
}

/// Named blendshape category scores for one face, each in [0,1].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Blendshapes {
    pub scores: BTreeMap<String, f64>,
}

impl Blendshapes {
    pub fn new(scores: BTreeMap<String, f64>) -> Self {
        Self { scores }
    }

    /// Score for a category; absent categories read as 0.
    pub fn score(&self, name: &str) -> f64 {
        self.scores.get(name).copied().unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for Blendshapes {
    fn from_iter<T: IntoIterator<Item = (S, f64)>>(iter: T) -> Self {
        Self {
            scores: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Normalized facial signals shared by both extraction paths.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ExpressionSignals {
    pub face_width_ref: f64,
    pub mouth_open: f64,
    pub smile: f64,
    pub eye_open: f64,
}

impl ExpressionSignals {
    pub const FACE_WIDTH_REF: &'static str = "face_width_ref";
    pub const MOUTH_OPEN: &'static str = "mouth_open";
    pub const SMILE: &'static str = "smile";
    pub const EYE_OPEN: &'static str = "eye_open";

    pub fn to_map(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            (Self::FACE_WIDTH_REF.to_string(), self.face_width_ref),
            (Self::MOUTH_OPEN.to_string(), self.mouth_open),
            (Self::SMILE.to_string(), self.smile),
            (Self::EYE_OPEN.to_string(), self.eye_open),
        ])
    }

    /// Inverse of [`to_map`](Self::to_map); missing keys read as 0.
    pub fn from_map(map: &BTreeMap<String, f64>) -> Self {
        let get = |k: &str| map.get(k).copied().unwrap_or(0.0);
        Self {
            face_width_ref: get(Self::FACE_WIDTH_REF),
            mouth_open: get(Self::MOUTH_OPEN),
            smile: get(Self::SMILE),
            eye_open: get(Self::EYE_OPEN),
        }
    }

    /// Component-wise `self - other`.
    pub fn delta(&self, other: &ExpressionSignals) -> ExpressionSignals {
        ExpressionSignals {
            face_width_ref: self.face_width_ref - other.face_width_ref,
            mouth_open: self.mouth_open - other.mouth_open,
            smile: self.smile - other.smile,
            eye_open: self.eye_open - other.eye_open,
        }
    }
}

/// Discrete expression shown for a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpressionLabel {
    #[default]
    Neutral,
    Smile,
    Scream,
    Squint,
    /// Tongue out.
    Freaky,
}

impl ExpressionLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Neutral => "NEUTRAL",
            Self::Smile => "SMILE",
            Self::Scream => "SCREAM",
            Self::Squint => "SQUINT",
            Self::Freaky => "FREAKY",
        }
    }
}

impl fmt::Display for ExpressionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the external face model produced for one cycle. At most one face.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    #[serde(default)]
    pub landmarks: Option<Landmarks>,
    #[serde(default)]
    pub blendshapes: Option<Blendshapes>,
}

impl DetectionResult {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Landmarks for the detected face, if any non-empty set was produced.
    pub fn face(&self) -> Option<&Landmarks> {
        self.landmarks.as_ref().filter(|l| !l.is_empty())
    }
}

/// Liveness of the capture stream, sampled once per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptureStatus {
    /// Video has enough data to read a current frame.
    pub ready: bool,
    /// The underlying camera track is still live.
    pub track_live: bool,
    /// Playback position of the video element in milliseconds.
    pub video_time_ms: f64,
}

impl CaptureStatus {
    pub const fn live(video_time_ms: f64) -> Self {
        Self {
            ready: true,
            track_live: true,
            video_time_ms,
        }
    }
}

//! Tongue-out heuristics and the hold timer that turns them into a label
//! override.
//!
//! Two detectors feed the hold: the model's own tongue score (plus a proxy
//! for "wide open mouth not explained by smiling"), and a colour check on a
//! crop just below the lips that counts red-dominant pixels.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::frame::FrameAccess;
use crate::landmarks::mouth_outline;
use crate::types::{Blendshapes, BoundingBox, ExpressionLabel, Landmarks, Point};

/// Tongue detection tuning. The proxy values are empirical.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TongueConfig {
    /// Produce FREAKY at all.
    pub enabled: bool,
    pub hold_ms: f64,
    /// Landmark mouth-open needed to keep the override.
    pub min_mouth_open: f64,
    pub category_min: f64,
    pub proxy_jaw_open_min: f64,
    pub proxy_funnel_min: f64,
    pub proxy_smile_max: f64,
    /// Red-pixel fraction at which the colour detector fires.
    pub color_min_fraction: f64,
}

impl Default for TongueConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            hold_ms: 700.0,
            min_mouth_open: 0.08,
            category_min: 0.2,
            proxy_jaw_open_min: 0.35,
            proxy_funnel_min: 0.01,
            proxy_smile_max: 0.45,
            color_min_fraction: 0.35,
        }
    }
}

/// Blendshape-native detector.
///
/// Fires on a direct tongue score, or when the frame was classified SCREAM
/// with the jaw wide open, lips slightly funnelled and no smile.
pub fn tongue_from_blendshapes(bs: &Blendshapes, raw_label: ExpressionLabel, cfg: &TongueConfig) -> bool {
    if bs.tongue_out() >= cfg.category_min {
        return true;
    }
    raw_label == ExpressionLabel::Scream
        && bs.jaw_open() >= cfg.proxy_jaw_open_min
        && bs.mouth_funnel() >= cfg.proxy_funnel_min
        && bs.mouth_smile() <= cfg.proxy_smile_max
}

fn is_red_dominant([r, g, b]: [u8; 3]) -> bool {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    r > 50 && r - g > 10 && r - b > 10 && (r as f64 - (g + b) as f64 / 2.0) > 8.0
}

/// Crop below the mouth's vertical midpoint, in pixel coordinates.
pub fn mouth_crop(landmarks: &Landmarks, width: u32, height: u32) -> Option<BoundingBox> {
    let frame = BoundingBox::new(0.0, 0.0, width as f64, height as f64);
    let outline: Vec<Point> = mouth_outline(landmarks)
        .iter()
        .map(|&p| frame.denormalize_point(p))
        .collect();
    let mouth = BoundingBox::enclosing(&outline)?;

    let center = mouth.center();
    let shifted = Point::new(center.x, center.y + 0.1 * mouth.height);
    Some(BoundingBox::centered(shifted, 0.6 * mouth.width, 0.6 * mouth.height))
}

/// Fraction of red-dominant pixels in the mouth crop, in [0,1].
///
/// `None` when the frame has no pixels or the crop is smaller than 2x2
/// after clipping to the frame.
pub fn red_fraction(frame: &dyn FrameAccess, landmarks: &Landmarks) -> Option<f64> {
    let (w, h) = (frame.width(), frame.height());
    if w == 0 || h == 0 || landmarks.is_empty() {
        return None;
    }
    let crop = mouth_crop(landmarks, w, h)?;

    let x0 = (crop.x.round() as i64).clamp(0, w as i64) as i32;
    let x1 = ((crop.x + crop.width).round() as i64).clamp(0, w as i64) as i32;
    let y0 = (crop.y.round() as i64).clamp(0, h as i64) as i32;
    let y1 = ((crop.y + crop.height).round() as i64).clamp(0, h as i64) as i32;
    if x1 - x0 < 2 || y1 - y0 < 2 {
        return None;
    }

    let mut red = 0usize;
    let mut total = 0usize;
    for y in y0..y1 {
        for x in x0..x1 {
            total += 1;
            if is_red_dominant(frame.pixel(x, y)) {
                red += 1;
            }
        }
    }
    Some(red as f64 / total as f64)
}

/// Session-scoped override timer re-armed by each positive detection.
#[derive(Debug, Clone)]
pub struct TongueHold {
    hold_ms: f64,
    min_mouth_open: f64,
    last_positive: Option<f64>,
}

impl TongueHold {
    pub fn new(hold_ms: f64, min_mouth_open: f64) -> Self {
        Self {
            hold_ms,
            min_mouth_open,
            last_positive: None,
        }
    }

    pub fn arm(&mut self, now_ms: f64) {
        if !self.is_armed(now_ms) {
            debug!(now_ms, "tongue hold armed");
        }
        self.last_positive = Some(now_ms);
    }

    fn is_armed(&self, now_ms: f64) -> bool {
        self.last_positive
            .is_some_and(|at| now_ms - at < self.hold_ms)
    }

    /// Override is on while inside the hold window and the mouth stays open.
    pub fn is_active(&self, now_ms: f64, mouth_open: f64) -> bool {
        self.is_armed(now_ms) && mouth_open > self.min_mouth_open
    }

    pub fn reset(&mut self) {
        self.last_positive = None;
    }
}

impl Default for TongueHold {
    fn default() -> Self {
        let cfg = TongueConfig::default();
        Self::new(cfg.hold_ms, cfg.min_mouth_open)
    }
}

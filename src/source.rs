//! Choosing between landmark-derived and blendshape-derived signals.

use serde::Serialize;

use crate::blendshapes::signals_from_blendshapes;
use crate::types::{Blendshapes, ExpressionSignals};

/// The signal vector used for a frame, tagged with where it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignalSource {
    Landmarks(ExpressionSignals),
    Blendshapes(ExpressionSignals),
}

/// Which path produced the frame's signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Landmarks,
    Blendshapes,
}

impl SignalSource {
    pub fn signals(&self) -> &ExpressionSignals {
        match self {
            Self::Landmarks(s) | Self::Blendshapes(s) => s,
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Landmarks(_) => SourceKind::Landmarks,
            Self::Blendshapes(_) => SourceKind::Blendshapes,
        }
    }

    /// Same source, different values.
    pub fn with_signals(&self, signals: ExpressionSignals) -> Self {
        match self {
            Self::Landmarks(_) => Self::Landmarks(signals),
            Self::Blendshapes(_) => Self::Blendshapes(signals),
        }
    }
}

/// Pick the authoritative signals for a frame.
///
/// Blendshapes win when present and their raw strength reaches
/// `min_strength`; near-zero output (e.g. a model running without
/// blendshapes) falls back to geometry.
pub fn select_source(
    landmark_signals: ExpressionSignals,
    blendshapes: Option<&Blendshapes>,
    min_strength: f64,
) -> SignalSource {
    match blendshapes {
        Some(bs) if bs.strength() >= min_strength => match signals_from_blendshapes(bs) {
            Some(signals) => SignalSource::Blendshapes(signals),
            None => SignalSource::Landmarks(landmark_signals),
        },
        _ => SignalSource::Landmarks(landmark_signals),
    }
}

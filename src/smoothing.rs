//! Exponential moving averages over scalar signals.

use std::collections::BTreeMap;

pub const DEFAULT_ALPHA: f64 = 0.35;

/// EMA over a single scalar. The first sample passes through unchanged.
#[derive(Debug, Clone)]
pub struct EmaSmoother {
    alpha: f64,
    state: Option<f64>,
}

impl EmaSmoother {
    /// `alpha` is the weight of the newest sample, in (0, 1].
    pub fn new(alpha: f64) -> Self {
        debug_assert!(alpha > 0.0 && alpha <= 1.0);
        Self { alpha, state: None }
    }

    pub fn update(&mut self, x: f64) -> f64 {
        let next = match self.state {
            Some(prev) => self.alpha * x + (1.0 - self.alpha) * prev,
            None => x,
        };
        self.state = Some(next);
        next
    }

    pub fn value(&self) -> Option<f64> {
        self.state
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn reset(&mut self) {
        self.state = None;
    }
}

impl Default for EmaSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHA)
    }
}

/// One independent [`EmaSmoother`] per named signal, created on first sight.
#[derive(Debug, Clone)]
pub struct SignalSmoother {
    alpha: f64,
    channels: BTreeMap<String, EmaSmoother>,
}

impl SignalSmoother {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            channels: BTreeMap::new(),
        }
    }

    /// Smooth every key of `values`; the output carries exactly the input keys.
    pub fn update(&mut self, values: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
        let mut out = BTreeMap::new();
        for (name, &value) in values {
            let alpha = self.alpha;
            let smoothed = self
                .channels
                .entry(name.clone())
                .or_insert_with(|| EmaSmoother::new(alpha))
                .update(value);
            out.insert(name.clone(), smoothed);
        }
        out
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Drop all channel state; the next sample of each key passes through.
    pub fn reset(&mut self) {
        self.channels.clear();
    }
}

impl Default for SignalSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHA)
    }
}

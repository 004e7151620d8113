//! Synthetic analysis series.
//!
//! These curves do not come from the pricing service: node counts follow
//! from the tree shape, and the timing and precision curves are model
//! estimates. All are recomputed on every activation.

use std::ops::RangeInclusive;

use serde::Serialize;

use crate::api::ConvergencePoint;
use crate::layout::theoretical_node_count;

/// Depths covered by the node-count curve.
pub const NODE_COUNT_STEPS: RangeInclusive<u32> = 1..=1200;
/// Depths covered by the timing and precision curves, sampled every
/// [`ESTIMATE_STRIDE`].
pub const ESTIMATE_STEPS: RangeInclusive<u32> = 5..=1000;
pub const ESTIMATE_STRIDE: usize = 5;

/// Reference price of the built-in convergence series.
pub const FALLBACK_REFERENCE_PRICE: f64 = 10.45;

/// Paired x/y samples.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Series {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Series {
    fn sample(steps: impl Iterator<Item = u32>, f: impl Fn(f64) -> f64) -> Self {
        let (x, y) = steps
            .map(f64::from)
            .map(|n| (n, f(n)))
            .unzip();
        Self { x, y }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// `(N + 1)²` for N in [`NODE_COUNT_STEPS`].
pub fn node_count_series() -> Series {
    let (x, y) = NODE_COUNT_STEPS
        .map(|n| (f64::from(n), theoretical_node_count(n) as f64))
        .unzip();
    Series { x, y }
}

/// Estimated run time in milliseconds: `1 + 0.005·N² + 0.1·ln N`.
pub fn timing_series() -> Series {
    Series::sample(ESTIMATE_STEPS.step_by(ESTIMATE_STRIDE), |n| {
        1.0 + 0.005 * n * n + 0.1 * n.ln()
    })
}

/// Estimated absolute pricing error, decaying like `2/√N` with a damped
/// oscillation, floored at 0.001.
pub fn precision_series() -> Series {
    Series::sample(ESTIMATE_STEPS.step_by(ESTIMATE_STRIDE), |n| {
        let base = 2.0 / n.sqrt();
        let noise = 0.1 * (0.1 * n).sin() * (-n / 100.0).exp();
        (base + noise).max(0.001)
    })
}

/// Convergence series used when the service has nothing to offer.
pub fn fallback_convergence() -> Vec<ConvergencePoint> {
    [
        (5, 10.55),
        (10, 10.48),
        (15, 10.46),
        (20, 10.45),
        (25, 10.45),
        (30, 10.45),
    ]
    .into_iter()
    .map(|(steps, trinomial_price)| ConvergencePoint {
        steps,
        trinomial_price,
        blackscholes_price: FALLBACK_REFERENCE_PRICE,
    })
    .collect()
}

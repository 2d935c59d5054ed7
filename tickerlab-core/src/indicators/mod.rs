//! Moving-average indicators over record closes.
//!
//! Both indicators emit one value per input close (no NaN warm-up), which is
//! what chart overlays and the CLI tail print expect.

pub mod ema;
pub mod sma;

pub use ema::Ema;
pub use sma::Sma;

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::domain::Record;

/// Windows used when the caller does not choose any.
pub const DEFAULT_WINDOWS: [usize; 3] = [5, 10, 20];

/// A single-series indicator computed from closes.
pub trait Indicator: Send + Sync {
    fn name(&self) -> &str;

    fn window(&self) -> usize;

    /// One output per input close; empty for a zero window.
    fn compute(&self, closes: &[f64]) -> Vec<f64>;
}

/// SMA and EMA series keyed by window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MovingAverages {
    pub ma: BTreeMap<usize, Vec<f64>>,
    pub ema: BTreeMap<usize, Vec<f64>>,
}

impl MovingAverages {
    pub fn is_empty(&self) -> bool {
        self.ma.is_empty() && self.ema.is_empty()
    }

    /// Copy with every value rounded to `places` decimals.
    pub fn rounded(&self, places: i32) -> Self {
        let scale = 10f64.powi(places);
        let round = |series: &BTreeMap<usize, Vec<f64>>| -> BTreeMap<usize, Vec<f64>> {
            series
                .iter()
                .map(|(&w, values)| {
                    let values = values.iter().map(|v| (v * scale).round() / scale);
                    (w, values.collect::<Vec<f64>>())
                })
                .collect()
        };
        Self {
            ma: round(&self.ma),
            ema: round(&self.ema),
        }
    }

    /// Last value of each series labelled by indicator name (`ma_5`, `ema_5`),
    /// SMAs first, each group by ascending window.
    pub fn latest(&self) -> Vec<(String, f64)> {
        let ma = self
            .ma
            .iter()
            .filter_map(|(&w, s)| Some((Sma::new(w).name().to_string(), *s.last()?)));
        let ema = self
            .ema
            .iter()
            .filter_map(|(&w, s)| Some((Ema::new(w).name().to_string(), *s.last()?)));
        ma.chain(ema).collect()
    }
}

/// Compute SMA and EMA of the records' closes for each non-zero window.
///
/// Records are taken in the order given; pass a date-ascending block.
pub fn moving_averages<R: AsRef<Record>>(records: &[R], windows: &[usize]) -> MovingAverages {
    let mut out = MovingAverages::default();
    if records.is_empty() {
        return out;
    }
    let closes: Vec<f64> = records.iter().map(|r| r.as_ref().close()).collect();
    for &w in windows.iter().filter(|&&w| w > 0) {
        let sma = Sma::new(w);
        let ema = Ema::new(w);
        for (indicator, target) in [
            (&sma as &dyn Indicator, &mut out.ma),
            (&ema as &dyn Indicator, &mut out.ema),
        ] {
            debug!(indicator = indicator.name(), bars = closes.len(), "computing");
            target.insert(indicator.window(), indicator.compute(&closes));
        }
    }
    out
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

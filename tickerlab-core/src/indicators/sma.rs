//! Simple Moving Average (SMA) over closes.
//!
//! Rolling mean with a partial warm-up: index `i` averages the last
//! `min(window, i + 1)` values, so there is a value for every bar.

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Sma {
    window: usize,
    name: String,
}

impl Sma {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            name: format!("ma_{window}"),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn window(&self) -> usize {
        self.window
    }

    fn compute(&self, closes: &[f64]) -> Vec<f64> {
        if self.window == 0 {
            return Vec::new();
        }
        let mut result = Vec::with_capacity(closes.len());
        let mut sum = 0.0;
        for (i, &close) in closes.iter().enumerate() {
            sum += close;
            if i >= self.window {
                sum -= closes[i - self.window];
            }
            let count = (i + 1).min(self.window);
            result.push(sum / count as f64);
        }
        result
    }
}

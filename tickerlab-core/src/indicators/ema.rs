//! Exponential Moving Average (EMA) over closes.
//!
//! Recursive, seeded with the first close:
//! EMA[0] = close[0], EMA[t] = alpha * close[t] + (1 - alpha) * EMA[t-1],
//! alpha = 2 / (window + 1).

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Ema {
    window: usize,
    name: String,
}

impl Ema {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            name: format!("ema_{window}"),
        }
    }

    pub fn alpha(&self) -> f64 {
        2.0 / (self.window as f64 + 1.0)
    }
}

impl Indicator for Ema {
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
        let alpha = self.alpha();
        let mut result = Vec::with_capacity(closes.len());
        let mut prev: Option<f64> = None;
        for &close in closes {
            let ema = match prev {
                None => close,
                Some(p) => alpha * close + (1.0 - alpha) * p,
            };
            result.push(ema);
            prev = Some(ema);
        }
        result
    }
}

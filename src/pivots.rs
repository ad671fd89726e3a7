//! Confirmed local extrema
//!
//! A low pivot at `i` is confirmed when `low[i]` is the minimum of its `W`
//! neighbours on each side, i.e. of `low[i - W..=i]` and `low[i..=i + W]`.
//! Bars with fewer than `W` neighbours on either side never qualify. High
//! pivots mirror this on `high`.

use crate::{Period, PriceBar, Result};

/// Kind of extremum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PivotKind {
    Low,
    High,
}

/// A confirmed extremum
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Pivot {
    pub index: usize,
    pub price: f64,
    pub kind: PivotKind,
}

/// Two-sided rolling-window pivot detector
#[derive(Debug, Clone, Copy)]
pub struct PivotDetector {
    window: Period,
}

impl PivotDetector {
    pub fn new(window: usize) -> Result<Self> {
        Ok(Self {
            window: Period::new(window)?,
        })
    }

    #[inline]
    pub fn window(&self) -> usize {
        self.window.get()
    }

    /// Confirmation flag for every bar, aligned to `bars`.
    pub fn flags<T: PriceBar>(&self, bars: &[T], kind: PivotKind) -> Vec<bool> {
        let values: Vec<f64> = match kind {
            PivotKind::Low => bars.iter().map(|b| b.low()).collect(),
            PivotKind::High => bars.iter().map(|b| b.high()).collect(),
        };
        let pick: fn(f64, f64) -> f64 = match kind {
            PivotKind::Low => f64::min,
            PivotKind::High => f64::max,
        };

        let span = self.window() + 1;
        let backward = rolling(&values, span, pick);
        let reversed: Vec<f64> = values.iter().rev().copied().collect();
        let mut forward = rolling(&reversed, span, pick);
        forward.reverse();

        values
            .iter()
            .zip(backward.iter().zip(&forward))
            .map(|(&v, (b, f))| *b == Some(v) && *f == Some(v))
            .collect()
    }

    #[inline]
    pub fn low_flags<T: PriceBar>(&self, bars: &[T]) -> Vec<bool> {
        self.flags(bars, PivotKind::Low)
    }

    #[inline]
    pub fn high_flags<T: PriceBar>(&self, bars: &[T]) -> Vec<bool> {
        self.flags(bars, PivotKind::High)
    }

    /// Confirmed pivots of `kind`, in index order.
    pub fn pivots<T: PriceBar>(&self, bars: &[T], kind: PivotKind) -> Vec<Pivot> {
        self.flags(bars, kind)
            .into_iter()
            .enumerate()
            .filter(|&(_, confirmed)| confirmed)
            .map(|(index, _)| Pivot {
                index,
                price: match kind {
                    PivotKind::Low => bars[index].low(),
                    PivotKind::High => bars[index].high(),
                },
                kind,
            })
            .collect()
    }
}

/// Trailing-window reduction; `None` until the window is full.
fn rolling(values: &[f64], window: usize, pick: fn(f64, f64) -> f64) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            (i + 1 >= window).then(|| {
                values[i + 1 - window..=i]
                    .iter()
                    .copied()
                    .fold(values[i], pick)
            })
        })
        .collect()
}

/// Index of the lowest low (first on ties).
pub fn global_low<T: PriceBar>(bars: &[T]) -> Option<usize> {
    (0..bars.len()).reduce(|best, i| if bars[i].low() < bars[best].low() { i } else { best })
}

/// Index of the highest high (first on ties).
pub fn global_high<T: PriceBar>(bars: &[T]) -> Option<usize> {
    (0..bars.len()).reduce(|best, i| if bars[i].high() > bars[best].high() { i } else { best })
}

// ============================================================
// TESTS
// ============================================================

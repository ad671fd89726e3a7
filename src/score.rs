//! Proportion and age scores
//!
//! Each wave-length ratio is compared against its Fibonacci target. A ratio
//! above 1 is folded to its reciprocal so overshoot and undershoot cost the
//! same, leaving every sub-score in `[0, 1]`.

use crate::monowave::MonoWave;
use crate::pattern::WavePattern;

pub const FIB_0_382: f64 = 0.382;
pub const FIB_0_618: f64 = 0.618;
pub const FIB_1_618: f64 = 1.618;

/// How wave 3 is measured against wave 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Wave3Ratio {
    /// `|3| / (1.618 * |1| / |3|)`, i.e. `|3|^2` against `1.618 * |1|`
    #[default]
    Literal,
    /// `|3| / (1.618 * |1|)`
    Extension,
}

/// Scores of one pattern
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScoreResult {
    pub proportion_score: f64,
    pub age_score: f64,
}

impl ScoreResult {
    pub fn evaluate(pattern: &WavePattern, series_len: usize, wave3: Wave3Ratio) -> Self {
        Self {
            proportion_score: proportion_score(pattern.waves(), wave3),
            age_score: age_score(pattern.end_index(), series_len),
        }
    }

    /// Ranking key
    #[inline]
    pub fn combined(&self) -> f64 {
        self.proportion_score * self.age_score
    }
}

/// Fold a raw ratio into `[0, 1]`; degenerate ratios score 0.
#[inline]
fn closeness(raw: f64) -> f64 {
    if !raw.is_finite() || raw <= 0.0 {
        0.0
    } else if raw > 1.0 {
        1.0 / raw
    } else {
        raw
    }
}

/// Mean closeness of the wave-length ratios to their targets.
///
/// Five waves use the impulse targets, three waves the A-B-C targets
/// (`|B| = 0.618 |A|`, `|C| = |A|`). Other lengths score 0.
pub fn proportion_score(waves: &[MonoWave], wave3: Wave3Ratio) -> f64 {
    match waves {
        [w1, w2, w3, w4, w5] => {
            let (l1, l2, l3, l4, l5) = (w1.length(), w2.length(), w3.length(), w4.length(), w5.length());
            let r3 = match wave3 {
                Wave3Ratio::Literal => l3 / (FIB_1_618 * l1 / l3),
                Wave3Ratio::Extension => l3 / (FIB_1_618 * l1),
            };
            let ratios = [l2 / (FIB_0_618 * l1), r3, l4 / (FIB_0_382 * l3), l5 / l1];
            ratios.iter().map(|&r| closeness(r)).sum::<f64>() / ratios.len() as f64
        }
        [a, b, c] => {
            let ratios = [b.length() / (FIB_0_618 * a.length()), c.length() / a.length()];
            ratios.iter().map(|&r| closeness(r)).sum::<f64>() / ratios.len() as f64
        }
        _ => 0.0,
    }
}

/// How close the pattern's end is to the latest bar.
#[inline]
pub fn age_score(end_index: usize, series_len: usize) -> f64 {
    if series_len == 0 {
        return 0.0;
    }
    (end_index as f64 / series_len as f64).min(1.0)
}

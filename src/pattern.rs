//! Chains of monowaves checked against rules
//!
//! Two patterns are equal when their `(start_index, end_index, direction)`
//! sequences match; prices never take part in equality or hashing.

use std::hash::{Hash, Hasher};

use serde::ser::SerializeStruct;

use crate::monowave::MonoWave;
use crate::rules::WaveRule;
use crate::Direction;

/// Ordered chain of monowaves forming a candidate shape
#[derive(Debug, Clone)]
pub struct WavePattern {
    waves: Vec<MonoWave>,
}

impl WavePattern {
    /// Wrap a builder chain. The chain must be non-empty, contiguous and alternating.
    pub fn new(waves: Vec<MonoWave>) -> Self {
        assert!(!waves.is_empty(), "wave pattern needs at least one wave");
        debug_assert!(
            waves.windows(2).all(|w| w[0].end_index == w[1].start_index
                && w[0].direction != w[1].direction
                && w[0].start_index < w[0].end_index),
            "broken monowave chain"
        );
        Self { waves }
    }

    #[inline]
    pub fn waves(&self) -> &[MonoWave] {
        &self.waves
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.waves.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    /// Direction of the first wave
    #[inline]
    pub fn direction(&self) -> Direction {
        self.waves[0].direction
    }

    #[inline]
    pub fn start_index(&self) -> usize {
        self.waves[0].start_index
    }

    #[inline]
    pub fn end_index(&self) -> usize {
        self.waves[self.waves.len() - 1].end_index
    }

    /// Check against `rule` without modifying the pattern.
    ///
    /// # Panics
    ///
    /// If the chain length differs from `rule.wave_count()`.
    pub fn check_rule(&self, rule: &dyn WaveRule) -> bool {
        assert_eq!(
            self.waves.len(),
            rule.wave_count(),
            "rule '{}' applied to a {}-wave chain",
            rule.name(),
            self.waves.len()
        );
        rule.check(&self.waves)
    }

    /// Structural identity used for deduplication
    pub fn key(&self) -> Vec<(usize, usize, Direction)> {
        self.waves
            .iter()
            .map(|w| (w.start_index, w.end_index, w.direction))
            .collect()
    }

    /// Turning points, start of wave 1 through the end of the last wave
    pub fn points(&self) -> Vec<(i64, f64)> {
        std::iter::once((self.waves[0].start_time, self.waves[0].start_price))
            .chain(self.waves.iter().map(|w| (w.end_time, w.end_price)))
            .collect()
    }

    pub fn dates(&self) -> Vec<i64> {
        self.points().into_iter().map(|(t, _)| t).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points().into_iter().map(|(_, p)| p).collect()
    }

    /// Point labels: `0 1 2 3 4 5` for impulses, `0 A B C` for corrections.
    pub fn labels(&self) -> Vec<String> {
        match self.waves.len() {
            3 => ["0", "A", "B", "C"].iter().map(|s| s.to_string()).collect(),
            n => (0..=n).map(|i| i.to_string()).collect(),
        }
    }
}

impl PartialEq for WavePattern {
    fn eq(&self, other: &Self) -> bool {
        self.waves.len() == other.waves.len()
            && self.waves.iter().zip(&other.waves).all(|(a, b)| {
                a.start_index == b.start_index
                    && a.end_index == b.end_index
                    && a.direction == b.direction
            })
    }
}

impl Eq for WavePattern {}

impl Hash for WavePattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl serde::Serialize for WavePattern {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = s.serialize_struct("WavePattern", 4)?;
        state.serialize_field("dates", &self.dates())?;
        state.serialize_field("values", &self.values())?;
        state.serialize_field("labels", &self.labels())?;
        state.serialize_field("waves", &self.waves)?;
        state.end()
    }
}

// ============================================================
// TESTS
// ============================================================

//! Skip configurations and their generators
//!
//! A [`SkipConfig`] tells the monowave builder how many intermediate extrema to
//! pass over before accepting the end of each segment. `[1, 0, 0, 0, 0]` skips
//! the first extremum found for wave 1 and takes the first one for every other
//! wave.
//!
//! Generators enumerate every configuration below an upper bound that obeys
//! zero propagation: once a component is zero, every later component is zero.
//!
//! ```rust
//! use wavescan::options::{SkipConfigs, SkipGenerator};
//!
//! let configs = SkipConfigs::generate(SkipGenerator::Full, 3).unwrap();
//! assert_eq!(configs.number(), 63);
//! assert_eq!(configs.options_sorted()[0].values(), vec![0, 0, 0, 0, 0]);
//! ```

use std::collections::HashSet;
use std::fmt;
use std::ops::Range;

use crate::{Result, WaveError};

// ============================================================
// SKIP CONFIG
// ============================================================

/// Number of extrema to skip per segment, 2 to 5 components.
///
/// Ordering is lexicographic on `(i, j, k, l, m)`; an absent component sorts
/// before any present one, so `[1, 2, 0, 0]` < `[1, 2, 0, 0, 0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SkipConfig {
    i: usize,
    j: usize,
    k: Option<usize>,
    l: Option<usize>,
    m: Option<usize>,
}

impl SkipConfig {
    /// Build a config from 2..=5 values, rejecting zero-propagation violations.
    pub fn new(values: &[usize]) -> Result<Self> {
        if !(2..=5).contains(&values.len()) {
            return Err(WaveError::InvalidValue(
                "SkipConfig needs between 2 and 5 components",
            ));
        }
        if let Some(zero) = values.iter().position(|&v| v == 0) {
            if values[zero..].iter().any(|&v| v != 0) {
                return Err(WaveError::InvalidValue(
                    "SkipConfig component after a zero must be zero",
                ));
            }
        }
        Ok(Self::from_slice(values))
    }

    /// Unchecked construction for generator output.
    fn from_slice(values: &[usize]) -> Self {
        Self {
            i: values[0],
            j: values[1],
            k: values.get(2).copied(),
            l: values.get(3).copied(),
            m: values.get(4).copied(),
        }
    }

    /// The present components in order.
    pub fn values(&self) -> Vec<usize> {
        let mut values = vec![self.i, self.j];
        values.extend([self.k, self.l, self.m].into_iter().flatten());
        values
    }

    /// Number of present components.
    pub fn arity(&self) -> usize {
        2 + [self.k, self.l, self.m].iter().filter(|c| c.is_some()).count()
    }

    /// Skip count for segment `index` (0-based). Absent components skip nothing.
    #[inline]
    pub fn skip(&self, index: usize) -> usize {
        match index {
            0 => self.i,
            1 => self.j,
            2 => self.k.unwrap_or(0),
            3 => self.l.unwrap_or(0),
            4 => self.m.unwrap_or(0),
            _ => 0,
        }
    }

    /// Number of segments a chain built from this config has.
    ///
    /// A 4-component config drives a full five-wave search with the last
    /// segment unskipped.
    pub fn wave_count(&self) -> usize {
        match self.arity() {
            4 => 5,
            n => n,
        }
    }

    /// `(i, j, k, l)` when the config has at least four components.
    pub fn prefix4(&self) -> Option<[usize; 4]> {
        Some([self.i, self.j, self.k?, self.l?])
    }

    /// True when zero propagation holds across every present component.
    pub fn is_zero_propagated(&self) -> bool {
        let values = self.values();
        match values.iter().position(|&v| v == 0) {
            Some(zero) => values[zero..].iter().all(|&v| v == 0),
            None => true,
        }
    }
}

impl fmt::Display for SkipConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.values())
    }
}

impl serde::Serialize for SkipConfig {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.values().serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for SkipConfig {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let values = Vec::<usize>::deserialize(d)?;
        SkipConfig::new(&values).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// GENERATORS
// ============================================================

/// Shape of the search space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SkipGenerator {
    /// `(i, j)`, two-segment searches
    Pair,
    /// `(i, j, k)`, corrective three-segment searches
    Triple,
    /// `(i, j, k, l, m)`, every component in `[0, up_to)`
    Full,
    /// Five- and four-component configs with `j..m` kept within `range` of `i`
    Ranged { range: usize },
}

impl SkipGenerator {
    /// Generator matching a rule's segment count.
    pub fn for_wave_count(wave_count: usize, range: Option<usize>) -> Result<Self> {
        match (wave_count, range) {
            (2, _) => Ok(Self::Pair),
            (3, _) => Ok(Self::Triple),
            (5, None) => Ok(Self::Full),
            (5, Some(range)) => Ok(Self::Ranged { range }),
            (n, _) => Err(WaveError::InvalidConfig(format!(
                "no skip generator for {n}-wave patterns"
            ))),
        }
    }

    /// Segments built by configs of this generator.
    pub fn wave_count(self) -> usize {
        match self {
            Self::Pair => 2,
            Self::Triple => 3,
            Self::Full | Self::Ranged { .. } => 5,
        }
    }
}

/// A generated, duplicate-free set of skip configurations.
#[derive(Debug, Clone)]
pub struct SkipConfigs {
    generator: SkipGenerator,
    options: HashSet<SkipConfig>,
}

impl SkipConfigs {
    /// Enumerate every valid config with components below `up_to`.
    pub fn generate(generator: SkipGenerator, up_to: usize) -> Result<Self> {
        if up_to == 0 {
            return Err(WaveError::InvalidConfig(
                "skip search bound must be > 0".to_string(),
            ));
        }

        let mut options = HashSet::new();
        let mut prefix = Vec::with_capacity(5);
        let full = 0..up_to;

        match generator {
            SkipGenerator::Pair => extend(&mut prefix, 2, &full, &mut options),
            SkipGenerator::Triple => extend(&mut prefix, 3, &full, &mut options),
            SkipGenerator::Full => extend(&mut prefix, 5, &full, &mut options),
            SkipGenerator::Ranged { range } => {
                for i in full {
                    let window = i.saturating_sub(range)..(i + range).min(up_to);
                    if window.is_empty() {
                        continue;
                    }
                    prefix.push(i);
                    extend(&mut prefix, 5, &window, &mut options);
                    extend(&mut prefix, 4, &window, &mut options);
                    prefix.pop();
                }
            }
        }

        Ok(Self { generator, options })
    }

    #[inline]
    pub fn generator(&self) -> SkipGenerator {
        self.generator
    }

    /// Total number of configs.
    #[inline]
    pub fn number(&self) -> usize {
        self.options.len()
    }

    #[inline]
    pub fn options(&self) -> &HashSet<SkipConfig> {
        &self.options
    }

    /// Configs from smallest to largest: five-component configs first, then the
    /// shorter ones, each group ascending.
    pub fn options_sorted(&self) -> Vec<SkipConfig> {
        let (mut five, mut rest): (Vec<_>, Vec<_>) =
            self.options.iter().copied().partition(|o| o.arity() == 5);
        five.sort_unstable();
        rest.sort_unstable();
        five.extend(rest);
        five
    }
}

/// Depth-first enumeration; a zero component forces zeros after it, so no
/// tuple is produced twice.
fn extend(
    prefix: &mut Vec<usize>,
    len: usize,
    window: &Range<usize>,
    out: &mut HashSet<SkipConfig>,
) {
    if prefix.len() == len {
        out.insert(SkipConfig::from_slice(prefix));
        return;
    }

    if prefix.last() == Some(&0) {
        prefix.push(0);
        extend(prefix, len, window, out);
        prefix.pop();
        return;
    }

    for value in window.clone() {
        prefix.push(value);
        extend(prefix, len, window, out);
        prefix.pop();
    }
}

// ============================================================
// TESTS
// ============================================================

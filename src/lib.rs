//! # wavescan - five-wave pattern search
//!
//! Searches ordered price series for five-segment impulse and leading diagonal
//! movements (and three-segment corrections) whose segment lengths follow the
//! conventional Fibonacci proportions, then scores and ranks the matches.
//!
//! ## Quick Start
//!
//! ```rust
//! use wavescan::prelude::*;
//!
//! let prices = [100.0, 101.0, 100.382, 101.654, 101.168, 102.168];
//! let bars: Vec<Bar> = prices
//!     .iter()
//!     .enumerate()
//!     .map(|(t, &p)| Bar::point(t as i64, p))
//!     .collect();
//!
//! let engine = EngineBuilder::new()
//!     .with_default_rules()
//!     .build()
//!     .unwrap();
//!
//! let matches = engine.scan(&bars).unwrap();
//! assert_eq!(matches[0].rule, "impulse");
//! ```

pub mod monowave;
pub mod options;
pub mod params;
pub mod pattern;
pub mod pivots;
pub mod ranking;
pub mod rules;
pub mod score;

pub mod prelude {
    pub use crate::{
        // Building blocks
        monowave::{MonoWave, MonowaveBuilder},
        options::{SkipConfig, SkipConfigs, SkipGenerator},
        params::{ParamMeta, ParamType},
        pattern::WavePattern,
        pivots::{Pivot, PivotDetector, PivotKind},
        ranking::{rank, Deduplicator},
        rules::{Correction, Impulse, LeadingDiagonal, WaveRule},
        score::{ScoreResult, Wave3Ratio},
        // Parallel
        scan_parallel,
        screen,
        // Types
        Bar,
        BarSource,
        Direction,
        // Engine
        EngineBuilder,
        EngineConfig,
        Period,
        PriceBar,
        Ratio,
        Result,
        ScanError,
        ScanResult,
        StartPolicy,
        // Errors
        WaveError,
        WaveEngine,
        WaveMatch,
    };
}

use tracing::{debug, info, warn};

use monowave::MonowaveBuilder;
use options::{SkipConfig, SkipConfigs, SkipGenerator};
use pattern::WavePattern;
use pivots::{PivotDetector, PivotKind};
use ranking::Deduplicator;
use rules::WaveRule;
use score::{ScoreResult, Wave3Ratio};

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, WaveError>;

/// Errors that can occur while searching for wave patterns
#[derive(Debug, Clone, thiserror::Error)]
pub enum WaveError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Insufficient data: need {need} bars, got {got}")]
    InsufficientData { need: usize, got: usize },

    #[error("Invalid bar at index {index}: {reason}")]
    InvalidBar { index: usize, reason: &'static str },

    #[error("Timestamp at index {index} does not increase")]
    UnorderedTimestamps { index: usize },

    #[error("Data source failed for {symbol}: {reason}")]
    Source { symbol: String, reason: String },
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Normalized value in range 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

impl Ratio {
    /// Create a new Ratio, validating the value is in [0.0, 1.0]
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(WaveError::InvalidValue("Ratio cannot be NaN or infinite"));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(WaveError::OutOfRange {
                field: "Ratio",
                value,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(Self(value))
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Ratio {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Ratio {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Ratio::new(value).map_err(serde::de::Error::custom)
    }
}

/// Window length or count (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(WaveError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl serde::Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// PRICE BARS
// ============================================================

/// Time-stamped OHLC record
pub trait PriceBar {
    fn timestamp(&self) -> i64;
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;

    /// Validate OHLC consistency
    fn validate(&self) -> Result<()> {
        let values = [self.open(), self.high(), self.low(), self.close()];
        if values.iter().any(|v| v.is_nan()) {
            return Err(WaveError::InvalidBar {
                index: 0,
                reason: "NaN in OHLC",
            });
        }
        if values.iter().any(|v| v.is_infinite()) {
            return Err(WaveError::InvalidBar {
                index: 0,
                reason: "Infinite value in OHLC",
            });
        }
        if self.high() < self.low() {
            return Err(WaveError::InvalidBar {
                index: 0,
                reason: "high < low",
            });
        }
        Ok(())
    }
}

/// Plain bar as delivered by a data source
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bar {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Bar {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
        }
    }

    /// Flat bar with every price equal to `price`
    pub fn point(timestamp: i64, price: f64) -> Self {
        Self::new(timestamp, price, price, price, price)
    }
}

impl PriceBar for Bar {
    fn timestamp(&self) -> i64 {
        self.timestamp
    }

    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }
}

/// Direction of a monowave or pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Up,
    Down,
}

impl Direction {
    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// True if `price` lies strictly beyond `reference` when moving this way.
    #[inline]
    pub fn exceeds(self, price: f64, reference: f64) -> bool {
        match self {
            Direction::Up => price > reference,
            Direction::Down => price < reference,
        }
    }

    #[inline]
    pub fn is_up(self) -> bool {
        matches!(self, Direction::Up)
    }

    /// Kind of pivot a wave moving this way starts from
    #[inline]
    pub fn start_pivot(self) -> PivotKind {
        match self {
            Direction::Up => PivotKind::Low,
            Direction::Down => PivotKind::High,
        }
    }
}

// ============================================================
// RESULTS
// ============================================================

/// A ranked pattern found in one series
#[derive(Debug, Clone, serde::Serialize)]
pub struct WaveMatch {
    /// Name of the first rule the pattern satisfied
    pub rule: &'static str,
    /// Config that first produced the pattern
    pub skip_config: SkipConfig,
    pub score: ScoreResult,
    pub pattern: WavePattern,
}

// ============================================================
// ENGINE CONFIG
// ============================================================

/// Where a search starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartPolicy {
    /// Lowest low (highest high for downward searches), first occurrence
    #[default]
    GlobalExtreme,
    /// Every confirmed pivot of the kind the first wave starts from
    ConfirmedPivots,
    /// A fixed bar index
    Index(usize),
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Exclusive upper bound on skipped extrema per segment
    pub up_to: usize,
    /// Window around the first component for the ranged generator
    pub range: Option<usize>,
    pub pivot_window: usize,
    pub min_proportion: f64,
    pub min_age: f64,
    pub top_k: usize,
    pub start: StartPolicy,
    pub direction: Direction,
    pub wave3_ratio: Wave3Ratio,
    pub validate_data: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            up_to: 5,
            range: None,
            pivot_window: 5,
            min_proportion: 0.5,
            min_age: 0.5,
            top_k: 5,
            start: StartPolicy::GlobalExtreme,
            direction: Direction::Up,
            wave3_ratio: Wave3Ratio::Literal,
            validate_data: true,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.up_to == 0 {
            return Err(WaveError::InvalidConfig(
                "up_to must be > 0".to_string(),
            ));
        }
        if self.range == Some(0) {
            return Err(WaveError::InvalidConfig(
                "range must be > 0; leave it unset for the full generator".to_string(),
            ));
        }
        if self.top_k == 0 {
            return Err(WaveError::InvalidConfig(
                "top_k must be > 0".to_string(),
            ));
        }
        Period::new(self.pivot_window)?;
        Ratio::new(self.min_proportion)?;
        Ratio::new(self.min_age)?;
        Ok(())
    }
}

// ============================================================
// WAVE ENGINE
// ============================================================

/// Configs for one family of rules sharing a segment count
#[derive(Debug, Clone)]
struct Search {
    configs: SkipConfigs,
    sorted: Vec<SkipConfig>,
}

/// Main search engine. One `scan` is one independent search task.
pub struct WaveEngine {
    rules: Vec<Box<dyn WaveRule>>,
    searches: Vec<Search>,
    pivots: PivotDetector,
    config: EngineConfig,
}

impl WaveEngine {
    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Total configs tried per start index.
    pub fn combinations(&self) -> usize {
        self.searches.iter().map(|s| s.configs.number()).sum()
    }

    /// Search one series and return the ranked top-K matches.
    ///
    /// A series too short for any search yields an empty result, not an error.
    pub fn scan<T: PriceBar>(&self, bars: &[T]) -> Result<Vec<WaveMatch>> {
        if self.config.validate_data {
            validate_bars(bars)?;
        }

        match self.candidates(bars) {
            Ok(found) => Ok(ranking::rank(
                found,
                self.config.min_proportion,
                self.config.min_age,
                self.config.top_k,
            )),
            Err(WaveError::InsufficientData { need, got }) => {
                debug!(need, got, "series too short, no result");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Every deduplicated, rule-valid pattern in discovery order, unfiltered.
    pub fn candidates<T: PriceBar>(&self, bars: &[T]) -> Result<Vec<WaveMatch>> {
        let starts = self.starts(bars)?;
        let builder = MonowaveBuilder::new(bars);
        let direction = self.config.direction;
        let mut seen = Deduplicator::new();
        let mut found = Vec::new();

        for search in &self.searches {
            let wave_count = search.configs.generator().wave_count();
            let rules: Vec<&dyn WaveRule> = self
                .rules
                .iter()
                .filter(|r| r.wave_count() == wave_count)
                .map(|r| r.as_ref())
                .collect();

            debug!(
                starts = ?starts,
                wave_count,
                combinations = search.configs.number(),
                "searching"
            );

            for config in &search.sorted {
                for waves in builder.find_chains(&starts, config, direction) {
                    let pattern = WavePattern::new(waves);
                    let Some(rule) = rules.iter().find(|r| pattern.check_rule(**r)) else {
                        continue;
                    };
                    if !seen.admit(&pattern, config) {
                        continue;
                    }

                    let score = ScoreResult::evaluate(&pattern, bars.len(), self.config.wave3_ratio);
                    info!(
                        rule = rule.name(),
                        config = %config,
                        proportion = score.proportion_score,
                        age = score.age_score,
                        "pattern found"
                    );
                    found.push(WaveMatch {
                        rule: rule.name(),
                        skip_config: *config,
                        score,
                        pattern,
                    });
                }
            }
        }

        Ok(found)
    }

    // ===========================================
    // Internal helpers
    // ===========================================

    fn starts<T: PriceBar>(&self, bars: &[T]) -> Result<Vec<usize>> {
        let need = self
            .searches
            .iter()
            .map(|s| s.configs.generator().wave_count() + 1)
            .min()
            .unwrap_or(2);
        if bars.len() < need {
            return Err(WaveError::InsufficientData {
                need,
                got: bars.len(),
            });
        }

        let direction = self.config.direction;
        match self.config.start {
            StartPolicy::GlobalExtreme => {
                let start = match direction {
                    Direction::Up => pivots::global_low(bars),
                    Direction::Down => pivots::global_high(bars),
                };
                Ok(start.into_iter().collect())
            }
            StartPolicy::ConfirmedPivots => {
                let need = 2 * self.pivots.window() + 1;
                if bars.len() < need {
                    return Err(WaveError::InsufficientData {
                        need,
                        got: bars.len(),
                    });
                }
                Ok(self
                    .pivots
                    .pivots(bars, direction.start_pivot())
                    .into_iter()
                    .map(|p| p.index)
                    .collect())
            }
            StartPolicy::Index(index) if index < bars.len() => Ok(vec![index]),
            StartPolicy::Index(index) => Err(WaveError::InsufficientData {
                need: index + 1,
                got: bars.len(),
            }),
        }
    }
}

fn validate_bars<T: PriceBar>(bars: &[T]) -> Result<()> {
    for (i, bar) in bars.iter().enumerate() {
        bar.validate().map_err(|e| match e {
            WaveError::InvalidBar { reason, .. } => WaveError::InvalidBar { index: i, reason },
            other => other,
        })?;
        if i > 0 && bar.timestamp() <= bars[i - 1].timestamp() {
            return Err(WaveError::UnorderedTimestamps { index: i });
        }
    }
    Ok(())
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for creating WaveEngine instances
#[derive(Default)]
pub struct EngineBuilder {
    rules: Vec<Box<dyn WaveRule>>,
    config: EngineConfig,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the impulse and leading diagonal rules
    pub fn with_default_rules(self) -> Self {
        self.add_rule(rules::Impulse).add_rule(rules::LeadingDiagonal)
    }

    /// Add the three-wave correction rule
    pub fn with_correction(self) -> Self {
        self.add_rule(rules::Correction)
    }

    /// Add a rule; rules are tried in insertion order
    pub fn add_rule<R: WaveRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn up_to(mut self, up_to: usize) -> Self {
        self.config.up_to = up_to;
        self
    }

    /// Use the ranged generator for five-wave searches
    pub fn range(mut self, range: usize) -> Self {
        self.config.range = Some(range);
        self
    }

    pub fn pivot_window(mut self, window: usize) -> Self {
        self.config.pivot_window = window;
        self
    }

    pub fn min_proportion(mut self, score: f64) -> Self {
        self.config.min_proportion = score;
        self
    }

    pub fn min_age(mut self, score: f64) -> Self {
        self.config.min_age = score;
        self
    }

    pub fn top_k(mut self, top_k: usize) -> Self {
        self.config.top_k = top_k;
        self
    }

    pub fn start(mut self, start: StartPolicy) -> Self {
        self.config.start = start;
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.config.direction = direction;
        self
    }

    pub fn wave3_ratio(mut self, ratio: Wave3Ratio) -> Self {
        self.config.wave3_ratio = ratio;
        self
    }

    /// Enable/disable data validation
    pub fn validate_data(mut self, enable: bool) -> Self {
        self.config.validate_data = enable;
        self
    }

    /// Build the engine, generating one config set per segment count
    pub fn build(self) -> Result<WaveEngine> {
        self.config.validate()?;
        let pivots = PivotDetector::new(self.config.pivot_window)?;

        let mut searches: Vec<Search> = Vec::new();
        for rule in &self.rules {
            let wave_count = rule.wave_count();
            if searches
                .iter()
                .any(|s| s.configs.generator().wave_count() == wave_count)
            {
                continue;
            }
            let generator = SkipGenerator::for_wave_count(wave_count, self.config.range)?;
            let configs = SkipConfigs::generate(generator, self.config.up_to)?;
            let sorted = configs.options_sorted();
            searches.push(Search { configs, sorted });
        }

        Ok(WaveEngine {
            rules: self.rules,
            searches,
            pivots,
            config: self.config,
        })
    }
}

// ============================================================
// PARALLEL SCANNING
// ============================================================

use rayon::prelude::*;

/// Result of scanning a single instrument
#[derive(Debug, Clone, serde::Serialize)]
pub struct ScanResult {
    pub symbol: String,
    pub matches: Vec<WaveMatch>,
}

/// Error from scanning a single instrument
#[derive(Debug)]
pub struct ScanError {
    pub symbol: String,
    pub error: WaveError,
}

/// Provider of bars for a symbol, e.g. a market-data client
pub trait BarSource: Send + Sync {
    type Bar: PriceBar + Send;

    fn fetch(&self, symbol: &str) -> Result<Vec<Self::Bar>>;
}

/// Parallel scanning of multiple instruments
pub fn scan_parallel<'a, T, I>(engine: &WaveEngine, instruments: I) -> (Vec<ScanResult>, Vec<ScanError>)
where
    T: PriceBar + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, bars)| {
            engine
                .scan(bars)
                .map(|matches| ScanResult {
                    symbol: symbol.to_string(),
                    matches,
                })
                .map_err(|error| ScanError {
                    symbol: symbol.to_string(),
                    error,
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

/// Fetch and scan every symbol in parallel.
///
/// A symbol whose fetch or scan fails is logged and reported with no matches;
/// it never aborts the others. Output order follows `symbols`.
pub fn screen<S: BarSource>(engine: &WaveEngine, source: &S, symbols: &[&str]) -> Vec<ScanResult> {
    symbols
        .par_iter()
        .map(|&symbol| {
            let matches = source
                .fetch(symbol)
                .and_then(|bars| engine.scan(&bars))
                .unwrap_or_else(|error| {
                    warn!(symbol, error = %error, "scan failed");
                    Vec::new()
                });
            ScanResult {
                symbol: symbol.to_string(),
                matches,
            }
        })
        .collect()
}

// ============================================================
// TESTS
// ============================================================

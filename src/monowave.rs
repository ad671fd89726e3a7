//! Monowaves and the zig-zag builder that chains them
//!
//! An upward monowave starts at a bar's low and ends at a later bar's high; a
//! downward one starts at a high and ends at a low. The builder walks forward
//! from the start bar to the first bar that moves beyond the start price, then
//! follows the run while each bar keeps extending. The bar where the run stalls
//! is the first extremum. Skipping an extremum means continuing to the next bar
//! that moves beyond it and following that run in turn.

use crate::options::SkipConfig;
use crate::pivots::PivotDetector;
use crate::{Direction, PriceBar};

/// One directional price segment between two extrema
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct MonoWave {
    pub direction: Direction,
    pub start_index: usize,
    pub end_index: usize,
    pub start_price: f64,
    pub end_price: f64,
    pub start_time: i64,
    pub end_time: i64,
    /// Highest high over `start_index..=end_index`
    pub high: f64,
    /// Lowest low over `start_index..=end_index`
    pub low: f64,
}

impl MonoWave {
    /// Wave over `bars[start..=end]`, priced from the extremes `direction` implies.
    pub fn from_bars<T: PriceBar>(bars: &[T], start: usize, end: usize, direction: Direction) -> Self {
        let span = &bars[start..=end];
        Self {
            direction,
            start_index: start,
            end_index: end,
            start_price: origin(&bars[start], direction),
            end_price: tip(&bars[end], direction),
            start_time: bars[start].timestamp(),
            end_time: bars[end].timestamp(),
            high: span.iter().map(|b| b.high()).fold(f64::NEG_INFINITY, f64::max),
            low: span.iter().map(|b| b.low()).fold(f64::INFINITY, f64::min),
        }
    }

    #[inline]
    pub fn length(&self) -> f64 {
        (self.end_price - self.start_price).abs()
    }

    /// Number of bars from start to end.
    #[inline]
    pub fn duration(&self) -> usize {
        self.end_index - self.start_index
    }

    #[inline]
    pub fn is_up(&self) -> bool {
        self.direction.is_up()
    }
}

/// Price a wave moving in `direction` starts from.
#[inline]
fn origin<T: PriceBar>(bar: &T, direction: Direction) -> f64 {
    match direction {
        Direction::Up => bar.low(),
        Direction::Down => bar.high(),
    }
}

/// Price a wave moving in `direction` is measured at.
#[inline]
fn tip<T: PriceBar>(bar: &T, direction: Direction) -> f64 {
    match direction {
        Direction::Up => bar.high(),
        Direction::Down => bar.low(),
    }
}

/// Builds monowave chains from a price series
#[derive(Debug, Clone, Copy)]
pub struct MonowaveBuilder<'a, T: PriceBar> {
    bars: &'a [T],
}

impl<'a, T: PriceBar> MonowaveBuilder<'a, T> {
    pub fn new(bars: &'a [T]) -> Self {
        Self { bars }
    }

    /// Wave from `start` that passes over `skip` extrema before ending.
    ///
    /// `None` when the series ends before enough extrema are found.
    pub fn next_wave(&self, start: usize, direction: Direction, skip: usize) -> Option<MonoWave> {
        let start_bar = self.bars.get(start)?;
        let mut beyond = origin(start_bar, direction);
        let mut end = start;

        for _ in 0..=skip {
            end = self.extremum_after(end, beyond, direction)?;
            beyond = tip(&self.bars[end], direction);
        }

        Some(MonoWave::from_bars(self.bars, start, end, direction))
    }

    /// First bar after `from` moving beyond `beyond`, followed to where the run stalls.
    fn extremum_after(&self, from: usize, beyond: f64, direction: Direction) -> Option<usize> {
        let mut peak = (from + 1..self.bars.len())
            .find(|&t| direction.exceeds(tip(&self.bars[t], direction), beyond))?;

        while let Some(next) = self.bars.get(peak + 1) {
            if !direction.exceeds(tip(next, direction), tip(&self.bars[peak], direction)) {
                break;
            }
            peak += 1;
        }

        Some(peak)
    }

    /// Alternating chain of `config.wave_count()` waves, the first moving in `direction`.
    pub fn find_chain(
        &self,
        start: usize,
        config: &SkipConfig,
        direction: Direction,
    ) -> Option<Vec<MonoWave>> {
        let wave_count = config.wave_count();
        let mut waves = Vec::with_capacity(wave_count);
        let mut cursor = start;
        let mut heading = direction;

        for segment in 0..wave_count {
            let wave = self.next_wave(cursor, heading, config.skip(segment))?;
            cursor = wave.end_index;
            heading = heading.opposite();
            waves.push(wave);
        }

        Some(waves)
    }

    /// Upward five-wave chain; `None` unless `config` describes five waves.
    pub fn find_impulse(&self, start: usize, config: &SkipConfig) -> Option<Vec<MonoWave>> {
        if config.wave_count() != 5 {
            return None;
        }
        self.find_chain(start, config, Direction::Up)
    }

    /// Downward A-B-C chain; `None` unless `config` describes three waves.
    pub fn find_correction(&self, start: usize, config: &SkipConfig) -> Option<Vec<MonoWave>> {
        if config.wave_count() != 3 {
            return None;
        }
        self.find_chain(start, config, Direction::Down)
    }

    /// Union of the chains found from each start.
    pub fn find_chains(
        &self,
        starts: &[usize],
        config: &SkipConfig,
        direction: Direction,
    ) -> Vec<Vec<MonoWave>> {
        starts
            .iter()
            .filter_map(|&start| self.find_chain(start, config, direction))
            .collect()
    }

    /// Chains from every confirmed pivot a `direction` wave can start at.
    pub fn find_chains_from_pivots(
        &self,
        detector: &PivotDetector,
        config: &SkipConfig,
        direction: Direction,
    ) -> Vec<Vec<MonoWave>> {
        let starts: Vec<usize> = detector
            .pivots(self.bars, direction.start_pivot())
            .into_iter()
            .map(|p| p.index)
            .collect();
        self.find_chains(&starts, config, direction)
    }
}

// ============================================================
// TESTS
// ============================================================

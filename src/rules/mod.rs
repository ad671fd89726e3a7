//! Wave rules
//!
//! Each rule is a stateless predicate over a chain of monowaves. Rules share
//! the [`WaveRule`] trait so new shapes plug into the engine without changes
//! to the search loop.
//!
//! - **Impulse**: five waves, no overlap between waves 1 and 4
//! - **Leading diagonal**: five contracting waves, overlap allowed
//! - **Correction**: three-wave A-B-C zigzag

use crate::monowave::MonoWave;
use crate::Direction;

pub mod correction;
pub mod diagonal;
pub mod impulse;

pub use correction::*;
pub use diagonal::*;
pub use impulse::*;

/// Named structural predicate over a monowave chain
pub trait WaveRule: Send + Sync {
    fn name(&self) -> &'static str;

    /// Chain length the rule applies to
    fn wave_count(&self) -> usize {
        5
    }

    /// `waves.len()` equals `wave_count()`; callers go through
    /// [`WavePattern::check_rule`](crate::pattern::WavePattern::check_rule).
    fn check(&self, waves: &[MonoWave]) -> bool;
}

/// Odd waves move with the first wave, even waves against it.
pub fn alternates(waves: &[MonoWave]) -> bool {
    let Some(first) = waves.first() else {
        return false;
    };
    waves.iter().enumerate().all(|(n, w)| {
        let expected = if n % 2 == 0 {
            first.direction
        } else {
            first.direction.opposite()
        };
        w.direction == expected
    })
}

/// `wave` ends strictly beyond `price` in the pattern's direction.
#[inline]
pub fn ends_beyond(wave: &MonoWave, price: f64, direction: Direction) -> bool {
    direction.exceeds(wave.end_price, price)
}

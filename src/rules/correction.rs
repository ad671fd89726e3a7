//! Three-wave A-B-C correction

use super::{alternates, ends_beyond, WaveRule};
use crate::monowave::MonoWave;

/// Zigzag correction: B holds above the start of A, C extends past A
#[derive(Debug, Clone, Copy, Default)]
pub struct Correction;

impl WaveRule for Correction {
    fn name(&self) -> &'static str {
        "correction"
    }

    fn wave_count(&self) -> usize {
        3
    }

    fn check(&self, waves: &[MonoWave]) -> bool {
        let [a, b, c] = waves else {
            return false;
        };
        let dir = a.direction;

        alternates(waves) && ends_beyond(b, a.start_price, dir) && ends_beyond(c, a.end_price, dir)
    }
}

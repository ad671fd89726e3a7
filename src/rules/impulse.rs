//! Five-wave impulse

use super::{alternates, ends_beyond, WaveRule};
use crate::monowave::MonoWave;

/// Impulse: 1-2-3-4-5 with wave 3 never the shortest and no 1/4 overlap
#[derive(Debug, Clone, Copy, Default)]
pub struct Impulse;

impl WaveRule for Impulse {
    fn name(&self) -> &'static str {
        "impulse"
    }

    fn check(&self, waves: &[MonoWave]) -> bool {
        let [w1, w2, w3, w4, w5] = waves else {
            return false;
        };
        let dir = w1.direction;

        if !alternates(waves) {
            return false;
        }

        // Wave 2 stays above the start of wave 1
        if !ends_beyond(w2, w1.start_price, dir) {
            return false;
        }

        if !ends_beyond(w3, w1.end_price, dir) {
            return false;
        }

        let (l1, l3, l5) = (w1.length(), w3.length(), w5.length());
        if l3 < l1 && l3 < l5 {
            return false;
        }

        // Wave 4 stays out of wave 1 territory
        ends_beyond(w4, w1.end_price, dir)
    }
}

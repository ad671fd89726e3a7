//! Leading diagonal

use super::{alternates, ends_beyond, WaveRule};
use crate::monowave::MonoWave;

/// Leading diagonal: contracting five-wave wedge; wave 4 may overlap wave 1
#[derive(Debug, Clone, Copy, Default)]
pub struct LeadingDiagonal;

impl WaveRule for LeadingDiagonal {
    fn name(&self) -> &'static str {
        "leading diagonal"
    }

    fn check(&self, waves: &[MonoWave]) -> bool {
        let [w1, w2, w3, w4, w5] = waves else {
            return false;
        };
        let dir = w1.direction;

        if !alternates(waves) {
            return false;
        }

        if !ends_beyond(w2, w1.start_price, dir) || !ends_beyond(w4, w3.start_price, dir) {
            return false;
        }

        if !ends_beyond(w3, w1.end_price, dir) || !ends_beyond(w5, w3.end_price, dir) {
            return false;
        }

        w3.length() < w1.length() && w5.length() < w3.length() && w4.length() < w2.length()
    }
}

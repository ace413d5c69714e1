//! Entropy source abstraction
//!
//! Boards expose a hardware random number generator that yields one 32-bit
//! word per call. The filesystem layer only consumes it.

/// Source of 32-bit random words
pub trait EntropySource {
    /// Returns the next random word
    fn next_u32(&mut self) -> u32;
}

/// Software generator (xorshift32) for hosts without a hardware RNG
///
/// Not suitable for cryptographic use.
#[derive(Debug, Clone)]
pub struct SoftwareEntropy {
    state: u32,
}

impl SoftwareEntropy {
    /// Seeds the generator; a zero seed is replaced since xorshift sticks at 0
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0x2545_f491 } else { seed },
        }
    }
}

impl EntropySource for SoftwareEntropy {
    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}

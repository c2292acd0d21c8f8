//! The repeating counter pattern used by the loopback test.

use crate::constants::{PATTERN_FIRST, PATTERN_LEN, PATTERN_MARKER, PATTERN_RESTART};
use crate::error::{Error, Result};

/// Describes the ascending `0x00..=0xFF` counter and how much of it is
/// written to seed the remote loop.
///
/// Verification always follows the counter rule: values ascend by one,
/// [`marker`](Self::marker) closes a cycle and the next expected value is
/// [`restart`](Self::restart). Only the seed length is configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TestPattern {
    seed_len: usize,
}

impl Default for TestPattern {
    fn default() -> Self {
        Self {
            seed_len: PATTERN_LEN,
        }
    }
}

impl TestPattern {
    /// The full 256-byte pattern.
    pub fn full() -> Self {
        Self::default()
    }

    /// Seed with only the first `len` counter values.
    ///
    /// `len` must be in `1..=256`.
    pub fn with_seed_len(len: usize) -> Result<Self> {
        if len == 0 || len > PATTERN_LEN {
            return Err(Error::InvalidArgument("seed length must be in 1..=256"));
        }
        Ok(Self { seed_len: len })
    }

    /// The 255-byte seed (`0x00..=0xFE`) written by the FTDriver FIFO sample.
    pub fn ftdriver_sample() -> Self {
        Self {
            seed_len: PATTERN_LEN - 1,
        }
    }

    /// Number of bytes in the seed.
    pub fn seed_len(&self) -> usize {
        self.seed_len
    }

    /// Bytes written to the transport when a run starts.
    pub fn seed(&self) -> Vec<u8> {
        (0..=u8::MAX).take(self.seed_len).collect()
    }

    /// Value expected before any byte has been read.
    #[inline]
    pub fn first(&self) -> u8 {
        PATTERN_FIRST
    }

    /// Value that ends a cycle.
    #[inline]
    pub fn marker(&self) -> u8 {
        PATTERN_MARKER
    }

    /// Value expected after each marker.
    #[inline]
    pub fn restart(&self) -> u8 {
        PATTERN_RESTART
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_seed_is_ascending_256() {
        let seed = TestPattern::full().seed();
        assert_eq!(seed.len(), 256);
        assert_eq!(seed[0], 0x00);
        assert_eq!(seed[255], 0xFF);
        assert!(seed.windows(2).all(|w| w[1] == w[0] + 1));
    }

    #[test]
    fn sample_seed_stops_before_marker() {
        let seed = TestPattern::ftdriver_sample().seed();
        assert_eq!(seed.len(), 255);
        assert_eq!(*seed.last().unwrap(), 0xFE);
    }

    #[test]
    fn seed_len_bounds() {
        assert!(TestPattern::with_seed_len(0).is_err());
        assert!(TestPattern::with_seed_len(257).is_err());
        assert_eq!(TestPattern::with_seed_len(16).unwrap().seed(), (0..16).collect::<Vec<u8>>());
    }
}

//! Verifier configuration.

use std::time::Duration;

use crate::constants::{DEFAULT_IDLE_BACKOFF, DEFAULT_READ_BUFFER_SIZE};
use crate::error::{Error, Result};
use crate::pattern::TestPattern;
use crate::types::LineConfig;

/// Settings for one loopback run.
///
/// ```
/// use std::time::Duration;
/// use ftloop::{LineConfig, VerifierConfig};
///
/// let config = VerifierConfig::default()
///     .with_line(LineConfig::new(921_600))
///     .with_idle_backoff(Duration::from_millis(5));
/// assert_eq!(config.read_buffer_size(), 4096);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierConfig {
    line: LineConfig,
    pattern: TestPattern,
    read_buffer_size: usize,
    idle_backoff: Duration,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            line: LineConfig::default(),
            pattern: TestPattern::default(),
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            idle_backoff: DEFAULT_IDLE_BACKOFF,
        }
    }
}

impl VerifierConfig {
    /// Set the line settings passed to the transport at start.
    pub fn with_line(mut self, line: LineConfig) -> Self {
        self.line = line;
        self
    }

    /// Set the seed pattern.
    pub fn with_pattern(mut self, pattern: TestPattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Set the size of the buffer used for each read. The default is 4096.
    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    /// Set the pause taken by [`run`](crate::LoopbackVerifier::run) after an
    /// empty read. Zero yields the thread instead of sleeping.
    pub fn with_idle_backoff(mut self, backoff: Duration) -> Self {
        self.idle_backoff = backoff;
        self
    }

    /// Line settings.
    pub fn line(&self) -> &LineConfig {
        &self.line
    }

    /// Seed pattern.
    pub fn pattern(&self) -> &TestPattern {
        &self.pattern
    }

    /// Read buffer size in bytes.
    pub fn read_buffer_size(&self) -> usize {
        self.read_buffer_size
    }

    /// Pause after an empty read.
    pub fn idle_backoff(&self) -> Duration {
        self.idle_backoff
    }

    /// Check every setting.
    pub fn validate(&self) -> Result<()> {
        if self.read_buffer_size == 0 {
            return Err(Error::InvalidArgument("read buffer size must be non-zero"));
        }
        self.line.validate()
    }
}

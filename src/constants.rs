//! Pattern values and default settings.

use std::time::Duration;

/// First byte of the seed pattern.
pub const PATTERN_FIRST: u8 = 0x00;

/// Byte value that closes a cycle.
pub const PATTERN_MARKER: u8 = 0xFF;

/// Value expected right after a cycle marker.
///
/// Note that this is `0x01`, not [`PATTERN_FIRST`]: once the first cycle has
/// completed, the zero value is skipped.
pub const PATTERN_RESTART: u8 = 0x01;

/// Number of distinct values in the counter pattern.
pub const PATTERN_LEN: usize = 256;

/// Default baud rate (`FTDriver.BAUD115200`).
pub const DEFAULT_BAUDRATE: u32 = 115_200;

/// Default size of the buffer handed to each transport read.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 4096;

/// Default pause after a read that returned no data.
pub const DEFAULT_IDLE_BACKOFF: Duration = Duration::from_millis(1);

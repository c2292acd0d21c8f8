//! Serial line settings handed to a transport when a run starts.
//!
//! These types describe the link the loopback test runs over. The verifier
//! never interprets them; it passes a [`LineConfig`] to
//! [`Transport::configure`](crate::transport::Transport::configure) once,
//! before the seed pattern is written.

use crate::constants::DEFAULT_BAUDRATE;
use crate::error::{Error, Result};

/// Parity bit appended to each character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Parity {
    /// No parity bit.
    #[default]
    None,
    /// Set so the count of ones is odd.
    Odd,
    /// Set so the count of ones is even.
    Even,
}

/// Stop bits after each character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StopBits {
    /// One stop bit.
    #[default]
    One,
    /// Two stop bits.
    Two,
}

/// Data bits per character.
///
/// Only [`DataBits::Eight`] passes [`LineConfig::validate`]; seven-bit
/// framing would clear the top bit of every pattern byte above `0x7F`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataBits {
    /// Seven data bits.
    Seven,
    /// Eight data bits.
    #[default]
    Eight,
}

/// How the two ends throttle each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlowControl {
    /// No throttling.
    #[default]
    Disabled,
    /// RTS/CTS handshake lines.
    Hardware,
    /// XON/XOFF characters.
    ///
    /// The pattern contains `0x11` and `0x13`, so a link that acts on them
    /// will corrupt the echo.
    Software,
}

/// Complete line setup for a loopback run. Defaults to 115200 8N1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineConfig {
    /// Baud rate in bits per second.
    pub baudrate: u32,
    /// Data bits per character.
    pub data_bits: DataBits,
    /// Stop bits per character.
    pub stop_bits: StopBits,
    /// Parity mode.
    pub parity: Parity,
    /// Flow control mode.
    pub flow_control: FlowControl,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BAUDRATE)
    }
}

impl LineConfig {
    /// 8N1 with no flow control at the given baud rate.
    pub fn new(baudrate: u32) -> Self {
        Self {
            baudrate,
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
            parity: Parity::None,
            flow_control: FlowControl::Disabled,
        }
    }

    /// Set the flow control mode.
    pub fn with_flow_control(mut self, flow_control: FlowControl) -> Self {
        self.flow_control = flow_control;
        self
    }

    /// Set data bits, stop bits and parity together.
    pub fn with_framing(mut self, data_bits: DataBits, stop_bits: StopBits, parity: Parity) -> Self {
        self.data_bits = data_bits;
        self.stop_bits = stop_bits;
        self.parity = parity;
        self
    }

    /// Check the settings before they reach a transport.
    ///
    /// Seven data bits are rejected because the test pattern uses all eight
    /// bits of every byte.
    pub fn validate(&self) -> Result<()> {
        if self.baudrate == 0 {
            return Err(Error::InvalidArgument("baud rate must be non-zero"));
        }
        if self.data_bits == DataBits::Seven {
            return Err(Error::InvalidArgument(
                "loopback pattern needs eight data bits",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_115200_8n1() {
        let cfg = LineConfig::default();
        assert_eq!(cfg.baudrate, 115_200);
        assert_eq!(cfg.data_bits, DataBits::Eight);
        assert_eq!(cfg.stop_bits, StopBits::One);
        assert_eq!(cfg.parity, Parity::None);
        assert_eq!(cfg.flow_control, FlowControl::Disabled);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_baud_rejected() {
        assert!(matches!(
            LineConfig::new(0).validate(),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn seven_bit_framing_rejected() {
        let cfg = LineConfig::new(9600).with_framing(DataBits::Seven, StopBits::Two, Parity::Even);
        assert!(cfg.validate().is_err());
    }
}

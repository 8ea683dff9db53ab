use core::fmt;

use crate::spi::DeviceId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Rejected before touching the hardware.
    Config(ConfigError),
    /// BUSY did not clear within the poll bound.
    Timeout,
    /// Another message is still in flight.
    Busy,
    /// The operation needs a poll-mode controller.
    WrongMode,
    /// A polled message was not handed back to the caller.
    Incomplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    InvalidWordWidth(u8),
    LengthTooShort { len: usize, bits_per_word: u8 },
    DividerOverflow { clock_hz: u32, speed_hz: u32 },
    SpeedTooHigh { clock_hz: u32, speed_hz: u32 },
    ZeroSpeed,
    InvalidClock,
    InvalidChipSelect(u8),
    TooManyChipSelects(u8),
    UnsupportedMode(u8),
    UnknownDevice(DeviceId),
    EmptyMessage,
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(err) => write!(f, "invalid configuration: {}", err),
            Error::Timeout => write!(f, "transfer did not complete in time"),
            Error::Busy => write!(f, "controller busy with another message"),
            Error::WrongMode => write!(f, "operation requires a polled controller"),
            Error::Incomplete => write!(f, "message not handed back after completion"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ConfigError::InvalidWordWidth(bits) => {
                write!(f, "unsupported bits per word {}", bits)
            }
            ConfigError::LengthTooShort { len, bits_per_word } => write!(
                f,
                "transfer length {} shorter than one word ({} bits)",
                len, bits_per_word
            ),
            ConfigError::DividerOverflow { clock_hz, speed_hz } => write!(
                f,
                "{} Hz from {} Hz needs a divider wider than 16 bits",
                speed_hz, clock_hz
            ),
            ConfigError::SpeedTooHigh { clock_hz, speed_hz } => write!(
                f,
                "{} Hz cannot be derived from {} Hz",
                speed_hz, clock_hz
            ),
            ConfigError::ZeroSpeed => write!(f, "speed of 0 Hz"),
            ConfigError::InvalidClock => write!(f, "source clock of 0 Hz"),
            ConfigError::InvalidChipSelect(cs) => write!(f, "chip select {} out of range", cs),
            ConfigError::TooManyChipSelects(n) => write!(f, "{} chip selects, at most 8", n),
            ConfigError::UnsupportedMode(bits) => write!(f, "unsupported mode bits {:#04x}", bits),
            ConfigError::UnknownDevice(id) => write!(f, "unknown device {}", id.0),
            ConfigError::EmptyMessage => write!(f, "message without transfers"),
        }
    }
}

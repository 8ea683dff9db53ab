use embedded_hal::spi::{Mode, Phase, Polarity};

use super::codec::WordWidth;
use crate::config::CS_MAX_N;
use crate::error::ConfigError;

/// Index of a device in the controller's device table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceId(pub usize);

bitflags! {
    /// Device mode word, same bit positions as the usual SPI mode flags.
    pub struct ModeFlags: u8 {
        const CPHA      = 0x01;
        const CPOL      = 0x02;
        const CS_HIGH   = 0x04;
        const LSB_FIRST = 0x08;
    }
}

impl ModeFlags {
    /// What the core can do: it picks the sampling edge and the bit order,
    /// nothing else.
    pub const SUPPORTED: ModeFlags =
        ModeFlags::from_bits_truncate(ModeFlags::CPHA.bits() | ModeFlags::LSB_FIRST.bits());
}

impl From<Mode> for ModeFlags {
    fn from(mode: Mode) -> Self {
        let mut flags = ModeFlags::empty();
        if mode.phase == Phase::CaptureOnSecondTransition {
            flags |= ModeFlags::CPHA;
        }
        if mode.polarity == Polarity::IdleHigh {
            flags |= ModeFlags::CPOL;
        }
        flags
    }
}

/// A device attached to one chip-select line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceConfig {
    pub chip_select: u8,
    pub mode: ModeFlags,
    pub max_speed_hz: u32,
    pub bits_per_word: u8,
}

impl DeviceConfig {
    pub fn new(chip_select: u8, max_speed_hz: u32) -> Self {
        Self {
            chip_select,
            mode: ModeFlags::empty(),
            max_speed_hz,
            bits_per_word: 8,
        }
    }

    pub fn mode(mut self, mode: impl Into<ModeFlags>) -> Self {
        self.mode = mode.into();
        self
    }

    pub fn bits_per_word(mut self, bits: u8) -> Self {
        self.bits_per_word = bits;
        self
    }

    pub(crate) fn validate(&self, chip_select_count: u8) -> Result<(), ConfigError> {
        if self.chip_select >= chip_select_count.min(CS_MAX_N) {
            return Err(ConfigError::InvalidChipSelect(self.chip_select));
        }
        if !ModeFlags::SUPPORTED.contains(self.mode) {
            return Err(ConfigError::UnsupportedMode(self.mode.bits()));
        }
        if self.max_speed_hz == 0 {
            return Err(ConfigError::ZeroSpeed);
        }
        if WordWidth::from_bits(self.bits_per_word).is_none() {
            return Err(ConfigError::InvalidWordWidth(self.bits_per_word));
        }
        Ok(())
    }
}

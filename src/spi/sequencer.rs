use log::*;

use super::codec::WordWidth;
use super::device::{DeviceConfig, ModeFlags};
use super::layout::{offsets, Control};
use super::message::Transfer;
use super::register::{RegisterAccess, RegisterIo};
use crate::config::DIVIDER_MAX;
use crate::error::ConfigError;
use crate::timer::Timer;

/// f_sclk = f_clk / (2 * (div + 1))
///
/// clock_hz = 100 MHz, speed_hz = 1 MHz gives div = 49
pub fn divider(clock_hz: u32, speed_hz: u32) -> Result<u16, ConfigError> {
    if speed_hz == 0 {
        return Err(ConfigError::ZeroSpeed);
    }
    let quotient = clock_hz as u64 / (2 * speed_hz as u64);
    if quotient == 0 {
        return Err(ConfigError::SpeedTooHigh { clock_hz, speed_hz });
    }
    let div = quotient - 1;
    if div > DIVIDER_MAX as u64 {
        return Err(ConfigError::DividerOverflow { clock_hz, speed_hz });
    }
    Ok(div as u16)
}

/// Register settings for one transfer, resolved before the message
/// touches the hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Setup {
    pub width: WordWidth,
    pub ctrl: Control,
    pub divider: u16,
}

impl Setup {
    pub fn resolve(
        transfer: &Transfer,
        device: &DeviceConfig,
        clock_hz: u32,
        ctrl_base: Control,
    ) -> Result<Self, ConfigError> {
        let bits = transfer.bits_per_word.unwrap_or(device.bits_per_word);
        let width = WordWidth::from_bits(bits).ok_or(ConfigError::InvalidWordWidth(bits))?;

        let len = transfer.len();
        if len * 8 < bits as usize {
            return Err(ConfigError::LengthTooShort {
                len,
                bits_per_word: bits,
            });
        }

        let hz = transfer.speed_hz.unwrap_or(device.max_speed_hz);
        let divider = divider(clock_hz, hz)?;

        let mut ctrl = ctrl_base;
        if device.mode.contains(ModeFlags::CPHA) {
            ctrl |= Control::RX_NEG;
        } else {
            ctrl |= Control::TX_NEG;
        }
        if device.mode.contains(ModeFlags::LSB_FIRST) {
            ctrl |= Control::LSB;
        }
        ctrl |= Control::char_len(bits);

        Ok(Self {
            width,
            ctrl,
            divider,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstState {
    Idle,
    Configured,
    Running,
    Complete,
    TimedOut,
}

/// Position inside the active transfer.
#[derive(Debug)]
struct Cursor {
    width: WordWidth,
    remaining: usize,
    tx_offset: usize,
    rx_offset: usize,
    state: BurstState,
}

/// Drives the bursts of one transfer at a time over the register window.
pub struct Sequencer<I: RegisterIo> {
    regs: RegisterAccess<I>,
    cursor: Option<Cursor>,
}

impl<I: RegisterIo> Sequencer<I> {
    pub fn new(regs: RegisterAccess<I>) -> Self {
        Self { regs, cursor: None }
    }

    pub fn state(&self) -> BurstState {
        self.cursor.as_ref().map_or(BurstState::Idle, |c| c.state)
    }

    pub fn into_regs(self) -> RegisterAccess<I> {
        self.regs
    }

    /// Program CTRL and DIV for a new transfer. GO stays clear.
    pub fn configure(&mut self, setup: &Setup, len: usize) {
        self.write_config(setup.ctrl, setup.divider);
        self.cursor = Some(Cursor {
            width: setup.width,
            remaining: len,
            tx_offset: 0,
            rx_offset: 0,
            state: BurstState::Configured,
        });
    }

    fn write_config(&mut self, ctrl: Control, divider: u16) {
        let ctrl = ctrl - Control::GO;
        self.regs.write(offsets::CTRL, ctrl.bits());
        self.regs.write(offsets::DIV, divider as u32);
    }

    /// Load the next word of the Tx buffer, if there is one.
    pub fn push(&mut self, transfer: &Transfer) -> usize {
        let cursor = match self.cursor.as_mut() {
            Some(cursor) => cursor,
            None => return 0,
        };
        let len = match transfer.tx_buf() {
            Some(tx) => tx
                .get(cursor.tx_offset..)
                .map_or(0, |src| cursor.width.push(&mut self.regs, src)),
            None => 0,
        };
        cursor.tx_offset += len;
        len
    }

    /// Assert chip-select and set GO.
    pub fn start(&mut self, chip_select: u8) {
        self.chip_select(chip_select, true);
        let ctrl = self.regs.read(offsets::CTRL) | Control::GO.bits();
        self.regs.write(offsets::CTRL, ctrl);
        if let Some(cursor) = self.cursor.as_mut() {
            trace!(
                "burst: cs {} {} bits, {} bytes left",
                chip_select,
                cursor.width.bits(),
                cursor.remaining
            );
            cursor.state = BurstState::Running;
        }
    }

    pub fn is_busy(&self) -> bool {
        Control::from_bits_truncate(self.regs.read(offsets::CTRL)).contains(Control::BUSY)
    }

    /// Account for the burst that just finished and unload the Rx slots.
    pub fn drain(&mut self, transfer: &mut Transfer) -> usize {
        let cursor = match self.cursor.as_mut() {
            Some(cursor) => cursor,
            None => return 0,
        };
        cursor.remaining = cursor.remaining.saturating_sub(cursor.width.bytes());
        cursor.state = BurstState::Complete;

        let len = match transfer.rx_buf_mut() {
            Some(rx) => rx
                .get_mut(cursor.rx_offset..)
                .map_or(0, |dst| cursor.width.pop(&self.regs, dst)),
            None => 0,
        };
        cursor.rx_offset += len;
        len
    }

    pub fn has_pending(&self) -> bool {
        self.cursor.as_ref().map_or(false, |c| c.remaining > 0)
    }

    /// Post-transfer delay and optional chip-select release.
    pub fn finish<T: Timer>(&mut self, transfer: &Transfer, chip_select: u8, timer: &mut T) {
        if transfer.delay_us != 0 {
            timer.delay_us(transfer.delay_us);
        }
        if transfer.cs_change {
            self.chip_select(chip_select, false);
        }
        self.cursor = None;
    }

    /// Read-modify-write of one line in the CS mask.
    pub fn chip_select(&mut self, chip_select: u8, enable: bool) {
        let bit = 1u32 << chip_select;
        let ss = self.regs.read(offsets::CS);
        let ss = if enable { ss | bit } else { ss & !bit };
        self.regs.write(offsets::CS, ss);
    }

    /// Clear CTRL and DIV; disables the interrupt.
    pub fn disable(&mut self) {
        self.write_config(Control::empty(), 0);
    }

    /// Leave the core idle after a burst that never finished. The cursor
    /// stays in `TimedOut` until the next transfer is configured.
    pub fn shutdown(&mut self) {
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.state = BurstState::TimedOut;
            cursor.remaining = 0;
        }
        self.disable();
        self.regs.write(offsets::CS, 0);
    }
}

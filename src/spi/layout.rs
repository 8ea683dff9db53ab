use super::register::*;
use crate::config::FIFO_SLOTS;

#[doc = "Register window of the SPI master core"]
#[repr(C)]
pub struct RegisterBlock {
    #[doc = "0x00..0x0C: Tx FIFO slots on write, Rx FIFO slots on read"]
    pub fifo: [FIFO; FIFO_SLOTS],
    #[doc = "0x10: Control and status register"]
    pub ctrl: CTRL,
    #[doc = "0x14: Clock divider register (16 bits)"]
    pub div: DIV,
    #[doc = "0x18: Slave select register"]
    pub cs: CS,
}

#[allow(unused)]
pub mod offsets {
    use crate::config::FIFO_SLOT_BYTES;

    pub const CTRL: usize = 0x10;
    pub const DIV: usize = 0x14;
    pub const CS: usize = 0x18;

    /// Tx and Rx share the same offsets
    pub const fn tx(idx: usize) -> usize {
        idx * FIFO_SLOT_BYTES
    }

    pub const fn rx(idx: usize) -> usize {
        idx * FIFO_SLOT_BYTES
    }

    pub const fn slot(offset: usize) -> usize {
        offset / FIFO_SLOT_BYTES
    }
}

bitflags! {
    /// CTRL register fields
    pub struct Control: u32 {
        const CHAR_LEN = 0x007F;
        const GO       = 0x0100;
        const RX_NEG   = 0x0200;
        const TX_NEG   = 0x0400;
        const LSB      = 0x0800;
        const IE       = 0x1000;
        const ASS      = 0x2000;
    }
}

impl Control {
    /// GO reads back as BUSY while a burst is shifting.
    pub const BUSY: Control = Control::GO;

    /// Character length field. 128 does not fit in 7 bits and wraps to 0,
    /// which the core reads as 128.
    pub fn char_len(bits: u8) -> Control {
        Control::from_bits_truncate(bits as u32 & Control::CHAR_LEN.bits())
    }
}

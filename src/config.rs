use alloc::vec::Vec;

use crate::spi::DeviceConfig;

/* FIFO */
pub const FIFO_SLOTS: usize = 4;
pub const FIFO_SLOT_BYTES: usize = 4;
pub const FIFO_BYTES: usize = FIFO_SLOTS * FIFO_SLOT_BYTES;

/* CHIP SELECT */
pub const CS_MAX_N: u8 = 8;

/* CLOCK */
pub const DIVIDER_MAX: u32 = 0xFFFF;

/* COMPLETION */
pub const POLL_TIMEOUT_MS: u64 = 100;

/// Byte order of the bus the core sits on, relative to the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Native,
    Swapped,
}

impl Default for ByteOrder {
    fn default() -> Self {
        ByteOrder::Native
    }
}

/// What the host knows about one controller instance before it starts
/// using it.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub clock_hz: u32,
    pub byte_order: ByteOrder,
    /// `None` means the interrupt line is not wired and the controller polls.
    pub interrupt_line: Option<u32>,
    pub chip_select_count: u8,
    pub poll_timeout_ms: u64,
    pub devices: Vec<DeviceConfig>,
}

impl ControllerConfig {
    pub fn new(clock_hz: u32) -> Self {
        Self {
            clock_hz,
            byte_order: ByteOrder::Native,
            interrupt_line: None,
            chip_select_count: CS_MAX_N,
            poll_timeout_ms: POLL_TIMEOUT_MS,
            devices: Vec::new(),
        }
    }

    pub fn byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    pub fn interrupt_line(mut self, line: u32) -> Self {
        self.interrupt_line = Some(line);
        self
    }

    pub fn chip_select_count(mut self, count: u8) -> Self {
        self.chip_select_count = count;
        self
    }

    pub fn poll_timeout_ms(mut self, timeout: u64) -> Self {
        self.poll_timeout_ms = timeout;
        self
    }

    pub fn device(mut self, device: DeviceConfig) -> Self {
        self.devices.push(device);
        self
    }
}

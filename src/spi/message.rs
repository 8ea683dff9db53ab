use alloc::vec::Vec;

use super::device::DeviceId;
use crate::error::Error;

/// One full-duplex exchange at a fixed word size and speed.
///
/// The hardware always clocks both directions; a missing Tx buffer leaves
/// the FIFO contents as they are, a missing Rx buffer drops what came back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    tx: Option<Vec<u8>>,
    rx: Option<Vec<u8>>,
    len: usize,
    /// Falls back to the device default when `None`.
    pub bits_per_word: Option<u8>,
    /// Falls back to the device maximum when `None`.
    pub speed_hz: Option<u32>,
    /// Release chip-select once this transfer is done.
    pub cs_change: bool,
    pub delay_us: u32,
}

impl Transfer {
    fn with_buffers(tx: Option<Vec<u8>>, rx: Option<Vec<u8>>, len: usize) -> Self {
        Self {
            tx,
            rx,
            len,
            bits_per_word: None,
            speed_hz: None,
            cs_change: false,
            delay_us: 0,
        }
    }

    pub fn write(data: Vec<u8>) -> Self {
        let len = data.len();
        Self::with_buffers(Some(data), None, len)
    }

    pub fn read(len: usize) -> Self {
        Self::with_buffers(None, Some(vec![0; len]), len)
    }

    /// Send `data` and keep what the device shifts back, byte for byte.
    pub fn duplex(data: Vec<u8>) -> Self {
        let len = data.len();
        Self::with_buffers(Some(data), Some(vec![0; len]), len)
    }

    pub fn bits_per_word(mut self, bits: u8) -> Self {
        self.bits_per_word = Some(bits);
        self
    }

    pub fn speed_hz(mut self, hz: u32) -> Self {
        self.speed_hz = Some(hz);
        self
    }

    pub fn cs_change(mut self) -> Self {
        self.cs_change = true;
        self
    }

    pub fn delay_us(mut self, us: u32) -> Self {
        self.delay_us = us;
        self
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn tx_buf(&self) -> Option<&[u8]> {
        self.tx.as_deref()
    }

    pub fn rx_buf(&self) -> Option<&[u8]> {
        self.rx.as_deref()
    }

    pub(crate) fn rx_buf_mut(&mut self) -> Option<&mut [u8]> {
        self.rx.as_deref_mut()
    }

    pub fn into_rx(self) -> Option<Vec<u8>> {
        self.rx
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Pending,
    InProgress,
    Success,
    Failed(Error),
}

/// Transfers for one device, run in order with chip-select held across
/// them unless a transfer asks for a release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub device: DeviceId,
    pub transfers: Vec<Transfer>,
    pub status: Status,
}

impl Message {
    pub fn new(device: DeviceId) -> Self {
        Self {
            device,
            transfers: Vec::new(),
            status: Status::Pending,
        }
    }

    pub fn with_transfers(device: DeviceId, transfers: Vec<Transfer>) -> Self {
        Self {
            device,
            transfers,
            status: Status::Pending,
        }
    }

    pub fn push(mut self, transfer: Transfer) -> Self {
        self.transfers.push(transfer);
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

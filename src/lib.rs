//! Driver for the OpenCores-style SPI master found in the OHWR general cores.
//!
//! The core exposes a 128-bit shift register through four FIFO slots, a
//! control register, a clock divider and a chip-select mask. This crate
//! drives it one message at a time, either from the interrupt handler or
//! by polling the BUSY bit from the submitting context.

#![cfg_attr(not(test), no_std)]

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate alloc;

pub mod config;
pub mod error;
pub mod spi;
pub mod timer;

pub use config::{ByteOrder, ControllerConfig};
pub use error::{ConfigError, Error};
pub use spi::{
    Controller, DeviceConfig, DeviceId, IrqReturn, Message, MessageClient, ModeFlags, Rejected,
    SpiBus, SpiDevice, Status, Transfer,
};
pub use timer::Timer;

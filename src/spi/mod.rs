//! SPI master core: register access, word packing, burst sequencing and
//! the message driver on top.

mod codec;
mod completion;
mod controller;
mod device;
mod hal;
pub mod layout;
mod message;
pub mod register;
mod sequencer;
mod wrapper;

#[cfg(test)]
pub(crate) mod testing;

pub use codec::WordWidth;
pub use completion::{CompletionMode, IrqReturn, Outcome};
pub use controller::{Controller, MessageClient, Rejected};
pub use device::{DeviceConfig, DeviceId, ModeFlags};
pub use hal::SpiDevice;
pub use message::{Message, Status, Transfer};
pub use register::{Mmio, RegisterAccess, RegisterIo};
pub use sequencer::{divider, BurstState, Setup};
pub use wrapper::SpiBus;

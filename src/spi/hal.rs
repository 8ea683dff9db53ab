use alloc::vec::Vec;
use embedded_hal::blocking::spi as blocking;

use super::completion::CompletionMode;
use super::controller::Controller;
use super::device::DeviceId;
use super::message::{Message, Status, Transfer};
use super::register::RegisterIo;
use crate::error::{ConfigError, Error};
use crate::timer::Timer;

/// Blocking byte-wide access to one device of a polled controller.
pub struct SpiDevice<'a, I: RegisterIo, T: Timer> {
    controller: &'a mut Controller<I, T>,
    device: DeviceId,
}

impl<I: RegisterIo, T: Timer> Controller<I, T> {
    /// Borrow the controller as an embedded-hal SPI device. Needs poll mode
    /// and no message client, since results are collected in place.
    pub fn device(&mut self, device: DeviceId) -> Result<SpiDevice<'_, I, T>, Error> {
        if self.mode != CompletionMode::Poll || self.has_client() {
            return Err(Error::WrongMode);
        }
        if self.device_config(device).is_none() {
            return Err(ConfigError::UnknownDevice(device).into());
        }
        Ok(SpiDevice {
            controller: self,
            device,
        })
    }
}

impl<'a, I: RegisterIo, T: Timer> SpiDevice<'a, I, T> {
    fn run(&mut self, transfer: Transfer) -> Result<Transfer, Error> {
        self.controller
            .submit(Message::with_transfers(self.device, vec![transfer]))
            .map_err(|rejected| rejected.error)?;
        let mut message = self.controller.take_completed().ok_or(Error::Incomplete)?;
        match message.status {
            Status::Success => message.transfers.pop().ok_or(Error::Incomplete),
            Status::Failed(err) => Err(err),
            Status::Pending | Status::InProgress => Err(Error::Incomplete),
        }
    }
}

impl<'a, I: RegisterIo, T: Timer> blocking::Transfer<u8> for SpiDevice<'a, I, T> {
    type Error = Error;

    fn transfer<'w>(&mut self, words: &'w mut [u8]) -> Result<&'w [u8], Self::Error> {
        if words.is_empty() {
            return Ok(words);
        }
        let rx: Option<Vec<u8>> = self.run(Transfer::duplex(words.to_vec()))?.into_rx();
        if let Some(rx) = rx {
            words.copy_from_slice(&rx);
        }
        Ok(words)
    }
}

impl<'a, I: RegisterIo, T: Timer> blocking::Write<u8> for SpiDevice<'a, I, T> {
    type Error = Error;

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        if words.is_empty() {
            return Ok(());
        }
        self.run(Transfer::write(words.to_vec())).map(|_| ())
    }
}

use alloc::boxed::Box;
use alloc::vec::Vec;
use log::*;

use super::completion::CompletionMode;
use super::device::{DeviceConfig, DeviceId};
use super::layout::Control;
use super::message::{Message, Status};
use super::register::{RegisterAccess, RegisterIo};
use super::sequencer::{BurstState, Sequencer, Setup};
use crate::config::{ControllerConfig, CS_MAX_N};
use crate::error::{ConfigError, Error};
use crate::timer::Timer;

/// Receives each message once the controller is done with it.
pub trait MessageClient {
    fn message_complete(&mut self, message: Message);
}

impl<F: FnMut(Message)> MessageClient for F {
    fn message_complete(&mut self, message: Message) {
        self(message)
    }
}

/// A message handed back by `submit` without being started.
#[derive(Debug)]
pub struct Rejected {
    pub error: Error,
    pub message: Message,
}

/// The message currently owned by the controller.
pub(super) struct Active {
    pub(super) message: Message,
    pub(super) chip_select: u8,
    pub(super) setups: Vec<Setup>,
    pub(super) index: usize,
}

/// One SPI master core.
pub struct Controller<I: RegisterIo, T: Timer> {
    pub(super) seq: Sequencer<I>,
    pub(super) timer: T,
    pub(super) mode: CompletionMode,
    pub(super) poll_timeout_ms: u64,
    pub(super) active: Option<Active>,
    clock_hz: u32,
    ctrl_base: Control,
    chip_select_count: u8,
    devices: Vec<DeviceConfig>,
    completed: Option<Message>,
    client: Option<Box<dyn MessageClient + Send>>,
}

impl<I: RegisterIo, T: Timer> Controller<I, T> {
    /// Nothing is written to the core until the first message.
    pub fn new(io: I, timer: T, config: ControllerConfig) -> Result<Self, Error> {
        if config.clock_hz == 0 {
            return Err(ConfigError::InvalidClock.into());
        }
        if config.chip_select_count == 0 || config.chip_select_count > CS_MAX_N {
            return Err(ConfigError::TooManyChipSelects(config.chip_select_count).into());
        }

        let mode = match config.interrupt_line {
            Some(_) => CompletionMode::Interrupt,
            None => CompletionMode::Poll,
        };
        let ctrl_base = match mode {
            CompletionMode::Interrupt => Control::IE,
            CompletionMode::Poll => Control::empty(),
        };

        let mut controller = Self {
            seq: Sequencer::new(RegisterAccess::new(io, config.byte_order)),
            timer,
            mode,
            poll_timeout_ms: config.poll_timeout_ms,
            active: None,
            clock_hz: config.clock_hz,
            ctrl_base,
            chip_select_count: config.chip_select_count,
            devices: Vec::with_capacity(config.devices.len()),
            completed: None,
            client: None,
        };
        for device in config.devices {
            controller.configure(device)?;
        }
        debug!(
            "spi: {} Hz, {:?} mode, {} devices",
            controller.clock_hz,
            controller.mode,
            controller.devices.len()
        );
        Ok(controller)
    }

    /// Check a device against what the core supports and add it to the
    /// device table.
    pub fn configure(&mut self, device: DeviceConfig) -> Result<DeviceId, Error> {
        device.validate(self.chip_select_count)?;
        super::sequencer::divider(self.clock_hz, device.max_speed_hz)?;
        let id = DeviceId(self.devices.len());
        self.devices.push(device);
        debug!("spi: device {} on cs {}", id.0, device.chip_select);
        Ok(id)
    }

    pub fn device_config(&self, id: DeviceId) -> Option<&DeviceConfig> {
        self.devices.get(id.0)
    }

    pub fn mode(&self) -> CompletionMode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn burst_state(&self) -> BurstState {
        self.seq.state()
    }

    pub fn set_client(&mut self, client: impl MessageClient + Send + 'static) {
        self.client = Some(Box::new(client));
    }

    pub(super) fn has_client(&self) -> bool {
        self.client.is_some()
    }

    /// The last finished message, when no client is installed.
    pub fn take_completed(&mut self) -> Option<Message> {
        self.completed.take()
    }

    /// Take ownership of `message` and start its first transfer.
    ///
    /// In poll mode the message is run to its end before this returns; in
    /// interrupt mode the rest happens in [`Controller::handle_irq`]. Either
    /// way the outcome is reported through the message status.
    pub fn submit(&mut self, mut message: Message) -> Result<(), Rejected> {
        if self.active.is_some() {
            debug!("spi: submit while busy");
            return Err(Rejected {
                error: Error::Busy,
                message,
            });
        }

        let (chip_select, setups) = match self.validate(&message) {
            Ok(plan) => plan,
            Err(err) => {
                error!("spi: message rejected: {}", err);
                let error = Error::Config(err);
                message.status = Status::Failed(error);
                return Err(Rejected { error, message });
            }
        };

        debug!(
            "spi: message for cs {}, {} transfers",
            chip_select,
            message.transfers.len()
        );
        message.status = Status::InProgress;
        self.active = Some(Active {
            message,
            chip_select,
            setups,
            index: 0,
        });
        self.start_transfer();

        if self.mode == CompletionMode::Poll {
            if let Err(err) = self.run_polled() {
                debug!("spi: polled message failed: {}", err);
            }
        }
        Ok(())
    }

    fn validate(&self, message: &Message) -> Result<(u8, Vec<Setup>), ConfigError> {
        let device = self
            .devices
            .get(message.device.0)
            .ok_or(ConfigError::UnknownDevice(message.device))?;
        if message.transfers.is_empty() {
            return Err(ConfigError::EmptyMessage);
        }
        let setups = message
            .transfers
            .iter()
            .map(|t| Setup::resolve(t, device, self.clock_hz, self.ctrl_base))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((device.chip_select, setups))
    }

    /// Configure the core for the current transfer and start its first
    /// burst. Returns false when the message has no transfer left.
    pub(super) fn start_transfer(&mut self) -> bool {
        let active = match self.active.as_mut() {
            Some(active) => active,
            None => return false,
        };
        let (transfer, setup) = match (
            active.message.transfers.get(active.index),
            active.setups.get(active.index),
        ) {
            (Some(transfer), Some(setup)) => (transfer, setup),
            _ => return false,
        };
        trace!(
            "spi: transfer {}: {} bytes, div {}",
            active.index,
            transfer.len(),
            setup.divider
        );
        self.seq.configure(setup, transfer.len());
        self.seq.push(transfer);
        self.seq.start(active.chip_select);
        true
    }

    /// Close the current transfer and move on to the next one.
    pub(super) fn finish_transfer(&mut self) {
        if let Some(active) = self.active.as_mut() {
            if let Some(transfer) = active.message.transfers.get(active.index) {
                self.seq.finish(transfer, active.chip_select, &mut self.timer);
            }
            active.index += 1;
        }
    }

    /// Release chip-select and hand the message back to the host.
    pub(super) fn finalize(&mut self, status: Status) {
        let mut active = match self.active.take() {
            Some(active) => active,
            None => return,
        };
        self.seq.chip_select(active.chip_select, false);
        active.message.status = status;
        debug!("spi: message done: {:?}", status);

        match self.client.as_mut() {
            Some(client) => client.message_complete(active.message),
            None => {
                if self.completed.is_some() {
                    warn!("spi: dropping a completed message nobody collected");
                }
                self.completed = Some(active.message);
            }
        }
    }

    /// Clear control and divider, which also masks the interrupt.
    pub fn unprepare(&mut self) -> Result<(), Error> {
        if self.active.is_some() {
            return Err(Error::Busy);
        }
        self.seq.disable();
        Ok(())
    }

    pub fn free(self) -> (I, T) {
        (self.seq.into_regs().into_inner(), self.timer)
    }
}

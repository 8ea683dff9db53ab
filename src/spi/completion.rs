//! The two ways a burst is noticed to be over.
//!
//! Both end up in [`Controller::advance`]; the interrupt handler calls it
//! once per interrupt, the poll loop calls it after BUSY clears.

use core::convert::Infallible;
use log::*;

use super::controller::Controller;
use super::message::Status;
use super::register::RegisterIo;
use crate::error::Error;
use crate::timer::{Deadline, Timer};

/// Fixed for the controller's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionMode {
    Interrupt,
    Poll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Another burst is running.
    Continue,
    /// Nothing left to shift for the current transfer or message.
    Exhausted,
    /// The core is still shifting; nothing was touched.
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqReturn {
    None,
    Handled,
}

impl<I: RegisterIo, T: Timer> Controller<I, T> {
    /// Drain the finished burst and start the next one of the same
    /// transfer. `Exhausted` once the transfer has no bytes left.
    pub fn advance(&mut self) -> Outcome {
        if self.seq.is_busy() {
            return Outcome::Busy;
        }
        let active = match self.active.as_mut() {
            Some(active) => active,
            None => return Outcome::Exhausted,
        };
        let transfer = match active.message.transfers.get_mut(active.index) {
            Some(transfer) => transfer,
            None => return Outcome::Exhausted,
        };

        self.seq.drain(transfer);
        if !self.seq.has_pending() {
            return Outcome::Exhausted;
        }
        self.seq.push(transfer);
        self.seq.start(active.chip_select);
        Outcome::Continue
    }

    /// One step of the message: advance the burst and, when the transfer
    /// runs dry, move to the next transfer or finalize the message.
    /// `Exhausted` here means the whole message is done.
    pub(super) fn process(&mut self) -> Outcome {
        if self.active.is_none() {
            return Outcome::Exhausted;
        }
        match self.advance() {
            Outcome::Exhausted => {
                self.finish_transfer();
                if self.start_transfer() {
                    Outcome::Continue
                } else {
                    self.finalize(Status::Success);
                    Outcome::Exhausted
                }
            }
            outcome => outcome,
        }
    }

    /// Entry point for the host's interrupt handler.
    pub fn handle_irq(&mut self) -> IrqReturn {
        if self.mode != CompletionMode::Interrupt || self.active.is_none() {
            return IrqReturn::None;
        }
        match self.process() {
            Outcome::Busy => {
                warn!("spi: interrupt while busy, not ours");
                IrqReturn::None
            }
            Outcome::Continue | Outcome::Exhausted => IrqReturn::Handled,
        }
    }

    /// Non-blocking completion check for the poll loop.
    pub(super) fn poll_complete(&mut self) -> nb::Result<Outcome, Infallible> {
        match self.process() {
            Outcome::Busy => Err(nb::Error::WouldBlock),
            outcome => Ok(outcome),
        }
    }

    /// Run the active message to its end from the calling context.
    pub(super) fn run_polled(&mut self) -> Result<(), Error> {
        loop {
            let deadline = Deadline::after(&self.timer, self.poll_timeout_ms);
            let outcome = loop {
                match self.poll_complete() {
                    Ok(outcome) => break outcome,
                    Err(nb::Error::WouldBlock) => {
                        if deadline.expired(&self.timer) {
                            return Err(self.time_out());
                        }
                    }
                    Err(nb::Error::Other(never)) => match never {},
                }
            };
            if outcome == Outcome::Exhausted {
                return Ok(());
            }
        }
    }

    fn time_out(&mut self) -> Error {
        error!(
            "spi: burst still busy after {} ms, giving up",
            self.poll_timeout_ms
        );
        self.seq.shutdown();
        self.finalize(Status::Failed(Error::Timeout));
        Error::Timeout
    }
}

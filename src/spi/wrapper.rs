use spin::{Mutex, MutexGuard};

use super::completion::IrqReturn;
use super::controller::{Controller, Rejected};
use super::message::Message;
use super::register::RegisterIo;
use crate::timer::Timer;

/// A controller shared between thread context and its interrupt handler.
///
/// The lock is a spinlock: on a single hart the caller must keep the
/// interrupt line masked while it holds the controller from thread context.
pub struct SpiBus<I: RegisterIo, T: Timer> {
    pub inner: Mutex<Controller<I, T>>,
}

impl<I: RegisterIo, T: Timer> SpiBus<I, T> {
    pub fn new(controller: Controller<I, T>) -> Self {
        Self {
            inner: Mutex::new(controller),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, Controller<I, T>> {
        self.inner.lock()
    }

    pub fn submit(&self, message: Message) -> Result<(), Rejected> {
        self.inner.lock().submit(message)
    }

    pub fn handle_irq(&self) -> IrqReturn {
        self.inner.lock().handle_irq()
    }

    pub fn take_completed(&self) -> Option<Message> {
        self.inner.lock().take_completed()
    }
}

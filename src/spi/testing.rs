//! Software model of the core for unit tests.
//!
//! Registers live behind a shared handle so a test can keep a clone and
//! inspect them while the controller owns the other one. Every write is
//! logged. Setting GO starts a burst that stays BUSY for a configurable
//! number of CTRL reads; when it ends the FIFO holds the device's answer
//! (a loopback by default).

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use embedded_hal::blocking::delay::DelayUs;

use super::layout::{offsets, Control};
use super::register::RegisterIo;
use crate::config::{ByteOrder, FIFO_SLOTS};
use crate::timer::Timer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Write {
    pub offset: usize,
    pub value: u32,
}

impl Write {
    pub fn new(offset: usize, value: u32) -> Self {
        Self { offset, value }
    }
}

/// What the core had latched when GO was set, in CPU byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Burst {
    pub ctrl: u32,
    pub div: u32,
    pub cs: u32,
    pub fifo: [u32; FIFO_SLOTS],
}

struct State {
    fifo: [u32; FIFO_SLOTS],
    ctrl: u32,
    div: u32,
    cs: u32,
    swapped: bool,
    busy_reads: Option<usize>,
    busy_left: usize,
    writes: Vec<Write>,
    bursts: Vec<Burst>,
    responder: Box<dyn FnMut(&mut [u32; FIFO_SLOTS])>,
}

#[derive(Clone)]
pub struct FakeCore(Rc<RefCell<State>>);

impl FakeCore {
    pub fn new() -> Self {
        Self::with_byte_order(ByteOrder::Native)
    }

    pub fn with_byte_order(order: ByteOrder) -> Self {
        FakeCore(Rc::new(RefCell::new(State {
            fifo: [0; FIFO_SLOTS],
            ctrl: 0,
            div: 0,
            cs: 0,
            swapped: order == ByteOrder::Swapped,
            busy_reads: Some(1),
            busy_left: 0,
            writes: Vec::new(),
            bursts: Vec::new(),
            responder: Box::new(|_| {}),
        })))
    }

    /// Number of CTRL reads that still see BUSY after GO. `None` keeps the
    /// core busy until [`FakeCore::settle`].
    pub fn busy_for(&self, reads: Option<usize>) {
        self.0.borrow_mut().busy_reads = reads;
    }

    /// Replace the loopback with a device model.
    pub fn respond_with(&self, responder: impl FnMut(&mut [u32; FIFO_SLOTS]) + 'static) {
        self.0.borrow_mut().responder = Box::new(responder);
    }

    /// Finish the running burst now.
    pub fn settle(&self) {
        let mut st = self.0.borrow_mut();
        if to_cpu(st.swapped, st.ctrl) & Control::GO.bits() != 0 {
            complete(&mut st);
        }
    }

    /// Value as stored on the bus.
    pub fn raw(&self, offset: usize) -> u32 {
        let st = self.0.borrow();
        match offset {
            offsets::CTRL => st.ctrl,
            offsets::DIV => st.div,
            offsets::CS => st.cs,
            _ => st.fifo[offsets::slot(offset)],
        }
    }

    /// Value as the CPU means it.
    pub fn reg(&self, offset: usize) -> u32 {
        let swapped = self.0.borrow().swapped;
        to_cpu(swapped, self.raw(offset))
    }

    pub fn set_raw(&self, offset: usize, value: u32) {
        let mut st = self.0.borrow_mut();
        match offset {
            offsets::CTRL => st.ctrl = value,
            offsets::DIV => st.div = value,
            offsets::CS => st.cs = value,
            _ => st.fifo[offsets::slot(offset)] = value,
        }
    }

    pub fn writes(&self) -> Vec<Write> {
        self.0.borrow().writes.clone()
    }

    /// CS values written, in order, CPU byte order.
    pub fn cs_history(&self) -> Vec<u32> {
        let st = self.0.borrow();
        st.writes
            .iter()
            .filter(|w| w.offset == offsets::CS)
            .map(|w| to_cpu(st.swapped, w.value))
            .collect()
    }

    pub fn bursts(&self) -> Vec<Burst> {
        self.0.borrow().bursts.clone()
    }
}

fn to_cpu(swapped: bool, value: u32) -> u32 {
    if swapped {
        value.swap_bytes()
    } else {
        value
    }
}

fn complete(st: &mut State) {
    let swapped = st.swapped;
    let mut fifo = st.fifo.map(|v| to_cpu(swapped, v));
    (st.responder)(&mut fifo);
    st.fifo = fifo.map(|v| to_cpu(swapped, v));
    let ctrl = to_cpu(swapped, st.ctrl) & !Control::GO.bits();
    st.ctrl = to_cpu(swapped, ctrl);
}

impl RegisterIo for FakeCore {
    fn read(&self, offset: usize) -> u32 {
        if offset == offsets::CTRL {
            let mut st = self.0.borrow_mut();
            let busy = to_cpu(st.swapped, st.ctrl) & Control::BUSY.bits() != 0;
            if busy && st.busy_reads.is_some() {
                if st.busy_left == 0 {
                    complete(&mut st);
                } else {
                    st.busy_left -= 1;
                }
            }
        }
        self.raw(offset)
    }

    fn write(&mut self, offset: usize, value: u32) {
        let mut st = self.0.borrow_mut();
        st.writes.push(Write::new(offset, value));
        match offset {
            offsets::CTRL => {
                let was_busy = to_cpu(st.swapped, st.ctrl) & Control::GO.bits() != 0;
                st.ctrl = value;
                let go = to_cpu(st.swapped, value) & Control::GO.bits() != 0;
                if go && !was_busy {
                    let swapped = st.swapped;
                    let burst = Burst {
                        ctrl: to_cpu(swapped, st.ctrl),
                        div: to_cpu(swapped, st.div),
                        cs: to_cpu(swapped, st.cs),
                        fifo: st.fifo.map(|v| to_cpu(swapped, v)),
                    };
                    st.bursts.push(burst);
                    st.busy_left = st.busy_reads.unwrap_or(0);
                }
            }
            offsets::DIV => st.div = value,
            offsets::CS => st.cs = value,
            _ => st.fifo[offsets::slot(offset)] = value,
        }
    }
}

struct Clock {
    now_ms: Cell<u64>,
    delays: RefCell<Vec<u32>>,
}

/// Millisecond clock that advances by one on every look.
#[derive(Clone)]
pub struct FakeTimer(Rc<Clock>);

impl FakeTimer {
    pub fn new() -> Self {
        FakeTimer(Rc::new(Clock {
            now_ms: Cell::new(0),
            delays: RefCell::new(Vec::new()),
        }))
    }

    pub fn delays(&self) -> Vec<u32> {
        self.0.delays.borrow().clone()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.0.now_ms.get()
    }
}

impl DelayUs<u32> for FakeTimer {
    fn delay_us(&mut self, us: u32) {
        self.0.delays.borrow_mut().push(us);
    }
}

impl Timer for FakeTimer {
    fn now_ms(&self) -> u64 {
        let now = self.0.now_ms.get() + 1;
        self.0.now_ms.set(now);
        now
    }
}

use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};

use super::layout::{offsets, RegisterBlock};
use crate::config::ByteOrder;

#[doc = "Universal register structure"]
#[repr(C)]
pub struct Reg<T: Sized + Clone + Copy, U> {
    value: T,
    p: PhantomData<U>,
}

impl<T: Sized + Clone + Copy, U> Reg<T, U> {
    pub fn read(&self) -> T {
        let ptr: *const T = &self.value;
        unsafe { ptr.read_volatile() }
    }
    pub fn write(&mut self, val: T) {
        let ptr: *mut T = &mut self.value;
        unsafe {
            ptr.write_volatile(val);
        }
    }
}

pub struct _FIFO;
pub type FIFO = Reg<u32, _FIFO>;

pub struct _CTRL;
pub type CTRL = Reg<u32, _CTRL>;

pub struct _DIV;
pub type DIV = Reg<u32, _DIV>;

pub struct _CS;
pub type CS = Reg<u32, _CS>;

/// Raw 32-bit access to the register window, by byte offset.
///
/// Implementations move bits as they are; byte order is handled one level
/// up by [`RegisterAccess`].
pub trait RegisterIo {
    fn read(&self, offset: usize) -> u32;
    fn write(&mut self, offset: usize, value: u32);
}

/// Memory-mapped register window.
pub struct Mmio {
    base: usize,
}

impl Mmio {
    /// # Safety
    ///
    /// `base` must be the mapped address of the core's register window and
    /// nothing else may access it while this value lives.
    pub unsafe fn new(base: usize) -> Self {
        Self { base }
    }
}

impl Deref for Mmio {
    type Target = RegisterBlock;
    fn deref(&self) -> &Self::Target {
        unsafe { &*(self.base as *const RegisterBlock) }
    }
}

impl DerefMut for Mmio {
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { &mut *(self.base as *mut RegisterBlock) }
    }
}

impl RegisterIo for Mmio {
    fn read(&self, offset: usize) -> u32 {
        match offset {
            offsets::CTRL => self.ctrl.read(),
            offsets::DIV => self.div.read(),
            offsets::CS => self.cs.read(),
            _ => self.fifo[offsets::slot(offset)].read(),
        }
    }

    fn write(&mut self, offset: usize, value: u32) {
        match offset {
            offsets::CTRL => self.ctrl.write(value),
            offsets::DIV => self.div.write(value),
            offsets::CS => self.cs.write(value),
            _ => self.fifo[offsets::slot(offset)].write(value),
        }
    }
}

fn native(value: u32) -> u32 {
    value
}

fn swapped(value: u32) -> u32 {
    value.swap_bytes()
}

/// Register accessor with the bus byte order fixed at construction.
pub struct RegisterAccess<I: RegisterIo> {
    io: I,
    convert: fn(u32) -> u32,
}

impl<I: RegisterIo> RegisterAccess<I> {
    pub fn new(io: I, byte_order: ByteOrder) -> Self {
        let convert = match byte_order {
            ByteOrder::Native => native,
            ByteOrder::Swapped => swapped,
        };
        Self { io, convert }
    }

    #[inline]
    pub fn read(&self, offset: usize) -> u32 {
        (self.convert)(self.io.read(offset))
    }

    #[inline]
    pub fn write(&mut self, offset: usize, value: u32) {
        self.io.write(offset, (self.convert)(value))
    }

    pub fn into_inner(self) -> I {
        self.io
    }
}

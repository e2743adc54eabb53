//! # x86_64 Hardware Abstraction Layer
//!
//! x86_64 implementations of the devices the text console drives:
//! port-mapped I/O and the memory-mapped VGA text buffer.
//!
//! ## Scope
//!
//! All `unsafe` device access used by the console lives here, in
//! [`RealPortIo`] and [`VgaTextBuffer`].

#![cfg_attr(not(test), no_std)]

#[cfg(any(test, feature = "alloc"))]
extern crate alloc;

pub mod port_io;
pub mod vga_buffer;

#[cfg(any(test, feature = "alloc"))]
pub use port_io::FakePortIo;
pub use port_io::{PortIo, RealPortIo};
pub use vga_buffer::{
    VgaTextBuffer, VGA_TEXT_BUFFER_PHYS, VGA_TEXT_BUFFER_SIZE, VGA_TEXT_HEIGHT, VGA_TEXT_WIDTH,
};

//! # Hardware Abstraction Layer (HAL)
//!
//! This crate defines architecture-neutral hardware traits.
//!
//! ## Design Principles
//!
//! 1. **No x86-specific assumptions**: port I/O lives in `hal_x86_64`
//! 2. **Trait-based**: drivers are generic over the device they drive
//! 3. **Testable**: every trait has an in-memory stand-in

#![cfg_attr(not(test), no_std)]

pub mod text_buffer;

pub use text_buffer::{TextBuffer, TextBufferError, CELL_BYTES};
#[cfg(any(test, feature = "alloc"))]
pub use text_buffer::RamTextBuffer;

//! # VGA Text Console
//!
//! This crate provides the kernel's first console: an 80x25 VGA text-mode
//! renderer with a hardware cursor.
//!
//! ## Philosophy
//!
//! This is NOT a terminal emulator. No ANSI escape codes, no scrolling, no
//! TTY model. Bytes go into the character cells at a persistent write
//! position; `\n` moves to the start of the next row; everything wraps
//! modulo the screen size, so output past the last row overwrites row 0.
//!
//! ## Design Principles
//!
//! 1. **Explicit state**: one [`VgaConsole`] owns the buffer, the CRTC ports
//!    and the cursor; there are no globals
//! 2. **Testable**: generic over [`PortIo`] and [`TextBuffer`]
//! 3. **No unsafe**: hardware access lives in `hal_x86_64`
//! 4. **Total**: no operation fails once the console exists

#![cfg_attr(not(test), no_std)]

use core::fmt;

use hal::{TextBuffer, TextBufferError, CELL_BYTES};
use hal_x86_64::PortIo;

pub mod color;
pub mod crtc;
pub mod hex;

pub use color::{attr, VgaColor};
pub use crtc::{Crtc, CursorPosition, CRTC_DATA_PORT, CRTC_INDEX_PORT};
pub use hex::{HexDigits, HexFormatter};

/// VGA text mode dimensions
pub const VGA_WIDTH: usize = hal_x86_64::VGA_TEXT_WIDTH;
pub const VGA_HEIGHT: usize = hal_x86_64::VGA_TEXT_HEIGHT;

/// Number of cells on screen
pub const SCREEN_CELLS: usize = VGA_WIDTH * VGA_HEIGHT;

/// Buffer, cursor registers and write position
///
/// Kept apart from the hex scratch so a formatted value can be printed while
/// the formatter is still borrowed.
struct Screen<P: PortIo, B: TextBuffer> {
    crtc: Crtc<P>,
    buffer: B,
    position: CursorPosition,
}

impl<P: PortIo, B: TextBuffer> Screen<P, B> {
    fn set_cursor(&mut self, position: CursorPosition) {
        self.crtc.set_position(position);
        self.position = position;
    }

    fn print_bytes(&mut self, bytes: &[u8]) {
        let mut index = self.position.get();

        for &byte in bytes {
            if byte == b'\n' {
                index += VGA_WIDTH;
                index -= index % VGA_WIDTH;
                index %= SCREEN_CELLS;
            } else {
                self.buffer.write_char(index, byte);
                index = (index + 1) % SCREEN_CELLS;
            }
        }

        self.set_cursor(CursorPosition::new(index));
    }
}

/// VGA text console
pub struct VgaConsole<P: PortIo, B: TextBuffer> {
    screen: Screen<P, B>,
    hex: HexFormatter,
}

impl<P: PortIo, B: TextBuffer> VgaConsole<P, B> {
    /// Creates a console over `buffer`, driving the cursor through `io`
    ///
    /// The write position starts at 0. Neither the buffer nor the cursor
    /// registers are touched until the first update.
    pub fn new(io: P, buffer: B) -> Result<Self, TextBufferError> {
        let cells = buffer.cell_count();
        if cells < SCREEN_CELLS {
            return Err(TextBufferError::TooSmall {
                len: cells * CELL_BYTES,
                required: SCREEN_CELLS * CELL_BYTES,
            });
        }
        log::debug!(
            "vga console: {}x{} cells",
            buffer.width(),
            buffer.height()
        );

        Ok(Self {
            screen: Screen {
                crtc: Crtc::new(io),
                buffer,
                position: CursorPosition::ORIGIN,
            },
            hex: HexFormatter::new(),
        })
    }

    /// Current write position
    pub fn position(&self) -> CursorPosition {
        self.screen.position
    }

    /// Moves the write position and the hardware cursor to `position`
    ///
    /// Positions past the end of the screen wrap.
    pub fn set_cursor(&mut self, position: usize) {
        self.screen.set_cursor(CursorPosition::new(position));
    }

    /// Moves the write position and the hardware cursor to column `x`, row `y`
    ///
    /// Any pair is accepted: the linear offset `x + 80*y` wraps modulo 2000.
    pub fn set_cursor_xy(&mut self, x: usize, y: usize) {
        self.screen.set_cursor(CursorPosition::from_xy(x, y));
    }

    /// Adopts the hardware cursor position as the write position
    ///
    /// A register value past the end of the screen is wrapped and written
    /// back, so the visible cursor matches the write position.
    pub fn sync_from_hardware(&mut self) -> CursorPosition {
        let raw = self.screen.crtc.read_raw_position();
        let position = CursorPosition::new(raw as usize);
        if position.get() == raw as usize {
            self.screen.position = position;
        } else {
            self.screen.set_cursor(position);
        }
        position
    }

    /// Prints `text` at the write position
    ///
    /// The hardware cursor is updated once, after the last byte.
    pub fn print(&mut self, text: &str) {
        self.screen.print_bytes(text.as_bytes());
    }

    /// Prints raw code page 437 bytes at the write position
    pub fn print_bytes(&mut self, bytes: &[u8]) {
        self.screen.print_bytes(bytes);
    }

    /// Formats `value` as fixed-width uppercase hex
    ///
    /// The result lives in the console's scratch buffer and is replaced by
    /// the next call.
    pub fn format_hex<T: HexDigits>(&mut self, value: T) -> &str {
        self.hex.format(value)
    }

    /// Prints `value` as fixed-width uppercase hex
    pub fn print_hex<T: HexDigits>(&mut self, value: T) {
        let digits = self.hex.format(value);
        self.screen.print_bytes(digits.as_bytes());
    }

    /// Prints a 32-bit value as eight hex digits
    pub fn print_u32(&mut self, value: u32) {
        self.print_hex(value);
    }

    /// Blanks every character cell and homes the cursor
    ///
    /// Attribute bytes keep whatever the firmware left there.
    pub fn clear(&mut self) {
        for index in 0..SCREEN_CELLS {
            self.screen.buffer.write_char(index, b' ');
        }
        self.screen.set_cursor(CursorPosition::ORIGIN);
        log::debug!("vga console: cleared");
    }

    /// Shows the hardware cursor over scanlines `start..=end`
    pub fn set_cursor_shape(&mut self, start: u8, end: u8) {
        self.screen.crtc.set_shape(start, end);
        log::trace!("vga console: cursor shape {}..={}", start, end);
    }

    /// Hides the hardware cursor
    pub fn hide_cursor(&mut self) {
        self.screen.crtc.disable();
        log::trace!("vga console: cursor hidden");
    }

    /// Text buffer
    pub fn buffer(&self) -> &B {
        &self.screen.buffer
    }

    /// Port accessor driving the CRTC
    pub fn port_io(&self) -> &P {
        self.screen.crtc.io()
    }

    /// Mutable port accessor driving the CRTC
    pub fn port_io_mut(&mut self) -> &mut P {
        self.screen.crtc.io_mut()
    }

    /// Returns the port accessor and the buffer
    pub fn into_parts(self) -> (P, B) {
        (self.screen.crtc.into_inner(), self.screen.buffer)
    }
}

impl<P: PortIo, B: TextBuffer> fmt::Write for VgaConsole<P, B> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.print(s);
        Ok(())
    }
}

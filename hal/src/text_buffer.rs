//! Text buffer abstraction
//!
//! A text buffer is a row-major grid of two-byte cells: a character byte
//! followed by an attribute byte. The VGA text buffer is the real device;
//! [`RamTextBuffer`] stands in for it in tests.

use thiserror::Error;

#[cfg(any(test, feature = "alloc"))]
extern crate alloc;

/// Bytes per text cell (character + attribute)
pub const CELL_BYTES: usize = 2;

/// Errors raised while constructing a text buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TextBufferError {
    /// The buffer base address is null
    #[error("text buffer address is null")]
    NullAddress,

    /// The backing storage is smaller than the grid it must hold
    #[error("text buffer too small: {len} bytes, need {required}")]
    TooSmall { len: usize, required: usize },
}

/// Text buffer trait
///
/// Implementations expose per-cell access by linear index. The index is
/// always `< cell_count()`; callers reduce it before calling.
pub trait TextBuffer {
    /// Number of columns per row
    fn width(&self) -> usize;

    /// Number of rows
    fn height(&self) -> usize;

    /// Total number of cells
    fn cell_count(&self) -> usize {
        self.width() * self.height()
    }

    /// Writes the character byte of cell `index`, leaving its attribute alone
    fn write_char(&mut self, index: usize, ch: u8);

    /// Reads the character byte of cell `index`
    fn read_char(&self, index: usize) -> u8;

    /// Reads the attribute byte of cell `index`
    fn read_attr(&self, index: usize) -> u8;
}

/// RAM-backed text buffer
///
/// Stores the same two-byte cell layout as the hardware buffer.
#[cfg(any(test, feature = "alloc"))]
#[derive(Debug, Clone)]
pub struct RamTextBuffer {
    cells: alloc::vec::Vec<u8>,
    width: usize,
    height: usize,
}

#[cfg(any(test, feature = "alloc"))]
impl RamTextBuffer {
    /// Creates a zero-filled buffer of `width` x `height` cells
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            cells: alloc::vec![0; width * height * CELL_BYTES],
            width,
            height,
        }
    }

    /// Sets the attribute byte of every cell
    pub fn fill_attr(&mut self, attr: u8) {
        for cell in self.cells.chunks_exact_mut(CELL_BYTES) {
            cell[1] = attr;
        }
    }

    /// Returns the characters of `row` as a string, trailing NULs dropped
    pub fn row_text(&self, row: usize) -> alloc::string::String {
        let start = row * self.width;
        let mut line: alloc::string::String = (start..start + self.width)
            .map(|index| self.read_char(index) as char)
            .collect();
        while line.ends_with('\0') {
            line.pop();
        }
        line
    }
}

#[cfg(any(test, feature = "alloc"))]
impl TextBuffer for RamTextBuffer {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn write_char(&mut self, index: usize, ch: u8) {
        self.cells[index * CELL_BYTES] = ch;
    }

    fn read_char(&self, index: usize) -> u8 {
        self.cells[index * CELL_BYTES]
    }

    fn read_attr(&self, index: usize) -> u8 {
        self.cells[index * CELL_BYTES + 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ram_buffer_dimensions() {
        let buffer = RamTextBuffer::new(80, 25);
        assert_eq!(buffer.width(), 80);
        assert_eq!(buffer.height(), 25);
        assert_eq!(buffer.cell_count(), 2000);
    }

    #[test]
    fn test_write_char_preserves_attr() {
        let mut buffer = RamTextBuffer::new(80, 25);
        buffer.fill_attr(0x1F);

        buffer.write_char(42, b'Z');
        assert_eq!(buffer.read_char(42), b'Z');
        assert_eq!(buffer.read_attr(42), 0x1F);
        assert_eq!(buffer.read_char(43), 0);
    }

    #[test]
    fn test_row_text() {
        let mut buffer = RamTextBuffer::new(80, 25);
        buffer.write_char(80, b'h');
        buffer.write_char(81, b'i');
        assert_eq!(buffer.row_text(1), "hi");
        assert_eq!(buffer.row_text(0), "");
    }

    #[test]
    fn test_error_display() {
        let err = TextBufferError::TooSmall {
            len: 10,
            required: 4000,
        };
        assert_eq!(err.to_string(), "text buffer too small: 10 bytes, need 4000");
        assert_eq!(
            TextBufferError::NullAddress.to_string(),
            "text buffer address is null"
        );
    }
}

//! VGA text-mode buffer
//!
//! The legacy VGA text buffer lives at physical 0xB8000: 80x25 cells, each a
//! character byte followed by an attribute byte. All accesses are volatile.

use core::ptr;
use hal::{TextBuffer, TextBufferError, CELL_BYTES};

/// VGA text buffer physical address
pub const VGA_TEXT_BUFFER_PHYS: u64 = 0xB8000;

/// Columns in 80x25 text mode
pub const VGA_TEXT_WIDTH: usize = 80;

/// Rows in 80x25 text mode
pub const VGA_TEXT_HEIGHT: usize = 25;

/// VGA text buffer size in bytes
pub const VGA_TEXT_BUFFER_SIZE: usize = VGA_TEXT_WIDTH * VGA_TEXT_HEIGHT * CELL_BYTES;

/// Memory-mapped VGA text buffer
pub struct VgaTextBuffer {
    base: *mut u8,
}

impl VgaTextBuffer {
    /// Wraps the text buffer mapped at `virt_addr`
    ///
    /// # Safety
    ///
    /// `virt_addr` must map at least `VGA_TEXT_BUFFER_SIZE` bytes of the VGA
    /// text buffer (or ordinary memory standing in for it), and no other live
    /// reference may write to that range.
    pub unsafe fn new(virt_addr: usize) -> Result<Self, TextBufferError> {
        if virt_addr == 0 {
            return Err(TextBufferError::NullAddress);
        }
        Ok(Self {
            base: virt_addr as *mut u8,
        })
    }

    /// Wraps the buffer through a direct map at `hhdm_offset`
    ///
    /// # Safety
    ///
    /// Same contract as [`VgaTextBuffer::new`] for `hhdm_offset + 0xB8000`.
    pub unsafe fn from_hhdm(hhdm_offset: u64) -> Result<Self, TextBufferError> {
        Self::new((hhdm_offset + VGA_TEXT_BUFFER_PHYS) as usize)
    }
}

impl TextBuffer for VgaTextBuffer {
    fn width(&self) -> usize {
        VGA_TEXT_WIDTH
    }

    fn height(&self) -> usize {
        VGA_TEXT_HEIGHT
    }

    fn write_char(&mut self, index: usize, ch: u8) {
        debug_assert!(index < VGA_TEXT_WIDTH * VGA_TEXT_HEIGHT);
        // SAFETY: index < cell count, so the byte is inside the mapped range.
        unsafe { ptr::write_volatile(self.base.add(index * CELL_BYTES), ch) }
    }

    fn read_char(&self, index: usize) -> u8 {
        debug_assert!(index < VGA_TEXT_WIDTH * VGA_TEXT_HEIGHT);
        // SAFETY: see write_char
        unsafe { ptr::read_volatile(self.base.add(index * CELL_BYTES)) }
    }

    fn read_attr(&self, index: usize) -> u8 {
        debug_assert!(index < VGA_TEXT_WIDTH * VGA_TEXT_HEIGHT);
        // SAFETY: see write_char
        unsafe { ptr::read_volatile(self.base.add(index * CELL_BYTES + 1)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_address_rejected() {
        let result = unsafe { VgaTextBuffer::new(0) };
        assert!(matches!(result, Err(TextBufferError::NullAddress)));
    }

    #[test]
    fn test_buffer_size() {
        assert_eq!(VGA_TEXT_BUFFER_SIZE, 4000);
    }

    #[test]
    fn test_write_char_leaves_attribute() {
        let mut memory = vec![0x07u8; VGA_TEXT_BUFFER_SIZE];
        let mut buffer = unsafe { VgaTextBuffer::new(memory.as_mut_ptr() as usize) }.unwrap();

        buffer.write_char(0, b'A');
        buffer.write_char(1999, b'Z');

        assert_eq!(buffer.read_char(0), b'A');
        assert_eq!(buffer.read_attr(0), 0x07);
        assert_eq!(buffer.read_char(1999), b'Z');
        drop(buffer);
        assert_eq!(memory[0], b'A');
        assert_eq!(memory[1], 0x07);
        assert_eq!(memory[3998], b'Z');
        assert_eq!(memory[3999], 0x07);
    }

    #[test]
    fn test_from_hhdm_offsets_physical_address() {
        let mut memory = vec![0u8; VGA_TEXT_BUFFER_SIZE];
        let base = memory.as_mut_ptr() as u64;
        let mut buffer =
            unsafe { VgaTextBuffer::from_hhdm(base - VGA_TEXT_BUFFER_PHYS) }.unwrap();

        buffer.write_char(80, b'r');
        drop(buffer);
        assert_eq!(memory[160], b'r');
    }
}

//! CRT Controller cursor registers
//!
//! The CRTC is reached through an index/data port pair: the register number
//! is latched into 0x3D4, then its value is read from or written to 0x3D5.
//! A data access is only meaningful right after its index write, so every
//! access here is issued as an index-then-data pair.

use crate::{SCREEN_CELLS, VGA_WIDTH};
use hal_x86_64::PortIo;

/// CRTC index (address) port
pub const CRTC_INDEX_PORT: u16 = 0x3D4;

/// CRTC data port
pub const CRTC_DATA_PORT: u16 = 0x3D5;

/// Cursor start scanline; bit 5 hides the cursor
pub const REG_CURSOR_START: u8 = 0x0A;
/// Cursor end scanline
pub const REG_CURSOR_END: u8 = 0x0B;
/// Cursor location, high byte
pub const REG_CURSOR_HIGH: u8 = 0x0E;
/// Cursor location, low byte
pub const REG_CURSOR_LOW: u8 = 0x0F;

const CURSOR_DISABLE: u8 = 0x20;
const SCANLINE_MASK: u8 = 0x1F;

/// Linear cursor offset into the 80x25 grid
///
/// Always in `[0, SCREEN_CELLS)`; constructors reduce modulo the screen size
/// so every input maps onto the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct CursorPosition(u16);

impl CursorPosition {
    /// Top-left cell
    pub const ORIGIN: CursorPosition = CursorPosition(0);

    /// Position at linear `offset`, wrapped onto the screen
    pub const fn new(offset: usize) -> Self {
        Self((offset % SCREEN_CELLS) as u16)
    }

    /// Position at column `x`, row `y`, wrapped onto the screen
    ///
    /// Equal to `(x + VGA_WIDTH * y) mod SCREEN_CELLS` for every input.
    pub const fn from_xy(x: usize, y: usize) -> Self {
        Self::new(x % SCREEN_CELLS + VGA_WIDTH * (y % SCREEN_CELLS))
    }

    /// Linear offset
    pub const fn get(self) -> usize {
        self.0 as usize
    }

    /// Column of this position
    pub const fn column(self) -> usize {
        self.get() % VGA_WIDTH
    }

    /// Row of this position
    pub const fn row(self) -> usize {
        self.get() / VGA_WIDTH
    }
}

/// CRTC cursor controller
pub struct Crtc<P: PortIo> {
    io: P,
}

impl<P: PortIo> Crtc<P> {
    /// Wraps the port accessor used for 0x3D4/0x3D5
    pub const fn new(io: P) -> Self {
        Self { io }
    }

    fn write_register(&mut self, index: u8, value: u8) {
        self.io.outb(CRTC_INDEX_PORT, index);
        self.io.outb(CRTC_DATA_PORT, value);
    }

    fn read_register(&mut self, index: u8) -> u8 {
        self.io.outb(CRTC_INDEX_PORT, index);
        self.io.inb(CRTC_DATA_PORT)
    }

    /// Programs the hardware cursor location
    ///
    /// Low byte pair first, then high byte pair.
    pub fn set_position(&mut self, position: CursorPosition) {
        let [low, high] = position.0.to_le_bytes();
        self.write_register(REG_CURSOR_LOW, low);
        self.write_register(REG_CURSOR_HIGH, high);
    }

    /// Reads the raw 16-bit cursor location register
    ///
    /// Firmware may leave a value past the end of the screen here.
    pub fn read_raw_position(&mut self) -> u16 {
        let low = self.read_register(REG_CURSOR_LOW);
        let high = self.read_register(REG_CURSOR_HIGH);
        u16::from_le_bytes([low, high])
    }

    /// Reads the hardware cursor location back, wrapped onto the screen
    pub fn read_position(&mut self) -> CursorPosition {
        CursorPosition::new(self.read_raw_position() as usize)
    }

    /// Shows the cursor spanning scanlines `start..=end` of the cell
    ///
    /// Bits above the scanline fields are preserved.
    pub fn set_shape(&mut self, start: u8, end: u8) {
        let current = self.read_register(REG_CURSOR_START);
        self.write_register(REG_CURSOR_START, (current & 0xC0) | (start & SCANLINE_MASK));
        let current = self.read_register(REG_CURSOR_END);
        self.write_register(REG_CURSOR_END, (current & 0xE0) | (end & SCANLINE_MASK));
    }

    /// Hides the hardware cursor
    pub fn disable(&mut self) {
        self.write_register(REG_CURSOR_START, CURSOR_DISABLE);
    }

    /// Port accessor
    pub fn io(&self) -> &P {
        &self.io
    }

    /// Mutable port accessor
    pub fn io_mut(&mut self) -> &mut P {
        &mut self.io
    }

    /// Returns the port accessor
    pub fn into_inner(self) -> P {
        self.io
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hal_x86_64::FakePortIo;

    #[test]
    fn test_position_wraps() {
        assert_eq!(CursorPosition::new(0).get(), 0);
        assert_eq!(CursorPosition::new(1999).get(), 1999);
        assert_eq!(CursorPosition::new(2000).get(), 0);
        assert_eq!(CursorPosition::new(4081).get(), 81);
    }

    #[test]
    fn test_position_from_xy() {
        assert_eq!(CursorPosition::from_xy(0, 0), CursorPosition::ORIGIN);
        assert_eq!(CursorPosition::from_xy(5, 1).get(), 85);
        // x past the right edge spills into the next row
        assert_eq!(CursorPosition::from_xy(85, 0).get(), 85);
        // y past the bottom wraps to the top
        assert_eq!(CursorPosition::from_xy(3, 25).get(), 3);
        assert_eq!(CursorPosition::from_xy(usize::MAX, usize::MAX).get(), {
            let n = SCREEN_CELLS as u128;
            let m = usize::MAX as u128;
            ((m + 80 * m) % n) as usize
        });
    }

    #[test]
    fn test_position_row_column() {
        let pos = CursorPosition::new(81);
        assert_eq!(pos.row(), 1);
        assert_eq!(pos.column(), 1);
    }

    #[test]
    fn test_set_position_register_sequence() {
        let mut crtc = Crtc::new(FakePortIo::new());
        crtc.set_position(CursorPosition::new(0x0123));

        assert_eq!(
            crtc.io().writes(),
            &[
                (CRTC_INDEX_PORT, REG_CURSOR_LOW),
                (CRTC_DATA_PORT, 0x23),
                (CRTC_INDEX_PORT, REG_CURSOR_HIGH),
                (CRTC_DATA_PORT, 0x01),
            ]
        );
    }

    #[test]
    fn test_read_position() {
        let mut io = FakePortIo::new();
        io.script_reads(&[(CRTC_DATA_PORT, 0xCF), (CRTC_DATA_PORT, 0x07)]);
        let mut crtc = Crtc::new(io);

        assert_eq!(crtc.read_position().get(), 0x07CF);
        assert_eq!(
            crtc.io().writes(),
            &[
                (CRTC_INDEX_PORT, REG_CURSOR_LOW),
                (CRTC_INDEX_PORT, REG_CURSOR_HIGH)
            ]
        );
    }

    #[test]
    fn test_read_position_out_of_range_wraps() {
        let mut io = FakePortIo::new();
        io.script_reads(&[(CRTC_DATA_PORT, 0xFF), (CRTC_DATA_PORT, 0xFF)]);
        let mut crtc = Crtc::new(io);

        assert_eq!(crtc.read_position().get(), 0xFFFF % SCREEN_CELLS);
    }

    #[test]
    fn test_read_raw_position_keeps_register_value() {
        let mut io = FakePortIo::new();
        io.script_reads(&[(CRTC_DATA_PORT, 0xFF), (CRTC_DATA_PORT, 0xFF)]);
        let mut crtc = Crtc::new(io);

        assert_eq!(crtc.read_raw_position(), 0xFFFF);
    }

    #[test]
    fn test_set_shape_preserves_high_bits() {
        let mut io = FakePortIo::new();
        io.script_reads(&[(CRTC_DATA_PORT, 0xE0), (CRTC_DATA_PORT, 0xFF)]);
        let mut crtc = Crtc::new(io);

        crtc.set_shape(14, 15);

        assert_eq!(
            crtc.io().writes(),
            &[
                (CRTC_INDEX_PORT, REG_CURSOR_START),
                (CRTC_INDEX_PORT, REG_CURSOR_START),
                (CRTC_DATA_PORT, 0xC0 | 14),
                (CRTC_INDEX_PORT, REG_CURSOR_END),
                (CRTC_INDEX_PORT, REG_CURSOR_END),
                (CRTC_DATA_PORT, 0xE0 | 15),
            ]
        );
        assert_eq!(crtc.io().remaining_reads(), 0);
    }

    #[test]
    fn test_disable() {
        let mut crtc = Crtc::new(FakePortIo::new());
        crtc.disable();
        assert_eq!(
            crtc.into_inner().writes(),
            &[(CRTC_INDEX_PORT, REG_CURSOR_START), (CRTC_DATA_PORT, 0x20)]
        );
    }
}

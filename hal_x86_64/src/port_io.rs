//! Port I/O abstraction for x86_64
//!
//! This module provides a trait-based abstraction for x86 port I/O operations,
//! allowing for both real hardware access and fake implementations for testing.
//!
//! ## Safety
//!
//! Port I/O operations are inherently unsafe as they directly interact with hardware.
//! `RealPortIo` is the only type in the workspace that issues `in`/`out`;
//! every driver above it goes through [`PortIo`].

/// Port I/O trait
///
/// Abstracts x86 I/O port operations to allow test doubles.
///
/// ## Implementation Notes
///
/// Implementations must guarantee:
/// - `inb` reads a byte from the specified port
/// - `outb` writes a byte to the specified port
/// - Operations complete synchronously, in call order, and are never merged
///   or dropped
pub trait PortIo {
    /// Reads a byte from an I/O port
    fn inb(&mut self, port: u16) -> u8;

    /// Writes a byte to an I/O port
    fn outb(&mut self, port: u16, value: u8);
}

impl<P: PortIo + ?Sized> PortIo for &mut P {
    #[inline]
    fn inb(&mut self, port: u16) -> u8 {
        (**self).inb(port)
    }

    #[inline]
    fn outb(&mut self, port: u16, value: u8) {
        (**self).outb(port, value)
    }
}

/// Real hardware port I/O implementation
///
/// Uses x86 `in` and `out` instructions to access hardware ports.
///
/// ## Safety
///
/// Only meaningful in ring 0 on x86/x86_64. The asm blocks are not marked
/// `pure`, so the compiler keeps every access and its order.
///
/// ## Example
///
/// ```rust,ignore
/// let mut io = RealPortIo::new();
/// io.outb(0x3D4, 0x0F); // Select the cursor-low CRTC register
/// ```
#[derive(Debug, Default)]
pub struct RealPortIo;

impl RealPortIo {
    /// Creates a new real port I/O implementation
    pub const fn new() -> Self {
        Self
    }
}

impl PortIo for RealPortIo {
    #[inline]
    fn inb(&mut self, port: u16) -> u8 {
        // SAFETY: Raw port read. Callers only name ports owned by the
        // device they drive, and the kernel runs at CPL 0.
        //
        // - "in al, dx": port number in DX, result byte in AL
        // - "nomem"/"nostack": the instruction touches neither memory nor stack
        unsafe {
            let value: u8;
            core::arch::asm!(
                "in al, dx",
                in("dx") port,
                out("al") value,
                options(nomem, nostack, preserves_flags)
            );
            value
        }
    }

    #[inline]
    fn outb(&mut self, port: u16, value: u8) {
        // SAFETY: Raw port write. Same contract as `inb`.
        //
        // - "out dx, al": port number in DX, byte in AL
        unsafe {
            core::arch::asm!(
                "out dx, al",
                in("dx") port,
                in("al") value,
                options(nomem, nostack, preserves_flags)
            );
        }
    }
}

/// Fake port I/O implementation for testing
///
/// Allows scripted reads and captures writes for test verification.
///
/// ## Example
///
/// ```rust,ignore
/// use hal_x86_64::port_io::{FakePortIo, PortIo};
///
/// let mut io = FakePortIo::new();
/// io.script_read(0x3D5, 0x50);
///
/// io.outb(0x3D4, 0x0F);
/// assert_eq!(io.inb(0x3D5), 0x50);
/// assert_eq!(io.writes(), &[(0x3D4, 0x0F)]);
/// assert_eq!(io.remaining_reads(), 0);
/// ```
#[cfg(any(test, feature = "alloc"))]
#[derive(Debug, Default, Clone)]
pub struct FakePortIo {
    /// Scripted read values: (port, value)
    read_script: alloc::vec::Vec<(u16, u8)>,
    /// Current read index
    read_index: usize,
    /// Captured write operations: (port, value)
    writes: alloc::vec::Vec<(u16, u8)>,
}

#[cfg(any(test, feature = "alloc"))]
impl FakePortIo {
    /// Creates a new fake port I/O implementation
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts a read operation
    ///
    /// The next call to `inb(port)` with the specified port will return `value`.
    pub fn script_read(&mut self, port: u16, value: u8) {
        self.read_script.push((port, value));
    }

    /// Scripts multiple read operations
    pub fn script_reads(&mut self, reads: &[(u16, u8)]) {
        self.read_script.extend_from_slice(reads);
    }

    /// Returns the number of scripted reads remaining
    pub fn remaining_reads(&self) -> usize {
        self.read_script.len() - self.read_index
    }

    /// Returns all captured write operations
    pub fn writes(&self) -> &[(u16, u8)] {
        &self.writes
    }

    /// Returns the values written to a single port, in order
    pub fn writes_to(&self, port: u16) -> alloc::vec::Vec<u8> {
        self.writes
            .iter()
            .filter(|(p, _)| *p == port)
            .map(|(_, value)| *value)
            .collect()
    }

    /// Drains and returns the captured writes
    pub fn take_writes(&mut self) -> alloc::vec::Vec<(u16, u8)> {
        core::mem::take(&mut self.writes)
    }

    /// Clears all captured writes
    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }
}

#[cfg(any(test, feature = "alloc"))]
impl PortIo for FakePortIo {
    fn inb(&mut self, port: u16) -> u8 {
        if self.read_index >= self.read_script.len() {
            panic!(
                "FakePortIo: No scripted read for port 0x{:04X} (read_index={}, script_len={})",
                port,
                self.read_index,
                self.read_script.len()
            );
        }

        let (expected_port, value) = self.read_script[self.read_index];
        if port != expected_port {
            panic!(
                "FakePortIo: Port mismatch at read_index={}: expected 0x{:04X}, got 0x{:04X}",
                self.read_index, expected_port, port
            );
        }

        self.read_index += 1;
        value
    }

    fn outb(&mut self, port: u16, value: u8) {
        self.writes.push((port, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_port_io_creation() {
        let io = FakePortIo::new();
        assert_eq!(io.remaining_reads(), 0);
        assert!(io.writes().is_empty());
    }

    #[test]
    fn test_fake_port_io_script_reads() {
        let mut io = FakePortIo::new();
        io.script_reads(&[(0x3D5, 0x07), (0x3D5, 0xD0)]);

        assert_eq!(io.remaining_reads(), 2);
        assert_eq!(io.inb(0x3D5), 0x07);
        assert_eq!(io.remaining_reads(), 1);
        assert_eq!(io.inb(0x3D5), 0xD0);
        assert_eq!(io.remaining_reads(), 0);
    }

    #[test]
    fn test_fake_port_io_records_writes_in_order() {
        let mut io = FakePortIo::new();
        io.outb(0x3D4, 0x0F);
        io.outb(0x3D5, 0x50);
        io.outb(0x3F8, b'x');

        assert_eq!(io.writes(), &[(0x3D4, 0x0F), (0x3D5, 0x50), (0x3F8, b'x')]);
        assert_eq!(io.writes_to(0x3D5), vec![0x50]);
        assert!(io.writes_to(0x60).is_empty());
    }

    #[test]
    fn test_fake_port_io_take_writes() {
        let mut io = FakePortIo::new();
        io.outb(0x3D4, 0x0E);

        let taken = io.take_writes();
        assert_eq!(taken, vec![(0x3D4, 0x0E)]);
        assert!(io.writes().is_empty());
    }

    #[test]
    fn test_fake_port_io_clear_writes() {
        let mut io = FakePortIo::new();
        io.outb(0x3D4, 0xFF);

        io.clear_writes();
        assert!(io.writes().is_empty());
    }

    #[test]
    fn test_port_io_through_mut_ref() {
        fn poke<P: PortIo>(mut io: P) {
            io.outb(0x3D4, 0x0A);
        }

        let mut io = FakePortIo::new();
        poke(&mut io);
        assert_eq!(io.writes(), &[(0x3D4, 0x0A)]);
    }

    #[test]
    #[should_panic(expected = "No scripted read")]
    fn test_fake_port_io_panic_on_unscripted_read() {
        let mut io = FakePortIo::new();
        io.inb(0x3D5);
    }

    #[test]
    #[should_panic(expected = "Port mismatch")]
    fn test_fake_port_io_panic_on_wrong_port() {
        let mut io = FakePortIo::new();
        io.script_read(0x3D5, 0x01);
        io.inb(0x3D4);
    }

    #[test]
    fn test_real_port_io_default() {
        let io = RealPortIo::default();
        drop(io);
    }

    // Real port access needs ring 0; it is exercised by the QEMU smoke run.
}

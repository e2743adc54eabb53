//! 16550 UART on the legacy COM ports
//!
//! Used as the kernel's diagnostics channel, independent of the VGA console.

use core::fmt;

use hal_x86_64::PortIo;

/// First serial port base
pub const COM1: u16 = 0x3F8;

const REG_DATA: u16 = 0;
const REG_INT_ENABLE: u16 = 1;
const REG_FIFO_CTRL: u16 = 2;
const REG_LINE_CTRL: u16 = 3;
const REG_MODEM_CTRL: u16 = 4;
const REG_LINE_STATUS: u16 = 5;

const LSR_TX_EMPTY: u8 = 0x20;

/// Serial port driven through a [`PortIo`] accessor
pub struct SerialPort<P: PortIo> {
    io: P,
    base: u16,
}

impl<P: PortIo> SerialPort<P> {
    pub const fn new(io: P, base: u16) -> Self {
        Self { io, base }
    }

    /// Programs 115200 baud, 8N1, FIFOs on
    pub fn init(&mut self) {
        self.outb(REG_INT_ENABLE, 0x00);
        self.outb(REG_LINE_CTRL, 0x80); // DLAB on
        self.outb(REG_DATA, 0x01); // divisor low: 115200 baud
        self.outb(REG_INT_ENABLE, 0x00); // divisor high
        self.outb(REG_LINE_CTRL, 0x03); // 8N1, DLAB off
        self.outb(REG_FIFO_CTRL, 0xC7);
        self.outb(REG_MODEM_CTRL, 0x0B);
    }

    /// Sends one byte, waiting for the transmitter to drain
    pub fn write_byte(&mut self, byte: u8) {
        while !self.transmit_ready() {
            core::hint::spin_loop();
        }
        self.outb(REG_DATA, byte);
    }

    fn transmit_ready(&mut self) -> bool {
        self.inb(REG_LINE_STATUS) & LSR_TX_EMPTY != 0
    }

    fn inb(&mut self, offset: u16) -> u8 {
        self.io.inb(self.base + offset)
    }

    fn outb(&mut self, offset: u16, value: u8) {
        self.io.outb(self.base + offset, value);
    }

    /// Port accessor
    pub fn io(&self) -> &P {
        &self.io
    }
}

impl<P: PortIo> fmt::Write for SerialPort<P> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            if byte == b'\n' {
                self.write_byte(b'\r');
            }
            self.write_byte(byte);
        }
        Ok(())
    }
}

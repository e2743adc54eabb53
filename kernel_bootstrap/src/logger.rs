//! Kernel logger
//!
//! Implements `log::Log` on top of the COM1 serial port. The VGA console is
//! never a log sink, so driver code can log without re-entering it.

use core::fmt::{self, Write};

use hal_x86_64::{PortIo, RealPortIo};
use log::{LevelFilter, Metadata, Record, SetLoggerError};
use spin::Mutex;

use crate::serial::{SerialPort, COM1};

static LOGGER: SerialLogger<RealPortIo> =
    SerialLogger::new(SerialPort::new(RealPortIo::new(), COM1));

/// Logger writing one line per record to a serial port
pub struct SerialLogger<P: PortIo> {
    port: Mutex<SerialPort<P>>,
}

impl<P: PortIo> SerialLogger<P> {
    pub const fn new(port: SerialPort<P>) -> Self {
        Self {
            port: Mutex::new(port),
        }
    }

    /// Returns the underlying port
    pub fn into_inner(self) -> SerialPort<P> {
        self.port.into_inner()
    }
}

impl<P: PortIo + Send> log::Log for SerialLogger<P> {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let mut port = self.port.lock();
            let _ = write_record(&mut *port, record);
        }
    }

    fn flush(&self) {}
}

/// Formats `record` as `[LEVEL] target: message` plus newline
pub fn write_record<W: Write>(out: &mut W, record: &Record) -> fmt::Result {
    writeln!(
        out,
        "[{:>5}] {}: {}",
        record.level(),
        record.target(),
        record.args()
    )
}

/// Initializes COM1 and installs the serial logger
pub fn init(max_level: LevelFilter) -> Result<(), SetLoggerError> {
    LOGGER.port.lock().init();
    log::set_logger(&LOGGER)?;
    log::set_max_level(max_level);
    log::info!("logger online, level {}", max_level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hal_x86_64::FakePortIo;
    use log::{Level, Log};

    #[test]
    fn test_write_record_format() {
        let mut out = String::new();
        write_record(
            &mut out,
            &Record::builder()
                .args(format_args!("cursor at {}", 81))
                .level(Level::Info)
                .target("console")
                .build(),
        )
        .unwrap();

        assert_eq!(out, "[ INFO] console: cursor at 81\n");
    }

    #[test]
    fn test_logger_writes_to_serial() {
        let line = "[ WARN] boot: hi\r\n";
        let mut io = FakePortIo::new();
        for _ in 0..line.len() {
            io.script_read(COM1 + 5, 0x20);
        }
        let logger = SerialLogger::new(SerialPort::new(io, COM1));

        log::set_max_level(LevelFilter::Trace);
        logger.log(
            &Record::builder()
                .args(format_args!("hi"))
                .level(Level::Warn)
                .target("boot")
                .build(),
        );

        let port = logger.into_inner();
        assert_eq!(port.io().writes_to(COM1), line.as_bytes().to_vec());
    }
}

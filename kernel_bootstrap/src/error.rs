use hal::TextBufferError;
use thiserror::Error;

/// Reasons the kernel cannot bring up its console
#[derive(Debug, Error)]
pub enum BootError {
    #[error("bootloader does not support the requested base revision")]
    UnsupportedBaseRevision,

    #[error("bootloader did not provide a higher-half direct map")]
    MissingHhdm,

    #[error("vga text buffer: {0}")]
    Buffer(#[from] TextBufferError),
}

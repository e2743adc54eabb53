#![cfg_attr(not(test), no_std)]

//! Kernel bootstrap library
//!
//! Host-testable parts of the kernel: command line configuration, the serial
//! logger and VGA console setup. The bare-metal entry point lives in
//! `main.rs`.

pub mod config;
pub mod error;
pub mod logger;
pub mod serial;
pub mod vga;

pub use config::{BootConfig, ConfigError, CursorMode, Setting};
pub use error::BootError;
pub use vga::{init_vga_console, print_banner, BootInfo, KernelConsole};

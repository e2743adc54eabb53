#![cfg_attr(not(test), no_std)]
#![cfg_attr(not(test), no_main)]

#[cfg(not(test))]
use core::arch::{asm, global_asm};
#[cfg(not(test))]
use core::fmt::Write;
#[cfg(not(test))]
use core::panic::PanicInfo;

#[cfg(not(test))]
use hal_x86_64::RealPortIo;
#[cfg(not(test))]
use kernel_bootstrap_lib::config::{self, BootConfig};
#[cfg(not(test))]
use kernel_bootstrap_lib::serial::{SerialPort, COM1};
#[cfg(not(test))]
use kernel_bootstrap_lib::{init_vga_console, logger, print_banner, BootError, BootInfo};
#[cfg(not(test))]
use limine::request::{ExecutableAddressRequest, ExecutableCmdlineRequest, HhdmRequest};
#[cfg(not(test))]
use limine::BaseRevision;

#[cfg(not(test))]
// Provide a small, deterministic stack and jump into Rust.
global_asm!(
    r#"
.section .text.entry, "ax"
.global _start
.extern rust_main
_start:
    lea rsp, [rip + stack_top]
    and rsp, -16
    call rust_main
1:
    hlt
    jmp 1b

.section .bss.stack, "aw", @nobits
.align 16
stack_bottom:
    .skip 65536
stack_top:
"#
);

#[cfg(not(test))]
#[used]
#[link_section = ".limine_requests"]
static BASE_REVISION: BaseRevision = BaseRevision::new();

#[cfg(not(test))]
#[used]
#[link_section = ".limine_requests"]
static HHDM_REQUEST: HhdmRequest = HhdmRequest::new();

#[cfg(not(test))]
#[used]
#[link_section = ".limine_requests"]
static KERNEL_ADDRESS_REQUEST: ExecutableAddressRequest = ExecutableAddressRequest::new();

#[cfg(not(test))]
#[used]
#[link_section = ".limine_requests"]
static CMDLINE_REQUEST: ExecutableCmdlineRequest = ExecutableCmdlineRequest::new();

#[cfg(not(test))]
#[no_mangle]
pub extern "C" fn rust_main() -> ! {
    let cmdline = kernel_cmdline();
    let config = BootConfig::from_cmdline(cmdline);

    if logger::init(config.log_level).is_err() {
        halt_loop()
    }
    for error in config::settings(cmdline).filter_map(Result::err) {
        log::warn!("cmdline: {}, using default", error);
    }
    log::debug!("boot config: {:?}", config);

    match boot(&config) {
        Ok(()) => log::info!("boot complete, halting"),
        Err(err) => log::error!("console unavailable: {}", err),
    }
    halt_loop()
}

#[cfg(not(test))]
fn boot(config: &BootConfig) -> Result<(), BootError> {
    if !BASE_REVISION.is_supported() {
        return Err(BootError::UnsupportedBaseRevision);
    }

    let info = boot_info();
    let mut console = unsafe { init_vga_console(&info, config)? };
    print_banner(&mut console, &info);

    let position = console.position();
    log::info!(
        "vga console online, cursor at {},{}",
        position.column(),
        position.row()
    );
    Ok(())
}

#[cfg(not(test))]
fn boot_info() -> BootInfo {
    let kernel = KERNEL_ADDRESS_REQUEST.get_response();
    BootInfo {
        hhdm_offset: HHDM_REQUEST.get_response().map(|hhdm| hhdm.offset()),
        kernel_phys_base: kernel.map(|kernel| kernel.physical_base()),
        kernel_virt_base: kernel.map(|kernel| kernel.virtual_base()),
    }
}

#[cfg(not(test))]
fn kernel_cmdline() -> &'static str {
    CMDLINE_REQUEST
        .get_response()
        .and_then(|response| response.cmdline().to_str().ok())
        .unwrap_or("")
}

#[cfg(not(test))]
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    // Fresh port: the logger's lock may be held by the panicking code.
    let mut serial = SerialPort::new(RealPortIo::new(), COM1);
    let _ = writeln!(serial, "\n\nKERNEL PANIC:");
    if let Some(location) = info.location() {
        let _ = writeln!(
            serial,
            "  at {}:{}:{}",
            location.file(),
            location.line(),
            location.column()
        );
    }
    let _ = writeln!(serial, "  {}", info.message());
    halt_loop()
}

#[inline(always)]
#[cfg(not(test))]
fn halt_loop() -> ! {
    loop {
        unsafe {
            asm!("hlt", options(nomem, nostack, preserves_flags));
        }
    }
}

//! VGA text console integration
//!
//! Maps the physical VGA text buffer through the HHDM offset, builds the
//! console over it and prints the boot banner.

use console_vga::VgaConsole;
use hal::TextBuffer;
use hal_x86_64::{PortIo, RealPortIo, VgaTextBuffer};

use crate::config::{BootConfig, CursorMode};
use crate::error::BootError;

/// Console over the real CRTC ports and the memory-mapped text buffer
pub type KernelConsole = VgaConsole<RealPortIo, VgaTextBuffer>;

/// Addresses reported by the bootloader
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootInfo {
    pub hhdm_offset: Option<u64>,
    pub kernel_phys_base: Option<u64>,
    pub kernel_virt_base: Option<u64>,
}

/// Initialize VGA console from boot information
///
/// # Safety
///
/// The caller must ensure:
/// - the HHDM offset maps physical address 0xB8000
/// - no other references to VGA memory exist
pub unsafe fn init_vga_console(
    boot_info: &BootInfo,
    config: &BootConfig,
) -> Result<KernelConsole, BootError> {
    let hhdm_offset = boot_info.hhdm_offset.ok_or(BootError::MissingHhdm)?;
    let buffer = VgaTextBuffer::from_hhdm(hhdm_offset)?;
    let mut console = VgaConsole::new(RealPortIo::new(), buffer)?;
    prepare(&mut console, config);
    Ok(console)
}

/// Applies the console options of `config`
///
/// Clearing always homes the cursor, so `console.cursor=keep` only has an
/// effect together with `console.clear=0`.
pub fn prepare<P: PortIo, B: TextBuffer>(console: &mut VgaConsole<P, B>, config: &BootConfig) {
    if config.clear_screen {
        console.clear();
        return;
    }
    match config.cursor {
        CursorMode::Keep => {
            let position = console.sync_from_hardware();
            log::debug!(
                "keeping firmware cursor at {},{}",
                position.column(),
                position.row()
            );
        }
        CursorMode::Reset => console.set_cursor(0),
    }
}

/// Prints the banner and the boot addresses in hex
pub fn print_banner<P: PortIo, B: TextBuffer>(console: &mut VgaConsole<P, B>, info: &BootInfo) {
    console.print("kernel_bootstrap: vga console online\n");
    print_address(console, "hhdm offset  ", info.hhdm_offset);
    print_address(console, "kernel phys  ", info.kernel_phys_base);
    print_address(console, "kernel virt  ", info.kernel_virt_base);
    console.print("vga text     ");
    console.print_u32(hal_x86_64::VGA_TEXT_BUFFER_PHYS as u32);
    console.print("\n");
}

fn print_address<P: PortIo, B: TextBuffer>(
    console: &mut VgaConsole<P, B>,
    label: &str,
    address: Option<u64>,
) {
    console.print(label);
    match address {
        Some(address) => console.print_hex(address),
        None => console.print("unavailable"),
    }
    console.print("\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use console_vga::{VGA_HEIGHT, VGA_WIDTH};
    use hal::RamTextBuffer;
    use hal_x86_64::FakePortIo;

    fn console() -> VgaConsole<FakePortIo, RamTextBuffer> {
        VgaConsole::new(FakePortIo::new(), RamTextBuffer::new(VGA_WIDTH, VGA_HEIGHT)).unwrap()
    }

    #[test]
    fn test_banner_layout() {
        let mut console = console();
        let info = BootInfo {
            hhdm_offset: Some(0xFFFF_8000_0000_0000),
            kernel_phys_base: None,
            kernel_virt_base: Some(0xFFFF_FFFF_8000_0000),
        };
        print_banner(&mut console, &info);

        let buffer = console.buffer();
        assert_eq!(buffer.row_text(0), "kernel_bootstrap: vga console online");
        assert_eq!(buffer.row_text(1), "hhdm offset  FFFF800000000000");
        assert_eq!(buffer.row_text(2), "kernel phys  unavailable");
        assert_eq!(buffer.row_text(3), "kernel virt  FFFFFFFF80000000");
        assert_eq!(buffer.row_text(4), "vga text     000B8000");
        assert_eq!(console.position().get(), 5 * VGA_WIDTH);
    }

    #[test]
    fn test_prepare_clears_by_default() {
        let mut console = console();
        console.print("stale");
        prepare(&mut console, &BootConfig::DEFAULT);

        assert_eq!(console.buffer().row_text(0), " ".repeat(VGA_WIDTH));
        assert_eq!(console.position().get(), 0);
    }

    #[test]
    fn test_prepare_keeps_firmware_cursor() {
        let mut console = console();
        console.port_io_mut().script_reads(&[(0x3D5, 0x90), (0x3D5, 0x01)]);
        let config = BootConfig {
            clear_screen: false,
            cursor: CursorMode::Keep,
            ..BootConfig::DEFAULT
        };
        prepare(&mut console, &config);

        assert_eq!(console.position().get(), 0x0190);
    }

    #[test]
    fn test_prepare_keep_wraps_firmware_cursor_past_screen_end() {
        let mut console = console();
        console.port_io_mut().script_reads(&[(0x3D5, 0xD0), (0x3D5, 0x07)]);
        let config = BootConfig {
            clear_screen: false,
            cursor: CursorMode::Keep,
            ..BootConfig::DEFAULT
        };
        prepare(&mut console, &config);

        // 0x07D0 is 2000, one past the last cell
        assert_eq!(console.position().get(), 0);
        let writes = console.port_io_mut().take_writes();
        assert_eq!(
            &writes[2..],
            &[(0x3D4, 0x0F), (0x3D5, 0x00), (0x3D4, 0x0E), (0x3D5, 0x00)]
        );
    }

    #[test]
    fn test_prepare_reset_without_clear() {
        let mut console = console();
        console.set_cursor(500);
        console.print("kept");
        let config = BootConfig {
            clear_screen: false,
            ..BootConfig::DEFAULT
        };
        prepare(&mut console, &config);

        assert_eq!(console.position().get(), 0);
        assert_eq!(console.buffer().read_char(500), b'k');
    }
}

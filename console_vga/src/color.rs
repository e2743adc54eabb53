//! VGA colours and attribute bytes
//!
//! An attribute byte packs a 4-bit foreground colour in the low nibble and a
//! background colour in the high nibble. With blinking enabled (the VGA
//! default) bit 7 selects blink and only eight backgrounds are available;
//! with blinking disabled bit 7 is the background's bright bit.

/// VGA color codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VgaColor {
    Black = 0,
    Blue = 1,
    Green = 2,
    Cyan = 3,
    Red = 4,
    Magenta = 5,
    Brown = 6,
    LightGray = 7,
    DarkGray = 8,
    LightBlue = 9,
    LightGreen = 10,
    LightCyan = 11,
    LightRed = 12,
    Pink = 13,
    Yellow = 14,
    White = 15,
}

impl VgaColor {
    /// Make a VGA attribute byte from foreground and background colors
    pub const fn make_attr(fg: VgaColor, bg: VgaColor) -> u8 {
        (bg as u8) << 4 | (fg as u8)
    }

    /// Foreground field value (low nibble)
    pub const fn fg(self) -> u8 {
        self as u8
    }

    /// Background field value (high nibble)
    pub const fn bg(self) -> u8 {
        (self as u8) << 4
    }
}

/// Attribute constant table
///
/// `FG_*` and `BG_*` occupy disjoint nibbles and combine with `|`:
/// `attr::FG_YELLOW | attr::BG_BLUE == 0x1E`.
pub mod attr {
    pub const FG_BLACK: u8 = 0x00;
    pub const FG_BLUE: u8 = 0x01;
    pub const FG_GREEN: u8 = 0x02;
    pub const FG_CYAN: u8 = 0x03;
    pub const FG_RED: u8 = 0x04;
    pub const FG_MAGENTA: u8 = 0x05;
    pub const FG_BROWN: u8 = 0x06;
    pub const FG_LIGHT_GRAY: u8 = 0x07;
    pub const FG_DARK_GRAY: u8 = 0x08;
    pub const FG_LIGHT_BLUE: u8 = 0x09;
    pub const FG_LIGHT_GREEN: u8 = 0x0A;
    pub const FG_LIGHT_CYAN: u8 = 0x0B;
    pub const FG_LIGHT_RED: u8 = 0x0C;
    pub const FG_LIGHT_MAGENTA: u8 = 0x0D;
    pub const FG_YELLOW: u8 = 0x0E;
    pub const FG_WHITE: u8 = 0x0F;

    pub const BG_BLACK: u8 = 0x00;
    pub const BG_BLUE: u8 = 0x10;
    pub const BG_GREEN: u8 = 0x20;
    pub const BG_CYAN: u8 = 0x30;
    pub const BG_RED: u8 = 0x40;
    pub const BG_MAGENTA: u8 = 0x50;
    pub const BG_BROWN: u8 = 0x60;
    pub const BG_LIGHT_GRAY: u8 = 0x70;

    // Bit 7 set. Blinking in the default VGA mode, bright background when
    // blinking is disabled in the attribute controller.
    pub const BG_BLINK_BLACK: u8 = 0x80;
    pub const BG_BLINK_BLUE: u8 = 0x90;
    pub const BG_BLINK_GREEN: u8 = 0xA0;
    pub const BG_BLINK_CYAN: u8 = 0xB0;
    pub const BG_BLINK_RED: u8 = 0xC0;
    pub const BG_BLINK_MAGENTA: u8 = 0xD0;
    pub const BG_BLINK_BROWN: u8 = 0xE0;
    pub const BG_BLINK_LIGHT_GRAY: u8 = 0xF0;

    /// Blink bit of the background nibble
    pub const BLINK: u8 = 0x80;
}

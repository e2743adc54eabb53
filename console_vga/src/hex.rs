//! Fixed-width hexadecimal formatting
//!
//! Formats the raw bit pattern of an integer as uppercase hex, two digits per
//! byte of the type's width, most significant byte first. There is no `0x`
//! prefix and no sign: `-1i16` formats as `FFFF`.

/// Widest supported integer, in bytes
pub const MAX_HEX_BYTES: usize = 16;

/// Scratch capacity: two digits per byte plus the NUL terminator
pub const HEX_CAPACITY: usize = MAX_HEX_BYTES * 2 + 1;

/// Fixed-width integers that can be formatted as hex
pub trait HexDigits: Copy {
    /// Width of the type in bytes
    const BYTES: usize;

    /// Stores the value's bytes, least significant first, in `out[..BYTES]`
    fn le_bytes(self, out: &mut [u8; MAX_HEX_BYTES]);
}

macro_rules! impl_hex_digits {
    ($($ty:ty),* $(,)?) => {
        $(
            impl HexDigits for $ty {
                const BYTES: usize = core::mem::size_of::<$ty>();

                #[inline]
                fn le_bytes(self, out: &mut [u8; MAX_HEX_BYTES]) {
                    out[..Self::BYTES].copy_from_slice(&self.to_le_bytes());
                }
            }
        )*
    };
}

impl_hex_digits!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

#[inline]
const fn nibble_to_ascii(nibble: u8) -> u8 {
    if nibble < 10 {
        b'0' + nibble
    } else {
        nibble + (b'A' - 10)
    }
}

/// Single-slot hex formatter
///
/// Every call to [`HexFormatter::format`] overwrites the previous result;
/// the returned string borrows the formatter until the next call.
#[derive(Debug, Clone)]
pub struct HexFormatter {
    buf: [u8; HEX_CAPACITY],
    len: usize,
}

impl HexFormatter {
    /// Creates an empty formatter
    pub const fn new() -> Self {
        Self {
            buf: [0; HEX_CAPACITY],
            len: 0,
        }
    }

    /// Formats `value` and returns the digits
    pub fn format<T: HexDigits>(&mut self, value: T) -> &str {
        let mut bytes = [0u8; MAX_HEX_BYTES];
        value.le_bytes(&mut bytes);

        // Byte i (from the least significant end) lands at digit pair
        // BYTES-1-i so the most significant byte comes first.
        let count = T::BYTES;
        for (i, &byte) in bytes[..count].iter().enumerate() {
            let slot = (count - 1 - i) * 2;
            self.buf[slot] = nibble_to_ascii(byte >> 4);
            self.buf[slot + 1] = nibble_to_ascii(byte & 0x0F);
        }
        self.len = count * 2;
        self.buf[self.len] = 0;

        self.as_str()
    }

    /// Digits of the last formatted value
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }

    /// Digits of the last formatted value including the NUL terminator
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.buf[..=self.len]
    }
}

impl Default for HexFormatter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_u32() {
        let mut hex = HexFormatter::new();
        assert_eq!(hex.format(0x1A2B3C4Du32), "1A2B3C4D");
        assert_eq!(hex.as_bytes_with_nul(), b"1A2B3C4D\0");
    }

    #[test]
    fn test_format_zero_keeps_width() {
        let mut hex = HexFormatter::new();
        assert_eq!(hex.format(0u32), "00000000");
        assert_eq!(hex.format(0u8), "00");
        assert_eq!(hex.format(0u64), "0000000000000000");
    }

    #[test]
    fn test_format_signed_uses_bit_pattern() {
        let mut hex = HexFormatter::new();
        assert_eq!(hex.format(-1i16), "FFFF");
        assert_eq!(hex.format(i32::MIN), "80000000");
        assert_eq!(hex.format(-2i8), "FE");
    }

    #[test]
    fn test_every_nibble_digit() {
        let mut hex = HexFormatter::new();
        assert_eq!(hex.format(0x0123456789ABCDEFu64), "0123456789ABCDEF");
        assert_eq!(
            hex.format(0xFEDCBA98_76543210_0F1E2D3C_4B5A6978u128),
            "FEDCBA98765432100F1E2D3C4B5A6978"
        );
    }

    #[test]
    fn test_format_overwrites_previous_result() {
        let mut hex = HexFormatter::new();
        hex.format(u64::MAX);
        assert_eq!(hex.format(0xABu8), "AB");
        assert_eq!(hex.as_bytes_with_nul(), b"AB\0");
    }

    #[test]
    fn test_usize_width() {
        let mut hex = HexFormatter::new();
        assert_eq!(hex.format(1usize).len(), core::mem::size_of::<usize>() * 2);
    }

    #[test]
    fn test_empty_formatter() {
        let hex = HexFormatter::default();
        assert_eq!(hex.as_str(), "");
        assert_eq!(hex.as_bytes_with_nul(), b"\0");
    }
}

//! Packed binary-coded-decimal helpers.
//!
//! Every time-keeping register of the PCF2129 stores two decimal digits, tens in
//! the high nibble and units in the low nibble. Neither direction validates its
//! input: range limits are applied by [`Field`](crate::Field) before encoding, and
//! a register holding a nibble above 9 decodes to whatever the arithmetic yields.

/// Packs a decimal value (0-99) into BCD.
#[must_use]
pub const fn dec_to_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

/// Unpacks a BCD byte into its decimal value.
#[must_use]
pub const fn bcd_to_dec(value: u8) -> u8 {
    (value >> 4) * 10 + (value & 0x0F)
}

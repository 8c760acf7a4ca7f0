/// A one-byte register with a fixed address and a typed bit layout.
///
/// Implementors are usually `bitflags` structs; decoding must retain every
/// bit, including reserved ones, so that a read-modify-write cycle writes
/// back exactly what it read apart from the fields that were changed.
pub trait Register: Copy {
    /// Address of the register in the device's map.
    const ADDRESS: u8;

    /// Decode a register byte, keeping unknown bits.
    fn from_byte(byte: u8) -> Self;

    /// Encode back to the byte written on the bus.
    fn to_byte(self) -> u8;
}

/// Extract the value of a multi-bit field selected by `mask`.
///
/// The mask must be contiguous; the returned value is shifted down so the
/// field's least significant bit lands at bit 0.
pub const fn field(byte: u8, mask: u8) -> u8 {
    if mask == 0 {
        return 0;
    }
    (byte & mask) >> mask.trailing_zeros()
}

/// Replace the field selected by `mask` with `value`, leaving other bits alone.
///
/// Bits of `value` that do not fit in the field are discarded.
pub const fn with_field(byte: u8, mask: u8, value: u8) -> u8 {
    if mask == 0 {
        return byte;
    }
    (byte & !mask) | ((value << mask.trailing_zeros()) & mask)
}

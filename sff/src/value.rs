//! Choosing the narrowest binary representation for a path operand.

/// The binary type of a numeric operand in an encoded path.
///
/// The discriminant is the code stored in the low nibble of a control byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ValueType {
    Uint8 = 1,
    Int8 = 2,
    Uint16 = 3,
    Int16 = 4,
    Uint32 = 5,
    Int32 = 6,
    Float32 = 7,
}

impl ValueType {
    /// All types, ordered by their code.
    pub const ALL: [ValueType; 7] = [
        ValueType::Uint8,
        ValueType::Int8,
        ValueType::Uint16,
        ValueType::Int16,
        ValueType::Uint32,
        ValueType::Int32,
        ValueType::Float32,
    ];

    /// Pick the narrowest type that represents `value`.
    ///
    /// Non-integral values are always [`Float32`](ValueType::Float32).
    /// Integral values are ranked by magnitude; a non-negative value gets
    /// twice the headroom of a negative one at the same width, since it does
    /// not need the sign bit:
    ///
    /// | magnitude        | `>= 0`   | `< 0`   |
    /// |------------------|----------|---------|
    /// | `< 128 * f`      | `Uint8`  | `Int8`  |
    /// | `< 32768 * f`    | `Uint16` | `Int16` |
    /// | otherwise        | `Uint32` | `Int32` |
    ///
    /// where `f` is 2 for non-negative values and 1 otherwise.
    ///
    /// Integral values that do not fit in 32 bits fall back to `Float32`.
    pub fn classify(value: f64) -> ValueType {
        if !value.is_finite() || value.fract() != 0.0 {
            return ValueType::Float32;
        }
        let unsigned = value >= 0.0;
        let factor = if unsigned { 2.0 } else { 1.0 };
        let magnitude = value.abs();
        match (unsigned, magnitude) {
            (true, m) if m < 128.0 * factor => ValueType::Uint8,
            (false, m) if m < 128.0 * factor => ValueType::Int8,
            (true, m) if m < 32768.0 * factor => ValueType::Uint16,
            (false, m) if m < 32768.0 * factor => ValueType::Int16,
            (true, m) if m <= u32::MAX as f64 => ValueType::Uint32,
            (false, m) if m <= -(i32::MIN as f64) => ValueType::Int32,
            _ => ValueType::Float32,
        }
    }

    /// The code stored in the low nibble of a control byte.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Look up a type by its control byte code.
    pub fn from_code(code: u8) -> Option<ValueType> {
        ValueType::ALL.into_iter().find(|ty| ty.code() == code)
    }

    /// The number of bytes an operand of this type occupies.
    pub fn byte_len(self) -> usize {
        match self {
            ValueType::Uint8 | ValueType::Int8 => 1,
            ValueType::Uint16 | ValueType::Int16 => 2,
            ValueType::Uint32 | ValueType::Int32 | ValueType::Float32 => 4,
        }
    }

    /// Append `value` to `out` as big-endian bytes of this type.
    ///
    /// `value` must have been classified as this type; the conversions
    /// below are lossless in that case (except for `Float32`, which
    /// narrows to single precision).
    pub(crate) fn write_be(self, value: f64, out: &mut Vec<u8>) {
        match self {
            ValueType::Uint8 => out.push(value as u8),
            ValueType::Int8 => out.extend((value as i8).to_be_bytes()),
            ValueType::Uint16 => out.extend((value as u16).to_be_bytes()),
            ValueType::Int16 => out.extend((value as i16).to_be_bytes()),
            ValueType::Uint32 => out.extend((value as u32).to_be_bytes()),
            ValueType::Int32 => out.extend((value as i32).to_be_bytes()),
            ValueType::Float32 => out.extend((value as f32).to_be_bytes()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsigned_ranges() {
        assert_eq!(ValueType::classify(0.0), ValueType::Uint8);
        assert_eq!(ValueType::classify(127.0), ValueType::Uint8);
        assert_eq!(ValueType::classify(128.0), ValueType::Uint8);
        assert_eq!(ValueType::classify(255.0), ValueType::Uint8);
        assert_eq!(ValueType::classify(256.0), ValueType::Uint16);
        assert_eq!(ValueType::classify(65535.0), ValueType::Uint16);
        assert_eq!(ValueType::classify(65536.0), ValueType::Uint32);
        assert_eq!(ValueType::classify(u32::MAX as f64), ValueType::Uint32);
    }

    #[test]
    fn signed_ranges() {
        assert_eq!(ValueType::classify(-1.0), ValueType::Int8);
        assert_eq!(ValueType::classify(-127.0), ValueType::Int8);
        // the signed range is not widened: -128 already needs 16 bits
        assert_eq!(ValueType::classify(-128.0), ValueType::Int16);
        assert_eq!(ValueType::classify(-129.0), ValueType::Int16);
        assert_eq!(ValueType::classify(-32767.0), ValueType::Int16);
        assert_eq!(ValueType::classify(-32768.0), ValueType::Int32);
        assert_eq!(ValueType::classify(i32::MIN as f64), ValueType::Int32);
    }

    #[test]
    fn fractions_and_overflow() {
        assert_eq!(ValueType::classify(0.5), ValueType::Float32);
        assert_eq!(ValueType::classify(-10.1), ValueType::Float32);
        assert_eq!(ValueType::classify(f64::NAN), ValueType::Float32);
        assert_eq!(ValueType::classify(5e9), ValueType::Float32);
        assert_eq!(ValueType::classify(-3e9), ValueType::Float32);
    }

    #[test]
    fn negative_zero_is_unsigned() {
        assert_eq!(ValueType::classify(-0.0), ValueType::Uint8);
    }

    #[test]
    fn codes_round_trip() {
        for ty in ValueType::ALL {
            assert_eq!(ValueType::from_code(ty.code()), Some(ty));
        }
        assert_eq!(ValueType::from_code(0), None);
        assert_eq!(ValueType::from_code(8), None);
    }

    #[test]
    fn big_endian_operands() {
        let mut out = Vec::new();
        ValueType::Int8.write_be(-2.0, &mut out);
        ValueType::Uint16.write_be(300.0, &mut out);
        ValueType::Int32.write_be(-40000.0, &mut out);
        ValueType::Float32.write_be(1.5, &mut out);
        assert_eq!(
            out,
            [0xFE, 0x01, 0x2C, 0xFF, 0xFF, 0x63, 0xC0, 0x3F, 0xC0, 0x00, 0x00]
        );
    }
}

// Outcome of an 8-bit ALU operation before it is committed to the flags
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AluResult {
    pub value: u8,
    pub carry: bool, // carry out of bit 7 (borrow for subtraction)
    pub aux: bool,   // carry out of bit 3 (borrow for subtraction)
}

// True when the byte has an even number of set bits
pub fn even_parity(value: u8) -> bool {
    value.count_ones() % 2 == 0
}

// 8-bit addition with carry-in
pub fn add8(lhs: u8, rhs: u8, carry_in: bool) -> AluResult {
    let cin = carry_in as u16;
    let sum = lhs as u16 + rhs as u16 + cin;
    AluResult {
        value: (sum & 0xFF) as u8,
        carry: sum > 0xFF,
        aux: (lhs & 0x0F) as u16 + (rhs & 0x0F) as u16 + cin > 0x0F,
    }
}

// 8-bit subtraction with borrow-in
pub fn sub8(lhs: u8, rhs: u8, borrow_in: bool) -> AluResult {
    let bin = borrow_in as u16;
    AluResult {
        value: lhs.wrapping_sub(rhs).wrapping_sub(bin as u8),
        carry: (lhs as u16) < rhs as u16 + bin,
        aux: ((lhs & 0x0F) as u16) < (rhs & 0x0F) as u16 + bin,
    }
}

// Decimal adjust of the accumulator, returns (value, carry, aux)
pub fn decimal_adjust(acc: u8, carry: bool, aux: bool) -> (u8, bool, bool) {
    let mut value = acc as u16;
    let mut aux_out = false;

    if (value & 0x0F) > 9 || aux {
        aux_out = (value & 0x0F) + 6 > 0x0F;
        value += 0x06;
    }

    // High nibble is checked after the low correction has rippled into it
    let mut carry_out = carry || value > 0xFF;
    if ((value >> 4) & 0x1F) > 9 || carry_out {
        value += 0x60;
        carry_out = true;
    }

    ((value & 0xFF) as u8, carry_out, aux_out)
}

// Combine high and low bytes into a 16-bit word
pub fn word(high: u8, low: u8) -> u16 {
    u16::from_be_bytes([high, low])
}

// Strict hexadecimal parsing: exactly `digits` hex characters, no sign or prefix
pub fn parse_hex(text: &str, digits: usize) -> Option<u16> {
    if text.len() != digits || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u16::from_str_radix(text, 16).ok()
}

#[cfg(test)]
mod alu_tests {
    use super::*;

    #[test]
    fn test_add_flags_exhaustive() {
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                let r = add8(a, b, false);
                let sum = a as u16 + b as u16;
                assert_eq!(r.value, (sum % 256) as u8);
                assert_eq!(r.carry, sum > 255, "carry {:02X}+{:02X}", a, b);
                assert_eq!(r.aux, (a & 0xF) + (b & 0xF) > 0xF);
            }
        }
    }

    #[test]
    fn test_sub_borrow_exhaustive() {
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                let r = sub8(a, b, false);
                assert_eq!(r.value, a.wrapping_sub(b));
                assert_eq!(r.carry, b > a, "borrow {:02X}-{:02X}", a, b);
                assert_eq!(r.aux, (b & 0xF) > (a & 0xF));
            }
        }
    }

    #[test]
    fn test_carry_in_and_borrow_in() {
        assert_eq!(add8(0xFF, 0x00, true), AluResult { value: 0x00, carry: true, aux: true });
        assert_eq!(sub8(0x00, 0x00, true), AluResult { value: 0xFF, carry: true, aux: true });
        assert_eq!(sub8(0x10, 0x0F, true), AluResult { value: 0x00, carry: false, aux: true });
    }

    #[test]
    fn test_decimal_adjust() {
        // 0x52 + 0x99 = 0xEB, adjusted to 51 with carry
        assert_eq!(decimal_adjust(0xEB, false, false), (0x51, true, true));
        // 0x38 + 0x45 = 0x7D -> 83
        assert_eq!(decimal_adjust(0x7D, false, false), (0x83, false, true));
        // 0x29 + 0x19 = 0x42 with AC -> 48
        assert_eq!(decimal_adjust(0x42, false, true), (0x48, false, false));
        // Already valid BCD stays put
        assert_eq!(decimal_adjust(0x45, false, false), (0x45, false, false));
        // Carry-in always applies the high correction and keeps CY
        assert_eq!(decimal_adjust(0x12, true, false), (0x72, true, false));
        // Low correction rippling into a high nibble of 9
        assert_eq!(decimal_adjust(0x9A, false, false), (0x00, true, true));
        // Low correction overflowing bit 7
        assert_eq!(decimal_adjust(0xFA, false, false), (0x60, true, true));
    }

    #[test]
    fn test_parity() {
        assert!(even_parity(0x00));
        assert!(even_parity(0x03));
        assert!(!even_parity(0x01));
        assert!(!even_parity(0x80));
        assert!(even_parity(0xFF));
    }

    #[test]
    fn test_parse_hex_strict() {
        assert_eq!(parse_hex("C050", 4), Some(0xC050));
        assert_eq!(parse_hex("0f", 2), Some(0x0F));
        assert_eq!(parse_hex("F", 2), None);
        assert_eq!(parse_hex("C05", 4), None);
        assert_eq!(parse_hex("+F", 2), None);
        assert_eq!(parse_hex("0x", 2), None);
        assert_eq!(parse_hex("0xC0", 4), None);
        assert_eq!(parse_hex("G0", 2), None);
        assert_eq!(parse_hex("", 2), None);
    }

    #[test]
    fn test_word() {
        assert_eq!(word(0xEB, 0x2C), 0xEB2C);
    }
}

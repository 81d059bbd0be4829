//! Bit addressing over byte strings. Bit `n` lives in byte `n / 8`, counted from the most
//! significant bit.

use crate::utils::range;

/// Largest addressable bit, the last bit of a 512 MiB string.
pub const MAX_BIT_OFFSET: u64 = (range::MAX_STRING_LEN as u64) * 8 - 1;

pub fn get_bit(value: &[u8], offset: u64) -> u8 {
    let byte_index = (offset / 8) as usize;
    let shift = 7 - (offset % 8);

    value
        .get(byte_index)
        .map(|byte| (byte >> shift) & 1)
        .unwrap_or(0)
}

/// Sets the bit at `offset`, growing the value with zero bytes as needed. Returns the previous
/// bit.
pub fn set_bit(value: &mut Vec<u8>, offset: u64, bit: bool) -> u8 {
    let byte_index = (offset / 8) as usize;
    let shift = 7 - (offset % 8);

    if value.len() <= byte_index {
        value.resize(byte_index + 1, 0);
    }

    let previous = (value[byte_index] >> shift) & 1;
    if bit {
        value[byte_index] |= 1 << shift;
    } else {
        value[byte_index] &= !(1 << shift);
    }

    previous
}

/// Counts set bits, optionally restricted to an inclusive byte range.
pub fn count(value: &[u8], bytes: Option<(i64, i64)>) -> u64 {
    let slice = match bytes {
        None => value,
        Some((start, end)) => match range::resolve(value.len(), start, end) {
            Some((start, end)) => &value[start..=end],
            None => return 0,
        },
    };

    slice.iter().map(|byte| byte.count_ones() as u64).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_bit_on_empty_value() {
        let mut value = vec![];

        assert_eq!(set_bit(&mut value, 7, true), 0);
        assert_eq!(value, vec![0b0000_0001]);
        assert_eq!(get_bit(&value, 7), 1);
        assert_eq!(get_bit(&value, 0), 0);
    }

    #[test]
    fn set_bit_returns_previous_value() {
        let mut value = vec![0b1000_0000];

        assert_eq!(set_bit(&mut value, 0, false), 1);
        assert_eq!(value, vec![0]);
    }

    #[test]
    fn set_bit_extends_value() {
        let mut value = b"a".to_vec();

        set_bit(&mut value, 17, true);

        assert_eq!(value, vec![b'a', 0, 0b0100_0000]);
    }

    #[test]
    fn get_bit_past_the_end_is_zero() {
        assert_eq!(get_bit(b"a", 100), 0);
    }

    #[test]
    fn count_bits() {
        assert_eq!(count(b"foobar", None), 26);
        assert_eq!(count(b"foobar", Some((0, 0))), 4);
        assert_eq!(count(b"foobar", Some((1, 1))), 6);
        assert_eq!(count(b"foobar", Some((-2, -1))), 7);
        assert_eq!(count(b"foobar", Some((4, 2))), 0);
    }
}

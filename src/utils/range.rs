//! Byte-range addressing with Redis's negative index conventions, shared by GETRANGE, SETRANGE
//! and BITCOUNT.

use bytes::Bytes;

/// Strings cannot grow beyond 512 MiB.
pub const MAX_STRING_LEN: usize = 512 * 1024 * 1024;

/// Resolves the inclusive `[start, end]` range against a value of `len` bytes. Negative indexes
/// count from the end, `-1` being the last byte. Out of bounds ends are clamped, an empty or
/// inverted range resolves to `None`.
pub fn resolve(len: usize, start: i64, end: i64) -> Option<(usize, usize)> {
    if start < 0 && end < 0 && start > end {
        return None;
    }

    let len = len as i64;
    let start = if start < 0 { len + start } else { start }.max(0);
    let end = if end < 0 { len + end } else { end }.max(0).min(len - 1);

    if len == 0 || start > end {
        return None;
    }

    Some((start as usize, end as usize))
}

/// Returns the bytes of `value` between `start` and `end`, both inclusive.
pub fn get(value: &[u8], start: i64, end: i64) -> Bytes {
    match resolve(value.len(), start, end) {
        Some((start, end)) => Bytes::copy_from_slice(&value[start..=end]),
        None => Bytes::new(),
    }
}

/// Resolves a single write offset, negative offsets are relative to the current length.
pub fn resolve_offset(len: usize, offset: i64) -> Option<usize> {
    let offset = if offset < 0 { len as i64 + offset } else { offset };
    usize::try_from(offset).ok()
}

/// Overwrites `current` with `value` starting at `offset`, padding with zero bytes when the
/// offset lies past the end.
pub fn set(current: &[u8], offset: usize, value: &[u8]) -> Vec<u8> {
    let new_len = usize::max(offset + value.len(), current.len());
    let mut new_value = vec![0u8; new_len];

    new_value[..current.len()].copy_from_slice(current);
    new_value[offset..offset + value.len()].copy_from_slice(value);

    new_value
}

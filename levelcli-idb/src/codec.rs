use std::cmp::Ordering;

use crate::Error;
use crate::Result;

/// Nine 7-bit groups, 63 bits of value.
pub const MAX_VARINT_LEN: usize = 9;

/// Remaining input of both sides after a comparison, and its outcome.
pub type Compared<'a> = (&'a [u8], &'a [u8], Ordering);

/// Decode a little-endian unsigned integer of 1 to 8 bytes.
pub fn decode_fixed_int(bytes: &[u8]) -> Result<u64> {
    if bytes.is_empty() || bytes.len() > 8 {
        return Err(Error::MalformedKey(
            "fixed width integer must be between 1 and 8 bytes",
        ));
    }
    let mut buf = [0u8; 8];
    buf[..bytes.len()].copy_from_slice(bytes);
    Ok(u64::from_le_bytes(buf))
}

/// Decode a varint, returning the input that follows it.
pub fn decode_varint(bytes: &[u8]) -> Result<(&[u8], u64)> {
    let mut value = 0u64;
    for (i, b) in bytes.iter().take(MAX_VARINT_LEN).enumerate() {
        value |= u64::from(b & 0x7f) << (7 * i);
        if b & 0x80 == 0 {
            return Ok((&bytes[i + 1..], value));
        }
    }
    Err(Error::MalformedKey("unterminated varint"))
}

pub fn encode_varint(mut value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAX_VARINT_LEN);
    loop {
        if value & !0x7f == 0 {
            out.push(value as u8);
            return out;
        }
        out.push(value as u8 | 0x80);
        value >>= 7;
    }
}

/// Returns `true` if a varint terminates within the first [`MAX_VARINT_LEN`] bytes of `bytes`.
pub fn is_complete_varint(bytes: &[u8]) -> bool {
    bytes.iter().take(MAX_VARINT_LEN).any(|b| b & 0x80 == 0)
}

/// Compare two `varint length ++ bytes` fields.
///
/// If either side declares more bytes than it holds, only the overlapping bytes are compared and
/// ties are broken by the declared lengths. Nothing is left to compare after a truncated field.
pub fn compare_binary<'a>(a: &'a [u8], b: &'a [u8]) -> Result<Compared<'a>> {
    compare_length_prefixed(a, b, 1)
}

/// Like [`compare_binary`], but the length counts UTF-16 code units of two bytes each.
pub fn compare_string_with_length<'a>(a: &'a [u8], b: &'a [u8]) -> Result<Compared<'a>> {
    compare_length_prefixed(a, b, 2)
}

fn compare_length_prefixed<'a>(a: &'a [u8], b: &'a [u8], unit: u64) -> Result<Compared<'a>> {
    let (a, count_a) = decode_varint(a)?;
    let (b, count_b) = decode_varint(b)?;
    // counts fit in 63 bits so this cannot overflow for unit <= 2
    let len_a = count_a * unit;
    let len_b = count_b * unit;

    if (a.len() as u64) < len_a || (b.len() as u64) < len_b {
        let overlap = len_a
            .min(len_b)
            .min(a.len() as u64)
            .min(b.len() as u64) as usize;
        let ord = a[..overlap]
            .cmp(&b[..overlap])
            .then(count_a.cmp(&count_b));
        return Ok((&[], &[], ord));
    }

    let (body_a, rest_a) = a.split_at(len_a as usize);
    let (body_b, rest_b) = b.split_at(len_b as usize);
    Ok((rest_a, rest_b, body_a.cmp(body_b)))
}

/// Compare two 8-byte little-endian IEEE-754 doubles. Zeroes of either sign are equal; a pair
/// involving NaN falls back to the IEEE-754 total order.
pub fn compare_double<'a>(a: &'a [u8], b: &'a [u8]) -> Result<Compared<'a>> {
    let (Some((double_a, a)), Some((double_b, b))) =
        (a.split_first_chunk::<8>(), b.split_first_chunk::<8>())
    else {
        return Err(Error::MalformedKey("truncated double"));
    };
    let (x, y) = (f64::from_le_bytes(*double_a), f64::from_le_bytes(*double_b));
    let ord = x.partial_cmp(&y).unwrap_or_else(|| x.total_cmp(&y));
    Ok((a, b, ord))
}

/// The least byte sequence greater than `bytes` that is no longer than it. Trailing `0xff` bytes
/// are dropped and the last remaining byte is incremented. `None` if `bytes` is empty or all
/// `0xff`.
pub fn succ_bytes(bytes: &[u8]) -> Option<Vec<u8>> {
    let last = bytes.iter().rposition(|&b| b != u8::MAX)?;
    let mut succ = bytes[..=last].to_vec();
    succ[last] += 1;
    Some(succ)
}

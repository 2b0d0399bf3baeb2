use std::cmp::Ordering;

use crate::Compared;
use crate::Error;
use crate::Result;
use crate::decode_varint;
use crate::encode_varint;
use crate::grammar::Field;

/// Deepest array nesting accepted when walking an encoded value.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Type tag leading every encoded value. The discriminants are the wire bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum KeyType {
    Null = 0,
    String = 1,
    Date = 2,
    Number = 3,
    Array = 4,
    MinKey = 5,
    Binary = 6,
}

impl KeyType {
    pub fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            0 => KeyType::Null,
            1 => KeyType::String,
            2 => KeyType::Date,
            3 => KeyType::Number,
            4 => KeyType::Array,
            5 => KeyType::MinKey,
            6 => KeyType::Binary,
            _ => return None,
        })
    }

    /// Position in the cross-type order. Unknown tags share the lowest rank with null.
    pub fn rank_of(byte: u8) -> u8 {
        match Self::from_byte(byte) {
            None | Some(KeyType::Null) => 0,
            Some(KeyType::Array) => 1,
            Some(KeyType::Binary) => 2,
            Some(KeyType::String) => 3,
            Some(KeyType::Date) => 4,
            Some(KeyType::Number) => 5,
            Some(KeyType::MinKey) => 7,
        }
    }

    /// Tag of the next type in rank order. Every value of this type sorts below an encoding that
    /// starts with it. `None` for min-key, which ranks highest.
    pub fn successor_byte(self) -> Option<u8> {
        match self {
            KeyType::Null => Some(KeyType::Array as u8),
            KeyType::Array => Some(KeyType::Binary as u8),
            KeyType::Binary => Some(KeyType::String as u8),
            KeyType::String => Some(KeyType::Date as u8),
            KeyType::Date => Some(KeyType::Number as u8),
            KeyType::Number => Some(KeyType::MinKey as u8),
            KeyType::MinKey => None,
        }
    }
}

/// A decoded IndexedDB key value.
///
/// Strings hold UTF-16 code units; they are written big-endian so the bytewise order of the
/// payload matches code unit order.
#[derive(Debug, Clone, PartialEq)]
pub enum EncodedValue {
    Null,
    Array(Vec<EncodedValue>),
    Binary(Vec<u8>),
    String(Vec<u16>),
    Date(f64),
    Number(f64),
    MinKey,
}

impl EncodedValue {
    pub fn string(s: &str) -> Self {
        EncodedValue::String(s.encode_utf16().collect())
    }

    pub fn key_type(&self) -> KeyType {
        match self {
            EncodedValue::Null => KeyType::Null,
            EncodedValue::Array(_) => KeyType::Array,
            EncodedValue::Binary(_) => KeyType::Binary,
            EncodedValue::String(_) => KeyType::String,
            EncodedValue::Date(_) => KeyType::Date,
            EncodedValue::Number(_) => KeyType::Number,
            EncodedValue::MinKey => KeyType::MinKey,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_into(&mut out);
        out
    }

    pub fn encode_into(&self, out: &mut Vec<u8>) {
        out.push(self.key_type() as u8);
        match self {
            EncodedValue::Null | EncodedValue::MinKey => {}
            EncodedValue::Array(values) => {
                out.extend(encode_varint(values.len() as u64));
                for v in values {
                    v.encode_into(out);
                }
            }
            EncodedValue::Binary(bytes) => {
                out.extend(encode_varint(bytes.len() as u64));
                out.extend_from_slice(bytes);
            }
            EncodedValue::String(units) => {
                out.extend(encode_varint(units.len() as u64));
                for unit in units {
                    out.extend_from_slice(&unit.to_be_bytes());
                }
            }
            EncodedValue::Date(v) | EncodedValue::Number(v) => {
                out.extend_from_slice(&v.to_le_bytes());
            }
        }
    }
}

/// Order two encoded values, returning the input that follows each of them.
///
/// Truncated input is tolerated: an exhausted side sorts first, and length prefixed payloads
/// compare only the bytes both sides hold before falling back to their declared lengths.
pub fn compare_encoded_values<'a>(a: &'a [u8], b: &'a [u8]) -> Result<Compared<'a>> {
    compare_nested(a, b, 0)
}

fn compare_nested<'a>(a: &'a [u8], b: &'a [u8], depth: usize) -> Result<Compared<'a>> {
    if depth > MAX_NESTING_DEPTH {
        return Err(Error::MalformedKey("array nesting too deep"));
    }
    let (Some((&tag_a, a)), Some((&tag_b, b))) = (a.split_first(), b.split_first()) else {
        return Ok((a, b, a.len().cmp(&b.len())));
    };
    let ord = KeyType::rank_of(tag_a).cmp(&KeyType::rank_of(tag_b));
    if ord.is_ne() {
        return Ok((a, b, ord));
    }

    let (Some(key_type), Some(_)) = (KeyType::from_byte(tag_a), KeyType::from_byte(tag_b)) else {
        return Err(Error::MalformedKey("unknown type tag"));
    };
    if matches!(key_type, KeyType::Null | KeyType::MinKey) {
        return Ok((a, b, Ordering::Equal));
    }
    if a.is_empty() || b.is_empty() {
        return Ok((a, b, a.len().cmp(&b.len())));
    }
    match key_type {
        KeyType::Array => {
            let (mut a, count_a) = decode_varint(a)?;
            let (mut b, count_b) = decode_varint(b)?;
            for _ in 0..count_a.min(count_b) {
                if a.is_empty() || b.is_empty() {
                    break;
                }
                let (rest_a, rest_b, ord) = compare_nested(a, b, depth + 1)?;
                if ord.is_ne() {
                    return Ok((rest_a, rest_b, ord));
                }
                a = rest_a;
                b = rest_b;
            }
            Ok((a, b, count_a.cmp(&count_b)))
        }
        KeyType::Binary => Field::Binary.compare(a, b),
        KeyType::String => Field::StringWithLength.compare(a, b),
        KeyType::Date | KeyType::Number => Field::Double.compare(a, b),
        KeyType::Null | KeyType::MinKey => Ok((a, b, Ordering::Equal)),
    }
}

//! Field layout of record key bodies.

use crate::Compared;
use crate::KeyKind;
use crate::Result;
use crate::compare_binary;
use crate::compare_double;
use crate::compare_encoded_values;
use crate::compare_string_with_length;
use crate::decode_varint;

const MAX_SIMPLE_GLOBAL_METADATA_TYPE_BYTE: u8 = 7;
const SCOPES_PREFIX_BYTE: u8 = 50;
const DATABASE_FREE_LIST_TYPE_BYTE: u8 = 100;
const DATABASE_NAME_TYPE_BYTE: u8 = 201;

const MAX_SIMPLE_DATABASE_METADATA_TYPE_BYTE: u8 = 6;
const OBJECT_STORE_METADATA_TYPE_BYTE: u8 = 50;
const INDEX_METADATA_TYPE_BYTE: u8 = 100;
const OBJECT_STORE_FREE_LIST_TYPE_BYTE: u8 = 150;
const INDEX_FREE_LIST_TYPE_BYTE: u8 = 151;
const OBJECT_STORE_NAMES_TYPE_BYTE: u8 = 200;
const INDEX_NAMES_TYPE_BYTE: u8 = 201;

/// One field of a key body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field {
    Byte,
    VarInt,
    Binary,
    StringWithLength,
    Double,
    EncodedValue,
    /// Everything left, compared bytewise.
    Remainder,
}

impl Field {
    /// Order the field at the front of `a` and `b`, returning the input that follows it.
    /// An exhausted side sorts first.
    pub(crate) fn compare<'a>(self, a: &'a [u8], b: &'a [u8]) -> Result<Compared<'a>> {
        if self != Field::Remainder && (a.is_empty() || b.is_empty()) {
            return Ok((a, b, a.len().cmp(&b.len())));
        }
        match self {
            Field::Byte => Ok((&a[1..], &b[1..], a[0].cmp(&b[0]))),
            Field::VarInt => {
                let (rest_a, v_a) = decode_varint(a)?;
                let (rest_b, v_b) = decode_varint(b)?;
                Ok((rest_a, rest_b, v_a.cmp(&v_b)))
            }
            Field::Binary => compare_binary(a, b),
            Field::StringWithLength => compare_string_with_length(a, b),
            Field::Double => compare_double(a, b),
            Field::EncodedValue => compare_encoded_values(a, b),
            Field::Remainder => Ok((&a[a.len()..], &b[b.len()..], a.cmp(b))),
        }
    }
}

/// Fields following the discriminator byte of a metadata key. Discriminators that carry no
/// payload yield no fields; `None` means the discriminator is not recognized.
pub(crate) fn metadata_fields(kind: KeyKind, discriminator: u8) -> Option<&'static [Field]> {
    use Field::*;

    match kind {
        KeyKind::GlobalMetadata => match discriminator {
            d if d < MAX_SIMPLE_GLOBAL_METADATA_TYPE_BYTE => Some(&[]),
            SCOPES_PREFIX_BYTE => Some(&[Remainder]),
            DATABASE_FREE_LIST_TYPE_BYTE => Some(&[VarInt]),
            DATABASE_NAME_TYPE_BYTE => Some(&[StringWithLength, StringWithLength]),
            _ => None,
        },
        KeyKind::DatabaseMetadata => match discriminator {
            d if d < MAX_SIMPLE_DATABASE_METADATA_TYPE_BYTE => Some(&[]),
            OBJECT_STORE_METADATA_TYPE_BYTE => Some(&[VarInt, Byte]),
            INDEX_METADATA_TYPE_BYTE => Some(&[VarInt, VarInt, Byte]),
            OBJECT_STORE_FREE_LIST_TYPE_BYTE => Some(&[VarInt]),
            INDEX_FREE_LIST_TYPE_BYTE => Some(&[VarInt, VarInt]),
            OBJECT_STORE_NAMES_TYPE_BYTE => Some(&[StringWithLength]),
            INDEX_NAMES_TYPE_BYTE => Some(&[VarInt, StringWithLength]),
            _ => None,
        },
        _ => None,
    }
}

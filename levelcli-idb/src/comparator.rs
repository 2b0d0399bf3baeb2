use std::cmp::Ordering;

use crate::Error;
use crate::KeyKind;
use crate::KeyPrefix;
use crate::Result;
use crate::compare_encoded_values;
use crate::decode_varint;
use crate::grammar::Field;
use crate::grammar::metadata_fields;

/// The comparator Chromium registers for its IndexedDB LevelDB stores.
///
/// It holds no state; construct it wherever one is needed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdbCmp1;

impl IdbCmp1 {
    /// Name stored in the database manifest. Stores written by Chromium only open under it.
    pub const NAME: &'static str = "idb_cmp1";

    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    /// Order two record keys.
    ///
    /// Never fails. A pair that cannot be decoded is logged and ordered bytewise, which keeps
    /// the order total over every key the storage engine holds.
    pub fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        match self.try_compare(a, b) {
            Ok(ord) => ord,
            Err(e) => {
                log::warn!("idb_cmp1: invalid IndexedDB key found: {e}");
                log::debug!("a = {}", hex::encode(a));
                log::debug!("b = {}", hex::encode(b));
                a.cmp(b)
            }
        }
    }

    /// Order two record keys, reporting keys that do not decode.
    pub fn try_compare(&self, a: &[u8], b: &[u8]) -> Result<Ordering> {
        let (a, prefix_a) = KeyPrefix::decode(a)?;
        let (b, prefix_b) = KeyPrefix::decode(b)?;
        let ord = prefix_a.cmp(&prefix_b);
        if ord.is_ne() {
            return Ok(ord);
        }

        match prefix_a.kind() {
            kind @ (KeyKind::GlobalMetadata | KeyKind::DatabaseMetadata) => {
                let (Some((&disc_a, a)), Some((&disc_b, b))) = (a.split_first(), b.split_first())
                else {
                    return Ok(a.len().cmp(&b.len()));
                };
                let ord = disc_a.cmp(&disc_b);
                if ord.is_ne() {
                    return Ok(ord);
                }
                let fields = metadata_fields(kind, disc_a)
                    .ok_or(Error::MalformedKey("unknown metadata type byte"))?;
                compare_fields(a, b, fields)
            }
            KeyKind::ObjectStoreData | KeyKind::ExistsEntry | KeyKind::BlobEntry => {
                compare_fields(a, b, &[Field::EncodedValue])
            }
            KeyKind::IndexData => compare_index_data(a, b),
            KeyKind::Invalid => Err(Error::MalformedKey("invalid index id")),
        }
    }
}

/// Compare a fixed run of fields. Trailing input after the last field does not take part.
fn compare_fields<'a>(mut a: &'a [u8], mut b: &'a [u8], fields: &[Field]) -> Result<Ordering> {
    for field in fields {
        let (rest_a, rest_b, ord) = field.compare(a, b)?;
        if ord.is_ne() {
            return Ok(ord);
        }
        a = rest_a;
        b = rest_b;
    }
    Ok(Ordering::Equal)
}

/// Index entries are `value ++ [sequence number] ++ primary key`. Equal values order by
/// primary key, then by sequence number, where a missing sequence number sorts first.
fn compare_index_data(a: &[u8], b: &[u8]) -> Result<Ordering> {
    let (a, b, ord) = compare_encoded_values(a, b)?;
    if ord.is_ne() {
        return Ok(ord);
    }

    let (a, seq_a) = optional_varint(a)?;
    let (b, seq_b) = optional_varint(b)?;
    if a.is_empty() || b.is_empty() {
        return Ok(a.len().cmp(&b.len()).then(seq_a.cmp(&seq_b)));
    }
    let (_, _, ord) = compare_encoded_values(a, b)?;
    Ok(ord.then(seq_a.cmp(&seq_b)))
}

fn optional_varint(bytes: &[u8]) -> Result<(&[u8], Option<u64>)> {
    if bytes.is_empty() {
        return Ok((bytes, None));
    }
    let (rest, v) = decode_varint(bytes)?;
    Ok((rest, Some(v)))
}

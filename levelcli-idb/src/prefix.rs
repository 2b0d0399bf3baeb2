use std::collections::VecDeque;

use crate::EncodedValue;
use crate::Error;
use crate::KeyKind;
use crate::KeyPrefix;
use crate::KeyType;
use crate::MAX_NESTING_DEPTH;
use crate::MAX_VARINT_LEN;
use crate::Result;
use crate::Widths;
use crate::decode_varint;
use crate::encode_varint;
use crate::grammar::Field;
use crate::grammar::metadata_fields;
use crate::succ_bytes;

/// A `[start, limit)` key range under `idb_cmp1`. A missing limit leaves the range open above.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixRange {
    pub start: Vec<u8>,
    pub limit: Option<Vec<u8>>,
}

/// Compute the range of keys that extend `prefix`.
///
/// `prefix` may stop anywhere, including inside the key prefix header or in the middle of a
/// field. Each field that is present narrows the range; the walk stops at the first field it
/// cannot interpret and the range covers every key sharing the fields before it.
///
/// Returns `None` for an empty prefix, which matches every key.
pub fn prefix_range(prefix: &[u8]) -> Result<Option<PrefixRange>> {
    let Some(&header) = prefix.first() else {
        return Ok(None);
    };
    if prefix.len() < 1 + Widths::from_header(header).total() {
        let (min, max) = KeyPrefix::partial_bounds(prefix)?;
        return Ok(Some(PrefixRange {
            start: min.encode(),
            limit: max.successor().map(|k| k.encode()),
        }));
    }

    let (body, key_prefix) = KeyPrefix::decode(prefix)?;
    let mut range = RangeBuilder::default();
    range.push(Segment {
        start: key_prefix.encode(),
        limit: key_prefix.successor().map(|k| k.encode()),
    });

    let mut queue = FieldQueue::default();
    match (key_prefix.kind(), body.first()) {
        (_, None) | (KeyKind::Invalid, _) => {}
        (kind, Some(&discriminator)) if kind.is_metadata() => {
            queue.push_back(Field::Byte);
            for &field in metadata_fields(kind, discriminator).unwrap_or(&[]) {
                queue.push_back(field);
            }
        }
        _ => queue.push_back(Field::EncodedValue),
    }

    let mut rest = body;
    while !rest.is_empty() {
        let Some((field, depth)) = queue.pop() else {
            break;
        };
        match step(rest, field, depth, &mut queue, &mut range)? {
            Step::Next(tail) => rest = tail,
            Step::Halt => break,
        }
    }
    Ok(Some(range.finish()))
}

/// The bounds contributed by one field.
#[derive(Debug)]
struct Segment {
    start: Vec<u8>,
    limit: Option<Vec<u8>>,
}

/// Joins segments: the start is every segment start in order, the limit is the starts that
/// precede the last segment carrying a limit, followed by that limit.
#[derive(Debug, Default)]
struct RangeBuilder {
    start: Vec<u8>,
    limit: Option<(usize, Vec<u8>)>,
}

impl RangeBuilder {
    fn push(&mut self, segment: Segment) {
        if let Some(limit) = segment.limit {
            self.limit = Some((self.start.len(), limit));
        }
        self.start.extend(segment.start);
    }

    fn finish(self) -> PrefixRange {
        let limit = self.limit.map(|(at, tail)| {
            let mut limit = self.start[..at].to_vec();
            limit.extend(tail);
            limit
        });
        PrefixRange {
            start: self.start,
            limit,
        }
    }
}

#[derive(Debug)]
struct Pending {
    field: Field,
    count: u64,
    depth: usize,
}

/// Fields still expected in the input. Array elements are queued as a single entry with a
/// count.
#[derive(Debug, Default)]
struct FieldQueue(VecDeque<Pending>);

impl FieldQueue {
    fn push_back(&mut self, field: Field) {
        self.0.push_back(Pending {
            field,
            count: 1,
            depth: 0,
        });
    }

    fn push_front(&mut self, field: Field, count: u64, depth: usize) {
        if count > 0 {
            self.0.push_front(Pending {
                field,
                count,
                depth,
            });
        }
    }

    fn pop(&mut self) -> Option<(Field, usize)> {
        let front = self.0.front_mut()?;
        let next = (front.field, front.depth);
        front.count -= 1;
        if front.count == 0 {
            self.0.pop_front();
        }
        Some(next)
    }
}

enum Step<'a> {
    Next(&'a [u8]),
    Halt,
}

fn step<'a>(
    rest: &'a [u8],
    field: Field,
    depth: usize,
    queue: &mut FieldQueue,
    range: &mut RangeBuilder,
) -> Result<Step<'a>> {
    match field {
        Field::Byte => {
            let b = rest[0];
            range.push(Segment {
                start: vec![b],
                limit: b.checked_add(1).map(|succ| vec![succ]),
            });
            Ok(Step::Next(&rest[1..]))
        }
        Field::VarInt => Ok(varint_step(rest, range)),
        Field::Binary => Ok(length_prefixed_step(rest, 1, range)),
        Field::StringWithLength => Ok(length_prefixed_step(rest, 2, range)),
        Field::Double => {
            let Some((double, tail)) = rest.split_first_chunk::<8>() else {
                return Ok(Step::Halt);
            };
            range.push(Segment {
                start: double.to_vec(),
                limit: None,
            });
            Ok(Step::Next(tail))
        }
        Field::EncodedValue => encoded_value_step(rest, depth, queue, range),
        Field::Remainder => {
            range.push(Segment {
                start: rest.to_vec(),
                limit: succ_bytes(rest),
            });
            Ok(Step::Next(&[]))
        }
    }
}

/// A varint that may be cut short. The missing high groups widen the range to every value
/// the present groups allow.
fn varint_step<'a>(rest: &'a [u8], range: &mut RangeBuilder) -> Step<'a> {
    let mut value = 0u64;
    let mut min = 0u64;
    let mut max = i64::MAX as u64;
    let mut consumed = rest.len();
    for (i, &b) in rest.iter().enumerate() {
        value |= u64::from(b & 0x7f) << (7 * i);
        min = 0x80 << (7 * i);
        max &= !(0x7f << (7 * i));
        if b & 0x80 == 0 {
            min = value;
            max = value;
            consumed = i + 1;
            break;
        }
        if i + 1 == MAX_VARINT_LEN {
            return Step::Halt;
        }
    }
    min |= value;
    max |= value;

    range.push(Segment {
        start: encode_varint(min),
        limit: (max < i64::MAX as u64).then(|| encode_varint(max + 1)),
    });
    Step::Next(&rest[consumed..])
}

/// A length prefixed payload of `unit` bytes per counted element. A payload cut short keeps
/// the bytes present and bounds the range by their successor.
fn length_prefixed_step<'a>(rest: &'a [u8], unit: u64, range: &mut RangeBuilder) -> Step<'a> {
    let Ok((rest, count)) = decode_varint(rest) else {
        varint_step(rest, range);
        return Step::Halt;
    };
    let len = count.saturating_mul(unit).min(rest.len() as u64) as usize;
    let (body, tail) = rest.split_at(len);

    let mut start = encode_varint(count);
    let limit = match succ_bytes(body) {
        Some(succ) => {
            let mut limit = start.clone();
            limit.extend(succ);
            Some(limit)
        }
        None => (count < i64::MAX as u64).then(|| encode_varint(count + 1)),
    };
    start.extend_from_slice(body);
    range.push(Segment { start, limit });
    Step::Next(tail)
}

fn encoded_value_step<'a>(
    rest: &'a [u8],
    depth: usize,
    queue: &mut FieldQueue,
    range: &mut RangeBuilder,
) -> Result<Step<'a>> {
    if depth > MAX_NESTING_DEPTH {
        return Err(Error::MalformedKey("array nesting too deep"));
    }
    let Some(key_type) = KeyType::from_byte(rest[0]) else {
        return Ok(Step::Halt);
    };
    range.push(Segment {
        start: vec![rest[0]],
        limit: key_type.successor_byte().map(|succ| vec![succ]),
    });
    let rest = &rest[1..];

    match key_type {
        KeyType::Null | KeyType::MinKey => {}
        KeyType::Array => {
            if let Ok((_, count)) = decode_varint(rest) {
                queue.push_front(Field::EncodedValue, count, depth + 1);
            }
            queue.push_front(Field::VarInt, 1, depth);
        }
        KeyType::Binary => queue.push_front(Field::Binary, 1, depth),
        KeyType::String => queue.push_front(Field::StringWithLength, 1, depth),
        KeyType::Date | KeyType::Number => queue.push_front(Field::Double, 1, depth),
    }
    Ok(Step::Next(rest))
}

impl PrefixRange {
    /// The range holding exactly the keys that start with `value`'s encoding under `key_prefix`.
    pub fn for_value(key_prefix: KeyPrefix, value: &EncodedValue) -> Result<Option<Self>> {
        let mut prefix = key_prefix.encode();
        value.encode_into(&mut prefix);
        prefix_range(&prefix)
    }

    /// Debug rendering, `start..limit` in hex.
    pub fn to_hex(&self) -> String {
        format!(
            "{}..{}",
            hex::encode(&self.start),
            self.limit
                .as_deref()
                .map(hex::encode)
                .unwrap_or_default()
        )
    }
}

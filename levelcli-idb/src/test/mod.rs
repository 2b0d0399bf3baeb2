
use crate::*;

/// Decode space separated hex, e.g. `"00 01 ffff"`.
pub fn h(s: &str) -> Vec<u8> {
    hex::decode(s.split_whitespace().collect::<String>()).unwrap()
}

pub fn rand_value(depth: usize) -> EncodedValue {
    let max_type = if depth >= 3 { 6 } else { 7 };
    match rand::random_range(0..max_type) {
        0 => EncodedValue::Null,
        1 => EncodedValue::Binary((0..rand::random_range(0..4)).map(|_| rand::random_range(0..3)).collect()),
        2 => EncodedValue::String((0..rand::random_range(0..4)).map(|_| rand::random_range(0..3)).collect()),
        3 => EncodedValue::Date(f64::from(rand::random_range(-2i32..3))),
        4 => EncodedValue::Number(f64::from(rand::random_range(-2i32..3))),
        5 => EncodedValue::MinKey,
        _ => EncodedValue::Array(
            (0..rand::random_range(0..3))
                .map(|_| rand_value(depth + 1))
                .collect(),
        ),
    }
}

/// A well formed record key drawn from a small space so that ties are common.
pub fn rand_key() -> Vec<u8> {
    let prefix = match rand::random_range(0..4) {
        0 => KeyPrefix::new(0, 0, 0),
        1 => KeyPrefix::new(rand::random_range(1..3), 0, 0),
        2 => KeyPrefix::new(1, rand::random_range(1..3), rand::random_range(1..4)),
        _ => KeyPrefix::new(1, rand::random_range(1..3), rand::random_range(30..32)),
    };
    let mut key = prefix.encode();
    match prefix.kind() {
        KeyKind::GlobalMetadata => match rand::random_range(0..4) {
            0 => key.push(rand::random_range(0..7)),
            1 => {
                key.push(50);
                key.extend((0..rand::random_range(0..3)).map(|_| rand::random_range(0..3u8)));
            }
            2 => {
                key.push(100);
                key.extend(encode_varint(rand::random_range(0..300)));
            }
            _ => {
                key.push(201);
                rand_string_field(&mut key);
                rand_string_field(&mut key);
            }
        },
        KeyKind::DatabaseMetadata => match rand::random_range(0..4) {
            0 => key.push(rand::random_range(0..6)),
            1 => {
                key.push(100);
                key.extend(encode_varint(rand::random_range(0..3)));
                key.extend(encode_varint(rand::random_range(0..3)));
                key.push(rand::random_range(0..3));
            }
            2 => {
                key.push(151);
                key.extend(encode_varint(rand::random_range(0..3)));
                key.extend(encode_varint(rand::random_range(0..300)));
            }
            _ => {
                key.push(201);
                key.extend(encode_varint(rand::random_range(0..3)));
                rand_string_field(&mut key);
            }
        },
        KeyKind::IndexData => {
            rand_value(0).encode_into(&mut key);
            if rand::random() {
                key.extend(encode_varint(rand::random_range(0..3)));
                rand_value(0).encode_into(&mut key);
            }
        }
        _ => rand_value(0).encode_into(&mut key),
    }
    key
}

fn rand_string_field(key: &mut Vec<u8>) {
    let len = rand::random_range(0..3u64);
    key.extend(encode_varint(len));
    for _ in 0..len {
        key.extend_from_slice(&[0x00, rand::random_range(0x61..0x64)]);
    }
}

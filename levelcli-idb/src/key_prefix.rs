use crate::Error;
use crate::Result;
use crate::decode_fixed_int;

pub const OBJECT_STORE_DATA_INDEX_ID: i64 = 1;
pub const EXISTS_ENTRY_INDEX_ID: i64 = 2;
pub const BLOB_ENTRY_INDEX_ID: i64 = 3;
pub const MINIMUM_INDEX_ID: i64 = 30;

/// Largest index id representable in the 4 byte index field.
pub const MAX_INDEX_ID: i64 = u32::MAX as i64;

/// What the body of a record key holds, as determined by its [`KeyPrefix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    GlobalMetadata,
    DatabaseMetadata,
    ObjectStoreData,
    ExistsEntry,
    BlobEntry,
    IndexData,
    Invalid,
}

impl KeyKind {
    pub fn is_metadata(self) -> bool {
        matches!(self, KeyKind::GlobalMetadata | KeyKind::DatabaseMetadata)
    }
}

/// Byte widths of the three id fields, as declared by a key prefix header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Widths {
    pub database: usize,
    pub object_store: usize,
    pub index: usize,
}

impl Widths {
    pub fn from_header(header: u8) -> Self {
        Self {
            database: usize::from((header >> 5) & 0x07) + 1,
            object_store: usize::from((header >> 2) & 0x07) + 1,
            index: usize::from(header & 0x03) + 1,
        }
    }

    pub fn header(&self) -> u8 {
        (((self.database - 1) << 5) | ((self.object_store - 1) << 2) | (self.index - 1)) as u8
    }

    /// Number of id bytes following the header.
    pub fn total(&self) -> usize {
        self.database + self.object_store + self.index
    }
}

/// The `(database_id, object_store_id, index_id)` triple leading every record key.
///
/// Ids are ordered as signed 64 bit integers, field by field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct KeyPrefix {
    pub database_id: i64,
    pub object_store_id: i64,
    pub index_id: i64,
}

impl KeyPrefix {
    /// The greatest prefix. It has no successor.
    pub const MAX: KeyPrefix = KeyPrefix {
        database_id: i64::MAX,
        object_store_id: i64::MAX,
        index_id: MAX_INDEX_ID,
    };

    pub fn new(database_id: i64, object_store_id: i64, index_id: i64) -> Self {
        Self {
            database_id,
            object_store_id,
            index_id,
        }
    }

    pub fn kind(&self) -> KeyKind {
        match self.index_id {
            _ if self.database_id == 0 => KeyKind::GlobalMetadata,
            _ if self.object_store_id == 0 => KeyKind::DatabaseMetadata,
            OBJECT_STORE_DATA_INDEX_ID => KeyKind::ObjectStoreData,
            EXISTS_ENTRY_INDEX_ID => KeyKind::ExistsEntry,
            BLOB_ENTRY_INDEX_ID => KeyKind::BlobEntry,
            id if id >= MINIMUM_INDEX_ID => KeyKind::IndexData,
            _ => KeyKind::Invalid,
        }
    }

    /// Minimal widths for the ids. The index id is truncated to its 32 bit field.
    pub fn widths(&self) -> Widths {
        Widths {
            database: min_width(self.database_id as u64),
            object_store: min_width(self.object_store_id as u64),
            index: min_width(u64::from(self.index_id as u32)),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let widths = self.widths();
        let mut out = Vec::with_capacity(1 + widths.total());
        out.push(widths.header());
        out.extend_from_slice(&self.database_id.to_le_bytes()[..widths.database]);
        out.extend_from_slice(&self.object_store_id.to_le_bytes()[..widths.object_store]);
        out.extend_from_slice(&(self.index_id as u32).to_le_bytes()[..widths.index]);
        out
    }

    /// Decode a prefix from the front of a key, returning the body that follows.
    pub fn decode(bytes: &[u8]) -> Result<(&[u8], Self)> {
        let Some((&header, rest)) = bytes.split_first() else {
            return Err(Error::MalformedKey("empty key"));
        };
        let widths = Widths::from_header(header);
        if rest.len() < widths.total() {
            return Err(Error::MalformedKey("key prefix shorter than its header declares"));
        }
        let (database, rest) = rest.split_at(widths.database);
        let (object_store, rest) = rest.split_at(widths.object_store);
        let (index, rest) = rest.split_at(widths.index);
        Ok((
            rest,
            Self {
                database_id: decode_fixed_int(database)? as i64,
                object_store_id: decode_fixed_int(object_store)? as i64,
                index_id: decode_fixed_int(index)? as i64,
            },
        ))
    }

    /// The next prefix in `(database_id, object_store_id, index_id)` order, or `None` for
    /// [`KeyPrefix::MAX`].
    pub fn successor(&self) -> Option<Self> {
        let mut succ = *self;
        if succ.index_id < MAX_INDEX_ID {
            succ.index_id += 1;
            return Some(succ);
        }
        succ.index_id = 0;
        if succ.object_store_id < i64::MAX {
            succ.object_store_id += 1;
            return Some(succ);
        }
        succ.object_store_id = 0;
        if succ.database_id < i64::MAX {
            succ.database_id += 1;
            return Some(succ);
        }
        None
    }

    /// Least and greatest prefixes whose encodings could start with `bytes`, for input that
    /// stops before the id fields its header declares are complete.
    ///
    /// Fully present fields are pinned. A field with some of its bytes present keeps those low
    /// bytes and ranges over the rest; a missing field ranges over every value of its width.
    pub fn partial_bounds(bytes: &[u8]) -> Result<(Self, Self)> {
        let Some((&header, mut rest)) = bytes.split_first() else {
            return Err(Error::MalformedKey("empty key"));
        };
        let widths = Widths::from_header(header);
        let mut min = KeyPrefix::default();
        let mut max = KeyPrefix::MAX;

        let fields = [
            (widths.database, &mut min.database_id, &mut max.database_id),
            (
                widths.object_store,
                &mut min.object_store_id,
                &mut max.object_store_id,
            ),
            (widths.index, &mut min.index_id, &mut max.index_id),
        ];
        for (width, lo, hi) in fields {
            if rest.len() >= width {
                let (field, tail) = rest.split_at(width);
                let value = decode_fixed_int(field)? as i64;
                *lo = value;
                *hi = value;
                rest = tail;
                continue;
            }
            if width > 1 {
                *lo = 1 << (8 * (width - 1));
            }
            if width < 8 {
                *hi = (1 << (8 * width)) - 1;
            }
            if !rest.is_empty() {
                let value = decode_fixed_int(rest)? as i64;
                *lo |= value;
                *hi &= !((1 << (8 * rest.len())) - 1);
                *hi |= value;
                rest = &[];
            }
        }
        Ok((min, max))
    }
}

fn min_width(value: u64) -> usize {
    (value.checked_ilog2().unwrap_or(0) as usize / 8) + 1
}

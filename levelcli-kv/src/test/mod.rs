
use anyhow::Result;
use levelcli_idb::EncodedValue;
use levelcli_idb::KeyPrefix;

use crate::*;

#[macro_export]
macro_rules! all_kv_impls {
    ($fn_name:ident, $order:ident) => {
        paste::paste! {
            #[test]
            fn [<memory_ $fn_name>]() -> Result<()> {
                let kv = MemoryKV::new(KeyOrder::$order);
                $fn_name(&kv)?;
                Ok(())
            }

            #[cfg(feature = "leveldb")]
            #[test]
            fn [<leveldb_ $fn_name>]() -> Result<()> {
                let dir = tempfile::tempdir()?;
                let kv = LevelDbKV::open(dir.path(), KeyOrder::$order, OpenMode::Create)?;
                $fn_name(&kv)?;
                Ok(())
            }
        }
    };
}

/// An object store record key holding `value`.
pub fn idb_key(object_store_id: i64, value: EncodedValue) -> Vec<u8> {
    let mut key = KeyPrefix::new(1, object_store_id, 1).encode();
    value.encode_into(&mut key);
    key
}

pub fn keys(entries: &[Entry]) -> Vec<Vec<u8>> {
    entries.iter().map(|entry| entry.key.clone()).collect()
}

use std::cell::RefCell;
use std::cmp::Ordering;
use std::path::Path;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::Result;
use levelcli_idb::IdbCmp1;
use rusty_leveldb::Cmp;
use rusty_leveldb::DB;
use rusty_leveldb::DefaultCmp;
use rusty_leveldb::LdbIterator;
use rusty_leveldb::Options;
use rusty_leveldb::WriteBatch;

use super::*;

/// How [`LevelDbKV::open`] treats an existing or missing database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Create a new database, failing if one exists.
    Create,
    /// Open an existing database, failing if none exists.
    Existing,
    CreateIfMissing,
}

/// `idb_cmp1` as a LevelDB comparator.
///
/// Separator and successor shortening are not implemented for this order; the keys are
/// returned unchanged, which LevelDB accepts.
struct IdbComparator;

impl Cmp for IdbComparator {
    fn cmp(&self, a: &[u8], b: &[u8]) -> Ordering {
        IdbCmp1.compare(a, b)
    }

    fn find_shortest_sep(&self, from: &[u8], _to: &[u8]) -> Vec<u8> {
        from.to_vec()
    }

    fn find_short_succ(&self, key: &[u8]) -> Vec<u8> {
        key.to_vec()
    }

    fn id(&self) -> &'static str {
        IdbCmp1::NAME
    }
}

/// A LevelDB database directory.
pub struct LevelDbKV {
    db: RefCell<DB>,
    order: KeyOrder,
    path: PathBuf,
}

impl LevelDbKV {
    pub fn open(path: &Path, order: KeyOrder, mode: OpenMode) -> Result<Self> {
        let exists = Self::exists(path);
        match mode {
            OpenMode::Create if exists => {
                anyhow::bail!("database already exists: {}", path.display())
            }
            OpenMode::Existing if !exists => {
                anyhow::bail!("database not found: {}", path.display())
            }
            _ => {}
        }

        if mode != OpenMode::Existing {
            std::fs::create_dir_all(path)?;
        }
        let cmp: Box<dyn Cmp> = match order {
            KeyOrder::Bytewise => Box::new(DefaultCmp),
            KeyOrder::IndexedDb => Box::new(IdbComparator),
        };
        let mut options = Options::default();
        options.create_if_missing = mode != OpenMode::Existing;
        options.cmp = Rc::new(cmp);
        log::debug!("opening {} with {}", path.display(), order.name());
        let db = DB::open(path, options).map_err(|e| {
            let e = e.to_string();
            if e.contains("While parsing") {
                anyhow::anyhow!(
                    "failed to open {}: {e} (LevelDB does not open a directory holding files it did not write; move them elsewhere)",
                    path.display()
                )
            } else {
                anyhow::anyhow!("failed to open {}: {e}", path.display())
            }
        })?;
        Ok(Self {
            db: RefCell::new(db),
            order,
            path: path.to_path_buf(),
        })
    }

    /// Whether `path` holds a LevelDB database.
    pub fn exists(path: &Path) -> bool {
        path.join("CURRENT").is_file()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KV for LevelDbKV {
    fn order(&self) -> KeyOrder {
        self.order
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.db.borrow_mut().get(key).map(|v| v.to_vec()))
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.db
            .borrow_mut()
            .put(key, value)
            .map_err(|e| anyhow::anyhow!("put failed: {e}"))
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        self.db
            .borrow_mut()
            .delete(key)
            .map_err(|e| anyhow::anyhow!("delete failed: {e}"))
    }

    fn write_batch(&self, entries: &[Entry]) -> Result<()> {
        let mut batch = WriteBatch::new();
        for entry in entries {
            batch.put(&entry.key, &entry.value);
        }
        self.db
            .borrow_mut()
            .write(batch, true)
            .map_err(|e| anyhow::anyhow!("batch write failed: {e}"))
    }

    fn scan<S>(&self, range: &KeyRange, mut predicate: S) -> Result<()>
    where
        S: FnMut(&[u8], &[u8]) -> Result<bool>,
    {
        let mut iter = self
            .db
            .borrow_mut()
            .new_iter()
            .map_err(|e| anyhow::anyhow!("failed to create iterator: {e}"))?;
        match &range.start {
            Some(start) => iter.seek(start),
            None => {
                iter.advance();
            }
        }

        let mut key = Vec::new();
        let mut value = Vec::new();
        while iter.current(&mut key, &mut value) {
            if !range.is_below_limit(self.order, &key) {
                break;
            }
            if !predicate(&key, &value)? {
                break;
            }
            if !iter.advance() {
                break;
            }
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.db
            .borrow_mut()
            .flush()
            .map_err(|e| anyhow::anyhow!("flush failed: {e}"))
    }
}

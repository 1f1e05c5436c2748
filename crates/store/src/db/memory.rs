use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use strum::IntoEnumIterator;

use crate::config::StoreConfig;
use crate::db::{Column, Database};
use crate::iter::{DBIter, Iter};
use crate::slice::Slice;
use crate::tx::{Operation, Transaction};

type Key = Box<[u8]>;
type Value = Arc<Box<[u8]>>;
type Columns = BTreeMap<Column, BTreeMap<Key, Value>>;

/// In-memory [`Database`] backed by ordered maps.
///
/// `apply` holds the write lock for the whole batch, so a transaction is
/// never partially visible to readers.
#[derive(Debug)]
pub struct InMemoryDB {
    inner: RwLock<Columns>,
}

impl Default for InMemoryDB {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDB {
    /// Every column's keyspace exists from the start, the way an on-disk
    /// engine opens all of its column families up front.
    #[must_use]
    pub fn new() -> Self {
        let columns = Column::iter().map(|col| (col, BTreeMap::new())).collect();

        Self {
            inner: RwLock::new(columns),
        }
    }

    fn read(&self) -> eyre::Result<RwLockReadGuard<'_, Columns>> {
        self.inner
            .read()
            .map_err(|_| eyre::eyre!("failed to acquire read lock on db"))
    }

    fn write(&self) -> eyre::Result<RwLockWriteGuard<'_, Columns>> {
        self.inner
            .write()
            .map_err(|_| eyre::eyre!("failed to acquire write lock on db"))
    }
}

impl Database for InMemoryDB {
    fn open(_config: &StoreConfig) -> eyre::Result<Self> {
        Ok(Self::new())
    }

    fn has(&self, col: Column, key: Slice<'_>) -> eyre::Result<bool> {
        let db = self.read()?;

        Ok(db.get(&col).is_some_and(|map| map.contains_key(&*key)))
    }

    fn get(&self, col: Column, key: Slice<'_>) -> eyre::Result<Option<Slice<'static>>> {
        let db = self.read()?;

        Ok(db
            .get(&col)
            .and_then(|map| map.get(&*key))
            .map(|value| value.clone().into()))
    }

    fn put(&self, col: Column, key: Slice<'_>, value: Slice<'_>) -> eyre::Result<()> {
        let mut db = self.write()?;

        let _prev = db
            .entry(col)
            .or_default()
            .insert(key.into_boxed(), Arc::new(value.into_boxed()));

        Ok(())
    }

    fn delete(&self, col: Column, key: Slice<'_>) -> eyre::Result<()> {
        let mut db = self.write()?;

        if let Some(map) = db.get_mut(&col) {
            let _prev = map.remove(&*key);
        }

        Ok(())
    }

    fn iter(&self, col: Column) -> eyre::Result<Iter> {
        let db = self.read()?;

        // snapshot of keys + shared value handles; restartable by re-invoking
        let entries = db
            .get(&col)
            .map(|map| {
                map.iter()
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Iter::new(InMemoryDBIter { entries, pos: 0 }))
    }

    fn apply(&self, tx: &Transaction<'_>) -> eyre::Result<()> {
        let mut db = self.write()?;

        for (col, key, op) in tx.iter() {
            let map = db.entry(col).or_default();

            match op {
                Operation::Put { value } => {
                    let _prev = map.insert(
                        key.as_ref().into(),
                        Arc::new(value.as_ref().to_vec().into_boxed_slice()),
                    );
                }
                Operation::Delete => {
                    let _prev = map.remove(key.as_ref());
                }
            }
        }

        Ok(())
    }
}

struct InMemoryDBIter {
    entries: Vec<(Key, Value)>,
    pos: usize,
}

impl DBIter for InMemoryDBIter {
    fn seek(&mut self, key: &[u8]) -> eyre::Result<()> {
        self.pos = self.entries.partition_point(|(k, _)| &**k < key);

        Ok(())
    }

    fn next(&mut self) -> eyre::Result<Option<(Slice<'static>, Slice<'static>)>> {
        let Some((key, value)) = self.entries.get(self.pos) else {
            return Ok(None);
        };

        self.pos += 1;

        Ok(Some((key.clone().into(), value.clone().into())))
    }
}

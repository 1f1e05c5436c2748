//! Byte-addressable key-value storage for MerkleDB.
//!
//! The [`Database`](db::Database) trait is the narrow seam the rest of the
//! system depends on: columns of `key -> value` pairs with atomic batched
//! writes. [`InMemoryDB`](db::InMemoryDB) is the bundled implementation; an
//! on-disk engine would plug in behind the same trait.
//!
//! [`BlockStore`] layers content addressing on top: blocks are keyed by the
//! hash of their bytes and are never updated or deleted once written.

use std::sync::Arc;

mod blocks;
pub mod config;
pub mod db;
mod error;
pub mod iter;
pub mod key;
pub mod slice;
pub mod tx;

pub use blocks::BlockStore;
pub use error::StoreError;

use db::{Column, Database};
use iter::Iter;
use slice::Slice;
use tx::Transaction;

/// Cloneable handle over a database implementation.
#[derive(Clone)]
pub struct Store {
    db: Arc<dyn Database>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}

impl Store {
    pub fn open<T: Database>(config: &config::StoreConfig) -> eyre::Result<Self> {
        let db = T::open(config)?;

        Ok(Self { db: Arc::new(db) })
    }

    pub fn has(&self, col: Column, key: &[u8]) -> eyre::Result<bool> {
        self.db.has(col, key.into())
    }

    pub fn get(&self, col: Column, key: &[u8]) -> eyre::Result<Option<Slice<'static>>> {
        self.db.get(col, key.into())
    }

    pub fn put(&self, col: Column, key: &[u8], value: Slice<'_>) -> eyre::Result<()> {
        self.db.put(col, key.into(), value)
    }

    pub fn delete(&self, col: Column, key: &[u8]) -> eyre::Result<()> {
        self.db.delete(col, key.into())
    }

    pub fn iter(&self, col: Column) -> eyre::Result<Iter> {
        self.db.iter(col)
    }

    /// Apply a batch of writes atomically.
    pub fn apply(&self, tx: &Transaction<'_>) -> eyre::Result<()> {
        self.db.apply(tx)
    }
}

use strum::EnumIter;

use crate::config::StoreConfig;
use crate::iter::Iter;
use crate::slice::Slice;
use crate::tx::Transaction;

mod memory;

pub use memory::InMemoryDB;

/// Storage columns. Each column is an independent ordered keyspace.
#[derive(Eq, Ord, Copy, Clone, Debug, PartialEq, PartialOrd, EnumIter)]
pub enum Column {
    /// Content-addressed DAG blocks, keyed by [`Cid`](merkledb_primitives::Cid) bytes.
    Blocks,
    /// Causal frontier entries, keyed by `<namespace>/<cid>`.
    Heads,
    /// Merged CRDT payload state, keyed by namespace.
    Data,
}

/// The narrow storage contract the core depends on.
///
/// `apply` must be all-or-nothing: either every operation in the transaction
/// becomes visible or none does. The clock relies on this to keep the head
/// set from ever pointing at an unwritten block.
pub trait Database: Send + Sync + 'static {
    fn open(config: &StoreConfig) -> eyre::Result<Self>
    where
        Self: Sized;

    fn has(&self, col: Column, key: Slice<'_>) -> eyre::Result<bool>;
    fn get(&self, col: Column, key: Slice<'_>) -> eyre::Result<Option<Slice<'static>>>;
    fn put(&self, col: Column, key: Slice<'_>, value: Slice<'_>) -> eyre::Result<()>;
    fn delete(&self, col: Column, key: Slice<'_>) -> eyre::Result<()>;
    fn iter(&self, col: Column) -> eyre::Result<Iter>;

    fn apply(&self, tx: &Transaction<'_>) -> eyre::Result<()>;
}

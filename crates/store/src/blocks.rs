use merkledb_primitives::{Cid, Format};
use tracing::debug;

use crate::error::StoreError;
use crate::key::BlockKey;
use crate::slice::Slice;
use crate::tx::Transaction;
use crate::Store;

/// Content-addressed block storage.
///
/// Blocks are keyed by the hash of their bytes: writing the same bytes twice
/// yields the same [`Cid`] and stores one copy. Blocks are never updated or
/// deleted.
#[derive(Clone, Debug)]
pub struct BlockStore {
    store: Store,
}

impl BlockStore {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Store a block, returning its content identifier.
    ///
    /// Idempotent: re-putting existing bytes is a no-op.
    pub fn put(&self, bytes: &[u8]) -> Result<Cid, StoreError> {
        let cid = Cid::of(Format::Block, bytes);
        let key = BlockKey(cid).to_bytes();

        if !self.store.has(BlockKey::column(), &key)? {
            self.store.put(BlockKey::column(), &key, bytes.into())?;

            debug!(%cid, len = bytes.len(), "stored block");
        }

        Ok(cid)
    }

    /// Stage a block write into `tx`, returning the id it will be stored
    /// under. Used when the block must land atomically with other writes.
    pub fn stage(&self, bytes: Vec<u8>, tx: &mut Transaction<'_>) -> Cid {
        let cid = Cid::of(Format::Block, &bytes);

        tx.put(BlockKey::column(), BlockKey(cid).to_bytes().to_vec(), bytes);

        cid
    }

    /// Fetch a block's bytes, or [`StoreError::NotFound`] if absent.
    pub fn get(&self, cid: &Cid) -> Result<Slice<'static>, StoreError> {
        self.store
            .get(BlockKey::column(), &BlockKey(*cid).to_bytes())?
            .ok_or(StoreError::NotFound(*cid))
    }

    pub fn has(&self, cid: &Cid) -> Result<bool, StoreError> {
        Ok(self.store.has(BlockKey::column(), &BlockKey(*cid).to_bytes())?)
    }

    /// Identifiers of every stored block, in key order.
    pub fn all_keys(&self) -> Result<Vec<Cid>, StoreError> {
        let mut cids = Vec::new();

        for entry in self.store.iter(BlockKey::column())? {
            let (key, _value) = entry?;

            cids.push(Cid::from_bytes(&key).map_err(eyre::Report::new)?);
        }

        Ok(cids)
    }
}

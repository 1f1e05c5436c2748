use merkledb_clock::MerkleClock;
use merkledb_crdt::{LwwRegister, Payload};
use merkledb_primitives::{Cid, DocKey};
use merkledb_store::key::Namespace;
use merkledb_store::Store;
use tracing::debug;

use crate::error::DocumentError;

/// One CRDT-backed field: a register paired with the clock that orders its
/// history.
///
/// This is the boundary the database layers above call. `commit` anchors a
/// new value in the field's DAG and folds it into the merged state; `value`
/// reads the merged state. Nothing above this type touches the DAG.
#[derive(Debug)]
pub struct MerkleField {
    clock: MerkleClock<LwwRegister>,
}

impl MerkleField {
    #[must_use]
    pub fn new(store: Store, namespace: Namespace) -> Self {
        let payload = LwwRegister::new(store.clone(), namespace.clone());

        Self {
            clock: MerkleClock::new(store, namespace, payload),
        }
    }

    /// Field of a named document, under the `<dockey>/<field>` namespace.
    #[must_use]
    pub fn for_document(store: Store, key: &DocKey, field: &str) -> Self {
        Self::new(store, Namespace::new(key.as_str()).child(field))
    }

    /// Commit a new value for this field, returning the new head.
    ///
    /// The same delta object that was committed is merged locally, so the
    /// block is never re-decoded on the hot path.
    pub fn commit(&self, value: &[u8]) -> Result<Cid, DocumentError> {
        let mut delta = self.clock.payload().new_delta(value);

        let id = self.clock.add_dag_node(&mut delta)?;
        self.clock.payload().merge(&delta)?;

        debug!(%id, "committed field value");

        Ok(id)
    }

    /// Current merged value, or `None` before the first commit.
    pub fn value(&self) -> Result<Option<Vec<u8>>, DocumentError> {
        Ok(self.clock.payload().value()?)
    }

    /// The clock ordering this field's history, for ingesting foreign
    /// blocks.
    #[must_use]
    pub const fn clock(&self) -> &MerkleClock<LwwRegister> {
        &self.clock
    }
}

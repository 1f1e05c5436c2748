use merkledb_crdt::CrdtError;
use merkledb_primitives::Cid;
use merkledb_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClockError {
    /// The requested block is absent from the store.
    #[error("block not found: {0}")]
    NotFound(Cid),
    /// An ancestor link could not be resolved. The caller should retry once
    /// the block becomes available; discarding would fork the DAG view.
    #[error("missing ancestor block: {0}")]
    MissingBlock(Cid),
    /// Stored or received block bytes failed to decode. Data integrity
    /// violation, not retryable.
    #[error("malformed block bytes for {0}")]
    CorruptBlock(Cid, #[source] std::io::Error),
    #[error("failed to encode block")]
    EncodeBlock(#[source] std::io::Error),
    #[error(transparent)]
    Crdt(#[from] CrdtError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

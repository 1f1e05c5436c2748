use merkledb_primitives::Cid;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// No block stored under this identifier.
    #[error("block not found: {0}")]
    NotFound(Cid),
    #[error(transparent)]
    Backend(#[from] eyre::Report),
}

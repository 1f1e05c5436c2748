use merkledb_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CrdtError {
    /// Stored or received delta bytes failed to decode. Data integrity
    /// violation, not retryable.
    #[error("malformed delta bytes")]
    CorruptDelta(#[source] std::io::Error),
    /// Persisted register state failed to decode.
    #[error("malformed register state")]
    CorruptState(#[source] std::io::Error),
    #[error("failed to encode")]
    Encode(#[source] std::io::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

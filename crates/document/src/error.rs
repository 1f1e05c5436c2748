use merkledb_clock::ClockError;
use merkledb_crdt::CrdtError;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DocumentError {
    /// Anonymous top-level values have no field names to hang state off.
    #[error("top-level JSON value must be an object")]
    NotAnObject,
    #[error("unrepresentable JSON number: {0}")]
    UnrepresentableNumber(serde_json::Number),
    /// Registers hold present values; absence is "never written".
    #[error("null values are not supported")]
    NullValue,
    #[error(transparent)]
    Clock(#[from] ClockError),
    #[error(transparent)]
    Crdt(#[from] CrdtError),
}

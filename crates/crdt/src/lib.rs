//! CRDT payload contract and the last-writer-wins register.
//!
//! A [`Payload`] owns the merged, queryable state of one replicated value and
//! defines how deltas fold into it. Merge must be commutative, associative,
//! and idempotent: replicas that have applied the same set of deltas hold the
//! same state, whatever the application order.

use std::fmt;

use borsh::{BorshDeserialize, BorshSerialize};

mod error;
mod lww;

pub use error::CrdtError;
pub use lww::{LwwDelta, LwwRegister};

/// A serializable unit of change carrying a causal height ("priority").
///
/// A freshly built delta has priority `0`; the clock assigns the real height
/// when the delta is committed, as `1 + max(predecessor priorities)`.
pub trait Delta: BorshSerialize + BorshDeserialize + Clone + fmt::Debug + Send {
    fn priority(&self) -> u64;

    fn set_priority(&mut self, priority: u64);

    /// Stable bytes compared to break ties between equal-priority deltas.
    /// Must not change across versions, or already-converged replicas would
    /// diverge on replay.
    fn payload(&self) -> &[u8];

    fn encode(&self) -> Result<Vec<u8>, CrdtError> {
        borsh::to_vec(self).map_err(CrdtError::Encode)
    }

    fn decode(bytes: &[u8]) -> Result<Self, CrdtError> {
        Self::try_from_slice(bytes).map_err(CrdtError::CorruptDelta)
    }
}

/// The merge-rule-bearing side of a replicated value.
///
/// The clock is payload-agnostic: it hands every causally-ready delta to
/// [`merge`](Payload::merge) and never touches the merged state itself.
pub trait Payload {
    type Delta: Delta;

    /// Build a delta carrying `value`. No state is read or written; the
    /// caller commits the delta through the clock and then merges it.
    fn new_delta(&self, value: &[u8]) -> Self::Delta;

    /// Fold `delta` into the persisted state. Deltas superseded by already
    /// merged state are ignored, not errors.
    fn merge(&self, delta: &Self::Delta) -> Result<(), CrdtError>;

    /// Current merged value, or `None` before the first merge.
    fn value(&self) -> Result<Option<Vec<u8>>, CrdtError>;
}

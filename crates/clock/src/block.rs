use borsh::{BorshDeserialize, BorshSerialize};
use merkledb_primitives::Cid;

use crate::error::ClockError;

/// Immutable DAG node: a delta's serialized bytes plus ordered links to its
/// causal predecessors.
///
/// Links keep the order the heads were supplied at commit time. Two replicas
/// building the same logical block from the same inputs therefore produce
/// byte-identical encodings, hence the same [`Cid`].
#[derive(BorshDeserialize, BorshSerialize, Clone, Debug, Eq, PartialEq)]
pub struct Block {
    pub delta: Vec<u8>,
    pub links: Vec<Cid>,
}

impl Block {
    #[must_use]
    pub const fn new(delta: Vec<u8>, links: Vec<Cid>) -> Self {
        Self { delta, links }
    }

    pub fn encode(&self) -> Result<Vec<u8>, ClockError> {
        borsh::to_vec(self).map_err(ClockError::EncodeBlock)
    }

    /// Decode stored block bytes. `id` identifies the offender on failure.
    pub fn decode(id: &Cid, bytes: &[u8]) -> Result<Self, ClockError> {
        Self::try_from_slice(bytes).map_err(|err| ClockError::CorruptBlock(*id, err))
    }
}

//! Shared value types for MerkleDB.
//!
//! The only heavyweight citizen here is [`Cid`], the content identifier that
//! every block in the Merkle DAG is keyed by. Equal bytes always hash to an
//! equal `Cid`, which is what makes the block store deduplicating and the
//! clock's causal links tamper-evident.

mod cid;
mod dockey;

pub use cid::{Cid, Format, InvalidCid};
pub use dockey::DocKey;

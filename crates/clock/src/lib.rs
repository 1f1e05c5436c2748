//! The MerkleClock: causal ordering for CRDT deltas via DAG linkage.
//!
//! Every committed delta becomes an immutable [`Block`] linking to the
//! namespace's current causal frontier (its "heads") and carrying a logical
//! height strictly above every predecessor. Replicas exchange blocks in any
//! order; [`MerkleClock::process_node`] resolves unapplied ancestors before
//! applying a node, so the payload's merge function only ever sees a delta
//! after all of its causal dependencies.

use std::collections::HashSet;
use std::fmt;

use merkledb_crdt::{Delta, Payload};
use merkledb_primitives::Cid;
use merkledb_store::key::Namespace;
use merkledb_store::tx::Transaction;
use merkledb_store::{BlockStore, Store, StoreError};
use parking_lot::Mutex;
use tracing::debug;

mod block;
mod error;
mod heads;

#[cfg(test)]
mod tests_convergence;

pub use block::Block;
pub use error::ClockError;
pub use heads::HeadSet;

/// Outcome of [`MerkleClock::process_node`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Processed {
    /// The node and any unapplied ancestors were merged.
    Applied,
    /// Already applied; nothing changed.
    Skipped,
}

/// Orchestrates commits and foreign-block ingestion for one namespace.
///
/// The clock exclusively owns frontier mutation; the payload exclusively
/// owns merged-state mutation. A per-clock mutex serializes the head-set
/// read-modify-write sequence, so concurrent commits against the same
/// namespace never compute a height from a stale frontier. Clocks over
/// different namespaces share nothing but the store and need no
/// coordination.
pub struct MerkleClock<P> {
    store: Store,
    blocks: BlockStore,
    heads: HeadSet,
    payload: P,
    applied: Mutex<AppliedSet>,
}

/// Ids of blocks whose deltas are already folded into the payload state.
///
/// Hydrated lazily from the persisted frontier, so a clock reopened over an
/// existing store recognizes re-delivered ancestors instead of resurrecting
/// them as heads.
#[derive(Debug, Default)]
struct AppliedSet {
    hydrated: bool,
    ids: HashSet<Cid>,
}

impl<P> fmt::Debug for MerkleClock<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MerkleClock")
            .field("namespace", self.heads.namespace())
            .finish_non_exhaustive()
    }
}

impl<P: Payload> MerkleClock<P> {
    #[must_use]
    pub fn new(store: Store, namespace: Namespace, payload: P) -> Self {
        Self {
            blocks: BlockStore::new(store.clone()),
            heads: HeadSet::new(store.clone(), namespace),
            store,
            payload,
            applied: Mutex::new(AppliedSet::default()),
        }
    }

    #[must_use]
    pub const fn payload(&self) -> &P {
        &self.payload
    }

    /// Current causal frontier.
    pub fn heads(&self) -> Result<Vec<Cid>, ClockError> {
        self.heads.heads()
    }

    /// Commit a self-originated delta.
    ///
    /// Assigns the delta's height (one above the highest head, or 1 on an
    /// empty frontier), wraps it in a block linking to the current heads,
    /// and lands the block write and the frontier swap in one atomic batch.
    /// The merged payload state is untouched; the caller merges the same
    /// delta object afterwards, sparing a decode.
    pub fn add_dag_node(&self, delta: &mut P::Delta) -> Result<Cid, ClockError> {
        let mut applied = self.applied.lock();
        self.hydrate(&mut applied)?;

        let heads = self.heads.heads()?;

        let mut max_priority = 0;
        for head in &heads {
            let block = self.fetch_block(head)?;
            let predecessor = P::Delta::decode(&block.delta)?;

            max_priority = max_priority.max(predecessor.priority());
        }

        delta.set_priority(max_priority + 1);

        let block = Block::new(delta.encode()?, heads.clone());
        let bytes = block.encode()?;

        let mut tx = Transaction::new();
        let id = self.blocks.stage(bytes, &mut tx);
        self.heads.replace(&heads, id, &mut tx);
        self.store.apply(&tx).map_err(StoreError::from)?;

        let _known = applied.ids.insert(id);

        debug!(
            namespace = %self.heads.namespace(),
            %id,
            priority = delta.priority(),
            links = heads.len(),
            "committed node",
        );

        Ok(id)
    }

    /// Ingest a block that arrived from another replica.
    ///
    /// Walks depth-first through unapplied ancestors, merging each before
    /// its dependents, then merges this node's delta and swaps the frontier.
    /// Reprocessing an applied node is a no-op. An unresolvable ancestor
    /// surfaces as [`ClockError::MissingBlock`] with the frontier untouched
    /// for the failing node.
    pub fn process_node(&self, id: Cid) -> Result<Processed, ClockError> {
        let mut applied = self.applied.lock();
        self.hydrate(&mut applied)?;

        if applied.ids.contains(&id) {
            debug!(namespace = %self.heads.namespace(), %id, "node already applied");

            return Ok(Processed::Skipped);
        }

        enum Visit {
            Expand(Cid),
            Apply(Cid, Block),
        }

        let mut stack = vec![Visit::Expand(id)];

        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Expand(cid) => {
                    if applied.ids.contains(&cid) {
                        continue;
                    }

                    let block = match self.fetch_block(&cid) {
                        Ok(block) => block,
                        Err(ClockError::NotFound(missing)) if missing != id => {
                            return Err(ClockError::MissingBlock(missing));
                        }
                        Err(err) => return Err(err),
                    };

                    let links = block.links.clone();

                    stack.push(Visit::Apply(cid, block));

                    for link in links {
                        if !applied.ids.contains(&link) {
                            stack.push(Visit::Expand(link));
                        }
                    }
                }
                Visit::Apply(cid, block) => {
                    // a shared ancestor may be queued twice (diamond shape)
                    if applied.ids.contains(&cid) {
                        continue;
                    }

                    let delta = P::Delta::decode(&block.delta)?;
                    self.payload.merge(&delta)?;

                    let mut tx = Transaction::new();
                    self.heads.replace(&block.links, cid, &mut tx);
                    self.store.apply(&tx).map_err(StoreError::from)?;

                    let _known = applied.ids.insert(cid);

                    debug!(
                        namespace = %self.heads.namespace(),
                        id = %cid,
                        priority = delta.priority(),
                        "applied node",
                    );
                }
            }
        }

        Ok(Processed::Applied)
    }

    /// Force a rebuild of the applied-set from the stored DAG.
    ///
    /// Every operation hydrates lazily from the persisted frontier, so this
    /// is only needed to re-walk history explicitly, e.g. after blocks were
    /// written to the store behind the clock's back. Returns the number of
    /// blocks now marked applied.
    pub fn replay(&self) -> Result<usize, ClockError> {
        let mut applied = self.applied.lock();

        applied.ids.clear();
        applied.hydrated = false;

        self.hydrate(&mut applied)?;

        let visited = applied.ids.len();

        debug!(namespace = %self.heads.namespace(), visited, "replayed stored history");

        Ok(visited)
    }

    /// Raw access to the block layer, for exchanging blocks with peers.
    #[must_use]
    pub const fn blocks(&self) -> &BlockStore {
        &self.blocks
    }

    /// Mark every block reachable from the persisted frontier as applied.
    /// Runs once per clock instance; a no-op on an empty store.
    fn hydrate(&self, applied: &mut AppliedSet) -> Result<(), ClockError> {
        if applied.hydrated {
            return Ok(());
        }

        let mut stack = self.heads.heads()?;

        while let Some(cid) = stack.pop() {
            if !applied.ids.insert(cid) {
                continue;
            }

            let block = self.fetch_block(&cid)?;
            stack.extend(block.links);
        }

        applied.hydrated = true;

        Ok(())
    }

    fn fetch_block(&self, id: &Cid) -> Result<Block, ClockError> {
        let bytes = match self.blocks.get(id) {
            Ok(bytes) => bytes,
            Err(StoreError::NotFound(cid)) => return Err(ClockError::NotFound(cid)),
            Err(err) => return Err(err.into()),
        };

        Block::decode(id, &bytes)
    }
}

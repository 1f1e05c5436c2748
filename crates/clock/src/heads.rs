use merkledb_primitives::Cid;
use merkledb_store::key::{HeadKey, Namespace};
use merkledb_store::tx::Transaction;
use merkledb_store::{Store, StoreError};

use crate::error::ClockError;

/// Persisted causal frontier for one namespace.
///
/// Each member is the [`Cid`] of a DAG tip not yet superseded by a later
/// block linking to it. Multiple members mean unresolved concurrency (a
/// fork) that a future block linking them all will collapse.
#[derive(Clone, Debug)]
pub struct HeadSet {
    store: Store,
    namespace: Namespace,
}

impl HeadSet {
    #[must_use]
    pub const fn new(store: Store, namespace: Namespace) -> Self {
        Self { store, namespace }
    }

    #[must_use]
    pub const fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Current frontier, in key order. Reproducible for a given snapshot;
    /// callers must not rely on any other ordering property.
    pub fn heads(&self) -> Result<Vec<Cid>, ClockError> {
        let prefix = HeadKey::scan_prefix(&self.namespace);

        let mut iter = self.store.iter(HeadKey::column()).map_err(StoreError::from)?;
        iter.seek(&prefix).map_err(StoreError::from)?;

        let mut heads = Vec::new();

        for entry in iter {
            let (key, _value) = entry.map_err(StoreError::from)?;

            if !key.starts_with(&prefix) {
                break;
            }

            let parsed = HeadKey::parse(&key).map_err(StoreError::from)?;

            // the prefix also covers child namespaces; skip their heads
            if parsed.namespace == self.namespace {
                heads.push(parsed.cid);
            }
        }

        Ok(heads)
    }

    pub fn len(&self) -> Result<usize, ClockError> {
        Ok(self.heads()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, ClockError> {
        Ok(self.heads()?.is_empty())
    }

    /// Stage the frontier update into `tx`: every member of `old` is removed
    /// and `new` is added. Absent members of `old` were already superseded
    /// by a concurrent replace; deleting them is a no-op, not an error.
    pub fn replace(&self, old: &[Cid], new: Cid, tx: &mut Transaction<'_>) {
        for cid in old {
            let key = HeadKey {
                namespace: self.namespace.clone(),
                cid: *cid,
            };

            tx.delete(HeadKey::column(), key.to_bytes());
        }

        let key = HeadKey {
            namespace: self.namespace.clone(),
            cid: new,
        };

        tx.put(HeadKey::column(), key.to_bytes(), Vec::new());
    }
}

#[cfg(test)]
mod tests {
    use merkledb_primitives::Format;
    use merkledb_store::config::StoreConfig;
    use merkledb_store::db::InMemoryDB;

    use super::*;

    fn head_set(store: &Store, namespace: &str) -> HeadSet {
        HeadSet::new(store.clone(), namespace.into())
    }

    fn cid(tag: &[u8]) -> Cid {
        Cid::of(Format::Block, tag)
    }

    #[test]
    fn replace_swaps_frontier() {
        let store = Store::open::<InMemoryDB>(&StoreConfig::default()).unwrap();
        let heads = head_set(&store, "doc/field");

        let (c1, c2) = (cid(b"one"), cid(b"two"));

        let mut tx = Transaction::new();
        heads.replace(&[], c1, &mut tx);
        store.apply(&tx).unwrap();

        assert_eq!(heads.heads().unwrap(), vec![c1]);

        let mut tx = Transaction::new();
        heads.replace(&[c1], c2, &mut tx);
        store.apply(&tx).unwrap();

        assert_eq!(heads.heads().unwrap(), vec![c2]);
        assert_eq!(heads.len().unwrap(), 1);
    }

    #[test]
    fn replacing_absent_heads_is_silent() {
        let store = Store::open::<InMemoryDB>(&StoreConfig::default()).unwrap();
        let heads = head_set(&store, "doc/field");

        let mut tx = Transaction::new();
        heads.replace(&[cid(b"never-there")], cid(b"new"), &mut tx);
        store.apply(&tx).unwrap();

        assert_eq!(heads.heads().unwrap(), vec![cid(b"new")]);
    }

    #[test]
    fn namespaces_do_not_bleed() {
        let store = Store::open::<InMemoryDB>(&StoreConfig::default()).unwrap();
        let parent = head_set(&store, "doc");
        let child = head_set(&store, "doc/sub");

        let mut tx = Transaction::new();
        parent.replace(&[], cid(b"p"), &mut tx);
        child.replace(&[], cid(b"c"), &mut tx);
        store.apply(&tx).unwrap();

        assert_eq!(parent.heads().unwrap(), vec![cid(b"p")]);
        assert_eq!(child.heads().unwrap(), vec![cid(b"c")]);
    }

    #[test]
    fn fork_holds_multiple_heads() {
        let store = Store::open::<InMemoryDB>(&StoreConfig::default()).unwrap();
        let heads = head_set(&store, "field");

        let base = cid(b"base");
        let (x, y) = (cid(b"x"), cid(b"y"));

        let mut tx = Transaction::new();
        heads.replace(&[], base, &mut tx);
        store.apply(&tx).unwrap();

        let mut tx = Transaction::new();
        heads.replace(&[base], x, &mut tx);
        store.apply(&tx).unwrap();

        let mut tx = Transaction::new();
        heads.replace(&[base], y, &mut tx);
        store.apply(&tx).unwrap();

        let mut frontier = heads.heads().unwrap();
        frontier.sort_unstable();
        let mut expected = vec![x, y];
        expected.sort_unstable();

        assert_eq!(frontier, expected);
    }
}

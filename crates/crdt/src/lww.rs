use borsh::{BorshDeserialize, BorshSerialize};
use merkledb_store::key::{DataKey, Namespace};
use merkledb_store::{Store, StoreError};
use tracing::debug;

use crate::error::CrdtError;
use crate::{Delta, Payload};

/// Delta for the last-writer-wins register: the full replacement value.
#[derive(BorshDeserialize, BorshSerialize, Clone, Debug, Eq, PartialEq)]
pub struct LwwDelta {
    pub priority: u64,
    pub value: Vec<u8>,
}

impl Delta for LwwDelta {
    fn priority(&self) -> u64 {
        self.priority
    }

    fn set_priority(&mut self, priority: u64) {
        self.priority = priority;
    }

    fn payload(&self) -> &[u8] {
        &self.value
    }
}

/// Last-writer-wins register.
///
/// Merged state is a `(value, priority)` pair persisted under the register's
/// namespace in the data column. Higher priority wins; on equal priority the
/// lexicographically greater value wins, so every replica resolves a fork to
/// the same value.
#[derive(Clone, Debug)]
pub struct LwwRegister {
    store: Store,
    key: DataKey,
}

#[derive(BorshDeserialize, BorshSerialize, Debug)]
struct LwwState {
    priority: u64,
    value: Vec<u8>,
}

impl LwwRegister {
    #[must_use]
    pub const fn new(store: Store, namespace: Namespace) -> Self {
        Self {
            store,
            key: DataKey(namespace),
        }
    }

    /// Causal height of the merged state, or `None` before the first merge.
    pub fn priority(&self) -> Result<Option<u64>, CrdtError> {
        Ok(self.load()?.map(|state| state.priority))
    }

    fn load(&self) -> Result<Option<LwwState>, CrdtError> {
        let Some(bytes) = self
            .store
            .get(DataKey::column(), &self.key.to_bytes())
            .map_err(StoreError::from)?
        else {
            return Ok(None);
        };

        LwwState::try_from_slice(&bytes)
            .map(Some)
            .map_err(CrdtError::CorruptState)
    }

    fn save(&self, state: &LwwState) -> Result<(), CrdtError> {
        let bytes = borsh::to_vec(state).map_err(CrdtError::Encode)?;

        self.store
            .put(DataKey::column(), &self.key.to_bytes(), bytes.into())
            .map_err(StoreError::from)?;

        Ok(())
    }
}

impl Payload for LwwRegister {
    type Delta = LwwDelta;

    fn new_delta(&self, value: &[u8]) -> LwwDelta {
        LwwDelta {
            priority: 0,
            value: value.to_vec(),
        }
    }

    fn merge(&self, delta: &LwwDelta) -> Result<(), CrdtError> {
        use std::cmp::Ordering;

        let stored = self.load()?;

        let adopt = match &stored {
            None => true,
            Some(state) => match delta.priority.cmp(&state.priority) {
                Ordering::Greater => true,
                Ordering::Less => false,
                Ordering::Equal => delta.value > state.value,
            },
        };

        if adopt {
            self.save(&LwwState {
                priority: delta.priority,
                value: delta.value.clone(),
            })?;

            debug!(namespace = %self.key.0, priority = delta.priority, "adopted delta");
        } else {
            debug!(namespace = %self.key.0, priority = delta.priority, "delta superseded");
        }

        Ok(())
    }

    fn value(&self) -> Result<Option<Vec<u8>>, CrdtError> {
        Ok(self.load()?.map(|state| state.value))
    }
}

#[cfg(test)]
mod tests {
    use merkledb_store::config::StoreConfig;
    use merkledb_store::db::InMemoryDB;

    use super::*;

    fn register(namespace: &str) -> LwwRegister {
        let store = Store::open::<InMemoryDB>(&StoreConfig::default()).unwrap();

        LwwRegister::new(store, namespace.into())
    }

    fn delta(priority: u64, value: &[u8]) -> LwwDelta {
        LwwDelta {
            priority,
            value: value.to_vec(),
        }
    }

    #[test]
    fn higher_priority_wins() {
        let reg = register("field");

        reg.merge(&delta(1, b"old")).unwrap();
        reg.merge(&delta(2, b"new")).unwrap();

        assert_eq!(reg.value().unwrap().unwrap(), b"new");
        assert_eq!(reg.priority().unwrap(), Some(2));
    }

    #[test]
    fn lower_priority_is_ignored() {
        let reg = register("field");

        reg.merge(&delta(5, b"current")).unwrap();
        reg.merge(&delta(3, b"stale")).unwrap();

        assert_eq!(reg.value().unwrap().unwrap(), b"current");
        assert_eq!(reg.priority().unwrap(), Some(5));
    }

    #[test]
    fn equal_priority_breaks_ties_lexicographically() {
        let a = register("a");
        a.merge(&delta(2, b"X")).unwrap();
        a.merge(&delta(2, b"Y")).unwrap();

        let b = register("b");
        b.merge(&delta(2, b"Y")).unwrap();
        b.merge(&delta(2, b"X")).unwrap();

        assert_eq!(a.value().unwrap().unwrap(), b"Y");
        assert_eq!(b.value().unwrap().unwrap(), b"Y");
    }

    #[test]
    fn merge_is_commutative() {
        let deltas = [delta(1, b"one"), delta(2, b"two"), delta(2, b"also-two")];

        let forward = register("fwd");
        for d in &deltas {
            forward.merge(d).unwrap();
        }

        let backward = register("bwd");
        for d in deltas.iter().rev() {
            backward.merge(d).unwrap();
        }

        assert_eq!(forward.value().unwrap(), backward.value().unwrap());
        assert_eq!(forward.priority().unwrap(), backward.priority().unwrap());
    }

    #[test]
    fn merge_is_idempotent() {
        let reg = register("field");
        let d = delta(3, b"value");

        reg.merge(&d).unwrap();
        let once = (reg.value().unwrap(), reg.priority().unwrap());

        reg.merge(&d).unwrap();
        let twice = (reg.value().unwrap(), reg.priority().unwrap());

        assert_eq!(once, twice);
    }

    #[test]
    fn merge_is_associative() {
        // grouping cannot matter for a binary fold applied left-to-right,
        // but interleaving a third delta between any pair must not change
        // the outcome either
        let a = delta(1, b"a");
        let b = delta(2, b"b");
        let c = delta(2, b"c");

        let orders: [[&LwwDelta; 3]; 3] = [[&a, &b, &c], [&b, &c, &a], [&c, &a, &b]];

        let mut results = Vec::new();
        for (i, order) in orders.iter().enumerate() {
            let reg = register(&format!("r{i}"));
            for d in order {
                reg.merge(d).unwrap();
            }
            results.push(reg.value().unwrap());
        }

        assert!(results.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(results[0].as_deref(), Some(&b"c"[..]));
    }

    #[test]
    fn value_is_none_before_first_merge() {
        let reg = register("fresh");

        assert_eq!(reg.value().unwrap(), None);
        assert_eq!(reg.priority().unwrap(), None);
    }

    #[test]
    fn delta_roundtrips_through_bytes() {
        let d = delta(7, b"payload");

        let bytes = d.encode().unwrap();
        let decoded = LwwDelta::decode(&bytes).unwrap();

        assert_eq!(decoded, d);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            LwwDelta::decode(b"\xff\xff"),
            Err(CrdtError::CorruptDelta(_))
        ));
    }
}

use std::collections::{btree_map, BTreeMap};

use crate::db::Column;
use crate::slice::Slice;

/// A batch of writes applied atomically via [`Database::apply`].
///
/// Later operations on the same `(column, key)` shadow earlier ones.
///
/// [`Database::apply`]: crate::db::Database::apply
#[derive(Default, Debug)]
pub struct Transaction<'a> {
    cols: BTreeMap<Column, BTreeMap<Slice<'a>, Operation<'a>>>,
}

#[derive(Clone, Debug)]
pub enum Operation<'a> {
    Put { value: Slice<'a> },
    Delete,
}

impl<'a> Transaction<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, col: Column, key: &'a [u8]) -> Option<&Operation<'a>> {
        self.cols.get(&col).and_then(|ops| ops.get(&key.into()))
    }

    pub fn put(&mut self, col: Column, key: impl Into<Slice<'a>>, value: impl Into<Slice<'a>>) {
        let _ignored = self.cols.entry(col).or_default().insert(
            key.into(),
            Operation::Put {
                value: value.into(),
            },
        );
    }

    pub fn delete(&mut self, col: Column, key: impl Into<Slice<'a>>) {
        let _ignored = self
            .cols
            .entry(col)
            .or_default()
            .insert(key.into(), Operation::Delete);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cols.values().all(BTreeMap::is_empty)
    }

    pub fn iter(&self) -> TxIter<'_, 'a> {
        TxIter {
            iter: self.cols.iter(),
            cursor: None,
        }
    }
}

pub struct TxIter<'this, 'a> {
    iter: btree_map::Iter<'this, Column, BTreeMap<Slice<'a>, Operation<'a>>>,
    cursor: Option<TxCursor<'this, 'a>>,
}

struct TxCursor<'this, 'a> {
    column: Column,
    iter: btree_map::Iter<'this, Slice<'a>, Operation<'a>>,
}

impl<'this, 'a> Iterator for TxIter<'this, 'a> {
    type Item = (Column, &'this Slice<'a>, &'this Operation<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(cursor) = self.cursor.as_mut() {
                if let Some((key, op)) = cursor.iter.next() {
                    return Some((cursor.column, key, op));
                }
            }

            let (column, col_iter) = self.iter.next()?;

            self.cursor = Some(TxCursor {
                column: *column,
                iter: col_iter.iter(),
            });
        }
    }
}

impl std::fmt::Debug for TxIter<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxIter").finish_non_exhaustive()
    }
}

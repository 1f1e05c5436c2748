use crate::slice::Slice;

/// Database iterator contract.
///
/// Entries arrive in ascending key order. `seek` positions the cursor at the
/// first key greater than or equal to the given key; subsequent `next` calls
/// continue from there.
pub trait DBIter: Send {
    fn seek(&mut self, key: &[u8]) -> eyre::Result<()>;
    fn next(&mut self) -> eyre::Result<Option<(Slice<'static>, Slice<'static>)>>;
}

/// Boxed iterator over a column, yielding `(key, value)` pairs.
pub struct Iter {
    done: bool,
    inner: Box<dyn DBIter>,
}

impl std::fmt::Debug for Iter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Iter").field("done", &self.done).finish()
    }
}

impl Iter {
    pub fn new<T: DBIter + 'static>(inner: T) -> Self {
        Self {
            done: false,
            inner: Box::new(inner),
        }
    }

    pub fn seek(&mut self, key: &[u8]) -> eyre::Result<()> {
        self.inner.seek(key)
    }
}

impl Iterator for Iter {
    type Item = eyre::Result<(Slice<'static>, Slice<'static>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.inner.next() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                // fuse after the first error
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

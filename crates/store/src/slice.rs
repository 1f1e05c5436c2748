use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Borrowed-or-owned byte slice passed across the storage boundary.
///
/// Lets callers hand in borrowed bytes without copying while allowing the
/// database to hand back shared ownership of stored values.
#[derive(Clone)]
pub struct Slice<'a> {
    inner: SliceInner<'a>,
}

#[derive(Clone)]
enum SliceInner<'a> {
    Ref(&'a [u8]),
    Box(Arc<Box<[u8]>>),
}

impl<'a> Slice<'a> {
    #[must_use]
    pub fn into_boxed(self) -> Box<[u8]> {
        match self.inner {
            SliceInner::Ref(inner) => inner.into(),
            SliceInner::Box(inner) => {
                Arc::try_unwrap(inner).unwrap_or_else(|shared| (*shared).clone())
            }
        }
    }

    /// Detach from the source lifetime, copying only if still borrowed.
    #[must_use]
    pub fn into_owned(self) -> Slice<'static> {
        match self.inner {
            SliceInner::Ref(inner) => Slice {
                inner: SliceInner::Box(Arc::new(inner.into())),
            },
            SliceInner::Box(inner) => Slice {
                inner: SliceInner::Box(inner),
            },
        }
    }
}

impl Deref for Slice<'_> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.as_ref()
    }
}

impl AsRef<[u8]> for Slice<'_> {
    fn as_ref(&self) -> &[u8] {
        match &self.inner {
            SliceInner::Ref(inner) => inner,
            SliceInner::Box(inner) => inner,
        }
    }
}

impl<'a> From<&'a [u8]> for Slice<'a> {
    fn from(inner: &'a [u8]) -> Self {
        Self {
            inner: SliceInner::Ref(inner),
        }
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Slice<'a> {
    fn from(inner: &'a [u8; N]) -> Self {
        Self {
            inner: SliceInner::Ref(inner),
        }
    }
}

impl From<Box<[u8]>> for Slice<'_> {
    fn from(inner: Box<[u8]>) -> Self {
        Self {
            inner: SliceInner::Box(Arc::new(inner)),
        }
    }
}

impl From<Vec<u8>> for Slice<'_> {
    fn from(inner: Vec<u8>) -> Self {
        inner.into_boxed_slice().into()
    }
}

impl From<Arc<Box<[u8]>>> for Slice<'_> {
    fn from(inner: Arc<Box<[u8]>>) -> Self {
        Self {
            inner: SliceInner::Box(inner),
        }
    }
}

impl PartialEq for Slice<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.as_ref() == other.as_ref()
    }
}

impl Eq for Slice<'_> {}

impl PartialOrd for Slice<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Slice<'_> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_ref().cmp(other.as_ref())
    }
}

impl fmt::Debug for Slice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slice({} bytes)", self.as_ref().len())
    }
}

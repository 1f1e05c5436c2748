//! Typed keys over the raw column keyspaces.
//!
//! Every key type knows which [`Column`] it lives in and how it renders to
//! bytes, so callers never hand-assemble key strings.

use std::fmt;

use merkledb_primitives::Cid;

use crate::db::Column;

/// Hierarchical identifier for a replicated value, e.g. `users/alice/name`.
///
/// Segments are joined with `/`. A namespace scopes one clock's head set and
/// one payload's merged state.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Namespace(String);

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Namespace nested one segment below this one.
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        Self(format!("{}/{segment}", self.0))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Namespace {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Key of a content-addressed block in [`Column::Blocks`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BlockKey(pub Cid);

impl BlockKey {
    #[must_use]
    pub const fn column() -> Column {
        Column::Blocks
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; 33] {
        self.0.to_bytes()
    }
}

/// Key of one head entry in [`Column::Heads`].
///
/// Renders as `<namespace>/<cid>`, so all heads of a namespace share a
/// prefix and scan together. The cid's base58 form never contains `/`,
/// which keeps the rendering parseable from the right.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HeadKey {
    pub namespace: Namespace,
    pub cid: Cid,
}

impl HeadKey {
    #[must_use]
    pub const fn column() -> Column {
        Column::Heads
    }

    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        format!("{}/{}", self.namespace, self.cid).into_bytes()
    }

    /// Scan prefix covering every head of `namespace`.
    #[must_use]
    pub fn scan_prefix(namespace: &Namespace) -> Vec<u8> {
        format!("{namespace}/").into_bytes()
    }

    pub fn parse(bytes: &[u8]) -> eyre::Result<Self> {
        let raw = std::str::from_utf8(bytes)?;

        let (namespace, cid) = raw
            .rsplit_once('/')
            .ok_or_else(|| eyre::eyre!("head key without separator: {raw:?}"))?;

        Ok(Self {
            namespace: namespace.into(),
            cid: cid.parse()?,
        })
    }
}

/// Key of a namespace's merged payload state in [`Column::Data`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DataKey(pub Namespace);

impl DataKey {
    #[must_use]
    pub const fn column() -> Column {
        Column::Data
    }

    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.as_str().as_bytes().to_vec()
    }
}

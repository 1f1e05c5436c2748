use std::fmt;
use std::str::FromStr;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

const DIGEST_LEN: usize = 32;

/// Format tag carried alongside the digest.
///
/// Distinguishes what the hashed bytes encode, so a raw value and a DAG block
/// that happen to share bytes still get distinct identifiers.
#[derive(
    Eq,
    Ord,
    Copy,
    Clone,
    Debug,
    Hash,
    PartialEq,
    PartialOrd,
    Serialize,
    Deserialize,
    BorshSerialize,
    BorshDeserialize,
)]
#[repr(u8)]
#[borsh(use_discriminant = true)]
pub enum Format {
    /// Opaque value bytes.
    Raw = 0,
    /// A DAG block (delta payload + causal links).
    Block = 1,
}

/// Content identifier: a format tag plus the SHA-256 digest of the bytes.
///
/// Deterministic across processes and replicas. Two blocks with identical
/// bytes have identical `Cid`s; this is the system's deduplication and
/// integrity guarantee.
#[derive(
    Eq,
    Ord,
    Copy,
    Clone,
    Hash,
    PartialEq,
    PartialOrd,
    Serialize,
    Deserialize,
    BorshSerialize,
    BorshDeserialize,
)]
pub struct Cid {
    format: Format,
    digest: [u8; DIGEST_LEN],
}

impl Cid {
    /// Hash `bytes` under the given format.
    #[must_use]
    pub fn of(format: Format, bytes: &[u8]) -> Self {
        Self {
            format,
            digest: Sha256::digest(bytes).into(),
        }
    }

    #[must_use]
    pub const fn format(&self) -> Format {
        self.format
    }

    #[must_use]
    pub const fn digest(&self) -> &[u8; DIGEST_LEN] {
        &self.digest
    }

    /// Deterministic byte rendering, used as the storage key for blocks.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; DIGEST_LEN + 1] {
        let mut out = [0; DIGEST_LEN + 1];
        out[0] = self.format as u8;
        out[1..].copy_from_slice(&self.digest);
        out
    }

    /// Inverse of [`Cid::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, InvalidCid> {
        if bytes.len() != DIGEST_LEN + 1 {
            return Err(InvalidCid::Length(bytes.len()));
        }

        let format = match bytes[0] {
            0 => Format::Raw,
            1 => Format::Block,
            tag => return Err(InvalidCid::Format(tag)),
        };

        let mut digest = [0; DIGEST_LEN];
        digest.copy_from_slice(&bytes[1..]);

        Ok(Self { format, digest })
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InvalidCid {
    #[error("invalid cid length: {0}")]
    Length(usize),
    #[error("unknown format tag: {0}")]
    Format(u8),
    #[error("invalid base58: {0}")]
    Encoding(#[from] bs58::decode::Error),
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", bs58::encode(self.to_bytes()).into_string())
    }
}

impl fmt::Debug for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cid({self})")
    }
}

impl FromStr for Cid {
    type Err = InvalidCid;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = bs58::decode(s).into_vec()?;
        Self::from_bytes(&bytes)
    }
}

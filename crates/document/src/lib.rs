//! Document and field mapping over the CRDT core.
//!
//! A [`Document`] is a named bag of fields built from JSON. Scalar and array
//! fields are backed by last-writer-wins registers; object fields nest into
//! sub-documents. [`MerkleField`] is the boundary the rest of the database
//! calls: commit a new value for a field, read its current merged value.

mod document;
mod error;
mod field;

pub use document::{Document, Field, FieldKind, Value};
pub use error::DocumentError;
pub use field::MerkleField;

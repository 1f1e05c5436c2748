use std::collections::BTreeMap;

use merkledb_primitives::DocKey;

use crate::error::DocumentError;

/// How a field's concurrent writes reconcile.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldKind {
    /// Scalar or array value, merged last-writer-wins.
    LwwRegister,
    /// Nested object; its fields merge independently.
    Object,
}

/// A field's value, as a tagged union over the JSON shapes.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Object(Document),
}

impl Value {
    fn from_json(key: &DocKey, json: serde_json::Value) -> Result<Self, DocumentError> {
        Ok(match json {
            serde_json::Value::Null => return Err(DocumentError::NullValue),
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float))
                .ok_or(DocumentError::UnrepresentableNumber(n))?,
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => Self::Array(
                items
                    .into_iter()
                    .map(|item| Self::from_json(key, item))
                    .collect::<Result<_, _>>()?,
            ),
            serde_json::Value::Object(members) => {
                Self::Object(Document::from_members(key.clone(), members)?)
            }
        })
    }

    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::Object(_) => FieldKind::Object,
            _ => FieldKind::LwwRegister,
        }
    }

    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(i) => serde_json::Value::from(*i),
            Self::Float(f) => serde_json::Value::from(*f),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Array(items) => {
                serde_json::Value::Array(items.iter().map(Self::to_json).collect())
            }
            Self::Object(doc) => serde_json::Value::Object(
                doc.fields
                    .iter()
                    .map(|(name, field)| (name.clone(), field.value.to_json()))
                    .collect(),
            ),
        }
    }

    /// Canonical byte rendering, used when committing the value to a
    /// register. Field order inside objects is sorted, so equal values
    /// render to equal bytes on every replica.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_json().to_string().into_bytes()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub kind: FieldKind,
    pub value: Value,
}

/// A named bag of CRDT-backed fields, built from a JSON object.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    key: DocKey,
    fields: BTreeMap<String, Field>,
}

impl Document {
    /// Build a document from a top-level JSON value.
    ///
    /// Anything but an object is rejected: anonymous values have no field
    /// names to hang CRDT state off.
    pub fn from_json(key: DocKey, json: serde_json::Value) -> Result<Self, DocumentError> {
        let serde_json::Value::Object(members) = json else {
            return Err(DocumentError::NotAnObject);
        };

        Self::from_members(key, members)
    }

    fn from_members(
        key: DocKey,
        members: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self, DocumentError> {
        let mut fields = BTreeMap::new();

        for (name, json) in members {
            let value = Value::from_json(&key, json)?;

            let _prev = fields.insert(
                name,
                Field {
                    kind: value.kind(),
                    value,
                },
            );
        }

        Ok(Self { key, fields })
    }

    #[must_use]
    pub const fn key(&self) -> &DocKey {
        &self.key
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

//! Tagged value model for operation bodies.
//!
//! External payloads arrive as untyped JSON. They are converted once, at the
//! boundary, into [`Value`] so the comparator and key enumerator can
//! pattern-match on an explicit tag instead of probing shapes at runtime.

use serde::de::Deserializer;
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Keys whose string values are encoded account keys rather than free text.
const PUBLIC_KEY_FIELDS: &[&str] = &["publicKey", "delegatee", "tokenOwner", "feePayer"];

/// Keys whose string values are opaque hashes.
const HASH_FIELDS: &[&str] = &["hash", "verificationKeyHash"];

/// Scalar leaf values.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Bool(bool),
    Int(i64),
    /// Integer outside `i64`, kept as its decimal text
    BigInt(String),
    Float(f64),
    Str(String),
}

/// Kind of an opaque wrapper value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OpaqueKind {
    PublicKey,
    Hash,
}

/// Domain value with a canonical string encoding (base58 key, field hash).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpaqueToken {
    pub kind: OpaqueKind,
    pub encoded: String,
}

impl OpaqueToken {
    pub fn public_key(encoded: impl Into<String>) -> Self {
        Self {
            kind: OpaqueKind::PublicKey,
            encoded: encoded.into(),
        }
    }

    pub fn hash(encoded: impl Into<String>) -> Self {
        Self {
            kind: OpaqueKind::Hash,
            encoded: encoded.into(),
        }
    }
}

/// A node of an operation body.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Primitive(Primitive),
    Opaque(OpaqueToken),
    List(Vec<Value>),
    Record(BTreeMap<String, Value>),
    /// Host-object method carried along with data; never diffed or emitted
    Callable,
}

impl Value {
    pub fn str(s: impl Into<String>) -> Self {
        Value::Primitive(Primitive::Str(s.into()))
    }

    pub fn int(i: i64) -> Self {
        Value::Primitive(Primitive::Int(i))
    }

    pub fn bool(b: bool) -> Self {
        Value::Primitive(Primitive::Bool(b))
    }

    /// Integer value, falling back to decimal text outside `i64`.
    pub fn integer(i: i128) -> Self {
        match i64::try_from(i) {
            Ok(small) => Value::int(small),
            Err(_) => Value::Primitive(Primitive::BigInt(i.to_string())),
        }
    }

    pub fn public_key(encoded: impl Into<String>) -> Self {
        Value::Opaque(OpaqueToken::public_key(encoded))
    }

    pub fn empty_record() -> Self {
        Value::Record(BTreeMap::new())
    }

    /// Build a record from `(key, value)` pairs.
    pub fn record<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Record(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Callable)
    }

    pub fn as_record(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Record(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Text of a string primitive or the encoding of an opaque value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Primitive(Primitive::Str(s)) => Some(s),
            Value::Opaque(token) => Some(&token.encoded),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Primitive(Primitive::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Exact integer value of an integer primitive or integer-shaped string.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Value::Primitive(Primitive::Int(i)) => Some(i128::from(*i)),
            Value::Primitive(Primitive::BigInt(s)) | Value::Primitive(Primitive::Str(s)) => {
                s.trim().parse::<i128>().ok()
            }
            _ => None,
        }
    }

    /// Direct child of a record.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_record().and_then(|map| map.get(key))
    }

    /// Descend through records along a dotted path (`update.permissions.send`).
    ///
    /// An empty path returns `self`.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            return Some(self);
        }
        path.split('.')
            .try_fold(self, |current, part| current.get(part))
    }

    /// Human-facing rendering used in labels and state listings.
    pub fn display_text(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Primitive(Primitive::Bool(b)) => b.to_string(),
            Value::Primitive(Primitive::Int(i)) => i.to_string(),
            Value::Primitive(Primitive::BigInt(s)) | Value::Primitive(Primitive::Str(s)) => {
                s.clone()
            }
            Value::Primitive(Primitive::Float(f)) => f.to_string(),
            Value::Opaque(token) => token.encoded.clone(),
            Value::List(_) | Value::Record(_) => {
                serde_json::to_string(self).unwrap_or_default()
            }
            Value::Callable => "[callable]".to_string(),
        }
    }

    /// Convert untyped JSON, tagging known key and hash fields as opaque.
    pub fn from_json(raw: &serde_json::Value) -> Self {
        Self::from_json_keyed(raw, None)
    }

    fn from_json_keyed(raw: &serde_json::Value, key: Option<&str>) -> Self {
        match raw {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::Primitive(Primitive::BigInt(u.to_string()))
                } else {
                    Value::Primitive(Primitive::Float(n.as_f64().unwrap_or(f64::NAN)))
                }
            }
            serde_json::Value::String(s) => match key {
                Some(k) if PUBLIC_KEY_FIELDS.contains(&k) => Value::public_key(s.clone()),
                Some(k) if HASH_FIELDS.contains(&k) => Value::Opaque(OpaqueToken::hash(s.clone())),
                _ => Value::str(s.clone()),
            },
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(|v| Self::from_json_keyed(v, None)).collect())
            }
            serde_json::Value::Object(map) => Value::Record(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json_keyed(v, Some(k))))
                    .collect(),
            ),
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(raw: &serde_json::Value) -> Self {
        Value::from_json(raw)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null | Value::Callable => serializer.serialize_unit(),
            Value::Primitive(Primitive::Bool(b)) => serializer.serialize_bool(*b),
            Value::Primitive(Primitive::Int(i)) => serializer.serialize_i64(*i),
            Value::Primitive(Primitive::Float(f)) => serializer.serialize_f64(*f),
            Value::Primitive(Primitive::BigInt(s)) | Value::Primitive(Primitive::Str(s)) => {
                serializer.serialize_str(s)
            }
            Value::Opaque(token) => serializer.serialize_str(&token.encoded),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Record(entries) => {
                let data: Vec<_> = entries.iter().filter(|(_, v)| !v.is_callable()).collect();
                let mut map = serializer.serialize_map(Some(data.len()))?;
                for (k, v) in data {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(Value::from_json(&raw))
    }
}

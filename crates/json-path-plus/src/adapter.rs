//! Read-only document adapter.
//!
//! The evaluator never touches a concrete tree type directly; it sees
//! documents through [`DocumentNode`], an abstract view of a node giving its
//! kind, its scalar value, and its ordered children. Mapping iteration order
//! is the document's key order and is observable through wildcards.
//!
//! Parent pointers are not part of the contract: the evaluator maintains its
//! own parent chain while traversing.
//!
//! An implementation for [`serde_json::Value`] is provided.

use serde_json::Value;

/// Kind of a document tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Null,
    Bool,
    Int,
    Float,
    String,
    Sequence,
    Mapping,
}

/// Abstract read-only view of a document tree node.
///
/// Accessors must be consistent with [`kind`](DocumentNode::kind): a node of
/// kind `Int` must return `Some` from [`as_int`](DocumentNode::as_int), a
/// mapping must yield `mapping_len` entries, and so on. The evaluator treats
/// a violation as a fatal adapter error.
pub trait DocumentNode: Sized {
    /// The kind of this node.
    fn kind(&self) -> NodeKind;

    /// The boolean value of a `Bool` node.
    fn as_bool(&self) -> Option<bool>;

    /// The integer value of an `Int` node.
    fn as_int(&self) -> Option<i64>;

    /// The numeric value of a `Float` (or `Int`) node.
    fn as_float(&self) -> Option<f64>;

    /// The string value of a `String` node.
    fn as_str(&self) -> Option<&str>;

    /// Number of key/value pairs of a `Mapping` node; 0 for other kinds.
    fn mapping_len(&self) -> usize;

    /// Key/value pairs of a `Mapping` node in document key order.
    fn mapping_entries(&self) -> Vec<(&str, &Self)>;

    /// Value stored under `key` in a `Mapping` node.
    fn mapping_get(&self, key: &str) -> Option<&Self>;

    /// Number of elements of a `Sequence` node; 0 for other kinds.
    fn sequence_len(&self) -> usize;

    /// Element at `index` of a `Sequence` node.
    fn sequence_at(&self, index: usize) -> Option<&Self>;
}

impl DocumentNode for Value {
    fn kind(&self) -> NodeKind {
        match self {
            Value::Null => NodeKind::Null,
            Value::Bool(_) => NodeKind::Bool,
            // Numbers that fit i64 are integers; everything else (floats and
            // u64 beyond i64::MAX) is treated as a float.
            Value::Number(n) => {
                if n.as_i64().is_some() {
                    NodeKind::Int
                } else {
                    NodeKind::Float
                }
            }
            Value::String(_) => NodeKind::String,
            Value::Array(_) => NodeKind::Sequence,
            Value::Object(_) => NodeKind::Mapping,
        }
    }

    fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn as_int(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    fn as_float(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    fn mapping_len(&self) -> usize {
        match self {
            Value::Object(map) => map.len(),
            _ => 0,
        }
    }

    fn mapping_entries(&self) -> Vec<(&str, &Self)> {
        match self {
            Value::Object(map) => map.iter().map(|(k, v)| (k.as_str(), v)).collect(),
            _ => Vec::new(),
        }
    }

    fn mapping_get(&self, key: &str) -> Option<&Self> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }

    fn sequence_len(&self) -> usize {
        match self {
            Value::Array(arr) => arr.len(),
            _ => 0,
        }
    }

    fn sequence_at(&self, index: usize) -> Option<&Self> {
        match self {
            Value::Array(arr) => arr.get(index),
            _ => None,
        }
    }
}

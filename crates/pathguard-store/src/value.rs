//! The tagged value held in store fields.
//!
//! The path engine switches on [`Value`] at every traversal step: plain
//! containers ([`Value::Object`], [`Value::Array`]) are walked directly,
//! [`Value::Store`] hands enforcement to the nested store, and
//! [`Value::Deferred`] is invoked to obtain the node to continue with.

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Number;

use crate::error::{StoreError, StoreResult};
use crate::store::Store;

/// Ordered field map used for plain objects and store fields.
pub type Fields = IndexMap<String, Value>;

/// Nesting level at which [`Value::to_json`] stops expanding nested stores.
const RENDER_STORE_DEPTH: usize = 8;

/// A zero-argument producer evaluated on every access.
///
/// Results are never cached: each read or write that reaches the producer
/// calls it again.
#[derive(Clone)]
pub struct Deferred(Rc<dyn Fn() -> Value>);

impl Deferred {
    /// Wrap a producer.
    pub fn new(producer: impl Fn() -> Value + 'static) -> Self {
        Self(Rc::new(producer))
    }

    /// Run the producer.
    pub fn invoke(&self) -> Value {
        (self.0)()
    }

    /// Returns `true` if both handles wrap the same producer.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Deferred(..)")
    }
}

/// A node in the store hierarchy.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// Nothing stored at this position.
    #[default]
    Missing,
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// Plain sequence; addressed by decimal index segments.
    Array(Vec<Value>),
    /// Plain nested structure; carries no permissions of its own.
    Object(Fields),
    /// Embedded store with its own registry.
    Store(Store),
    /// Lazily computed value.
    Deferred(Deferred),
}

impl Value {
    /// An empty plain object.
    pub fn object() -> Self {
        Self::Object(Fields::new())
    }

    /// Wrap a producer as a deferred value.
    pub fn deferred(producer: impl Fn() -> Value + 'static) -> Self {
        Self::Deferred(Deferred::new(producer))
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Store(_) => "store",
            Self::Deferred(_) => "deferred",
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }

    /// Returns `true` for plain objects and arrays.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Object(_) | Self::Array(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Fields> {
        match self {
            Self::Object(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_store(&self) -> Option<&Store> {
        match self {
            Self::Store(store) => Some(store),
            _ => None,
        }
    }

    /// Look up `segment` inside a plain container.
    ///
    /// Returns `None` for primitives, stores, deferred values, unknown keys
    /// and out-of-range or non-numeric array indices.
    pub fn child(&self, segment: &str) -> Option<&Value> {
        match self {
            Self::Object(fields) => fields.get(segment),
            Self::Array(items) => parse_index(segment).and_then(|i| items.get(i)),
            _ => None,
        }
    }

    /// Mutable counterpart of [`child`](Self::child).
    pub fn child_mut(&mut self, segment: &str) -> Option<&mut Value> {
        match self {
            Self::Object(fields) => fields.get_mut(segment),
            Self::Array(items) => parse_index(segment).and_then(|i| items.get_mut(i)),
            _ => None,
        }
    }

    /// Set `segment` on a plain container.
    ///
    /// An array index equal to the length appends; anything beyond it is an
    /// [`InvalidIndex`](StoreError::InvalidIndex).
    pub fn set_child(&mut self, segment: &str, value: Value) -> StoreResult<()> {
        match self {
            Self::Object(fields) => {
                fields.insert(segment.to_string(), value);
                Ok(())
            }
            Self::Array(items) => {
                let index = parse_index(segment).ok_or_else(|| StoreError::InvalidIndex {
                    segment: segment.to_string(),
                })?;
                match index.cmp(&items.len()) {
                    Ordering::Less => items[index] = value,
                    Ordering::Equal => items.push(value),
                    Ordering::Greater => {
                        return Err(StoreError::InvalidIndex {
                            segment: segment.to_string(),
                        })
                    }
                }
                Ok(())
            }
            _ => Err(StoreError::NotAContainer {
                segment: segment.to_string(),
            }),
        }
    }

    /// Render as JSON.
    ///
    /// `Missing` becomes `null`, deferred values are not invoked and render
    /// as `"<deferred>"`, nested stores render as their readable fields.
    pub fn to_json(&self) -> serde_json::Value {
        self.render(RENDER_STORE_DEPTH)
    }

    fn render(&self, stores_left: usize) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Self::Missing | Self::Null => Json::Null,
            Self::Bool(b) => Json::Bool(*b),
            Self::Number(n) => Json::Number(n.clone()),
            Self::String(s) => Json::String(s.clone()),
            Self::Array(items) => Json::Array(items.iter().map(|v| v.render(stores_left)).collect()),
            Self::Object(fields) => Json::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.render(stores_left)))
                    .collect(),
            ),
            Self::Store(_) if stores_left == 0 => Json::String("<store>".into()),
            Self::Store(store) => Json::Object(
                store
                    .entries()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.render(stores_left - 1)))
                    .collect(),
            ),
            Self::Deferred(_) => Json::String("<deferred>".into()),
        }
    }
}

/// Parse a strictly decimal array index.
fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Missing, Self::Missing) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Store(a), Self::Store(b)) => a.ptr_eq(b),
            (Self::Deferred(a), Self::Deferred(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Self::Null,
            Json::Bool(b) => Self::Bool(b),
            Json::Number(n) => Self::Number(n),
            Json::String(s) => Self::String(s),
            Json::Array(items) => Self::Array(items.into_iter().map(Value::from).collect()),
            Json::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<f64> for Value {
    /// Non-finite floats have no JSON representation and become `Null`.
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(Self::Null, Self::Number)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Array(items)
    }
}

impl From<Fields> for Value {
    fn from(fields: Fields) -> Self {
        Self::Object(fields)
    }
}

impl From<Store> for Value {
    fn from(store: Store) -> Self {
        Self::Store(store)
    }
}

impl From<Deferred> for Value {
    fn from(producer: Deferred) -> Self {
        Self::Deferred(producer)
    }
}

/*!
 * Guest Values
 * Closed value model for data crossing into guest scope
 *
 * Host-only types (clocks, sinks, allocator state) are never representable
 * here; every introspection result is marshalled into one of these variants
 * before the guest can observe it.
 */

use super::error::GuestOutcome;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A guest callback handle produced by the engine boundary.
///
/// Wraps the host-side closure that re-enters the guest function. Identity
/// is pointer identity, matching function identity in the guest language.
#[derive(Clone)]
pub struct GuestCallback(Arc<dyn Fn() -> GuestOutcome<()> + Send + Sync>);

impl GuestCallback {
    pub fn new(f: impl Fn() -> GuestOutcome<()> + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Invoke the underlying guest function.
    pub fn invoke(&self) -> GuestOutcome<()> {
        (self.0)()
    }
}

impl PartialEq for GuestCallback {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for GuestCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[function]")
    }
}

/// A value visible to guest code
#[derive(Debug, Clone, PartialEq)]
pub enum GuestValue {
    Undefined,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Map(BTreeMap<String, GuestValue>),
    Callback(GuestCallback),
}

impl GuestValue {
    /// Build a map value from string-keyed entries
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, GuestValue)>,
    {
        GuestValue::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Variant name for diagnostics and argument errors
    pub const fn type_name(&self) -> &'static str {
        match self {
            GuestValue::Undefined => "undefined",
            GuestValue::Bool(_) => "bool",
            GuestValue::Int(_) => "int",
            GuestValue::Float(_) => "float",
            GuestValue::Str(_) => "string",
            GuestValue::Map(_) => "map",
            GuestValue::Callback(_) => "function",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            GuestValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            GuestValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, GuestValue>> {
        match self {
            GuestValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_callback(&self) -> Option<&GuestCallback> {
        match self {
            GuestValue::Callback(cb) => Some(cb),
            _ => None,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, GuestValue::Callback(_))
    }

    /// JSON snapshot for diagnostics; callbacks render as "[function]"
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Serialize for GuestValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            GuestValue::Undefined => serializer.serialize_unit(),
            GuestValue::Bool(b) => serializer.serialize_bool(*b),
            GuestValue::Int(i) => serializer.serialize_i64(*i),
            GuestValue::Float(f) => serializer.serialize_f64(*f),
            GuestValue::Str(s) => serializer.serialize_str(s),
            GuestValue::Map(m) => {
                let mut map = serializer.serialize_map(Some(m.len()))?;
                for (k, v) in m {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            GuestValue::Callback(_) => serializer.serialize_str("[function]"),
        }
    }
}

impl From<bool> for GuestValue {
    fn from(v: bool) -> Self {
        GuestValue::Bool(v)
    }
}

impl From<i32> for GuestValue {
    fn from(v: i32) -> Self {
        GuestValue::Int(v.into())
    }
}

impl From<i64> for GuestValue {
    fn from(v: i64) -> Self {
        GuestValue::Int(v)
    }
}

impl From<f64> for GuestValue {
    fn from(v: f64) -> Self {
        GuestValue::Float(v)
    }
}

impl From<&str> for GuestValue {
    fn from(v: &str) -> Self {
        GuestValue::Str(v.to_string())
    }
}

impl From<String> for GuestValue {
    fn from(v: String) -> Self {
        GuestValue::Str(v)
    }
}

impl From<GuestCallback> for GuestValue {
    fn from(v: GuestCallback) -> Self {
        GuestValue::Callback(v)
    }
}

//! Call arguments and the typed option payloads the facade methods accept.
//!
//! Arguments are opaque to the stub: they are captured at call time and forwarded
//! verbatim to the real implementation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Host-supplied function argument (event listener, navigation hook, URL filter).
pub type Callback = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// User or group attributes.
pub type Attributes = Map<String, Value>;

/// A single recorded argument.
#[derive(Clone)]
pub enum CallArg {
    Value(Value),
    Callback(Callback),
}

impl CallArg {
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        CallArg::Callback(Arc::new(f))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            CallArg::Value(value) => Some(value),
            CallArg::Callback(_) => None,
        }
    }

    pub fn as_callback(&self) -> Option<&Callback> {
        match self {
            CallArg::Value(_) => None,
            CallArg::Callback(callback) => Some(callback),
        }
    }
}

impl fmt::Debug for CallArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallArg::Value(value) => write!(f, "Value({})", value),
            CallArg::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

impl PartialEq for CallArg {
    /// Callbacks compare by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CallArg::Value(a), CallArg::Value(b)) => a == b,
            (CallArg::Callback(a), CallArg::Callback(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<Value> for CallArg {
    fn from(value: Value) -> Self {
        CallArg::Value(value)
    }
}

impl From<&str> for CallArg {
    fn from(value: &str) -> Self {
        CallArg::Value(Value::String(value.to_string()))
    }
}

impl From<String> for CallArg {
    fn from(value: String) -> Self {
        CallArg::Value(Value::String(value))
    }
}

impl From<Attributes> for CallArg {
    fn from(value: Attributes) -> Self {
        CallArg::Value(Value::Object(value))
    }
}

impl From<Callback> for CallArg {
    fn from(value: Callback) -> Self {
        CallArg::Callback(value)
    }
}

/// Identity passed along with `init`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitUserInfo {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Options accepted by `init`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_z_index: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_info: Option<InitUserInfo>,
}

impl InitOptions {
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Options accepted by `start`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartOptions {
    /// Only start the content if the user has not seen it before.
    #[serde(default)]
    pub once: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_index: Option<u32>,
}

impl StartOptions {
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

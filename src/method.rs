//! Contract Method Table
//!
//! The closed set of client methods and the calling convention each one follows.
//! The convention is part of the public contract: it is the same while the client
//! is a stub and after the real implementation is attached.

use crate::error::ApiError;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Every public method of the client contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    Init,
    Identify,
    IdentifyAnonymous,
    UpdateUser,
    Group,
    UpdateGroup,
    Track,
    Start,
    EndAll,
    Reset,
    Remount,
    On,
    Off,
    SetBaseZIndex,
    SetTargetMissingSeconds,
    SetCustomInputSelector,
    SetCustomNavigate,
    SetUrlFilter,
    SetLinkUrlDecorator,
    SetCustomScrollIntoView,
    SetServerEndpoint,
    IsIdentified,
}

/// Value returned by a synchronous-default method before the real implementation exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Bool(bool),
    Null,
}

impl DefaultValue {
    pub fn to_value(self) -> Value {
        match self {
            DefaultValue::Bool(b) => Value::Bool(b),
            DefaultValue::Null => Value::Null,
        }
    }
}

/// How a stubbed call is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallingConvention {
    /// Queued, triggers a load, returns nothing.
    VoidQueued,
    /// Queued with a deferred result, triggers a load, returns an awaitable.
    PromiseQueued,
    /// Answered immediately with a fixed default; never queued, never loads.
    SyncDefault(DefaultValue),
}

use CallingConvention::{PromiseQueued, SyncDefault, VoidQueued};

/// Declarative method table, in contract order.
pub const METHOD_TABLE: &[(Method, CallingConvention)] = &[
    (Method::Init, VoidQueued),
    (Method::Identify, PromiseQueued),
    (Method::IdentifyAnonymous, PromiseQueued),
    (Method::UpdateUser, PromiseQueued),
    (Method::Group, PromiseQueued),
    (Method::UpdateGroup, PromiseQueued),
    (Method::Track, PromiseQueued),
    (Method::Start, PromiseQueued),
    (Method::EndAll, PromiseQueued),
    (Method::Reset, VoidQueued),
    (Method::Remount, VoidQueued),
    (Method::On, VoidQueued),
    (Method::Off, VoidQueued),
    (Method::SetBaseZIndex, VoidQueued),
    (Method::SetTargetMissingSeconds, VoidQueued),
    (Method::SetCustomInputSelector, VoidQueued),
    (Method::SetCustomNavigate, VoidQueued),
    (Method::SetUrlFilter, VoidQueued),
    (Method::SetLinkUrlDecorator, VoidQueued),
    (Method::SetCustomScrollIntoView, VoidQueued),
    (Method::SetServerEndpoint, VoidQueued),
    (Method::IsIdentified, SyncDefault(DefaultValue::Bool(false))),
];

impl Method {
    /// Wire name as seen by the real implementation when it drains the queue.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Init => "init",
            Method::Identify => "identify",
            Method::IdentifyAnonymous => "identifyAnonymous",
            Method::UpdateUser => "updateUser",
            Method::Group => "group",
            Method::UpdateGroup => "updateGroup",
            Method::Track => "track",
            Method::Start => "start",
            Method::EndAll => "endAll",
            Method::Reset => "reset",
            Method::Remount => "remount",
            Method::On => "on",
            Method::Off => "off",
            Method::SetBaseZIndex => "setBaseZIndex",
            Method::SetTargetMissingSeconds => "setTargetMissingSeconds",
            Method::SetCustomInputSelector => "setCustomInputSelector",
            Method::SetCustomNavigate => "setCustomNavigate",
            Method::SetUrlFilter => "setUrlFilter",
            Method::SetLinkUrlDecorator => "setLinkUrlDecorator",
            Method::SetCustomScrollIntoView => "setCustomScrollIntoView",
            Method::SetServerEndpoint => "setServerEndpoint",
            Method::IsIdentified => "isIdentified",
        }
    }

    /// Look up the calling convention in [`METHOD_TABLE`].
    pub fn convention(self) -> CallingConvention {
        METHOD_TABLE
            .iter()
            .find(|(method, _)| *method == self)
            .map(|(_, convention)| *convention)
            // Every variant has a row; the table test keeps it that way.
            .unwrap_or(VoidQueued)
    }

    pub fn from_name(name: &str) -> Result<Self, ApiError> {
        METHOD_TABLE
            .iter()
            .map(|(method, _)| *method)
            .find(|method| method.as_str() == name)
            .ok_or_else(|| ApiError::UnknownMethod(name.to_string()))
    }

    pub fn all() -> impl Iterator<Item = Method> {
        METHOD_TABLE.iter().map(|(method, _)| *method)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::from_name(s)
    }
}

impl fmt::Display for CallingConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoidQueued => f.write_str("void-queued"),
            PromiseQueued => f.write_str("promise-queued"),
            SyncDefault(default) => write!(f, "synchronous-default ({})", default.to_value()),
        }
    }
}

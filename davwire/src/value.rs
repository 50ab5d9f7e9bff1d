// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Tagged value cell held by every property.

use jiff::Timestamp;
use jiff::fmt::rfc2822;
use reqwest::Url;

use crate::lock::{ActiveLock, LockEntry};
use crate::property::ResourceType;
use crate::types::RedirectLifetime;

/// The kind of a [`Value`], used to declare what a property holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// No value.
    Unit,
    /// Text.
    String,
    /// Unsigned 64-bit integer.
    UInt64,
    /// Point in time.
    DateTime,
    /// Absolute URI.
    Uri,
    /// Enumerated value.
    Enum,
    /// Set of flags.
    Flags,
    /// Nested protocol object.
    Object(ObjectKind),
    /// Ordered list of values.
    List,
}

/// Nested objects a [`Value`] can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// `DAV:activelock`.
    ActiveLock,
    /// `DAV:lockentry`.
    LockEntry,
}

/// Enumerated values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumValue {
    /// Lifetime of a redirect reference.
    RedirectLifetime(RedirectLifetime),
}

/// Nested protocol objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Object {
    /// An active lock.
    ActiveLock(ActiveLock),
    /// A supported lock entry.
    LockEntry(LockEntry),
}

impl Object {
    /// Returns the kind of the object.
    #[must_use]
    pub const fn kind(&self) -> ObjectKind {
        match self {
            Self::ActiveLock(_) => ObjectKind::ActiveLock,
            Self::LockEntry(_) => ObjectKind::LockEntry,
        }
    }
}

/// A tagged container holding exactly one typed value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No value; the property is unset.
    #[default]
    Unit,
    /// Text.
    String(String),
    /// Unsigned 64-bit integer.
    UInt64(u64),
    /// Point in time.
    DateTime(Timestamp),
    /// Absolute URI.
    Uri(Url),
    /// Enumerated value.
    Enum(EnumValue),
    /// Resource type flags.
    Flags(ResourceType),
    /// Nested protocol object.
    Object(Object),
    /// Ordered list of values.
    List(Vec<Value>),
}

impl Value {
    /// Returns the kind tag of the value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Unit => ValueKind::Unit,
            Self::String(_) => ValueKind::String,
            Self::UInt64(_) => ValueKind::UInt64,
            Self::DateTime(_) => ValueKind::DateTime,
            Self::Uri(_) => ValueKind::Uri,
            Self::Enum(_) => ValueKind::Enum,
            Self::Flags(_) => ValueKind::Flags,
            Self::Object(o) => ValueKind::Object(o.kind()),
            Self::List(_) => ValueKind::List,
        }
    }

    /// Whether the value is [`Value::Unit`].
    #[must_use]
    pub const fn is_unit(&self) -> bool {
        matches!(self, Self::Unit)
    }

    /// Converts the value to `kind`.
    ///
    /// Identity conversions always succeed. Text converts to and from
    /// integers, timestamps and URIs; every other pairing fails.
    #[must_use]
    pub fn convert(&self, kind: ValueKind) -> Option<Self> {
        if self.kind() == kind {
            return Some(self.clone());
        }

        match (self, kind) {
            (Self::String(s), ValueKind::UInt64) => s.trim().parse().ok().map(Self::UInt64),
            (Self::String(s), ValueKind::DateTime) => parse_timestamp(s).map(Self::DateTime),
            (Self::String(s), ValueKind::Uri) => Url::parse(s.trim()).ok().map(Self::Uri),
            (Self::UInt64(n), ValueKind::String) => Some(Self::String(n.to_string())),
            (Self::DateTime(ts), ValueKind::String) => Some(Self::String(ts.to_string())),
            (Self::Uri(uri), ValueKind::String) => Some(Self::String(uri.to_string())),
            _ => None,
        }
    }

    /// Returns the text, if this is a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer, if this is an integer value.
    #[must_use]
    pub const fn as_u64(&self) -> Option<u64> {
        match self {
            Self::UInt64(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the timestamp, if this is a date/time value.
    #[must_use]
    pub const fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Self::DateTime(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Returns the URI, if this is a URI value.
    #[must_use]
    pub const fn as_uri(&self) -> Option<&Url> {
        match self {
            Self::Uri(uri) => Some(uri),
            _ => None,
        }
    }

    /// Returns the flags, if this is a resource type value.
    #[must_use]
    pub const fn as_resource_type(&self) -> Option<ResourceType> {
        match self {
            Self::Flags(flags) => Some(*flags),
            _ => None,
        }
    }

    /// Returns the items, if this is a list value.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
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

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Self::UInt64(n)
    }
}

impl From<Timestamp> for Value {
    fn from(ts: Timestamp) -> Self {
        Self::DateTime(ts)
    }
}

impl From<Url> for Value {
    fn from(uri: Url) -> Self {
        Self::Uri(uri)
    }
}

impl From<ResourceType> for Value {
    fn from(flags: ResourceType) -> Self {
        Self::Flags(flags)
    }
}

impl From<RedirectLifetime> for Value {
    fn from(lifetime: RedirectLifetime) -> Self {
        Self::Enum(EnumValue::RedirectLifetime(lifetime))
    }
}

/// Textual encodings of a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// RFC 3339 / ISO 8601, e.g. `2024-06-01T12:00:00Z`.
    Iso8601,
    /// RFC 9110 HTTP date, e.g. `Sat, 01 Jun 2024 12:00:00 GMT`.
    ///
    /// The format has whole-second resolution; sub-second precision is
    /// dropped on write.
    Http,
}

/// Parses RFC 3339 text, falling back to RFC 2822 / RFC 9110.
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<Timestamp> {
    let text = text.trim();
    text.parse::<Timestamp>()
        .ok()
        .or_else(|| rfc2822::DateTimeParser::new().parse_timestamp(text).ok())
}

/// Formats `ts` in the given encoding.
#[must_use]
pub fn format_timestamp(ts: Timestamp, format: DateFormat) -> Option<String> {
    match format {
        DateFormat::Iso8601 => Some(ts.to_string()),
        DateFormat::Http => rfc2822::DateTimePrinter::new()
            .timestamp_to_rfc9110_string(&ts)
            .ok(),
    }
}

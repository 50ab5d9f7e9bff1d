// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::ParseError;
use crate::parsable::{TypeId, ignore_unknown};
use crate::property::Property;
use crate::value::{DateFormat, Value, ValueKind, format_timestamp, parse_timestamp};
use crate::xml::Node;

/// Text encoding of a character-data property.
#[derive(Debug, Clone, Copy)]
pub enum TextCodec {
    /// Plain text.
    Text,
    /// Decimal unsigned integer, clamped to `[min, max]` on parse.
    UInt {
        /// Lower bound.
        min: u64,
        /// Upper bound.
        max: u64,
    },
    /// Timestamp; parses RFC 3339 or RFC 2822 and writes `format`.
    Date(DateFormat),
    /// Caller-supplied encoding.
    Custom {
        /// Kind of the parsed value.
        kind: ValueKind,
        /// Parses text; `None` rejects it.
        parse: fn(&str) -> Option<Value>,
        /// Writes a value; `None` writes no character data.
        write: fn(&Value) -> Option<String>,
    },
}

/// Behavior of a character-data property.
#[derive(Debug, Clone, Copy)]
pub struct PCData {
    codec: TextCodec,
    allow_empty: bool,
}

impl PCData {
    /// Plain text; empty content is accepted.
    ///
    /// An empty string is written as an element with no character data,
    /// which reads back as an unset value rather than `""`.
    #[must_use]
    pub const fn text() -> Self {
        Self {
            codec: TextCodec::Text,
            allow_empty: true,
        }
    }

    /// Plain text that must not be empty.
    #[must_use]
    pub const fn required_text() -> Self {
        Self {
            codec: TextCodec::Text,
            allow_empty: false,
        }
    }

    /// Unsigned integer within `[min, max]`.
    #[must_use]
    pub const fn uint(min: u64, max: u64) -> Self {
        Self {
            codec: TextCodec::UInt { min, max },
            allow_empty: false,
        }
    }

    /// Timestamp written in `format`.
    #[must_use]
    pub const fn date(format: DateFormat) -> Self {
        Self {
            codec: TextCodec::Date(format),
            allow_empty: false,
        }
    }

    /// Any codec with an explicit empty-content policy.
    #[must_use]
    pub const fn with_codec(codec: TextCodec, allow_empty: bool) -> Self {
        Self { codec, allow_empty }
    }

    /// The text codec.
    #[must_use]
    pub const fn codec(&self) -> TextCodec {
        self.codec
    }

    /// Whether empty character data is acceptable.
    #[must_use]
    pub const fn allow_empty(&self) -> bool {
        self.allow_empty
    }

    /// Kind of the decoded value.
    #[must_use]
    pub const fn value_kind(&self) -> ValueKind {
        match self.codec {
            TextCodec::Text => ValueKind::String,
            TextCodec::UInt { .. } => ValueKind::UInt64,
            TextCodec::Date(_) => ValueKind::DateTime,
            TextCodec::Custom { kind, .. } => kind,
        }
    }

    /// Decodes character data.
    #[must_use]
    pub fn parse_data(&self, data: &str) -> Option<Value> {
        match self.codec {
            TextCodec::Text => Some(Value::String(data.to_string())),
            TextCodec::UInt { .. } => {
                // Leading signs are rejected; `u64` parsing also rejects overflow.
                let digits = data.trim();
                if !digits.starts_with(|c: char| c.is_ascii_digit()) {
                    return None;
                }
                digits
                    .parse::<u64>()
                    .ok()
                    .map(|n| self.normalize(Value::UInt64(n)))
            }
            TextCodec::Date(_) => parse_timestamp(data).map(Value::DateTime),
            TextCodec::Custom { parse, .. } => parse(data),
        }
    }

    /// Encodes a value as character data; `None` when there is nothing to write.
    #[must_use]
    pub fn write_data(&self, value: &Value) -> Option<String> {
        match (self.codec, value) {
            (_, Value::Unit) => None,
            (TextCodec::Custom { write, .. }, v) => write(v),
            (TextCodec::Date(format), Value::DateTime(ts)) => format_timestamp(*ts, format),
            (_, v) => v.convert(ValueKind::String).and_then(|s| match s {
                Value::String(s) => Some(s),
                _ => None,
            }),
        }
    }

    /// Applies the codec's bounds to a value of its kind.
    #[must_use]
    pub fn normalize(&self, value: Value) -> Value {
        match (self.codec, value) {
            (TextCodec::UInt { min, max }, Value::UInt64(n)) => Value::UInt64(n.clamp(min, max)),
            (_, v) => v,
        }
    }
}

fn unknown_content(ty: TypeId, data: &str) -> ParseError {
    ParseError::ContentViolation(format!(
        "The content of a <{}> element (\"{data}\") was unknown",
        ty.element_name().unwrap_or_default()
    ))
}

pub(super) fn deserialize(
    property: &mut Property,
    codec: PCData,
    node: &Node,
) -> Result<(), ParseError> {
    let Node::Text(text) = node else {
        return ignore_unknown(property.property_type(), node);
    };

    property.value = decode(property.property_type(), codec, text)?;
    Ok(())
}

/// Decodes the character data of a `ty` element.
pub(super) fn decode(ty: TypeId, codec: PCData, text: &str) -> Result<Value, ParseError> {
    // Text values keep their whitespace; the numeric and date codecs trim.
    if text.trim().is_empty() && !codec.allow_empty {
        return Err(ParseError::ContentViolation(format!(
            "A <{}> element was missing required content",
            ty.element_name().unwrap_or_default()
        )));
    }

    codec
        .parse_data(text)
        .ok_or_else(|| unknown_content(ty, text.trim()))
}

// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use reqwest::Url;

use crate::error::ParseError;
use crate::lock::{ACTIVE_LOCK, LOCK_ENTRY};
use crate::parsable::{Parsable, TypeId, ignore_unknown, new_from_element, resolve_href};
use crate::property::Property;
use crate::value::{Object, ObjectKind, Value, ValueKind};
use crate::xml::{Element, Node, XmlWriter, ns};

/// Element encoding of the items of a list property.
#[derive(Debug, Clone, Copy)]
pub enum ListItem {
    /// A URI in a `DAV:href` element.
    Href,
    /// Text content of an element.
    Text {
        /// Item element namespace.
        namespace: &'static str,
        /// Item element name.
        name: &'static str,
    },
    /// An attribute of an empty element.
    Attribute {
        /// Item element namespace.
        namespace: &'static str,
        /// Item element name.
        name: &'static str,
        /// Attribute holding the value.
        attribute: &'static str,
    },
    /// A `DAV:activelock` element.
    ActiveLock,
    /// A `DAV:lockentry` element.
    LockEntry,
}

impl ListItem {
    /// Kind of each item value.
    #[must_use]
    pub const fn value_kind(&self) -> ValueKind {
        match self {
            Self::Href => ValueKind::Uri,
            Self::Text { .. } | Self::Attribute { .. } => ValueKind::String,
            Self::ActiveLock => ValueKind::Object(ObjectKind::ActiveLock),
            Self::LockEntry => ValueKind::Object(ObjectKind::LockEntry),
        }
    }

    const fn element(&self) -> (&'static str, &'static str) {
        match self {
            Self::Href => (ns::DAV, "href"),
            Self::Text { namespace, name } | Self::Attribute { namespace, name, .. } => {
                (*namespace, *name)
            }
            Self::ActiveLock => (ns::DAV, "activelock"),
            Self::LockEntry => (ns::DAV, "lockentry"),
        }
    }

    fn parse(self, base_uri: &Url, e: &Element) -> Result<Value, ParseError> {
        let value = match self {
            Self::Href => Value::Uri(resolve_href(base_uri, &e.text())?),
            Self::Text { .. } => Value::String(e.text().trim().to_string()),
            Self::Attribute { attribute, .. } => {
                let value = e.attribute(attribute).ok_or_else(|| {
                    ParseError::ContentViolation(format!(
                        "A {e} element was missing its '{attribute}' attribute"
                    ))
                })?;
                Value::String(value.to_string())
            }
            Self::ActiveLock => Value::Object(Object::ActiveLock(new_from_element(
                TypeId::of(&ACTIVE_LOCK),
                base_uri,
                e,
            )?)),
            Self::LockEntry => Value::Object(Object::LockEntry(new_from_element(
                TypeId::of(&LOCK_ENTRY),
                base_uri,
                e,
            )?)),
        };
        Ok(value)
    }

    fn write(self, writer: &mut XmlWriter, value: &Value) -> Result<(), ParseError> {
        let (namespace, name) = self.element();
        match (self, value) {
            (Self::Href, Value::Uri(uri)) => writer.text_element(namespace, name, uri.as_str()),
            (Self::Text { .. }, Value::String(s)) => writer.text_element(namespace, name, s),
            (Self::Attribute { attribute, .. }, Value::String(s)) => {
                writer.empty_with_attributes(namespace, name, &[(attribute, s.as_str())])
            }
            (_, Value::Object(Object::ActiveLock(lock))) => lock.serialize(writer),
            (_, Value::Object(Object::LockEntry(entry))) => entry.serialize(writer),
            (_, other) => Err(ParseError::Internal(format!(
                "A {:?} value cannot be written as a <{name}> list item",
                other.kind()
            ))),
        }
    }
}

pub(super) fn deserialize(
    property: &mut Property,
    item: ListItem,
    base_uri: &Url,
    node: &Node,
) -> Result<(), ParseError> {
    let (namespace, name) = item.element();
    match node {
        Node::Element(e) if e.is(namespace, name) => {
            let value = item.parse(base_uri, e)?;
            if let Value::List(items) = &mut property.value {
                items.push(value);
            }
            Ok(())
        }
        _ => ignore_unknown(property.property_type(), node),
    }
}

pub(super) fn serialize(
    property: &Property,
    item: ListItem,
    writer: &mut XmlWriter,
    namespace: &str,
    name: &str,
) -> Result<(), ParseError> {
    let items = property.value().as_list().unwrap_or_default();
    if items.is_empty() {
        return writer.empty(namespace, name);
    }

    writer.start(namespace, name)?;
    for value in items {
        item.write(writer, value)?;
    }
    writer.end(namespace, name)
}

// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::ParseError;
use crate::parsable::ignore_unknown;
use crate::property::Property;
use crate::types::RedirectLifetime;
use crate::value::Value;
use crate::xml::{Node, XmlWriter, ns};

pub(super) fn deserialize(property: &mut Property, node: &Node) -> Result<(), ParseError> {
    let lifetime = match node {
        Node::Element(e) if e.is(ns::DAV, "permanent") => RedirectLifetime::Permanent,
        Node::Element(e) if e.is(ns::DAV, "temporary") => RedirectLifetime::Temporary,
        _ => return ignore_unknown(property.property_type(), node),
    };
    property.value = Value::from(lifetime);
    Ok(())
}

pub(super) fn serialize(
    property: &Property,
    writer: &mut XmlWriter,
    namespace: &str,
    name: &str,
) -> Result<(), ParseError> {
    match property.redirect_lifetime().and_then(RedirectLifetime::element_name) {
        Some(child) => {
            writer.start(namespace, name)?;
            writer.empty(ns::DAV, child)?;
            writer.end(namespace, name)
        }
        None => writer.empty(namespace, name),
    }
}

// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use reqwest::Url;

use crate::error::ParseError;
use crate::parsable::{ignore_unknown, resolve_href};
use crate::property::Property;
use crate::value::Value;
use crate::xml::{Node, XmlWriter, ns};

pub(super) fn deserialize(
    property: &mut Property,
    base_uri: &Url,
    node: &Node,
) -> Result<(), ParseError> {
    match node {
        Node::Element(e) if e.is(ns::DAV, "href") => {
            property.value = Value::Uri(resolve_href(base_uri, &e.text())?);
            Ok(())
        }
        _ => ignore_unknown(property.property_type(), node),
    }
}

pub(super) fn serialize(
    property: &Property,
    writer: &mut XmlWriter,
    namespace: &str,
    name: &str,
) -> Result<(), ParseError> {
    let Value::Uri(uri) = property.value() else {
        return writer.empty(namespace, name);
    };
    writer.start(namespace, name)?;
    writer.text_element(ns::DAV, "href", uri.as_str())?;
    writer.end(namespace, name)
}

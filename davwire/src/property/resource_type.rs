// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::ParseError;
use crate::flags::bit_flags;
use crate::parsable::{TypeSet, ignore_unknown};
use crate::property::Property;
use crate::value::Value;
use crate::xml::{Node, XmlWriter, ns};

bit_flags! {
    /// Flags carried by the `DAV:resourcetype` property.
    pub struct ResourceType: u32 {
        /// `DAV:collection`.
        const COLLECTION = 1 << 0;
        /// `DAV:principal`.
        const PRINCIPAL = 1 << 1;
        /// `DAV:redirectref`.
        const REDIRECTREF = 1 << 2;
        /// `C:calendar`.
        const CALENDAR = 1 << 3;
        /// `C:schedule-inbox`.
        const SCHEDULE_INBOX = 1 << 4;
        /// `C:schedule-outbox`.
        const SCHEDULE_OUTBOX = 1 << 5;
        /// `CR:addressbook`.
        const ADDRESSBOOK = 1 << 6;
        /// Yahoo! `mountpoint`.
        const MOUNTPOINT = 1 << 7;
    }
}

/// Element bound to each flag, in serialization order.
const TABLE: &[(ResourceType, &str, &str)] = &[
    (ResourceType::COLLECTION, ns::DAV, "collection"),
    (ResourceType::PRINCIPAL, ns::DAV, "principal"),
    (ResourceType::REDIRECTREF, ns::DAV, "redirectref"),
    (ResourceType::CALENDAR, ns::CALDAV, "calendar"),
    (ResourceType::SCHEDULE_INBOX, ns::CALDAV, "schedule-inbox"),
    (ResourceType::SCHEDULE_OUTBOX, ns::CALDAV, "schedule-outbox"),
    (ResourceType::ADDRESSBOOK, ns::CARDDAV, "addressbook"),
    (ResourceType::MOUNTPOINT, ns::YAHOO, "mountpoint"),
];

pub(super) fn deserialize(property: &mut Property, node: &Node) -> Result<(), ParseError> {
    let flag = match node {
        Node::Element(e) => TABLE
            .iter()
            .find(|(_, namespace, name)| e.is(namespace, name))
            .map(|(flag, _, _)| *flag),
        Node::Text(_) => None,
    };

    if let (Some(flag), Value::Flags(flags)) = (flag, &mut property.value) {
        flags.insert(flag);
        return Ok(());
    }
    ignore_unknown(property.property_type(), node)
}

pub(super) fn serialize(
    property: &Property,
    writer: &mut XmlWriter,
    namespace: &str,
    name: &str,
) -> Result<(), ParseError> {
    let flags = property.value().as_resource_type().unwrap_or_default();
    if flags.is_empty() {
        return writer.empty(namespace, name);
    }

    writer.start(namespace, name)?;
    for (flag, child_ns, child) in TABLE {
        if flags.contains(*flag) {
            writer.empty(child_ns, child)?;
        }
    }
    writer.end(namespace, name)
}

pub(super) fn collect_namespaces(flags: ResourceType, types: &mut TypeSet) {
    for (flag, namespace, _) in TABLE {
        if flags.contains(*flag) {
            types.insert_namespace(*namespace);
        }
    }
}

// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use reqwest::Url;

use crate::dav_error::{DAV_ERROR, ProtocolError};
use crate::error::ParseError;
use crate::parsable::{
    PARSABLE, Parsable, ParsableType, TypeId, TypeSet, expect_type, ignore_unknown,
    new_from_element,
};
use crate::property_set::{PROP, PropertySet};
use crate::types::Status;
use crate::xml::{Node, XmlWriter, ns};

/// `DAV:propstat`.
pub static PROP_STAT: ParsableType =
    ParsableType::element("PropStat", ns::DAV, "propstat", TypeId::of(&PARSABLE));

/// Properties that share one status within a response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropStat {
    prop: Option<PropertySet>,
    status: Status,
    error: Option<ProtocolError>,
    description: Option<String>,
}

impl PropStat {
    /// Creates a propstat with `prop` and `status`.
    #[must_use]
    pub const fn new(prop: PropertySet, status: Status) -> Self {
        Self {
            prop: Some(prop),
            status,
            error: None,
            description: None,
        }
    }

    /// The properties, if the server sent a `prop` element.
    #[must_use]
    pub const fn prop(&self) -> Option<&PropertySet> {
        self.prop.as_ref()
    }

    /// Status shared by the properties.
    #[must_use]
    pub const fn status(&self) -> &Status {
        &self.status
    }

    /// Violated condition, if reported.
    #[must_use]
    pub const fn error(&self) -> Option<&ProtocolError> {
        self.error.as_ref()
    }

    /// `responsedescription` text.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl Parsable for PropStat {
    fn instantiate(ty: TypeId) -> Result<Self, ParseError> {
        expect_type(ty, TypeId::of(&PROP_STAT))?;
        Ok(Self::default())
    }

    fn parsable_type(&self) -> TypeId {
        TypeId::of(&PROP_STAT)
    }

    fn deserialize(&mut self, base_uri: &Url, node: &Node) -> Result<(), ParseError> {
        let Node::Element(e) = node else {
            return ignore_unknown(self.parsable_type(), node);
        };
        if !e.in_namespace(ns::DAV) {
            return ignore_unknown(self.parsable_type(), node);
        }

        match e.name() {
            "prop" => self.prop = Some(new_from_element(TypeId::of(&PROP), base_uri, e)?),
            "status" => self.status = Status::parse_line(&e.text())?,
            "error" => self.error = Some(new_from_element(TypeId::of(&DAV_ERROR), base_uri, e)?),
            "responsedescription" => self.description = Some(e.text()),
            _ => return ignore_unknown(self.parsable_type(), node),
        }
        Ok(())
    }

    fn serialize(&self, writer: &mut XmlWriter) -> Result<(), ParseError> {
        writer.start(ns::DAV, "propstat")?;
        if let Some(prop) = &self.prop {
            prop.serialize(writer)?;
        }
        writer.text_element(ns::DAV, "status", &self.status.to_string())?;
        if let Some(error) = &self.error {
            error.serialize(writer)?;
        }
        if let Some(description) = &self.description {
            writer.text_element(ns::DAV, "responsedescription", description)?;
        }
        writer.end(ns::DAV, "propstat")
    }

    fn collect_types(&self, types: &mut TypeSet) {
        types.insert(self.parsable_type());
        if let Some(prop) = &self.prop {
            prop.collect_types(types);
        }
        if let Some(error) = &self.error {
            error.collect_types(types);
        }
    }
}

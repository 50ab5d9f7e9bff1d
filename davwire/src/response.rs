// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! `DAV:response`: the result for one resource of a Multi-Status reply.

use reqwest::Url;

use crate::dav_error::{DAV_ERROR, ProtocolError};
use crate::error::ParseError;
use crate::parsable::{
    PARSABLE, Parsable, ParsableType, TypeId, TypeSet, expect_type, ignore_unknown,
    new_from_element, resolve_href,
};
use crate::prop_stat::{PROP_STAT, PropStat};
use crate::property::Property;
use crate::types::Status;
use crate::value::Value;
use crate::xml::{Node, XmlWriter, ns};

/// `DAV:response`.
pub static RESPONSE: ParsableType =
    ParsableType::element("Response", ns::DAV, "response", TypeId::of(&PARSABLE));

/// The result for one resource, possibly known under several hrefs.
///
/// A response carries either a top-level [`Status`] or a list of
/// [`PropStat`]s, one per group of properties sharing a status.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    hrefs: Vec<Url>,
    status: Status,
    propstats: Vec<PropStat>,
    error: Option<ProtocolError>,
    description: Option<String>,
    location: Option<String>,
}

impl Response {
    /// Creates a response for `href` carrying `status`.
    #[must_use]
    pub fn new(href: Url, status: Status) -> Self {
        Self {
            hrefs: vec![href],
            status,
            ..Self::default()
        }
    }

    /// Appends a propstat.
    pub fn push_propstat(&mut self, propstat: PropStat) {
        self.propstats.push(propstat);
    }

    /// Whether `uri` is one of the hrefs.
    #[must_use]
    pub fn has_href(&self, uri: &Url) -> bool {
        self.hrefs.contains(uri)
    }

    /// Copies of the hrefs in document order.
    #[must_use]
    pub fn hrefs(&self) -> Vec<Url> {
        self.hrefs.clone()
    }

    /// Top-level status; code zero when the response only has propstats.
    #[must_use]
    pub const fn status(&self) -> &Status {
        &self.status
    }

    /// Propstat at `index`.
    #[must_use]
    pub fn propstat(&self, index: usize) -> Option<&PropStat> {
        self.propstats.get(index)
    }

    /// Returns an independent copy of the propstats in document order.
    #[must_use]
    pub fn propstats(&self) -> Vec<PropStat> {
        self.propstats.clone()
    }

    /// Number of propstats.
    #[must_use]
    pub fn n_propstats(&self) -> usize {
        self.propstats.len()
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

    /// Redirect target from a `location` element.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Whether the response or any of its propstats carries a non-2xx status.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        let failed = |s: &Status| s.code != 0 && !s.is_success();
        failed(&self.status) || self.propstats.iter().any(|p| failed(p.status()))
    }

    /// Looks up the first propstat whose property set has type `ty`.
    ///
    /// Returns that propstat's status and, only when the status is 2xx, a
    /// copy of the property's value. A status with code zero means no
    /// propstat mentions the type.
    #[must_use]
    pub fn find_property(&self, ty: TypeId) -> (Status, Option<Value>) {
        for propstat in &self.propstats {
            let Some(prop) = propstat.prop().filter(|p| p.has_type(ty)) else {
                continue;
            };
            let value = if propstat.status().is_success() {
                prop.get(ty).filter(|p| p.is_set()).map(Property::get_value)
            } else {
                None
            };
            return (propstat.status().clone(), value);
        }
        (Status::default(), None)
    }
}

impl Parsable for Response {
    fn instantiate(ty: TypeId) -> Result<Self, ParseError> {
        expect_type(ty, TypeId::of(&RESPONSE))?;
        Ok(Self::default())
    }

    fn parsable_type(&self) -> TypeId {
        TypeId::of(&RESPONSE)
    }

    fn deserialize(&mut self, base_uri: &Url, node: &Node) -> Result<(), ParseError> {
        let Node::Element(e) = node else {
            return ignore_unknown(self.parsable_type(), node);
        };
        if !e.in_namespace(ns::DAV) {
            return ignore_unknown(self.parsable_type(), node);
        }

        match e.name() {
            "href" => self.hrefs.push(resolve_href(base_uri, &e.text())?),
            "status" => self.status = Status::parse_line(&e.text())?,
            "propstat" => self
                .propstats
                .push(new_from_element(TypeId::of(&PROP_STAT), base_uri, e)?),
            "error" => self.error = Some(new_from_element(TypeId::of(&DAV_ERROR), base_uri, e)?),
            "responsedescription" => self.description = Some(e.text()),
            "location" => {
                // RFC 4918 wraps the target in an href; older servers send bare text.
                let target = e
                    .elements()
                    .find(|c| c.is(ns::DAV, "href"))
                    .map_or_else(|| e.text(), |href| href.text());
                self.location = Some(target.trim().to_string());
            }
            _ => return ignore_unknown(self.parsable_type(), node),
        }
        Ok(())
    }

    fn serialize(&self, writer: &mut XmlWriter) -> Result<(), ParseError> {
        writer.start(ns::DAV, "response")?;
        for href in &self.hrefs {
            writer.text_element(ns::DAV, "href", href.as_str())?;
        }
        if self.status.code != 0 {
            writer.text_element(ns::DAV, "status", &self.status.to_string())?;
        }
        for propstat in &self.propstats {
            propstat.serialize(writer)?;
        }
        if let Some(error) = &self.error {
            error.serialize(writer)?;
        }
        if let Some(description) = &self.description {
            writer.text_element(ns::DAV, "responsedescription", description)?;
        }
        if let Some(location) = &self.location {
            writer.start(ns::DAV, "location")?;
            writer.text_element(ns::DAV, "href", location)?;
            writer.end(ns::DAV, "location")?;
        }
        writer.end(ns::DAV, "response")
    }

    fn collect_types(&self, types: &mut TypeSet) {
        types.insert(self.parsable_type());
        for propstat in &self.propstats {
            propstat.collect_types(types);
        }
        if let Some(error) = &self.error {
            error.collect_types(types);
        }
    }
}

// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! `DAV:error`: the precondition or postcondition a request violated.

use reqwest::Url;

use crate::error::ParseError;
use crate::flags::bit_flags;
use crate::parsable::{PARSABLE, Parsable, ParsableType, TypeId, expect_type};
use crate::xml::{Node, XmlWriter, ns};

/// `DAV:error`.
pub static DAV_ERROR: ParsableType =
    ParsableType::element("ProtocolError", ns::DAV, "error", TypeId::of(&PARSABLE));

bit_flags! {
    /// Conditions defined by RFC 4918 section 16.
    pub struct ErrorConditions: u32 {
        /// `lock-token-matches-request-uri`.
        const LOCK_TOKEN_MATCHES_REQUEST_URI = 1 << 0;
        /// `lock-token-submitted`.
        const LOCK_TOKEN_SUBMITTED = 1 << 1;
        /// `no-conflicting-lock`.
        const NO_CONFLICTING_LOCK = 1 << 2;
        /// `no-external-entities`.
        const NO_EXTERNAL_ENTITIES = 1 << 3;
        /// `preserved-live-properties`.
        const PRESERVED_LIVE_PROPERTIES = 1 << 4;
        /// `propfind-finite-depth`.
        const PROPFIND_FINITE_DEPTH = 1 << 5;
        /// `cannot-modify-protected-property`.
        const CANNOT_MODIFY_PROTECTED_PROPERTY = 1 << 6;
    }
}

const CONDITIONS: &[(ErrorConditions, &str)] = &[
    (
        ErrorConditions::LOCK_TOKEN_MATCHES_REQUEST_URI,
        "lock-token-matches-request-uri",
    ),
    (ErrorConditions::LOCK_TOKEN_SUBMITTED, "lock-token-submitted"),
    (ErrorConditions::NO_CONFLICTING_LOCK, "no-conflicting-lock"),
    (ErrorConditions::NO_EXTERNAL_ENTITIES, "no-external-entities"),
    (
        ErrorConditions::PRESERVED_LIVE_PROPERTIES,
        "preserved-live-properties",
    ),
    (ErrorConditions::PROPFIND_FINITE_DEPTH, "propfind-finite-depth"),
    (
        ErrorConditions::CANNOT_MODIFY_PROTECTED_PROPERTY,
        "cannot-modify-protected-property",
    ),
];

/// A `DAV:error` body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtocolError {
    conditions: ErrorConditions,
    other: Vec<(Option<String>, String)>,
}

impl ProtocolError {
    /// Creates an error with no conditions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recognized conditions.
    #[must_use]
    pub const fn conditions(&self) -> ErrorConditions {
        self.conditions
    }

    /// Adds a recognized condition.
    pub const fn insert(&mut self, condition: ErrorConditions) {
        self.conditions.insert(condition);
    }

    /// Unrecognized condition elements as `(namespace, name)`.
    #[must_use]
    pub fn other_conditions(&self) -> &[(Option<String>, String)] {
        &self.other
    }
}

impl Parsable for ProtocolError {
    fn instantiate(ty: TypeId) -> Result<Self, ParseError> {
        expect_type(ty, TypeId::of(&DAV_ERROR))?;
        Ok(Self::new())
    }

    fn parsable_type(&self) -> TypeId {
        TypeId::of(&DAV_ERROR)
    }

    fn deserialize(&mut self, _base_uri: &Url, node: &Node) -> Result<(), ParseError> {
        let Node::Element(e) = node else {
            return Ok(());
        };

        let known = CONDITIONS
            .iter()
            .find(|(_, name)| e.is(ns::DAV, name))
            .map(|(flag, _)| *flag);
        match known {
            Some(flag) => self.conditions.insert(flag),
            None => self
                .other
                .push((e.namespace().map(str::to_string), e.name().to_string())),
        }
        Ok(())
    }

    fn serialize(&self, writer: &mut XmlWriter) -> Result<(), ParseError> {
        if self.conditions.is_empty() {
            return writer.empty(ns::DAV, "error");
        }
        writer.start(ns::DAV, "error")?;
        for (flag, name) in CONDITIONS {
            if self.conditions.contains(*flag) {
                writer.empty(ns::DAV, name)?;
            }
        }
        writer.end(ns::DAV, "error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsable::new_from_bytes;

    #[test]
    fn records_known_and_foreign_conditions() {
        let base = Url::parse("https://dav.example.com/").unwrap();
        let error: ProtocolError = new_from_bytes(
            TypeId::of(&DAV_ERROR),
            &base,
            br#"<D:error xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
                  <D:lock-token-submitted><D:href>/locked/</D:href></D:lock-token-submitted>
                  <C:valid-calendar-data/>
                </D:error>"#,
        )
        .unwrap();

        assert!(
            error
                .conditions()
                .contains(ErrorConditions::LOCK_TOKEN_SUBMITTED)
        );
        assert_eq!(
            error.other_conditions(),
            [(
                Some(ns::CALDAV.to_string()),
                "valid-calendar-data".to_string()
            )]
        );
    }
}

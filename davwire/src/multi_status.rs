// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! `DAV:multistatus`: per-resource results of a WebDAV request.

use reqwest::Url;

use crate::error::ParseError;
use crate::parsable::{
    PARSABLE, Parsable, ParsableType, TypeId, TypeSet, expect_type, ignore_unknown,
    new_from_bytes, new_from_element,
};
use crate::response::{RESPONSE, Response};
use crate::types::Status;
use crate::xml::{Node, XmlWriter, ns};

/// `DAV:multistatus`.
pub static MULTI_STATUS: ParsableType =
    ParsableType::element("MultiStatus", ns::DAV, "multistatus", TypeId::of(&PARSABLE));

/// HTTP status code of a Multi-Status reply.
pub const MULTI_STATUS_CODE: u16 = 207;

/// Responses of a WebDAV reply in server order.
///
/// Built from a 207 body, or synthesized with a single [`Response`] when
/// the server answered with any other status, so callers read results the
/// same way in both cases.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiStatus {
    responses: Vec<Response>,
    description: Option<String>,
}

impl MultiStatus {
    /// Creates an empty Multi-Status.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the result of a reply to a request for `request_uri`.
    ///
    /// A 207 reply has its body parsed with `request_uri` as the base of
    /// relative hrefs. Any other status yields one response for
    /// `request_uri` carrying that status and no propstats.
    ///
    /// # Errors
    ///
    /// Returns the parse error of a malformed 207 body.
    pub fn from_message(
        status: u16,
        reason: &str,
        request_uri: &Url,
        body: &[u8],
    ) -> Result<Self, ParseError> {
        if status == MULTI_STATUS_CODE {
            return new_from_bytes(TypeId::of(&MULTI_STATUS), request_uri, body);
        }

        let mut multi_status = Self::new();
        multi_status.push(Response::new(
            request_uri.clone(),
            Status::new(status, reason),
        ));
        Ok(multi_status)
    }

    /// Appends a response.
    pub fn push(&mut self, response: Response) {
        self.responses.push(response);
    }

    /// Returns an independent copy of the responses in server order.
    ///
    /// Use [`Self::response`] to borrow a single response instead.
    #[must_use]
    pub fn responses(&self) -> Vec<Response> {
        self.responses.clone()
    }

    /// Response at `index`.
    #[must_use]
    pub fn response(&self, index: usize) -> Option<&Response> {
        self.responses.get(index)
    }

    /// First response listing `uri` among its hrefs.
    #[must_use]
    pub fn response_by_href(&self, uri: &Url) -> Option<&Response> {
        self.responses.iter().find(|r| r.has_href(uri))
    }

    /// Number of responses.
    #[must_use]
    pub fn n_responses(&self) -> usize {
        self.responses.len()
    }

    /// `responsedescription` text.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether any response or propstat carries a non-2xx status.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.responses.iter().any(Response::has_errors)
    }

    /// Number of responses that carry a non-2xx status.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.responses.iter().filter(|r| r.has_errors()).count()
    }
}

impl Parsable for MultiStatus {
    fn instantiate(ty: TypeId) -> Result<Self, ParseError> {
        expect_type(ty, TypeId::of(&MULTI_STATUS))?;
        Ok(Self::new())
    }

    fn parsable_type(&self) -> TypeId {
        TypeId::of(&MULTI_STATUS)
    }

    fn deserialize(&mut self, base_uri: &Url, node: &Node) -> Result<(), ParseError> {
        match node {
            Node::Element(e) if e.is(ns::DAV, "response") => {
                let response = new_from_element(TypeId::of(&RESPONSE), base_uri, e)?;
                self.responses.push(response);
                Ok(())
            }
            Node::Element(e) if e.is(ns::DAV, "responsedescription") => {
                self.description = Some(e.text());
                Ok(())
            }
            _ => ignore_unknown(self.parsable_type(), node),
        }
    }

    fn serialize(&self, writer: &mut XmlWriter) -> Result<(), ParseError> {
        writer.start(ns::DAV, "multistatus")?;
        for response in &self.responses {
            response.serialize(writer)?;
        }
        if let Some(description) = &self.description {
            writer.text_element(ns::DAV, "responsedescription", description)?;
        }
        writer.end(ns::DAV, "multistatus")
    }

    fn collect_types(&self, types: &mut TypeSet) {
        types.insert(self.parsable_type());
        for response in &self.responses {
            response.collect_types(types);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesizes_single_response_for_plain_status() {
        let uri = Url::parse("https://dav.example.com/missing").unwrap();
        let ms = MultiStatus::from_message(404, "", &uri, b"").unwrap();

        assert_eq!(ms.n_responses(), 1);
        let response = ms.response(0).unwrap();
        assert_eq!(response.status().code, 404);
        assert_eq!(response.status().reason, "Not Found");
        assert_eq!(response.n_propstats(), 0);
        assert!(response.has_href(&uri));
        assert!(ms.has_errors());
    }

    #[test]
    fn synthesized_success_has_no_errors() {
        let uri = Url::parse("https://dav.example.com/new/").unwrap();
        let ms = MultiStatus::from_message(201, "Created", &uri, b"").unwrap();
        assert!(!ms.has_errors());
        assert_eq!(ms.failed_count(), 0);
    }
}

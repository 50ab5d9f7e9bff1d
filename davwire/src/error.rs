// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use crate::multi_status::MultiStatus;

/// Errors raised while binding XML documents to typed objects.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The bytes are not well-formed XML.
    #[error("Error parsing XML: {0}")]
    ParserFailed(String),

    /// The document has no root element.
    #[error("XML data contains no root element")]
    EmptyDocument,

    /// No registered type matches an element looked up by identity.
    #[error("{0}")]
    UnknownElement(String),

    /// Missing or unparseable character data in a recognized element.
    #[error("{0}")]
    ContentViolation(String),

    /// An invariant of the binding engine was violated.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<quick_xml::Error> for ParseError {
    fn from(e: quick_xml::Error) -> Self {
        Self::Internal(format!("XML error: {e}"))
    }
}

impl From<std::io::Error> for ParseError {
    fn from(e: std::io::Error) -> Self {
        Self::Internal(format!("IO error: {e}"))
    }
}

/// WebDAV client errors.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum DavError {
    /// A document failed to bind.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The HTTP transport failed before a reply was received.
    #[error("HTTP error: {0}")]
    Transport(String),

    /// The server replied with a status the verb does not accept.
    #[error("HTTP error {status} ({reason})")]
    Status {
        /// Numeric status code.
        status: u16,
        /// Reason phrase.
        reason: String,
    },

    /// A verb that requires a Multi-Status reply got something else.
    #[error("Expected status 207 (Multi-Status), but got {status} ({reason})")]
    ExpectedMultiStatus {
        /// Numeric status code.
        status: u16,
        /// Reason phrase.
        reason: String,
    },

    /// A 207 reply to a verb whose success is a plain 2xx; some resources failed.
    #[error("Operation failed for {} of {} resources", .0.failed_count(), .0.n_responses())]
    PartialFailure(Box<MultiStatus>),

    /// A completed operation was finished as a different verb.
    #[error("Operation result belongs to {actual}, not {expected}")]
    OperationMismatch {
        /// Verb the caller expected.
        expected: &'static str,
        /// Verb the operation was started for.
        actual: &'static str,
    },

    /// The operation was cancelled before it completed.
    #[error("Operation was cancelled")]
    Cancelled,

    /// A URL could not be parsed or resolved.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DavError {
    /// Returns the HTTP status carried by the error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } | Self::ExpectedMultiStatus { status, .. } => {
                Some(*status)
            }
            Self::PartialFailure(_) => Some(207),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for DavError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

impl From<reqwest::header::InvalidHeaderValue> for DavError {
    fn from(e: reqwest::header::InvalidHeaderValue) -> Self {
        Self::Config(format!("Invalid header value: {e}"))
    }
}

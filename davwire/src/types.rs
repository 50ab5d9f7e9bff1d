// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

use crate::error::ParseError;
use crate::flags::bit_flags;

/// An HTTP status code with its reason phrase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Status {
    /// Numeric code; zero when no status was reported.
    pub code: u16,
    /// Reason phrase, possibly empty.
    pub reason: String,
}

impl Status {
    /// Creates a status, filling in the canonical reason phrase when
    /// `reason` is empty.
    #[must_use]
    pub fn new(code: u16, reason: &str) -> Self {
        let reason = if reason.is_empty() {
            reqwest::StatusCode::from_u16(code)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or_default()
        } else {
            reason
        };
        Self {
            code,
            reason: reason.to_string(),
        }
    }

    /// Parses a status line such as `HTTP/1.1 404 Not Found`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::ContentViolation`] if the line is malformed.
    pub fn parse_line(line: &str) -> Result<Self, ParseError> {
        let invalid =
            || ParseError::ContentViolation(format!("Failed to parse status line '{line}'"));

        let (version, rest) = line.trim().split_once(' ').ok_or_else(invalid)?;
        if !version.starts_with("HTTP/") {
            return Err(invalid());
        }
        let rest = rest.trim_start();
        let (code, reason) = rest.split_at_checked(3).ok_or_else(invalid)?;
        if !code.bytes().all(|b| b.is_ascii_digit())
            || !(reason.is_empty() || reason.starts_with(' '))
        {
            return Err(invalid());
        }
        let code = code.parse().map_err(|_| invalid())?;
        Ok(Self {
            code,
            reason: reason.trim().to_string(),
        })
    }

    /// Whether the code is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code >= 200 && self.code < 300
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP/1.1 {} {}", self.code, self.reason)
    }
}

/// Value of the `Depth` request header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Depth {
    /// The resource only.
    Zero,
    /// The resource and its immediate members.
    One,
    /// The resource and all its descendants.
    Infinity,
}

impl Depth {
    /// Header encoding.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Zero => "0",
            Self::One => "1",
            Self::Infinity => "infinity",
        }
    }

    /// Parses the header encoding, case-insensitively for `infinity`.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "0" => Some(Self::Zero),
            "1" => Some(Self::One),
            t if t.eq_ignore_ascii_case("infinity") => Some(Self::Infinity),
            _ => None,
        }
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scope of a lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LockScope {
    /// Only one principal may hold the lock.
    #[default]
    Exclusive,
    /// Several principals may hold the lock.
    Shared,
}

impl LockScope {
    pub(crate) const fn element_name(self) -> &'static str {
        match self {
            Self::Exclusive => "exclusive",
            Self::Shared => "shared",
        }
    }
}

/// Type of a lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LockType {
    /// Not reported or not recognized.
    #[default]
    Unknown,
    /// A write lock, the only type WebDAV defines.
    Write,
}

/// Lifetime of a redirect reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RedirectLifetime {
    /// Left to the server.
    #[default]
    Unknown,
    /// Answered with 301.
    Permanent,
    /// Answered with 302.
    Temporary,
}

impl RedirectLifetime {
    /// Name of the empty `DAV:` element encoding this lifetime.
    #[must_use]
    pub const fn element_name(self) -> Option<&'static str> {
        match self {
            Self::Unknown => None,
            Self::Permanent => Some("permanent"),
            Self::Temporary => Some("temporary"),
        }
    }
}

/// Body mode of a PROPFIND request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropFindType {
    /// The named properties.
    Prop,
    /// All dead and live properties.
    AllProp,
    /// Property names only.
    PropName,
}

/// Options of a COPY request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CopyFlags {
    /// Fail instead of replacing an existing destination.
    pub no_overwrite: bool,
    /// Copy a collection without its members.
    pub collection_only: bool,
}

/// Options of a MOVE request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveFlags {
    /// Fail instead of replacing an existing destination.
    pub no_overwrite: bool,
}

/// Options of a LOCK request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockFlags {
    /// Lock a collection without its members.
    pub non_recursive: bool,
    /// Write the owner as an `href` when it parses as a URI.
    pub owner_is_uri: bool,
}

bit_flags! {
    /// Methods advertised in an `Allow` response header.
    pub struct Allow: u32 {
        /// `ACL`.
        const ACL = 1 << 0;
        /// `COPY`.
        const COPY = 1 << 1;
        /// `DELETE`.
        const DELETE = 1 << 2;
        /// `GET`.
        const GET = 1 << 3;
        /// `HEAD`.
        const HEAD = 1 << 4;
        /// `LOCK`.
        const LOCK = 1 << 5;
        /// `MKCALENDAR`.
        const MKCALENDAR = 1 << 6;
        /// `MKCOL`.
        const MKCOL = 1 << 7;
        /// `MOVE`.
        const MOVE = 1 << 8;
        /// `OPTIONS`.
        const OPTIONS = 1 << 9;
        /// `POST`.
        const POST = 1 << 10;
        /// `PROPFIND`.
        const PROPFIND = 1 << 11;
        /// `PROPPATCH`.
        const PROPPATCH = 1 << 12;
        /// `PUT`.
        const PUT = 1 << 13;
        /// `REPORT`.
        const REPORT = 1 << 14;
        /// `UNLOCK`.
        const UNLOCK = 1 << 15;
    }
}

impl Allow {
    const TOKENS: &[(Self, &'static str)] = &[
        (Self::ACL, "ACL"),
        (Self::COPY, "COPY"),
        (Self::DELETE, "DELETE"),
        (Self::GET, "GET"),
        (Self::HEAD, "HEAD"),
        (Self::LOCK, "LOCK"),
        (Self::MKCALENDAR, "MKCALENDAR"),
        (Self::MKCOL, "MKCOL"),
        (Self::MOVE, "MOVE"),
        (Self::OPTIONS, "OPTIONS"),
        (Self::POST, "POST"),
        (Self::PROPFIND, "PROPFIND"),
        (Self::PROPPATCH, "PROPPATCH"),
        (Self::PUT, "PUT"),
        (Self::REPORT, "REPORT"),
        (Self::UNLOCK, "UNLOCK"),
    ];

    /// Parses the values of one or more `Allow` headers.
    #[must_use]
    pub fn from_header_values<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        parse_tokens(values, Self::TOKENS)
    }
}

bit_flags! {
    /// Compliance classes and extensions advertised in a `DAV` response header.
    pub struct Compliance: u32 {
        /// Class 1.
        const CLASS_1 = 1 << 0;
        /// Class 2 (locking).
        const CLASS_2 = 1 << 1;
        /// Class 3 (RFC 4918).
        const CLASS_3 = 1 << 2;
        /// `access-control` (RFC 3744).
        const ACCESS_CONTROL = 1 << 3;
        /// `redirectrefs` (RFC 4437).
        const REDIRECT_REFS = 1 << 4;
        /// `version-control` (RFC 3253).
        const VERSION_CONTROL = 1 << 5;
        /// `calendar-access` (RFC 4791).
        const CALENDAR_ACCESS = 1 << 6;
        /// `calendar-schedule`.
        const CALENDAR_SCHEDULE = 1 << 7;
        /// `calendar-auto-schedule` (RFC 6638).
        const CALENDAR_AUTO_SCHEDULE = 1 << 8;
        /// `calendar-proxy`.
        const CALENDAR_PROXY = 1 << 9;
        /// `addressbook` (RFC 6352).
        const ADDRESSBOOK = 1 << 10;
    }
}

impl Compliance {
    const TOKENS: &[(Self, &'static str)] = &[
        (Self::CLASS_1, "1"),
        (Self::CLASS_2, "2"),
        (Self::CLASS_3, "3"),
        (Self::ACCESS_CONTROL, "access-control"),
        (Self::REDIRECT_REFS, "redirectrefs"),
        (Self::VERSION_CONTROL, "version-control"),
        (Self::CALENDAR_ACCESS, "calendar-access"),
        (Self::CALENDAR_SCHEDULE, "calendar-schedule"),
        (Self::CALENDAR_AUTO_SCHEDULE, "calendar-auto-schedule"),
        (Self::CALENDAR_PROXY, "calendar-proxy"),
        (Self::ADDRESSBOOK, "addressbook"),
    ];

    /// Parses the values of one or more `DAV` headers.
    #[must_use]
    pub fn from_header_values<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        parse_tokens(values, Self::TOKENS)
    }
}

fn parse_tokens<'a, F>(values: impl IntoIterator<Item = &'a str>, table: &[(F, &str)]) -> F
where
    F: Copy + Default + std::ops::BitOrAssign,
{
    let mut flags = F::default();
    for token in values.into_iter().flat_map(|v| v.split(',')).map(str::trim) {
        if let Some((flag, _)) = table.iter().find(|(_, name)| *name == token) {
            flags |= *flag;
        }
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_allow_across_headers() {
        let allow = Allow::from_header_values(["OPTIONS, GET,PROPFIND", "LOCK"]);
        assert!(allow.contains(Allow::PROPFIND | Allow::GET | Allow::LOCK));
        assert!(!allow.contains(Allow::MKCOL));
    }

    #[test]
    fn parses_compliance_classes() {
        let dav = Compliance::from_header_values(["1, 2, access-control, calendar-access"]);
        assert!(dav.contains(Compliance::CLASS_1 | Compliance::CLASS_2));
        assert!(dav.contains(Compliance::CALENDAR_ACCESS));
        assert!(!dav.contains(Compliance::CALENDAR_AUTO_SCHEDULE));
    }

    #[test]
    fn parses_status_lines() {
        let status = Status::parse_line(" HTTP/1.1 404 Not Found ").unwrap();
        assert_eq!(status.code, 404);
        assert_eq!(status.reason, "Not Found");
        assert!(!status.is_success());

        assert_eq!(Status::parse_line("HTTP/1.1 200").unwrap().code, 200);
        assert!(Status::parse_line("200 OK").is_err());
        assert!(Status::parse_line("HTTP/1.1 2000 OK").is_err());
        assert!(Status::parse_line("HTTP/1.1 abc OK").is_err());
    }

    #[test]
    fn fills_canonical_reason() {
        assert_eq!(Status::new(404, "").reason, "Not Found");
        assert_eq!(Status::new(207, "Done").reason, "Done");
    }

    #[test]
    fn depth_round_trips_header_text() {
        for depth in [Depth::Zero, Depth::One, Depth::Infinity] {
            assert_eq!(Depth::parse(depth.as_str()), Some(depth));
        }
        assert_eq!(Depth::parse("Infinity"), Some(Depth::Infinity));
        assert_eq!(Depth::parse("2"), None);
    }
}

// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Lock descriptions reported by `lockdiscovery` and `supportedlock`.

use std::fmt;

use reqwest::Url;

use crate::error::ParseError;
use crate::parsable::{
    PARSABLE, Parsable, ParsableType, TypeId, expect_type, ignore_unknown, resolve_href,
};
use crate::types::{Depth, LockScope, LockType};
use crate::xml::{Element, Node, XmlWriter, ns};

/// `DAV:activelock`.
pub static ACTIVE_LOCK: ParsableType =
    ParsableType::element("ActiveLock", ns::DAV, "activelock", TypeId::of(&PARSABLE));

/// `DAV:lockentry`.
pub static LOCK_ENTRY: ParsableType =
    ParsableType::element("LockEntry", ns::DAV, "lockentry", TypeId::of(&PARSABLE));

/// Lock timeout as carried by the `Timeout` header and `DAV:timeout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LockTimeout {
    /// Never expires.
    #[default]
    Infinite,
    /// Expires after the given number of seconds.
    Seconds(u32),
}

impl LockTimeout {
    /// Negative input means infinite; other values clamp to the `u32` range.
    #[must_use]
    pub fn from_seconds(seconds: i64) -> Self {
        if seconds < 0 {
            Self::Infinite
        } else {
            Self::Seconds(u32::try_from(seconds).unwrap_or(u32::MAX))
        }
    }

    /// Parses `Infinite` or `Second-<n>`; for a comma-separated list the
    /// first recognized entry wins.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        text.split(',').map(str::trim).find_map(|t| {
            if t.eq_ignore_ascii_case("infinite") {
                Some(Self::Infinite)
            } else {
                let n = t.strip_prefix("Second-")?;
                let n: u64 = n.parse().ok()?;
                Some(Self::Seconds(u32::try_from(n).unwrap_or(u32::MAX)))
            }
        })
    }
}

impl fmt::Display for LockTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Infinite => f.write_str("Infinite"),
            Self::Seconds(n) => write!(f, "Second-{n}"),
        }
    }
}

/// A lock currently held on a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveLock {
    /// Lock scope.
    pub scope: LockScope,
    /// Lock type.
    pub lock_type: LockType,
    /// Depth the lock applies to.
    pub depth: Depth,
    /// Owner text, or the owner's `href`.
    pub owner: Option<String>,
    /// Remaining lifetime.
    pub timeout: Option<LockTimeout>,
    /// Lock token URI.
    pub lock_token: Option<String>,
    /// Root of the locked tree.
    pub lock_root: Option<Url>,
}

impl Default for ActiveLock {
    fn default() -> Self {
        Self {
            scope: LockScope::default(),
            lock_type: LockType::default(),
            depth: Depth::Zero,
            owner: None,
            timeout: None,
            lock_token: None,
            lock_root: None,
        }
    }
}

impl Parsable for ActiveLock {
    fn instantiate(ty: TypeId) -> Result<Self, ParseError> {
        expect_type(ty, TypeId::of(&ACTIVE_LOCK))?;
        Ok(Self::default())
    }

    fn parsable_type(&self) -> TypeId {
        TypeId::of(&ACTIVE_LOCK)
    }

    fn deserialize(&mut self, base_uri: &Url, node: &Node) -> Result<(), ParseError> {
        let Node::Element(e) = node else {
            return ignore_unknown(self.parsable_type(), node);
        };
        if !e.in_namespace(ns::DAV) {
            return ignore_unknown(self.parsable_type(), node);
        }

        match e.name() {
            "lockscope" => self.scope = parse_scope(e).unwrap_or(self.scope),
            "locktype" => self.lock_type = parse_type(e),
            "depth" => {
                self.depth = Depth::parse(&e.text()).ok_or_else(|| invalid_content(e))?;
            }
            "owner" => {
                let owner = match e.elements().find(|c| c.is(ns::DAV, "href")) {
                    Some(href) => href.text(),
                    None => e.text(),
                };
                self.owner = Some(owner.trim().to_string());
            }
            "timeout" => {
                self.timeout = Some(LockTimeout::parse(&e.text()).ok_or_else(|| invalid_content(e))?);
            }
            "locktoken" => self.lock_token = href_text(e),
            "lockroot" => {
                if let Some(href) = href_text(e) {
                    self.lock_root = Some(resolve_href(base_uri, &href)?);
                }
            }
            _ => return ignore_unknown(self.parsable_type(), node),
        }
        Ok(())
    }

    fn serialize(&self, writer: &mut XmlWriter) -> Result<(), ParseError> {
        writer.start(ns::DAV, "activelock")?;
        write_scope_and_type(writer, self.scope, self.lock_type)?;
        writer.text_element(ns::DAV, "depth", self.depth.as_str())?;
        if let Some(owner) = &self.owner {
            writer.text_element(ns::DAV, "owner", owner)?;
        }
        if let Some(timeout) = self.timeout {
            writer.text_element(ns::DAV, "timeout", &timeout.to_string())?;
        }
        if let Some(token) = &self.lock_token {
            writer.start(ns::DAV, "locktoken")?;
            writer.text_element(ns::DAV, "href", token)?;
            writer.end(ns::DAV, "locktoken")?;
        }
        if let Some(root) = &self.lock_root {
            writer.start(ns::DAV, "lockroot")?;
            writer.text_element(ns::DAV, "href", root.as_str())?;
            writer.end(ns::DAV, "lockroot")?;
        }
        writer.end(ns::DAV, "activelock")
    }
}

/// A kind of lock a resource supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockEntry {
    /// Lock scope.
    pub scope: LockScope,
    /// Lock type.
    pub lock_type: LockType,
}

impl Parsable for LockEntry {
    fn instantiate(ty: TypeId) -> Result<Self, ParseError> {
        expect_type(ty, TypeId::of(&LOCK_ENTRY))?;
        Ok(Self::default())
    }

    fn parsable_type(&self) -> TypeId {
        TypeId::of(&LOCK_ENTRY)
    }

    fn deserialize(&mut self, _base_uri: &Url, node: &Node) -> Result<(), ParseError> {
        match node {
            Node::Element(e) if e.is(ns::DAV, "lockscope") => {
                self.scope = parse_scope(e).unwrap_or(self.scope);
                Ok(())
            }
            Node::Element(e) if e.is(ns::DAV, "locktype") => {
                self.lock_type = parse_type(e);
                Ok(())
            }
            _ => ignore_unknown(self.parsable_type(), node),
        }
    }

    fn serialize(&self, writer: &mut XmlWriter) -> Result<(), ParseError> {
        writer.start(ns::DAV, "lockentry")?;
        write_scope_and_type(writer, self.scope, self.lock_type)?;
        writer.end(ns::DAV, "lockentry")
    }
}

fn parse_scope(e: &Element) -> Option<LockScope> {
    e.elements().find_map(|c| {
        if c.is(ns::DAV, "exclusive") {
            Some(LockScope::Exclusive)
        } else if c.is(ns::DAV, "shared") {
            Some(LockScope::Shared)
        } else {
            None
        }
    })
}

fn parse_type(e: &Element) -> LockType {
    if e.elements().any(|c| c.is(ns::DAV, "write")) {
        LockType::Write
    } else {
        LockType::Unknown
    }
}

fn href_text(e: &Element) -> Option<String> {
    e.elements()
        .find(|c| c.is(ns::DAV, "href"))
        .map(|href| href.text().trim().to_string())
}

fn invalid_content(e: &Element) -> ParseError {
    ParseError::ContentViolation(format!(
        "The content of a {e} element (\"{}\") was unknown",
        e.text().trim()
    ))
}

pub(crate) fn write_scope_and_type(
    writer: &mut XmlWriter,
    scope: LockScope,
    lock_type: LockType,
) -> Result<(), ParseError> {
    writer.start(ns::DAV, "lockscope")?;
    writer.empty(ns::DAV, scope.element_name())?;
    writer.end(ns::DAV, "lockscope")?;

    writer.start(ns::DAV, "locktype")?;
    if lock_type == LockType::Write {
        writer.empty(ns::DAV, "write")?;
    }
    writer.end(ns::DAV, "locktype")
}

// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Request builders for WebDAV methods.
//!
//! Each builder produces a [`DavRequest`]: method, target URL, headers and
//! an optional XML body. Every request carries `Cache-Control: no-cache`
//! and `Pragma: no-cache` (RFC 4918 section 10.4.5).

use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, PRAGMA};
use reqwest::{Method, Url};

use crate::error::{DavError, ParseError};
use crate::lock::{LockTimeout, write_scope_and_type};
use crate::parsable::{Parsable, TypeSet, to_bytes};
use crate::property_set::PropertySet;
use crate::property_update::PropertyUpdate;
use crate::types::{
    CopyFlags, Depth, LockFlags, LockScope, LockType, MoveFlags, PropFindType, RedirectLifetime,
};
use crate::xml::{XmlWriter, ns};

const DEPTH: HeaderName = HeaderName::from_static("depth");
const DESTINATION: HeaderName = HeaderName::from_static("destination");
const OVERWRITE: HeaderName = HeaderName::from_static("overwrite");
const TIMEOUT: HeaderName = HeaderName::from_static("timeout");
const LOCK_TOKEN: HeaderName = HeaderName::from_static("lock-token");
const IF: HeaderName = HeaderName::from_static("if");
const APPLY_TO_REDIRECT_REF: HeaderName = HeaderName::from_static("apply-to-redirect-ref");

const XML_CONTENT_TYPE: &str = "application/xml";

/// A WebDAV request ready to be sent.
#[derive(Debug, Clone)]
pub struct DavRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl DavRequest {
    fn basic(method: Method, url: Url) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        Self {
            method,
            url,
            headers,
            body: None,
        }
    }

    fn extension(method: &'static str, url: Url) -> Result<Self, DavError> {
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|e| DavError::Config(format!("Invalid method {method}: {e}")))?;
        Ok(Self::basic(method, url))
    }

    fn with_body(mut self, body: Vec<u8>) -> Self {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(XML_CONTENT_TYPE));
        self.body = Some(body);
        self.log();
        self
    }

    fn log(&self) {
        tracing::debug!(
            method = %self.method,
            url = %self.url,
            body_len = self.body.as_ref().map_or(0, Vec::len),
            "built WebDAV request"
        );
    }

    fn set_header(&mut self, name: HeaderName, value: &str) -> Result<(), DavError> {
        self.headers.insert(name, HeaderValue::from_str(value)?);
        Ok(())
    }

    fn set_depth(&mut self, depth: Depth) {
        self.headers
            .insert(DEPTH, HeaderValue::from_static(depth.as_str()));
    }

    fn set_timeout(&mut self, timeout: LockTimeout) -> Result<(), DavError> {
        self.set_header(TIMEOUT, &timeout.to_string())
    }

    /// `OPTIONS`.
    #[must_use]
    pub fn options(url: Url) -> Self {
        let request = Self::basic(Method::OPTIONS, url);
        request.log();
        request
    }

    /// `PROPFIND` with the given body mode.
    ///
    /// In [`PropFindType::Prop`] mode the properties of `prop` are requested
    /// by name; without a property set the request falls back to `allprop`.
    ///
    /// # Errors
    ///
    /// Returns an error if the property set cannot be serialized.
    pub fn propfind(
        url: Url,
        kind: PropFindType,
        prop: Option<&PropertySet>,
        depth: Depth,
    ) -> Result<Self, DavError> {
        let mut request = Self::extension("PROPFIND", url)?;
        request.set_depth(depth);

        let body = match (kind, prop) {
            (PropFindType::Prop, Some(prop)) => {
                let mut names = prop.clone();
                names.set_names_only(true);
                let mut types = TypeSet::new();
                names.collect_types(&mut types);

                let namespaces = types.namespaces();
                let mut writer = XmlWriter::new(namespaces.iter().copied())?;
                writer.start(ns::DAV, "propfind")?;
                names.serialize(&mut writer)?;
                writer.end(ns::DAV, "propfind")?;
                writer.into_bytes()
            }
            (PropFindType::Prop | PropFindType::AllProp, _) => {
                dav_document("propfind", |w| w.empty(ns::DAV, "allprop"))?
            }
            (PropFindType::PropName, _) => {
                dav_document("propfind", |w| w.empty(ns::DAV, "propname"))?
            }
        };
        Ok(request.with_body(body))
    }

    /// `PROPPATCH` applying `update`.
    ///
    /// # Errors
    ///
    /// Returns an error if the update cannot be serialized.
    pub fn proppatch(url: Url, update: &PropertyUpdate) -> Result<Self, DavError> {
        let request = Self::extension("PROPPATCH", url)?;
        Ok(request.with_body(to_bytes(update)?))
    }

    /// `MKCOL`.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in method name.
    pub fn mkcol(url: Url) -> Result<Self, DavError> {
        let request = Self::extension("MKCOL", url)?;
        request.log();
        Ok(request)
    }

    /// `DELETE`.
    #[must_use]
    pub fn delete(url: Url) -> Self {
        let request = Self::basic(Method::DELETE, url);
        request.log();
        request
    }

    /// `COPY` to `destination`.
    ///
    /// # Errors
    ///
    /// Returns an error if `destination` is not a valid header value.
    pub fn copy_to(url: Url, destination: &Url, flags: CopyFlags) -> Result<Self, DavError> {
        let mut request = Self::extension("COPY", url)?;
        request.set_header(DESTINATION, destination.as_str())?;
        if flags.no_overwrite {
            request.set_header(OVERWRITE, "F")?;
        }
        if flags.collection_only {
            request.set_depth(Depth::Zero);
        }
        request.log();
        Ok(request)
    }

    /// `MOVE` to `destination`.
    ///
    /// # Errors
    ///
    /// Returns an error if `destination` is not a valid header value.
    pub fn move_to(url: Url, destination: &Url, flags: MoveFlags) -> Result<Self, DavError> {
        let mut request = Self::extension("MOVE", url)?;
        request.set_header(DESTINATION, destination.as_str())?;
        if flags.no_overwrite {
            request.set_header(OVERWRITE, "F")?;
        }
        request.log();
        Ok(request)
    }

    /// `LOCK` creating a new lock.
    ///
    /// The owner is written as an `href` when [`LockFlags::owner_is_uri`]
    /// is set and it parses as a URI, otherwise as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be serialized.
    pub fn lock(
        url: Url,
        scope: LockScope,
        flags: LockFlags,
        owner: Option<&str>,
        timeout: LockTimeout,
    ) -> Result<Self, DavError> {
        let mut request = Self::extension("LOCK", url)?;
        request.set_timeout(timeout)?;
        if flags.non_recursive {
            request.set_depth(Depth::Zero);
        }

        let body = dav_document("lockinfo", |w| {
            // Write is the only lock type RFC 4918 defines.
            write_scope_and_type(w, scope, LockType::Write)?;
            match owner {
                Some(owner) if flags.owner_is_uri && Url::parse(owner).is_ok() => {
                    w.start(ns::DAV, "owner")?;
                    w.text_element(ns::DAV, "href", owner)?;
                    w.end(ns::DAV, "owner")
                }
                Some(owner) => w.text_element(ns::DAV, "owner", owner),
                None => Ok(()),
            }
        })?;
        Ok(request.with_body(body))
    }

    /// `LOCK` refreshing the lock identified by `lock_token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value.
    pub fn lock_refresh(url: Url, lock_token: &str, timeout: LockTimeout) -> Result<Self, DavError> {
        let mut request = Self::extension("LOCK", url)?;
        request.set_timeout(timeout)?;
        request.set_header(IF, &format!("(<{lock_token}>)"))?;
        request.log();
        Ok(request)
    }

    /// `UNLOCK` releasing `lock_token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value.
    pub fn unlock(url: Url, lock_token: &str) -> Result<Self, DavError> {
        let mut request = Self::extension("UNLOCK", url)?;
        request.set_header(LOCK_TOKEN, &format!("<{lock_token}>"))?;
        request.log();
        Ok(request)
    }

    /// `MKREDIRECTREF` (RFC 4437).
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be serialized.
    pub fn mkredirectref(
        url: Url,
        target: Option<&Url>,
        lifetime: RedirectLifetime,
    ) -> Result<Self, DavError> {
        let request = Self::extension("MKREDIRECTREF", url)?;
        let body = redirect_document("mkredirectref", target, lifetime)?;
        Ok(request.with_body(body))
    }

    /// `UPDATEREDIRECTREF` (RFC 4437), applied to the reference itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be serialized.
    pub fn updateredirectref(
        url: Url,
        target: Option<&Url>,
        lifetime: RedirectLifetime,
    ) -> Result<Self, DavError> {
        let mut request = Self::extension("UPDATEREDIRECTREF", url)?;
        request.apply_to_redirect_ref(true);
        let body = redirect_document("updateredirectref", target, lifetime)?;
        Ok(request.with_body(body))
    }

    /// Appends a tagged lock token to the `If` header.
    ///
    /// The tag defaults to the request URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the result is not a valid header value.
    pub fn add_lock_token(
        &mut self,
        resource_tag: Option<&str>,
        lock_token: &str,
    ) -> Result<(), DavError> {
        let mut list = self
            .header(IF.as_str())
            .map(str::to_string)
            .unwrap_or_default();
        if !list.is_empty() {
            list.push(' ');
        }
        let tag = resource_tag.unwrap_or(self.url.as_str());
        list.push_str(&format!("<{tag}> (<{lock_token}>)"));
        self.set_header(IF, &list)
    }

    /// Sets `Apply-To-Redirect-Ref`.
    pub fn apply_to_redirect_ref(&mut self, apply: bool) {
        let value = if apply { "T" } else { "F" };
        self.headers
            .insert(APPLY_TO_REDIRECT_REF, HeaderValue::from_static(value));
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Target URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Request headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Value of header `name`, if present and textual.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// XML body, if the method carries one.
    #[must_use]
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Body as text, for logging and tests.
    #[must_use]
    pub fn body_text(&self) -> Option<String> {
        self.body
            .as_deref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    pub(crate) fn into_parts(self) -> (Method, Url, HeaderMap, Option<Vec<u8>>) {
        (self.method, self.url, self.headers, self.body)
    }
}

/// Writes a document whose root is `DAV:<root>` and which only uses `DAV:`.
fn dav_document(
    root: &str,
    content: impl FnOnce(&mut XmlWriter) -> Result<(), ParseError>,
) -> Result<Vec<u8>, ParseError> {
    let mut writer = XmlWriter::new(std::iter::empty())?;
    writer.start(ns::DAV, root)?;
    content(&mut writer)?;
    writer.end(ns::DAV, root)?;
    Ok(writer.into_bytes())
}

fn redirect_document(
    root: &str,
    target: Option<&Url>,
    lifetime: RedirectLifetime,
) -> Result<Vec<u8>, ParseError> {
    let mut writer = XmlWriter::new(std::iter::empty())?;
    let child = lifetime.element_name();
    if target.is_none() && child.is_none() {
        writer.empty(ns::DAV, root)?;
        return Ok(writer.into_bytes());
    }

    writer.start(ns::DAV, root)?;
    if let Some(target) = target {
        writer.start(ns::DAV, "reftarget")?;
        writer.text_element(ns::DAV, "href", target.as_str())?;
        writer.end(ns::DAV, "reftarget")?;
    }
    if let Some(child) = child {
        writer.start(ns::DAV, "redirect-lifetime")?;
        writer.empty(ns::DAV, child)?;
        writer.end(ns::DAV, "redirect-lifetime")?;
    }
    writer.end(ns::DAV, root)?;
    Ok(writer.into_bytes())
}

// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! WebDAV client exposing each verb as async, started and blocking calls.

use std::sync::Arc;

use reqwest::Url;
use tokio_util::sync::CancellationToken;

use crate::catalog::LOCK_DISCOVERY;
use crate::config::DavConfig;
use crate::error::DavError;
use crate::http::{HttpClient, RawResponse};
use crate::lock::{ActiveLock, LockTimeout};
use crate::multi_status::{MULTI_STATUS_CODE, MultiStatus};
use crate::parsable::{TypeId, new_from_bytes};
use crate::property_set::{PROP, PropertySet};
use crate::property_update::PropertyUpdate;
use crate::request::DavRequest;
use crate::task::{AsyncResult, Callback, Operation, Verb, block_on_operation, run_cancellable};
use crate::types::{
    Allow, Compliance, CopyFlags, Depth, LockFlags, LockScope, MoveFlags, PropFindType,
    RedirectLifetime,
};
use crate::value::{Object, Value};

/// Turns a reply into the typed result of a verb.
type Interpret<T> = fn(&Url, RawResponse) -> Result<T, DavError>;

/// Server capabilities advertised in an `OPTIONS` reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// Methods from the `Allow` header.
    pub allow: Allow,
    /// Compliance classes from the `DAV` header.
    pub compliance: Compliance,
}

/// Result of a successful `LOCK` or lock refresh.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LockResult {
    /// Token from the `Lock-Token` header, without angle brackets.
    ///
    /// Servers only send it when a lock is created.
    pub lock_token: Option<String>,
    /// Locks listed in the `DAV:lockdiscovery` property of the reply.
    pub active_locks: Vec<ActiveLock>,
}

impl LockResult {
    /// The active lock carrying `token`, if listed.
    #[must_use]
    pub fn active_lock(&self, token: &str) -> Option<&ActiveLock> {
        self.active_locks
            .iter()
            .find(|lock| lock.lock_token.as_deref() == Some(token))
    }
}

/// WebDAV client.
///
/// Every verb comes in four forms:
///
/// - `verb(..)`: an async call;
/// - `verb_start(.., cancel, callback)`: returns an [`Operation`] that the
///   caller drives and that hands an [`AsyncResult`] to `callback`;
/// - `verb_finish(result)`: extracts the typed result of a started call;
/// - `verb_blocking(.., cancel)`: runs the started call on a private
///   runtime and waits for it.
///
/// Targets are hrefs resolved against the configured base URL.
///
/// # Example
///
/// ```ignore
/// use davwire::{AuthMethod, DavClient, DavConfig, Depth, PropFindType, PropertySet, TypeId};
/// use davwire::catalog::DISPLAY_NAME;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = DavClient::new(DavConfig {
///     base_url: "https://dav.example.com/".to_string(),
///     auth: AuthMethod::Basic {
///         username: "user".to_string(),
///         password: "pass".to_string(),
///     },
///     ..Default::default()
/// })?;
///
/// let props = PropertySet::from_types([TypeId::of(&DISPLAY_NAME)])?;
/// let ms = client
///     .propfind("calendars/", PropFindType::Prop, Some(&props), Depth::One)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DavClient {
    http: Arc<HttpClient>,
    base_url: Url,
}

impl DavClient {
    /// Creates a new WebDAV client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or HTTP client
    /// initialization fails.
    pub fn new(config: DavConfig) -> Result<Self, DavError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| DavError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        let http = HttpClient::new(config)?;
        Ok(Self {
            http: Arc::new(http),
            base_url,
        })
    }

    /// Base URL hrefs are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves `href` against the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if `href` cannot be resolved.
    pub fn resolve(&self, href: &str) -> Result<Url, DavError> {
        self.base_url
            .join(href)
            .map_err(|e| DavError::InvalidUrl(format!("{href}: {e}")))
    }

    /// Sends a request built by the caller and returns the raw reply.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails.
    pub async fn send(&self, request: DavRequest) -> Result<RawResponse, DavError> {
        self.http.execute(request).await
    }

    fn start<T: Send + 'static>(
        &self,
        verb: Verb,
        request: Result<DavRequest, DavError>,
        interpret: Interpret<T>,
        cancel: Option<CancellationToken>,
        callback: Callback<T>,
    ) -> Operation {
        let http = Arc::clone(&self.http);
        Box::pin(async move {
            let result = match request {
                Ok(request) => run_cancellable(perform(&http, request, interpret), cancel).await,
                Err(e) => Err(e),
            };
            if let Err(e) = &result {
                tracing::debug!(%verb, error = %e, "WebDAV operation failed");
            }
            callback(AsyncResult::new(verb, result));
        })
    }

    // OPTIONS

    /// `OPTIONS`: methods and compliance classes the server supports.
    ///
    /// # Errors
    ///
    /// Returns an error on a non-2xx reply or transport failure.
    pub async fn options(&self, href: &str) -> Result<Capabilities, DavError> {
        let request = DavRequest::options(self.resolve(href)?);
        perform(&self.http, request, interpret_options).await
    }

    /// Starts an `OPTIONS` call.
    pub fn options_start(
        &self,
        href: &str,
        cancel: Option<CancellationToken>,
        callback: Callback<Capabilities>,
    ) -> Operation {
        let request = self.resolve(href).map(DavRequest::options);
        self.start(Verb::Options, request, interpret_options, cancel, callback)
    }

    /// Finishes an `OPTIONS` call.
    ///
    /// # Errors
    ///
    /// Returns the error of the call, or a mismatch if `result` belongs to
    /// another verb.
    pub fn options_finish(result: AsyncResult<Capabilities>) -> Result<Capabilities, DavError> {
        result.finish(Verb::Options)
    }

    /// Blocking `OPTIONS`.
    ///
    /// # Errors
    ///
    /// Same as [`DavClient::options`], or a configuration error when called
    /// inside an async runtime.
    pub fn options_blocking(
        &self,
        href: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Capabilities, DavError> {
        block_on_operation(Verb::Options, |callback| {
            self.options_start(href, cancel.cloned(), callback)
        })
    }

    // PROPFIND

    /// `PROPFIND`: reads properties of `href` and, with a depth, its members.
    ///
    /// # Errors
    ///
    /// Returns an error if the reply is not a 207 Multi-Status or its body
    /// is malformed.
    pub async fn propfind(
        &self,
        href: &str,
        kind: PropFindType,
        prop: Option<&PropertySet>,
        depth: Depth,
    ) -> Result<MultiStatus, DavError> {
        let request = DavRequest::propfind(self.resolve(href)?, kind, prop, depth)?;
        perform(&self.http, request, interpret_multi_status).await
    }

    /// Starts a `PROPFIND` call.
    pub fn propfind_start(
        &self,
        href: &str,
        kind: PropFindType,
        prop: Option<&PropertySet>,
        depth: Depth,
        cancel: Option<CancellationToken>,
        callback: Callback<MultiStatus>,
    ) -> Operation {
        let request = self
            .resolve(href)
            .and_then(|url| DavRequest::propfind(url, kind, prop, depth));
        self.start(Verb::PropFind, request, interpret_multi_status, cancel, callback)
    }

    /// Finishes a `PROPFIND` call.
    ///
    /// # Errors
    ///
    /// Returns the error of the call, or a mismatch if `result` belongs to
    /// another verb.
    pub fn propfind_finish(result: AsyncResult<MultiStatus>) -> Result<MultiStatus, DavError> {
        result.finish(Verb::PropFind)
    }

    /// Blocking `PROPFIND`.
    ///
    /// # Errors
    ///
    /// Same as [`DavClient::propfind`], or a configuration error when called
    /// inside an async runtime.
    pub fn propfind_blocking(
        &self,
        href: &str,
        kind: PropFindType,
        prop: Option<&PropertySet>,
        depth: Depth,
        cancel: Option<&CancellationToken>,
    ) -> Result<MultiStatus, DavError> {
        block_on_operation(Verb::PropFind, |callback| {
            self.propfind_start(href, kind, prop, depth, cancel.cloned(), callback)
        })
    }

    // PROPPATCH

    /// `PROPPATCH`: applies `update` to the properties of `href`.
    ///
    /// # Errors
    ///
    /// Returns an error if the reply is not a 207 Multi-Status or its body
    /// is malformed.
    pub async fn proppatch(
        &self,
        href: &str,
        update: &PropertyUpdate,
    ) -> Result<MultiStatus, DavError> {
        let request = DavRequest::proppatch(self.resolve(href)?, update)?;
        perform(&self.http, request, interpret_multi_status).await
    }

    /// Starts a `PROPPATCH` call.
    pub fn proppatch_start(
        &self,
        href: &str,
        update: &PropertyUpdate,
        cancel: Option<CancellationToken>,
        callback: Callback<MultiStatus>,
    ) -> Operation {
        let request = self
            .resolve(href)
            .and_then(|url| DavRequest::proppatch(url, update));
        self.start(Verb::PropPatch, request, interpret_multi_status, cancel, callback)
    }

    /// Finishes a `PROPPATCH` call.
    ///
    /// # Errors
    ///
    /// Returns the error of the call, or a mismatch if `result` belongs to
    /// another verb.
    pub fn proppatch_finish(result: AsyncResult<MultiStatus>) -> Result<MultiStatus, DavError> {
        result.finish(Verb::PropPatch)
    }

    /// Blocking `PROPPATCH`.
    ///
    /// # Errors
    ///
    /// Same as [`DavClient::proppatch`], or a configuration error when
    /// called inside an async runtime.
    pub fn proppatch_blocking(
        &self,
        href: &str,
        update: &PropertyUpdate,
        cancel: Option<&CancellationToken>,
    ) -> Result<MultiStatus, DavError> {
        block_on_operation(Verb::PropPatch, |callback| {
            self.proppatch_start(href, update, cancel.cloned(), callback)
        })
    }

    // MKCOL

    /// `MKCOL`: creates a collection.
    ///
    /// # Errors
    ///
    /// Returns an error on a non-2xx reply.
    pub async fn mkcol(&self, href: &str) -> Result<(), DavError> {
        let request = DavRequest::mkcol(self.resolve(href)?)?;
        perform(&self.http, request, interpret_success).await
    }

    /// Starts a `MKCOL` call.
    pub fn mkcol_start(
        &self,
        href: &str,
        cancel: Option<CancellationToken>,
        callback: Callback<()>,
    ) -> Operation {
        let request = self.resolve(href).and_then(DavRequest::mkcol);
        self.start(Verb::MkCol, request, interpret_success, cancel, callback)
    }

    /// Finishes a `MKCOL` call.
    ///
    /// # Errors
    ///
    /// Returns the error of the call, or a mismatch if `result` belongs to
    /// another verb.
    pub fn mkcol_finish(result: AsyncResult<()>) -> Result<(), DavError> {
        result.finish(Verb::MkCol)
    }

    /// Blocking `MKCOL`.
    ///
    /// # Errors
    ///
    /// Same as [`DavClient::mkcol`], or a configuration error when called
    /// inside an async runtime.
    pub fn mkcol_blocking(
        &self,
        href: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<(), DavError> {
        block_on_operation(Verb::MkCol, |callback| {
            self.mkcol_start(href, cancel.cloned(), callback)
        })
    }

    // DELETE

    /// `DELETE`: removes a resource or collection.
    ///
    /// # Errors
    ///
    /// Returns [`DavError::PartialFailure`] when some members could not be
    /// deleted, or an error on any other non-2xx reply.
    pub async fn delete(&self, href: &str) -> Result<(), DavError> {
        let request = DavRequest::delete(self.resolve(href)?);
        perform(&self.http, request, interpret_uniform_success).await
    }

    /// Starts a `DELETE` call.
    pub fn delete_start(
        &self,
        href: &str,
        cancel: Option<CancellationToken>,
        callback: Callback<()>,
    ) -> Operation {
        let request = self.resolve(href).map(DavRequest::delete);
        self.start(Verb::Delete, request, interpret_uniform_success, cancel, callback)
    }

    /// Finishes a `DELETE` call.
    ///
    /// # Errors
    ///
    /// Returns the error of the call, or a mismatch if `result` belongs to
    /// another verb.
    pub fn delete_finish(result: AsyncResult<()>) -> Result<(), DavError> {
        result.finish(Verb::Delete)
    }

    /// Blocking `DELETE`.
    ///
    /// # Errors
    ///
    /// Same as [`DavClient::delete`], or a configuration error when called
    /// inside an async runtime.
    pub fn delete_blocking(
        &self,
        href: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<(), DavError> {
        block_on_operation(Verb::Delete, |callback| {
            self.delete_start(href, cancel.cloned(), callback)
        })
    }

    // COPY

    /// `COPY`: copies `href` to `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`DavError::PartialFailure`] when some members could not be
    /// copied, or an error on any other non-2xx reply.
    pub async fn copy(
        &self,
        href: &str,
        destination: &str,
        flags: CopyFlags,
    ) -> Result<(), DavError> {
        let request = self.copy_request(href, destination, flags)?;
        perform(&self.http, request, interpret_uniform_success).await
    }

    /// Starts a `COPY` call.
    pub fn copy_start(
        &self,
        href: &str,
        destination: &str,
        flags: CopyFlags,
        cancel: Option<CancellationToken>,
        callback: Callback<()>,
    ) -> Operation {
        let request = self.copy_request(href, destination, flags);
        self.start(Verb::Copy, request, interpret_uniform_success, cancel, callback)
    }

    /// Finishes a `COPY` call.
    ///
    /// # Errors
    ///
    /// Returns the error of the call, or a mismatch if `result` belongs to
    /// another verb.
    pub fn copy_finish(result: AsyncResult<()>) -> Result<(), DavError> {
        result.finish(Verb::Copy)
    }

    /// Blocking `COPY`.
    ///
    /// # Errors
    ///
    /// Same as [`DavClient::copy`], or a configuration error when called
    /// inside an async runtime.
    pub fn copy_blocking(
        &self,
        href: &str,
        destination: &str,
        flags: CopyFlags,
        cancel: Option<&CancellationToken>,
    ) -> Result<(), DavError> {
        block_on_operation(Verb::Copy, |callback| {
            self.copy_start(href, destination, flags, cancel.cloned(), callback)
        })
    }

    fn copy_request(
        &self,
        href: &str,
        destination: &str,
        flags: CopyFlags,
    ) -> Result<DavRequest, DavError> {
        DavRequest::copy_to(self.resolve(href)?, &self.resolve(destination)?, flags)
    }

    // MOVE

    /// `MOVE`: moves `href` to `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`DavError::PartialFailure`] when some members could not be
    /// moved, or an error on any other non-2xx reply.
    pub async fn move_to(
        &self,
        href: &str,
        destination: &str,
        flags: MoveFlags,
    ) -> Result<(), DavError> {
        let request = self.move_request(href, destination, flags)?;
        perform(&self.http, request, interpret_uniform_success).await
    }

    /// Starts a `MOVE` call.
    pub fn move_start(
        &self,
        href: &str,
        destination: &str,
        flags: MoveFlags,
        cancel: Option<CancellationToken>,
        callback: Callback<()>,
    ) -> Operation {
        let request = self.move_request(href, destination, flags);
        self.start(Verb::Move, request, interpret_uniform_success, cancel, callback)
    }

    /// Finishes a `MOVE` call.
    ///
    /// # Errors
    ///
    /// Returns the error of the call, or a mismatch if `result` belongs to
    /// another verb.
    pub fn move_finish(result: AsyncResult<()>) -> Result<(), DavError> {
        result.finish(Verb::Move)
    }

    /// Blocking `MOVE`.
    ///
    /// # Errors
    ///
    /// Same as [`DavClient::move_to`], or a configuration error when called
    /// inside an async runtime.
    pub fn move_blocking(
        &self,
        href: &str,
        destination: &str,
        flags: MoveFlags,
        cancel: Option<&CancellationToken>,
    ) -> Result<(), DavError> {
        block_on_operation(Verb::Move, |callback| {
            self.move_start(href, destination, flags, cancel.cloned(), callback)
        })
    }

    fn move_request(
        &self,
        href: &str,
        destination: &str,
        flags: MoveFlags,
    ) -> Result<DavRequest, DavError> {
        DavRequest::move_to(self.resolve(href)?, &self.resolve(destination)?, flags)
    }

    // LOCK

    /// `LOCK`: creates a write lock on `href`.
    ///
    /// # Errors
    ///
    /// Returns [`DavError::PartialFailure`] when some members could not be
    /// locked, or an error on any other non-2xx reply.
    pub async fn lock(
        &self,
        href: &str,
        scope: LockScope,
        flags: LockFlags,
        owner: Option<&str>,
        timeout: LockTimeout,
    ) -> Result<LockResult, DavError> {
        let request = DavRequest::lock(self.resolve(href)?, scope, flags, owner, timeout)?;
        perform(&self.http, request, interpret_lock).await
    }

    /// Starts a `LOCK` call.
    #[allow(clippy::too_many_arguments)]
    pub fn lock_start(
        &self,
        href: &str,
        scope: LockScope,
        flags: LockFlags,
        owner: Option<&str>,
        timeout: LockTimeout,
        cancel: Option<CancellationToken>,
        callback: Callback<LockResult>,
    ) -> Operation {
        let request = self
            .resolve(href)
            .and_then(|url| DavRequest::lock(url, scope, flags, owner, timeout));
        self.start(Verb::Lock, request, interpret_lock, cancel, callback)
    }

    /// Finishes a `LOCK` call.
    ///
    /// # Errors
    ///
    /// Returns the error of the call, or a mismatch if `result` belongs to
    /// another verb.
    pub fn lock_finish(result: AsyncResult<LockResult>) -> Result<LockResult, DavError> {
        result.finish(Verb::Lock)
    }

    /// Blocking `LOCK`.
    ///
    /// # Errors
    ///
    /// Same as [`DavClient::lock`], or a configuration error when called
    /// inside an async runtime.
    pub fn lock_blocking(
        &self,
        href: &str,
        scope: LockScope,
        flags: LockFlags,
        owner: Option<&str>,
        timeout: LockTimeout,
        cancel: Option<&CancellationToken>,
    ) -> Result<LockResult, DavError> {
        block_on_operation(Verb::Lock, |callback| {
            self.lock_start(href, scope, flags, owner, timeout, cancel.cloned(), callback)
        })
    }

    // LOCK (refresh)

    /// `LOCK` refreshing the lock identified by `lock_token`.
    ///
    /// # Errors
    ///
    /// Returns an error on a non-2xx or 207 reply.
    pub async fn lock_refresh(
        &self,
        href: &str,
        lock_token: &str,
        timeout: LockTimeout,
    ) -> Result<LockResult, DavError> {
        let request = DavRequest::lock_refresh(self.resolve(href)?, lock_token, timeout)?;
        perform(&self.http, request, interpret_lock).await
    }

    /// Starts a lock refresh call.
    pub fn lock_refresh_start(
        &self,
        href: &str,
        lock_token: &str,
        timeout: LockTimeout,
        cancel: Option<CancellationToken>,
        callback: Callback<LockResult>,
    ) -> Operation {
        let request = self
            .resolve(href)
            .and_then(|url| DavRequest::lock_refresh(url, lock_token, timeout));
        self.start(Verb::LockRefresh, request, interpret_lock, cancel, callback)
    }

    /// Finishes a lock refresh call.
    ///
    /// # Errors
    ///
    /// Returns the error of the call, or a mismatch if `result` belongs to
    /// another verb.
    pub fn lock_refresh_finish(result: AsyncResult<LockResult>) -> Result<LockResult, DavError> {
        result.finish(Verb::LockRefresh)
    }

    /// Blocking lock refresh.
    ///
    /// # Errors
    ///
    /// Same as [`DavClient::lock_refresh`], or a configuration error when
    /// called inside an async runtime.
    pub fn lock_refresh_blocking(
        &self,
        href: &str,
        lock_token: &str,
        timeout: LockTimeout,
        cancel: Option<&CancellationToken>,
    ) -> Result<LockResult, DavError> {
        block_on_operation(Verb::LockRefresh, |callback| {
            self.lock_refresh_start(href, lock_token, timeout, cancel.cloned(), callback)
        })
    }

    // UNLOCK

    /// `UNLOCK`: releases `lock_token`.
    ///
    /// # Errors
    ///
    /// Returns an error on a non-2xx reply.
    pub async fn unlock(&self, href: &str, lock_token: &str) -> Result<(), DavError> {
        let request = DavRequest::unlock(self.resolve(href)?, lock_token)?;
        perform(&self.http, request, interpret_success).await
    }

    /// Starts an `UNLOCK` call.
    pub fn unlock_start(
        &self,
        href: &str,
        lock_token: &str,
        cancel: Option<CancellationToken>,
        callback: Callback<()>,
    ) -> Operation {
        let request = self
            .resolve(href)
            .and_then(|url| DavRequest::unlock(url, lock_token));
        self.start(Verb::Unlock, request, interpret_success, cancel, callback)
    }

    /// Finishes an `UNLOCK` call.
    ///
    /// # Errors
    ///
    /// Returns the error of the call, or a mismatch if `result` belongs to
    /// another verb.
    pub fn unlock_finish(result: AsyncResult<()>) -> Result<(), DavError> {
        result.finish(Verb::Unlock)
    }

    /// Blocking `UNLOCK`.
    ///
    /// # Errors
    ///
    /// Same as [`DavClient::unlock`], or a configuration error when called
    /// inside an async runtime.
    pub fn unlock_blocking(
        &self,
        href: &str,
        lock_token: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<(), DavError> {
        block_on_operation(Verb::Unlock, |callback| {
            self.unlock_start(href, lock_token, cancel.cloned(), callback)
        })
    }

    // MKREDIRECTREF

    /// `MKREDIRECTREF`: creates a redirect reference to `target`.
    ///
    /// # Errors
    ///
    /// Returns an error on a non-2xx reply.
    pub async fn mkredirectref(
        &self,
        href: &str,
        target: Option<&str>,
        lifetime: RedirectLifetime,
    ) -> Result<(), DavError> {
        let request = self.redirect_request(Verb::MkRedirectRef, href, target, lifetime)?;
        perform(&self.http, request, interpret_success).await
    }

    /// Starts a `MKREDIRECTREF` call.
    pub fn mkredirectref_start(
        &self,
        href: &str,
        target: Option<&str>,
        lifetime: RedirectLifetime,
        cancel: Option<CancellationToken>,
        callback: Callback<()>,
    ) -> Operation {
        let request = self.redirect_request(Verb::MkRedirectRef, href, target, lifetime);
        self.start(Verb::MkRedirectRef, request, interpret_success, cancel, callback)
    }

    /// Finishes a `MKREDIRECTREF` call.
    ///
    /// # Errors
    ///
    /// Returns the error of the call, or a mismatch if `result` belongs to
    /// another verb.
    pub fn mkredirectref_finish(result: AsyncResult<()>) -> Result<(), DavError> {
        result.finish(Verb::MkRedirectRef)
    }

    /// Blocking `MKREDIRECTREF`.
    ///
    /// # Errors
    ///
    /// Same as [`DavClient::mkredirectref`], or a configuration error when
    /// called inside an async runtime.
    pub fn mkredirectref_blocking(
        &self,
        href: &str,
        target: Option<&str>,
        lifetime: RedirectLifetime,
        cancel: Option<&CancellationToken>,
    ) -> Result<(), DavError> {
        block_on_operation(Verb::MkRedirectRef, |callback| {
            self.mkredirectref_start(href, target, lifetime, cancel.cloned(), callback)
        })
    }

    // UPDATEREDIRECTREF

    /// `UPDATEREDIRECTREF`: changes the target or lifetime of a redirect
    /// reference.
    ///
    /// # Errors
    ///
    /// Returns an error on a non-2xx reply.
    pub async fn updateredirectref(
        &self,
        href: &str,
        target: Option<&str>,
        lifetime: RedirectLifetime,
    ) -> Result<(), DavError> {
        let request = self.redirect_request(Verb::UpdateRedirectRef, href, target, lifetime)?;
        perform(&self.http, request, interpret_success).await
    }

    /// Starts an `UPDATEREDIRECTREF` call.
    pub fn updateredirectref_start(
        &self,
        href: &str,
        target: Option<&str>,
        lifetime: RedirectLifetime,
        cancel: Option<CancellationToken>,
        callback: Callback<()>,
    ) -> Operation {
        let request = self.redirect_request(Verb::UpdateRedirectRef, href, target, lifetime);
        self.start(Verb::UpdateRedirectRef, request, interpret_success, cancel, callback)
    }

    /// Finishes an `UPDATEREDIRECTREF` call.
    ///
    /// # Errors
    ///
    /// Returns the error of the call, or a mismatch if `result` belongs to
    /// another verb.
    pub fn updateredirectref_finish(result: AsyncResult<()>) -> Result<(), DavError> {
        result.finish(Verb::UpdateRedirectRef)
    }

    /// Blocking `UPDATEREDIRECTREF`.
    ///
    /// # Errors
    ///
    /// Same as [`DavClient::updateredirectref`], or a configuration error
    /// when called inside an async runtime.
    pub fn updateredirectref_blocking(
        &self,
        href: &str,
        target: Option<&str>,
        lifetime: RedirectLifetime,
        cancel: Option<&CancellationToken>,
    ) -> Result<(), DavError> {
        block_on_operation(Verb::UpdateRedirectRef, |callback| {
            self.updateredirectref_start(href, target, lifetime, cancel.cloned(), callback)
        })
    }

    fn redirect_request(
        &self,
        verb: Verb,
        href: &str,
        target: Option<&str>,
        lifetime: RedirectLifetime,
    ) -> Result<DavRequest, DavError> {
        let url = self.resolve(href)?;
        let target = target.map(|t| self.resolve(t)).transpose()?;
        if verb == Verb::UpdateRedirectRef {
            DavRequest::updateredirectref(url, target.as_ref(), lifetime)
        } else {
            DavRequest::mkredirectref(url, target.as_ref(), lifetime)
        }
    }
}

async fn perform<T>(
    http: &HttpClient,
    request: DavRequest,
    interpret: Interpret<T>,
) -> Result<T, DavError> {
    let url = request.url().clone();
    let response = http.execute(request).await?;
    interpret(&url, response)
}

fn status_error(response: &RawResponse) -> DavError {
    tracing::warn!(status = response.status, reason = %response.reason, "unexpected WebDAV status");
    DavError::Status {
        status: response.status,
        reason: response.reason.clone(),
    }
}

const fn is_success(status: u16) -> bool {
    matches!(status, 200..=299)
}

fn interpret_options(_url: &Url, response: RawResponse) -> Result<Capabilities, DavError> {
    if !is_success(response.status) {
        return Err(status_error(&response));
    }
    Ok(Capabilities {
        allow: Allow::from_header_values(response.header_values("allow")),
        compliance: Compliance::from_header_values(response.header_values("dav")),
    })
}

fn interpret_multi_status(url: &Url, response: RawResponse) -> Result<MultiStatus, DavError> {
    if response.status != MULTI_STATUS_CODE {
        return Err(DavError::ExpectedMultiStatus {
            status: response.status,
            reason: response.reason,
        });
    }
    let multi_status =
        MultiStatus::from_message(response.status, &response.reason, url, &response.body)?;
    tracing::debug!(
        responses = multi_status.n_responses(),
        "parsed Multi-Status reply"
    );
    Ok(multi_status)
}

fn interpret_success(_url: &Url, response: RawResponse) -> Result<(), DavError> {
    if is_success(response.status) {
        Ok(())
    } else {
        Err(status_error(&response))
    }
}

/// 2xx contract for verbs where a 207 reports per-member failures.
fn interpret_uniform_success(url: &Url, response: RawResponse) -> Result<(), DavError> {
    if response.status == MULTI_STATUS_CODE {
        return Err(partial_failure(url, &response));
    }
    interpret_success(url, response)
}

fn partial_failure(url: &Url, response: &RawResponse) -> DavError {
    match MultiStatus::from_message(response.status, &response.reason, url, &response.body) {
        Ok(multi_status) => {
            tracing::warn!(
                failed = multi_status.failed_count(),
                "WebDAV operation partially failed"
            );
            DavError::PartialFailure(Box::new(multi_status))
        }
        Err(e) => e.into(),
    }
}

fn interpret_lock(url: &Url, response: RawResponse) -> Result<LockResult, DavError> {
    if response.status == MULTI_STATUS_CODE {
        return Err(partial_failure(url, &response));
    }
    if !is_success(response.status) {
        return Err(status_error(&response));
    }

    let lock_token = response
        .header("lock-token")
        .map(|v| v.trim().trim_start_matches('<').trim_end_matches('>').to_string());

    let active_locks = if response.body.is_empty() {
        Vec::new()
    } else {
        let prop: PropertySet = new_from_bytes(TypeId::of(&PROP), url, &response.body)?;
        prop.get(TypeId::of(&LOCK_DISCOVERY))
            .and_then(|p| p.value().as_list().map(<[Value]>::to_vec))
            .unwrap_or_default()
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(Object::ActiveLock(lock)) => Some(lock),
                _ => None,
            })
            .collect()
    };

    Ok(LockResult {
        lock_token,
        active_locks,
    })
}

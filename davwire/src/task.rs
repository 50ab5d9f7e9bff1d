// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Completed-operation handles and the blocking bridge.
//!
//! A started operation is a future that the caller drives on any executor.
//! When it completes, it hands an [`AsyncResult`] to the caller's
//! completion callback exactly once; the matching `*_finish` call then
//! extracts the typed result. Blocking calls run the same future on a
//! private current-thread runtime and wait for the callback.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Condvar, Mutex, PoisonError};

use tokio_util::sync::CancellationToken;

use crate::error::DavError;

/// A started operation. Drive it to completion on any executor; it calls
/// its completion callback exactly once before finishing.
pub type Operation = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Completion callback of a started operation.
pub type Callback<T> = Box<dyn FnOnce(AsyncResult<T>) + Send + 'static>;

/// The WebDAV verb an operation was started for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// `OPTIONS`.
    Options,
    /// `PROPFIND`.
    PropFind,
    /// `PROPPATCH`.
    PropPatch,
    /// `MKCOL`.
    MkCol,
    /// `DELETE`.
    Delete,
    /// `COPY`.
    Copy,
    /// `MOVE`.
    Move,
    /// `LOCK` creating a lock.
    Lock,
    /// `LOCK` refreshing a lock.
    LockRefresh,
    /// `UNLOCK`.
    Unlock,
    /// `MKREDIRECTREF`.
    MkRedirectRef,
    /// `UPDATEREDIRECTREF`.
    UpdateRedirectRef,
}

impl Verb {
    /// Name used in diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Options => "OPTIONS",
            Self::PropFind => "PROPFIND",
            Self::PropPatch => "PROPPATCH",
            Self::MkCol => "MKCOL",
            Self::Delete => "DELETE",
            Self::Copy => "COPY",
            Self::Move => "MOVE",
            Self::Lock => "LOCK",
            Self::LockRefresh => "LOCK (refresh)",
            Self::Unlock => "UNLOCK",
            Self::MkRedirectRef => "MKREDIRECTREF",
            Self::UpdateRedirectRef => "UPDATEREDIRECTREF",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a started operation, tagged with its verb.
#[derive(Debug)]
pub struct AsyncResult<T> {
    verb: Verb,
    result: Result<T, DavError>,
}

impl<T> AsyncResult<T> {
    pub(crate) const fn new(verb: Verb, result: Result<T, DavError>) -> Self {
        Self { verb, result }
    }

    /// The verb the operation was started for.
    #[must_use]
    pub const fn verb(&self) -> Verb {
        self.verb
    }

    /// Whether the operation succeeded.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Extracts the result of an operation started for `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`DavError::OperationMismatch`] if the operation was started
    /// for another verb, or the operation's own error.
    pub fn finish(self, expected: Verb) -> Result<T, DavError> {
        if self.verb != expected {
            return Err(DavError::OperationMismatch {
                expected: expected.as_str(),
                actual: self.verb.as_str(),
            });
        }
        self.result
    }
}

/// Runs `operation` to completion, or fails with [`DavError::Cancelled`]
/// as soon as `cancel` fires. The in-flight request is dropped on cancel.
pub(crate) async fn run_cancellable<T>(
    operation: impl Future<Output = Result<T, DavError>>,
    cancel: Option<CancellationToken>,
) -> Result<T, DavError> {
    let Some(cancel) = cancel else {
        return operation.await;
    };

    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(DavError::Cancelled),
        result = operation => result,
    }
}

/// Slot a completion callback stores its result into.
struct Completion<T> {
    slot: Mutex<Option<AsyncResult<T>>>,
    ready: Condvar,
}

impl<T> Completion<T> {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            slot: Mutex::new(None),
            ready: Condvar::new(),
        })
    }

    fn complete(&self, result: AsyncResult<T>) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(result);
        self.ready.notify_all();
    }

    fn wait(&self) -> AsyncResult<T> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(result) = slot.take() {
                return result;
            }
            slot = self
                .ready
                .wait(slot)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// Runs a started operation on a private current-thread runtime and
/// returns its result once the completion callback has fired.
///
/// `start` receives the completion callback and returns the operation
/// future. Must not be called from within an async runtime.
pub(crate) fn block_on_operation<T, F>(verb: Verb, start: F) -> Result<T, DavError>
where
    T: Send + 'static,
    F: FnOnce(Callback<T>) -> Operation,
{
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(DavError::Config(format!(
            "Blocking {verb} called from within an async runtime; use the async API instead"
        )));
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| DavError::Config(format!("Failed to start runtime: {e}")))?;

    let completion = Completion::new();
    let callback: Callback<T> = {
        let completion = Arc::clone(&completion);
        Box::new(move |result| completion.complete(result))
    };

    tracing::trace!(%verb, "running blocking operation");
    runtime.block_on(start(callback));
    completion.wait().finish(verb)
}

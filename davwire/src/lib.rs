// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Typed XML data binding for WebDAV (RFC 4918) and `CalDAV` (RFC 4791)
//! documents, and a client exposing the WebDAV methods on top of it.
//!
//! XML elements map to [`Parsable`] types described by static
//! [`ParsableType`] descriptors. The built-in property types live in
//! [`catalog`]; applications register their own with [`register`].

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
// Allow certain clippy lints that are too restrictive for this crate
#![allow(
    clippy::option_option,
    clippy::similar_names,
    clippy::single_match_else,
    clippy::match_bool
)]

pub mod catalog;
mod client;
mod config;
mod dav_error;
mod error;
mod flags;
mod http;
mod lock;
mod multi_status;
mod parsable;
mod prop_stat;
mod property;
mod property_set;
mod property_update;
mod request;
mod response;
mod task;
mod types;
mod value;
pub mod xml;

pub use crate::client::{Capabilities, DavClient, LockResult};
pub use crate::config::{AuthMethod, DavConfig};
pub use crate::dav_error::{DAV_ERROR, ErrorConditions, ProtocolError};
pub use crate::error::{DavError, ParseError};
pub use crate::http::RawResponse;
pub use crate::lock::{ACTIVE_LOCK, ActiveLock, LOCK_ENTRY, LockEntry, LockTimeout};
pub use crate::multi_status::{MULTI_STATUS, MULTI_STATUS_CODE, MultiStatus};
pub use crate::parsable::{
    PARSABLE, Parsable, ParsableType, Registry, TypeId, TypeSet, expect_type, ignore_unknown,
    new_from_bytes, new_from_element, register, registry, resolve_href, to_bytes,
};
pub use crate::prop_stat::{PROP_STAT, PropStat};
pub use crate::property::{
    DATE_PROPERTY, HREF_PROPERTY, LIST_PROPERTY, ListItem, PCDATA_PROPERTY, PCData, PROPERTY,
    Property, PropertyClass, ResourceType, TextCodec, UINT_PROPERTY,
};
pub use crate::property_set::{PROP, PropertySet};
pub use crate::property_update::{Instruction, PROPERTY_UPDATE, PropertyUpdate};
pub use crate::request::DavRequest;
pub use crate::response::{RESPONSE, Response};
pub use crate::task::{AsyncResult, Callback, Operation, Verb};
pub use crate::types::{
    Allow, Compliance, CopyFlags, Depth, LockFlags, LockScope, LockType, MoveFlags,
    PropFindType, RedirectLifetime, Status,
};
pub use crate::value::{
    DateFormat, EnumValue, Object, ObjectKind, Value, ValueKind, format_timestamp,
    parse_timestamp,
};

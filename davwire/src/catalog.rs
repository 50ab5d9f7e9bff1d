// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Built-in property types from RFC 4918, RFC 4437, RFC 3744 and RFC 4791.

use crate::dav_error::DAV_ERROR;
use crate::lock::{ACTIVE_LOCK, LOCK_ENTRY};
use crate::multi_status::MULTI_STATUS;
use crate::parsable::{ParsableType, TypeId};
use crate::prop_stat::PROP_STAT;
use crate::property::{
    DATE_PROPERTY, HREF_PROPERTY, LIST_PROPERTY, ListItem, PCDATA_PROPERTY, PCData, PROPERTY,
    PropertyClass, UINT_PROPERTY,
};
use crate::property_set::PROP;
use crate::property_update::PROPERTY_UPDATE;
use crate::response::RESPONSE;
use crate::value::DateFormat;
use crate::xml::ns;

const fn text(name: &'static str, namespace: &'static str, element: &'static str) -> ParsableType {
    ParsableType::property(
        name,
        namespace,
        element,
        TypeId::of(&PCDATA_PROPERTY),
        PropertyClass::PCData(PCData::text()),
    )
}

const fn href(name: &'static str, namespace: &'static str, element: &'static str) -> ParsableType {
    ParsableType::property(
        name,
        namespace,
        element,
        TypeId::of(&HREF_PROPERTY),
        PropertyClass::HRef,
    )
}

const fn list(
    name: &'static str,
    namespace: &'static str,
    element: &'static str,
    item: ListItem,
) -> ParsableType {
    ParsableType::property(
        name,
        namespace,
        element,
        TypeId::of(&LIST_PROPERTY),
        PropertyClass::List(item),
    )
}

const fn uint(name: &'static str, namespace: &'static str, element: &'static str) -> ParsableType {
    ParsableType::property(
        name,
        namespace,
        element,
        TypeId::of(&UINT_PROPERTY),
        PropertyClass::PCData(PCData::uint(0, u64::MAX)),
    )
}

const fn date(
    name: &'static str,
    element: &'static str,
    format: DateFormat,
) -> ParsableType {
    ParsableType::property(
        name,
        ns::DAV,
        element,
        TypeId::of(&DATE_PROPERTY),
        PropertyClass::PCData(PCData::date(format)),
    )
}

/// `DAV:displayname`.
pub static DISPLAY_NAME: ParsableType = text("DisplayName", ns::DAV, "displayname");

/// `DAV:getetag`; must not be empty.
pub static GET_ETAG: ParsableType = ParsableType::property(
    "GetETag",
    ns::DAV,
    "getetag",
    TypeId::of(&PCDATA_PROPERTY),
    PropertyClass::PCData(PCData::required_text()),
);

/// `DAV:getcontentlanguage`.
pub static GET_CONTENT_LANGUAGE: ParsableType =
    text("GetContentLanguage", ns::DAV, "getcontentlanguage");

/// `DAV:getcontenttype`.
pub static GET_CONTENT_TYPE: ParsableType = text("GetContentType", ns::DAV, "getcontenttype");

/// `DAV:getcontentlength`.
pub static GET_CONTENT_LENGTH: ParsableType =
    uint("GetContentLength", ns::DAV, "getcontentlength");

/// `DAV:creationdate`, written as RFC 3339.
pub static CREATION_DATE: ParsableType = date("CreationDate", "creationdate", DateFormat::Iso8601);

/// `DAV:getlastmodified`, written as an HTTP date.
pub static GET_LAST_MODIFIED: ParsableType =
    date("GetLastModified", "getlastmodified", DateFormat::Http);

/// `DAV:resourcetype`.
pub static RESOURCE_TYPE: ParsableType = ParsableType::property(
    "ResourceType",
    ns::DAV,
    "resourcetype",
    TypeId::of(&PROPERTY),
    PropertyClass::ResourceType,
);

/// `DAV:lockdiscovery`.
pub static LOCK_DISCOVERY: ParsableType =
    list("LockDiscovery", ns::DAV, "lockdiscovery", ListItem::ActiveLock);

/// `DAV:supportedlock`.
pub static SUPPORTED_LOCK: ParsableType =
    list("SupportedLock", ns::DAV, "supportedlock", ListItem::LockEntry);

/// `DAV:owner` (RFC 3744).
pub static OWNER: ParsableType = href("Owner", ns::DAV, "owner");

/// `DAV:principal-URL`.
pub static PRINCIPAL_URL: ParsableType = href("PrincipalUrl", ns::DAV, "principal-URL");

/// `DAV:current-user-principal` (RFC 5397).
pub static CURRENT_USER_PRINCIPAL: ParsableType =
    href("CurrentUserPrincipal", ns::DAV, "current-user-principal");

/// `DAV:group-member-set`.
pub static GROUP_MEMBER_SET: ParsableType =
    list("GroupMemberSet", ns::DAV, "group-member-set", ListItem::Href);

/// `DAV:group-membership`.
pub static GROUP_MEMBERSHIP: ParsableType =
    list("GroupMembership", ns::DAV, "group-membership", ListItem::Href);

/// `DAV:alternate-URI-set`.
pub static ALTERNATE_URI_SET: ParsableType =
    list("AlternateUriSet", ns::DAV, "alternate-URI-set", ListItem::Href);

/// `DAV:reftarget` (RFC 4437).
pub static REF_TARGET: ParsableType = href("RefTarget", ns::DAV, "reftarget");

/// `DAV:redirect-lifetime` (RFC 4437).
pub static REDIRECT_LIFETIME: ParsableType = ParsableType::property(
    "RedirectLifetime",
    ns::DAV,
    "redirect-lifetime",
    TypeId::of(&PROPERTY),
    PropertyClass::RedirectLifetime,
);

/// `C:calendar-description`.
pub static CALENDAR_DESCRIPTION: ParsableType =
    text("CalendarDescription", ns::CALDAV, "calendar-description");

/// `C:calendar-timezone`.
pub static CALENDAR_TIMEZONE: ParsableType =
    text("CalendarTimezone", ns::CALDAV, "calendar-timezone");

/// `C:calendar-home-set`.
pub static CALENDAR_HOME_SET: ParsableType =
    href("CalendarHomeSet", ns::CALDAV, "calendar-home-set");

/// `C:max-resource-size`.
pub static MAX_RESOURCE_SIZE: ParsableType =
    uint("MaxResourceSize", ns::CALDAV, "max-resource-size");

/// `C:schedule-inbox-URL` (RFC 6638).
pub static SCHEDULE_INBOX_URL: ParsableType =
    href("ScheduleInboxUrl", ns::CALDAV, "schedule-inbox-URL");

/// `C:schedule-outbox-URL` (RFC 6638).
pub static SCHEDULE_OUTBOX_URL: ParsableType =
    href("ScheduleOutboxUrl", ns::CALDAV, "schedule-outbox-URL");

/// `C:supported-calendar-component-set`; items are `comp` names.
pub static SUPPORTED_CALENDAR_COMPONENT_SET: ParsableType = list(
    "SupportedCalendarComponentSet",
    ns::CALDAV,
    "supported-calendar-component-set",
    ListItem::Attribute {
        namespace: ns::CALDAV,
        name: "comp",
        attribute: "name",
    },
);

/// `C:supported-calendar-data`; items are media types.
pub static SUPPORTED_CALENDAR_DATA: ParsableType = list(
    "SupportedCalendarData",
    ns::CALDAV,
    "supported-calendar-data",
    ListItem::Attribute {
        namespace: ns::CALDAV,
        name: "calendar-data",
        attribute: "content-type",
    },
);

/// Every type registered with the process-wide registry on first use.
pub static BUILTIN_TYPES: &[TypeId] = &[
    TypeId::of(&PROP),
    TypeId::of(&PROPERTY_UPDATE),
    TypeId::of(&PROP_STAT),
    TypeId::of(&RESPONSE),
    TypeId::of(&MULTI_STATUS),
    TypeId::of(&DAV_ERROR),
    TypeId::of(&ACTIVE_LOCK),
    TypeId::of(&LOCK_ENTRY),
    TypeId::of(&DISPLAY_NAME),
    TypeId::of(&GET_ETAG),
    TypeId::of(&GET_CONTENT_LANGUAGE),
    TypeId::of(&GET_CONTENT_TYPE),
    TypeId::of(&GET_CONTENT_LENGTH),
    TypeId::of(&CREATION_DATE),
    TypeId::of(&GET_LAST_MODIFIED),
    TypeId::of(&RESOURCE_TYPE),
    TypeId::of(&LOCK_DISCOVERY),
    TypeId::of(&SUPPORTED_LOCK),
    TypeId::of(&OWNER),
    TypeId::of(&PRINCIPAL_URL),
    TypeId::of(&CURRENT_USER_PRINCIPAL),
    TypeId::of(&GROUP_MEMBER_SET),
    TypeId::of(&GROUP_MEMBERSHIP),
    TypeId::of(&ALTERNATE_URI_SET),
    TypeId::of(&REF_TARGET),
    TypeId::of(&REDIRECT_LIFETIME),
    TypeId::of(&CALENDAR_DESCRIPTION),
    TypeId::of(&CALENDAR_TIMEZONE),
    TypeId::of(&CALENDAR_HOME_SET),
    TypeId::of(&MAX_RESOURCE_SIZE),
    TypeId::of(&SCHEDULE_INBOX_URL),
    TypeId::of(&SCHEDULE_OUTBOX_URL),
    TypeId::of(&SUPPORTED_CALENDAR_COMPONENT_SET),
    TypeId::of(&SUPPORTED_CALENDAR_DATA),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsable::{PARSABLE, registry};

    #[test]
    fn builtin_types_are_concrete() {
        for ty in BUILTIN_TYPES {
            assert!(!ty.is_abstract(), "{ty} should bind an element");
            assert!(ty.element_namespace().is_some());
        }
    }

    #[test]
    fn property_lookup_stays_under_property_root() {
        let reg = registry();
        let ty = reg
            .lookup(TypeId::of(&PROPERTY), Some(ns::DAV), "getetag")
            .unwrap();
        assert_eq!(ty, TypeId::of(&GET_ETAG));

        // `response` is registered, but not as a property.
        assert!(
            reg.lookup(TypeId::of(&PROPERTY), Some(ns::DAV), "response")
                .is_err()
        );
        assert!(
            reg.lookup(TypeId::of(&PARSABLE), Some(ns::DAV), "response")
                .is_ok()
        );
    }

    #[test]
    fn subtypes_list_children_before_parents() {
        let subtypes = registry().subtypes(TypeId::of(&PROPERTY));
        let pos = |t: TypeId| subtypes.iter().position(|&s| s == t).unwrap();
        assert!(pos(TypeId::of(&GET_CONTENT_LENGTH)) < pos(TypeId::of(&UINT_PROPERTY)));
        assert!(pos(TypeId::of(&UINT_PROPERTY)) < pos(TypeId::of(&PCDATA_PROPERTY)));
    }
}

// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Request building tests.

use davwire::catalog::{CALENDAR_HOME_SET, CREATION_DATE, DISPLAY_NAME, GET_ETAG};
use davwire::{
    CopyFlags, DavRequest, Depth, LockFlags, LockScope, LockTimeout, MoveFlags, PropFindType,
    Property, PropertySet, PropertyUpdate, RedirectLifetime, TypeId,
};
use reqwest::Url;

fn url(path: &str) -> Url {
    Url::parse("https://dav.example.com/").unwrap().join(path).unwrap()
}

#[test]
fn request_every_request_disables_caching() {
    let request = DavRequest::options(url("/"));
    assert_eq!(request.method().as_str(), "OPTIONS");
    assert_eq!(request.header("cache-control"), Some("no-cache"));
    assert_eq!(request.header("pragma"), Some("no-cache"));
    assert!(request.body().is_none());
}

#[test]
fn request_propfind_names_requested_properties() {
    let mut prop = PropertySet::new();
    prop.add(Property::with_value(TypeId::of(&DISPLAY_NAME), "ignored value").unwrap());
    prop.add_type(TypeId::of(&GET_ETAG)).unwrap();
    prop.add_type(TypeId::of(&CALENDAR_HOME_SET)).unwrap();

    let request = DavRequest::propfind(url("/cal/"), PropFindType::Prop, Some(&prop), Depth::One)
        .expect("Failed to build PROPFIND");
    let xml = request.body_text().unwrap();

    assert_eq!(request.method().as_str(), "PROPFIND");
    assert_eq!(request.header("depth"), Some("1"));
    assert_eq!(request.header("content-type"), Some("application/xml"));
    assert!(xml.contains(
        "<D:propfind xmlns:D=\"DAV:\" xmlns:C=\"urn:ietf:params:xml:ns:caldav\">"
    ));
    assert!(xml.contains("<D:displayname/>"));
    assert!(xml.contains("<D:getetag/>"));
    assert!(xml.contains("<C:calendar-home-set/>"));
    assert!(!xml.contains("ignored value"));
}

#[test]
fn request_propfind_declares_only_used_namespaces() {
    let prop = PropertySet::from_types([TypeId::of(&GET_ETAG)]).unwrap();
    let request =
        DavRequest::propfind(url("/a"), PropFindType::Prop, Some(&prop), Depth::Zero).unwrap();
    let xml = request.body_text().unwrap();

    assert!(xml.contains("xmlns:D=\"DAV:\""));
    assert!(!xml.contains("xmlns:C="));
    assert_eq!(request.header("depth"), Some("0"));
}

#[test]
fn request_propfind_without_properties_falls_back_to_allprop() {
    let request = DavRequest::propfind(url("/a"), PropFindType::Prop, None, Depth::Infinity)
        .unwrap();
    let xml = request.body_text().unwrap();

    assert_eq!(request.header("depth"), Some("infinity"));
    assert!(xml.contains("<D:allprop/>"));
    assert!(!xml.contains("<D:prop>"));
    assert!(!xml.contains("<D:prop/>"));

    let names = DavRequest::propfind(url("/a"), PropFindType::PropName, None, Depth::Zero)
        .unwrap()
        .body_text()
        .unwrap();
    assert!(names.contains("<D:propname/>"));
}

#[test]
fn request_proppatch_body() {
    let mut update = PropertyUpdate::new();
    update.set(Property::with_value(TypeId::of(&DISPLAY_NAME), "Team").unwrap());
    update.remove(TypeId::of(&CREATION_DATE)).unwrap();

    let request = DavRequest::proppatch(url("/cal/"), &update).unwrap();
    let xml = request.body_text().unwrap();

    assert_eq!(request.method().as_str(), "PROPPATCH");
    assert!(xml.starts_with("<D:propertyupdate xmlns:D=\"DAV:\">"));
    assert!(xml.contains("<D:displayname>Team</D:displayname>"));
    assert!(xml.contains("<D:creationdate/>"));
}

#[test]
fn request_copy_and_move_headers() {
    let destination = url("/b");

    let copy = DavRequest::copy_to(url("/a"), &destination, CopyFlags::default()).unwrap();
    assert_eq!(copy.header("destination"), Some("https://dav.example.com/b"));
    assert_eq!(copy.header("overwrite"), None);
    assert_eq!(copy.header("depth"), None);

    let flags = CopyFlags {
        no_overwrite: true,
        collection_only: true,
    };
    let copy = DavRequest::copy_to(url("/a"), &destination, flags).unwrap();
    assert_eq!(copy.header("overwrite"), Some("F"));
    assert_eq!(copy.header("depth"), Some("0"));

    let flags = MoveFlags { no_overwrite: true };
    let moved = DavRequest::move_to(url("/a"), &destination, flags).unwrap();
    assert_eq!(moved.method().as_str(), "MOVE");
    assert_eq!(moved.header("overwrite"), Some("F"));
    assert_eq!(moved.header("destination"), Some("https://dav.example.com/b"));
}

#[test]
fn request_lock_timeouts() {
    for (seconds, expected) in [(-1, "Infinite"), (-5, "Infinite"), (3600, "Second-3600")] {
        let request = DavRequest::lock(
            url("/doc"),
            LockScope::Exclusive,
            LockFlags::default(),
            None,
            LockTimeout::from_seconds(seconds),
        )
        .unwrap();
        assert_eq!(request.header("timeout"), Some(expected));
    }

    let request = DavRequest::lock(
        url("/doc"),
        LockScope::Exclusive,
        LockFlags::default(),
        None,
        LockTimeout::from_seconds(i64::from(u32::MAX) + 10),
    )
    .unwrap();
    assert_eq!(request.header("timeout"), Some("Second-4294967295"));
}

#[test]
fn request_lock_body_and_owner() {
    let flags = LockFlags {
        non_recursive: true,
        owner_is_uri: true,
    };
    let request = DavRequest::lock(
        url("/doc"),
        LockScope::Shared,
        flags,
        Some("mailto:alice@example.com"),
        LockTimeout::Infinite,
    )
    .unwrap();
    let xml = request.body_text().unwrap();

    assert_eq!(request.header("depth"), Some("0"));
    assert!(xml.contains("<D:lockinfo"));
    assert!(xml.contains("<D:shared/>"));
    assert!(xml.contains("<D:write/>"));
    assert!(xml.contains("<D:href>mailto:alice@example.com</D:href>"));

    let request = DavRequest::lock(
        url("/doc"),
        LockScope::Exclusive,
        LockFlags::default(),
        Some("Alice"),
        LockTimeout::Infinite,
    )
    .unwrap();
    let xml = request.body_text().unwrap();
    assert_eq!(request.header("depth"), None);
    assert!(xml.contains("<D:owner>Alice</D:owner>"));
    assert!(xml.contains("<D:exclusive/>"));
}

#[test]
fn request_lock_refresh_and_unlock_headers() {
    let refresh =
        DavRequest::lock_refresh(url("/doc"), "urn:uuid:1234", LockTimeout::Seconds(60)).unwrap();
    assert_eq!(refresh.method().as_str(), "LOCK");
    assert_eq!(refresh.header("if"), Some("(<urn:uuid:1234>)"));
    assert_eq!(refresh.header("timeout"), Some("Second-60"));
    assert!(refresh.body().is_none());

    let unlock = DavRequest::unlock(url("/doc"), "urn:uuid:1234").unwrap();
    assert_eq!(unlock.method().as_str(), "UNLOCK");
    assert_eq!(unlock.header("lock-token"), Some("<urn:uuid:1234>"));
}

#[test]
fn request_add_lock_token_appends_tagged_lists() {
    let mut request = DavRequest::delete(url("/dir/"));
    request
        .add_lock_token(None, "urn:uuid:aaa")
        .expect("Failed to add lock token");
    request
        .add_lock_token(Some("https://dav.example.com/dir/file"), "urn:uuid:bbb")
        .expect("Failed to add lock token");

    assert_eq!(
        request.header("if"),
        Some(
            "<https://dav.example.com/dir/> (<urn:uuid:aaa>) \
             <https://dav.example.com/dir/file> (<urn:uuid:bbb>)"
        )
    );
}

#[test]
fn request_redirect_references() {
    let target = url("/new");
    let request =
        DavRequest::mkredirectref(url("/old"), Some(&target), RedirectLifetime::Permanent)
            .unwrap();
    let xml = request.body_text().unwrap();
    assert_eq!(request.method().as_str(), "MKREDIRECTREF");
    assert!(xml.contains("<D:reftarget>"));
    assert!(xml.contains("<D:href>https://dav.example.com/new</D:href>"));
    assert!(xml.contains("<D:permanent/>"));
    assert_eq!(request.header("apply-to-redirect-ref"), None);

    let request =
        DavRequest::updateredirectref(url("/old"), None, RedirectLifetime::Unknown).unwrap();
    let xml = request.body_text().unwrap();
    assert_eq!(request.header("apply-to-redirect-ref"), Some("T"));
    assert!(xml.contains("<D:updateredirectref"));
    assert!(!xml.contains("redirect-lifetime"));
    assert!(!xml.contains("reftarget"));

    let mut delete = DavRequest::delete(url("/old"));
    delete.apply_to_redirect_ref(false);
    assert_eq!(delete.header("apply-to-redirect-ref"), Some("F"));
}

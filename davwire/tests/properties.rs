// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Property binding tests.

use davwire::catalog::{
    CALENDAR_HOME_SET, CREATION_DATE, DISPLAY_NAME, GET_CONTENT_LENGTH, GET_ETAG,
    GET_LAST_MODIFIED, GROUP_MEMBER_SET, REDIRECT_LIFETIME, RESOURCE_TYPE,
    SUPPORTED_CALENDAR_COMPONENT_SET,
};
use davwire::{
    PCData, PROP, Parsable, ParsableType, ParseError, Property, PropertyClass, PropertySet,
    PropertyUpdate, RedirectLifetime, ResourceType, TypeId, TypeSet, UINT_PROPERTY, Value,
    new_from_bytes, register, registry, to_bytes,
};
use reqwest::Url;

static QUOTA: ParsableType = ParsableType::property(
    "Quota",
    "urn:example:quota",
    "quota",
    TypeId::of(&UINT_PROPERTY),
    PropertyClass::PCData(PCData::uint(10, 1000)),
);

fn base() -> Url {
    Url::parse("https://dav.example.com/home/").unwrap()
}

fn xml(bytes: &[u8]) -> String {
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[test]
fn properties_round_trip_through_prop() {
    let mut set = PropertySet::new();
    set.add(Property::with_value(TypeId::of(&DISPLAY_NAME), "Work & Play").unwrap());
    set.add(Property::with_value(TypeId::of(&GET_CONTENT_LENGTH), 4096_u64).unwrap());
    set.add(
        Property::with_value(
            TypeId::of(&CALENDAR_HOME_SET),
            Url::parse("https://dav.example.com/calendars/alice/").unwrap(),
        )
        .unwrap(),
    );

    let bytes = to_bytes(&set).expect("Failed to serialize prop");
    let text = xml(&bytes);
    assert!(text.contains("xmlns:D=\"DAV:\""));
    assert!(text.contains("xmlns:C=\"urn:ietf:params:xml:ns:caldav\""));
    assert!(text.contains("<D:displayname>Work &amp; Play</D:displayname>"));

    let parsed: PropertySet =
        new_from_bytes(TypeId::of(&PROP), &base(), &bytes).expect("Failed to parse prop");
    assert_eq!(parsed, set);
}

#[test]
fn properties_text_round_trip_keeps_whitespace() {
    let mut set = PropertySet::new();
    set.add(Property::with_value(TypeId::of(&DISPLAY_NAME), "  padded name ").unwrap());

    let bytes = to_bytes(&set).unwrap();
    let parsed: PropertySet = new_from_bytes(TypeId::of(&PROP), &base(), &bytes).unwrap();
    assert_eq!(
        parsed.get(TypeId::of(&DISPLAY_NAME)).unwrap().value().as_str(),
        Some("  padded name ")
    );
    assert_eq!(parsed, set);
}

#[test]
fn properties_relative_hrefs_resolve_against_base() {
    let body = br#"<D:prop xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <C:calendar-home-set><D:href>../calendars/alice/</D:href></C:calendar-home-set>
  <D:group-member-set>
    <D:href>/principals/bob/</D:href>
    <D:href>https://other.example.com/principals/carol/</D:href>
  </D:group-member-set>
</D:prop>"#;

    let set: PropertySet = new_from_bytes(TypeId::of(&PROP), &base(), body).unwrap();

    let home = set.get(TypeId::of(&CALENDAR_HOME_SET)).unwrap();
    assert_eq!(
        home.value().as_uri().map(Url::as_str),
        Some("https://dav.example.com/calendars/alice/")
    );

    let members = set.get(TypeId::of(&GROUP_MEMBER_SET)).unwrap();
    assert_eq!(members.length(), 2);
    assert_eq!(
        members.get_value_at(0),
        Some(Value::Uri(
            Url::parse("https://dav.example.com/principals/bob/").unwrap()
        ))
    );
}

#[test]
fn properties_unknown_elements_are_skipped() {
    let body = br#"<D:prop xmlns:D="DAV:" xmlns:X="urn:example:unknown">
  <X:color>blue</X:color>
  <D:getetag>"abc"</D:getetag>
</D:prop>"#;

    let set: PropertySet = new_from_bytes(TypeId::of(&PROP), &base(), body).unwrap();
    assert_eq!(set.len(), 1);
    assert_eq!(
        set.get(TypeId::of(&GET_ETAG)).unwrap().value().as_str(),
        Some("\"abc\"")
    );
}

#[test]
fn properties_empty_element_leaves_value_unset() {
    let body = br#"<D:prop xmlns:D="DAV:"><D:displayname/></D:prop>"#;

    let set: PropertySet = new_from_bytes(TypeId::of(&PROP), &base(), body).unwrap();
    let name = set.get(TypeId::of(&DISPLAY_NAME)).unwrap();
    assert!(!name.is_set());
}

#[test]
fn properties_empty_text_reads_back_unset() {
    let mut set = PropertySet::new();
    set.add(Property::with_value(TypeId::of(&DISPLAY_NAME), "").unwrap());

    let bytes = to_bytes(&set).unwrap();
    let parsed: PropertySet = new_from_bytes(TypeId::of(&PROP), &base(), &bytes).unwrap();
    let name = parsed.get(TypeId::of(&DISPLAY_NAME)).unwrap();
    assert!(!name.is_set());
    assert_eq!(name.value(), &Value::Unit);
}

#[test]
fn properties_required_text_rejects_empty_content() {
    let body = br#"<D:prop xmlns:D="DAV:"><D:getetag></D:getetag></D:prop>"#;
    let result: Result<PropertySet, _> = new_from_bytes(TypeId::of(&PROP), &base(), body);
    // An element without character data carries no value at all.
    assert!(result.is_ok());

    let result = Property::from_data(TypeId::of(&GET_ETAG), "");
    assert!(matches!(result, Err(ParseError::ContentViolation(_))));
}

#[test]
fn properties_uint_rejects_signs_and_overflow() {
    let length = TypeId::of(&GET_CONTENT_LENGTH);
    assert!(matches!(
        Property::from_data(length, "-5"),
        Err(ParseError::ContentViolation(_))
    ));
    assert!(matches!(
        Property::from_data(length, "+5"),
        Err(ParseError::ContentViolation(_))
    ));
    assert!(matches!(
        Property::from_data(length, "18446744073709551616"),
        Err(ParseError::ContentViolation(_))
    ));
    assert_eq!(
        Property::from_data(length, " 42 ").unwrap().value(),
        &Value::UInt64(42)
    );
}

#[test]
fn properties_uint_clamps_to_declared_range() {
    register(TypeId::of(&QUOTA));
    let quota = TypeId::of(&QUOTA);

    assert_eq!(
        Property::from_data(quota, "5000").unwrap().value(),
        &Value::UInt64(1000)
    );
    assert_eq!(
        Property::from_data(quota, "3").unwrap().value(),
        &Value::UInt64(10)
    );
    assert_eq!(
        Property::with_value(quota, 500_u64).unwrap().value(),
        &Value::UInt64(500)
    );
}

#[test]
fn properties_dates_write_their_declared_format() {
    let created = Property::from_data(
        TypeId::of(&CREATION_DATE),
        "Sat, 01 Jun 2024 12:00:00 GMT",
    )
    .unwrap();
    assert_eq!(created.write_data().as_deref(), Some("2024-06-01T12:00:00Z"));

    let modified =
        Property::from_data(TypeId::of(&GET_LAST_MODIFIED), "2024-06-01T12:00:00Z").unwrap();
    assert_eq!(
        modified.write_data().as_deref(),
        Some("Sat, 01 Jun 2024 12:00:00 GMT")
    );

    assert!(Property::from_data(TypeId::of(&GET_LAST_MODIFIED), "yesterday").is_err());
}

#[test]
fn properties_http_date_drops_subseconds() {
    let modified =
        Property::from_data(TypeId::of(&GET_LAST_MODIFIED), "2024-06-01T12:00:00.5Z").unwrap();
    assert_eq!(
        modified.write_data().as_deref(),
        Some("Sat, 01 Jun 2024 12:00:00 GMT")
    );
}

#[test]
fn properties_value_conversion_on_set() {
    let mut length = Property::new(TypeId::of(&GET_CONTENT_LENGTH)).unwrap();
    assert!(!length.is_set());
    assert!(length.set_value(&Value::from("128")));
    assert_eq!(length.value(), &Value::UInt64(128));
    assert!(!length.set_value(&Value::from("many")));
    assert_eq!(length.value(), &Value::UInt64(128));
}

#[test]
fn properties_resource_type_flags() {
    let body = br#"<D:prop xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:resourcetype><D:collection/><C:calendar/><D:unknown-kind/></D:resourcetype>
</D:prop>"#;
    let set: PropertySet = new_from_bytes(TypeId::of(&PROP), &base(), body).unwrap();
    let flags = set
        .get(TypeId::of(&RESOURCE_TYPE))
        .and_then(|p| p.value().as_resource_type())
        .unwrap();
    assert_eq!(flags, ResourceType::COLLECTION | ResourceType::CALENDAR);

    let mut out = PropertySet::new();
    out.add(Property::with_value(TypeId::of(&RESOURCE_TYPE), ResourceType::ADDRESSBOOK).unwrap());
    let text = xml(&to_bytes(&out).unwrap());
    assert!(text.contains("xmlns:CR=\"urn:ietf:params:xml:ns:carddav\""));
    assert!(text.contains("<CR:addressbook/>"));
}

#[test]
fn properties_attribute_list_reads_names() {
    let body = br#"<D:prop xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <C:supported-calendar-component-set>
    <C:comp name="VEVENT"/>
    <C:comp name="VTODO"/>
  </C:supported-calendar-component-set>
</D:prop>"#;
    let set: PropertySet = new_from_bytes(TypeId::of(&PROP), &base(), body).unwrap();
    let comps = set.get(TypeId::of(&SUPPORTED_CALENDAR_COMPONENT_SET)).unwrap();
    assert_eq!(
        comps.value(),
        &Value::List(vec![Value::from("VEVENT"), Value::from("VTODO")])
    );
}

#[test]
fn properties_redirect_lifetime_round_trip() {
    let mut set = PropertySet::new();
    set.add(
        Property::with_value(TypeId::of(&REDIRECT_LIFETIME), RedirectLifetime::Temporary)
            .unwrap(),
    );
    let bytes = to_bytes(&set).unwrap();
    assert!(xml(&bytes).contains("<D:temporary/>"));

    let parsed: PropertySet = new_from_bytes(TypeId::of(&PROP), &base(), &bytes).unwrap();
    assert_eq!(
        parsed
            .get(TypeId::of(&REDIRECT_LIFETIME))
            .and_then(Property::redirect_lifetime),
        Some(RedirectLifetime::Temporary)
    );
}

#[test]
fn properties_collect_types_is_idempotent() {
    let mut set = PropertySet::new();
    set.add(Property::with_value(TypeId::of(&DISPLAY_NAME), "A").unwrap());
    set.add(Property::with_value(TypeId::of(&DISPLAY_NAME), "B").unwrap());

    let mut types = TypeSet::new();
    set.collect_types(&mut types);
    let first = types.len();
    set.collect_types(&mut types);
    assert_eq!(types.len(), first);
    assert!(types.contains(TypeId::of(&DISPLAY_NAME)));
    assert!(types.contains(TypeId::of(&PROP)));
}

#[test]
fn properties_registration_is_idempotent() {
    register(TypeId::of(&QUOTA));
    assert!(!register(TypeId::of(&QUOTA)));
    assert!(registry().is_registered(TypeId::of(&QUOTA)));
    assert!(!register(TypeId::of(&DISPLAY_NAME)));
}

#[test]
fn properties_update_serializes_set_and_remove() {
    let mut update = PropertyUpdate::new();
    update.set(Property::with_value(TypeId::of(&DISPLAY_NAME), "Renamed").unwrap());
    update.remove(TypeId::of(&CREATION_DATE)).unwrap();

    let text = xml(&to_bytes(&update).unwrap());
    let set_at = text.find("<D:set>").unwrap();
    let remove_at = text.find("<D:remove>").unwrap();
    assert!(set_at < remove_at);
    assert!(text.contains("<D:displayname>Renamed</D:displayname>"));
    assert!(text.contains("<D:creationdate/>"));
}

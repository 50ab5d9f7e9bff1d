// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Multi-Status parsing tests.

use davwire::catalog::{DISPLAY_NAME, GET_CONTENT_LENGTH, GET_ETAG, RESOURCE_TYPE};
use davwire::{
    ErrorConditions, MULTI_STATUS, MultiStatus, ParseError, PropStat, ResourceType, Response,
    TypeId, Value, new_from_bytes,
};
use reqwest::Url;

fn request_uri() -> Url {
    Url::parse("https://dav.example.com/calendars/alice/").unwrap()
}

fn parse(body: &str) -> Result<MultiStatus, ParseError> {
    MultiStatus::from_message(207, "Multi-Status", &request_uri(), body.as_bytes())
}

const PROPFIND_REPLY: &str = "\
<?xml version=\"1.0\" encoding=\"utf-8\" ?>
<D:multistatus xmlns:D=\"DAV:\" xmlns:X=\"urn:example:vendor\">
  <X:server-hint>ignored</X:server-hint>
  <D:response>
    <D:href>/calendars/alice/</D:href>
    <X:foo/>
    <D:propstat>
      <D:prop>
        <D:displayname>Alice</D:displayname>
        <D:resourcetype><D:collection/></D:resourcetype>
        <X:quota-color>green</X:quota-color>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
    <D:propstat>
      <D:prop>
        <D:getetag/>
      </D:prop>
      <D:status>HTTP/1.1 404 Not Found</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>work.ics</D:href>
    <D:propstat>
      <D:prop>
        <D:getcontentlength>2048</D:getcontentlength>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:responsedescription>Two resources</D:responsedescription>
</D:multistatus>";

#[test]
fn multi_status_parses_responses_in_order() {
    let ms = parse(PROPFIND_REPLY).expect("Failed to parse Multi-Status");

    assert_eq!(ms.n_responses(), 2);
    assert_eq!(ms.description(), Some("Two resources"));

    let first = ms.response(0).unwrap();
    assert_eq!(first.hrefs(), vec![request_uri()]);
    assert_eq!(first.n_propstats(), 2);
    assert_eq!(first.status().code, 0);

    let second = ms.response(1).unwrap();
    assert_eq!(
        second.hrefs(),
        vec![Url::parse("https://dav.example.com/calendars/alice/work.ics").unwrap()]
    );
}

#[test]
fn multi_status_lists_are_independent_copies() {
    let mut ms = parse(PROPFIND_REPLY).unwrap();
    let responses = ms.responses();
    ms.push(Response::default());
    assert_eq!(responses.len(), 2);
    assert_eq!(ms.n_responses(), 3);

    let mut first = responses[0].clone();
    let propstats = first.propstats();
    first.push_propstat(PropStat::default());
    assert_eq!(propstats.len(), 2);
    assert_eq!(first.n_propstats(), 3);
    assert_eq!(ms.response(0).unwrap().n_propstats(), 2);
}

#[test]
fn multi_status_find_property_reports_status_and_value() {
    let ms = parse(PROPFIND_REPLY).unwrap();
    let response = ms.response_by_href(&request_uri()).unwrap();

    let (status, value) = response.find_property(TypeId::of(&DISPLAY_NAME));
    assert_eq!(status.code, 200);
    assert_eq!(value, Some(Value::from("Alice")));

    let (status, value) = response.find_property(TypeId::of(&RESOURCE_TYPE));
    assert_eq!(status.code, 200);
    assert_eq!(value, Some(Value::Flags(ResourceType::COLLECTION)));

    let (status, value) = response.find_property(TypeId::of(&GET_ETAG));
    assert_eq!(status.code, 404);
    assert_eq!(status.reason, "Not Found");
    assert_eq!(value, None);

    let (status, value) = response.find_property(TypeId::of(&GET_CONTENT_LENGTH));
    assert_eq!(status.code, 0);
    assert_eq!(value, None);
}

#[test]
fn multi_status_has_errors_from_failed_propstat() {
    let ms = parse(PROPFIND_REPLY).unwrap();
    assert!(ms.has_errors());
    assert_eq!(ms.failed_count(), 1);
    assert!(ms.response(0).unwrap().has_errors());
    assert!(!ms.response(1).unwrap().has_errors());
}

#[test]
fn multi_status_bad_status_line_fails() {
    let body = "\
<D:multistatus xmlns:D=\"DAV:\">
  <D:response>
    <D:href>/a</D:href>
    <D:status>Everything is fine</D:status>
  </D:response>
</D:multistatus>";

    let err = parse(body).unwrap_err();
    assert!(matches!(err, ParseError::ContentViolation(_)));
    assert!(err.to_string().contains("Everything is fine"));
}

#[test]
fn multi_status_bad_uint_fails_whole_document() {
    let body = "\
<D:multistatus xmlns:D=\"DAV:\">
  <D:response>
    <D:href>/a</D:href>
    <D:propstat>
      <D:prop><D:getcontentlength>-1</D:getcontentlength></D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>";

    assert!(matches!(parse(body), Err(ParseError::ContentViolation(_))));
}

#[test]
fn multi_status_malformed_and_empty_documents() {
    assert!(matches!(
        parse("<D:multistatus xmlns:D=\"DAV:\"><D:response>"),
        Err(ParseError::ParserFailed(_))
    ));
    assert!(matches!(parse(""), Err(ParseError::EmptyDocument)));
}

#[test]
fn multi_status_binds_by_requested_type() {
    let result: Result<MultiStatus, _> = new_from_bytes(
        TypeId::of(&MULTI_STATUS),
        &request_uri(),
        b"<D:prop xmlns:D=\"DAV:\"/>",
    );
    // The root element is not checked; its unrecognized children are skipped.
    assert_eq!(result.unwrap().n_responses(), 0);
}

#[test]
fn multi_status_reads_error_location_and_description() {
    let body = "\
<D:multistatus xmlns:D=\"DAV:\">
  <D:response>
    <D:href>/calendars/alice/locked/</D:href>
    <D:status>HTTP/1.1 423 Locked</D:status>
    <D:error><D:lock-token-submitted/><D:vendor-specific/></D:error>
    <D:responsedescription>Resource is locked</D:responsedescription>
  </D:response>
  <D:response>
    <D:href>/calendars/alice/old/</D:href>
    <D:status>HTTP/1.1 301 Moved Permanently</D:status>
    <D:location><D:href>/calendars/alice/new/</D:href></D:location>
  </D:response>
</D:multistatus>";

    let ms = parse(body).unwrap();
    let locked = ms.response(0).unwrap();
    assert_eq!(locked.status().code, 423);
    assert_eq!(locked.description(), Some("Resource is locked"));
    let error = locked.error().unwrap();
    assert!(error.conditions().contains(ErrorConditions::LOCK_TOKEN_SUBMITTED));
    assert_eq!(error.other_conditions().len(), 1);

    let moved = ms.response(1).unwrap();
    assert_eq!(moved.location(), Some("/calendars/alice/new/"));
    assert_eq!(ms.failed_count(), 2);
}

#[test]
fn multi_status_synthesized_from_plain_reply() {
    let ms = MultiStatus::from_message(403, "Forbidden", &request_uri(), b"<html/>").unwrap();
    assert_eq!(ms.n_responses(), 1);
    let response = ms.response(0).unwrap();
    assert_eq!(response.status().code, 403);
    assert_eq!(response.status().to_string(), "HTTP/1.1 403 Forbidden");
    assert!(response.has_href(&request_uri()));
}

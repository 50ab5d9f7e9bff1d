// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Client integration tests with wiremock.

use std::time::Duration;

use davwire::catalog::{DISPLAY_NAME, GET_ETAG};
use davwire::{
    Allow, AuthMethod, Compliance, CopyFlags, DavClient, DavConfig, DavError, Depth, LockFlags,
    LockScope, LockTimeout, PropFindType, Property, PropertySet, PropertyUpdate, RedirectLifetime,
    TypeId, Value, Verb,
};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> DavClient {
    let config = DavConfig {
        base_url: format!("{}/dav/", server.uri()),
        auth: AuthMethod::Basic {
            username: "alice".to_string(),
            password: "secret".to_string(),
        },
        ..Default::default()
    };
    DavClient::new(config).expect("Failed to create client")
}

#[tokio::test]
async fn client_propfind_returns_multi_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PROPFIND"))
        .and(path("/dav/calendars/"))
        .and(header("Depth", "1"))
        .and(header("Content-Type", "application/xml"))
        .and(header("Authorization", "Basic YWxpY2U6c2VjcmV0"))
        .and(body_string_contains("<D:displayname/>"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            "\
<?xml version=\"1.0\" encoding=\"utf-8\" ?>
<D:multistatus xmlns:D=\"DAV:\">
  <D:response>
    <D:href>/dav/calendars/</D:href>
    <D:propstat>
      <D:prop>
        <D:displayname>Calendars</D:displayname>
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
</D:multistatus>",
            "application/xml",
        ))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let prop =
        PropertySet::from_types([TypeId::of(&DISPLAY_NAME), TypeId::of(&GET_ETAG)]).unwrap();
    let ms = client
        .propfind("calendars/", PropFindType::Prop, Some(&prop), Depth::One)
        .await
        .expect("Failed to PROPFIND");

    assert_eq!(ms.n_responses(), 1);
    let href = client.resolve("calendars/").unwrap();
    let response = ms.response_by_href(&href).unwrap();
    let (status, value) = response.find_property(TypeId::of(&DISPLAY_NAME));
    assert_eq!(status.code, 200);
    assert_eq!(value, Some(Value::from("Calendars")));
    let (status, value) = response.find_property(TypeId::of(&GET_ETAG));
    assert_eq!(status.code, 404);
    assert_eq!(value, None);
}

#[tokio::test]
async fn client_propfind_requires_multi_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PROPFIND"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html/>"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client
        .propfind("/", PropFindType::AllProp, None, Depth::Zero)
        .await
        .unwrap_err();

    assert!(matches!(err, DavError::ExpectedMultiStatus { status: 200, .. }));
    assert_eq!(
        err.to_string(),
        "Expected status 207 (Multi-Status), but got 200 (OK)"
    );
}

#[tokio::test]
async fn client_proppatch_reports_per_property_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PROPPATCH"))
        .and(path("/dav/cal/"))
        .and(body_string_contains("<D:displayname>Team</D:displayname>"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            "\
<D:multistatus xmlns:D=\"DAV:\">
  <D:response>
    <D:href>/dav/cal/</D:href>
    <D:propstat>
      <D:prop><D:displayname/></D:prop>
      <D:status>HTTP/1.1 403 Forbidden</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>",
            "application/xml",
        ))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let mut update = PropertyUpdate::new();
    update.set(Property::with_value(TypeId::of(&DISPLAY_NAME), "Team").unwrap());

    let ms = client.proppatch("cal/", &update).await.unwrap();
    assert!(ms.has_errors());
    let (status, _) = ms.response(0).unwrap().find_property(TypeId::of(&DISPLAY_NAME));
    assert_eq!(status.code, 403);
}

#[tokio::test]
async fn client_options_parses_capabilities() {
    let mock_server = MockServer::start().await;

    Mock::given(method("OPTIONS"))
        .and(path("/dav/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("DAV", "1, 2, access-control, calendar-access")
                .insert_header("Allow", "OPTIONS, GET, PROPFIND, PROPPATCH, LOCK, UNLOCK"),
        )
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let caps = client.options("").await.expect("Failed to query OPTIONS");

    assert!(caps.compliance.contains(Compliance::CLASS_2));
    assert!(caps.compliance.contains(Compliance::CALENDAR_ACCESS));
    assert!(!caps.compliance.contains(Compliance::ADDRESSBOOK));
    assert!(caps.allow.contains(Allow::PROPFIND | Allow::LOCK));
    assert!(!caps.allow.contains(Allow::DELETE));
}

#[tokio::test]
async fn client_delete_multi_status_is_partial_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/dav/dir/"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            "\
<D:multistatus xmlns:D=\"DAV:\">
  <D:response>
    <D:href>/dav/dir/locked.txt</D:href>
    <D:status>HTTP/1.1 423 Locked</D:status>
  </D:response>
</D:multistatus>",
            "application/xml",
        ))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.delete("dir/").await.unwrap_err();

    let DavError::PartialFailure(ms) = err else {
        panic!("Expected partial failure, got {err:?}");
    };
    assert_eq!(ms.failed_count(), 1);
    assert_eq!(ms.response(0).unwrap().status().code, 423);
}

#[tokio::test]
async fn client_plain_status_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("MKCOL"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&mock_server)
        .await;
    Mock::given(method("COPY"))
        .and(header("Destination", &*format!("{}/dav/b", mock_server.uri())))
        .and(header("Overwrite", "F"))
        .respond_with(ResponseTemplate::new(412))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let err = client.mkcol("exists/").await.unwrap_err();
    assert_eq!(err.status(), Some(405));

    let flags = CopyFlags {
        no_overwrite: true,
        ..Default::default()
    };
    let err = client.copy("a", "b", flags).await.unwrap_err();
    assert!(matches!(err, DavError::Status { status: 412, .. }));
}

#[tokio::test]
async fn client_lock_and_unlock() {
    let mock_server = MockServer::start().await;

    Mock::given(method("LOCK"))
        .and(path("/dav/doc.txt"))
        .and(header("Timeout", "Second-600"))
        .and(body_string_contains("<D:exclusive/>"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Lock-Token", "<urn:uuid:f81d4fae>")
                .set_body_raw(
                    "\
<D:prop xmlns:D=\"DAV:\">
  <D:lockdiscovery>
    <D:activelock>
      <D:locktype><D:write/></D:locktype>
      <D:lockscope><D:exclusive/></D:lockscope>
      <D:depth>0</D:depth>
      <D:timeout>Second-600</D:timeout>
      <D:locktoken><D:href>urn:uuid:f81d4fae</D:href></D:locktoken>
    </D:activelock>
  </D:lockdiscovery>
</D:prop>",
                    "application/xml",
                ),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("UNLOCK"))
        .and(path("/dav/doc.txt"))
        .and(header("Lock-Token", "<urn:uuid:f81d4fae>"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let lock = client
        .lock(
            "doc.txt",
            LockScope::Exclusive,
            LockFlags::default(),
            Some("alice"),
            LockTimeout::from_seconds(600),
        )
        .await
        .expect("Failed to lock");

    let token = lock.lock_token.clone().unwrap();
    assert_eq!(token, "urn:uuid:f81d4fae");
    let active = lock.active_lock(&token).unwrap();
    assert_eq!(active.depth, Depth::Zero);
    assert_eq!(active.timeout, Some(LockTimeout::Seconds(600)));

    client
        .unlock("doc.txt", &token)
        .await
        .expect("Failed to unlock");
}

#[tokio::test]
async fn client_redirect_reference_contract() {
    let mock_server = MockServer::start().await;

    Mock::given(method("MKREDIRECTREF"))
        .and(body_string_contains("<D:temporary/>"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&mock_server)
        .await;
    Mock::given(method("UPDATEREDIRECTREF"))
        .and(header("Apply-To-Redirect-Ref", "T"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    client
        .mkredirectref("old", Some("new"), RedirectLifetime::Temporary)
        .await
        .expect("Failed to create redirect reference");
    client
        .updateredirectref("old", None, RedirectLifetime::Permanent)
        .await
        .expect("Failed to update redirect reference");
}

#[tokio::test]
async fn client_start_and_finish_with_callback() {
    let mock_server = MockServer::start().await;

    Mock::given(method("MKCOL"))
        .and(path("/dav/new/"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let (tx, rx) = tokio::sync::oneshot::channel();
    let operation = client.mkcol_start(
        "new/",
        None,
        Box::new(move |result| {
            let _ = tx.send(result);
        }),
    );
    operation.await;

    let result = rx.await.expect("Callback was not invoked");
    assert_eq!(result.verb(), Verb::MkCol);
    assert!(result.is_ok());
    DavClient::mkcol_finish(result).expect("MKCOL failed");
}

#[tokio::test]
async fn client_finish_rejects_result_of_another_verb() {
    let mock_server = MockServer::start().await;

    Mock::given(method("MKCOL"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let (tx, rx) = tokio::sync::oneshot::channel();
    client
        .mkcol_start(
            "new/",
            None,
            Box::new(move |result| {
                let _ = tx.send(result);
            }),
        )
        .await;

    let err = DavClient::delete_finish(rx.await.unwrap()).unwrap_err();
    assert!(matches!(
        err,
        DavError::OperationMismatch {
            expected: "DELETE",
            actual: "MKCOL"
        }
    ));
}

#[tokio::test]
async fn client_cancellation_stops_operation() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PROPFIND"))
        .respond_with(ResponseTemplate::new(207).set_delay(Duration::from_secs(10)))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let (tx, rx) = tokio::sync::oneshot::channel();
    client
        .propfind_start(
            "/",
            PropFindType::AllProp,
            None,
            Depth::Zero,
            Some(token),
            Box::new(move |result| {
                let _ = tx.send(result);
            }),
        )
        .await;

    let err = DavClient::propfind_finish(rx.await.unwrap()).unwrap_err();
    assert!(matches!(err, DavError::Cancelled));
}

#[tokio::test(flavor = "multi_thread")]
async fn client_blocking_call_from_plain_thread() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/dav/old.ics"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let worker = std::thread::spawn(move || client.delete_blocking("old.ics", None));
    let result = tokio::task::spawn_blocking(move || worker.join())
        .await
        .unwrap()
        .expect("Blocking worker panicked");

    result.expect("Blocking DELETE failed");
}

#[tokio::test]
async fn client_blocking_call_inside_runtime_is_rejected() {
    let mock_server = MockServer::start().await;
    let client = client_for(&mock_server);

    let err = client.options_blocking("", None).unwrap_err();
    assert!(matches!(err, DavError::Config(_)));
}

#[test]
fn client_rejects_invalid_base_url() {
    let config = DavConfig {
        base_url: "not a url".to_string(),
        ..Default::default()
    };
    assert!(matches!(DavClient::new(config), Err(DavError::InvalidUrl(_))));
}

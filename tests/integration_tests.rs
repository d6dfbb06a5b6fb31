//! Integration tests using mock HTTP server
//!
//! Tests the full flow: YAML profile → REST caller → paginated fetch →
//! attachment assembly

use pagekit::config::load_profile_from_str;
use pagekit::http::{HttpCallerConfig, Request, RestCaller};
use pagekit::nodes::drive::{delete_drive, list_drives, DriveListQuery};
use pagekit::nodes::outlook::{download_attachments, get_mime_content, list_messages, MessageQuery};
use pagekit::nodes::ListOptions;
use pagekit::pagination::{fetch_all, LinkCursor, OffsetSkip};
use pagekit::{AuthConfig, Error};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn mail_profile(server: &MockServer) -> String {
    format!(
        r#"
name: test-mail
base_url: {uri}/v1.0/me
shared_mailbox_base_url: {uri}/v1.0/users/{{{{ vars.shared_mailbox }}}}
auth:
  type: bearer
  token: "{{{{ vars.token }}}}"
"#,
        uri = server.uri()
    )
}

fn mail_caller(server: &MockServer, vars: serde_json::Value) -> RestCaller {
    load_profile_from_str(&mail_profile(server))
        .unwrap()
        .resolve(&vars)
        .unwrap()
        .into_caller()
        .unwrap()
}

// ============================================================================
// Mail
// ============================================================================

#[tokio::test]
async fn test_messages_with_attachments_end_to_end() {
    let server = MockServer::start().await;
    let uri = server.uri();

    Mock::given(method("GET"))
        .and(path("/v1.0/me/messages"))
        .and(query_param("$top", "100"))
        .and(header("Authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                {"id": "m1", "subject": "Invoice", "hasAttachments": true},
                {"id": "m2", "subject": "Hello", "hasAttachments": false}
            ],
            "@odata.nextLink": format!("{uri}/v1.0/me/messages/page2")
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1.0/me/messages/page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{"id": "m3", "subject": "Later", "hasAttachments": false}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1.0/me/messages/m1/attachments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{"id": "a1", "name": "invoice.pdf", "contentType": "application/pdf"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1.0/me/messages/m1/attachments/a1/$value"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"%PDF-1.7".to_vec())
                .insert_header("content-type", "application/octet-stream"),
        )
        .mount(&server)
        .await;

    let caller = mail_caller(&server, json!({"token": "secret"}));
    let messages = list_messages(&caller, ListOptions::all(), &MessageQuery::default())
        .await
        .unwrap();
    assert_eq!(messages.len(), 3);

    let assembled = download_attachments(&caller, messages, "attachment_").await.unwrap();

    assert_eq!(assembled.len(), 3);
    let payload = assembled[0].payload("attachment_0").unwrap();
    assert_eq!(payload.mime_type, "application/pdf");
    assert_eq!(payload.file_extension.as_deref(), Some("pdf"));
    assert_eq!(&payload.bytes[..], b"%PDF-1.7");
    assert!(assembled[1].binary.is_none());
    assert!(assembled[2].binary.is_none());

    let serialized = serde_json::to_value(&assembled[1]).unwrap();
    assert!(serialized.get("binary").is_none());
}

#[tokio::test]
async fn test_shared_mailbox_mime_content() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1.0/users/team@contoso.com/messages/AAMk1/$value"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"Subject: hi\r\n\r\nbody".to_vec())
                .insert_header("content-type", "message/rfc822"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let caller = mail_caller(
        &server,
        json!({"token": "secret", "shared_mailbox": "team@contoso.com"}),
    );
    let payload = get_mime_content(&caller, "AAMk1", "data", Some("export"))
        .await
        .unwrap();

    assert_eq!(payload.file_name.as_deref(), Some("export.eml"));
    assert_eq!(payload.mime_type, "message/rfc822");
}

#[tokio::test]
async fn test_bad_request_message_refined() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1.0/me/messages"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": "BadRequest", "message": "Invalid filter clause"}
        })))
        .mount(&server)
        .await;

    let caller = mail_caller(&server, json!({"token": "secret"}));
    let query = MessageQuery {
        filter: Some("nonsense".into()),
        ..Default::default()
    };
    let err = list_messages(&caller, ListOptions::all(), &query)
        .await
        .unwrap_err();

    match err {
        Error::HttpStatus { status, message, .. } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid filter clause");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_missing_items_field_fails_whole_fetch() {
    let server = MockServer::start().await;
    let uri = server.uri();

    Mock::given(method("GET"))
        .and(path("/v1.0/me/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{"id": "m1"}],
            "@odata.nextLink": format!("{uri}/v1.0/me/messages/page2")
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1.0/me/messages/page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&server)
        .await;

    let caller = mail_caller(&server, json!({"token": "secret"}));
    let result = fetch_all(&caller, &LinkCursor::odata(), Request::get("/messages"), "value").await;

    assert!(matches!(result, Err(Error::PaginationProtocol { .. })));
}

#[tokio::test]
async fn test_offset_skip_against_server() {
    let server = MockServer::start().await;

    for (skip, count) in [(0, 100), (100, 100), (200, 37)] {
        let items: Vec<_> = (0..count).map(|n| json!({"id": skip + n})).collect();
        Mock::given(method("GET"))
            .and(path("/v1.0/me/mailFolders/inbox/messages"))
            .and(query_param("$top", "100"))
            .and(query_param("$skip", skip.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": items})))
            .expect(1)
            .mount(&server)
            .await;
    }

    let caller = mail_caller(&server, json!({"token": "secret"}));
    let items = fetch_all(
        &caller,
        &OffsetSkip::new(100),
        Request::get("/mailFolders/inbox/messages"),
        "value",
    )
    .await
    .unwrap();

    assert_eq!(items.len(), 237);
    assert_eq!(items[236]["id"], 236);
}

// ============================================================================
// Shared drives
// ============================================================================

#[tokio::test]
async fn test_drives_with_refresh_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.fresh",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/drives"))
        .and(header("Authorization", "Bearer ya29.fresh"))
        .and(query_param("pageToken", "t2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "drives": [{"id": "d3"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/drives"))
        .and(header("Authorization", "Bearer ya29.fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "drives": [{"id": "d1"}, {"id": "d2"}],
            "nextPageToken": "t2"
        })))
        .mount(&server)
        .await;

    let config = HttpCallerConfig::builder().base_url(server.uri()).build();
    let auth = AuthConfig::Oauth2Refresh {
        token_url: format!("{}/token", server.uri()),
        client_id: "client".into(),
        client_secret: "secret".into(),
        refresh_token: "refresh".into(),
        scopes: vec!["https://www.googleapis.com/auth/drive".into()],
    };
    let caller = RestCaller::with_auth(config, auth).unwrap();

    let drives = list_drives(&caller, ListOptions::all(), &DriveListQuery::default())
        .await
        .unwrap();

    let ids: Vec<_> = drives.iter().map(|d| d["id"].clone()).collect();
    assert_eq!(ids, vec![json!("d1"), json!("d2"), json!("d3")]);
}

#[tokio::test]
async fn test_delete_drive_end_to_end() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/drive/v3/drives/0AB12"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let caller = RestCaller::new(HttpCallerConfig::builder().base_url(server.uri()).build()).unwrap();
    let result = delete_drive(&caller, "0AB12").await.unwrap();

    assert_eq!(result, json!({"success": true}));
}

#[tokio::test]
async fn test_unauthorized_surfaces_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/drives"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Invalid Credentials"}
        })))
        .mount(&server)
        .await;

    let config = HttpCallerConfig::builder().base_url(server.uri()).build();
    let caller = RestCaller::with_auth(config, AuthConfig::Bearer { token: "stale".into() }).unwrap();

    let err = list_drives(&caller, ListOptions::limit(10), &DriveListQuery::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Auth { .. }));
}

//! End-to-end tests against a local mock server.
//!
//! These check what actually reaches the wire: framing headers and body
//! bytes as received by the server.

use std::io::Write;

use chunked_upload::{ApiClient, ClientError, HttpConfig, HttpVersionPolicy, UploadForm};
use reqwest::Method;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, TRANSFER_ENCODING};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn upload_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/uploads"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": "up-1"})))
        .mount(&server)
        .await;
    server
}

async fn single_request(server: &MockServer) -> wiremock::Request {
    let mut requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    requests.remove(0)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[tokio::test]
async fn chunked_upload_omits_content_length() {
    let server = upload_server().await;
    let client = ApiClient::new(server.uri())
        .unwrap()
        .enable_chunked_transfer()
        .unwrap();

    let payload: Vec<u8> = (0..4096u32).map(|i| (i % 251) as u8).collect();
    let form = UploadForm::new()
        .text("description", "nightly")
        .bytes("file", "nightly.bin", payload.clone())
        .unwrap();
    let response = client.upload("/v1/uploads", form).await.unwrap();
    assert_eq!(response.status, 201);

    let received = single_request(&server).await;
    assert!(received.headers.get(CONTENT_LENGTH).is_none());
    let te = received.headers[TRANSFER_ENCODING].to_str().unwrap();
    assert!(te.eq_ignore_ascii_case("chunked"), "unexpected transfer-encoding: {te}");
    assert!(
        received.headers[CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("multipart/form-data")
    );
    assert!(contains(&received.body, &payload));
    assert!(contains(&received.body, b"nightly"));
}

#[tokio::test]
async fn plain_upload_declares_content_length() {
    let server = upload_server().await;
    let client = ApiClient::builder()
        .with_base_url(server.uri())
        .with_http_config(HttpConfig::builder().chunked_transfer(false).build())
        .build()
        .unwrap();
    assert!(!client.is_chunked_transfer_enabled());

    let form = UploadForm::new()
        .bytes("file", "notes.txt", b"remember the milk".to_vec())
        .unwrap();
    client.upload("/v1/uploads", form).await.unwrap();

    let received = single_request(&server).await;
    assert!(received.headers.get(TRANSFER_ENCODING).is_none());
    let declared: usize = received.headers[CONTENT_LENGTH]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(declared, received.body.len());
}

#[tokio::test]
async fn chunked_file_upload_preserves_bytes() {
    let server = upload_server().await;
    let client = ApiClient::builder()
        .with_base_url(server.uri())
        .with_chunked_transfer()
        .build()
        .unwrap();
    assert_eq!(client.config().http_version(), HttpVersionPolicy::Http1Only);

    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    let contents = "id,name\n".to_string() + &"1,row\n".repeat(2000);
    file.write_all(contents.as_bytes()).unwrap();

    let form = UploadForm::new().file("table", file.path()).await.unwrap();
    client.upload("/v1/uploads", form).await.unwrap();

    let received = single_request(&server).await;
    assert!(received.headers.get(CONTENT_LENGTH).is_none());
    assert!(contains(&received.body, contents.as_bytes()));
    assert!(contains(&received.body, b"Content-Type: text/csv"));
}

#[tokio::test]
async fn json_body_keeps_content_length_when_chunking_enabled() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/documents"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri())
        .unwrap()
        .enable_chunked_transfer()
        .unwrap();
    let payload = r#"{"name":"report","size":1024,"ok":10}"#;
    let request = client
        .request(Method::POST, "/v1/documents")
        .header(CONTENT_TYPE, "application/json")
        .body(payload)
        .build()
        .unwrap();
    client.invoke(request).await.unwrap();

    let received = single_request(&server).await;
    assert_eq!(received.headers[CONTENT_LENGTH], "37");
    assert!(received.headers.get(TRANSFER_ENCODING).is_none());
    assert_eq!(received.body, payload.as_bytes());
}

#[tokio::test]
async fn server_error_is_reported_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/uploads"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri())
        .unwrap()
        .enable_chunked_transfer()
        .unwrap();
    let form = UploadForm::new().text("a", "b");
    let err = client.upload("/v1/uploads", form).await.unwrap_err();

    match &err {
        ClientError::ApiError { code, message, .. } => {
            assert_eq!(*code, 503);
            assert_eq!(message, "maintenance");
        }
        other => panic!("expected ApiError(503), got: {other:?}"),
    }
    assert!(err.is_retryable());
}

//! End-to-end tests for the burn API
//!
//! Each test runs the router against an in-memory SQLite database and a
//! temporary storage directory.

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use lopdf::{dictionary, Document, Object, Stream};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tempfile::TempDir;

use crate::state::AppState;

struct Harness {
    server: TestServer,
    storage: TempDir,
}

async fn harness(public_base_url: Option<&str>) -> Harness {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let storage = tempfile::tempdir().unwrap();
    let state = AppState::with_pool(
        pool,
        storage.path().to_path_buf(),
        public_base_url.map(str::to_string),
    )
    .await
    .unwrap();

    let app = crate::router(Arc::new(state), 1024 * 1024);
    Harness {
        server: TestServer::new(app).unwrap(),
        storage,
    }
}

/// One blank US Letter page
fn letter_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(612),
            Object::Integer(792),
        ],
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

fn sign_body(document_id: Option<&str>) -> Value {
    let mut body = json!({
        "documentBase64": STANDARD.encode(letter_pdf()),
        "fields": [
            {
                "id": "name",
                "page": 1,
                "type": "text",
                "xPct": 0.1, "yPct": 0.1, "wPct": 0.4, "hPct": 0.05,
                "value": "Jane Doe",
            },
            {
                "id": "bad",
                "page": 1,
                "type": "text",
                "xPct": 0.9, "yPct": 0.1, "wPct": 0.2, "hPct": 0.05,
                "value": "overflow",
            },
        ],
    });
    if let Some(id) = document_id {
        body["documentId"] = json!(id);
    }
    body
}

fn file_name(url: &str) -> &str {
    url.rsplit('/').next().unwrap()
}

#[tokio::test]
async fn test_health() {
    let h = harness(None).await;
    let response = h.server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");
}

#[tokio::test]
async fn test_sign_pdf_stores_file_and_audit() {
    let h = harness(Some("https://sign.example/")).await;

    let response = h.server.post("/api/sign-pdf").json(&sign_body(Some("lease-42"))).await;
    response.assert_status_ok();
    let body: Value = response.json();

    assert_eq!(body["documentId"], "lease-42");
    let url = body["url"].as_str().unwrap();
    assert!(url.starts_with("https://sign.example/files/signed_lease-42_"));
    assert_ne!(body["originalHash"], body["finalHash"]);

    let stored = std::fs::read(h.storage.path().join(file_name(url))).unwrap();
    assert_eq!(
        field_burner::sha256_hex(&stored),
        body["finalHash"].as_str().unwrap()
    );

    let trail: Value = h.server.get("/api/audit/lease-42").await.json();
    let entries = trail.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["signedUrl"], url);
    assert_eq!(entries[0]["finalHash"], body["finalHash"]);
    // Only the valid field is recorded
    assert_eq!(entries[0]["fields"].as_array().unwrap().len(), 1);
    assert_eq!(entries[0]["fields"][0]["id"], "name");
    assert_eq!(entries[0]["fields"][0]["type"], "text");
}

#[tokio::test]
async fn test_document_id_defaults_to_original_hash() {
    let h = harness(None).await;
    let body: Value = h.server.post("/api/sign-pdf").json(&sign_body(None)).await.json();
    assert_eq!(body["documentId"], body["originalHash"]);
}

#[tokio::test]
async fn test_url_derived_from_forwarded_headers() {
    let h = harness(None).await;
    let body: Value = h
        .server
        .post("/api/sign-pdf")
        .add_header(
            HeaderName::from_static("x-forwarded-proto"),
            HeaderValue::from_static("https"),
        )
        .add_header(
            HeaderName::from_static("host"),
            HeaderValue::from_static("docs.example"),
        )
        .json(&sign_body(Some("doc")))
        .await
        .json();
    assert!(body["url"]
        .as_str()
        .unwrap()
        .starts_with("https://docs.example/files/signed_doc_"));
}

#[tokio::test]
async fn test_stored_file_served_inline() {
    let h = harness(None).await;
    let body: Value = h
        .server
        .post("/api/sign-pdf")
        .json(&sign_body(Some("doc")))
        .await
        .json();
    let name = file_name(body["url"].as_str().unwrap()).to_string();

    let response = h.server.get(&format!("/files/{}", name)).await;
    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "application/pdf");
    assert!(response
        .header("content-disposition")
        .to_str()
        .unwrap()
        .starts_with("inline"));
    assert!(response.as_bytes().starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_unknown_file_is_not_found() {
    let h = harness(None).await;
    let response = h.server.get("/files/signed_missing.pdf").await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = h.server.get("/files/notes.txt").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_inputs_rejected() {
    let h = harness(None).await;

    let response = h
        .server
        .post("/api/sign-pdf")
        .json(&json!({ "fields": [{}] }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "MISSING_INPUT");
    assert_eq!(body["error"], "documentBase64 is required");

    let response = h
        .server
        .post("/api/sign-pdf")
        .json(&json!({ "documentBase64": "JVBERg==", "fields": [] }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "fields is required");
}

#[tokio::test]
async fn test_non_object_bodies_are_missing_input() {
    let h = harness(None).await;

    let response = h.server.post("/api/sign-pdf").json(&json!(null)).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "MISSING_INPUT");
    assert_eq!(body["error"], "documentBase64 is required");

    let response = h.server.post("/api/sign-pdf").json(&json!([1, 2])).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "MISSING_INPUT");

    // Not declared as JSON
    let response = h.server.post("/api/sign-pdf").text("hello").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "MISSING_INPUT");
}

#[tokio::test]
async fn test_unparseable_body_is_invalid_input() {
    let h = harness(None).await;
    let response = h
        .server
        .post("/api/sign-pdf")
        .text("{not json")
        .content_type("application/json")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
    assert_eq!(body["error"], "Invalid request body");
}

#[tokio::test]
async fn test_oversized_body_rejected_as_json() {
    let h = harness(None).await;
    let response = h
        .server
        .post("/api/sign-pdf")
        .json(&json!({
            "documentBase64": "A".repeat(2 * 1024 * 1024),
            "fields": [{}],
        }))
        .await;
    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.json::<Value>()["code"], "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn test_invalid_base64_rejected() {
    let h = harness(None).await;
    let response = h
        .server
        .post("/api/sign-pdf")
        .json(&json!({ "documentBase64": "@@@@", "fields": [{}] }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_malformed_pdf_rejected() {
    let h = harness(None).await;
    let response = h
        .server
        .post("/api/sign-pdf")
        .json(&json!({
            "documentBase64": STANDARD.encode(b"not a pdf at all"),
            "fields": [{}],
        }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>()["code"], "MALFORMED_DOCUMENT");

    // Nothing was stored
    assert_eq!(std::fs::read_dir(h.storage.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_unknown_document_has_empty_trail() {
    let h = harness(None).await;
    let trail: Value = h.server.get("/api/audit/nope").await.json();
    assert_eq!(trail, json!([]));
}

//! FirestoreClient against a fake Firestore REST endpoint served by Axum.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};
use shift_lookup::config::Config;
use shift_lookup::core::models::{DeviceId, DisplayResult, HistoryEntry};
use shift_lookup::core::session::Phase;
use shift_lookup::core::store::{HistoryLog, ScheduleStore};
use shift_lookup::firestore::FirestoreClient;
use shift_lookup::LookupApp;
use std::sync::{Arc, Mutex};

const ROOT: &str = "/v1/projects/tra-lich-lam/databases/(default)/documents";

#[derive(Clone, Default)]
struct Fake {
    /// (method, path, query, body) of every request received.
    requests: Arc<Mutex<Vec<(Method, String, String, Value)>>>,
    fail_writes: bool,
}

async fn handle(State(fake): State<Fake>, method: Method, uri: Uri, body: Bytes) -> Response {
    let path = uri.path().to_string();
    let query = uri.query().unwrap_or("").to_string();
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    fake.requests
        .lock()
        .unwrap()
        .push((method.clone(), path.clone(), query, body.clone()));

    let schedule = format!("{}/schedules/123456789", ROOT);
    let run_query = format!("{}:runQuery", ROOT);

    if method == Method::GET && path == schedule {
        return Json(json!({
            "name": "projects/tra-lich-lam/databases/(default)/documents/schedules/123456789",
            "fields": {
                "updatedAt": { "stringValue": "2026-10-16T06:00:00Z" },
                "shifts": { "arrayValue": { "values": [
                    { "stringValue": "Ca 1: 08:00-12:00" },
                    { "stringValue": "Ca 2: 13:00-17:00" }
                ] } }
            }
        }))
        .into_response();
    }
    if method == Method::GET && path.starts_with(&format!("{}/schedules/", ROOT)) {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": { "code": 404 } }))).into_response();
    }
    if method == Method::PATCH && path.starts_with(&format!("{}/search_history/", ROOT)) {
        if fake.fail_writes {
            return (StatusCode::FORBIDDEN, "denied").into_response();
        }
        return Json(body).into_response();
    }
    if method == Method::POST && path == run_query {
        return Json(json!([
            { "readTime": "2026-10-16T06:00:00Z" },
            { "document": { "name": "h/2", "fields": {
                "id": { "stringValue": "2" },
                "term": { "stringValue": "123456789" },
                "timestamp": { "integerValue": "2" },
                "resultCount": { "integerValue": "1" },
                "savedResults": { "arrayValue": { "values": [ { "stringValue": "Ca 1" } ] } },
                "deviceId": { "stringValue": "dev_test" }
            } } },
            { "document": { "name": "h/1", "fields": {
                "id": { "stringValue": "1" },
                "term": { "stringValue": "999999999" },
                "timestamp": { "integerValue": "1" },
                "resultCount": { "integerValue": "0" },
                "savedResults": { "arrayValue": {} },
                "deviceId": { "stringValue": "dev_test" }
            } } }
        ]))
        .into_response();
    }
    (StatusCode::INTERNAL_SERVER_ERROR, "unexpected request").into_response()
}

async fn serve(fake: Fake) -> String {
    let app = Router::new().fallback(handle).with_state(fake);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/v1", addr)
}

fn client(base_url: String, api_key: Option<&str>) -> FirestoreClient {
    let mut remote = Config::minimal().remote;
    remote.project_id = "tra-lich-lam".to_string();
    remote.base_url = base_url;
    remote.api_key = api_key.map(str::to_string);
    FirestoreClient::new(&remote).unwrap()
}

#[tokio::test]
async fn test_get_schedule_found_and_missing() {
    let fake = Fake::default();
    let client = client(serve(fake.clone()).await, Some("secret"));

    let rec = client.get_schedule("123456789").await.unwrap().unwrap();
    assert_eq!(rec.shifts, vec!["Ca 1: 08:00-12:00", "Ca 2: 13:00-17:00"]);
    assert_eq!(rec.updated_at, "2026-10-16T06:00:00Z");

    assert_eq!(client.get_schedule("999999999").await.unwrap(), None);

    let requests = fake.requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].2, "key=secret");
}

#[tokio::test]
async fn test_server_error_is_an_error_not_a_miss() {
    let fake = Fake::default();
    let mut remote = Config::minimal().remote;
    remote.project_id = "other-project".to_string();
    remote.base_url = serve(fake).await;
    let client = FirestoreClient::new(&remote).unwrap();

    assert!(client.get_schedule("123456789").await.is_err());
}

#[tokio::test]
async fn test_unreachable_host_is_an_error() {
    let client = client("http://127.0.0.1:9/v1".to_string(), None);
    assert!(client.get_schedule("123456789").await.is_err());
}

#[tokio::test]
async fn test_append_patches_composite_document() {
    let fake = Fake::default();
    let client = client(serve(fake.clone()).await, None);

    let entry = HistoryEntry::record(
        "123456789",
        &[DisplayResult::new("Ca 1")],
        Some(&DeviceId::new("dev_test")),
        1_760_600_000_000,
    );
    client.append(&entry).await.unwrap();

    let requests = fake.requests.lock().unwrap();
    let (method, path, query, body) = &requests[0];
    assert_eq!(*method, Method::PATCH);
    assert_eq!(
        path,
        &format!("{}/search_history/1760600000000_123456789", ROOT)
    );
    assert_eq!(query, "");
    assert_eq!(body["fields"]["term"]["stringValue"], "123456789");
    assert_eq!(body["fields"]["resultCount"]["integerValue"], "1");
}

#[tokio::test]
async fn test_append_failure_is_reported() {
    let fake = Fake {
        fail_writes: true,
        ..Fake::default()
    };
    let client = client(serve(fake).await, None);
    let entry = HistoryEntry::record("123456789", &[], None, 1);
    let err = client.append(&entry).await.unwrap_err().to_string();
    assert!(err.contains("403"), "{err}");
}

#[tokio::test]
async fn test_recent_sends_structured_query() {
    let fake = Fake::default();
    let client = client(serve(fake.clone()).await, None);

    let entries = client.recent(&DeviceId::new("dev_test"), 50).await.unwrap();
    let terms: Vec<&str> = entries.iter().map(|e| e.term.as_str()).collect();
    assert_eq!(terms, vec!["123456789", "999999999"]);
    assert_eq!(entries[0].saved_results, vec!["Ca 1"]);

    let requests = fake.requests.lock().unwrap();
    let query = &requests[0].3["structuredQuery"];
    assert_eq!(query["from"][0]["collectionId"], "search_history");
    assert_eq!(query["where"]["fieldFilter"]["op"], "EQUAL");
    assert_eq!(
        query["where"]["fieldFilter"]["value"]["stringValue"],
        "dev_test"
    );
    assert_eq!(query["orderBy"][0]["direction"], "DESCENDING");
    assert_eq!(query["limit"], 50);
}

#[tokio::test]
async fn test_full_flow_over_http() {
    let fake = Fake::default();
    let client = client(serve(fake.clone()).await, None);
    let mut app = LookupApp::new(Arc::new(client), 50);

    app.start(DeviceId::new("dev_test")).await;
    assert_eq!(app.state().history.len(), 2);

    let state = app.search("123456789").await;
    assert_eq!(state.phase, Phase::Found);
    assert_eq!(state.results.len(), 2);
    assert_eq!(state.history.len(), 3);

    app.flush().await;
    assert!(app.drain_diagnostics().is_empty());
    let requests = fake.requests.lock().unwrap();
    assert!(requests.iter().any(|(m, p, _, _)| *m == Method::PATCH
        && p.starts_with(&format!("{}/search_history/", ROOT))
        && p.ends_with("_123456789")));
}

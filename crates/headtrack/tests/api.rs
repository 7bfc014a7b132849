//! End-to-end tests for the HTTP API.
//!
//! Each test builds a router over its own temp-file store and credential
//! file and drives it with one-shot requests, covering the session gate,
//! the inventory round trips, and the export endpoints.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use axum_extra::extract::cookie::Key;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use headtrack::server::{router, AppState};
use headtrack::{CredentialStore, Store};

const PASSWORD: &str = "Sewing@123";

struct TestApp {
    app: Router,
    database_path: std::path::PathBuf,
    credentials_path: std::path::PathBuf,
}

impl TestApp {
    fn new(name: &str) -> Self {
        let dir = std::env::temp_dir();
        let database_path = dir.join(format!("headtrack_api_{}_{}.json", name, std::process::id()));
        let credentials_path =
            dir.join(format!("headtrack_api_{}_{}_creds.json", name, std::process::id()));
        let _ = std::fs::remove_file(&database_path);
        let _ = std::fs::remove_file(&credentials_path);

        let store = Arc::new(Store::open(&database_path).unwrap());
        let credentials = Arc::new(CredentialStore::open(&credentials_path, PASSWORD).unwrap());
        let app = router(AppState::new(store, credentials, Key::generate()));

        Self {
            app,
            database_path,
            credentials_path,
        }
    }

    async fn request(&self, request: Request<Body>) -> Response<axum::body::Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// Log in and return the session cookie to send on later requests.
    async fn login(&self) -> String {
        let response = self
            .request(form_request("/login", &format!("password={PASSWORD}"), ""))
            .await;
        assert!(response.status().is_redirection());
        assert_eq!(location(&response), "/");
        cookies(&response)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.database_path);
        let _ = std::fs::remove_file(&self.credentials_path);
    }
}

fn form_request(uri: &str, body: &str, cookie: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if !cookie.is_empty() {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, cookie: &str) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if !cookie.is_empty() {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// Collect the cookies a response sets, as a Cookie header value.
fn cookies(response: &Response<axum::body::Body>) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| {
            value
                .to_str()
                .unwrap()
                .split(';')
                .next()
                .unwrap()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn location(response: &Response<axum::body::Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .map(|value| value.to_str().unwrap().to_string())
        .unwrap_or_default()
}

async fn json_body(response: Response<axum::body::Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn add_body(head_number: &str, location: &str) -> String {
    let location = location.replace(' ', "+");
    format!(
        "Machine+Type=Embroidery&Brand=Tajima&Model=TMAR-K&Serial+Number=SN-{head_number}\
         &Head+Number={head_number}&Current+Location={location}&Handed+Over+to=Stores\
         &Accessories=&Previous+Location="
    )
}

#[tokio::test]
async fn api_requests_without_session_are_unauthorized() {
    let app = TestApp::new("unauthorized");

    let response = app.request(get_request("/get_machine?headNumber=H1", "")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.request(form_request("/add_machine", &add_body("H1", "A"), "")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = json_body(response).await;
    assert_eq!(body["success"], Value::Bool(false));
}

#[tokio::test]
async fn pages_without_session_redirect_to_login() {
    let app = TestApp::new("redirects");

    let response = app.request(get_request("/", "")).await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/login");

    let response = app.request(form_request("/export", "", "")).await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let app = TestApp::new("bad_login");

    let response = app
        .request(form_request("/login", "password=nope", ""))
        .await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/login");

    // No session cookie was granted; the API stays closed.
    let granted = cookies(&response);
    let response = app
        .request(get_request("/get_machine?headNumber=H1", &granted))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_opens_a_session() {
    let app = TestApp::new("login");
    let session = app.login().await;

    let response = app.request(get_request("/", &session)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn logout_closes_the_session() {
    let app = TestApp::new("logout");
    let session = app.login().await;

    let response = app.request(get_request("/logout", &session)).await;
    assert!(response.status().is_redirection());

    // The logout response clears the cookie; sending the cleared cookie
    // value must not authenticate.
    let cleared = cookies(&response);
    let response = app
        .request(get_request("/get_machine?headNumber=H1", &cleared))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn add_then_get_round_trip() {
    let app = TestApp::new("add_get");
    let session = app.login().await;

    let response = app
        .request(form_request("/add_machine", &add_body("H1", "Floor A"), &session))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], Value::Bool(true));

    // Lookup is case-insensitive.
    let response = app
        .request(get_request("/get_machine?headNumber=h1", &session))
        .await;
    let body = json_body(response).await;
    assert_eq!(body["success"], Value::Bool(true));
    assert_eq!(body["machine"]["Head Number"], "H1");
    assert_eq!(body["machine"]["Current Location"], "Floor A");
    assert_eq!(body["machine"]["Sr#"], "1");
    assert_ne!(body["machine"]["TimeStamp"], "");
}

#[tokio::test]
async fn get_unknown_machine_reports_not_found() {
    let app = TestApp::new("get_missing");
    let session = app.login().await;

    let response = app
        .request(get_request("/get_machine?headNumber=H9", &session))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], Value::Bool(false));
    assert_eq!(body["message"], "Machine not found!");
}

#[tokio::test]
async fn move_updates_location_and_custody() {
    let app = TestApp::new("move");
    let session = app.login().await;
    app.request(form_request("/add_machine", &add_body("H1", "A"), &session))
        .await;

    let response = app
        .request(form_request(
            "/move_machine",
            "headNumber=H1&newLocation=B&handedTo=Alice&accessories=bobbin",
            &session,
        ))
        .await;
    let body = json_body(response).await;
    assert_eq!(body["success"], Value::Bool(true));

    let response = app
        .request(get_request("/get_machine?headNumber=H1", &session))
        .await;
    let body = json_body(response).await;
    assert_eq!(body["machine"]["Current Location"], "B");
    assert_eq!(body["machine"]["Previous Location"], "A");
    assert_eq!(body["machine"]["Handed Over to"], "Alice");
    assert_eq!(body["machine"]["Accessories"], "bobbin");
}

#[tokio::test]
async fn move_unknown_machine_fails() {
    let app = TestApp::new("move_missing");
    let session = app.login().await;

    let response = app
        .request(form_request(
            "/move_machine",
            "headNumber=H9&newLocation=B&handedTo=&accessories=",
            &session,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], Value::Bool(false));
    assert_eq!(body["message"], "Machine not found!");
}

#[tokio::test]
async fn edit_overwrites_only_provided_fields() {
    let app = TestApp::new("edit");
    let session = app.login().await;
    app.request(form_request("/add_machine", &add_body("H1", "Floor A"), &session))
        .await;

    let response = app
        .request(form_request(
            "/edit_machine",
            "headNumber=H1&Brand=Barudan",
            &session,
        ))
        .await;
    let body = json_body(response).await;
    assert_eq!(body["success"], Value::Bool(true));

    let response = app
        .request(get_request("/get_machine?headNumber=H1", &session))
        .await;
    let body = json_body(response).await;
    assert_eq!(body["machine"]["Brand"], "Barudan");
    // Untouched fields keep their values.
    assert_eq!(body["machine"]["Model"], "TMAR-K");
    assert_eq!(body["machine"]["Current Location"], "Floor A");
}

#[tokio::test]
async fn remove_reports_success_even_when_absent() {
    let app = TestApp::new("remove");
    let session = app.login().await;
    app.request(form_request("/add_machine", &add_body("H1", "A"), &session))
        .await;

    let response = app
        .request(form_request("/remove_machine", "headNumber=H9", &session))
        .await;
    let body = json_body(response).await;
    assert_eq!(body["success"], Value::Bool(true));

    // The store is unchanged.
    let response = app
        .request(get_request("/get_machine?headNumber=H1", &session))
        .await;
    let body = json_body(response).await;
    assert_eq!(body["success"], Value::Bool(true));

    // Removing the real record empties the store.
    let response = app
        .request(form_request("/remove_machine", "headNumber=h1", &session))
        .await;
    let body = json_body(response).await;
    assert_eq!(body["success"], Value::Bool(true));

    let response = app
        .request(get_request("/get_machine?headNumber=H1", &session))
        .await;
    let body = json_body(response).await;
    assert_eq!(body["success"], Value::Bool(false));
}

#[tokio::test]
async fn export_downloads_a_spreadsheet() {
    let app = TestApp::new("export");
    let session = app.login().await;
    app.request(form_request("/add_machine", &add_body("H1", "A"), &session))
        .await;

    let response = app.request(form_request("/export", "", &session)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .contains("attachment"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[0..2], b"PK");
}

#[tokio::test]
async fn export_of_empty_store_redirects_with_flash() {
    let app = TestApp::new("export_empty");
    let session = app.login().await;

    let response = app.request(form_request("/export", "", &session)).await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/");
    assert!(!cookies(&response).is_empty());
}

#[tokio::test]
async fn export_filtered_selects_matching_rows() {
    let app = TestApp::new("export_filtered");
    let session = app.login().await;
    app.request(form_request("/add_machine", &add_body("H1", "Floor A"), &session))
        .await;
    app.request(form_request("/add_machine", &add_body("H2", "Warehouse"), &session))
        .await;

    let response = app
        .request(form_request(
            "/export_filtered",
            "headNumber=&location=floor&serialNumber=&modelNumber=",
            &session,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // A filter matching nothing redirects back with a flash instead.
    let response = app
        .request(form_request(
            "/export_filtered",
            "headNumber=&location=basement&serialNumber=&modelNumber=",
            &session,
        ))
        .await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn reset_password_swaps_the_shared_credential() {
    let app = TestApp::new("reset");
    let session = app.login().await;

    let response = app
        .request(form_request(
            "/reset_password",
            &format!("old_password={PASSWORD}&new_password=Fresh@456&confirm_password=Fresh@456"),
            &session,
        ))
        .await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/");

    // The old password no longer authenticates.
    let response = app
        .request(form_request("/login", &format!("password={PASSWORD}"), ""))
        .await;
    assert_eq!(location(&response), "/login");

    // The new one does.
    let response = app
        .request(form_request("/login", "password=Fresh@456", ""))
        .await;
    assert_eq!(location(&response), "/");

    // The session opened before the reset is still valid.
    let response = app.request(get_request("/", &session)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn reset_password_rejects_policy_violations() {
    let app = TestApp::new("reset_policy");
    let session = app.login().await;

    let response = app
        .request(form_request(
            "/reset_password",
            &format!("old_password={PASSWORD}&new_password=weak&confirm_password=weak"),
            &session,
        ))
        .await;
    assert!(response.status().is_redirection());

    // The credential is unchanged.
    let response = app
        .request(form_request("/login", &format!("password={PASSWORD}"), ""))
        .await;
    assert_eq!(location(&response), "/");
}

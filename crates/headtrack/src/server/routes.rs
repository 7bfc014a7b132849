//! Request handlers for the headtrack HTTP API.
//!
//! JSON endpoints answer with the `{"success": ..., "message": ...}`
//! envelope; page and form endpoints answer with redirects, carrying
//! one-shot flash messages in a signed cookie consumed by the next page
//! render. Unauthorized access yields 401 JSON on API routes and a
//! redirect to `/login` on page/form routes.

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Form, Json};
use axum_extra::extract::cookie::{Cookie, SignedCookieJar};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::error::Error;
use crate::export::{self, EXPORT_FILE_NAME, FILTERED_EXPORT_FILE_NAME};
use crate::inventory::{self, ExportFilter, MoveRequest};
use crate::record::MachineFields;

use super::pages;
use super::AppState;

/// Name of the session cookie.
const SESSION_COOKIE: &str = "session";

/// Name of the one-shot flash-message cookie.
const FLASH_COOKIE: &str = "flash";

/// Role stored in the session cookie on login.
const DEFAULT_ROLE: &str = "admin";

fn is_logged_in(jar: &SignedCookieJar) -> bool {
    jar.get(SESSION_COOKIE).is_some()
}

fn session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, DEFAULT_ROLE))
        .path("/")
        .http_only(true)
        .build()
}

fn set_flash(jar: SignedCookieJar, message: impl Into<String>) -> SignedCookieJar {
    jar.add(Cookie::build((FLASH_COOKIE, message.into())).path("/").build())
}

/// Read and clear the flash message, if any.
fn take_flash(jar: SignedCookieJar) -> (Option<String>, SignedCookieJar) {
    match jar.get(FLASH_COOKIE) {
        Some(cookie) => {
            let message = cookie.value().to_string();
            let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/").build());
            (Some(message), jar)
        }
        None => (None, jar),
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"success": false, "message": "Unauthorized"})),
    )
        .into_response()
}

fn success(message: &str) -> Response {
    Json(json!({"success": true, "message": message})).into_response()
}

fn failure(message: &str) -> Response {
    Json(json!({"success": false, "message": message})).into_response()
}

/// Map an unexpected (non-domain) error to a 500 JSON failure.
fn internal_error(err: &Error) -> Response {
    error!("request failed: {err}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"success": false, "message": err.to_string()})),
    )
        .into_response()
}

fn xlsx_attachment(bytes: Vec<u8>, filename: &str) -> Response {
    (
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

// === Pages ===

/// GET `/` — the inventory page.
pub async fn home(State(state): State<AppState>, jar: SignedCookieJar) -> Response {
    if !is_logged_in(&jar) {
        return Redirect::to("/login").into_response();
    }

    let records = state.store.load();
    let (flash, jar) = take_flash(jar);
    (jar, Html(pages::home(&records, flash.as_deref()))).into_response()
}

/// GET `/login` — the login form.
pub async fn login_page(jar: SignedCookieJar) -> Response {
    let (flash, jar) = take_flash(jar);
    (jar, Html(pages::login(flash.as_deref()))).into_response()
}

// === Authentication ===

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    password: String,
}

/// POST `/login` — check the shared password and open a session.
pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    if state.credentials.verify(&form.password) {
        let jar = jar.add(session_cookie());
        (jar, Redirect::to("/")).into_response()
    } else {
        let jar = set_flash(jar, "Incorrect password!");
        (jar, Redirect::to("/login")).into_response()
    }
}

/// GET `/logout` — close the session.
pub async fn logout(jar: SignedCookieJar) -> Response {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/").build());
    (jar, Redirect::to("/login")).into_response()
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordForm {
    #[serde(default)]
    old_password: String,
    #[serde(default)]
    new_password: String,
    #[serde(default)]
    confirm_password: String,
}

/// POST `/reset_password` — replace the shared password.
pub async fn reset_password(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<ResetPasswordForm>,
) -> Response {
    if !is_logged_in(&jar) {
        return Redirect::to("/login").into_response();
    }

    let message = match state.credentials.reset(
        &form.old_password,
        &form.new_password,
        &form.confirm_password,
    ) {
        Ok(()) => "Password reset successfully!".to_string(),
        Err(err) if err.is_password_error() => err.to_string(),
        Err(err) => {
            error!("password reset failed: {err}");
            "Password reset failed!".to_string()
        }
    };

    let jar = set_flash(jar, message);
    (jar, Redirect::to("/")).into_response()
}

// === Inventory API ===

#[derive(Debug, Deserialize)]
pub struct HeadNumberParams {
    #[serde(rename = "headNumber", default)]
    head_number: String,
}

/// GET `/get_machine` — look a machine up by head number.
pub async fn get_machine(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Query(params): Query<HeadNumberParams>,
) -> Response {
    if !is_logged_in(&jar) {
        return unauthorized();
    }

    let records = state.store.load();
    match inventory::find(&records, &params.head_number) {
        Some(machine) => Json(json!({"success": true, "machine": machine})).into_response(),
        None => failure("Machine not found!"),
    }
}

#[derive(Debug, Deserialize)]
pub struct MoveForm {
    #[serde(rename = "headNumber", default)]
    head_number: String,
    #[serde(rename = "newLocation", default)]
    new_location: String,
    #[serde(rename = "handedTo", default)]
    handed_to: String,
    #[serde(default)]
    accessories: String,
}

/// POST `/move_machine` — record a change of location and custody.
pub async fn move_machine(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<MoveForm>,
) -> Response {
    if !is_logged_in(&jar) {
        return unauthorized();
    }

    let request = MoveRequest {
        head_number: form.head_number,
        new_location: form.new_location,
        handed_over_to: form.handed_to,
        accessories: form.accessories,
    };
    match inventory::move_machine(&state.store, &request) {
        Ok(()) => success("Machine moved successfully!"),
        Err(err) if err.is_not_found() => failure("Machine not found!"),
        Err(err) => internal_error(&err),
    }
}

/// POST `/add_machine` — register a new machine.
pub async fn add_machine(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(fields): Form<MachineFields>,
) -> Response {
    if !is_logged_in(&jar) {
        return unauthorized();
    }

    match inventory::add(&state.store, fields) {
        Ok(_) => success("Machine added successfully!"),
        Err(err) => internal_error(&err),
    }
}

/// POST `/remove_machine` — delete records by head number.
pub async fn remove_machine(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<HeadNumberParams>,
) -> Response {
    if !is_logged_in(&jar) {
        return unauthorized();
    }

    match inventory::remove(&state.store, &form.head_number) {
        Ok(_) => success("Machine removed successfully!"),
        Err(err) => internal_error(&err),
    }
}

#[derive(Debug, Deserialize)]
pub struct EditMachineForm {
    #[serde(rename = "headNumber", default)]
    head_number: String,
    #[serde(rename = "Machine Type", default)]
    machine_type: String,
    #[serde(rename = "Brand", default)]
    brand: String,
    #[serde(rename = "Model", default)]
    model: String,
    #[serde(rename = "Serial Number", default)]
    serial_number: String,
    #[serde(rename = "Head Number", default)]
    new_head_number: String,
    #[serde(rename = "Current Location", default)]
    current_location: String,
    #[serde(rename = "Handed Over to", default)]
    handed_over_to: String,
    #[serde(rename = "Accessories", default)]
    accessories: String,
    #[serde(rename = "Previous Location", default)]
    previous_location: String,
}

impl EditMachineForm {
    /// The submitted column values; empty entries mean "keep".
    fn updates(&self) -> MachineFields {
        MachineFields {
            machine_type: self.machine_type.clone(),
            brand: self.brand.clone(),
            model: self.model.clone(),
            serial_number: self.serial_number.clone(),
            head_number: self.new_head_number.clone(),
            current_location: self.current_location.clone(),
            handed_over_to: self.handed_over_to.clone(),
            accessories: self.accessories.clone(),
            previous_location: self.previous_location.clone(),
        }
    }
}

/// POST `/edit_machine` — overwrite the provided columns of a record.
pub async fn edit_machine(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<EditMachineForm>,
) -> Response {
    if !is_logged_in(&jar) {
        return unauthorized();
    }

    match inventory::edit(&state.store, &form.head_number, &form.updates()) {
        Ok(()) => success("Machine edited successfully!"),
        Err(err) => internal_error(&err),
    }
}

// === Export ===

/// POST `/export` — download the full inventory as a spreadsheet.
pub async fn export(State(state): State<AppState>, jar: SignedCookieJar) -> Response {
    if !is_logged_in(&jar) {
        return Redirect::to("/login").into_response();
    }

    let records = state.store.load();
    match export::export_all(&records) {
        Ok(bytes) => xlsx_attachment(bytes, EXPORT_FILE_NAME),
        Err(err) => {
            let jar = set_flash(jar, err.to_string());
            (jar, Redirect::to("/")).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ExportFilterForm {
    #[serde(rename = "headNumber", default)]
    head_number: String,
    #[serde(default)]
    location: String,
    #[serde(rename = "serialNumber", default)]
    serial_number: String,
    #[serde(rename = "modelNumber", default)]
    model_number: String,
}

/// POST `/export_filtered` — download a filtered subset as a spreadsheet.
pub async fn export_filtered(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<ExportFilterForm>,
) -> Response {
    if !is_logged_in(&jar) {
        return Redirect::to("/login").into_response();
    }

    let filter = ExportFilter {
        head_number: form.head_number,
        location: form.location,
        serial_number: form.serial_number,
        model: form.model_number,
    };
    let records = state.store.load();
    match export::export_filtered(&records, &filter) {
        Ok(bytes) => xlsx_attachment(bytes, FILTERED_EXPORT_FILE_NAME),
        Err(Error::ExportEmpty) => {
            let jar = set_flash(jar, "No filtered data to export!");
            (jar, Redirect::to("/")).into_response()
        }
        Err(err) => {
            let jar = set_flash(jar, err.to_string());
            (jar, Redirect::to("/")).into_response()
        }
    }
}

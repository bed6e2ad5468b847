pub mod api;
pub mod images;

use rocket::http::{CookieJar, Status};
use rocket::serde::json::Json;
use rocket::State;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::{ApiError, ContentApi};
use crate::auth::{self, OperatorSession};
use crate::content::PageLoader;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// HTTP status to hand back when the API refused or failed a call.
pub(crate) fn upstream_status(err: &ApiError) -> Status {
    match err {
        ApiError::Unauthorized | ApiError::NotAuthenticated => Status::Unauthorized,
        ApiError::Status { status, .. } if (400..500).contains(status) => {
            Status::from_code(*status).unwrap_or(Status::BadRequest)
        }
        _ => Status::BadGateway,
    }
}

#[post("/login", data = "<form>")]
pub async fn login(
    form: Json<LoginForm>,
    loader: &State<PageLoader>,
    cookies: &CookieJar<'_>,
) -> (Status, Json<Value>) {
    let LoginForm { username, password } = form.into_inner();
    let username = username.trim().to_string();
    if username.is_empty() || password.is_empty() {
        return (
            Status::BadRequest,
            Json(json!({ "ok": false, "error": "Username and password are required" })),
        );
    }

    let loader = loader.inner().clone();
    let result = rocket::tokio::task::spawn_blocking(move || loader.api().login(&username, &password))
        .await
        .unwrap_or_else(|e| Err(ApiError::Transport(e.to_string())));

    match result {
        Ok(token) => {
            auth::set_session_cookie(cookies, &token);
            log::info!("[admin] operator logged in");
            (Status::Ok, Json(json!({ "ok": true })))
        }
        Err(ApiError::Unauthorized) => {
            log::warn!("[admin] login rejected");
            (
                Status::Unauthorized,
                Json(json!({ "ok": false, "error": "Invalid credentials" })),
            )
        }
        Err(e) => (upstream_status(&e), Json(json!({ "ok": false, "error": e.to_string() }))),
    }
}

#[post("/logout")]
pub fn logout(cookies: &CookieJar<'_>) -> Json<Value> {
    auth::clear_session_cookie(cookies);
    Json(json!({ "ok": true }))
}

/// Ask the API whether the stored token is still good. When the API is
/// unreachable the session is kept; only a 401 ends it.
#[get("/session")]
pub async fn session(
    session: OperatorSession,
    loader: &State<PageLoader>,
    cookies: &CookieJar<'_>,
) -> Json<Value> {
    let loader = loader.inner().clone();
    let token = session.token;
    let result = rocket::tokio::task::spawn_blocking(move || loader.api().verify(&token))
        .await
        .unwrap_or_else(|e| Err(ApiError::Transport(e.to_string())));

    match result {
        Ok(()) => Json(json!({ "authenticated": true, "verified": true })),
        Err(ApiError::Unauthorized) => {
            auth::clear_session_cookie(cookies);
            Json(json!({ "authenticated": false, "error": ApiError::Unauthorized.to_string() }))
        }
        Err(e) => Json(json!({ "authenticated": true, "verified": false, "error": e.to_string() })),
    }
}

#[get("/session", rank = 2)]
pub fn session_anonymous() -> Json<Value> {
    Json(json!({ "authenticated": false }))
}

#[catch(401)]
pub fn unauthorized() -> Json<Value> {
    Json(json!({ "ok": false, "error": "Not authenticated" }))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![login, logout, session, session_anonymous]
}

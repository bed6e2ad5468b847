//! Client for the remote content API.

use std::sync::OnceLock;
use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use crate::models::PageData;

pub const PAGE_DATA_PATH: &str = "/api/content/page-data";
pub const LOGIN_PATH: &str = "/api/auth/login";
pub const VERIFY_PATH: &str = "/api/auth/verify";
pub const HEALTH_PATH: &str = "/api/health";
pub const IMAGE_UPLOAD_PATH: &str = "/api/services/upload";
pub const IMAGES_PATH: &str = "/api/services/images";

/// An image on its way to the upstream library.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Never got a response (DNS, connect, TLS, timeout).
    Transport(String),
    /// Non-2xx other than 401. `message` is the body's `error` field or `HTTP <status>`.
    Status { status: u16, message: String },
    /// 401 from the API; the operator token is no longer valid.
    Unauthorized,
    /// An authenticated call was attempted without a token.
    NotAuthenticated,
    /// 2xx with a body that is not what we expected.
    Decode(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Transport(e) => write!(f, "request failed: {}", e),
            ApiError::Status { message, .. } => write!(f, "{}", message),
            ApiError::Unauthorized => write!(f, "Session expired. Please log in again."),
            ApiError::NotAuthenticated => write!(f, "Not authenticated"),
            ApiError::Decode(e) => write!(f, "unexpected response: {}", e),
        }
    }
}

/// Everything this site needs from the content backend. `ApiClient` talks
/// HTTP; tests substitute their own.
pub trait ContentApi: Send + Sync {
    fn fetch_page_data(&self) -> Result<PageData, ApiError>;
    fn save_page_data(&self, doc: &PageData, token: &str) -> Result<(), ApiError>;
    fn login(&self, username: &str, password: &str) -> Result<String, ApiError>;
    fn verify(&self, token: &str) -> Result<(), ApiError>;
    fn health(&self) -> Result<Value, ApiError>;
    /// Store an image in the upstream library. The body is passed back
    /// as-is; it names the new file under `url` or `imageUrl`.
    fn upload_image(&self, upload: ImageUpload, token: &str) -> Result<Value, ApiError>;
    fn list_images(&self, token: &str) -> Result<Value, ApiError>;
    fn delete_image(&self, filename: &str, token: &str) -> Result<(), ApiError>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    token: Option<String>,
}

pub struct ApiClient {
    origin: String,
    timeout: Duration,
    /// Built on first use, which is always on a blocking worker; the
    /// blocking client must not be created or used on an async thread.
    client: OnceLock<reqwest::blocking::Client>,
}

impl ApiClient {
    pub fn new(origin: &str, timeout: Duration) -> Result<Self, String> {
        let origin = origin.trim().trim_end_matches('/');
        match Url::parse(origin) {
            Ok(u) if u.scheme() == "http" || u.scheme() == "https" => {}
            _ => return Err(format!("Invalid API origin: {}", origin)),
        }
        Ok(ApiClient {
            origin: origin.to_string(),
            timeout,
            client: OnceLock::new(),
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.origin, path)
    }

    /// `IMAGES_PATH/<filename>`, with the name percent-encoded as one segment.
    fn image_url(&self, filename: &str) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.url(IMAGES_PATH)).map_err(|e| ApiError::Transport(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Transport(format!("{} cannot take a path", self.origin)))?
            .push(filename);
        Ok(url)
    }

    fn http(&self) -> Result<&reqwest::blocking::Client, ApiError> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ApiError::Transport(format!("HTTP client error: {}", e)))?;
        let _ = self.client.set(client);
        self.client
            .get()
            .ok_or_else(|| ApiError::Transport("HTTP client unavailable".into()))
    }

    /// Send, log, and turn any non-success status into an `ApiError`.
    fn send(
        &self,
        label: &str,
        req: reqwest::blocking::RequestBuilder,
    ) -> Result<reqwest::blocking::Response, ApiError> {
        let resp = req.send().map_err(|e| {
            log::warn!("[api] {} failed: {}", label, e);
            ApiError::Transport(e.to_string())
        })?;
        let status = resp.status();
        log::debug!("[api] {} -> {}", label, status);

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(status_error(status.as_u16(), &text));
        }
        Ok(resp)
    }
}

/// Build the error for a non-2xx response from its raw body.
pub fn status_error(status: u16, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("HTTP {}", status));
    ApiError::Status { status, message }
}

impl ContentApi for ApiClient {
    fn fetch_page_data(&self) -> Result<PageData, ApiError> {
        let resp = self.send("GET page-data", self.http()?.get(self.url(PAGE_DATA_PATH)))?;
        resp.json::<PageData>()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn save_page_data(&self, doc: &PageData, token: &str) -> Result<(), ApiError> {
        if token.is_empty() {
            return Err(ApiError::NotAuthenticated);
        }
        let req = self
            .http()?
            .post(self.url(PAGE_DATA_PATH))
            .bearer_auth(token)
            .json(doc);
        self.send("POST page-data", req)?;
        Ok(())
    }

    fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let req = self
            .http()?
            .post(self.url(LOGIN_PATH))
            .json(&json!({ "username": username, "password": password }));
        let body: LoginBody = self
            .send("POST login", req)?
            .json()
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        body.token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Decode("login response has no token".into()))
    }

    fn verify(&self, token: &str) -> Result<(), ApiError> {
        if token.is_empty() {
            return Err(ApiError::NotAuthenticated);
        }
        let req = self.http()?.get(self.url(VERIFY_PATH)).bearer_auth(token);
        self.send("GET verify", req)?;
        Ok(())
    }

    fn health(&self) -> Result<Value, ApiError> {
        self.send("GET health", self.http()?.get(self.url(HEALTH_PATH)))?
            .json()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn upload_image(&self, upload: ImageUpload, token: &str) -> Result<Value, ApiError> {
        if token.is_empty() {
            return Err(ApiError::NotAuthenticated);
        }
        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.content_type)
            .map_err(|e| ApiError::Transport(format!("bad content type: {}", e)))?;
        let req = self
            .http()?
            .post(self.url(IMAGE_UPLOAD_PATH))
            .bearer_auth(token)
            .multipart(Form::new().part("image", part));
        self.send("POST image", req)?
            .json()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn list_images(&self, token: &str) -> Result<Value, ApiError> {
        if token.is_empty() {
            return Err(ApiError::NotAuthenticated);
        }
        let req = self.http()?.get(self.url(IMAGES_PATH)).bearer_auth(token);
        self.send("GET images", req)?
            .json()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn delete_image(&self, filename: &str, token: &str) -> Result<(), ApiError> {
        if token.is_empty() {
            return Err(ApiError::NotAuthenticated);
        }
        let req = self.http()?.delete(self.image_url(filename)?).bearer_auth(token);
        self.send("DELETE image", req)?;
        Ok(())
    }
}

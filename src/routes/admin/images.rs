//! The upstream image library: list, upload, and delete, proxied with the
//! operator's token. Returned URLs are rebased onto the active origin.

use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::http::{CookieJar, Status};
use rocket::serde::json::Json;
use rocket::tokio::io::AsyncReadExt;
use rocket::State;
use serde_json::{json, Value};

use crate::api::{ApiError, ImageUpload};
use crate::auth::{self, OperatorSession};
use crate::content::PageLoader;
use crate::media;

use super::upstream_status;

#[derive(FromForm)]
pub struct ImageUploadForm<'f> {
    pub image: TempFile<'f>,
}

fn failed(err: ApiError, cookies: &CookieJar<'_>) -> (Status, Json<Value>) {
    if err == ApiError::Unauthorized {
        auth::clear_session_cookie(cookies);
    }
    (upstream_status(&err), Json(json!({ "ok": false, "error": err.to_string() })))
}

fn rejected(status: Status, message: &str) -> (Status, Json<Value>) {
    (status, Json(json!({ "ok": false, "error": message })))
}

/// The stored file's URL from an upload or list entry.
pub fn image_url_of(entry: &Value) -> Option<&str> {
    ["url", "imageUrl"]
        .iter()
        .filter_map(|key| entry.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|u| !u.is_empty())
}

/// A library entry with its URL rebased and a `filename` filled in from
/// the URL's last segment when the API left it out.
pub fn normalize_image_entry(mut entry: Value, origin: &str) -> Value {
    let url = match image_url_of(&entry) {
        Some(u) => media::normalize_asset_url(u, origin),
        None => return entry,
    };
    if let Some(obj) = entry.as_object_mut() {
        let missing_name = obj
            .get("filename")
            .and_then(Value::as_str)
            .map_or(true, |f| f.trim().is_empty());
        if missing_name {
            let name = url
                .split(['?', '#'])
                .next()
                .and_then(|path| path.rsplit('/').next())
                .unwrap_or("")
                .to_string();
            if !name.is_empty() {
                obj.insert("filename".into(), Value::String(name));
            }
        }
        obj.insert("url".into(), Value::String(url));
    }
    entry
}

/// The list may come bare or wrapped as `{ "images": [...] }`.
pub fn image_entries(body: Value, origin: &str) -> Vec<Value> {
    let list = match body {
        Value::Array(list) => list,
        Value::Object(mut obj) => match obj.remove("images") {
            Some(Value::Array(list)) => list,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };
    list.into_iter()
        .filter(Value::is_object)
        .map(|e| normalize_image_entry(e, origin))
        .collect()
}

/// A bare file name: no separators, no parent references.
pub fn valid_image_name(name: &str) -> bool {
    let name = name.trim();
    !name.is_empty()
        && name != "."
        && !name.contains("..")
        && !name.contains(['/', '\\'])
        && !name.chars().any(char::is_control)
}

async fn read_upload(file: &TempFile<'_>) -> std::io::Result<Vec<u8>> {
    let mut reader = Box::pin(file.open().await?);
    let mut bytes = Vec::with_capacity(file.len() as usize);
    reader.read_to_end(&mut bytes).await?;
    Ok(bytes)
}

#[get("/images")]
pub async fn list_images(
    session: OperatorSession,
    loader: &State<PageLoader>,
    cookies: &CookieJar<'_>,
) -> (Status, Json<Value>) {
    let loader = loader.inner().clone();
    let token = session.token;
    let result = rocket::tokio::task::spawn_blocking(move || {
        loader
            .api()
            .list_images(&token)
            .map(|body| image_entries(body, loader.origin()))
    })
    .await
    .unwrap_or_else(|e| Err(ApiError::Transport(e.to_string())));

    match result {
        Ok(images) => (Status::Ok, Json(json!({ "ok": true, "images": images }))),
        Err(e) => {
            log::warn!("[admin] image list failed: {}", e);
            failed(e, cookies)
        }
    }
}

#[post("/images", data = "<form>")]
pub async fn upload_image(
    session: OperatorSession,
    form: Form<ImageUploadForm<'_>>,
    loader: &State<PageLoader>,
    cookies: &CookieJar<'_>,
) -> (Status, Json<Value>) {
    let file = &form.image;
    let content_type = match file
        .content_type()
        .filter(|ct| ct.top().as_str().eq_ignore_ascii_case("image"))
    {
        Some(ct) => ct.clone(),
        None => return rejected(Status::UnsupportedMediaType, "Only image files can be uploaded"),
    };
    if file.len() == 0 {
        return rejected(Status::UnprocessableEntity, "The file is empty");
    }

    let ext = content_type.extension().map(|e| e.as_str().to_string());
    let stem = file.name().filter(|n| !n.is_empty()).unwrap_or("image");
    let file_name = match ext {
        Some(ext) => format!("{}.{}", stem, ext),
        None => stem.to_string(),
    };

    let bytes = match read_upload(file).await {
        Ok(b) => b,
        Err(e) => {
            log::error!("[admin] could not read upload {}: {}", file_name, e);
            return rejected(Status::InternalServerError, "Could not read the uploaded file");
        }
    };

    let upload = ImageUpload {
        file_name: file_name.clone(),
        content_type: content_type.to_string(),
        bytes,
    };
    let loader = loader.inner().clone();
    let token = session.token;
    let result = rocket::tokio::task::spawn_blocking(move || {
        let origin = loader.origin().to_string();
        loader.api().upload_image(upload, &token).map(|body| (body, origin))
    })
    .await
    .unwrap_or_else(|e| Err(ApiError::Transport(e.to_string())));

    match result {
        Ok((body, origin)) => match image_url_of(&body).map(|u| media::normalize_asset_url(u, &origin)) {
            Some(url) => {
                log::info!("[admin] uploaded image {}", file_name);
                (Status::Ok, Json(json!({ "ok": true, "url": url, "data": body })))
            }
            None => failed(ApiError::Decode("upload response has no url".into()), cookies),
        },
        Err(e) => {
            log::warn!("[admin] image upload failed: {}", e);
            failed(e, cookies)
        }
    }
}

#[delete("/images/<filename>")]
pub async fn delete_image(
    session: OperatorSession,
    filename: &str,
    loader: &State<PageLoader>,
    cookies: &CookieJar<'_>,
) -> (Status, Json<Value>) {
    if !valid_image_name(filename) {
        return rejected(Status::BadRequest, "Invalid file name");
    }
    let name = filename.trim().to_string();
    let loader = loader.inner().clone();
    let token = session.token;
    let target = name.clone();
    let result = rocket::tokio::task::spawn_blocking(move || loader.api().delete_image(&target, &token))
        .await
        .unwrap_or_else(|e| Err(ApiError::Transport(e.to_string())));

    match result {
        Ok(()) => {
            log::info!("[admin] deleted image {}", name);
            (Status::Ok, Json(json!({ "ok": true })))
        }
        Err(e) => {
            log::warn!("[admin] image delete failed: {}", e);
            failed(e, cookies)
        }
    }
}

pub fn routes() -> Vec<rocket::Route> {
    routes![list_images, upload_image, delete_image]
}

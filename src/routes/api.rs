use rocket::serde::json::Json;
use rocket::State;
use serde_json::{json, Value};

use crate::config::SiteConfig;
use crate::content::PageLoader;
use crate::store::PAGE_DATA_KEY;

use super::resolve_page;

/// The resolved document as the landing page sees it, portfolio normalized.
#[get("/page-data")]
pub async fn page_data(loader: &State<PageLoader>) -> Json<Value> {
    let res = resolve_page(loader).await;
    let mut data = res.document;
    data.portfolio = res.portfolio;
    Json(json!({
        "state": res.state,
        "notice": res.notice,
        "data": data,
    }))
}

#[get("/health")]
pub async fn health(loader: &State<PageLoader>, config: &State<SiteConfig>) -> Json<Value> {
    let loader = loader.inner().clone();
    let checked = rocket::tokio::task::spawn_blocking(move || {
        let store = loader.store();
        (store.ping(), store.updated_at(PAGE_DATA_KEY), loader.api().health())
    })
    .await;

    let (store_ok, last_saved, upstream) = match checked {
        Ok((store_ok, saved, Ok(body))) => (store_ok, saved, json!({ "ok": true, "detail": body })),
        Ok((store_ok, saved, Err(e))) => {
            (store_ok, saved, json!({ "ok": false, "error": e.to_string() }))
        }
        Err(e) => {
            log::error!("[api] health check task failed: {}", e);
            (false, None, json!({ "ok": false, "error": "health check failed" }))
        }
    };

    Json(json!({
        "status": if store_ok { "ok" } else { "degraded" },
        "environment": config.environment().label(),
        "api_origin": config.active_origin(),
        "store": store_ok,
        "last_saved": last_saved,
        "upstream": upstream,
    }))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![page_data, health]
}

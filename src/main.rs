#[macro_use]
extern crate rocket;

mod api;
mod auth;
mod boot;
mod config;
mod content;
mod db;
mod media;
mod models;
mod render;
mod routes;
mod store;
mod typography;

mod tests;

use std::sync::Arc;
use std::time::Duration;

use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::Header;
use rocket::response::content::RawHtml;
use rocket::{Build, Rocket};

use api::{ApiClient, ContentApi};
use config::SiteConfig;
use content::PageLoader;
use store::memory::MemoryStore;
use store::sqlite::SqliteStore;
use store::ContentStore;

pub struct NoCacheAdmin;

#[rocket::async_trait]
impl Fairing for NoCacheAdmin {
    fn info(&self) -> Info {
        Info { name: "No-Cache Admin Responses", kind: Kind::Response }
    }

    async fn on_response<'r>(&self, req: &'r rocket::Request<'_>, res: &mut rocket::Response<'r>) {
        if req.uri().path().starts_with("/admin") {
            res.set_header(Header::new("Cache-Control", "no-store, no-cache, must-revalidate, max-age=0"));
            res.set_header(Header::new("Pragma", "no-cache"));
        }
    }
}

#[catch(404)]
fn not_found() -> RawHtml<String> {
    RawHtml("<html><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>404</h1><p>Page not found.</p><a href='/'>← Home</a></body></html>".to_string())
}

#[catch(500)]
fn server_error() -> RawHtml<String> {
    RawHtml("<html><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>500</h1><p>Internal server error.</p><a href='/'>← Home</a></body></html>".to_string())
}

/// SQLite when the data directory is usable, memory otherwise.
fn open_store(config: &SiteConfig, data_dir_ok: bool) -> Arc<dyn ContentStore> {
    if data_dir_ok {
        match SqliteStore::new_at(&config.database_path).and_then(|s| s.run_migrations().map(|_| s)) {
            Ok(store) => {
                log::info!("Local content store: {}", config.database_path);
                return Arc::new(store);
            }
            Err(e) => log::error!("Failed to open {}: {}", config.database_path, e),
        }
    }
    log::warn!("Local content store: in-memory (not persisted)");
    Arc::new(MemoryStore::new())
}

/// Everything but config loading and the upstream client, so route tests
/// can hand in their own.
pub fn build_rocket(loader: PageLoader, config: SiteConfig) -> Rocket<Build> {
    rocket::build()
        .manage(loader)
        .manage(config)
        .attach(NoCacheAdmin)
        .mount("/", routes::public::routes())
        .mount("/api", routes::api::routes())
        .mount("/admin", routes::admin::routes())
        .mount("/admin/api", routes::admin::api::routes())
        .mount("/admin/api", routes::admin::images::routes())
        .register("/", catchers![not_found, server_error])
        .register("/admin", catchers![routes::admin::unauthorized])
}

#[launch]
fn rocket() -> _ {
    env_logger::init();

    let config: SiteConfig = match rocket::Config::figment().extract() {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Site config unreadable ({}), using defaults", e);
            SiteConfig::default()
        }
    };

    // Boot check: data directory, Rocket.toml, API environment
    let data_dir_ok = boot::run(&config);
    let store = open_store(&config, data_dir_ok);

    let origin = config.active_origin();
    let timeout = Duration::from_secs(config.request_timeout_secs.max(1));
    let api: Arc<dyn ContentApi> = match ApiClient::new(&origin, timeout) {
        Ok(client) => {
            log::info!("[api] content API at {}", client.origin());
            Arc::new(client)
        }
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    let loader = PageLoader::new(api, store, &origin);
    build_rocket(loader, config)
}

#![cfg(test)]

use std::sync::{Arc, Mutex};

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rocket::http::{ContentType, Status};
use rocket::local::blocking::Client;
use serde_json::{json, Value};

use crate::api::{status_error, ApiError, ContentApi, ImageUpload};
use crate::config::{ApiEnvironment, SiteConfig, DEVELOPMENT_ORIGIN};
use crate::content::{EditOutcome, LoadState, PageLoader, LOAD_FAILED_NOTICE};
use crate::media;
use crate::models::page::{Colors, Hero};
use crate::models::portfolio::PortfolioForm;
use crate::models::{PageData, PortfolioItem};
use crate::render::{self, PortfolioModel, PORTFOLIO_EMPTY_TEXT};
use crate::routes::admin::api::{validate_logo, ColorsForm, ServiceForm};
use crate::store::memory::MemoryStore;
use crate::store::sqlite::SqliteStore;
use crate::store::{ContentStore, PAGE_DATA_KEY, PORTFOLIO};

const ORIGIN: &str = "https://prod.example";
const GOOD_TOKEN: &str = "tok-1";

/// Atomic counter for unique shared-cache DB names so parallel tests don't collide.
static TEST_DB_COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

/// Fresh SQLite store on a named shared-cache in-memory DB, so every pooled
/// connection sees the same rows.
fn sqlite_store() -> SqliteStore {
    let id = TEST_DB_COUNTER.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    let uri = format!("file:showcase_test_{}?mode=memory&cache=shared", id);
    let manager = SqliteConnectionManager::file(uri);
    let pool = Pool::builder()
        .max_size(2)
        .build(manager)
        .expect("Failed to create test pool");
    let store = SqliteStore::new(pool);
    store.run_migrations().expect("Failed to run migrations");
    store
}

fn stores() -> Vec<Arc<dyn ContentStore>> {
    let sqlite: Arc<dyn ContentStore> = Arc::new(sqlite_store());
    let memory: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
    vec![sqlite, memory]
}

// ── Fake content API ───────────────────────────────────

struct FakeApi {
    page: Mutex<Result<PageData, ApiError>>,
    save_result: Mutex<Result<(), ApiError>>,
    saved: Mutex<Vec<(PageData, String)>>,
    images: Mutex<Vec<Value>>,
    uploads: Mutex<Vec<ImageUpload>>,
}

impl FakeApi {
    fn serving(doc: PageData) -> Arc<Self> {
        Arc::new(FakeApi {
            page: Mutex::new(Ok(doc)),
            save_result: Mutex::new(Ok(())),
            saved: Mutex::new(Vec::new()),
            images: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
        })
    }

    fn failing(err: ApiError) -> Arc<Self> {
        let api = FakeApi::serving(PageData::default());
        *api.page.lock().unwrap() = Err(err);
        api
    }

    fn offline() -> Arc<Self> {
        FakeApi::failing(ApiError::Transport("connection refused".into()))
    }

    fn saved(&self) -> Vec<(PageData, String)> {
        self.saved.lock().unwrap().clone()
    }
}

impl ContentApi for FakeApi {
    fn fetch_page_data(&self) -> Result<PageData, ApiError> {
        self.page.lock().unwrap().clone()
    }

    fn save_page_data(&self, doc: &PageData, token: &str) -> Result<(), ApiError> {
        let result = self.save_result.lock().unwrap().clone();
        if result.is_ok() {
            self.saved.lock().unwrap().push((doc.clone(), token.to_string()));
            *self.page.lock().unwrap() = Ok(doc.clone());
        }
        result
    }

    fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        if username == "admin" && password == "secret" {
            Ok(GOOD_TOKEN.to_string())
        } else {
            Err(ApiError::Unauthorized)
        }
    }

    fn verify(&self, token: &str) -> Result<(), ApiError> {
        if token == GOOD_TOKEN {
            Ok(())
        } else {
            Err(ApiError::Unauthorized)
        }
    }

    fn health(&self) -> Result<Value, ApiError> {
        Ok(json!({ "status": "ok" }))
    }

    fn upload_image(&self, upload: ImageUpload, token: &str) -> Result<Value, ApiError> {
        self.verify(token)?;
        let url = format!("http://localhost:5001/uploads/{}", upload.file_name);
        self.images
            .lock()
            .unwrap()
            .push(json!({ "filename": upload.file_name, "url": url }));
        self.uploads.lock().unwrap().push(upload);
        Ok(json!({ "imageUrl": url }))
    }

    fn list_images(&self, token: &str) -> Result<Value, ApiError> {
        self.verify(token)?;
        Ok(Value::Array(self.images.lock().unwrap().clone()))
    }

    fn delete_image(&self, filename: &str, token: &str) -> Result<(), ApiError> {
        self.verify(token)?;
        let mut images = self.images.lock().unwrap();
        let before = images.len();
        images.retain(|img| img["filename"] != filename);
        if images.len() == before {
            return Err(status_error(404, r#"{"error":"Image not found"}"#));
        }
        Ok(())
    }
}

fn loader(api: &Arc<FakeApi>, store: &Arc<dyn ContentStore>) -> PageLoader {
    let api: Arc<dyn ContentApi> = api.clone();
    PageLoader::new(api, store.clone(), ORIGIN)
}

fn doc_with(items: Vec<PortfolioItem>) -> PageData {
    PageData {
        portfolio: items,
        ..PageData::default()
    }
}

fn item_a() -> PortfolioItem {
    PortfolioItem::new("A", "https://youtu.be/abcDEF12345")
}

fn item_b() -> PortfolioItem {
    PortfolioItem::new("B", "/uploads/b.mp4")
}

fn item_c() -> PortfolioItem {
    PortfolioItem::new("C", "http://localhost:5001/uploads/c.webm")
}

// ── Merge ──────────────────────────────────────────────

#[test]
fn test_empty_fetch_backfills_from_local_document() {
    for store in stores() {
        store.write(&doc_with(vec![item_a()])).unwrap();
        let api = FakeApi::serving(doc_with(vec![]));

        let res = loader(&api, &store).load();

        assert_eq!(res.state, LoadState::Live);
        assert!(res.notice.is_none());
        assert_eq!(res.document.portfolio, vec![item_a()]);
        assert_eq!(store.read().unwrap().portfolio, vec![item_a()]);
        assert_eq!(store.read_backup_collection(PORTFOLIO), Some(vec![item_a()]));
    }
}

#[test]
fn test_fetched_portfolio_wins_over_local() {
    for store in stores() {
        store.write(&doc_with(vec![item_a()])).unwrap();
        store.write_backup_collection(PORTFOLIO, &[item_a()]).unwrap();
        let api = FakeApi::serving(doc_with(vec![item_b()]));

        let res = loader(&api, &store).load();

        assert_eq!(res.state, LoadState::Live);
        assert_eq!(res.document.portfolio, vec![item_b()]);
        assert_eq!(store.read().unwrap().portfolio, vec![item_b()]);
        assert_eq!(store.read_backup_collection(PORTFOLIO), Some(vec![item_b()]));
    }
}

#[test]
fn test_empty_fetch_backfills_from_backup_when_document_empty() {
    for store in stores() {
        store.write(&doc_with(vec![])).unwrap();
        store.write_backup_collection(PORTFOLIO, &[item_c()]).unwrap();
        let api = FakeApi::serving(doc_with(vec![]));

        let res = loader(&api, &store).load();

        assert_eq!(res.document.portfolio, vec![item_c()]);
        assert_eq!(store.read().unwrap().portfolio, vec![item_c()]);
        // an empty fetch never replaces a non-empty backup
        assert_eq!(store.read_backup_collection(PORTFOLIO), Some(vec![item_c()]));
    }
}

#[test]
fn test_fetched_items_with_null_fields_are_kept() {
    for store in stores() {
        store.write(&doc_with(vec![item_a()])).unwrap();
        store.write_backup_collection(PORTFOLIO, &[item_a()]).unwrap();
        let fetched = PageData::from_json(
            r#"{"portfolio":[{"title":"B","description":null,"videoUrl":"https://youtu.be/zzzzzzzzzzz","poster":null,"active":null}]}"#,
        )
        .unwrap();
        assert_eq!(fetched.portfolio.len(), 1);

        let res = loader(&FakeApi::serving(fetched), &store).load();

        assert_eq!(res.state, LoadState::Live);
        assert_eq!(res.document.portfolio.len(), 1);
        let b = &res.document.portfolio[0];
        assert_eq!(b.title, "B");
        assert_eq!(b.description, "");
        assert!(b.active);
        let backup = store.read_backup_collection(PORTFOLIO).unwrap();
        assert_eq!(backup.len(), 1);
        assert_eq!(backup[0].title, "B");
    }
}

#[test]
fn test_sections_with_null_fields_still_parse() {
    let doc = PageData::from_json(
        r##"{
            "hero":{"title":null,"subtitle":"Creator"},
            "about":{"text1":"Hi","features":["Fast",null,"Honest"]},
            "services":[{"title":"UGC","description":null,"learnMoreLink":null,"active":null}],
            "testimonials":[{"image":null,"active":null}],
            "contact":{"whatsapp":null,"email":"hi@example.com"},
            "colors":{"primary":null,"accent":"#ff0000"},
            "typography":{"h1Size":null}
        }"##,
    )
    .unwrap();

    assert_eq!(doc.hero.unwrap().subtitle, "Creator");
    assert_eq!(doc.about.unwrap().features, vec!["Fast", "Honest"]);
    assert_eq!(doc.services.len(), 1);
    assert!(doc.services[0].active);
    assert_eq!(doc.testimonials.len(), 1);
    assert_eq!(doc.contact.unwrap().email, "hi@example.com");
    let css = crate::typography::build_css_variables(doc.colors.as_ref(), doc.typography.as_ref());
    assert!(css.contains("--primary: #667eea;"));
    assert!(css.contains("--accent: #ff0000;"));
    assert!(css.contains("--h1-size: 48px;"));
}

#[test]
fn test_stored_items_with_null_fields_survive_fallback() {
    let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
    store
        .set_raw(
            PAGE_DATA_KEY,
            r#"{"portfolio":[{"title":null,"description":null,"videoUrl":"/uploads/b.mp4"}]}"#,
        )
        .unwrap();

    let res = loader(&FakeApi::offline(), &store).load();

    assert_eq!(res.state, LoadState::Cached);
    assert_eq!(res.document.portfolio.len(), 1);
    assert_eq!(res.portfolio[0].video_url, "https://prod.example/uploads/b.mp4");
}

#[test]
fn test_unknown_item_fields_round_trip() {
    let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
    let fetched = PageData::from_json(
        r#"{
            "hero":{"title":"Nina","badge":"new"},
            "services":[{"_id":"s1","title":"UGC"}],
            "portfolio":[{"_id":"abc","createdAt":"2024-05-01","title":"A","videoUrl":"/uploads/a.mp4"}],
            "testimonials":[{"_id":"t1","image":"/uploads/t.jpg","caption":"Great"}]
        }"#,
    )
    .unwrap();

    let res = loader(&FakeApi::serving(fetched), &store).load();

    assert_eq!(res.document.portfolio[0].extra["_id"], "abc");
    assert_eq!(res.portfolio[0].extra["createdAt"], "2024-05-01");
    let persisted: Value = serde_json::from_str(&store.get_raw(PAGE_DATA_KEY).unwrap()).unwrap();
    assert_eq!(persisted["portfolio"][0]["_id"], "abc");
    assert_eq!(persisted["portfolio"][0]["createdAt"], "2024-05-01");
    assert_eq!(persisted["services"][0]["_id"], "s1");
    assert_eq!(persisted["testimonials"][0]["caption"], "Great");
    assert_eq!(persisted["hero"]["badge"], "new");
    let backup = store.get_raw(&crate::store::backup_key(PORTFOLIO)).unwrap();
    assert!(backup.contains(r#""_id":"abc""#));
}

#[test]
fn test_live_fetch_keeps_other_sections_and_unknown_keys() {
    let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
    let fetched = PageData::from_json(
        r#"{"hero":{"title":"Nina"},"portfolio":[],"seo":{"keywords":"ugc"}}"#,
    )
    .unwrap();
    store.write(&doc_with(vec![item_a()])).unwrap();

    let res = loader(&FakeApi::serving(fetched), &store).load();

    assert_eq!(res.document.hero.as_ref().unwrap().title, "Nina");
    assert_eq!(res.document.extra["seo"]["keywords"], "ugc");
    let persisted = store.get_raw(PAGE_DATA_KEY).unwrap();
    assert!(persisted.contains("\"seo\""));
}

// ── Fallback ───────────────────────────────────────────

#[test]
fn test_network_error_uses_backup_only() {
    for store in stores() {
        store.write_backup_collection(PORTFOLIO, &[item_c()]).unwrap();

        let res = loader(&FakeApi::offline(), &store).load();

        assert_eq!(res.state, LoadState::Cached);
        assert_eq!(res.notice.as_deref(), Some(LOAD_FAILED_NOTICE));
        assert_eq!(res.document.portfolio, vec![item_c()]);
        // renderer gets the normalized copy
        assert_eq!(res.portfolio[0].video_url, "https://prod.example/uploads/c.webm");
    }
}

#[test]
fn test_non_2xx_is_treated_like_network_error() {
    let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
    store.write(&doc_with(vec![item_a()])).unwrap();

    let api = FakeApi::failing(status_error(503, r#"{"error":"maintenance"}"#));
    let res = loader(&api, &store).load();

    assert_eq!(res.state, LoadState::Cached);
    assert_eq!(res.document.portfolio, vec![item_a()]);
    assert_eq!(res.notice.as_deref(), Some(LOAD_FAILED_NOTICE));
}

#[test]
fn test_undecodable_response_is_treated_like_network_error() {
    for store in stores() {
        store.write(&doc_with(vec![item_a()])).unwrap();
        store.write_backup_collection(PORTFOLIO, &[item_a()]).unwrap();

        let api = FakeApi::failing(ApiError::Decode("expected value at line 1 column 1".into()));
        let res = loader(&api, &store).load();

        assert_eq!(res.state, LoadState::Cached);
        assert_eq!(res.notice.as_deref(), Some(LOAD_FAILED_NOTICE));
        assert_eq!(res.document.portfolio, vec![item_a()]);
        assert_eq!(store.read_backup_collection(PORTFOLIO), Some(vec![item_a()]));
    }
}

#[test]
fn test_fallback_document_takes_backup_when_its_portfolio_is_empty() {
    let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
    let mut doc = doc_with(vec![]);
    doc.hero = Some(Hero { title: "Nina".into(), ..Hero::default() });
    store.write(&doc).unwrap();
    store.write_backup_collection(PORTFOLIO, &[item_b()]).unwrap();

    let res = loader(&FakeApi::offline(), &store).load();

    assert_eq!(res.state, LoadState::Cached);
    assert_eq!(res.document.hero.unwrap().title, "Nina");
    assert_eq!(res.document.portfolio, vec![item_b()]);
}

#[test]
fn test_fallback_does_not_write_local_keys() {
    let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
    store.write_backup_collection(PORTFOLIO, &[item_c()]).unwrap();

    loader(&FakeApi::offline(), &store).load();

    assert!(store.get_raw(PAGE_DATA_KEY).is_none());
}

// ── Empty ──────────────────────────────────────────────

#[test]
fn test_network_error_with_nothing_stored_is_empty() {
    for store in stores() {
        let res = loader(&FakeApi::offline(), &store).load();
        assert_eq!(res.state, LoadState::Empty);
        assert!(res.portfolio.is_empty());
        assert_eq!(res.notice.as_deref(), Some(LOAD_FAILED_NOTICE));
    }
}

#[test]
fn test_network_error_with_empty_stored_values_is_empty() {
    for store in stores() {
        store.set_raw(PAGE_DATA_KEY, "{}").unwrap();
        store.set_raw("portfolioBackup", "[]").unwrap();

        let res = loader(&FakeApi::offline(), &store).load();

        assert_eq!(res.state, LoadState::Empty);
        assert_eq!(render::build_portfolio_model(&res.portfolio), PortfolioModel::Empty);
    }
}

#[test]
fn test_network_error_with_unparseable_stored_values_is_empty() {
    for store in stores() {
        store.set_raw(PAGE_DATA_KEY, "{\"portfolio\": [").unwrap();
        store.set_raw("portfolioBackup", "not json").unwrap();

        let res = loader(&FakeApi::offline(), &store).load();

        assert_eq!(res.state, LoadState::Empty);
        let html = render::render_landing(&res, ORIGIN);
        assert!(html.contains(PORTFOLIO_EMPTY_TEXT));
        assert!(html.contains(LOAD_FAILED_NOTICE));
    }
}

// ── Stale backup (known behavior) ──────────────────────

#[test]
fn test_intentionally_emptied_portfolio_is_restored_until_backup_cleared() {
    let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
    store.write(&doc_with(vec![item_a()])).unwrap();
    store.write_backup_collection(PORTFOLIO, &[item_a()]).unwrap();
    let api = FakeApi::serving(doc_with(vec![]));
    let l = loader(&api, &store);

    // operator emptied it upstream; the local copy brings it back
    assert_eq!(l.load().document.portfolio, vec![item_a()]);

    l.clear_portfolio_backup().unwrap();
    store.write(&doc_with(vec![])).unwrap();
    assert!(l.load().document.portfolio.is_empty());
}

// ── Admin edits ────────────────────────────────────────

#[test]
fn test_apply_edit_publishes_and_writes_through() {
    let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
    let api = FakeApi::serving(doc_with(vec![item_a()]));

    let outcome = loader(&api, &store).apply_edit(GOOD_TOKEN, |doc| {
        doc.hero = Some(Hero { title: "New".into(), ..Hero::default() })
    });

    assert_eq!(outcome, EditOutcome::Published);
    let saved = api.saved();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].1, GOOD_TOKEN);
    assert_eq!(saved[0].0.portfolio, vec![item_a()]);
    assert_eq!(store.read().unwrap().hero.unwrap().title, "New");
}

#[test]
fn test_apply_edit_keeps_local_copy_when_publish_fails() {
    let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
    let api = FakeApi::serving(PageData::default());
    *api.save_result.lock().unwrap() = Err(ApiError::Unauthorized);

    let outcome = loader(&api, &store).apply_edit(GOOD_TOKEN, |doc| doc.logo = Some("https://cdn.example/logo.png".into()));

    assert_eq!(outcome, EditOutcome::SavedLocally(ApiError::Unauthorized));
    assert_eq!(
        store.read().unwrap().logo.as_deref(),
        Some("https://cdn.example/logo.png")
    );
    assert!(api.saved().is_empty());
}

#[test]
fn test_apply_edit_starts_from_local_copy_when_offline() {
    let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
    store.write(&doc_with(vec![item_b()])).unwrap();
    let api = FakeApi::offline();

    loader(&api, &store).apply_edit(GOOD_TOKEN, |doc| doc.colors = Some(Colors::default()));

    let local = store.read().unwrap();
    assert_eq!(local.portfolio, vec![item_b()]);
    assert!(local.colors.is_some());
}

#[test]
fn test_admin_save_does_not_touch_backup() {
    let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
    store.write_backup_collection(PORTFOLIO, &[item_a()]).unwrap();
    let api = FakeApi::serving(doc_with(vec![item_a()]));

    loader(&api, &store).apply_edit(GOOD_TOKEN, |doc| doc.portfolio.clear());

    assert_eq!(store.read_backup_collection(PORTFOLIO), Some(vec![item_a()]));
}

#[test]
fn test_portfolio_form_drops_blank_urls() {
    let forms: Vec<PortfolioForm> = serde_json::from_value(json!([
        { "title": "  Reel  ", "videoUrl": " https://youtu.be/abcDEF12345 " },
        { "title": "no url", "videoUrl": "   " },
        { "videoUrl": "/uploads/x.mp4", "poster": "", "active": false },
        {}
    ]))
    .unwrap();

    let items = PortfolioForm::into_items(forms);

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].title, "Reel");
    assert_eq!(items[0].video_url, "https://youtu.be/abcDEF12345");
    assert_eq!(items[1].title, "Video");
    assert!(items[1].poster.is_none());
    assert!(!items[1].active);
}

#[test]
fn test_service_form_normalizes_image_and_defaults_size() {
    let form = ServiceForm {
        title: Some(" Editing ".into()),
        image: Some("http://127.0.0.1:5001/uploads/icon.png".into()),
        ..ServiceForm::default()
    };
    let service = form.into_service(ORIGIN);
    assert_eq!(service.title, "Editing");
    assert_eq!(service.image.as_deref(), Some("https://prod.example/uploads/icon.png"));
    assert_eq!(service.image_size.as_deref(), Some("200px"));
    assert!(service.active);
}

#[test]
fn test_colors_form_mirrors_input_colors() {
    let colors = ColorsForm {
        bg_card: Some("#222".into()),
        border_color: Some("#333".into()),
        ..ColorsForm::default()
    }
    .into_colors();
    assert_eq!(colors.input_bg, "#222");
    assert_eq!(colors.input_border, "#333");
    assert_eq!(colors.primary, "#667eea");

    let explicit = ColorsForm {
        bg_card: Some("#222".into()),
        input_bg: Some("#444".into()),
        ..ColorsForm::default()
    }
    .into_colors();
    assert_eq!(explicit.input_bg, "#444");
}

#[test]
fn test_validate_logo() {
    assert!(validate_logo("data:image/png;base64,iVBORw0KGgo=").is_ok());
    assert!(validate_logo("https://cdn.example/logo.svg").is_ok());
    assert!(validate_logo("data:text/html;base64,PGI+").is_err());
    assert!(validate_logo("data:image/png;base64,@@@").is_err());
    assert!(validate_logo("data:image/png,rawbytes").is_err());
    assert!(validate_logo("javascript:alert(1)").is_err());
    assert!(validate_logo("   ").is_err());
}

// ── Config ─────────────────────────────────────────────

#[test]
fn test_environment_selection() {
    assert_eq!(ApiEnvironment::from_host("localhost:8000"), ApiEnvironment::Development);
    assert_eq!(ApiEnvironment::from_host("127.0.0.1"), ApiEnvironment::Development);
    assert_eq!(ApiEnvironment::from_host(""), ApiEnvironment::Development);
    assert_eq!(ApiEnvironment::from_host("www.example.com"), ApiEnvironment::Production);

    let dev = SiteConfig::default();
    assert_eq!(dev.active_origin(), DEVELOPMENT_ORIGIN);

    let prod = SiteConfig {
        site_host: "www.example.com".into(),
        production_origin: "https://api.example.com/".into(),
        ..SiteConfig::default()
    };
    assert_eq!(prod.active_origin(), "https://api.example.com");

    let pinned = SiteConfig {
        api_origin: Some("https://staging.example.com/".into()),
        ..prod
    };
    assert_eq!(pinned.active_origin(), "https://staging.example.com");
}

#[test]
fn test_status_error_message() {
    assert_eq!(
        status_error(500, r#"{"error":"boom"}"#).to_string(),
        "boom"
    );
    assert_eq!(status_error(502, "<html>").to_string(), "HTTP 502");
    assert_eq!(
        ApiError::Unauthorized.to_string(),
        "Session expired. Please log in again."
    );
}

// ── Routes ─────────────────────────────────────────────

fn client(api: &Arc<FakeApi>, store: &Arc<dyn ContentStore>) -> Client {
    let rocket = crate::build_rocket(loader(api, store), SiteConfig::default());
    Client::tracked(rocket).expect("valid rocket instance")
}

fn log_in(client: &Client) {
    let resp = client
        .post("/admin/login")
        .header(ContentType::JSON)
        .body(r#"{"username":"admin","password":"secret"}"#)
        .dispatch();
    assert_eq!(resp.status(), Status::Ok);
}

#[test]
fn test_landing_renders_live_portfolio() {
    let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
    let api = FakeApi::serving(doc_with(vec![item_a(), item_b()]));
    let client = client(&api, &store);

    let body = client.get("/").dispatch().into_string().unwrap();

    assert!(body.contains(r#"data-content-state="live""#));
    assert!(body.contains("https://www.youtube.com/embed/abcDEF12345?rel=0&amp;modestbranding=1"));
    assert!(body.contains(r#"<source src="https://prod.example/uploads/b.mp4" type="video/mp4">"#));
    assert!(!body.contains(LOAD_FAILED_NOTICE));
}

#[test]
fn test_portfolio_page_offline_shows_placeholder() {
    let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
    let client = client(&FakeApi::offline(), &store);

    let resp = client.get("/portfolio").dispatch();
    assert_eq!(resp.status(), Status::Ok);
    let body = resp.into_string().unwrap();
    assert!(body.contains(PORTFOLIO_EMPTY_TEXT));
    assert!(body.contains(LOAD_FAILED_NOTICE));
}

#[test]
fn test_page_data_endpoint_reports_state() {
    let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
    store.write_backup_collection(PORTFOLIO, &[item_c()]).unwrap();
    let client = client(&FakeApi::offline(), &store);

    let body: Value = client.get("/api/page-data").dispatch().into_json().unwrap();

    assert_eq!(body["state"], "cached");
    assert_eq!(body["data"]["portfolio"][0]["videoUrl"], "https://prod.example/uploads/c.webm");
}

#[test]
fn test_health_endpoint() {
    let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
    let client = client(&FakeApi::serving(PageData::default()), &store);

    let body: Value = client.get("/api/health").dispatch().into_json().unwrap();

    assert_eq!(body["status"], "ok");
    assert_eq!(body["environment"], "development");
    assert_eq!(body["upstream"]["ok"], true);
}

#[test]
fn test_admin_api_requires_session() {
    let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
    let api = FakeApi::serving(PageData::default());
    let client = client(&api, &store);

    let resp = client
        .post("/admin/api/hero")
        .header(ContentType::JSON)
        .body(r#"{"title":"x"}"#)
        .dispatch();

    assert_eq!(resp.status(), Status::Unauthorized);
    let body: Value = resp.into_json().unwrap();
    assert_eq!(body["ok"], false);
    assert!(api.saved().is_empty());
}

#[test]
fn test_login_rejects_bad_credentials() {
    let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
    let client = client(&FakeApi::serving(PageData::default()), &store);

    let resp = client
        .post("/admin/login")
        .header(ContentType::JSON)
        .body(r#"{"username":"admin","password":"nope"}"#)
        .dispatch();

    assert_eq!(resp.status(), Status::Unauthorized);
    let session: Value = client.get("/admin/session").dispatch().into_json().unwrap();
    assert_eq!(session["authenticated"], false);
}

#[test]
fn test_admin_portfolio_save_round_trip() {
    let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
    let api = FakeApi::serving(PageData::default());
    let client = client(&api, &store);
    log_in(&client);

    let session: Value = client.get("/admin/session").dispatch().into_json().unwrap();
    assert_eq!(session["authenticated"], true);

    let resp = client
        .post("/admin/api/portfolio")
        .header(ContentType::JSON)
        .body(r#"[{"title":"Launch","videoUrl":"https://www.youtube.com/shorts/abcDEF12345"},{"title":"blank","videoUrl":""}]"#)
        .dispatch();
    assert_eq!(resp.status(), Status::Ok);
    let body: Value = resp.into_json().unwrap();
    assert_eq!(body["ok"], true);

    let saved = api.saved();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].1, GOOD_TOKEN);
    assert_eq!(saved[0].0.portfolio.len(), 1);
    assert_eq!(store.read().unwrap().portfolio[0].title, "Launch");

    let landing = client.get("/").dispatch().into_string().unwrap();
    assert!(landing.contains("Launch"));
}

#[test]
fn test_expired_session_keeps_local_copy_and_logs_out() {
    let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
    let api = FakeApi::serving(PageData::default());
    let client = client(&api, &store);
    log_in(&client);
    *api.save_result.lock().unwrap() = Err(ApiError::Unauthorized);

    let resp = client
        .post("/admin/api/contact")
        .header(ContentType::JSON)
        .body(r#"{"whatsapp":"+1 555 0100","email":"hi@example.com"}"#)
        .dispatch();

    assert_eq!(resp.status(), Status::Unauthorized);
    let body: Value = resp.into_json().unwrap();
    assert_eq!(body["ok"], false);
    assert_eq!(body["saved_locally"], true);
    assert_eq!(body["error"], "Session expired. Please log in again.");
    assert_eq!(store.read().unwrap().contact.unwrap().email, "hi@example.com");

    let session: Value = client.get("/admin/session").dispatch().into_json().unwrap();
    assert_eq!(session["authenticated"], false);
}

#[test]
fn test_logo_upload_validation_and_reset() {
    let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
    let api = FakeApi::serving(PageData::default());
    let client = client(&api, &store);
    log_in(&client);

    let resp = client
        .post("/admin/api/logo")
        .header(ContentType::JSON)
        .body(r#"{"logo":"data:application/pdf;base64,AAAA"}"#)
        .dispatch();
    assert_eq!(resp.status(), Status::UnprocessableEntity);
    assert!(api.saved().is_empty());

    let resp = client
        .post("/admin/api/logo")
        .header(ContentType::JSON)
        .body(r#"{"logo":"data:image/png;base64,iVBORw0KGgo="}"#)
        .dispatch();
    assert_eq!(resp.status(), Status::Ok);
    assert!(store.read().unwrap().logo.is_some());

    let resp = client.delete("/admin/api/logo").dispatch();
    assert_eq!(resp.status(), Status::Ok);
    assert!(store.read().unwrap().logo.is_none());
}

#[test]
fn test_clear_portfolio_backup_endpoint() {
    let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
    store.write_backup_collection(PORTFOLIO, &[item_a()]).unwrap();
    let client = client(&FakeApi::serving(PageData::default()), &store);
    log_in(&client);

    let resp = client.delete("/admin/api/portfolio/backup").dispatch();

    assert_eq!(resp.status(), Status::Ok);
    assert!(store.read_backup_collection(PORTFOLIO).is_none());
}

#[test]
fn test_admin_responses_are_not_cached() {
    let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
    let client = client(&FakeApi::serving(PageData::default()), &store);

    let resp = client.get("/admin/session").dispatch();

    assert_eq!(
        resp.headers().get_one("Cache-Control"),
        Some("no-store, no-cache, must-revalidate, max-age=0")
    );
}

#[test]
fn test_admin_edits_keep_unknown_fields() {
    let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
    let current = PageData::from_json(r#"{"hero":{"title":"Old","badge":"new"}}"#).unwrap();
    let api = FakeApi::serving(current);
    let client = client(&api, &store);
    log_in(&client);

    let resp = client
        .post("/admin/api/hero")
        .header(ContentType::JSON)
        .body(r#"{"title":"New"}"#)
        .dispatch();
    assert_eq!(resp.status(), Status::Ok);

    let resp = client
        .post("/admin/api/portfolio")
        .header(ContentType::JSON)
        .body(r#"[{"_id":"abc","title":"Launch","videoUrl":"/uploads/a.mp4"}]"#)
        .dispatch();
    assert_eq!(resp.status(), Status::Ok);

    let saved = api.saved();
    let hero = saved[0].0.hero.clone().unwrap();
    assert_eq!(hero.title, "New");
    assert_eq!(hero.extra["badge"], "new");
    let last = &saved[1].0;
    assert_eq!(last.hero.as_ref().unwrap().extra["badge"], "new");
    assert_eq!(last.portfolio[0].extra["_id"], "abc");

    let editable: Value = client.get("/admin/api/page-data").dispatch().into_json().unwrap();
    assert_eq!(editable["data"]["portfolio"][0]["_id"], "abc");
}

fn multipart(file_name: &str, content_type: &str, data: &str) -> (ContentType, String) {
    let boundary = "showcase-boundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{f}\"\r\nContent-Type: {ct}\r\n\r\n{d}\r\n--{b}--\r\n",
        b = boundary,
        f = file_name,
        ct = content_type,
        d = data,
    );
    (ContentType::new("multipart", "form-data").with_params(("boundary", boundary)), body)
}

#[test]
fn test_image_library_requires_session() {
    let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
    let api = FakeApi::serving(PageData::default());
    let client = client(&api, &store);

    let resp = client.get("/admin/api/images").dispatch();
    assert_eq!(resp.status(), Status::Unauthorized);

    let (ct, body) = multipart("logo.png", "image/png", "PNGDATA");
    let resp = client.post("/admin/api/images").header(ct).body(body).dispatch();
    assert_eq!(resp.status(), Status::Unauthorized);
    assert!(api.uploads.lock().unwrap().is_empty());

    let resp = client.delete("/admin/api/images/logo.png").dispatch();
    assert_eq!(resp.status(), Status::Unauthorized);
}

#[test]
fn test_image_upload_list_and_delete() {
    let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
    let api = FakeApi::serving(PageData::default());
    let client = client(&api, &store);
    log_in(&client);

    let (ct, body) = multipart("logo.png", "image/png", "PNGDATA");
    let resp = client.post("/admin/api/images").header(ct).body(body).dispatch();
    assert_eq!(resp.status(), Status::Ok);
    let uploaded: Value = resp.into_json().unwrap();
    assert_eq!(uploaded["ok"], true);
    assert_eq!(uploaded["url"], "https://prod.example/uploads/logo.png");
    {
        let uploads = api.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].file_name, "logo.png");
        assert_eq!(uploads[0].content_type, "image/png");
        assert_eq!(uploads[0].bytes, b"PNGDATA".to_vec());
    }

    let listed: Value = client.get("/admin/api/images").dispatch().into_json().unwrap();
    assert_eq!(listed["images"][0]["filename"], "logo.png");
    assert_eq!(listed["images"][0]["url"], "https://prod.example/uploads/logo.png");

    let resp = client.delete("/admin/api/images/logo.png").dispatch();
    assert_eq!(resp.status(), Status::Ok);
    let listed: Value = client.get("/admin/api/images").dispatch().into_json().unwrap();
    assert_eq!(listed["images"], json!([]));

    let resp = client.delete("/admin/api/images/logo.png").dispatch();
    assert_eq!(resp.status(), Status::NotFound);
    let body: Value = resp.into_json().unwrap();
    assert_eq!(body["error"], "Image not found");
}

#[test]
fn test_image_upload_rejects_non_images() {
    let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
    let api = FakeApi::serving(PageData::default());
    let client = client(&api, &store);
    log_in(&client);

    let (ct, body) = multipart("notes.txt", "text/plain", "hello");
    let resp = client.post("/admin/api/images").header(ct).body(body).dispatch();

    assert_eq!(resp.status(), Status::UnsupportedMediaType);
    assert!(api.uploads.lock().unwrap().is_empty());
}

#[test]
fn test_image_delete_rejects_path_names() {
    let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
    let client = client(&FakeApi::serving(PageData::default()), &store);
    log_in(&client);

    let resp = client.delete("/admin/api/images/..%2Fsecret.png").dispatch();

    assert_eq!(resp.status(), Status::BadRequest);
}

#[test]
fn test_normalized_item_is_stable() {
    let item = item_c().normalized(ORIGIN);
    assert_eq!(item.video_url, media::normalize_asset_url(&item.video_url, ORIGIN));
    assert_eq!(media::detect_mime_type(&item.video_url), Some("video/webm"));
}

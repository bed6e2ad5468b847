use base64::Engine;
use rocket::http::{CookieJar, Status};
use rocket::serde::json::Json;
use rocket::State;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use url::Url;

use crate::api::ApiError;
use crate::auth::{self, OperatorSession};
use crate::content::{DocumentSource, EditOutcome, PageLoader};
use crate::media;
use crate::models::page::{About, Colors, Contact, Hero, Service, Testimonial, Typography};
use crate::models::portfolio::PortfolioForm;
use crate::models::{PageData, PortfolioItem};
use crate::typography;

use super::upstream_status;

const DEFAULT_SERVICE_IMAGE_SIZE: &str = "200px";

// ── Forms ──────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct HeroForm {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize, Default)]
pub struct AboutForm {
    pub text1: Option<String>,
    pub text2: Option<String>,
    #[serde(default, deserialize_with = "crate::models::string_list")]
    pub features: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ServiceForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub image_size: Option<String>,
    pub learn_more_link: Option<String>,
    pub purchase_link: Option<String>,
    pub active: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize, Default)]
pub struct TestimonialForm {
    pub image: Option<String>,
    pub active: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ContactForm {
    pub whatsapp: Option<String>,
    pub email: Option<String>,
    pub instagram: Option<String>,
    pub tiktok: Option<String>,
    pub linkedin: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ColorsForm {
    pub primary: Option<String>,
    pub primary_dark: Option<String>,
    pub accent: Option<String>,
    pub text_dark: Option<String>,
    pub text_light: Option<String>,
    pub bg_light: Option<String>,
    pub bg_white: Option<String>,
    pub contact_bg: Option<String>,
    pub bg_card: Option<String>,
    pub border_color: Option<String>,
    pub input_bg: Option<String>,
    pub input_border: Option<String>,
    pub navbar_bg: Option<String>,
    pub navbar_text: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct LogoForm {
    pub logo: String,
}

fn text(v: Option<String>) -> String {
    v.map(|s| s.trim().to_string()).unwrap_or_default()
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Keys the editor did not send survive a section save.
pub fn keep_unknown(extra: &mut Map<String, Value>, previous: Option<Map<String, Value>>) {
    for (key, value) in previous.into_iter().flatten() {
        extra.entry(key).or_insert(value);
    }
}

impl HeroForm {
    pub fn into_hero(self) -> Hero {
        Hero {
            title: text(self.title),
            subtitle: text(self.subtitle),
            description: text(self.description),
            extra: self.extra,
        }
    }
}

impl AboutForm {
    pub fn into_about(self) -> About {
        About {
            text1: text(self.text1),
            text2: text(self.text2),
            features: self
                .features
                .into_iter()
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect(),
            extra: self.extra,
        }
    }
}

impl ServiceForm {
    pub fn into_service(self, origin: &str) -> Service {
        Service {
            title: text(self.title),
            description: text(self.description),
            image: non_blank(self.image).map(|i| media::normalize_asset_url(&i, origin)),
            image_size: Some(
                non_blank(self.image_size).unwrap_or_else(|| DEFAULT_SERVICE_IMAGE_SIZE.to_string()),
            ),
            learn_more_link: text(self.learn_more_link),
            purchase_link: text(self.purchase_link),
            active: self.active.unwrap_or(true),
            extra: self.extra,
        }
    }
}

impl TestimonialForm {
    pub fn into_testimonial(self, origin: &str) -> Testimonial {
        Testimonial {
            image: non_blank(self.image).map(|i| media::normalize_asset_url(&i, origin)),
            active: self.active.unwrap_or(true),
            extra: self.extra,
        }
    }
}

impl ContactForm {
    pub fn into_contact(self) -> Contact {
        Contact {
            whatsapp: text(self.whatsapp),
            email: text(self.email),
            instagram: text(self.instagram),
            tiktok: text(self.tiktok),
            linkedin: text(self.linkedin),
            extra: self.extra,
        }
    }
}

impl ColorsForm {
    /// Missing colors take their defaults; the input colors follow the card
    /// and border colors unless given.
    pub fn into_colors(self) -> Colors {
        let d = Colors::default();
        let or = |v: Option<String>, fallback: &str| non_blank(v).unwrap_or_else(|| fallback.to_string());
        let bg_card = or(self.bg_card, &d.bg_card);
        let border_color = or(self.border_color, &d.border_color);
        Colors {
            primary: or(self.primary, &d.primary),
            primary_dark: or(self.primary_dark, &d.primary_dark),
            accent: or(self.accent, &d.accent),
            text_dark: or(self.text_dark, &d.text_dark),
            text_light: or(self.text_light, &d.text_light),
            bg_light: or(self.bg_light, &d.bg_light),
            bg_white: or(self.bg_white, &d.bg_white),
            contact_bg: or(self.contact_bg, &d.contact_bg),
            input_bg: or(self.input_bg, &bg_card),
            input_border: or(self.input_border, &border_color),
            bg_card,
            border_color,
            navbar_bg: or(self.navbar_bg, &d.navbar_bg),
            navbar_text: or(self.navbar_text, &d.navbar_text),
            extra: self.extra,
        }
    }
}

/// A logo is either an inline `data:image/*;base64,` payload that actually
/// decodes, or an absolute http(s) URL.
pub fn validate_logo(raw: &str) -> Result<String, String> {
    let logo = raw.trim();
    if logo.is_empty() {
        return Err("Logo is empty".to_string());
    }

    if let Some(rest) = logo.strip_prefix("data:") {
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| "Malformed data URL".to_string())?;
        let mime = meta
            .strip_suffix(";base64")
            .ok_or_else(|| "Logo data must be base64 encoded".to_string())?;
        if !mime.to_lowercase().starts_with("image/") {
            return Err("Logo must be an image".to_string());
        }
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|_| "Logo data is not valid base64".to_string())?;
        return Ok(logo.to_string());
    }

    match Url::parse(logo) {
        Ok(u) if u.scheme() == "http" || u.scheme() == "https" => Ok(logo.to_string()),
        _ => Err("Logo must be an image file or an http(s) URL".to_string()),
    }
}

// ── Responses ──────────────────────────────────────────

pub fn edit_response(outcome: EditOutcome, cookies: &CookieJar<'_>) -> (Status, Json<Value>) {
    match outcome {
        EditOutcome::Published => (
            Status::Ok,
            Json(json!({ "ok": true, "saved_locally": true })),
        ),
        EditOutcome::SavedLocally(e) => {
            if e == ApiError::Unauthorized {
                auth::clear_session_cookie(cookies);
            }
            (
                upstream_status(&e),
                Json(json!({ "ok": false, "saved_locally": true, "error": e.to_string() })),
            )
        }
        EditOutcome::NotSaved(e) => (
            Status::InternalServerError,
            Json(json!({ "ok": false, "saved_locally": false, "error": e })),
        ),
    }
}

fn invalid(message: &str) -> (Status, Json<Value>) {
    (
        Status::UnprocessableEntity,
        Json(json!({ "ok": false, "saved_locally": false, "error": message })),
    )
}

async fn run_edit<F>(
    loader: &PageLoader,
    session: OperatorSession,
    cookies: &CookieJar<'_>,
    edit: F,
) -> (Status, Json<Value>)
where
    F: FnOnce(&mut PageData) + Send + 'static,
{
    let loader = loader.clone();
    let token = session.token;
    let outcome = rocket::tokio::task::spawn_blocking(move || loader.apply_edit(&token, edit))
        .await
        .unwrap_or_else(|e| EditOutcome::NotSaved(e.to_string()));
    edit_response(outcome, cookies)
}

// ── Routes ─────────────────────────────────────────────

#[get("/page-data")]
pub async fn page_data(_session: OperatorSession, loader: &State<PageLoader>) -> Json<Value> {
    let loader = loader.inner().clone();
    let (data, source) = rocket::tokio::task::spawn_blocking(move || loader.editable_document())
        .await
        .unwrap_or_else(|e| {
            log::error!("[admin] load task failed: {}", e);
            (PageData::default(), DocumentSource::Blank)
        });
    Json(json!({ "ok": true, "source": source, "data": data }))
}

#[post("/hero", data = "<form>")]
pub async fn save_hero(
    session: OperatorSession,
    form: Json<HeroForm>,
    loader: &State<PageLoader>,
    cookies: &CookieJar<'_>,
) -> (Status, Json<Value>) {
    let hero = form.into_inner().into_hero();
    run_edit(loader, session, cookies, move |doc| {
        let mut hero = hero;
        keep_unknown(&mut hero.extra, doc.hero.take().map(|s| s.extra));
        doc.hero = Some(hero);
    })
    .await
}

#[post("/about", data = "<form>")]
pub async fn save_about(
    session: OperatorSession,
    form: Json<AboutForm>,
    loader: &State<PageLoader>,
    cookies: &CookieJar<'_>,
) -> (Status, Json<Value>) {
    let about = form.into_inner().into_about();
    run_edit(loader, session, cookies, move |doc| {
        let mut about = about;
        keep_unknown(&mut about.extra, doc.about.take().map(|s| s.extra));
        doc.about = Some(about);
    })
    .await
}

#[post("/services", data = "<form>")]
pub async fn save_services(
    session: OperatorSession,
    form: Json<Vec<ServiceForm>>,
    loader: &State<PageLoader>,
    cookies: &CookieJar<'_>,
) -> (Status, Json<Value>) {
    let services: Vec<Service> = form
        .into_inner()
        .into_iter()
        .map(|s| s.into_service(loader.origin()))
        .collect();
    run_edit(loader, session, cookies, move |doc| doc.services = services).await
}

#[post("/portfolio", data = "<form>")]
pub async fn save_portfolio(
    session: OperatorSession,
    form: Json<Vec<PortfolioForm>>,
    loader: &State<PageLoader>,
    cookies: &CookieJar<'_>,
) -> (Status, Json<Value>) {
    let items: Vec<PortfolioItem> = PortfolioForm::into_items(form.into_inner());
    log::info!("[admin] saving {} portfolio item(s)", items.len());
    run_edit(loader, session, cookies, move |doc| doc.portfolio = items).await
}

#[delete("/portfolio/backup")]
pub async fn clear_portfolio_backup(
    _session: OperatorSession,
    loader: &State<PageLoader>,
) -> (Status, Json<Value>) {
    let loader = loader.inner().clone();
    let result = rocket::tokio::task::spawn_blocking(move || loader.clear_portfolio_backup())
        .await
        .unwrap_or_else(|e| Err(e.to_string()));
    match result {
        Ok(()) => {
            log::info!("[admin] portfolio backup cleared");
            (Status::Ok, Json(json!({ "ok": true })))
        }
        Err(e) => {
            log::error!("[admin] failed to clear portfolio backup: {}", e);
            (Status::InternalServerError, Json(json!({ "ok": false, "error": e })))
        }
    }
}

#[post("/testimonials", data = "<form>")]
pub async fn save_testimonials(
    session: OperatorSession,
    form: Json<Vec<TestimonialForm>>,
    loader: &State<PageLoader>,
    cookies: &CookieJar<'_>,
) -> (Status, Json<Value>) {
    let testimonials: Vec<Testimonial> = form
        .into_inner()
        .into_iter()
        .map(|t| t.into_testimonial(loader.origin()))
        .collect();
    run_edit(loader, session, cookies, move |doc| doc.testimonials = testimonials).await
}

#[post("/contact", data = "<form>")]
pub async fn save_contact(
    session: OperatorSession,
    form: Json<ContactForm>,
    loader: &State<PageLoader>,
    cookies: &CookieJar<'_>,
) -> (Status, Json<Value>) {
    let contact = form.into_inner().into_contact();
    run_edit(loader, session, cookies, move |doc| {
        let mut contact = contact;
        keep_unknown(&mut contact.extra, doc.contact.take().map(|s| s.extra));
        doc.contact = Some(contact);
    })
    .await
}

#[post("/colors", data = "<form>")]
pub async fn save_colors(
    session: OperatorSession,
    form: Json<ColorsForm>,
    loader: &State<PageLoader>,
    cookies: &CookieJar<'_>,
) -> (Status, Json<Value>) {
    let colors = form.into_inner().into_colors();
    run_edit(loader, session, cookies, move |doc| {
        let mut colors = colors;
        keep_unknown(&mut colors.extra, doc.colors.take().map(|s| s.extra));
        doc.colors = Some(colors);
    })
    .await
}

#[delete("/colors")]
pub async fn reset_colors(
    session: OperatorSession,
    loader: &State<PageLoader>,
    cookies: &CookieJar<'_>,
) -> (Status, Json<Value>) {
    run_edit(loader, session, cookies, |doc| doc.colors = None).await
}

#[post("/typography", data = "<form>")]
pub async fn save_typography(
    session: OperatorSession,
    form: Json<Typography>,
    loader: &State<PageLoader>,
    cookies: &CookieJar<'_>,
) -> (Status, Json<Value>) {
    let resolved = typography::resolve_custom_font(form.into_inner());
    run_edit(loader, session, cookies, move |doc| {
        let mut resolved = resolved;
        keep_unknown(&mut resolved.extra, doc.typography.take().map(|t| t.extra));
        doc.typography = Some(resolved);
    })
    .await
}

#[delete("/typography")]
pub async fn reset_typography(
    session: OperatorSession,
    loader: &State<PageLoader>,
    cookies: &CookieJar<'_>,
) -> (Status, Json<Value>) {
    run_edit(loader, session, cookies, |doc| doc.typography = None).await
}

#[post("/logo", data = "<form>")]
pub async fn save_logo(
    session: OperatorSession,
    form: Json<LogoForm>,
    loader: &State<PageLoader>,
    cookies: &CookieJar<'_>,
) -> (Status, Json<Value>) {
    let logo = match validate_logo(&form.logo) {
        Ok(l) => l,
        Err(e) => return invalid(&e),
    };
    run_edit(loader, session, cookies, move |doc| doc.logo = Some(logo)).await
}

#[delete("/logo")]
pub async fn reset_logo(
    session: OperatorSession,
    loader: &State<PageLoader>,
    cookies: &CookieJar<'_>,
) -> (Status, Json<Value>) {
    run_edit(loader, session, cookies, |doc| doc.logo = None).await
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        page_data,
        save_hero,
        save_about,
        save_services,
        save_portfolio,
        clear_portfolio_backup,
        save_testimonials,
        save_contact,
        save_colors,
        reset_colors,
        save_typography,
        reset_typography,
        save_logo,
        reset_logo,
    ]
}

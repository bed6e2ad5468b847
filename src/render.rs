use url::form_urlencoded;

use crate::content::{LoadState, Resolution};
use crate::media::{self, SourceKind};
use crate::models::page::{About, Contact, Hero, Service, Testimonial};
use crate::models::PortfolioItem;
use crate::typography;

pub const PORTFOLIO_EMPTY_TEXT: &str =
    "No videos published yet. Add them from the admin panel to show them here.";
const TESTIMONIALS_EMPTY_TEXT: &str = "No testimonials yet.";
const VIDEO_FALLBACK_TEXT: &str = "Your browser does not support HTML5 video.";
const PLAYER_ALLOW: &str =
    "accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture; web-share";

const DEFAULT_HERO_TITLE: &str = "Creative Portfolio";
const DEFAULT_HERO_SUBTITLE: &str = "UGC Content Creation & Professional Video Editing";
const DEFAULT_HERO_DESCRIPTION: &str = "I turn ideas into visual content that stands out.";
const WHATSAPP_TEXT: &str = "Hi, I'm interested in your services";

// ── Portfolio render model ─────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Player {
    Embed {
        src: String,
        title: String,
    },
    Video {
        src: String,
        /// Omitted from markup when unknown; a wrong hint breaks playback.
        mime: Option<&'static str>,
        poster: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioCard {
    pub title: String,
    pub description: String,
    pub kind: SourceKind,
    pub player: Option<Player>,
    /// Poster, or YouTube's own still when none was set.
    pub thumbnail: Option<String>,
}

impl PortfolioCard {
    pub fn source_label(&self) -> &'static str {
        match self.kind {
            SourceKind::Youtube => "YouTube / Streaming",
            SourceKind::File => "File or direct link",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PortfolioModel {
    Empty,
    Cards(Vec<PortfolioCard>),
}

/// Decide what each visible portfolio entry renders as. Expects items that
/// already went through normalization; inactive items are dropped.
pub fn build_portfolio_model(items: &[PortfolioItem]) -> PortfolioModel {
    let cards: Vec<PortfolioCard> = items
        .iter()
        .filter(|item| item.active)
        .map(build_card)
        .collect();

    if cards.is_empty() {
        PortfolioModel::Empty
    } else {
        PortfolioModel::Cards(cards)
    }
}

fn build_card(item: &PortfolioItem) -> PortfolioCard {
    let title = if item.title.trim().is_empty() {
        "Untitled video".to_string()
    } else {
        item.title.clone()
    };
    let kind = media::classify_source(&item.video_url);
    let poster = item.poster_url().map(|p| p.to_string());

    let player = if item.video_url.is_empty() {
        None
    } else {
        Some(match kind {
            SourceKind::Youtube => Player::Embed {
                src: media::build_embed_url(&item.video_url),
                title: title.clone(),
            },
            SourceKind::File => Player::Video {
                src: item.video_url.clone(),
                mime: media::detect_mime_type(&item.video_url),
                poster: poster.clone(),
            },
        })
    };

    PortfolioCard {
        title,
        description: item.description.clone(),
        kind,
        player,
        thumbnail: poster.or_else(|| media::youtube_thumbnail(&item.video_url)),
    }
}

// ── HTML helpers ───────────────────────────────────────

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Only let through link targets a browser will treat as navigation.
fn safe_href(url: &str) -> Option<String> {
    let url = url.trim();
    let lower = url.to_lowercase();
    if lower.starts_with("https://")
        || lower.starts_with("http://")
        || lower.starts_with("mailto:")
        || (url.starts_with('/') && !url.starts_with("//"))
    {
        Some(html_escape(url))
    } else {
        None
    }
}

/// Image sources additionally allow inline `data:image/` payloads (logos).
fn safe_img_src(url: &str) -> Option<String> {
    let trimmed = url.trim();
    if trimmed.to_lowercase().starts_with("data:image/") {
        return Some(html_escape(trimmed));
    }
    safe_href(trimmed)
}

fn initials(name: &str) -> String {
    let s: String = name
        .split_whitespace()
        .filter_map(|w| w.chars().next())
        .filter(|c| c.is_alphanumeric())
        .take(2)
        .collect::<String>()
        .to_uppercase();
    if s.is_empty() { "★".to_string() } else { s }
}

// ── Sections ───────────────────────────────────────────

fn render_player(player: &Player) -> String {
    match player {
        Player::Embed { src, title } => format!(
            r#"<iframe src="{}" title="{}" allow="{}" allowfullscreen loading="lazy"></iframe>"#,
            html_escape(src),
            html_escape(title),
            PLAYER_ALLOW
        ),
        Player::Video { src, mime, poster } => {
            let poster_attr = poster
                .as_deref()
                .and_then(safe_img_src)
                .map(|p| format!(r#" poster="{}""#, p))
                .unwrap_or_default();
            let type_attr = mime
                .map(|m| format!(r#" type="{}""#, m))
                .unwrap_or_default();
            format!(
                r#"<video controls preload="metadata"{}><source src="{}"{}><p>{}</p></video>"#,
                poster_attr,
                html_escape(src),
                type_attr,
                VIDEO_FALLBACK_TEXT
            )
        }
    }
}

pub fn render_portfolio_grid(model: &PortfolioModel) -> String {
    let cards = match model {
        PortfolioModel::Empty => {
            return format!(
                r#"<div class="portfolio-grid" id="portfolioGrid"><div class="portfolio-empty">{}</div></div>"#,
                PORTFOLIO_EMPTY_TEXT
            )
        }
        PortfolioModel::Cards(cards) => cards,
    };

    let mut html = String::from(r#"<div class="portfolio-grid" id="portfolioGrid">"#);
    for card in cards {
        let thumb_attr = card
            .thumbnail
            .as_deref()
            .and_then(safe_img_src)
            .map(|t| format!(r#" data-thumbnail="{}""#, t))
            .unwrap_or_default();
        html.push_str(&format!(
            r#"
    <article class="portfolio-card" data-source="{kind}"{thumb}>
        <div class="portfolio-media">{player}</div>
        <div class="portfolio-body">
            <h3 class="portfolio-title">{title}</h3>
            <p class="portfolio-text">{desc}</p>
            <span class="portfolio-meta">{label}</span>
        </div>
    </article>"#,
            kind = card.kind.as_str(),
            thumb = thumb_attr,
            player = card.player.as_ref().map(render_player).unwrap_or_default(),
            title = html_escape(&card.title),
            desc = html_escape(&card.description),
            label = card.source_label(),
        ));
    }
    html.push_str("\n</div>");
    html
}

fn render_hero(hero: Option<&Hero>) -> String {
    let default_hero = Hero::default();
    let hero = hero.unwrap_or(&default_hero);
    let or = |v: &str, d: &str| -> String {
        if v.trim().is_empty() { d.to_string() } else { v.to_string() }
    };
    format!(
        r#"<section class="hero" id="home">
        <h1 class="hero-title">{}</h1>
        <p class="hero-subtitle">{}</p>
        <p class="hero-description">{}</p>
    </section>"#,
        html_escape(&or(&hero.title, DEFAULT_HERO_TITLE)),
        html_escape(&or(&hero.subtitle, DEFAULT_HERO_SUBTITLE)),
        html_escape(&or(&hero.description, DEFAULT_HERO_DESCRIPTION)),
    )
}

fn render_about(about: Option<&About>) -> String {
    let about = match about {
        Some(a) => a,
        None => return String::new(),
    };
    let mut html = String::from(r#"<section class="about" id="about"><div class="about-content">"#);
    for text in [&about.text1, &about.text2] {
        if !text.trim().is_empty() {
            html.push_str(&format!("<p>{}</p>", html_escape(text)));
        }
    }
    if !about.features.is_empty() {
        html.push_str(r#"<div class="about-features">"#);
        for feature in &about.features {
            html.push_str(&format!(
                r#"<div class="feature"><span class="feature-icon">&#10003;</span><span>{}</span></div>"#,
                html_escape(feature)
            ));
        }
        html.push_str("</div>");
    }
    html.push_str("</div></section>");
    html
}

/// Icon box size and whether it is drawn as a circle. Pixel sizes above
/// 150px switch to a rounded square.
pub fn service_icon_size(image_size: Option<&str>) -> (String, bool) {
    let size = match image_size.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s,
        None => return ("200px".to_string(), true),
    };
    if size.contains("px") {
        let digits: String = size.chars().take_while(|c| c.is_ascii_digit()).collect();
        let circular = digits.parse::<u32>().map(|px| px <= 150).unwrap_or(false);
        return (size.to_string(), circular);
    }
    match size {
        "pequeño" => ("50px".to_string(), true),
        "mediano" => ("70px".to_string(), true),
        "grande" => ("100px".to_string(), true),
        _ => ("200px".to_string(), true),
    }
}

fn render_services(services: &[Service], origin: &str) -> String {
    let active: Vec<&Service> = services.iter().filter(|s| s.active).collect();
    if active.is_empty() {
        return String::new();
    }

    let mut html = String::from(r#"<section class="services" id="services"><div class="services-grid">"#);
    for service in active {
        let (size, circular) = service_icon_size(service.image_size.as_deref());
        let radius = if circular { "50%" } else { "12px" };
        let image = service
            .image
            .as_deref()
            .map(|i| media::normalize_asset_url(i, origin))
            .and_then(|i| safe_img_src(&i));
        let icon = match image {
            Some(src) => format!(
                r#"<img src="{}" alt="{}" style="width:100%;height:100%;object-fit:cover;border-radius:{};">"#,
                src,
                html_escape(&service.title),
                radius
            ),
            None => r#"<svg fill="currentColor" viewBox="0 0 24 24"><path d="M12 2C6.48 2 2 6.48 2 12s4.48 10 10 10 10-4.48 10-10S17.52 2 12 2zm-2 15l-5-5 1.41-1.41L10 14.17l7.59-7.59L19 8l-9 9z"/></svg>"#.to_string(),
        };

        let mut actions = String::new();
        if let Some(href) = safe_href(&service.learn_more_link) {
            actions.push_str(&format!(
                r#"<a href="{}" target="_blank" rel="noopener noreferrer" class="service-btn service-btn-secondary">Learn more</a>"#,
                href
            ));
        }
        if let Some(href) = safe_href(&service.purchase_link) {
            actions.push_str(&format!(
                r#"<a href="{}" target="_blank" rel="noopener noreferrer" class="service-btn service-btn-primary">Hire now</a>"#,
                href
            ));
        }

        html.push_str(&format!(
            r#"
    <div class="service-card">
        <div class="service-icon" style="width:{size};height:{size};border-radius:{radius};">{icon}</div>
        <h3>{title}</h3>
        <p>{desc}</p>
        <div class="service-actions">{actions}</div>
    </div>"#,
            size = html_escape(&size),
            radius = radius,
            icon = icon,
            title = html_escape(&service.title),
            desc = html_escape(&service.description),
            actions = actions,
        ));
    }
    html.push_str("\n</div></section>");
    html
}

fn render_testimonials(testimonials: &[Testimonial], origin: &str, brand: &str) -> String {
    let active: Vec<&Testimonial> = testimonials.iter().filter(|t| t.active).collect();
    let mut html = String::from(
        r#"<section class="testimonials" id="testimonials"><div class="testimonials-slider"><div class="testimonials-track" id="testimonialsSlider">"#,
    );

    if active.is_empty() {
        html.push_str(&format!(
            r#"<div class="testimonial-slide empty">{}</div></div></div></section>"#,
            TESTIMONIALS_EMPTY_TEXT
        ));
        return html;
    }

    let fallback = initials(brand);
    for (index, t) in active.iter().enumerate() {
        let image = t
            .image
            .as_deref()
            .map(|i| media::normalize_asset_url(i, origin))
            .and_then(|i| safe_img_src(&i));
        let photo = match image {
            Some(src) => format!(r#"<img src="{}" alt="Testimonial" class="testimonial-img">"#, src),
            None => format!(
                r#"<div class="testimonial-avatar-fallback">{}</div>"#,
                html_escape(&fallback)
            ),
        };
        html.push_str(&format!(
            r#"<div class="testimonial-slide{}" data-index="{}"><div class="testimonial-photo">{}</div></div>"#,
            if index == 0 { " active" } else { "" },
            index,
            photo
        ));
    }
    html.push_str("</div>");

    if active.len() > 1 {
        html.push_str(r#"<div class="slider-dots" id="testimonialDots">"#);
        for index in 0..active.len() {
            html.push_str(&format!(
                r#"<button class="slider-dot{}" aria-label="Go to testimonial {}"></button>"#,
                if index == 0 { " active" } else { "" },
                index + 1
            ));
        }
        html.push_str("</div>");
    }
    html.push_str("</div></section>");
    html
}

/// `wa.me` deep link; the number is reduced to its digits.
pub fn whatsapp_link(number: &str, text: &str) -> Option<String> {
    let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let encoded: String = form_urlencoded::byte_serialize(text.as_bytes()).collect();
    Some(format!("https://wa.me/{}?text={}", digits, encoded))
}

fn render_contact(contact: Option<&Contact>) -> String {
    let contact = match contact {
        Some(c) => c,
        None => return String::new(),
    };

    let mut html = String::from(r#"<section class="contact" id="contact"><div class="contact-info">"#);
    if let Some(link) = whatsapp_link(&contact.whatsapp, WHATSAPP_TEXT) {
        html.push_str(&format!(
            r#"<a class="whatsapp-btn" href="{}" target="_blank" rel="noopener noreferrer">WhatsApp</a>"#,
            html_escape(&link)
        ));
    }
    if !contact.email.trim().is_empty() {
        let email = contact.email.trim();
        html.push_str(&format!(
            r#"<div class="info-item"><a href="mailto:{0}">{0}</a></div>"#,
            html_escape(email)
        ));
    }
    html.push_str("</div>");

    let socials = [
        ("Instagram", &contact.instagram),
        ("TikTok", &contact.tiktok),
        ("LinkedIn", &contact.linkedin),
    ];
    let links: Vec<String> = socials
        .iter()
        .filter_map(|(label, url)| {
            safe_href(url).map(|href| {
                format!(
                    r#"<a class="social-link" href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
                    href, label
                )
            })
        })
        .collect();
    if !links.is_empty() {
        html.push_str(&format!(r#"<div class="social-links">{}</div>"#, links.join("")));
    }
    html.push_str("</section>");
    html
}

fn render_logo(logo: Option<&str>, brand: &str) -> String {
    match logo.and_then(safe_img_src) {
        Some(src) => format!(
            r#"<a href="/" class="nav-logo" id="navLogo"><img src="{}" alt="Logo" style="max-height:40px;width:auto;"></a>"#,
            src
        ),
        None => format!(
            r#"<a href="/" class="nav-logo" id="navLogo">{}</a>"#,
            html_escape(brand)
        ),
    }
}

fn render_notice(res: &Resolution) -> String {
    match &res.notice {
        Some(notice) => format!(
            r#"<div class="status-banner" id="portfolioStatus" role="status">{}</div>"#,
            html_escape(notice)
        ),
        None => String::new(),
    }
}

// ── Pages ──────────────────────────────────────────────

fn brand_name(res: &Resolution) -> String {
    res.document
        .hero
        .as_ref()
        .map(|h| h.title.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_HERO_TITLE.to_string())
}

fn og_image(model: &PortfolioModel) -> String {
    match model {
        PortfolioModel::Cards(cards) => cards
            .iter()
            .find_map(|c| c.thumbnail.as_deref().filter(|t| t.starts_with("https://")))
            .map(|t| format!(r#"    <meta property="og:image" content="{}">
"#, html_escape(t)))
            .unwrap_or_default(),
        PortfolioModel::Empty => String::new(),
    }
}

fn page_shell(res: &Resolution, title: &str, head_extra: &str, body: &str) -> String {
    let doc = &res.document;
    let brand = brand_name(res);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
{head_extra}{font_links}    <style>
        {css_vars}
        {base_css}
    </style>
</head>
<body data-content-state="{state}">
    <nav class="navbar">
        {logo}
        <div class="nav-menu">
            <a href="/#about" class="nav-link">About</a>
            <a href="/#services" class="nav-link">Services</a>
            <a href="/portfolio" class="nav-link">Portfolio</a>
            <a href="/#contact" class="nav-link">Contact</a>
        </div>
    </nav>
    {notice}
    <main>
{body}
    </main>
</body>
</html>"#,
        title = html_escape(title),
        head_extra = head_extra,
        font_links = typography::build_font_links(doc.typography.as_ref()),
        css_vars = typography::build_css_variables(doc.colors.as_ref(), doc.typography.as_ref()),
        base_css = BASE_CSS,
        state = match res.state {
            LoadState::Live => "live",
            LoadState::Cached => "cached",
            LoadState::Empty => "empty",
        },
        logo = render_logo(doc.logo.as_deref(), &brand),
        notice = render_notice(res),
        body = body,
    )
}

/// The full landing page.
pub fn render_landing(res: &Resolution, origin: &str) -> String {
    let doc = &res.document;
    let brand = brand_name(res);
    let model = build_portfolio_model(&res.portfolio);

    let body = [
        render_hero(doc.hero.as_ref()),
        render_about(doc.about.as_ref()),
        render_services(&doc.services, origin),
        format!(
            r#"<section class="portfolio" id="portfolio">{}</section>"#,
            render_portfolio_grid(&model)
        ),
        render_testimonials(&doc.testimonials, origin, &brand),
        render_contact(doc.contact.as_ref()),
    ]
    .iter()
    .filter(|s| !s.is_empty())
    .cloned()
    .collect::<Vec<_>>()
    .join("\n");

    page_shell(res, &brand, &og_image(&model), &body)
}

/// The standalone portfolio page: just the video grid.
pub fn render_portfolio_page(res: &Resolution) -> String {
    let model = build_portfolio_model(&res.portfolio);
    let body = format!(
        r#"<section class="portfolio" id="portfolio">{}</section>"#,
        render_portfolio_grid(&model)
    );
    let title = format!("Portfolio | {}", brand_name(res));
    page_shell(res, &title, &og_image(&model), &body)
}

const BASE_CSS: &str = r#"
* { box-sizing: border-box; margin: 0; padding: 0; }
body { font-family: var(--primary-font); font-size: var(--body-size); font-weight: var(--font-weight); line-height: var(--line-height); color: var(--text-dark); background: var(--bg-white); }
h1 { font-size: var(--h1-size); }
h2 { font-size: var(--h2-size); }
.navbar { position: sticky; top: 0; display: flex; justify-content: space-between; align-items: center; padding: 1rem 2rem; background: var(--navbar-bg); color: var(--navbar-text); z-index: 10; }
.nav-menu { display: flex; gap: 1.5rem; }
.nav-link, .nav-logo { color: var(--navbar-text); text-decoration: none; font-weight: 600; }
.status-banner { padding: .75rem 2rem; background: var(--bg-light); color: var(--text-light); text-align: center; }
section { padding: 4rem 2rem; }
.hero { background: linear-gradient(135deg, var(--primary), var(--primary-dark)); color: #fff; text-align: center; }
.about-features { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 1rem; margin-top: 1.5rem; }
.services-grid, .portfolio-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(280px, 1fr)); gap: 2rem; }
.service-card, .portfolio-card { background: var(--bg-card); border: 1px solid var(--border-color); border-radius: 12px; padding: 1.5rem; }
.service-icon { margin: 0 auto 1rem; overflow: hidden; display: flex; align-items: center; justify-content: center; color: var(--primary); }
.service-btn { display: inline-block; margin: .5rem .25rem 0; padding: .5rem 1rem; border-radius: 8px; text-decoration: none; }
.service-btn-primary { background: var(--primary); color: #fff; }
.service-btn-secondary { border: 1px solid var(--primary); color: var(--primary); }
.portfolio-media iframe, .portfolio-media video { width: 100%; aspect-ratio: 16 / 9; border: 0; border-radius: 8px; }
.portfolio-meta { color: var(--text-light); font-size: .85em; }
.portfolio-empty, .testimonial-slide.empty { grid-column: 1 / -1; text-align: center; color: var(--text-light); }
.testimonials-track { display: flex; gap: 1rem; overflow-x: auto; }
.testimonial-img { max-width: 320px; border-radius: 12px; }
.testimonial-avatar-fallback { width: 96px; height: 96px; border-radius: 50%; background: var(--primary); color: #fff; display: flex; align-items: center; justify-content: center; font-weight: 700; }
.slider-dot { width: 10px; height: 10px; border-radius: 50%; border: 0; background: var(--border-color); margin: 0 4px; }
.slider-dot.active { background: var(--primary); }
.contact { background: var(--contact-bg); text-align: center; }
.whatsapp-btn { display: inline-block; padding: .75rem 1.5rem; border-radius: 999px; background: var(--accent); color: #fff; text-decoration: none; }
.social-links { margin-top: 1rem; display: flex; gap: 1rem; justify-content: center; }
"#;

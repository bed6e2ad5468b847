use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::portfolio::PortfolioItem;
use super::{default_true, null_default, null_true, string_list};

/// Accept a list where some entries are junk (nulls, strings, half-written
/// objects from old editor versions). Bad entries are skipped; a missing or
/// non-array value yields an empty list.
fn lenient_vec<'de, D, T>(de: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Value::deserialize(de)?;
    Ok(match raw {
        Value::Array(entries) => entries
            .into_iter()
            .filter(|v| v.is_object())
            .filter_map(|v| match serde_json::from_value(v) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    log::warn!("[content] skipped unreadable list entry: {}", e);
                    None
                }
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// The whole editable site in one aggregate. Top-level keys this crate does
/// not know about are carried through untouched.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero: Option<Hero>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<About>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub services: Vec<Service>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub portfolio: Vec<PortfolioItem>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub testimonials: Vec<Testimonial>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Colors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typography: Option<Typography>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PageData {
    pub fn from_json(raw: &str) -> Result<Self, String> {
        serde_json::from_str(raw).map_err(|e| e.to_string())
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string(self).map_err(|e| e.to_string())
    }

    pub fn has_portfolio(&self) -> bool {
        !self.portfolio.is_empty()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Hero {
    #[serde(default, deserialize_with = "null_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_default")]
    pub subtitle: String,
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct About {
    #[serde(default, deserialize_with = "null_default")]
    pub text1: String,
    #[serde(default, deserialize_with = "null_default")]
    pub text2: String,
    #[serde(default, deserialize_with = "string_list")]
    pub features: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(default, deserialize_with = "null_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    /// `"<n>px"`, or one of the legacy labels `pequeño` / `mediano` / `grande`.
    #[serde(default)]
    pub image_size: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub learn_more_link: String,
    #[serde(default, deserialize_with = "null_default")]
    pub purchase_link: String,
    #[serde(default = "default_true", deserialize_with = "null_true")]
    pub active: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Testimonials are image cards; any caption fields ride along in `extra`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Testimonial {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_true", deserialize_with = "null_true")]
    pub active: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Contact {
    #[serde(default, deserialize_with = "null_default")]
    pub whatsapp: String,
    #[serde(default, deserialize_with = "null_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_default")]
    pub instagram: String,
    #[serde(default, deserialize_with = "null_default")]
    pub tiktok: String,
    #[serde(default, deserialize_with = "null_default")]
    pub linkedin: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Theme colors, one per CSS custom property on the landing page.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Colors {
    #[serde(deserialize_with = "null_default")]
    pub primary: String,
    #[serde(deserialize_with = "null_default")]
    pub primary_dark: String,
    #[serde(deserialize_with = "null_default")]
    pub accent: String,
    #[serde(deserialize_with = "null_default")]
    pub text_dark: String,
    #[serde(deserialize_with = "null_default")]
    pub text_light: String,
    #[serde(deserialize_with = "null_default")]
    pub bg_light: String,
    #[serde(deserialize_with = "null_default")]
    pub bg_white: String,
    #[serde(deserialize_with = "null_default")]
    pub contact_bg: String,
    #[serde(deserialize_with = "null_default")]
    pub bg_card: String,
    #[serde(deserialize_with = "null_default")]
    pub border_color: String,
    #[serde(deserialize_with = "null_default")]
    pub input_bg: String,
    #[serde(deserialize_with = "null_default")]
    pub input_border: String,
    #[serde(deserialize_with = "null_default")]
    pub navbar_bg: String,
    #[serde(deserialize_with = "null_default")]
    pub navbar_text: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Colors {
    fn default() -> Self {
        Colors {
            primary: "#667eea".into(),
            primary_dark: "#764ba2".into(),
            accent: "#25d366".into(),
            text_dark: "#1a1a1a".into(),
            text_light: "#666".into(),
            bg_light: "#f5f7fa".into(),
            bg_white: "#ffffff".into(),
            contact_bg: "#ffffff".into(),
            bg_card: "#ffffff".into(),
            border_color: "#e0e0e0".into(),
            input_bg: "#ffffff".into(),
            input_border: "#ddd".into(),
            navbar_bg: "rgba(255,255,255,0.95)".into(),
            navbar_text: "#1a1a1a".into(),
            extra: Map::new(),
        }
    }
}

impl Colors {
    /// `(css variable, value)` pairs with blanks replaced by the defaults.
    /// Input colors follow the card and border colors unless set explicitly.
    pub fn css_pairs(&self) -> Vec<(&'static str, String)> {
        let d = Colors::default();
        let pick = |v: &str, fallback: &str| -> String {
            if v.trim().is_empty() { fallback.to_string() } else { v.trim().to_string() }
        };
        let bg_card = pick(&self.bg_card, &d.bg_card);
        let border = pick(&self.border_color, &d.border_color);
        vec![
            ("--primary", pick(&self.primary, &d.primary)),
            ("--primary-dark", pick(&self.primary_dark, &d.primary_dark)),
            ("--accent", pick(&self.accent, &d.accent)),
            ("--text-dark", pick(&self.text_dark, &d.text_dark)),
            ("--text-light", pick(&self.text_light, &d.text_light)),
            ("--bg-light", pick(&self.bg_light, &d.bg_light)),
            ("--bg-white", pick(&self.bg_white, &d.bg_white)),
            ("--contact-bg", pick(&self.contact_bg, &d.contact_bg)),
            ("--bg-card", bg_card.clone()),
            ("--border-color", border.clone()),
            ("--input-bg", pick(&self.input_bg, &bg_card)),
            ("--input-border", pick(&self.input_border, &border)),
            ("--navbar-bg", pick(&self.navbar_bg, &d.navbar_bg)),
            ("--navbar-text", pick(&self.navbar_text, &d.navbar_text)),
        ]
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Typography {
    #[serde(deserialize_with = "null_default")]
    pub primary_font: String,
    #[serde(deserialize_with = "null_default")]
    pub h1_size: String,
    #[serde(deserialize_with = "null_default")]
    pub h2_size: String,
    #[serde(deserialize_with = "null_default")]
    pub body_size: String,
    #[serde(deserialize_with = "null_default")]
    pub font_weight: String,
    #[serde(deserialize_with = "null_default")]
    pub line_height: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_font_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_fonts_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Typography {
    fn default() -> Self {
        Typography {
            primary_font: "'Poppins', sans-serif".into(),
            h1_size: "48px".into(),
            h2_size: "32px".into(),
            body_size: "16px".into(),
            font_weight: "400".into(),
            line_height: "1.6".into(),
            custom_font_name: None,
            google_fonts_url: None,
            extra: Map::new(),
        }
    }
}

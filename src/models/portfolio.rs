use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{default_true, null_default, null_true};
use crate::media;

/// One video card. Identity is its position in the document's list.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItem {
    #[serde(default, deserialize_with = "null_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_default")]
    pub video_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    /// `false` hides the card without removing it.
    #[serde(default = "default_true", deserialize_with = "null_true")]
    pub active: bool,
    /// Upstream bookkeeping (`_id`, timestamps) kept for the round trip.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One row of the portfolio editor as the admin panel submits it.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub poster: Option<String>,
    pub active: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PortfolioItem {
    pub fn new(title: &str, video_url: &str) -> Self {
        PortfolioItem {
            title: title.to_string(),
            description: String::new(),
            video_url: video_url.to_string(),
            poster: None,
            active: true,
            extra: Map::new(),
        }
    }

    /// Poster with empty strings treated as unset.
    pub fn poster_url(&self) -> Option<&str> {
        self.poster.as_deref().map(str::trim).filter(|p| !p.is_empty())
    }

    /// Copy with asset URLs pointed at `origin` and the video URL in
    /// canonical playable form.
    pub fn normalized(&self, origin: &str) -> Self {
        let video = media::normalize_asset_url(&self.video_url, origin);
        PortfolioItem {
            title: self.title.clone(),
            description: self.description.clone(),
            video_url: media::sanitize_video_url(&video),
            poster: self
                .poster_url()
                .map(|p| media::normalize_asset_url(p, origin)),
            active: self.active,
            extra: self.extra.clone(),
        }
    }
}

impl PortfolioForm {
    /// Entries without a video URL are dropped; the rest are trimmed and
    /// defaulted the same way the editor always has.
    pub fn into_items(forms: Vec<PortfolioForm>) -> Vec<PortfolioItem> {
        forms
            .into_iter()
            .filter_map(|form| {
                let video_url = form.video_url.as_deref().unwrap_or("").trim().to_string();
                if video_url.is_empty() {
                    return None;
                }
                let title = form.title.as_deref().unwrap_or("").trim();
                let poster = form.poster.as_deref().unwrap_or("").trim();
                Some(PortfolioItem {
                    title: if title.is_empty() { "Video".to_string() } else { title.to_string() },
                    description: form.description.as_deref().unwrap_or("").trim().to_string(),
                    video_url,
                    poster: if poster.is_empty() { None } else { Some(poster.to_string()) },
                    active: form.active.unwrap_or(true),
                    extra: form.extra,
                })
            })
            .collect()
    }
}

//! Resolve the page data to render: live from the API when it answers,
//! otherwise the last copy persisted locally.
//!
//! The portfolio gets special treatment. When the API returns an empty
//! portfolio but a local copy has items, the local items win. The API is
//! trusted whenever it has *any* items. This keeps a blank fresh deployment
//! or a bad network moment from wiping the grid, but it also means an
//! operator emptying the portfolio on the server sees the old items come
//! back from local storage unless the backup is cleared too.

use std::sync::Arc;

use serde::Serialize;

use crate::api::{ApiError, ContentApi};
use crate::models::{PageData, PortfolioItem};
use crate::store::{ContentStore, PORTFOLIO};

/// Shown to visitors whenever the live fetch failed, whatever the cause.
pub const LOAD_FAILED_NOTICE: &str = "Couldn't load the latest content. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    /// Fetched from the API (possibly backfilled from local storage).
    Live,
    /// API unreachable; rendered from the local copy.
    Cached,
    /// API unreachable and nothing usable stored locally.
    Empty,
}

#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub state: LoadState,
    /// The document as resolved, before URL normalization.
    pub document: PageData,
    /// Portfolio ready for rendering: normalized, inactive items included.
    pub portfolio: Vec<PortfolioItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// Where the admin panel's working copy came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentSource {
    Remote,
    Local,
    Blank,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    /// Stored locally and accepted by the API.
    Published,
    /// Stored locally; the API refused or could not be reached.
    SavedLocally(ApiError),
    /// The local write itself failed; nothing was sent upstream.
    NotSaved(String),
}

#[derive(Clone)]
pub struct PageLoader {
    api: Arc<dyn ContentApi>,
    store: Arc<dyn ContentStore>,
    origin: String,
}

impl PageLoader {
    pub fn new(api: Arc<dyn ContentApi>, store: Arc<dyn ContentStore>, origin: &str) -> Self {
        PageLoader {
            api,
            store,
            origin: origin.trim_end_matches('/').to_string(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    pub fn api(&self) -> &Arc<dyn ContentApi> {
        &self.api
    }

    /// One attempt, no retries. Blocks on the network.
    pub fn load(&self) -> Resolution {
        match self.api.fetch_page_data() {
            Ok(fetched) => {
                let doc = self.reconcile(fetched);
                self.ready(LoadState::Live, doc, None)
            }
            Err(e) => {
                log::warn!("[content] fetch failed, using local copy: {}", e);
                match self.local_fallback() {
                    Some(doc) => self.ready(LoadState::Cached, doc, Some(LOAD_FAILED_NOTICE)),
                    None => Resolution {
                        state: LoadState::Empty,
                        document: PageData::default(),
                        portfolio: Vec::new(),
                        notice: Some(LOAD_FAILED_NOTICE.to_string()),
                    },
                }
            }
        }
    }

    /// Backfill an empty fetched portfolio from local storage, then persist
    /// the result to both local keys.
    fn reconcile(&self, mut doc: PageData) -> PageData {
        if !doc.has_portfolio() {
            if let Some(local) = self.store.read().filter(|d| d.has_portfolio()) {
                log::info!(
                    "[content] API portfolio empty, restoring {} item(s) from local copy",
                    local.portfolio.len()
                );
                doc.portfolio = local.portfolio;
            }
        }
        if !doc.has_portfolio() {
            if let Some(backup) = self
                .store
                .read_backup_collection(PORTFOLIO)
                .filter(|items| !items.is_empty())
            {
                log::info!(
                    "[content] restoring {} portfolio item(s) from backup",
                    backup.len()
                );
                doc.portfolio = backup;
            }
        }

        if let Err(e) = self.store.write(&doc) {
            log::error!("[content] failed to persist page data: {}", e);
        }
        if let Err(e) = self.store.write_backup_collection(PORTFOLIO, &doc.portfolio) {
            log::error!("[content] failed to persist portfolio backup: {}", e);
        }
        doc
    }

    /// Stored document, with its portfolio taken from the backup key when
    /// the stored one is empty. `None` when neither has anything.
    fn local_fallback(&self) -> Option<PageData> {
        let stored = self.store.read();
        let backup = || {
            self.store
                .read_backup_collection(PORTFOLIO)
                .filter(|items| !items.is_empty())
        };

        let resolved = match stored {
            Some(mut doc) => {
                if !doc.has_portfolio() {
                    if let Some(items) = backup() {
                        doc.portfolio = items;
                    }
                }
                Some(doc)
            }
            None => backup().map(|items| PageData {
                portfolio: items,
                ..PageData::default()
            }),
        };
        // A stored `{}` is as good as nothing
        resolved.filter(|doc| *doc != PageData::default())
    }

    fn ready(&self, state: LoadState, doc: PageData, notice: Option<&str>) -> Resolution {
        let portfolio = doc
            .portfolio
            .iter()
            .map(|item| item.normalized(&self.origin))
            .collect();
        Resolution {
            state,
            document: doc,
            portfolio,
            notice: notice.map(|n| n.to_string()),
        }
    }

    /// The document an edit starts from: the API's copy, else the local
    /// one, else an empty document.
    pub fn editable_document(&self) -> (PageData, DocumentSource) {
        match self.api.fetch_page_data() {
            Ok(doc) => (doc, DocumentSource::Remote),
            Err(e) => {
                log::warn!("[admin] fetch for editing failed: {}", e);
                match self.store.read() {
                    Some(doc) => (doc, DocumentSource::Local),
                    None => (PageData::default(), DocumentSource::Blank),
                }
            }
        }
    }

    /// Apply one section edit: write through to local storage first, then
    /// publish the whole document with the operator's token. The portfolio
    /// backup key is left alone.
    pub fn apply_edit<F>(&self, token: &str, edit: F) -> EditOutcome
    where
        F: FnOnce(&mut PageData),
    {
        let (mut doc, _) = self.editable_document();
        edit(&mut doc);

        if let Err(e) = self.store.write(&doc) {
            log::error!("[admin] local save failed: {}", e);
            return EditOutcome::NotSaved(e);
        }

        match self.api.save_page_data(&doc, token) {
            Ok(()) => {
                log::info!("[admin] page data published");
                EditOutcome::Published
            }
            Err(e) => {
                log::warn!("[admin] publish failed, kept local copy: {}", e);
                EditOutcome::SavedLocally(e)
            }
        }
    }

    /// Drop the portfolio backup so an intentionally emptied portfolio
    /// stays empty on the next load.
    pub fn clear_portfolio_backup(&self) -> Result<(), String> {
        self.store.clear_backup_collection(PORTFOLIO)
    }
}

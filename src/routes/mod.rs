pub mod admin;
pub mod api;
pub mod public;

use crate::content::{LoadState, PageLoader, Resolution, LOAD_FAILED_NOTICE};
use crate::models::PageData;

/// Run the blocking page load off the async workers.
pub async fn resolve_page(loader: &PageLoader) -> Resolution {
    let loader = loader.clone();
    match rocket::tokio::task::spawn_blocking(move || loader.load()).await {
        Ok(res) => res,
        Err(e) => {
            log::error!("[content] page load task failed: {}", e);
            Resolution {
                state: LoadState::Empty,
                document: PageData::default(),
                portfolio: Vec::new(),
                notice: Some(LOAD_FAILED_NOTICE.to_string()),
            }
        }
    }
}

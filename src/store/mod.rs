use crate::models::{PageData, PortfolioItem};

pub mod memory;
pub mod sqlite;

/// Key holding the full last-known-good document.
pub const PAGE_DATA_KEY: &str = "pageData";

/// Collection name of the portfolio list, and the suffix of its backup key.
pub const PORTFOLIO: &str = "portfolio";

/// Key under which a collection is backed up on its own.
pub fn backup_key(collection: &str) -> String {
    format!("{}Backup", collection)
}

/// Local persisted copy of the page data. Every read and write of cached
/// content goes through here so the merge rules live in one place.
/// Implementations: `SqliteStore` (rusqlite/r2d2) and `MemoryStore`.
pub trait ContentStore: Send + Sync {
    // ── Raw key-value ───────────────────────────────────────────────
    fn get_raw(&self, key: &str) -> Option<String>;
    fn set_raw(&self, key: &str, value: &str) -> Result<(), String>;
    fn remove_raw(&self, key: &str) -> Result<(), String>;

    /// When a key was last written, if the backend tracks it.
    fn updated_at(&self, _key: &str) -> Option<String> {
        None
    }

    /// Connectivity check for health reporting.
    fn ping(&self) -> bool {
        true
    }

    // ── Document ────────────────────────────────────────────────────

    /// Last persisted document. Unparseable JSON reads as absent.
    fn read(&self) -> Option<PageData> {
        let raw = self.get_raw(PAGE_DATA_KEY)?;
        match PageData::from_json(&raw) {
            Ok(doc) => Some(doc),
            Err(e) => {
                log::warn!("[store] discarding unreadable {}: {}", PAGE_DATA_KEY, e);
                None
            }
        }
    }

    fn write(&self, doc: &PageData) -> Result<(), String> {
        let raw = doc.to_json()?;
        self.set_raw(PAGE_DATA_KEY, &raw)
    }

    // ── Per-collection backup ───────────────────────────────────────

    /// Backup copy of a single collection. Unparseable JSON or a value that
    /// is not an array reads as absent; junk entries inside the array are
    /// skipped.
    fn read_backup_collection(&self, name: &str) -> Option<Vec<PortfolioItem>> {
        let key = backup_key(name);
        let raw = self.get_raw(&key)?;
        match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(serde_json::Value::Array(entries)) => Some(
                entries
                    .into_iter()
                    .filter_map(|v| serde_json::from_value(v).ok())
                    .collect(),
            ),
            Ok(_) => {
                log::warn!("[store] {} is not a list, ignoring", key);
                None
            }
            Err(e) => {
                log::warn!("[store] discarding unreadable {}: {}", key, e);
                None
            }
        }
    }

    fn write_backup_collection(&self, name: &str, items: &[PortfolioItem]) -> Result<(), String> {
        let raw = serde_json::to_string(items).map_err(|e| e.to_string())?;
        self.set_raw(&backup_key(name), &raw)
    }

    fn clear_backup_collection(&self, name: &str) -> Result<(), String> {
        self.remove_raw(&backup_key(name))
    }
}

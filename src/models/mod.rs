use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub mod page;
pub mod portfolio;

pub use page::PageData;
pub use portfolio::PortfolioItem;

/// Explicit `null` reads the same as a missing key. Old editor versions
/// wrote `null` for cleared text fields.
pub(crate) fn null_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

/// `active` flags default to shown, including when stored as `null`.
pub(crate) fn null_true<'de, D>(de: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(de)?.unwrap_or(true))
}

pub(crate) fn default_true() -> bool {
    true
}

/// A list of strings where non-string entries are skipped.
pub(crate) fn string_list<'de, D>(de: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(de)? {
        Value::Array(entries) => entries
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

use serde::Deserialize;

/// Origin of the content API when running against a local backend.
pub const DEVELOPMENT_ORIGIN: &str = "http://localhost:5001";

fn default_site_host() -> String {
    "localhost".to_string()
}

fn default_production_origin() -> String {
    "https://api.example.com".to_string()
}

fn default_database_path() -> String {
    "data/showcase.db".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Site settings read from Rocket's figment (`Rocket.toml`, `ROCKET_*` env).
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Public host this site is served from; picks the API environment.
    #[serde(default = "default_site_host")]
    pub site_host: String,
    /// Explicit API origin, bypassing host-based selection.
    #[serde(default)]
    pub api_origin: Option<String>,
    #[serde(default = "default_production_origin")]
    pub production_origin: String,
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            site_host: default_site_host(),
            api_origin: None,
            production_origin: default_production_origin(),
            database_path: default_database_path(),
            request_timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiEnvironment {
    Development,
    Production,
}

impl ApiEnvironment {
    /// Local hosts talk to the local backend, everything else to production.
    pub fn from_host(host: &str) -> Self {
        let host = host.trim().to_lowercase();
        let bare = host.split(':').next().unwrap_or("");
        if bare.is_empty() || bare == "localhost" || bare == "127.0.0.1" {
            ApiEnvironment::Development
        } else {
            ApiEnvironment::Production
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ApiEnvironment::Development => "development",
            ApiEnvironment::Production => "production",
        }
    }
}

impl SiteConfig {
    pub fn environment(&self) -> ApiEnvironment {
        ApiEnvironment::from_host(&self.site_host)
    }

    /// The active origin: explicit override, else the environment's fixed one.
    pub fn active_origin(&self) -> String {
        if let Some(origin) = self.api_origin.as_deref().map(str::trim).filter(|o| !o.is_empty()) {
            return origin.trim_end_matches('/').to_string();
        }
        match self.environment() {
            ApiEnvironment::Development => DEVELOPMENT_ORIGIN.to_string(),
            ApiEnvironment::Production => self.production_origin.trim_end_matches('/').to_string(),
        }
    }
}

use log::{error, info, warn};
use std::fs;
use std::path::Path;

use crate::config::SiteConfig;

/// Run the boot checks before Rocket launches. Creates the data directory
/// and reports whether it is writable; when it is not, the caller keeps
/// content in memory only.
pub fn run(config: &SiteConfig) -> bool {
    info!("Showcase boot check starting...");

    let mut warnings = 0u32;
    let mut errors = 0u32;

    // ── 1. Data directory ──────────────────────────────
    let data_dir = Path::new(&config.database_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    if !data_dir.exists() {
        match fs::create_dir_all(data_dir) {
            Ok(_) => info!("  Created directory: {}", data_dir.display()),
            Err(e) => {
                error!("  FAILED to create directory {}: {}", data_dir.display(), e);
                errors += 1;
            }
        }
    }

    // ── 2. Data directory writable ─────────────────────
    if data_dir.exists() {
        let test_file = data_dir.join(".write_test");
        match fs::write(&test_file, "test") {
            Ok(_) => {
                let _ = fs::remove_file(&test_file);
            }
            Err(e) => {
                error!("  Data directory not writable: {}", e);
                errors += 1;
            }
        }
    }

    // ── 3. Rocket.toml exists ──────────────────────────
    if !Path::new("Rocket.toml").exists() {
        warn!("  Rocket.toml not found, using default config");
        warnings += 1;
    }

    // ── 4. API environment ─────────────────────────────
    info!(
        "  API environment: {} ({})",
        config.environment().label(),
        config.active_origin()
    );

    // ── Summary ────────────────────────────────────────
    if errors > 0 {
        error!(
            "Boot check found {} error(s), {} warning(s). Local content will not survive a restart.",
            errors, warnings
        );
        return false;
    }

    if warnings > 0 {
        warn!("Boot check passed with {} warning(s).", warnings);
    } else {
        info!("Boot check passed. All systems go.");
    }
    true
}

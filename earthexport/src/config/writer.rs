//! INI serialization logic for converting `ConfigFile` → INI string.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let project = config.earthengine.project.as_deref().unwrap_or("");
    let access_token = config.earthengine.access_token.as_deref().unwrap_or("");

    format!(
        r#"[earthengine]
; Cloud project registered for Earth Engine
project = {}
; OAuth2 access token (e.g. from `gcloud auth print-access-token`)
; Leave empty to use the EARTHENGINE_TOKEN environment variable or --access-token
access_token = {}
; API root; the high-volume endpoint suits batch exports
base_url = {}

[export]
; Target projection of the GeoTIFFs
crs = {}
; Output size in pixels
height = {}
width = {}

[retry]
; Total attempts per remote call (first attempt included)
max_attempts = {}
; Delay before the first retry in seconds, multiplied after each retry
base_delay_secs = {}
multiplier = {}

[driver]
; Pause between coordinates in seconds (remote rate limit)
rate_limit_secs = {}
; File the run summary is appended to
results_file = {}

[logging]
; Directory for <dataset>_logger.log
directory = {}
"#,
        project,
        access_token,
        config.earthengine.base_url,
        config.export.crs,
        config.export.height,
        config.export.width,
        config.retry.max_attempts,
        config.retry.base_delay_secs,
        config.retry.multiplier,
        config.driver.rate_limit_secs,
        path_to_string(&config.driver.results_file),
        path_to_string(&config.logging.directory),
    )
}

/// Render a path, shortening the home directory to `~`.
fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_section_written() {
        let content = to_config_string(&ConfigFile::default());
        for section in ["[earthengine]", "[export]", "[retry]", "[driver]", "[logging]"] {
            assert!(content.contains(section), "missing {}", section);
        }
        assert!(content.contains("crs = EPSG:3857"));
        assert!(content.contains("max_attempts = 10"));
    }

    #[test]
    fn test_home_paths_use_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(path_to_string(&home.join("out")), "~/out");
        }
    }
}

//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.

use ini::{Ini, Properties};
use std::path::PathBuf;
use std::str::FromStr;

use super::defaults::{MAX_RETRY_ATTEMPTS, MAX_RETRY_MULTIPLIER};
use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [earthengine] section
    if let Some(section) = ini.section(Some("earthengine")) {
        if let Some(v) = non_empty(section, "project") {
            config.earthengine.project = Some(v.to_string());
        }
        if let Some(v) = non_empty(section, "access_token") {
            config.earthengine.access_token = Some(v.to_string());
        }
        if let Some(v) = non_empty(section, "base_url") {
            if !v.starts_with("http://") && !v.starts_with("https://") {
                return Err(invalid("earthengine", "base_url", v, "must be an http(s) URL"));
            }
            config.earthengine.base_url = v.trim_end_matches('/').to_string();
        }
    }

    // [export] section
    if let Some(section) = ini.section(Some("export")) {
        if let Some(v) = non_empty(section, "crs") {
            config.export.crs = v.to_string();
        }
        if let Some(v) = section.get("height") {
            config.export.height = parse_positive(v, "export", "height")?;
        }
        if let Some(v) = section.get("width") {
            config.export.width = parse_positive(v, "export", "width")?;
        }
    }

    // [retry] section
    if let Some(section) = ini.section(Some("retry")) {
        if let Some(v) = section.get("max_attempts") {
            let attempts = parse_positive(v, "retry", "max_attempts")?;
            if attempts > MAX_RETRY_ATTEMPTS {
                return Err(invalid(
                    "retry",
                    "max_attempts",
                    v,
                    &format!("must be at most {}", MAX_RETRY_ATTEMPTS),
                ));
            }
            config.retry.max_attempts = attempts;
        }
        if let Some(v) = section.get("base_delay_secs") {
            config.retry.base_delay_secs = parse_value(
                v,
                "retry",
                "base_delay_secs",
                "must be a non-negative integer (seconds)",
            )?;
        }
        if let Some(v) = section.get("multiplier") {
            let reason = format!("must be a number between 1.0 and {}", MAX_RETRY_MULTIPLIER);
            let multiplier: f64 = parse_value(v, "retry", "multiplier", &reason)?;
            if !(1.0..=MAX_RETRY_MULTIPLIER).contains(&multiplier) {
                return Err(invalid("retry", "multiplier", v, &reason));
            }
            config.retry.multiplier = multiplier;
        }
    }

    // [driver] section
    if let Some(section) = ini.section(Some("driver")) {
        if let Some(v) = section.get("rate_limit_secs") {
            config.driver.rate_limit_secs = parse_value(
                v,
                "driver",
                "rate_limit_secs",
                "must be a non-negative integer (seconds)",
            )?;
        }
        if let Some(v) = non_empty(section, "results_file") {
            config.driver.results_file = expand_tilde(v);
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = non_empty(section, "directory") {
            config.logging.directory = expand_tilde(v);
        }
    }

    Ok(config)
}

fn non_empty<'a>(section: &'a Properties, key: &str) -> Option<&'a str> {
    section.get(key).map(str::trim).filter(|v| !v.is_empty())
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_value<T: FromStr>(
    value: &str,
    section: &str,
    key: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, reason))
}

fn parse_positive(value: &str, section: &str, key: &str) -> Result<u32, ConfigFileError> {
    let reason = "must be a positive integer";
    match parse_value::<u32>(value, section, key, reason)? {
        0 => Err(invalid(section, key, value, reason)),
        n => Ok(n),
    }
}

/// Expand a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::*;
    use tempfile::TempDir;

    fn load(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");
        std::fs::write(&config_path, content).unwrap();
        ConfigFile::load_from(&config_path)
    }

    #[test]
    fn test_full_config() {
        let config = load(
            r#"
[earthengine]
project = durham-solar
access_token = ya29.token
base_url = https://earthengine.googleapis.com/

[export]
crs = EPSG:4326
height = 256
width = 128

[retry]
max_attempts = 3
base_delay_secs = 5
multiplier = 3

[driver]
rate_limit_secs = 0
results_file = /tmp/results.txt

[logging]
directory = /var/log/earthexport
"#,
        )
        .unwrap();

        assert_eq!(config.earthengine.project.as_deref(), Some("durham-solar"));
        assert_eq!(config.earthengine.access_token.as_deref(), Some("ya29.token"));
        assert_eq!(config.earthengine.base_url, "https://earthengine.googleapis.com");
        assert_eq!(config.export.crs, "EPSG:4326");
        assert_eq!(config.export.height, 256);
        assert_eq!(config.export.width, 128);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.base_delay_secs, 5);
        assert_eq!(config.retry.multiplier, 3.0);
        assert_eq!(config.driver.rate_limit_secs, 0);
        assert_eq!(config.driver.results_file, PathBuf::from("/tmp/results.txt"));
        assert_eq!(config.logging.directory, PathBuf::from("/var/log/earthexport"));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = load(
            r#"
[export]
width = 1024
"#,
        )
        .unwrap();

        assert_eq!(config.export.width, 1024);
        assert_eq!(config.export.height, DEFAULT_IMAGE_SIZE);
        assert_eq!(config.retry.max_attempts, DEFAULT_RETRY_ATTEMPTS);
        assert!(config.earthengine.project.is_none());
    }

    #[test]
    fn test_empty_token_is_none() {
        let config = load(
            r#"
[earthengine]
access_token =
"#,
        )
        .unwrap();
        assert!(config.earthengine.access_token.is_none());
    }

    #[test]
    fn test_zero_height_rejected() {
        let err = load(
            r#"
[export]
height = 0
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("export.height"));
        assert!(err.to_string().contains("positive integer"));
    }

    #[test]
    fn test_non_numeric_attempts_rejected() {
        let err = load(
            r#"
[retry]
max_attempts = many
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigFileError::InvalidValue { ref key, .. } if key == "max_attempts"));
    }

    #[test]
    fn test_shrinking_multiplier_rejected() {
        let err = load(
            r#"
[retry]
multiplier = 0.5
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("between 1.0 and"));
    }

    #[test]
    fn test_runaway_multiplier_rejected() {
        let err = load(
            r#"
[retry]
base_delay_secs = 0
multiplier = 1e300
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigFileError::InvalidValue { ref key, .. } if key == "multiplier"));
    }

    #[test]
    fn test_too_many_attempts_rejected() {
        let err = load(
            r#"
[retry]
max_attempts = 1000000
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigFileError::InvalidValue { ref key, .. } if key == "max_attempts"));
    }

    #[test]
    fn test_largest_accepted_retry_settings_yield_capped_delays() {
        let config = load(
            r#"
[retry]
max_attempts = 100
base_delay_secs = 0
multiplier = 10
"#,
        )
        .unwrap();
        let policy = config.retry.policy();
        assert_eq!(policy.max_attempts(), MAX_RETRY_ATTEMPTS);
        assert_eq!(policy.total_backoff(), std::time::Duration::ZERO);
    }

    #[test]
    fn test_bad_base_url_rejected() {
        let err = load(
            r#"
[earthengine]
base_url = earthengine.googleapis.com
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("http(s) URL"));
    }

    #[test]
    fn test_expand_tilde() {
        let expanded = expand_tilde("~/exports");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expanded, home.join("exports"));
        }
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
    }
}

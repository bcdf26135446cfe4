//! Settings loading from configuration files.
//!
//! This module provides functions to load [`PortalSettings`] from TOML files,
//! JSON files, and to apply environment variable overrides.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (overriding defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `PORTAL_DEBUG` | `debug` |
//! | `PORTAL_LOG_LEVEL` | `log_level` |
//! | `PORTAL_LANGUAGE_CODE` | `language_code` |
//! | `PORTAL_MAX_EXTENSION_DAYS` | `max_extension_days` |
//! | `PORTAL_REASON_MAX_LENGTH` | `reason_max_length` |
//! | `PORTAL_SUBMIT_DELAY_MS` | `submit_delay_ms` |
//! | `PORTAL_REFRESH_DELAY_SECS` | `refresh_delay_secs` |
//! | `PORTAL_DUE_SOON_DAYS` | `due_soon_days` |
//! | `PORTAL_DUE_THIS_WEEK_DAYS` | `due_this_week_days` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use portal_core::settings_loader;
//!
//! let settings = settings_loader::load("config/portal.toml").unwrap();
//! ```

use std::path::Path;
use std::str::FromStr;

use crate::error::PortalError;
use crate::settings::PortalSettings;

/// Loads settings from a TOML string.
///
/// Any settings not present in the TOML keep their default values.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or cannot be deserialized.
pub fn from_toml_str(toml_str: &str) -> Result<PortalSettings, PortalError> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| PortalError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;

    merge_over_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<PortalSettings, PortalError> {
    let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
        PortalError::ConfigurationError(format!(
            "Failed to read TOML file '{}': {e}",
            path.as_ref().display()
        ))
    })?;
    from_toml_str(&content)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<PortalSettings, PortalError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or cannot be deserialized.
pub fn from_json_str(json_str: &str) -> Result<PortalSettings, PortalError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| PortalError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;

    merge_over_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the JSON is malformed.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<PortalSettings, PortalError> {
    let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
        PortalError::ConfigurationError(format!(
            "Failed to read JSON file '{}': {e}",
            path.as_ref().display()
        ))
    })?;
    from_json_str(&content)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> PortalSettings {
    let mut settings = PortalSettings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies environment variable overrides to a settings struct.
///
/// Numeric variables that fail to parse are ignored.
pub fn apply_env_overrides(settings: &mut PortalSettings) {
    if let Ok(val) = std::env::var("PORTAL_DEBUG") {
        settings.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
    }

    if let Ok(val) = std::env::var("PORTAL_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Ok(val) = std::env::var("PORTAL_LANGUAGE_CODE") {
        settings.language_code = val;
    }

    override_parsed("PORTAL_MAX_EXTENSION_DAYS", &mut settings.max_extension_days);
    override_parsed("PORTAL_REASON_MAX_LENGTH", &mut settings.reason_max_length);
    override_parsed("PORTAL_SUBMIT_DELAY_MS", &mut settings.submit_delay_ms);
    override_parsed("PORTAL_REFRESH_DELAY_SECS", &mut settings.refresh_delay_secs);
    override_parsed("PORTAL_DUE_SOON_DAYS", &mut settings.due_soon_days);
    override_parsed("PORTAL_DUE_THIS_WEEK_DAYS", &mut settings.due_this_week_days);
}

/// Loads a settings file, picking the format from its extension, then
/// applies environment overrides.
///
/// `.json` files are read as JSON; anything else is read as TOML.
pub fn load(path: impl AsRef<Path>) -> Result<PortalSettings, PortalError> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let mut settings = if is_json {
        from_json_file(path)?
    } else {
        from_toml_file(path)?
    };
    apply_env_overrides(&mut settings);
    tracing::debug!(path = %path.display(), "portal settings loaded");
    Ok(settings)
}

// ============================================================
// Helpers
// ============================================================

fn override_parsed<T: FromStr>(var: &str, target: &mut T) {
    if let Some(parsed) = std::env::var(var).ok().and_then(|v| v.trim().parse().ok()) {
        *target = parsed;
    }
}

/// Deep-merges `value` over the serialized defaults and deserializes the result.
fn merge_over_defaults(
    value: serde_json::Value,
    source: &str,
) -> Result<PortalSettings, PortalError> {
    let default_json = serde_json::to_value(PortalSettings::default()).map_err(|e| {
        PortalError::SerializationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, value);
    serde_json::from_value(merged).map_err(|e| {
        PortalError::ConfigurationError(format!("Failed to deserialize settings from {source}: {e}"))
    })
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}

//! Plugin settings: loading, validation, and saving.
//!
//! Settings are a flat record owned by the host's configuration store. Here
//! that store is a `settings.toml` file in a settings directory:
//!
//! ```toml
//! # All keys are optional - defaults shown below
//!
//! admin_ids = ""              # Facebook user IDs, comma separated (or an array)
//! app_id = ""                 # Facebook application ID
//! fallback_image_url = ""     # Site-wide default og:image
//! force_fallback = false      # Emit only the fallback image, never page images
//! ```
//!
//! ## Loading
//!
//! The stock defaults are serialized to a `toml::Value`, the user file is
//! merged on top with [`merge_toml`], and the result is deserialized with
//! unknown keys rejected. Three entry points share that path:
//!
//! - [`load_settings`]: the render path. Non-numeric IDs in a hand-edited
//!   file are treated as absent, so a bad file never stops a page render.
//! - [`check_settings`]: strict. A non-numeric ID is a [`ConfigError::Invalid`].
//! - [`load_stored_settings`]: the record exactly as stored, used as the base
//!   of a save so a bad value can be corrected.
//!
//! ## Saving
//!
//! Saves go through [`Settings::apply_submission`], which mirrors a settings
//! form: each submitted field is validated independently, a rejected field
//! keeps its previously stored value, and every rejection is reported as a
//! [`SettingsIssue`] for the user to fix. [`submit_settings`] runs the whole
//! load, apply and write cycle.
//!
//! ## Required identifiers
//!
//! Tags are only emitted when at least one admin ID or the app ID is set.
//! Until then [`Settings::setup_notice`] yields a persistent notice for the
//! admin, and the emitter writes a single diagnostic comment.

use crate::html;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

/// File name of the settings store inside the settings directory.
pub const SETTINGS_FILE: &str = "settings.toml";

/// Shown to admins until an admin ID or app ID is configured.
pub const SETUP_NOTICE: &str = "Open Graph tags are almost ready: enter your Facebook User ID or App ID for them to work.";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML write error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Settings validation error: {0}")]
    Invalid(#[from] SettingsIssue),
}

/// A user-visible validation message produced when settings are saved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsIssue {
    #[error("invalid admin ID(s) {0:?}: enter numeric Facebook user IDs separated by commas")]
    InvalidAdminIds(String),
    #[error("invalid application ID {0:?}: enter the numeric Facebook App ID")]
    InvalidAppId(String),
}

static NUMERIC_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").unwrap());
static ID_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*,\s*").unwrap());

/// Configured plugin options.
///
/// Empty strings mean "not set". Use the accessor methods to get `Option`s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Facebook user IDs, one `fb:admins` tag each.
    #[serde(deserialize_with = "deserialize_admin_ids")]
    pub admin_ids: Vec<String>,
    /// Numeric Facebook application ID.
    pub app_id: String,
    /// Site-wide default preview image.
    pub fallback_image_url: String,
    /// When true the fallback image is the only image ever emitted.
    pub force_fallback: bool,
}

/// Admin IDs may be written as a raw comma-separated string or as an array.
#[derive(Deserialize)]
#[serde(untagged)]
enum AdminIdsInput {
    Raw(String),
    List(Vec<String>),
}

fn deserialize_admin_ids<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match AdminIdsInput::deserialize(deserializer)? {
        AdminIdsInput::Raw(raw) => normalize_admin_ids(&raw),
        AdminIdsInput::List(list) => list
            .iter()
            .flat_map(|entry| normalize_admin_ids(entry))
            .collect(),
    })
}

/// Split a raw comma-separated ID list, trimming whitespace around separators.
///
/// Empty pieces (`"1,,2"`, trailing commas) are dropped.
pub fn normalize_admin_ids(raw: &str) -> Vec<String> {
    ID_SEPARATOR
        .replace_all(raw.trim(), ",")
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect()
}

impl Settings {
    /// The app ID, if one is set.
    pub fn app_id(&self) -> Option<&str> {
        Some(self.app_id.trim()).filter(|id| !id.is_empty())
    }

    /// The fallback image URL, if one is set.
    pub fn fallback_image(&self) -> Option<&str> {
        Some(self.fallback_image_url.trim()).filter(|url| !url.is_empty())
    }

    /// True when at least one admin ID or the app ID is configured.
    pub fn has_identifier(&self) -> bool {
        !self.admin_ids.is_empty() || self.app_id().is_some()
    }

    /// The persistent admin notice, while no identifier is configured.
    pub fn setup_notice(&self) -> Option<&'static str> {
        (!self.has_identifier()).then_some(SETUP_NOTICE)
    }

    /// Check every ID against `^[0-9]+$`. Reports the first problem found.
    pub fn validate(&self) -> Result<(), SettingsIssue> {
        if let Some(bad) = self.admin_ids.iter().find(|id| !NUMERIC_ID.is_match(id)) {
            return Err(SettingsIssue::InvalidAdminIds(bad.clone()));
        }
        match self.app_id() {
            Some(app_id) if !NUMERIC_ID.is_match(app_id) => {
                Err(SettingsIssue::InvalidAppId(app_id.to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Drop non-numeric admin IDs and clear a non-numeric app ID.
    pub fn without_invalid_ids(mut self) -> Self {
        self.admin_ids.retain(|id| NUMERIC_ID.is_match(id));
        if self.app_id().is_some_and(|id| !NUMERIC_ID.is_match(id)) {
            self.app_id.clear();
        }
        self
    }

    /// Apply a settings form submission on top of the stored settings.
    ///
    /// Fields left as `None` keep their stored value. Invalid admin IDs or an
    /// invalid app ID are rejected individually: the stored value is kept and
    /// the issue is returned in the outcome. The fallback image URL has any
    /// markup stripped before it is stored.
    pub fn apply_submission(&self, submission: &Submission) -> SaveOutcome {
        let mut settings = self.clone();
        let mut issues = Vec::new();

        if let Some(raw) = &submission.admin_ids {
            let ids = normalize_admin_ids(raw);
            if ids.iter().all(|id| NUMERIC_ID.is_match(id)) {
                settings.admin_ids = ids;
            } else {
                issues.push(SettingsIssue::InvalidAdminIds(raw.trim().to_string()));
            }
        }

        if let Some(raw) = &submission.app_id {
            let app_id = raw.trim();
            if app_id.is_empty() || NUMERIC_ID.is_match(app_id) {
                settings.app_id = app_id.to_string();
            } else {
                issues.push(SettingsIssue::InvalidAppId(app_id.to_string()));
            }
        }

        if let Some(raw) = &submission.fallback_image_url {
            settings.fallback_image_url = html::strip_tags(raw).trim().to_string();
        }

        if let Some(force) = submission.force_fallback {
            settings.force_fallback = force;
        }

        SaveOutcome { settings, issues }
    }
}

/// Raw values from a settings form. `None` means the field was not submitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Submission {
    pub admin_ids: Option<String>,
    pub app_id: Option<String>,
    pub fallback_image_url: Option<String>,
    pub force_fallback: Option<bool>,
}

/// Result of applying a [`Submission`]: the settings to store, plus any
/// validation messages to show the user.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    pub settings: Settings,
    pub issues: Vec<SettingsIssue>,
}

impl SaveOutcome {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

// =============================================================================
// Settings loading, merging, and saving
// =============================================================================

/// Returns the stock default settings as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(Settings::default()).expect("default settings must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `settings.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_settings(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let path = dir.join(SETTINGS_FILE);
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load `settings.toml` in `dir` over stock defaults, without validating IDs.
///
/// A missing file yields the defaults (no identifiers configured).
pub fn load_stored_settings(dir: &Path) -> Result<Settings, ConfigError> {
    let merged = match load_raw_settings(dir)? {
        Some(overlay) => merge_toml(stock_defaults_value(), overlay),
        None => stock_defaults_value(),
    };
    Ok(merged.try_into()?)
}

/// Load settings for rendering. Invalid IDs are treated as not set.
///
/// Only I/O and TOML errors are returned.
pub fn load_settings(dir: &Path) -> Result<Settings, ConfigError> {
    Ok(load_stored_settings(dir)?.without_invalid_ids())
}

/// Load settings and fail on the first invalid ID.
pub fn check_settings(dir: &Path) -> Result<Settings, ConfigError> {
    let settings = load_stored_settings(dir)?;
    settings.validate()?;
    Ok(settings)
}

/// Apply a submission to the stored settings in `dir` and write the result.
pub fn submit_settings(dir: &Path, submission: &Submission) -> Result<SaveOutcome, ConfigError> {
    let outcome = load_stored_settings(dir)?.apply_submission(submission);
    save_settings(dir, &outcome.settings)?;
    Ok(outcome)
}

/// Write settings to `settings.toml` in `dir`, creating the directory.
pub fn save_settings(dir: &Path, settings: &Settings) -> Result<(), ConfigError> {
    fs::create_dir_all(dir)?;
    let content = toml::to_string_pretty(settings)?;
    fs::write(dir.join(SETTINGS_FILE), content)?;
    Ok(())
}

/// Returns a fully-commented stock `settings.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_settings_toml() -> &'static str {
    r##"# ogp-head settings
# =================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.
#
# No Open Graph tags are emitted until admin_ids or app_id is set.

# Facebook user ID(s) allowed to see Insights for this site.
# Separate multiple IDs with commas, or use an array: ["123", "456"].
# Find your ID at http://graph.facebook.com/yourusername
admin_ids = ""

# Facebook application ID. Use this for business or brand sites so Insights
# are not tied to a person. Works with or without admin_ids.
app_id = ""

# Full URL (including http://) of the default image used when a page has no
# featured image or content images. 200x200 pixels or larger is recommended.
fallback_image_url = ""

# Use the default image for every page instead of looking for featured or
# content images.
force_fallback = false
"##
}

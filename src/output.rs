//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Each resolved value leads with its tag and value; where the value came
//! from is shown as an indented `Source:` context line. This makes the
//! output read as an answer to "why does my link preview look like this?".
//!
//! # Output Format
//!
//! ## Explain
//!
//! ```text
//! URL: http://example.com/hello-world/
//! Title: Hello world
//!     Source: page <title>
//! Description: First post on the new site
//!     Source: excerpt
//! Type: article
//! Locale: en_us
//! Images
//! 001 http://example.com/default.png
//!     Source: fallback image
//! 002 http://example.com/uploads/cat.png
//!     Source: content image
//! Admins: 123, 456
//! Debug: https://developers.facebook.com/tools/debug?q=...
//! ```
//!
//! ## Save
//!
//! ```text
//! Saved settings.toml
//!     Admin IDs: 123, 456
//!     App ID: (not set)
//!     Fallback image: http://example.com/default.png
//!     Force fallback: no
//! Rejected: invalid application ID "abc": enter the numeric Facebook App ID
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::render;
use crate::resolve::ResolvedTags;
use crate::settings::{SaveOutcome, Settings};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

fn or_not_set(value: &str) -> &str {
    if value.is_empty() { "(not set)" } else { value }
}

// ============================================================================
// Explain
// ============================================================================

/// Format the resolved values of one render with their provenance.
pub fn format_resolution(tags: &ResolvedTags) -> Vec<String> {
    let mut lines = vec![
        format!("URL: {}", tags.url),
        format!("Title: {}", tags.title),
        format!("{}Source: {}", indent(1), tags.provenance.title.label()),
        format!("Description: {}", truncate_desc(&tags.description, 80)),
        format!(
            "{}Source: {}",
            indent(1),
            tags.provenance.description.label()
        ),
        format!("Site name: {}", tags.site_name),
        format!("Type: {}", tags.og_type),
        format!("Locale: {}", tags.locale),
        "Images".to_string(),
    ];

    if tags.images.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, url) in tags.images.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), url));
        if let Some(source) = tags.provenance.images.get(i) {
            lines.push(format!("{}Source: {}", indent(1), source.label()));
        }
    }

    lines.push(format!("Admins: {}", or_not_set(&tags.admin_ids.join(", "))));
    lines.push(format!(
        "App ID: {}",
        or_not_set(tags.app_id.as_deref().unwrap_or(""))
    ));
    lines.push(format!("Debug: {}", render::debug_url(&tags.url)));
    lines
}

/// Print the resolution report to stdout.
pub fn print_resolution(tags: &ResolvedTags) {
    for line in format_resolution(tags) {
        println!("{}", line);
    }
}

// ============================================================================
// Settings
// ============================================================================

/// Format the stored settings, one field per line.
pub fn format_settings(settings: &Settings) -> Vec<String> {
    vec![
        format!(
            "{}Admin IDs: {}",
            indent(1),
            or_not_set(&settings.admin_ids.join(", "))
        ),
        format!(
            "{}App ID: {}",
            indent(1),
            or_not_set(settings.app_id().unwrap_or(""))
        ),
        format!(
            "{}Fallback image: {}",
            indent(1),
            or_not_set(settings.fallback_image().unwrap_or(""))
        ),
        format!(
            "{}Force fallback: {}",
            indent(1),
            if settings.force_fallback { "yes" } else { "no" }
        ),
    ]
}

/// Format the result of a settings save.
pub fn format_save_report(outcome: &SaveOutcome, path: &Path) -> Vec<String> {
    let mut lines = vec![format!("Saved {}", path.display())];
    lines.extend(format_settings(&outcome.settings));
    for issue in &outcome.issues {
        lines.push(format!("Rejected: {}", issue));
    }
    if let Some(notice) = outcome.settings.setup_notice() {
        lines.push(format!("Notice: {}", notice));
    }
    lines
}

/// Print the save report to stdout.
pub fn print_save_report(outcome: &SaveOutcome, path: &Path) {
    for line in format_save_report(outcome, path) {
        println!("{}", line);
    }
}

/// Format the `check` report for loaded settings.
pub fn format_check(settings: &Settings) -> Vec<String> {
    let mut lines = vec!["Settings".to_string()];
    lines.extend(format_settings(settings));
    match settings.setup_notice() {
        Some(notice) => lines.push(format!("Notice: {}", notice)),
        None => lines.push("Settings are valid".to_string()),
    }
    lines
}

/// Print the check report to stdout.
pub fn print_check(settings: &Settings) {
    for line in format_check(settings) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::PageKind;
    use crate::resolve::resolve;
    use crate::settings::{SETUP_NOTICE, SettingsIssue, Submission};
    use crate::test_helpers::*;

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
    }

    #[test]
    fn truncate_desc_is_char_safe() {
        assert_eq!(truncate_desc("ééééé", 3), "ééé...");
        assert_eq!(truncate_desc("short", 10), "short");
    }

    #[test]
    fn resolution_shows_sources() {
        let mut ctx = singular_context("<p>Body</p>");
        ctx.featured_image_url = Some("http://example.com/f.png".into());
        let settings = settings_with_fallback("http://example.com/d.png", false);
        let lines = format_resolution(&resolve("", &ctx, &settings));

        assert!(lines.contains(&"Title: Hello world".to_string()));
        assert!(lines.contains(&"    Source: page title".to_string()));
        assert!(lines.contains(&"    Source: content".to_string()));
        assert!(lines.contains(&"001 http://example.com/d.png".to_string()));
        assert!(lines.contains(&"    Source: fallback image".to_string()));
        assert!(lines.contains(&"002 http://example.com/f.png".to_string()));
        assert!(lines.contains(&"    Source: featured image".to_string()));
        assert!(lines.iter().any(|l| l.starts_with("Debug: https://developers.facebook.com")));
    }

    #[test]
    fn resolution_without_images_says_none() {
        let lines = format_resolution(&resolve("", &context(PageKind::Archive), &admin_settings(&["1"])));
        let idx = lines.iter().position(|l| l == "Images").unwrap();
        assert_eq!(lines[idx + 1], "    (none)");
        assert!(lines.contains(&"App ID: (not set)".to_string()));
        assert!(lines.contains(&"Admins: 1".to_string()));
    }

    #[test]
    fn save_report_lists_rejections() {
        let outcome = Settings::default().apply_submission(&Submission {
            app_id: Some("abc".into()),
            ..Submission::default()
        });
        let lines = format_save_report(&outcome, Path::new("settings.toml"));

        assert_eq!(lines[0], "Saved settings.toml");
        assert!(lines.contains(&format!(
            "Rejected: {}",
            SettingsIssue::InvalidAppId("abc".into())
        )));
        assert!(lines.contains(&format!("Notice: {SETUP_NOTICE}")));
    }

    #[test]
    fn check_report_for_configured_settings() {
        let lines = format_check(&admin_settings(&["1", "2"]));
        assert!(lines.contains(&"    Admin IDs: 1, 2".to_string()));
        assert!(lines.contains(&"    Force fallback: no".to_string()));
        assert_eq!(lines.last().map(String::as_str), Some("Settings are valid"));
    }
}

//! Shared test utilities for the ogp-head test suite.
//!
//! Provides builders for page contexts and settings, plus lookup helpers for
//! emitted tag lines that panic with a clear message on miss.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let settings = admin_settings(&["123"]);
//! let lines = emit(&resolve("", &context(PageKind::Home), &settings), &settings);
//! assert_eq!(meta_content(&lines, "og:title"), "Acme Blog");
//! ```

use crate::context::{PageContext, PageKind, RequestInfo, SiteInfo};
use crate::settings::Settings;

// =========================================================================
// Builders
// =========================================================================

/// A context of the given kind on `http://example.com`, site "Acme Blog".
pub fn context(kind: PageKind) -> PageContext {
    PageContext {
        kind,
        title: "Hello world".to_string(),
        raw_content: String::new(),
        excerpt: None,
        featured_image_url: None,
        site: SiteInfo {
            name: "Acme Blog".to_string(),
            description: "Just another blog".to_string(),
            locale: "en_US".to_string(),
            base_url: "http://example.com".to_string(),
        },
        request: RequestInfo {
            secure: false,
            host: "example.com".to_string(),
            uri: "/hello-world/".to_string(),
        },
    }
}

/// A singular context with the given post body.
pub fn singular_context(raw_content: &str) -> PageContext {
    PageContext {
        raw_content: raw_content.to_string(),
        ..context(PageKind::Singular)
    }
}

/// Settings with the given admin IDs and nothing else.
pub fn admin_settings(ids: &[&str]) -> Settings {
    Settings {
        admin_ids: ids.iter().map(|id| id.to_string()).collect(),
        ..Settings::default()
    }
}

/// Settings with admin ID `1` and a fallback image.
pub fn settings_with_fallback(url: &str, force: bool) -> Settings {
    Settings {
        fallback_image_url: url.to_string(),
        force_fallback: force,
        ..admin_settings(&["1"])
    }
}

// =========================================================================
// Emitted line lookups
// =========================================================================

fn attr<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let marker = format!(" {name}=\"");
    let start = line.find(&marker)? + marker.len();
    let end = line[start..].find('"')?;
    Some(&line[start..start + end])
}

/// The `property` attribute of a meta line, if it is one.
pub fn property_of(line: &str) -> Option<&str> {
    line.starts_with("<meta ")
        .then(|| attr(line, "property"))
        .flatten()
}

/// Raw `content` of every line with the given property, in order.
pub fn meta_contents(lines: &[String], property: &str) -> Vec<String> {
    lines
        .iter()
        .filter(|line| property_of(line) == Some(property))
        .filter_map(|line| attr(line, "content"))
        .map(String::from)
        .collect()
}

/// Raw `content` of the single line with the given property. Panics if
/// there is not exactly one.
pub fn meta_content(lines: &[String], property: &str) -> String {
    let mut found = meta_contents(lines, property);
    if found.len() != 1 {
        panic!("expected one '{property}' tag, found {}. Lines: {lines:#?}", found.len());
    }
    found.remove(0)
}

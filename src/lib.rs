//! # ogp-head
//!
//! Open Graph and Facebook meta tags for rendered pages. Give it the markup
//! a page has produced so far, a description of the page, and the site's
//! settings; it gives back the `<meta property=... content=...>` block that
//! belongs in the page head.
//!
//! # Architecture: Capture, Then Emit
//!
//! Tag values are only decided after the rest of the page has been
//! rendered, so values other producers already wrote (a `<title>`, a
//! `<meta name="description">`) can be reused:
//!
//! ```text
//! 1. Capture   page body + PageContext    (host output, finished)
//! 2. Resolve   fallback chain per tag     → ResolvedTags + provenance
//! 3. Filter    registered hooks, in order → ResolvedTags
//! 4. Emit      escaped meta lines         → Vec<String>
//! 5. Inject    lines before </head>       → final page
//! ```
//!
//! Resolution is a pure function of its inputs, which keeps every fallback
//! rule unit-testable without touching the filesystem.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`settings`] | `settings.toml` loading, validation and saving; admin ID normalization |
//! | [`context`] | Per-render page description: kind, title, content, site, request |
//! | [`resolve`] | Fallback chains for every tag, with provenance |
//! | [`filters`] | Ordered transform hooks between resolution and emission |
//! | [`emit`] | Meta line rendering with Maud, notices, begin/end markers |
//! | [`render`] | The capture/emit pipeline, `<html>` prefix and head injection |
//! | [`html`] | Markup helpers: tag/shortcode stripping, entities, attribute and URL escaping |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Identifiers Gate Everything
//!
//! Facebook ignores Open Graph data that cannot be tied to an admin or an
//! app. Until at least one of `admin_ids` / `app_id` is configured, the
//! emitter writes a single HTML comment saying so and nothing else.
//!
//! ## Escape Once
//!
//! Scraped values (a page `<title>`) are already HTML. Attribute escaping
//! leaves existing entity references intact and Maud receives the result
//! pre-escaped, so `Tom &amp; Jerry` is never written as `Tom &amp;amp; Jerry`.
//!
//! ## Hooks Are Data
//!
//! Overrides are registered as boxed closures on a [`filters::Filters`]
//! value owned by the caller. There is no global registry; two renders with
//! different filter sets never interfere.

pub mod context;
pub mod emit;
pub mod filters;
pub mod html;
pub mod output;
pub mod render;
pub mod resolve;
pub mod settings;

#[cfg(test)]
pub(crate) mod test_helpers;

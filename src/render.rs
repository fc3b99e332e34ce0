//! The two-phase render pipeline.
//!
//! The host renders the page body first; this module receives that markup
//! as a finished string and derives the tag block from it:
//!
//! ```text
//! rendered markup ─┐
//! PageContext ─────┼─> resolve ─> Filters::apply ─> emit ─> inject into <head>
//! Settings ────────┘
//! ```
//!
//! Capture must be complete before [`render_tags`] runs: title and
//! description scraping only see what other output producers already wrote.

use crate::context::{self, ContextError, PageContext};
use crate::emit;
use crate::filters::Filters;
use crate::resolve::{self, ResolvedTags};
use crate::settings::Settings;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;
use std::borrow::Cow;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Page context error: {0}")]
    Context(#[from] ContextError),
}

/// Namespace attribute added to the `<html>` start tag.
pub const OG_PREFIX: &str = r#"prefix="og: http://ogp.me/ns#""#;

/// Facebook's sharing debugger; the page URL goes in the `q` parameter.
pub const DEBUGGER_URL: &str = "https://developers.facebook.com/tools/debug";

static HTML_START_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<html\b[^>]*>").unwrap());
static PREFIX_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\sprefix\s*=").unwrap());
static HEAD_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</head\s*>").unwrap());

const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// One captured page: its context and the markup rendered so far.
#[derive(Debug, Clone)]
pub struct CapturedPage {
    pub context: PageContext,
    pub markup: String,
}

impl CapturedPage {
    /// Load a page context (JSON) and its rendered markup from disk.
    pub fn load(context_path: &Path, markup_path: &Path) -> Result<Self, RenderError> {
        Ok(Self {
            context: context::load_context(context_path)?,
            markup: fs::read_to_string(markup_path)?,
        })
    }

    /// Resolve and filter, without emitting.
    pub fn resolve(&self, settings: &Settings, filters: &Filters) -> ResolvedTags {
        filters.apply(resolve::resolve(&self.markup, &self.context, settings))
    }

    pub fn render_tags(&self, settings: &Settings, filters: &Filters) -> Vec<String> {
        render_tags(&self.markup, &self.context, settings, filters)
    }

    pub fn render_page(&self, settings: &Settings, filters: &Filters) -> String {
        render_page(&self.markup, &self.context, settings, filters)
    }
}

/// Resolve, filter and emit the tag lines for one render.
pub fn render_tags(
    markup: &str,
    ctx: &PageContext,
    settings: &Settings,
    filters: &Filters,
) -> Vec<String> {
    let resolved = filters.apply(resolve::resolve(markup, ctx, settings));
    emit::emit(&resolved, settings)
}

/// Produce the final page: OGP prefix on `<html>`, tag lines in `<head>`.
pub fn render_page(
    markup: &str,
    ctx: &PageContext,
    settings: &Settings,
    filters: &Filters,
) -> String {
    let lines = render_tags(markup, ctx, settings, filters);
    inject_head(&add_og_prefix(markup), &lines)
}

/// Add the Open Graph namespace prefix to the first `<html>` start tag.
///
/// Markup without an `<html>` tag, or whose tag already has a `prefix`
/// attribute, is returned unchanged.
pub fn add_og_prefix(markup: &str) -> Cow<'_, str> {
    let Some(tag) = HTML_START_TAG.find(markup) else {
        return Cow::Borrowed(markup);
    };
    if PREFIX_ATTR.is_match(tag.as_str()) {
        return Cow::Borrowed(markup);
    }

    let close = if tag.as_str().ends_with("/>") {
        tag.end() - 2
    } else {
        tag.end() - 1
    };
    let mut out = String::with_capacity(markup.len() + OG_PREFIX.len() + 1);
    out.push_str(&markup[..close]);
    out.push(' ');
    out.push_str(OG_PREFIX);
    out.push_str(&markup[close..]);
    Cow::Owned(out)
}

/// Insert `lines` immediately before the first `</head>`.
///
/// Markup without a closing head tag is returned unchanged.
pub fn inject_head(markup: &str, lines: &[String]) -> String {
    let Some(head_end) = HEAD_END.find(markup) else {
        return markup.to_string();
    };

    let block: String = lines.iter().map(|line| format!("{line}\n")).collect();
    let mut out = String::with_capacity(markup.len() + block.len() + 1);
    out.push_str(&markup[..head_end.start()]);
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&block);
    out.push_str(&markup[head_end.start()..]);
    out
}

/// Sharing-debugger link for a page URL.
pub fn debug_url(page_url: &str) -> String {
    format!(
        "{DEBUGGER_URL}?q={}",
        utf8_percent_encode(page_url, QUERY_VALUE)
    )
}

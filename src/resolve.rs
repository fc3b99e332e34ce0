//! Tag value resolution.
//!
//! Every Open Graph value is derived from heterogeneous, possibly missing
//! sources by walking a fixed fallback chain. Each rule is total: it always
//! produces a value, never an error.
//!
//! ## Resolution priority
//!
//! - **Title**: `<title>` in rendered markup → site name (home/front page) →
//!   the page's own title
//! - **Description**: `<meta name="description">` in rendered markup →
//!   authored excerpt (singular) → first 160 characters of the content
//!   (singular) → site description
//! - **Type**: `blog` (home) → `article` (singular) → `website`
//! - **Images**: fallback image → featured image (singular) → every `<img>`
//!   in the content (singular), unless `force_fallback` stops after the first
//! - **URL**: site URL (home/front page) → request URL
//! - **Locale**: site locale, lower-cased
//!
//! Scraping the rendered markup first lets values written by SEO layers that
//! ran earlier in the render win over the plugin's own guesses.
//!
//! ## Raw values
//!
//! The resolver returns raw, unescaped strings. Escaping for the attribute or
//! URL context is the emitter's job.
//!
//! ## Provenance
//!
//! [`resolve`] also records which link of each chain produced the value, so
//! tooling can explain why a page previews the way it does.

use crate::context::{PageContext, PageKind};
use crate::html;
use crate::settings::Settings;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Length of a description cut from the post body, in characters.
pub const DESCRIPTION_LENGTH: usize = 160;

static TITLE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").unwrap());

static META_DESCRIPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<meta\s+name\s*=\s*["']description["']\s+content\s*=\s*(?:"([^"]*)"|'([^']*)')"#,
    )
    .unwrap()
});

/// Quoted attribute values are skipped whole, so a `>` inside one does not
/// end the tag.
static IMG_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img\b(?:[^>"']|"[^"]*"|'[^']*')*?\ssrc\s*=\s*["']([^"']+)["']"#)
        .unwrap()
});

/// Which link of the title chain produced the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleSource {
    Markup,
    SiteName,
    PageTitle,
}

/// Which link of the description chain produced the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionSource {
    Markup,
    Excerpt,
    Content,
    SiteDescription,
}

/// Where an image URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    Fallback,
    Featured,
    Content,
}

impl TitleSource {
    pub fn label(self) -> &'static str {
        match self {
            TitleSource::Markup => "page <title>",
            TitleSource::SiteName => "site name",
            TitleSource::PageTitle => "page title",
        }
    }
}

impl DescriptionSource {
    pub fn label(self) -> &'static str {
        match self {
            DescriptionSource::Markup => "meta description",
            DescriptionSource::Excerpt => "excerpt",
            DescriptionSource::Content => "content",
            DescriptionSource::SiteDescription => "site description",
        }
    }
}

impl ImageSource {
    pub fn label(self) -> &'static str {
        match self {
            ImageSource::Fallback => "fallback image",
            ImageSource::Featured => "featured image",
            ImageSource::Content => "content image",
        }
    }
}

/// Which source won for the values that have a fallback chain.
///
/// `images` is parallel to [`ResolvedTags::images`] as resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub title: TitleSource,
    pub description: DescriptionSource,
    pub images: Vec<ImageSource>,
}

/// Raw values for one render, consumed once by the emitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTags {
    pub url: String,
    pub title: String,
    pub site_name: String,
    pub description: String,
    pub og_type: String,
    /// Fallback first when configured; may be empty; not de-duplicated.
    pub images: Vec<String>,
    /// Lower-cased site locale.
    pub locale: String,
    pub admin_ids: Vec<String>,
    pub app_id: Option<String>,
    pub provenance: Provenance,
}

/// Resolve every tag value for one render.
pub fn resolve(markup: &str, ctx: &PageContext, settings: &Settings) -> ResolvedTags {
    let (title, title_source) = title_with_source(markup, ctx);
    let (description, description_source) = description_with_source(markup, ctx);
    let (images, image_sources): (Vec<_>, Vec<_>) =
        images_with_source(ctx, settings).into_iter().unzip();

    ResolvedTags {
        url: resolve_url(ctx),
        title,
        site_name: ctx.site.name.clone(),
        description,
        og_type: resolve_type(ctx).to_string(),
        images,
        locale: resolve_locale(ctx),
        admin_ids: settings.admin_ids.clone(),
        app_id: settings.app_id().map(String::from),
        provenance: Provenance {
            title: title_source,
            description: description_source,
            images: image_sources,
        },
    }
}

// =============================================================================
// Title
// =============================================================================

/// Resolve `og:title`.
pub fn resolve_title(markup: &str, ctx: &PageContext) -> String {
    title_with_source(markup, ctx).0
}

fn title_with_source(markup: &str, ctx: &PageContext) -> (String, TitleSource) {
    if let Some(title) = scrape_title(markup) {
        return (title.to_string(), TitleSource::Markup);
    }
    if ctx.kind.is_site_root() {
        return (ctx.site.name.clone(), TitleSource::SiteName);
    }
    (title_attribute(&ctx.title), TitleSource::PageTitle)
}

/// Inner text of the first `<title>` element, verbatim, if not blank.
pub fn scrape_title(markup: &str) -> Option<&str> {
    TITLE_TAG
        .captures(markup)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|title| !title.trim().is_empty())
}

/// The page title in a form suitable for an attribute: tags stripped,
/// entities decoded, surrounding whitespace trimmed.
pub fn title_attribute(title: &str) -> String {
    html::decode_entities(&html::strip_tags(title)).trim().to_string()
}

// =============================================================================
// Description
// =============================================================================

/// Resolve `og:description`.
pub fn resolve_description(markup: &str, ctx: &PageContext) -> String {
    description_with_source(markup, ctx).0
}

fn description_with_source(markup: &str, ctx: &PageContext) -> (String, DescriptionSource) {
    if let Some(description) = scrape_description(markup) {
        return (description.to_string(), DescriptionSource::Markup);
    }
    if ctx.kind == PageKind::Singular {
        return match ctx.authored_excerpt() {
            Some(excerpt) => (html::strip_tags(excerpt), DescriptionSource::Excerpt),
            None => (content_summary(&ctx.raw_content), DescriptionSource::Content),
        };
    }
    (ctx.site.description.clone(), DescriptionSource::SiteDescription)
}

/// `content` of the first `<meta name="description">`, verbatim, if not blank.
pub fn scrape_description(markup: &str) -> Option<&str> {
    META_DESCRIPTION
        .captures(markup)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| m.as_str())
        .filter(|description| !description.trim().is_empty())
}

/// Plain-text summary of a post body.
///
/// Shortcodes and tags are stripped, CRLF pairs become a space, and the
/// result is cut to [`DESCRIPTION_LENGTH`] characters, mid-word if need be.
pub fn content_summary(raw_content: &str) -> String {
    let text = html::strip_tags(&html::strip_shortcodes(raw_content));
    let text = html::collapse_crlf(&text);
    html::truncate_chars(&text, DESCRIPTION_LENGTH).to_string()
}

// =============================================================================
// Type, URL, locale
// =============================================================================

/// Resolve `og:type`.
///
/// Only the posts index is a `blog`; a static front page is a `website`
/// even though it shares title and URL handling with the posts index.
pub fn resolve_type(ctx: &PageContext) -> &'static str {
    match ctx.kind {
        PageKind::Home => "blog",
        PageKind::Singular => "article",
        PageKind::FrontPage | PageKind::Archive => "website",
    }
}

/// Resolve `og:url`.
pub fn resolve_url(ctx: &PageContext) -> String {
    ctx.request_url()
}

/// Resolve `og:locale`.
pub fn resolve_locale(ctx: &PageContext) -> String {
    ctx.site.locale.to_lowercase()
}

// =============================================================================
// Images
// =============================================================================

/// Resolve the `og:image` list.
///
/// The fallback image, when configured, is always first. With
/// `force_fallback` nothing else is added. Otherwise singular pages add the
/// featured image and then every content image in document order. Duplicates
/// are kept.
pub fn resolve_images(ctx: &PageContext, settings: &Settings) -> Vec<String> {
    images_with_source(ctx, settings)
        .into_iter()
        .map(|(url, _)| url)
        .collect()
}

fn images_with_source(ctx: &PageContext, settings: &Settings) -> Vec<(String, ImageSource)> {
    let mut images = Vec::new();

    if let Some(fallback) = settings.fallback_image() {
        images.push((fallback.to_string(), ImageSource::Fallback));
    }
    if settings.force_fallback || ctx.kind != PageKind::Singular {
        return images;
    }

    if let Some(featured) = ctx.featured_image() {
        images.push((featured.to_string(), ImageSource::Featured));
    }
    images.extend(
        find_content_images(&ctx.raw_content, &ctx.site.base_url)
            .into_iter()
            .map(|url| (url, ImageSource::Content)),
    );
    images
}

/// Every `<img src>` in `content`, in document order, made absolute.
///
/// Sources with a scheme other than http/https (e.g. `data:`) are skipped.
pub fn find_content_images(content: &str, base_url: &str) -> Vec<String> {
    IMG_SRC
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| absolutize(m.as_str(), base_url))
        .collect()
}

/// Make an image source absolute against the site base URL.
///
/// - `http://...` / `https://...` are kept verbatim.
/// - `//host/path` takes the base URL's scheme.
/// - Anything else is appended to the base URL: `base/` + `src` without its
///   leading slashes, so `/a.png` and `a.png` both land at the site root.
pub fn absolutize(src: &str, base_url: &str) -> Option<String> {
    let src = src.trim();
    if src.is_empty() {
        return None;
    }

    match Url::parse(src) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Some(src.to_string()),
        Ok(_) => None,
        Err(_) => {
            if let Some(rest) = src.strip_prefix("//") {
                let scheme = Url::parse(base_url)
                    .map(|base| base.scheme().to_string())
                    .unwrap_or_else(|_| "http".to_string());
                return Some(format!("{scheme}://{rest}"));
            }
            Some(format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                src.trim_start_matches('/')
            ))
        }
    }
}

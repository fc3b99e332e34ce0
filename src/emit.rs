//! Meta tag emission.
//!
//! Turns a resolved (and filtered) value set into the lines written into the
//! page head. Tags are rendered with maud; values are escaped for their
//! context first and then embedded pre-escaped, so existing entities in
//! scraped values are not escaped a second time.
//!
//! ## Output order
//!
//! ```text
//! <!-- ogp-head v0.3.0 -->
//! <meta property="fb:admins" content="123">      one per admin ID
//! <meta property="fb:app_id" content="456">      if set
//! <meta property="og:url" content="...">
//! <meta property="og:title" content="...">
//! <meta property="og:site_name" content="...">
//! <meta property="og:description" content="...">
//! <meta property="og:type" content="...">
//! <meta property="og:image" content="...">       one per image, fallback first
//! <meta property="og:locale" content="...">
//! <!-- // end ogp-head -->
//! ```
//!
//! ## Degraded output
//!
//! - No admin ID and no app ID: exactly one line, [`MISSING_ID_NOTICE`].
//! - No images and no fallback image configured: [`NO_IMAGE_NOTICE`] in
//!   place of the image tags.

use crate::filters::Tag;
use crate::html;
use crate::resolve::ResolvedTags;
use crate::settings::Settings;
use maud::{PreEscaped, html};

/// The only line emitted while no identifier is configured.
pub const MISSING_ID_NOTICE: &str = "<!-- Open Graph tags need a Facebook admin ID or app ID to work; set admin_ids or app_id in the plugin settings -->";

/// Emitted in place of image tags when there is no image to offer.
pub const NO_IMAGE_NOTICE: &str = "<!-- No og:image here: set a fallback_image_url in the plugin settings -->";

/// Closing marker of the emitted block.
pub const END_MARKER: &str = "<!-- // end ogp-head -->";

/// Opening marker of the emitted block.
pub fn begin_marker() -> String {
    format!("<!-- ogp-head v{} -->", env!("CARGO_PKG_VERSION"))
}

/// Render one `<meta property content>` line from an already-escaped value.
fn meta_line(property: &str, escaped_content: &str) -> String {
    html! {
        meta property=(property) content=(PreEscaped(escaped_content));
    }
    .into_string()
}

fn attr_line(property: &str, value: &str) -> String {
    meta_line(property, &html::escape_attr(value))
}

fn url_line(property: &str, value: &str) -> String {
    meta_line(property, &html::escape_url(value))
}

/// Emit the tag block for a render.
///
/// Identifiers are checked against `settings`, not the (possibly filtered)
/// values in `tags`: a site with no configured identifier never emits tags.
pub fn emit(tags: &ResolvedTags, settings: &Settings) -> Vec<String> {
    if !settings.has_identifier() {
        return vec![MISSING_ID_NOTICE.to_string()];
    }

    let mut lines = vec![begin_marker()];

    for admin in &tags.admin_ids {
        lines.push(attr_line("fb:admins", admin));
    }
    if let Some(app_id) = tags.app_id.as_deref().filter(|id| !id.is_empty()) {
        lines.push(attr_line(Tag::AppId.property(), app_id));
    }

    lines.push(url_line(Tag::Url.property(), &tags.url));
    lines.push(attr_line(Tag::Title.property(), &tags.title));
    lines.push(attr_line(Tag::SiteName.property(), &tags.site_name));
    lines.push(attr_line(Tag::Description.property(), &tags.description));
    lines.push(attr_line(Tag::Type.property(), &tags.og_type));

    let images: Vec<String> = tags
        .images
        .iter()
        .map(|url| html::escape_url(url))
        .filter(|escaped| !escaped.is_empty())
        .collect();
    if images.is_empty() && settings.fallback_image().is_none() {
        lines.push(NO_IMAGE_NOTICE.to_string());
    }
    for image in &images {
        lines.push(meta_line(Tag::Image.property(), image));
    }

    lines.push(attr_line(Tag::Locale.property(), &tags.locale));
    lines.push(END_MARKER.to_string());
    lines
}

//! Per-render page context.
//!
//! A [`PageContext`] is the read-only snapshot of everything the host knows
//! about the current view: what kind of page it is, the post's own content,
//! site-wide strings, and the incoming request. The host builds one per
//! render and hands it to the resolver explicitly; nothing is read from
//! ambient state.
//!
//! Contexts are plain serde data so the CLI can read them from JSON:
//!
//! ```json
//! {
//!   "kind": "singular",
//!   "title": "Hello &amp; welcome",
//!   "raw_content": "<p>First post.</p><img src=\"/uploads/cat.png\">",
//!   "excerpt": null,
//!   "featured_image_url": "http://example.com/uploads/feature.png",
//!   "site": {
//!     "name": "Acme Blog",
//!     "description": "Just another blog",
//!     "locale": "en_US",
//!     "base_url": "http://example.com"
//!   },
//!   "request": { "secure": false, "host": "example.com", "uri": "/hello/" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContextError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// What kind of view is being rendered.
///
/// `Home` is the blog posts index; `FrontPage` is a static page set as the
/// site front. They share title and URL handling but not `og:type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    Home,
    FrontPage,
    Singular,
    Archive,
}

impl PageKind {
    /// Home and front page both resolve to the site name and site URL.
    pub fn is_site_root(self) -> bool {
        matches!(self, PageKind::Home | PageKind::FrontPage)
    }
}

/// Site-wide strings, always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteInfo {
    pub name: String,
    pub description: String,
    /// Host locale as configured, e.g. `en_US`.
    pub locale: String,
    /// Site home URL, e.g. `http://example.com`. Relative content images
    /// are resolved against it.
    pub base_url: String,
}

/// The parts of the incoming request used to rebuild its URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestInfo {
    /// Whether the request arrived over TLS.
    #[serde(default)]
    pub secure: bool,
    /// `Host` header value.
    pub host: String,
    /// Path plus query string, exactly as requested.
    pub uri: String,
}

impl RequestInfo {
    /// Scheme + host + path + query, verbatim. No normalization.
    pub fn url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{scheme}://{}{}", self.host, self.uri)
    }
}

/// Everything the resolver may read about the current render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageContext {
    pub kind: PageKind,
    /// The page's own title as stored (may contain entities or tags).
    #[serde(default)]
    pub title: String,
    /// Unescaped post body, possibly containing shortcodes.
    #[serde(default)]
    pub raw_content: String,
    /// Present only when an excerpt was explicitly authored.
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub featured_image_url: Option<String>,
    pub site: SiteInfo,
    pub request: RequestInfo,
}

impl PageContext {
    /// Canonical absolute URL of the current view.
    ///
    /// The site URL for home and front page, otherwise the request URL.
    pub fn request_url(&self) -> String {
        if self.kind.is_site_root() {
            self.site.base_url.clone()
        } else {
            self.request.url()
        }
    }

    /// The authored excerpt, ignoring blank ones.
    pub fn authored_excerpt(&self) -> Option<&str> {
        self.excerpt.as_deref().filter(|e| !e.trim().is_empty())
    }

    /// The featured image URL, ignoring blank ones.
    pub fn featured_image(&self) -> Option<&str> {
        self.featured_image_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// Read a page context from a JSON file.
pub fn load_context(path: &Path) -> Result<PageContext, ContextError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    #[test]
    fn request_url_plain_http() {
        let request = RequestInfo {
            secure: false,
            host: "example.com".into(),
            uri: "/2024/01/hello/?replytocom=5".into(),
        };
        assert_eq!(request.url(), "http://example.com/2024/01/hello/?replytocom=5");
    }

    #[test]
    fn request_url_secure_is_not_normalized() {
        let request = RequestInfo {
            secure: true,
            host: "Example.com:8443".into(),
            uri: "/a//b".into(),
        };
        assert_eq!(request.url(), "https://Example.com:8443/a//b");
    }

    #[test]
    fn site_root_kinds_use_site_url() {
        for kind in [PageKind::Home, PageKind::FrontPage] {
            let ctx = context(kind);
            assert_eq!(ctx.request_url(), "http://example.com");
        }
    }

    #[test]
    fn other_kinds_use_request_url() {
        for kind in [PageKind::Singular, PageKind::Archive] {
            let ctx = context(kind);
            assert_eq!(ctx.request_url(), "http://example.com/hello-world/");
        }
    }

    #[test]
    fn blank_excerpt_is_not_authored() {
        let mut ctx = context(PageKind::Singular);
        ctx.excerpt = Some("  \n".into());
        assert_eq!(ctx.authored_excerpt(), None);
        ctx.excerpt = Some("Short summary".into());
        assert_eq!(ctx.authored_excerpt(), Some("Short summary"));
    }

    #[test]
    fn blank_featured_image_is_absent() {
        let mut ctx = context(PageKind::Singular);
        ctx.featured_image_url = Some(" ".into());
        assert_eq!(ctx.featured_image(), None);
    }

    #[test]
    fn kind_deserializes_snake_case() {
        let kind: PageKind = serde_json::from_str(r#""front_page""#).unwrap();
        assert_eq!(kind, PageKind::FrontPage);
    }

    #[test]
    fn load_context_reads_json_with_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("page.json");
        fs::write(
            &path,
            r#"{
                "kind": "archive",
                "site": {"name": "S", "description": "D", "locale": "en_GB", "base_url": "http://s"},
                "request": {"host": "s", "uri": "/category/news/"}
            }"#,
        )
        .unwrap();

        let ctx = load_context(&path).unwrap();
        assert_eq!(ctx.kind, PageKind::Archive);
        assert_eq!(ctx.title, "");
        assert_eq!(ctx.excerpt, None);
        assert!(!ctx.request.secure);
        assert_eq!(ctx.request_url(), "http://s/category/news/");
    }

    #[test]
    fn load_context_bad_json_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("page.json");
        fs::write(&path, "{ kind: ").unwrap();
        assert!(matches!(load_context(&path), Err(ContextError::Json(_))));
    }
}

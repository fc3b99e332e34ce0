//! Extension points between resolution and emission.
//!
//! External code can override resolved values without touching the
//! resolver. Hooks are plain `T -> T` transforms registered at startup and
//! applied in registration order:
//!
//! | hook | applies to |
//! |------|------------|
//! | [`Filters::on_admin_ids`] | the whole admin ID list |
//! | [`Filters::on_value`] | one tag's value, keyed by [`Tag`] |
//! | [`Filters::on_images`] | the whole image URL list |
//!
//! After the image-list hooks run, each remaining image URL also passes
//! through the [`Tag::Image`] value hooks.
//!
//! ```rust
//! use ogp_head::filters::{Filters, Tag};
//!
//! let mut filters = Filters::new();
//! filters
//!     .on_value(Tag::Title, |title| format!("{title} | Acme"))
//!     .on_images(|mut images| {
//!         images.truncate(3);
//!         images
//!     });
//! assert_eq!(filters.apply_value(Tag::Title, "Hello".into()), "Hello | Acme");
//! ```

use crate::resolve::ResolvedTags;
use std::fmt;

/// A single-valued tag that can be filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    AppId,
    Url,
    Title,
    SiteName,
    Description,
    Type,
    Image,
    Locale,
}

impl Tag {
    /// The `property` attribute this tag is emitted under.
    pub fn property(self) -> &'static str {
        match self {
            Tag::AppId => "fb:app_id",
            Tag::Url => "og:url",
            Tag::Title => "og:title",
            Tag::SiteName => "og:site_name",
            Tag::Description => "og:description",
            Tag::Type => "og:type",
            Tag::Image => "og:image",
            Tag::Locale => "og:locale",
        }
    }
}

type ValueHook = Box<dyn Fn(String) -> String + Send + Sync>;
type ListHook = Box<dyn Fn(Vec<String>) -> Vec<String> + Send + Sync>;

/// Ordered transform chains, built once and applied to every render.
#[derive(Default)]
pub struct Filters {
    values: Vec<(Tag, ValueHook)>,
    admin_ids: Vec<ListHook>,
    images: Vec<ListHook>,
}

impl fmt::Debug for Filters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tags: Vec<Tag> = self.values.iter().map(|(tag, _)| *tag).collect();
        f.debug_struct("Filters")
            .field("values", &tags)
            .field("admin_ids", &self.admin_ids.len())
            .field("images", &self.images.len())
            .finish()
    }
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transform for one tag's value.
    pub fn on_value<F>(&mut self, tag: Tag, hook: F) -> &mut Self
    where
        F: Fn(String) -> String + Send + Sync + 'static,
    {
        self.values.push((tag, Box::new(hook)));
        self
    }

    /// Register a transform for the admin ID list.
    pub fn on_admin_ids<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(Vec<String>) -> Vec<String> + Send + Sync + 'static,
    {
        self.admin_ids.push(Box::new(hook));
        self
    }

    /// Register a transform for the image URL list.
    pub fn on_images<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(Vec<String>) -> Vec<String> + Send + Sync + 'static,
    {
        self.images.push(Box::new(hook));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.admin_ids.is_empty() && self.images.is_empty()
    }

    /// Run `value` through every hook registered for `tag`, in order.
    pub fn apply_value(&self, tag: Tag, value: String) -> String {
        self.values
            .iter()
            .filter(|(hooked, _)| *hooked == tag)
            .fold(value, |acc, (_, hook)| hook(acc))
    }

    pub fn apply_admin_ids(&self, ids: Vec<String>) -> Vec<String> {
        self.admin_ids.iter().fold(ids, |acc, hook| hook(acc))
    }

    /// List hooks first, then the per-image value hooks.
    pub fn apply_images(&self, images: Vec<String>) -> Vec<String> {
        self.images
            .iter()
            .fold(images, |acc, hook| hook(acc))
            .into_iter()
            .map(|url| self.apply_value(Tag::Image, url))
            .collect()
    }

    /// Apply every chain to a resolved value set.
    ///
    /// Provenance is left as resolved; it describes the resolver's choice,
    /// not what the hooks did afterwards.
    pub fn apply(&self, tags: ResolvedTags) -> ResolvedTags {
        if self.is_empty() {
            return tags;
        }
        ResolvedTags {
            admin_ids: self.apply_admin_ids(tags.admin_ids),
            app_id: tags.app_id.map(|id| self.apply_value(Tag::AppId, id)),
            url: self.apply_value(Tag::Url, tags.url),
            title: self.apply_value(Tag::Title, tags.title),
            site_name: self.apply_value(Tag::SiteName, tags.site_name),
            description: self.apply_value(Tag::Description, tags.description),
            og_type: self.apply_value(Tag::Type, tags.og_type),
            images: self.apply_images(tags.images),
            locale: self.apply_value(Tag::Locale, tags.locale),
            provenance: tags.provenance,
        }
    }
}

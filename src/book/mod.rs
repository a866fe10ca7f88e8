use std::path::Path;

/// In-memory representation of an unpacked EPUB.
///
/// Resources keep their manifest order: the image extraction step depends on
/// that order when building the resource name mapping, so the first manifest
/// entry matching a reference wins deterministically.
#[derive(Debug, Clone, Default)]
pub struct Book {
    pub metadata: Metadata,
    pub spine: Vec<SpineItem>,
    pub resources: Vec<Resource>,
}

/// Book metadata (Dublin Core subset used by the LaTeX preamble)
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub title: String,
    pub authors: Vec<String>,
    pub date: Option<String>,
    pub language: String,
}

/// An item in the reading order (spine)
#[derive(Debug, Clone)]
pub struct SpineItem {
    pub id: String,
    pub href: String,
    pub media_type: String,
}

/// A resource (content document, image, CSS, font, etc.)
#[derive(Debug, Clone)]
pub struct Resource {
    pub href: String,
    pub data: Vec<u8>,
    pub media_type: String,
}

impl Book {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource to the book
    pub fn add_resource(
        &mut self,
        href: impl Into<String>,
        data: Vec<u8>,
        media_type: impl Into<String>,
    ) {
        self.resources.push(Resource {
            href: href.into(),
            data,
            media_type: media_type.into(),
        });
    }

    /// Get a resource by href
    pub fn get_resource(&self, href: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.href == href)
    }

    /// Add a spine item
    pub fn add_spine_item(
        &mut self,
        id: impl Into<String>,
        href: impl Into<String>,
        media_type: impl Into<String>,
    ) {
        self.spine.push(SpineItem {
            id: id.into(),
            href: href.into(),
            media_type: media_type.into(),
        });
    }

    /// Content documents in reading order.
    pub fn documents(&self) -> impl Iterator<Item = &SpineItem> {
        self.spine.iter().filter(|item| {
            item.media_type == "application/xhtml+xml" || item.media_type == "text/html"
        })
    }

    /// Image resources in manifest order.
    pub fn images(&self) -> impl Iterator<Item = &Resource> {
        self.resources
            .iter()
            .filter(|r| r.media_type.starts_with("image/"))
    }
}

impl Metadata {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.authors.push(author.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

/// The last path component of an href ("OEBPS/img/cover.jpg" -> "cover.jpg").
pub fn basename(href: &str) -> &str {
    Path::new(href)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(href)
}

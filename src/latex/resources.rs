//! Mapping from original resource identifiers to extracted filenames.

/// Read-only mapping from an EPUB resource's original identifier (its
/// manifest href) to the deduplicated filename the image was extracted
/// under. Built once before conversion; only consulted afterwards.
#[derive(Debug, Clone, Default)]
pub struct ResourceMap {
    entries: Vec<(String, String)>,
}

impl ResourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource. Insertion order is significant: [`resolve`]
    /// returns the first match in this order.
    ///
    /// [`resolve`]: ResourceMap::resolve
    pub fn insert(&mut self, original: impl Into<String>, resolved: impl Into<String>) {
        self.entries.push((original.into(), resolved.into()));
    }

    /// Resolve a cleaned reference (basename, not path-normalized) to an
    /// extracted filename.
    ///
    /// A reference matches when it appears as a substring of an original
    /// identifier or as that identifier's suffix; the first match in
    /// insertion order wins. The containment heuristic can mismatch
    /// similarly named files but is kept for compatibility with existing
    /// inputs (see DESIGN.md).
    pub fn resolve(&self, reference: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(original, _)| original.contains(reference) || original.ends_with(reference))
            .map(|(_, resolved)| resolved.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(o, r)| (o.as_str(), r.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_by_substring_and_suffix() {
        let mut map = ResourceMap::new();
        map.insert("OEBPS/images/cover.jpg", "image_0_cover.jpg");
        map.insert("OEBPS/images/figure1.png", "image_1_figure1.png");

        assert_eq!(map.resolve("cover.jpg"), Some("image_0_cover.jpg"));
        assert_eq!(map.resolve("figure1.png"), Some("image_1_figure1.png"));
        assert_eq!(map.resolve("missing.gif"), None);
    }

    #[test]
    fn first_insertion_order_match_wins() {
        let mut map = ResourceMap::new();
        map.insert("img/chapter1/pic.png", "image_0_pic.png");
        map.insert("img/chapter2/pic.png", "image_1_pic.png");

        assert_eq!(map.resolve("pic.png"), Some("image_0_pic.png"));
    }
}

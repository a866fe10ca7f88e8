//! CSS class based formatting.
//!
//! EPUB content frequently carries a small set of conventional class names
//! (`important`, `note`, `warning`, ...) instead of semantic tags. These map
//! to fixed LaTeX wrappers; anything unrecognized is left alone. This is a
//! closed table, not a stylesheet interpreter.

/// Inline wrappers: class name -> (prefix, suffix).
const INLINE_CLASS_FORMATS: &[(&str, &str, &str)] = &[
    ("important", "\\textbf{\\large ", "}"),
    ("note", "\\textcolor{blue}{\\textit{", "}}"),
    ("warning", "\\textcolor{red}{\\textbf{", "}}"),
    ("code-inline", "\\texttt{", "}"),
    ("author-note", "{\\small\\itshape ", "}"),
    ("done", "\\textcolor{green}{", "}"),
    ("pending", "\\textcolor{orange}{", "}"),
    ("todo", "\\textcolor{gray}{", "}"),
    ("highlight", "\\hl{", "}"),
    ("epigraph", "{\\itshape ", "}"),
];

/// Block environments: class name -> environment name.
const BLOCK_CLASS_FORMATS: &[(&str, &str)] = &[("highlight", "shadedquotation"), ("info", "mdframed")];

/// Split an element's `class` attribute into individual class names.
pub fn element_classes(attr: Option<&str>) -> Vec<&str> {
    attr.map(|v| v.split_ascii_whitespace().collect())
        .unwrap_or_default()
}

/// Wrap already-rendered content according to its element's classes.
///
/// Wrappers are applied innermost-first in class-attribute order. Unknown
/// classes are ignored, and empty content is returned unchanged so that
/// empty styled containers do not leave stray commands behind.
pub fn apply_class_formatting(content: String, classes: &[&str], inline: bool) -> String {
    if content.trim().is_empty() {
        return content;
    }

    let mut result = content;
    for class in classes {
        if inline {
            if let Some((_, prefix, suffix)) =
                INLINE_CLASS_FORMATS.iter().find(|(name, _, _)| name == class)
            {
                result = format!("{prefix}{result}{suffix}");
            }
        } else if let Some((_, env)) = BLOCK_CLASS_FORMATS.iter().find(|(name, _)| name == class) {
            result = format!("\\begin{{{env}}}\n{result}\\end{{{env}}}\n\n");
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_class_attribute() {
        assert_eq!(
            element_classes(Some("box info highlight")),
            vec!["box", "info", "highlight"]
        );
        assert!(element_classes(Some("")).is_empty());
        assert!(element_classes(None).is_empty());
    }

    #[test]
    fn important_is_bold_large() {
        let out = apply_class_formatting("Important text".into(), &["important"], true);
        assert_eq!(out, "\\textbf{\\large Important text}");
    }

    #[test]
    fn note_is_blue_italic() {
        let out = apply_class_formatting("Note text".into(), &["note"], true);
        assert!(out.contains("\\textcolor{blue}"));
    }

    #[test]
    fn multiple_classes_stack() {
        let out = apply_class_formatting("Text".into(), &["important", "highlight"], true);
        assert!(out.contains("\\textbf"));
        assert!(out.contains("\\hl{"));
    }

    #[test]
    fn block_classes_use_environments() {
        let out = apply_class_formatting("Boxed\n\n".into(), &["info"], false);
        assert!(out.starts_with("\\begin{mdframed}\n"));
        assert!(out.contains("\\end{mdframed}"));
    }

    #[test]
    fn unknown_classes_are_ignored() {
        let out = apply_class_formatting("Text".into(), &["mystery"], true);
        assert_eq!(out, "Text");
    }

    #[test]
    fn empty_content_is_not_wrapped() {
        let out = apply_class_formatting("  ".into(), &["important"], true);
        assert_eq!(out, "  ");
    }
}

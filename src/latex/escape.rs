//! LaTeX character escaping.
//!
//! Escaping is a sequence of plain string substitutions applied in a fixed
//! order. The order is load-bearing: the backslash substitution runs first,
//! before any substitution whose replacement introduces a new backslash,
//! so those introduced backslashes are never escaped a second time. Later
//! passes still rewrite the braces produced by `\textbackslash{}`; that
//! output shape is pinned by tests.

/// Ordered substitution table. Backslash must stay first.
pub const LATEX_ESCAPES: &[(&str, &str)] = &[
    ("\\", "\\textbackslash{}"),
    ("&", "\\&"),
    ("%", "\\%"),
    ("$", "\\$"),
    ("#", "\\#"),
    ("_", "\\_"),
    ("{", "\\{"),
    ("}", "\\}"),
    ("~", "\\textasciitilde{}"),
    ("^", "\\textasciicircum{}"),
];

/// Escape special LaTeX characters in text.
///
/// # Examples
///
/// ```
/// use epub2tex::latex::escape_latex;
///
/// assert_eq!(escape_latex("50% & rising"), "50\\% \\& rising");
/// assert_eq!(escape_latex("a_b"), "a\\_b");
/// ```
pub fn escape_latex(text: &str) -> String {
    let mut result = text.to_string();
    for (from, to) in LATEX_ESCAPES {
        result = result.replace(from, to);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn backslash_is_escaped_first() {
        // The table order itself is the invariant: every replacement after
        // the first introduces a backslash that must not be re-escaped.
        assert_eq!(LATEX_ESCAPES[0].0, "\\");
        for (from, to) in &LATEX_ESCAPES[1..] {
            assert_ne!(*from, "\\");
            assert!(to.contains('\\'));
        }
    }

    #[test]
    fn escapes_simple_specials() {
        assert_eq!(escape_latex("A & B"), "A \\& B");
        assert_eq!(escape_latex("100%"), "100\\%");
        assert_eq!(escape_latex("$5"), "\\$5");
        assert_eq!(escape_latex("#tag"), "\\#tag");
        assert_eq!(escape_latex("snake_case"), "snake\\_case");
        assert_eq!(escape_latex("x^2"), "x\\textasciicircum{}2");
        assert_eq!(escape_latex("~user"), "\\textasciitilde{}user");
    }

    #[test]
    fn backslash_braces_are_rewritten_by_later_passes() {
        // Sequential substitution: the braces introduced by the backslash
        // replacement are themselves escaped by the brace passes.
        assert_eq!(escape_latex("\\"), "\\textbackslash\\{\\}");
    }

    #[test]
    fn all_specials_produce_fixed_output() {
        assert_eq!(
            escape_latex("\\&%$#_{}~^"),
            "\\textbackslash\\{\\}\\&\\%\\$\\#\\_\\{\\}\\textasciitilde{}\\textasciicircum{}"
        );
    }

    #[test]
    fn double_escape_differs_from_single() {
        let once = escape_latex("\\&%$#_{}~^");
        let twice = escape_latex(&once);
        assert_ne!(once, twice);
    }

    #[test]
    fn plain_text_unchanged() {
        assert_eq!(escape_latex("Hello, world!"), "Hello, world!");
        assert_eq!(escape_latex(""), "");
    }

    proptest! {
        #[test]
        fn escaping_is_not_idempotent_when_specials_present(s in ".*[\\\\&%$#_{}~^].*") {
            let once = escape_latex(&s);
            // Every replacement introduces a backslash, so re-escaping
            // always changes the string again.
            prop_assert_ne!(escape_latex(&once), once);
        }

        #[test]
        fn text_without_specials_is_untouched(s in "[a-zA-Z0-9 .,!?:;'\"()\\-]*") {
            prop_assert_eq!(escape_latex(&s), s);
        }
    }
}

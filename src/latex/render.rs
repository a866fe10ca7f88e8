//! Core element tree → LaTeX rendering.
//!
//! This module is pure: it transforms a parsed [`Element`] tree into LaTeX
//! strings without performing I/O. The converter layer handles reading
//! chapters and writing the assembled document.
//!
//! Rendering never fails on a well-formed tree. Unrecognized tags fall back
//! to rendering their children under the unchanged context, so unknown
//! markup degrades to its text instead of aborting a chapter.

use crate::dom::{Element, Node};

use super::classes::{apply_class_formatting, element_classes};
use super::escape::escape_latex;
use super::resources::ResourceMap;

/// Immutable rendering mode, passed by value down every recursive call.
///
/// `inline` collapses whitespace runs in text to single spaces; `in_heading`
/// additionally turns hard breaks into spaces, because the run-in heading
/// commands fault on a forced break inside their argument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderContext {
    pub inline: bool,
    pub in_heading: bool,
}

impl RenderContext {
    /// Fresh context at a document root: block mode, not in a heading.
    pub fn root() -> Self {
        Self::default()
    }

    /// Same context with inline mode enabled.
    pub fn inline(self) -> Self {
        Self {
            inline: true,
            ..self
        }
    }

    /// Inline + heading mode, used for heading children.
    pub fn heading() -> Self {
        Self {
            inline: true,
            in_heading: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    fn environment(self) -> &'static str {
        match self {
            ListKind::Unordered => "itemize",
            ListKind::Ordered => "enumerate",
        }
    }

    fn of(element: &Element) -> Option<Self> {
        match element.name.as_str() {
            "ul" => Some(ListKind::Unordered),
            "ol" => Some(ListKind::Ordered),
            _ => None,
        }
    }
}

/// Per-tag rendering policy. One closed set, one policy per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Handler {
    Heading(u8),
    Paragraph,
    List(ListKind),
    DefinitionList,
    Table,
    Image,
    Figure,
    Link,
    Blockquote,
    Address,
    Preformatted,
    LineBreak,
    HorizontalRule,
    SoftHyphen,
    Container,
    SpacedContainer,
    Aside,
    Suppressed,
    Caption,
    TextOnly,
    MediaPlaceholder,
    InlineFormat(&'static str, &'static str),
    Passthrough,
}

/// Static (prefix, suffix) wrappers for the known inline formatting tags.
const INLINE_FORMATS: &[(&str, &str, &str)] = &[
    ("b", "\\textbf{", "}"),
    ("strong", "\\textbf{", "}"),
    ("i", "\\textit{", "}"),
    ("em", "\\emph{", "}"),
    ("u", "\\underline{", "}"),
    ("code", "\\texttt{", "}"),
    ("tt", "\\texttt{", "}"),
    ("small", "{\\small ", "}"),
    ("sub", "$_{\\text{", "}}$"),
    ("sup", "$^{\\text{", "}}$"),
    ("del", "\\sout{", "}"),
    ("strike", "\\sout{", "}"),
    ("s", "\\sout{", "}"),
    ("ins", "\\underline{", "}"),
    ("mark", "\\sethlcolor{highlightyellow}\\hl{", "}"),
    ("kbd", "\\texttt{", "}"),
    ("samp", "\\texttt{", "}"),
    ("var", "\\textit{", "}"),
    ("abbr", "\\textsc{", "}"),
    ("cite", "\\textit{", "}"),
    ("q", "``", "''"),
    ("dfn", "\\emph{", "}"),
    ("time", "", ""),
    ("data", "", ""),
];

fn classify(tag: &str) -> Handler {
    match tag {
        "h1" => Handler::Heading(1),
        "h2" => Handler::Heading(2),
        "h3" => Handler::Heading(3),
        "h4" => Handler::Heading(4),
        "h5" => Handler::Heading(5),
        "h6" => Handler::Heading(6),
        "p" => Handler::Paragraph,
        "ul" => Handler::List(ListKind::Unordered),
        "ol" => Handler::List(ListKind::Ordered),
        "dl" => Handler::DefinitionList,
        "table" => Handler::Table,
        "img" => Handler::Image,
        "figure" => Handler::Figure,
        "a" => Handler::Link,
        "blockquote" => Handler::Blockquote,
        "address" => Handler::Address,
        "pre" => Handler::Preformatted,
        "br" => Handler::LineBreak,
        "hr" => Handler::HorizontalRule,
        "wbr" => Handler::SoftHyphen,
        "div" | "span" | "section" | "article" | "main" => Handler::Container,
        "header" | "footer" => Handler::SpacedContainer,
        "aside" => Handler::Aside,
        // Navigation is irrelevant in print output; style/script/link/head
        // would leak CSS or metadata text through the passthrough fallback.
        "nav" | "style" | "script" | "link" | "head" | "title" => Handler::Suppressed,
        "caption" => Handler::Caption,
        "meter" | "progress" | "output" => Handler::TextOnly,
        "audio" | "video" | "canvas" => Handler::MediaPlaceholder,
        _ => {
            if let Some((_, prefix, suffix)) = INLINE_FORMATS
                .iter()
                .copied()
                .find(|(name, _, _)| *name == tag)
            {
                Handler::InlineFormat(prefix, suffix)
            } else {
                Handler::Passthrough
            }
        }
    }
}

/// Renders an element tree to LaTeX against a fixed resource mapping.
pub struct Renderer<'a> {
    resources: &'a ResourceMap,
}

impl<'a> Renderer<'a> {
    pub fn new(resources: &'a ResourceMap) -> Self {
        Self { resources }
    }

    /// Render a parsed chapter: the `body` element if present, otherwise the
    /// whole tree, under a fresh root context.
    pub fn render_document(&self, root: &Element) -> String {
        let body = root.find("body").unwrap_or(root);
        self.render_element(body, RenderContext::root())
    }

    /// Recursively convert one node to LaTeX under the given context.
    pub fn render(&self, node: &Node, ctx: RenderContext) -> String {
        match node {
            Node::Text(text) => self.render_text(text, ctx),
            Node::Element(element) => self.render_element(element, ctx),
        }
    }

    fn render_text(&self, text: &str, ctx: RenderContext) -> String {
        if ctx.inline {
            escape_latex(&collapse_whitespace(text))
        } else {
            escape_latex(text)
        }
    }

    fn render_element(&self, element: &Element, ctx: RenderContext) -> String {
        match classify(&element.name) {
            Handler::Heading(level) => self.heading(element, level),
            Handler::Paragraph => self.paragraph(element),
            Handler::List(kind) => self.list(element, kind),
            Handler::DefinitionList => self.definition_list(element),
            Handler::Table => self.table(element),
            Handler::Image => self.image(element),
            Handler::Figure => self.figure(element),
            Handler::Link => self.link(element),
            Handler::Blockquote => {
                let content = self.render_children(element, RenderContext::root());
                format!("\\begin{{quote}}\n{content}\\end{{quote}}\n\n")
            }
            Handler::Address => {
                let content = self.render_children(element, ctx.inline());
                format!("\\begin{{flushleft}}\n\\textit{{{content}}}\n\\end{{flushleft}}\n\n")
            }
            Handler::Preformatted => {
                // Verbatim keeps the exact original text: no escaping, no
                // whitespace normalization.
                let content = element.text_content();
                format!("\\begin{{verbatim}}\n{content}\\end{{verbatim}}\n\n")
            }
            Handler::LineBreak => {
                if ctx.in_heading {
                    // Run-in heading commands fault on a forced break inside
                    // their argument; collapse to a space instead.
                    " ".to_string()
                } else if ctx.inline {
                    "\\\\\n".to_string()
                } else {
                    "\n".to_string()
                }
            }
            Handler::HorizontalRule => {
                "\\vspace{0.5cm}\n\\noindent\\rule{\\textwidth}{0.4pt}\n\\vspace{0.5cm}\n\n"
                    .to_string()
            }
            Handler::SoftHyphen => "\\-".to_string(),
            Handler::Container => {
                let content = self.render_children(element, ctx);
                let classes = element_classes(element.attr("class"));
                apply_class_formatting(content, &classes, ctx.inline)
            }
            Handler::SpacedContainer => {
                let content = self.render_children(element, ctx);
                if content.trim().is_empty() {
                    content
                } else {
                    format!("\\vspace{{0.3cm}}\n{content}\\vspace{{0.3cm}}\n")
                }
            }
            Handler::Aside => {
                // Asides force block mode regardless of the inherited flag.
                let content = self.render_children(element, RenderContext::root());
                if content.trim().is_empty() {
                    String::new()
                } else {
                    format!("\\begin{{quotation}}\n{content}\\end{{quotation}}\n\n")
                }
            }
            Handler::Suppressed => String::new(),
            Handler::Caption => {
                let content = self.render_children(element, ctx.inline());
                format!("\\caption{{{content}}}\n")
            }
            Handler::TextOnly => self.render_children(element, ctx.inline()),
            Handler::MediaPlaceholder => self.media_placeholder(element),
            Handler::InlineFormat(prefix, suffix) => {
                let content = self.render_children(element, ctx.inline());
                format!("{prefix}{content}{suffix}")
            }
            Handler::Passthrough => self.render_children(element, ctx),
        }
    }

    fn render_children(&self, element: &Element, ctx: RenderContext) -> String {
        element
            .children
            .iter()
            .map(|child| self.render(child, ctx))
            .collect()
    }

    fn heading(&self, element: &Element, level: u8) -> String {
        let command = match level {
            1 => "chapter",
            2 => "section",
            3 => "subsection",
            4 => "subsubsection",
            5 => "paragraph",
            _ => "subparagraph",
        };
        // Page breaks before chapters and major sections.
        let prefix = match level {
            1 => "\\clearpage\n",
            2 => "\\newpage\n",
            _ => "",
        };
        let content = self.render_children(element, RenderContext::heading());
        // \paragraph and \subparagraph are run-in commands: a blank line
        // after them corrupts the following layout, so they get exactly one
        // line separator while the display headings get two.
        let separator = if level >= 5 { "\n" } else { "\n\n" };
        format!("{prefix}\\{command}{{{content}}}{separator}")
    }

    fn paragraph(&self, element: &Element) -> String {
        let content = self.render_children(element, RenderContext::root().inline());
        if content.trim().is_empty() {
            return String::new();
        }
        let classes = element_classes(element.attr("class"));
        let content = apply_class_formatting(content, &classes, true);
        format!("{content}\n\n")
    }

    fn list(&self, element: &Element, kind: ListKind) -> String {
        let env = kind.environment();
        let mut out = format!("\\begin{{{env}}}\n");

        for item in element.child_elements().filter(|e| e.name == "li") {
            // Separate the item's own content from lists nested directly
            // inside it; those are rendered after the item line.
            let mut content = String::new();
            let mut nested: Vec<(&Element, ListKind)> = Vec::new();

            for child in &item.children {
                if let Node::Element(e) = child
                    && let Some(kind) = ListKind::of(e)
                {
                    nested.push((e, kind));
                } else {
                    content.push_str(&self.render(child, RenderContext::root().inline()));
                }
            }

            out.push_str("    \\item ");
            out.push_str(content.trim());
            out.push('\n');

            // Re-indent every line of a nested list by one indent unit, so
            // indentation doubles per nesting level at any depth.
            for (sublist, kind) in nested {
                let rendered = self.list(sublist, kind);
                for line in rendered.lines().filter(|l| !l.is_empty()) {
                    out.push_str("    ");
                    out.push_str(line);
                    out.push('\n');
                }
            }
        }

        out.push_str(&format!("\\end{{{env}}}\n\n"));
        out
    }

    fn definition_list(&self, element: &Element) -> String {
        let mut out = String::from("\\begin{description}\n");
        let mut pending_term: Option<String> = None;

        for child in element.child_elements() {
            match child.name.as_str() {
                "dt" => {
                    // An unflushed prior term is overwritten.
                    let term = self.render_children(child, RenderContext::root().inline());
                    pending_term = Some(term.trim().to_string());
                }
                "dd" => {
                    // A definition with no pending term is silently dropped.
                    if let Some(term) = pending_term.take() {
                        let definition =
                            self.render_children(child, RenderContext::root().inline());
                        out.push_str(&format!("    \\item[{}] {}\n", term, definition.trim()));
                    }
                }
                _ => {}
            }
        }

        out.push_str("\\end{description}\n\n");
        out
    }

    fn table(&self, element: &Element) -> String {
        let caption = element
            .find("caption")
            .map(|c| self.render_children(c, RenderContext::root().inline()));

        // Gather rows at any depth, so thead/tbody/tfoot wrappers are
        // transparent.
        let mut rows: Vec<&Element> = Vec::new();
        element.find_all("tr", &mut rows);
        if rows.is_empty() {
            return String::new();
        }

        // Column count is fixed by the first row and the template reused
        // verbatim for every row: no span handling, no padding, no
        // truncation of ragged rows.
        let columns = table_cells(rows[0]).len();
        if columns == 0 {
            return String::new();
        }
        let col_format = format!("|{}", "l|".repeat(columns));

        let mut out = String::from("\\begin{table}[h]\n\\centering\n");
        if let Some(caption) = caption
            && !caption.is_empty()
        {
            out.push_str(&format!("\\caption{{{caption}}}\n"));
        }
        out.push_str(&format!("\\begin{{tabular}}{{{col_format}}}\n\\hline\n"));

        for row in rows {
            let cells: Vec<String> = table_cells(row)
                .into_iter()
                .map(|cell| {
                    self.render_children(cell, RenderContext::root().inline())
                        .trim()
                        .to_string()
                })
                .collect();
            out.push_str(&cells.join(" & "));
            out.push_str(" \\\\\n\\hline\n");
        }

        out.push_str("\\end{tabular}\n\\end{table}\n\n");
        out
    }

    fn image(&self, element: &Element) -> String {
        let src = element.attr("src").unwrap_or("");
        let alt = element.attr("alt").unwrap_or("");
        let cleaned = clean_reference(src);

        let Some(filename) = self.resources.resolve(cleaned) else {
            // Unresolved references degrade to a comment, never an error.
            return format!("% Image not found: {cleaned}\n");
        };

        let mut out = String::from("\\begin{figure}[htbp]\n\\centering\n");
        out.push_str(&format!(
            "\\includegraphics[width=\\textwidth]{{images/{filename}}}\n"
        ));
        if !alt.is_empty() {
            out.push_str(&format!("\\caption{{{}}}\n", escape_latex(alt)));
        }
        out.push_str("\\end{figure}\n\n");
        out
    }

    fn figure(&self, element: &Element) -> String {
        let mut out = String::from("\\begin{figure}[htbp]\n\\centering\n");

        if let Some(img) = element.find("img") {
            let cleaned = clean_reference(img.attr("src").unwrap_or(""));
            if let Some(filename) = self.resources.resolve(cleaned) {
                out.push_str(&format!(
                    "\\includegraphics[width=\\textwidth]{{images/{filename}}}\n"
                ));
            }
        }

        if let Some(figcaption) = element.find("figcaption") {
            let caption = self.render_children(figcaption, RenderContext::root().inline());
            out.push_str(&format!("\\caption{{{caption}}}\n"));
        }

        out.push_str("\\end{figure}\n\n");
        out
    }

    fn link(&self, element: &Element) -> String {
        let href = element.attr("href").unwrap_or("");
        let text = self.render_children(element, RenderContext::root().inline());

        if href.is_empty() {
            return text;
        }

        // Absolute targets become hyperlinks; everything else, including
        // internal fragment references, degrades to plain text. Resolving
        // cross-document anchors is a documented limitation.
        if href.starts_with("http://") || href.starts_with("https://") {
            format!("\\href{{{href}}}{{{text}}}")
        } else {
            text
        }
    }

    fn media_placeholder(&self, element: &Element) -> String {
        let tag = element.name.to_uppercase();
        let alt = element.attr("alt").unwrap_or("");
        let text = if alt.is_empty() {
            element.text_content()
        } else {
            alt.to_string()
        };

        if text.is_empty() {
            format!("[{tag} content]\n\n")
        } else {
            format!("[{tag}: {}]\n\n", escape_latex(&text))
        }
    }
}

/// Collect the cells of a table row (`td`/`th` descendants, document order).
fn table_cells(row: &Element) -> Vec<&Element> {
    fn walk<'a>(element: &'a Element, out: &mut Vec<&'a Element>) {
        for child in element.child_elements() {
            if child.name == "td" || child.name == "th" {
                out.push(child);
            }
            walk(child, out);
        }
    }
    let mut cells = Vec::new();
    walk(row, &mut cells);
    cells
}

/// Basename of a reference, without path normalization.
fn clean_reference(src: &str) -> &str {
    match src.rsplit_once('/') {
        Some((_, name)) => name,
        None => src,
    }
}

/// Collapse every whitespace run to a single space, preserving single
/// leading/trailing spaces.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_whitespace = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push(' ');
                in_whitespace = true;
            }
        } else {
            out.push(c);
            in_whitespace = false;
        }
    }
    out
}

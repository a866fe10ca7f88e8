//! Document assembly: preamble and epilogue generation.
//!
//! The preamble is a fixed package block with the book's metadata
//! substituted into the hyperref setup and title commands. Metadata is
//! LaTeX-escaped here, immediately before substitution.

use crate::book::Metadata;

use super::escape::escape_latex;

const DEFAULT_TITLE: &str = "Untitled";
const DEFAULT_AUTHOR: &str = "Unknown";

/// Generate the LaTeX preamble for a converted book.
///
/// Empty metadata fields fall back to `Untitled` / `Unknown`; a missing
/// date becomes `\date{\today}`.
pub fn preamble(metadata: &Metadata) -> String {
    let title = if metadata.title.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        escape_latex(&metadata.title)
    };

    let author = if metadata.authors.is_empty() {
        DEFAULT_AUTHOR.to_string()
    } else {
        let escaped: Vec<String> = metadata.authors.iter().map(|a| escape_latex(a)).collect();
        escaped.join(", ")
    };

    let date = match metadata.date.as_deref() {
        Some(date) if !date.is_empty() => format!("\\date{{{}}}", escape_latex(date)),
        _ => "\\date{\\today}".to_string(),
    };

    format!(
        r#"\documentclass[12pt,a4paper]{{book}}

% Encoding and fonts
\usepackage[utf8]{{inputenc}}
\usepackage[T1]{{fontenc}}
\usepackage{{lmodern}}

% Language support
\usepackage[french,english]{{babel}}

% Graphics and images
\usepackage{{graphicx}}
\usepackage{{float}}

% Page layout
\usepackage[margin=2.5cm]{{geometry}}

% Colors and highlighting
\usepackage{{xcolor}}
\usepackage{{soul}}
\definecolor{{highlightyellow}}{{RGB}}{{255,255,200}}

% Hyperlinks
\usepackage{{hyperref}}
\hypersetup{{
    colorlinks=true,
    linkcolor=blue,
    filecolor=magenta,
    urlcolor=cyan,
    pdfauthor={{{author}}},
    pdftitle={{{title}}}
}}

% Tables
\usepackage{{booktabs}}
\usepackage{{tabularx}}
\usepackage{{longtable}}
\usepackage{{array}}

% Lists
\usepackage{{enumitem}}

% Typography
\usepackage{{microtype}}
\usepackage{{setspace}}
\setstretch{{1.2}}

% Strikethrough and underline
\usepackage[normalem]{{ulem}}

% Better verbatim
\usepackage{{fancyvrb}}

% Better section spacing
\usepackage{{titlesec}}

% Class-based formatting
\usepackage{{framed}}
\usepackage{{mdframed}}
\definecolor{{shadecolor}}{{RGB}}{{240,240,240}}
\newenvironment{{shadedquotation}}
  {{\begin{{shaded}}\begin{{quotation}}}}
  {{\end{{quotation}}\end{{shaded}}}}

% Page breaks and spacing
\setlength{{\parskip}}{{0.5em}}
\setlength{{\parindent}}{{1.5em}}

% Title information
\title{{{title}}}
\author{{{author}}}
{date}

\begin{{document}}

\maketitle
\tableofcontents
\clearpage

"#
    )
}

/// Generate the LaTeX epilogue.
pub fn epilogue() -> String {
    "\n\\end{document}\n".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preamble_substitutes_metadata() {
        let metadata = Metadata::new("My Book & Tales")
            .with_author("Ada Author")
            .with_author("Bob Builder")
            .with_date("2020-05-01");
        let out = preamble(&metadata);

        assert!(out.starts_with("\\documentclass[12pt,a4paper]{book}"));
        assert!(out.contains("\\title{My Book \\& Tales}"));
        assert!(out.contains("\\author{Ada Author, Bob Builder}"));
        assert!(out.contains("pdftitle={My Book \\& Tales}"));
        assert!(out.contains("pdfauthor={Ada Author, Bob Builder}"));
        assert!(out.contains("\\date{2020-05-01}"));
        assert!(out.contains("\\maketitle"));
        assert!(out.contains("\\tableofcontents"));
    }

    #[test]
    fn preamble_defaults_for_missing_metadata() {
        let out = preamble(&Metadata::default());
        assert!(out.contains("\\title{Untitled}"));
        assert!(out.contains("\\author{Unknown}"));
        assert!(out.contains("\\date{\\today}"));
    }

    #[test]
    fn epilogue_closes_document() {
        assert_eq!(epilogue(), "\n\\end{document}\n");
    }
}

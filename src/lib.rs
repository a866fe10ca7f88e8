//! # epub2tex
//!
//! Converts EPUB ebooks to LaTeX documents, optionally compiling them
//! to PDF with an installed LaTeX engine.
//!
//! ## Features
//!
//! - Reads EPUB 2/3 files into an intermediate [`Book`] representation
//! - Renders XHTML chapters to LaTeX: headings, lists, tables, figures,
//!   inline formatting, and CSS-class-driven environments
//! - Extracts images next to the output with deterministic names
//! - Batch-converts whole directories with per-file fault isolation
//! - Drives pdflatex/xelatex/lualatex with multiple passes and a
//!   per-pass timeout
//!
//! ## Quick Start
//!
//! ```no_run
//! use epub2tex::Converter;
//!
//! // Convert one book; the .tex lands next to the input
//! let report = Converter::new("input.epub", None).convert()?;
//! println!("{} chapters converted", report.documents_converted);
//! # Ok::<(), epub2tex::Error>(())
//! ```
//!
//! Batch mode:
//!
//! ```no_run
//! use epub2tex::{CompilerEngine, process_directory};
//!
//! let (ok, failed) = process_directory(
//!     "books/".as_ref(),
//!     Some("out/".as_ref()),
//!     false,
//!     CompilerEngine::default(),
//! )?;
//! println!("{ok} converted, {failed} failed");
//! # Ok::<(), epub2tex::Error>(())
//! ```

pub mod batch;
pub mod book;
pub mod convert;
pub mod dom;
pub mod epub;
pub mod error;
pub mod latex;

pub use batch::{CompilerEngine, compile_document, process_directory};
pub use book::{Book, Metadata, Resource, SpineItem};
pub use convert::{ConversionReport, Converter};
pub use epub::{read_epub, read_epub_from_reader};
pub use error::{Error, Result};
pub use latex::{Renderer, ResourceMap, escape_latex};

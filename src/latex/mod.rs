//! LaTeX generation.
//!
//! Converts parsed XHTML documents into LaTeX source. The pieces:
//!
//! - [`escape_latex`]: special-character escaping
//! - [`Renderer`]: the element-to-LaTeX conversion engine
//! - [`ResourceMap`]: maps document image references to extracted files
//! - [`preamble`] / [`epilogue`]: document assembly around the
//!   converted chapter fragments

mod classes;
mod escape;
mod preamble;
mod render;
mod resources;

pub use classes::{apply_class_formatting, element_classes};
pub use escape::{LATEX_ESCAPES, escape_latex};
pub use preamble::{epilogue, preamble};
pub use render::{RenderContext, Renderer};
pub use resources::ResourceMap;

//! Single-file conversion driver.
//!
//! Ties the pipeline together: read the EPUB, extract its images next to
//! the output file, render each spine document, and assemble the final
//! LaTeX source. A failure in one spine document is reported and skipped;
//! only failures to read the EPUB itself or to write the output abort
//! the conversion.

use std::fs;
use std::path::{Path, PathBuf};

use crate::book::{Book, basename};
use crate::dom;
use crate::epub::read_epub;
use crate::error::Result;
use crate::latex::{Renderer, ResourceMap, epilogue, preamble};

/// Counts from a single conversion.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConversionReport {
    pub documents_converted: usize,
    pub documents_failed: usize,
    pub images_extracted: usize,
}

/// Converts one EPUB file to a LaTeX document.
///
/// # Example
///
/// ```no_run
/// use epub2tex::Converter;
///
/// let converter = Converter::new("book.epub", None);
/// let report = converter.convert()?;
/// println!("{} documents converted", report.documents_converted);
/// # Ok::<(), epub2tex::Error>(())
/// ```
pub struct Converter {
    input: PathBuf,
    output: PathBuf,
}

impl Converter {
    /// Create a converter for `input`. When `output` is `None` the `.tex`
    /// file is written next to the input with the extension swapped.
    pub fn new(input: impl Into<PathBuf>, output: Option<PathBuf>) -> Self {
        let input = input.into();
        let output = output.unwrap_or_else(|| input.with_extension("tex"));
        Self { input, output }
    }

    /// Where the LaTeX source will be written.
    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Run the conversion and write the LaTeX source to disk.
    pub fn convert(&self) -> Result<ConversionReport> {
        let book = read_epub(&self.input)?;

        if book.metadata.title.is_empty() {
            eprintln!("Warning: no title found in {}", self.input.display());
        }

        let out_dir = self
            .output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();
        fs::create_dir_all(&out_dir)?;

        let mut report = ConversionReport::default();

        // Image extraction failure degrades to an image-free document
        // rather than aborting the conversion.
        let resources = match extract_images(&book, &out_dir) {
            Ok((map, count)) => {
                report.images_extracted = count;
                map
            }
            Err(err) => {
                eprintln!(
                    "Warning: failed to extract images from {}: {}",
                    self.input.display(),
                    err
                );
                ResourceMap::new()
            }
        };

        let renderer = Renderer::new(&resources);
        let mut output = preamble(&book.metadata);

        for item in book.documents() {
            let Some(resource) = book.get_resource(&item.href) else {
                eprintln!("Warning: spine item {} missing from archive", item.href);
                report.documents_failed += 1;
                continue;
            };

            // BOM sniffing handles UTF-16 documents; invalid bytes are
            // replaced rather than failing the document.
            let (text, _, _) = encoding_rs::UTF_8.decode(&resource.data);

            match dom::parse_document(&text) {
                Ok(root) => {
                    output.push_str(&renderer.render_document(&root));
                    report.documents_converted += 1;
                }
                Err(err) => {
                    eprintln!("Warning: failed to convert {}: {}", item.href, err);
                    report.documents_failed += 1;
                }
            }
        }

        output.push_str(&epilogue());
        fs::write(&self.output, output)?;

        Ok(report)
    }
}

/// Extract image resources into `<out_dir>/images/`.
///
/// Files are named `image_{counter}_{basename}` in manifest order, which
/// keeps names deterministic and collision-free even when two chapters
/// ship images with the same basename.
fn extract_images(book: &Book, out_dir: &Path) -> Result<(ResourceMap, usize)> {
    let mut map = ResourceMap::new();

    let images: Vec<_> = book.images().collect();
    if images.is_empty() {
        return Ok((map, 0));
    }

    let image_dir = out_dir.join("images");
    fs::create_dir_all(&image_dir)?;

    let mut count = 0;
    for (i, resource) in images.iter().enumerate() {
        let name = format!("image_{}_{}", i, basename(&resource.href));
        fs::write(image_dir.join(&name), &resource.data)?;
        // The renderer prefixes images/ when emitting \includegraphics.
        map.insert(resource.href.clone(), name);
        count += 1;
    }

    Ok((map, count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_swaps_extension() {
        let converter = Converter::new("books/novel.epub", None);
        assert_eq!(converter.output_path(), Path::new("books/novel.tex"));
    }

    #[test]
    fn explicit_output_is_kept() {
        let converter = Converter::new("novel.epub", Some(PathBuf::from("out/novel.tex")));
        assert_eq!(converter.output_path(), Path::new("out/novel.tex"));
    }

    #[test]
    fn extract_images_names_by_counter_and_basename() {
        let dir = tempfile::tempdir().unwrap();
        let mut book = Book::new();
        book.add_resource("OEBPS/images/cover.jpg", vec![1, 2], "image/jpeg");
        book.add_resource("OEBPS/ch1.xhtml", vec![3], "application/xhtml+xml");
        book.add_resource("OEBPS/art/cover.jpg", vec![4, 5], "image/jpeg");

        let (map, count) = extract_images(&book, dir.path()).unwrap();
        assert_eq!(count, 2);
        assert!(dir.path().join("images/image_0_cover.jpg").exists());
        assert!(dir.path().join("images/image_1_cover.jpg").exists());

        // First manifest entry wins for an ambiguous reference.
        assert_eq!(map.resolve("cover.jpg"), Some("image_0_cover.jpg"));
    }

    #[test]
    fn extract_images_skips_dir_creation_without_images() {
        let dir = tempfile::tempdir().unwrap();
        let mut book = Book::new();
        book.add_resource("ch1.xhtml", vec![1], "application/xhtml+xml");

        let (map, count) = extract_images(&book, dir.path()).unwrap();
        assert_eq!(count, 0);
        assert!(map.is_empty());
        assert!(!dir.path().join("images").exists());
    }
}

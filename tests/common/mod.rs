//! Shared fixture builder: writes minimal but valid EPUB files.

use std::io::Write;
use std::path::Path;

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Write an EPUB with the given chapters and images.
///
/// `chapters` are `(href, body)` pairs; the body is wrapped in a full
/// XHTML document. `images` are `(href, bytes)` pairs relative to the
/// OEBPS directory, like `images/pic.png`.
pub fn build_epub(path: &Path, title: &str, chapters: &[(&str, &str)], images: &[(&str, &[u8])]) {
    let file = std::fs::File::create(path).expect("create epub fixture");
    let mut zip = ZipWriter::new(file);

    let stored = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    let deflated =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    // mimetype must be first and uncompressed
    zip.start_file("mimetype", stored).unwrap();
    zip.write_all(b"application/epub+zip").unwrap();

    zip.start_file("META-INF/container.xml", deflated).unwrap();
    zip.write_all(
        br#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#,
    )
    .unwrap();

    let mut manifest = String::new();
    let mut spine = String::new();
    for (i, (href, _)) in chapters.iter().enumerate() {
        manifest.push_str(&format!(
            r#"    <item id="ch{i}" href="{href}" media-type="application/xhtml+xml"/>
"#
        ));
        spine.push_str(&format!("    <itemref idref=\"ch{i}\"/>\n"));
    }
    for (i, (href, _)) in images.iter().enumerate() {
        let media_type = if href.ends_with(".jpg") {
            "image/jpeg"
        } else {
            "image/png"
        };
        manifest.push_str(&format!(
            r#"    <item id="img{i}" href="{href}" media-type="{media_type}"/>
"#
        ));
    }

    let title = xml_escape(title);
    let opf = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="id">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>{title}</dc:title>
    <dc:creator>Fixture Author</dc:creator>
    <dc:language>en</dc:language>
  </metadata>
  <manifest>
{manifest}  </manifest>
  <spine>
{spine}  </spine>
</package>"#
    );
    zip.start_file("OEBPS/content.opf", deflated).unwrap();
    zip.write_all(opf.as_bytes()).unwrap();

    for (href, body) in chapters {
        let doc = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>Chapter</title></head>
<body>
{body}
</body>
</html>"#
        );
        zip.start_file(format!("OEBPS/{href}"), deflated).unwrap();
        zip.write_all(doc.as_bytes()).unwrap();
    }

    for (href, bytes) in images {
        zip.start_file(format!("OEBPS/{href}"), deflated).unwrap();
        zip.write_all(bytes).unwrap();
    }

    zip.finish().unwrap();
}

/// Escape text for interpolation into the fixture's XML.
fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Write a file that is not a valid ZIP archive at all.
pub fn build_corrupt_epub(path: &Path) {
    std::fs::write(path, b"this is not a zip archive").expect("write corrupt fixture");
}

use epub2tex::{CompilerEngine, process_directory};

mod common;

#[test]
fn directory_with_corrupt_file_isolates_the_failure() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["alpha.epub", "beta.epub", "gamma.epub"] {
        common::build_epub(
            &dir.path().join(name),
            "Book",
            &[("ch1.xhtml", "<p>Text.</p>")],
            &[],
        );
    }
    common::build_corrupt_epub(&dir.path().join("broken.epub"));

    let (succeeded, failed) =
        process_directory(dir.path(), None, false, CompilerEngine::default()).unwrap();
    assert_eq!((succeeded, failed), (3, 1));

    // Outputs land next to the inputs when no output directory is given
    for name in ["alpha.tex", "beta.tex", "gamma.tex"] {
        assert!(dir.path().join(name).exists());
    }
    assert!(!dir.path().join("broken.tex").exists());
}

#[test]
fn two_valid_one_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["a.epub", "b.epub"] {
        common::build_epub(
            &dir.path().join(name),
            "Book",
            &[("ch1.xhtml", "<p>Text.</p>")],
            &[],
        );
    }
    common::build_corrupt_epub(&dir.path().join("z.epub"));

    let (succeeded, failed) =
        process_directory(dir.path(), None, false, CompilerEngine::default()).unwrap();
    assert_eq!((succeeded, failed), (2, 1));
}

#[test]
fn output_directory_collects_results() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    common::build_epub(
        &dir.path().join("one.epub"),
        "One",
        &[("ch1.xhtml", "<p>One.</p>")],
        &[],
    );
    common::build_epub(
        &dir.path().join("two.EPUB"),
        "Two",
        &[("ch1.xhtml", "<p>Two.</p>")],
        &[],
    );

    let (succeeded, failed) =
        process_directory(dir.path(), Some(&out), false, CompilerEngine::default()).unwrap();
    assert_eq!((succeeded, failed), (2, 0));
    assert!(out.join("one.tex").exists());
    // Uppercase extension is still picked up
    assert!(out.join("two.tex").exists());
    assert!(!dir.path().join("one.tex").exists());
}

#[test]
fn non_epub_files_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"not a book").unwrap();
    std::fs::write(dir.path().join("data.zip"), b"also not").unwrap();

    let (succeeded, failed) =
        process_directory(dir.path(), None, false, CompilerEngine::default()).unwrap();
    assert_eq!((succeeded, failed), (0, 0));
}

#[test]
fn missing_directory_is_an_error() {
    let result = process_directory(
        std::path::Path::new("/nonexistent/books"),
        None,
        false,
        CompilerEngine::default(),
    );
    assert!(result.is_err());
}

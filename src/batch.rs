//! Batch conversion and LaTeX compiler driving.
//!
//! [`process_directory`] converts every EPUB in a directory, isolating
//! failures per file. [`compile_document`] shells out to an installed
//! LaTeX engine and reports success by checking that the PDF artifact
//! exists, since LaTeX engines routinely exit nonzero on recoverable
//! errors.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::convert::Converter;
use crate::error::{Error, Result};

/// Passes run per document so cross-references and the table of
/// contents resolve.
pub const DEFAULT_MAX_PASSES: usize = 2;

/// Wall-clock limit for a single compiler pass.
pub const DEFAULT_PASS_TIMEOUT: Duration = Duration::from_secs(120);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Supported LaTeX engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompilerEngine {
    #[default]
    Pdflatex,
    Xelatex,
    Lualatex,
}

impl CompilerEngine {
    /// Parse an engine name as given on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pdflatex" => Some(Self::Pdflatex),
            "xelatex" => Some(Self::Xelatex),
            "lualatex" => Some(Self::Lualatex),
            _ => None,
        }
    }

    /// The binary to look up on `PATH`.
    pub fn binary(self) -> &'static str {
        match self {
            Self::Pdflatex => "pdflatex",
            Self::Xelatex => "xelatex",
            Self::Lualatex => "lualatex",
        }
    }
}

/// Convert every EPUB directly inside `dir`, optionally compiling each
/// result to PDF.
///
/// Files are processed in sorted order. A failure converting or
/// compiling one file is reported on stderr and counted; the remaining
/// files are still processed. Returns `(succeeded, failed)`.
pub fn process_directory(
    dir: &Path,
    output_dir: Option<&Path>,
    compile: bool,
    engine: CompilerEngine,
) -> Result<(usize, usize)> {
    let mut inputs: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| is_epub(path))
        .collect();
    inputs.sort();

    if let Some(out) = output_dir {
        std::fs::create_dir_all(out)?;
    }

    let mut succeeded = 0;
    let mut failed = 0;

    for input in &inputs {
        let output = output_dir.map(|out| {
            let stem = input.file_stem().unwrap_or(input.as_os_str());
            out.join(stem).with_extension("tex")
        });

        let converter = Converter::new(input, output);
        match converter.convert() {
            Ok(_) => {}
            Err(err) => {
                eprintln!("Error converting {}: {}", input.display(), err);
                failed += 1;
                continue;
            }
        }

        if compile {
            match compile_document(
                converter.output_path(),
                engine,
                DEFAULT_MAX_PASSES,
                DEFAULT_PASS_TIMEOUT,
            ) {
                Ok(true) => {}
                Ok(false) => {
                    eprintln!("Error compiling {}", converter.output_path().display());
                    failed += 1;
                    continue;
                }
                Err(err) => {
                    eprintln!(
                        "Error compiling {}: {}",
                        converter.output_path().display(),
                        err
                    );
                    failed += 1;
                    continue;
                }
            }
        }

        succeeded += 1;
    }

    Ok((succeeded, failed))
}

/// Compile `tex` to PDF with the given engine.
///
/// Returns `Ok(true)` when the PDF exists after the final pass,
/// `Ok(false)` when it does not or a pass timed out, and
/// [`Error::CompilerNotFound`] when the engine binary is not on `PATH`.
pub fn compile_document(
    tex: &Path,
    engine: CompilerEngine,
    max_passes: usize,
    timeout: Duration,
) -> Result<bool> {
    let program =
        which::which(engine.binary()).map_err(|_| Error::CompilerNotFound(engine.binary().into()))?;
    compile_with_program(&program, tex, max_passes, timeout)
}

/// Compiler loop over an already-resolved binary. Split out so tests can
/// substitute a stand-in program.
pub(crate) fn compile_with_program(
    program: &Path,
    tex: &Path,
    max_passes: usize,
    timeout: Duration,
) -> Result<bool> {
    let work_dir = tex.parent().filter(|p| !p.as_os_str().is_empty());
    let file_name = tex.file_name().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("not a file path: {}", tex.display()),
        )
    })?;

    for _ in 0..max_passes {
        let mut command = Command::new(program);
        command
            .arg("-interaction=nonstopmode")
            .arg(file_name)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(dir) = work_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn()?;
        let deadline = Instant::now() + timeout;

        // Poll instead of wait() so a hung pass can be killed.
        loop {
            match child.try_wait()? {
                Some(_) => break,
                None if Instant::now() >= deadline => {
                    child.kill()?;
                    child.wait()?;
                    return Ok(false);
                }
                None => std::thread::sleep(POLL_INTERVAL),
            }
        }
        // Nonzero exits are tolerated; the artifact check below decides.
    }

    Ok(tex.with_extension("pdf").exists())
}

fn is_epub(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("epub"))
}

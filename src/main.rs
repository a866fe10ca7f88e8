//! epub2tex - EPUB to LaTeX converter

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use epub2tex::batch::{DEFAULT_MAX_PASSES, DEFAULT_PASS_TIMEOUT};
use epub2tex::{CompilerEngine, Converter, compile_document, process_directory};

#[derive(Parser)]
#[command(name = "epub2tex")]
#[command(version, about = "EPUB to LaTeX converter", long_about = None)]
#[command(after_help = "EXAMPLES:
    epub2tex book.epub                  Convert to book.tex
    epub2tex book.epub -o out/book.tex  Convert to a chosen path
    epub2tex books/ -o out/ --compile   Convert a directory and build PDFs")]
struct Cli {
    /// Input EPUB file or directory of EPUB files
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output .tex file (single input) or directory (batch input)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Compile the generated LaTeX to PDF
    #[arg(short, long)]
    compile: bool,

    /// LaTeX engine to compile with
    #[arg(
        long,
        value_name = "ENGINE",
        value_parser = ["pdflatex", "xelatex", "lualatex"],
        default_value = "pdflatex"
    )]
    compiler: String,

    /// Suppress progress messages
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let engine = match CompilerEngine::from_name(&cli.compiler) {
        Some(engine) => engine,
        None => {
            eprintln!("error: unknown compiler: {}", cli.compiler);
            return ExitCode::FAILURE;
        }
    };

    let result = if cli.input.is_dir() {
        run_batch(&cli, engine)
    } else {
        run_single(&cli, engine)
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_single(cli: &Cli, engine: CompilerEngine) -> epub2tex::Result<bool> {
    let converter = Converter::new(&cli.input, cli.output.clone());

    if !cli.quiet {
        println!(
            "Converting {} -> {}",
            cli.input.display(),
            converter.output_path().display()
        );
    }

    let report = converter.convert()?;

    if !cli.quiet {
        println!(
            "Converted {} documents ({} failed), extracted {} images",
            report.documents_converted, report.documents_failed, report.images_extracted
        );
    }

    if cli.compile {
        if !cli.quiet {
            println!("Compiling {} with {}", converter.output_path().display(), engine.binary());
        }
        let built = compile_document(
            converter.output_path(),
            engine,
            DEFAULT_MAX_PASSES,
            DEFAULT_PASS_TIMEOUT,
        )?;
        if !built {
            eprintln!("error: compilation produced no PDF");
            return Ok(false);
        }
    }

    Ok(true)
}

fn run_batch(cli: &Cli, engine: CompilerEngine) -> epub2tex::Result<bool> {
    let (succeeded, failed) =
        process_directory(&cli.input, cli.output.as_deref(), cli.compile, engine)?;

    if !cli.quiet {
        println!("{succeeded} succeeded, {failed} failed");
    }

    Ok(failed == 0)
}

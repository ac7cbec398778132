//! CLI tool for converting PowerPoint decks to PDF.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use slidepdf_render::{ConversionReport, ConvertOptions, Converter, LayoutMode};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Convert PowerPoint decks into page-per-slide PDF files.
#[derive(Parser, Debug)]
#[command(name = "slidepdf")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input PowerPoint file(s) (.pptx)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Output directory (default: same as input file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Page layout
    #[arg(short, long, value_enum, default_value_t = Mode::Shapes)]
    mode: Mode,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// Border, pictures, and text at their slide positions
    Shapes,
    /// Text only
    Text,
}

impl From<Mode> for LayoutMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Shapes => LayoutMode::Shapes,
            Mode::Text => LayoutMode::Text,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    if run(&args) > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Convert every input, reporting problems on stderr. Returns the number of
/// inputs that could not be converted.
fn run(args: &Args) -> usize {
    let converter = Converter::new(ConvertOptions::new().with_mode(args.mode.into()));
    let mut failures = 0;

    for input_path in &args.input {
        if args.verbose {
            eprintln!("Processing: {}", input_path.display());
        }

        match process_file(input_path, args.output.as_ref(), &converter) {
            Ok((output_path, report)) => {
                if args.verbose {
                    eprintln!("  Wrote {} pages", report.pages);
                    eprintln!("Written to: {}", output_path.display());
                }
                if !report.failed_slides.is_empty() {
                    eprintln!(
                        "Warning: {}: slides {:?} could not be read and were replaced by error pages",
                        input_path.display(),
                        report.failed_slides
                    );
                }
            }
            Err(e) => {
                eprintln!("Error processing {}: {:#}", input_path.display(), e);
                failures += 1;
            }
        }
    }

    failures
}

/// Convert a single deck.
fn process_file(
    input_path: &Path,
    output_dir: Option<&PathBuf>,
    converter: &Converter,
) -> Result<(PathBuf, ConversionReport)> {
    let output_path = get_output_path(input_path, output_dir)?;
    log::debug!("Converting {} to {}", input_path.display(), output_path.display());

    let report = converter
        .convert_file(input_path, &output_path)
        .with_context(|| format!("Failed to convert {}", input_path.display()))?;

    Ok((output_path, report))
}

/// Determine the output path for a processed file.
fn get_output_path(input_path: &Path, output_dir: Option<&PathBuf>) -> Result<PathBuf> {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    let output_filename = format!("{}.pdf", stem);

    let output_path = match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
            dir.join(output_filename)
        }
        None => {
            if let Some(parent) = input_path.parent() {
                parent.join(output_filename)
            } else {
                PathBuf::from(output_filename)
            }
        }
    };

    Ok(output_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidepdf_pptx::fixture::{FixtureDeck, FixtureSlide};

    #[test]
    fn test_output_path_next_to_input() {
        let path = get_output_path(Path::new("talks/intro.pptx"), None).unwrap();
        assert_eq!(path, PathBuf::from("talks/intro.pdf"));
    }

    #[test]
    fn test_output_path_in_output_dir() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("out");
        let path = get_output_path(Path::new("talks/intro.pptx"), Some(&dir)).unwrap();
        assert_eq!(path, dir.join("intro.pdf"));
        assert!(dir.is_dir());
    }

    #[test]
    fn test_run_counts_failed_inputs() {
        let root = tempfile::tempdir().unwrap();
        let good = root.path().join("good.pptx");
        let bad = root.path().join("bad.pptx");
        let deck = FixtureDeck::new()
            .slide(FixtureSlide::new().text("Hello", None))
            .build();
        std::fs::write(&good, deck).unwrap();
        std::fs::write(&bad, b"not a zip archive").unwrap();

        let out = root.path().join("pdf");
        let args = Args {
            input: vec![good, bad],
            output: Some(out.clone()),
            mode: Mode::Shapes,
            verbose: false,
        };

        assert_eq!(run(&args), 1);
        assert!(std::fs::read(out.join("good.pdf")).unwrap().starts_with(b"%PDF"));
        assert!(!out.join("bad.pdf").exists());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from(["slidepdf", "-m", "text", "-o", "out", "a.pptx", "b.pptx"])
            .unwrap();
        assert_eq!(args.input.len(), 2);
        assert_eq!(args.output, Some(PathBuf::from("out")));
        assert_eq!(LayoutMode::from(args.mode), LayoutMode::Text);

        assert!(Args::try_parse_from(["slidepdf"]).is_err());
        assert!(Args::try_parse_from(["slidepdf", "-m", "raster", "a.pptx"]).is_err());
    }
}

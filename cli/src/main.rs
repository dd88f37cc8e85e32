//! unoutline CLI - PDF outline extraction tool

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use unoutline::batch::{process_directory_with, BatchEvent};
use unoutline::{BatchOptions, Error, ExtractOptions, JsonFormat, OutlineExtractor};

#[derive(Parser)]
#[command(name = "unoutline")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Infer PDF outlines (title and H1-H3 headings) as JSON", long_about = None)]
struct Cli {
    /// Directory containing PDF files
    #[arg(value_name = "INPUT_DIR", default_value = "input")]
    input: PathBuf,

    /// Directory for the JSON outlines
    #[arg(value_name = "OUTPUT_DIR", default_value = "output")]
    output: PathBuf,

    #[command(flatten)]
    extract: ExtractArgs,

    /// Output compact JSON
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Args)]
struct ExtractArgs {
    /// Per-document time budget in seconds
    #[arg(long, value_name = "SECS", default_value = "10", global = true)]
    max_runtime: f64,

    /// Maximum number of pages scanned per document
    #[arg(long, value_name = "N", default_value = "50", global = true)]
    max_pages: u32,

    /// Order headings top to bottom instead of alphabetically within a page
    #[arg(long, global = true)]
    reading_order: bool,

    /// Skip unreadable pages instead of failing the document
    #[arg(long, global = true)]
    lenient: bool,
}

impl ExtractArgs {
    fn options(&self) -> ExtractOptions {
        let mut options = ExtractOptions::new()
            .with_max_runtime_secs(self.max_runtime)
            .with_max_pages(self.max_pages);
        if self.reading_order {
            options = options.reading_order();
        }
        if self.lenient {
            options = options.lenient();
        }
        options
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the outline of a single PDF
    File {
        /// Input PDF file
        #[arg(value_name = "PDF")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "warn";

fn log_env(filter_var: &str) -> env_logger::Env<'_> {
    env_logger::Env::default().filter_or(filter_var, DEFAULT_LOG_FILTER)
}

fn main() {
    env_logger::Builder::from_env(log_env(env_logger::DEFAULT_FILTER_ENV)).init();

    let cli = Cli::parse();
    let options = cli.extract.options();
    log::debug!("Extract options: {:?}", options);
    let format = if cli.compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let result = match cli.command {
        Some(Commands::File { input, output }) => {
            cmd_file(&input, output.as_deref(), options, format)
        }
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => cmd_batch(&cli.input, &cli.output, options, format),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "[Error]".red().bold(), e);
        process::exit(1);
    }
}

fn cmd_batch(
    input: &Path,
    output: &Path,
    options: ExtractOptions,
    format: JsonFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    if !input.is_dir() {
        return Err(Error::InputNotFound(input.to_path_buf()).into());
    }

    let extractor = OutlineExtractor::new(options);
    let batch_options = BatchOptions::new().with_json_format(format);

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let report = process_directory_with(input, output, &extractor, &batch_options, |event| {
        match event {
            BatchEvent::Started {
                input,
                index,
                total,
            } => {
                if index == 0 {
                    pb.set_length(total as u64);
                }
                let name = file_name(input);
                pb.println(format!("{} Processing: {}", "[Process]".cyan(), name));
                pb.set_message(name);
            }
            BatchEvent::Saved { output, .. } => {
                pb.println(format!(
                    "{} Saved output: {}",
                    "[Process]".cyan(),
                    output.display()
                ));
                pb.inc(1);
            }
            BatchEvent::Failed { input, error } => {
                pb.println(format!(
                    "{} Could not save output for {}: {}",
                    "[Error]".red(),
                    file_name(input),
                    error
                ));
                pb.inc(1);
            }
        }
    })?;
    pb.finish_and_clear();

    if !report.is_success() {
        println!(
            "{} {} of {} outputs could not be written",
            "[Warning]".yellow(),
            report.failed.len(),
            report.total()
        );
    }
    println!("{} Processing complete!", "[Done]".green().bold());

    Ok(())
}

fn cmd_file(
    input: &Path,
    output: Option<&Path>,
    options: ExtractOptions,
    format: JsonFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    if !input.is_file() {
        return Err(format!("File '{}' not found", input.display()).into());
    }

    let outline = OutlineExtractor::new(options).extract(input);
    let json = unoutline::batch::to_json(&outline, format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "unoutline".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF outline extraction tool");
    println!();
    println!("Strategies: bookmarks, layout analysis, text patterns");
    println!("License: MIT");
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

//! svgconv CLI - SVG converter front-end
//!
//! A command-line tool for converting SVG files to raster or vector
//! formats through an installed provider (resvg, Inkscape, rsvg-convert,
//! or CairoSVG).

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use svgconv::{ConvertOutput, ConvertResult, ConverterManager};

/// Verbosity level for logging output.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum Verbosity {
    /// Only log success or failure messages.
    #[default]
    Quiet,
    /// Log basic progress.
    Normal,
    /// Log assembled commands and execution details.
    Verbose,
}

impl Verbosity {
    /// Returns the tracing filter string for this verbosity level.
    fn as_filter(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "svgconv=warn",
            Verbosity::Normal => "svgconv=info",
            Verbosity::Verbose => "svgconv=trace",
        }
    }
}

/// SVG converter front-end
#[derive(Parser, Debug)]
#[command(name = "svgconv")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input SVG file path
    input: PathBuf,

    /// Output file path; defaults to the input name with the format's
    /// extension
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Provider to use (resvg, inkscape, rsvg-convert, cairosvg);
    /// defaults to SVG_CONVERTER_DRIVER or resvg
    #[arg(short, long)]
    provider: Option<String>,

    /// Export format (png, pdf, ...); inferred from the output path when
    /// omitted
    #[arg(short, long)]
    format: Option<String>,

    /// Export width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Export height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Export DPI
    #[arg(long)]
    dpi: Option<u32>,

    /// Background color (hex, rgb(), or rgba() where supported)
    #[arg(long)]
    background: Option<String>,

    /// Background opacity between 0.0 and 1.0
    #[arg(long)]
    background_opacity: Option<f64>,

    /// Process timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Write the result to stdout instead of a file
    #[arg(long)]
    stdout: bool,

    /// Print the provider's version and exit
    #[arg(long)]
    tool_version: bool,

    /// Verbosity level
    #[arg(short, long, value_enum, default_value_t = Verbosity::default())]
    verbosity: Verbosity,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing with the appropriate filter level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(args.verbosity.as_filter())),
        )
        .with_target(false)
        .with_level(true)
        .init();

    if let Err(e) = run(&args) {
        error!("Conversion failed: {}", e);
        if let Some(summary) = e.summary() {
            error!("{}", summary);
        }
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Main conversion logic.
fn run(args: &Args) -> ConvertResult<()> {
    let mut manager = ConverterManager::from_env();

    if let Some(provider) = &args.provider {
        manager.using(provider);
    }

    if args.tool_version {
        println!("{}", manager.version(args.provider.as_deref())?);
        return Ok(());
    }

    info!("Opening input file: {}", args.input.display());
    let mut conv = manager.open(&args.input)?;
    info!("Using provider: {}", conv.provider_name());

    if let Some(format) = &args.format {
        conv = conv.format(format)?;
    }
    if let Some(width) = args.width {
        conv = conv.width(width);
    }
    if let Some(height) = args.height {
        conv = conv.height(height);
    }
    if let Some(dpi) = args.dpi {
        conv = conv.dpi(dpi);
    }
    if let Some(color) = &args.background {
        conv = conv.background(color)?;
    }
    if let Some(opacity) = args.background_opacity {
        conv = conv.background_opacity(opacity)?;
    }
    if let Some(timeout) = args.timeout {
        conv = conv.timeout(timeout);
    }

    if args.stdout {
        let bytes = conv.to_stdout(args.format.as_deref())?;
        io::stdout().write_all(&bytes)?;
        return Ok(());
    }

    if let Some(output) = &args.output {
        let path = conv.to_file(output)?;
        info!("Conversion successful!");
        println!(
            "Successfully converted {} to {}",
            args.input.display(),
            path.display()
        );
        return Ok(());
    }

    match conv.convert(None)? {
        ConvertOutput::Path(path) => {
            info!("Conversion successful!");
            println!(
                "Successfully converted {} to {}",
                args.input.display(),
                path.display()
            );
        }
        ConvertOutput::Bytes(bytes) => {
            io::stdout().write_all(&bytes)?;
        }
    }

    Ok(())
}

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pdfpress_core::{CompressionParams, ParamMode, UploadKind, DPI_RANGE, QUALITY_RANGE};

#[derive(Parser)]
#[command(
    name = "pdfpress",
    about = "Compress PDF files through a pdfpress backend server",
    version,
    after_help = "EXAMPLES:
    pdfpress compress report.pdf
    pdfpress compress report.pdf --dpi 150 --quality 85
    pdfpress compress report.pdf --auto
    pdfpress batch a.pdf b.pdf c.pdf -o compressed/
    pdfpress health"
)]
pub struct Args {
    #[arg(
        long,
        global = true,
        default_value = "http://127.0.0.1:5000",
        help = "Base url of the compression backend"
    )]
    pub server: String,

    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase log verbosity (-v info, -vv debug, -vvv trace)"
    )]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Compress a single PDF file (up to 200 MB)")]
    Compress {
        #[arg(help = "Path of the PDF to compress")]
        input: PathBuf,

        #[arg(
            short,
            long,
            value_parser = parse_dpi,
            help = "Image resolution in DPI, 100-200 (default: 100)"
        )]
        dpi: Option<u16>,

        #[arg(
            short,
            long,
            value_parser = parse_quality,
            help = "JPEG quality, 60-95 (default: 75)"
        )]
        quality: Option<u8>,

        #[arg(
            long,
            conflicts_with_all = ["dpi", "quality"],
            help = "Let the backend pick settings per document"
        )]
        auto: bool,

        #[arg(
            short,
            long,
            default_value = "compressed",
            help = "Directory for downloaded results"
        )]
        output: PathBuf,

        #[arg(long, help = "Skip downloading the compressed file")]
        no_download: bool,
    },

    #[command(about = "Compress up to 50 PDF files in one batch (600 MB each)")]
    Batch {
        #[arg(required = true, help = "Paths of the PDFs to compress")]
        inputs: Vec<PathBuf>,

        #[arg(
            short,
            long,
            value_parser = parse_dpi,
            help = "Image resolution in DPI, 100-200 (default: 150)"
        )]
        dpi: Option<u16>,

        #[arg(
            short,
            long,
            value_parser = parse_quality,
            help = "JPEG quality, 60-95 (default: 85)"
        )]
        quality: Option<u8>,

        #[arg(
            long,
            conflicts_with_all = ["dpi", "quality"],
            help = "Let the backend pick settings per document"
        )]
        auto: bool,

        #[arg(
            short,
            long,
            default_value = "compressed",
            help = "Directory for downloaded results"
        )]
        output: PathBuf,

        #[arg(long, help = "Skip downloading the compressed files")]
        no_download: bool,
    },

    #[command(about = "Check that the backend is up")]
    Health,
}

/// Resolves the flags into upload parameters. Absent manual values fall back
/// to the variant defaults; `--auto` wins outright.
pub fn param_mode(kind: UploadKind, auto: bool, dpi: Option<u16>, quality: Option<u8>) -> ParamMode {
    if auto {
        return ParamMode::Auto;
    }
    let defaults = CompressionParams::defaults_for(kind);
    ParamMode::Manual(CompressionParams {
        dpi: dpi.unwrap_or(defaults.dpi),
        quality: quality.unwrap_or(defaults.quality),
    })
}

fn parse_dpi(value: &str) -> Result<u16, String> {
    let dpi: u16 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    if DPI_RANGE.contains(&dpi) {
        Ok(dpi)
    } else {
        Err(format!(
            "dpi must be between {} and {}",
            DPI_RANGE.start(),
            DPI_RANGE.end()
        ))
    }
}

fn parse_quality(value: &str) -> Result<u8, String> {
    let quality: u8 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number"))?;
    if QUALITY_RANGE.contains(&quality) {
        Ok(quality)
    } else {
        Err(format!(
            "quality must be between {} and {}",
            QUALITY_RANGE.start(),
            QUALITY_RANGE.end()
        ))
    }
}

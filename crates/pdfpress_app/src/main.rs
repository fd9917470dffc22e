mod cli;
mod controller;
mod render;

use clap::Parser;
use pdfpress_core::UploadKind;

use crate::cli::{Args, Commands};
use crate::controller::RunConfig;

fn main() {
    let args = Args::parse();
    client_logging::initialize_for_app(args.verbose);

    let outcome = match args.command {
        Commands::Compress {
            input,
            dpi,
            quality,
            auto,
            output,
            no_download,
        } => controller::run(RunConfig {
            server: args.server,
            kind: UploadKind::Single,
            inputs: vec![input],
            mode: cli::param_mode(UploadKind::Single, auto, dpi, quality),
            output_dir: output,
            no_download,
        }),
        Commands::Batch {
            inputs,
            dpi,
            quality,
            auto,
            output,
            no_download,
        } => controller::run(RunConfig {
            server: args.server,
            kind: UploadKind::Batch,
            inputs,
            mode: cli::param_mode(UploadKind::Batch, auto, dpi, quality),
            output_dir: output,
            no_download,
        }),
        Commands::Health => controller::health(args.server),
    };

    match outcome {
        Ok(summary) if summary.is_clean() => {}
        Ok(_) => std::process::exit(1),
        Err(error) => {
            eprintln!("Error: {error:#}");
            std::process::exit(1);
        }
    }
}

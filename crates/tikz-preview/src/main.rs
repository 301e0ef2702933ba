//! TikZ preview CLI - Main entry point

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "tikz-preview")]
#[command(version)]
#[command(about = "Compile TikZ pictures in isolation for inline preview", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the TikZ picture at a cursor position and write the PDF
    Preview {
        /// Input .tex file
        input: String,

        /// 1-based cursor line inside the picture
        #[arg(short, long)]
        line: usize,

        /// 0-based cursor column
        #[arg(long, default_value_t = 0)]
        column: usize,

        /// Write the PDF to FILE (defaults to <input stem>-tikz.pdf)
        #[arg(short, long)]
        output: Option<String>,

        /// TeX root file governing the preamble
        #[arg(long)]
        root: Option<String>,

        /// Compile timeout in milliseconds
        #[arg(long, default_value_t = 60_000)]
        timeout_ms: u64,

        /// Emit the failure record as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Suppress console output
        #[arg(long)]
        quiet: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tikz_preview=info,tikz_preview_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Preview {
            input,
            line,
            column,
            output,
            root,
            timeout_ms,
            json,
            quiet,
        } => commands::preview::execute(commands::preview::PreviewArgs {
            input,
            line,
            column,
            output,
            root,
            timeout_ms,
            json,
            quiet,
        }),
    }
}

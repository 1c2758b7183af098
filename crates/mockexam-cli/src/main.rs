//! mockexam CLI: take timed mock exams in the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod terminal;

#[derive(Parser)]
#[command(name = "mockexam", version, about = "Timed multiple-choice mock exams")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take an exam
    Run {
        /// Path to the .toml exam plan
        #[arg(long)]
        plan: PathBuf,

        /// Directory holding the chapter banks
        #[arg(long, conflicts_with = "base_url")]
        banks: Option<PathBuf>,

        /// Base URL serving the chapter banks
        #[arg(long)]
        base_url: Option<String>,

        /// Sampling seed, for a repeatable exam
        #[arg(long)]
        seed: Option<u64>,

        /// Hide questions at once on submission
        #[arg(long)]
        reduced_motion: bool,

        /// Output directory for reports
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, all
        #[arg(long, default_value = "json")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check a plan against its chapter banks
    Validate {
        /// Path to the .toml exam plan
        #[arg(long)]
        plan: PathBuf,

        /// Directory holding the chapter banks
        #[arg(long, conflicts_with = "base_url")]
        banks: Option<PathBuf>,

        /// Base URL serving the chapter banks
        #[arg(long)]
        base_url: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config, plan and question banks
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mockexam=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            plan,
            banks,
            base_url,
            seed,
            reduced_motion,
            output,
            format,
            config,
        } => {
            commands::run::execute(
                plan,
                banks,
                base_url,
                seed,
                reduced_motion,
                output,
                format,
                config,
            )
            .await
        }
        Commands::Validate {
            plan,
            banks,
            base_url,
            config,
        } => commands::validate::execute(plan, banks, base_url, config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

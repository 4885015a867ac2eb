use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "modr")]
#[command(about = "Moderation & settlement engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order over the built-in defaults (none = defaults only)
        paths: Vec<String>,
    },

    /// Evaluate a roster against the consensus rules and print the result JSON
    Evaluate {
        /// JSON file: class, participants, winc_per_reference_unit, opened_at, now?
        #[arg(long)]
        input: String,

        /// Layered config paths in merge order
        #[arg(long = "config")]
        config_paths: Vec<String>,
    },

    /// Settle a terminal decision and print the settlement JSON
    Settle {
        /// JSON file: class, decision, parties, participants
        #[arg(long)]
        input: String,

        /// Layered config paths in merge order
        #[arg(long = "config")]
        config_paths: Vec<String>,
    },

    /// Apply a super-moderator override, then settle
    Override {
        /// JSON file: class, community, request, parties, participants
        #[arg(long)]
        input: String,

        /// Layered config paths in merge order
        #[arg(long = "config")]
        config_paths: Vec<String>,
    },
}

fn main() -> Result<()> {
    // Load .env.local if present (dev convenience); silent when absent.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::ConfigHash { paths } => {
            let loaded = commands::load_config(&paths)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::Evaluate {
            input,
            config_paths,
        } => {
            let loaded = commands::load_config(&config_paths)?;
            let out = commands::evaluate::run(&loaded, &input)?;
            commands::print_json(&out)?;
        }

        Commands::Settle {
            input,
            config_paths,
        } => {
            let loaded = commands::load_config(&config_paths)?;
            let out = commands::settle::run_settle(&loaded, &input)?;
            commands::print_json(&out)?;
        }

        Commands::Override {
            input,
            config_paths,
        } => {
            let loaded = commands::load_config(&config_paths)?;
            let out = commands::settle::run_override(&loaded, &input)?;
            commands::print_json(&out)?;
        }
    }

    Ok(())
}

/// Logs go to stderr; stdout carries only command output.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

mod cli;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

/// Plinth: check plugin manifests and dry-run their load order
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// More log output on stderr (-v info, -vv debug). RUST_LOG overrides this.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse and validate plugin manifests
    Validate {
        /// Manifest files (.json, .toml, .yaml or .yml)
        #[arg(required = true)]
        manifests: Vec<PathBuf>,
    },
    /// Load manifests in the given order onto an empty target, then unload plugins
    Simulate {
        /// Manifest files, loaded in this order
        #[arg(required = true)]
        manifests: Vec<PathBuf>,
        /// `group:name` of a plugin to unload after loading; repeatable
        #[arg(long = "unload", value_name = "ID")]
        unload: Vec<String>,
    },
    /// Compare two version strings
    Compare {
        a: String,
        b: String,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logging(args.verbose);

    let result = match args.command {
        Commands::Validate { manifests } => Ok(cli::validate(&manifests)),
        Commands::Simulate { manifests, unload } => cli::simulate(&manifests, &unload),
        Commands::Compare { a, b } => cli::compare(&a, &b).map(|()| true),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

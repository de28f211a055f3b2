//! memlens - decode binary memory dumps using the C headers that describe them
//!
//! Usage:
//!   memlens decode -t <TYPE> -b <BINARY> -I <DIR>...   Decode a dump as TYPE
//!   memlens types -I <DIR>...                          Show the extracted types
//!   memlens types -I <DIR>... --name <TYPE>            Show one type's layout

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod discovery;

#[derive(Parser)]
#[command(name = "memlens")]
#[command(about = "Decode binary memory dumps using C header type definitions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

/// Where to find header files.
#[derive(clap::Args)]
pub struct HeaderArgs {
    /// Include directory: searched for *.h files and for #include "..."
    #[arg(short = 'I', long = "include", value_name = "DIR")]
    pub include: Vec<PathBuf>,

    /// Extra header file to parse after the include directories
    #[arg(short = 'f', long = "header", value_name = "HEADER")]
    pub headers: Vec<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a binary dump as a struct or union
    Decode {
        /// Name of the root struct or union
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        type_name: String,

        /// Path to the binary dump
        #[arg(short, long, value_name = "BINARY")]
        binary: PathBuf,

        #[command(flatten)]
        headers: HeaderArgs,

        /// Print the decoded tree as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the types extracted from the headers
    Types {
        #[command(flatten)]
        headers: HeaderArgs,

        /// Show a single type
        #[arg(short, long, value_name = "TYPE")]
        name: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Install the log subscriber. `RUST_LOG` takes precedence over `-v`.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Decode {
            type_name,
            binary,
            headers,
            json,
        } => commands::handle_decode_command(&type_name, &binary, &headers, json),
        Commands::Types {
            headers,
            name,
            json,
        } => commands::handle_types_command(&headers, name.as_deref(), json),
    }
}

//! `rel`: inspect and clean persisted release state.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use rel_core::codec;
use rel_core::descriptor::Descriptor;
use rel_core::store::DescriptorStore;

#[derive(Parser)]
#[command(name = "rel", about = "Inspect and clean resumable release state", version)]
struct Cli {
    /// Working directory holding the release state file.
    #[arg(long, default_value = ".", global = true)]
    dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the persisted release state.
    Show {
        /// Output format.
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Delete the release state file, abandoning any resumable progress.
    Clean,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let store = DescriptorStore::new();
    let anchor = Descriptor {
        working_directory: Some(cli.dir.display().to_string()),
        ..Descriptor::default()
    };

    match &cli.command {
        Command::Show { format } => {
            let descriptor = store.read_working_directory(&anchor)?;
            match format {
                Format::Text => print!("{}", codec::encode(&descriptor)),
                Format::Json => println!("{}", serde_json::to_string_pretty(&descriptor)?),
            }
        }
        Command::Clean => store.delete(&anchor)?,
    }

    Ok(())
}

//! rawgd-export - RAWGD asset export tool
//!
//! Converts OBJ or JSON meshes to compact .rawgd buffers and inspects
//! existing ones.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rawgd::RAWGD_EXT;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use rawgd_export::{convert_mesh, dump_file, inspect_file};

#[derive(Parser)]
#[command(name = "rawgd-export")]
#[command(about = "RAWGD mesh export tool")]
#[command(version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a single mesh file
    Mesh {
        /// Input mesh file (OBJ/JSON)
        input: PathBuf,

        /// Output .rawgd file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print header and size information for a .rawgd file
    Info {
        /// Input .rawgd file
        input: PathBuf,
    },

    /// Decode a .rawgd file to JSON
    Dump {
        /// Input .rawgd file
        input: PathBuf,

        /// Output .json file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    // RUST_LOG takes precedence over the -v default
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Mesh { input, output } => {
            let output = output.unwrap_or_else(|| input.with_extension(RAWGD_EXT));
            tracing::info!("Converting {:?} -> {:?}", input, output);
            convert_mesh(&input, &output)?;
            tracing::info!("Done!");
        }

        Commands::Info { input } => {
            tracing::debug!("Inspecting {:?}", input);
            let info = inspect_file(&input)?;
            println!("{info}");
        }

        Commands::Dump {
            input,
            output,
            pretty,
        } => {
            let json = dump_file(&input, pretty)?;
            match output {
                Some(output) => {
                    std::fs::write(&output, json)
                        .with_context(|| format!("Failed to write output: {:?}", output))?;
                    tracing::info!("Wrote {:?}", output);
                }
                None => println!("{json}"),
            }
        }
    }

    Ok(())
}

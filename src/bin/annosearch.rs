//! Command-line client for the annosearch service.
//!
//! ```text
//! annosearch search 'tag:climate AND NOT creator:"jane@example.org"' --format ttl
//! annosearch targets climate
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use annosearch::ipc::{IpcClient, Response, DEFAULT_ADDR};

#[derive(Parser)]
#[command(name = "annosearch", about = "Search and export annotations")]
struct Cli {
    /// Address of a running annosearch-service.
    #[arg(long, global = true, default_value = DEFAULT_ADDR)]
    addr: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a search expression and print the exported results.
    Search {
        expression: String,
        /// Export format: jsonld, rdf or ttl.
        #[arg(long, short)]
        format: Option<String>,
        /// Save the export to a timestamped file in this directory.
        #[arg(long)]
        download: Option<PathBuf>,
    },
    /// List the targets of annotations carrying a tag.
    Targets { tag: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let client = IpcClient::new(cli.addr);

    let (response, download_dir) = match cli.command {
        Command::Search {
            expression,
            format,
            download,
        } => {
            let response = client
                .search(&expression, format.as_deref(), download.is_some())
                .await?;
            (response, download)
        }
        Command::Targets { tag } => (client.targets(&tag).await?, None),
    };

    match response {
        Response::Export(export) => match (download_dir, export.filename) {
            (Some(dir), Some(filename)) => {
                let path = dir.join(filename);
                std::fs::write(&path, &export.body)?;
                eprintln!("{} annotations written to {}", export.count, path.display());
            }
            _ => print!("{}", export.body),
        },
        Response::Targets(targets) => {
            println!("{}", serde_json::to_string_pretty(&targets.targets)?);
        }
        Response::Error(error) => {
            eprintln!("{}", serde_json::to_string_pretty(&error)?);
            return Ok(ExitCode::FAILURE);
        }
    }

    Ok(ExitCode::SUCCESS)
}

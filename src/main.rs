use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use discord_alert_resource::{logging, out, BuildMetadata, CheckResponse, InResponse, OutContext, OutRequest};

#[derive(Parser)]
#[command(name = "discord-alert-resource")]
#[command(about = "Concourse resource that sends build alerts to Discord")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Report versions (always none)
    Check,

    /// Fetch the resource (no-op)
    In {
        /// Destination directory
        dir: PathBuf,
    },

    /// Send an alert; reads the request JSON from stdin
    Out {
        /// Directory containing the build's inputs
        dir: PathBuf,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse_from(args());
    logging::init(cli.verbose);

    match cli.command {
        Commands::Check => write_response(&CheckResponse::new()),
        Commands::In { .. } => write_response(&InResponse::default()),
        Commands::Out { dir } => cmd_out(dir),
    }
}

/// Concourse runs `/opt/resource/{check,in,out}`. When those are links to this
/// binary, the link name selects the subcommand.
fn args() -> Vec<OsString> {
    let mut args: Vec<OsString> = std::env::args_os().collect();
    let invoked_as = args
        .first()
        .and_then(|arg| Path::new(arg).file_name())
        .and_then(|name| name.to_str())
        .map(str::to_string);

    if let Some(name @ ("check" | "in" | "out")) = invoked_as.as_deref() {
        args.insert(1, OsString::from(name));
    }
    args
}

#[tokio::main]
async fn cmd_out(dir: PathBuf) -> Result<()> {
    let request = OutRequest::from_reader(io::stdin().lock()).context("error reading stdin")?;

    let metadata = BuildMetadata::from_env(&request.source.concourse_url);
    let ctx = OutContext::new(metadata, dir);

    let response = out(&request, &ctx).await?;
    write_response(&response)
}

fn write_response<T: Serialize>(response: &T) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer(&mut handle, response).context("error writing stdout")?;
    handle.write_all(b"\n").context("error writing stdout")?;
    Ok(())
}

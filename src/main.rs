//! nanos - shape JSON documents from the command line
//!
//! Reads a JSON document from a file or stdin, drops empty members and
//! optionally keys the records by their `id`.

use anyhow::{Context, Result};
use clap::Parser;
use nanos::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[command(
    name = "nanos",
    version,
    about = "Remove empty members from a JSON document and print the result"
)]
struct Args {
    /// Key the record(s) by their "id" field first
    #[arg(long)]
    idfy: bool,

    /// JSON file to read; stdin when missing or `-`
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,
}

impl Args {
    fn input_path(&self) -> Option<&Path> {
        self.input.as_deref().filter(|path| *path != Path::new("-"))
    }
}

async fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut raw = String::new();
            tokio::io::stdin()
                .read_to_string(&mut raw)
                .await
                .context("failed to read stdin")?;
            Ok(raw)
        }
    }
}

fn shape(document: Value, key_by_id: bool) -> NanosResult<Value> {
    let document = if key_by_id {
        keyed_to_json(idfy_value(document)?)?
    } else {
        document
    };
    Ok(remove_empty_members(document).unwrap_or(Value::Null))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let args = Args::parse();

    // Load configuration
    let config = CONFIG.clone();
    config.validate()?;

    // Initialize logging
    let _logging_guard = utils::setup_logging(&config.logging())?;
    debug!("Configuration: {:?}", config);

    let mut timer = Timer::from_config(&config);
    let raw = timer.time_async(read_input(args.input_path())).await?;
    info!(
        "Read {} in {}",
        size(raw.len() as u128, config.size_precision),
        timer
    );

    let document: Value = serde_json::from_str(&raw).context("input is not valid JSON")?;
    let shaped = timer.time(|| shape(document, args.idfy))?;
    info!("Shaped document in {}", timer);

    println!("{}", serde_json::to_string_pretty(&shaped)?);
    Ok(())
}

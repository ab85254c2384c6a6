//! mini-pager CLI: paginate a JSON job and print the outcome
//!
//! The main interface is the library and its WASM bindings; this binary is
//! for fixtures and debugging.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;

use mini_pager::{
    paginate, Document, HeightMap, PageSetup, PaginationCache, PaginationConfig,
    PaginationError, PassOutcome,
};

#[derive(Parser)]
#[command(name = "mini-pager")]
#[command(version)]
#[command(about = "Paginate a screenplay document given measured block heights", long_about = None)]
struct Cli {
    /// JSON job file (stdin if not specified)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Pretty-print the outcome
    #[arg(long)]
    pretty: bool,

    /// Re-run with the emitted heights and fail unless nothing changes
    #[arg(long)]
    verify: bool,
}

/// One pagination request
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Job {
    document: Document,
    heights: HeightMap,
    cursor: Option<usize>,
    setup: PageSetup,
    config: PaginationConfig,
}

fn read_job(input: Option<&Path>) -> mini_pager::Result<Job> {
    let json = match input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    Ok(serde_json::from_str(&json)?)
}

fn run(cli: &Cli) -> mini_pager::Result<String> {
    let job = read_job(cli.input.as_deref())?;
    let mut cache = PaginationCache::new(job.config.sentence_cache_capacity);

    let outcome = paginate(
        &job.document,
        &job.heights,
        job.cursor,
        &job.setup,
        &job.config,
        &mut cache,
    )?;

    if cli.verify {
        if let PassOutcome::Repaginated {
            document, heights, ..
        } = &outcome
        {
            let again = paginate(document, heights, None, &job.setup, &job.config, &mut cache)?;
            if !again.is_unchanged() {
                return Err(PaginationError::Internal(
                    "second pass changed the document".to_string(),
                ));
            }
            log::info!("second pass is a no-op");
        }
    }

    let json = if cli.pretty {
        serde_json::to_string_pretty(&outcome)?
    } else {
        serde_json::to_string(&outcome)?
    };
    Ok(json)
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

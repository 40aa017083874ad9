use std::io;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use reqwest::Client;

use crate::conflict::ConflictDecision;
use crate::error::Error;
use crate::resolver::ResolvedSnippet;

mod config;
mod conflict;
mod downloader;
mod error;
mod fallback;
mod resolver;
mod utils;

#[derive(Parser)]
#[command(version, about = "Download a shared code snippet into the current directory")]
struct Args {
    #[clap(long, help = "Enable debug mode")]
    debug: bool,
    #[clap(required = true, help = "Snippet id or snippet URL")]
    snippet: String,
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Saved { path: PathBuf, bytes: u64 },
    Cancelled,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::builder()
        .filter_level(log_level)
        .parse_default_env()
        .init();

    let client = utils::build_client().context("Failed to build HTTP client")?;
    let dir = std::env::current_dir().context("Failed to determine the current directory")?;

    let result = save_snippet(&client, &args.snippet, &dir, |dir, filename| {
        tokio::task::block_in_place(|| conflict::resolve_interactively(dir, filename))
    })
    .await;

    match result {
        Ok(Outcome::Saved { path, bytes }) => {
            log::info!("Saved {} ({} bytes)", path.display(), bytes);
        }
        Ok(Outcome::Cancelled) => log::info!("Download cancelled"),
        Err(err) => {
            report_failure(err, fallback::open_in_browser);
            process::exit(1);
        }
    }

    Ok(())
}

async fn save_snippet<C>(
    client: &Client,
    input: &str,
    dir: &Path,
    resolve_conflict: C,
) -> Result<Outcome, Error>
where
    C: FnOnce(&Path, &str) -> Result<ConflictDecision, Error>,
{
    let snippet = resolver::resolve(input)?;
    log::debug!(
        "Resolved snippet {} on {}",
        snippet.snippet_id,
        snippet.base_url
    );
    save_resolved(client, &snippet, dir, resolve_conflict).await
}

async fn save_resolved<C>(
    client: &Client,
    snippet: &ResolvedSnippet,
    dir: &Path,
    resolve_conflict: C,
) -> Result<Outcome, Error>
where
    C: FnOnce(&Path, &str) -> Result<ConflictDecision, Error>,
{
    let meta = utils::get_file_meta(client, snippet).await?;
    let filename = resolver::derive_filename(&meta.download_url, &snippet.snippet_id);
    if let Some(name) = meta.name.as_deref().filter(|name| *name != filename) {
        log::debug!("Server names the file {}, saving as {}", name, filename);
    }

    let (filename, overwrite) = if dir.join(&filename).exists() {
        let decision = resolve_conflict(dir, &filename)?;
        log::debug!("Conflict on {} resolved as {:?}", filename, decision);
        let overwrite = decision.allows_overwrite();
        match decision.into_filename() {
            Some(filename) => (filename, overwrite),
            None => return Ok(Outcome::Cancelled),
        }
    } else {
        (filename, false)
    };

    let path = dir.join(filename);
    let bytes = downloader::download_file(client, &meta.download_url, &path, overwrite).await?;
    Ok(Outcome::Saved { path, bytes })
}

/// Logs a failed run. Metadata fetch failures also point the user at the API URL.
fn report_failure<F>(err: Error, open: F)
where
    F: FnOnce(&str) -> io::Result<()>,
{
    let fallback_url = match &err {
        Error::MetadataFetch { api_url, .. } => Some(api_url.clone()),
        _ => None,
    };

    log::error!("Error: {:#}", anyhow::Error::new(err));

    if let Some(api_url) = fallback_url {
        fallback::open_api_url(&api_url, open);
    }
}

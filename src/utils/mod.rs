use std::path::Path;

use reqwest::Client;
use serde::Deserialize;
use tokio::fs::{File, OpenOptions};

use crate::config::{CONNECT_TIMEOUT, USER_AGENT};
use crate::error::{Error, Result};
use crate::resolver::ResolvedSnippet;

pub fn build_client() -> reqwest::Result<Client> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
}

#[derive(Debug, Deserialize)]
struct FileResponse {
    file: Option<FileMeta>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileMeta {
    download_url: Option<String>,
    #[serde(alias = "fileName")]
    name: Option<String>,
}

/// Metadata for a snippet that has a usable download URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub download_url: String,
    pub name: Option<String>,
}

pub async fn get_file_meta(client: &Client, snippet: &ResolvedSnippet) -> Result<FileMetadata> {
    let api_url = snippet.api_url();
    log::debug!("Fetching metadata from {}", api_url);

    let network_error = |err: reqwest::Error| {
        log::debug!("Metadata request failed: {}", err);
        Error::MetadataFetch {
            status: "network error".to_string(),
            api_url: api_url.clone(),
        }
    };

    let response = client.get(&api_url).send().await.map_err(network_error)?;

    if !response.status().is_success() {
        return Err(Error::MetadataFetch {
            status: format!("HTTP {}", response.status().as_u16()),
            api_url: api_url.clone(),
        });
    }

    let body = response.bytes().await.map_err(network_error)?;
    let decoded: FileResponse = serde_json::from_slice(&body).map_err(|err| {
        log::debug!("Could not decode metadata: {}", err);
        Error::EmptyResponse
    })?;

    let meta = decoded.file.ok_or(Error::EmptyResponse)?;
    let download_url = meta
        .download_url
        .filter(|url| !url.trim().is_empty())
        .ok_or(Error::EmptyResponse)?;

    log::debug!(
        "File metadata - Download URL: {}, Name: {}",
        download_url,
        meta.name.as_deref().unwrap_or("-")
    );

    Ok(FileMetadata {
        download_url,
        name: meta.name,
    })
}

/// Opens the download target. Only an explicit overwrite may truncate an existing file;
/// otherwise the file must not exist yet.
pub async fn create_output_file(output_path: &Path, overwrite: bool) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true);
    if overwrite {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    options.open(output_path).await
}

//! Turning user input into a snippet address, and a download URL into a local filename.

use percent_encoding::percent_decode_str;
use url::Url;

use crate::config::{self, API_FILES_PATH, FALLBACK_FILENAME_PREFIX};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSnippet {
    pub snippet_id: String,
    pub base_url: String,
}

impl ResolvedSnippet {
    pub fn api_url(&self) -> String {
        format!("{}{}/{}", self.base_url, API_FILES_PATH, self.snippet_id)
    }
}

/// Resolves a bare snippet id or a snippet URL on one of the allowed domains.
///
/// Bare ids (no `://` and no `/`) are paired with the default domain. URLs must use an
/// allowed host and carry a non-empty path; exactly one leading `/` is stripped from the
/// path to form the id.
pub fn resolve(input: &str) -> Result<ResolvedSnippet> {
    let input = input.trim();
    if input.is_empty() {
        return Err(Error::InvalidInput("snippet id must not be empty".to_string()));
    }

    if !input.contains("://") && !input.contains('/') {
        return Ok(ResolvedSnippet {
            snippet_id: input.to_string(),
            base_url: config::default_base_url(),
        });
    }

    let url = Url::parse(input)
        .map_err(|err| Error::InvalidInput(format!("could not parse {input:?} as a URL: {err}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::InvalidInput(format!(
            "unsupported scheme {:?}, expected http or https",
            url.scheme()
        )));
    }

    let host = url.host_str().unwrap_or_default();
    if !config::is_allowed_host(host) {
        return Err(Error::InvalidInput(format!(
            "unsupported host {host:?}, expected one of: {}",
            config::ALLOWED_DOMAINS.join(", ")
        )));
    }

    let path = url.path();
    let snippet_id = path.strip_prefix('/').unwrap_or(path);
    if snippet_id.is_empty() {
        return Err(Error::InvalidInput(format!("no snippet id in {input:?}")));
    }

    Ok(ResolvedSnippet {
        snippet_id: snippet_id.to_string(),
        base_url: url.origin().ascii_serialization(),
    })
}

/// Picks the local filename for a download: the last path segment of the URL, decoded, or
/// `dropcode-{snippet_id}` when there isn't a usable one.
pub fn derive_filename(download_url: &str, snippet_id: &str) -> String {
    Url::parse(download_url)
        .ok()
        .and_then(|url| {
            url.path_segments()?
                .filter(|segment| !segment.is_empty())
                .last()
                .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned())
        })
        .filter(|name| {
            !name.is_empty()
                && name != "."
                && name != ".."
                && !name.contains(['/', '\\', '\0'])
        })
        .unwrap_or_else(|| format!("{FALLBACK_FILENAME_PREFIX}{snippet_id}"))
}

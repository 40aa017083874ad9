use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("failed to fetch file metadata from {api_url} ({status})")]
    MetadataFetch { status: String, api_url: String },

    #[error("the server response did not include a download URL")]
    EmptyResponse,

    #[error("failed to download {}", .path.display())]
    Download {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("prompt I/O failed: {0}")]
    PromptIo(#[from] io::Error),
}

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

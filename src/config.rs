use std::time::Duration;

/// Hosts accepted as snippet services. The first entry is used for bare ids.
pub const ALLOWED_DOMAINS: &[&str] = &["dropcode.dev", "www.dropcode.dev", "dropcode.app"];

pub const API_FILES_PATH: &str = "/api/files";

/// Prefix for the filename used when the download URL has no usable segment.
pub const FALLBACK_FILENAME_PREFIX: &str = "dropcode-";

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub const USER_AGENT: &str = concat!("dropcode/", env!("CARGO_PKG_VERSION"));

pub fn default_base_url() -> String {
    format!("https://{}", ALLOWED_DOMAINS[0])
}

pub fn is_allowed_host(host: &str) -> bool {
    ALLOWED_DOMAINS
        .iter()
        .any(|domain| domain.eq_ignore_ascii_case(host))
}

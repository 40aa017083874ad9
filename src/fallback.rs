use std::io;

/// Points the user at the API URL after a failed metadata fetch, opening it in the browser
/// when possible and printing it otherwise.
pub fn open_api_url<F>(api_url: &str, open: F)
where
    F: FnOnce(&str) -> io::Result<()>,
{
    log::info!("Opening {} in your browser", api_url);
    if let Err(err) = open(api_url) {
        log::warn!("Could not open a browser: {}", err);
        eprintln!("Please open this URL manually:\n\n{}\n", api_url);
    }
}

pub fn open_in_browser(url: &str) -> io::Result<()> {
    webbrowser::open(url)
}

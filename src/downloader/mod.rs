use std::path::{Path, PathBuf};

use futures::StreamExt;
use reqwest::Client;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{BoxError, Error, Result};
use crate::utils::create_output_file;

/// Streams `url` into `output_path` and returns the number of bytes written.
///
/// Without `overwrite` the target must not exist when it is opened, and a partially written
/// file is removed when the transfer fails. With `overwrite` the body goes to a partial file
/// next to the target, which replaces the target only once the transfer completes.
pub async fn download_file(
    client: &Client,
    url: &str,
    output_path: &Path,
    overwrite: bool,
) -> Result<u64> {
    let fail = |source: BoxError| Error::Download {
        path: output_path.to_path_buf(),
        source,
    };

    log::debug!("Downloading {} to {}", url, output_path.display());

    let response = client
        .get(url)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|err| fail(err.into()))?;

    let write_path = if overwrite {
        partial_path(output_path)
    } else {
        output_path.to_path_buf()
    };

    let output_file = create_output_file(&write_path, overwrite)
        .await
        .map_err(|err| fail(err.into()))?;

    let result = match write_body(response, output_file).await {
        Ok(written) if overwrite => fs::rename(&write_path, output_path)
            .await
            .map(|()| written)
            .map_err(BoxError::from),
        other => other,
    };

    match result {
        Ok(written) => Ok(written),
        Err(err) => {
            remove_partial(&write_path).await;
            Err(fail(err))
        }
    }
}

fn partial_path(output_path: &Path) -> PathBuf {
    let name = output_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_path.with_file_name(format!(".{name}.part"))
}

async fn remove_partial(path: &Path) {
    if let Err(err) = fs::remove_file(path).await {
        log::warn!("Failed to remove partial file {}: {}", path.display(), err);
    }
}

async fn write_body(
    response: reqwest::Response,
    mut output_file: fs::File,
) -> std::result::Result<u64, BoxError> {
    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        output_file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    output_file.flush().await?;
    log::debug!("Wrote {} bytes", written);
    Ok(written)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::utils::build_client;
    use crate::utils::test_server::{serve, Reply};

    #[tokio::test]
    async fn streams_body_to_new_file() {
        let base_url = serve(vec![Reply::new(200, "export const x = 1;\n")]).await;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.ts");

        let written = download_file(
            &build_client().unwrap(),
            &format!("{base_url}/f/x.ts"),
            &path,
            false,
        )
        .await
        .unwrap();

        assert_eq!(written, 20);
        assert_eq!(fs::read_to_string(&path).unwrap(), "export const x = 1;\n");
    }

    #[tokio::test]
    async fn replace_overwrites_existing_file() {
        let base_url = serve(vec![Reply::new(200, "new")]).await;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "old contents").unwrap();

        download_file(&build_client().unwrap(), &base_url, &path, true)
            .await
            .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn does_not_overwrite_a_file_that_appeared_after_the_check() {
        let base_url = serve(vec![Reply::new(200, "new")]).await;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes (2).txt");
        fs::write(&path, "someone else's").unwrap();

        let err = download_file(&build_client().unwrap(), &base_url, &path, false)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Download { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "someone else's");
    }

    #[tokio::test]
    async fn failed_replace_keeps_the_existing_file() {
        let base_url = serve(vec![Reply::truncated(200, "par", 100)]).await;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "old contents").unwrap();

        let err = download_file(&build_client().unwrap(), &base_url, &path, true)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Download { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "old contents");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn failed_new_download_removes_the_partial_file() {
        let base_url = serve(vec![Reply::truncated(200, "par", 100)]).await;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.ts");

        let err = download_file(&build_client().unwrap(), &base_url, &path, false)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Download { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn partial_file_sits_next_to_the_target() {
        assert_eq!(
            partial_path(Path::new("/tmp/work/notes.txt")),
            Path::new("/tmp/work/.notes.txt.part")
        );
    }

    #[tokio::test]
    async fn http_error_leaves_no_file() {
        let base_url = serve(vec![Reply::new(404, "missing")]).await;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.ts");

        let err = download_file(&build_client().unwrap(), &base_url, &path, false)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Download { .. }));
        assert!(!path.exists());
    }
}

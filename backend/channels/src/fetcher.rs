//! Size-gated download of platform files.

use std::path::{Path, PathBuf};
use std::time::Duration;

use logging::redact_sensitive_data;
use markbot_core::{MediaKind, RemoteFile, SizeLimits, StampError, StampResult};
use reqwest::StatusCode;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::transport::ChatApi;

/// Resolves file ids, enforces the per-kind ceiling, and streams files to disk.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    client: reqwest::Client,
    file_base_url: String,
    limits: SizeLimits,
    timeout: Duration,
}

impl FileFetcher {
    /// `api_url` is the Bot API root; files live under `<api_url>/file/bot<token>/`.
    pub fn new(api_url: &str, bot_token: &str, limits: SizeLimits, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            file_base_url: format!("{}/file/bot{}", api_url.trim_end_matches('/'), bot_token),
            limits,
            timeout,
        }
    }

    pub fn limits(&self) -> SizeLimits {
        self.limits
    }

    /// Look up the file and reject it before any transfer if it is over the ceiling.
    pub async fn resolve(
        &self,
        api: &dyn ChatApi,
        file_id: &str,
        kind: MediaKind,
    ) -> StampResult<RemoteFile> {
        let file = api.get_file(file_id).await?;
        let limit = self.limits.for_kind(kind);
        if file.size > limit {
            debug!(file_id, size = file.size, limit, "Rejecting oversized file");
            return Err(StampError::FileTooLarge {
                size: file.size,
                limit,
            });
        }
        Ok(file)
    }

    pub fn download_url(&self, remote: &RemoteFile) -> String {
        format!("{}/{}", self.file_base_url, remote.path.trim_start_matches('/'))
    }

    /// Stream the file to `dest` under the wall-clock timeout.
    ///
    /// On any failure the partial file is removed. Returns the local path and
    /// the byte count written.
    pub async fn download(&self, remote: &RemoteFile, dest: &Path) -> StampResult<(PathBuf, u64)> {
        let url = self.download_url(remote);
        debug!(url = %redact_sensitive_data(&url), dest = %dest.display(), "Downloading file");

        let outcome = match tokio::time::timeout(self.timeout, self.transfer(&url, dest)).await {
            Ok(result) => result,
            Err(_) => Err(StampError::download(format!(
                "timed out after {}s",
                self.timeout.as_secs_f32()
            ))),
        };

        match outcome {
            Ok(written) => Ok((dest.to_path_buf(), written)),
            Err(e) => {
                remove_partial(dest).await;
                Err(e)
            }
        }
    }

    async fn transfer(&self, url: &str, dest: &Path) -> StampResult<u64> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| StampError::download(redact_sensitive_data(&e.to_string())))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(StampError::download(format!("unexpected status {status}")));
        }

        let mut file = fs::File::create(dest).await.map_err(|e| {
            StampError::download(format!("cannot create {}: {e}", dest.display()))
        })?;

        let mut written: u64 = 0;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| StampError::download(redact_sensitive_data(&e.to_string())))?
        {
            file.write_all(&chunk).await.map_err(|e| {
                StampError::download(format!("cannot write {}: {e}", dest.display()))
            })?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| StampError::download(format!("cannot flush {}: {e}", dest.display())))?;

        Ok(written)
    }
}

async fn remove_partial(dest: &Path) {
    match fs::remove_file(dest).await {
        Ok(()) => debug!(path = %dest.display(), "Removed partial download"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %dest.display(), error = %e, "Failed to remove partial download"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{spawn_file_server, FakeChatApi, TEST_TOKEN};
    use std::sync::atomic::Ordering;

    fn fetcher(base: &str, timeout: Duration) -> FileFetcher {
        FileFetcher::new(base, TEST_TOKEN, SizeLimits { photo_max_bytes: 100, video_max_bytes: 1_000 }, timeout)
    }

    fn remote(path: &str) -> RemoteFile {
        RemoteFile { size: 10, path: path.into() }
    }

    #[test]
    fn builds_file_url() {
        let f = fetcher("https://api.telegram.org/", Duration::from_secs(1));
        assert_eq!(
            f.download_url(&remote("photos/file_3.jpg")),
            format!("https://api.telegram.org/file/bot{TEST_TOKEN}/photos/file_3.jpg")
        );
    }

    #[tokio::test]
    async fn rejects_oversized_photo_but_not_same_size_video() {
        let api = FakeChatApi::new().with_file("big", 500, "photos/big.jpg");
        let f = fetcher("http://127.0.0.1:9", Duration::from_secs(1));

        let err = f.resolve(&api, "big", MediaKind::Photo).await.unwrap_err();
        assert!(matches!(err, StampError::FileTooLarge { size: 500, limit: 100 }));

        let ok = f.resolve(&api, "big", MediaKind::Video).await.unwrap();
        assert_eq!(ok.path, "photos/big.jpg");
    }

    #[tokio::test]
    async fn size_at_the_ceiling_is_accepted() {
        let api = FakeChatApi::new().with_file("edge", 100, "photos/edge.jpg");
        let f = fetcher("http://127.0.0.1:9", Duration::from_secs(1));
        assert!(f.resolve(&api, "edge", MediaKind::Photo).await.is_ok());
    }

    #[tokio::test]
    async fn downloads_file_body() {
        let server = spawn_file_server().await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("in.jpg");

        let (local, written) = fetcher(&server.base_url, Duration::from_secs(5))
            .download(&remote("photos/ok.jpg"), &dest)
            .await
            .unwrap();

        assert_eq!(local, dest);
        assert_eq!(written, server.body.len() as u64);
        assert_eq!(std::fs::read(&dest).unwrap(), server.body);
        assert_eq!(server.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn non_200_fails_without_leaving_a_file() {
        let server = spawn_file_server().await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("in.jpg");

        let err = fetcher(&server.base_url, Duration::from_secs(5))
            .download(&remote("photos/missing.jpg"), &dest)
            .await
            .unwrap_err();

        assert!(matches!(err, StampError::DownloadFailed(_)));
        assert!(err.to_string().contains("404"));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn timeout_removes_partial_file() {
        let server = spawn_file_server().await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("in.mp4");

        let err = fetcher(&server.base_url, Duration::from_millis(300))
            .download(&remote("videos/stall.mp4"), &dest)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("timed out"));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn network_error_is_redacted() {
        // Nothing listens on the discard port.
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("in.jpg");

        let err = fetcher("http://127.0.0.1:9", Duration::from_secs(5))
            .download(&remote("photos/ok.jpg"), &dest)
            .await
            .unwrap_err();

        assert!(matches!(err, StampError::DownloadFailed(_)));
        assert!(!err.to_string().contains(TEST_TOKEN));
        assert!(!dest.exists());
    }
}

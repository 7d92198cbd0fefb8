//! Fetch seam between the loaders and wherever the data files live.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AppError;

/// Raw result of one fetch. Any status is a valid response; callers decide
/// what non-2xx means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self { status: 200, body: body.into() }
    }

    pub fn not_found() -> Self {
        Self { status: 404, body: String::new() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// `Err` only when the transport itself failed; a missing file is a response.
    async fn fetch(&self, path: &str) -> Result<FetchResponse, AppError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn fetch(&self, path: &str) -> Result<FetchResponse, AppError> {
        (**self).fetch(path).await
    }
}

/// Fetch a path and return its body, mapping non-2xx to [`AppError::FileAbsent`].
pub async fn fetch_text<T: Transport + ?Sized>(transport: &T, path: &str) -> Result<String, AppError> {
    let response = transport.fetch(path).await?;
    if !response.is_success() {
        return Err(AppError::FileAbsent {
            path: path.to_string(),
            status: response.status,
        });
    }
    Ok(response.body)
}

/// Fetches relative paths from a base URL.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, path: &str) -> Result<FetchResponse, AppError> {
        let url = self.url_for(path);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::fetch(path, e))?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(|e| AppError::fetch(path, e))?;
        Ok(FetchResponse { status, body })
    }
}

/// Reads relative paths under a local directory. A missing file answers 404.
pub struct FileTransport {
    root: PathBuf,
}

impl FileTransport {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl Transport for FileTransport {
    async fn fetch(&self, path: &str) -> Result<FetchResponse, AppError> {
        let full = self.root.join(path.trim_start_matches('/'));
        match tokio::fs::read_to_string(&full).await {
            Ok(body) => Ok(FetchResponse::ok(body)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FetchResponse::not_found()),
            Err(e) => Err(AppError::fetch(path, e)),
        }
    }
}

/// Pick an adapter for a data root: `http(s)://` roots go over the network,
/// anything else is a local directory.
pub fn transport_for_root(root: &str) -> Arc<dyn Transport> {
    if root.starts_with("http://") || root.starts_with("https://") {
        Arc::new(HttpTransport::new(root))
    } else {
        Arc::new(FileTransport::new(root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_urls_join_without_double_slashes() {
        let t = HttpTransport::new("https://example.org/site/");
        assert_eq!(t.url_for("/data/truth/a.csv"), "https://example.org/site/data/truth/a.csv");
        assert_eq!(t.url_for("data/truth/a.csv"), "https://example.org/site/data/truth/a.csv");
    }

    #[tokio::test]
    async fn file_transport_maps_missing_files_to_404() {
        let dir = std::env::temp_dir().join(format!("forecast-facets-transport-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join("present.csv"), "a,b\n1,2\n").await.unwrap();

        let t = FileTransport::new(&dir);
        let present = t.fetch("present.csv").await.unwrap();
        assert!(present.is_success());
        assert_eq!(present.body, "a,b\n1,2\n");

        let missing = t.fetch("absent.csv").await.unwrap();
        assert_eq!(missing.status, 404);

        let err = fetch_text(&t, "absent.csv").await.unwrap_err();
        assert!(matches!(err, AppError::FileAbsent { status: 404, .. }));

        tokio::fs::remove_dir_all(&dir).await.ok();
    }
}

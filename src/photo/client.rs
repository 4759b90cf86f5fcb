/// HTTP access to the listing photo service

use once_cell::sync::OnceCell;
use std::time::Duration;
use thiserror::Error;
use tracing::trace;

/// Errors raised while fetching a photo
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Http(String),

    /// The service has no photo at this index
    #[error("Photo not found")]
    NotFound,

    #[error("HTTP {0}")]
    Status(u16),

    #[error("Failed to decode photo: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Fetch task failed: {0}")]
    Worker(String),
}

impl FetchError {
    /// Whether the error means "no photo here" rather than a transient
    /// failure. The service answers past-the-end indices with either a
    /// 404 or a body that is not an image.
    pub fn is_exhaustion(&self) -> bool {
        matches!(self, FetchError::NotFound | FetchError::Decode(_))
    }
}

/// Blocking photo download.
///
/// Implementations are called from the blocking thread pool only.
pub trait PhotoSource: Send + Sync {
    /// Fetch the raw body at `url`. Any non-2xx status is an error.
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Build the URL of one photo of a listing
pub fn photo_url(template: &str, listing_id: &str, index: usize, size: u32) -> String {
    template
        .replace("{mls}", listing_id)
        .replace("{n}", &index.to_string())
        .replace("{w}", &size.to_string())
        .replace("{h}", &size.to_string())
}

/// Real photo source using reqwest's blocking client.
///
/// The client is built on first use so that it is created on a blocking
/// worker thread and never inside the async runtime.
pub struct ReqwestClient {
    timeout: Duration,
    client: OnceCell<reqwest::blocking::Client>,
}

impl ReqwestClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            client: OnceCell::new(),
        }
    }

    fn client(&self) -> Result<&reqwest::blocking::Client, FetchError> {
        self.client.get_or_try_init(|| {
            reqwest::blocking::Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(|e| FetchError::Http(format!("Failed to create HTTP client: {}", e)))
        })
    }
}

impl PhotoSource for ReqwestClient {
    fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        trace!("GET {}", url);
        let response = self
            .client()?
            .get(url)
            .send()
            .map_err(|e| FetchError::Http(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound);
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| FetchError::Http(format!("Failed to read response: {}", e)))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PHOTO_URL;

    #[test]
    fn test_photo_url() {
        assert_eq!(
            photo_url(DEFAULT_PHOTO_URL, "72912345", 0, 150),
            "http://media.mlspin.com/photo.aspx?mls=72912345&n=0&w=150&h=150"
        );
        assert_eq!(
            photo_url("https://img.example/{mls}/{n}?size={w}x{h}", "1", 3, 300),
            "https://img.example/1/3?size=300x300"
        );
    }

    #[test]
    fn test_exhaustion() {
        assert!(FetchError::NotFound.is_exhaustion());
        assert!(!FetchError::Status(503).is_exhaustion());
        assert!(!FetchError::Http("timed out".into()).is_exhaustion());
    }
}

//! Off-screen image preloading.

use std::io::Cursor;
use std::time::Duration;

use futures_util::future::BoxFuture;
use thiserror::Error;
use url::Url;

use crate::config::LazyLoadConfig;
use crate::lazy::LazyLoadError;

/// Why a preload attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("cannot resolve image source {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request for {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },

    #[error("{url} is not a decodable image")]
    NotAnImage { url: String },
}

/// Verifies that a source can be fetched and decoded before it is shown.
pub trait ImageFetcher: Send + Sync {
    fn preload<'a>(&'a self, source: &'a str) -> BoxFuture<'a, Result<(), FetchError>>;
}

/// Preloads over HTTP and decodes the body before reporting success.
pub struct HttpImageFetcher {
    client: reqwest::Client,
    base: Url,
}

impl HttpImageFetcher {
    pub fn new(base: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    pub fn from_config(config: &LazyLoadConfig) -> Result<Self, LazyLoadError> {
        let base = Url::parse(&config.base_url)?;
        Ok(Self::new(base, Duration::from_secs(config.fetch_timeout_secs))?)
    }

    /// Absolute sources are used as is; relative ones join the base URL.
    pub fn resolve(&self, source: &str) -> Result<Url, FetchError> {
        self.base.join(source).map_err(|e| FetchError::InvalidUrl {
            url: source.to_string(),
            reason: e.to_string(),
        })
    }

    async fn fetch(&self, source: &str) -> Result<(), FetchError> {
        let url = self.resolve(source)?;
        let request_error = |e: reqwest::Error| FetchError::Request {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let response = self.client.get(url.clone()).send().await.map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(request_error)?;
        let bytes = body.len();
        let decoded = tokio::task::spawn_blocking(move || decode_dimensions(&body))
            .await
            .map_err(|e| FetchError::Request {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        match decoded {
            Ok((width, height)) => {
                tracing::trace!(url = %url, width, height, bytes, "Preloaded image");
                Ok(())
            }
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "Image did not decode");
                Err(FetchError::NotAnImage { url: url.to_string() })
            }
        }
    }
}

/// Fully decode `body`, as a browser does before an image counts as loaded.
fn decode_dimensions(body: &[u8]) -> Result<(u32, u32), image::ImageError> {
    let image = image::ImageReader::new(Cursor::new(body))
        .with_guessed_format()?
        .decode()?;
    Ok((image.width(), image.height()))
}

impl ImageFetcher for HttpImageFetcher {
    fn preload<'a>(&'a self, source: &'a str) -> BoxFuture<'a, Result<(), FetchError>> {
        Box::pin(self.fetch(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_relative_and_absolute() {
        let fetcher = HttpImageFetcher::new(
            Url::parse("https://folio.dev/projects/").unwrap(),
            Duration::from_secs(1),
        )
        .unwrap();

        assert_eq!(
            fetcher.resolve("img/a.jpg").unwrap().as_str(),
            "https://folio.dev/projects/img/a.jpg"
        );
        assert_eq!(
            fetcher.resolve("/assets/b.png").unwrap().as_str(),
            "https://folio.dev/assets/b.png"
        );
        assert_eq!(
            fetcher.resolve("https://cdn.example.com/c.webp").unwrap().as_str(),
            "https://cdn.example.com/c.webp"
        );
        assert!(matches!(fetcher.resolve("http://[::1"), Err(FetchError::InvalidUrl { .. })));
    }

    #[test]
    fn test_decode_requires_a_complete_image() {
        let mut png = Vec::new();
        image::DynamicImage::ImageRgb8(image::RgbImage::new(3, 2))
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        assert_eq!(decode_dimensions(&png).unwrap(), (3, 2));

        // Right signature, truncated body.
        assert!(decode_dimensions(&png[..20]).is_err());
        assert!(decode_dimensions(b"<html></html>").is_err());
    }
}

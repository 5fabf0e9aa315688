//! Candidate probing: does an icon URL load, and how big is it?

use async_trait::async_trait;
use bytes::Bytes;
use image::ImageReader;
use reqwest::Client;
use std::io::Cursor;
use tracing::debug;

use crate::config::ProbeConfig;
use crate::errors::{AppError, AppResult, ProbeError};
use crate::models::{IconCandidate, IconSource};
use crate::utils::UrlUtils;

/// Loads an icon URL and measures it
#[async_trait]
pub trait ImageProber: Send + Sync {
    /// `Some` with natural dimensions when the URL decodes as an image, `None` on any failure
    async fn probe(&self, url: &str, source: IconSource) -> Option<IconCandidate>;
}

/// Fetches raw icon bytes for the local cache
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes, ProbeError>;
}

/// Fully decode an encoded image and return its natural dimensions
///
/// Header-only reads would accept truncated bodies, so the pixels are decoded.
pub fn measure_image(bytes: &[u8], url: &str) -> Result<(u32, u32), ProbeError> {
    let decode_error = |message: String| ProbeError::Decode {
        url: UrlUtils::obfuscate_credentials(url),
        message,
    };

    let decoded = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| decode_error(e.to_string()))?
        .decode()
        .map_err(|e| decode_error(e.to_string()))?;
    let (width, height) = (decoded.width(), decoded.height());

    if width == 0 || height == 0 {
        return Err(ProbeError::EmptyImage {
            url: UrlUtils::obfuscate_credentials(url),
        });
    }

    Ok((width, height))
}

/// HTTP prober and fetcher sharing one connection pool
///
/// The client's total request timeout bounds every probe, so a stalled
/// provider resolves as a failed probe instead of holding up ranking.
#[derive(Debug, Clone)]
pub struct HttpImageClient {
    client: Client,
    max_bytes: u64,
}

impl HttpImageClient {
    pub fn new(config: &ProbeConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(AppError::Http)?;

        Ok(Self::with_client(client, config.max_bytes))
    }

    pub fn with_client(client: Client, max_bytes: u64) -> Self {
        Self { client, max_bytes }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    async fn download(&self, url: &str) -> Result<Bytes, ProbeError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProbeError::request(UrlUtils::obfuscate_credentials(url), e))?;

        if !response.status().is_success() {
            return Err(ProbeError::Status {
                url: UrlUtils::obfuscate_credentials(url),
                status: response.status().as_u16(),
            });
        }

        if let Some(length) = response.content_length()
            && length > self.max_bytes
        {
            return Err(ProbeError::TooLarge {
                size: length,
                max_size: self.max_bytes,
            });
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ProbeError::request(UrlUtils::obfuscate_credentials(url), e))?
        {
            let size = (body.len() + chunk.len()) as u64;
            if size > self.max_bytes {
                return Err(ProbeError::TooLarge {
                    size,
                    max_size: self.max_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(Bytes::from(body))
    }
}

#[async_trait]
impl ImageFetcher for HttpImageClient {
    async fn fetch(&self, url: &str) -> Result<Bytes, ProbeError> {
        self.download(url).await
    }
}

#[async_trait]
impl ImageProber for HttpImageClient {
    async fn probe(&self, url: &str, source: IconSource) -> Option<IconCandidate> {
        let measured = match self.download(url).await {
            Ok(bytes) => measure_image(&bytes, url),
            Err(e) => Err(e),
        };

        match measured {
            Ok((width, height)) => {
                debug!("Probe {} succeeded: {}x{}", source, width, height);
                Some(IconCandidate::new(source, url, width, height))
            }
            Err(e) => {
                debug!("Probe {} failed: {}", source, e);
                None
            }
        }
    }
}

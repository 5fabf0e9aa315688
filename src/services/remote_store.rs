//! Remote icon store backed by Cloudinary
//!
//! The store serves a stable, optimized delivery URL per domain and accepts
//! unsigned uploads (by remote URL) that land at `{folder}/{domain}`. Future
//! lookups for that domain then hit the optimized copy instead of re-probing
//! the public providers.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::Form;
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::RemoteStoreConfig;
use crate::errors::{PublishError, PublishResult};
use crate::utils::UrlUtils;

/// What the store reports after accepting an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub public_id: String,
    pub secure_url: String,
}

/// An external image host addressed by domain
#[async_trait]
pub trait RemoteIconStore: Send + Sync {
    /// Stable delivery URL for `domain`; pure, no network
    fn fetch_url(&self, domain: &str) -> String;

    /// Ask the store to ingest `source_url` as the icon for `domain`
    async fn publish(&self, domain: &str, source_url: &str) -> PublishResult<UploadReceipt>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: Option<String>,
    secure_url: Option<String>,
    error: Option<UploadErrorBody>,
}

#[derive(Debug, Deserialize)]
struct UploadErrorBody {
    message: String,
}

#[derive(Debug, Clone)]
pub struct CloudinaryStore {
    client: Client,
    config: RemoteStoreConfig,
}

impl CloudinaryStore {
    pub fn new(config: RemoteStoreConfig, client: Client) -> Self {
        Self { client, config }
    }

    pub fn public_id(&self, domain: &str) -> String {
        format!("{}/{domain}", self.config.folder)
    }

    pub fn upload_endpoint(&self) -> String {
        format!(
            "{}/{}/image/upload",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name
        )
    }

    /// Delivery URL that has Cloudinary fetch, optimize and cache an arbitrary image
    pub fn fetch_proxy_url(&self, target_url: &str) -> String {
        format!(
            "{}/{}/image/fetch/{}/{target_url}",
            self.config.delivery_base.trim_end_matches('/'),
            self.config.cloud_name,
            self.config.fetch_transformation
        )
    }

    /// Form fields of an unsigned upload, in submission order
    pub fn upload_fields(&self, domain: &str, source_url: &str) -> Vec<(&'static str, String)> {
        vec![
            ("file", source_url.to_string()),
            ("upload_preset", self.config.upload_preset.clone()),
            ("public_id", self.public_id(domain)),
            ("tags", self.config.tags.join(",")),
            ("context", format!("domain={domain}")),
        ]
    }

    fn parse_upload_response(status: reqwest::StatusCode, body: &str) -> PublishResult<UploadReceipt> {
        let response: UploadResponse =
            serde_json::from_str(body).map_err(|e| PublishError::InvalidResponse {
                message: format!("HTTP {status}: {e}"),
            })?;

        if let Some(error) = response.error {
            return Err(PublishError::Rejected {
                message: error.message,
            });
        }

        match (response.public_id, response.secure_url) {
            (Some(public_id), Some(secure_url)) => Ok(UploadReceipt {
                public_id,
                secure_url,
            }),
            _ => Err(PublishError::InvalidResponse {
                message: format!("HTTP {status}: missing public_id or secure_url"),
            }),
        }
    }
}

#[async_trait]
impl RemoteIconStore for CloudinaryStore {
    fn fetch_url(&self, domain: &str) -> String {
        format!(
            "{}/{}/image/upload/{}/{}",
            self.config.delivery_base.trim_end_matches('/'),
            self.config.cloud_name,
            self.config.transformation,
            self.public_id(domain)
        )
    }

    async fn publish(&self, domain: &str, source_url: &str) -> PublishResult<UploadReceipt> {
        if domain.is_empty() || source_url.is_empty() {
            return Err(PublishError::MissingInput {
                domain: domain.to_string(),
                source_url: source_url.to_string(),
            });
        }

        let form = self
            .upload_fields(domain, source_url)
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));

        debug!(
            "Publishing icon for {} from {}",
            domain,
            UrlUtils::obfuscate_credentials(source_url)
        );

        let response = self
            .client
            .post(self.upload_endpoint())
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        let receipt = Self::parse_upload_response(status, &body)?;
        info!("Published icon for {} as {}", domain, receipt.public_id);
        Ok(receipt)
    }
}

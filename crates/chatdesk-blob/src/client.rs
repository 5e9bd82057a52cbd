// SPDX-FileCopyrightText: 2026 Chatdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for a Supabase Storage compatible object store.

use std::time::Duration;

use async_trait::async_trait;
use chatdesk_config::model::BlobConfig;
use chatdesk_core::types::SignedUpload;
use chatdesk_core::{AdapterType, BlobStore, ChatdeskError, HealthStatus, PluginAdapter};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Response, Url};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct SignResponse {
    #[serde(rename = "signedURL", alias = "signedUrl")]
    signed_url: String,
}

#[derive(Debug, Deserialize)]
struct SignUploadResponse {
    url: String,
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StorageErrorBody {
    #[serde(default, alias = "error")]
    message: String,
}

/// Bucket-scoped client for the storage REST API.
#[derive(Debug, Clone)]
pub struct SupabaseBlobStore {
    client: reqwest::Client,
    /// `{project}/storage/v1`
    api_root: Url,
    bucket: String,
    configured: bool,
}

impl SupabaseBlobStore {
    /// Build a client from the `[blob]` config section.
    ///
    /// An empty `url` yields a client whose operations all fail, so the
    /// server can still start without object storage.
    pub fn new(config: &BlobConfig) -> Result<Self, ChatdeskError> {
        let configured = !config.url.is_empty();
        let base = if configured {
            config.url.as_str()
        } else {
            "http://storage.invalid"
        };
        let api_root = Url::parse(&format!("{}/storage/v1/", base.trim_end_matches('/')))
            .map_err(|e| ChatdeskError::Config(format!("invalid blob.url `{}`: {e}", config.url)))?;

        let mut headers = HeaderMap::new();
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.service_key))
            .map_err(|e| ChatdeskError::Config(format!("invalid blob service key: {e}")))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
        let mut apikey = HeaderValue::from_str(&config.service_key)
            .map_err(|e| ChatdeskError::Config(format!("invalid blob service key: {e}")))?;
        apikey.set_sensitive(true);
        headers.insert("apikey", apikey);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| ChatdeskError::Blob {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            api_root,
            bucket: config.bucket.clone(),
            configured,
        })
    }

    /// `{api_root}/{prefix...}/{bucket}/{object path segments}`
    fn object_url(&self, prefix: &[&str], path: &str) -> Result<Url, ChatdeskError> {
        let mut url = self.api_root.clone();
        url.path_segments_mut()
            .map_err(|_| ChatdeskError::blob("blob base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(prefix)
            .push(&self.bucket)
            .extend(path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    /// Resolve a URL returned by the API, which is relative to `/storage/v1`.
    fn resolve(&self, returned: &str) -> Result<Url, ChatdeskError> {
        self.api_root
            .join(returned.trim_start_matches('/'))
            .map_err(|e| ChatdeskError::blob(format!("unusable URL `{returned}` from storage: {e}")))
    }

    fn ensure_configured(&self) -> Result<(), ChatdeskError> {
        if self.configured {
            Ok(())
        } else {
            Err(ChatdeskError::blob("object storage is not configured (blob.url)"))
        }
    }

    async fn check(what: &str, response: Response) -> Result<Response, ChatdeskError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<StorageErrorBody>(&body)
            .map(|b| b.message)
            .unwrap_or(body);
        Err(ChatdeskError::blob(format!("{what}: storage returned {status}: {detail}")))
    }
}

fn transport(what: &str, e: reqwest::Error) -> ChatdeskError {
    ChatdeskError::Blob {
        message: format!("{what}: HTTP request failed: {e}"),
        source: Some(Box::new(e)),
    }
}

#[async_trait]
impl PluginAdapter for SupabaseBlobStore {
    fn name(&self) -> &str {
        "supabase-storage"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Blob
    }

    async fn health_check(&self) -> Result<HealthStatus, ChatdeskError> {
        if self.configured {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Degraded("blob.url not configured".into()))
        }
    }

    async fn shutdown(&self) -> Result<(), ChatdeskError> {
        Ok(())
    }
}

#[async_trait]
impl BlobStore for SupabaseBlobStore {
    async fn upload(
        &self,
        path: &str,
        data: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<(), ChatdeskError> {
        self.ensure_configured()?;
        let url = self.object_url(&["object"], path)?;
        let size = data.len();
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", if upsert { "true" } else { "false" })
            .body(data)
            .send()
            .await
            .map_err(|e| transport("upload", e))?;
        Self::check("upload", response).await?;
        debug!(path, size, "uploaded object");
        Ok(())
    }

    async fn signed_url(&self, path: &str, expires_in: Duration) -> Result<String, ChatdeskError> {
        self.ensure_configured()?;
        let url = self.object_url(&["object", "sign"], path)?;
        let response = self
            .client
            .post(url)
            .json(&serde_json::json!({ "expiresIn": expires_in.as_secs() }))
            .send()
            .await
            .map_err(|e| transport("sign", e))?;
        let signed: SignResponse = Self::check("sign", response)
            .await?
            .json()
            .await
            .map_err(|e| transport("sign", e))?;
        Ok(self.resolve(&signed.signed_url)?.to_string())
    }

    async fn create_signed_upload(&self, path: &str) -> Result<SignedUpload, ChatdeskError> {
        self.ensure_configured()?;
        let url = self.object_url(&["object", "upload", "sign"], path)?;
        let response = self
            .client
            .post(url)
            .send()
            .await
            .map_err(|e| transport("upload sign", e))?;
        let signed: SignUploadResponse = Self::check("upload sign", response)
            .await?
            .json()
            .await
            .map_err(|e| transport("upload sign", e))?;

        let upload_url = self.resolve(&signed.url)?;
        let token = match signed.token {
            Some(token) => token,
            None => upload_url
                .query_pairs()
                .find(|(k, _)| k == "token")
                .map(|(_, v)| v.into_owned())
                .ok_or_else(|| ChatdeskError::blob("signed upload URL carries no token"))?,
        };
        Ok(SignedUpload {
            upload_url: upload_url.to_string(),
            token,
            path: path.to_string(),
        })
    }
}

//! HTTP client for the AppMetrica logs import API

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::importer::{EventImporter, ImporterState};

use super::wire::ApiResponse;

/// Path of the CSV bulk import endpoint
pub const IMPORT_EVENTS_PATH: &str = "/logs/v1/import/events.csv";

const CSV_CONTENT_TYPE: &str = "text/csv; charset=UTF-8";

/// HTTP client for the logs import endpoint
pub struct ImportClient {
    config: ApiConfig,
    http_client: reqwest::Client,
    base_url: String,
}

impl ImportClient {
    /// Create a new client from configuration
    ///
    /// Returns an error if the configuration is invalid or missing required fields.
    pub fn new(config: ApiConfig) -> Result<Self> {
        config.validate()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();

        let mut headers = HeaderMap::new();
        if let Some(token) = &config.oauth_token {
            let auth_value = format!("OAuth {}", token);
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&auth_value)
                    .map_err(|e| Error::Config(format!("invalid oauth_token: {}", e)))?,
            );
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
            base_url,
        })
    }

    /// Full URL of the import endpoint (without the key parameter)
    pub fn import_url(&self) -> String {
        format!("{}{}", self.base_url, IMPORT_EVENTS_PATH)
    }

    /// Upload every event queued in `importer`.
    ///
    /// The importer must not have produced any output yet and must not carry
    /// a recorded error. The body is streamed in chunks of `chunk_size` bytes.
    /// Returns the number of events sent.
    pub async fn import_events(&self, importer: EventImporter, chunk_size: usize) -> Result<usize> {
        if let Some(error) = importer.error() {
            return Err(Error::Importer(*error));
        }
        if importer.state() != ImporterState::Initial {
            return Err(Error::Config(
                "importer has already produced output".to_string(),
            ));
        }

        let post_api_key = self
            .config
            .post_api_key
            .as_deref()
            .ok_or_else(|| Error::Config("api.post_api_key is required".to_string()))?;

        let events = importer.pending();
        let chunks = importer.into_chunks(chunk_size).map(Ok::<_, std::io::Error>);
        let body = reqwest::Body::wrap_stream(futures::stream::iter(chunks));

        tracing::debug!(
            url = %self.import_url(),
            events,
            chunk_size,
            "Uploading event import"
        );

        let response = self
            .http_client
            .post(self.import_url())
            .query(&[("post_api_key", post_api_key)])
            .header(CONTENT_TYPE, CSV_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let text = response.text().await?;

        interpret_response(status, &content_type, &text)?;

        tracing::info!(events, status, "Event import accepted");
        Ok(events)
    }
}

/// Turn a raw API response into the decoded envelope or an error.
///
/// JSON responses are decoded and fail on a non-zero `code`. Plain text
/// responses fail on any status other than 200, using the body as the
/// message. Other content types are rejected.
pub fn interpret_response(
    status: u16,
    content_type: &str,
    body: &str,
) -> Result<Option<ApiResponse>> {
    let media_type = content_type.split(';').next().unwrap_or("").trim();

    match media_type {
        "application/json" | "application/x-yametrika+json" => {
            let response: ApiResponse = serde_json::from_str(body)?;
            if response.is_error() {
                return Err(Error::api(response.code, response.error_message()));
            }
            Ok(Some(response))
        }
        "text/plain" => {
            if status != 200 {
                return Err(Error::api(i64::from(status), body.trim()));
            }
            Ok(None)
        }
        other => Err(Error::api(
            i64::from(status),
            format!("unexpected content type: {}", other),
        )),
    }
}

/// Synchronous wrapper for ImportClient
///
/// Provides blocking methods for use in synchronous code.
pub struct SyncImportClient {
    inner: ImportClient,
    runtime: tokio::runtime::Runtime,
}

impl SyncImportClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        Ok(Self {
            inner: ImportClient::new(config)?,
            runtime,
        })
    }

    /// Upload every event queued in `importer` (blocking)
    pub fn import_events(&self, importer: EventImporter, chunk_size: usize) -> Result<usize> {
        self.runtime
            .block_on(self.inner.import_events(importer, chunk_size))
    }

    pub fn import_url(&self) -> String {
        self.inner.import_url()
    }
}

use async_trait::async_trait;
use leasedesk_application::DocumentRenderer;
use leasedesk_core::{AppError, AppResult};
use leasedesk_domain::{DocumentRequest, RenderedDocument};
use reqwest::header;
use tracing::debug;

use crate::http_status::{ensure_success, transport_error};

/// HTTP adapter for the external document rendering service.
pub struct HttpDocumentRenderer {
    http_client: reqwest::Client,
    endpoint: String,
    api_token: Option<String>,
}

impl HttpDocumentRenderer {
    /// Creates a renderer posting to `{base_url}/documents/render`.
    #[must_use]
    pub fn new(http_client: reqwest::Client, base_url: &str, api_token: Option<String>) -> Self {
        Self {
            http_client,
            endpoint: format!("{}/documents/render", base_url.trim_end_matches('/')),
            api_token: api_token.filter(|token| !token.trim().is_empty()),
        }
    }

    /// Returns the render endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }
}

#[async_trait]
impl DocumentRenderer for HttpDocumentRenderer {
    async fn render(&self, request: DocumentRequest) -> AppResult<RenderedDocument> {
        let context = "document render";
        let mut builder = self.http_client.post(self.endpoint.as_str()).json(&request);
        if let Some(token) = &self.api_token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = builder
            .send()
            .await
            .map_err(|error| transport_error(context, &error))?;
        let response = ensure_success(response, context).await?;

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .unwrap_or_else(|| request.format.default_content_type().to_owned());
        let bytes = response
            .bytes()
            .await
            .map_err(|error| {
                AppError::Transport(format!("failed to read {context} response body: {error}"))
            })?
            .to_vec();

        debug!(
            template_id = request.template_id.as_str(),
            format = request.format.as_str(),
            content_type = content_type.as_str(),
            bytes = bytes.len(),
            "document rendered"
        );

        Ok(RenderedDocument {
            format: request.format,
            content_type,
            bytes,
        })
    }
}

//! REST adapter for the directory and agreement endpoints.

mod agreements;
mod directory;
mod dto;

use leasedesk_core::{AppError, AppResult};
use leasedesk_domain::PermissionCatalog;
use reqwest::{Method, header};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use url::Url;

use crate::http_status::{ensure_success, transport_error};

/// REST client for the Leasedesk backend API.
///
/// Roles and users reference permissions by code, so the permission catalog
/// is loaded once and reused for every conversion.
pub struct HttpApiClient {
    http_client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
    catalog: RwLock<Option<PermissionCatalog>>,
}

impl HttpApiClient {
    /// Creates a new API client. A trailing `/` on the base URL is ignored.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        base_url: impl Into<String>,
        api_token: Option<String>,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_token: api_token.filter(|token| !token.trim().is_empty()),
            catalog: RwLock::new(None),
        }
    }

    fn url(&self, path: &str) -> AppResult<Url> {
        let endpoint = format!("{}{path}", self.base_url);
        Url::parse(endpoint.as_str()).map_err(|error| {
            AppError::Validation(format!("invalid API endpoint '{endpoint}': {error}"))
        })
    }

    fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        let builder = self.http_client.request(method, url);
        match &self.api_token {
            Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        }
    }

    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        context: &str,
    ) -> AppResult<reqwest::Response> {
        let response = builder
            .send()
            .await
            .map_err(|error| transport_error(context, &error))?;
        ensure_success(response, context).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, context: &str) -> AppResult<T> {
        let response = self.send(self.request(Method::GET, url), context).await?;
        decode(response, context).await
    }

    async fn cached_catalog(&self) -> Option<PermissionCatalog> {
        self.catalog.read().await.clone()
    }

    async fn store_catalog(&self, catalog: PermissionCatalog) {
        *self.catalog.write().await = Some(catalog);
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response, context: &str) -> AppResult<T> {
    response.json::<T>().await.map_err(|error| {
        AppError::Internal(format!("failed to parse {context} response body: {error}"))
    })
}

#[cfg(test)]
mod tests;

//! HTTP implementations of the backend traits.
//!
//! `HttpBuilderBackend` targets the catalog server's REST API;
//! `HttpCatalystBackend` targets a catalyst content node.

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};

use catalog::types::{
    CatalystEntity, Collection, CurationStatus, Item, ItemCuration, ThirdParty,
};

use super::traits::*;

/// HTTP client for the catalog server.
pub struct HttpBuilderBackend {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpBuilderBackend {
    /// Create a new catalog server client.
    pub fn new(base_url: impl Into<String>, auth_token: Option<String>) -> Self {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            auth_token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Build authorization header if a token is set.
    fn auth_header(&self) -> Option<String> {
        self.auth_token.as_ref().map(|t| format!("Bearer {}", t))
    }

    fn with_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth_header() {
            Some(auth) => request.header(header::AUTHORIZATION, auth),
            None => request,
        }
    }

    async fn read_body<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::RequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let envelope: ServerResponse<T> = response
            .json()
            .await
            .map_err(|e| BackendError::ParseError(e.to_string()))?;

        match envelope.data {
            Some(data) if envelope.ok => Ok(data),
            _ => Err(BackendError::RequestFailed(
                envelope.error.unwrap_or_else(|| "Empty response".to_string()),
            )),
        }
    }
}

/// Catalog server response envelope.
#[derive(Debug, Deserialize)]
struct ServerResponse<T> {
    data: Option<T>,
    ok: bool,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct UpdateCurationBody {
    status: CurationStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PublishBody<'a> {
    item_ids: &'a [String],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RescueBody<'a> {
    item_ids: &'a [String],
    content_hashes: &'a [String],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThirdPartyKindBody {
    is_programmatic: bool,
}

#[async_trait]
impl BuilderBackend for HttpBuilderBackend {
    async fn is_available(&self) -> bool {
        let request = self.client.get(self.url("/info"));
        self.with_auth(request)
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    async fn fetch_collections(
        &self,
        address: &str,
        page: u64,
        limit: u64,
    ) -> Result<Paginated<Collection>, BackendError> {
        let url = self.url(&format!("/{}/collections", address));
        let request = self.client.get(&url).query(&[("page", page), ("limit", limit)]);

        let response = self
            .with_auth(request)
            .send()
            .await
            .map_err(|e| BackendError::NetworkError(e.to_string()))?;

        Self::read_body(response).await
    }

    async fn fetch_collection_items(
        &self,
        collection_id: &str,
        page: u64,
        limit: u64,
    ) -> Result<Paginated<Item>, BackendError> {
        let url = self.url(&format!("/collections/{}/items", collection_id));
        let request = self.client.get(&url).query(&[("page", page), ("limit", limit)]);

        let response = self
            .with_auth(request)
            .send()
            .await
            .map_err(|e| BackendError::NetworkError(e.to_string()))?;

        Self::read_body(response).await
    }

    async fn fetch_item_curations(
        &self,
        collection_id: &str,
    ) -> Result<Vec<ItemCuration>, BackendError> {
        let url = self.url(&format!("/collections/{}/itemCurations", collection_id));
        let response = self
            .with_auth(self.client.get(&url))
            .send()
            .await
            .map_err(|e| BackendError::NetworkError(e.to_string()))?;

        Self::read_body(response).await
    }

    async fn update_item_curation(
        &self,
        item_id: &str,
        status: CurationStatus,
    ) -> Result<ItemCuration, BackendError> {
        let url = self.url(&format!("/items/{}/curation", item_id));
        let request = self
            .client
            .patch(&url)
            .json(&UpdateCurationBody { status });

        let response = self
            .with_auth(request)
            .send()
            .await
            .map_err(|e| BackendError::NetworkError(e.to_string()))?;

        Self::read_body(response).await
    }

    async fn publish_items(
        &self,
        collection_id: &str,
        item_ids: &[String],
    ) -> Result<PublishResponse, BackendError> {
        let url = self.url(&format!("/collections/{}/publish", collection_id));
        let request = self.client.post(&url).json(&PublishBody { item_ids });

        let response = self
            .with_auth(request)
            .send()
            .await
            .map_err(|e| BackendError::NetworkError(e.to_string()))?;

        Self::read_body(response).await
    }

    async fn rescue_items(
        &self,
        collection_id: &str,
        item_ids: &[String],
        content_hashes: &[String],
    ) -> Result<Vec<Item>, BackendError> {
        let url = self.url(&format!("/collections/{}/rescue", collection_id));
        let request = self.client.post(&url).json(&RescueBody {
            item_ids,
            content_hashes,
        });

        let response = self
            .with_auth(request)
            .send()
            .await
            .map_err(|e| BackendError::NetworkError(e.to_string()))?;

        Self::read_body(response).await
    }

    async fn fetch_third_parties(&self, address: &str) -> Result<Vec<ThirdParty>, BackendError> {
        let url = self.url("/thirdParties");
        let request = self.client.get(&url).query(&[("manager", address)]);

        let response = self
            .with_auth(request)
            .send()
            .await
            .map_err(|e| BackendError::NetworkError(e.to_string()))?;

        Self::read_body(response).await
    }

    async fn fetch_slots(&self, third_party_id: &str) -> Result<u64, BackendError> {
        let url = self.url(&format!("/thirdParties/{}/slots", third_party_id));
        let response = self
            .with_auth(self.client.get(&url))
            .send()
            .await
            .map_err(|e| BackendError::NetworkError(e.to_string()))?;

        Self::read_body(response).await
    }

    async fn set_third_party_kind(
        &self,
        third_party_id: &str,
        is_programmatic: bool,
    ) -> Result<(), BackendError> {
        let url = self.url(&format!("/thirdParties/{}", third_party_id));
        let request = self
            .client
            .put(&url)
            .json(&ThirdPartyKindBody { is_programmatic });

        let response = self
            .with_auth(request)
            .send()
            .await
            .map_err(|e| BackendError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::RequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        Ok(())
    }
}

/// HTTP client for a catalyst content node.
pub struct HttpCatalystBackend {
    client: Client,
    base_url: String,
}

impl HttpCatalystBackend {
    /// Create a new catalyst client.
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct PointersBody<'a> {
    pointers: &'a [String],
}

#[async_trait]
impl CatalystBackend for HttpCatalystBackend {
    async fn fetch_entities_by_pointers(
        &self,
        pointers: &[String],
    ) -> Result<Vec<CatalystEntity>, BackendError> {
        let url = format!("{}/content/entities/active", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&PointersBody { pointers })
            .send()
            .await
            .map_err(|e| BackendError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::RequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| BackendError::ParseError(e.to_string()))
    }

    async fn fetch_content(&self, hash: &str) -> Result<Vec<u8>, BackendError> {
        let url = format!("{}/content/contents/{}", self.base_url, hash);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BackendError::NetworkError(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(BackendError::RequestFailed(format!(
                "Content not found: {}",
                hash
            )));
        }
        if !response.status().is_success() {
            return Err(BackendError::RequestFailed(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| BackendError::NetworkError(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn deploy_entity(&self, entity: CatalystEntity) -> Result<CatalystEntity, BackendError> {
        let url = format!("{}/content/entities", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&entity)
            .send()
            .await
            .map_err(|e| BackendError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::RequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        Ok(entity)
    }
}

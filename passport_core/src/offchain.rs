// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Passport Protocol Foundation

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::transport::TransportError;
use crate::types::{Category, ResourceId};

/// One recorded off-chain locator for a (resource, category) pair.
///
/// Histories are append-only; only the last record is authoritative,
/// earlier ones are retained for audit and never auto-selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocatorRecord {
    /// Content address in the off-chain store
    pub locator: String,
    /// When the locator was recorded
    pub recorded_at: DateTime<Utc>,
}

/// Index of off-chain locator histories per resource
#[async_trait]
pub trait OffchainIndex: Send + Sync {
    /// Full per-category history for a resource, keyed by category path
    /// segment; audit callers read this directly
    async fn full_history(
        &self,
        resource_id: ResourceId,
    ) -> Result<HashMap<String, Vec<LocatorRecord>>, TransportError>;

    /// Ordered locator history for one category, oldest first; empty when
    /// nothing was ever recorded
    async fn locator_history(
        &self,
        resource_id: ResourceId,
        category: Category,
    ) -> Result<Vec<LocatorRecord>, TransportError> {
        let mut all = self.full_history(resource_id).await?;
        Ok(all.remove(category.path_segment()).unwrap_or_default())
    }
}

/// Off-chain index client over its HTTP API
pub struct HttpOffchainIndex {
    base_url: String,
    client: reqwest::Client,
}

impl HttpOffchainIndex {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct HistoryResponse {
    categories: HashMap<String, Vec<LocatorRecord>>,
}

#[async_trait]
impl OffchainIndex for HttpOffchainIndex {
    async fn full_history(
        &self,
        resource_id: ResourceId,
    ) -> Result<HashMap<String, Vec<LocatorRecord>>, TransportError> {
        let url = format!("{}/offchain/{}", self.base_url, resource_id);
        debug!("Fetching locator history at {}", url);

        let response = self.client.get(&url).send().await?;
        let response = TransportError::check_status(response)?;

        let body = response
            .json::<HistoryResponse>()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;

        Ok(body.categories)
    }
}

/// Content-addressed store serving structured JSON by locator
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn fetch(&self, locator: &str) -> Result<serde_json::Value, TransportError>;
}

/// Content store client over its HTTP gateway
pub struct HttpContentStore {
    base_url: String,
    client: reqwest::Client,
}

impl HttpContentStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn fetch(&self, locator: &str) -> Result<serde_json::Value, TransportError> {
        let url = format!("{}/{}", self.base_url, locator);
        debug!("Fetching content at {}", url);

        let response = self.client.get(&url).send().await?;
        let response = TransportError::check_status(response)?;

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))
    }
}

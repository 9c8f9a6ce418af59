// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Passport Protocol Foundation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::identity::did::DidDocument;
use crate::transport::TransportError;
use crate::types::{Address, Hash32, Role};

/// Read-only client for the DID registry.
///
/// The registry is an external authority; this trait only queries it and
/// distinguishes "unregistered" from "registered but unverified".
#[async_trait]
pub trait DidRegistry: Send + Sync {
    /// Whether a DID hash has a registry entry at all
    async fn is_did_registered(&self, did_hash: &Hash32) -> Result<bool, TransportError>;

    /// Fetch the full DID document for a registered hash
    async fn get_did(&self, did_hash: &Hash32) -> Result<DidDocument, TransportError>;

    /// Authority-side cross-check of the key/role/trust bindings
    async fn validate_did_role(
        &self,
        did_hash: &Hash32,
        role: &Role,
        min_trust: u8,
        account: &Address,
    ) -> Result<bool, TransportError>;
}

/// DID registry client over the registry HTTP gateway
pub struct HttpDidRegistry {
    base_url: String,
    client: reqwest::Client,
}

impl HttpDidRegistry {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct RegisteredResponse {
    registered: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidateRoleRequest<'a> {
    role: String,
    min_trust: u8,
    account: &'a Address,
}

#[derive(Deserialize)]
struct ValidResponse {
    valid: bool,
}

#[async_trait]
impl DidRegistry for HttpDidRegistry {
    async fn is_did_registered(&self, did_hash: &Hash32) -> Result<bool, TransportError> {
        let url = format!("{}/did/{}/registered", self.base_url, did_hash);
        debug!("Checking DID registration at {}", url);

        let response = self.client.get(&url).send().await?;
        let response = TransportError::check_status(response)?;

        let body = response
            .json::<RegisteredResponse>()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;

        Ok(body.registered)
    }

    async fn get_did(&self, did_hash: &Hash32) -> Result<DidDocument, TransportError> {
        let url = format!("{}/did/{}", self.base_url, did_hash);
        debug!("Fetching DID document at {}", url);

        let response = self.client.get(&url).send().await?;
        let response = TransportError::check_status(response)?;

        response
            .json::<DidDocument>()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))
    }

    async fn validate_did_role(
        &self,
        did_hash: &Hash32,
        role: &Role,
        min_trust: u8,
        account: &Address,
    ) -> Result<bool, TransportError> {
        let url = format!("{}/did/{}/validate-role", self.base_url, did_hash);
        let request = ValidateRoleRequest {
            role: role.to_string(),
            min_trust,
            account,
        };

        let response = self.client.post(&url).json(&request).send().await?;
        let response = TransportError::check_status(response)?;

        let body = response
            .json::<ValidResponse>()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;

        Ok(body.valid)
    }
}

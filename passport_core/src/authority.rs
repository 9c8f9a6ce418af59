// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Passport Protocol Foundation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::transport::TransportError;
use crate::types::{Address, Category, Hash32, OrgId, ResourceId, Signature};

/// Resource record as served by the authority's unsigned read
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInfo {
    /// Whether the resource id is known to the authority
    pub exists: bool,
    /// Organization the resource belongs to
    pub organization_id: OrgId,
}

/// Client for the resource authority contract.
///
/// The signed read enforces the challenge signature authority-side; the
/// unsigned reads back the organization scope checks.
#[async_trait]
pub trait ResourceAuthority: Send + Sync {
    /// Signed read: current commitment hash for a category, zero if none
    async fn query_commitment(
        &self,
        category: Category,
        resource_id: ResourceId,
        did_hash: &Hash32,
        signature: &Signature,
    ) -> Result<Hash32, TransportError>;

    /// Unsigned read: resource existence and organization binding
    async fn get_resource(&self, resource_id: ResourceId) -> Result<ResourceInfo, TransportError>;

    /// Unsigned read: organization bound to an account, empty if none
    async fn get_account_organization(&self, account: &Address)
        -> Result<OrgId, TransportError>;
}

/// Resource authority client over the authority HTTP gateway
pub struct HttpResourceAuthority {
    base_url: String,
    client: reqwest::Client,
}

impl HttpResourceAuthority {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CommitmentRequest<'a> {
    did_hash: &'a Hash32,
    signature: &'a Signature,
}

#[derive(Deserialize)]
struct CommitmentResponse {
    commitment: Hash32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrganizationResponse {
    organization_id: OrgId,
}

#[async_trait]
impl ResourceAuthority for HttpResourceAuthority {
    async fn query_commitment(
        &self,
        category: Category,
        resource_id: ResourceId,
        did_hash: &Hash32,
        signature: &Signature,
    ) -> Result<Hash32, TransportError> {
        let url = format!(
            "{}/resource/{}/query/{}",
            self.base_url,
            resource_id,
            category.path_segment()
        );
        debug!("Querying {} commitment at {}", category, url);

        let request = CommitmentRequest {
            did_hash,
            signature,
        };

        let response = self.client.post(&url).json(&request).send().await?;
        let response = TransportError::check_status(response)?;

        let body = response
            .json::<CommitmentResponse>()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;

        Ok(body.commitment)
    }

    async fn get_resource(&self, resource_id: ResourceId) -> Result<ResourceInfo, TransportError> {
        let url = format!("{}/resource/{}", self.base_url, resource_id);

        let response = self.client.get(&url).send().await?;
        let response = TransportError::check_status(response)?;

        response
            .json::<ResourceInfo>()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))
    }

    async fn get_account_organization(
        &self,
        account: &Address,
    ) -> Result<OrgId, TransportError> {
        let url = format!("{}/account/{}/organization", self.base_url, account);

        let response = self.client.get(&url).send().await?;
        let response = TransportError::check_status(response)?;

        let body = response
            .json::<OrganizationResponse>()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;

        Ok(body.organization_id)
    }
}

// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Passport Protocol Foundation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::transport::TransportError;
use crate::types::{Address, OrgId};

/// A verifiable credential as recorded on the ledger.
///
/// Validity is decided by the ledger itself; this struct exists for
/// transport and audit display only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiableCredential {
    /// Deterministic credential identifier
    pub credential_id: String,
    /// DID of the credential subject
    pub subject_did: String,
    /// DID of the issuing authority
    pub issuer: String,
    /// Issuance timestamp
    pub issued_at: DateTime<Utc>,
    /// Expiry timestamp
    pub expires_at: DateTime<Utc>,
    /// Issuer proof blob
    pub proof: String,
}

/// Deterministic credential id for an (organization, subject) pair
pub fn credential_id(organization: &OrgId, account: &Address) -> String {
    format!("vc:{}:{}", organization, account).to_lowercase()
}

/// Read-only validity oracle for verifiable credentials.
///
/// Expiry, proof presence and revocation are combined ledger-side; no
/// local business logic second-guesses the oracle.
#[async_trait]
pub trait CredentialLedger: Send + Sync {
    async fn validate_verifiable_credential(
        &self,
        credential_id: &str,
    ) -> Result<bool, TransportError>;
}

/// Credential ledger client over the ledger HTTP gateway
pub struct HttpCredentialLedger {
    base_url: String,
    client: reqwest::Client,
}

impl HttpCredentialLedger {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct ValidResponse {
    valid: bool,
}

#[async_trait]
impl CredentialLedger for HttpCredentialLedger {
    async fn validate_verifiable_credential(
        &self,
        credential_id: &str,
    ) -> Result<bool, TransportError> {
        let url = format!("{}/credential/{}/valid", self.base_url, credential_id);
        debug!("Validating credential at {}", url);

        let response = self.client.get(&url).send().await?;
        let response = TransportError::check_status(response)?;

        let body = response
            .json::<ValidResponse>()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))?;

        Ok(body.valid)
    }
}

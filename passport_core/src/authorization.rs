// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Passport Protocol Foundation

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::TrustPolicy;
use crate::identity::credential::{credential_id, CredentialLedger};
use crate::identity::did::{canonical_did_uri, did_hash};
use crate::identity::registry::DidRegistry;
use crate::organization::OrganizationScopeResolver;
use crate::signing::challenge::{ChallengeSigner, SignerError};
use crate::transport::TransportError;
use crate::types::{Address, Category, Hash32, OrgId, ResourceId, Role, Signature};

/// A single protected-read authorization request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    /// Requesting on-chain account
    pub account: Address,
    /// Organization the requester acts for; feeds DID canonicalization
    pub organization: OrgId,
    /// Role the requester wants to exercise
    pub role: Role,
    /// Resource being read
    pub resource_id: ResourceId,
    /// Protected data category being read
    pub category: Category,
    /// Optional override of the per-role trust requirement
    #[serde(default)]
    pub min_trust: Option<u8>,
}

/// Positive authorization outcome; ephemeral, never persisted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grant {
    /// Challenge signature to present to the authority
    pub signature: Signature,
    /// Hash of the requester's canonical DID
    pub did_hash: Hash32,
}

/// Terminal policy denials, one per chain step.
///
/// Each carries the expected-vs-actual detail for precise user messaging;
/// denials are never collapsed into a generic "unauthorized" and never
/// retried automatically.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Denial {
    #[error("Verifiable credential '{credential_id}' is not valid")]
    CredentialInvalid { credential_id: String },

    #[error("DID '{uri}' is not registered")]
    DidNotRegistered { uri: String },

    #[error("DID '{uri}' is registered but not verified")]
    DidNotVerified { uri: String },

    #[error("DID is bound to {expected} but the request came from {actual}")]
    SignerMismatch { expected: Address, actual: Address },

    #[error("Role '{requested}' is not held by the DID (held: {held:?})")]
    RoleMissing { requested: Role, held: Vec<String> },

    #[error("Trust level {actual} is below the required {required}")]
    TrustLevelInsufficient { required: u8, actual: u8 },

    #[error("Account {account} belongs to no organization")]
    NoOrganization { account: Address },

    #[error("Requester organization '{requester_org}' does not match resource organization '{resource_org}'")]
    OrganizationMismatch {
        requester_org: OrgId,
        resource_org: OrgId,
    },

    #[error("Signature request rejected by user")]
    SigningRejected,
}

/// Authorization outcome: a structured denial or a transport failure
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Denied(#[from] Denial),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// The policy core: one ordered, fail-fast decision chain.
///
/// The step order is a fixed contract: each step yields a distinct,
/// actionable denial, so reordering changes observable behavior. Trust
/// requirements come from the injected [`TrustPolicy`], never from
/// literals inside the engine.
pub struct AuthorizationEngine {
    registry: Arc<dyn DidRegistry>,
    credentials: Arc<dyn CredentialLedger>,
    organizations: Arc<dyn OrganizationScopeResolver>,
    signer: ChallengeSigner,
    policy: TrustPolicy,
}

impl AuthorizationEngine {
    pub fn new(
        registry: Arc<dyn DidRegistry>,
        credentials: Arc<dyn CredentialLedger>,
        organizations: Arc<dyn OrganizationScopeResolver>,
        signer: ChallengeSigner,
        policy: TrustPolicy,
    ) -> Self {
        Self {
            registry,
            credentials,
            organizations,
            signer,
            policy,
        }
    }

    /// Run the full decision chain for one request.
    ///
    /// Stateless and idempotent: repeated calls with unchanged external
    /// state return the same decision.
    pub async fn authorize(&self, request: &AuthorizationRequest) -> Result<Grant, AuthError> {
        // Step 1: canonical DID name and hash
        let uri = canonical_did_uri(&request.organization, &request.account);
        let requester_hash = did_hash(&uri);
        debug!("Authorizing {} as '{}' ({})", request.account, uri, requester_hash);

        // Step 2: credential validity (opaque oracle)
        let cred_id = credential_id(&request.organization, &request.account);
        if !self
            .credentials
            .validate_verifiable_credential(&cred_id)
            .await?
        {
            return Err(Denial::CredentialInvalid {
                credential_id: cred_id,
            }
            .into());
        }

        // Step 3: registration
        if !self.registry.is_did_registered(&requester_hash).await? {
            return Err(Denial::DidNotRegistered { uri }.into());
        }

        let details = self.registry.get_did(&requester_hash).await?;

        // Step 4: verification flag
        if !details.verified {
            return Err(Denial::DidNotVerified { uri }.into());
        }

        // Step 5: key binding; a role may only be exercised by the bound account
        if details.public_key != request.account {
            return Err(Denial::SignerMismatch {
                expected: details.public_key,
                actual: request.account,
            }
            .into());
        }

        // Step 6: role membership
        if !details.roles.iter().any(|r| request.role.matches_name(r)) {
            return Err(Denial::RoleMissing {
                requested: request.role.clone(),
                held: details.roles.clone(),
            }
            .into());
        }

        // Step 7: trust threshold
        let required = request
            .min_trust
            .unwrap_or_else(|| self.policy.required_trust_for(&request.role));
        if details.trust_level < required {
            return Err(Denial::TrustLevelInsufficient {
                required,
                actual: details.trust_level,
            }
            .into());
        }

        // Step 8: requester must belong to an organization
        let requester_org = self
            .organizations
            .organization_of(&request.account)
            .await?
            .ok_or(Denial::NoOrganization {
                account: request.account,
            })?;

        // Step 9: organization scope, unless the override role applies
        let resource_org = self
            .organizations
            .organization_of_resource(request.resource_id)
            .await?;
        if requester_org != resource_org
            && !self.policy.grants_override(&request.role, details.trust_level)
        {
            return Err(Denial::OrganizationMismatch {
                requester_org,
                resource_org,
            }
            .into());
        }

        // Step 10: challenge signature bound to (resource, account, query kind)
        let signature = match self
            .signer
            .sign(request.category, request.resource_id, &request.account)
            .await
        {
            Ok(signature) => signature,
            Err(SignerError::Rejected) => return Err(Denial::SigningRejected.into()),
            Err(SignerError::Unavailable(m)) => {
                return Err(TransportError::Unavailable(m).into())
            }
            Err(SignerError::InvalidResponse(m)) => {
                return Err(TransportError::InvalidResponse(m).into())
            }
        };

        info!(
            "Authorization granted: {} may read {} of resource {}",
            request.account, request.category, request.resource_id
        );

        Ok(Grant {
            signature,
            did_hash: requester_hash,
        })
    }
}

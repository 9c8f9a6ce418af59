// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Passport Protocol Foundation

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::authority::ResourceAuthority;
use crate::authorization::{AuthError, AuthorizationEngine, AuthorizationRequest, Denial};
use crate::integrity::{ContentIntegrityVerifier, IntegrityError};
use crate::offchain::OffchainIndex;
use crate::transport::TransportError;
use crate::types::{Category, Hash32, ResourceId};

/// Terminal outcome of a protected query
#[derive(Debug, Error)]
pub enum QueryError {
    /// Policy denial from the authorization chain; terminal
    #[error(transparent)]
    Denied(Denial),

    /// The authority holds no commitment for this (resource, category).
    /// Distinct from an integrity violation.
    #[error("No data committed for {category} of resource {resource_id}")]
    NoDataCommitted {
        resource_id: ResourceId,
        category: Category,
    },

    /// Commitment and recomputed locator hash disagree; never downgraded,
    /// never bypassed
    #[error("Content integrity mismatch: expected {expected}, computed {computed}")]
    IntegrityMismatch { expected: Hash32, computed: Hash32 },

    /// Off-chain data unavailable for a present commitment
    #[error("Off-chain backend data missing: {0}")]
    BackendDataMissing(String),

    /// Transport failure; the only retry-eligible outcome
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl QueryError {
    /// Whether a caller-driven retry can possibly change the outcome
    pub fn is_retryable(&self) -> bool {
        matches!(self, QueryError::Transport(_))
    }
}

impl From<AuthError> for QueryError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Denied(denial) => QueryError::Denied(denial),
            AuthError::Transport(transport) => QueryError::Transport(transport),
        }
    }
}

impl From<IntegrityError> for QueryError {
    fn from(err: IntegrityError) -> Self {
        match err {
            IntegrityError::Mismatch { expected, computed } => {
                QueryError::IntegrityMismatch { expected, computed }
            }
            IntegrityError::DataMissing(detail) => QueryError::BackendDataMissing(detail),
        }
    }
}

/// A payload whose on-chain commitment has been verified
#[derive(Debug, Clone, Serialize)]
pub struct VerifiedPayload {
    pub resource_id: ResourceId,
    pub category: Category,
    /// The on-chain commitment the content was verified against
    pub commitment: Hash32,
    /// The authoritative locator that produced the content
    pub locator: String,
    /// The parsed off-chain content
    pub content: serde_json::Value,
}

/// Top-level entry point: authorize, fetch the commitment, verify
/// integrity, return the payload.
///
/// Stateless across invocations; a failed or abandoned pipeline leaves no
/// partial state and is safely re-invocable.
pub struct QueryExecutor {
    engine: AuthorizationEngine,
    authority: Arc<dyn ResourceAuthority>,
    offchain: Arc<dyn OffchainIndex>,
    verifier: ContentIntegrityVerifier,
}

impl QueryExecutor {
    pub fn new(
        engine: AuthorizationEngine,
        authority: Arc<dyn ResourceAuthority>,
        offchain: Arc<dyn OffchainIndex>,
        verifier: ContentIntegrityVerifier,
    ) -> Self {
        Self {
            engine,
            authority,
            offchain,
            verifier,
        }
    }

    /// Run the full protected-read pipeline for one category
    pub async fn query(
        &self,
        request: &AuthorizationRequest,
    ) -> Result<VerifiedPayload, QueryError> {
        let grant = self.engine.authorize(request).await?;

        let commitment = self
            .authority
            .query_commitment(
                request.category,
                request.resource_id,
                &grant.did_hash,
                &grant.signature,
            )
            .await?;

        if commitment.is_zero() {
            debug!(
                "No {} commitment for resource {}",
                request.category, request.resource_id
            );
            return Err(QueryError::NoDataCommitted {
                resource_id: request.resource_id,
                category: request.category,
            });
        }

        let history = self
            .offchain
            .locator_history(request.resource_id, request.category)
            .await?;

        let verified = self.verifier.verify(&commitment, &history).await?;

        info!(
            "Verified {} payload for resource {} from locator '{}'",
            request.category, request.resource_id, verified.locator
        );

        Ok(VerifiedPayload {
            resource_id: request.resource_id,
            category: request.category,
            commitment,
            locator: verified.locator,
            content: verified.content,
        })
    }

    /// Fetch several categories of one resource concurrently.
    ///
    /// A display-path convenience: the per-category pipelines share no
    /// ordering dependency, so they may be issued together. Failures stay
    /// per-category and do not abort the others.
    pub async fn query_categories(
        &self,
        request: &AuthorizationRequest,
        categories: &[Category],
    ) -> Vec<(Category, Result<VerifiedPayload, QueryError>)> {
        let pipelines = categories.iter().map(|category| {
            let mut per_category = request.clone();
            per_category.category = *category;
            async move { (*category, self.query(&per_category).await) }
        });

        let results = join_all(pipelines).await;
        for (category, result) in &results {
            if let Err(err) = result {
                warn!("Category {} failed: {}", category, err);
            }
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use crate::authority::ResourceInfo;
    use crate::config::{SigningDomainConfig, TrustPolicy};
    use crate::identity::credential::CredentialLedger;
    use crate::identity::did::{canonical_did_uri, DidDocument};
    use crate::identity::registry::DidRegistry;
    use crate::offchain::{ContentStore, LocatorRecord};
    use crate::organization::OrganizationScopeResolver;
    use crate::signing::challenge::{ChallengeSigner, SignerError, WalletProvider};
    use crate::signing::typed_data::{keccak256, TypedData};
    use crate::types::{Address, OrgId, Role, Signature};

    fn account() -> Address {
        Address::from_hex("0xabcdef0123456789abcdef0123456789abcdef01").unwrap()
    }

    struct AllowAllRegistry;

    #[async_trait]
    impl DidRegistry for AllowAllRegistry {
        async fn is_did_registered(&self, _did_hash: &Hash32) -> Result<bool, TransportError> {
            Ok(true)
        }

        async fn get_did(&self, _did_hash: &Hash32) -> Result<DidDocument, TransportError> {
            Ok(DidDocument {
                uri: canonical_did_uri(&OrgId::new("acme"), &account()),
                public_key: account(),
                trust_level: 3,
                verified: true,
                service_endpoints: vec![],
                roles: vec!["SUPPLIER".to_string()],
            })
        }

        async fn validate_did_role(
            &self,
            _did_hash: &Hash32,
            _role: &Role,
            _min_trust: u8,
            _account: &Address,
        ) -> Result<bool, TransportError> {
            Ok(true)
        }
    }

    struct AllowAllCredentials;

    #[async_trait]
    impl CredentialLedger for AllowAllCredentials {
        async fn validate_verifiable_credential(
            &self,
            _credential_id: &str,
        ) -> Result<bool, TransportError> {
            Ok(true)
        }
    }

    struct SameOrgScopes;

    #[async_trait]
    impl OrganizationScopeResolver for SameOrgScopes {
        async fn organization_of(
            &self,
            _account: &Address,
        ) -> Result<Option<OrgId>, TransportError> {
            Ok(Some(OrgId::new("acme")))
        }

        async fn organization_of_resource(
            &self,
            _resource_id: ResourceId,
        ) -> Result<OrgId, TransportError> {
            Ok(OrgId::new("acme"))
        }
    }

    struct TestWallet;

    #[async_trait]
    impl WalletProvider for TestWallet {
        async fn request_accounts(&self) -> Result<Vec<Address>, SignerError> {
            Ok(vec![account()])
        }

        async fn sign_typed_data(
            &self,
            _account: &Address,
            typed_data: &TypedData,
        ) -> Result<Signature, SignerError> {
            Ok(Signature::from_bytes(typed_data.signing_digest().to_vec()))
        }
    }

    /// Authority serving fixed commitments and counting signed reads
    struct StaticAuthority {
        commitments: HashMap<Category, Hash32>,
        signed_reads: AtomicU32,
    }

    impl StaticAuthority {
        fn new(commitments: HashMap<Category, Hash32>) -> Self {
            Self {
                commitments,
                signed_reads: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl ResourceAuthority for StaticAuthority {
        async fn query_commitment(
            &self,
            category: Category,
            _resource_id: ResourceId,
            _did_hash: &Hash32,
            signature: &Signature,
        ) -> Result<Hash32, TransportError> {
            assert!(!signature.as_bytes().is_empty());
            self.signed_reads.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .commitments
                .get(&category)
                .copied()
                .unwrap_or_else(Hash32::zero))
        }

        async fn get_resource(
            &self,
            _resource_id: ResourceId,
        ) -> Result<ResourceInfo, TransportError> {
            Ok(ResourceInfo {
                exists: true,
                organization_id: OrgId::new("acme"),
            })
        }

        async fn get_account_organization(
            &self,
            _account: &Address,
        ) -> Result<OrgId, TransportError> {
            Ok(OrgId::new("acme"))
        }
    }

    struct StaticIndex {
        histories: HashMap<String, Vec<LocatorRecord>>,
    }

    #[async_trait]
    impl OffchainIndex for StaticIndex {
        async fn full_history(
            &self,
            _resource_id: ResourceId,
        ) -> Result<HashMap<String, Vec<LocatorRecord>>, TransportError> {
            Ok(self.histories.clone())
        }
    }

    struct StaticStore {
        contents: HashMap<String, serde_json::Value>,
    }

    #[async_trait]
    impl ContentStore for StaticStore {
        async fn fetch(&self, locator: &str) -> Result<serde_json::Value, TransportError> {
            self.contents
                .get(locator)
                .cloned()
                .ok_or_else(|| TransportError::Unavailable(format!("no content at {}", locator)))
        }
    }

    fn record(locator: &str) -> LocatorRecord {
        LocatorRecord {
            locator: locator.to_string(),
            recorded_at: Utc::now(),
        }
    }

    fn commitment_for(locator: &str) -> Hash32 {
        Hash32::from_bytes(keccak256(locator.as_bytes()))
    }

    fn engine() -> AuthorizationEngine {
        let signing = SigningDomainConfig {
            domain_name: "PassportAuthority".to_string(),
            domain_version: "1".to_string(),
            chain_id: 31337,
            verifying_contract: Address::zero(),
        };
        AuthorizationEngine::new(
            Arc::new(AllowAllRegistry),
            Arc::new(AllowAllCredentials),
            Arc::new(SameOrgScopes),
            ChallengeSigner::new(&signing, Arc::new(TestWallet)),
            TrustPolicy::default(),
        )
    }

    struct Harness {
        authority: Arc<StaticAuthority>,
        executor: QueryExecutor,
    }

    fn harness(
        commitments: HashMap<Category, Hash32>,
        histories: HashMap<String, Vec<LocatorRecord>>,
        contents: HashMap<String, serde_json::Value>,
    ) -> Harness {
        let authority = Arc::new(StaticAuthority::new(commitments));
        let executor = QueryExecutor::new(
            engine(),
            authority.clone(),
            Arc::new(StaticIndex { histories }),
            ContentIntegrityVerifier::new(Arc::new(StaticStore { contents })),
        );
        Harness {
            authority,
            executor,
        }
    }

    fn request(category: Category) -> AuthorizationRequest {
        AuthorizationRequest {
            account: account(),
            organization: OrgId::new("acme"),
            role: Role::Supplier,
            resource_id: 7,
            category,
            min_trust: None,
        }
    }

    #[tokio::test]
    async fn full_pipeline_returns_verified_payload() {
        let harness = harness(
            HashMap::from([(Category::Sustainability, commitment_for("QmLatest"))]),
            HashMap::from([(
                "sustainability".to_string(),
                vec![record("QmOld"), record("QmLatest")],
            )]),
            HashMap::from([("QmLatest".to_string(), json!({"co2_kg": 12.5}))]),
        );

        let payload = harness
            .executor
            .query(&request(Category::Sustainability))
            .await
            .unwrap();
        assert_eq!(payload.locator, "QmLatest");
        assert_eq!(payload.content, json!({"co2_kg": 12.5}));
        assert_eq!(payload.commitment, commitment_for("QmLatest"));
        assert_eq!(harness.authority.signed_reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_commitment_is_no_data_committed() {
        let harness = harness(
            HashMap::from([(Category::Sustainability, Hash32::zero())]),
            HashMap::from([(
                "sustainability".to_string(),
                vec![record("QmLatest")],
            )]),
            HashMap::from([("QmLatest".to_string(), json!({}))]),
        );

        let result = harness
            .executor
            .query(&request(Category::Sustainability))
            .await;
        match result {
            Err(QueryError::NoDataCommitted {
                resource_id,
                category,
            }) => {
                assert_eq!(resource_id, 7);
                assert_eq!(category, Category::Sustainability);
            }
            other => panic!("expected NoDataCommitted, got {:?}", other.is_ok()),
        }
    }

    #[tokio::test]
    async fn mismatched_commitment_never_returns_payload() {
        let harness = harness(
            HashMap::from([(Category::Sustainability, commitment_for("QmSomethingElse"))]),
            HashMap::from([(
                "sustainability".to_string(),
                vec![record("QmLatest")],
            )]),
            HashMap::from([("QmLatest".to_string(), json!({"secret": true}))]),
        );

        let result = harness
            .executor
            .query(&request(Category::Sustainability))
            .await;
        assert!(matches!(result, Err(QueryError::IntegrityMismatch { .. })));
    }

    #[tokio::test]
    async fn missing_offchain_history_is_backend_data_missing() {
        let harness = harness(
            HashMap::from([(Category::Sustainability, commitment_for("QmLatest"))]),
            HashMap::new(),
            HashMap::new(),
        );

        let result = harness
            .executor
            .query(&request(Category::Sustainability))
            .await;
        match result {
            Err(err @ QueryError::BackendDataMissing(_)) => assert!(!err.is_retryable()),
            other => panic!("expected BackendDataMissing, got {:?}", other.is_ok()),
        }
    }

    #[tokio::test]
    async fn denial_propagates_without_touching_the_authority() {
        let harness = harness(
            HashMap::from([(Category::Sustainability, commitment_for("QmLatest"))]),
            HashMap::from([(
                "sustainability".to_string(),
                vec![record("QmLatest")],
            )]),
            HashMap::from([("QmLatest".to_string(), json!({}))]),
        );

        // The registry document only grants SUPPLIER
        let mut req = request(Category::Sustainability);
        req.role = Role::Manufacturer;

        let result = harness.executor.query(&req).await;
        assert!(matches!(
            result,
            Err(QueryError::Denied(Denial::RoleMissing { .. }))
        ));
        assert_eq!(harness.authority.signed_reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn query_categories_keeps_failures_per_category() {
        let harness = harness(
            HashMap::from([
                (Category::Sustainability, commitment_for("QmSus")),
                (Category::Technical, Hash32::zero()),
            ]),
            HashMap::from([(
                "sustainability".to_string(),
                vec![record("QmSus")],
            )]),
            HashMap::from([("QmSus".to_string(), json!({"ok": true}))]),
        );

        let results = harness
            .executor
            .query_categories(
                &request(Category::Sustainability),
                &[Category::Sustainability, Category::Technical],
            )
            .await;

        assert_eq!(results.len(), 2);
        assert!(results[0].1.is_ok());
        assert!(matches!(
            results[1].1,
            Err(QueryError::NoDataCommitted { .. })
        ));
    }
}

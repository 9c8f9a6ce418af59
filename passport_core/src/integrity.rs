// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Passport Protocol Foundation

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, warn};

use crate::offchain::{ContentStore, LocatorRecord};
use crate::signing::typed_data::keccak256;
use crate::types::Hash32;

/// Integrity verification failures
#[derive(Debug, Error)]
pub enum IntegrityError {
    /// The recomputed locator hash does not match the on-chain commitment.
    /// Always fatal; content is never served on mismatch.
    #[error("Content commitment mismatch: expected {expected}, computed {computed}")]
    Mismatch { expected: Hash32, computed: Hash32 },

    /// The off-chain side has no usable data for a present commitment
    /// (missing history, unreachable or unparsable content). A timing or
    /// configuration issue, not a trust violation.
    #[error("Off-chain backend data missing: {0}")]
    DataMissing(String),
}

/// Content accepted by the verifier: the authoritative locator and the
/// parsed payload it served
#[derive(Debug, Clone)]
pub struct VerifiedContent {
    pub locator: String,
    pub content: serde_json::Value,
}

/// Binds an on-chain commitment hash to independently-fetched off-chain
/// content.
///
/// The commitment convention is locator-string hashing: the candidate is
/// `keccak256(utf8(locator))`, never a hash of the fetched bytes.
pub struct ContentIntegrityVerifier {
    store: Arc<dyn ContentStore>,
}

impl ContentIntegrityVerifier {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Recompute the latest locator's hash against the expected commitment
    /// and, only on match, fetch and parse the content it points to.
    pub async fn verify(
        &self,
        expected: &Hash32,
        history: &[LocatorRecord],
    ) -> Result<VerifiedContent, IntegrityError> {
        let latest = history.last().ok_or_else(|| {
            IntegrityError::DataMissing("no off-chain locator recorded".to_string())
        })?;

        if history.len() > 1 {
            debug!(
                "{} historical locators retained for audit; only the latest is compared",
                history.len() - 1
            );
        }

        let computed = Hash32::from_bytes(keccak256(latest.locator.as_bytes()));
        if computed != *expected {
            error!(
                "Commitment mismatch for locator '{}': expected {}, computed {}",
                latest.locator, expected, computed
            );
            return Err(IntegrityError::Mismatch {
                expected: *expected,
                computed,
            });
        }

        debug!(
            "Commitment {} verified against locator '{}'",
            expected, latest.locator
        );

        let content = self.store.fetch(&latest.locator).await.map_err(|e| {
            warn!("Verified locator '{}' could not be fetched: {}", latest.locator, e);
            IntegrityError::DataMissing(format!(
                "content fetch failed for locator '{}': {}",
                latest.locator, e
            ))
        })?;

        Ok(VerifiedContent {
            locator: latest.locator.clone(),
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use crate::transport::TransportError;

    struct InMemoryStore {
        contents: HashMap<String, serde_json::Value>,
    }

    #[async_trait]
    impl ContentStore for InMemoryStore {
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

    fn verifier_with(contents: &[(&str, serde_json::Value)]) -> ContentIntegrityVerifier {
        let store = InMemoryStore {
            contents: contents
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        };
        ContentIntegrityVerifier::new(Arc::new(store))
    }

    #[tokio::test]
    async fn accepts_matching_commitment_and_serves_content() {
        let verifier = verifier_with(&[("QmLatest", json!({"co2_kg": 12.5}))]);
        let history = vec![record("QmOld"), record("QmLatest")];

        let verified = verifier
            .verify(&commitment_for("QmLatest"), &history)
            .await
            .unwrap();
        assert_eq!(verified.locator, "QmLatest");
        assert_eq!(verified.content, json!({"co2_kg": 12.5}));
    }

    #[tokio::test]
    async fn rejects_any_other_commitment() {
        let verifier = verifier_with(&[("QmLatest", json!({}))]);
        let history = vec![record("QmLatest")];

        for wrong in [
            Hash32::zero(),
            commitment_for("QmOther"),
            // A truncated-then-padded hash is just another wrong value
            Hash32::from_hex("0x1f3a000000000000000000000000000000000000000000000000000000000000")
                .unwrap(),
        ] {
            let result = verifier.verify(&wrong, &history).await;
            assert!(matches!(result, Err(IntegrityError::Mismatch { .. })));
        }
    }

    #[tokio::test]
    async fn only_the_latest_locator_is_compared() {
        // The commitment matches an older history entry; that must never
        // be accepted in place of the latest one.
        let verifier = verifier_with(&[("QmL0", json!({})), ("QmL2", json!({}))]);
        let history = vec![record("QmL0"), record("QmL1"), record("QmL2")];

        let result = verifier.verify(&commitment_for("QmL0"), &history).await;
        assert!(matches!(result, Err(IntegrityError::Mismatch { .. })));

        let ok = verifier.verify(&commitment_for("QmL2"), &history).await;
        assert!(ok.is_ok());
    }

    #[tokio::test]
    async fn fetch_failure_on_latest_is_data_missing_not_fallback() {
        // QmL2 hashes correctly but the store cannot serve it; QmL0 is
        // fetchable but must not be silently selected.
        let verifier = verifier_with(&[("QmL0", json!({"stale": true}))]);
        let history = vec![record("QmL0"), record("QmL1"), record("QmL2")];

        let result = verifier.verify(&commitment_for("QmL2"), &history).await;
        assert!(matches!(result, Err(IntegrityError::DataMissing(_))));
    }

    #[tokio::test]
    async fn empty_history_is_data_missing() {
        let verifier = verifier_with(&[]);
        let result = verifier.verify(&commitment_for("QmAny"), &[]).await;
        assert!(matches!(result, Err(IntegrityError::DataMissing(_))));
    }
}

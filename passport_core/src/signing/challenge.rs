// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Passport Protocol Foundation

use std::sync::Arc;

use async_trait::async_trait;
use k256::ecdsa::{RecoveryId, SigningKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::config::SigningDomainConfig;
use crate::signing::typed_data::{keccak256, QueryMessage, TypedData, TypedDataDomain};
use crate::types::{Address, Category, ResourceId, Signature};

/// EIP-1193 error code for a user-rejected request
const USER_REJECTED_CODE: i64 = 4001;

/// Errors raised while requesting a challenge signature
#[derive(Debug, Error)]
pub enum SignerError {
    /// The user declined the signature prompt; terminal and non-retryable
    #[error("Signature request rejected by user")]
    Rejected,

    /// No provider reachable or no account available
    #[error("Wallet provider unavailable: {0}")]
    Unavailable(String),

    #[error("Wallet provider returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// A connected wallet able to sign structured data.
///
/// Implementations return opaque signature bytes and never verify them;
/// the authority recomputes the digest and checks the signature itself.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Accounts the provider is willing to sign for
    async fn request_accounts(&self) -> Result<Vec<Address>, SignerError>;

    /// Sign an EIP-712 payload with the given account
    async fn sign_typed_data(
        &self,
        account: &Address,
        typed_data: &TypedData,
    ) -> Result<Signature, SignerError>;
}

/// Wallet provider speaking JSON-RPC (`eth_requestAccounts`,
/// `eth_signTypedData_v4`)
pub struct RpcWalletProvider {
    rpc_url: String,
    client: reqwest::Client,
}

impl RpcWalletProvider {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            client: reqwest::Client::new(),
        }
    }

    async fn call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, SignerError> {
        #[derive(Deserialize)]
        struct RpcError {
            code: i64,
            message: String,
        }

        #[derive(Deserialize)]
        struct RpcResponse {
            result: Option<serde_json::Value>,
            error: Option<RpcError>,
        }

        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| SignerError::Unavailable(e.to_string()))?;

        let body = response
            .json::<RpcResponse>()
            .await
            .map_err(|e| SignerError::InvalidResponse(e.to_string()))?;

        if let Some(error) = body.error {
            if error.code == USER_REJECTED_CODE {
                return Err(SignerError::Rejected);
            }
            return Err(SignerError::InvalidResponse(format!(
                "RPC error {}: {}",
                error.code, error.message
            )));
        }

        body.result
            .ok_or_else(|| SignerError::InvalidResponse("missing result".to_string()))
    }
}

#[async_trait]
impl WalletProvider for RpcWalletProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, SignerError> {
        let result = self.call("eth_requestAccounts", json!([])).await?;

        let raw: Vec<String> = serde_json::from_value(result)
            .map_err(|e| SignerError::InvalidResponse(e.to_string()))?;

        raw.iter()
            .map(|s| Address::from_hex(s))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SignerError::InvalidResponse(e.to_string()))
    }

    async fn sign_typed_data(
        &self,
        account: &Address,
        typed_data: &TypedData,
    ) -> Result<Signature, SignerError> {
        let payload = typed_data.to_eip712_json().to_string();
        let result = self
            .call(
                "eth_signTypedData_v4",
                json!([account.to_string(), payload]),
            )
            .await?;

        let raw: String = serde_json::from_value(result)
            .map_err(|e| SignerError::InvalidResponse(e.to_string()))?;

        Signature::from_hex(&raw).map_err(|e| SignerError::InvalidResponse(e.to_string()))
    }
}

/// In-process wallet over a k256 ECDSA key.
///
/// Backs the debug CLI and tests, where no browser wallet is attached.
/// Signs the EIP-712 digest directly and emits the usual 65-byte
/// `r ‖ s ‖ v` layout with `v` in {27, 28}.
pub struct LocalWallet {
    signing_key: SigningKey,
    address: Address,
}

impl LocalWallet {
    pub fn from_secret_hex(secret: &str) -> Result<Self, SignerError> {
        let body = secret.strip_prefix("0x").unwrap_or(secret);
        let bytes = hex::decode(body)
            .map_err(|e| SignerError::Unavailable(format!("invalid signer key: {}", e)))?;
        let signing_key = SigningKey::from_slice(&bytes)
            .map_err(|e| SignerError::Unavailable(format!("invalid signer key: {}", e)))?;
        let address = Self::derive_address(&signing_key);
        Ok(Self {
            signing_key,
            address,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    fn derive_address(signing_key: &SigningKey) -> Address {
        let point = signing_key.verifying_key().to_encoded_point(false);
        let digest = keccak256(&point.as_bytes()[1..]);
        let mut raw = [0u8; 20];
        raw.copy_from_slice(&digest[12..]);
        Address::from_bytes(raw)
    }
}

#[async_trait]
impl WalletProvider for LocalWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, SignerError> {
        Ok(vec![self.address])
    }

    async fn sign_typed_data(
        &self,
        account: &Address,
        typed_data: &TypedData,
    ) -> Result<Signature, SignerError> {
        if *account != self.address {
            return Err(SignerError::Unavailable(format!(
                "no key for account {}",
                account
            )));
        }

        let digest = typed_data.signing_digest();
        let (signature, recovery_id): (k256::ecdsa::Signature, RecoveryId) = self
            .signing_key
            .sign_prehash_recoverable(&digest)
            .map_err(|e| SignerError::InvalidResponse(e.to_string()))?;

        let mut bytes = signature.to_bytes().to_vec();
        bytes.push(27 + recovery_id.to_byte());
        Ok(Signature::from_bytes(bytes))
    }
}

/// Builds the structured challenge for a protected query and requests the
/// connected signer to sign it
pub struct ChallengeSigner {
    domain: TypedDataDomain,
    wallet: Arc<dyn WalletProvider>,
}

impl ChallengeSigner {
    pub fn new(signing: &SigningDomainConfig, wallet: Arc<dyn WalletProvider>) -> Self {
        Self {
            domain: TypedDataDomain::from(signing),
            wallet,
        }
    }

    /// The structured payload bound to (resource, requester, query kind)
    pub fn challenge(
        &self,
        category: Category,
        resource_id: ResourceId,
        requester: Address,
    ) -> TypedData {
        TypedData {
            domain: self.domain.clone(),
            category,
            message: QueryMessage {
                resource_id,
                requester,
            },
        }
    }

    /// Request a structured-data signature for a query challenge
    pub async fn sign(
        &self,
        category: Category,
        resource_id: ResourceId,
        requester: &Address,
    ) -> Result<Signature, SignerError> {
        let typed_data = self.challenge(category, resource_id, *requester);
        debug!(
            "Requesting {} signature for resource {} from {}",
            typed_data.category.primary_type(),
            resource_id,
            requester
        );
        self.wallet.sign_typed_data(requester, &typed_data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::VerifyingKey;

    const SECRET: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    fn signer(wallet: Arc<dyn WalletProvider>) -> ChallengeSigner {
        let config = SigningDomainConfig {
            domain_name: "PassportAuthority".to_string(),
            domain_version: "1".to_string(),
            chain_id: 31337,
            verifying_contract: Address::from_hex(
                "0x5FbDB2315678afecb367f032d93F642f64180aa3",
            )
            .unwrap(),
        };
        ChallengeSigner::new(&config, wallet)
    }

    #[tokio::test]
    async fn local_wallet_produces_recoverable_signature() {
        let wallet = Arc::new(LocalWallet::from_secret_hex(SECRET).unwrap());
        let account = wallet.address();
        let signer = signer(wallet.clone());

        let typed_data = signer.challenge(Category::Sustainability, 7, account);
        let signature = signer
            .sign(Category::Sustainability, 7, &account)
            .await
            .unwrap();

        assert_eq!(signature.as_bytes().len(), 65);
        let v = signature.as_bytes()[64];
        assert!(v == 27 || v == 28);

        // Recovering the signer from the digest must yield the wallet key
        let ecdsa = k256::ecdsa::Signature::from_slice(&signature.as_bytes()[..64]).unwrap();
        let recovery_id = RecoveryId::from_byte(v - 27).unwrap();
        let recovered = VerifyingKey::recover_from_prehash(
            &typed_data.signing_digest(),
            &ecdsa,
            recovery_id,
        )
        .unwrap();
        assert_eq!(recovered, *wallet.signing_key.verifying_key());
    }

    #[tokio::test]
    async fn local_wallet_signing_is_deterministic() {
        let wallet = Arc::new(LocalWallet::from_secret_hex(SECRET).unwrap());
        let account = wallet.address();
        let signer = signer(wallet);

        let a = signer.sign(Category::Technical, 9, &account).await.unwrap();
        let b = signer.sign(Category::Technical, 9, &account).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn local_wallet_refuses_unknown_account() {
        let wallet = Arc::new(LocalWallet::from_secret_hex(SECRET).unwrap());
        let signer = signer(wallet);
        let other = Address::from_hex("0x0000000000000000000000000000000000000001").unwrap();

        let result = signer.sign(Category::Technical, 9, &other).await;
        assert!(matches!(result, Err(SignerError::Unavailable(_))));
    }
}

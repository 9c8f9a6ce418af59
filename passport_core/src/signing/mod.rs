// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Passport Protocol Foundation

//! EIP-712 structured-data construction and challenge signing.

pub mod challenge;
pub mod typed_data;

// Re-export commonly used items
pub use challenge::{ChallengeSigner, LocalWallet, RpcWalletProvider, SignerError, WalletProvider};
pub use typed_data::{keccak256, QueryMessage, TypedData, TypedDataDomain};

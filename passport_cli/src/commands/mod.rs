// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Passport Protocol Foundation

pub mod authorize;
pub mod query;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

use passport_core::{
    AuthorizationRequest, Denial, LocalWallet, PassportConfig, RpcWalletProvider, WalletProvider,
};

/// Arguments shared by every protocol invocation
#[derive(Debug, Clone, Args)]
pub struct RequestArgs {
    /// Path to a YAML protocol config; defaults apply when omitted
    #[arg(short, long)]
    pub config: Option<std::path::PathBuf>,

    /// Requesting account address (defaults to the local signer's address)
    #[arg(short, long)]
    pub account: Option<String>,

    /// Organization the requester acts for
    #[arg(short, long)]
    pub organization: String,

    /// Role to exercise (supplier, recycler, manufacturer, government)
    #[arg(short = 'r', long)]
    pub role: String,

    /// Resource id to read
    #[arg(short = 'i', long)]
    pub resource_id: u64,

    /// Data category to read
    #[arg(short = 'C', long, default_value = "sustainability")]
    pub category: String,

    /// Optional trust-level override for the role table
    #[arg(short = 't', long)]
    pub min_trust: Option<u8>,

    /// Hex secret key for a local signer; uses the wallet RPC when omitted
    #[arg(long, env = "PASSPORT_SIGNER_KEY")]
    pub secret_key: Option<String>,
}

pub fn load_config(path: Option<&Path>) -> Result<PassportConfig> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_yaml::from_str(&raw)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        }
        None => Ok(PassportConfig::default()),
    }
}

/// Build the wallet and resolve the request from the shared arguments.
///
/// Without an explicit account, the connected provider is asked for one.
pub async fn prepare_request(
    args: &RequestArgs,
    config: &PassportConfig,
) -> Result<(Arc<dyn WalletProvider>, AuthorizationRequest)> {
    let wallet: Arc<dyn WalletProvider> = match &args.secret_key {
        Some(secret) => Arc::new(
            LocalWallet::from_secret_hex(secret).context("Failed to load local signer key")?,
        ),
        None => Arc::new(RpcWalletProvider::new(&config.endpoints.wallet_rpc_url)),
    };

    let account = match &args.account {
        Some(raw) => raw.parse().context("Invalid account address")?,
        None => {
            let accounts = wallet
                .request_accounts()
                .await
                .context("Failed to request accounts from the wallet provider")?;
            accounts
                .first()
                .copied()
                .ok_or_else(|| anyhow::anyhow!("Wallet provider exposes no accounts"))?
        }
    };

    let request = AuthorizationRequest {
        account,
        organization: passport_core::OrgId::new(&args.organization),
        role: passport_core::Role::from_name(&args.role),
        resource_id: args.resource_id,
        category: args.category.parse().context("Invalid data category")?,
        min_trust: args.min_trust,
    };

    Ok((wallet, request))
}

pub fn print_request(request: &AuthorizationRequest) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["account", "organization", "role", "resource", "category"])
        .add_row(vec![
            request.account.to_string(),
            request.organization.to_string(),
            request.role.to_string(),
            request.resource_id.to_string(),
            request.category.to_string(),
        ]);
    println!("{table}");
}

pub fn print_denial(denial: &Denial) -> Result<()> {
    println!("{} {}", "DENY".red().bold(), denial);
    println!(
        "{}",
        serde_json::to_string_pretty(denial).context("Failed to render denial")?
    );
    Ok(())
}

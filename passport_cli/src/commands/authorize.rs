// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Passport Protocol Foundation

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use log::debug;

use passport_core::{
    create_authorization_engine, did_hash_for, AuthError, DidRegistry, HttpDidRegistry,
};

use crate::commands::{load_config, prepare_request, print_denial, print_request, RequestArgs};

#[derive(Debug, Clone, Args)]
pub struct AuthorizeArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Also run the authority-side role validation and print both verdicts
    #[arg(long)]
    pub cross_check: bool,
}

pub async fn run_authorize_command(args: AuthorizeArgs) -> Result<()> {
    let config = load_config(args.request.config.as_deref())?;
    let (wallet, request) = prepare_request(&args.request, &config).await?;

    print_request(&request);
    debug!("Running authorization chain against {}", config.endpoints.registry_url);

    if args.cross_check {
        let registry = HttpDidRegistry::new(&config.endpoints.registry_url);
        let did_hash = did_hash_for(&request.organization, &request.account);
        let min_trust = request
            .min_trust
            .unwrap_or_else(|| config.trust_policy.required_trust_for(&request.role));
        let valid = registry
            .validate_did_role(&did_hash, &request.role, min_trust, &request.account)
            .await
            .context("Authority-side role validation failed")?;
        println!(
            "authority-side role check: {}",
            if valid { "valid".green() } else { "invalid".red() }
        );
    }

    let engine = create_authorization_engine(&config, wallet);
    match engine.authorize(&request).await {
        Ok(grant) => {
            println!("{}", "ALLOW".green().bold());
            println!(
                "{}",
                serde_json::to_string_pretty(&grant).context("Failed to render grant")?
            );
            Ok(())
        }
        Err(AuthError::Denied(denial)) => print_denial(&denial),
        Err(AuthError::Transport(err)) => {
            println!("{} {}", "TRANSPORT".yellow().bold(), err);
            Err(err.into())
        }
    }
}

// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Passport Protocol Foundation

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use log::debug;

use passport_core::{create_query_executor, Category, QueryError};

use crate::commands::{load_config, prepare_request, print_denial, print_request, RequestArgs};

#[derive(Debug, Clone, Args)]
pub struct QueryArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Query every category of the resource concurrently
    #[arg(long)]
    pub all_categories: bool,
}

pub async fn run_query_command(args: QueryArgs) -> Result<()> {
    let config = load_config(args.request.config.as_deref())?;
    let (wallet, request) = prepare_request(&args.request, &config).await?;

    print_request(&request);
    debug!("Running query pipeline against {}", config.endpoints.authority_url);

    let executor = create_query_executor(&config, wallet);

    if args.all_categories {
        let results = executor.query_categories(&request, &Category::ALL).await;
        for (category, result) in results {
            println!("{}", format!("--- {category} ---").bold());
            report(result)?;
        }
        Ok(())
    } else {
        report(executor.query(&request).await)
    }
}

fn report(result: Result<passport_core::VerifiedPayload, QueryError>) -> Result<()> {
    match result {
        Ok(payload) => {
            println!("{}", "VERIFIED".green().bold());
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("Failed to render payload")?
            );
            Ok(())
        }
        Err(QueryError::Denied(denial)) => print_denial(&denial),
        Err(err @ QueryError::NoDataCommitted { .. }) => {
            println!("{} {}", "NO DATA".yellow().bold(), err);
            Ok(())
        }
        Err(err @ QueryError::IntegrityMismatch { .. }) => {
            println!("{} {}", "INTEGRITY MISMATCH".red().bold(), err);
            Ok(())
        }
        Err(err @ QueryError::BackendDataMissing(_)) => {
            println!("{} {}", "BACKEND DATA MISSING".yellow().bold(), err);
            Ok(())
        }
        Err(QueryError::Transport(err)) => {
            println!("{} {}", "TRANSPORT".yellow().bold(), err);
            Err(err.into())
        }
    }
}

// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Passport Protocol Foundation

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::authorize::{run_authorize_command, AuthorizeArgs};
use crate::commands::query::{run_query_command, QueryArgs};

#[derive(Parser)]
#[command(name = "passport_cli")]
#[command(author, version, about = "Debug caller for the passport authorization protocol", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Run the authorization chain and print the structured decision
    Authorize(AuthorizeArgs),

    /// Run the full protected-read pipeline and print the verified payload
    Query(QueryArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        CliCommand::Authorize(args) => run_authorize_command(args).await,
        CliCommand::Query(args) => run_query_command(args).await,
    }
}

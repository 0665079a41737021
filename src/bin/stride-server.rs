// ABOUTME: Main server binary for the Stride fitness tracking backend
// ABOUTME: Loads configuration, connects the database, and serves the REST API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

#![allow(clippy::expect_used)]

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use stride_api::{
    config::ServerConfig, context::ServerResources, database::Database, logging, server,
};

/// Stride fitness tracking API server
#[derive(Parser)]
#[command(name = "stride-server", version, about)]
struct Args {
    /// Override the HTTP port from the environment
    #[arg(long)]
    port: Option<u16>,

    /// Override the database URL from the environment
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_logging();

    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(port) = args.port {
        config.http.port = port;
    }
    if let Some(database_url) = args.database_url {
        config.database_url = database_url;
    }

    info!(
        port = config.http.port,
        database_url = %config.database_url,
        "Starting Stride API"
    );

    let database = Database::new(&config.database_url).await?;
    let resources = Arc::new(ServerResources::new(config, database));

    server::serve(resources).await?;
    Ok(())
}

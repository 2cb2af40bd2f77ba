//! Serve command: run the MCP server over stdio.

use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use iso4_core::Config;
use rmcp::ServiceExt;
use tracing::{info, instrument};

use crate::server::ProjectServer;

/// Arguments for the `serve` subcommand.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {}

/// Build the abbreviator once and serve MCP requests until stdin closes.
///
/// Logging must stay on stderr: stdout carries the protocol.
#[instrument(name = "cmd_serve", skip_all)]
pub async fn cmd_serve(_args: ServeArgs, config: Config) -> anyhow::Result<()> {
    let abbreviator = super::load_abbreviator(&config)?;
    let server = ProjectServer::with_abbreviator(Arc::new(abbreviator), config.abbreviate_options());

    info!(version = env!("CARGO_PKG_VERSION"), "starting MCP server on stdio");
    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .context("failed to start MCP server")?;
    let reason = service.waiting().await.context("MCP server task failed")?;
    info!(?reason, "MCP server stopped");
    Ok(())
}

// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use healthai_server::app::{build_state, serve};
use healthai_server::common::init_tracing;
use healthai_server::config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::load()?;
    let state = build_state(config)?;

    serve(state)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}

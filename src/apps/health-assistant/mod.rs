// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

pub mod analytics;
pub mod chart;
pub mod endpoints;
pub mod llm;
pub mod profile;
pub mod prompts;
pub mod shell;
pub mod types;
pub mod view;

pub use analytics::{load_dataset, Dataset, SummaryStats};
pub use endpoints::{router, serve};
pub use llm::{CompletionClient, OpenRouterClient, OpenRouterConfig};
pub use profile::{ProfileStore, Session, SessionHandle, SessionStore};
pub use prompts::{
    build_analytics_prompt, build_chat_prompt, build_prediction_prompt, build_prompt,
    build_treatment_prompt, profile_summary,
};
pub use shell::{AnalyticsView, Answer, Event, Notice, Shell, ViewState};
pub use types::*;
pub use view::render_page;

use crate::config::AppConfig;
use crate::AppError;
use crate::AppState;
use std::sync::Arc;
use tracing::{info, warn};

/// Wire the OpenRouter client and dataset location from `config` into a fresh state.
pub fn build_state(config: AppConfig) -> Result<Arc<AppState>, AppError> {
    let llm_config = OpenRouterConfig::from(&config.ai);
    if !llm_config.has_api_key() {
        warn!("No AI API key configured; set HEALTHAI_API_KEY. AI actions will report a failure.");
    }
    info!(
        "Using model {} and dataset {}",
        llm_config.model(),
        config.analytics.dataset_path.display()
    );

    let client: Arc<dyn CompletionClient> = Arc::new(OpenRouterClient::new(llm_config)?);
    let shell = Shell::new(client, config.analytics.dataset_path.clone());
    Ok(Arc::new(AppState::new(config, shell)))
}

// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

// Text completion over an OpenAI-compatible chat endpoint (OpenRouter by default).
// Prompts go out as a single user message; the reply text comes back untouched.

use crate::config::AiConfig;
use crate::AppError;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::{info, warn};

// ============================================
// Configuration
// ============================================

#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl OpenRouterConfig {
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl From<&AiConfig> for OpenRouterConfig {
    fn from(config: &AiConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

// ============================================
// Client
// ============================================

/// Anything that turns a prompt into a reply.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, AppError>;
}

pub struct OpenRouterClient {
    pub client: reqwest::Client,
    pub config: OpenRouterConfig,
}

impl OpenRouterClient {
    pub fn new(config: OpenRouterConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl CompletionClient for OpenRouterClient {
    /// One attempt, no retry. Every failure collapses into `AppError::AiService`.
    async fn complete(&self, prompt: &str) -> Result<String, AppError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::AiService("API key not configured".to_string()))?;

        info!(
            "Calling LLM with model: {} ({} prompt chars)",
            self.config.model,
            prompt.len()
        );

        let request_body = json!({
            "model": self.config.model,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ],
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .header("X-Title", "HealthAI")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AppError::AiService(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("LLM returned {status}");
            return Err(AppError::AiService(format!("{status}: {error_text}")));
        }

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::AiService(format!("Failed to parse response: {e}")))?;

        let content = response_json["choices"]
            .get(0)
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| AppError::AiService("No content in response".to_string()))?;

        Ok(content.to_string())
    }
}

// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;
use tracing::error;

pub mod apps {
    #[path = "health-assistant/mod.rs"]
    pub mod health_assistant;
}

pub mod app {
    pub use crate::apps::health_assistant::*;
}

pub mod common;
pub mod config;

use app::{SessionStore, Shell};
use config::AppConfig;

/// Message shown to the user whenever the AI service call fails, whatever the cause.
pub const AI_FAILURE_MESSAGE: &str =
    "HealthAI could not get a response from the AI service. Please try again.";

/// App state shared by every handler.
pub struct AppState {
    /// Effective configuration the server was started with
    pub config: AppConfig,
    /// Update step for the UI, owns the AI client and dataset location
    pub shell: Shell,
    /// Per-browser sessions, keyed by the session cookie
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: AppConfig, shell: Shell) -> Self {
        Self {
            sessions: SessionStore::new(Duration::from_secs(config.server.session_idle_secs)),
            config,
            shell,
        }
    }
}

/// Application errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Required input missing or out of range.
    #[error("{0}")]
    Validation(String),
    #[error("{} not found", .0.display())]
    DatasetNotFound(PathBuf),
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),
    /// Any failure of the completion call. The detail is for logs only.
    #[error("AI service error: {0}")]
    AiService(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Text that is safe to show to the user.
    pub fn user_message(&self) -> String {
        match self {
            AppError::AiService(_) => AI_FAILURE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

/// Implement IntoResponse for AppError.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DatasetNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidDataset(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::AiService(detail) => {
                error!("AI service failure: {detail}");
                StatusCode::BAD_GATEWAY
            }
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(json!({
            "error": self.user_message(),
        }));
        (status, body).into_response()
    }
}

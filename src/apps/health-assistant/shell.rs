// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The update step behind the page.
//!
//! Every user action is an [`Event`]. [`Shell::handle`] applies it to the
//! session and returns the new session together with a [`ViewState`]
//! snapshot, which `view::render_page` turns into HTML.

use super::analytics::{load_dataset, Dataset};
use super::chart::render_line_chart;
use super::llm::CompletionClient;
use super::profile::Session;
use super::prompts::build_prompt;
use super::types::{Panel, PatientProfile, TaskInput};
use crate::{AppError, AI_FAILURE_MESSAGE};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SelectPanel(Panel),
    SaveProfile(PatientProfile),
    /// The profile form did not convert; carries the reason.
    RejectProfile(String),
    SelectMetric(String),
    /// A panel action that could not be read; carries the reason.
    RejectAction(String),
    Submit {
        panel: Panel,
        input: String,
        metric: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Info(String),
    Warning(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Success(t) | Notice::Info(t) | Notice::Warning(t) | Notice::Error(t) => t,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Notice::Success(_) => "success",
            Notice::Info(_) => "info",
            Notice::Warning(_) => "warning",
            Notice::Error(_) => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsView {
    Ready {
        metrics: Vec<String>,
        selected: String,
        series: Vec<(String, f64)>,
        chart: String,
    },
    /// Dataset missing or unreadable. No chart.
    Unavailable(String),
}

/// Everything the page shows, computed once per action.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub panel: Panel,
    /// Values pre-filled into the profile form
    pub form: PatientProfile,
    /// Set once a profile has been saved in this session
    pub saved: Option<PatientProfile>,
    pub profile_notice: Option<Notice>,
    pub notice: Option<Notice>,
    pub input: String,
    /// Only present on the analytics panel
    pub analytics: Option<AnalyticsView>,
}

/// Prompt sent and reply received for one panel action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub prompt: String,
    pub response: String,
}

pub struct Shell {
    client: Arc<dyn CompletionClient>,
    dataset_path: PathBuf,
}

impl Shell {
    pub fn new(client: Arc<dyn CompletionClient>, dataset_path: impl Into<PathBuf>) -> Self {
        Self {
            client,
            dataset_path: dataset_path.into(),
        }
    }

    pub fn dataset_path(&self) -> &Path {
        &self.dataset_path
    }

    /// Re-read the dataset. Never cached.
    pub fn dataset(&self) -> Result<Dataset, AppError> {
        load_dataset(&self.dataset_path)
    }

    /// Run one panel action: check input, build the prompt, call the AI service.
    ///
    /// Blank input fails with `AppError::Validation` before anything else
    /// happens. The analytics panel needs no typed input; its prompt carries
    /// the statistics of `metric` (or the first metric column).
    pub async fn ask(
        &self,
        panel: Panel,
        profile: &PatientProfile,
        input: &str,
        metric: Option<&str>,
    ) -> Result<Answer, AppError> {
        let task = match panel {
            Panel::HealthAnalytics => {
                let dataset = self.dataset()?;
                let metric = resolve_metric(&dataset, metric)
                    .ok_or_else(|| AppError::Validation(panel.missing_input_warning().to_string()))?;
                let stats = dataset.describe(&metric)?;
                TaskInput::new(stats.to_string())
            }
            _ => TaskInput::new(input),
        }
        .ok_or_else(|| AppError::Validation(panel.missing_input_warning().to_string()))?;

        let prompt = build_prompt(panel, profile, &task);
        info!("Running {panel} action");
        let response = self.client.complete(&prompt).await?;
        Ok(Answer { prompt, response })
    }

    /// Apply `event` to `session`, returning the updated session and what to show.
    pub async fn handle(&self, mut session: Session, event: Event) -> (Session, ViewState) {
        let mut profile_notice = None;
        let mut notice = None;

        match event {
            Event::SelectPanel(panel) => {
                if panel != session.panel {
                    session.input.clear();
                }
                session.panel = panel;
            }
            Event::SaveProfile(profile) => {
                session.profile.save(profile);
                profile_notice = Some(Notice::Success("Profile saved!".to_string()));
            }
            Event::RejectProfile(reason) => {
                profile_notice = Some(Notice::Warning(reason));
            }
            Event::SelectMetric(metric) => {
                session.panel = Panel::HealthAnalytics;
                session.metric = Some(metric);
            }
            Event::RejectAction(reason) => {
                notice = Some(Notice::Warning(reason));
            }
            Event::Submit {
                panel,
                input,
                metric,
            } => {
                session.panel = panel;
                if metric.is_some() {
                    session.metric = metric;
                }
                let profile = session.profile.get();
                let result = self
                    .ask(panel, &profile, &input, session.metric.as_deref())
                    .await;
                session.input = input;
                notice = notice_for(panel, result);
            }
        }

        let analytics = (session.panel == Panel::HealthAnalytics).then(|| {
            let view = self.analytics_view(session.metric.as_deref());
            if let AnalyticsView::Ready { selected, .. } = &view {
                session.metric = Some(selected.clone());
            }
            view
        });

        let view = ViewState {
            panel: session.panel,
            form: session.profile.get(),
            saved: session.profile.saved().cloned(),
            profile_notice,
            notice,
            input: session.input.clone(),
            analytics,
        };
        (session, view)
    }

    fn analytics_view(&self, metric: Option<&str>) -> AnalyticsView {
        let dataset = match self.dataset() {
            Ok(dataset) => dataset,
            Err(e) => {
                warn!("Analytics unavailable: {e}");
                return AnalyticsView::Unavailable(e.user_message());
            }
        };
        let Some(selected) = resolve_metric(&dataset, metric) else {
            return AnalyticsView::Unavailable("Dataset has no metric columns.".to_string());
        };
        match dataset.series_for(&selected) {
            Ok(series) => AnalyticsView::Ready {
                metrics: dataset.metric_columns().to_vec(),
                chart: render_line_chart(&selected, &series),
                selected,
                series,
            },
            Err(e) => AnalyticsView::Unavailable(e.user_message()),
        }
    }
}

/// `metric` if the dataset has it, else the first metric column.
pub fn resolve_metric(dataset: &Dataset, metric: Option<&str>) -> Option<String> {
    let metrics = dataset.metric_columns();
    metric
        .and_then(|m| metrics.iter().find(|c| c.as_str() == m))
        .or_else(|| metrics.first())
        .cloned()
}

fn notice_for(panel: Panel, result: Result<Answer, AppError>) -> Option<Notice> {
    match result {
        Ok(answer) if panel == Panel::HealthAnalytics => Some(Notice::Info(answer.response)),
        Ok(answer) => Some(Notice::Success(answer.response)),
        Err(AppError::Validation(reason)) => Some(Notice::Warning(reason)),
        // The analytics panel already shows why the dataset is unusable.
        Err(AppError::DatasetNotFound(_)) | Err(AppError::InvalidDataset(_)) => None,
        Err(AppError::AiService(detail)) => {
            error!("AI service failure on {panel}: {detail}");
            Some(Notice::Error(AI_FAILURE_MESSAGE.to_string()))
        }
        Err(e) => Some(Notice::Error(e.user_message())),
    }
}

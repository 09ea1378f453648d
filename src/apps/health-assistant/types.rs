// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Oldest age the profile form accepts.
pub const MAX_AGE: u8 = 120;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[default]
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gender::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| AppError::Validation(format!("Unknown gender {s:?}")))
    }
}

/// The patient profile held for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientProfile {
    pub name: String,
    pub age: u8,
    pub gender: Gender,
    pub history: String,
    pub medications: String,
    pub allergies: String,
}

impl Default for PatientProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            age: 30,
            gender: Gender::Male,
            history: String::new(),
            medications: String::new(),
            allergies: String::new(),
        }
    }
}

impl PatientProfile {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.age > MAX_AGE {
            return Err(AppError::Validation(format!(
                "Age must be between 0 and {MAX_AGE}."
            )));
        }
        Ok(())
    }
}

/// Raw profile form as posted by the browser. Every field arrives as text.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub history: String,
    pub medications: String,
    pub allergies: String,
}

impl TryFrom<ProfileForm> for PatientProfile {
    type Error = AppError;

    fn try_from(form: ProfileForm) -> Result<Self, Self::Error> {
        let age = form
            .age
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|age| *age <= MAX_AGE)
            .ok_or_else(|| {
                AppError::Validation(format!("Age must be a whole number between 0 and {MAX_AGE}."))
            })?;
        let gender = form.gender.parse()?;
        Ok(PatientProfile {
            name: form.name,
            age,
            gender,
            history: form.history,
            medications: form.medications,
            allergies: form.allergies,
        })
    }
}

/// The four panels offered by the navigation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Panel {
    #[default]
    PatientChat,
    DiseasePrediction,
    TreatmentPlan,
    HealthAnalytics,
}

impl Panel {
    pub const ALL: [Panel; 4] = [
        Panel::PatientChat,
        Panel::DiseasePrediction,
        Panel::TreatmentPlan,
        Panel::HealthAnalytics,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Panel::PatientChat => "patient-chat",
            Panel::DiseasePrediction => "disease-prediction",
            Panel::TreatmentPlan => "treatment-plan",
            Panel::HealthAnalytics => "health-analytics",
        }
    }

    /// Navigation label.
    pub fn label(&self) -> &'static str {
        match self {
            Panel::PatientChat => "Patient Chat",
            Panel::DiseasePrediction => "Disease Prediction",
            Panel::TreatmentPlan => "Treatment Plan",
            Panel::HealthAnalytics => "Health Analytics",
        }
    }

    pub fn heading(&self) -> &'static str {
        match self {
            Panel::PatientChat => "Patient Chat Assistant",
            Panel::DiseasePrediction => "Disease Prediction Based on Symptoms & Profile",
            Panel::TreatmentPlan => "Generate Personalized Treatment Plan",
            Panel::HealthAnalytics => "Patient Health Analytics",
        }
    }

    pub fn input_label(&self) -> &'static str {
        match self {
            Panel::PatientChat => "Ask a medical question:",
            Panel::DiseasePrediction => "Enter symptoms (comma-separated):",
            Panel::TreatmentPlan => "Enter diagnosed condition:",
            Panel::HealthAnalytics => "Select a metric to visualize",
        }
    }

    pub fn action_label(&self) -> &'static str {
        match self {
            Panel::PatientChat => "Get AI Response",
            Panel::DiseasePrediction => "Predict Disease",
            Panel::TreatmentPlan => "Get Treatment Plan",
            Panel::HealthAnalytics => "Generate AI Insight",
        }
    }

    /// Warning shown when the action is pressed with nothing typed in.
    pub fn missing_input_warning(&self) -> &'static str {
        match self {
            Panel::PatientChat => "Please enter a question.",
            Panel::DiseasePrediction => "Please enter symptoms.",
            Panel::TreatmentPlan => "Enter a condition to continue.",
            Panel::HealthAnalytics => "Select a metric to continue.",
        }
    }

    /// Chat takes a multi-line question; the other text panels take a single line.
    pub fn multiline_input(&self) -> bool {
        matches!(self, Panel::PatientChat)
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Panel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Panel::ALL
            .into_iter()
            .find(|p| p.slug() == s)
            .ok_or_else(|| AppError::Validation(format!("Unknown panel {s:?}")))
    }
}

/// A task-specific input that is known not to be blank.
///
/// The text is kept exactly as entered; only the blank check trims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInput(String);

impl TaskInput {
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(TaskInput(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Query string of the page route.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub panel: Option<Panel>,
    pub metric: Option<String>,
}

/// Form posted by a panel's action button. `panel` is parsed by the handler
/// so a bad value can be reported on the page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TaskForm {
    pub panel: String,
    pub input: String,
    pub metric: Option<String>,
}

/// Request for /api/ask
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    pub panel: Panel,
    #[serde(default)]
    pub input: String,
    pub metric: Option<String>,
}

/// Response for /api/ask
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub panel: Panel,
    pub prompt: String,
    pub response: String,
}

/// Response for /api/profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    /// False until the profile has been saved in this session
    pub populated: bool,
    pub profile: PatientProfile,
}

/// Query for /api/analytics
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyticsQuery {
    pub metric: Option<String>,
}

/// Response for /api/analytics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsResponse {
    pub columns: Vec<String>,
    pub metric: String,
    pub summary: crate::app::SummaryStats,
    pub series: Vec<(String, f64)>,
}

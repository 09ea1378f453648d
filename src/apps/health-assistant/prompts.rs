// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Prompt templates, one per panel.
//!
//! Builders only take a [`TaskInput`], so blank input is rejected before a
//! prompt can be built.

use super::types::{Panel, PatientProfile, TaskInput};

/// Profile block embedded in every prompt.
pub fn profile_summary(profile: &PatientProfile) -> String {
    format!(
        "Patient Info:\n\
         - Name: {name}\n\
         - Age: {age}\n\
         - Gender: {gender}\n\
         - History: {history}\n\
         - Medications: {medications}\n\
         - Allergies: {allergies}",
        name = profile.name,
        age = profile.age,
        gender = profile.gender,
        history = profile.history,
        medications = profile.medications,
        allergies = profile.allergies,
    )
}

pub fn build_chat_prompt(profile: &PatientProfile, question: &TaskInput) -> String {
    format!(
        "You are a healthcare assistant. Respond based on the following profile and question:\n\
         {summary}\n\n\
         Question: {question}",
        summary = profile_summary(profile),
    )
}

pub fn build_prediction_prompt(profile: &PatientProfile, symptoms: &TaskInput) -> String {
    format!(
        "Given the patient profile:\n\
         {summary}\n\n\
         Symptoms: {symptoms}\n\n\
         Predict possible diseases and next steps.",
        summary = profile_summary(profile),
    )
}

pub fn build_treatment_prompt(profile: &PatientProfile, condition: &TaskInput) -> String {
    format!(
        "Generate a treatment plan for this patient:\n\
         {summary}\n\n\
         Condition: {condition}",
        summary = profile_summary(profile),
    )
}

pub fn build_analytics_prompt(profile: &PatientProfile, stats_summary: &TaskInput) -> String {
    format!(
        "Given the patient's profile:\n\
         {summary}\n\n\
         And health data summary:\n\
         {stats_summary}\n\n\
         Provide analysis and health advice.",
        summary = profile_summary(profile),
    )
}

/// Template for the given panel.
pub fn build_prompt(panel: Panel, profile: &PatientProfile, input: &TaskInput) -> String {
    match panel {
        Panel::PatientChat => build_chat_prompt(profile, input),
        Panel::DiseasePrediction => build_prediction_prompt(profile, input),
        Panel::TreatmentPlan => build_treatment_prompt(profile, input),
        Panel::HealthAnalytics => build_analytics_prompt(profile, input),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::app::Gender;

    fn alex() -> PatientProfile {
        PatientProfile {
            name: "Alex".into(),
            age: 45,
            gender: Gender::Male,
            history: "diabetes".into(),
            medications: "metformin".into(),
            allergies: "none".into(),
        }
    }

    fn input(s: &str) -> TaskInput {
        TaskInput::new(s).unwrap()
    }

    #[test]
    fn summary_lists_every_field() {
        let summary = profile_summary(&alex());
        assert_eq!(
            summary,
            "Patient Info:\n- Name: Alex\n- Age: 45\n- Gender: Male\n- History: diabetes\n- Medications: metformin\n- Allergies: none"
        );
    }

    #[test]
    fn every_prompt_is_deterministic_and_complete() {
        let profile = PatientProfile {
            name: "Dana Q".into(),
            age: 71,
            gender: Gender::Other,
            history: "hypertension; knee surgery 2019".into(),
            medications: "lisinopril 10mg".into(),
            allergies: "penicillin".into(),
        };
        let task = input("shortness of breath\nwhen climbing stairs");
        for panel in Panel::ALL {
            let prompt = build_prompt(panel, &profile, &task);
            assert_eq!(prompt, build_prompt(panel, &profile, &task));
            for value in [
                "Dana Q",
                "71",
                "Other",
                "hypertension; knee surgery 2019",
                "lisinopril 10mg",
                "penicillin",
                "shortness of breath\nwhen climbing stairs",
            ] {
                assert!(prompt.contains(value), "{panel}: missing {value:?}");
            }
        }
    }

    #[test]
    fn prediction_prompt_layout() {
        let prompt = build_prediction_prompt(&alex(), &input("fatigue, thirst"));
        assert!(prompt.starts_with("Given the patient profile:\nPatient Info:\n"));
        assert!(prompt.contains("Age: 45"));
        assert!(prompt.contains("History: diabetes"));
        assert!(prompt.contains("Symptoms: fatigue, thirst"));
        assert!(prompt.ends_with("\n\nPredict possible diseases and next steps."));
    }

    #[test]
    fn templates_differ_per_panel() {
        let profile = alex();
        let task = input("asthma");
        assert!(build_chat_prompt(&profile, &task).ends_with("Question: asthma"));
        assert!(build_treatment_prompt(&profile, &task).ends_with("Condition: asthma"));
        assert!(build_analytics_prompt(&profile, &task)
            .contains("And health data summary:\nasthma\n\nProvide analysis and health advice."));
    }

    #[test]
    fn input_is_not_trimmed() {
        let prompt = build_chat_prompt(&alex(), &input("  why?  "));
        assert!(prompt.ends_with("Question:   why?  "));
    }
}

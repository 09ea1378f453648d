// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use super::shell::{AnalyticsView, Notice, ViewState};
use super::types::{Gender, Panel, PatientProfile, MAX_AGE};
use std::fmt::Write;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; color: #222; }
header { text-align: center; padding: 12px; border-bottom: 1px solid #ddd; }
.layout { display: grid; grid-template-columns: 220px 1fr 2fr; gap: 24px; padding: 16px; }
nav a { display: block; padding: 6px 8px; border-radius: 4px; text-decoration: none; color: #222; }
nav a.active { background: #e6f0fa; font-weight: 600; }
label { display: block; margin-top: 8px; }
input, select, textarea { width: 100%; box-sizing: border-box; }
.notice { padding: 8px 12px; border-radius: 4px; margin: 8px 0; white-space: pre-wrap; }
.success { background: #e7f6e7; } .info { background: #e6f0fa; }
.warning { background: #fff6dd; } .error { background: #fde8e8; }
pre.saved { background: #f6f6f6; padding: 8px; }
svg.chart { width: 100%; height: auto; border: 1px solid #eee; }
footer { text-align: center; font-size: small; color: #777; padding: 12px; }
"#;

/// Escape text for use in HTML element content and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Whole page for one view snapshot. Pure: same state, same HTML.
pub fn render_page(view: &ViewState) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>HealthAI</title><style>{STYLE}</style></head><body>\
         <header><h1>HealthAI - Intelligent Healthcare Assistant</h1></header>\
         <div class=\"layout\">"
    );
    html.push_str(&render_nav(view.panel));
    html.push_str(&render_profile_column(view));
    html.push_str(&render_panel(view));
    html.push_str(
        "</div><footer><form method=\"post\" action=\"/session/end\">\
         <button type=\"submit\">End session</button></form>\
         HealthAI &middot; patient data stays in this session only</footer></body></html>",
    );
    html
}

fn render_nav(active: Panel) -> String {
    let mut nav = String::from("<nav><h3>Navigation</h3>");
    for panel in Panel::ALL {
        let class = if panel == active { " class=\"active\"" } else { "" };
        let _ = write!(
            nav,
            "<a href=\"/?panel={}\"{class}>{}</a>",
            panel.slug(),
            panel.label()
        );
    }
    nav.push_str("</nav>");
    nav
}

fn render_notice(notice: &Notice) -> String {
    format!(
        "<div class=\"notice {}\">{}</div>",
        notice.kind(),
        escape_html(notice.text())
    )
}

fn render_profile_column(view: &ViewState) -> String {
    let form = &view.form;
    let mut col = String::from("<section><h2>Patient Profile</h2>");
    let _ = write!(
        col,
        "<form method=\"post\" action=\"/profile\">\
         <label>Name<input name=\"name\" value=\"{name}\"></label>\
         <label>Age<input name=\"age\" type=\"number\" min=\"0\" max=\"{MAX_AGE}\" step=\"1\" value=\"{age}\"></label>\
         <label>Gender<select name=\"gender\">{genders}</select></label>\
         <label>Medical History<textarea name=\"history\">{history}</textarea></label>\
         <label>Current Medications<textarea name=\"medications\">{medications}</textarea></label>\
         <label>Allergies<input name=\"allergies\" value=\"{allergies}\"></label>\
         <button type=\"submit\">Save Profile</button></form>",
        name = escape_html(&form.name),
        age = form.age,
        genders = render_gender_options(form.gender),
        history = escape_html(&form.history),
        medications = escape_html(&form.medications),
        allergies = escape_html(&form.allergies),
    );
    if let Some(notice) = &view.profile_notice {
        col.push_str(&render_notice(notice));
    }
    if let Some(saved) = &view.saved {
        let _ = write!(
            col,
            "<h4>Saved Info</h4><pre class=\"saved\">{}</pre>",
            escape_html(&saved_info_json(saved))
        );
    }
    col.push_str("</section>");
    col
}

fn render_gender_options(selected: Gender) -> String {
    Gender::ALL
        .iter()
        .map(|g| {
            let sel = if *g == selected { " selected" } else { "" };
            format!("<option value=\"{g}\"{sel}>{g}</option>")
        })
        .collect()
}

fn saved_info_json(profile: &PatientProfile) -> String {
    serde_json::to_string_pretty(profile).unwrap_or_default()
}

fn render_panel(view: &ViewState) -> String {
    let panel = view.panel;
    let mut section = format!("<section><h2>{}</h2>", panel.heading());

    match panel {
        Panel::HealthAnalytics => {
            section.push_str(&render_analytics(view));
        }
        _ => {
            let field = if panel.multiline_input() {
                format!(
                    "<textarea name=\"input\" rows=\"5\">{}</textarea>",
                    escape_html(&view.input)
                )
            } else {
                format!("<input name=\"input\" value=\"{}\">", escape_html(&view.input))
            };
            let _ = write!(
                section,
                "<form method=\"post\" action=\"/ask\">\
                 <input type=\"hidden\" name=\"panel\" value=\"{slug}\">\
                 <label>{label}{field}</label>\
                 <button type=\"submit\">{action}</button></form>",
                slug = panel.slug(),
                label = panel.input_label(),
                action = panel.action_label(),
            );
            if let Some(notice) = &view.notice {
                section.push_str(&render_notice(notice));
            }
        }
    }

    section.push_str("</section>");
    section
}

fn render_analytics(view: &ViewState) -> String {
    let panel = Panel::HealthAnalytics;
    match &view.analytics {
        Some(AnalyticsView::Ready {
            metrics,
            selected,
            chart,
            ..
        }) => {
            let options: String = metrics
                .iter()
                .map(|m| {
                    let sel = if m == selected { " selected" } else { "" };
                    let m = escape_html(m);
                    format!("<option value=\"{m}\"{sel}>{m}</option>")
                })
                .collect();
            let mut out = format!(
                "<form method=\"get\" action=\"/\">\
                 <input type=\"hidden\" name=\"panel\" value=\"{slug}\">\
                 <label>{label}<select name=\"metric\" onchange=\"this.form.submit()\">{options}</select></label>\
                 <noscript><button type=\"submit\">Show</button></noscript></form>\
                 {chart}\
                 <form method=\"post\" action=\"/ask\">\
                 <input type=\"hidden\" name=\"panel\" value=\"{slug}\">\
                 <input type=\"hidden\" name=\"metric\" value=\"{metric}\">\
                 <button type=\"submit\">{action}</button></form>",
                slug = panel.slug(),
                label = panel.input_label(),
                metric = escape_html(selected),
                action = panel.action_label(),
            );
            if let Some(notice) = &view.notice {
                out.push_str(&render_notice(notice));
            }
            out
        }
        Some(AnalyticsView::Unavailable(reason)) => render_notice(&Notice::Error(reason.clone())),
        None => String::new(),
    }
}

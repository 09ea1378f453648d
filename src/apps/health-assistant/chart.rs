// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use super::view::escape_html;
use std::fmt::Write;

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 260.0;
const PAD_LEFT: f64 = 64.0;
const PAD_RIGHT: f64 = 16.0;
const PAD_Y: f64 = 24.0;

/// Plot coordinates for each point: x spread evenly in series order, y scaled to the value range.
pub fn plot_points(series: &[(String, f64)]) -> Vec<(f64, f64)> {
    let (min, max) = value_range(series);
    let plot_w = WIDTH - PAD_LEFT - PAD_RIGHT;
    let plot_h = HEIGHT - 2.0 * PAD_Y;
    let step = if series.len() > 1 {
        plot_w / (series.len() - 1) as f64
    } else {
        0.0
    };

    series
        .iter()
        .enumerate()
        .map(|(i, (_, v))| {
            let x = if series.len() > 1 {
                PAD_LEFT + step * i as f64
            } else {
                PAD_LEFT + plot_w / 2.0
            };
            // Flat series sit on the middle line.
            let frac = if max > min { (v - min) / (max - min) } else { 0.5 };
            (x, PAD_Y + plot_h * (1.0 - frac))
        })
        .collect()
}

fn value_range(series: &[(String, f64)]) -> (f64, f64) {
    series
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, v)| {
            (lo.min(*v), hi.max(*v))
        })
}

/// Inline SVG line chart of `series`.
pub fn render_line_chart(metric: &str, series: &[(String, f64)]) -> String {
    let mut svg = format!(
        r#"<svg class="chart" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {WIDTH} {HEIGHT}" role="img" aria-label="{}">"#,
        escape_html(metric)
    );

    if series.is_empty() {
        let _ = write!(
            svg,
            r#"<text x="{}" y="{}" text-anchor="middle">No data</text></svg>"#,
            WIDTH / 2.0,
            HEIGHT / 2.0
        );
        return svg;
    }

    let (min, max) = value_range(series);
    let bottom = HEIGHT - PAD_Y;
    let _ = write!(
        svg,
        r##"<line x1="{PAD_LEFT}" y1="{PAD_Y}" x2="{PAD_LEFT}" y2="{bottom}" stroke="#999"/><line x1="{PAD_LEFT}" y1="{bottom}" x2="{}" y2="{bottom}" stroke="#999"/>"##,
        WIDTH - PAD_RIGHT
    );

    let points = plot_points(series)
        .iter()
        .map(|(x, y)| format!("{x:.1},{y:.1}"))
        .collect::<Vec<_>>()
        .join(" ");
    let _ = write!(
        svg,
        r##"<polyline fill="none" stroke="#1f77b4" stroke-width="2" points="{points}"/>"##
    );

    let _ = write!(
        svg,
        r#"<text x="{}" y="{}" text-anchor="end">{}</text><text x="{}" y="{}" text-anchor="end">{}</text>"#,
        PAD_LEFT - 6.0,
        PAD_Y + 4.0,
        format_tick(max),
        PAD_LEFT - 6.0,
        bottom + 4.0,
        format_tick(min),
    );

    let first = &series[0].0;
    let last = &series[series.len() - 1].0;
    let _ = write!(
        svg,
        r#"<text x="{PAD_LEFT}" y="{}" text-anchor="start">{}</text>"#,
        HEIGHT - 6.0,
        escape_html(first)
    );
    if series.len() > 1 {
        let _ = write!(
            svg,
            r#"<text x="{}" y="{}" text-anchor="end">{}</text>"#,
            WIDTH - PAD_RIGHT,
            HEIGHT - 6.0,
            escape_html(last)
        );
    }

    svg.push_str("</svg>");
    svg
}

fn format_tick(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn series(values: &[f64]) -> Vec<(String, f64)> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("2024-01-{:02}", i + 1), *v))
            .collect()
    }

    #[test]
    fn one_point_per_value_left_to_right() {
        let points = plot_points(&series(&[70.0, 72.5, 71.0, 75.0]));
        assert_eq!(points.len(), 4);
        assert!(points.windows(2).all(|w| w[0].0 < w[1].0));
        // max is drawn highest (smallest y), min lowest
        assert_eq!(points[3].1, PAD_Y);
        assert_eq!(points[0].1, HEIGHT - PAD_Y);
    }

    #[test]
    fn flat_series_is_centered() {
        let points = plot_points(&series(&[5.0, 5.0, 5.0]));
        assert!(points.iter().all(|(_, y)| *y == HEIGHT / 2.0));
    }

    #[test]
    fn chart_has_polyline_and_labels() {
        let svg = render_line_chart("weight", &series(&[70.0, 71.0]));
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("<polyline"));
        assert!(svg.contains("2024-01-01"));
        assert!(svg.contains("2024-01-02"));
        assert!(svg.contains(">71<"));
        assert!(svg.contains(">70<"));
    }

    #[test]
    fn empty_series_renders_placeholder() {
        let svg = render_line_chart("weight", &[]);
        assert!(svg.contains("No data"));
        assert!(!svg.contains("<polyline"));
    }

    #[test]
    fn labels_are_escaped() {
        let svg = render_line_chart("bp<sys>", &[("<b>".to_string(), 1.0)]);
        assert!(!svg.contains("<b>"));
        assert!(svg.contains("&lt;b&gt;"));
        assert!(svg.contains("bp&lt;sys&gt;"));
    }
}

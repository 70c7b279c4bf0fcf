//! Interactive HTML chart (Plotly.js from CDN).
//!
//! One line per streak: months elapsed on x, running cumulative gain on y.
//! Hovering a point shows the month's details and the streak totals; clicking
//! a legend entry toggles its line. Highlighted streaks get their own legend
//! entry and a Viridis color; the rest share one "Other streaks" entry.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;

use crate::domain::{ChartStyle, Streak, StreakCollection};
use crate::error::AppError;
use crate::render::{ChartBounds, OTHER_COLOR, highlight_color, updated_label};

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Page-level text that isn't derived from the streaks.
#[derive(Debug, Clone)]
pub struct ChartMeta {
    /// First month of the loaded series (used in the title).
    pub series_start: NaiveDate,
    /// Date shown in the source note.
    pub updated: NaiveDate,
}

impl ChartMeta {
    pub fn title(&self) -> String {
        format!(
            "Consecutive US monthly employment gain streaks since {}",
            self.series_start.format("%Y")
        )
    }

    pub fn source_note(&self) -> String {
        format!(
            "Source: historical PAYEMS data from FRED and BLS, updated {}.",
            updated_label(self.updated)
        )
    }
}

#[derive(Debug, Serialize)]
struct Trace {
    #[serde(rename = "type")]
    kind: &'static str,
    mode: &'static str,
    name: String,
    x: Vec<usize>,
    y: Vec<f64>,
    customdata: Vec<HoverRow>,
    hovertemplate: String,
    line: Line,
    opacity: f64,
    legendgroup: String,
    showlegend: bool,
}

#[derive(Debug, Serialize)]
struct Line {
    color: &'static str,
    width: f64,
}

/// Per-point hover payload, serialized as a JSON array.
#[derive(Debug, Serialize)]
struct HoverRow(String, usize, usize, f64, f64, f64, f64);

/// Build the Plotly trace list; highlighted streaks come first in the legend.
fn build_traces(collection: &StreakCollection, style: &ChartStyle) -> Vec<Trace> {
    let mut traces = Vec::with_capacity(collection.len());
    let mut highlighted = 0usize;
    let mut other_shown = false;

    for streak in &collection.streaks {
        let label = streak.label();
        let (name, color, width, group, showlegend) = if style.is_highlighted(streak) {
            let color = highlight_color(highlighted);
            highlighted += 1;
            (label.clone(), color, 4.0, label.clone(), true)
        } else {
            let show = !other_shown;
            other_shown = true;
            ("Other streaks".to_string(), OTHER_COLOR, 2.0, "other".to_string(), show)
        };

        traces.push(Trace {
            kind: "scatter",
            mode: "lines",
            name,
            x: streak.points.iter().map(|p| p.month_in_streak).collect(),
            y: streak.points.iter().map(|p| p.cumulative_gain).collect(),
            customdata: hover_rows(streak),
            hovertemplate: hover_template(&label),
            line: Line { color, width },
            opacity: 0.7,
            legendgroup: group,
            showlegend,
        });
    }

    traces
}

fn hover_rows(streak: &Streak) -> Vec<HoverRow> {
    streak
        .points
        .iter()
        .map(|p| {
            HoverRow(
                p.date.to_string(),
                p.month_in_streak,
                streak.length,
                p.gain,
                p.cumulative_gain,
                streak.cumulative_gain,
                streak.average_gain,
            )
        })
        .collect()
}

fn hover_template(label: &str) -> String {
    [
        "Date: %{customdata[0]}",
        "Current month in streak: %{customdata[1]}",
        "Total months in streak: %{customdata[2]}",
        "Monthly employment gain: %{customdata[3]:,.0f}",
        "Cumulative employment gain: %{customdata[4]:,.0f}",
        "Total cumulative employment gain: %{customdata[5]:,.0f}",
        "Avg. monthly employment gain: %{customdata[6]:,.0f}",
    ]
    .join("<br>")
        + &format!("<extra>{}</extra>", escape_html(label))
}

/// Render the complete HTML document.
pub fn render_streaks_html(collection: &StreakCollection, meta: &ChartMeta, style: &ChartStyle) -> Result<String, AppError> {
    let bounds = ChartBounds::from_extrema(collection.extrema.as_ref(), style.range_buffer);
    let traces = build_traces(collection, style);
    let title = meta.title();

    let layout = json!({
        "title": { "text": format!("<b>{}</b>", escape_html(&title)), "x": 0.5 },
        "width": style.width_px,
        "height": style.height_px,
        "xaxis": { "title": { "text": "Months in streak" }, "range": [bounds.x.0, bounds.x.1] },
        "yaxis": {
            "title": { "text": "Cumulative employment gains in streak" },
            "range": [bounds.y.0, bounds.y.1],
            "tickformat": ",.0f"
        },
        "legend": { "x": 1.02, "y": 0.5, "yanchor": "middle" },
        "hovermode": "closest",
        "margin": { "b": 90 },
        "annotations": [{
            "text": format!("<i>{}</i>", escape_html(&meta.source_note())),
            "xref": "paper", "yref": "paper", "x": 0.0, "y": -0.2,
            "showarrow": false, "align": "left", "font": { "size": 11 }
        }]
    });
    let config = json!({ "displaylogo": false, "responsive": true });

    let traces_json = serde_json::to_string(&traces)
        .map_err(|e| AppError::config(format!("Failed to serialize chart traces: {e}")))?;
    let layout_json = serde_json::to_string(&layout)
        .map_err(|e| AppError::config(format!("Failed to serialize chart layout: {e}")))?;

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{cdn}"></script>
<style>body {{ font-family: sans-serif; margin: 1rem; }}</style>
</head>
<body>
<div id="usempl-streaks"></div>
<script>
Plotly.newPlot("usempl-streaks", {traces}, {layout}, {config});
</script>
</body>
</html>
"#,
        title = escape_html(&title),
        cdn = PLOTLY_CDN,
        traces = script_safe(&traces_json),
        layout = script_safe(&layout_json),
        config = config,
    ))
}

/// Write the interactive chart to `path`.
pub fn write_streaks_html(
    path: &Path,
    collection: &StreakCollection,
    meta: &ChartMeta,
    style: &ChartStyle,
) -> Result<(), AppError> {
    let html = render_streaks_html(collection, meta, style)?;
    fs::write(path, html)
        .map_err(|e| AppError::config(format!("Failed to write chart '{}': {e}", path.display())))
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Keep embedded JSON from closing the surrounding `<script>` element.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

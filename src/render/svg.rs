//! Static SVG chart rendered with Plotters.
//!
//! Same lines, colors and bounds as the HTML chart, without the hover
//! details. Useful for embedding in documents or when no browser is around.

use std::fs;
use std::path::Path;

use plotters::prelude::*;

use crate::domain::{ChartStyle, StreakCollection};
use crate::error::AppError;
use crate::render::html::ChartMeta;
use crate::render::{ChartBounds, OTHER_COLOR, highlight_color};

/// Render the chart to an SVG document.
pub fn render_streaks_svg(collection: &StreakCollection, meta: &ChartMeta, style: &ChartStyle) -> Result<String, AppError> {
    let bounds = ChartBounds::from_extrema(collection.extrema.as_ref(), style.range_buffer);
    let (x0, x1) = bounds.x;
    let (y0, y1) = bounds.y;
    let title = meta.title();

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (style.width_px, style.height_px)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&title, ("sans-serif", 16))
            .margin(10)
            .set_label_area_size(LabelAreaPosition::Left, 80)
            .set_label_area_size(LabelAreaPosition::Bottom, 45)
            .build_cartesian_2d(x0..x1, y0..y1)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_desc("Months in streak")
            .y_desc("Cumulative employment gains in streak")
            .x_label_formatter(&|v| format!("{v:.0}"))
            .y_label_formatter(&|v| format!("{v:.0}"))
            .draw()
            .map_err(draw_err)?;

        let other = rgb(OTHER_COLOR);
        let mut highlighted = 0usize;
        let mut other_labeled = false;

        for streak in &collection.streaks {
            let line: Vec<(f64, f64)> = streak
                .points
                .iter()
                .map(|p| (p.month_in_streak as f64, p.cumulative_gain))
                .collect();

            if style.is_highlighted(streak) {
                let color = rgb(highlight_color(highlighted));
                highlighted += 1;
                chart
                    .draw_series(LineSeries::new(line, color.stroke_width(3)))
                    .map_err(draw_err)?
                    .label(streak.label())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3)));
            } else {
                let series = chart
                    .draw_series(LineSeries::new(line, other.mix(0.7).stroke_width(1)))
                    .map_err(draw_err)?;
                if !other_labeled {
                    other_labeled = true;
                    series
                        .label("Other streaks")
                        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], other.stroke_width(2)));
                }
            }
        }

        if !collection.is_empty() {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(draw_err)?;
        }

        root.draw(&Text::new(
            meta.source_note(),
            (10, style.height_px as i32 - 14),
            ("sans-serif", 11).into_font().style(FontStyle::Italic),
        ))
        .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
    }

    Ok(svg)
}

/// Write the static chart to `path`.
pub fn write_streaks_svg(
    path: &Path,
    collection: &StreakCollection,
    meta: &ChartMeta,
    style: &ChartStyle,
) -> Result<(), AppError> {
    let svg = render_streaks_svg(collection, meta, style)?;
    fs::write(path, svg).map_err(|e| AppError::config(format!("Failed to write chart '{}': {e}", path.display())))
}

fn draw_err<E: std::fmt::Display>(e: E) -> AppError {
    AppError::config(format!("Failed to draw SVG chart: {e}"))
}

/// `#RRGGBB` to a Plotters color; malformed input falls back to black.
fn rgb(hex: &str) -> RGBColor {
    let Some(digits) = hex.strip_prefix('#') else {
        return BLACK;
    };
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return BLACK;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).unwrap_or(0);
    RGBColor(channel(0), channel(2), channel(4))
}

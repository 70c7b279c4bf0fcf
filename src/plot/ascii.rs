//! ASCII plotting for terminal output.
//!
//! Fixed-size grid, deterministic output. One polyline per streak:
//! - highlighted streaks: `#`
//! - other streaks: `.`
//!
//! Highlighted streaks are drawn first so they win where lines overlap.

use crate::domain::{ChartStyle, Streak, StreakCollection};
use crate::render::ChartBounds;

/// Render all streaks as cumulative-gain paths (x: months in streak).
pub fn render_ascii_streaks(collection: &StreakCollection, style: &ChartStyle, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let bounds = ChartBounds::from_extrema(collection.extrema.as_ref(), style.range_buffer);
    let (x_min, x_max) = bounds.x;
    let (y_min, y_max) = bounds.y;

    let mut grid = vec![vec![' '; width]; height];

    let (highlighted, other): (Vec<&Streak>, Vec<&Streak>) =
        collection.streaks.iter().partition(|s| style.is_highlighted(s));

    let plot = Plot { x_min, x_max, y_min, y_max };
    for s in &highlighted {
        plot.draw_streak(&mut grid, s, '#');
    }
    for s in &other {
        plot.draw_streak(&mut grid, s, '.');
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: months=[{x_min:.1}, {x_max:.1}] | cumulative=[{y_min:.0}, {y_max:.0}] | highlighted={} other={}\n",
        highlighted.len(),
        other.len()
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

struct Plot {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl Plot {
    fn draw_streak(&self, grid: &mut [Vec<char>], streak: &Streak, ch: char) {
        let height = grid.len();
        let width = grid[0].len();

        let mut prev = None;
        for p in &streak.points {
            let x = map_x(p.month_in_streak as f64, self.x_min, self.x_max, width);
            let y = map_y(p.cumulative_gain, self.y_min, self.y_max, height);
            match prev {
                Some((x0, y0)) => draw_line(grid, x0, y0, x, y, ch),
                None => {
                    if grid[y][x] == ' ' {
                        grid[y][x] = ch;
                    }
                }
            }
            prev = Some((x, y));
        }
    }
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham). Never overwrites a non-blank cell.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Months, NaiveDate};

    use super::*;
    use crate::data::compute_gains;
    use crate::domain::SeriesPoint;
    use crate::streaks::segment;

    fn collection(levels: &[f64]) -> StreakCollection {
        let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let points: Vec<SeriesPoint> = levels
            .iter()
            .enumerate()
            .map(|(i, &l)| SeriesPoint::new(start.checked_add_months(Months::new(i as u32)).unwrap(), l))
            .collect();
        segment(&compute_gains(&points))
    }

    #[test]
    fn grid_has_requested_size() {
        let coll = collection(&[100.0, 101.0, 103.0, 102.0, 104.0]);
        let txt = render_ascii_streaks(&coll, &ChartStyle::default(), 30, 8);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 9);
        assert!(lines[0].starts_with("Plot: months="));
        assert!(lines[1..].iter().all(|l| l.chars().count() == 30));
    }

    #[test]
    fn highlighted_streaks_use_hash() {
        // +1,+2 (total 3) then +20 (total 20).
        let coll = collection(&[100.0, 101.0, 103.0, 102.0, 122.0]);
        let style = ChartStyle {
            highlight_min_gain: 10.0,
            ..ChartStyle::default()
        };
        let txt = render_ascii_streaks(&coll, &style, 20, 10);
        assert!(txt.contains("highlighted=1 other=1"));
        assert!(txt.contains('#'));
        assert!(txt.contains('.'));
    }

    #[test]
    fn no_streaks_renders_blank_grid() {
        let txt = render_ascii_streaks(&StreakCollection::default(), &ChartStyle::default(), 10, 5);
        assert!(txt.contains("highlighted=0 other=0"));
        assert!(txt.lines().skip(1).all(|l| l.trim().is_empty()));
    }

    #[test]
    fn line_drawing_fills_diagonal() {
        let mut grid = vec![vec![' '; 4]; 4];
        draw_line(&mut grid, 0, 3, 3, 0, '#');
        for i in 0..4 {
            assert_eq!(grid[3 - i][i], '#');
        }
    }

    #[test]
    fn map_y_puts_max_on_top_row() {
        assert_eq!(map_y(10.0, 0.0, 10.0, 5), 0);
        assert_eq!(map_y(0.0, 0.0, 10.0, 5), 4);
        assert_eq!(map_x(5.0, 0.0, 10.0, 11), 5);
    }
}

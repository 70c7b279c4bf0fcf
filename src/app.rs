//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the "real main" that:
//! - parses CLI arguments and sets up logging
//! - loads the series and segments streaks (via `pipeline`)
//! - prints the summary and optional ASCII plot
//! - opens the chart when asked

use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing::info;

use crate::cli::Cli;
use crate::domain::{AnnualExtension, ChartStyle, DataSource, EndDate, OutputDirs, RunConfig};
use crate::error::AppError;

pub mod bootstrap;
pub mod pipeline;

/// Streaks listed in the terminal table.
const TABLE_ROWS: usize = 10;

/// Entry point for the `usempl` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    bootstrap::init_logging(&cli.log_level);

    let config = run_config_from_cli(&cli);
    config.dirs.ensure()?;
    info!(source = ?config.source, end = %config.end_date, "starting run");

    let updated = chart_updated_date(config.end_date, Local::now().date_naive());
    let run = pipeline::run_pipeline(&config, updated)?;

    println!("{}", crate::report::format_run_summary(&run.series, &run.streaks));
    if !run.streaks.is_empty() {
        println!("{}", crate::report::format_streak_table(&run.streaks, TABLE_ROWS));
    }

    if config.ascii {
        let plot = crate::plot::render_ascii_streaks(&run.streaks, &config.style, config.ascii_width, config.ascii_height);
        println!("{plot}");
    }

    for path in &run.series.saved {
        println!("Data : {}", path.display());
    }
    println!("Chart: {}", run.chart_path.display());
    if let Some(path) = &run.svg_path {
        println!("SVG  : {}", path.display());
    }
    if let Some(path) = &run.streaks_csv {
        println!("CSV  : {}", path.display());
    }

    if config.show {
        crate::render::open_in_browser(&run.chart_path);
    }

    Ok(())
}

/// Date for the chart's source note: the requested end date, or `today` for `latest`.
pub fn chart_updated_date(end: EndDate, today: NaiveDate) -> NaiveDate {
    match end {
        EndDate::On(date) => date,
        EndDate::Latest => today,
    }
}

pub fn run_config_from_cli(cli: &Cli) -> RunConfig {
    let dirs = OutputDirs::new(&cli.data_dir, &cli.image_dir);

    let annual = cli.annual_1919.then(|| {
        let path = cli.annual_file.clone().unwrap_or_else(|| dirs.default_annual_file());
        AnnualExtension::from_1919(path)
    });

    RunConfig {
        end_date: cli.end_date,
        source: if cli.local { DataSource::Local } else { DataSource::Fred },
        annual,
        style: ChartStyle {
            highlight_min_gain: cli.highlight_min_gain,
            highlight_min_months: cli.highlight_min_months,
            ..ChartStyle::default()
        },
        dirs,
        show: cli.show,
        svg: cli.svg,
        ascii: cli.ascii,
        ascii_width: cli.width,
        ascii_height: cli.height,
        export_streaks: cli.export_streaks.clone(),
    }
}

//! Quickstart demonstrating forecast matrices and rolling validation.
//!
//! Run with: cargo run --example quickstart

use anofox_horizon::prelude::*;
use anofox_horizon::validation::FitStatistics;
use chrono::{Duration, TimeZone, Utc};

fn main() -> Result<()> {
    println!("=== anofox-horizon Quickstart ===\n");

    // 1. Create sample time series data
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let timestamps: Vec<_> = (0..120).map(|i| base + Duration::hours(i)).collect();
    let values: Vec<f64> = (0..120)
        .map(|i| {
            20.0                              // level
            + 4.0 * (i as f64 * 0.26).sin()   // cycle
            + 0.8 * (i as f64 * 1.9).cos()    // wiggle
        })
        .collect();
    let series = Series::with_timestamps(timestamps, values)?.labeled("demand");
    println!("Created series with {} observations", series.len());

    // 2. Recursive AR(2) forecasts for horizons 1..=4
    println!("\n--- Recursive AR(2), H = 4 ---");
    let mut recursive = RecursiveForecaster::new(AutoRegressive::new(2), EngineConfig::new(4))?;
    recursive.train(series.values())?;
    let matrix = recursive.forecast_all(&series)?;

    println!("{:>20} {:>10} {:>10} {:>10} {:>10} {:>10}", "time", "actual", "h=1", "h=2", "h=3", "h=4");
    println!("{:-<75}", "");
    for row in matrix.to_rows().iter().skip(matrix.rows() - 6) {
        let cell = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |x| format!("{x:.3}"));
        let time = row
            .timestamp
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        print!("{:>20} {:>10}", time, cell(row.actual));
        for f in &row.forecasts {
            print!(" {:>10}", cell(*f));
        }
        println!();
    }

    // 3. Direct AR(2): one regression head per horizon
    println!("\n--- Direct AR(2), forecasts from the last origin ---");
    let mut direct =
        DirectForecaster::new(DirectAutoRegressive::new(2), EngineConfig::new(4))?;
    direct.train(series.values())?;
    let path = direct.forecast(series.len() - 1, &series)?;
    let recursive_path = recursive.forecast(series.len() - 1, &series)?;
    for (h, (d, r)) in path.iter().zip(recursive_path.iter()).enumerate() {
        println!("  h={}: direct {:>8.3}  recursive {:>8.3}", h + 1, d, r);
    }

    // 4. Rolling validation
    println!("\n--- Rolling Validation (test 25%, retrain every 5 steps) ---");
    let config = RollingConfig::new()
        .with_test_fraction(0.25)
        .with_retrain_cycle(5)
        .with_multi_horizon(true);
    let report = rolling_validate(&mut recursive, &series, &config)?;
    println!(
        "train={} test={} retrains={} forecasts={}",
        report.train_size,
        report.test_size,
        report.retrains,
        report.one_step.len()
    );

    for (name, value) in FitStatistics::NAMES.iter().zip(report.statistics.to_vec()) {
        println!("  {name:>14}: {value:.4}");
    }
    for (h, stats) in report.horizon_statistics.iter().enumerate() {
        if let Some(stats) = stats {
            println!("  h={} RMSE: {:.4}", h + 1, stats.rmse);
        }
    }

    println!("\n=== Quickstart Complete ===");
    Ok(())
}

//! Command implementations. Each one is a thin adapter over
//! [`crate::engine`] that prints a human-readable result.

pub mod index;
pub mod reset;
pub mod status;
pub mod update;

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::engine::{BuildReport, RescanReason};

/// Spinner on stderr while a scan runs.
fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn print_build_report(report: &BuildReport) {
    println!(
        "Indexed {} files ({} symbols, {} languages) in {:.2}s",
        report.files,
        report.symbols,
        report.languages,
        report.duration_ms as f64 / 1000.0
    );
    println!("Structural search invocations: {}", report.invocations);
    if report.malformed_lines > 0 {
        println!("Dropped {} malformed match records", report.malformed_lines);
    }
    if report.errors > 0 {
        println!("{} errors recorded (see `codeatlas status`)", report.errors);
    }
}

fn print_rescan(reason: &RescanReason, report: &BuildReport) {
    println!("Full rescan: {}", reason);
    print_build_report(report);
}

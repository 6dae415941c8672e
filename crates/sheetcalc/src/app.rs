//! Application entry point and dispatch.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;

use sheetcalc_cli::output::{format_duration, write_report};
use sheetcalc_cli::presenter::CliReportPresenter;
use sheetcalc_core::CalculationContext;
use sheetcalc_orchestration::interfaces::ReportPresenter;
use sheetcalc_orchestration::{build_pipeline, execute_batch, select_coordinators, PerformanceMonitor};

use crate::config::AppConfig;

/// Run the application.
pub fn run(config: &AppConfig) -> Result<()> {
    // Handle shell completion
    if let Some(shell) = config.completion {
        let mut cmd = <AppConfig as clap::CommandFactory>::command();
        sheetcalc_cli::completion::generate_completion(&mut cmd, shell, &mut std::io::stdout());
        return Ok(());
    }

    let input = config
        .input
        .as_deref()
        .context("no input document: pass --input or set SHEETCALC_INPUT")?;
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {input}"))?;
    let document: Value = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse {input} as JSON"))?;

    let monitor = if config.no_perf {
        Arc::new(PerformanceMonitor::disabled())
    } else {
        Arc::new(PerformanceMonitor::new())
    };
    let coordinators = select_coordinators(&config.select)?;
    let presenter = CliReportPresenter::new(config.verbose, config.quiet);

    match document {
        Value::Array(records) => {
            let results = execute_batch(&records, &coordinators, &monitor);
            for result in &results {
                match result {
                    Ok(report) => presenter.present_report(report, config.details),
                    Err(error) => presenter.present_error(&error.to_string()),
                }
            }
            if let Some(path) = config.output.as_deref() {
                if let Some(Ok(report)) = results.first() {
                    write_report(path, report)?;
                }
            }
        }
        document => {
            let mut pipeline = build_pipeline(&coordinators, Arc::clone(&monitor))?;
            let mut ctx = CalculationContext::for_raw(&document);
            ctx.debug_mode = config.debug;
            ctx.validation_enabled = !config.no_validate;
            ctx.performance_mode = !config.no_perf;

            let report = pipeline.execute(&document, &mut ctx)?;
            presenter.present_report(&report, config.details);

            if let Some(path) = config.output.as_deref() {
                write_report(path, &report)
                    .with_context(|| format!("failed to write {path}"))?;
            }
        }
    }

    if config.perf_stats && !config.quiet {
        println!("\nPerformance:");
        println!("{:-<60}", "");
        for (operation, summary) in monitor.snapshot() {
            println!(
                "  {operation:<24} {:>4} calls  avg {:>10}  err {}",
                summary.calls,
                format_duration(summary.avg),
                summary.errors,
            );
        }
    }

    Ok(())
}

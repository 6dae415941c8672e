//! CLI report presenter.

use std::time::Duration;

use console::style;

use sheetcalc_orchestration::{ReportPresenter, RunReport};

use crate::output::format_duration;

/// Styled terminal presenter for run reports.
pub struct CliReportPresenter {
    verbose: bool,
    quiet: bool,
}

impl CliReportPresenter {
    #[must_use]
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    fn stage_line(report: &RunReport, name: &str) -> String {
        let completed = report.stage(name).is_some();
        let status = if completed {
            style("OK").green()
        } else {
            style("--").red()
        };
        let time = report
            .metadata
            .stage_times
            .get(name)
            .map_or_else(String::new, |secs| {
                format_duration(Duration::from_secs_f64(*secs))
            });
        format!("  {name:<20} {time:>10} [{status}]")
    }
}

impl ReportPresenter for CliReportPresenter {
    fn present_report(&self, report: &RunReport, details: bool) {
        if self.quiet {
            // Machine-readable: the flattened map only.
            println!("{}", report.to_value());
            return;
        }

        println!("Stages:");
        println!("{:-<60}", "");
        for name in &report.metadata.execution_order {
            println!("{}", Self::stage_line(report, name));
        }
        println!("{:-<60}", "");
        println!(
            "{} executed, {} failed, {} skipped (of {})",
            report.metadata.executed_stages,
            report.metadata.failed_stages,
            report.metadata.skipped_stages,
            report.metadata.total_stages,
        );

        if details || self.verbose {
            for (name, data) in &report.results {
                println!("\n{}", style(name).bold());
                match serde_json::to_string_pretty(data) {
                    Ok(pretty) => println!("{pretty}"),
                    Err(_) => println!("{data}"),
                }
            }
        }
    }

    fn present_error(&self, error: &str) {
        eprintln!("{} {error}", style("Error:").red().bold());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use sheetcalc_orchestration::RunMetadata;

    fn sample_report() -> RunReport {
        RunReport {
            results: BTreeMap::from([(
                "abilities".to_string(),
                serde_json::json!({ "strength": { "score": 16 } }),
            )]),
            metadata: RunMetadata {
                total_stages: 2,
                executed_stages: 1,
                failed_stages: 1,
                skipped_stages: 0,
                execution_order: vec!["abilities".into(), "combat".into()],
                stage_times: BTreeMap::from([
                    ("abilities".to_string(), 0.0005),
                    ("combat".to_string(), 0.0001),
                ]),
            },
        }
    }

    #[test]
    fn presenter_modes() {
        let presenter = CliReportPresenter::new(true, false);
        assert!(presenter.verbose);
        assert!(!presenter.quiet);
    }

    #[test]
    fn present_report_quiet() {
        let presenter = CliReportPresenter::new(false, true);
        presenter.present_report(&sample_report(), false);
    }

    #[test]
    fn present_report_normal() {
        let presenter = CliReportPresenter::new(false, false);
        presenter.present_report(&sample_report(), false);
    }

    #[test]
    fn present_report_with_details() {
        let presenter = CliReportPresenter::new(false, false);
        presenter.present_report(&sample_report(), true);
    }

    #[test]
    fn present_error() {
        let presenter = CliReportPresenter::new(false, false);
        presenter.present_error("test error message");
    }

    #[test]
    fn stage_line_marks_missing_stage() {
        let report = sample_report();
        let line = CliReportPresenter::stage_line(&report, "combat");
        assert!(line.contains("combat"));
        let line = CliReportPresenter::stage_line(&report, "abilities");
        assert!(line.contains("abilities"));
    }
}

use std::path::Path;

use reorder_core::config::{AppConfig, LoadOptions};
use reorder_core::domain::Dataset;
use reorder_data::{load_forecast, load_history, LoadError};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_dataset(
                "history_data",
                &config.data.history_path,
                load_history(&config.data.history_path),
            ));
            checks.push(check_dataset(
                "forecast_data",
                &config.data.forecast_path,
                load_forecast(&config.data.forecast_path),
            ));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["history_data", "forecast_data"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_dataset<T>(
    name: &'static str,
    path: &Path,
    loaded: Result<Dataset<T>, LoadError>,
) -> DoctorCheck {
    match loaded {
        Ok(Dataset::Loaded(rows)) if rows.is_empty() => DoctorCheck {
            name,
            status: CheckStatus::Fail,
            details: format!("`{}` has a header but no rows", path.display()),
        },
        Ok(Dataset::Loaded(rows)) => DoctorCheck {
            name,
            status: CheckStatus::Pass,
            details: format!("loaded {} rows from `{}`", rows.len(), path.display()),
        },
        Ok(Dataset::Unavailable { reason }) => DoctorCheck {
            name,
            status: CheckStatus::Fail,
            details: format!("{reason} (`{}`)", path.display()),
        },
        Err(error) => DoctorCheck { name, status: CheckStatus::Fail, details: error.to_string() },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

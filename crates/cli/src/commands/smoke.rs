use std::time::Instant;

use reorder_core::config::{AppConfig, LoadOptions};
use reorder_core::domain::DataSplit;
use reorder_core::recommend::{Recommendation, RecommendationEngine, RecommendationPolicy};
use reorder_core::service::RecommendationService;
use reorder_data::fixtures::{self, DEMO_FORECAST_WEEK, DEMO_TEST_WEEK};
use serde::Serialize;

use crate::commands::CommandResult;

/// Day inside the demo Test week, used to exercise alignment.
const MID_WEEK_DATE: &str = "2025-01-22";
/// Week with no forecast rows in the demo snapshot.
const EMPTY_WEEK_DATE: &str = "2025-03-05";

const CHECK_NAMES: [&str; 7] = [
    "week_alignment",
    "buffer_bounds",
    "base_quantity",
    "eligibility",
    "test_over_forecast",
    "missing_week",
    "cache_consistency",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum SmokeStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct SmokeCheck {
    name: &'static str,
    status: SmokeStatus,
    elapsed_ms: u64,
    message: String,
}

#[derive(Debug, Serialize)]
struct SmokeReport {
    command: &'static str,
    status: SmokeStatus,
    summary: String,
    total_elapsed_ms: u64,
    checks: Vec<SmokeCheck>,
}

pub fn run() -> CommandResult {
    let started = Instant::now();
    let mut checks = Vec::new();

    let policy = match timed_check(|| AppConfig::load(LoadOptions::default())) {
        Ok((elapsed_ms, config)) => {
            checks.push(SmokeCheck {
                name: "config_validation",
                status: SmokeStatus::Pass,
                elapsed_ms,
                message: "configuration loaded and validated".to_string(),
            });
            config.policy
        }
        Err((elapsed_ms, error)) => {
            checks.push(SmokeCheck {
                name: "config_validation",
                status: SmokeStatus::Fail,
                elapsed_ms,
                message: error.to_string(),
            });
            checks.extend(CHECK_NAMES.into_iter().map(skipped));
            return finalize_report(checks, started.elapsed().as_millis() as u64);
        }
    };

    let engine = fixtures::demo_snapshot().into_engine(policy);

    checks.push(run_check("week_alignment", || check_week_alignment(&engine)));
    checks.push(run_check("buffer_bounds", || check_buffer_bounds(&engine, &policy)));
    checks.push(run_check("base_quantity", || check_base_quantity(&engine)));
    checks.push(run_check("eligibility", || check_eligibility(&engine, &policy)));
    checks.push(run_check("test_over_forecast", || check_test_over_forecast(&engine)));
    checks.push(run_check("missing_week", || check_missing_week(&engine)));
    checks.push(run_check("cache_consistency", || check_cache_consistency(engine.clone())));

    finalize_report(checks, started.elapsed().as_millis() as u64)
}

fn check_week_alignment(engine: &RecommendationEngine) -> Result<String, String> {
    let response = engine.recommend(MID_WEEK_DATE, None).map_err(|error| error.to_string())?;
    if response.week.to_string() != DEMO_TEST_WEEK {
        return Err(format!(
            "{MID_WEEK_DATE} aligned to {} instead of {DEMO_TEST_WEEK}",
            response.week
        ));
    }
    Ok(format!("{MID_WEEK_DATE} aligned to {} ({})", response.week, response.week_label))
}

fn check_buffer_bounds(
    engine: &RecommendationEngine,
    policy: &RecommendationPolicy,
) -> Result<String, String> {
    let max = policy.buffer.max_buffer_pct;
    let rows = demo_rows(engine)?;
    match rows.iter().find(|row| !(0.0..=max).contains(&row.buffer_pct)) {
        Some(row) => Err(format!(
            "{} / {} has buffer_pct {} outside 0..={max}",
            row.customer, row.item_code, row.buffer_pct
        )),
        None => Ok(format!("{} rows within 0..={max}", rows.len())),
    }
}

fn check_base_quantity(engine: &RecommendationEngine) -> Result<String, String> {
    let rows = demo_rows(engine)?;
    let violation = rows.iter().find(|row| {
        row.base_qty < row.predicted_qty || row.base_qty < row.actual_qty.unwrap_or(0.0)
    });
    match violation {
        Some(row) => Err(format!("{} / {} base_qty below an input", row.customer, row.item_code)),
        None => Ok(format!("{} rows cover actual and predicted quantities", rows.len())),
    }
}

fn check_eligibility(
    engine: &RecommendationEngine,
    policy: &RecommendationPolicy,
) -> Result<String, String> {
    let rows = demo_rows(engine)?;
    let violation = rows
        .iter()
        .find(|row| !policy.selection.is_eligible(row.predicted_qty, row.buy_count));
    match violation {
        Some(row) => Err(format!("{} / {} should have been filtered", row.customer, row.item_code)),
        None => Ok(format!("{} rows satisfy the selection policy", rows.len())),
    }
}

fn check_test_over_forecast(engine: &RecommendationEngine) -> Result<String, String> {
    let tested: Vec<(String, String)> = engine
        .forecast()
        .rows()
        .iter()
        .filter(|row| row.data_split == DataSplit::Test)
        .map(|row| (row.customer.clone(), row.item_code.clone()))
        .collect();

    let response = engine.recommend(DEMO_TEST_WEEK, None).map_err(|error| error.to_string())?;
    let violation = response.rows.iter().find(|row| {
        row.actual_qty.is_none()
            && tested.contains(&(row.customer.clone(), row.item_code.clone()))
    });
    match violation {
        Some(row) => Err(format!("{} / {} used the Forecast row", row.customer, row.item_code)),
        None => Ok(format!("{} Test pairs take precedence", tested.len())),
    }
}

fn check_missing_week(engine: &RecommendationEngine) -> Result<String, String> {
    let response = engine.recommend(EMPTY_WEEK_DATE, None).map_err(|error| error.to_string())?;
    let message = response.error.unwrap_or_default();
    let week = response.week.to_string();
    if response.success || !response.rows.is_empty() || !message.contains(&week) {
        return Err(format!("expected a week-specific failure, got `{message}`"));
    }
    Ok(message)
}

fn check_cache_consistency(engine: RecommendationEngine) -> Result<String, String> {
    let service = RecommendationService::new(engine);
    let first = service.recommend(MID_WEEK_DATE, None, true).map_err(|error| error.to_string())?;
    let second =
        service.recommend(DEMO_TEST_WEEK, None, true).map_err(|error| error.to_string())?;

    if first != second {
        return Err("same-week requests returned different responses".to_string());
    }
    let evicted = service.clear_cache();
    if evicted != 1 {
        return Err(format!("expected one cached entry, evicted {evicted}"));
    }
    Ok("same-week requests shared one cache entry".to_string())
}

fn demo_rows(engine: &RecommendationEngine) -> Result<Vec<Recommendation>, String> {
    let mut rows = Vec::new();
    for week in [DEMO_TEST_WEEK, DEMO_FORECAST_WEEK] {
        let response = engine.recommend(week, None).map_err(|error| error.to_string())?;
        if !response.success {
            return Err(response.error.unwrap_or_else(|| format!("no data for {week}")));
        }
        rows.extend(response.rows);
    }
    Ok(rows)
}

fn run_check(name: &'static str, check: impl FnOnce() -> Result<String, String>) -> SmokeCheck {
    match timed_check(check) {
        Ok((elapsed_ms, message)) => {
            SmokeCheck { name, status: SmokeStatus::Pass, elapsed_ms, message }
        }
        Err((elapsed_ms, message)) => {
            SmokeCheck { name, status: SmokeStatus::Fail, elapsed_ms, message }
        }
    }
}

fn timed_check<T, E>(check: impl FnOnce() -> Result<T, E>) -> Result<(u64, T), (u64, E)> {
    let started = Instant::now();
    match check() {
        Ok(value) => Ok((started.elapsed().as_millis() as u64, value)),
        Err(error) => Err((started.elapsed().as_millis() as u64, error)),
    }
}

fn skipped(name: &'static str) -> SmokeCheck {
    SmokeCheck {
        name,
        status: SmokeStatus::Skipped,
        elapsed_ms: 0,
        message: "skipped because configuration did not load".to_string(),
    }
}

fn finalize_report(checks: Vec<SmokeCheck>, total_elapsed_ms: u64) -> CommandResult {
    let passed = checks.iter().filter(|check| check.status == SmokeStatus::Pass).count();
    let total = checks.len();
    let failed = checks.iter().any(|check| check.status == SmokeStatus::Fail);

    let report = SmokeReport {
        command: "smoke",
        status: if failed { SmokeStatus::Fail } else { SmokeStatus::Pass },
        summary: format!("smoke: {passed}/{total} checks passed in {total_elapsed_ms}ms"),
        total_elapsed_ms,
        checks,
    };

    let human = report.summary.clone();
    let machine = serde_json::to_string(&report).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"smoke\",\"status\":\"fail\",\"summary\":\"serialization failed\",\"error\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    });

    CommandResult { exit_code: if failed { 6 } else { 0 }, output: format!("{human}\n{machine}") }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_engine() -> RecommendationEngine {
        fixtures::demo_snapshot().into_engine(RecommendationPolicy::default())
    }

    #[test]
    fn invariant_checks_pass_on_the_demo_snapshot() {
        let engine = demo_engine();
        let policy = RecommendationPolicy::default();

        assert!(check_week_alignment(&engine).is_ok());
        assert!(check_buffer_bounds(&engine, &policy).is_ok());
        assert!(check_base_quantity(&engine).is_ok());
        assert!(check_eligibility(&engine, &policy).is_ok());
        assert!(check_test_over_forecast(&engine).is_ok());
        assert!(check_cache_consistency(engine.clone()).is_ok());

        let message = check_missing_week(&engine).expect("missing week check");
        assert!(message.contains("2025-03-09"));
    }

    #[test]
    fn eligibility_check_flags_rows_a_stricter_policy_would_drop() {
        let engine = demo_engine();
        let mut strict = RecommendationPolicy::default();
        strict.selection.min_predicted_qty = 1_000.0;
        strict.selection.core_item_min_buys = 1_000;

        let error = check_eligibility(&engine, &strict).expect_err("rows should be flagged");
        assert!(error.contains("should have been filtered"));
    }

    #[test]
    fn failing_checks_set_exit_code_six() {
        let checks = vec![
            run_check("week_alignment", || Ok("fine".to_string())),
            run_check("buffer_bounds", || Err("buffer above cap".to_string())),
            skipped("missing_week"),
        ];

        let result = finalize_report(checks, 3);

        assert_eq!(result.exit_code, 6);
        assert!(result.output.starts_with("smoke: 1/3 checks passed in 3ms"));
        assert!(result.output.contains("\"status\":\"fail\""));
        assert!(result.output.contains("buffer above cap"));
    }

    #[test]
    fn all_passing_checks_exit_zero() {
        let checks = vec![run_check("week_alignment", || Ok("fine".to_string()))];

        let result = finalize_report(checks, 0);

        assert_eq!(result.exit_code, 0);
        assert!(result.output.contains("\"status\":\"pass\""));
    }
}

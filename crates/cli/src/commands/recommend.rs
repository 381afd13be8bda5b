use reorder_core::config::{AppConfig, LoadOptions};
use reorder_core::recommend::RecommendationResponse;
use reorder_data::Snapshot;

use crate::commands::CommandResult;

pub fn run(date: &str, customer: Option<&str>, json_output: bool) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "recommend",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let snapshot = match Snapshot::load(&config.data) {
        Ok(snapshot) => snapshot,
        Err(error) => {
            return CommandResult::failure("recommend", "data_load", error.to_string(), 4);
        }
    };

    let engine = snapshot.into_engine(config.policy);
    let response = match engine.recommend(date, customer) {
        Ok(response) => response,
        Err(error) => {
            return CommandResult::failure("recommend", "invalid_date", error.to_string(), 2);
        }
    };

    if !response.success {
        let message = response.error.unwrap_or_else(|| "no recommendations available".to_string());
        return CommandResult::failure("recommend", "data_unavailable", message, 3);
    }

    if json_output {
        return match serde_json::to_string_pretty(&response) {
            Ok(output) => CommandResult { exit_code: 0, output },
            Err(error) => CommandResult::failure("recommend", "serialization", error.to_string(), 1),
        };
    }

    CommandResult { exit_code: 0, output: render_table(&response) }
}

fn render_table(response: &RecommendationResponse) -> String {
    let mut lines = Vec::new();

    if let Some(summary) = &response.summary {
        lines.push(format!(
            "week {} ({}): {} items for {} customers, order {} units incl. {} buffer [{}]",
            response.week_label,
            response.week,
            summary.items,
            summary.customers,
            summary.total_order_qty,
            summary.total_buffer_qty,
            summary.customer_filter,
        ));
    }

    if response.rows.is_empty() {
        lines.push("no eligible items for this week".to_string());
        return lines.join("\n");
    }

    let customer_width = column_width("CUSTOMER", response.rows.iter().map(|row| &row.customer));
    let name_width = column_width("ITEM", response.rows.iter().map(|row| &row.item_name));

    lines.push(format!(
        "{:<customer_width$}  {:<10}  {:<name_width$}  {:>8}  {:>8}  {:>6}  {:>6}  REASON",
        "CUSTOMER", "CODE", "ITEM", "PREDICT", "BASE", "BUFFER", "ORDER"
    ));
    for row in &response.rows {
        lines.push(format!(
            "{:<customer_width$}  {:<10}  {:<name_width$}  {:>8.2}  {:>8.2}  {:>6}  {:>6}  {}",
            row.customer,
            row.item_code,
            row.item_name,
            row.predicted_qty,
            row.base_qty,
            row.buffer_qty,
            row.recommended_qty,
            row.reason_code,
        ));
    }

    lines.join("\n")
}

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a String>) -> usize {
    values.map(|value| value.chars().count()).max().unwrap_or(0).max(header.len())
}

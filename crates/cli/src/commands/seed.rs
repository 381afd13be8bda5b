use std::path::Path;

use reorder_data::fixtures::{self, DEMO_FORECAST_WEEK, DEMO_TEST_WEEK};

use crate::commands::CommandResult;

/// Writes the demo snapshot as CSV. Rerunning overwrites the same files with
/// identical content.
pub fn run(out_dir: &Path) -> CommandResult {
    match fixtures::write_demo_csv(out_dir) {
        Ok(paths) => {
            let snapshot = fixtures::demo_snapshot();
            let message = format!(
                "demo snapshot written:\n  - history: {} ({} rows)\n  - forecast: {} ({} rows)\n\
                 try: reorder recommend --date {DEMO_TEST_WEEK} (Test week) or --date \
                 {DEMO_FORECAST_WEEK} (Forecast week)",
                paths.history.display(),
                snapshot.history.len(),
                paths.forecast.display(),
                snapshot.forecast.len(),
            );
            CommandResult::success("seed", message)
        }
        Err(error) => CommandResult::failure("seed", "seed_write", error.to_string(), 5),
    }
}

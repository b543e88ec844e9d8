//! Status presentation
//!
//! Renders a run summary or preview for `modstamp status` and
//! `modstamp publish --dry-run`: a table per module with its detected state
//! and stamp, or the same data as JSON.

use crate::error::PublishError;
use crate::publish::{ModuleState, RunSummary};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

fn state_label(state: ModuleState) -> String {
    match state {
        ModuleState::New => "new".green().to_string(),
        ModuleState::Changed => "changed".yellow().to_string(),
        ModuleState::Unchanged => "unchanged".to_string(),
        ModuleState::Inconsistent => "inconsistent".red().to_string(),
    }
}

/// Human-readable module table.
pub fn format_status_text(summary: &RunSummary) -> String {
    if summary.modules.is_empty() {
        return "No module directories found.".to_string();
    }

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Module", "State", "Stamp"]);
    for report in &summary.modules {
        table.add_row(vec![
            report.module.clone(),
            state_label(report.state),
            report
                .stamp
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }

    let pending = summary
        .modules
        .iter()
        .filter(|m| m.state != ModuleState::Unchanged)
        .count();
    format!(
        "{}\n{} module(s), {} pending update",
        table, summary.modules.len(), pending
    )
}

/// Machine-readable summary.
pub fn format_status_json(summary: &RunSummary) -> Result<String, PublishError> {
    serde_json::to_string_pretty(summary)
        .map_err(|e| PublishError::Config(format!("Failed to serialize status: {}", e)))
}

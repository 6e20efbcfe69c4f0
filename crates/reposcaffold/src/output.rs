//! Terminal rendering of plugin results

use std::time::Duration;

use console::{pad_str, style, Alignment};
use indicatif::{ProgressBar, ProgressStyle};
use reposcaffold::StateMap;
use serde_json::Value;

/// `✓ alice/svc-a created`
pub fn done(repo: &str, action: &str) {
    println!("{} {} {}", style("✓").green().bold(), style(repo).bold(), action);
}

/// Reported by `read` when there is nothing to show
pub fn not_found(repo: &str) {
    println!("{} {} does not exist", style("-").dim(), style(repo).bold());
}

/// Print the `outputs` block of a state map, keys aligned
pub fn state(state: &StateMap) {
    let rows = state_rows(state);
    let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (key, value) in rows {
        println!(
            "  {} {}",
            style(pad_str(&key, width, Alignment::Left, None)).dim(),
            value
        );
    }
}

fn state_rows(state: &StateMap) -> Vec<(String, String)> {
    let Some(Value::Object(outputs)) = state.get("outputs") else {
        return Vec::new();
    };
    outputs
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) if s.is_empty() => "-".to_string(),
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), value)
        })
        .collect()
}

/// Spinner shown while a remote workflow runs
pub fn working(repo: &str, action: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {prefix:.bold} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.set_prefix(repo.to_string());
    pb.set_message(action.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

//! Text report of task statistics.

use std::collections::BTreeMap;

use crate::stats::TaskExecutionStats;

const RULE_WIDTH: usize = 110;

fn us(value: u64) -> String {
    format!("{value}us")
}

fn row(name: &str, stats: &TaskExecutionStats) -> String {
    let period = format!("{}ms", stats.expected_period_us / 1_000);
    let min = stats.min_us.map_or_else(|| "-".to_string(), us);
    let utilization_pct = stats.utilization().unwrap_or(0.0) * 100.0;
    format!(
        "{name:<20}{period:<10}{current:<12}{min:<12}{avg:<12}{max:<12}{std_dev:<12}{utilization_pct:<10.1}{violations:<10}\n",
        current = us(stats.current_us),
        avg = format!("{:.0}us", stats.avg_us),
        max = us(stats.max_us),
        std_dev = format!("{:.0}us", stats.std_dev_us),
        violations = stats.deadline_violations,
    )
}

/// Render the performance table with a summary footer.
#[must_use]
pub fn render(tasks: &BTreeMap<String, TaskExecutionStats>) -> String {
    let rule = "=".repeat(40);
    let mut out = format!("\n{rule}\n    TASK PERFORMANCE REPORT\n{rule}\n\n");

    if tasks.is_empty() {
        out.push_str("No performance data available.\n");
        return out;
    }

    out.push_str(&format!(
        "{:<20}{:<10}{:<12}{:<12}{:<12}{:<12}{:<12}{:<10}{:<10}\n",
        "Task", "Period", "Current", "Min", "Avg", "Max", "Std Dev", "Util%", "Violations"
    ));
    out.push_str(&"-".repeat(RULE_WIDTH));
    out.push('\n');

    for (name, stats) in tasks {
        out.push_str(&row(name, stats));
    }

    out.push_str(&"-".repeat(RULE_WIDTH));
    out.push('\n');

    let total_violations: u64 = tasks.values().map(|s| s.deadline_violations).sum();
    out.push_str("\nSummary:\n");
    out.push_str(&format!("  Total Tasks: {}\n", tasks.len()));
    out.push_str(&format!("  Total Deadline Violations: {total_violations}\n"));
    if total_violations > 0 {
        out.push_str("  WARNING: Deadline violations detected!\n");
    } else {
        out.push_str("  All tasks meeting deadlines\n");
    }
    out.push_str(&rule);
    out.push('\n');
    out
}

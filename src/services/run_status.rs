//! Run status roll-up for entries and suites.

use crate::models::{RunStatus, SuiteStats};

/// Derive an entry's status from its step statuses.
///
/// First match wins: all passed, any failed, any blocked, any progress.
/// Returns `None` when there are no steps or every step is still Not Run,
/// meaning the entry status is left as it is.
pub fn derive_entry_status(steps: &[RunStatus]) -> Option<RunStatus> {
    if steps.is_empty() {
        return None;
    }
    if steps.iter().all(|s| *s == RunStatus::Passed) {
        return Some(RunStatus::Passed);
    }
    if steps.contains(&RunStatus::Failed) {
        return Some(RunStatus::Failed);
    }
    if steps.contains(&RunStatus::Blocked) {
        return Some(RunStatus::Blocked);
    }
    if steps.iter().any(|s| *s != RunStatus::NotRun) {
        return Some(RunStatus::InProgress);
    }
    None
}

/// Rounded percentage, 0 when `total` is 0.
pub fn percentage(part: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (f64::from(part) / f64::from(total) * 100.0).round() as u32
}

/// Count entry statuses for a suite.
///
/// Statuses outside the four named buckets (e.g. In Progress) only count
/// toward `total`. `passRate` is executed / total.
pub fn suite_stats<'a, I>(statuses: I) -> SuiteStats
where
    I: IntoIterator<Item = &'a str>,
{
    let mut stats = SuiteStats::default();

    for raw in statuses {
        stats.total += 1;
        match RunStatus::parse(raw) {
            Some(RunStatus::Passed) => stats.passed += 1,
            Some(RunStatus::Failed) => stats.failed += 1,
            Some(RunStatus::Blocked) => stats.blocked += 1,
            Some(RunStatus::NotRun) => stats.not_run += 1,
            _ => {}
        }
    }

    stats.executed = stats.passed + stats.failed + stats.blocked;
    stats.pass_rate = percentage(stats.executed, stats.total);
    stats
}

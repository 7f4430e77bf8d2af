//! Dashboard and report aggregation over run entries and test cases.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use crate::models::{Priority, PriorityCount, RunStatus, StatusCount, TrendPoint};

/// Days covered by the execution trend.
pub const TREND_WINDOW_DAYS: i64 = 30;

/// Count entries per status. Missing or blank statuses count as Not Run.
///
/// Known statuses come first in workflow order, anything else follows by name.
pub fn status_distribution<I>(statuses: I) -> Vec<StatusCount>
where
    I: IntoIterator<Item = Option<String>>,
{
    let counts = count_by(statuses.into_iter().map(|status| {
        status
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| RunStatus::NotRun.as_str().to_string())
    }));

    ordered(counts, RunStatus::ALL.map(|s| s.as_str()).as_slice())
        .into_iter()
        .map(|(status, count)| StatusCount { status, count })
        .collect()
}

/// Count test cases per priority. Missing or blank priorities count as Medium.
pub fn priority_distribution<I>(priorities: I) -> Vec<PriorityCount>
where
    I: IntoIterator<Item = Option<String>>,
{
    let counts = count_by(priorities.into_iter().map(|priority| {
        priority
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| Priority::Medium.as_str().to_string())
    }));

    let known = [
        Priority::High.as_str(),
        Priority::Medium.as_str(),
        Priority::Low.as_str(),
    ];
    ordered(counts, &known)
        .into_iter()
        .map(|(priority, count)| PriorityCount { priority, count })
        .collect()
}

/// Midnight (UTC) of the first day in the trend window.
///
/// The window is counted in calendar days, so every execution on the day
/// 30 days before `now` is included whatever its time of day.
pub fn trend_start(now: DateTime<Utc>) -> DateTime<Utc> {
    (now - Duration::days(TREND_WINDOW_DAYS))
        .date_naive()
        .and_time(NaiveTime::MIN)
        .and_utc()
}

/// Executions per calendar day (UTC) over the last 30 days, oldest first.
///
/// Days without executions are omitted.
pub fn execution_trend<I>(executed_at: I, now: DateTime<Utc>) -> Vec<TrendPoint>
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let first_day = trend_start(now).date_naive();
    let mut per_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();

    for day in executed_at.into_iter().map(|ts| ts.date_naive()) {
        if day >= first_day {
            *per_day.entry(day).or_default() += 1;
        }
    }

    per_day
        .into_iter()
        .map(|(day, count)| TrendPoint {
            date: day.format("%b %-d").to_string(),
            count,
        })
        .collect()
}

fn count_by<I: Iterator<Item = String>>(keys: I) -> HashMap<String, u64> {
    let mut counts = HashMap::new();
    for key in keys {
        *counts.entry(key).or_default() += 1;
    }
    counts
}

fn ordered(mut counts: HashMap<String, u64>, known: &[&str]) -> Vec<(String, u64)> {
    let mut result: Vec<(String, u64)> = known
        .iter()
        .filter_map(|k| counts.remove(*k).map(|count| (k.to_string(), count)))
        .collect();

    let mut rest: Vec<(String, u64)> = counts.into_iter().collect();
    rest.sort();
    result.extend(rest);
    result
}

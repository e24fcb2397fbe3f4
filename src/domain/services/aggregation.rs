//! Activity Aggregation Engine
//!
//! Rolls grouped activity-log totals into per-member statistics and a
//! room-wide app ranking. Inputs arrive pre-grouped from the store (per
//! user and app, per user and hour); this module owns ranking, zero-filling
//! and the membership join.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::domain::entities::{AppUsage, HourlyUsage};

/// Number of apps in the room-wide ranking.
pub const TOP_APPS_LIMIT: usize = 10;

/// Slots in an hourly histogram.
pub const HOURS_PER_DAY: u32 = 24;

/// Seconds spent in one app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppTotal {
    pub app_name: String,
    pub total_seconds: i64,
}

/// Seconds per UTC hour of day, keyed `"00"`..`"23"`.
pub type HourlyHistogram = BTreeMap<String, i64>;

/// Aggregated activity of one member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberActivity {
    pub user_id: String,
    pub total_seconds: i64,

    /// Descending by seconds
    pub apps: Vec<AppTotal>,

    pub hourly_activity: HourlyHistogram,
}

/// Aggregated activity of a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomActivity {
    /// Descending by total seconds
    pub members: Vec<MemberActivity>,

    /// At most [`TOP_APPS_LIMIT`] entries, descending by seconds
    pub top_apps: Vec<AppTotal>,
}

/// Histogram key for an hour of day.
pub fn hour_key(hour: u32) -> String {
    format!("{:02}", hour)
}

/// A histogram with all 24 slots set to zero.
pub fn empty_histogram() -> HourlyHistogram {
    (0..HOURS_PER_DAY).map(|hour| (hour_key(hour), 0)).collect()
}

/// Sum seconds per app in first-seen order, then rank descending.
///
/// The sort is stable, so apps with equal totals keep first-seen order.
fn rank_apps<'a>(rows: impl Iterator<Item = (&'a str, i64)>) -> Vec<AppTotal> {
    let mut totals: Vec<AppTotal> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for (app_name, seconds) in rows {
        match index.get(app_name) {
            Some(&i) => totals[i].total_seconds += seconds,
            None => {
                index.insert(app_name, totals.len());
                totals.push(AppTotal {
                    app_name: app_name.to_string(),
                    total_seconds: seconds,
                });
            }
        }
    }

    totals.sort_by(|a, b| b.total_seconds.cmp(&a.total_seconds));
    totals
}

/// Build the histogram of one user from grouped hourly rows.
fn histogram_for(user_id: &str, hourly_usage: &[HourlyUsage]) -> HourlyHistogram {
    let mut histogram = empty_histogram();
    for row in hourly_usage
        .iter()
        .filter(|row| row.user_id == user_id && row.hour < HOURS_PER_DAY)
    {
        *histogram.entry(hour_key(row.hour)).or_insert(0) += row.total_seconds;
    }
    histogram
}

/// Aggregate a room's activity for the given members.
///
/// `member_ids` are the current members in membership order; every one of
/// them appears in the result, with zero totals if nothing was logged.
/// `app_usage` covers the requested period and `hourly_usage` the current
/// day. Rows of users outside `member_ids` (departed or anonymized) only
/// count toward `top_apps`.
pub fn aggregate_room(
    member_ids: &[&str],
    app_usage: &[AppUsage],
    hourly_usage: &[HourlyUsage],
) -> RoomActivity {
    let mut members: Vec<MemberActivity> = member_ids
        .iter()
        .map(|&user_id| {
            let apps = rank_apps(
                app_usage
                    .iter()
                    .filter(|row| row.user_id == user_id)
                    .map(|row| (row.app_name.as_str(), row.total_seconds)),
            );
            let total_seconds = apps.iter().map(|app| app.total_seconds).sum();

            MemberActivity {
                user_id: user_id.to_string(),
                total_seconds,
                apps,
                hourly_activity: histogram_for(user_id, hourly_usage),
            }
        })
        .collect();

    members.sort_by(|a, b| b.total_seconds.cmp(&a.total_seconds));

    let mut top_apps = rank_apps(
        app_usage
            .iter()
            .map(|row| (row.app_name.as_str(), row.total_seconds)),
    );
    top_apps.truncate(TOP_APPS_LIMIT);

    RoomActivity { members, top_apps }
}

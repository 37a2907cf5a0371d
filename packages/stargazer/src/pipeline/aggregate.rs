//! Turns sampled stargazer records into the published stats.
//!
//! The grouping helpers are plain functions over records so any store can
//! reuse them; the Postgres store computes the same groups in SQL.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveTime, TimeZone, Utc};

use crate::error::Result;
use crate::pipeline::sampler::STARGAZERS_PER_PAGE;
use crate::traits::store::SnapshotStore;
use crate::types::{
    snapshot::{RepositorySnapshot, StargazerRecord},
    stats::{Adopter, Measure, Stats},
};

/// Days kept in the daily series.
pub const PER_DAYS_WINDOW: usize = 30;

/// Length of the recent adopters list.
pub const LAST_ADOPTERS: usize = 10;

/// Midnight UTC of the day containing `at`.
pub fn day_of(at: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&at.date_naive().and_time(NaiveTime::default()))
}

/// Count records per (page, day), ordered by page then day.
pub fn group_by_page_and_day(records: &[StargazerRecord]) -> Vec<Measure> {
    let mut groups: BTreeMap<(u32, DateTime<Utc>), i64> = BTreeMap::new();
    for record in records {
        *groups
            .entry((record.page, day_of(record.starred_at)))
            .or_default() += 1;
    }
    groups
        .into_iter()
        .map(|((page, date), count)| Measure::for_page(page, date, count))
        .collect()
}

/// Count last-page records per day, oldest first.
pub fn group_last_page_by_day(records: &[StargazerRecord]) -> Vec<Measure> {
    let mut groups: BTreeMap<DateTime<Utc>, i64> = BTreeMap::new();
    for record in records.iter().filter(|r| r.is_last_page) {
        *groups.entry(day_of(record.starred_at)).or_default() += 1;
    }
    groups
        .into_iter()
        .map(|(date, count)| Measure::new(date, count))
        .collect()
}

/// The `limit` most recent last-page records, most recent first.
pub fn latest_last_page(records: &[StargazerRecord], limit: usize) -> Vec<StargazerRecord> {
    let mut last: Vec<StargazerRecord> = records.iter().filter(|r| r.is_last_page).cloned().collect();
    last.sort_by(|a, b| b.starred_at.cmp(&a.starred_at));
    last.truncate(limit);
    last
}

/// Cumulative star series from per-page daily groups.
///
/// Pages skipped by sampling are assumed full, so a jump from page `p` to
/// page `q` adds `(q - p - 1) * 100` before the group's own count. The final
/// point is `count_stars` at `now`. Running totals are capped at
/// `count_stars` so the series never decreases.
pub fn evolution(groups: &[Measure], count_stars: i64, now: DateTime<Utc>) -> Vec<Measure> {
    if groups.is_empty() {
        return Vec::new();
    }

    let mut sorted = groups.to_vec();
    sorted.sort_by(|a, b| (a.page, a.date).cmp(&(b.page, b.date)));

    let mut series = Vec::with_capacity(sorted.len() + 1);
    let mut total: i64 = 0;
    let mut previous_page: u32 = 1;
    for group in sorted {
        let page = group.page.unwrap_or(previous_page);
        if page > previous_page + 1 {
            total += i64::from(page - previous_page - 1) * STARGAZERS_PER_PAGE;
        }
        total += group.count;
        previous_page = page;
        series.push(Measure::new(group.date, total.min(count_stars)));
    }
    series.push(Measure::new(now, count_stars));
    series
}

/// The most recent days of a daily series (oldest first).
pub fn per_days(days: &[Measure]) -> Vec<Measure> {
    let skip = days.len().saturating_sub(PER_DAYS_WINDOW);
    days[skip..]
        .iter()
        .map(|m| Measure::new(m.date, m.count))
        .collect()
}

/// Logins of the most recent adopters, padded with empty entries.
pub fn last_adopters(latest: &[StargazerRecord]) -> Vec<Adopter> {
    let mut adopters: Vec<Adopter> = latest
        .iter()
        .take(LAST_ADOPTERS)
        .map(|r| Adopter {
            by: r.login.clone(),
        })
        .collect();
    adopters.resize(LAST_ADOPTERS, Adopter::default());
    adopters
}

/// Compute the stats for a sampled repository. `now` stamps the final
/// evolution point.
pub async fn compute_stats(
    store: &dyn SnapshotStore,
    snapshot: &RepositorySnapshot,
    now: DateTime<Utc>,
) -> Result<Stats> {
    let groups = store.daily_counts_by_page(&snapshot.path).await?;
    let days = store.last_page_daily_counts(&snapshot.path).await?;
    let latest = store
        .latest_last_page(&snapshot.path, LAST_ADOPTERS)
        .await?;

    let stats = Stats {
        evolution: evolution(&groups, snapshot.star_count, now),
        per_days: per_days(&days),
        last_10: last_adopters(&latest),
        count_stars: snapshot.star_count,
    };

    tracing::debug!(
        repository = %snapshot.path,
        evolution_points = stats.evolution.len(),
        days = stats.per_days.len(),
        "Computed stats"
    );

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
    }

    fn record(page: u32, last: bool, login: &str, starred_at: DateTime<Utc>) -> StargazerRecord {
        StargazerRecord {
            repository_path: "a/b".into(),
            page,
            is_last_page: last,
            login: login.into(),
            starred_at,
        }
    }

    #[test]
    fn test_day_of_truncates_to_utc_midnight() {
        assert_eq!(day_of(at(5, 23)), at(5, 0));
    }

    #[test]
    fn test_group_by_page_and_day() {
        let records = vec![
            record(3, true, "c", at(3, 1)),
            record(1, false, "a", at(1, 10)),
            record(1, false, "b", at(1, 12)),
            record(1, false, "x", at(2, 8)),
        ];
        let groups = group_by_page_and_day(&records);
        assert_eq!(
            groups,
            vec![
                Measure::for_page(1, at(1, 0), 2),
                Measure::for_page(1, at(2, 0), 1),
                Measure::for_page(3, at(3, 0), 1),
            ]
        );
    }

    #[test]
    fn test_evolution_single_page() {
        // 150 stars, pages 1 (100 records on day 1) and 2 (50 on day 2)
        let now = at(20, 0);
        let groups = vec![
            Measure::for_page(1, at(1, 0), 100),
            Measure::for_page(2, at(2, 0), 50),
        ];
        let series = evolution(&groups, 150, now);
        assert_eq!(
            series,
            vec![
                Measure::new(at(1, 0), 100),
                Measure::new(at(2, 0), 150),
                Measure::new(now, 150),
            ]
        );
    }

    #[test]
    fn test_evolution_fills_skipped_pages() {
        let now = at(20, 0);
        let groups = vec![
            Measure::for_page(1, at(1, 0), 100),
            Measure::for_page(5, at(9, 0), 40),
        ];
        let series = evolution(&groups, 1000, now);
        // pages 2..=4 assumed full: 100 + 300 + 40
        assert_eq!(series[1], Measure::new(at(9, 0), 440));
        assert_eq!(series.last(), Some(&Measure::new(now, 1000)));
    }

    #[test]
    fn test_evolution_is_non_decreasing_and_capped() {
        let now = at(20, 0);
        let groups = vec![
            Measure::for_page(1, at(1, 0), 100),
            Measure::for_page(4, at(4, 0), 100),
        ];
        let series = evolution(&groups, 250, now);
        assert!(series.windows(2).all(|w| w[0].count <= w[1].count));
        assert_eq!(series.last().unwrap().count, 250);
    }

    #[test]
    fn test_evolution_empty_without_records() {
        assert!(evolution(&[], 12, Utc::now()).is_empty());
    }

    #[test]
    fn test_evolution_first_page_gap_counts_from_page_one() {
        // Sampling always fetches page 1, but a lone later page still
        // assumes the pages before it were full.
        let groups = vec![Measure::for_page(3, at(3, 0), 10)];
        let series = evolution(&groups, 500, at(4, 0));
        assert_eq!(series[0].count, 110);
    }

    #[test]
    fn test_per_days_keeps_most_recent_thirty() {
        let start = at(1, 0);
        let days: Vec<Measure> = (0..45)
            .map(|i| Measure::new(start + Duration::days(i), i + 1))
            .collect();
        let window = per_days(&days);
        assert_eq!(window.len(), 30);
        assert_eq!(window[0].count, 16);
        assert_eq!(window[29].count, 45);
        assert!(window.iter().all(|m| m.page.is_none()));
    }

    #[test]
    fn test_last_adopters_padded_to_ten() {
        let records = vec![
            record(2, true, "old", at(1, 0)),
            record(2, true, "new", at(3, 0)),
            record(1, false, "ignored", at(9, 0)),
        ];
        let latest = latest_last_page(&records, LAST_ADOPTERS);
        let adopters = last_adopters(&latest);
        assert_eq!(adopters.len(), 10);
        assert_eq!(adopters[0].by, "new");
        assert_eq!(adopters[1].by, "old");
        assert!(adopters[2..].iter().all(|a| a.by.is_empty()));
    }

    #[test]
    fn test_group_last_page_by_day_ignores_other_pages() {
        let records = vec![
            record(1, false, "a", at(1, 0)),
            record(2, true, "b", at(2, 5)),
            record(2, true, "c", at(2, 6)),
        ];
        assert_eq!(
            group_last_page_by_day(&records),
            vec![Measure::new(at(2, 0), 2)]
        );
    }
}

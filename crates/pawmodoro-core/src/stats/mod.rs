//! Read-side aggregation over the session and app-open logs.
//!
//! All functions take "today" explicitly so results are reproducible.
//! Sessions are bucketed into calendar days of the stats' time zone (UTC
//! unless [`FocusStats::with_timezone`] says otherwise).

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::collection::CumulativeStats;
use crate::storage::SessionLog;

/// Focus hours on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyFocus {
    pub date: NaiveDate,
    pub hours: f64,
}

/// Headline numbers for a stats screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub days: Vec<DailyFocus>,
    pub total_hours: f64,
    pub active_days_this_month: usize,
    pub cumulative: CumulativeStats,
}

#[derive(Debug, Clone)]
pub struct FocusStats<Tz: TimeZone = Utc> {
    sessions: Vec<SessionLog>,
    opens: BTreeSet<NaiveDate>,
    tz: Tz,
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

impl FocusStats {
    pub fn new(sessions: Vec<SessionLog>, opens: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            sessions,
            opens: opens.into_iter().collect(),
            tz: Utc,
        }
    }
}

impl<Tz: TimeZone> FocusStats<Tz> {
    /// Bucket sessions by calendar day in `tz` instead.
    pub fn with_timezone<T: TimeZone>(self, tz: T) -> FocusStats<T> {
        FocusStats {
            sessions: self.sessions,
            opens: self.opens,
            tz,
        }
    }

    fn day_of(&self, timestamp: &DateTime<Utc>) -> NaiveDate {
        timestamp.with_timezone(&self.tz).date_naive()
    }

    pub fn sessions(&self) -> &[SessionLog] {
        &self.sessions
    }

    /// Focus hours for each of the `n` days ending on `today`, oldest first.
    /// Days are taken in UTC.
    pub fn last_n_days(&self, n: u32, today: NaiveDate) -> Vec<DailyFocus> {
        if n == 0 {
            return Vec::new();
        }
        let start = today - Duration::days(i64::from(n) - 1);
        let mut minutes: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        for offset in 0..n {
            minutes.insert(start + Duration::days(i64::from(offset)), 0);
        }
        for s in &self.sessions {
            if let Some(m) = minutes.get_mut(&self.day_of(&s.timestamp)) {
                *m += u64::from(s.minutes);
            }
        }
        minutes
            .into_iter()
            .map(|(date, m)| DailyFocus {
                date,
                hours: round2(m as f64 / 60.0),
            })
            .collect()
    }

    /// Total focus hours over the `n` days ending on `today`.
    pub fn total_hours(&self, n: u32, today: NaiveDate) -> f64 {
        round2(self.last_n_days(n, today).iter().map(|d| d.hours).sum())
    }

    /// Days in the given month on which the app was opened.
    pub fn active_days_in_month(&self, year: i32, month: u32) -> usize {
        self.opens
            .iter()
            .filter(|d| d.year() == year && d.month() == month)
            .count()
    }

    /// Consecutive days with at least one session, ending today, or
    /// yesterday when nothing was logged today yet.
    pub fn streak(&self, today: NaiveDate) -> u32 {
        let days: BTreeSet<NaiveDate> = self
            .sessions
            .iter()
            .map(|s| self.day_of(&s.timestamp))
            .collect();

        let mut day = if days.contains(&today) {
            today
        } else {
            today - Duration::days(1)
        };
        let mut streak = 0;
        while days.contains(&day) {
            streak += 1;
            day -= Duration::days(1);
        }
        streak
    }

    /// Lifetime totals for threshold unlocks. `level` is the companion's.
    pub fn cumulative(&self, today: NaiveDate, level: u32) -> CumulativeStats {
        let (cycles, minutes) = self.sessions.iter().fold((0u32, 0u32), |(c, m), s| {
            (c.saturating_add(s.cycles), m.saturating_add(s.minutes))
        });
        CumulativeStats {
            cycles,
            streak: self.streak(today),
            focus_minutes: minutes,
            level,
        }
    }

    pub fn summary(&self, days: u32, today: NaiveDate, level: u32) -> StatsSummary {
        StatsSummary {
            days: self.last_n_days(days, today),
            total_hours: self.total_hours(days, today),
            active_days_this_month: self.active_days_in_month(today.year(), today.month()),
            cumulative: self.cumulative(today, level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn log(y: i32, m: u32, d: u32, minutes: u32, cycles: u32) -> SessionLog {
        SessionLog {
            timestamp: Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap(),
            minutes,
            cycles,
        }
    }

    #[test]
    fn last_n_days_fills_gaps_with_zero() {
        let stats = FocusStats::new(
            vec![log(2026, 3, 8, 90, 3), log(2026, 3, 10, 30, 1), log(2026, 3, 10, 15, 1)],
            [],
        );
        let series = stats.last_n_days(3, day(2026, 3, 10));
        assert_eq!(
            series,
            vec![
                DailyFocus { date: day(2026, 3, 8), hours: 1.5 },
                DailyFocus { date: day(2026, 3, 9), hours: 0.0 },
                DailyFocus { date: day(2026, 3, 10), hours: 0.75 },
            ]
        );
        assert_eq!(stats.total_hours(3, day(2026, 3, 10)), 2.25);
    }

    #[test]
    fn sessions_outside_window_are_ignored() {
        let stats = FocusStats::new(vec![log(2026, 1, 1, 60, 1)], []);
        assert_eq!(stats.total_hours(7, day(2026, 3, 10)), 0.0);
        assert!(stats.last_n_days(0, day(2026, 3, 10)).is_empty());
    }

    #[test]
    fn active_days_counts_current_month_only() {
        let stats = FocusStats::new(
            vec![],
            [day(2026, 2, 28), day(2026, 3, 1), day(2026, 3, 5), day(2025, 3, 2)],
        );
        assert_eq!(stats.active_days_in_month(2026, 3), 2);
    }

    #[test]
    fn streak_counts_back_from_today_or_yesterday() {
        let stats = FocusStats::new(
            vec![log(2026, 3, 7, 25, 1), log(2026, 3, 8, 25, 1), log(2026, 3, 9, 25, 1)],
            [],
        );
        assert_eq!(stats.streak(day(2026, 3, 9)), 3);
        assert_eq!(stats.streak(day(2026, 3, 10)), 3);
        assert_eq!(stats.streak(day(2026, 3, 11)), 0);
    }

    #[test]
    fn days_follow_the_chosen_timezone() {
        let late = SessionLog {
            timestamp: Utc.with_ymd_and_hms(2026, 3, 10, 23, 30, 0).unwrap(),
            minutes: 60,
            cycles: 1,
        };
        let utc = FocusStats::new(vec![late.clone()], []);
        assert_eq!(utc.last_n_days(1, day(2026, 3, 10))[0].hours, 1.0);

        let east = FocusStats::new(vec![late], [])
            .with_timezone(FixedOffset::east_opt(2 * 3600).unwrap());
        assert_eq!(east.last_n_days(1, day(2026, 3, 10))[0].hours, 0.0);
        assert_eq!(east.last_n_days(1, day(2026, 3, 11))[0].hours, 1.0);
        assert_eq!(east.streak(day(2026, 3, 11)), 1);
    }

    #[test]
    fn cumulative_sums_logs() {
        let stats = FocusStats::new(vec![log(2026, 3, 9, 50, 2), log(2026, 3, 10, 75, 3)], []);
        let c = stats.cumulative(day(2026, 3, 10), 4);
        assert_eq!(
            c,
            CumulativeStats {
                cycles: 5,
                streak: 2,
                focus_minutes: 125,
                level: 4,
            }
        );
    }
}

//! Per-day trigger statistics.
//!
//! Persisted as a JSON object keyed by ISO date. The weekly view starts on
//! Monday, looks back at most eleven weeks, and only reports days strictly
//! before today: today's count is still moving and is served separately.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Duration, Local, NaiveDate};
use handsoff_common::error::{HandsoffError, HandsoffResult};
use serde::{Deserialize, Serialize};

/// Oldest week offset the weekly view accepts.
pub const MAX_WEEKS_BACK: i32 = 11;

/// Trigger count for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub trigger_count: u64,
}

impl DailyStats {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            trigger_count: 0,
        }
    }
}

/// Seven days starting on Monday.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekStats {
    pub week_label: String,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    /// Monday first; `None` for days without data, today, or later.
    pub days: Vec<Option<DailyStats>>,
    pub can_go_next: bool,
    pub can_go_prev: bool,
}

/// File-backed per-day trigger counts.
#[derive(Debug)]
pub struct DailyStatsStore {
    path: PathBuf,
    days: BTreeMap<NaiveDate, DailyStats>,
}

impl DailyStatsStore {
    /// Load the store at `path`; a missing file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> HandsoffResult<Self> {
        let path = path.into();
        let days = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content).map_err(|e| {
                HandsoffError::stats(format!("Failed to parse {}: {e}", path.display()))
            })?
        } else {
            BTreeMap::new()
        };
        tracing::debug!(path = %path.display(), days = days.len(), "Stats loaded");
        Ok(Self { path, days })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Count one trigger for today and persist. Returns today's new total.
    pub fn record_trigger(&mut self) -> HandsoffResult<u64> {
        self.record_trigger_on(Local::now().date_naive())
    }

    pub fn record_trigger_on(&mut self, date: NaiveDate) -> HandsoffResult<u64> {
        let day = self
            .days
            .entry(date)
            .or_insert_with(|| DailyStats::empty(date));
        day.trigger_count += 1;
        let total = day.trigger_count;
        self.save()?;
        tracing::debug!(%date, total, "Trigger recorded");
        Ok(total)
    }

    pub fn today(&self) -> DailyStats {
        self.day(Local::now().date_naive())
    }

    pub fn day(&self, date: NaiveDate) -> DailyStats {
        self.days
            .get(&date)
            .cloned()
            .unwrap_or_else(|| DailyStats::empty(date))
    }

    /// The week `offset` weeks before the current one (`0` = this week).
    pub fn week(&self, offset: i32) -> HandsoffResult<WeekStats> {
        self.week_from(Local::now().date_naive(), offset)
    }

    pub fn week_from(&self, today: NaiveDate, offset: i32) -> HandsoffResult<WeekStats> {
        if offset > 0 {
            return Err(HandsoffError::invalid_argument(
                "cannot view future weeks",
            ));
        }
        if offset < -MAX_WEEKS_BACK {
            return Err(HandsoffError::invalid_argument(format!(
                "at most {} weeks back",
                MAX_WEEKS_BACK + 1
            )));
        }

        let back = today.weekday().num_days_from_monday() as i64 + (-offset as i64) * 7;
        let monday = today - Duration::days(back);
        let days = (0..7)
            .map(|i| monday + Duration::days(i))
            .map(|date| {
                if date >= today {
                    None
                } else {
                    self.days.get(&date).cloned()
                }
            })
            .collect();

        let week_label = match offset {
            0 => "This week".to_string(),
            -1 => "Last week".to_string(),
            n => format!("{} weeks ago", -n),
        };

        Ok(WeekStats {
            week_label,
            week_start: monday,
            week_end: monday + Duration::days(6),
            days,
            can_go_next: offset < 0,
            can_go_prev: offset > -MAX_WEEKS_BACK,
        })
    }

    fn save(&self) -> HandsoffResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.days)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

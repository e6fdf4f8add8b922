//! Daily logs: one journal entry per calendar date.

use chrono::NaiveDate;

use worldline_types::DailyLog;

use crate::error::TrackerError;

/// Highest productivity rating.
pub const MAX_PRODUCTIVITY: u8 = 10;

/// Daily logs, kept newest date first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Journal {
    /// Logs ordered by descending date, at most one per date.
    logs: Vec<DailyLog>,
}

impl Journal {
    /// An empty journal.
    pub const fn new() -> Self {
        Self { logs: Vec::new() }
    }

    /// Rebuild from persisted logs. Order is restored and duplicate dates
    /// keep the first occurrence.
    pub fn from_logs(logs: Vec<DailyLog>) -> Self {
        let mut journal = Self::new();
        for log in logs {
            if journal.get(log.date).is_none() {
                journal.logs.push(log);
            }
        }
        journal.logs.sort_by(|a, b| b.date.cmp(&a.date));
        journal
    }

    /// All logs, newest date first.
    pub fn logs(&self) -> &[DailyLog] {
        &self.logs
    }

    /// The log for `date`.
    pub fn get(&self, date: NaiveDate) -> Option<&DailyLog> {
        self.logs.iter().find(|l| l.date == date)
    }

    /// The log for `date`, or a blank one if none has been written.
    pub fn get_or_blank(&self, date: NaiveDate) -> DailyLog {
        self.get(date)
            .cloned()
            .unwrap_or_else(|| DailyLog::blank(date))
    }

    /// Insert or replace the log for `log.date`.
    pub fn upsert(&mut self, log: DailyLog) -> Result<(), TrackerError> {
        if log.productivity > MAX_PRODUCTIVITY {
            return Err(TrackerError::ProductivityOutOfRange {
                value: log.productivity,
                max: MAX_PRODUCTIVITY,
            });
        }

        let date = log.date;
        self.logs.retain(|l| l.date != date);
        let pos = self
            .logs
            .iter()
            .position(|l| l.date < date)
            .unwrap_or(self.logs.len());
        self.logs.insert(pos, log);
        tracing::debug!(%date, "daily log saved");
        Ok(())
    }
}

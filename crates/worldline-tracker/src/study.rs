//! Study sessions, timed or logged manually.
//!
//! A running session stores only its subject and start instant. Elapsed
//! time is always derived from `now - started_at`, so a missed or delayed
//! display tick never changes what gets recorded.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use worldline_types::{StudySession, StudySessionId, XpEventType};

use crate::XpReport;
use crate::error::TrackerError;

/// XP per studied minute when not configured.
pub const DEFAULT_XP_PER_MINUTE: u32 = 2;

/// A session in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveStudySession {
    /// What is being studied.
    pub subject: String,
    /// When the session started.
    pub started_at: DateTime<Utc>,
}

impl ActiveStudySession {
    /// Whole minutes elapsed at `now`. Zero if `now` precedes the start.
    pub fn elapsed_minutes(&self, now: DateTime<Utc>) -> u32 {
        let minutes = now.signed_duration_since(self.started_at).num_minutes();
        u32::try_from(minutes.max(0)).unwrap_or(u32::MAX)
    }
}

/// A recorded session and the XP it earned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyOutcome {
    /// The stored session.
    pub session: StudySession,
    /// The XP change to record.
    pub report: XpReport,
}

/// Finished sessions plus at most one running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyLog {
    /// Finished sessions, oldest first.
    sessions: Vec<StudySession>,
    /// The running session, if any.
    active: Option<ActiveStudySession>,
    /// XP earned per minute.
    xp_per_minute: u32,
}

impl Default for StudyLog {
    fn default() -> Self {
        Self::new(DEFAULT_XP_PER_MINUTE)
    }
}

impl StudyLog {
    /// An empty log paying `xp_per_minute`.
    pub const fn new(xp_per_minute: u32) -> Self {
        Self {
            sessions: Vec::new(),
            active: None,
            xp_per_minute,
        }
    }

    /// Rebuild from persisted sessions (stored oldest first).
    pub const fn from_sessions(sessions: Vec<StudySession>, xp_per_minute: u32) -> Self {
        Self {
            sessions,
            active: None,
            xp_per_minute,
        }
    }

    /// Finished sessions, oldest first.
    pub fn sessions(&self) -> &[StudySession] {
        &self.sessions
    }

    /// Finished sessions, newest first.
    pub fn sessions_newest_first(&self) -> Vec<&StudySession> {
        self.sessions.iter().rev().collect()
    }

    /// The running session.
    pub const fn active(&self) -> Option<&ActiveStudySession> {
        self.active.as_ref()
    }

    /// Start a session.
    pub fn start(
        &mut self,
        subject: &str,
        now: DateTime<Utc>,
    ) -> Result<&ActiveStudySession, TrackerError> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(TrackerError::EmptyName {
                field: "study subject",
            });
        }
        if let Some(active) = &self.active {
            return Err(TrackerError::SessionAlreadyActive {
                subject: active.subject.clone(),
            });
        }

        tracing::debug!(subject, "study session started");
        Ok(self.active.insert(ActiveStudySession {
            subject: subject.to_owned(),
            started_at: now,
        }))
    }

    /// Minutes elapsed in the running session.
    pub fn elapsed_minutes(&self, now: DateTime<Utc>) -> Option<u32> {
        self.active.as_ref().map(|a| a.elapsed_minutes(now))
    }

    /// Stop the running session and record it. Sessions shorter than a
    /// minute count as one minute.
    pub fn finish(&mut self, now: DateTime<Utc>) -> Result<StudyOutcome, TrackerError> {
        let active = self.active.as_ref().ok_or(TrackerError::NoActiveSession)?;
        let minutes = active.elapsed_minutes(now).max(1);
        let subject = active.subject.clone();
        // The session stays active if recording fails.
        let outcome = self.record(subject, minutes, now)?;
        self.active = None;
        Ok(outcome)
    }

    /// Discard the running session without recording anything.
    pub const fn cancel(&mut self) -> Option<ActiveStudySession> {
        self.active.take()
    }

    /// Record a session of explicit length.
    pub fn log_manual(
        &mut self,
        subject: &str,
        minutes: u32,
        now: DateTime<Utc>,
    ) -> Result<StudyOutcome, TrackerError> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(TrackerError::EmptyName {
                field: "study subject",
            });
        }
        if minutes == 0 {
            return Err(TrackerError::ZeroDuration);
        }
        self.record(subject.to_owned(), minutes, now)
    }

    /// Minutes studied on `date` in `tz`.
    pub fn minutes_on<Tz: TimeZone>(&self, date: NaiveDate, tz: &Tz) -> u64 {
        self.sessions_on(date, tz)
            .fold(0_u64, |acc, s| acc.saturating_add(u64::from(s.duration_minutes)))
    }

    /// XP earned from study on `date` in `tz`.
    pub fn xp_on<Tz: TimeZone>(&self, date: NaiveDate, tz: &Tz) -> u64 {
        self.sessions_on(date, tz)
            .fold(0_u64, |acc, s| acc.saturating_add(u64::from(s.xp_gained)))
    }

    fn sessions_on<'a, Tz: TimeZone>(
        &'a self,
        date: NaiveDate,
        tz: &'a Tz,
    ) -> impl Iterator<Item = &'a StudySession> {
        self.sessions
            .iter()
            .filter(move |s| s.timestamp.with_timezone(tz).date_naive() == date)
    }

    fn record(
        &mut self,
        subject: String,
        minutes: u32,
        now: DateTime<Utc>,
    ) -> Result<StudyOutcome, TrackerError> {
        let xp_gained =
            minutes
                .checked_mul(self.xp_per_minute)
                .ok_or_else(|| TrackerError::ArithmeticOverflow {
                    context: format!("{minutes} minutes at {} XP/minute", self.xp_per_minute),
                })?;

        let session = StudySession {
            id: StudySessionId::new(),
            subject,
            duration_minutes: minutes,
            timestamp: now,
            xp_gained,
        };
        self.sessions.push(session.clone());

        tracing::debug!(
            subject = %session.subject,
            minutes,
            xp_gained,
            "study session recorded"
        );

        let reason = format!("{} ({minutes}m)", session.subject);
        Ok(StudyOutcome {
            session,
            report: XpReport {
                event_type: XpEventType::Study,
                delta: i64::from(xp_gained),
                reason,
            },
        })
    }
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn elapsed_is_derived_from_start_instant() {
        let start = Utc::now();
        let active = ActiveStudySession {
            subject: "Physics".to_owned(),
            started_at: start,
        };
        assert_eq!(active.elapsed_minutes(start), 0);
        assert_eq!(active.elapsed_minutes(start + Duration::seconds(59)), 0);
        assert_eq!(active.elapsed_minutes(start + Duration::minutes(25)), 25);
        assert_eq!(active.elapsed_minutes(start - Duration::minutes(5)), 0);
    }

    #[test]
    fn finish_records_at_least_one_minute() {
        let mut log = StudyLog::default();
        let start = Utc::now();
        assert!(log.start("Physics", start).is_ok());

        let outcome = log.finish(start + Duration::seconds(20));
        let Ok(outcome) = outcome else {
            unreachable!("session was running");
        };
        assert_eq!(outcome.session.duration_minutes, 1);
        assert_eq!(outcome.session.xp_gained, 2);
        assert_eq!(outcome.report.delta, 2);
        assert_eq!(outcome.report.reason, "Physics (1m)");
        assert!(log.active().is_none());
    }

    #[test]
    fn finish_pays_per_minute() {
        let mut log = StudyLog::new(3);
        let start = Utc::now();
        let _ = log.start("Chemistry", start);
        let xp = log
            .finish(start + Duration::minutes(30))
            .map(|o| o.session.xp_gained);
        assert_eq!(xp, Ok(90));
    }

    #[test]
    fn only_one_session_at_a_time() {
        let mut log = StudyLog::default();
        let now = Utc::now();
        let _ = log.start("Physics", now);
        assert_eq!(
            log.start("Maths", now).err(),
            Some(TrackerError::SessionAlreadyActive {
                subject: "Physics".to_owned()
            })
        );
        assert!(log.cancel().is_some());
        assert_eq!(log.finish(now).err(), Some(TrackerError::NoActiveSession));
        assert!(log.sessions().is_empty());
    }

    #[test]
    fn manual_session_validation() {
        let mut log = StudyLog::default();
        let now = Utc::now();
        assert_eq!(log.log_manual("Physics", 0, now).err(), Some(TrackerError::ZeroDuration));
        assert!(log.log_manual("", 30, now).is_err());

        let outcome = log.log_manual("Physics", 30, now).map(|o| o.report);
        assert_eq!(
            outcome,
            Ok(XpReport {
                event_type: XpEventType::Study,
                delta: 60,
                reason: "Physics (30m)".to_owned(),
            })
        );
    }

    #[test]
    fn daily_totals_and_ordering() {
        let mut log = StudyLog::default();
        let now = Utc::now();
        let yesterday = now - Duration::days(1);
        let _ = log.log_manual("Old", 10, yesterday);
        let _ = log.log_manual("Physics", 30, now);
        let _ = log.log_manual("Maths", 15, now);

        assert_eq!(log.minutes_on(now.date_naive(), &Utc), 45);
        assert_eq!(log.xp_on(now.date_naive(), &Utc), 90);
        let newest = log.sessions_newest_first();
        assert_eq!(newest.first().map(|s| s.subject.as_str()), Some("Maths"));
    }

    #[test]
    fn overflowing_finish_keeps_the_session_running() {
        let mut log = StudyLog::new(u32::MAX);
        let start = Utc::now();
        let _ = log.start("Astronomy", start);

        let result = log.finish(start + Duration::minutes(2));
        assert!(matches!(result, Err(TrackerError::ArithmeticOverflow { .. })));
        assert_eq!(log.active().map(|a| a.subject.as_str()), Some("Astronomy"));
        assert!(log.sessions().is_empty());
    }

    #[test]
    fn active_session_roundtrips_through_json() {
        let active = ActiveStudySession {
            subject: "Physics".to_owned(),
            started_at: Utc::now(),
        };
        let json = serde_json::to_string(&active).unwrap_or_default();
        let restored: Option<ActiveStudySession> = serde_json::from_str(&json).ok();
        assert_eq!(restored, Some(active));
    }
}

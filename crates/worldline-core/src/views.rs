//! Read-only views assembled for the dashboard panels.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use worldline_agents::AgentMessage;
use worldline_ledger::LevelProgress;
use worldline_types::{WorldlineEntry, XpEvent};

use crate::worldline::Worldline;

/// Default number of worldline readings shown in the history panel.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Default number of ledger entries shown in the XP log panel.
pub const DEFAULT_XP_LOG_LIMIT: usize = 50;

/// The header panel: totals, level, worldline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    /// Accumulated XP.
    pub xp: u64,
    /// Global habit streak.
    pub streak: u32,
    /// Divergence counter.
    pub divergence: i64,
    /// When the last XP-affecting action happened.
    pub last_active: Option<DateTime<Utc>>,
    /// Level and progress through it.
    pub progress: LevelProgress,
    /// Current reading.
    pub worldline: Worldline,
    /// Reading proximity is measured against.
    pub target: Worldline,
    /// Closeness to `target`, in `[0, 100]`.
    pub proximity: Decimal,
    /// The most recent narrator line.
    pub feedback: Option<AgentMessage>,
}

impl Dashboard {
    /// The derived level.
    pub const fn level(&self) -> u32 {
        self.progress.level
    }
}

/// The XP log panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct XpLogView {
    /// The calendar day `today_net` covers.
    pub date: NaiveDate,
    /// Net applied XP on `date`.
    pub today_net: i64,
    /// Number of entries on `date`.
    pub today_count: usize,
    /// Most recent entries first.
    pub entries: Vec<XpEvent>,
}

/// The worldline history panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorldlineHistoryView {
    /// Current reading.
    pub current: Worldline,
    /// Most recent readings first.
    pub entries: Vec<WorldlineEntry>,
}

//! The fixed set of persisted records.
//!
//! | Key | Contents |
//! |-----|----------|
//! | `game_state` | The progression snapshot |
//! | `habits` | Habit list |
//! | `tasks` | Task list |
//! | `study_sessions` | Finished study sessions |
//! | `daily_logs` | Daily logs |
//! | `xp_events` | XP ledger, oldest first |
//! | `worldline_history` | Worldline readings, oldest first |

use serde::{Deserialize, Serialize};

/// Identifies one persisted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKey {
    /// The progression snapshot.
    GameState,
    /// Habit list.
    Habits,
    /// Task list.
    Tasks,
    /// Finished study sessions.
    StudySessions,
    /// Daily logs.
    DailyLogs,
    /// XP ledger.
    XpEvents,
    /// Worldline readings.
    WorldlineHistory,
}

impl RecordKey {
    /// Every key.
    pub const ALL: [Self; 7] = [
        Self::GameState,
        Self::Habits,
        Self::Tasks,
        Self::StudySessions,
        Self::DailyLogs,
        Self::XpEvents,
        Self::WorldlineHistory,
    ];

    /// The key's storage name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GameState => "game_state",
            Self::Habits => "habits",
            Self::Tasks => "tasks",
            Self::StudySessions => "study_sessions",
            Self::DailyLogs => "daily_logs",
            Self::XpEvents => "xp_events",
            Self::WorldlineHistory => "worldline_history",
        }
    }
}

impl core::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique_and_match_serde() {
        let mut names: Vec<&str> = RecordKey::ALL.iter().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), RecordKey::ALL.len());

        let json = serde_json::to_string(&RecordKey::WorldlineHistory).unwrap_or_default();
        assert_eq!(json, "\"worldline_history\"");
    }
}

//! Daily habits.
//!
//! Completing a habit awards its XP and bumps its streak; un-completing it
//! on the same day revokes the XP and drops the streak by one (floored at
//! zero). Each toggle also reports a global streak change of one step in
//! the same direction.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use worldline_types::{Habit, HabitId, XpEventType};

use crate::XpReport;
use crate::error::TrackerError;

/// XP value of a new habit when none is given.
pub const DEFAULT_HABIT_XP: u32 = 10;

/// The result of toggling a habit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitToggle {
    /// The habit after the toggle.
    pub habit: Habit,
    /// The XP change to record.
    pub report: XpReport,
    /// Change to apply to the global streak: `+1` or `-1`.
    pub streak_delta: i8,
}

/// The habit collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitBook {
    /// Habits in creation order.
    habits: Vec<Habit>,
}

impl HabitBook {
    /// Create an empty collection.
    pub const fn new() -> Self {
        Self { habits: Vec::new() }
    }

    /// Rebuild from persisted records.
    pub const fn from_habits(habits: Vec<Habit>) -> Self {
        Self { habits }
    }

    /// All habits in creation order.
    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    /// Number of habits.
    pub const fn len(&self) -> usize {
        self.habits.len()
    }

    /// Whether there are no habits.
    pub const fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }

    /// Look up a habit.
    pub fn get(&self, id: HabitId) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }

    /// How many habits are done today.
    pub fn completed_count(&self) -> usize {
        self.habits.iter().filter(|h| h.completed_today).count()
    }

    /// Add a habit and return its ID.
    pub fn create(
        &mut self,
        name: &str,
        xp_value: u32,
        now: DateTime<Utc>,
    ) -> Result<HabitId, TrackerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TrackerError::EmptyName {
                field: "habit name",
            });
        }

        let id = HabitId::new();
        self.habits.push(Habit {
            id,
            name: name.to_owned(),
            xp_value,
            streak: 0,
            completed_today: false,
            last_completed: None,
            created_at: now,
        });
        tracing::debug!(habit_id = %id, name, xp_value, "habit created");
        Ok(id)
    }

    /// Flip a habit's completion for today.
    pub fn toggle(&mut self, id: HabitId, now: DateTime<Utc>) -> Result<HabitToggle, TrackerError> {
        let habit = self
            .habits
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or(TrackerError::HabitNotFound(id))?;

        let completed = !habit.completed_today;
        habit.completed_today = completed;

        let xp = i64::from(habit.xp_value);
        let (delta, streak_delta) = if completed {
            habit.streak = habit.streak.saturating_add(1);
            habit.last_completed = Some(now);
            (xp, 1)
        } else {
            habit.streak = habit.streak.saturating_sub(1);
            (xp.saturating_neg(), -1)
        };

        Ok(HabitToggle {
            habit: habit.clone(),
            report: XpReport {
                event_type: XpEventType::Habit,
                delta,
                reason: habit.name.clone(),
            },
            streak_delta,
        })
    }

    /// Remove a habit. XP already earned is kept.
    pub fn delete(&mut self, id: HabitId) -> Result<Habit, TrackerError> {
        let pos = self
            .habits
            .iter()
            .position(|h| h.id == id)
            .ok_or(TrackerError::HabitNotFound(id))?;
        Ok(self.habits.remove(pos))
    }

    /// Clear `completed_today` on every habit not completed on `today`
    /// (evaluated in `tz`). Returns how many habits were reset.
    pub fn roll_over<Tz: TimeZone>(&mut self, today: NaiveDate, tz: &Tz) -> usize {
        let mut reset: usize = 0;
        for habit in &mut self.habits {
            let done_today = habit
                .last_completed
                .is_some_and(|at| at.with_timezone(tz).date_naive() == today);
            if habit.completed_today && !done_today {
                habit.completed_today = false;
                reset = reset.saturating_add(1);
            }
        }
        if reset > 0 {
            tracing::debug!(reset, %today, "habits rolled over to a new day");
        }
        reset
    }
}

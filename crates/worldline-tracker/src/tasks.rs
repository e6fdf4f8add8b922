//! One-off tasks with priority-based XP.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use worldline_types::{Task, TaskId, TaskPriority, XpEventType};

use crate::XpReport;
use crate::error::TrackerError;

/// XP awarded per task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRewards {
    /// XP for a high-priority task (default: 50).
    #[serde(default = "default_high")]
    pub high: u32,
    /// XP for a medium-priority task (default: 30).
    #[serde(default = "default_medium")]
    pub medium: u32,
    /// XP for a low-priority task (default: 15).
    #[serde(default = "default_low")]
    pub low: u32,
}

const fn default_high() -> u32 {
    50
}

const fn default_medium() -> u32 {
    30
}

const fn default_low() -> u32 {
    15
}

impl Default for TaskRewards {
    fn default() -> Self {
        Self {
            high: default_high(),
            medium: default_medium(),
            low: default_low(),
        }
    }
}

impl TaskRewards {
    /// XP for a task of `priority`.
    pub const fn xp_for(&self, priority: TaskPriority) -> u32 {
        match priority {
            TaskPriority::High => self.high,
            TaskPriority::Medium => self.medium,
            TaskPriority::Low => self.low,
        }
    }
}

/// Input for [`TaskBook::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// What needs doing.
    pub title: String,
    /// Optional due date.
    pub deadline: Option<NaiveDate>,
    /// Priority; determines XP.
    pub priority: TaskPriority,
    /// Grouping label. Empty means `"general"`.
    pub category: String,
}

impl NewTask {
    /// A medium-priority task in the general category with no deadline.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            deadline: None,
            priority: TaskPriority::default(),
            category: "general".to_owned(),
        }
    }
}

/// The result of toggling a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskToggle {
    /// The task after the toggle.
    pub task: Task,
    /// The XP change to record.
    pub report: XpReport,
}

/// The task collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskBook {
    /// Tasks in creation order.
    tasks: Vec<Task>,
}

impl TaskBook {
    /// Create an empty collection.
    pub const fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Rebuild from persisted records.
    pub const fn from_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    /// All tasks in creation order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Number of tasks.
    pub const fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether there are no tasks.
    pub const fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Look up a task.
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Add a task and return its ID. XP comes from `rewards`.
    pub fn create(
        &mut self,
        new_task: NewTask,
        rewards: &TaskRewards,
        now: DateTime<Utc>,
    ) -> Result<TaskId, TrackerError> {
        let NewTask {
            title,
            deadline,
            priority,
            category,
        } = new_task;
        let title = title.trim();
        if title.is_empty() {
            return Err(TrackerError::EmptyName {
                field: "task title",
            });
        }
        let category = match category.trim() {
            "" => "general",
            other => other,
        };

        let id = TaskId::new();
        let xp_value = rewards.xp_for(priority);
        self.tasks.push(Task {
            id,
            title: title.to_owned(),
            deadline,
            priority,
            xp_value,
            completed: false,
            category: category.to_owned(),
            created_at: now,
        });
        tracing::debug!(task_id = %id, xp_value, "task created");
        Ok(id)
    }

    /// Flip a task between done and open.
    pub fn toggle(&mut self, id: TaskId) -> Result<TaskToggle, TrackerError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TrackerError::TaskNotFound(id))?;

        task.completed = !task.completed;
        let xp = i64::from(task.xp_value);
        let delta = if task.completed { xp } else { xp.saturating_neg() };

        Ok(TaskToggle {
            task: task.clone(),
            report: XpReport {
                event_type: XpEventType::Task,
                delta,
                reason: task.title.clone(),
            },
        })
    }

    /// Remove a task. XP already earned is kept.
    pub fn delete(&mut self, id: TaskId) -> Result<Task, TrackerError> {
        let pos = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(TrackerError::TaskNotFound(id))?;
        Ok(self.tasks.remove(pos))
    }

    /// Tasks ordered high priority first; creation order within a priority.
    pub fn sorted_by_priority(&self) -> Vec<&Task> {
        let mut sorted: Vec<&Task> = self.tasks.iter().collect();
        sorted.sort_by_key(|t| t.priority);
        sorted
    }

    /// Open tasks whose deadline is before `today`.
    pub fn overdue(&self, today: NaiveDate) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| !t.completed && t.deadline.is_some_and(|d| d < today))
            .collect()
    }

    /// Number of open tasks.
    pub fn pending_count(&self) -> usize {
        self.tasks.iter().filter(|t| !t.completed).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    #[test]
    fn xp_follows_priority() {
        let rewards = TaskRewards::default();
        let mut book = TaskBook::new();
        for (priority, xp) in [
            (TaskPriority::High, 50),
            (TaskPriority::Medium, 30),
            (TaskPriority::Low, 15),
        ] {
            let task = NewTask {
                priority,
                ..NewTask::titled("Finish lab report")
            };
            let id = book.create(task, &rewards, Utc::now()).ok();
            assert_eq!(id.and_then(|id| book.get(id)).map(|t| t.xp_value), Some(xp));
        }
    }

    #[test]
    fn empty_title_rejected_and_empty_category_defaults() {
        let rewards = TaskRewards::default();
        let mut book = TaskBook::new();
        assert!(book.create(NewTask::titled(" "), &rewards, Utc::now()).is_err());

        let task = NewTask {
            category: String::new(),
            ..NewTask::titled("Email professor")
        };
        let id = book.create(task, &rewards, Utc::now()).ok();
        let category = id.and_then(|id| book.get(id)).map(|t| t.category.clone());
        assert_eq!(category.as_deref(), Some("general"));
    }

    #[test]
    fn toggle_reports_signed_xp() {
        let rewards = TaskRewards::default();
        let mut book = TaskBook::new();
        let Ok(id) = book.create(NewTask::titled("Finish lab report"), &rewards, Utc::now())
        else {
            unreachable!("valid task");
        };

        let done = book.toggle(id).map(|t| t.report);
        assert_eq!(
            done,
            Ok(XpReport {
                event_type: XpEventType::Task,
                delta: 30,
                reason: "Finish lab report".to_owned(),
            })
        );
        let reopened = book.toggle(id).map(|t| (t.report.delta, t.task.completed));
        assert_eq!(reopened, Ok((-30, false)));
    }

    #[test]
    fn sorted_puts_high_first() {
        let rewards = TaskRewards::default();
        let mut book = TaskBook::new();
        for (title, priority) in [
            ("low", TaskPriority::Low),
            ("high", TaskPriority::High),
            ("medium", TaskPriority::Medium),
        ] {
            let _ = book.create(
                NewTask {
                    priority,
                    ..NewTask::titled(title)
                },
                &rewards,
                Utc::now(),
            );
        }
        let titles: Vec<&str> = book
            .sorted_by_priority()
            .into_iter()
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(titles, vec!["high", "medium", "low"]);
    }

    #[test]
    fn overdue_only_counts_open_tasks_past_deadline() {
        let rewards = TaskRewards::default();
        let mut book = TaskBook::new();
        let today = date(2026, 10, 19);
        let past = NewTask {
            deadline: Some(date(2026, 10, 18)),
            ..NewTask::titled("past")
        };
        let due_today = NewTask {
            deadline: Some(today),
            ..NewTask::titled("today")
        };
        let Ok(past_id) = book.create(past, &rewards, Utc::now()) else {
            unreachable!("valid task");
        };
        let _ = book.create(due_today, &rewards, Utc::now());
        let _ = book.create(NewTask::titled("someday"), &rewards, Utc::now());

        assert_eq!(book.overdue(today).len(), 1);
        let _ = book.toggle(past_id);
        assert!(book.overdue(today).is_empty());
        assert_eq!(book.pending_count(), 2);
    }

    #[test]
    fn partial_reward_table_keeps_defaults() {
        let rewards: Option<TaskRewards> = serde_json::from_str(r#"{"high": 80}"#).ok();
        assert_eq!(
            rewards,
            Some(TaskRewards {
                high: 80,
                ..TaskRewards::default()
            })
        );
        assert_eq!(rewards.map(|r| r.xp_for(TaskPriority::Medium)), Some(30));
    }
}

//! The lab session: one user's progression, collections, and store.
//!
//! [`Lab`] owns the current [`GameState`] snapshot and every collection,
//! routes each XP-affecting action through the [`ProgressionController`],
//! and persists whatever changed after every action.
//!
//! # Persistence
//!
//! Saving is best-effort. A record that fails to save stays in the dirty set
//! and is written again after the next action (or an explicit
//! [`Lab::flush`]). The in-memory state is authoritative either way.

use std::collections::BTreeSet;

use chrono::{Local, NaiveDate};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use worldline_agents::{AgentMessage, quote_for_label, quote_of_the_day};
use worldline_db::{FileStore, RecordKey, RecordStore, StoreError};
use worldline_ledger::{ReconciliationResult, XpLedger};
use worldline_tracker::{
    ActiveStudySession, HabitBook, Journal, NewTask, StudyLog, TaskBook, TrackerError,
};
use worldline_types::{
    DailyLog, GameState, Habit, HabitId, Mood, QuoteContext, StudySession, Task, TaskId,
    WorldlineEntry,
};

use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigError, LabConfig};
use crate::progression::{EventOutcome, GameEvent, ProgressionController, with_streak_delta};
use crate::ticker::{DEFAULT_TICK_PERIOD, Ticker};
use crate::views::{Dashboard, WorldlineHistoryView, XpLogView};
use crate::worldline::{Worldline, proximity, worldline_of};

// ---------------------------------------------------------------------------
// Errors and reports
// ---------------------------------------------------------------------------

/// Errors returned by [`Lab`] operations.
#[derive(Debug, thiserror::Error)]
pub enum LabError {
    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A tracker collection rejected the action.
    #[error(transparent)]
    Tracker(#[from] TrackerError),

    /// The data directory could not be opened.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What a persistence pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// Records written successfully.
    pub saved: Vec<RecordKey>,
    /// Records that failed and remain dirty.
    pub failed: Vec<RecordKey>,
}

impl SaveReport {
    /// Whether every dirty record was written.
    pub const fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A collection record together with the XP event it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tracked<T> {
    /// The record after the action.
    pub record: T,
    /// The progression result.
    pub outcome: EventOutcome,
}

// ---------------------------------------------------------------------------
// Lab
// ---------------------------------------------------------------------------

/// A progression session bound to a store and a clock.
#[derive(Debug)]
pub struct Lab<S: RecordStore, C: Clock = SystemClock> {
    /// Loaded configuration.
    config: LabConfig,
    /// Event pipeline.
    controller: ProgressionController,
    /// Reading proximity is measured against.
    target: Worldline,
    /// Persistence boundary.
    store: S,
    /// Time source.
    clock: C,
    /// Narrator and quote randomness.
    rng: SmallRng,
    /// Current snapshot.
    state: GameState,
    /// XP history.
    ledger: XpLedger,
    /// Worldline readings, oldest first.
    worldlines: Vec<WorldlineEntry>,
    /// Habits.
    habits: HabitBook,
    /// Tasks.
    tasks: TaskBook,
    /// Study sessions.
    study: StudyLog,
    /// Elapsed-time ticker for the running study session.
    study_ticker: Option<Ticker>,
    /// Daily logs.
    journal: Journal,
    /// Most recent narrator line.
    last_message: Option<AgentMessage>,
    /// Records changed since their last successful save.
    dirty: BTreeSet<RecordKey>,
}

impl Lab<FileStore, SystemClock> {
    /// Open the lab on the file store at `config.storage.data_dir`, using
    /// the wall clock.
    pub fn open_data_dir(config: LabConfig) -> Result<Self, LabError> {
        let store = FileStore::open(config.storage.data_dir.clone())?;
        Self::open(config, store, SystemClock)
    }
}

impl<S: RecordStore, C: Clock> Lab<S, C> {
    /// Open a session: validate `config`, then load every record from
    /// `store`. Absent or unreadable records start from defaults.
    pub fn open(config: LabConfig, store: S, clock: C) -> Result<Self, LabError> {
        config.validate()?;
        let controller = ProgressionController::from_config(&config)?;
        let target = config.progression.target().map_err(ConfigError::from)?;
        let rng = config
            .dialogue
            .seed
            .map_or_else(SmallRng::from_os_rng, SmallRng::seed_from_u64);

        let state: GameState = store.load_or_default(RecordKey::GameState);
        let ledger = XpLedger::from_entries(store.load_or_default(RecordKey::XpEvents));
        let worldlines: Vec<WorldlineEntry> = store.load_or_default(RecordKey::WorldlineHistory);
        let habits = HabitBook::from_habits(store.load_or_default(RecordKey::Habits));
        let tasks = TaskBook::from_tasks(store.load_or_default(RecordKey::Tasks));
        let study = StudyLog::from_sessions(
            store.load_or_default(RecordKey::StudySessions),
            config.rewards.study_xp_per_minute,
        );
        let journal = Journal::from_logs(store.load_or_default(RecordKey::DailyLogs));

        let mut lab = Self {
            config,
            controller,
            target,
            store,
            clock,
            rng,
            state,
            ledger,
            worldlines,
            habits,
            tasks,
            study,
            study_ticker: None,
            journal,
            last_message: None,
            dirty: BTreeSet::new(),
        };

        if let ReconciliationResult::Anomaly(anomaly) = lab.reconcile() {
            tracing::warn!(%anomaly, "persisted XP does not match the ledger");
        }
        lab.roll_over_habits();
        lab.persist();

        tracing::info!(
            xp = lab.state.xp,
            level = lab.controller.curve().level_of(lab.state.xp),
            divergence = lab.state.divergence,
            ledger_entries = lab.ledger.len(),
            habits = lab.habits.len(),
            tasks = lab.tasks.len(),
            "lab opened"
        );
        Ok(lab)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The current snapshot.
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// The loaded configuration.
    pub const fn config(&self) -> &LabConfig {
        &self.config
    }

    /// The event pipeline.
    pub const fn controller(&self) -> &ProgressionController {
        &self.controller
    }

    /// The XP history.
    pub const fn ledger(&self) -> &XpLedger {
        &self.ledger
    }

    /// Habits.
    pub const fn habits(&self) -> &HabitBook {
        &self.habits
    }

    /// Tasks.
    pub const fn tasks(&self) -> &TaskBook {
        &self.tasks
    }

    /// Study sessions.
    pub const fn study(&self) -> &StudyLog {
        &self.study
    }

    /// Daily logs.
    pub const fn journal(&self) -> &Journal {
        &self.journal
    }

    /// The store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the store, for fault injection in tests.
    pub const fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// The clock.
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// The most recent narrator line.
    pub const fn last_message(&self) -> Option<&AgentMessage> {
        self.last_message.as_ref()
    }

    /// Records waiting to be saved.
    pub fn pending_saves(&self) -> Vec<RecordKey> {
        self.dirty.iter().copied().collect()
    }

    // -----------------------------------------------------------------------
    // Progression
    // -----------------------------------------------------------------------

    /// Session-start greeting.
    pub fn greet(&mut self) -> AgentMessage {
        let message = self.controller.greet(&mut self.rng);
        self.last_message = Some(message.clone());
        message
    }

    /// Record a raw XP event and persist the result.
    pub fn record_event(&mut self, event: GameEvent) -> EventOutcome {
        let outcome = self.apply(event);
        self.persist();
        outcome
    }

    /// Check that the ledger explains the current XP total.
    pub fn reconcile(&self) -> ReconciliationResult {
        self.ledger.verify_reconciliation(0, self.state.xp)
    }

    /// Run `event` through the controller and swap in the new snapshot.
    fn apply(&mut self, event: GameEvent) -> EventOutcome {
        let now = self.clock.now();
        let outcome =
            self.controller
                .record_event(&self.state, &mut self.ledger, event, now, &mut self.rng);

        self.state = outcome.state.clone();
        self.dirty.insert(RecordKey::GameState);
        self.dirty.insert(RecordKey::XpEvents);
        if let Some(entry) = &outcome.worldline_entry {
            self.worldlines.push(entry.clone());
            self.dirty.insert(RecordKey::WorldlineHistory);
        }
        self.last_message = Some(
            outcome
                .level_up_feedback
                .clone()
                .unwrap_or_else(|| outcome.feedback.clone()),
        );
        outcome
    }

    // -----------------------------------------------------------------------
    // Habits
    // -----------------------------------------------------------------------

    /// Add a habit. `xp_value` defaults to `rewards.default_habit_xp`.
    pub fn create_habit(&mut self, name: &str, xp_value: Option<u32>) -> Result<HabitId, LabError> {
        let xp = xp_value.unwrap_or(self.config.rewards.default_habit_xp);
        let id = self.habits.create(name, xp, self.clock.now())?;
        self.dirty.insert(RecordKey::Habits);
        self.persist();
        Ok(id)
    }

    /// Flip a habit's completion, adjust the global streak, and record the
    /// XP change.
    pub fn toggle_habit(&mut self, id: HabitId) -> Result<Tracked<Habit>, LabError> {
        self.roll_over_habits();
        let toggle = self.habits.toggle(id, self.clock.now())?;
        self.dirty.insert(RecordKey::Habits);

        self.state = with_streak_delta(&self.state, toggle.streak_delta);
        let outcome = self.apply(GameEvent::from(toggle.report));
        self.persist();
        Ok(Tracked {
            record: toggle.habit,
            outcome,
        })
    }

    /// Remove a habit. XP already earned is kept.
    pub fn delete_habit(&mut self, id: HabitId) -> Result<Habit, LabError> {
        let habit = self.habits.delete(id)?;
        self.dirty.insert(RecordKey::Habits);
        self.persist();
        Ok(habit)
    }

    /// Clear yesterday's completions.
    fn roll_over_habits(&mut self) {
        let today = self.clock.today();
        if self.habits.roll_over(today, &Local) > 0 {
            self.dirty.insert(RecordKey::Habits);
        }
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    /// Add a task; its XP comes from `rewards.task_xp`.
    pub fn create_task(&mut self, task: NewTask) -> Result<TaskId, LabError> {
        let id = self
            .tasks
            .create(task, &self.config.rewards.task_xp, self.clock.now())?;
        self.dirty.insert(RecordKey::Tasks);
        self.persist();
        Ok(id)
    }

    /// Flip a task between done and open and record the XP change.
    pub fn toggle_task(&mut self, id: TaskId) -> Result<Tracked<Task>, LabError> {
        let toggle = self.tasks.toggle(id)?;
        self.dirty.insert(RecordKey::Tasks);
        let outcome = self.apply(GameEvent::from(toggle.report));
        self.persist();
        Ok(Tracked {
            record: toggle.task,
            outcome,
        })
    }

    /// Remove a task. XP already earned is kept.
    pub fn delete_task(&mut self, id: TaskId) -> Result<Task, LabError> {
        let task = self.tasks.delete(id)?;
        self.dirty.insert(RecordKey::Tasks);
        self.persist();
        Ok(task)
    }

    /// Open tasks past their deadline.
    pub fn overdue_tasks(&self) -> Vec<&Task> {
        self.tasks.overdue(self.clock.today())
    }

    // -----------------------------------------------------------------------
    // Study
    // -----------------------------------------------------------------------

    /// Start a timed study session.
    pub fn start_study(&mut self, subject: &str) -> Result<ActiveStudySession, LabError> {
        let active = self.study.start(subject, self.clock.now())?.clone();
        Ok(active)
    }

    /// Whole minutes elapsed in the running session, derived from its start.
    pub fn study_elapsed_minutes(&self) -> Option<u32> {
        self.study.elapsed_minutes(self.clock.now())
    }

    /// Start a once-per-second ticker reporting the running session's
    /// elapsed minutes. Returns `false` when no session is running.
    ///
    /// The lab owns the ticker: it replaces any previous one and stops when
    /// the session is finished or cancelled. Must be called inside a tokio
    /// runtime.
    pub fn start_study_ticker<F>(&mut self, mut on_elapsed: F) -> bool
    where
        F: FnMut(u32) + Send + 'static,
    {
        let Some(active) = self.study.active().cloned() else {
            return false;
        };
        self.study_ticker = Some(Ticker::spawn(DEFAULT_TICK_PERIOD, move |now| {
            on_elapsed(active.elapsed_minutes(now));
        }));
        true
    }

    /// Whether a study ticker is running.
    pub fn study_ticker_running(&self) -> bool {
        self.study_ticker.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Finish the running session, record it, and award its XP. Stops the
    /// study ticker.
    pub fn finish_study(&mut self) -> Result<Tracked<StudySession>, LabError> {
        let outcome = self.study.finish(self.clock.now())?;
        self.stop_study_ticker();
        Ok(self.record_study(outcome.session, GameEvent::from(outcome.report)))
    }

    /// Discard the running session without recording anything. Stops the
    /// study ticker.
    pub fn cancel_study(&mut self) -> Option<ActiveStudySession> {
        self.stop_study_ticker();
        self.study.cancel()
    }

    /// Dropping the handle aborts the loop before its next tick.
    fn stop_study_ticker(&mut self) {
        if let Some(ticker) = self.study_ticker.take() {
            tracing::debug!(ticks = ticker.ticks(), "study ticker stopped");
        }
    }

    /// Record a session of explicit length and award its XP.
    pub fn log_study(
        &mut self,
        subject: &str,
        minutes: u32,
    ) -> Result<Tracked<StudySession>, LabError> {
        let outcome = self.study.log_manual(subject, minutes, self.clock.now())?;
        Ok(self.record_study(outcome.session, GameEvent::from(outcome.report)))
    }

    /// Minutes studied today.
    pub fn study_minutes_today(&self) -> u64 {
        self.study.minutes_on(self.clock.today(), &Local)
    }

    fn record_study(&mut self, session: StudySession, event: GameEvent) -> Tracked<StudySession> {
        self.dirty.insert(RecordKey::StudySessions);
        let outcome = self.apply(event);
        self.persist();
        Tracked {
            record: session,
            outcome,
        }
    }

    // -----------------------------------------------------------------------
    // Daily logs
    // -----------------------------------------------------------------------

    /// The log for `date`, or a blank one.
    pub fn daily_log(&self, date: NaiveDate) -> DailyLog {
        self.journal.get_or_blank(date)
    }

    /// Write today's log, stamped with today's net XP and the current
    /// divergence.
    pub fn save_daily_log(
        &mut self,
        mood: Mood,
        productivity: u8,
        notes: &str,
    ) -> Result<DailyLog, LabError> {
        let date = self.clock.today();
        let log = DailyLog {
            date,
            mood,
            productivity,
            notes: notes.trim().to_owned(),
            xp_gained: self.ledger.net_for_day(date, &Local),
            divergence: self.state.divergence,
        };
        self.journal.upsert(log.clone())?;
        self.dirty.insert(RecordKey::DailyLogs);
        self.persist();
        Ok(log)
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    /// The header panel.
    pub fn dashboard(&self) -> Dashboard {
        let worldline = worldline_of(self.state.divergence);
        Dashboard {
            xp: self.state.xp,
            streak: self.state.streak,
            divergence: self.state.divergence,
            last_active: self.state.last_active,
            progress: self.controller.curve().progress(self.state.xp),
            worldline,
            target: self.target,
            proximity: proximity(&worldline, &self.target),
            feedback: self.last_message.clone(),
        }
    }

    /// Up to `limit` ledger entries, most recent first, with today's net.
    pub fn xp_log(&self, limit: usize) -> XpLogView {
        let date = self.clock.today();
        XpLogView {
            date,
            today_net: self.ledger.net_for_day(date, &Local),
            today_count: self.ledger.entries_for_day(date, &Local).len(),
            entries: self.ledger.recent(limit).into_iter().cloned().collect(),
        }
    }

    /// Up to `limit` worldline readings, most recent first.
    pub fn worldline_history(&self, limit: usize) -> WorldlineHistoryView {
        WorldlineHistoryView {
            current: worldline_of(self.state.divergence),
            entries: self.worldlines.iter().rev().take(limit).cloned().collect(),
        }
    }

    /// The quote for `context` on today's date. Stable for the whole day.
    pub fn daily_quote(&self, context: QuoteContext) -> &'static str {
        quote_of_the_day(context, self.clock.today())
    }

    /// A random quote for a context label. Unknown labels get the default.
    pub fn quote(&mut self, label: &str) -> &'static str {
        quote_for_label(label, &mut self.rng)
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Save every dirty record now.
    pub fn flush(&mut self) -> SaveReport {
        self.persist()
    }

    /// Write every dirty record. Failures are logged and stay dirty.
    fn persist(&mut self) -> SaveReport {
        let mut report = SaveReport::default();
        let pending: Vec<RecordKey> = self.dirty.iter().copied().collect();

        for key in pending {
            match self.save_record(key) {
                Ok(()) => {
                    self.dirty.remove(&key);
                    report.saved.push(key);
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "save failed; will retry");
                    report.failed.push(key);
                }
            }
        }
        report
    }

    fn save_record(&mut self, key: RecordKey) -> Result<(), StoreError> {
        match key {
            RecordKey::GameState => self.store.save_json(key, &self.state),
            RecordKey::Habits => self.store.save_json(key, &self.habits.habits()),
            RecordKey::Tasks => self.store.save_json(key, &self.tasks.tasks()),
            RecordKey::StudySessions => self.store.save_json(key, &self.study.sessions()),
            RecordKey::DailyLogs => self.store.save_json(key, &self.journal.logs()),
            RecordKey::XpEvents => self.store.save_json(key, &self.ledger.all_entries()),
            RecordKey::WorldlineHistory => self.store.save_json(key, &self.worldlines),
        }
    }
}

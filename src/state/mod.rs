// State management module
//
// This module provides the StateManager which wraps the learner's settings and
// statistics with thread-safe access using Arc<RwLock<T>>, persists them through
// an injected key-value store, and reports what changed on every update.

use crate::models::{GlobalSettings, KanaType, LearningStats, NavigationMode, SettingsPatch};
use crate::storage::{KeyValueStore, SETTINGS_KEY, STATS_KEY, Slot};
use chrono::{DateTime, Utc};
use std::sync::{Arc, PoisonError, RwLock};

/// Persisted learner state: preferences plus the statistics accumulator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LearnerState {
    pub settings: GlobalSettings,
    pub stats: LearningStats,
}

/// Changes reported when state is modified
///
/// The manager does not push these anywhere; callers inspect the returned list
/// and re-render whatever depends on it.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// Any settings field has been updated
    SettingsChanged,

    /// Flashcard navigation mode changed
    LearningModeChanged { mode: NavigationMode },

    /// Default script selection changed
    KanaTypeChanged { kana_type: KanaType },

    /// An answer was added to the statistics
    AttemptRecorded {
        kana_id: String,
        correct: bool,
        accuracy: u32,
    },

    /// A learning session was counted
    SessionStarted { total_sessions: u32 },

    /// Statistics were wiped
    StatsReset,
}

/// Thread-safe learner state with write-through persistence
///
/// This is the context object passed by reference to every screen:
/// - Provides thread-safe access to [`LearnerState`] via `Arc<RwLock<T>>`
/// - Detects state changes and reports them as [`StateChange`]s
/// - Saves the settings and stats blobs that changed while still holding the
///   write lock, so the persisted snapshot always matches a complete update
///
/// Storage failures are logged and swallowed; the in-memory state keeps
/// working for the rest of the session.
///
/// # Usage
///
/// - [`read()`](Self::read) for reading state without cloning
/// - [`update()`](Self::update) for mutations with change detection and persistence
/// - the convenience methods for the operations screens perform
pub struct StateManager {
    state: Arc<RwLock<LearnerState>>,
    settings_slot: Slot<GlobalSettings>,
    stats_slot: Slot<LearningStats>,
}

impl StateManager {
    /// Load settings and statistics from `store`, falling back to defaults
    ///
    /// # Arguments
    /// * `store` - Storage backend for the `settings` and `stats` keys
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let settings_slot = Slot::new(Arc::clone(&store), SETTINGS_KEY);
        let stats_slot = Slot::new(store, STATS_KEY);

        let settings: GlobalSettings = settings_slot.load_or_default();
        let mut stats: LearningStats = stats_slot.load_or_default();
        if !stats.is_consistent() {
            tracing::warn!("Stored statistics are inconsistent; starting from zero");
            stats = LearningStats::default();
        }

        tracing::info!(
            "Loaded learner state: mode={}, kana_type={}, {} attempts recorded",
            settings.learning_mode.label(),
            settings.default_kana_type.label(),
            stats.total_attempts
        );

        Self {
            state: Arc::new(RwLock::new(LearnerState { settings, stats })),
            settings_slot,
            stats_slot,
        }
    }

    /// Get a read-only snapshot of the current state
    pub fn snapshot(&self) -> LearnerState {
        self.read(LearnerState::clone)
    }

    pub fn settings(&self) -> GlobalSettings {
        self.read(|state| state.settings.clone())
    }

    pub fn stats(&self) -> LearningStats {
        self.read(|state| state.stats.clone())
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let accuracy = state_manager.read(|state| state.stats.accuracy_percent());
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&LearnerState) -> R,
    {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    /// Update the state, persist what changed, and report the changes
    ///
    /// This is the primary way to modify state. It:
    /// 1. Captures the old state
    /// 2. Applies the update function
    /// 3. Detects what changed
    /// 4. Saves the changed blobs before releasing the lock
    ///
    /// # Arguments
    /// * `update_fn` - A function that mutates the state
    ///
    /// # Returns
    /// The detected changes
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut LearnerState),
    {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let old_state = state.clone();

        update_fn(&mut state);

        if old_state.settings != state.settings {
            self.settings_slot.save_or_warn(&state.settings);
        }
        if old_state.stats != state.stats {
            self.stats_slot.save_or_warn(&state.stats);
        }

        Self::detect_changes(&old_state, &state)
    }

    /// Detect what changed between two states
    fn detect_changes(old: &LearnerState, new: &LearnerState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if old.settings != new.settings {
            changes.push(StateChange::SettingsChanged);
        }
        if old.settings.learning_mode != new.settings.learning_mode {
            changes.push(StateChange::LearningModeChanged {
                mode: new.settings.learning_mode,
            });
        }
        if old.settings.default_kana_type != new.settings.default_kana_type {
            changes.push(StateChange::KanaTypeChanged {
                kana_type: new.settings.default_kana_type,
            });
        }

        if new.stats.total_sessions > old.stats.total_sessions {
            changes.push(StateChange::SessionStarted {
                total_sessions: new.stats.total_sessions,
            });
        }

        changes
    }

    // Convenience methods for common state updates

    /// Apply a partial settings update
    pub fn update_settings(&self, patch: &SettingsPatch) -> Vec<StateChange> {
        self.update(|state| state.settings.apply(patch))
    }

    /// Switch flashcard navigation between sequential and random
    pub fn toggle_learning_mode(&self) -> Vec<StateChange> {
        self.update(|state| {
            state.settings.learning_mode = state.settings.learning_mode.toggled();
        })
    }

    /// Cycle the default script: hiragana, katakana, mixed
    pub fn cycle_kana_type(&self) -> Vec<StateChange> {
        self.update(|state| {
            state.settings.default_kana_type = state.settings.default_kana_type.cycle();
        })
    }

    /// Record one answer, stamped with the current time
    pub fn record_attempt(&self, kana_id: &str, correct: bool) -> Vec<StateChange> {
        self.record_attempt_at(kana_id, correct, Utc::now())
    }

    pub fn record_attempt_at(
        &self,
        kana_id: &str,
        correct: bool,
        now: DateTime<Utc>,
    ) -> Vec<StateChange> {
        let mut accuracy = 0;
        let mut changes = self.update(|state| {
            state.stats.record_attempt(kana_id, correct, now);
            accuracy = state.stats.accuracy_percent();
        });

        tracing::trace!("Recorded {} for {}", if correct { "hit" } else { "miss" }, kana_id);
        changes.push(StateChange::AttemptRecorded {
            kana_id: kana_id.to_string(),
            correct,
            accuracy,
        });
        changes
    }

    /// Count a new learning session
    pub fn begin_session(&self) -> Vec<StateChange> {
        self.update(|state| state.stats.total_sessions = state.stats.total_sessions.saturating_add(1))
    }

    /// Replace the statistics with a zeroed structure stamped with the current time
    pub fn reset_stats(&self) -> Vec<StateChange> {
        self.reset_stats_at(Utc::now())
    }

    pub fn reset_stats_at(&self, now: DateTime<Utc>) -> Vec<StateChange> {
        let mut changes = self.update(|state| {
            state.stats = LearningStats::reset_at(now);
        });

        tracing::info!("Learning statistics reset");
        changes.push(StateChange::StatsReset);
        changes
    }
}

// Make StateManager cloneable for sharing across screens
impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            settings_slot: self.settings_slot.clone(),
            stats_slot: self.stats_slot.clone(),
        }
    }
}

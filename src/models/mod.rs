//! Data models for kanalearn.
//!
//! This module contains the plain data structures shared by the engine:
//! - [`KanaItem`], [`KanaType`], [`Script`], [`KanaRow`]: catalogue entries and script selection
//! - [`GlobalSettings`] / [`SettingsPatch`]: learner preferences persisted under `settings`
//! - [`LearningStats`] / [`KanaRecord`]: answer history persisted under `stats`
//! - [`VocabularyItem`] / [`VocabularyDraft`] / [`Category`]: the personal notebook
//! - [`AppConfig`]: directories and collaborator settings loaded from `kanalearn.yaml`
//!
//! # Architecture Note
//!
//! The models are designed to be:
//! - **Serializable**: persisted structs derive `Serialize`/`Deserialize` with camelCase
//!   field names, the layout of every stored blob
//! - **Passive**: no I/O here; mutation that must be persisted goes through
//!   [`StateManager`](crate::state::StateManager)

pub mod config;
pub mod kana;
pub mod settings;
pub mod stats;
pub mod vocabulary;

pub use config::{AppConfig, LogFormat, QuizConfig, SpeechConfig};
pub use kana::{KanaItem, KanaRow, KanaType, Script};
pub use settings::{GlobalSettings, NavigationMode, SettingsPatch};
pub use stats::{KanaRecord, LearningStats, ResetAge, rounded_percent};
pub use vocabulary::{Category, VocabularyDraft, VocabularyItem};

// kanalearn - Kana flashcards, quizzes and typed-answer drills
//
// This is the library crate containing the learning engine and its persistence.
// The binary crate (main.rs) provides the terminal entry point.

pub mod catalogue;
pub mod config;
pub mod logging;
pub mod models;
pub mod services;
pub mod session;
pub mod state;
pub mod storage;
pub mod ui;

// Re-export commonly used types for convenience
pub use catalogue::{CatalogueLoad, Deck, load_catalogue};
pub use config::ConfigManager;
pub use models::{AppConfig, GlobalSettings, KanaItem, KanaType, LearningStats, VocabularyItem};
pub use state::{StateChange, StateManager};
pub use storage::{FileStore, KeyValueStore, MemoryStore};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

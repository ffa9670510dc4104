//! kanalearn - Kana flashcards, quizzes and typed-answer drills
//!
//! Main entry point for the terminal application.
//!
//! # Overview
//!
//! This binary crate wires the learning engine to stdin/stdout. It initializes:
//! - Configuration loading ([`ConfigManager`])
//! - Logging infrastructure (daily rotating files, text or JSON lines)
//! - Persistent storage ([`FileStore`]) and state management ([`StateManager`])
//! - The kana catalogue, the vocabulary notebook and the speech collaborator
//! - The console controller (reads commands, renders screens)
//!
//! Everything runs on a single-threaded tokio runtime. Stdin lines, quiz
//! auto-advance timers and speech notifications are all delivered to the
//! controller through one event channel.
//!
//! # Execution Flow
//!
//! 1. Resolve the config directory (`KANALEARN_HOME`, default `.kanalearn`)
//! 2. Load `kanalearn.yaml` with `KANALEARN_*` overrides
//! 3. Initialize logging → `<log_dir>/kanalearn.<date>`
//! 4. Open the key-value store in `<data_dir>` and load settings and statistics
//! 5. Load the catalogue (built-in deck unless `catalogue_path` is set)
//! 6. Run the console loop until `:quit` or end of input
//!
//! # Configuration Files
//!
//! Expected in the config directory:
//! - `kanalearn.yaml`: directories, catalogue override, speech command, quiz options
//! - `data/settings.json`, `data/stats.json`, `data/vocabulary.json`: learner data

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use kanalearn::logging::{LogTarget, init_logging};
use kanalearn::services::{
    CommandSpeechEngine, SilentSpeechEngine, SpeechController, SpeechEngine, VocabularyNotebook,
};
use kanalearn::ui::{self, ConsoleController};
use kanalearn::{APP_NAME, AppConfig, ConfigManager, FileStore, KeyValueStore, StateManager, VERSION};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Environment variable selecting the config directory
const HOME_ENV: &str = "KANALEARN_HOME";

const DEFAULT_HOME: &str = ".kanalearn";

/// Main entry point for the kanalearn terminal application
///
/// # Errors
///
/// This function can fail if:
/// - The config directory cannot be created or the YAML is invalid
/// - Logging initialization fails (disk space, permissions)
/// - The data directory cannot be created
/// - The terminal cannot be written to
fn main() -> Result<()> {
    let home = std::env::var(HOME_ENV).unwrap_or_else(|_| DEFAULT_HOME.to_string());
    let config_manager = ConfigManager::new(Utf8PathBuf::from(home))?;
    let config = config_manager.load_app_config()?;

    let log_dir = config_manager.resolve(&config.log_dir);
    let _guard = init_logging(&LogTarget {
        dir: &log_dir,
        file_prefix: APP_NAME,
        format: config.log_format,
        verbose: config.debug,
        echo_to_stderr: config.debug,
    })?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    let result = runtime.block_on(run(config_manager, config));

    // The stdin reader blocks in a worker thread; don't wait on it
    runtime.shutdown_background();

    tracing::info!("Application shutdown complete");

    result.inspect_err(|e| tracing::error!("Fatal error: {:#}", e))
}

/// Open storage and collaborators, then run the console until it quits
async fn run(config_manager: ConfigManager, config: AppConfig) -> Result<()> {
    let store: Arc<dyn KeyValueStore> =
        Arc::new(FileStore::new(config_manager.resolve(&config.data_dir))?);
    let state = StateManager::load(Arc::clone(&store));
    tracing::info!("State manager initialized");

    let catalogue_path = config
        .catalogue_path
        .as_deref()
        .map(|path| config_manager.resolve(path));
    let catalogue = kanalearn::load_catalogue(catalogue_path.as_deref());
    tracing::info!("Catalogue loaded with {} kana", catalogue.deck.len());

    let notebook = VocabularyNotebook::load(store);

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (speech_tx, speech_rx) = mpsc::unbounded_channel();
    let engine: Arc<dyn SpeechEngine> =
        match CommandSpeechEngine::from_config(&config.speech, speech_tx) {
            Some(engine) => Arc::new(engine),
            None => {
                tracing::info!("No speech command configured, pronunciation disabled");
                Arc::new(SilentSpeechEngine)
            }
        };
    ui::spawn_speech_forwarder(speech_rx, events_tx.clone());
    ui::spawn_line_reader(tokio::io::stdin(), events_tx.clone());

    let controller = ConsoleController::new(
        state,
        Arc::new(catalogue.deck),
        catalogue.alert,
        notebook,
        SpeechController::new(engine),
        config.quiz.auto_advance,
        events_tx,
        std::io::stdout(),
    );
    controller.run(events_rx).await
}

// Text-to-speech
//
// Speech is an external collaborator: the engine speaks one utterance at a time
// and reports completion or cancellation as a SpeechEvent on a channel. The
// controller owns the "one utterance in flight" rule and stops speech when it
// is dropped.

use crate::models::SpeechConfig;
use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::{mpsc, watch};

/// Identifies one `speak` call so stale completion events can be told apart
pub type UtteranceId = u64;

/// Notification delivered when an utterance ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    Finished(UtteranceId),
    Cancelled(UtteranceId),
}

impl SpeechEvent {
    pub fn utterance(&self) -> UtteranceId {
        match self {
            SpeechEvent::Finished(id) | SpeechEvent::Cancelled(id) => *id,
        }
    }
}

/// Errors that can occur when starting speech
#[derive(Error, Debug)]
pub enum SpeechError {
    #[error("Speech is not available")]
    Unavailable,

    #[error("Nothing to speak")]
    EmptyText,

    #[error("Failed to start speech process: {0}")]
    Spawn(#[from] std::io::Error),
}

/// A speech backend.
///
/// `speak` returns once the utterance has started; the end is reported through
/// the engine's event channel.
#[cfg_attr(test, mockall::automock)]
pub trait SpeechEngine: Send + Sync {
    fn speak(&self, utterance: UtteranceId, text: &str) -> Result<(), SpeechError>;

    /// Stop the current utterance, if any
    fn stop(&self);

    fn is_available(&self) -> bool;
}

/// Speaks by running an external TTS program per utterance.
///
/// The program receives the configured arguments followed by the text. The
/// child is killed when the utterance is stopped or the engine is dropped.
/// Must be used from within a tokio runtime.
pub struct CommandSpeechEngine {
    program: String,
    config: SpeechConfig,
    events: mpsc::UnboundedSender<SpeechEvent>,
    current: Mutex<Option<watch::Sender<bool>>>,
}

impl CommandSpeechEngine {
    /// Returns `None` when no speech command is configured
    pub fn from_config(
        config: &SpeechConfig,
        events: mpsc::UnboundedSender<SpeechEvent>,
    ) -> Option<Self> {
        let program = config.command.clone()?;
        Some(Self {
            program,
            config: config.clone(),
            events,
            current: Mutex::new(None),
        })
    }
}

impl SpeechEngine for CommandSpeechEngine {
    fn speak(&self, utterance: UtteranceId, text: &str) -> Result<(), SpeechError> {
        self.stop();

        let mut child = Command::new(&self.program)
            .args(self.config.command_args(text))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(cancel_tx);

        let events = self.events.clone();
        tracing::debug!("Speaking utterance {} via {}", utterance, self.program);

        tokio::spawn(async move {
            // Race the process against cancellation; a dropped sender also cancels
            let event = tokio::select! {
                status = child.wait() => {
                    match status {
                        Ok(status) if !status.success() => {
                            tracing::warn!("Speech process exited with {}", status);
                        }
                        Err(e) => tracing::warn!("Failed to wait for speech process: {}", e),
                        Ok(_) => {}
                    }
                    SpeechEvent::Finished(utterance)
                }
                _ = cancel_rx.changed() => {
                    if let Err(e) = child.kill().await {
                        tracing::debug!("Speech process already gone: {}", e);
                    }
                    SpeechEvent::Cancelled(utterance)
                }
            };
            let _ = events.send(event);
        });

        Ok(())
    }

    fn stop(&self) {
        let current = self.current.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(cancel_tx) = current {
            // Fails only when the utterance already finished
            let _ = cancel_tx.send(true);
        }
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Engine used when no TTS program is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSpeechEngine;

impl SpeechEngine for SilentSpeechEngine {
    fn speak(&self, _utterance: UtteranceId, _text: &str) -> Result<(), SpeechError> {
        Err(SpeechError::Unavailable)
    }

    fn stop(&self) {}

    fn is_available(&self) -> bool {
        false
    }
}

/// Keeps at most one utterance in flight.
///
/// Speaking always stops the previous utterance first. Dropping the controller
/// stops whatever is playing.
pub struct SpeechController {
    engine: Arc<dyn SpeechEngine>,
    next_id: UtteranceId,
    speaking: Option<UtteranceId>,
}

impl SpeechController {
    pub fn new(engine: Arc<dyn SpeechEngine>) -> Self {
        Self {
            engine,
            next_id: 1,
            speaking: None,
        }
    }

    pub fn speak(&mut self, text: &str) -> Result<UtteranceId, SpeechError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SpeechError::EmptyText);
        }

        self.engine.stop();
        self.speaking = None;

        let id = self.next_id;
        self.next_id += 1;
        self.engine.speak(id, text)?;
        self.speaking = Some(id);
        Ok(id)
    }

    pub fn stop(&mut self) {
        if self.speaking.take().is_some() {
            self.engine.stop();
        }
    }

    /// Apply an engine notification; returns false for events about an
    /// utterance that is no longer current
    pub fn on_event(&mut self, event: &SpeechEvent) -> bool {
        if self.speaking != Some(event.utterance()) {
            return false;
        }
        self.speaking = None;
        true
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking.is_some()
    }

    pub fn is_available(&self) -> bool {
        self.engine.is_available()
    }
}

impl Drop for SpeechController {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::Sequence;
    use std::time::Duration;
    use tokio::time::timeout;

    #[test]
    fn test_speak_stops_previous_utterance_first() {
        let mut engine = MockSpeechEngine::new();
        let mut seq = Sequence::new();
        engine.expect_stop().times(1).in_sequence(&mut seq).return_const(());
        engine
            .expect_speak()
            .withf(|id, text| *id == 1 && text.to_string() == "あ")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        engine.expect_stop().times(1).in_sequence(&mut seq).return_const(());
        engine
            .expect_speak()
            .withf(|id, _| *id == 2)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        // dropped while speaking
        engine.expect_stop().times(1).in_sequence(&mut seq).return_const(());

        let mut controller = SpeechController::new(Arc::new(engine));
        assert_eq!(controller.speak("あ").unwrap(), 1);
        assert_eq!(controller.speak("い").unwrap(), 2);
        assert!(controller.is_speaking());
    }

    #[test]
    fn test_stale_events_ignored() {
        let mut engine = MockSpeechEngine::new();
        engine.expect_stop().return_const(());
        engine.expect_speak().returning(|_, _| Ok(()));

        let mut controller = SpeechController::new(Arc::new(engine));
        let first = controller.speak("ka").unwrap();
        let second = controller.speak("ki").unwrap();

        assert!(!controller.on_event(&SpeechEvent::Cancelled(first)));
        assert!(controller.is_speaking());
        assert!(controller.on_event(&SpeechEvent::Finished(second)));
        assert!(!controller.is_speaking());
    }

    #[test]
    fn test_empty_text_rejected() {
        let engine = MockSpeechEngine::new();
        let mut controller = SpeechController::new(Arc::new(engine));
        assert!(matches!(controller.speak("  "), Err(SpeechError::EmptyText)));
    }

    #[test]
    fn test_silent_engine_unavailable() {
        let mut controller = SpeechController::new(Arc::new(SilentSpeechEngine));
        assert!(!controller.is_available());
        assert!(matches!(controller.speak("あ"), Err(SpeechError::Unavailable)));
        assert!(!controller.is_speaking());
    }

    #[test]
    fn test_command_engine_requires_command() {
        let (tx, _rx) = mpsc::unbounded_channel();
        assert!(CommandSpeechEngine::from_config(&SpeechConfig::default(), tx).is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_engine_reports_finish() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let config = SpeechConfig {
            command: Some("true".to_string()),
            ..Default::default()
        };
        let engine = CommandSpeechEngine::from_config(&config, tx).unwrap();

        engine.speak(7, "こんにちは").unwrap();

        let event = timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
        assert_eq!(event, Some(SpeechEvent::Finished(7)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_engine_stop_cancels() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let config = SpeechConfig {
            command: Some("sleep".to_string()),
            ..Default::default()
        };
        let engine = CommandSpeechEngine::from_config(&config, tx).unwrap();

        // runs `sleep 30`
        engine.speak(1, "30").unwrap();
        engine.stop();

        let event = timeout(Duration::from_secs(5), rx.recv()).await.unwrap();
        assert_eq!(event, Some(SpeechEvent::Cancelled(1)));
    }
}

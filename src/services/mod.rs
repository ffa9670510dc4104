//! Services module - collaborators around the learning sessions.
//!
//! These components do the side-effecting work the session state machines
//! leave to their caller. They have no dependency on the terminal shell and
//! can be driven directly from tests.
//!
//! # Components
//!
//! - [`VocabularyNotebook`]: the learner's word list with add, edit, delete,
//!   review tracking and search, persisted under the `vocabulary` key
//!
//! - [`SpeechController`]: one-utterance-at-a-time pronunciation playback over a
//!   [`SpeechEngine`]:
//!   - [`CommandSpeechEngine`] runs an external TTS program per utterance
//!   - [`SilentSpeechEngine`] is used when no program is configured
//!
//! - [`DeferredEvent`]: cancellable delayed event used for quiz auto-advance
//!
//! # Async Note
//!
//! Speech processes and timers run as tokio tasks and report back over mpsc
//! channels, so the shell can keep processing input while they are pending.
//! Both are cancelled when their owning handle is dropped.

pub mod speech;
pub mod timer;
pub mod vocabulary;

pub use speech::{
    CommandSpeechEngine, SilentSpeechEngine, SpeechController, SpeechEngine, SpeechError,
    SpeechEvent, UtteranceId,
};
pub use timer::DeferredEvent;
pub use vocabulary::{VocabularyError, VocabularyNotebook, parse_tags};

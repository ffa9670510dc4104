//! Learning-session state machines.
//!
//! Each screen owns one of these for as long as it is open. Transitions are
//! synchronous and take injected randomness; persistence and speech are left
//! to the caller, which inspects the returned outcome or polls the accessors
//! after each action.
//!
//! # Components
//!
//! - [`SessionState`]: flashcard cursor with sequential or random navigation
//! - [`QuizEngine`]: sampled multiple-choice quiz with auto-advance tokens
//! - [`InputLearnSession`]: typed-answer drill with a mistake-review loop
//! - [`WrongAnswerSet`]: ordered set of missed kana ids

pub mod flashcard;
pub mod input_learn;
pub mod quiz;
pub mod review;

pub use flashcard::{FlashcardEvent, SessionState};
pub use input_learn::{
    InputError, InputEvent, InputLearnSession, LearnPhase, LearningRecord, SubmitOutcome,
};
pub use quiz::{
    AnswerOutcome, AutoAdvance, DISTRACTOR_COUNT, QuizEngine, QuizError, QuizEvent, QuizPhase,
    QuizState, generate_options,
};
pub use review::WrongAnswerSet;

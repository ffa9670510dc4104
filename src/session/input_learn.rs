use crate::catalogue::Deck;
use crate::models::{KanaItem, KanaType, Script, rounded_percent};
use crate::session::review::WrongAnswerSet;
use indexmap::IndexMap;
use rand::Rng;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by input-learn transitions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Answer is empty")]
    EmptyAnswer,

    #[error("Not waiting for an answer")]
    NotAwaitingInput,

    #[error("No answer to move past")]
    NotAnswered,

    #[error("No mistakes to review")]
    NothingToReview,

    #[error("Finish the current pass before reviewing")]
    PassInProgress,

    #[error("No kana to practice")]
    NoItems,
}

/// Where the drill currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LearnPhase {
    #[default]
    Input,
    Correct,
    Incorrect,
    Completed,
}

/// Discrete inputs accepted by the input-learn screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Submit(String),
    Proceed,
    RevealAnswer,
    StartReview,
    Reset,
    SetKanaType(KanaType),
}

/// Per-kana history for the current drill
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LearningRecord {
    pub attempts: u32,
    /// Whether the most recent attempt was correct
    pub correct: bool,
    pub last_answer: String,
}

/// Result of a counted submission, for the caller to forward to statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub kana_id: String,
    pub correct: bool,
    /// Set when this answer emptied the review set
    pub review_finished: bool,
}

/// Typed-answer drill over a deck with a mistake-review loop.
///
/// The main pass walks the deck in order. Missed kana are collected in a
/// [`WrongAnswerSet`]; once the pass is complete [`start_review`] walks only
/// that set, removing entries as they are answered correctly, until it is
/// empty.
///
/// [`start_review`]: InputLearnSession::start_review
#[derive(Debug, Clone)]
pub struct InputLearnSession {
    deck: Arc<Deck>,
    kana_type: KanaType,
    script: Script,
    current_index: usize,
    phase: LearnPhase,
    records: IndexMap<String, LearningRecord>,
    wrong_answers: WrongAnswerSet,
    review: bool,
    /// The next review entry already sits at `current_index` after a removal
    slot_refilled: bool,
    score: usize,
    total_attempts: usize,
}

impl InputLearnSession {
    pub fn new<R: Rng + ?Sized>(deck: Arc<Deck>, kana_type: KanaType, rng: &mut R) -> Self {
        let phase = if deck.is_empty() {
            LearnPhase::Completed
        } else {
            LearnPhase::Input
        };
        Self {
            deck,
            kana_type,
            script: kana_type.pick_script(rng),
            current_index: 0,
            phase,
            records: IndexMap::new(),
            wrong_answers: WrongAnswerSet::new(),
            review: false,
            slot_refilled: false,
            score: 0,
            total_attempts: 0,
        }
    }

    /// Apply one input event.
    ///
    /// Returns the submission outcome for `Submit`, and the revealed answer
    /// through [`reveal_answer`](Self::reveal_answer) otherwise.
    pub fn apply<R: Rng + ?Sized>(
        &mut self,
        event: InputEvent,
        rng: &mut R,
    ) -> Result<Option<SubmitOutcome>, InputError> {
        match event {
            InputEvent::Submit(answer) => self.submit(&answer).map(Some),
            InputEvent::Proceed => self.proceed(rng).map(|_| None),
            InputEvent::RevealAnswer => {
                self.reveal_answer(rng);
                Ok(None)
            }
            InputEvent::StartReview => self.start_review(rng).map(|_| None),
            InputEvent::Reset => {
                self.reset(rng);
                Ok(None)
            }
            InputEvent::SetKanaType(kana_type) => {
                self.set_kana_type(kana_type, rng);
                Ok(None)
            }
        }
    }

    /// Check a typed answer against the current kana.
    ///
    /// The comparison trims surrounding whitespace and ignores case. Blank
    /// input is rejected without counting an attempt.
    pub fn submit(&mut self, input: &str) -> Result<SubmitOutcome, InputError> {
        if self.phase != LearnPhase::Input {
            return Err(InputError::NotAwaitingInput);
        }
        let answer = input.trim().to_lowercase();
        if answer.is_empty() {
            return Err(InputError::EmptyAnswer);
        }
        let item = self.current_item().ok_or(InputError::NoItems)?;
        let correct = item.matches_answer(&answer);
        let kana_id = item.id.clone();

        let record = self.records.entry(kana_id.clone()).or_default();
        record.attempts += 1;
        record.correct = correct;
        record.last_answer = answer;
        self.total_attempts += 1;

        let mut review_finished = false;
        if correct {
            self.score += 1;
            if self.review {
                self.wrong_answers.remove_at(self.current_index);
                if self.wrong_answers.is_empty() {
                    tracing::debug!("Review finished");
                    self.review = false;
                    self.current_index = 0;
                    self.phase = LearnPhase::Completed;
                    review_finished = true;
                } else {
                    if self.current_index >= self.wrong_answers.len() {
                        self.current_index = 0;
                    }
                    self.slot_refilled = true;
                    self.phase = LearnPhase::Correct;
                }
            } else {
                self.phase = LearnPhase::Correct;
            }
        } else {
            if self.wrong_answers.insert(&kana_id) {
                tracing::trace!("Added {} to review", kana_id);
            }
            self.phase = LearnPhase::Incorrect;
        }

        Ok(SubmitOutcome {
            kana_id,
            correct,
            review_finished,
        })
    }

    /// Continue after feedback: next kana after a correct answer, retry after
    /// an incorrect one
    pub fn proceed<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), InputError> {
        match self.phase {
            LearnPhase::Correct => {
                self.move_to_next(rng);
                Ok(())
            }
            LearnPhase::Incorrect => {
                self.phase = LearnPhase::Input;
                Ok(())
            }
            LearnPhase::Input | LearnPhase::Completed => Err(InputError::NotAnswered),
        }
    }

    /// Advance to the next kana, or complete the pass.
    ///
    /// A review pass wraps around until the set is empty.
    pub fn move_to_next<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.phase == LearnPhase::Completed {
            return;
        }

        if self.review && std::mem::take(&mut self.slot_refilled) {
            self.phase = LearnPhase::Input;
        } else {
            let total = if self.review {
                self.wrong_answers.len()
            } else {
                self.deck.len()
            };
            if self.current_index + 1 < total {
                self.current_index += 1;
                self.phase = LearnPhase::Input;
            } else if self.review && !self.wrong_answers.is_empty() {
                self.current_index = 0;
                self.phase = LearnPhase::Input;
            } else {
                self.phase = LearnPhase::Completed;
                tracing::debug!(
                    "Input pass completed: {}/{} correct, {} to review",
                    self.score,
                    self.total_attempts,
                    self.wrong_answers.len()
                );
            }
        }
        self.script = self.kana_type.pick_script(rng);
    }

    /// Give up on the current kana: returns its answer and moves on without
    /// counting an attempt
    pub fn reveal_answer<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<String> {
        if self.phase == LearnPhase::Completed {
            return None;
        }
        let answer = self.current_item()?.romaji.clone();
        self.move_to_next(rng);
        Some(answer)
    }

    /// Enter the review sub-session over the collected mistakes
    ///
    /// Only allowed once the current pass has completed.
    pub fn start_review<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), InputError> {
        if self.phase != LearnPhase::Completed {
            return Err(InputError::PassInProgress);
        }
        if self.wrong_answers.is_empty() {
            return Err(InputError::NothingToReview);
        }
        self.review = true;
        self.current_index = 0;
        self.slot_refilled = false;
        self.phase = LearnPhase::Input;
        self.script = self.kana_type.pick_script(rng);
        tracing::debug!("Reviewing {} mistakes", self.wrong_answers.len());
        Ok(())
    }

    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        *self = Self::new(Arc::clone(&self.deck), self.kana_type, rng);
    }

    pub fn set_kana_type<R: Rng + ?Sized>(&mut self, kana_type: KanaType, rng: &mut R) {
        self.kana_type = kana_type;
        self.script = kana_type.pick_script(rng);
    }

    pub fn current_item(&self) -> Option<&KanaItem> {
        if self.review {
            let id = self.wrong_answers.get(self.current_index)?;
            self.deck.find(id)
        } else {
            self.deck.get(self.current_index)
        }
    }

    pub fn current_glyph(&self) -> Option<&str> {
        self.current_item().map(|item| item.glyph(self.script))
    }

    pub fn phase(&self) -> LearnPhase {
        self.phase
    }

    pub fn kana_type(&self) -> KanaType {
        self.kana_type
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn is_review(&self) -> bool {
        self.review
    }

    pub fn wrong_answers(&self) -> &WrongAnswerSet {
        &self.wrong_answers
    }

    pub fn record(&self, kana_id: &str) -> Option<&LearningRecord> {
        self.records.get(kana_id)
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn total_attempts(&self) -> usize {
        self.total_attempts
    }

    pub fn deck_len(&self) -> usize {
        self.deck.len()
    }

    /// Kana whose most recent attempt was correct
    pub fn learned_count(&self) -> usize {
        self.records.values().filter(|record| record.correct).count()
    }

    pub fn progress_percent(&self) -> u32 {
        rounded_percent(self.learned_count(), self.deck.len())
    }

    pub fn accuracy_percent(&self) -> u32 {
        rounded_percent(self.score, self.total_attempts)
    }
}

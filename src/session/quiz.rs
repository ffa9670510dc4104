use crate::catalogue::Deck;
use crate::models::{KanaItem, KanaType, Script};
use indexmap::IndexSet;
use rand::Rng;
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Number of wrong answers offered next to the correct one
pub const DISTRACTOR_COUNT: usize = 3;

/// Errors returned by quiz transitions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuizError {
    #[error("No questions available for a quiz")]
    NoQuestions,

    #[error("The quiz is not waiting for an answer")]
    NotAwaitingAnswer,

    #[error("No answer has been given for the current question")]
    NotAnswered,
}

/// Lifecycle of a quiz run; `Result` is terminal until restarted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuizPhase {
    #[default]
    Idle,
    Question,
    Answer,
    Result,
}

/// Token handed to the caller when a correct answer should advance
/// automatically. The caller schedules a timer for `delay` and passes the token
/// back to [`QuizEngine::on_auto_advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoAdvance {
    /// Which quiz run issued the token; bumped by every start and restart
    pub run: u64,
    pub question: usize,
    pub delay: Duration,
}

/// What happened when an option was selected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub kana_id: String,
    pub correct: bool,
    pub correct_answer: String,
    pub auto_advance: Option<AutoAdvance>,
}

/// Snapshot of a quiz run, read by the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizState {
    pub quiz_type: KanaType,
    pub questions: Vec<KanaItem>,
    pub current_question: usize,
    pub score: usize,
    pub options: Vec<String>,
    pub selected_option: Option<String>,
    pub outcome: Option<bool>,
    pub phase: QuizPhase,
    pub script: Option<Script>,
}

impl QuizState {
    pub fn current(&self) -> Option<&KanaItem> {
        self.questions.get(self.current_question)
    }

    pub fn current_glyph(&self) -> Option<&str> {
        let script = self.script?;
        self.current().map(|item| item.glyph(script))
    }
}

/// Discrete inputs accepted by the quiz screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizEvent {
    Start { quiz_type: KanaType, count: usize },
    Select(String),
    Next,
    AutoAdvance(AutoAdvance),
    Restart,
}

/// Multiple-choice quiz over a deck
#[derive(Debug, Clone)]
pub struct QuizEngine {
    deck: Arc<Deck>,
    state: QuizState,
    auto_advance_delay: Option<Duration>,
    run: u64,
}

/// Build the shuffled option list for `question`: the correct answer plus up to
/// [`DISTRACTOR_COUNT`] distinct wrong answers drawn from `deck`.
///
/// When the deck has too few distinct answers, fewer distractors are returned.
pub fn generate_options<R: Rng + ?Sized>(deck: &Deck, question: &KanaItem, rng: &mut R) -> Vec<String> {
    let correct = question.romaji.as_str();
    let mut distractors: Vec<&str> = deck
        .items()
        .iter()
        .map(|item| item.romaji.as_str())
        .filter(|answer| *answer != correct)
        .collect::<IndexSet<&str>>()
        .into_iter()
        .collect();

    distractors.shuffle(rng);
    distractors.truncate(DISTRACTOR_COUNT);

    let mut options: Vec<String> = Vec::with_capacity(distractors.len() + 1);
    options.push(correct.to_string());
    options.extend(distractors.into_iter().map(str::to_string));
    options.shuffle(rng);
    options
}

impl QuizEngine {
    /// Create an idle quiz. `auto_advance_delay` of `None` disables auto-advance.
    pub fn new(deck: Arc<Deck>, auto_advance_delay: Option<Duration>) -> Self {
        Self {
            deck,
            state: QuizState::default(),
            auto_advance_delay,
            run: 0,
        }
    }

    pub fn state(&self) -> &QuizState {
        &self.state
    }

    pub fn phase(&self) -> QuizPhase {
        self.state.phase
    }

    pub fn set_auto_advance_delay(&mut self, delay: Option<Duration>) {
        self.auto_advance_delay = delay;
    }

    /// Apply one input event. Only `Select` produces an outcome.
    pub fn apply<R: Rng + ?Sized>(
        &mut self,
        event: QuizEvent,
        rng: &mut R,
    ) -> Result<Option<AnswerOutcome>, QuizError> {
        match event {
            QuizEvent::Start { quiz_type, count } => self.start_quiz(quiz_type, count, rng).map(|_| None),
            QuizEvent::Select(option) => self.select_answer(&option).map(Some),
            QuizEvent::Next => self.next_question(rng).map(|_| None),
            QuizEvent::AutoAdvance(token) => {
                self.on_auto_advance(token, rng);
                Ok(None)
            }
            QuizEvent::Restart => {
                self.restart();
                Ok(None)
            }
        }
    }

    /// Start a run of `min(count, deck size)` questions sampled without replacement.
    ///
    /// Fails with [`QuizError::NoQuestions`] and leaves the state untouched when
    /// that number is zero.
    pub fn start_quiz<R: Rng + ?Sized>(
        &mut self,
        quiz_type: KanaType,
        count: usize,
        rng: &mut R,
    ) -> Result<(), QuizError> {
        let count = count.min(self.deck.len());
        if count == 0 {
            return Err(QuizError::NoQuestions);
        }

        let mut questions = self.deck.items().to_vec();
        questions.shuffle(rng);
        questions.truncate(count);

        self.state = QuizState {
            quiz_type,
            questions,
            phase: QuizPhase::Question,
            ..Default::default()
        };
        self.run += 1;
        self.prepare_question(rng);

        tracing::debug!("Quiz started: {} {} questions", quiz_type.label(), count);
        Ok(())
    }

    /// Select an option for the current question.
    ///
    /// Only valid while a question is open. A correct answer carries an
    /// [`AutoAdvance`] token when auto-advance is enabled.
    pub fn select_answer(&mut self, option: &str) -> Result<AnswerOutcome, QuizError> {
        if self.state.phase != QuizPhase::Question {
            return Err(QuizError::NotAwaitingAnswer);
        }
        let question = self.state.current().ok_or(QuizError::NoQuestions)?;
        let correct = option == question.romaji;
        let kana_id = question.id.clone();
        let correct_answer = question.romaji.clone();

        self.state.selected_option = Some(option.to_string());
        self.state.outcome = Some(correct);
        if correct {
            self.state.score += 1;
        }
        self.state.phase = QuizPhase::Answer;

        let auto_advance = match (correct, self.auto_advance_delay) {
            (true, Some(delay)) => Some(AutoAdvance {
                run: self.run,
                question: self.state.current_question,
                delay,
            }),
            _ => None,
        };

        Ok(AnswerOutcome {
            kana_id,
            correct,
            correct_answer,
            auto_advance,
        })
    }

    /// Move past an answered question, or to the result after the last one
    pub fn next_question<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), QuizError> {
        if self.state.phase != QuizPhase::Answer {
            return Err(QuizError::NotAnswered);
        }

        if self.state.current_question + 1 < self.state.questions.len() {
            self.state.current_question += 1;
            self.state.phase = QuizPhase::Question;
            self.prepare_question(rng);
        } else {
            self.state.phase = QuizPhase::Result;
            tracing::debug!(
                "Quiz finished: {}/{}",
                self.state.score,
                self.state.questions.len()
            );
        }
        Ok(())
    }

    /// Handle an expired auto-advance timer.
    ///
    /// Returns false and changes nothing when the token is stale, i.e. the
    /// user already moved on or the run was restarted since it was issued.
    pub fn on_auto_advance<R: Rng + ?Sized>(&mut self, token: AutoAdvance, rng: &mut R) -> bool {
        if token.run != self.run
            || self.state.phase != QuizPhase::Answer
            || self.state.current_question != token.question
        {
            tracing::trace!("Ignoring stale auto-advance for question {}", token.question);
            return false;
        }
        self.next_question(rng).is_ok()
    }

    pub fn restart(&mut self) {
        self.state = QuizState::default();
        self.run += 1;
    }

    pub fn score_percent(&self) -> u32 {
        crate::models::rounded_percent(self.state.score, self.state.questions.len())
    }

    fn prepare_question<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let Some(question) = self.state.current() else {
            return;
        };
        let options = generate_options(&self.deck, question, rng);
        self.state.options = options;
        self.state.selected_option = None;
        self.state.outcome = None;
        self.state.script = Some(self.state.quiz_type.pick_script(rng));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn builtin() -> Arc<Deck> {
        Arc::new(Deck::builtin().unwrap())
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(99)
    }

    #[test]
    fn test_start_samples_without_replacement() {
        let mut rng = rng();
        let mut quiz = QuizEngine::new(builtin(), None);
        quiz.start_quiz(KanaType::Hiragana, 10, &mut rng).unwrap();

        let state = quiz.state();
        assert_eq!(state.phase, QuizPhase::Question);
        assert_eq!(state.questions.len(), 10);
        let ids: HashSet<_> = state.questions.iter().map(|q| &q.id).collect();
        assert_eq!(ids.len(), 10);
        assert_eq!(state.options.len(), 4);
    }

    #[test]
    fn test_count_clamped_to_deck() {
        let mut rng = rng();
        let mut quiz = QuizEngine::new(builtin(), None);
        quiz.start_quiz(KanaType::Mixed, 500, &mut rng).unwrap();
        assert_eq!(quiz.state().questions.len(), 46);
    }

    #[test]
    fn test_empty_deck_has_no_questions() {
        let mut rng = rng();
        let mut quiz = QuizEngine::new(Arc::new(Deck::empty()), None);
        assert_eq!(quiz.start_quiz(KanaType::Mixed, 10, &mut rng), Err(QuizError::NoQuestions));
        assert_eq!(quiz.phase(), QuizPhase::Idle);
    }

    #[test]
    fn test_select_only_in_question_phase() {
        let mut rng = rng();
        let mut quiz = QuizEngine::new(builtin(), None);
        assert_eq!(quiz.select_answer("a"), Err(QuizError::NotAwaitingAnswer));

        quiz.start_quiz(KanaType::Hiragana, 3, &mut rng).unwrap();
        let answer = quiz.state().current().unwrap().romaji.clone();
        quiz.select_answer(&answer).unwrap();
        assert_eq!(quiz.select_answer(&answer), Err(QuizError::NotAwaitingAnswer));
        assert_eq!(quiz.state().score, 1);
    }

    #[test]
    fn test_full_run_reaches_result() {
        let mut rng = rng();
        let mut quiz = QuizEngine::new(builtin(), None);
        quiz.start_quiz(KanaType::Katakana, 3, &mut rng).unwrap();

        for i in 0..3 {
            let state = quiz.state();
            let wrong = state
                .options
                .iter()
                .find(|o| **o != state.current().unwrap().romaji)
                .unwrap()
                .clone();
            let pick = if i == 1 { wrong } else { state.current().unwrap().romaji.clone() };
            quiz.select_answer(&pick).unwrap();
            quiz.next_question(&mut rng).unwrap();
        }

        assert_eq!(quiz.phase(), QuizPhase::Result);
        assert_eq!(quiz.state().score, 2);
        assert_eq!(quiz.score_percent(), 67);
        assert_eq!(quiz.next_question(&mut rng), Err(QuizError::NotAnswered));
    }

    #[test]
    fn test_auto_advance_token_only_for_correct_answers() {
        let mut rng = rng();
        let delay = Duration::from_millis(1000);
        let mut quiz = QuizEngine::new(builtin(), Some(delay));
        quiz.start_quiz(KanaType::Hiragana, 5, &mut rng).unwrap();

        let answer = quiz.state().current().unwrap().romaji.clone();
        let outcome = quiz.select_answer(&answer).unwrap();
        assert_eq!(
            outcome.auto_advance,
            Some(AutoAdvance {
                run: 1,
                question: 0,
                delay
            })
        );

        assert!(quiz.on_auto_advance(outcome.auto_advance.unwrap(), &mut rng));
        assert_eq!(quiz.state().current_question, 1);

        let wrong = quiz
            .state()
            .options
            .iter()
            .find(|o| **o != quiz.state().current().unwrap().romaji)
            .unwrap()
            .clone();
        let outcome = quiz.select_answer(&wrong).unwrap();
        assert!(!outcome.correct);
        assert!(outcome.auto_advance.is_none());
    }

    #[test]
    fn test_stale_auto_advance_ignored() {
        let mut rng = rng();
        let mut quiz = QuizEngine::new(builtin(), Some(Duration::from_millis(10)));
        quiz.start_quiz(KanaType::Hiragana, 5, &mut rng).unwrap();

        let answer = quiz.state().current().unwrap().romaji.clone();
        let token = quiz.select_answer(&answer).unwrap().auto_advance.unwrap();

        // user pressed next before the timer fired
        quiz.next_question(&mut rng).unwrap();
        assert!(!quiz.on_auto_advance(token, &mut rng));
        assert_eq!(quiz.state().current_question, 1);
        assert_eq!(quiz.phase(), QuizPhase::Question);

        quiz.restart();
        assert!(!quiz.on_auto_advance(token, &mut rng));
        assert_eq!(quiz.phase(), QuizPhase::Idle);
    }

    #[test]
    fn test_auto_advance_from_previous_run_ignored() {
        let mut rng = rng();
        let mut quiz = QuizEngine::new(builtin(), Some(Duration::from_millis(10)));
        quiz.start_quiz(KanaType::Hiragana, 5, &mut rng).unwrap();

        let answer = quiz.state().current().unwrap().romaji.clone();
        let stale = quiz.select_answer(&answer).unwrap().auto_advance.unwrap();

        // New run, same question index and phase as when the token was issued
        quiz.start_quiz(KanaType::Hiragana, 5, &mut rng).unwrap();
        let answer = quiz.state().current().unwrap().romaji.clone();
        let fresh = quiz.select_answer(&answer).unwrap().auto_advance.unwrap();
        assert_eq!(stale.question, fresh.question);
        assert_ne!(stale.run, fresh.run);

        assert!(!quiz.on_auto_advance(stale, &mut rng));
        assert_eq!(quiz.phase(), QuizPhase::Answer);
        assert_eq!(quiz.state().current_question, 0);

        assert!(quiz.on_auto_advance(fresh, &mut rng));
        assert_eq!(quiz.state().current_question, 1);
    }

    #[test]
    fn test_options_clamped_on_small_deck() {
        let mut rng = rng();
        let deck = Deck::new(vec![
            KanaItem::new("a", "あ", "ア", "a"),
            KanaItem::new("i", "い", "イ", "i"),
            KanaItem::new("i2", "ゐ", "ヰ", "i"),
        ])
        .unwrap();
        let options = generate_options(&deck, deck.get(0).unwrap(), &mut rng);
        assert_eq!(options.len(), 2);
        assert!(options.contains(&"a".to_string()));
        assert!(options.contains(&"i".to_string()));
    }

    #[test]
    fn test_single_item_deck_offers_only_correct_answer() {
        let mut rng = rng();
        let deck = Deck::new(vec![KanaItem::new("a", "あ", "ア", "a")]).unwrap();
        assert_eq!(generate_options(&deck, deck.get(0).unwrap(), &mut rng), vec!["a"]);
    }

    proptest! {
        #[test]
        fn prop_four_distinct_options_with_correct(seed in any::<u64>(), index in 0usize..46) {
            let deck = Deck::builtin().unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            let question = deck.get(index).unwrap();
            let options = generate_options(&deck, question, &mut rng);

            prop_assert_eq!(options.len(), 4);
            let distinct: HashSet<&String> = options.iter().collect();
            prop_assert_eq!(distinct.len(), 4);
            prop_assert!(options.contains(&question.romaji));
        }

        #[test]
        fn prop_score_bounded(seed in any::<u64>(), count in 1usize..20, picks in proptest::collection::vec(any::<bool>(), 20)) {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut quiz = QuizEngine::new(Arc::new(Deck::builtin().unwrap()), None);
            quiz.start_quiz(KanaType::Mixed, count, &mut rng).unwrap();

            let mut step = 0;
            while quiz.phase() == QuizPhase::Question {
                let state = quiz.state();
                let right = state.current().unwrap().romaji.clone();
                let choice = if picks[step % picks.len()] {
                    right
                } else {
                    state.options.iter().find(|o| **o != right).unwrap().clone()
                };
                quiz.select_answer(&choice).unwrap();
                prop_assert!(quiz.state().score <= quiz.state().questions.len());
                quiz.next_question(&mut rng).unwrap();
                step += 1;
            }
            prop_assert_eq!(quiz.phase(), QuizPhase::Result);
            prop_assert!(quiz.state().score <= count);
        }
    }
}

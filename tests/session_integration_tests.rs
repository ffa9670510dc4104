//! Integration tests for the learning sessions over real catalogues
//!
//! These tests verify:
//! - Flashcard navigation across the built-in deck
//! - A complete quiz run feeding the statistics
//! - The input-learn main pass followed by a mistake review
//! - Behaviour over an empty catalogue

use kanalearn::models::{KanaType, NavigationMode, Script};
use kanalearn::session::{
    FlashcardEvent, InputError, InputLearnSession, LearnPhase, QuizEngine, QuizError, QuizEvent,
    QuizPhase, SessionState,
};
use kanalearn::{Deck, KanaItem, MemoryStore, StateManager, load_catalogue};
use camino::Utf8Path;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

fn builtin() -> Arc<Deck> {
    Arc::new(Deck::builtin().unwrap())
}

fn three_kana() -> Arc<Deck> {
    Arc::new(
        Deck::new(vec![
            KanaItem::new("a", "あ", "ア", "a"),
            KanaItem::new("i", "い", "イ", "i"),
            KanaItem::new("u", "う", "ウ", "u"),
        ])
        .unwrap(),
    )
}

#[test]
fn test_sequential_pass_over_builtin_deck() {
    let mut rng = StdRng::seed_from_u64(1);
    let deck = builtin();
    let mut session =
        SessionState::new(Arc::clone(&deck), NavigationMode::Sequential, KanaType::Hiragana, &mut rng);

    let mut seen = Vec::new();
    for _ in 0..deck.len() {
        session.apply(FlashcardEvent::Reveal, &mut rng);
        seen.push(session.current_glyph().unwrap().to_string());
        session.apply(FlashcardEvent::Next, &mut rng);
    }

    assert_eq!(session.current_index(), 0);
    assert_eq!(session.learned_count(), 46);
    assert_eq!(session.progress_percent(), 100);
    assert_eq!(seen.first().map(String::as_str), Some("あ"));
    assert_eq!(seen.last().map(String::as_str), Some("ん"));

    // Revisiting pushes the count past the deck size; progress stays clamped
    session.apply(FlashcardEvent::Reveal, &mut rng);
    assert_eq!(session.learned_count(), 47);
    assert_eq!(session.progress_percent(), 100);
}

#[test]
fn test_random_navigation_never_repeats() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut session =
        SessionState::new(builtin(), NavigationMode::Sequential, KanaType::Mixed, &mut rng);
    session.apply(FlashcardEvent::SetMode(NavigationMode::Random), &mut rng);

    let mut visited = HashSet::new();
    for _ in 0..500 {
        let before = session.current_index();
        session.apply(FlashcardEvent::Next, &mut rng);
        assert_ne!(session.current_index(), before);
        visited.insert(session.current_index());
    }
    assert!(visited.len() > 40);

    // Previous stays sequential even in random mode
    let index = session.current_index();
    session.apply(FlashcardEvent::Previous, &mut rng);
    assert_eq!(session.current_index(), index.saturating_sub(1));
}

#[test]
fn test_mixed_script_stable_until_card_changes() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut session =
        SessionState::new(builtin(), NavigationMode::Sequential, KanaType::Mixed, &mut rng);

    for _ in 0..20 {
        let script = session.script();
        let glyph = session.current_glyph().unwrap().to_string();
        session.apply(FlashcardEvent::Reveal, &mut rng);
        assert_eq!(session.script(), script);
        assert_eq!(session.current_glyph().unwrap(), glyph);
        session.apply(FlashcardEvent::Next, &mut rng);
    }

    session.apply(FlashcardEvent::SetKanaType(KanaType::Katakana), &mut rng);
    assert_eq!(session.script(), Script::Katakana);
}

#[test]
fn test_full_quiz_run_records_stats() {
    let mut rng = StdRng::seed_from_u64(4);
    let state = StateManager::load(Arc::new(MemoryStore::new()));
    let mut engine = QuizEngine::new(builtin(), Some(Duration::from_millis(1000)));

    engine
        .apply(
            QuizEvent::Start {
                quiz_type: KanaType::Hiragana,
                count: 5,
            },
            &mut rng,
        )
        .unwrap();
    state.begin_session();

    let mut asked = HashSet::new();
    for round in 0..5 {
        let question = engine.state().current().unwrap().clone();
        assert!(asked.insert(question.id.clone()), "question repeated");

        let options = engine.state().options.clone();
        let distinct: HashSet<_> = options.iter().collect();
        assert_eq!(options.len(), 4);
        assert_eq!(distinct.len(), 4);
        assert!(options.contains(&question.romaji));

        // Miss the second question on purpose
        let choice = if round == 1 {
            options.iter().find(|o| **o != question.romaji).unwrap().clone()
        } else {
            question.romaji.clone()
        };
        let outcome = engine.select_answer(&choice).unwrap();
        state.record_attempt(&outcome.kana_id, outcome.correct);

        match outcome.auto_advance {
            Some(token) => assert!(engine.on_auto_advance(token, &mut rng)),
            None => engine.next_question(&mut rng).unwrap(),
        }
    }

    assert_eq!(engine.phase(), QuizPhase::Result);
    assert_eq!(engine.state().score, 4);
    assert_eq!(engine.score_percent(), 80);

    let stats = state.stats();
    assert_eq!(stats.total_sessions, 1);
    assert_eq!(stats.total_attempts, 5);
    assert_eq!(stats.accuracy_percent(), 80);

    engine.apply(QuizEvent::Restart, &mut rng).unwrap();
    assert_eq!(engine.phase(), QuizPhase::Idle);
}

#[test]
fn test_quiz_on_tiny_deck_clamps() {
    let mut rng = StdRng::seed_from_u64(5);
    let deck = Arc::new(
        Deck::new(vec![
            KanaItem::new("a", "あ", "ア", "a"),
            KanaItem::new("ka", "か", "カ", "ka"),
        ])
        .unwrap(),
    );
    let mut engine = QuizEngine::new(deck, None);

    assert_ok!(engine.start_quiz(KanaType::Katakana, 10, &mut rng));

    assert_eq!(engine.state().questions.len(), 2);
    assert_eq!(engine.state().options.len(), 2);
    assert_eq!(engine.state().script, Some(Script::Katakana));
}

#[test]
fn test_input_pass_then_review() {
    let mut rng = StdRng::seed_from_u64(6);
    let state = StateManager::load(Arc::new(MemoryStore::new()));
    let mut session = InputLearnSession::new(three_kana(), KanaType::Hiragana, &mut rng);

    // Miss あ and い, giving up on each, then get う right
    for glyph in ["あ", "い"] {
        assert_eq!(session.current_glyph(), Some(glyph));
        let outcome = session.submit("x").unwrap();
        state.record_attempt(&outcome.kana_id, outcome.correct);
        assert_eq!(session.phase(), LearnPhase::Incorrect);
        session.reveal_answer(&mut rng).unwrap();
    }
    let outcome = session.submit(" U ").unwrap();
    state.record_attempt(&outcome.kana_id, outcome.correct);
    session.proceed(&mut rng).unwrap();

    assert_eq!(session.phase(), LearnPhase::Completed);
    let pending: Vec<_> = session.wrong_answers().iter().collect();
    assert_eq!(pending, vec!["a", "i"]);
    assert_eq!(session.accuracy_percent(), 33);

    assert_ok!(session.start_review(&mut rng));
    assert_eq!(session.current_item().unwrap().id, "a");
    session.submit("a").unwrap();
    session.proceed(&mut rng).unwrap();

    // い slid into the freed slot and is asked next
    assert_eq!(session.current_item().unwrap().id, "i");
    let outcome = session.submit("i").unwrap();
    assert!(outcome.review_finished);
    assert_eq!(session.phase(), LearnPhase::Completed);
    assert!(!session.is_review());
    assert_eq!(session.progress_percent(), 100);

    assert_eq!(session.start_review(&mut rng), Err(InputError::NothingToReview));
    assert_eq!(state.stats().total_attempts, 3);
    assert_eq!(state.stats().accuracy_percent(), 33);
}

#[test]
fn test_empty_catalogue_everywhere() {
    let mut rng = StdRng::seed_from_u64(7);
    let load = load_catalogue(Some(Utf8Path::new("/nonexistent/kana.json")));
    assert!(load.alert.is_some());
    let deck = Arc::new(load.deck);

    let mut flashcards =
        SessionState::new(Arc::clone(&deck), NavigationMode::Random, KanaType::Mixed, &mut rng);
    flashcards.apply(FlashcardEvent::Next, &mut rng);
    flashcards.apply(FlashcardEvent::Reveal, &mut rng);
    assert!(flashcards.current_item().is_none());
    assert_eq!(flashcards.progress_percent(), 0);

    let mut quiz = QuizEngine::new(Arc::clone(&deck), None);
    assert_eq!(
        quiz.start_quiz(KanaType::Hiragana, 10, &mut rng),
        Err(QuizError::NoQuestions)
    );
    assert_eq!(quiz.phase(), QuizPhase::Idle);

    let mut input = InputLearnSession::new(deck, KanaType::Hiragana, &mut rng);
    assert_eq!(input.phase(), LearnPhase::Completed);
    assert_eq!(input.progress_percent(), 0);
    assert_err!(input.submit("a"));
}

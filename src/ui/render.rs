// Text rendering for the terminal shell
//
// Every function here turns a read-only view of engine state into the text of
// one screen. Nothing is printed directly; the console controller decides
// where the text goes.

use super::command::{ListDisplay, Screen};
use crate::catalogue::Deck;
use crate::models::{Category, GlobalSettings, LearningStats, VocabularyItem};
use crate::session::{InputLearnSession, LearnPhase, QuizEngine, QuizPhase, SessionState};
use chrono::{DateTime, Utc};
use std::fmt::Write;

const RULE: &str = "────────────────────────────────";

fn header(out: &mut String, screen: Screen) {
    let _ = writeln!(out, "{RULE}\n  {}\n{RULE}", screen.title());
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

pub fn home(stats: &LearningStats, deck_len: usize, alert: Option<&str>) -> String {
    let mut out = String::new();
    header(&mut out, Screen::Home);
    if let Some(alert) = alert {
        let _ = writeln!(out, "! {alert}");
    }
    let _ = writeln!(
        out,
        "{} kana loaded · {} sessions · accuracy {}%",
        deck_len,
        stats.total_sessions,
        stats.accuracy_percent()
    );
    for (number, screen) in Screen::MENU.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", number + 1, screen.title());
    }
    out.push_str("Choose a number, or :quit");
    out
}

/// "No data" placeholder shown by any learning screen over an empty deck
pub fn no_data(screen: Screen) -> String {
    let mut out = String::new();
    header(&mut out, screen);
    out.push_str("No kana data available. Progress: 0%");
    out
}

pub fn flashcard(session: &SessionState) -> String {
    let mut out = String::new();
    header(&mut out, Screen::Learn);
    let (Some(item), Some(glyph)) = (session.current_item(), session.current_glyph()) else {
        out.push_str("No kana data available. Progress: 0%");
        return out;
    };

    let _ = writeln!(
        out,
        "Card {}/{} · {} · {}",
        session.current_index() + 1,
        session.deck_len(),
        session.mode().label(),
        session.kana_type().label()
    );
    let _ = writeln!(out, "\n        {glyph}\n");
    if session.is_revealed() {
        let _ = writeln!(
            out,
            "  {}  ({} / {})",
            item.romaji, item.hiragana, item.katakana
        );
    } else {
        let _ = writeln!(out, "  [enter] reveal");
    }
    let _ = write!(
        out,
        "Learned {} · progress {}%",
        session.learned_count(),
        session.progress_percent()
    );
    out
}

pub fn kana_list(
    deck: &Deck,
    display: ListDisplay,
    selected: Option<&str>,
    show_romaji: bool,
) -> String {
    let mut out = String::new();
    header(&mut out, Screen::KanaList);
    if deck.is_empty() {
        out.push_str("No kana data available.");
        return out;
    }

    for (row, items) in deck.rows() {
        let _ = writeln!(out, "{}", row.title());
        let cells: Vec<String> = items
            .iter()
            .map(|item| {
                let glyphs = match display {
                    ListDisplay::Hiragana => item.hiragana.clone(),
                    ListDisplay::Katakana => item.katakana.clone(),
                    ListDisplay::Both => format!("{}{}", item.hiragana, item.katakana),
                };
                let label = if show_romaji {
                    format!("{glyphs} {}", item.romaji)
                } else {
                    glyphs
                };
                if selected == Some(item.id.as_str()) {
                    format!("[{label}]")
                } else {
                    label
                }
            })
            .collect();
        let _ = writeln!(out, "  {}", cells.join("  "));
    }
    out.push_str("h/k/b: script · <romaji>: select");
    out
}

pub fn quiz(engine: &QuizEngine, default_count: usize) -> String {
    let mut out = String::new();
    header(&mut out, Screen::Quiz);
    let state = engine.state();

    match state.phase {
        QuizPhase::Idle => {
            let _ = write!(
                out,
                "start [hiragana|katakana|mixed] [count]  (default {default_count} questions)"
            );
        }
        QuizPhase::Question | QuizPhase::Answer => {
            let _ = writeln!(
                out,
                "Question {}/{} · score {}",
                state.current_question + 1,
                state.questions.len(),
                state.score
            );
            let _ = writeln!(out, "\n        {}\n", state.current_glyph().unwrap_or("?"));
            for (i, option) in state.options.iter().enumerate() {
                let marker = match (state.phase, state.current()) {
                    (QuizPhase::Answer, Some(q)) if *option == q.romaji => "✓",
                    (QuizPhase::Answer, _) if state.selected_option.as_ref() == Some(option) => "✗",
                    _ => " ",
                };
                let _ = writeln!(out, " {marker} {}. {option}", i + 1);
            }
            if state.phase == QuizPhase::Answer {
                let verdict = if state.outcome == Some(true) { "Correct!" } else { "Wrong." };
                let _ = write!(out, "{verdict} [enter] next");
            } else {
                out.push_str("Choose 1-4");
            }
        }
        QuizPhase::Result => {
            let _ = write!(
                out,
                "Finished: {}/{} ({}%)\nstart · restart",
                state.score,
                state.questions.len(),
                engine.score_percent()
            );
        }
    }
    out
}

pub fn input_learn(session: &InputLearnSession, show_hint: bool) -> String {
    let mut out = String::new();
    header(&mut out, Screen::InputLearn);
    if session.deck_len() == 0 {
        out.push_str("No kana data available. Progress: 0%");
        return out;
    }

    let _ = writeln!(
        out,
        "{}{} · progress {}% · accuracy {}% ({}/{})",
        if session.is_review() { "REVIEW · " } else { "" },
        session.kana_type().label(),
        session.progress_percent(),
        session.accuracy_percent(),
        session.score(),
        session.total_attempts()
    );

    match session.phase() {
        LearnPhase::Completed => {
            let _ = write!(out, "Pass complete. {} to review.", session.wrong_answers().len());
            if !session.wrong_answers().is_empty() {
                out.push_str(" /review to practise them");
            }
            out.push_str(" · /reset to start over");
        }
        phase => {
            let _ = writeln!(out, "\n        {}\n", session.current_glyph().unwrap_or("?"));
            match phase {
                LearnPhase::Correct => out.push_str("Correct! [enter] next"),
                LearnPhase::Incorrect => {
                    out.push_str("Not quite.");
                    if let (true, Some(item)) = (show_hint, session.current_item()) {
                        let _ = write!(out, " Hint: {}", item.romaji);
                    }
                    out.push_str(" [enter] try again");
                }
                _ => out.push_str("Type the romaji · /answer to give up"),
            }
        }
    }
    out
}

pub fn vocabulary(items: &[&VocabularyItem], search: &str, category: Option<Category>) -> String {
    let mut out = String::new();
    header(&mut out, Screen::Vocabulary);
    let _ = writeln!(
        out,
        "Filter: \"{}\" · {}",
        search,
        category.map_or("all", Category::label)
    );
    if items.is_empty() {
        out.push_str("No matching words.\n");
    }
    for (i, item) in items.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {} {} {} - {} [{}] reviewed {}x",
            i + 1,
            item.japanese,
            item.kana,
            item.romaji,
            item.meaning,
            item.category.label(),
            item.review_count
        );
        if !item.tags.is_empty() {
            let _ = writeln!(out, "     #{}", item.tags.join(" #"));
        }
    }
    out.push_str("find TEXT · cat NAME · add ... · edit N ... · del N · review N · say N");
    out
}

pub fn profile(stats: &LearningStats, settings: &GlobalSettings, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    header(&mut out, Screen::Profile);
    let _ = writeln!(
        out,
        "Sessions {} · attempts {} · correct {} · accuracy {}%",
        stats.total_sessions,
        stats.total_attempts,
        stats.total_correct,
        stats.accuracy_percent()
    );
    let _ = writeln!(
        out,
        "Kana practised {} · last reset {}",
        stats.kana_records.len(),
        stats.reset_age(now)
    );
    let _ = writeln!(out, "mode      {}", settings.learning_mode.label());
    let _ = writeln!(out, "type      {}", settings.default_kana_type.label());
    let _ = writeln!(out, "hint      {}", on_off(settings.show_romaji_hint));
    let _ = writeln!(out, "autoplay  {}", on_off(settings.auto_play_pronunciation));
    let _ = writeln!(out, "count     {}", settings.quiz_question_count);
    let _ = writeln!(out, "delay     {}ms", settings.auto_advance_delay_ms);
    out.push_str("Type a setting name to change it · reset clears statistics");
    out
}

pub fn help(screen: Screen) -> String {
    let local = match screen {
        Screen::Home => "1-6 open a screen",
        Screen::Learn => "[enter]/r reveal · n next · p previous · reset · mode · type · say",
        Screen::KanaList => "h hiragana · k katakana · b both · <romaji> select",
        Screen::Quiz => "start [type] [count] · 1-4 answer · [enter] next · restart",
        Screen::InputLearn => "type an answer · [enter] continue · /answer · /review · /reset · /type · /say",
        Screen::Vocabulary => {
            "find TEXT · cat NAME|all · add japanese | kana | romaji | meaning | category | tags · edit N ... · del N · review N · say N"
        }
        Screen::Profile => "mode · type · hint · autoplay · count N · delay MS · reset",
    };
    format!("{local}\n:home :learn :list :quiz :input :vocab :profile :help :quit")
}

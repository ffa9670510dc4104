// Command parsing for the terminal shell
//
// Each input line is parsed against the active screen. Lines starting with ':'
// are global commands (navigation, help, quit) on every screen. On the
// input-learn screen any other line is an answer, so its own commands use a
// '/' prefix instead.

use crate::models::{Category, KanaType, VocabularyDraft};
use crate::services::parse_tags;
use thiserror::Error;

/// Screens offered by the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Learn,
    KanaList,
    Quiz,
    InputLearn,
    Vocabulary,
    Profile,
}

impl Screen {
    /// Screens reachable from the home menu, in menu order
    pub const MENU: [Screen; 6] = [
        Screen::Learn,
        Screen::KanaList,
        Screen::Quiz,
        Screen::InputLearn,
        Screen::Vocabulary,
        Screen::Profile,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Screen::Home => "home",
            Screen::Learn => "learn",
            Screen::KanaList => "list",
            Screen::Quiz => "quiz",
            Screen::InputLearn => "input",
            Screen::Vocabulary => "vocab",
            Screen::Profile => "profile",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Screen::Home => "Home",
            Screen::Learn => "Flashcards",
            Screen::KanaList => "Kana list",
            Screen::Quiz => "Quiz",
            Screen::InputLearn => "Typing practice",
            Screen::Vocabulary => "Vocabulary",
            Screen::Profile => "Profile & settings",
        }
    }

    fn from_name(name: &str) -> Option<Screen> {
        [Screen::Home]
            .into_iter()
            .chain(Screen::MENU)
            .find(|screen| screen.name() == name)
    }
}

/// How the kana list renders each card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListDisplay {
    Hiragana,
    Katakana,
    #[default]
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearnCommand {
    Next,
    Previous,
    Reveal,
    Reset,
    ToggleMode,
    CycleKanaType,
    Speak,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListCommand {
    Display(ListDisplay),
    Select(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizCommand {
    Start {
        kana_type: Option<KanaType>,
        count: Option<usize>,
    },
    /// Zero-based option index
    Choose(usize),
    Next,
    Restart,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    Answer(String),
    Continue,
    ShowAnswer,
    Review,
    Reset,
    CycleKanaType,
    Speak,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VocabCommand {
    Search(String),
    Category(Option<Category>),
    Add(VocabularyDraft),
    /// Zero-based position in the current listing
    Edit(usize, VocabularyDraft),
    Delete(usize),
    Review(usize),
    Speak(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileCommand {
    ToggleMode,
    CycleKanaType,
    ToggleHint,
    ToggleAutoPlay,
    QuestionCount(usize),
    AutoAdvanceDelay(u64),
    ResetStats,
}

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Navigate(Screen),
    Help,
    Quit,
    /// Blank line on a screen that has no use for it
    Nothing,
    Learn(LearnCommand),
    List(ListCommand),
    Quiz(QuizCommand),
    Input(InputCommand),
    Vocab(VocabCommand),
    Profile(ProfileCommand),
}

/// Errors produced for lines the active screen does not understand
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0} (type :help)")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),
}

const ADD_USAGE: &str = "add japanese | kana | romaji | meaning | category | tags";
const EDIT_USAGE: &str = "edit N japanese | kana | romaji | meaning | category | tags";

/// Parse one line of input for `screen`
pub fn parse(screen: Screen, line: &str) -> Result<Command, CommandError> {
    let line = line.trim();

    if let Some(global) = line.strip_prefix(':') {
        return parse_global(global.trim());
    }

    match screen {
        Screen::Home => parse_home(line),
        Screen::Learn => parse_learn(line).map(Command::Learn),
        Screen::KanaList => parse_list(line),
        Screen::Quiz => parse_quiz(line),
        Screen::InputLearn => Ok(Command::Input(parse_input(line)?)),
        Screen::Vocabulary => parse_vocab(line),
        Screen::Profile => parse_profile(line),
    }
}

fn parse_global(command: &str) -> Result<Command, CommandError> {
    match command {
        "q" | "quit" | "exit" => Ok(Command::Quit),
        "h" | "help" | "?" => Ok(Command::Help),
        name => Screen::from_name(name)
            .map(Command::Navigate)
            .ok_or_else(|| CommandError::Unknown(format!(":{name}"))),
    }
}

fn parse_home(line: &str) -> Result<Command, CommandError> {
    if line.is_empty() {
        return Ok(Command::Nothing);
    }
    if let Ok(choice) = line.parse::<usize>() {
        return choice
            .checked_sub(1)
            .and_then(|index| Screen::MENU.get(index))
            .map(|screen| Command::Navigate(*screen))
            .ok_or_else(|| CommandError::Unknown(line.to_string()));
    }
    parse_global(line)
}

fn parse_learn(line: &str) -> Result<LearnCommand, CommandError> {
    match line {
        "" | "r" | "reveal" => Ok(LearnCommand::Reveal),
        "n" | "next" => Ok(LearnCommand::Next),
        "p" | "prev" | "previous" => Ok(LearnCommand::Previous),
        "reset" => Ok(LearnCommand::Reset),
        "mode" => Ok(LearnCommand::ToggleMode),
        "type" => Ok(LearnCommand::CycleKanaType),
        "say" => Ok(LearnCommand::Speak),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn parse_list(line: &str) -> Result<Command, CommandError> {
    let display = match line {
        "" => return Ok(Command::Nothing),
        "hiragana" | "h" => ListDisplay::Hiragana,
        "katakana" | "k" => ListDisplay::Katakana,
        "both" | "b" => ListDisplay::Both,
        id => return Ok(Command::List(ListCommand::Select(id.to_lowercase()))),
    };
    Ok(Command::List(ListCommand::Display(display)))
}

fn parse_quiz(line: &str) -> Result<Command, CommandError> {
    let mut words = line.split_whitespace();
    let command = match words.next() {
        None | Some("n") | Some("next") => QuizCommand::Next,
        Some("restart") => QuizCommand::Restart,
        Some("start") | Some("s") => {
            let mut kana_type = None;
            let mut count = None;
            for word in words {
                if let Ok(n) = word.parse::<usize>() {
                    count = Some(n);
                } else {
                    kana_type = Some(
                        word.parse::<KanaType>()
                            .map_err(|_| CommandError::Usage("start [hiragana|katakana|mixed] [count]"))?,
                    );
                }
            }
            QuizCommand::Start { kana_type, count }
        }
        Some(choice) => match choice.parse::<usize>() {
            Ok(n) if n >= 1 => QuizCommand::Choose(n - 1),
            _ => return Err(CommandError::Unknown(choice.to_string())),
        },
    };
    Ok(Command::Quiz(command))
}

fn parse_input(line: &str) -> Result<InputCommand, CommandError> {
    let Some(command) = line.strip_prefix('/') else {
        return Ok(if line.is_empty() {
            InputCommand::Continue
        } else {
            InputCommand::Answer(line.to_string())
        });
    };
    match command.trim() {
        "next" | "n" => Ok(InputCommand::Continue),
        "answer" | "a" => Ok(InputCommand::ShowAnswer),
        "review" => Ok(InputCommand::Review),
        "reset" => Ok(InputCommand::Reset),
        "type" => Ok(InputCommand::CycleKanaType),
        "say" => Ok(InputCommand::Speak),
        other => Err(CommandError::Unknown(format!("/{other}"))),
    }
}

fn parse_vocab(line: &str) -> Result<Command, CommandError> {
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb {
        "" => VocabCommand::Search(String::new()),
        "find" | "search" | "f" => VocabCommand::Search(rest.to_string()),
        "cat" | "category" => match rest {
            "" | "all" => VocabCommand::Category(None),
            name => VocabCommand::Category(Some(
                name.parse()
                    .map_err(|_| CommandError::Usage("cat all|daily-life|work|travel|food|shopping|transport|study|other"))?,
            )),
        },
        "add" => VocabCommand::Add(parse_draft(rest).ok_or(CommandError::Usage(ADD_USAGE))?),
        "edit" => {
            let (position, fields) = rest.split_once(char::is_whitespace).ok_or(CommandError::Usage(EDIT_USAGE))?;
            let position = parse_position(position).ok_or(CommandError::Usage(EDIT_USAGE))?;
            let draft = parse_draft(fields).ok_or(CommandError::Usage(EDIT_USAGE))?;
            VocabCommand::Edit(position, draft)
        }
        "del" | "delete" => VocabCommand::Delete(parse_position(rest).ok_or(CommandError::Usage("del N"))?),
        "review" | "r" => VocabCommand::Review(parse_position(rest).ok_or(CommandError::Usage("review N"))?),
        "say" => VocabCommand::Speak(parse_position(rest).ok_or(CommandError::Usage("say N"))?),
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Command::Vocab(command))
}

fn parse_profile(line: &str) -> Result<Command, CommandError> {
    let mut words = line.split_whitespace();
    let command = match (words.next(), words.next()) {
        (None, _) => return Ok(Command::Nothing),
        (Some("mode"), None) => ProfileCommand::ToggleMode,
        (Some("type"), None) => ProfileCommand::CycleKanaType,
        (Some("hint"), None) => ProfileCommand::ToggleHint,
        (Some("autoplay"), None) => ProfileCommand::ToggleAutoPlay,
        (Some("reset"), None) => ProfileCommand::ResetStats,
        (Some("count"), Some(n)) => ProfileCommand::QuestionCount(
            n.parse().ok().filter(|n| *n > 0).ok_or(CommandError::Usage("count N"))?,
        ),
        (Some("delay"), Some(ms)) => {
            ProfileCommand::AutoAdvanceDelay(ms.parse().map_err(|_| CommandError::Usage("delay MS"))?)
        }
        (Some(other), _) => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Command::Profile(command))
}

/// One-based listing position to a zero-based index
fn parse_position(text: &str) -> Option<usize> {
    text.trim().parse::<usize>().ok()?.checked_sub(1)
}

/// `japanese | kana | romaji | meaning | category | tags`; trailing fields may be omitted
fn parse_draft(text: &str) -> Option<VocabularyDraft> {
    let fields: Vec<&str> = text.split('|').map(str::trim).collect();
    let field = |i: usize| fields.get(i).copied().unwrap_or_default().to_string();

    let category = match fields.get(4).copied().unwrap_or_default() {
        "" => Category::default(),
        name => name.parse().ok()?,
    };

    Some(VocabularyDraft {
        japanese: field(0),
        kana: field(1),
        romaji: field(2),
        meaning: field(3),
        category,
        tags: parse_tags(fields.get(5).copied().unwrap_or_default()),
    })
}

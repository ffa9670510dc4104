// ConsoleController - drives the learning engine from a line-based terminal
//
// All input reaches the controller as ShellEvents on one mpsc channel: stdin
// lines, expired auto-advance timers and speech notifications. Events are
// handled one at a time, so every engine transition stays synchronous.

use super::command::{
    self, Command, InputCommand, LearnCommand, ListCommand, ListDisplay, ProfileCommand,
    QuizCommand, Screen, VocabCommand,
};
use super::render;
use crate::catalogue::Deck;
use crate::models::{Category, SettingsPatch};
use crate::services::{DeferredEvent, SpeechController, SpeechEvent, VocabularyNotebook};
use crate::session::{
    AutoAdvance, FlashcardEvent, InputError, InputLearnSession, QuizEngine, SessionState,
};
use crate::state::{StateChange, StateManager};
use anyhow::{Context, Result};
use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;

/// Everything the controller reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    Line(String),
    /// Input closed
    Eof,
    AutoAdvance(AutoAdvance),
    Speech(SpeechEvent),
}

/// Whether the loop keeps running after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Per-screen state; recreated whenever a screen is entered
enum ScreenState {
    Home,
    Learn(SessionState),
    KanaList {
        display: ListDisplay,
        selected: Option<String>,
    },
    Quiz(QuizEngine),
    InputLearn(InputLearnSession),
    Vocabulary {
        search: String,
        category: Option<Category>,
    },
    Profile,
}

impl ScreenState {
    fn screen(&self) -> Screen {
        match self {
            ScreenState::Home => Screen::Home,
            ScreenState::Learn(_) => Screen::Learn,
            ScreenState::KanaList { .. } => Screen::KanaList,
            ScreenState::Quiz(_) => Screen::Quiz,
            ScreenState::InputLearn(_) => Screen::InputLearn,
            ScreenState::Vocabulary { .. } => Screen::Vocabulary,
            ScreenState::Profile => Screen::Profile,
        }
    }
}

/// Terminal front end over the learning engine
///
/// Owns the per-screen session state and the side-effecting collaborators
/// (statistics, vocabulary, speech, timers). Output goes to any `Write`, which
/// keeps the controller testable without a terminal.
pub struct ConsoleController<W: Write> {
    state: StateManager,
    deck: Arc<Deck>,
    alert: Option<String>,
    notebook: VocabularyNotebook,
    speech: SpeechController,
    auto_advance: bool,
    screen: ScreenState,
    rng: StdRng,
    timer: DeferredEvent,
    events_tx: mpsc::UnboundedSender<ShellEvent>,
    out: W,
}

impl<W: Write> ConsoleController<W> {
    /// Create a controller showing the home screen
    ///
    /// # Arguments
    /// * `state` - Shared settings and statistics
    /// * `deck` - Loaded catalogue, possibly empty
    /// * `alert` - Catalogue load problem to show on the home screen
    /// * `events_tx` - Sender for the controller's own event channel, used by timers
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        state: StateManager,
        deck: Arc<Deck>,
        alert: Option<String>,
        notebook: VocabularyNotebook,
        speech: SpeechController,
        auto_advance: bool,
        events_tx: mpsc::UnboundedSender<ShellEvent>,
        out: W,
    ) -> Self {
        Self {
            state,
            deck,
            alert,
            notebook,
            speech,
            auto_advance,
            screen: ScreenState::Home,
            rng: StdRng::from_entropy(),
            timer: DeferredEvent::new(),
            events_tx,
            out,
        }
    }

    /// Replace the random source, for reproducible sessions
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn screen(&self) -> Screen {
        self.screen.screen()
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn notebook(&self) -> &VocabularyNotebook {
        &self.notebook
    }

    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Process events until the user quits or every sender is gone
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<ShellEvent>) -> Result<()> {
        tracing::info!("Console controller started");
        self.render()?;

        while let Some(event) = events.recv().await {
            if self.handle_event(event)? == Flow::Quit {
                break;
            }
        }

        tracing::info!("Console controller stopped");
        Ok(())
    }

    /// Handle a single event and redraw when something visible changed
    pub fn handle_event(&mut self, event: ShellEvent) -> Result<Flow> {
        match event {
            ShellEvent::Line(line) => self.handle_line(&line),
            ShellEvent::Eof => Ok(Flow::Quit),
            ShellEvent::AutoAdvance(token) => {
                if let ScreenState::Quiz(engine) = &mut self.screen
                    && engine.on_auto_advance(token, &mut self.rng)
                {
                    self.render()?;
                }
                Ok(Flow::Continue)
            }
            ShellEvent::Speech(event) => {
                self.speech.on_event(&event);
                Ok(Flow::Continue)
            }
        }
    }

    fn handle_line(&mut self, line: &str) -> Result<Flow> {
        let command = match command::parse(self.screen(), line) {
            Ok(command) => command,
            Err(e) => {
                self.notice(&e.to_string())?;
                return Ok(Flow::Continue);
            }
        };
        tracing::debug!("Command on {}: {:?}", self.screen().name(), command);

        match command {
            Command::Quit => return Ok(Flow::Quit),
            Command::Help => {
                let help = render::help(self.screen());
                self.notice(&help)?;
                return Ok(Flow::Continue);
            }
            Command::Nothing => {}
            Command::Navigate(screen) => self.enter(screen),
            Command::Learn(command) => self.learn(command),
            Command::List(command) => self.list(command),
            Command::Quiz(command) => {
                if let Some(message) = self.quiz(command) {
                    self.render()?;
                    self.notice(&message)?;
                    return Ok(Flow::Continue);
                }
            }
            Command::Input(command) => {
                if let Some(message) = self.input(command) {
                    self.render()?;
                    self.notice(&message)?;
                    return Ok(Flow::Continue);
                }
            }
            Command::Vocab(command) => {
                if let Some(message) = self.vocab(command) {
                    self.render()?;
                    self.notice(&message)?;
                    return Ok(Flow::Continue);
                }
            }
            Command::Profile(command) => self.profile(command),
        }

        self.render()?;
        Ok(Flow::Continue)
    }

    /// Leave the current screen and open `screen` with fresh state
    fn enter(&mut self, screen: Screen) {
        // Leaving a screen cancels its timer and silences it
        self.timer.cancel();
        self.speech.stop();

        let settings = self.state.settings();
        self.screen = match screen {
            Screen::Home => ScreenState::Home,
            Screen::Learn => ScreenState::Learn(SessionState::new(
                Arc::clone(&self.deck),
                settings.learning_mode,
                settings.default_kana_type,
                &mut self.rng,
            )),
            Screen::KanaList => ScreenState::KanaList {
                display: ListDisplay::default(),
                selected: None,
            },
            Screen::Quiz => ScreenState::Quiz(QuizEngine::new(
                Arc::clone(&self.deck),
                self.auto_advance_delay(),
            )),
            Screen::InputLearn => ScreenState::InputLearn(InputLearnSession::new(
                Arc::clone(&self.deck),
                settings.default_kana_type,
                &mut self.rng,
            )),
            Screen::Vocabulary => ScreenState::Vocabulary {
                search: String::new(),
                category: None,
            },
            Screen::Profile => ScreenState::Profile,
        };

        if matches!(screen, Screen::Learn | Screen::InputLearn) && !self.deck.is_empty() {
            self.state.begin_session();
        }
        if screen == Screen::Learn {
            self.auto_play();
        }
        tracing::debug!("Entered {} screen", screen.name());
    }

    fn learn(&mut self, command: LearnCommand) {
        let ScreenState::Learn(session) = &mut self.screen else {
            return;
        };
        let before = session.current_index();
        match command {
            LearnCommand::Next => session.apply(FlashcardEvent::Next, &mut self.rng),
            LearnCommand::Previous => session.apply(FlashcardEvent::Previous, &mut self.rng),
            LearnCommand::Reveal => session.apply(FlashcardEvent::Reveal, &mut self.rng),
            LearnCommand::Reset => session.apply(FlashcardEvent::Reset, &mut self.rng),
            LearnCommand::ToggleMode => {
                self.state.toggle_learning_mode();
                let mode = self.state.settings().learning_mode;
                session.apply(FlashcardEvent::SetMode(mode), &mut self.rng);
            }
            LearnCommand::CycleKanaType => {
                self.state.cycle_kana_type();
                let kana_type = self.state.settings().default_kana_type;
                session.apply(FlashcardEvent::SetKanaType(kana_type), &mut self.rng);
            }
            LearnCommand::Speak => {
                self.speak_current();
                return;
            }
        }
        let moved = session.current_index() != before;
        if moved && matches!(command, LearnCommand::Next | LearnCommand::Previous) {
            self.auto_play();
        }
    }

    fn list(&mut self, command: ListCommand) {
        let ScreenState::KanaList { display, selected } = &mut self.screen else {
            return;
        };
        match command {
            ListCommand::Display(mode) => *display = mode,
            ListCommand::Select(id) => {
                if self.deck.find(&id).is_none() {
                    return;
                }
                *selected = if selected.as_deref() == Some(id.as_str()) {
                    None
                } else {
                    Some(id)
                };
            }
        }
    }

    /// Returns a message to show under the screen
    fn quiz(&mut self, command: QuizCommand) -> Option<String> {
        let settings = self.state.settings();
        let ScreenState::Quiz(engine) = &mut self.screen else {
            return None;
        };

        match command {
            QuizCommand::Start { kana_type, count } => {
                self.timer.cancel();
                let kana_type = kana_type.unwrap_or(settings.default_kana_type);
                let count = count.unwrap_or(settings.quiz_question_count);
                match engine.start_quiz(kana_type, count, &mut self.rng) {
                    Ok(()) => {
                        self.state.begin_session();
                        None
                    }
                    Err(e) => Some(e.to_string()),
                }
            }
            QuizCommand::Choose(index) => {
                let options = &engine.state().options;
                let Some(option) = options.get(index).cloned() else {
                    return (!options.is_empty()).then(|| format!("Choose 1-{}", options.len()));
                };
                match engine.select_answer(&option) {
                    Ok(outcome) => {
                        self.state.record_attempt(&outcome.kana_id, outcome.correct);
                        if let Some(token) = outcome.auto_advance {
                            self.timer.schedule(
                                token.delay,
                                self.events_tx.clone(),
                                ShellEvent::AutoAdvance(token),
                            );
                        }
                        None
                    }
                    Err(e) => Some(e.to_string()),
                }
            }
            QuizCommand::Next => {
                self.timer.cancel();
                engine.next_question(&mut self.rng).err().map(|e| e.to_string())
            }
            QuizCommand::Restart => {
                self.timer.cancel();
                engine.restart();
                None
            }
        }
    }

    fn input(&mut self, command: InputCommand) -> Option<String> {
        let ScreenState::InputLearn(session) = &mut self.screen else {
            return None;
        };

        let result = match command {
            InputCommand::Answer(answer) => session.submit(&answer).map(|outcome| {
                self.state.record_attempt(&outcome.kana_id, outcome.correct);
                outcome.review_finished.then(|| "All mistakes reviewed!".to_string())
            }),
            InputCommand::Continue => session.proceed(&mut self.rng).map(|_| None),
            InputCommand::ShowAnswer => Ok(session
                .reveal_answer(&mut self.rng)
                .map(|answer| format!("The answer was: {answer}"))),
            InputCommand::Review => session.start_review(&mut self.rng).map(|_| None),
            InputCommand::Reset => {
                session.reset(&mut self.rng);
                Ok(None)
            }
            InputCommand::CycleKanaType => {
                self.state.cycle_kana_type();
                let kana_type = self.state.settings().default_kana_type;
                session.set_kana_type(kana_type, &mut self.rng);
                Ok(None)
            }
            InputCommand::Speak => {
                self.speak_current();
                Ok(None)
            }
        };

        match result {
            Ok(message) => message,
            Err(InputError::NotAnswered) => None,
            Err(e) => Some(e.to_string()),
        }
    }

    fn vocab(&mut self, command: VocabCommand) -> Option<String> {
        let ScreenState::Vocabulary { search, category } = &mut self.screen else {
            return None;
        };

        // Positions refer to the listing currently on screen
        let id_at = |position: usize| {
            self.notebook
                .filter(search, *category)
                .get(position)
                .map(|item| item.id.clone())
        };

        match command {
            VocabCommand::Search(text) => {
                *search = text;
                None
            }
            VocabCommand::Category(wanted) => {
                *category = wanted;
                None
            }
            VocabCommand::Add(draft) => match self.notebook.add(draft) {
                Ok(item) => Some(format!("Added {}", item.japanese)),
                Err(e) => Some(e.to_string()),
            },
            VocabCommand::Edit(position, draft) => {
                let id = id_at(position)?;
                self.notebook.edit(&id, draft).err().map(|e| e.to_string())
            }
            VocabCommand::Delete(position) => {
                let id = id_at(position)?;
                match self.notebook.delete(&id) {
                    Ok(item) => Some(format!("Deleted {}", item.japanese)),
                    Err(e) => Some(e.to_string()),
                }
            }
            VocabCommand::Review(position) => {
                let id = id_at(position)?;
                self.notebook.mark_reviewed(&id).err().map(|e| e.to_string())
            }
            VocabCommand::Speak(position) => {
                let id = id_at(position)?;
                let text = self.notebook.get(&id)?.japanese.clone();
                self.speech.speak(&text).err().map(|e| e.to_string())
            }
        }
    }

    fn profile(&mut self, command: ProfileCommand) {
        let changes: Vec<StateChange> = match command {
            ProfileCommand::ToggleMode => self.state.toggle_learning_mode(),
            ProfileCommand::CycleKanaType => self.state.cycle_kana_type(),
            ProfileCommand::ToggleHint => {
                let hint = self.state.settings().show_romaji_hint;
                self.state.update_settings(&SettingsPatch {
                    show_romaji_hint: Some(!hint),
                    ..Default::default()
                })
            }
            ProfileCommand::ToggleAutoPlay => {
                let auto_play = self.state.settings().auto_play_pronunciation;
                self.state.update_settings(&SettingsPatch {
                    auto_play_pronunciation: Some(!auto_play),
                    ..Default::default()
                })
            }
            ProfileCommand::QuestionCount(count) => self.state.update_settings(&SettingsPatch {
                quiz_question_count: Some(count),
                ..Default::default()
            }),
            ProfileCommand::AutoAdvanceDelay(delay) => self.state.update_settings(&SettingsPatch {
                auto_advance_delay_ms: Some(delay),
                ..Default::default()
            }),
            ProfileCommand::ResetStats => self.state.reset_stats(),
        };
        tracing::debug!("Profile change: {:?}", changes);
    }

    fn auto_advance_delay(&self) -> Option<Duration> {
        self.auto_advance
            .then(|| Duration::from_millis(self.state.settings().auto_advance_delay_ms))
    }

    /// Speak the current card if pronunciation autoplay is enabled
    fn auto_play(&mut self) {
        if self.state.settings().auto_play_pronunciation && self.speech.is_available() {
            self.speak_current();
        }
    }

    fn speak_current(&mut self) {
        let text = match &self.screen {
            ScreenState::Learn(session) => session.current_glyph().map(str::to_string),
            ScreenState::InputLearn(session) => session.current_glyph().map(str::to_string),
            _ => None,
        };
        if let Some(text) = text
            && let Err(e) = self.speech.speak(&text)
        {
            tracing::warn!("Could not speak {}: {}", text, e);
        }
    }

    fn render(&mut self) -> Result<()> {
        let text = match &self.screen {
            ScreenState::Home => {
                let stats = self.state.stats();
                render::home(&stats, self.deck.len(), self.alert.as_deref())
            }
            ScreenState::Learn(session) => render::flashcard(session),
            ScreenState::KanaList { display, selected } => render::kana_list(
                &self.deck,
                *display,
                selected.as_deref(),
                self.state.settings().show_romaji_hint,
            ),
            ScreenState::Quiz(_) if self.deck.is_empty() => render::no_data(Screen::Quiz),
            ScreenState::Quiz(engine) => {
                render::quiz(engine, self.state.settings().quiz_question_count)
            }
            ScreenState::InputLearn(session) => {
                render::input_learn(session, self.state.settings().show_romaji_hint)
            }
            ScreenState::Vocabulary { search, category } => {
                let items = self.notebook.filter(search, *category);
                render::vocabulary(&items, search, *category)
            }
            ScreenState::Profile => {
                render::profile(&self.state.stats(), &self.state.settings(), Utc::now())
            }
        };
        writeln!(self.out, "\n{text}").context("Failed to write to the terminal")?;
        self.out.flush().context("Failed to flush the terminal")?;
        Ok(())
    }

    fn notice(&mut self, message: &str) -> Result<()> {
        writeln!(self.out, "» {message}").context("Failed to write to the terminal")?;
        Ok(())
    }
}

/// Forward lines from `input` to the event channel, then an `Eof`
pub fn spawn_line_reader<R>(input: R, tx: mpsc::UnboundedSender<ShellEvent>) -> tokio::task::JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(input).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(ShellEvent::Line(line)).is_err() {
                        return;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("Failed to read input: {}", e);
                    break;
                }
            }
        }
        let _ = tx.send(ShellEvent::Eof);
    })
}

/// Forward speech notifications to the event channel
pub fn spawn_speech_forwarder(
    mut speech_rx: mpsc::UnboundedReceiver<SpeechEvent>,
    tx: mpsc::UnboundedSender<ShellEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = speech_rx.recv().await {
            if tx.send(ShellEvent::Speech(event)).is_err() {
                break;
            }
        }
    })
}

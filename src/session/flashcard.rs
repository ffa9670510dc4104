use crate::catalogue::Deck;
use crate::models::{KanaItem, KanaType, NavigationMode, Script, rounded_percent};
use rand::Rng;
use std::sync::Arc;

/// Discrete inputs accepted by the flashcard screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashcardEvent {
    Next,
    Previous,
    Reveal,
    Reset,
    SetMode(NavigationMode),
    SetKanaType(KanaType),
}

/// Flashcard navigation state over a [`Deck`].
///
/// Created when a learning screen opens and discarded when it closes; never
/// persisted. Every operation is a no-op on an empty deck.
#[derive(Debug, Clone)]
pub struct SessionState {
    deck: Arc<Deck>,
    current_index: usize,
    mode: NavigationMode,
    kana_type: KanaType,
    script: Script,
    revealed: bool,
    learned_count: usize,
}

impl SessionState {
    pub fn new<R: Rng + ?Sized>(
        deck: Arc<Deck>,
        mode: NavigationMode,
        kana_type: KanaType,
        rng: &mut R,
    ) -> Self {
        Self {
            deck,
            current_index: 0,
            mode,
            kana_type,
            script: kana_type.pick_script(rng),
            revealed: false,
            learned_count: 0,
        }
    }

    /// Apply one input event
    pub fn apply<R: Rng + ?Sized>(&mut self, event: FlashcardEvent, rng: &mut R) {
        match event {
            FlashcardEvent::Next => self.next(rng),
            FlashcardEvent::Previous => self.previous(rng),
            FlashcardEvent::Reveal => self.reveal(),
            FlashcardEvent::Reset => self.reset(rng),
            FlashcardEvent::SetMode(mode) => self.mode = mode,
            FlashcardEvent::SetKanaType(kana_type) => {
                self.kana_type = kana_type;
                self.script = kana_type.pick_script(rng);
            }
        }
    }

    /// Advance to the next card.
    ///
    /// Sequential mode wraps from the last card to the first. Random mode
    /// picks uniformly among the other cards, so the current card is never
    /// repeated while the deck holds more than one.
    pub fn next<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let len = self.deck.len();
        if len == 0 {
            return;
        }

        self.current_index = match self.mode {
            NavigationMode::Sequential => (self.current_index + 1) % len,
            NavigationMode::Random if len > 1 => {
                let pick = rng.gen_range(0..len - 1);
                if pick >= self.current_index { pick + 1 } else { pick }
            }
            NavigationMode::Random => self.current_index,
        };
        self.card_changed(rng);
    }

    /// Step back one card in deck order, whatever the navigation mode.
    ///
    /// In random mode this can land on a card that forward navigation did not
    /// visit. Does nothing on the first card.
    pub fn previous<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.current_index == 0 {
            return;
        }
        self.current_index -= 1;
        self.card_changed(rng);
    }

    /// Show the answer; only the first reveal of a card counts as learned
    pub fn reveal(&mut self) {
        if self.deck.is_empty() || self.revealed {
            return;
        }
        self.revealed = true;
        self.learned_count += 1;
    }

    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.current_index = 0;
        self.revealed = false;
        self.learned_count = 0;
        self.script = self.kana_type.pick_script(rng);
    }

    fn card_changed<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.revealed = false;
        self.script = self.kana_type.pick_script(rng);
    }

    pub fn current_item(&self) -> Option<&KanaItem> {
        self.deck.get(self.current_index)
    }

    /// Glyph to show for the current card in the chosen script
    pub fn current_glyph(&self) -> Option<&str> {
        self.current_item().map(|item| item.glyph(self.script))
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn mode(&self) -> NavigationMode {
        self.mode
    }

    pub fn kana_type(&self) -> KanaType {
        self.kana_type
    }

    pub fn script(&self) -> Script {
        self.script
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn learned_count(&self) -> usize {
        self.learned_count
    }

    pub fn deck_len(&self) -> usize {
        self.deck.len()
    }

    /// Learned cards as a percentage of the deck, capped at 100
    pub fn progress_percent(&self) -> u32 {
        rounded_percent(self.learned_count, self.deck.len()).min(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn deck(n: usize) -> Arc<Deck> {
        let items = (0..n)
            .map(|i| KanaItem::new(format!("k{i}"), "か", "カ", format!("r{i}")))
            .collect();
        Arc::new(Deck::new(items).unwrap())
    }

    fn session(n: usize, mode: NavigationMode) -> (SessionState, StdRng) {
        let mut rng = StdRng::seed_from_u64(1);
        let state = SessionState::new(deck(n), mode, KanaType::Hiragana, &mut rng);
        (state, rng)
    }

    #[test]
    fn test_sequential_next_wraps() {
        let (mut state, mut rng) = session(3, NavigationMode::Sequential);
        let visited: Vec<usize> = (0..7)
            .map(|_| {
                state.next(&mut rng);
                state.current_index()
            })
            .collect();
        assert_eq!(visited, vec![1, 2, 0, 1, 2, 0, 1]);
    }

    #[test]
    fn test_next_clears_reveal() {
        let (mut state, mut rng) = session(3, NavigationMode::Sequential);
        state.reveal();
        assert!(state.is_revealed());
        state.next(&mut rng);
        assert!(!state.is_revealed());
    }

    #[test]
    fn test_previous_is_noop_at_start() {
        let (mut state, mut rng) = session(3, NavigationMode::Sequential);
        state.reveal();
        state.previous(&mut rng);
        assert_eq!(state.current_index(), 0);
        assert!(state.is_revealed());
    }

    #[test]
    fn test_previous_is_sequential_in_random_mode() {
        let (mut state, mut rng) = session(10, NavigationMode::Random);
        state.next(&mut rng);
        let landed = state.current_index();
        state.previous(&mut rng);
        assert_eq!(state.current_index(), landed.saturating_sub(1));
    }

    #[test]
    fn test_double_reveal_counts_once() {
        let (mut state, _rng) = session(4, NavigationMode::Sequential);
        state.reveal();
        state.reveal();
        assert_eq!(state.learned_count(), 1);
        assert_eq!(state.progress_percent(), 25);
    }

    #[test]
    fn test_reset() {
        let (mut state, mut rng) = session(4, NavigationMode::Sequential);
        state.next(&mut rng);
        state.reveal();
        state.reset(&mut rng);
        assert_eq!(state.current_index(), 0);
        assert!(!state.is_revealed());
        assert_eq!(state.learned_count(), 0);
    }

    #[test]
    fn test_random_single_card_stays() {
        let (mut state, mut rng) = session(1, NavigationMode::Random);
        state.next(&mut rng);
        assert_eq!(state.current_index(), 0);
    }

    #[test]
    fn test_empty_deck_is_inert() {
        let (mut state, mut rng) = session(0, NavigationMode::Sequential);
        state.next(&mut rng);
        state.previous(&mut rng);
        state.reveal();
        assert_eq!(state.current_index(), 0);
        assert_eq!(state.learned_count(), 0);
        assert_eq!(state.progress_percent(), 0);
        assert!(state.current_item().is_none());
    }

    #[test]
    fn test_progress_capped_after_revisits() {
        let (mut state, mut rng) = session(2, NavigationMode::Sequential);
        for _ in 0..5 {
            state.reveal();
            state.next(&mut rng);
        }
        assert_eq!(state.learned_count(), 5);
        assert_eq!(state.progress_percent(), 100);
    }

    #[test]
    fn test_events_dispatch() {
        let (mut state, mut rng) = session(3, NavigationMode::Sequential);
        state.apply(FlashcardEvent::Next, &mut rng);
        state.apply(FlashcardEvent::Reveal, &mut rng);
        assert_eq!(state.current_index(), 1);
        assert_eq!(state.learned_count(), 1);

        state.apply(FlashcardEvent::SetKanaType(KanaType::Katakana), &mut rng);
        assert_eq!(state.script(), Script::Katakana);
        assert_eq!(state.current_glyph(), Some("カ"));

        state.apply(FlashcardEvent::SetMode(NavigationMode::Random), &mut rng);
        assert_eq!(state.mode(), NavigationMode::Random);
    }

    proptest! {
        #[test]
        fn prop_sequential_cycles_in_order(n in 2usize..60, steps in 1usize..200) {
            let (mut state, mut rng) = session(n, NavigationMode::Sequential);
            for step in 1..=steps {
                state.next(&mut rng);
                prop_assert_eq!(state.current_index(), step % n);
            }
        }

        #[test]
        fn prop_random_never_repeats(n in 2usize..60, seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut state = SessionState::new(deck(n), NavigationMode::Random, KanaType::Mixed, &mut rng);
            for _ in 0..100 {
                let before = state.current_index();
                state.next(&mut rng);
                prop_assert_ne!(state.current_index(), before);
                prop_assert!(state.current_index() < n);
            }
        }
    }
}

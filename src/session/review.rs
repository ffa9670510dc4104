use indexmap::IndexSet;

/// Ordered set of kana ids answered incorrectly.
///
/// Insertion keeps first-miss order and ignores ids already present; the
/// review sub-session walks the set by position and removes entries as they
/// are answered correctly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrongAnswerSet {
    ids: IndexSet<String>,
}

impl WrongAnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a miss; returns false when the id was already present
    pub fn insert(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        self.ids.insert(id.to_string())
    }

    /// Remove the entry at `position`, keeping the order of the rest
    pub fn remove_at(&mut self, position: usize) -> Option<String> {
        self.ids.shift_remove_index(position)
    }

    pub fn get(&self, position: usize) -> Option<&str> {
        self.ids.get_index(position).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

use crate::models::{Category, VocabularyDraft, VocabularyItem};
use crate::storage::{KeyValueStore, Slot, VOCABULARY_KEY};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::{Arc, LazyLock};
use thiserror::Error;
use uuid::Uuid;

/// Separators accepted between tags: ASCII comma, fullwidth comma, ideographic comma
static TAG_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[,，、]\s*").expect("Invalid tag separator regex"));

/// Errors that can occur while editing the notebook
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VocabularyError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("No vocabulary entry with id {0}")]
    NotFound(String),
}

/// Split comma separated tag input into trimmed, non-empty tags
pub fn parse_tags(input: &str) -> Vec<String> {
    TAG_SEPARATOR
        .split(input.trim())
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Entries written on first run so the notebook is not empty
fn sample_entries(now: DateTime<Utc>) -> Vec<VocabularyItem> {
    [
        ("こんにちは", "konnichiwa", "hello", ["greeting", "basic"]),
        ("ありがとう", "arigatou", "thank you", ["thanks", "basic"]),
        ("すみません", "sumimasen", "sorry / excuse me", ["apology", "polite"]),
    ]
    .into_iter()
    .map(|(japanese, romaji, meaning, tags)| VocabularyItem {
        id: Uuid::new_v4().to_string(),
        japanese: japanese.to_string(),
        kana: japanese.to_string(),
        romaji: romaji.to_string(),
        meaning: meaning.to_string(),
        category: Category::DailyLife,
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        created_at: now,
        last_reviewed: now,
        review_count: 0,
    })
    .collect()
}

/// The learner's personal word list, persisted wholesale under the
/// `vocabulary` key after every change.
pub struct VocabularyNotebook {
    slot: Slot<Vec<VocabularyItem>>,
    items: Vec<VocabularyItem>,
}

impl VocabularyNotebook {
    /// Load the notebook, seeding sample entries when nothing is stored yet.
    ///
    /// A stored list that cannot be read is left untouched; the notebook then
    /// starts empty for this session.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let slot = Slot::new(store, VOCABULARY_KEY);
        let items = match slot.load() {
            Ok(Some(items)) => items,
            Ok(None) => {
                let samples = sample_entries(Utc::now());
                tracing::info!("Seeding vocabulary with {} sample entries", samples.len());
                slot.save_or_warn(&samples);
                samples
            }
            Err(e) => {
                tracing::warn!("Failed to load vocabulary: {}", e);
                Vec::new()
            }
        };
        Self { slot, items }
    }

    pub fn items(&self) -> &[VocabularyItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&VocabularyItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Add a new entry built from `draft`
    pub fn add(&mut self, draft: VocabularyDraft) -> Result<&VocabularyItem, VocabularyError> {
        self.add_at(draft, Utc::now())
    }

    pub fn add_at(
        &mut self,
        draft: VocabularyDraft,
        now: DateTime<Utc>,
    ) -> Result<&VocabularyItem, VocabularyError> {
        let draft = validate(draft)?;
        let item = VocabularyItem {
            id: Uuid::new_v4().to_string(),
            japanese: draft.japanese,
            kana: draft.kana,
            romaji: draft.romaji,
            meaning: draft.meaning,
            category: draft.category,
            tags: draft.tags,
            created_at: now,
            last_reviewed: now,
            review_count: 0,
        };
        tracing::debug!("Adding vocabulary {} ({})", item.japanese, item.id);
        self.items.push(item);
        self.persist();

        let index = self.items.len() - 1;
        Ok(&self.items[index])
    }

    /// Replace the user-editable fields of an existing entry
    pub fn edit(&mut self, id: &str, draft: VocabularyDraft) -> Result<(), VocabularyError> {
        let draft = validate(draft)?;
        let item = self.get_mut(id)?;
        item.japanese = draft.japanese;
        item.kana = draft.kana;
        item.romaji = draft.romaji;
        item.meaning = draft.meaning;
        item.category = draft.category;
        item.tags = draft.tags;
        self.persist();
        Ok(())
    }

    pub fn delete(&mut self, id: &str) -> Result<VocabularyItem, VocabularyError> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| VocabularyError::NotFound(id.to_string()))?;
        let removed = self.items.remove(index);
        self.persist();
        Ok(removed)
    }

    pub fn mark_reviewed(&mut self, id: &str) -> Result<u32, VocabularyError> {
        self.mark_reviewed_at(id, Utc::now())
    }

    /// Bump the review counter and stamp the review time; returns the new count
    pub fn mark_reviewed_at(&mut self, id: &str, now: DateTime<Utc>) -> Result<u32, VocabularyError> {
        let item = self.get_mut(id)?;
        item.review_count += 1;
        item.last_reviewed = now;
        let count = item.review_count;
        self.persist();
        Ok(count)
    }

    /// Entries matching `search` (case-insensitive, any text field or tag) and,
    /// when given, `category`
    pub fn filter(&self, search: &str, category: Option<Category>) -> Vec<&VocabularyItem> {
        self.items
            .iter()
            .filter(|item| category.is_none_or(|c| item.category == c))
            .filter(|item| item.matches(search))
            .collect()
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut VocabularyItem, VocabularyError> {
        self.items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| VocabularyError::NotFound(id.to_string()))
    }

    fn persist(&self) {
        self.slot.save_or_warn(&self.items);
    }
}

/// Trim every text field and require the word and its meaning
fn validate(draft: VocabularyDraft) -> Result<VocabularyDraft, VocabularyError> {
    let draft = VocabularyDraft {
        japanese: draft.japanese.trim().to_string(),
        kana: draft.kana.trim().to_string(),
        romaji: draft.romaji.trim().to_string(),
        meaning: draft.meaning.trim().to_string(),
        category: draft.category,
        tags: draft
            .tags
            .iter()
            .map(|tag| tag.trim())
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect(),
    };
    if draft.japanese.is_empty() {
        return Err(VocabularyError::MissingField("japanese"));
    }
    if draft.meaning.is_empty() {
        return Err(VocabularyError::MissingField("meaning"));
    }
    Ok(draft)
}

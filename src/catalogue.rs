// Kana catalogue loading
//
// The catalogue is a JSON array of `{id, kana: {hiragana, katakana}, answer}`
// records. A 46-entry gojūon deck is compiled into the binary; an external
// file can replace it.

use crate::models::{KanaItem, KanaRow};
use camino::Utf8Path;
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use thiserror::Error;

const BUILTIN_CATALOGUE: &str = include_str!("../assets/kana.json");

/// Errors raised while loading a catalogue
#[derive(Error, Debug)]
pub enum CatalogueError {
    #[error("Failed to read catalogue {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalogue: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate kana id in catalogue: {0}")]
    DuplicateId(String),

    #[error("Catalogue entry {0} has an empty field")]
    IncompleteEntry(String),
}

#[derive(Debug, Deserialize)]
struct CatalogueRecord {
    id: String,
    kana: CatalogueGlyphs,
    answer: String,
}

#[derive(Debug, Deserialize)]
struct CatalogueGlyphs {
    hiragana: String,
    katakana: String,
}

impl From<CatalogueRecord> for KanaItem {
    fn from(record: CatalogueRecord) -> Self {
        KanaItem {
            id: record.id,
            hiragana: record.kana.hiragana,
            katakana: record.kana.katakana,
            romaji: record.answer,
        }
    }
}

/// Ordered, immutable collection of learnable kana.
///
/// Ids are unique across the deck.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deck {
    items: Vec<KanaItem>,
}

impl Deck {
    /// Build a deck, rejecting duplicate ids and blank fields
    pub fn new(items: Vec<KanaItem>) -> Result<Self, CatalogueError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if item.id.trim().is_empty()
                || item.romaji.trim().is_empty()
                || (item.hiragana.is_empty() && item.katakana.is_empty())
            {
                return Err(CatalogueError::IncompleteEntry(item.id.clone()));
            }
            if !seen.insert(item.id.as_str()) {
                return Err(CatalogueError::DuplicateId(item.id.clone()));
            }
        }
        Ok(Self { items })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a deck from catalogue JSON
    pub fn from_json(json: &str) -> Result<Self, CatalogueError> {
        let records: Vec<CatalogueRecord> = serde_json::from_str(json)?;
        Self::new(records.into_iter().map(KanaItem::from).collect())
    }

    /// The compiled-in gojūon deck
    pub fn builtin() -> Result<Self, CatalogueError> {
        Self::from_json(BUILTIN_CATALOGUE)
    }

    pub fn load_from_path(path: &Utf8Path) -> Result<Self, CatalogueError> {
        let json = fs::read_to_string(path).map_err(|source| CatalogueError::Io {
            path: path.to_string(),
            source,
        })?;
        let deck = Self::from_json(&json)?;
        tracing::info!("Loaded {} kana from {}", deck.len(), path);
        Ok(deck)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&KanaItem> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[KanaItem] {
        &self.items
    }

    pub fn find(&self, id: &str) -> Option<&KanaItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Items grouped into gojūon rows, in row order; empty rows are omitted
    pub fn rows(&self) -> IndexMap<KanaRow, Vec<&KanaItem>> {
        let mut rows: IndexMap<KanaRow, Vec<&KanaItem>> =
            KanaRow::ALL.into_iter().map(|row| (row, Vec::new())).collect();
        for item in &self.items {
            match KanaRow::of(item) {
                Some(row) => rows.entry(row).or_default().push(item),
                None => tracing::debug!("Kana {} does not belong to a gojūon row", item.id),
            }
        }
        rows.retain(|_, items| !items.is_empty());
        rows
    }
}

/// Result of loading the catalogue for the application.
///
/// Loading never fails outright: on error the deck is empty and `alert`
/// carries a message for the user.
#[derive(Debug)]
pub struct CatalogueLoad {
    pub deck: Deck,
    pub alert: Option<String>,
}

/// Load the configured catalogue, falling back to an empty deck on failure
pub fn load_catalogue(path: Option<&Utf8Path>) -> CatalogueLoad {
    let result = match path {
        Some(path) => Deck::load_from_path(path),
        None => Deck::builtin(),
    };

    match result {
        Ok(deck) => CatalogueLoad { deck, alert: None },
        Err(e) => {
            tracing::error!("Failed to load kana catalogue: {}", e);
            CatalogueLoad {
                deck: Deck::empty(),
                alert: Some(format!("Unable to load kana data: {e}")),
            }
        }
    }
}

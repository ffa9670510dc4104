use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Notebook categories offered when adding a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    #[default]
    DailyLife,
    Work,
    Travel,
    Food,
    Shopping,
    Transport,
    Study,
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::DailyLife,
        Category::Work,
        Category::Travel,
        Category::Food,
        Category::Shopping,
        Category::Transport,
        Category::Study,
        Category::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::DailyLife => "daily life",
            Category::Work => "work",
            Category::Travel => "travel",
            Category::Food => "food",
            Category::Shopping => "shopping",
            Category::Transport => "transport",
            Category::Study => "study",
            Category::Other => "other",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(['-', '_'], " ");
        Category::ALL
            .into_iter()
            .find(|c| c.label() == wanted)
            .ok_or_else(|| format!("unknown category: {}", s.trim()))
    }
}

/// A word in the learner's personal notebook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyItem {
    pub id: String,
    pub japanese: String,
    #[serde(default)]
    pub kana: String,
    #[serde(default)]
    pub romaji: String,
    pub meaning: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_reviewed: DateTime<Utc>,
    #[serde(default)]
    pub review_count: u32,
}

/// User-entered fields for a new notebook entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VocabularyDraft {
    pub japanese: String,
    pub kana: String,
    pub romaji: String,
    pub meaning: String,
    pub category: Category,
    pub tags: Vec<String>,
}

impl VocabularyItem {
    /// Case-insensitive substring match over every text field and tag
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [&self.japanese, &self.kana, &self.romaji, &self.meaning]
            .into_iter()
            .any(|field| field.to_lowercase().contains(&needle))
            || self.tags.iter().any(|tag| tag.to_lowercase().contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> VocabularyItem {
        let now = Utc::now();
        VocabularyItem {
            id: "1".to_string(),
            japanese: "ありがとう".to_string(),
            kana: "ありがとう".to_string(),
            romaji: "arigatou".to_string(),
            meaning: "thank you".to_string(),
            category: Category::DailyLife,
            tags: vec!["Greeting".to_string()],
            created_at: now,
            last_reviewed: now,
            review_count: 0,
        }
    }

    #[test]
    fn test_matches_any_field() {
        let word = item();
        assert!(word.matches("ARIGA"));
        assert!(word.matches("thank"));
        assert!(word.matches("greet"));
        assert!(word.matches("がと"));
        assert!(word.matches("   "));
        assert!(!word.matches("sumimasen"));
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("daily-life".parse::<Category>(), Ok(Category::DailyLife));
        assert_eq!("Food".parse::<Category>(), Ok(Category::Food));
        assert!("weather".parse::<Category>().is_err());
    }
}

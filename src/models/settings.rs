use super::kana::KanaType;
use serde::{Deserialize, Serialize};

/// How the flashcard "next" action picks the following card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NavigationMode {
    #[default]
    Sequential,
    Random,
}

impl NavigationMode {
    pub fn toggled(self) -> Self {
        match self {
            NavigationMode::Sequential => NavigationMode::Random,
            NavigationMode::Random => NavigationMode::Sequential,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NavigationMode::Sequential => "sequential",
            NavigationMode::Random => "random",
        }
    }
}

/// Global learner preferences, persisted under the `settings` key.
///
/// Field names serialize in camelCase; fields missing from an older blob
/// take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    #[serde(default)]
    pub learning_mode: NavigationMode,

    #[serde(default)]
    pub default_kana_type: KanaType,

    #[serde(default = "default_true")]
    pub show_romaji_hint: bool,

    #[serde(default)]
    pub auto_play_pronunciation: bool,

    #[serde(default = "default_quiz_question_count")]
    pub quiz_question_count: usize,

    #[serde(default = "default_auto_advance_delay_ms")]
    pub auto_advance_delay_ms: u64,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            learning_mode: NavigationMode::Sequential,
            default_kana_type: KanaType::Mixed,
            show_romaji_hint: true,
            auto_play_pronunciation: false,
            quiz_question_count: default_quiz_question_count(),
            auto_advance_delay_ms: default_auto_advance_delay_ms(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_quiz_question_count() -> usize {
    10
}

fn default_auto_advance_delay_ms() -> u64 {
    1000
}

/// Partial update applied on top of the current settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub learning_mode: Option<NavigationMode>,
    pub default_kana_type: Option<KanaType>,
    pub show_romaji_hint: Option<bool>,
    pub auto_play_pronunciation: Option<bool>,
    pub quiz_question_count: Option<usize>,
    pub auto_advance_delay_ms: Option<u64>,
}

impl GlobalSettings {
    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(mode) = patch.learning_mode {
            self.learning_mode = mode;
        }
        if let Some(kana_type) = patch.default_kana_type {
            self.default_kana_type = kana_type;
        }
        if let Some(hint) = patch.show_romaji_hint {
            self.show_romaji_hint = hint;
        }
        if let Some(auto_play) = patch.auto_play_pronunciation {
            self.auto_play_pronunciation = auto_play;
        }
        if let Some(count) = patch.quiz_question_count {
            self.quiz_question_count = count;
        }
        if let Some(delay) = patch.auto_advance_delay_ms {
            self.auto_advance_delay_ms = delay;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = GlobalSettings::default();
        assert_eq!(settings.learning_mode, NavigationMode::Sequential);
        assert_eq!(settings.default_kana_type, KanaType::Mixed);
        assert!(settings.show_romaji_hint);
        assert!(!settings.auto_play_pronunciation);
        assert_eq!(settings.quiz_question_count, 10);
        assert_eq!(settings.auto_advance_delay_ms, 1000);
    }

    #[test]
    fn test_apply_patch_only_touches_given_fields() {
        let mut settings = GlobalSettings::default();
        settings.apply(&SettingsPatch {
            quiz_question_count: Some(20),
            show_romaji_hint: Some(false),
            ..Default::default()
        });

        assert_eq!(settings.quiz_question_count, 20);
        assert!(!settings.show_romaji_hint);
        assert_eq!(settings.learning_mode, NavigationMode::Sequential);
        assert_eq!(settings.default_kana_type, KanaType::Mixed);
    }

    #[test]
    fn test_deserialize_blob_without_new_fields() {
        let blob = r#"{"learningMode":"random","defaultKanaType":"katakana","showRomajiHint":false,"autoPlayPronunciation":true,"quizQuestionCount":5}"#;
        let settings: GlobalSettings = serde_json::from_str(blob).unwrap();

        assert_eq!(settings.learning_mode, NavigationMode::Random);
        assert_eq!(settings.default_kana_type, KanaType::Katakana);
        assert_eq!(settings.quiz_question_count, 5);
        assert_eq!(settings.auto_advance_delay_ms, 1000);
    }

    #[test]
    fn test_navigation_mode_toggle() {
        assert_eq!(NavigationMode::Sequential.toggled(), NavigationMode::Random);
        assert_eq!(NavigationMode::Random.toggled(), NavigationMode::Sequential);
    }
}

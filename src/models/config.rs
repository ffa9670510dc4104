use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Application configuration from kanalearn.yaml (overridable via `KANALEARN_*`)
///
/// Contains directories, the optional catalogue override and collaborator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: Utf8PathBuf,

    #[serde(default = "default_log_dir")]
    pub log_dir: Utf8PathBuf,

    #[serde(default)]
    pub debug: bool,

    #[serde(default)]
    pub log_format: LogFormat,

    /// External catalogue file; the built-in gojūon deck is used when unset
    #[serde(default)]
    pub catalogue_path: Option<Utf8PathBuf>,

    #[serde(default)]
    pub speech: SpeechConfig,

    #[serde(default)]
    pub quiz: QuizConfig,
}

/// Log file encoding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Text-to-speech collaborator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Program invoked per utterance, e.g. `espeak-ng`; speech is disabled when unset
    #[serde(default)]
    pub command: Option<String>,

    /// Arguments placed before the text. `{language}`, `{rate}` and `{pitch}` are substituted.
    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_rate")]
    pub rate: f32,

    #[serde(default = "default_pitch")]
    pub pitch: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizConfig {
    #[serde(default = "default_auto_advance")]
    pub auto_advance: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_dir: default_log_dir(),
            debug: false,
            log_format: LogFormat::Text,
            catalogue_path: None,
            speech: SpeechConfig::default(),
            quiz: QuizConfig::default(),
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            language: default_language(),
            rate: default_rate(),
            pitch: default_pitch(),
        }
    }
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            auto_advance: default_auto_advance(),
        }
    }
}

fn default_data_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("data")
}

fn default_log_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("logs")
}

fn default_language() -> String {
    "ja-JP".to_string()
}

fn default_rate() -> f32 {
    0.5
}

fn default_pitch() -> f32 {
    1.0
}

fn default_auto_advance() -> bool {
    true
}

impl SpeechConfig {
    /// Expand the argument template for one utterance; the text is always the last argument
    pub fn command_args(&self, text: &str) -> Vec<String> {
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|arg| {
                arg.replace("{language}", &self.language)
                    .replace("{rate}", &self.rate.to_string())
                    .replace("{pitch}", &self.pitch.to_string())
            })
            .collect();
        args.push(text.to_string());
        args
    }
}

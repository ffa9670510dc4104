use rand::Rng;
use serde::{Deserialize, Serialize};

/// A single learnable kana with both script renderings and its romaji reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KanaItem {
    pub id: String,
    pub hiragana: String,
    pub katakana: String,
    pub romaji: String,
}

impl KanaItem {
    pub fn new(
        id: impl Into<String>,
        hiragana: impl Into<String>,
        katakana: impl Into<String>,
        romaji: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            hiragana: hiragana.into(),
            katakana: katakana.into(),
            romaji: romaji.into(),
        }
    }

    /// Rendering of this kana in the given script
    pub fn glyph(&self, script: Script) -> &str {
        match script {
            Script::Hiragana => &self.hiragana,
            Script::Katakana => &self.katakana,
        }
    }

    /// Check a typed answer against the romaji.
    ///
    /// Surrounding whitespace is ignored and the comparison is case-insensitive.
    pub fn matches_answer(&self, input: &str) -> bool {
        input.trim().to_lowercase() == self.romaji.trim().to_lowercase()
    }
}

/// One of the two concrete syllabaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Script {
    Hiragana,
    Katakana,
}

/// Which script(s) a session draws from.
///
/// `Mixed` picks hiragana or katakana with equal probability each time a new
/// card becomes current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KanaType {
    Hiragana,
    Katakana,
    #[default]
    Mixed,
}

impl KanaType {
    /// Pick the script to show for the next card
    pub fn pick_script<R: Rng + ?Sized>(self, rng: &mut R) -> Script {
        match self {
            KanaType::Hiragana => Script::Hiragana,
            KanaType::Katakana => Script::Katakana,
            KanaType::Mixed => {
                if rng.gen_bool(0.5) {
                    Script::Hiragana
                } else {
                    Script::Katakana
                }
            }
        }
    }

    /// Next type in the settings rotation: hiragana → katakana → mixed → hiragana
    pub fn cycle(self) -> Self {
        match self {
            KanaType::Hiragana => KanaType::Katakana,
            KanaType::Katakana => KanaType::Mixed,
            KanaType::Mixed => KanaType::Hiragana,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            KanaType::Hiragana => "hiragana",
            KanaType::Katakana => "katakana",
            KanaType::Mixed => "mixed",
        }
    }
}

impl std::str::FromStr for KanaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hiragana" | "h" => Ok(KanaType::Hiragana),
            "katakana" | "k" => Ok(KanaType::Katakana),
            "mixed" | "m" => Ok(KanaType::Mixed),
            other => Err(format!("unknown kana type: {other}")),
        }
    }
}

/// Traditional gojūon rows used by the list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KanaRow {
    Vowels,
    K,
    S,
    T,
    N,
    H,
    M,
    Y,
    R,
    W,
    SyllabicN,
}

impl KanaRow {
    pub const ALL: [KanaRow; 11] = [
        KanaRow::Vowels,
        KanaRow::K,
        KanaRow::S,
        KanaRow::T,
        KanaRow::N,
        KanaRow::H,
        KanaRow::M,
        KanaRow::Y,
        KanaRow::R,
        KanaRow::W,
        KanaRow::SyllabicN,
    ];

    /// Row of a kana, derived from its hiragana rendering.
    ///
    /// Romaji ids are not reliable for this ("chi", "tsu", "fu" sit in the
    /// t and h rows), so the first hiragana character decides.
    pub fn of(item: &KanaItem) -> Option<KanaRow> {
        let first = item.hiragana.chars().next()?;
        let row = match first {
            'あ' | 'い' | 'う' | 'え' | 'お' => KanaRow::Vowels,
            'か' | 'き' | 'く' | 'け' | 'こ' => KanaRow::K,
            'さ' | 'し' | 'す' | 'せ' | 'そ' => KanaRow::S,
            'た' | 'ち' | 'つ' | 'て' | 'と' => KanaRow::T,
            'な' | 'に' | 'ぬ' | 'ね' | 'の' => KanaRow::N,
            'は' | 'ひ' | 'ふ' | 'へ' | 'ほ' => KanaRow::H,
            'ま' | 'み' | 'む' | 'め' | 'も' => KanaRow::M,
            'や' | 'ゆ' | 'よ' => KanaRow::Y,
            'ら' | 'り' | 'る' | 'れ' | 'ろ' => KanaRow::R,
            'わ' | 'を' => KanaRow::W,
            'ん' => KanaRow::SyllabicN,
            _ => return None,
        };
        Some(row)
    }

    pub fn title(self) -> &'static str {
        match self {
            KanaRow::Vowels => "あ行 (vowels)",
            KanaRow::K => "か行 (K)",
            KanaRow::S => "さ行 (S)",
            KanaRow::T => "た行 (T)",
            KanaRow::N => "な行 (N)",
            KanaRow::H => "は行 (H)",
            KanaRow::M => "ま行 (M)",
            KanaRow::Y => "や行 (Y)",
            KanaRow::R => "ら行 (R)",
            KanaRow::W => "わ行 (W)",
            KanaRow::SyllabicN => "ん",
        }
    }
}

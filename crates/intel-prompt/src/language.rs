//! Report language selection

use crate::PromptError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Language the generated narratives are written in
///
/// # Examples
///
/// ```
/// use intel_prompt::Language;
///
/// assert_eq!("ja".parse::<Language>().unwrap(), Language::Japanese);
/// assert_eq!(Language::Japanese.code(), "ja");
/// assert!("fr".parse::<Language>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Japanese,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::English, Language::Japanese];

    /// ISO 639-1 code
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Japanese => "ja",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Japanese => "Japanese",
        }
    }
}

impl FromStr for Language {
    type Err = PromptError;

    /// Accepts the ISO code or English name in any case, plus `jp` and `日本語`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|lang| {
                wanted.eq_ignore_ascii_case(lang.code()) || wanted.eq_ignore_ascii_case(lang.name())
            })
            .or_else(|| {
                (wanted.eq_ignore_ascii_case("jp") || wanted == "日本語").then_some(Language::Japanese)
            })
            .ok_or_else(|| PromptError::UnsupportedLanguage(s.to_string()))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

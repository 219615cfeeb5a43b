//! Bilingual MiniJinja prompt templates

use crate::{Language, PromptError, Result};
use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;

/// A named prompt with an English source and an optional Japanese variant
///
/// English is the fallback for any language without its own variant.
/// Variables use Jinja syntax (`{{ title }}`, `{% for a in articles %}`);
/// referencing a variable the caller did not supply is a render error.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    name: String,
    english: String,
    japanese: Option<String>,
}

impl PromptTemplate {
    /// English-only template
    pub fn new(name: impl Into<String>, english: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let english = english.into();
        if english.trim().is_empty() {
            return Err(PromptError::Empty(name));
        }
        check_syntax(&name, Language::English, &english)?;

        Ok(Self {
            name,
            english,
            japanese: None,
        })
    }

    pub fn bilingual(
        name: impl Into<String>,
        english: impl Into<String>,
        japanese: impl Into<String>,
    ) -> Result<Self> {
        Self::new(name, english)?.with_japanese(japanese)
    }

    pub fn with_japanese(mut self, japanese: impl Into<String>) -> Result<Self> {
        let japanese = japanese.into();
        check_syntax(&self.name, Language::Japanese, &japanese)?;
        self.japanese = Some(japanese);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_variant(&self, lang: Language) -> bool {
        match lang {
            Language::English => true,
            Language::Japanese => self.japanese.is_some(),
        }
    }

    /// The language actually rendered for `lang`, with its source
    pub fn source_for(&self, lang: Language) -> (Language, &str) {
        match (lang, &self.japanese) {
            (Language::Japanese, Some(source)) => (Language::Japanese, source),
            _ => (Language::English, &self.english),
        }
    }

    /// Render for `lang`, falling back to English
    pub fn render<S: Serialize>(&self, lang: Language, vars: &S) -> Result<String> {
        let (_, source) = self.source_for(lang);
        environment()
            .render_str(source, vars)
            .map_err(|e| PromptError::Render {
                name: self.name.clone(),
                detail: e.to_string(),
            })
    }
}

fn environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env
}

fn check_syntax(name: &str, language: Language, source: &str) -> Result<()> {
    environment()
        .template_from_str(source)
        .map(|_| ())
        .map_err(|e| PromptError::Syntax {
            name: name.to_string(),
            language,
            detail: e.to_string(),
        })
}

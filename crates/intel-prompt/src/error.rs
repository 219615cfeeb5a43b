//! Prompt errors

use crate::Language;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PromptError>;

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Prompt '{name}' ({language}) does not parse: {detail}")]
    Syntax {
        name: String,
        language: Language,
        detail: String,
    },

    #[error("Prompt '{name}' failed to render: {detail}")]
    Render { name: String, detail: String },

    #[error("Prompt '{0}' has no English text")]
    Empty(String),

    #[error("Unsupported language '{0}' (expected en or ja)")]
    UnsupportedLanguage(String),
}

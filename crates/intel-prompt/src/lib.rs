//! Prompt templates for market-intel
//!
//! Each prompt is a [`PromptTemplate`]: English source, optional Japanese
//! variant, rendered with MiniJinja for the report [`Language`].
//!
//! ```
//! use intel_prompt::{Language, PromptTemplate};
//! use serde_json::json;
//!
//! let template = PromptTemplate::bilingual(
//!     "headline",
//!     "Summarize: {{ title }}",
//!     "要約してください: {{ title }}",
//! ).unwrap();
//!
//! let ja = template.render(Language::Japanese, &json!({ "title": "日銀" })).unwrap();
//! assert_eq!(ja, "要約してください: 日銀");
//! ```

pub mod error;
pub mod language;
pub mod template;

pub use error::{PromptError, Result};
pub use language::Language;
pub use template::PromptTemplate;

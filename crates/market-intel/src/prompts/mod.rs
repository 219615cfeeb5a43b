//! Narrator prompt templates
//!
//! Templates are organized into:
//! - `system`: personas sent as the system prompt
//! - `user`: request bodies rendered per call

mod system;
mod user;

pub use system::*;
pub use user::*;

use intel_prompt::{PromptTemplate, Language, Result};

/// A system/user template pair for one kind of request
#[derive(Debug)]
pub struct PromptPair {
    pub system: PromptTemplate,
    pub user: PromptTemplate,
}

impl PromptPair {
    /// Render both halves for `lang`; the system half takes no variables
    pub fn render(&self, lang: Language, vars: &serde_json::Value) -> Result<(String, String)> {
        let system = self.system.render(lang, &serde_json::json!({}))?;
        let user = self.user.render(lang, vars)?;
        Ok((system, user))
    }
}

/// All templates the narrator uses, compiled once per run
#[derive(Debug)]
pub struct PromptSet {
    pub item: PromptPair,
    pub daily_summary: PromptPair,
    pub outlook: PromptPair,
}

impl PromptSet {
    pub fn load() -> Result<Self> {
        Ok(Self {
            item: PromptPair {
                system: news_editor()?,
                user: summarize_item_prompt()?,
            },
            daily_summary: PromptPair {
                system: market_analyst()?,
                user: daily_summary_prompt()?,
            },
            outlook: PromptPair {
                system: outlook_analyst()?,
                user: outlook_prompt()?,
            },
        })
    }
}

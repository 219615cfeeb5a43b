//! System prompts for the narrator

use intel_prompt::{PromptTemplate, Result};

/// Persona for per-article summaries
pub fn news_editor() -> Result<PromptTemplate> {
    PromptTemplate::bilingual(
        "intel.system.news_editor",
        "You are a financial and economic news expert. Summarize market news concisely and make its impact on markets explicit.",
        "あなたは金融・経済の専門家です。マーケットニュースを簡潔に要約し、市場への影響を明確に示してください。\n\n**すべて日本語で回答してください。**",
    )
}

/// Persona for the daily market summary
pub fn market_analyst() -> Result<PromptTemplate> {
    PromptTemplate::bilingual(
        "intel.system.market_analyst",
        "You are a professional financial and economic analyst. Summarize market developments concisely and give investors useful insight.",
        "あなたは金融・経済の専門アナリストです。市場動向を簡潔にまとめ、投資家に有用な洞察を提供してください。\n\n**すべて日本語で回答してください。**",
    )
}

/// Persona for the economic outlook
pub fn outlook_analyst() -> Result<PromptTemplate> {
    PromptTemplate::bilingual(
        "intel.system.outlook_analyst",
        "You are a professional financial and economic analyst. Use economic indicators and news to reason about the outlook.",
        "あなたは金融・経済の専門アナリストです。経済指標とニュースをもとに今後の見通しを考察してください。\n\n**すべて日本語で回答してください。**",
    )
}

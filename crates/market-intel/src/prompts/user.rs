//! User message templates for the narrator

use intel_prompt::{PromptTemplate, Result};

/// Per-article summary request
///
/// Variables: `title`, `body`
pub fn summarize_item_prompt() -> Result<PromptTemplate> {
    PromptTemplate::bilingual(
        "intel.user.summarize_item",
        r"Summarize the following market news article, focusing on its impact on markets.

Title: {{ title }}

Article:
{{ body }}

Requirements:
1. State the market impact clearly
2. Include important figures or indicators if present
3. Be concise and easy to read
4. 3-5 sentences

Summary:",
        r"以下のマーケットニュース記事を、マーケットに与える影響に焦点を当てて要約してください。

タイトル: {{ title }}

記事内容:
{{ body }}

要約の要件:
1. マーケットへの影響を明確に示す
2. 重要な数値や指標があれば含める
3. 簡潔で分かりやすい日本語で
4. 3-5文程度の長さ

要約:",
    )
}

/// Daily market summary over already-narrated articles
///
/// Variables: `articles` (list of `{title, narrative}`)
pub fn daily_summary_prompt() -> Result<PromptTemplate> {
    PromptTemplate::bilingual(
        "intel.user.daily_summary",
        r"Using the following market news summaries, describe today's market developments.

Today's key news:
{% for a in articles %}{{ loop.index }}. {{ a.title }}
   Summary: {{ a.narrative }}

{% endfor %}
Requirements:
1. Capture the overall market direction
2. Identify the most important drivers
3. Include implications for investors
4. 3-4 paragraphs

Today's market summary:",
        r"以下のマーケットニュースの要約を基に、本日の市場動向を簡潔にまとめてください。

本日の主要ニュース:
{% for a in articles %}{{ loop.index }}. {{ a.title }}
   要約: {{ a.narrative }}

{% endfor %}
要件:
1. 市場全体の動向を把握
2. 最も重要な影響要因を特定
3. 投資家への示唆を含める
4. 3-4段落程度の長さ
5. 分かりやすい日本語で

本日の市場動向サマリー:",
    )
}

/// Economic outlook request
///
/// Variables: `news_summary`, `indicators` (list of `{name, value, date}`)
pub fn outlook_prompt() -> Result<PromptTemplate> {
    PromptTemplate::bilingual(
        "intel.user.outlook",
        r"Based on the information below, discuss the outlook for economic indicators and the likely impact on markets.

[News summary]
{{ news_summary }}

[Latest economic indicators]
{% for i in indicators %}- {{ i.name }}: {{ i.value }} ({{ i.date }})
{% else %}- No indicator data available
{% endfor %}
Requirements:
- Summarize the key factors concisely
- State the market impact clearly
- Include takeaways investors can use
- 3-5 paragraphs

Outlook:",
        r"以下の情報をもとに、今後の経済指標の見通しと市場への影響を考察してください。

【ニュース要約】
{{ news_summary }}

【経済指標の実績データ】
{% for i in indicators %}- {{ i.name }}: {{ i.value }}（{{ i.date }}）
{% else %}- 指標データなし
{% endfor %}
要件：
- 重要な要素を簡潔にまとめる
- 市場へのインパクトを明確に述べる
- 投資家が参考にできる示唆を含める
- 3-5段落程度、日本語で

考察：",
    )
}

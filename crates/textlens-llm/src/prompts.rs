//! Fixed system instructions, one per analysis kind
//!
//! Each instruction spells out the exact JSON shape the normalizer expects.
//! Wording is vendor-facing and may differ per provider; the shapes may not.

use textlens_core::{AnalysisKind, ProviderKind};

pub const TIMELINE_PROMPT: &str = "You are a helpful assistant that analyzes text and extracts events in chronological order. Return the response in this exact JSON format: [{\"title\": \"Event Title\", \"description\": \"Detailed description\", \"timestamp\": \"Time reference\"}]";

/// Mistral tends to answer tersely and chat around the payload.
pub const MISTRAL_TIMELINE_PROMPT: &str = "You are a helpful assistant that analyzes text and extracts events in chronological order. Provide a detailed description of each event in no less than 100 words. Return ONLY a JSON array in this format, with no additional text: [{\"title\": \"Event Title\", \"description\": \"Detailed description\", \"timestamp\": \"Time reference\"}]";

pub const INSIGHTS_PROMPT: &str = r#"You are an analyst that extracts key insights from text. Analyze the text and present insights in chronological order (earliest to latest). For each main category, provide subcategories with specific insights, opportunities, and challenges. Return the response in this EXACT format with no additional text or markdown: {"insights":[{"category":"Category Name","timestamp":"YYYY-MM-DD","subcategories":[{"title":"Subcategory Name","insights":["Insight 1","Insight 2"],"opportunities":["Opportunity 1","Opportunity 2"],"challenges":["Challenge 1","Challenge 2"]}]}]}"#;

pub const FINANCIAL_PROMPT: &str = r#"You are a financial analyst that extracts key financial information from text, with special focus on transaction values and monetary amounts. Present all information in chronological order (earliest to latest). Analyze the text and return information in these categories:
1. Transactions: All monetary transactions with their values, dates, and parties involved
2. Financial Metrics: Key financial indicators, ratios, or performance metrics
3. Assets & Liabilities: Any mentioned assets, debts, or financial obligations
4. Financial Context: Important financial context or market conditions

Return ONLY a JSON array in this format with no additional text or markdown:
[{
  "category": "Category Name",
  "items": [{
    "metric": "Transaction/Metric Name",
    "value": "Monetary Amount/Value",
    "timestamp": "YYYY-MM-DD",
    "period": "Time Period",
    "parties": ["Party 1", "Party 2"],
    "type": "transaction/metric/asset/liability",
    "notes": "Additional Context"
  }]
}]"#;

pub const PARTY_PROMPT: &str = r#"You are an analyst that extracts information about different parties (people, organizations, groups) mentioned in the text. For each party, analyze their objectives, any mishaps/setbacks they encountered, and their results/outcomes. Present the analysis in chronological order. Return the response in this EXACT format with no additional text or markdown:
{
  "parties": [{
    "name": "Party Name",
    "type": "person/organization/group",
    "timestamp": "YYYY-MM-DD",
    "objectives": ["Objective 1", "Objective 2"],
    "mishaps": ["Mishap/Setback 1", "Mishap/Setback 2"],
    "results": ["Result/Outcome 1", "Result/Outcome 2"]
  }]
}"#;

pub fn system_prompt(provider: ProviderKind, kind: AnalysisKind) -> &'static str {
    match (provider, kind) {
        (ProviderKind::Mistral, AnalysisKind::Timeline) => MISTRAL_TIMELINE_PROMPT,
        (_, AnalysisKind::Timeline) => TIMELINE_PROMPT,
        (_, AnalysisKind::Insights) => INSIGHTS_PROMPT,
        (_, AnalysisKind::Financial) => FINANCIAL_PROMPT,
        (_, AnalysisKind::Party) => PARTY_PROMPT,
    }
}

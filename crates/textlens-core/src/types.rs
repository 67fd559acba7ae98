//! Core types for Textlens

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Which analysis to run: selects the prompt and the expected schema.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    Timeline,
    Insights,
    Financial,
    Party,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 4] = [
        AnalysisKind::Timeline,
        AnalysisKind::Insights,
        AnalysisKind::Financial,
        AnalysisKind::Party,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::Timeline => "timeline",
            AnalysisKind::Insights => "insights",
            AnalysisKind::Financial => "financial",
            AnalysisKind::Party => "party",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "timeline" => Ok(AnalysisKind::Timeline),
            "insights" | "insight" => Ok(AnalysisKind::Insights),
            "financial" | "financials" => Ok(AnalysisKind::Financial),
            "party" | "parties" => Ok(AnalysisKind::Party),
            other => Err(format!("unknown analysis kind: {}", other)),
        }
    }
}

/// LLM vendor behind a provider adapter
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    OpenAi,
    Mistral,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Mistral => "mistral",
        }
    }

    /// Environment variable holding the vendor's API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Mistral => "MISTRAL_API_KEY",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" | "open-ai" | "gpt" => Ok(ProviderKind::OpenAi),
            "mistral" => Ok(ProviderKind::Mistral),
            other => Err(format!("unknown provider: {}", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

/// One event of a timeline. The timestamp is a free-form time reference.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: String,
}

// ---------------------------------------------------------------------------
// Insights
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightsReport {
    #[serde(default, deserialize_with = "null_as_default")]
    pub insights: Vec<InsightCategory>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightCategory {
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: String,
    #[serde(
        default,
        deserialize_with = "lenient_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subcategories: Vec<InsightSubcategory>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightSubcategory {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub insights: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub opportunities: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub challenges: Vec<String>,
}

// ---------------------------------------------------------------------------
// Financial
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialCategory {
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<FinancialItem>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialItem {
    #[serde(default, deserialize_with = "lenient_string")]
    pub metric: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub value: String,
    #[serde(
        default,
        deserialize_with = "lenient_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub period: String,
    #[serde(
        default,
        deserialize_with = "lenient_optional_string_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub parties: Option<Vec<String>>,
    #[serde(rename = "type", default)]
    pub item_type: FinancialItemType,
    #[serde(default, deserialize_with = "lenient_string")]
    pub notes: String,
}

/// Missing or unrecognized types read as `Metric`.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FinancialItemType {
    Transaction,
    #[default]
    Metric,
    Asset,
    Liability,
}

impl FinancialItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinancialItemType::Transaction => "transaction",
            FinancialItemType::Metric => "metric",
            FinancialItemType::Asset => "asset",
            FinancialItemType::Liability => "liability",
        }
    }
}

impl FromStr for FinancialItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "transaction" => Ok(FinancialItemType::Transaction),
            "metric" => Ok(FinancialItemType::Metric),
            "asset" => Ok(FinancialItemType::Asset),
            "liability" => Ok(FinancialItemType::Liability),
            other => Err(format!(
                "unknown financial item type `{}`, expected transaction, metric, asset or liability",
                other
            )),
        }
    }
}

impl<'de> Deserialize<'de> for FinancialItemType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(loose_enum(Option::<Value>::deserialize(deserializer)?))
    }
}

// ---------------------------------------------------------------------------
// Parties
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyReport {
    #[serde(default, deserialize_with = "null_as_default")]
    pub parties: Vec<Party>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "type", default)]
    pub party_type: PartyType,
    #[serde(
        default,
        deserialize_with = "lenient_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub objectives: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub mishaps: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub results: Vec<String>,
}

/// Missing or unrecognized types read as `Group`.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyType {
    Person,
    Organization,
    #[default]
    Group,
}

impl PartyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartyType::Person => "person",
            PartyType::Organization => "organization",
            PartyType::Group => "group",
        }
    }
}

impl FromStr for PartyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "person" => Ok(PartyType::Person),
            "organization" | "organisation" => Ok(PartyType::Organization),
            "group" => Ok(PartyType::Group),
            other => Err(format!(
                "unknown party type `{}`, expected person, organization or group",
                other
            )),
        }
    }
}

impl<'de> Deserialize<'de> for PartyType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(loose_enum(Option::<Value>::deserialize(deserializer)?))
    }
}

// ---------------------------------------------------------------------------
// AnalysisResult
// ---------------------------------------------------------------------------

/// A normalized analysis of one kind.
///
/// Serializes to the canonical wire shape of its kind: a bare array for
/// timeline and financial, `{"insights": [...]}` and `{"parties": [...]}`
/// for the wrapped kinds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnalysisResult {
    Timeline(Vec<TimelineEvent>),
    Insights(Vec<InsightCategory>),
    Financial(Vec<FinancialCategory>),
    Parties(Vec<Party>),
}

impl AnalysisResult {
    pub fn empty(kind: AnalysisKind) -> Self {
        match kind {
            AnalysisKind::Timeline => AnalysisResult::Timeline(Vec::new()),
            AnalysisKind::Insights => AnalysisResult::Insights(Vec::new()),
            AnalysisKind::Financial => AnalysisResult::Financial(Vec::new()),
            AnalysisKind::Party => AnalysisResult::Parties(Vec::new()),
        }
    }

    pub fn kind(&self) -> AnalysisKind {
        match self {
            AnalysisResult::Timeline(_) => AnalysisKind::Timeline,
            AnalysisResult::Insights(_) => AnalysisKind::Insights,
            AnalysisResult::Financial(_) => AnalysisKind::Financial,
            AnalysisResult::Parties(_) => AnalysisKind::Party,
        }
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        match self {
            AnalysisResult::Timeline(v) => v.len(),
            AnalysisResult::Insights(v) => v.len(),
            AnalysisResult::Financial(v) => v.len(),
            AnalysisResult::Parties(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

impl Serialize for AnalysisResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Insights<'a> {
            insights: &'a [InsightCategory],
        }

        #[derive(Serialize)]
        struct Parties<'a> {
            parties: &'a [Party],
        }

        match self {
            AnalysisResult::Timeline(events) => events.serialize(serializer),
            AnalysisResult::Insights(insights) => Insights { insights }.serialize(serializer),
            AnalysisResult::Financial(categories) => categories.serialize(serializer),
            AnalysisResult::Parties(parties) => Parties { parties }.serialize(serializer),
        }
    }
}

// ---------------------------------------------------------------------------
// Lenient field deserializers
// ---------------------------------------------------------------------------

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Strings, with numbers and booleans stringified and `null` as empty.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    scalar_to_string(value).map_err(de::Error::custom)
}

fn lenient_optional_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => scalar_to_string(value).map(Some).map_err(de::Error::custom),
    }
}

fn lenient_string_list<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<String>, D::Error> {
    match Option::<Vec<Value>>::deserialize(deserializer)? {
        None => Ok(Vec::new()),
        Some(values) => values
            .into_iter()
            .map(scalar_to_string)
            .collect::<Result<_, _>>()
            .map_err(de::Error::custom),
    }
}

fn lenient_optional_string_list<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<String>>, D::Error> {
    match Option::<Vec<Value>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(values) => values
            .into_iter()
            .map(scalar_to_string)
            .collect::<Result<Vec<String>, _>>()
            .map(Some)
            .map_err(de::Error::custom),
    }
}

/// First recognized member of a possibly slash-joined value such as
/// `"transaction/metric"`; anything else is the type's default.
fn loose_enum<T: FromStr + Default>(value: Option<Value>) -> T {
    match value {
        Some(Value::String(raw)) => raw
            .split(|c| matches!(c, '/' | '|' | ','))
            .find_map(|part| part.parse().ok())
            .unwrap_or_default(),
        _ => T::default(),
    }
}

fn scalar_to_string(value: Value) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Null => Ok(String::new()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Array(_) => Err("expected a string, found an array".to_string()),
        Value::Object(_) => Err("expected a string, found an object".to_string()),
    }
}

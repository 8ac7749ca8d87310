use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub ok: bool,
    pub error: ErrorBody,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Post,
    Comment,
}

/// One post or comment by the analyzed user, exactly as the collector
/// produced it. `raw_text` is never mutated after collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityItem {
    pub id: String,
    pub kind: ItemKind,
    pub community: String,
    pub created_utc: i64,
    pub raw_text: Option<String>,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub permalink: Option<String>,
}

/// An `ActivityItem` with `normalized_text` populated.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedItem {
    pub id: String,
    pub kind: ItemKind,
    pub community: String,
    pub created_utc: i64,
    pub raw_text: String,
    pub normalized_text: String,
    pub score: i64,
    pub permalink: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    MissingRawText,
    EmptyAfterNormalization,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExcludedItem {
    pub id: String,
    pub reason: ExclusionReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, Serialize)]
pub struct SentimentResult {
    pub item_id: String,
    pub polarity: f64,
    pub subjectivity: f64,
    pub band: Band,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SentimentBreakdown {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentBreakdown {
    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EngagementEntry {
    pub community: String,
    pub item_count: usize,
    pub share: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterestKeyword {
    pub term: String,
    pub weight: f64,
    pub example_item_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PersonalityTrait {
    pub label: String,
    pub confidence: f64,
    pub evidence: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Citation {
    pub item_id: String,
    pub reference: String,
    pub excerpt: String,
}

#[derive(Serialize)]
pub struct AnalyzeOutcome {
    pub output: std::path::PathBuf,
    pub report: PersonaReport,
}

#[derive(Serialize)]
pub struct RuleCheckItem {
    pub label: String,
    pub status: String,
}

/// Fully assembled output of one analysis run. Purely derived from the
/// pipeline stages; serializing this is the structured form of the text
/// report, so a caller can re-render it without re-running analysis.
#[derive(Debug, Clone, Serialize)]
pub struct PersonaReport {
    pub username: String,
    pub generated_at: DateTime<Utc>,
    pub total_items: usize,
    pub excluded_items: usize,
    pub sentiment: SentimentBreakdown,
    pub engagement: Vec<EngagementEntry>,
    pub interests: Vec<InterestKeyword>,
    pub traits: Vec<PersonalityTrait>,
    pub citations: Vec<Citation>,
}

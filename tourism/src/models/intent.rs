use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Chat intents in taxonomy order. Ties between intents resolve to the earlier one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Booking,
    Information,
    Pricing,
    Complaint,
    Cancellation,
    Recommendation,
    Directions,
    Weather,
    Greeting,
    Goodbye,
    #[default]
    Unknown,
}

impl Intent {
    pub const TAXONOMY: [Intent; 10] = [
        Intent::Booking,
        Intent::Information,
        Intent::Pricing,
        Intent::Complaint,
        Intent::Cancellation,
        Intent::Recommendation,
        Intent::Directions,
        Intent::Weather,
        Intent::Greeting,
        Intent::Goodbye,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Booking => "booking",
            Self::Information => "information",
            Self::Pricing => "pricing",
            Self::Complaint => "complaint",
            Self::Cancellation => "cancellation",
            Self::Recommendation => "recommendation",
            Self::Directions => "directions",
            Self::Weather => "weather",
            Self::Greeting => "greeting",
            Self::Goodbye => "goodbye",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        if lowered == "unknown" {
            return Ok(Self::Unknown);
        }
        Self::TAXONOMY
            .iter()
            .copied()
            .find(|intent| intent.as_str() == lowered)
            .ok_or_else(|| format!("Unknown intent: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct IntentResult {
    pub intent: Intent,
    pub confidence: f64,
    pub matched_keywords: Vec<String>,
    pub matched_patterns: Vec<String>,
    pub all_scores: BTreeMap<String, f64>,
}

impl IntentResult {
    pub fn unknown(all_scores: BTreeMap<String, f64>) -> Self {
        Self {
            intent: Intent::Unknown,
            confidence: 0.0,
            matched_keywords: Vec::new(),
            matched_patterns: Vec::new(),
            all_scores,
        }
    }
}

/// Entity kind → extracted values. Kinds with no match are absent.
pub type Entities = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct IntentDetail {
    pub keywords_count: usize,
    pub patterns_count: usize,
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct IntentStatistics {
    pub total_intents: usize,
    pub intent_names: Vec<Intent>,
    pub intent_details: BTreeMap<String, IntentDetail>,
}

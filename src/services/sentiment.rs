use crate::domain::models::{
    Band, ExcludedItem, ExclusionReason, NormalizedItem, SentimentBreakdown, SentimentResult,
};
use crate::services::settings::SentimentThresholds;
use std::collections::{HashMap, HashSet};

/// Valence lexicon. Keyword heuristics only: fast, deterministic, and
/// identical output for identical text.
const LEXICON: &[(&str, f64)] = &[
    ("love", 3.2), ("loved", 2.9), ("loves", 2.7), ("great", 3.1),
    ("amazing", 3.4), ("awesome", 3.1), ("excellent", 3.2), ("fantastic", 3.3),
    ("wonderful", 3.0), ("good", 1.9), ("best", 3.2), ("better", 1.9),
    ("nice", 1.8), ("happy", 2.7), ("glad", 2.0), ("enjoy", 2.2),
    ("enjoyed", 2.3), ("fun", 2.3), ("beautiful", 2.9), ("stunning", 2.8),
    ("incredible", 3.0), ("perfect", 3.0), ("helpful", 1.9), ("helped", 1.7),
    ("helps", 1.6), ("thanks", 1.9), ("thank", 1.9), ("appreciate", 2.0),
    ("recommend", 1.7), ("solid", 1.5), ("smooth", 1.4), ("fast", 1.2),
    ("easy", 1.4), ("favorite", 2.3), ("impressive", 2.5), ("brilliant", 3.0),
    ("cool", 1.6), ("win", 1.8), ("won", 1.7), ("success", 2.2),
    ("useful", 1.8), ("interesting", 1.6), ("works", 1.1), ("worked", 1.2),
    ("agree", 1.5), ("correct", 1.3), ("improved", 1.7), ("improvement", 1.6),
    ("exciting", 2.4), ("excited", 2.4), ("superb", 3.1), ("versatile", 1.5),
    ("hate", -3.0), ("hated", -2.9), ("terrible", -3.1), ("awful", -3.0),
    ("horrible", -3.1), ("worst", -3.3), ("bad", -2.2), ("worse", -2.4),
    ("poor", -1.9), ("disappointing", -2.3), ("disappointed", -2.3),
    ("annoying", -2.1), ("broken", -1.9), ("breaks", -1.5), ("bug", -1.6),
    ("bugs", -1.7), ("buggy", -2.0), ("crash", -2.0), ("crashes", -2.0),
    ("fail", -2.1), ("failed", -2.0), ("fails", -1.9), ("failure", -2.2),
    ("problem", -1.5), ("problems", -1.6), ("issue", -1.2), ("issues", -1.3),
    ("wrong", -1.7), ("slow", -1.3), ("expensive", -1.1), ("overpriced", -1.9),
    ("overrated", -1.8), ("useless", -2.3), ("waste", -2.1), ("wasted", -2.1),
    ("garbage", -2.6), ("trash", -2.4), ("ugly", -1.9), ("boring", -1.8),
    ("stupid", -2.3), ("dumb", -2.1), ("ridiculous", -1.6),
    ("frustrating", -2.2), ("frustrated", -2.1), ("angry", -2.2),
    ("sad", -1.9), ("unfortunately", -1.3), ("disagree", -1.2),
    ("scam", -2.6), ("unreliable", -1.8), ("risky", -1.1),
    ("unpredictable", -1.0), ("difficult", -1.2), ("painful", -1.9),
    ("mess", -1.6), ("confusing", -1.4), ("lose", -1.3), ("losing", -1.4),
];

const NEGATORS: &[&str] = &[
    "not", "no", "never", "neither", "nor", "cannot", "without", "hardly",
    "barely", "don't", "doesn't", "didn't", "isn't", "wasn't", "aren't",
    "can't", "won't", "couldn't", "shouldn't", "wouldn't",
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.25), ("really", 1.2), ("extremely", 1.4), ("absolutely", 1.35),
    ("so", 1.15), ("totally", 1.25), ("incredibly", 1.4), ("super", 1.3),
    ("quite", 1.1), ("truly", 1.25), ("highly", 1.2),
];

/// Dampens the summed valence into [-1, 1]; small texts stay sensitive,
/// long rants saturate instead of growing without bound.
const NORMALIZATION_ALPHA: f64 = 15.0;

/// Sign flip applied under negation ("not good" reads as mildly bad, not
/// as the exact mirror of "good").
const NEGATION_FACTOR: f64 = -0.75;

#[derive(Debug, Clone, Copy)]
pub struct Polarity {
    pub polarity: f64,
    pub subjectivity: f64,
}

/// Lexicon sentiment scorer. Constructed once per run and passed into the
/// scoring stage; there is no process-wide scorer instance.
pub struct SentimentScorer {
    lexicon: HashMap<&'static str, f64>,
    negators: HashSet<&'static str>,
    intensifiers: HashMap<&'static str, f64>,
}

impl Default for SentimentScorer {
    fn default() -> Self {
        Self {
            lexicon: LEXICON.iter().copied().collect(),
            negators: NEGATORS.iter().copied().collect(),
            intensifiers: INTENSIFIERS.iter().copied().collect(),
        }
    }
}

impl SentimentScorer {
    /// Scores one normalized text. Returns `None` when there is nothing
    /// to score (no tokens), which callers treat as a per-item, non-fatal
    /// exclusion.
    pub fn score_text(&self, text: &str) -> Option<Polarity> {
        let tokens = word_tokens(text);
        if tokens.is_empty() {
            return None;
        }

        let mut total = 0.0;
        let mut hits = 0usize;
        for (i, token) in tokens.iter().enumerate() {
            let Some(&valence) = self.lexicon.get(token.as_str()) else {
                continue;
            };
            let mut v = valence;
            for back in 1..=2 {
                if back > i {
                    break;
                }
                let prev = tokens[i - back].as_str();
                if self.negators.contains(prev) {
                    v *= NEGATION_FACTOR;
                } else if let Some(&boost) = self.intensifiers.get(prev) {
                    v *= boost;
                }
            }
            total += v;
            hits += 1;
        }

        let polarity = total / (total * total + NORMALIZATION_ALPHA).sqrt();
        let subjectivity = (hits as f64 / tokens.len() as f64).clamp(0.0, 1.0);
        Some(Polarity {
            polarity,
            subjectivity,
        })
    }
}

/// Output of the scoring stage. `results` holds one entry per scored item
/// in input order; items that could not be scored land in `excluded`.
pub struct ScoredBatch {
    pub results: Vec<SentimentResult>,
    pub breakdown: SentimentBreakdown,
    pub excluded: Vec<ExcludedItem>,
}

pub fn score_items(
    scorer: &SentimentScorer,
    items: &[NormalizedItem],
    thresholds: &SentimentThresholds,
) -> ScoredBatch {
    let mut results = Vec::with_capacity(items.len());
    let mut breakdown = SentimentBreakdown::default();
    let mut excluded = Vec::new();

    for item in items {
        let Some(scored) = scorer.score_text(&item.normalized_text) else {
            excluded.push(ExcludedItem {
                id: item.id.clone(),
                reason: ExclusionReason::EmptyAfterNormalization,
            });
            continue;
        };
        let band = thresholds.band(scored.polarity);
        match band {
            Band::Positive => breakdown.positive += 1,
            Band::Neutral => breakdown.neutral += 1,
            Band::Negative => breakdown.negative += 1,
        }
        results.push(SentimentResult {
            item_id: item.id.clone(),
            polarity: scored.polarity,
            subjectivity: scored.subjectivity,
            band,
        });
    }

    ScoredBatch {
        results,
        breakdown,
        excluded,
    }
}

/// Lowercased tokens with edge punctuation trimmed; internal apostrophes
/// survive so contractions stay recognizable as negators.
fn word_tokens(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter_map(|w| {
            let trimmed = w
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        })
        .collect()
}

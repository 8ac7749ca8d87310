use crate::domain::models::{Band, ItemKind, PersonalityTrait};
use crate::services::engagement::EngagementSummary;
use crate::services::interests::InterestIndex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule table could not be parsed: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("rule #{index} has an empty label")]
    EmptyLabel { index: usize },
    #[error("rule '{label}': keyword predicate has no terms")]
    EmptyTerms { label: String },
    #[error("rule '{label}': min_matches must be at least 1")]
    ZeroMinMatches { label: String },
    #[error("rule '{label}': share threshold must be within (0, 1]")]
    ThresholdOutOfRange { label: String },
    #[error("rule '{label}': all_of needs at least one predicate")]
    EmptyAllOf { label: String },
    #[error("rule '{label}': fixed confidence must be within [0, 1]")]
    ConfidenceOutOfRange { label: String },
    #[error("rule '{label}' fired without any supporting items")]
    NoEvidence { label: String },
}

/// Externally supplied trait rule table. Adding a trait means adding a
/// table entry, never touching engine code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleTable {
    #[serde(default)]
    pub rules: Vec<TraitRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraitRule {
    pub label: String,
    pub predicate: Predicate,
    pub confidence: Confidence,
}

fn default_min_matches() -> usize {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Predicate {
    BandShare {
        band: Band,
        min: f64,
    },
    KindShare {
        kind: ItemKind,
        min: f64,
    },
    CommunityShare {
        community: String,
        min: f64,
    },
    TopCommunityShare {
        min: f64,
    },
    KeywordAnyOf {
        terms: Vec<String>,
        #[serde(default = "default_min_matches")]
        min_matches: usize,
    },
    AllOf {
        rules: Vec<Predicate>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Confidence {
    BandShare { band: Band },
    KindShare { kind: ItemKind },
    CommunityShare { community: String },
    TopCommunityShare,
    EvidenceShare,
    Fixed { value: f64 },
}

/// Aggregated signals the rule table is evaluated against. Built once per
/// run; member id vectors preserve input order so evidence citations are
/// reproducible.
pub struct Signals<'a> {
    pub total_items: usize,
    pub total_usable: usize,
    pub band_members: HashMap<Band, Vec<String>>,
    pub kind_members: HashMap<ItemKind, Vec<String>>,
    pub engagement: &'a EngagementSummary,
    pub interests: &'a InterestIndex,
    input_order: HashMap<String, usize>,
}

impl<'a> Signals<'a> {
    pub fn new(
        total_items: usize,
        band_members: HashMap<Band, Vec<String>>,
        kind_members: HashMap<ItemKind, Vec<String>>,
        engagement: &'a EngagementSummary,
        interests: &'a InterestIndex,
        input_order: HashMap<String, usize>,
    ) -> Self {
        let total_usable = band_members.values().map(Vec::len).sum();
        Self {
            total_items,
            total_usable,
            band_members,
            kind_members,
            engagement,
            interests,
            input_order,
        }
    }

    fn band_share(&self, band: Band) -> f64 {
        if self.total_usable == 0 {
            return 0.0;
        }
        self.band_ids(band).len() as f64 / self.total_usable as f64
    }

    fn band_ids(&self, band: Band) -> &[String] {
        self.band_members.get(&band).map(Vec::as_slice).unwrap_or(&[])
    }

    fn kind_share(&self, kind: ItemKind) -> f64 {
        if self.total_usable == 0 {
            return 0.0;
        }
        self.kind_ids(kind).len() as f64 / self.total_usable as f64
    }

    fn kind_ids(&self, kind: ItemKind) -> &[String] {
        self.kind_members.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    fn community_group(&self, community: &str) -> Option<&crate::services::engagement::CommunityGroup> {
        self.engagement
            .communities
            .iter()
            .find(|g| g.community.eq_ignore_ascii_case(community))
    }

    fn community_share(&self, community: &str) -> f64 {
        if self.total_items == 0 {
            return 0.0;
        }
        self.community_group(community)
            .map(|g| g.member_ids.len() as f64 / self.total_items as f64)
            .unwrap_or(0.0)
    }

    fn top_community_share(&self) -> f64 {
        if self.total_items == 0 {
            return 0.0;
        }
        self.engagement
            .top_community()
            .map(|g| g.member_ids.len() as f64 / self.total_items as f64)
            .unwrap_or(0.0)
    }

    /// Dedupes and orders evidence ids by original input position.
    fn in_input_order(&self, ids: Vec<String>) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut unique: Vec<String> = ids.into_iter().filter(|id| seen.insert(id.clone())).collect();
        unique.sort_by_key(|id| self.input_order.get(id).copied().unwrap_or(usize::MAX));
        unique
    }
}

/// Parses and validates a rule table. Validation runs before any item is
/// processed; a table that cannot bind evidence is rejected here.
pub fn parse_rules(raw: &str) -> Result<RuleTable, RuleError> {
    let table: RuleTable = toml::from_str(raw)?;
    validate_rules(&table)?;
    Ok(table)
}

pub fn validate_rules(table: &RuleTable) -> Result<(), RuleError> {
    for (index, rule) in table.rules.iter().enumerate() {
        if rule.label.trim().is_empty() {
            return Err(RuleError::EmptyLabel { index });
        }
        validate_predicate(&rule.label, &rule.predicate)?;
        if let Confidence::Fixed { value } = rule.confidence {
            if !(0.0..=1.0).contains(&value) {
                return Err(RuleError::ConfidenceOutOfRange {
                    label: rule.label.clone(),
                });
            }
        }
    }
    Ok(())
}

fn validate_predicate(label: &str, predicate: &Predicate) -> Result<(), RuleError> {
    match predicate {
        Predicate::BandShare { min, .. }
        | Predicate::KindShare { min, .. }
        | Predicate::CommunityShare { min, .. }
        | Predicate::TopCommunityShare { min } => {
            if !(*min > 0.0 && *min <= 1.0) {
                return Err(RuleError::ThresholdOutOfRange {
                    label: label.to_string(),
                });
            }
        }
        Predicate::KeywordAnyOf { terms, min_matches } => {
            if terms.is_empty() {
                return Err(RuleError::EmptyTerms {
                    label: label.to_string(),
                });
            }
            if *min_matches == 0 {
                return Err(RuleError::ZeroMinMatches {
                    label: label.to_string(),
                });
            }
        }
        Predicate::AllOf { rules } => {
            if rules.is_empty() {
                return Err(RuleError::EmptyAllOf {
                    label: label.to_string(),
                });
            }
            for inner in rules {
                validate_predicate(label, inner)?;
            }
        }
    }
    Ok(())
}

/// Evaluates the table against the aggregated signals. Every satisfied
/// rule emits a trait; none suppresses another. Output is ordered by
/// confidence descending, equal confidences keeping rule-table order.
pub fn infer(table: &RuleTable, signals: &Signals) -> Result<Vec<PersonalityTrait>, RuleError> {
    let mut traits = Vec::new();
    for rule in &table.rules {
        let Some(evidence) = eval_predicate(&rule.predicate, signals) else {
            continue;
        };
        if evidence.is_empty() {
            return Err(RuleError::NoEvidence {
                label: rule.label.clone(),
            });
        }
        let confidence = eval_confidence(&rule.confidence, signals, &evidence).clamp(0.0, 1.0);
        traits.push(PersonalityTrait {
            label: rule.label.clone(),
            confidence,
            evidence,
        });
    }
    // stable sort keeps table order for equal confidences
    traits.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    Ok(traits)
}

/// Returns the contributing item ids when the predicate is satisfied.
fn eval_predicate(predicate: &Predicate, signals: &Signals) -> Option<Vec<String>> {
    match predicate {
        Predicate::BandShare { band, min } => {
            (signals.band_share(*band) >= *min).then(|| signals.band_ids(*band).to_vec())
        }
        Predicate::KindShare { kind, min } => {
            (signals.kind_share(*kind) >= *min).then(|| signals.kind_ids(*kind).to_vec())
        }
        Predicate::CommunityShare { community, min } => (signals.community_share(community)
            >= *min)
            .then(|| {
                signals
                    .community_group(community)
                    .map(|g| g.member_ids.clone())
                    .unwrap_or_default()
            }),
        Predicate::TopCommunityShare { min } => (signals.top_community_share() >= *min)
            .then(|| {
                signals
                    .engagement
                    .top_community()
                    .map(|g| g.member_ids.clone())
                    .unwrap_or_default()
            }),
        Predicate::KeywordAnyOf { terms, min_matches } => {
            let mut matched_ids = Vec::new();
            let mut matches = 0usize;
            for term in terms {
                let term = term.to_lowercase();
                if let Some(ids) = signals.interests.members.get(&term) {
                    matches += 1;
                    matched_ids.extend(ids.iter().cloned());
                }
            }
            (matches >= *min_matches).then(|| signals.in_input_order(matched_ids))
        }
        Predicate::AllOf { rules } => {
            let mut union = Vec::new();
            for inner in rules {
                union.extend(eval_predicate(inner, signals)?);
            }
            Some(signals.in_input_order(union))
        }
    }
}

fn eval_confidence(confidence: &Confidence, signals: &Signals, evidence: &[String]) -> f64 {
    match confidence {
        Confidence::BandShare { band } => signals.band_share(*band),
        Confidence::KindShare { kind } => signals.kind_share(*kind),
        Confidence::CommunityShare { community } => signals.community_share(community),
        Confidence::TopCommunityShare => signals.top_community_share(),
        Confidence::EvidenceShare => {
            if signals.total_usable == 0 {
                0.0
            } else {
                evidence.len() as f64 / signals.total_usable as f64
            }
        }
        Confidence::Fixed { value } => *value,
    }
}

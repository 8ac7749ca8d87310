use crate::domain::models::{ActivityItem, Band, ItemKind, PersonaReport};
use crate::services::engagement::aggregate;
use crate::services::inference::{infer, RuleError, RuleTable, Signals};
use crate::services::interests::{extract, Tokenizer};
use crate::services::normalize::normalize_items;
use crate::services::report::compile;
use crate::services::sentiment::{score_items, SentimentScorer};
use crate::services::settings::Settings;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no usable activity items to analyze")]
    InsufficientData,
    #[error(transparent)]
    Rule(#[from] RuleError),
}

/// Runs the full analysis over a frozen activity sequence:
/// normalizing → scoring → aggregating → extracting → inferring →
/// compiling. Deterministic function of its arguments; the scorer,
/// tokenizer, and timestamp are injected so no stage reaches for process
/// state.
pub fn run(
    username: &str,
    items: &[ActivityItem],
    settings: &Settings,
    rules: &RuleTable,
    scorer: &SentimentScorer,
    tokenizer: &Tokenizer,
    generated_at: DateTime<Utc>,
) -> Result<PersonaReport, EngineError> {
    if items.is_empty() {
        return Err(EngineError::InsufficientData);
    }

    let normalized = normalize_items(items);
    let scored = score_items(scorer, &normalized.items, &settings.sentiment);
    let mut excluded = normalized.excluded;
    excluded.extend(scored.excluded);
    if scored.results.is_empty() {
        return Err(EngineError::InsufficientData);
    }

    let engagement = aggregate(items, settings.top_communities);

    let excluded_ids: HashSet<&str> = excluded.iter().map(|e| e.id.as_str()).collect();
    let usable: Vec<_> = normalized
        .items
        .iter()
        .filter(|i| !excluded_ids.contains(i.id.as_str()))
        .collect();

    let interests = extract(
        tokenizer,
        &usable,
        settings.keyword_count,
        settings.weight_keywords_by_score,
    );

    let mut band_members: HashMap<Band, Vec<String>> = HashMap::new();
    for result in &scored.results {
        band_members
            .entry(result.band)
            .or_default()
            .push(result.item_id.clone());
    }
    let mut kind_members: HashMap<ItemKind, Vec<String>> = HashMap::new();
    for item in &usable {
        kind_members
            .entry(item.kind)
            .or_default()
            .push(item.id.clone());
    }
    let input_order: HashMap<String, usize> = items
        .iter()
        .enumerate()
        .map(|(position, item)| (item.id.clone(), position))
        .collect();

    let signals = Signals::new(
        items.len(),
        band_members,
        kind_members,
        &engagement,
        &interests,
        input_order,
    );
    let traits = infer(rules, &signals)?;

    Ok(compile(
        username,
        generated_at,
        items,
        &excluded,
        scored.breakdown,
        engagement.entries,
        interests.keywords,
        traits,
    ))
}

#[cfg(test)]
mod tests {
    use super::{run, EngineError};
    use crate::domain::constants::DEFAULT_RULES_TOML;
    use crate::domain::models::{ActivityItem, ItemKind};
    use crate::services::inference::parse_rules;
    use crate::services::interests::Tokenizer;
    use crate::services::report::render_text;
    use crate::services::sentiment::SentimentScorer;
    use crate::services::settings::Settings;
    use chrono::{TimeZone, Utc};

    fn item(id: &str, kind: ItemKind, community: &str, text: Option<&str>) -> ActivityItem {
        ActivityItem {
            id: id.to_string(),
            kind,
            community: community.to_string(),
            created_utc: 1_700_000_000,
            raw_text: text.map(str::to_string),
            score: 3,
            permalink: Some(format!("https://example.com/{}", id)),
        }
    }

    /// 2 positive, 2 negative, 1 ambiguous; technology 3, gaming 2.
    fn mixed_items() -> Vec<ActivityItem> {
        vec![
            item("p1", ItemKind::Post, "technology", Some("this compiler is great, i love it")),
            item("p2", ItemKind::Post, "gaming", Some("amazing level design, really awesome")),
            item("c1", ItemKind::Comment, "technology", Some("terrible patch, i hate the new menu")),
            item("c2", ItemKind::Comment, "gaming", Some("awful port, everything is broken")),
            item("c3", ItemKind::Comment, "technology", Some("the meeting moved to tuesday")),
        ]
    }

    fn run_mixed() -> crate::domain::models::PersonaReport {
        let settings = Settings::default();
        let rules = parse_rules(DEFAULT_RULES_TOML).unwrap();
        run(
            "tester",
            &mixed_items(),
            &settings,
            &rules,
            &SentimentScorer::default(),
            &Tokenizer::new(&[], settings.min_token_len),
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn mixed_scenario_bands_and_engagement() {
        let report = run_mixed();
        assert_eq!(report.sentiment.positive, 2);
        assert_eq!(report.sentiment.neutral, 1);
        assert_eq!(report.sentiment.negative, 2);
        assert_eq!(report.sentiment.total(), 5);

        assert_eq!(report.engagement[0].community, "technology");
        assert!((report.engagement[0].share - 0.6).abs() < 1e-9);
        assert_eq!(report.engagement[1].community, "gaming");
        assert!((report.engagement[1].share - 0.4).abs() < 1e-9);
    }

    #[test]
    fn identical_runs_render_identically() {
        let a = render_text(&run_mixed());
        let b = render_text(&run_mixed());
        assert_eq!(a, b);
    }

    #[test]
    fn keyword_examples_actually_contain_their_terms() {
        let report = run_mixed();
        let items = mixed_items();
        assert!(!report.interests.is_empty());
        for keyword in &report.interests {
            let example = items
                .iter()
                .find(|i| i.id == keyword.example_item_id)
                .expect("example id must exist in the input set");
            let text = example.raw_text.as_deref().unwrap_or_default().to_lowercase();
            assert!(
                text.contains(&keyword.term),
                "item {} does not contain term {}",
                keyword.example_item_id,
                keyword.term
            );
        }
    }

    #[test]
    fn trait_evidence_ids_exist_in_the_input_set() {
        let report = run_mixed();
        let items = mixed_items();
        for t in &report.traits {
            assert!(!t.evidence.is_empty(), "trait {} has no evidence", t.label);
            for id in &t.evidence {
                assert!(items.iter().any(|i| &i.id == id), "unknown evidence id {id}");
            }
            assert!((0.0..=1.0).contains(&t.confidence));
        }
    }

    #[test]
    fn empty_input_is_insufficient_data() {
        let settings = Settings::default();
        let rules = parse_rules(DEFAULT_RULES_TOML).unwrap();
        let err = run(
            "tester",
            &[],
            &settings,
            &rules,
            &SentimentScorer::default(),
            &Tokenizer::new(&[], 3),
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InsufficientData));
    }

    #[test]
    fn all_malformed_input_is_insufficient_data() {
        let settings = Settings::default();
        let rules = parse_rules(DEFAULT_RULES_TOML).unwrap();
        let items = vec![
            item("a", ItemKind::Post, "technology", None),
            item("b", ItemKind::Comment, "gaming", None),
        ];
        let err = run(
            "tester",
            &items,
            &settings,
            &rules,
            &SentimentScorer::default(),
            &Tokenizer::new(&[], 3),
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InsufficientData));
    }

    #[test]
    fn malformed_items_are_counted_not_dropped() {
        let settings = Settings::default();
        let rules = parse_rules(DEFAULT_RULES_TOML).unwrap();
        let mut items = mixed_items();
        items.push(item("x1", ItemKind::Comment, "technology", None));
        let report = run(
            "tester",
            &items,
            &settings,
            &rules,
            &SentimentScorer::default(),
            &Tokenizer::new(&[], settings.min_token_len),
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        )
        .unwrap();
        assert_eq!(report.total_items, 6);
        assert_eq!(report.excluded_items, 1);
        // excluded items never enter the sentiment denominator
        assert_eq!(report.sentiment.total(), 5);
        // but still count toward community engagement
        let tech = report
            .engagement
            .iter()
            .find(|e| e.community == "technology")
            .unwrap();
        assert_eq!(tech.item_count, 4);
    }
}

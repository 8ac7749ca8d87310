use crate::domain::models::{
    ActivityItem, Citation, EngagementEntry, ExcludedItem, InterestKeyword, PersonaReport,
    PersonalityTrait, SentimentBreakdown,
};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

const EXCERPT_MAX_CHARS: usize = 160;
const INLINE_CITE_MAX: usize = 3;

/// Assembles the report record from the upstream stage results. Pure:
/// identical inputs (including the injected timestamp) produce an
/// identical record, and therefore byte-identical rendered text.
pub fn compile(
    username: &str,
    generated_at: DateTime<Utc>,
    items: &[ActivityItem],
    excluded: &[ExcludedItem],
    sentiment: SentimentBreakdown,
    engagement: Vec<EngagementEntry>,
    interests: Vec<InterestKeyword>,
    traits: Vec<PersonalityTrait>,
) -> PersonaReport {
    let by_id: HashMap<&str, &ActivityItem> =
        items.iter().map(|i| (i.id.as_str(), i)).collect();

    // appendix lists every cited item once, in first-reference order:
    // keyword examples first, then trait evidence
    let mut cited_ids: Vec<&str> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for keyword in &interests {
        if seen.insert(keyword.example_item_id.as_str()) {
            cited_ids.push(keyword.example_item_id.as_str());
        }
    }
    for t in &traits {
        for id in &t.evidence {
            if seen.insert(id.as_str()) {
                cited_ids.push(id.as_str());
            }
        }
    }

    let citations = cited_ids
        .into_iter()
        .filter_map(|id| by_id.get(id).map(|item| (id, *item)))
        .map(|(id, item)| Citation {
            item_id: id.to_string(),
            reference: citation_reference(item),
            excerpt: excerpt(item.raw_text.as_deref().unwrap_or_default()),
        })
        .collect();

    PersonaReport {
        username: username.to_string(),
        generated_at,
        total_items: items.len(),
        excluded_items: excluded.len(),
        sentiment,
        engagement,
        interests,
        traits,
        citations,
    }
}

/// Stable reference for a citation: the platform permalink when the
/// collector provided one, the item id otherwise.
pub fn citation_reference(item: &ActivityItem) -> String {
    item.permalink
        .clone()
        .unwrap_or_else(|| item.id.clone())
}

fn excerpt(raw: &str) -> String {
    let flattened = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if flattened.chars().count() <= EXCERPT_MAX_CHARS {
        return flattened;
    }
    let cut: String = flattened.chars().take(EXCERPT_MAX_CHARS).collect();
    format!("{}...", cut.trim_end())
}

/// Rounds to one decimal, ties to even, so re-renders never flip on
/// representable halfway values.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

fn pct(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    round1(numerator as f64 * 100.0 / denominator as f64)
}

pub fn report_filename(username: &str) -> String {
    format!("{}_persona.txt", username)
}

/// Renders the flat text document. Section order is fixed; writing the
/// same report twice yields byte-identical output.
pub fn render_text(report: &PersonaReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("Persona Analysis: {}\n", report.username));
    out.push_str(&"=".repeat(50));
    out.push('\n');
    out.push_str(&format!(
        "Generated: {}\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!(
        "Items analyzed: {} ({} excluded)\n\n",
        report.total_items, report.excluded_items
    ));

    section(&mut out, "Sentiment Breakdown");
    let scored = report.sentiment.total();
    out.push_str(&format!(
        "- Positive: {} ({:.1}%)\n",
        report.sentiment.positive,
        pct(report.sentiment.positive, scored)
    ));
    out.push_str(&format!(
        "- Neutral: {} ({:.1}%)\n",
        report.sentiment.neutral,
        pct(report.sentiment.neutral, scored)
    ));
    out.push_str(&format!(
        "- Negative: {} ({:.1}%)\n\n",
        report.sentiment.negative,
        pct(report.sentiment.negative, scored)
    ));

    section(&mut out, "Community Engagement");
    if report.engagement.is_empty() {
        out.push_str("(none)\n");
    }
    for entry in &report.engagement {
        out.push_str(&format!(
            "- {}: {} items ({:.1}%)\n",
            entry.community,
            entry.item_count,
            round1(entry.share * 100.0)
        ));
    }
    out.push('\n');

    section(&mut out, "Interests/Keywords");
    if report.interests.is_empty() {
        out.push_str("(none)\n");
    }
    for keyword in &report.interests {
        out.push_str(&format!(
            "- {} (weight {:.1}) [cite: {}]\n",
            keyword.term, keyword.weight, keyword.example_item_id
        ));
    }
    out.push('\n');

    section(&mut out, "Personality Insights");
    if report.traits.is_empty() {
        out.push_str("(none)\n");
    }
    for t in &report.traits {
        let cites: Vec<&str> = t
            .evidence
            .iter()
            .take(INLINE_CITE_MAX)
            .map(String::as_str)
            .collect();
        let extra = t.evidence.len().saturating_sub(INLINE_CITE_MAX);
        let suffix = if extra > 0 {
            format!(" (+{} more)", extra)
        } else {
            String::new()
        };
        out.push_str(&format!(
            "- {} (confidence {:.2}) [cite: {}{}]\n",
            t.label,
            t.confidence,
            cites.join(", "),
            suffix
        ));
    }
    out.push('\n');

    section(&mut out, "Evidence/Citations");
    if report.citations.is_empty() {
        out.push_str("(none)\n");
    }
    for (i, citation) in report.citations.iter().enumerate() {
        out.push_str(&format!("{}. [cite: {}]\n", i + 1, citation.reference));
        if !citation.excerpt.is_empty() {
            out.push_str(&format!("   \"{}\"\n", citation.excerpt));
        }
    }

    out
}

fn section(out: &mut String, title: &str) {
    out.push_str(title);
    out.push('\n');
    out.push_str(&"-".repeat(title.len()));
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::{compile, render_text, report_filename, round1};
    use crate::domain::models::{
        ActivityItem, EngagementEntry, InterestKeyword, ItemKind, PersonalityTrait,
        SentimentBreakdown,
    };
    use chrono::{TimeZone, Utc};

    fn item(id: &str, permalink: Option<&str>) -> ActivityItem {
        ActivityItem {
            id: id.to_string(),
            kind: ItemKind::Post,
            community: "technology".to_string(),
            created_utc: 0,
            raw_text: Some("a   long\nannouncement about rust".to_string()),
            score: 4,
            permalink: permalink.map(str::to_string),
        }
    }

    fn sample_report() -> crate::domain::models::PersonaReport {
        let items = vec![item("p1", Some("https://example.com/p1")), item("p2", None)];
        compile(
            "kojied",
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            &items,
            &[],
            SentimentBreakdown {
                positive: 1,
                neutral: 1,
                negative: 0,
            },
            vec![EngagementEntry {
                community: "technology".to_string(),
                item_count: 2,
                share: 1.0,
            }],
            vec![InterestKeyword {
                term: "rust".to_string(),
                weight: 2.0,
                example_item_id: "p1".to_string(),
            }],
            vec![PersonalityTrait {
                label: "technically inclined".to_string(),
                confidence: 0.5,
                evidence: vec!["p1".to_string(), "p2".to_string()],
            }],
        )
    }

    #[test]
    fn rounds_ties_to_even() {
        assert_eq!(round1(12.25), 12.2);
        assert_eq!(round1(12.75), 12.8);
        assert_eq!(round1(33.333333), 33.3);
    }

    #[test]
    fn sections_appear_in_fixed_order() {
        let text = render_text(&sample_report());
        let order = [
            "Sentiment Breakdown",
            "Community Engagement",
            "Interests/Keywords",
            "Personality Insights",
            "Evidence/Citations",
        ];
        let mut last = 0;
        for header in order {
            let at = text.find(header).unwrap_or_else(|| panic!("missing {header}"));
            assert!(at >= last, "{header} out of order");
            last = at;
        }
    }

    #[test]
    fn rendering_twice_is_byte_identical() {
        let report = sample_report();
        assert_eq!(render_text(&report), render_text(&report));
    }

    #[test]
    fn citations_prefer_permalinks() {
        let text = render_text(&sample_report());
        assert!(text.contains("[cite: https://example.com/p1]"));
        assert!(text.contains("[cite: p2]"));
    }

    #[test]
    fn excerpts_flatten_whitespace() {
        let report = sample_report();
        assert_eq!(
            report.citations[0].excerpt,
            "a long announcement about rust"
        );
    }

    #[test]
    fn filename_follows_convention() {
        assert_eq!(report_filename("kojied"), "kojied_persona.txt");
    }
}

use crate::domain::constants::DEFAULT_STOPWORDS;
use crate::domain::models::{InterestKeyword, NormalizedItem};
use std::collections::{HashMap, HashSet};

/// Word tokenizer for interest extraction. Constructed once per run from
/// the configured stopword set and passed into the stage; never a global.
pub struct Tokenizer {
    stopwords: HashSet<String>,
    min_token_len: usize,
}

impl Tokenizer {
    pub fn new(extra_stopwords: &[String], min_token_len: usize) -> Self {
        let mut stopwords: HashSet<String> =
            DEFAULT_STOPWORDS.iter().map(|s| s.to_string()).collect();
        stopwords.extend(extra_stopwords.iter().map(|s| s.to_lowercase()));
        Self {
            stopwords,
            min_token_len,
        }
    }

    /// Lowercased alphanumeric tokens, stopwords and short tokens removed.
    pub fn tokens(&self, text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter_map(|piece| {
                if piece.len() < self.min_token_len {
                    return None;
                }
                let token = piece.to_lowercase();
                if self.stopwords.contains(&token) {
                    None
                } else {
                    Some(token)
                }
            })
            .collect()
    }
}

/// Ranked keywords plus, for each selected term, the ids of the items it
/// occurs in (stable input order). The member index is what lets trait
/// rules cite the exact items behind a keyword signal.
pub struct InterestIndex {
    pub keywords: Vec<InterestKeyword>,
    pub members: HashMap<String, Vec<String>>,
}

struct TermStat {
    weight: f64,
    item_ids: Vec<String>,
}

/// Extracts the top-N interest keywords from the usable (non-excluded)
/// items. Weight is the term's occurrence count, optionally scaled per
/// item by a logarithm of its engagement score; ties break alphabetically.
/// Every selected term is citable: `example_item_id` is the first item in
/// input order whose normalized text contains the term.
pub fn extract(
    tokenizer: &Tokenizer,
    items: &[&NormalizedItem],
    top_n: usize,
    weight_by_score: bool,
) -> InterestIndex {
    let mut stats: HashMap<String, TermStat> = HashMap::new();

    for item in items {
        let item_weight = if weight_by_score {
            1.0 + (item.score.max(0) as f64).ln_1p()
        } else {
            1.0
        };
        let tokens = tokenizer.tokens(&item.normalized_text);
        let mut seen_in_item: HashSet<&str> = HashSet::new();
        for token in &tokens {
            let stat = stats.entry(token.clone()).or_insert_with(|| TermStat {
                weight: 0.0,
                item_ids: Vec::new(),
            });
            stat.weight += item_weight;
            if seen_in_item.insert(token.as_str()) {
                stat.item_ids.push(item.id.clone());
            }
        }
    }

    let mut ranked: Vec<(String, TermStat)> = stats.into_iter().collect();
    ranked.sort_by(|(term_a, a), (term_b, b)| {
        b.weight
            .total_cmp(&a.weight)
            .then_with(|| term_a.cmp(term_b))
    });
    ranked.truncate(top_n);

    let mut keywords = Vec::with_capacity(ranked.len());
    let mut members = HashMap::with_capacity(ranked.len());
    for (term, stat) in ranked {
        keywords.push(InterestKeyword {
            term: term.clone(),
            weight: stat.weight,
            example_item_id: stat.item_ids[0].clone(),
        });
        members.insert(term, stat.item_ids);
    }

    InterestIndex { keywords, members }
}

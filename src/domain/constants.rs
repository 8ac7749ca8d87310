/// English stopwords excluded from interest extraction. Tokens shorter
/// than the configured minimum length are dropped before this set is
/// consulted, so short function words are listed only where ambiguity is
/// likely.
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can",
    "had", "her", "was", "one", "our", "out", "day", "get", "has", "him",
    "his", "how", "man", "new", "now", "old", "see", "two", "way", "who",
    "did", "its", "let", "put", "say", "she", "too", "use", "that", "with",
    "have", "this", "will", "your", "from", "they", "know", "want", "been",
    "good", "much", "some", "time", "very", "when", "come", "here", "just",
    "like", "long", "make", "many", "more", "only", "over", "such", "take",
    "than", "them", "well", "were", "what", "about", "after",
    "again", "also", "back", "because", "before", "being", "between",
    "both", "could", "down", "even", "every", "first", "into", "most",
    "other", "really", "same", "should", "since", "still", "their",
    "there", "these", "thing", "things", "think", "those", "through",
    "under", "where", "which", "while", "would", "yeah", "yes", "dont",
    "doesnt", "didnt", "cant", "wont", "isnt", "youre", "thats", "going",
    "gonna", "got", "itself", "myself", "something", "someone", "anyone",
    "anything", "everything", "nothing", "people", "pretty", "quite",
    "rather", "said", "says", "actually", "probably", "maybe", "though",
    "around", "always", "never", "ever", "then", "does",
];

/// Built-in trait rule table, used when no `--rules` file is supplied.
/// Kept as TOML so the defaults go through the same parse/validate path
/// as user-provided tables.
pub const DEFAULT_RULES_TOML: &str = r#"
[[rules]]
label = "upbeat and encouraging"
predicate = { type = "band_share", band = "positive", min = 0.5 }
confidence = { type = "band_share", band = "positive" }

[[rules]]
label = "critical/skeptical"
confidence = { type = "band_share", band = "negative" }
[rules.predicate]
type = "all_of"
rules = [
    { type = "band_share", band = "negative", min = 0.4 },
    { type = "keyword_any_of", terms = ["problem", "issue", "wrong", "disagree", "broken", "worse", "overrated", "annoying"] },
]

[[rules]]
label = "even-keeled"
predicate = { type = "band_share", band = "neutral", min = 0.5 }
confidence = { type = "band_share", band = "neutral" }

[[rules]]
label = "conversationalist, prefers replying over posting"
predicate = { type = "kind_share", kind = "comment", min = 0.75 }
confidence = { type = "kind_share", kind = "comment" }

[[rules]]
label = "content creator, prefers original posts"
predicate = { type = "kind_share", kind = "post", min = 0.5 }
confidence = { type = "kind_share", kind = "post" }

[[rules]]
label = "community-focused"
predicate = { type = "top_community_share", min = 0.5 }
confidence = { type = "top_community_share" }

[[rules]]
label = "technically inclined"
predicate = { type = "keyword_any_of", terms = ["python", "programming", "software", "code", "developer", "linux", "server", "hardware", "machine", "learning", "data"] }
confidence = { type = "evidence_share" }
"#;

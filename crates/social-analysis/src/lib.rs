//! Social-signal risk analysis.
//!
//! Posts mentioning a token come from a [`SocialFeed`]. The analyzer looks for the
//! patterns that usually surround a pump-and-rug: coordinated pump language,
//! community scam reports, copy-pasted bot posts and a handful of accounts
//! doing all the talking.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use risk_core::{AnalysisError, AnalyzerKind, SubAnalysis, SubAnalyzer};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub mod feed;
pub use feed::HttpSocialFeed;

const NEGATION_WORDS: &[&str] = &[
    "not", "no", "never", "don't", "doesn't", "didn't", "isn't", "aren't",
    "wasn't", "weren't", "won't", "wouldn't", "couldn't", "shouldn't", "hardly",
    "barely", "neither", "nor", "without",
];

const NEGATION_WINDOW: usize = 3;

const HYPE_WORDS: &[&str] = &[
    "100x", "1000x", "moon", "mooning", "moonshot", "gem", "presale", "airdrop",
    "guaranteed", "lambo", "ape", "aping", "pump", "pumping", "giveaway", "rocket",
];

const SCAM_WORDS: &[&str] = &[
    "rug", "rugged", "rugpull", "scam", "scammer", "scammers", "honeypot",
    "exploit", "drained", "stolen", "fraud",
];

/// Posts with no presence at all still carry some risk: nobody can vouch for the token.
const NO_PRESENCE_SCORE: f64 = 40.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialPost {
    pub id: String,
    pub author: String,
    pub text: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Source of posts mentioning a token.
#[async_trait]
pub trait SocialFeed: Send + Sync {
    async fn fetch_posts(&self, token: &str) -> Result<Vec<SocialPost>, AnalysisError>;
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| {
            c.is_whitespace() || matches!(c, ',' | ';' | '.' | '!' | '?' | ':' | '-' | '(' | ')' | '"' | '#' | '$')
        })
        .filter(|w| !w.is_empty())
        .map(|w| w.to_string())
        .collect()
}

/// True when a lexicon word appears without a negation in the preceding window.
fn mentions(words: &[String], lexicon: &HashSet<&str>) -> bool {
    let negation_positions: Vec<usize> = words
        .iter()
        .enumerate()
        .filter(|(_, w)| NEGATION_WORDS.contains(&w.as_str()))
        .map(|(i, _)| i)
        .collect();

    words.iter().enumerate().any(|(i, word)| {
        if !lexicon.contains(word.as_str()) {
            return false;
        }
        let negated = negation_positions
            .iter()
            .any(|&neg_pos| neg_pos < i && (i - neg_pos) <= NEGATION_WINDOW);
        !negated
    })
}

/// Collapse a post to its words so copy-pasted variants compare equal.
fn fingerprint(text: &str) -> String {
    tokenize(text).join(" ")
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Score a batch of posts, capped at 100.
pub fn score_posts(posts: &[SocialPost]) -> SubAnalysis {
    if posts.is_empty() {
        return SubAnalysis::new(
            NO_PRESENCE_SCORE,
            vec!["No social media presence found for this token".to_string()],
        )
        .with_details(json!({ "post_count": 0 }));
    }

    let hype_set: HashSet<&str> = HYPE_WORDS.iter().copied().collect();
    let scam_set: HashSet<&str> = SCAM_WORDS.iter().copied().collect();

    let mut hype_posts = 0;
    let mut scam_posts = 0;
    let mut fingerprints = HashSet::new();
    let mut per_author: HashMap<&str, usize> = HashMap::new();

    for post in posts {
        let words = tokenize(&post.text);
        if mentions(&words, &hype_set) {
            hype_posts += 1;
        }
        if mentions(&words, &scam_set) {
            scam_posts += 1;
        }
        fingerprints.insert(fingerprint(&post.text));
        *per_author.entry(post.author.as_str()).or_insert(0) += 1;
    }

    let total = posts.len();
    let duplicate_posts = total - fingerprints.len();
    let top_author_posts = per_author.values().copied().max().unwrap_or(0);

    let hype_pct = percent(hype_posts, total);
    let duplicate_pct = percent(duplicate_posts, total);
    let top_author_pct = percent(top_author_posts, total);

    let mut score = 0.0;
    let mut red_flags = Vec::new();

    if hype_pct > 50.0 {
        score += 30.0;
        red_flags.push(format!("Coordinated hype: {:.0}% of posts use pump language", hype_pct));
    } else if hype_pct > 25.0 {
        score += 15.0;
        red_flags.push(format!("Heavy promotional language in {:.0}% of posts", hype_pct));
    }

    if scam_posts >= 3 {
        score += 35.0;
        red_flags.push(format!("Community reports of scam or rug behaviour in {} posts", scam_posts));
    } else if scam_posts > 0 {
        score += 15.0;
        red_flags.push(format!("{} post(s) raise scam or rug concerns", scam_posts));
    }

    if duplicate_pct > 30.0 {
        score += 25.0;
        red_flags.push(format!("Bot-like activity: {:.0}% of posts are duplicates", duplicate_pct));
    }

    if total >= 5 && top_author_pct > 40.0 {
        score += 10.0;
        red_flags.push(format!(
            "Mentions driven by few accounts: top author wrote {:.0}% of posts",
            top_author_pct
        ));
    }

    SubAnalysis::new(f64::min(score, 100.0), red_flags).with_details(json!({
        "post_count": total,
        "unique_authors": per_author.len(),
        "hype_pct": hype_pct,
        "scam_reports": scam_posts,
        "duplicate_pct": duplicate_pct,
        "top_author_pct": top_author_pct,
    }))
}

/// Social collaborator backed by a [`SocialFeed`].
pub struct SocialSignalAnalyzer {
    feed: Arc<dyn SocialFeed>,
}

impl SocialSignalAnalyzer {
    pub fn new(feed: Arc<dyn SocialFeed>) -> Self {
        Self { feed }
    }
}

#[async_trait]
impl SubAnalyzer for SocialSignalAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Social
    }

    async fn analyze(&self, token: &str) -> Result<SubAnalysis, AnalysisError> {
        let posts = self
            .feed
            .fetch_posts(token)
            .await
            .map_err(|e| AnalysisError::sub_analyzer(AnalyzerKind::Social, e))?;
        tracing::debug!("Scoring {} social posts for {}", posts.len(), token);
        Ok(score_posts(&posts))
    }
}

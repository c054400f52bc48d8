//! Moderation text scanning.
//!
//! Two operations over one immutable set of term lists:
//!
//! - [`ModerationScanner::scan`] classifies text at write time. A severe hit
//!   blocks the write; a profanity or hate hit lets it through with the
//!   caution flag set.
//! - [`ModerationScanner::censor`] masks terms at display time. Stored text
//!   is never rewritten. Besides the scan lists it also masks a set of
//!   display-only words that are too short to scan by substring.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::error::{CoreError, CoreResult};

/// Replacement for every censored term
pub const MASK: &str = "****";

const SEVERE_TERMS: &[&str] = &[
    "kill yourself",
    "kys",
    "gas the",
    "ethnic cleanse",
    "hang them",
    "lynch",
    "burn them",
    "shoot them",
    "kill all",
    "rape",
];

const PROFANITY_TERMS: &[&str] = &[
    "fuck", "shit", "bitch", "asshole", "bastard", "cunt", "dick", "piss", "prick", "slut", "whore",
];

/// Masked on display, never matched by `scan`
const CENSOR_ONLY_TERMS: &[&str] = &["ass"];

const HATE_TERMS: &[&str] = &[
    "hate",
    "go back to your country",
    "you people",
    "inferior race",
    "subhuman",
    "vermin",
];

/// The phrase tables the scanner matches against.
///
/// Built once at start-up and shared by reference; nothing mutates it
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermLists {
    /// Terms that block a write outright
    pub severe: Vec<String>,

    /// Profanity, flags content with a caution badge
    pub profanity: Vec<String>,

    /// Hateful phrases, flags content with a caution badge
    pub hate: Vec<String>,

    /// Words masked by `censor` only; they never set a flag
    #[serde(default)]
    pub censor_only: Vec<String>,
}

impl Default for TermLists {
    fn default() -> Self {
        let owned = |terms: &[&str]| terms.iter().map(|t| t.to_string()).collect::<Vec<_>>();
        Self {
            severe: owned(SEVERE_TERMS),
            profanity: owned(PROFANITY_TERMS),
            hate: owned(HATE_TERMS),
            censor_only: owned(CENSOR_ONLY_TERMS),
        }
    }
}

impl TermLists {
    /// Load term lists from a JSON file with `severe`, `profanity` and `hate`
    /// arrays and an optional `censor_only` array.
    pub fn from_json_file(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CoreError::TermListLoad(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&raw)
    }

    /// Parse term lists from a JSON document
    pub fn from_json_str(raw: &str) -> CoreResult<Self> {
        serde_json::from_str(raw).map_err(|e| CoreError::TermListLoad(e.to_string()))
    }

    /// Lowercase and trim every term, rejecting empty ones
    fn normalized(self) -> CoreResult<Self> {
        fn normalize(terms: Vec<String>) -> CoreResult<Vec<String>> {
            terms
                .into_iter()
                .map(|term| {
                    let normalized = term.trim().to_lowercase();
                    if normalized.is_empty() {
                        Err(CoreError::InvalidTerm {
                            term,
                            reason: "term is empty".to_string(),
                        })
                    } else {
                        Ok(normalized)
                    }
                })
                .collect()
        }

        Ok(Self {
            severe: normalize(self.severe)?,
            profanity: normalize(self.profanity)?,
            hate: normalize(self.hate)?,
            censor_only: normalize(self.censor_only)?,
        })
    }

    fn all(&self) -> impl Iterator<Item = &String> {
        self.severe
            .iter()
            .chain(self.profanity.iter())
            .chain(self.hate.iter())
            .chain(self.censor_only.iter())
    }
}

/// Outcome of scanning a piece of text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationResult {
    /// A severe term matched; the write must be rejected
    pub is_severe: bool,

    /// A profanity or hate term matched; the node carries a caution flag
    pub is_caution: bool,

    /// Every matched term, severe first, then profanity, then hate
    pub matches: Vec<String>,
}

/// Stateless classifier and censor over a shared [`TermLists`].
#[derive(Debug, Clone)]
pub struct ModerationScanner {
    terms: Arc<TermLists>,
    censor_patterns: Arc<Vec<Regex>>,
}

impl ModerationScanner {
    /// Build a scanner, compiling the censor patterns once.
    pub fn new(terms: TermLists) -> CoreResult<Self> {
        let terms = terms.normalized()?;

        // Longest first so a phrase is masked before any shorter term inside it.
        let mut ordered: Vec<&String> = terms.all().collect();
        ordered.sort_by(|a, b| b.len().cmp(&a.len()));
        let mut seen = HashSet::new();
        ordered.retain(|term| seen.insert(*term));

        let censor_patterns = ordered
            .into_iter()
            .map(|term| censor_pattern(term))
            .collect::<CoreResult<Vec<_>>>()?;

        debug!(
            "Moderation scanner ready: {} severe, {} profanity, {} hate, {} censor-only terms",
            terms.severe.len(),
            terms.profanity.len(),
            terms.hate.len(),
            terms.censor_only.len()
        );

        Ok(Self {
            terms: Arc::new(terms),
            censor_patterns: Arc::new(censor_patterns),
        })
    }

    /// The term lists this scanner was built from
    pub fn terms(&self) -> &TermLists {
        &self.terms
    }

    /// Classify `text` by plain, case-insensitive substring containment.
    pub fn scan(&self, text: &str) -> ModerationResult {
        let normalized = text.to_lowercase();
        let mut result = ModerationResult::default();

        for phrase in &self.terms.severe {
            if normalized.contains(phrase.as_str()) {
                result.matches.push(phrase.clone());
                result.is_severe = true;
            }
        }
        for term in self.terms.profanity.iter().chain(self.terms.hate.iter()) {
            if normalized.contains(term.as_str()) {
                result.matches.push(term.clone());
                result.is_caution = true;
            }
        }

        result
    }

    /// Replace every listed term in `text` with [`MASK`].
    pub fn censor(&self, text: &str) -> String {
        let mut censored = text.to_string();
        for pattern in self.censor_patterns.iter() {
            if pattern.is_match(&censored) {
                censored = pattern.replace_all(&censored, MASK).into_owned();
            }
        }
        censored
    }
}

/// Single words match on word boundaries, phrases match anywhere.
fn censor_pattern(term: &str) -> CoreResult<Regex> {
    let escaped = regex::escape(term);
    let pattern = if term.chars().all(char::is_alphanumeric) {
        format!(r"\b{}\b", escaped)
    } else {
        escaped
    };

    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| CoreError::InvalidTerm {
            term: term.to_string(),
            reason: e.to_string(),
        })
}

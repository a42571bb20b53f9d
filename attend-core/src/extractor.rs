//! Entity extraction for attendance sentences
//!
//! Provides an `EntityExtractor` trait, the seam between the translation engine
//! and whatever recognizer tags the text, plus one implementation:
//! - **RuleBasedExtractor** - regex patterns for clock times and dates, and a
//!   gazetteer + capitalization heuristic for people, organizations and places.
//!
//! The engine never trusts the recognizer's TIME spans for predicates; see
//! `times::TimeScanner` for the authoritative time signal.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ExtractorConfig;
use crate::error::AttendError;

// ============================================================================
// Span types
// ============================================================================

/// Kind of a named reference span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NamedReferenceKind {
    Person,
    Org,
    Gpe,
}

impl NamedReferenceKind {
    pub fn label(&self) -> &'static str {
        match self {
            NamedReferenceKind::Person => "PERSON",
            NamedReferenceKind::Org => "ORG",
            NamedReferenceKind::Gpe => "GPE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    Time,
    Date,
    NamedReference(NamedReferenceKind),
}

/// A tagged span of the input text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedSpan {
    pub text: String,
    pub category: EntityCategory,
    /// Byte offset where the span starts.
    pub start: usize,
    /// Byte offset where the span ends (exclusive).
    pub end: usize,
}

impl TaggedSpan {
    fn new(text: &str, category: EntityCategory, start: usize, end: usize) -> Self {
        Self {
            text: text.to_string(),
            category,
            start,
            end,
        }
    }
}

// ============================================================================
// EntityExtractor trait
// ============================================================================

/// Per-call extraction errors. Never fatal to the process.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Input too long: {len} characters (max {max})")]
    InputTooLong { len: usize, max: usize },

    #[error("Recognizer error: {0}")]
    Recognizer(String),
}

/// Abstraction over entity recognizers.
pub trait EntityExtractor: Send + Sync {
    /// Tag the spans of `text`, ordered by start offset.
    fn extract(&self, text: &str) -> Result<Vec<TaggedSpan>, ExtractionError>;

    /// Extractor name for logging.
    fn name(&self) -> &str;
}

// ============================================================================
// ExtractedContext
// ============================================================================

/// Everything one translation call learned from the sentence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedContext {
    /// Last DATE span.
    pub date_entity: Option<String>,
    /// TIME spans in extractor order. Diagnostic only unless fallback is enabled.
    pub entity_times: Vec<String>,
    /// Direct pattern scan of the raw sentence, left to right. Authoritative.
    pub time_phrases: Vec<String>,
    /// Last occurrence wins per kind.
    pub named_references: BTreeMap<NamedReferenceKind, String>,
}

impl ExtractedContext {
    pub fn collect(spans: &[TaggedSpan], time_phrases: Vec<String>) -> Self {
        let mut context = ExtractedContext {
            time_phrases,
            ..Default::default()
        };

        for span in spans {
            match span.category {
                EntityCategory::Time => context.entity_times.push(span.text.clone()),
                EntityCategory::Date => context.date_entity = Some(span.text.clone()),
                EntityCategory::NamedReference(kind) => {
                    context.named_references.insert(kind, span.text.clone());
                }
            }
        }

        context
    }
}

// ============================================================================
// Gazetteer
// ============================================================================

/// Name lists keyed by kind, e.g. `{"PERSON": ["Priya Shah"], "ORG": ["Acme"]}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Gazetteer {
    pub entries: HashMap<NamedReferenceKind, Vec<String>>,
}

impl Gazetteer {
    pub fn load(path: &str) -> Result<Self, AttendError> {
        let expanded = PathBuf::from(shellexpand::tilde(path).into_owned());
        let raw = std::fs::read_to_string(&expanded)?;
        let gazetteer: Gazetteer = serde_json::from_str(&raw)?;
        Ok(gazetteer)
    }
}

// ============================================================================
// RuleBasedExtractor
// ============================================================================

static TIME_SPAN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d{1,2}(?::\d{2})?\s?(?:[ap]\.m\.|[ap]m\b)|\b(?:noon|midnight)\b")
        .expect("Invalid regex")
});

static DATE_SPAN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\b(?:January|February|March|April|May|June|July|August|September|October|November|December|",
        r"Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sep|Sept|Oct|Nov|Dec)\.?\s+\d{1,2}(?:st|nd|rd|th)?(?:,?\s+\d{4})?\b",
        r"|\b\d{4}-\d{2}-\d{2}\b",
        r"|(?i:\b(?:today|yesterday|tomorrow)\b)",
    ))
    .expect("Invalid regex")
});

static CAPITALIZED_RUN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Z][A-Za-z&]*(?:\s+[A-Z][A-Za-z&]*)*\.?").expect("Invalid regex")
});

const ORG_INDICATORS: &[&str] = &[
    "Inc", "Inc.", "LLC", "Ltd", "Ltd.", "Corp", "Corp.", "Corporation", "Company", "Co.",
    "Group", "Holdings", "Partners", "Bank", "Team", "Department", "Dept", "Division",
];

const GPE_INDICATORS: &[&str] = &[
    "City", "Town", "County", "State", "Street", "Avenue", "Road", "Office", "Campus",
    "Building", "Branch",
];

/// Pattern-based local recognizer.
///
/// No external model: times and dates come from fixed regexes, named
/// references from the gazetteer first and a capitalization heuristic second.
pub struct RuleBasedExtractor {
    gazetteer_patterns: Vec<(NamedReferenceKind, Regex)>,
    max_input_chars: usize,
}

impl RuleBasedExtractor {
    pub fn new(gazetteer: Gazetteer, max_input_chars: usize) -> Result<Self, AttendError> {
        let mut kinds: Vec<_> = gazetteer.entries.keys().copied().collect();
        kinds.sort();

        let mut gazetteer_patterns = Vec::new();
        for kind in kinds {
            let mut names: Vec<&String> = gazetteer.entries[&kind]
                .iter()
                .filter(|n| !n.trim().is_empty())
                .collect();
            if names.is_empty() {
                continue;
            }
            // Longest first so "Acme Corp" wins over "Acme"
            names.sort_by_key(|n| std::cmp::Reverse(n.len()));
            let alternation = names
                .iter()
                .map(|n| regex::escape(n.trim()))
                .collect::<Vec<_>>()
                .join("|");
            let re = Regex::new(&format!(r"\b(?:{})\b", alternation))
                .map_err(|e| AttendError::Other(format!("Invalid gazetteer pattern: {}", e)))?;
            gazetteer_patterns.push((kind, re));
        }

        Ok(Self {
            gazetteer_patterns,
            max_input_chars,
        })
    }

    fn named_references(&self, text: &str, taken: &mut Vec<(usize, usize)>) -> Vec<TaggedSpan> {
        let mut spans = Vec::new();

        for (kind, re) in &self.gazetteer_patterns {
            for m in re.find_iter(text) {
                if overlaps(taken, m.start(), m.end()) {
                    continue;
                }
                taken.push((m.start(), m.end()));
                spans.push(TaggedSpan::new(
                    m.as_str(),
                    EntityCategory::NamedReference(*kind),
                    m.start(),
                    m.end(),
                ));
            }
        }

        for m in CAPITALIZED_RUN_PATTERN.find_iter(text) {
            if overlaps(taken, m.start(), m.end()) {
                continue;
            }
            let Some(kind) = classify_capitalized_run(m.as_str()) else {
                continue;
            };
            taken.push((m.start(), m.end()));
            spans.push(TaggedSpan::new(
                m.as_str(),
                EntityCategory::NamedReference(kind),
                m.start(),
                m.end(),
            ));
        }

        spans
    }
}

impl EntityExtractor for RuleBasedExtractor {
    fn extract(&self, text: &str) -> Result<Vec<TaggedSpan>, ExtractionError> {
        let len = text.chars().count();
        if len > self.max_input_chars {
            return Err(ExtractionError::InputTooLong {
                len,
                max: self.max_input_chars,
            });
        }

        let mut spans = Vec::new();
        let mut taken: Vec<(usize, usize)> = Vec::new();

        for m in DATE_SPAN_PATTERN.find_iter(text) {
            taken.push((m.start(), m.end()));
            spans.push(TaggedSpan::new(m.as_str(), EntityCategory::Date, m.start(), m.end()));
        }

        for m in TIME_SPAN_PATTERN.find_iter(text) {
            if overlaps(&taken, m.start(), m.end()) {
                continue;
            }
            taken.push((m.start(), m.end()));
            spans.push(TaggedSpan::new(m.as_str(), EntityCategory::Time, m.start(), m.end()));
        }

        spans.extend(self.named_references(text, &mut taken));
        spans.sort_by_key(|s| s.start);

        Ok(spans)
    }

    fn name(&self) -> &str {
        "rule-based"
    }
}

fn overlaps(taken: &[(usize, usize)], start: usize, end: usize) -> bool {
    taken.iter().any(|&(s, e)| start < e && s < end)
}

/// ORG or GPE when the run ends in a known indicator word. Single words never qualify.
fn classify_capitalized_run(run: &str) -> Option<NamedReferenceKind> {
    let words: Vec<&str> = run.split_whitespace().collect();
    if words.len() < 2 {
        return None;
    }
    let last = *words.last()?;
    if ORG_INDICATORS.contains(&last) {
        Some(NamedReferenceKind::Org)
    } else if GPE_INDICATORS.contains(&last) {
        Some(NamedReferenceKind::Gpe)
    } else {
        None
    }
}

/// Build the process-wide extractor from configuration.
///
/// A configured gazetteer that cannot be read or parsed is an initialization
/// failure; callers keep the error and run degraded.
pub fn create_extractor(config: &ExtractorConfig) -> Result<Box<dyn EntityExtractor>, AttendError> {
    let gazetteer = match &config.gazetteer_path {
        Some(path) => {
            let g = Gazetteer::load(path)?;
            tracing::info!(
                path = %path,
                kinds = g.entries.len(),
                "Loaded gazetteer"
            );
            g
        }
        None => Gazetteer::default(),
    };

    Ok(Box::new(RuleBasedExtractor::new(gazetteer, config.max_input_chars)?))
}

// ============================================================================
// TESTS
// ============================================================================

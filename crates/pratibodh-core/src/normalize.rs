//! Raw verse entries → canonical, sorted [`Corpus`].
//!
//! Each raw entry is normalized independently into a
//! `Result<Verse, SkipReason>`. Failures never abort the pass; they are
//! collected into [`NormalizeReport::skipped`] so callers can count and log
//! them. The surviving verses are sorted by `(chapter, verse)`.
//!
//! # Example
//!
//! ```rust
//! use pratibodh_core::normalize::{normalize, NormalizeOptions};
//! use serde_json::json;
//!
//! let raw = vec![
//!     json!({"chapter_number": 2, "verse_number": 47, "text": "X", "meaning_en": "Do your duty"}),
//!     json!({"chapter_number": "1", "verse_number": 1, "text": "Y", "meaning_en": "Listen well"}),
//!     json!({"verse_number": 3, "text": "Z"}),
//! ];
//! let report = normalize(&raw, &NormalizeOptions::default());
//! assert_eq!(report.corpus.len(), 2);
//! assert_eq!(report.skipped.len(), 1);
//! assert_eq!(report.corpus.verses()[0].id, "GITA_1_1");
//! ```

use std::collections::HashSet;

use serde_json::Value;

use crate::corpus::Corpus;
use crate::models::{retrieval_text, RawVerse, Verse, DEFAULT_NAMESPACE};

/// Knobs for [`normalize`].
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Id prefix, e.g. `GITA` → `GITA_2_47`.
    pub namespace: String,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

/// Why a raw entry was left out of the corpus.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("entry does not match the verse schema: {0}")]
    Malformed(String),
    #[error("missing chapter number")]
    MissingChapter,
    #[error("chapter number is not an integer: {0}")]
    InvalidChapter(String),
    #[error("missing verse number")]
    MissingVerse,
    #[error("verse number is not an integer: {0}")]
    InvalidVerse(String),
    #[error("no translation or Sanskrit text to embed")]
    EmptyText,
    #[error("duplicate of {0}")]
    Duplicate(String),
}

/// A raw entry that was dropped, with its position in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    pub position: usize,
    pub reason: SkipReason,
}

/// Outcome of a normalization pass.
///
/// `corpus.len() + skipped.len()` always equals the input length.
#[derive(Debug, Clone)]
pub struct NormalizeReport {
    pub corpus: Corpus,
    pub skipped: Vec<SkippedRecord>,
}

/// Normalize a batch of raw JSON entries into a sorted corpus.
///
/// Duplicate `(chapter, verse)` pairs keep the first occurrence in input
/// order; later ones are skipped as [`SkipReason::Duplicate`].
pub fn normalize(raw: &[Value], options: &NormalizeOptions) -> NormalizeReport {
    let mut verses: Vec<Verse> = Vec::with_capacity(raw.len());
    let mut skipped = Vec::new();
    let mut seen: HashSet<(u32, u32)> = HashSet::new();

    for (position, value) in raw.iter().enumerate() {
        let outcome = serde_json::from_value::<RawVerse>(value.clone())
            .map_err(|e| SkipReason::Malformed(e.to_string()))
            .and_then(|rv| normalize_verse(&rv, &options.namespace))
            .and_then(|v| {
                if seen.insert(v.key()) {
                    Ok(v)
                } else {
                    Err(SkipReason::Duplicate(v.id))
                }
            });

        match outcome {
            Ok(v) => verses.push(v),
            Err(reason) => {
                tracing::debug!(position, %reason, "skipping raw verse");
                skipped.push(SkippedRecord { position, reason });
            }
        }
    }

    verses.sort_by_key(Verse::key);

    NormalizeReport {
        corpus: Corpus::from_sorted_unchecked(verses),
        skipped,
    }
}

/// Normalize a single typed raw entry.
pub fn normalize_verse(raw: &RawVerse, namespace: &str) -> Result<Verse, SkipReason> {
    let chapter = match coerce_key(raw.chapter_number.as_ref()) {
        Ok(n) => n,
        Err(KeyError::Missing) => return Err(SkipReason::MissingChapter),
        Err(KeyError::Invalid(v)) => return Err(SkipReason::InvalidChapter(v)),
    };
    let verse = match coerce_key(raw.verse_number.as_ref()) {
        Ok(n) => n,
        Err(KeyError::Missing) => return Err(SkipReason::MissingVerse),
        Err(KeyError::Invalid(v)) => return Err(SkipReason::InvalidVerse(v)),
    };

    let sanskrit = trimmed(&raw.text);
    let translation = trimmed(&raw.meaning_en);
    let text = retrieval_text(&translation, &sanskrit);
    if text.is_empty() {
        return Err(SkipReason::EmptyText);
    }

    let (speaker, audience) = speaker_for_chapter(chapter);

    Ok(Verse {
        id: verse_id(namespace, chapter, verse),
        chapter,
        verse,
        reference: format!("{}.{}", chapter, verse),
        sanskrit,
        transliteration: trimmed(&raw.transliteration),
        word_meanings: trimmed(&raw.word_meanings),
        translation,
        retrieval_text: text,
        context_tags: Vec::new(),
        speaker: speaker.to_string(),
        audience: audience.to_string(),
    })
}

/// `<namespace>_<chapter>_<verse>`.
pub fn verse_id(namespace: &str, chapter: u32, verse: u32) -> String {
    format!("{}_{}_{}", namespace, chapter, verse)
}

/// Speaker and audience for a chapter.
///
/// Chapter 1 is Dhritarashtra's question to Sanjaya; everything after is
/// treated as Krishna speaking to Arjuna. This is a coarse rule: several
/// later verses are spoken by Arjuna or Sanjaya.
pub fn speaker_for_chapter(chapter: u32) -> (&'static str, &'static str) {
    if chapter > 1 {
        ("Krishna", "Arjuna")
    } else {
        ("Dhritarashtra", "Sanjaya")
    }
}

#[derive(Debug, PartialEq, Eq)]
enum KeyError {
    Missing,
    Invalid(String),
}

/// Coerce an integer-like JSON value into a chapter or verse number.
///
/// Accepts non-negative integers, floats with no fractional part, and
/// strings that parse as a non-negative integer after trimming. This is
/// stricter than plain integer parsing: negative numbers are integers but
/// never valid chapter or verse numbers, so they are rejected as invalid,
/// as are booleans and values above `u32::MAX`.
fn coerce_key(value: Option<&Value>) -> Result<u32, KeyError> {
    let value = match value {
        None | Some(Value::Null) => return Err(KeyError::Missing),
        Some(v) => v,
    };
    let invalid = || KeyError::Invalid(value.to_string());

    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                u32::try_from(u).map_err(|_| invalid())
            } else if let Some(f) = n.as_f64() {
                if f.fract() == 0.0 && f >= 0.0 && f <= u32::MAX as f64 {
                    Ok(f as u32)
                } else {
                    Err(invalid())
                }
            } else {
                Err(invalid())
            }
        }
        Value::String(s) => s.trim().parse::<u32>().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

fn trimmed(field: &Option<String>) -> String {
    field.as_deref().map(str::trim).unwrap_or_default().to_string()
}

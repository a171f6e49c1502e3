//! Verse records as they flow through ingestion and retrieval.
//!
//! [`RawVerse`] is the loosely-shaped upstream entry; [`Verse`] is the
//! canonical record written to the corpus file and returned by retrieval.

use serde::{Deserialize, Serialize};

/// Namespace prefix for verse ids (`GITA_2_47`).
pub const DEFAULT_NAMESPACE: &str = "GITA";

/// Upstream verse entry before normalization.
///
/// Every field is optional; defaulting and coercion happen once, in
/// [`normalize_verse`](crate::normalize::normalize_verse). Chapter and
/// verse numbers are kept as raw JSON values because upstream dumps mix
/// integers and numeric strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawVerse {
    #[serde(default, alias = "chapter")]
    pub chapter_number: Option<serde_json::Value>,
    #[serde(default, alias = "verse")]
    pub verse_number: Option<serde_json::Value>,
    /// Original Sanskrit text.
    #[serde(default, alias = "sanskrit")]
    pub text: Option<String>,
    #[serde(default)]
    pub transliteration: Option<String>,
    #[serde(default)]
    pub word_meanings: Option<String>,
    /// English meaning.
    #[serde(default, alias = "translation")]
    pub meaning_en: Option<String>,
}

/// A canonical, retrievable verse.
///
/// Field names match the on-disk corpus document; `translation` is stored
/// as `meaning_en`. Fields other than the keys default to empty so that
/// corpus files written by older tooling still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verse {
    /// `<NAMESPACE>_<chapter>_<verse>`, unique within a corpus.
    pub id: String,
    pub chapter: u32,
    pub verse: u32,
    /// Display label, `<chapter>.<verse>`.
    pub reference: String,
    #[serde(default)]
    pub sanskrit: String,
    #[serde(default)]
    pub transliteration: String,
    #[serde(default)]
    pub word_meanings: String,
    #[serde(default, rename = "meaning_en")]
    pub translation: String,
    /// The only text that is embedded: translation followed by Sanskrit.
    #[serde(default)]
    pub retrieval_text: String,
    #[serde(default)]
    pub context_tags: Vec<String>,
    #[serde(default)]
    pub speaker: String,
    #[serde(default)]
    pub audience: String,
}

impl Verse {
    /// Sort key used for corpus order.
    pub fn key(&self) -> (u32, u32) {
        (self.chapter, self.verse)
    }
}

/// Join translation and Sanskrit into the text that gets embedded.
///
/// Empty parts are omitted, so a verse with only one of the two still
/// yields clean text. Returns an empty string when both are empty.
pub fn retrieval_text(translation: &str, sanskrit: &str) -> String {
    [translation.trim(), sanskrit.trim()]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

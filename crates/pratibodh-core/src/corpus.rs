//! The ordered verse collection and its on-disk document.
//!
//! A [`Corpus`] is always sorted by `(chapter, verse)` and never holds two
//! verses with the same id. Ordinals into it (`0..len`) are what the
//! [`SimilarityIndex`](crate::index::SimilarityIndex) returns.
//!
//! [`CorpusFile`] is the canonical JSON document:
//!
//! ```json
//! {
//!   "meta": { "text": "Bhagavad Gita", "mode": "contextual_retrieval",
//!             "language": "Sanskrit", "total_chapters": 18, "total_verses": 700 },
//!   "verses": [ { "id": "GITA_1_1", "chapter": 1, "verse": 1, ... } ]
//! }
//! ```

use std::collections::{BTreeMap, HashSet};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;
use crate::models::{retrieval_text, Verse};
use crate::normalize::speaker_for_chapter;

/// Retrieval mode tag written into every corpus file.
pub const CORPUS_MODE: &str = "contextual_retrieval";

/// Sorted, id-unique sequence of verses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    verses: Vec<Verse>,
}

impl Corpus {
    /// Build a corpus from verses in any order.
    ///
    /// Sorts by `(chapter, verse)` (stable) and rejects repeated ids.
    pub fn from_verses(mut verses: Vec<Verse>) -> Result<Self, RetrievalError> {
        let mut ids = HashSet::with_capacity(verses.len());
        for v in &verses {
            if !ids.insert(v.id.as_str()) {
                return Err(RetrievalError::DuplicateId(v.id.clone()));
            }
        }
        verses.sort_by_key(Verse::key);
        Ok(Self { verses })
    }

    /// Caller guarantees order and id uniqueness (the normalizer does).
    pub(crate) fn from_sorted_unchecked(verses: Vec<Verse>) -> Self {
        debug_assert!(verses.windows(2).all(|w| w[0].key() <= w[1].key()));
        Self { verses }
    }

    pub fn verses(&self) -> &[Verse] {
        &self.verses
    }

    /// Verse at `ordinal`, if in range.
    pub fn get(&self, ordinal: usize) -> Option<&Verse> {
        self.verses.get(ordinal)
    }

    pub fn len(&self) -> usize {
        self.verses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Verse> {
        self.verses.iter()
    }

    /// Texts to embed, in ordinal order.
    pub fn retrieval_texts(&self) -> Vec<String> {
        self.verses.iter().map(|v| v.retrieval_text.clone()).collect()
    }

    /// Verse count per chapter, ascending by chapter.
    pub fn chapter_counts(&self) -> BTreeMap<u32, usize> {
        let mut counts = BTreeMap::new();
        for v in &self.verses {
            *counts.entry(v.chapter).or_insert(0) += 1;
        }
        counts
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Verse;
    type IntoIter = std::slice::Iter<'a, Verse>;

    fn into_iter(self) -> Self::IntoIter {
        self.verses.iter()
    }
}

/// Header block of a corpus file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusMeta {
    /// Corpus label, e.g. `"Bhagavad Gita"`.
    pub text: String,
    pub mode: String,
    pub language: String,
    /// Number of distinct chapters present.
    pub total_chapters: usize,
    pub total_verses: usize,
}

/// The canonical corpus document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusFile {
    pub meta: CorpusMeta,
    pub verses: Vec<Verse>,
}

impl CorpusFile {
    pub fn from_corpus(corpus: &Corpus, label: &str, language: &str) -> Self {
        Self {
            meta: CorpusMeta {
                text: label.to_string(),
                mode: CORPUS_MODE.to_string(),
                language: language.to_string(),
                total_chapters: corpus.chapter_counts().len(),
                total_verses: corpus.len(),
            },
            verses: corpus.verses().to_vec(),
        }
    }

    /// Pretty-printed JSON; non-ASCII text is written verbatim.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize corpus")
    }

    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).context("Failed to parse corpus file")
    }

    /// Turn the file into a [`Corpus`], filling derived fields.
    ///
    /// Entries written without `retrieval_text`, `speaker`, or `audience`
    /// get them derived. Entries that still have no text to embed are
    /// dropped with a warning. Repeated ids are an error.
    pub fn into_corpus(self) -> Result<Corpus, RetrievalError> {
        let mut verses = Vec::with_capacity(self.verses.len());
        for mut v in self.verses {
            if v.retrieval_text.trim().is_empty() {
                v.retrieval_text = retrieval_text(&v.translation, &v.sanskrit);
            }
            if v.retrieval_text.is_empty() {
                tracing::warn!(id = %v.id, "dropping verse with no text to embed");
                continue;
            }
            if v.speaker.is_empty() || v.audience.is_empty() {
                let (speaker, audience) = speaker_for_chapter(v.chapter);
                v.speaker = speaker.to_string();
                v.audience = audience.to_string();
            }
            verses.push(v);
        }
        Corpus::from_verses(verses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{normalize, NormalizeOptions};
    use serde_json::json;

    fn sample_corpus() -> Corpus {
        let raw = vec![
            json!({
                "chapter_number": 2,
                "verse_number": 47,
                "text": "कर्मण्येवाधिकारस्ते मा फलेषु कदाचन।",
                "transliteration": "karmaṇy-evādhikāras te mā phaleṣhu kadāchana",
                "word_meanings": "karmaṇi—in prescribed duties; eva—only",
                "meaning_en": "You have a right to perform your prescribed duty, but not to the fruits of action."
            }),
            json!({
                "chapter_number": 1,
                "verse_number": 1,
                "text": "धर्मक्षेत्रे कुरुक्षेत्रे समवेता युयुत्सवः।",
                "meaning_en": "On the field of dharma, what did my sons and the sons of Pandu do?"
            }),
        ];
        normalize(&raw, &NormalizeOptions::default()).corpus
    }

    #[test]
    fn test_roundtrip_preserves_records() {
        let corpus = sample_corpus();
        let file = CorpusFile::from_corpus(&corpus, "Bhagavad Gita", "Sanskrit");
        let json = file.to_json().unwrap();

        let parsed = CorpusFile::from_json(&json).unwrap();
        assert_eq!(parsed, file);
        assert_eq!(parsed.into_corpus().unwrap(), corpus);
    }

    #[test]
    fn test_json_keeps_devanagari_verbatim() {
        let corpus = sample_corpus();
        let json = CorpusFile::from_corpus(&corpus, "Bhagavad Gita", "Sanskrit")
            .to_json()
            .unwrap();
        assert!(json.contains("धर्मक्षेत्रे कुरुक्षेत्रे"));
        assert!(json.contains("phaleṣhu"));
        assert!(!json.contains("\\u"));
        assert!(json.contains("\"meaning_en\""));
    }

    #[test]
    fn test_meta_counts() {
        let corpus = sample_corpus();
        let file = CorpusFile::from_corpus(&corpus, "Bhagavad Gita", "Sanskrit");
        assert_eq!(file.meta.text, "Bhagavad Gita");
        assert_eq!(file.meta.mode, "contextual_retrieval");
        assert_eq!(file.meta.total_chapters, 2);
        assert_eq!(file.meta.total_verses, 2);
    }

    #[test]
    fn test_legacy_entries_get_derived_fields() {
        let json = r#"{
            "meta": {"text": "Bhagavad Gita", "mode": "contextual_retrieval",
                     "language": "Sanskrit", "total_chapters": 18, "total_verses": 3},
            "verses": [
                {"id": "GITA_2_1", "chapter": 2, "verse": 1, "reference": "2.1",
                 "sanskrit": "तं तथा कृपयाविष्टम्", "context_tags": []},
                {"id": "GITA_1_1", "chapter": 1, "verse": 1, "reference": "1.1",
                 "sanskrit": "धर्मक्षेत्रे", "meaning_en": "On the field of dharma",
                 "speaker": "Dhritarashtra", "audience": "Sanjaya"},
                {"id": "GITA_1_2", "chapter": 1, "verse": 2, "reference": "1.2"}
            ]
        }"#;
        let corpus = CorpusFile::from_json(json).unwrap().into_corpus().unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.verses()[0].id, "GITA_1_1");
        assert_eq!(corpus.verses()[0].retrieval_text, "On the field of dharma धर्मक्षेत्रे");
        assert_eq!(corpus.verses()[1].retrieval_text, "तं तथा कृपयाविष्टम्");
        assert_eq!(corpus.verses()[1].speaker, "Krishna");
        assert_eq!(corpus.verses()[1].audience, "Arjuna");
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut verses = sample_corpus().verses().to_vec();
        verses.push(verses[0].clone());
        let err = Corpus::from_verses(verses).unwrap_err();
        assert!(matches!(err, RetrievalError::DuplicateId(id) if id == "GITA_1_1"));
    }

    #[test]
    fn test_from_verses_sorts() {
        let mut verses = sample_corpus().verses().to_vec();
        verses.reverse();
        let corpus = Corpus::from_verses(verses).unwrap();
        assert_eq!(corpus.verses()[0].reference, "1.1");
        assert_eq!(corpus.get(1).map(|v| v.reference.as_str()), Some("2.47"));
        assert!(corpus.get(2).is_none());
    }
}

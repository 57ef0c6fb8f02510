//! Cross-catalog duplicate detection by shared significant title words.
//!
//! Conservative on purpose: a single shared word ("chile", "mina") never
//! merges two records, and two records with unrelated titles are never
//! merged even when they describe the same conflict.

use std::collections::HashMap;

use tracing::debug;

use crate::normalize::{normalize, significant_words, SHORT_WORD_MAX};
use crate::types::SourceRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchConfig {
    /// Minimum number of distinct shared significant words for a link.
    pub min_shared_words: usize,
    /// Words of this many characters or fewer are ignored.
    pub short_word_max: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            min_shared_words: 2,
            short_word_max: SHORT_WORD_MAX,
        }
    }
}

/// A candidate judged to describe the same conflict as a reference record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateLink {
    pub reference_index: usize,
    pub candidate_index: usize,
    /// Distinct significant words the two titles share.
    pub score: usize,
}

/// Inverted index: significant word → reference positions containing it.
pub struct TitleIndex {
    words: HashMap<String, Vec<usize>>,
    config: MatchConfig,
}

impl TitleIndex {
    pub fn build<'a>(reference: impl IntoIterator<Item = &'a SourceRecord>, config: MatchConfig) -> Self {
        let mut words: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, record) in reference.into_iter().enumerate() {
            let norm = normalize(&record.title);
            for w in significant_words(&norm, config.short_word_max) {
                words.entry(w.to_string()).or_default().push(i);
            }
        }
        TitleIndex { words, config }
    }

    /// Best reference for one title, if it clears the threshold.
    ///
    /// Highest co-occurrence wins; equal counts go to the lowest reference
    /// position.
    pub fn best_match(&self, title: &str) -> Option<(usize, usize)> {
        let norm = normalize(title);
        let mut counts: HashMap<usize, usize> = HashMap::new();
        for w in significant_words(&norm, self.config.short_word_max) {
            if let Some(refs) = self.words.get(w) {
                for &r in refs {
                    *counts.entry(r).or_insert(0) += 1;
                }
            }
        }

        let mut best: Option<(usize, usize)> = None;
        let mut tied = false;
        for (&r, &score) in &counts {
            match best {
                None => best = Some((r, score)),
                Some((br, bs)) if score > bs || (score == bs && r < br) => {
                    tied = score == bs;
                    best = Some((r, score));
                }
                Some((_, bs)) if score == bs => tied = true,
                _ => {}
            }
        }

        let (reference, score) = best?;
        if score < self.config.min_shared_words {
            return None;
        }
        if tied {
            debug!(
                "Ambiguous duplicate - title={:?}, score={}, chosen_reference={}",
                title, score, reference
            );
        }
        Some((reference, score))
    }
}

/// Link every candidate that shares enough significant title words with a
/// reference record. At most one link per candidate, in candidate order.
pub fn find_duplicates(
    reference: &[&SourceRecord],
    candidates: &[&SourceRecord],
    config: MatchConfig,
) -> Vec<DuplicateLink> {
    let index = TitleIndex::build(reference.iter().copied(), config);
    candidates
        .iter()
        .enumerate()
        .filter_map(|(candidate_index, c)| {
            index.best_match(&c.title).map(|(reference_index, score)| DuplicateLink {
                reference_index,
                candidate_index,
                score,
            })
        })
        .collect()
}

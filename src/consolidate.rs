//! Master-record consolidation across the three catalogs.
//!
//! Sources are visited in [`SOURCE_PRIORITY`] order. Each unconsumed record
//! of the current source becomes a master record; before emitting, every
//! lower-priority source is matched against the current source's unconsumed
//! records and the best candidate per reference is folded in as a
//! cross-reference (and consumed). With the default priority this is:
//! EJAtlas and OCMAL against INDH, then OCMAL against the leftover EJAtlas,
//! then whatever OCMAL remains.

use serde::Serialize;
use tracing::{debug, info};

use crate::classifier::Classifier;
use crate::inference::infer_missing;
use crate::matcher::{find_duplicates, MatchConfig};
use crate::taxonomy::FallbackRules;
use crate::types::{
    CanonicalFields, Categories, MasterRecord, SourceName, SourceRecord, SourceRef, TagList, Taxonomy,
    SOURCE_PRIORITY,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsolidateConfig {
    pub matching: MatchConfig,
    /// `CONF` in `CONF-0001`
    pub id_prefix: String,
    /// Zero-padded digits of the sequence number.
    pub id_width: usize,
    /// Run the inference fallback on empty taxonomies.
    pub infer_missing: bool,
}

impl Default for ConsolidateConfig {
    fn default() -> Self {
        ConsolidateConfig {
            matching: MatchConfig::default(),
            id_prefix: "CONF".to_string(),
            id_width: 4,
            infer_missing: true,
        }
    }
}

/// Chosen cross-reference for one source slot: (candidate position, score).
type Attachment = Option<(usize, usize)>;

pub struct Consolidator<'a> {
    classifier: &'a Classifier,
    fallback: &'a FallbackRules,
    config: ConsolidateConfig,
}

impl<'a> Consolidator<'a> {
    pub fn new(classifier: &'a Classifier, fallback: &'a FallbackRules, config: ConsolidateConfig) -> Self {
        Consolidator {
            classifier,
            fallback,
            config,
        }
    }

    /// Merge the three catalogs into categorized master records.
    ///
    /// Pure: identical, identically ordered inputs give identical output.
    pub fn consolidate(
        &self,
        indh: &[SourceRecord],
        ejatlas: &[SourceRecord],
        ocmal: &[SourceRecord],
    ) -> Vec<MasterRecord> {
        let collections: [&[SourceRecord]; 3] = [indh, ejatlas, ocmal];
        let mut consumed = collections.map(|c| vec![false; c.len()]);
        let mut masters = Vec::with_capacity(indh.len() + ejatlas.len() + ocmal.len());

        for source in SOURCE_PRIORITY {
            let rank = source.rank();
            let ref_positions = unconsumed(&consumed[rank]);
            let reference: Vec<&SourceRecord> =
                ref_positions.iter().map(|&i| &collections[rank][i]).collect();

            let mut attachments: Vec<[Attachment; 3]> = vec![[None; 3]; ref_positions.len()];
            for lower in &SOURCE_PRIORITY[rank + 1..] {
                let lr = lower.rank();
                let cand_positions = unconsumed(&consumed[lr]);
                let candidates: Vec<&SourceRecord> =
                    cand_positions.iter().map(|&i| &collections[lr][i]).collect();

                let links = find_duplicates(&reference, &candidates, self.config.matching);
                debug!(
                    "Matched {} against {} - references={}, candidates={}, links={}",
                    lower.label(),
                    source.label(),
                    reference.len(),
                    candidates.len(),
                    links.len()
                );

                for link in links {
                    let cand = cand_positions[link.candidate_index];
                    let slot = &mut attachments[link.reference_index][lr];
                    match *slot {
                        Some((kept, score)) if score >= link.score => {
                            debug!(
                                "{} record {:?} also matches {} record {:?}; keeping {:?}",
                                lower.label(),
                                collections[lr][cand].source_id,
                                source.label(),
                                reference[link.reference_index].source_id,
                                collections[lr][kept].source_id
                            );
                        }
                        _ => *slot = Some((cand, link.score)),
                    }
                }
            }

            for (pos, &i) in ref_positions.iter().enumerate() {
                consumed[rank][i] = true;
                let record = &collections[rank][i];

                let mut refs: [Option<SourceRef>; 3] = [None, None, None];
                refs[rank] = Some(SourceRef::from_record(record));
                for (lr, attachment) in attachments[pos].iter().enumerate() {
                    if let Some((cand, _)) = *attachment {
                        consumed[lr][cand] = true;
                        refs[lr] = Some(SourceRef::from_record(&collections[lr][cand]));
                    }
                }

                masters.push(MasterRecord {
                    master_id: self.master_id(masters.len() + 1),
                    primary_source: source,
                    fields: CanonicalFields::from_record(record),
                    refs,
                    categories: self.categorize(record),
                });
            }
        }

        debug_assert!(consumed.iter().all(|c| c.iter().all(|&x| x)));
        info!(
            "Consolidated {} INDH + {} EJAtlas + {} OCMAL records into {} master records",
            indh.len(),
            ejatlas.len(),
            ocmal.len(),
            masters.len()
        );
        masters
    }

    fn master_id(&self, seq: usize) -> String {
        format!("{}-{:0width$}", self.config.id_prefix, seq, width = self.config.id_width)
    }

    /// Classifier tags from the primary text; empty taxonomies go through
    /// the inference fallback.
    fn categorize(&self, record: &SourceRecord) -> Categories {
        let mut categories = self
            .classifier
            .classify_all(&record.descriptive_text(), record.source_name.language());

        if self.config.infer_missing {
            let description = record.description.as_deref().unwrap_or("");
            for taxonomy in Taxonomy::ALL {
                if categories.get(taxonomy).is_empty() {
                    let tags = infer_missing(
                        self.fallback,
                        record.source_name,
                        &record.title,
                        description,
                        taxonomy,
                    );
                    *categories.get_mut(taxonomy) = TagList::inferred(tags);
                }
            }
        }
        categories
    }
}

fn unconsumed(consumed: &[bool]) -> Vec<usize> {
    consumed
        .iter()
        .enumerate()
        .filter(|(_, c)| !**c)
        .map(|(i, _)| i)
        .collect()
}

// ── Run summary ──────────────────────────────────────────────────────

/// Counts describing one consolidation run, for the log and the summary
/// file.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub taxonomy_version: String,
    pub input_indh: usize,
    pub input_ejatlas: usize,
    pub input_ocmal: usize,
    pub total_masters: usize,
    pub primary_indh: usize,
    pub primary_ejatlas: usize,
    pub primary_ocmal: usize,
    pub indh_with_ejatlas: usize,
    pub indh_with_ocmal: usize,
    pub ejatlas_with_ocmal_without_indh: usize,
    pub in_all_three: usize,
    pub inferred_impacts: usize,
    pub inferred_actors: usize,
}

impl RunSummary {
    pub fn new(
        taxonomy_version: &str,
        inputs: [usize; 3],
        masters: &[MasterRecord],
    ) -> Self {
        let mut s = RunSummary {
            taxonomy_version: taxonomy_version.to_string(),
            input_indh: inputs[0],
            input_ejatlas: inputs[1],
            input_ocmal: inputs[2],
            total_masters: masters.len(),
            ..Default::default()
        };

        for m in masters {
            match m.primary_source {
                SourceName::Indh => {
                    s.primary_indh += 1;
                    s.indh_with_ejatlas += m.is_present_in(SourceName::EjAtlas) as usize;
                    s.indh_with_ocmal += m.is_present_in(SourceName::Ocmal) as usize;
                }
                SourceName::EjAtlas => {
                    s.primary_ejatlas += 1;
                    s.ejatlas_with_ocmal_without_indh += m.is_present_in(SourceName::Ocmal) as usize;
                }
                SourceName::Ocmal => s.primary_ocmal += 1,
            }
            s.in_all_three += (m.source_count() == 3) as usize;
            s.inferred_impacts += m.categories.impacts.inferred as usize;
            s.inferred_actors += m.categories.actors.inferred as usize;
        }
        s
    }

    pub fn log(&self) {
        info!(
            "Masters by primary source - INDH={}, EJAtlas={}, OCMAL={}",
            self.primary_indh, self.primary_ejatlas, self.primary_ocmal
        );
        info!(
            "Cross-source coverage - INDH+EJAtlas={}, INDH+OCMAL={}, EJAtlas+OCMAL without INDH={}, all three={}",
            self.indh_with_ejatlas, self.indh_with_ocmal, self.ejatlas_with_ocmal_without_indh, self.in_all_three
        );
        info!(
            "Inference applied - impacts={}, actors={}",
            self.inferred_impacts, self.inferred_actors
        );
    }
}

use std::collections::HashMap;

use regex::Regex;
use tracing::debug;

use crate::error::{ConsolidateError, Result};
use crate::normalize::{clean_html, normalize};
use crate::taxonomy::TaxonomyConfig;
use crate::types::{Categories, Language, Tag, TagList, Taxonomy};

/// One tag with its compiled alternatives, in rule order.
struct CompiledRule {
    tag: Tag,
    alternatives: Vec<Regex>,
}

/// Holds the compiled rule sets for every (language, taxonomy) pair.
///
/// Built once from a [`TaxonomyConfig`]; matching never allocates regexes.
pub struct Classifier {
    rule_sets: HashMap<(Language, Taxonomy), Vec<CompiledRule>>,
    version: String,
}

impl Classifier {
    /// Compile every pattern of `config`. Any invalid pattern is fatal.
    pub fn new(config: &TaxonomyConfig) -> Result<Self> {
        let mut rule_sets = HashMap::new();
        let mut pattern_count = 0usize;

        for rs in &config.rule_sets {
            let mut compiled = Vec::with_capacity(rs.rules.len());
            for rule in &rs.rules {
                if rule.tag.taxonomy() != rs.taxonomy {
                    return Err(ConsolidateError::MisplacedTag {
                        taxonomy: rs.taxonomy,
                        tag: rule.tag,
                    });
                }
                let alternatives = rule
                    .patterns
                    .iter()
                    .map(|p| {
                        Regex::new(p).map_err(|source| ConsolidateError::InvalidPattern {
                            language: rs.language,
                            taxonomy: rs.taxonomy,
                            tag: rule.tag,
                            pattern: p.clone(),
                            source,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                pattern_count += alternatives.len();
                compiled.push(CompiledRule {
                    tag: rule.tag,
                    alternatives,
                });
            }
            if rule_sets.insert((rs.language, rs.taxonomy), compiled).is_some() {
                return Err(ConsolidateError::DuplicateRuleSet {
                    language: rs.language,
                    taxonomy: rs.taxonomy,
                });
            }
        }

        debug!(
            "Classifier compiled - version={}, rule_sets={}, patterns={}",
            config.version,
            rule_sets.len(),
            pattern_count
        );

        Ok(Classifier {
            rule_sets,
            version: config.version.clone(),
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Tags of one taxonomy found in `text` (raw, possibly HTML).
    pub fn classify(&self, text: &str, language: Language, taxonomy: Taxonomy) -> Vec<Tag> {
        self.classify_normalized(&prepare(text), language, taxonomy)
    }

    /// All four taxonomies on one text. Every list is classifier-derived.
    pub fn classify_all(&self, text: &str, language: Language) -> Categories {
        let prepared = prepare(text);
        let mut categories = Categories::default();
        for taxonomy in Taxonomy::ALL {
            *categories.get_mut(taxonomy) =
                TagList::extracted(self.classify_normalized(&prepared, language, taxonomy));
        }
        categories
    }

    fn classify_normalized(&self, normalized: &str, language: Language, taxonomy: Taxonomy) -> Vec<Tag> {
        if normalized.is_empty() {
            return Vec::new();
        }
        let Some(rules) = self.rule_sets.get(&(language, taxonomy)) else {
            return Vec::new();
        };
        rules
            .iter()
            .filter(|rule| rule.alternatives.iter().any(|re| re.is_match(normalized)))
            .map(|rule| rule.tag)
            .collect()
    }
}

fn prepare(text: &str) -> String {
    normalize(&clean_html(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{RuleSet, TagRule};

    fn classifier() -> Classifier {
        Classifier::new(&TaxonomyConfig::default()).expect("built-in rules compile")
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        let c = classifier();
        for language in [Language::Spanish, Language::English] {
            assert!(c.classify_all("", language).is_empty());
            assert!(c.classify_all("  <p></p> ", language).is_empty());
        }
    }

    #[test]
    fn test_spanish_multiple_tags() {
        let c = classifier();
        let text = "La comunidad mapuche presentó un recurso de protección por la \
                    contaminación del río con relaves mineros.";
        let cats = c.classify_all(text, Language::Spanish);
        assert_eq!(cats.impacts.tags, vec![Tag::Water, Tag::Soil]);
        assert_eq!(cats.actors.tags, vec![Tag::Indigenous]);
        assert_eq!(cats.resistances.tags, vec![Tag::Judicial]);
        assert!(!cats.impacts.inferred);
    }

    #[test]
    fn test_accent_variants_match() {
        let c = classifier();
        // Unaccented spelling and HTML entity spelling both hit "hidric"
        assert_eq!(c.classify("estres hidrico", Language::Spanish, Taxonomy::Impact), vec![Tag::Water]);
        assert_eq!(
            c.classify("crisis h&iacute;drica", Language::Spanish, Taxonomy::Impact),
            vec![Tag::Water]
        );
    }

    #[test]
    fn test_word_boundaries_on_short_patterns() {
        let c = classifier();
        // "territorio" must not read as "rio"; "aprobado" must not read as "APR"
        assert!(c.classify("territorio", Language::Spanish, Taxonomy::Impact).is_empty());
        assert!(c.classify("proyecto aprobado", Language::Spanish, Taxonomy::Actor).is_empty());
        assert_eq!(
            c.classify("comité APR de la localidad", Language::Spanish, Taxonomy::Actor),
            vec![Tag::Farmer]
        );
    }

    #[test]
    fn test_english_rules_for_atlas() {
        let c = classifier();
        let text = "Indigenous communities protest against tailings dam; \
                    the project was suspended by the court.";
        let cats = c.classify_all(text, Language::English);
        assert_eq!(cats.impacts.tags, vec![Tag::Soil]);
        assert_eq!(cats.actors.tags, vec![Tag::Indigenous]);
        assert_eq!(cats.resistances.tags, vec![Tag::Judicial, Tag::Mobilization]);
        assert_eq!(cats.outcomes.tags, vec![Tag::Halted]);
    }

    #[test]
    fn test_language_sets_are_separate() {
        let c = classifier();
        assert!(c.classify("water pollution", Language::Spanish, Taxonomy::Impact).is_empty());
        assert_eq!(c.classify("agua", Language::Spanish, Taxonomy::Impact), vec![Tag::Water]);
    }

    #[test]
    fn test_invalid_pattern_is_fatal() {
        let mut cfg = TaxonomyConfig::default();
        cfg.rule_sets[0].rules.push(TagRule {
            tag: Tag::Air,
            patterns: vec!["(unclosed".into()],
        });
        match Classifier::new(&cfg) {
            Err(ConsolidateError::InvalidPattern { pattern, tag, .. }) => {
                assert_eq!(pattern, "(unclosed");
                assert_eq!(tag, Tag::Air);
            }
            other => panic!("expected InvalidPattern, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_second_rule_set_for_same_pair_is_rejected() {
        // Appending a set must not silently shadow the built-in one
        let mut cfg = TaxonomyConfig::default();
        cfg.rule_sets.push(RuleSet {
            language: Language::Spanish,
            taxonomy: Taxonomy::Impact,
            rules: vec![TagRule {
                tag: Tag::Air,
                patterns: vec!["humareda".into()],
            }],
        });
        assert!(matches!(
            Classifier::new(&cfg),
            Err(ConsolidateError::DuplicateRuleSet {
                language: Language::Spanish,
                taxonomy: Taxonomy::Impact,
            })
        ));
    }

    #[test]
    fn test_misplaced_tag_is_rejected() {
        let mut cfg = TaxonomyConfig::default();
        cfg.rule_sets[0].rules.push(TagRule {
            tag: Tag::Urban,
            patterns: vec!["x".into()],
        });
        assert!(matches!(
            Classifier::new(&cfg),
            Err(ConsolidateError::MisplacedTag { tag: Tag::Urban, .. })
        ));
    }
}

//! Structural default categories for records the classifier left empty.
//!
//! Only the impact and actor taxonomies are ever inferred. Records whose
//! primary source is the human-rights registry keep their gaps.

use crate::normalize::{clean_html, normalize};
use crate::taxonomy::FallbackRules;
use crate::types::{SourceName, Tag, Taxonomy};

/// Default tags for `taxonomy`, or empty when no rule applies.
///
/// `title` and `description` are the primary source's raw text.
pub fn infer_missing(
    rules: &FallbackRules,
    primary_source: SourceName,
    title: &str,
    description: &str,
    taxonomy: Taxonomy,
) -> Vec<Tag> {
    match (primary_source, taxonomy) {
        (SourceName::Ocmal, Taxonomy::Impact) => rules.mining_impacts.clone(),
        (SourceName::Ocmal, Taxonomy::Actor) => {
            let title = normalize(title);
            let indigenous = rules
                .indigenous_fragments
                .iter()
                .any(|f| title.contains(f.as_str()));
            if indigenous {
                vec![Tag::Indigenous]
            } else {
                vec![rules.default_actor]
            }
        }
        (SourceName::EjAtlas, Taxonomy::Impact | Taxonomy::Actor) => {
            let text = normalize(&format!("{} {}", clean_html(description), title));
            let tags = keyword_tags(rules, &text, taxonomy);
            if tags.is_empty()
                && taxonomy == Taxonomy::Impact
                && rules.mining_keywords.iter().any(|k| text.contains(k.as_str()))
            {
                return rules.mining_impacts.clone();
            }
            tags
        }
        _ => Vec::new(),
    }
}

fn keyword_tags(rules: &FallbackRules, text: &str, taxonomy: Taxonomy) -> Vec<Tag> {
    if text.is_empty() {
        return Vec::new();
    }
    rules
        .atlas_keywords
        .iter()
        .filter(|kw| kw.tag.taxonomy() == taxonomy)
        .filter(|kw| kw.keywords.iter().any(|k| text.contains(k.as_str())))
        .map(|kw| kw.tag)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> FallbackRules {
        FallbackRules::default()
    }

    #[test]
    fn test_mining_defaults() {
        let r = rules();
        assert_eq!(
            infer_missing(&r, SourceName::Ocmal, "Minera X", "", Taxonomy::Impact),
            vec![Tag::Water, Tag::Soil]
        );
        assert_eq!(
            infer_missing(&r, SourceName::Ocmal, "Minera X", "", Taxonomy::Actor),
            vec![Tag::Urban]
        );
    }

    #[test]
    fn test_mining_indigenous_title() {
        let r = rules();
        assert_eq!(
            infer_missing(&r, SourceName::Ocmal, "Comunidades Atacameñas vs Minera", "", Taxonomy::Actor),
            vec![Tag::Indigenous]
        );
        assert_eq!(
            infer_missing(&r, SourceName::Ocmal, "Pueblo COLLA de Copiapó", "", Taxonomy::Actor),
            vec![Tag::Indigenous]
        );
    }

    #[test]
    fn test_mining_empty_title_still_defaults() {
        let r = rules();
        assert_eq!(
            infer_missing(&r, SourceName::Ocmal, "", "", Taxonomy::Actor),
            vec![Tag::Urban]
        );
    }

    #[test]
    fn test_atlas_keywords() {
        let r = rules();
        let desc = "Local fishers denounce emissions from the coal plant";
        assert_eq!(
            infer_missing(&r, SourceName::EjAtlas, "Ventanas", desc, Taxonomy::Impact),
            vec![Tag::Air]
        );
        assert_eq!(
            infer_missing(&r, SourceName::EjAtlas, "Ventanas", desc, Taxonomy::Actor),
            vec![Tag::Fisher, Tag::Urban]
        );
    }

    #[test]
    fn test_atlas_mine_default() {
        let r = rules();
        // "mine" alone is not a keyword of any impact tag
        assert_eq!(
            infer_missing(&r, SourceName::EjAtlas, "El Morro mine", "", Taxonomy::Impact),
            vec![Tag::Water, Tag::Soil]
        );
        assert!(infer_missing(&r, SourceName::EjAtlas, "El Morro mine", "", Taxonomy::Actor).is_empty());
    }

    #[test]
    fn test_atlas_nothing_found() {
        let r = rules();
        assert!(infer_missing(&r, SourceName::EjAtlas, "Proyecto Hidroaysén", "", Taxonomy::Actor).is_empty());
    }

    #[test]
    fn test_indh_never_inferred() {
        let r = rules();
        for taxonomy in Taxonomy::ALL {
            assert!(infer_missing(&r, SourceName::Indh, "Minera mapuche", "agua", taxonomy).is_empty());
        }
    }

    #[test]
    fn test_resistance_and_outcome_never_inferred() {
        let r = rules();
        for source in [SourceName::Ocmal, SourceName::EjAtlas] {
            assert!(infer_missing(&r, source, "mine protest", "", Taxonomy::Resistance).is_empty());
            assert!(infer_missing(&r, source, "mine approved", "", Taxonomy::Outcome).is_empty());
        }
    }
}

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::{Language, Tag, Taxonomy};

/// Failures that stop a consolidation run before any output is written.
#[derive(Debug, Error)]
pub enum ConsolidateError {
    #[error("invalid {language:?} {taxonomy:?} pattern for '{}': {pattern}: {source}", .tag.label())]
    InvalidPattern {
        language: Language,
        taxonomy: Taxonomy,
        tag: Tag,
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("tag '{}' listed under the {taxonomy:?} taxonomy", .tag.label())]
    MisplacedTag { taxonomy: Taxonomy, tag: Tag },
    #[error("more than one {language:?} rule set for the {taxonomy:?} taxonomy")]
    DuplicateRuleSet { language: Language, taxonomy: Taxonomy },
    #[error("cannot access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot parse {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{} is not a JSON array of records", .path.display())]
    NotAnArray { path: PathBuf },
    #[error("cannot write {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConsolidateError>;

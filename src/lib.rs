//! Consolidation of Chilean socio-environmental conflict catalogs (INDH,
//! EJAtlas, OCMAL) into one deduplicated, categorized dataset.

pub mod classifier;
pub mod consolidate;
pub mod error;
pub mod inference;
pub mod ingest;
pub mod matcher;
pub mod normalize;
pub mod output;
pub mod scanner;
pub mod taxonomy;
pub mod types;

pub use classifier::Classifier;
pub use consolidate::{ConsolidateConfig, Consolidator, RunSummary};
pub use error::{ConsolidateError, Result};
pub use taxonomy::TaxonomyConfig;
pub use types::{MasterRecord, SourceName, SourceRecord};

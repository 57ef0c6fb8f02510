use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::types::{SourceName, SOURCE_PRIORITY};

/// How deep below the data directory snapshots are looked for.
pub const MAX_SCAN_DEPTH: usize = 4;

/// Snapshot file name published by each catalog scraper.
pub fn snapshot_file_name(source: SourceName) -> &'static str {
    match source {
        SourceName::Indh => "indh_conflictos.json",
        SourceName::EjAtlas => "ejatlas_chile_filtrado.json",
        SourceName::Ocmal => "ocmal_chile.json",
    }
}

/// Where each catalog snapshot was found, if anywhere.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SnapshotPaths {
    paths: [Option<PathBuf>; 3],
}

impl SnapshotPaths {
    pub fn get(&self, source: SourceName) -> Option<&Path> {
        self.paths[source.rank()].as_deref()
    }

    pub fn set(&mut self, source: SourceName, path: PathBuf) {
        self.paths[source.rank()] = Some(path);
    }
}

/// Walk `root` looking for the three snapshot files.
///
/// Entries are visited sorted by file name so the result does not depend
/// on the filesystem; the first hit per catalog wins. Hidden directories
/// and `target/` are not entered.
pub fn scan_data_dir(root: &Path, max_depth: usize) -> SnapshotPaths {
    let mut found = SnapshotPaths::default();

    let walker = WalkDir::new(root)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_skipped_dir(e.path(), e.file_type().is_dir()));

    for entry in walker.filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        for source in SOURCE_PRIORITY {
            if name == snapshot_file_name(source) && found.get(source).is_none() {
                debug!("Found {} snapshot at {}", source.label(), entry.path().display());
                found.set(source, entry.path().to_path_buf());
            }
        }
    }

    found
}

fn is_skipped_dir(path: &Path, is_dir: bool) -> bool {
    if !is_dir {
        return false;
    }
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    name.starts_with('.') || name == "target"
}

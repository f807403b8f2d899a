//! Startup discovery of the vector index.
//!
//! Discovery is an ordered list of strategies. Each one either finds an index
//! directory or reports that it did not; the first hit wins. The default
//! chain is: check pre-built locations, unpack a packaged archive and check
//! again, and finally synthesize an empty index so the process stays up.
//!
//! A candidate only counts when its database opens and is not just the empty
//! placeholder left by an earlier synthesized start.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use charak_core::config::IndexConfig;
use charak_core::error::AppError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::index::IndexStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryStrategy {
    /// First candidate directory that holds index files.
    Prebuilt { candidates: Vec<PathBuf> },
    /// Unpack the first existing archive into `extract_dir`, then check
    /// `candidates` followed by `extract_dir` itself.
    Archive {
        archives: Vec<PathBuf>,
        extract_dir: PathBuf,
        candidates: Vec<PathBuf>,
    },
    /// Create an empty collection at `path`.
    SynthesizeEmpty { path: PathBuf, collection: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndexSource {
    Prebuilt,
    Archive { archive: PathBuf },
    Synthesized,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscoveredIndex {
    pub path: PathBuf,
    pub source: IndexSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    Found(DiscoveredIndex),
    NotFound,
}

impl DiscoveryStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            DiscoveryStrategy::Prebuilt { .. } => "prebuilt",
            DiscoveryStrategy::Archive { .. } => "archive",
            DiscoveryStrategy::SynthesizeEmpty { .. } => "synthesize_empty",
        }
    }

    pub fn attempt(&self) -> Result<Attempt, AppError> {
        match self {
            DiscoveryStrategy::Prebuilt { candidates } => {
                Ok(match find_prebuilt(candidates) {
                    Some(path) => Attempt::Found(DiscoveredIndex {
                        path,
                        source: IndexSource::Prebuilt,
                    }),
                    None => Attempt::NotFound,
                })
            }
            DiscoveryStrategy::Archive {
                archives,
                extract_dir,
                candidates,
            } => {
                let Some(archive) = first_archive(archives) else {
                    debug!("no index archive found");
                    return Ok(Attempt::NotFound);
                };
                info!(archive = %archive.display(), dest = %extract_dir.display(), "extracting index archive");
                extract_zip(archive, extract_dir)?;

                let mut paths = candidates.clone();
                paths.push(extract_dir.clone());
                Ok(match find_prebuilt(&paths) {
                    Some(path) => Attempt::Found(DiscoveredIndex {
                        path,
                        source: IndexSource::Archive {
                            archive: archive.clone(),
                        },
                    }),
                    None => {
                        warn!(archive = %archive.display(), "archive did not contain index files");
                        Attempt::NotFound
                    }
                })
            }
            DiscoveryStrategy::SynthesizeEmpty { path, collection } => {
                let store = IndexStore::open(path.clone());
                let existing = if store.has_backing_files() {
                    match store.collection_info(collection) {
                        Ok(info) => info,
                        Err(e) => {
                            let moved = store.quarantine()?;
                            warn!(
                                path = %path.display(),
                                moved_to = %moved.display(),
                                error = %e,
                                "index at default path is unreadable; moved aside"
                            );
                            None
                        }
                    }
                } else {
                    None
                };
                if existing.is_none() {
                    store.create_placeholder(collection)?;
                }
                warn!(
                    path = %path.display(),
                    collection = %collection,
                    "no vector index found; serving an EMPTY index. Build one with `charak build-index`"
                );
                Ok(Attempt::Found(DiscoveredIndex {
                    path: path.clone(),
                    source: IndexSource::Synthesized,
                }))
            }
        }
    }
}

/// The standard chain for a config: pre-built, archive, empty.
pub fn default_strategies(cfg: &IndexConfig) -> Vec<DiscoveryStrategy> {
    vec![
        DiscoveryStrategy::Prebuilt {
            candidates: cfg.candidate_paths.clone(),
        },
        DiscoveryStrategy::Archive {
            archives: cfg.archive_paths.clone(),
            extract_dir: cfg.extract_dir.clone(),
            candidates: cfg.candidate_paths.clone(),
        },
        DiscoveryStrategy::SynthesizeEmpty {
            path: cfg.default_path.clone(),
            collection: cfg.collection.clone(),
        },
    ]
}

/// Run strategies in order and return the first hit. A strategy that fails
/// is logged and skipped.
pub fn discover(strategies: &[DiscoveryStrategy]) -> Result<DiscoveredIndex, AppError> {
    discover_from(strategies).map(|(_, found)| found)
}

/// Like [`discover`], also returning the position of the strategy that hit so
/// a caller can resume with the ones after it.
pub fn discover_from(strategies: &[DiscoveryStrategy]) -> Result<(usize, DiscoveredIndex), AppError> {
    for (pos, strategy) in strategies.iter().enumerate() {
        match strategy.attempt() {
            Ok(Attempt::Found(found)) => {
                info!(
                    strategy = strategy.name(),
                    path = %found.path.display(),
                    "vector index located"
                );
                return Ok((pos, found));
            }
            Ok(Attempt::NotFound) => {
                debug!(strategy = strategy.name(), "strategy found nothing");
            }
            Err(e) => {
                warn!(strategy = strategy.name(), error = %e, details = ?e.details, "discovery strategy failed");
            }
        }
    }
    Err(AppError::new(
        "INDEX_NOT_FOUND",
        "No vector index could be located or created",
    ))
}

/// First candidate holding a readable index that is not only a placeholder.
/// Touches nothing on disk.
pub fn find_prebuilt(candidates: &[PathBuf]) -> Option<PathBuf> {
    for candidate in candidates {
        let store = IndexStore::open(candidate.clone());
        if !store.has_backing_files() {
            debug!(path = %candidate.display(), "no index files at candidate");
            continue;
        }
        match store.is_placeholder() {
            Ok(false) => return Some(candidate.clone()),
            Ok(true) => {
                debug!(path = %candidate.display(), "only an empty placeholder at candidate");
            }
            Err(e) => {
                warn!(path = %candidate.display(), error = %e, details = ?e.details, "unreadable index at candidate; skipping");
            }
        }
    }
    None
}

pub fn first_archive(archives: &[PathBuf]) -> Option<&PathBuf> {
    archives.iter().find(|a| a.is_file())
}

fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<(), AppError> {
    let file = fs::File::open(archive_path).map_err(|e| {
        AppError::new("INDEX_ARCHIVE_FAILED", "Failed to open index archive")
            .with_details(format!("path={}; err={}", archive_path.display(), e))
    })?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| {
        AppError::new("INDEX_ARCHIVE_FAILED", "Failed to read index archive")
            .with_details(format!("path={}; err={}", archive_path.display(), e))
    })?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| {
            AppError::new("INDEX_ARCHIVE_FAILED", "Failed to read archive entry")
                .with_details(format!("index={i}; err={e}"))
        })?;

        // Entries escaping the destination are skipped.
        let outpath = match entry.enclosed_name() {
            Some(p) => dest_dir.join(p),
            None => continue,
        };

        if entry.is_dir() {
            fs::create_dir_all(&outpath).map_err(|e| extract_io_failed(&outpath, e))?;
        } else {
            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent).map_err(|e| extract_io_failed(parent, e))?;
            }
            let mut out = fs::File::create(&outpath).map_err(|e| extract_io_failed(&outpath, e))?;
            io::copy(&mut entry, &mut out).map_err(|e| extract_io_failed(&outpath, e))?;
        }
    }
    Ok(())
}

fn extract_io_failed(path: &Path, e: io::Error) -> AppError {
    AppError::new("INDEX_ARCHIVE_FAILED", "Failed to extract index archive")
        .with_details(format!("path={}; err={}", path.display(), e))
}

//! Run orchestration: walk, classify, publish, reap.
//!
//! # Overview
//!
//! A run is a strict sequence of phases:
//!
//! 1. **Discovery** - every source root is walked and matching files are
//!    collected with their sizes.
//! 2. **Classification** - files are classified on a rayon pool. Nothing
//!    is written; each file is either grouped or queued for the directory
//!    fallback.
//! 3. **Publication** - queued fallback files are linked through the
//!    directory layout, then the largest copy of each group is linked.
//! 4. **Cleanup** - stale links under the destination root are removed.
//!
//! Each worker folds into its own [`RunStats`], [`ComicGroups`] and
//! fallback queue; the partial results are merged in walk order. All links
//! are created on one thread in that order, so when two files map to the
//! same link the first one walked wins on every run.
//!
//! # Example
//!
//! ```no_run
//! use comiclink::pipeline::{Pipeline, PipelineConfig};
//! use std::path::PathBuf;
//!
//! let config = PipelineConfig::new(
//!     vec![PathBuf::from("/srv/comics")],
//!     PathBuf::from("/srv/library"),
//! );
//! let stats = Pipeline::new(config).run().unwrap();
//! print!("{}", stats.report());
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use thiserror::Error;

use crate::classify::{Classification, Classifier};
use crate::groups::ComicGroups;
use crate::progress::{ProgressCallback, PHASE_CLASSIFY, PHASE_PUBLISH};
use crate::publish::{self, PublishError};
use crate::reaper;
use crate::scanner::{ComicFile, Walker, WalkerConfig};
use crate::stats::RunStats;

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The worker pool could not be created.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The destination tree could not be written.
    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// Configuration for a single run.
#[derive(Clone)]
pub struct PipelineConfig {
    /// Source roots to walk
    pub sources: Vec<PathBuf>,
    /// Root of the published tree
    pub dest_root: PathBuf,
    /// Walker configuration for the source roots
    pub walker_config: WalkerConfig,
    /// Descriptor classifier
    pub classifier: Classifier,
    /// Worker count; 0 uses the rayon default
    pub threads: usize,
    /// Remove stale links after publishing
    pub cleanup: bool,
    /// Optional progress callback for reporting
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("sources", &self.sources)
            .field("dest_root", &self.dest_root)
            .field("walker_config", &self.walker_config)
            .field("classifier", &self.classifier)
            .field("threads", &self.threads)
            .field("cleanup", &self.cleanup)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl PipelineConfig {
    /// Create a configuration with default walker and classifier settings.
    #[must_use]
    pub fn new(sources: Vec<PathBuf>, dest_root: PathBuf) -> Self {
        Self {
            sources,
            dest_root,
            walker_config: WalkerConfig::default(),
            classifier: Classifier::default(),
            threads: 0,
            cleanup: true,
            progress_callback: None,
        }
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the classifier.
    #[must_use]
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Set the worker count (0 = platform default).
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Enable or disable the stale link cleanup.
    #[must_use]
    pub fn with_cleanup(mut self, cleanup: bool) -> Self {
        self.cleanup = cleanup;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Executes runs for a configuration.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline.
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Execute one full run and return its statistics.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] when the worker pool cannot be built or a
    /// directory under the destination root cannot be created. Failures of
    /// individual files are counted in [`RunStats::errors`] instead.
    pub fn run(&self) -> Result<RunStats, PipelineError> {
        log::info!("Phase 1: Walking {} source directories", self.config.sources.len());
        let (files, mut stats) = self.discover();
        log::info!("Phase 1 complete: {} comic files found", files.len());

        let pool = self.build_pool()?;

        log::info!("Phase 2: Classifying {} files", files.len());
        let classified = pool.install(|| self.classify_all(&files));
        stats += classified.stats;
        log::info!(
            "Phase 2 complete: {} groups, {} duplicate copies, {} without descriptor",
            classified.groups.len(),
            classified.groups.duplicate_count(),
            classified.fallbacks.len()
        );

        log::info!(
            "Phase 3: Publishing {} groups and {} fallback files",
            classified.groups.len(),
            classified.fallbacks.len()
        );
        stats += self.publish(&classified.groups, &classified.fallbacks)?;

        if self.config.cleanup {
            log::info!("Phase 4: Removing stale links");
            let report = reaper::reap_stale_links(&self.config.dest_root);
            stats.symlinks_removed += report.removed.len();
            stats.errors += report.errors.len();
        } else {
            log::debug!("Cleanup disabled, stale links are kept");
        }

        Ok(stats)
    }

    /// Walk every source root and collect comic files.
    ///
    /// Returned statistics carry `total_files` and any walk errors.
    #[must_use]
    pub fn discover(&self) -> (Vec<ComicFile>, RunStats) {
        let mut stats = RunStats::default();
        let mut files = Vec::new();

        for source in &self.config.sources {
            let Some(root) = canonical_root(source) else {
                continue;
            };

            let walker = Walker::new(&root, self.config.walker_config.clone());
            for result in walker.walk() {
                match result {
                    Ok(file) => files.push(file),
                    Err(e) => {
                        log::debug!("Skipping entry: {}", e);
                        stats.errors += 1;
                    }
                }
            }
        }

        stats.total_files = files.len();
        (files, stats)
    }

    fn build_pool(&self) -> Result<rayon::ThreadPool, rayon::ThreadPoolBuildError> {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if self.config.threads > 0 {
            builder = builder.num_threads(self.config.threads);
        }
        builder.build()
    }

    /// Classify files in parallel without touching the destination.
    fn classify_all(&self, files: &[ComicFile]) -> Classified {
        let progress = self.config.progress_callback.as_deref();
        if let Some(callback) = progress {
            callback.on_phase_start(PHASE_CLASSIFY, files.len());
        }

        let classified = files
            .par_iter()
            .fold(Classified::default, |mut acc, file| {
                let (outcome, file_stats) = self.config.classifier.classify(file);
                acc.stats += file_stats;

                match outcome {
                    Classification::Grouped { key, candidate } => {
                        acc.groups.insert(key, candidate);
                    }
                    Classification::Fallback { file: path } => acc.fallbacks.push(path),
                    Classification::MissingInfo => {}
                }

                if let Some(callback) = progress {
                    callback.on_progress(&file.path.to_string_lossy());
                }
                acc
            })
            .reduce(Classified::default, Classified::merge);

        if let Some(callback) = progress {
            callback.on_phase_end(PHASE_CLASSIFY);
        }
        classified
    }

    /// Link fallback files, then the winner of each group, in order.
    fn publish(
        &self,
        groups: &ComicGroups,
        fallbacks: &[PathBuf],
    ) -> Result<RunStats, PublishError> {
        let progress = self.config.progress_callback.as_deref();
        if let Some(callback) = progress {
            callback.on_phase_start(PHASE_PUBLISH, fallbacks.len() + groups.len());
        }

        let mut stats = RunStats::default();
        for path in fallbacks {
            stats += publish::link_by_directory(&self.config.dest_root, path)?;
            if let Some(callback) = progress {
                callback.on_progress(&path.to_string_lossy());
            }
        }
        for (key, candidates) in groups {
            stats += publish::publish_group(&self.config.dest_root, key, candidates)?;
            if let Some(callback) = progress {
                callback.on_progress(&key.to_string());
            }
        }

        if let Some(callback) = progress {
            callback.on_phase_end(PHASE_PUBLISH);
        }
        Ok(stats)
    }
}

/// Classification results of one worker, or of several merged in order.
#[derive(Debug, Default)]
struct Classified {
    stats: RunStats,
    groups: ComicGroups,
    fallbacks: Vec<PathBuf>,
}

impl Classified {
    /// Append `later`, which must cover files walked after `self`.
    fn merge(mut self, later: Self) -> Self {
        self.stats += later.stats;
        self.groups.merge(later.groups);
        self.fallbacks.extend(later.fallbacks);
        self
    }
}

/// Canonicalize a source root, or log and skip it.
fn canonical_root(source: &Path) -> Option<PathBuf> {
    match source.canonicalize() {
        Ok(root) if root.is_dir() => Some(root),
        Ok(root) => {
            log::warn!("Source is not a directory, skipping: {}", root.display());
            None
        }
        Err(e) => {
            log::warn!("Source directory {} unavailable: {}", source.display(), e);
            None
        }
    }
}

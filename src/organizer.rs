use std::path::{Path, PathBuf};

use tracing::{debug, error, info, info_span, warn};

use crate::census::STRM_EXTENSION;
use crate::classifier::{Classification, MediaClassifier, MediaType};
use crate::config::OrganizerConfig;
use crate::duplicates::{DuplicateResolver, Resolution};
use crate::error::{OrganizerError, Result};
use crate::filesystem::{Filesystem, LocalFilesystem};
use crate::layout::PathLayoutPlanner;
use crate::normalizer::{FilenameNormalizer, NormalizedName};
use crate::webhook::MediaItem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileDecision {
    Write(String),
    /// The file already exists and the policy says leave it alone.
    Skip(String),
}

/// Where one item goes. Built fresh per item and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutPlan {
    pub normalized: NormalizedName,
    pub classification: Option<Classification>,
    pub directory: PathBuf,
    pub file: FileDecision,
}

impl LayoutPlan {
    pub fn media_type(&self) -> Option<MediaType> {
        self.classification.as_ref().map(Classification::media_type)
    }

    pub fn target_path(&self) -> PathBuf {
        match &self.file {
            FileDecision::Write(name) | FileDecision::Skip(name) => self.directory.join(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Written(PathBuf),
    Skipped(PathBuf),
}

#[derive(Debug)]
pub struct ItemReport {
    pub name: String,
    pub result: Result<ItemOutcome>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub items: Vec<ItemReport>,
}

impl BatchReport {
    pub fn written(&self) -> usize {
        self.count(|r| matches!(r, Ok(ItemOutcome::Written(_))))
    }

    pub fn skipped(&self) -> usize {
        self.count(|r| matches!(r, Ok(ItemOutcome::Skipped(_))))
    }

    pub fn failed(&self) -> usize {
        self.count(|r| r.is_err())
    }

    fn count(&self, pred: impl Fn(&Result<ItemOutcome>) -> bool) -> usize {
        self.items.iter().filter(|item| pred(&item.result)).count()
    }
}

/// Turns webhook items into STRM files under the configured base path.
pub struct MediaOrganizer<F: Filesystem = LocalFilesystem> {
    config: OrganizerConfig,
    fs: F,
    normalizer: FilenameNormalizer,
    classifier: MediaClassifier,
}

impl MediaOrganizer<LocalFilesystem> {
    pub fn new(config: OrganizerConfig) -> Result<Self> {
        Self::with_filesystem(config, LocalFilesystem)
    }
}

impl<F: Filesystem> MediaOrganizer<F> {
    pub fn with_filesystem(config: OrganizerConfig, fs: F) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            fs,
            normalizer: FilenameNormalizer::new()?,
            classifier: MediaClassifier::new()?,
        })
    }

    pub fn config(&self) -> &OrganizerConfig {
        &self.config
    }

    /// Everything up to the write: normalize, classify, lay out, resolve duplicates.
    /// Reads the tree, changes nothing.
    pub fn plan_item(&self, item: &MediaItem) -> Result<LayoutPlan> {
        let normalized = self.normalizer.normalize(&item.name);
        let classification = self
            .config
            .enable_media_type_detection
            .then(|| self.classifier.classify(&item.name));

        debug!(
            name = %item.name,
            display_name = %normalized.display_name,
            classification = ?classification,
            "classified item"
        );

        let planner = PathLayoutPlanner::new(&self.config, &self.fs, &self.normalizer);
        let directory = planner.target_directory(item, classification.as_ref(), &normalized)?;

        // The pattern may add sub-folders, so the file path is checked on its own.
        let desired = format!(
            "{}.{STRM_EXTENSION}",
            self.config.file_stem_for(&normalized.display_name)
        );
        let desired_path = planner.ensure_within_base(&directory.join(desired))?;
        let (directory, file_name) = split_file_path(&desired_path)?;

        let file = match DuplicateResolver::new(&self.fs).resolve(
            &directory,
            &file_name,
            self.config.duplicate_handling,
        ) {
            Resolution::Write(name) => FileDecision::Write(name),
            Resolution::Skip => FileDecision::Skip(file_name),
        };

        Ok(LayoutPlan {
            normalized,
            classification,
            directory,
            file,
        })
    }

    pub fn process_item(&self, item: &MediaItem) -> Result<ItemOutcome> {
        let plan = self.plan_item(item)?;
        let media_type = plan
            .media_type()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "unclassified".to_string());

        match &plan.file {
            FileDecision::Skip(_) => {
                let path = plan.target_path();
                info!(
                    name = %item.name,
                    media_type = %media_type,
                    path = %path.display(),
                    "strm file already exists, skipping"
                );
                Ok(ItemOutcome::Skipped(path))
            }
            FileDecision::Write(_) => {
                let path = plan.target_path();
                self.fs.create_dir_all(&plan.directory)?;
                self.fs.write_text(&path, &item.url)?;
                info!(
                    name = %item.name,
                    media_type = %media_type,
                    path = %path.display(),
                    "wrote strm file"
                );
                Ok(ItemOutcome::Written(path))
            }
        }
    }

    /// Items are handled one at a time; a failing item is logged and the rest carry on.
    pub fn process_batch(&self, items: &[MediaItem]) -> BatchReport {
        let mut report = BatchReport::default();

        for item in items {
            let span = info_span!("item", name = %item.name, parent_id = item.parent_id);
            let _guard = span.enter();

            let result = self.process_item(item);
            if let Err(e) = &result {
                if e.is_fatal_for_item() {
                    error!(name = %item.name, error = %e, "rejected item");
                } else {
                    warn!(name = %item.name, error = %e, "failed to organize item");
                }
            }
            report.items.push(ItemReport {
                name: item.name.clone(),
                result,
            });
        }

        info!(
            total = items.len(),
            written = report.written(),
            skipped = report.skipped(),
            failed = report.failed(),
            "batch finished"
        );
        report
    }
}

fn split_file_path(path: &Path) -> Result<(PathBuf, String)> {
    match (path.parent(), path.file_name()) {
        (Some(dir), Some(name)) => Ok((dir.to_path_buf(), name.to_string_lossy().to_string())),
        _ => Err(OrganizerError::InvalidConfig(format!(
            "filename pattern produced no file name for {}",
            path.display()
        ))),
    }
}

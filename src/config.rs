use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{OrganizerError, Result};

pub const NAME_PLACEHOLDER: &str = "{name}";
pub const DEFAULT_MAX_ENTRIES: usize = 400;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateHandling {
    Overwrite,
    #[default]
    Skip,
    CreateVersions,
}

/// Read-only settings for one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizerConfig {
    pub base_path: PathBuf,
    pub enable_media_type_detection: bool,
    pub organize_by_media_type: bool,
    pub group_by_parent: bool,
    pub filename_pattern: String,
    pub duplicate_handling: DuplicateHandling,
    pub enable_auto_split: bool,
    /// Split a directory once it holds this many STRM files. Kept below the
    /// ~500 entry mark where listings start to slow down.
    pub max_entries_per_directory: usize,
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::new(),
            enable_media_type_detection: true,
            organize_by_media_type: true,
            group_by_parent: false,
            filename_pattern: NAME_PLACEHOLDER.to_string(),
            duplicate_handling: DuplicateHandling::default(),
            enable_auto_split: true,
            max_entries_per_directory: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl OrganizerConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| OrganizerError::io(path, e))?;
        let config: OrganizerConfig =
            serde_json::from_str(&raw).map_err(|source| OrganizerError::ConfigParse {
                source,
                path: path.to_path_buf(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_path.as_os_str().is_empty() {
            return Err(OrganizerError::InvalidConfig("base_path is required".to_string()));
        }
        if !self.filename_pattern.contains(NAME_PLACEHOLDER) {
            return Err(OrganizerError::InvalidConfig(format!(
                "filename_pattern {:?} must contain {NAME_PLACEHOLDER}",
                self.filename_pattern
            )));
        }
        if self.max_entries_per_directory == 0 {
            return Err(OrganizerError::InvalidConfig(
                "max_entries_per_directory must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Movies / TV Shows subtrees need both detection and organization switched on.
    pub fn organizes_by_type(&self) -> bool {
        self.enable_media_type_detection && self.organize_by_media_type
    }

    pub fn file_stem_for(&self, display_name: &str) -> String {
        self.filename_pattern.replace(NAME_PLACEHOLDER, display_name)
    }
}

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: OrganizerConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_path<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.config.base_path = dir.as_ref().to_path_buf();
        self
    }

    pub fn media_type_detection(mut self, enabled: bool) -> Self {
        self.config.enable_media_type_detection = enabled;
        self
    }

    pub fn organize_by_media_type(mut self, enabled: bool) -> Self {
        self.config.organize_by_media_type = enabled;
        self
    }

    pub fn group_by_parent(mut self, enabled: bool) -> Self {
        self.config.group_by_parent = enabled;
        self
    }

    pub fn filename_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.filename_pattern = pattern.into();
        self
    }

    pub fn duplicate_handling(mut self, policy: DuplicateHandling) -> Self {
        self.config.duplicate_handling = policy;
        self
    }

    pub fn auto_split(mut self, enabled: bool, max_entries: usize) -> Self {
        self.config.enable_auto_split = enabled;
        self.config.max_entries_per_directory = max_entries;
        self
    }

    pub fn build(self) -> Result<OrganizerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

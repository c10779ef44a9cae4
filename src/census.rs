use std::path::Path;

use crate::error::Result;
use crate::filesystem::{EntryFilter, Filesystem};

pub const STRM_EXTENSION: &str = "strm";
const STRM_SUFFIX: &str = ".strm";

/// Answers questions about the current state of the output tree. Every call
/// reads the filesystem again, so results reflect writes made earlier in the batch.
#[derive(Clone, Copy)]
pub struct DirectoryCensus<'a> {
    fs: &'a dyn Filesystem,
}

impl<'a> DirectoryCensus<'a> {
    pub fn new(fs: &'a dyn Filesystem) -> Self {
        Self { fs }
    }

    /// Existing sub-folder of `parent` whose name equals `name` ignoring case.
    pub fn find_folder_ignore_case(&self, parent: &Path, name: &str) -> Result<Option<String>> {
        let wanted = name.to_lowercase();
        Ok(self
            .fs
            .list_entries(parent, EntryFilter::Directories)?
            .into_iter()
            .find(|folder| folder.to_lowercase() == wanted))
    }

    pub fn strm_count(&self, dir: &Path) -> Result<usize> {
        self.fs.count_entries(dir, STRM_SUFFIX)
    }

    /// True once `dir` holds at least `max_entries` STRM files.
    pub fn is_full(&self, dir: &Path, max_entries: usize) -> Result<bool> {
        Ok(self.strm_count(dir)? >= max_entries)
    }
}

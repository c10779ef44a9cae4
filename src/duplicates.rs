use std::path::Path;

use crate::config::DuplicateHandling;
use crate::filesystem::Filesystem;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Write(String),
    Skip,
}

#[derive(Clone, Copy)]
pub struct DuplicateResolver<'a> {
    fs: &'a dyn Filesystem,
}

impl<'a> DuplicateResolver<'a> {
    pub fn new(fs: &'a dyn Filesystem) -> Self {
        Self { fs }
    }

    pub fn resolve(&self, directory: &Path, desired: &str, policy: DuplicateHandling) -> Resolution {
        if !self.fs.exists(&directory.join(desired)) {
            return Resolution::Write(desired.to_string());
        }

        match policy {
            DuplicateHandling::Overwrite => Resolution::Write(desired.to_string()),
            DuplicateHandling::Skip => Resolution::Skip,
            DuplicateHandling::CreateVersions => {
                let (stem, extension) = split_extension(desired);
                let mut version: u64 = 1;
                loop {
                    let candidate = format!("{stem}_{version}{extension}");
                    if !self.fs.exists(&directory.join(&candidate)) {
                        return Resolution::Write(candidate);
                    }
                    version += 1;
                }
            }
        }
    }
}

/// `("name", ".strm")` for `"name.strm"`; the extension keeps its dot.
fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => file_name.split_at(idx),
        _ => (file_name, ""),
    }
}

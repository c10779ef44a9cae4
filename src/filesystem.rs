use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{OrganizerError, Result};

#[cfg(unix)]
const STRM_FILE_MODE: u32 = 0o644;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryFilter {
    Directories,
    Files,
}

/// Filesystem operations the organizer needs. Paths are opaque beyond normal path semantics.
pub trait Filesystem: Send + Sync {
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Entry names directly under `path`, sorted. A missing directory has no entries.
    fn list_entries(&self, path: &Path, filter: EntryFilter) -> Result<Vec<String>>;

    /// Number of files directly under `path` whose name ends with `suffix` (ASCII case-insensitive).
    fn count_entries(&self, path: &Path, suffix: &str) -> Result<usize>;

    fn exists(&self, path: &Path) -> bool;

    /// Replaces the file atomically: readers see the old content or the new one, never a partial write.
    fn write_text(&self, path: &Path, content: &str) -> Result<()>;

    /// Absolute form of `path` with symlinks and `..` resolved, even if the tail does not exist yet.
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).map_err(|e| OrganizerError::io(path, e))
    }

    fn list_entries(&self, path: &Path, filter: EntryFilter) -> Result<Vec<String>> {
        if !path.is_dir() {
            return Ok(Vec::new());
        }

        let mut names: Vec<String> = fs::read_dir(path)
            .map_err(|e| OrganizerError::io(path, e))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry
                    .file_type()
                    .map(|ft| match filter {
                        EntryFilter::Directories => ft.is_dir(),
                        EntryFilter::Files => ft.is_file(),
                    })
                    .unwrap_or(false)
            })
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .collect();

        names.sort();
        Ok(names)
    }

    fn count_entries(&self, path: &Path, suffix: &str) -> Result<usize> {
        let suffix = suffix.to_ascii_lowercase();
        Ok(self
            .list_entries(path, EntryFilter::Files)?
            .iter()
            .filter(|name| name.to_ascii_lowercase().ends_with(&suffix))
            .count())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn write_text(&self, path: &Path, content: &str) -> Result<()> {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut temp = NamedTempFile::new_in(dir).map_err(|e| OrganizerError::io(dir, e))?;
        temp.write_all(content.as_bytes())
            .map_err(|e| OrganizerError::io(temp.path(), e))?;
        // temp files start out 0600; the media server usually runs as another user
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            temp.as_file()
                .set_permissions(fs::Permissions::from_mode(STRM_FILE_MODE))
                .map_err(|e| OrganizerError::io(temp.path(), e))?;
        }
        temp.persist(path)
            .map_err(|e| OrganizerError::io(path, e.error))?;
        Ok(())
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        let absolute = std::path::absolute(path).map_err(|e| OrganizerError::io(path, e))?;

        let existing = absolute
            .ancestors()
            .find(|ancestor| ancestor.exists())
            .unwrap_or_else(|| Path::new("/"));
        let mut resolved = fs::canonicalize(existing).map_err(|e| OrganizerError::io(existing, e))?;

        let tail = absolute.strip_prefix(existing).unwrap_or(Path::new(""));
        for component in tail.components() {
            match component {
                Component::ParentDir => {
                    resolved.pop();
                }
                Component::Normal(part) => resolved.push(part),
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            }
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_list_and_count_missing_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let fs = LocalFilesystem;
        assert!(fs.list_entries(&missing, EntryFilter::Directories).unwrap().is_empty());
        assert_eq!(fs.count_entries(&missing, ".strm").unwrap(), 0);
    }

    #[test]
    fn test_count_entries_by_suffix() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem;
        fs.write_text(&dir.path().join("a.strm"), "u").unwrap();
        fs.write_text(&dir.path().join("b.STRM"), "u").unwrap();
        fs.write_text(&dir.path().join("c.nfo"), "u").unwrap();
        fs.create_dir_all(&dir.path().join("d.strm")).unwrap();

        assert_eq!(fs.count_entries(dir.path(), ".strm").unwrap(), 2);
        assert_eq!(
            fs.list_entries(dir.path(), EntryFilter::Directories).unwrap(),
            vec!["d.strm".to_string()]
        );
    }

    #[test]
    fn test_write_text_overwrites() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem;
        let file = dir.path().join("movie.strm");
        fs.write_text(&file, "http://one").unwrap();
        fs.write_text(&file, "http://two").unwrap();
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "http://two");
        assert_eq!(fs.list_entries(dir.path(), EntryFilter::Files).unwrap().len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_written_files_are_readable_by_others() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem;
        let file = dir.path().join("Heat (1995).strm");
        fs.write_text(&file, "http://cdn/heat.mkv").unwrap();

        let mode = std::fs::metadata(&file).unwrap().permissions().mode();
        assert_eq!(mode & 0o044, 0o044);
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn test_canonicalize_resolves_missing_tail() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFilesystem;
        let base = fs.canonicalize(dir.path()).unwrap();

        let nested = fs.canonicalize(&dir.path().join("Movies/A-C")).unwrap();
        assert_eq!(nested, base.join("Movies").join("A-C"));

        let escaped = fs.canonicalize(&dir.path().join("Movies/../../etc")).unwrap();
        assert!(!escaped.starts_with(&base));
    }
}

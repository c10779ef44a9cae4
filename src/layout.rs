use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::census::DirectoryCensus;
use crate::classifier::Classification;
use crate::config::OrganizerConfig;
use crate::error::{OrganizerError, Result};
use crate::filesystem::Filesystem;
use crate::normalizer::{FilenameNormalizer, NormalizedName};
use crate::sanitizer::sanitize_filename;
use crate::webhook::MediaItem;

pub const MOVIES_FOLDER: &str = "Movies";
pub const TV_SHOWS_FOLDER: &str = "TV Shows";

const EPISODES_PER_RANGE: u32 = 100;
const HASH_BUCKETS: u64 = 10;

/// Works out which directory an item belongs in. Reads the tree but never changes it.
pub struct PathLayoutPlanner<'a> {
    config: &'a OrganizerConfig,
    fs: &'a dyn Filesystem,
    census: DirectoryCensus<'a>,
    normalizer: &'a FilenameNormalizer,
}

impl<'a> PathLayoutPlanner<'a> {
    pub fn new(
        config: &'a OrganizerConfig,
        fs: &'a dyn Filesystem,
        normalizer: &'a FilenameNormalizer,
    ) -> Self {
        Self {
            config,
            fs,
            census: DirectoryCensus::new(fs),
            normalizer,
        }
    }

    /// Canonical target directory for `item`. `classification` is `None` when
    /// media type detection is switched off.
    pub fn target_directory(
        &self,
        item: &MediaItem,
        classification: Option<&Classification>,
        name: &NormalizedName,
    ) -> Result<PathBuf> {
        let base = &self.config.base_path;
        let mut dir = base.clone();

        if self.config.organizes_by_type() {
            match classification {
                Some(Classification::Movie { title, .. }) => {
                    dir = self.movie_directory(base, title)?;
                }
                Some(Classification::TvSeries {
                    series_name,
                    season,
                    episode,
                }) => {
                    dir = self.series_directory(base, series_name, *season, *episode, name)?;
                }
                None => {}
            }
        }

        if self.config.group_by_parent && item.parent_id > 0 {
            dir.push(format!("parent_{}", item.parent_id));
        }

        self.ensure_within_base(&dir)
    }

    fn movie_directory(&self, base: &Path, title: &str) -> Result<PathBuf> {
        let title = self.normalizer.normalize(title).display_name;
        let mut dir = base.join(MOVIES_FOLDER).join(alphabet_bucket(&title));

        if self.is_over_threshold(&dir)? {
            dir.push(format!("movie_{}", hash_bucket(&title)));
        }
        Ok(dir)
    }

    fn series_directory(
        &self,
        base: &Path,
        series_name: &str,
        season: Option<u32>,
        episode: Option<u32>,
        name: &NormalizedName,
    ) -> Result<PathBuf> {
        let tv_root = base.join(TV_SHOWS_FOLDER);
        let folder = sanitize_filename(&normalize_series_name(series_name));
        let folder = self
            .census
            .find_folder_ignore_case(&tv_root, &folder)?
            .unwrap_or(folder);
        let series_dir = tv_root.join(folder);

        let Some(season) = season else {
            let mut dir = series_dir;
            if self.is_over_threshold(&dir)? {
                dir.push(format!("episode_{}", hash_bucket(&name.display_name)));
            }
            return Ok(dir);
        };

        let mut dir = series_dir.join(format!("Season {season:02}"));
        if let Some(episode) = episode {
            if self.is_over_threshold(&dir)? {
                dir.push(episode_range(episode));
            }
        }
        Ok(dir)
    }

    fn is_over_threshold(&self, dir: &Path) -> Result<bool> {
        if !self.config.enable_auto_split {
            return Ok(false);
        }
        self.census.is_full(dir, self.config.max_entries_per_directory)
    }

    /// Canonical form of `path`, or `PathEscape` if it is not under the base path.
    pub fn ensure_within_base(&self, path: &Path) -> Result<PathBuf> {
        ensure_within(self.fs, &self.config.base_path, path)
    }
}

pub fn ensure_within(fs: &dyn Filesystem, base: &Path, path: &Path) -> Result<PathBuf> {
    let canonical_base = fs.canonicalize(base)?;
    let canonical = fs.canonicalize(path)?;
    if canonical.starts_with(&canonical_base) {
        Ok(canonical)
    } else {
        Err(OrganizerError::PathEscape {
            path: canonical,
            base: canonical_base,
        })
    }
}

pub fn alphabet_bucket(title: &str) -> &'static str {
    let first = fold_accents(title)
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or('0');

    match first {
        'A'..='C' => "A-C",
        'D'..='F' => "D-F",
        'G'..='I' => "G-I",
        'J'..='L' => "J-L",
        'M'..='O' => "M-O",
        'P'..='R' => "P-R",
        'S'..='U' => "S-U",
        'V'..='X' => "V-X",
        'Y' | 'Z' => "Y-Z",
        _ => "0-9",
    }
}

/// Stable 0-9 sub-bucket for a name, identical across runs and platforms.
pub fn hash_bucket(name: &str) -> u64 {
    let digest = Sha256::digest(name.as_bytes());
    let value = digest
        .iter()
        .take(8)
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte));
    value % HASH_BUCKETS
}

/// `Episodes 101-200` for episode 150.
pub fn episode_range(episode: u32) -> String {
    let start = (episode.max(1) - 1) / EPISODES_PER_RANGE * EPISODES_PER_RANGE + 1;
    let end = start + EPISODES_PER_RANGE - 1;
    format!("Episodes {start:03}-{end:03}")
}

/// Folder form of a series name: straight quotes, no dots or underscores,
/// single spaces, no diacritics, title case.
pub fn normalize_series_name(name: &str) -> String {
    let straightened: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' => '"',
            '.' | '_' => ' ',
            c => c,
        })
        .collect();

    let collapsed = straightened.split_whitespace().collect::<Vec<_>>().join(" ");
    title_case(&fold_accents(&collapsed))
}

fn fold_accents(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).nfc().collect()
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let has_lower = word.chars().any(char::is_lowercase);
            if !has_lower && word.chars().filter(|c| c.is_alphabetic()).count() > 1 {
                // acronyms like NCIS stay as written
                return word.to_string();
            }
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

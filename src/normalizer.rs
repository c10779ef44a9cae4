use regex::{Captures, Regex};

use crate::error::Result;
use crate::sanitizer::{map_display_chars, UNKNOWN_NAME};

/// Container extensions stripped from raw names. Anything else after a dot is
/// treated as part of the title ("Mr. Robot", "Movie.Name.1080p").
const MEDIA_EXTENSIONS: &[&str] = &[
    "mkv", "mp4", "avi", "mov", "wmv", "flv", "webm", "m4v", "mpg", "mpeg", "m2ts", "ts",
    "vob", "iso", "ogv", "3gp", "divx", "rmvb", "strm",
];

/// Markers separating language variants of one title, checked in this order.
/// The last one is word-bounded, unlike a plain `"aka "` substring match, so
/// titles ending in "...aka" are not split.
const ALTERNATE_TITLE_MARKERS: &[&str] = &[r"\(aka\)", r" aka ", r" - aka ", r"\baka "];

const MIN_TITLE_CHARS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedName {
    pub display_name: String,
    pub year: Option<u16>,
    pub is_english_likely: bool,
}

#[derive(Debug)]
pub struct FilenameNormalizer {
    paren_year: Regex,
    bare_year: Regex,
    alternate_markers: Vec<Regex>,
    noise_patterns: Vec<Regex>,
    empty_parens: Regex,
    whitespace: Regex,
}

impl FilenameNormalizer {
    pub fn new() -> Result<Self> {
        let alternate_markers = ALTERNATE_TITLE_MARKERS
            .iter()
            .map(|marker| Regex::new(&format!("(?i){marker}")))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let noise_patterns = [
            r"(?i)\b(?:720p|1080p|2160p|4K|HD|CAM|TS|TC|DVDRip|BRRip|BluRay|WEB-DL|WEBRip|HDTV)\b",
            r"(?i)\b(?:x264|x265|H\.264|H\.265|AVC|HEVC)\b",
            r"(?i)\b(?:AAC|AC3|DTS|MP3|FLAC)\b",
            r"\[[^\]]*\]",
            r"\{[^}]*\}",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern))
        .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            paren_year: Regex::new(r"\(\s*((?:19|20)\d{2})\s*\)")?,
            bare_year: Regex::new(r"\b((?:19|20)\d{2})\b")?,
            alternate_markers,
            noise_patterns,
            empty_parens: Regex::new(r"\(\s*\)")?,
            whitespace: Regex::new(r"\s+")?,
        })
    }

    pub fn normalize(&self, raw_name: &str) -> NormalizedName {
        let stem = strip_extension(raw_name).trim();
        let year = self.extract_year(stem);

        let (candidate, is_english_likely) = match self.split_alternate_titles(stem) {
            Some(parts) => self.pick_title_part(&parts, year),
            None => {
                let without_year = self.remove_year(stem, year);
                let english = is_english_likely(&without_year);
                (without_year, english)
            }
        };

        let sanitized = map_display_chars(&candidate);
        let collapsed = self.collapse_whitespace(&sanitized);
        let mut cleaned = self.strip_noise(&collapsed);

        if let Some(year) = year {
            let year_text = year.to_string();
            if !cleaned.is_empty() && !cleaned.contains(&year_text) {
                cleaned = format!("{cleaned} ({year_text})");
            }
        }

        // a title that is only its year ("1917") falls back to the stem
        if cleaned.is_empty() || cleaned == "()" {
            cleaned = self.collapse_whitespace(&map_display_chars(stem));
        }
        if cleaned.is_empty() {
            cleaned = UNKNOWN_NAME.to_string();
        }

        NormalizedName {
            display_name: cleaned,
            year,
            is_english_likely,
        }
    }

    /// Parenthesized years win over bare ones; only 1900-2099 is accepted.
    pub fn extract_year(&self, name: &str) -> Option<u16> {
        self.paren_year
            .captures(name)
            .or_else(|| self.bare_year.captures(name))
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u16>().ok())
            .filter(|year| (1900..=2099).contains(year))
    }

    fn remove_year(&self, name: &str, year: Option<u16>) -> String {
        let Some(year) = year else {
            return name.to_string();
        };
        let year_text = year.to_string();
        let keep_other_years = |caps: &Captures| {
            if &caps[1] == year_text.as_str() {
                String::new()
            } else {
                caps[0].to_string()
            }
        };

        let without_paren = self.paren_year.replace_all(name, keep_other_years);
        self.bare_year
            .replace_all(&without_paren, keep_other_years)
            .into_owned()
    }

    fn split_alternate_titles(&self, name: &str) -> Option<Vec<String>> {
        let marker = self.alternate_markers.iter().find(|re| re.is_match(name))?;
        Some(marker.split(name).map(str::to_string).collect())
    }

    fn pick_title_part(&self, parts: &[String], year: Option<u16>) -> (String, bool) {
        let cleaned: Vec<String> = parts
            .iter()
            .map(|part| trim_separators(&self.remove_year(part, year)).to_string())
            .collect();

        let english = cleaned.iter().find(|part| {
            let visible = part.chars().filter(|c| !c.is_whitespace()).count();
            visible >= MIN_TITLE_CHARS && is_english_likely(part)
        });

        match english {
            Some(part) => (part.clone(), true),
            None => {
                let fallback = cleaned
                    .into_iter()
                    .find(|part| !part.is_empty())
                    .unwrap_or_default();
                (fallback, false)
            }
        }
    }

    fn strip_noise(&self, name: &str) -> String {
        let mut stripped = name.to_string();
        for pattern in &self.noise_patterns {
            stripped = pattern.replace_all(&stripped, " ").into_owned();
        }
        stripped = self.empty_parens.replace_all(&stripped, " ").into_owned();

        trim_separators(&self.collapse_whitespace(&stripped)).to_string()
    }

    fn collapse_whitespace(&self, name: &str) -> String {
        self.whitespace.replace_all(name, " ").trim().to_string()
    }
}

/// Strips a trailing container extension such as `.mkv`; other dotted suffixes are kept.
pub fn strip_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty() && MEDIA_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) =>
        {
            stem
        }
        _ => name,
    }
}

/// More than 20% non-Latin letters, or any character outside the allowed ASCII
/// set, marks the text as not English.
pub fn is_english_likely(text: &str) -> bool {
    let letters = text.chars().filter(|c| c.is_alphabetic()).count();
    let non_latin = text
        .chars()
        .filter(|c| c.is_alphabetic() && !c.is_ascii_alphabetic())
        .count();

    if letters > 0 && non_latin * 5 > letters {
        return false;
    }

    text.chars()
        .all(|c| c.is_ascii_alphanumeric() || " ()-.,:;!?'\"&_".contains(c))
}

fn trim_separators(name: &str) -> &str {
    name.trim_matches(|c: char| c.is_whitespace() || matches!(c, '.' | '-' | '_'))
}

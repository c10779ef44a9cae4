use std::fmt;

use regex::Regex;
use serde::Serialize;

use crate::error::Result;
use crate::normalizer::strip_extension;

/// Minimum score lead required to overrule the movie default.
const DECISION_MARGIN: i32 = 10;
const STRONG_EVIDENCE: i32 = 15;
const PAREN_YEAR_TV_PENALTY: i32 = 10;

const QUALITY_TOKENS: &[&str] = &[
    "720p", "1080p", "4k", "2160p", "hdtv", "bluray", "web-dl", "webrip", "dvdrip", "brrip",
];
const TV_KEYWORDS: &[&str] = &["series", "season", "episode", "pilot", "finale"];
const MOVIE_KEYWORDS: &[&str] = &["movie", "film", "cinema", "theatrical"];
const ROMAN_NUMERALS: &[&str] = &["II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Movie,
    TvSeries,
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaType::Movie => write!(f, "movie"),
            MediaType::TvSeries => write!(f, "tv"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Movie {
        title: String,
        year: Option<u16>,
    },
    TvSeries {
        series_name: String,
        season: Option<u32>,
        episode: Option<u32>,
    },
}

impl Classification {
    pub fn media_type(&self) -> MediaType {
        match self {
            Classification::Movie { .. } => MediaType::Movie,
            Classification::TvSeries { .. } => MediaType::TvSeries,
        }
    }
}

/// Accumulated evidence for one filename, with the names of the rules that fired.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scores {
    pub movie: i32,
    pub tv: i32,
    pub fired: Vec<&'static str>,
}

impl Scores {
    /// Ties and narrow leads fall back to Movie.
    pub fn decide(&self) -> MediaType {
        if (self.movie - self.tv).abs() >= DECISION_MARGIN && self.tv > self.movie {
            MediaType::TvSeries
        } else {
            MediaType::Movie
        }
    }

    fn add(&mut self, target: MediaType, weight: i32, rule: &'static str) {
        match target {
            MediaType::Movie => self.movie += weight,
            MediaType::TvSeries => self.tv += weight,
        }
        self.fired.push(rule);
    }
}

#[derive(Debug)]
enum Signal {
    /// Fires once when the pattern matches the raw name.
    Pattern(Regex),
    /// Fires once when any whitespace token equals one of the values.
    AnyToken(&'static [&'static str]),
    /// Fires once per token occurrence of every listed keyword.
    EachOccurrence(&'static [&'static str]),
    /// Fires once for every listed keyword present among the tokens.
    EachPresent(&'static [&'static str]),
    /// A token of one to three digits, read as combined season and episode.
    ShortNumber,
    /// A roman numeral or a single digit token.
    SequelMarker,
}

#[derive(Debug)]
enum Step {
    Score {
        rule: &'static str,
        target: MediaType,
        weight: i32,
        signal: Signal,
        only_if_movie_below: Option<i32>,
    },
    /// Both sides strong and a parenthesized year present: the year wins.
    ParenYearPenalty,
}

#[derive(Debug)]
pub struct MediaClassifier {
    steps: Vec<Step>,
    paren_year: Regex,
    tv_patterns: [Regex; 2],
    movie_patterns: [Regex; 2],
}

impl MediaClassifier {
    pub fn new() -> Result<Self> {
        let score = |rule: &'static str, target: MediaType, weight: i32, signal: Signal| Step::Score {
            rule,
            target,
            weight,
            signal,
            only_if_movie_below: None,
        };
        use MediaType::{Movie, TvSeries};

        // Evaluation order matters: the short-number gate reads the movie score
        // accumulated so far.
        let steps = vec![
            score("season_episode", TvSeries, 20, Signal::Pattern(Regex::new(r"(?i)S\d+E\d+")?)),
            score("cross_episode", TvSeries, 20, Signal::Pattern(Regex::new(r"(?i)\d+x\d+")?)),
            score("paren_year", Movie, 20, Signal::Pattern(Regex::new(r"\((?:19|20)\d{2}\)")?)),
            score("bare_year", Movie, 15, Signal::Pattern(Regex::new(r"\b(?:19|20)\d{2}\b")?)),
            score("quality", Movie, 15, Signal::AnyToken(QUALITY_TOKENS)),
            score("season_number", TvSeries, 15, Signal::Pattern(Regex::new(r"(?i)Season\s*\d+")?)),
            score("episode_number", TvSeries, 15, Signal::Pattern(Regex::new(r"(?i)Episode\s*\d+")?)),
            Step::Score {
                rule: "short_number",
                target: TvSeries,
                weight: 10,
                signal: Signal::ShortNumber,
                only_if_movie_below: Some(STRONG_EVIDENCE),
            },
            score("part_number", TvSeries, 8, Signal::Pattern(Regex::new(r"(?i)Part\s*\d+")?)),
            score("tv_keyword", TvSeries, 12, Signal::EachOccurrence(TV_KEYWORDS)),
            score("show_keyword", TvSeries, 8, Signal::AnyToken(&["show"])),
            score("movie_keyword", Movie, 12, Signal::EachPresent(MOVIE_KEYWORDS)),
            Step::ParenYearPenalty,
            score(
                "edition",
                Movie,
                8,
                Signal::Pattern(Regex::new(r"(?i)\b(?:Director'?s Cut|Extended|Uncut|Remastered)\b")?),
            ),
            score("sequel", Movie, 3, Signal::SequelMarker),
        ];

        Ok(Self {
            steps,
            paren_year: Regex::new(r"\((?:19|20)\d{2}\)")?,
            tv_patterns: [
                Regex::new(r"(?i)^(.+?)\s*S(\d+)E(\d+)")?,
                Regex::new(r"(?i)^(.+?)\s*(\d+)x(\d+)")?,
            ],
            movie_patterns: [
                Regex::new(r"^(.+?)\s*\((\d{4})\)")?,
                Regex::new(r"^(.+?)\s+((?:19|20)\d{2})\b")?,
            ],
        })
    }

    pub fn classify(&self, raw_name: &str) -> Classification {
        match self.score(raw_name).decide() {
            MediaType::TvSeries => self.extract_series(raw_name),
            MediaType::Movie => self.extract_movie(raw_name),
        }
    }

    pub fn score(&self, raw_name: &str) -> Scores {
        let tokens = tokenize(strip_extension(raw_name));
        let mut scores = Scores::default();

        for step in &self.steps {
            match step {
                Step::Score {
                    rule,
                    target,
                    weight,
                    signal,
                    only_if_movie_below,
                } => {
                    if only_if_movie_below.is_some_and(|limit| scores.movie >= limit) {
                        continue;
                    }
                    let hits = signal_hits(signal, raw_name, &tokens);
                    for _ in 0..hits {
                        scores.add(*target, *weight, *rule);
                    }
                }
                Step::ParenYearPenalty => {
                    if scores.movie >= STRONG_EVIDENCE
                        && scores.tv >= STRONG_EVIDENCE
                        && self.paren_year.is_match(raw_name)
                    {
                        scores.tv -= PAREN_YEAR_TV_PENALTY;
                        scores.fired.push("paren_year_penalty");
                    }
                }
            }
        }

        scores
    }

    fn extract_series(&self, raw_name: &str) -> Classification {
        let stem = strip_extension(raw_name).trim();
        for pattern in &self.tv_patterns {
            if let Some(caps) = pattern.captures(stem) {
                let series_name = clean_series_name(&caps[1]);
                return Classification::TvSeries {
                    series_name: if series_name.is_empty() {
                        stem.to_string()
                    } else {
                        series_name
                    },
                    season: caps[2].parse().ok(),
                    episode: caps[3].parse().ok(),
                };
            }
        }

        Classification::TvSeries {
            series_name: stem.to_string(),
            season: None,
            episode: None,
        }
    }

    fn extract_movie(&self, raw_name: &str) -> Classification {
        let stem = strip_extension(raw_name).trim();
        for pattern in &self.movie_patterns {
            if let Some(caps) = pattern.captures(stem) {
                return Classification::Movie {
                    title: caps[1].trim().to_string(),
                    year: caps[2].parse().ok(),
                };
            }
        }

        Classification::Movie {
            title: stem.to_string(),
            year: None,
        }
    }
}

fn signal_hits(signal: &Signal, raw_name: &str, tokens: &[String]) -> usize {
    match signal {
        Signal::Pattern(re) => usize::from(re.is_match(raw_name)),
        Signal::AnyToken(values) => {
            usize::from(tokens.iter().any(|t| values.iter().any(|v| t.eq_ignore_ascii_case(v))))
        }
        Signal::EachOccurrence(keywords) => tokens
            .iter()
            .map(|t| keywords.iter().filter(|k| t.eq_ignore_ascii_case(k)).count())
            .sum(),
        Signal::EachPresent(keywords) => keywords
            .iter()
            .filter(|k| tokens.iter().any(|t| t.eq_ignore_ascii_case(k)))
            .count(),
        Signal::ShortNumber => usize::from(
            tokens
                .iter()
                .any(|t| (1..=3).contains(&t.len()) && t.chars().all(|c| c.is_ascii_digit())),
        ),
        // Roman numerals only count in upper case, so "x" or "v" as words do not fire.
        Signal::SequelMarker => usize::from(tokens.iter().any(|t| {
            (t.len() == 1 && t.chars().all(|c| c.is_ascii_digit()))
                || ROMAN_NUMERALS.contains(&t.as_str())
        })),
    }
}

/// Whitespace-separated words with surrounding punctuation removed.
/// Dotted scene names ("Movie.Name.S01E02") stay a single token.
fn tokenize(name: &str) -> Vec<String> {
    name.split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

fn clean_series_name(raw: &str) -> String {
    let spaced = raw.replace(['.', '_'], " ");
    spaced
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c == '-' || c.is_whitespace())
        .to_string()
}

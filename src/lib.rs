//! Writes Jellyfin-browsable STRM files for remote media announced by webhooks.
//!
//! Each item's raw filename is cleaned up, classified as a movie or an episode,
//! and placed in a `Movies` / `TV Shows` tree that splits itself before any one
//! directory grows too large.

pub mod census;
pub mod classifier;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod filesystem;
pub mod layout;
pub mod logging;
pub mod normalizer;
pub mod organizer;
pub mod sanitizer;
pub mod tui;
pub mod webhook;

pub use classifier::{Classification, MediaClassifier, MediaType};
pub use config::{ConfigBuilder, DuplicateHandling, OrganizerConfig};
pub use error::{OrganizerError, Result};
pub use filesystem::{Filesystem, LocalFilesystem};
pub use normalizer::{FilenameNormalizer, NormalizedName};
pub use organizer::{BatchReport, ItemOutcome, LayoutPlan, MediaOrganizer};
pub use webhook::{MediaItem, WebhookPayload};

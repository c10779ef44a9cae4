//! Interactive review of a webhook batch before any STRM file is written.

mod app;
mod events;
mod models;
mod processing;
mod rendering;
mod utils;

pub use events::run_tui;
pub use models::ProcessingStats;

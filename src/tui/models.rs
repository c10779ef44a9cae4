use crate::classifier::MediaType;
use crate::webhook::MediaItem;

#[derive(Debug, Clone)]
pub struct ItemRow {
    pub item: MediaItem,
    pub media_type: Option<MediaType>,
    pub display_name: String,
    pub planned_path: Option<String>,
    pub status: ProcessingStatus,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingStatus {
    Pending,
    Processing,
    Written,
    Skipped,
    Error,
}

#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub total: usize,
    pub processed: usize,
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
}

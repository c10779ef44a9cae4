use std::time::{Duration, Instant};

use ratatui::widgets::{ListState, ScrollbarState};

use crate::organizer::{FileDecision, MediaOrganizer};
use crate::webhook::MediaItem;
use super::models::{ItemRow, ProcessingStats, ProcessingStatus};

pub struct App {
    pub rows: Vec<ItemRow>,
    pub selected_index: usize,
    pub list_state: ListState,
    pub current_processing: Option<usize>,
    pub processing_progress: f64,
    pub show_help: bool,
    pub show_preview: bool,
    pub scroll_state: ScrollbarState,
    pub start_time: Option<Instant>,
    pub finished: bool,
    pub stats: ProcessingStats,
    pub organizer: MediaOrganizer,
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,
}

impl App {
    pub fn new(organizer: MediaOrganizer, items: Vec<MediaItem>) -> Self {
        let mut list_state = ListState::default();
        list_state.select(if items.is_empty() { None } else { Some(0) });

        let rows = items
            .into_iter()
            .map(|item| ItemRow {
                item,
                media_type: None,
                display_name: String::new(),
                planned_path: None,
                status: ProcessingStatus::Pending,
                error_message: None,
            })
            .collect::<Vec<_>>();

        let mut app = Self {
            stats: ProcessingStats {
                total: rows.len(),
                ..Default::default()
            },
            scroll_state: ScrollbarState::new(rows.len()),
            rows,
            selected_index: 0,
            list_state,
            current_processing: None,
            processing_progress: 0.0,
            show_help: false,
            show_preview: true,
            start_time: None,
            finished: false,
            organizer,
            status_message: None,
            status_message_time: None,
        };
        app.refresh_plans();
        app
    }

    /// Re-plans every pending row against the current state of the tree.
    pub fn refresh_plans(&mut self) {
        for row in &mut self.rows {
            if row.status != ProcessingStatus::Pending {
                continue;
            }
            match self.organizer.plan_item(&row.item) {
                Ok(plan) => {
                    row.media_type = plan.media_type();
                    row.display_name = plan.normalized.display_name.clone();
                    row.planned_path = Some(plan.target_path().to_string_lossy().to_string());
                    row.error_message = match plan.file {
                        FileDecision::Skip(_) => Some("already exists, will be skipped".to_string()),
                        FileDecision::Write(_) => None,
                    };
                }
                Err(e) => {
                    row.planned_path = None;
                    row.error_message = Some(e.to_string());
                }
            }
        }
    }

    pub fn is_processing(&self) -> bool {
        self.current_processing.is_some()
    }

    pub fn start_processing(&mut self) {
        if self.finished || self.is_processing() || self.rows.is_empty() {
            return;
        }
        self.start_time = Some(Instant::now());
        self.current_processing = Some(0);
    }

    pub fn next(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < self.rows.len() => i + 1,
            _ => 0,
        };
        self.select(i);
    }

    pub fn previous(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => self.rows.len() - 1,
            Some(i) => i - 1,
        };
        self.select(i);
    }

    fn select(&mut self, i: usize) {
        self.list_state.select(Some(i));
        self.selected_index = i;
        self.scroll_state = self.scroll_state.position(i);
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn toggle_preview(&mut self) {
        self.show_preview = !self.show_preview;
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some(message);
        self.status_message_time = Some(Instant::now());
    }

    pub fn clear_status_message_if_expired(&mut self) {
        if let (Some(_), Some(time)) = (&self.status_message, self.status_message_time) {
            if time.elapsed() > Duration::from_secs(3) {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }
}

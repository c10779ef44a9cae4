use tracing::warn;

use crate::organizer::ItemOutcome;
use super::app::App;
use super::models::ProcessingStatus;

impl App {
    /// Writes the row under the cursor of the run and advances. Returns false once the batch is done.
    pub fn process_next(&mut self) -> bool {
        let Some(index) = self.current_processing else {
            return false;
        };
        let total = self.rows.len();
        self.processing_progress = index as f64 / total.max(1) as f64;

        let row = &mut self.rows[index];
        row.status = ProcessingStatus::Processing;

        match self.organizer.process_item(&row.item) {
            Ok(ItemOutcome::Written(path)) => {
                row.status = ProcessingStatus::Written;
                row.planned_path = Some(path.to_string_lossy().to_string());
                row.error_message = None;
                self.stats.written += 1;
            }
            Ok(ItemOutcome::Skipped(path)) => {
                row.status = ProcessingStatus::Skipped;
                row.planned_path = Some(path.to_string_lossy().to_string());
                self.stats.skipped += 1;
            }
            Err(e) => {
                warn!(name = %row.item.name, error = %e, "failed to organize item");
                row.status = ProcessingStatus::Error;
                row.error_message = Some(e.to_string());
                self.stats.failed += 1;
            }
        }
        self.stats.processed += 1;

        if index + 1 < total {
            self.current_processing = Some(index + 1);
            // later rows may now land in a split folder or collide with this one
            self.refresh_plans();
            true
        } else {
            self.current_processing = None;
            self.processing_progress = 1.0;
            self.finished = true;
            let elapsed = self
                .start_time
                .map(|t| t.elapsed().as_millis())
                .unwrap_or_default();
            self.set_status_message(format!(
                "Done in {elapsed} ms: {} written, {} skipped, {} failed",
                self.stats.written, self.stats.skipped, self.stats.failed
            ));
            false
        }
    }
}

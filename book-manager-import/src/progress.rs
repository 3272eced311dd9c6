//! Import progress reporting, pass by pass.

use crate::goodreads::ImportStats;

/// Rows between two `LogProgress` row lines.
const ROW_LOG_INTERVAL: usize = 250;

/// The two passes of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPhase {
    /// Pass 1: reading the whole file and resolving lookups.
    ResolveLookups,
    /// Pass 2: committing `total` rows one by one.
    ImportRows { total: usize },
}

/// Receives progress updates from [`crate::import_goodreads`].
pub trait ImportProgress {
    /// Called when a pass starts.
    fn on_phase(&self, phase: ImportPhase);

    /// Called after row `current` of `total` is committed in pass 2.
    fn on_row(&self, current: usize, total: usize, title: &str);

    /// Called once after the last row, with the final counts.
    fn on_complete(&self, stats: &ImportStats);
}

/// Discards all updates.
pub struct SilentProgress;

impl ImportProgress for SilentProgress {
    fn on_phase(&self, _phase: ImportPhase) {}
    fn on_row(&self, _current: usize, _total: usize, _title: &str) {}
    fn on_complete(&self, _stats: &ImportStats) {}
}

/// Reports through the `log` crate: one line per pass, a row line every few
/// hundred rows, and per-pass totals at the end.
pub struct LogProgress;

impl ImportProgress for LogProgress {
    fn on_phase(&self, phase: ImportPhase) {
        match phase {
            ImportPhase::ResolveLookups => {
                log::info!("Pass 1: resolving bindings, publishers and authors")
            }
            ImportPhase::ImportRows { total } => {
                log::info!("Pass 2: importing {} rows", total)
            }
        }
    }

    fn on_row(&self, current: usize, total: usize, title: &str) {
        if row_checkpoint(current, total) {
            log::info!("  [{}/{}] {}", current, total, title);
        } else {
            log::debug!("  [{}/{}] {}", current, total, title);
        }
    }

    fn on_complete(&self, stats: &ImportStats) {
        log::info!(
            "Pass 1: {} bindings, {} publishers, {} authors created",
            stats.bindings_created,
            stats.publishers_created,
            stats.authors_created,
        );
        log::info!(
            "Pass 2: {} rows, {} books created, {} readings created",
            stats.rows,
            stats.books_created,
            stats.readings_created,
        );
    }
}

/// Whether row `current` of `total` gets an info-level line.
fn row_checkpoint(current: usize, total: usize) -> bool {
    current == total || current % ROW_LOG_INTERVAL == 0
}

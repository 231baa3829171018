//! CLI output formatting.
//!
//! Each command has a `format_*` function returning lines (pure, testable)
//! and, where useful, a `print_*` wrapper that writes them to stdout.
//!
//! ```text
//! Images
//!   0  /photos/a.jpg
//! * 1  /photos/b.jpg
//!
//! ==> Exporting /photos/b.jpg at 1080x1920
//!     resized: .resize-export-temp/b-1080x1920.jpg
//!     saved:   exports/resizedImage.jpg
//! ```

use crate::catalog::ResolutionOption;
use crate::export::{ExportEvent, ExportOutcome};
use crate::selection::SelectionState;

/// Resolution list for the `resolutions` command.
pub fn format_catalog(options: &[ResolutionOption]) -> Vec<String> {
    options
        .iter()
        .map(|r| format!("{:<10} {:>5} x {:<5}", r.label(), r.width, r.height))
        .collect()
}

/// Image list with the chosen one marked `*`.
pub fn format_selection(state: &SelectionState) -> Vec<String> {
    let mut lines = vec!["Images".to_string()];
    if state.images.is_empty() {
        lines.push("  (none)".to_string());
    }
    for (index, asset) in state.images.iter().enumerate() {
        let marker = if state.is_chosen(index) { '*' } else { ' ' };
        lines.push(format!("{marker} {index:<2} {}", asset.source_ref()));
    }
    lines
}

pub fn format_export_event(event: &ExportEvent) -> Vec<String> {
    match event {
        ExportEvent::Started { source, resolution } => {
            vec![format!("==> Exporting {source} at {resolution}")]
        }
        ExportEvent::Resized { output } => vec![format!("    resized: {}", output.display())],
        ExportEvent::Completed(outcome) => format_outcome(outcome)
            .into_iter()
            .map(|line| format!("    {line}"))
            .collect(),
    }
}

/// User-facing result line. The failing stage is kept for the log, not shown.
pub fn format_outcome(outcome: &ExportOutcome) -> Vec<String> {
    match outcome {
        ExportOutcome::Success { stored_ref } => vec![format!("saved:   {}", stored_ref.display())],
        ExportOutcome::Failure { .. } => {
            vec!["failed:  could not export the image, please try again".to_string()]
        }
    }
}

pub fn print_selection(state: &SelectionState) {
    for line in format_selection(state) {
        println!("{line}");
    }
}

pub fn print_catalog(options: &[ResolutionOption]) {
    for line in format_catalog(options) {
        println!("{line}");
    }
}

//! Diagnostics for records and lines dropped during a parse.

use super::ParseError;

/// Recovered problems from one parse run.
///
/// Parsing keeps whatever it can; anything it could not use is recorded
/// here instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseDiagnostics {
    /// Record blocks (or status rows) scanned.
    pub blocks: usize,
    /// Whole geom records that were discarded.
    pub dropped_records: Vec<ParseError>,
    /// Provider/consumer entries that were discarded.
    pub dropped_items: Vec<ParseError>,
    /// Stray sub-block lines and reserved head keys, skipped without
    /// dropping their record.
    pub ignored_lines: Vec<usize>,
}

impl ParseDiagnostics {
    /// Returns `true` when nothing was dropped or skipped.
    pub fn is_clean(&self) -> bool {
        self.dropped_records.is_empty()
            && self.dropped_items.is_empty()
            && self.ignored_lines.is_empty()
    }

    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        for err in &self.dropped_records {
            warnings.push(format!("Dropped record: {err}"));
        }
        for err in &self.dropped_items {
            warnings.push(format!("Dropped entry: {err}"));
        }

        if !self.ignored_lines.is_empty() {
            let lines: Vec<String> = self.ignored_lines.iter().map(usize::to_string).collect();
            warnings.push(format!(
                "Ignored {} unusable line(s): {}",
                self.ignored_lines.len(),
                lines.join(", ")
            ));
        }

        warnings
    }
}

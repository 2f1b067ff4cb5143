//! Side-by-side comparison table of a finished run.

use std::fmt;

use log::debug;

use crate::evaluation::ResultTable;
use crate::Label;

/// Width of every table column, in characters.
pub const COLUMN_WIDTH: usize = 25;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportError {
    #[error("Adapter '{adapter}' has no counts for label '{label}'")]
    MissingLabel { adapter: String, label: Label },
    #[error("Adapter '{adapter}' matched {matched} of {expected} '{label}' items")]
    Inconsistent {
        adapter: String,
        label: Label,
        matched: usize,
        expected: usize,
    },
}

/// One adapter's line of the comparison table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub adapter: String,
    /// `matched/expected`, one cell per label column
    pub cells: Vec<String>,
    pub score: usize,
}

/// The rendered comparison: one row per adapter, one column per label plus
/// the score. `Display` draws it with borders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonTable {
    labels: Vec<Label>,
    rows: Vec<ReportRow>,
}

impl ComparisonTable {
    /// Builds display rows from a finished result table.
    ///
    /// # Errors
    /// `ReportError` if an adapter lacks counts for one of `labels`, or its
    /// counts break `matched <= expected`.
    pub fn from_results(table: &ResultTable, labels: &[Label]) -> Result<Self, ReportError> {
        let mut rows = Vec::with_capacity(table.len());
        for result in table.results() {
            let mut cells = Vec::with_capacity(labels.len());
            for &label in labels {
                let counts = result.counts(label).ok_or_else(|| ReportError::MissingLabel {
                    adapter: result.adapter().to_string(),
                    label,
                })?;
                if counts.matched > counts.expected {
                    return Err(ReportError::Inconsistent {
                        adapter: result.adapter().to_string(),
                        label,
                        matched: counts.matched,
                        expected: counts.expected,
                    });
                }
                cells.push(format!("{}/{}", counts.matched, counts.expected));
            }
            rows.push(ReportRow {
                adapter: result.adapter().to_string(),
                cells,
                score: result.score(),
            });
        }
        Ok(Self {
            labels: labels.to_vec(),
            rows,
        })
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// Column headings: `CALCULATOR`, one plural per label, `SCORE`.
    pub fn headers(&self) -> Vec<String> {
        let mut headers = vec!["CALCULATOR".to_string()];
        headers.extend(
            self.labels
                .iter()
                .map(|label| format!("{}S", label.as_str().to_uppercase())),
        );
        headers.push("SCORE".to_string());
        headers
    }
}

fn write_border(f: &mut fmt::Formatter<'_>, columns: usize) -> fmt::Result {
    for _ in 0..columns {
        write!(f, "+{}", "-".repeat(COLUMN_WIDTH + 2))?;
    }
    writeln!(f, "+")
}

fn write_cells<S: AsRef<str>>(f: &mut fmt::Formatter<'_>, cells: &[S]) -> fmt::Result {
    for cell in cells {
        let cell = cell.as_ref();
        let text: String = cell.chars().take(COLUMN_WIDTH).collect();
        if text.len() < cell.len() {
            debug!("Cell {:?} cut to {} characters", cell, COLUMN_WIDTH);
        }
        write!(f, "| {:<width$} ", text, width = COLUMN_WIDTH)?;
    }
    writeln!(f, "|")
}

impl fmt::Display for ComparisonTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers = self.headers();
        write_border(f, headers.len())?;
        write_cells(f, &headers)?;
        write_border(f, headers.len())?;
        for row in &self.rows {
            let mut cells = Vec::with_capacity(headers.len());
            cells.push(row.adapter.clone());
            cells.extend(row.cells.iter().cloned());
            cells.push(row.score.to_string());
            write_cells(f, &cells)?;
        }
        write_border(f, headers.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::EvaluationResult;

    fn table() -> ResultTable {
        let mut result = EvaluationResult::new("lexicon");
        result.record_expectation(Label::Negative, 2).unwrap();
        result.record_expectation(Label::Positive, 1).unwrap();
        result.record_match(Label::Negative).unwrap();
        let mut table = ResultTable::new();
        table.insert(result).unwrap();
        table
    }

    #[test]
    fn test_rows() {
        let labels = [Label::Negative, Label::Positive];
        let report = ComparisonTable::from_results(&table(), &labels).unwrap();
        assert_eq!(
            report.rows(),
            &[ReportRow {
                adapter: "lexicon".to_string(),
                cells: vec!["1/2".to_string(), "0/1".to_string()],
                score: 1,
            }]
        );
        assert_eq!(report.headers(), vec!["CALCULATOR", "NEGATIVES", "POSITIVES", "SCORE"]);
    }

    #[test]
    fn test_missing_label_is_an_error() {
        let result = ComparisonTable::from_results(&table(), &[Label::Neutral]);
        assert!(matches!(result, Err(ReportError::MissingLabel { label: Label::Neutral, .. })));
    }

    #[test]
    fn test_fixed_width_rendering() {
        let report = ComparisonTable::from_results(&table(), &[Label::Negative]).unwrap();
        let rendered = report.to_string();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 5);
        let width = lines[0].len();
        assert!(lines.iter().all(|line| line.len() == width));
        assert_eq!(width, 3 * (COLUMN_WIDTH + 3) + 1);
        assert!(lines[1].starts_with("| CALCULATOR "));
        assert!(lines[3].contains("| 1/2 "));
    }

    #[test]
    fn test_long_names_are_truncated() {
        let mut table = ResultTable::new();
        let mut result = EvaluationResult::new("a".repeat(40));
        result.record_expectation(Label::Negative, 0).unwrap();
        table.insert(result).unwrap();

        let rendered = ComparisonTable::from_results(&table, &[Label::Negative])
            .unwrap()
            .to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[3].len(), lines[0].len());
    }

    #[test]
    fn test_empty_table() {
        let report = ComparisonTable::from_results(&ResultTable::new(), &Label::ALL).unwrap();
        assert!(report.rows().is_empty());
        assert_eq!(report.to_string().lines().count(), 4);
    }
}

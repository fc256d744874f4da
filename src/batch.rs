//! Splitting every PDF in a directory.
//!
//! Documents are processed one at a time in file-name order. A document that
//! fails to load or to write is recorded in the summary and the batch moves
//! on to the next file.

use crate::error::Result;
use crate::loader;
use crate::splitter::{PoRouterSplitter, SplitOutcome, SplitReport, SplitTargets};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Suffix of the PO output file.
pub const PO_SUFFIX: &str = "_PO.pdf";
/// Suffix of the router output file.
pub const ROUTER_SUFFIX: &str = "_ROUTER.pdf";

/// One document that could not be processed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchFailure {
    /// Input file
    pub file: PathBuf,
    /// What went wrong
    pub error: String,
}

/// Per-document result of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEntry {
    /// Input file
    pub file: PathBuf,
    /// Split report for the file
    pub report: SplitReport,
}

/// Totals of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    /// Local start time, RFC 3339
    pub started_at: String,
    /// Wall-clock duration in milliseconds
    pub elapsed_ms: u128,
    /// Documents attempted
    pub processed: usize,
    /// Documents split into two sections
    pub split: usize,
    /// Documents saved whole as PO
    pub no_split: usize,
    /// Documents that failed to load or write
    pub failed: usize,
    /// Details of each failure
    pub failures: Vec<BatchFailure>,
    /// Reports of every document that loaded
    pub entries: Vec<BatchEntry>,
}

impl BatchSummary {
    /// `true` when no document failed.
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Runs a splitter over a directory of PDFs.
pub struct BatchRunner {
    splitter: PoRouterSplitter,
}

impl BatchRunner {
    /// Create a runner around a configured splitter.
    pub fn new(splitter: PoRouterSplitter) -> Self {
        Self { splitter }
    }

    /// The splitter used for each document.
    pub fn splitter(&self) -> &PoRouterSplitter {
        &self.splitter
    }

    /// Output destinations for `input` inside `output_dir`.
    pub fn targets_for(input: &Path, output_dir: &Path) -> SplitTargets {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        SplitTargets::new(
            output_dir.join(format!("{}{}", stem, PO_SUFFIX)),
            output_dir.join(format!("{}{}", stem, ROUTER_SUFFIX)),
        )
    }

    /// Split every `*.pdf` in `input_dir`, writing into `output_dir`.
    ///
    /// Fails only if the directories themselves cannot be read or created.
    pub fn run(&self, input_dir: &Path, output_dir: &Path) -> Result<BatchSummary> {
        let started_at = chrono::Local::now().to_rfc3339();
        let start = Instant::now();

        fs::create_dir_all(output_dir)?;
        let inputs = discover_pdfs(input_dir)?;
        log::info!("Found {} PDF(s) in {}", inputs.len(), input_dir.display());

        let mut summary = BatchSummary {
            started_at,
            elapsed_ms: 0,
            processed: 0,
            split: 0,
            no_split: 0,
            failed: 0,
            failures: Vec::new(),
            entries: Vec::new(),
        };

        for (n, input) in inputs.iter().enumerate() {
            log::info!("[{}/{}] {}", n + 1, inputs.len(), input.display());
            summary.processed += 1;

            let document = match loader::load(input) {
                Ok(document) => document,
                Err(e) => {
                    log::error!("Failed to load {}: {}", input.display(), e);
                    summary.failed += 1;
                    summary.failures.push(BatchFailure {
                        file: input.clone(),
                        error: e.to_string(),
                    });
                    continue;
                },
            };

            let report = self
                .splitter
                .split(&document, &Self::targets_for(input, output_dir));
            match report.outcome {
                SplitOutcome::Split => summary.split += 1,
                SplitOutcome::NoSplit => summary.no_split += 1,
                SplitOutcome::Error => {
                    summary.failed += 1;
                    summary.failures.push(BatchFailure {
                        file: input.clone(),
                        error: report.explanation.clone(),
                    });
                },
            }
            summary.entries.push(BatchEntry {
                file: input.clone(),
                report,
            });
        }

        summary.elapsed_ms = start.elapsed().as_millis();
        log::info!(
            "Batch complete: {} processed, {} split, {} whole, {} failed",
            summary.processed,
            summary.split,
            summary.no_split,
            summary.failed
        );
        Ok(summary)
    }
}

/// `*.pdf` files directly inside `dir`, sorted by name.
fn discover_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pdfs: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    pdfs.sort();
    Ok(pdfs)
}

//! Materializing a split decision on disk.
//!
//! Both sections are staged completely before either is moved into place. A
//! failure while staging leaves the destinations untouched; a failure while
//! committing the router section removes the already committed PO section.
//! Committing replaces existing files, so a PO file left by an earlier run is
//! gone once the new PO section has been committed, even if the router commit
//! then fails.
//!
//! A section that is not written (the router of a whole-document save, or an
//! empty section) has any stale file at its target removed, so the targets
//! always describe the latest run.

use super::report::{SplitOutcome, SplitReport, SplitTargets};
use crate::detection::SplitDecision;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::writer::{self, StagedFile};
use std::fs;
use std::path::Path;

/// Act on `decision` for `document` at the given confidence threshold.
///
/// Never returns an error: persistence failures become
/// [`SplitOutcome::Error`] reports.
pub fn execute(
    document: &Document,
    decision: &SplitDecision,
    threshold: f64,
    targets: &SplitTargets,
) -> SplitReport {
    let total = document.page_count();

    let result = match decision.split_point {
        Some(split_point) if decision.confidence >= threshold => {
            write_sections(document, split_point, targets).map(|(po_pages, router_pages)| {
                let explanation = format!("Successfully split at {}", decision.explanation);
                (SplitOutcome::Split, explanation, po_pages, router_pages)
            })
        },
        Some(_) => write_whole(document, targets).map(|_| {
            let explanation = format!(
                "No confident split point found (confidence: {:.2} < {}), saved entire document as PO",
                decision.confidence, threshold
            );
            (SplitOutcome::NoSplit, explanation, total, 0)
        }),
        None => write_whole(document, targets).map(|_| {
            let explanation = format!(
                "No split point ({}), saved entire document as PO",
                decision.explanation
            );
            (SplitOutcome::NoSplit, explanation, total, 0)
        }),
    };

    match result {
        Ok((outcome, explanation, po_pages, router_pages)) => {
            log::info!("{}: {}", outcome, explanation);
            SplitReport {
                outcome,
                split_point: decision.split_point,
                confidence: decision.confidence,
                threshold,
                explanation,
                po_pages,
                router_pages,
            }
        },
        Err(e) => {
            let explanation = format!("PDF splitting failed: {}", e);
            log::error!("{} ({})", explanation, document.source().display());
            SplitReport {
                outcome: SplitOutcome::Error,
                split_point: decision.split_point,
                confidence: decision.confidence,
                threshold,
                explanation,
                po_pages: 0,
                router_pages: 0,
            }
        },
    }
}

fn write_whole(document: &Document, targets: &SplitTargets) -> Result<()> {
    let staged =
        writer::stage_copy(document.source(), &targets.po).map_err(|e| Error::split_io("PO", e))?;
    staged.commit().map_err(|e| Error::split_io("PO", e))?;
    remove_stale(&targets.router);
    log::info!("Entire document saved as PO: {}", targets.po.display());
    Ok(())
}

fn write_sections(
    document: &Document,
    split_point: usize,
    targets: &SplitTargets,
) -> Result<(usize, usize)> {
    let total = document.page_count();
    let source = document.source();
    let split_point = split_point.min(total);

    let po: Option<StagedFile> = if split_point > 0 {
        Some(
            writer::stage_page_range(source, 0..split_point, &targets.po)
                .map_err(|e| Error::split_io("PO", e))?,
        )
    } else {
        None
    };
    let router: Option<StagedFile> = if split_point < total {
        Some(
            writer::stage_page_range(source, split_point..total, &targets.router)
                .map_err(|e| Error::split_io("router", e))?,
        )
    } else {
        None
    };

    let committed_po = match po {
        Some(staged) => Some(staged.commit().map_err(|e| Error::split_io("PO", e))?),
        None => None,
    };
    if let Some(staged) = router {
        if let Err(e) = staged.commit() {
            if let Some(path) = committed_po {
                if let Err(remove_err) = fs::remove_file(&path) {
                    log::warn!("Could not remove {}: {}", path.display(), remove_err);
                }
            }
            return Err(Error::split_io("router", e));
        }
    }

    if split_point == 0 {
        remove_stale(&targets.po);
    }
    if split_point == total {
        remove_stale(&targets.router);
    }

    if split_point > 0 {
        log::info!("PO section saved (pages 1-{}): {}", split_point, targets.po.display());
    }
    if split_point < total {
        log::info!(
            "Router section saved (pages {}-{}): {}",
            split_point + 1,
            total,
            targets.router.display()
        );
    }

    Ok((split_point, total - split_point))
}

/// Delete an output file left at `path` by an earlier run.
fn remove_stale(path: &Path) {
    if !path.is_file() {
        return;
    }
    match fs::remove_file(path) {
        Ok(()) => log::debug!("Removed stale output {}", path.display()),
        Err(e) => log::warn!("Could not remove stale output {}: {}", path.display(), e),
    }
}

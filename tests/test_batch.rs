//! Batch runs over directories of real PDFs.

mod common;

use common::{write_pdf, PageSpec, PO_TEXT};
use po_router_split::batch::{BatchRunner, PO_SUFFIX};
use po_router_split::{PoRouterSplitter, SplitOutcome, SplitterConfig};
use std::fs;

fn runner() -> BatchRunner {
    BatchRunner::new(PoRouterSplitter::new(SplitterConfig::default().with_ocr(false)))
}

#[test]
fn test_unwritable_output_counted_and_batch_continues() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_pdf(&input.path().join("a.pdf"), &[PageSpec::portrait(PO_TEXT)]);
    write_pdf(&input.path().join("b.pdf"), &[PageSpec::portrait(PO_TEXT)]);

    // An occupied directory where a.pdf's PO file belongs makes the commit fail.
    let blocked = output.path().join(format!("a{}", PO_SUFFIX));
    fs::create_dir(&blocked).unwrap();
    fs::write(blocked.join("occupied"), b"x").unwrap();

    let summary = runner().run(input.path(), output.path()).unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.no_split, 1);
    assert!(!summary.all_succeeded());
    assert_eq!(summary.failures[0].file, input.path().join("a.pdf"));
    assert!(summary.failures[0].error.starts_with("PDF splitting failed"));

    assert_eq!(summary.entries.len(), 2);
    assert_eq!(summary.entries[0].report.outcome, SplitOutcome::Error);
    assert_eq!(summary.entries[1].report.outcome, SplitOutcome::NoSplit);
    assert!(output.path().join(format!("b{}", PO_SUFFIX)).is_file());
}

#[test]
fn test_mixed_batch_totals() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let mut first = PO_TEXT.to_vec();
    first.push("Page 1 of 1");
    write_pdf(
        &input.path().join("mixed.pdf"),
        &[PageSpec::portrait(&first), PageSpec::landscape(common::ROUTER_TEXT)],
    );
    write_pdf(&input.path().join("po_only.pdf"), &[PageSpec::portrait(PO_TEXT)]);
    fs::write(input.path().join("zz_broken.pdf"), b"not a pdf").unwrap();

    let summary = runner().run(input.path(), output.path()).unwrap();

    assert_eq!(summary.processed, 3);
    assert_eq!((summary.split, summary.no_split, summary.failed), (1, 1, 1));
    assert!(output.path().join("mixed_ROUTER.pdf").is_file());
    assert!(!output.path().join("po_only_ROUTER.pdf").exists());
}

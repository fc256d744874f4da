//! Writing page ranges of a source PDF to new files.
//!
//! Output is always staged in a temporary file next to its destination and
//! moved into place with a single rename, so a destination either holds a
//! complete PDF or is left untouched.
//!
//! ```text
//! source.pdf ──extract_pages(range)──► lopdf::Document
//!                                          │ save_to
//!                                          ▼
//!                        dest-dir/.po-router-split*.part  (StagedFile)
//!                                          │ commit (rename)
//!                                          ▼
//!                                      dest.pdf
//! ```

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{self, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Load `source` and drop every page outside `range` (0-based, end exclusive).
pub fn extract_pages(source: &Path, range: Range<usize>) -> Result<lopdf::Document> {
    let mut pdf = lopdf::Document::load(source)?;
    let page_count = pdf.get_pages().len();

    if range.start >= range.end || range.end > page_count {
        return Err(Error::PageOutOfRange {
            index: range.end.saturating_sub(1).max(range.start),
            page_count,
        });
    }

    let doomed: Vec<u32> = (0..page_count)
        .filter(|index| !range.contains(index))
        .map(|index| index as u32 + 1)
        .collect();

    if !doomed.is_empty() {
        pdf.delete_pages(&doomed);
        pdf.prune_objects();
        pdf.renumber_objects();
    }
    pdf.compress();

    Ok(pdf)
}

/// A fully written output file waiting to be moved into place.
#[derive(Debug)]
pub struct StagedFile {
    temp: NamedTempFile,
    dest: PathBuf,
}

impl StagedFile {
    /// Create an empty staging file in the destination's directory.
    fn create(dest: &Path) -> Result<Self> {
        let dir = match dest.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let temp = tempfile::Builder::new()
            .prefix(".po-router-split")
            .suffix(".part")
            .tempfile_in(dir)?;
        Ok(Self {
            temp,
            dest: dest.to_path_buf(),
        })
    }

    /// Final destination.
    pub fn dest(&self) -> &Path {
        &self.dest
    }

    /// Move the staged file to its destination.
    ///
    /// Dropping a `StagedFile` without committing deletes the staging file.
    pub fn commit(self) -> Result<PathBuf> {
        let Self { temp, dest } = self;
        temp.persist(&dest).map_err(|e| Error::Io(e.error))?;
        Ok(dest)
    }
}

/// Stage `range` of `source` for writing to `dest`.
pub fn stage_page_range(source: &Path, range: Range<usize>, dest: &Path) -> Result<StagedFile> {
    let mut pdf = extract_pages(source, range)?;
    let mut staged = StagedFile::create(dest)?;
    pdf.save_to(&mut staged.temp)?;
    staged.temp.flush()?;
    staged.temp.as_file().sync_all()?;
    Ok(staged)
}

/// Stage a byte-for-byte copy of `source` for writing to `dest`.
pub fn stage_copy(source: &Path, dest: &Path) -> Result<StagedFile> {
    let mut staged = StagedFile::create(dest)?;
    let mut input = File::open(source)?;
    io::copy(&mut input, &mut staged.temp)?;
    staged.temp.flush()?;
    staged.temp.as_file().sync_all()?;
    Ok(staged)
}

/// Write `range` of `source` to `dest` in one step.
pub fn write_page_range(source: &Path, range: Range<usize>, dest: &Path) -> Result<PathBuf> {
    stage_page_range(source, range, dest)?.commit()
}

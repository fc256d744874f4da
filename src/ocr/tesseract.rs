//! Out-of-process OCR with poppler's `pdftoppm` and `tesseract`.
//!
//! For each page: extract a single-page PDF into a private temp directory,
//! rasterize it at the requested DPI, run tesseract on the image and read
//! the resulting text file. Every program runs under a hard timeout. The temp
//! directory is removed when it goes out of scope, on success and failure
//! alike.

use super::OcrEngine;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::writer;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Polling interval while waiting for an external program.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Settings for the external OCR programs.
#[derive(Debug, Clone, PartialEq)]
pub struct TesseractConfig {
    /// Rasterizer executable
    pub pdftoppm: PathBuf,
    /// OCR executable
    pub tesseract: PathBuf,
    /// Tesseract page segmentation mode
    pub page_segmentation_mode: u8,
    /// Tesseract language
    pub language: String,
    /// Hard timeout per program invocation
    pub timeout: Duration,
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            pdftoppm: PathBuf::from("pdftoppm"),
            tesseract: PathBuf::from("tesseract"),
            // Uniform block of text; works well on form-like scans
            page_segmentation_mode: 6,
            language: "eng".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// OCR engine shelling out to `pdftoppm` and `tesseract`.
#[derive(Debug, Clone, Default)]
pub struct TesseractOcr {
    config: TesseractConfig,
}

impl TesseractOcr {
    /// Create an engine with default program names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with custom settings.
    pub fn with_config(config: TesseractConfig) -> Self {
        Self { config }
    }

    /// Set the per-program timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Current settings.
    pub fn config(&self) -> &TesseractConfig {
        &self.config
    }

    fn recognize(&self, source: &Path, page_index: usize, dpi: u32) -> Result<String> {
        let scratch = tempfile::Builder::new().prefix("po-router-ocr").tempdir()?;

        let single_page = scratch.path().join("page.pdf");
        writer::write_page_range(source, page_index..page_index + 1, &single_page)?;

        let image_base = scratch.path().join("page");
        let mut rasterize = Command::new(&self.config.pdftoppm);
        rasterize
            .arg("-r")
            .arg(dpi.to_string())
            .arg("-gray")
            .arg("-png")
            .arg("-singlefile")
            .arg(&single_page)
            .arg(&image_base);
        run_with_timeout(&mut rasterize, self.config.timeout)?;

        let image = image_base.with_extension("png");
        let text_base = scratch.path().join("ocr");
        let mut recognize = Command::new(&self.config.tesseract);
        recognize
            .arg(&image)
            .arg(&text_base)
            .arg("--psm")
            .arg(self.config.page_segmentation_mode.to_string())
            .arg("-l")
            .arg(&self.config.language);
        run_with_timeout(&mut recognize, self.config.timeout)?;

        let text = std::fs::read_to_string(text_base.with_extension("txt"))?;
        Ok(text)
    }
}

impl OcrEngine for TesseractOcr {
    fn ocr_text(&self, document: &Document, page_index: usize, dpi: u32) -> String {
        let started = Instant::now();
        match self.recognize(document.source(), page_index, dpi) {
            Ok(text) => {
                log::debug!(
                    "OCR page {} of {}: {} chars in {:?}",
                    page_index,
                    document.source().display(),
                    text.len(),
                    started.elapsed()
                );
                text
            },
            Err(e) => {
                log::error!(
                    "OCR failed for page {} of {}: {}",
                    page_index,
                    document.source().display(),
                    e
                );
                String::new()
            },
        }
    }
}

/// Run a program to completion, killing it once `timeout` has elapsed.
///
/// Output streams are discarded; programs write their results to files.
pub(crate) fn run_with_timeout(command: &mut Command, timeout: Duration) -> Result<()> {
    let program = command.get_program().to_string_lossy().to_string();
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| Error::Ocr(format!("cannot start {}: {}", program, e)))?;

    let started = Instant::now();
    loop {
        match child.try_wait()? {
            Some(status) if status.success() => return Ok(()),
            Some(status) => {
                return Err(Error::Ocr(format!("{} exited with {}", program, status)));
            },
            None if started.elapsed() > timeout => {
                log::warn!("{} exceeded {:?}, killing", program, timeout);
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::OcrTimeout { program, timeout });
            },
            None => std::thread::sleep(POLL_INTERVAL),
        }
    }
}

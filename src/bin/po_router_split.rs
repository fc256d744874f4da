//! PO / Router splitter
//!
//! Splits scanned purchase-order PDFs into a PO section and a manufacturing
//! router section.
//!
//! Usage:
//!   po_router_split <input.pdf> <po.pdf> <router.pdf> [options]
//!   po_router_split --batch <input_dir> <output_dir> [options]
//!   po_router_split --analyze <input.pdf> [--thresholds 0.5,0.6,0.7] [options]
//!
//! Options:
//!   --min-confidence X   split threshold (default 0.7)
//!   --no-ocr             never OCR pages without native text
//!   --dpi N              OCR rendering resolution (default 300)
//!   --parallel           run the heuristic detectors on separate threads
//!   --config FILE        JSON configuration file
//!   --json               machine-readable output
//!   --verbose, -v        debug logging
//!
//! Exit codes: 0 success, 1 output could not be written, 2 usage error.

use po_router_split::detection::SplitDecision;
use po_router_split::splitter::probe_thresholds;
use po_router_split::{
    loader, BatchRunner, BatchSummary, PoRouterSplitter, SplitReport, SplitTargets,
    SplitterConfig, ThresholdProbe,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process;

const DEFAULT_THRESHOLDS: &[f64] = &[0.3, 0.5, 0.6, 0.7, 0.8, 0.9];

const USAGE: &str = "\
Usage:
  po_router_split <input.pdf> <po.pdf> <router.pdf> [options]
  po_router_split --batch <input_dir> <output_dir> [options]
  po_router_split --analyze <input.pdf> [--thresholds 0.5,0.6,0.7] [options]

Options:
  --min-confidence X   split threshold (default 0.7)
  --no-ocr             never OCR pages without native text
  --dpi N              OCR rendering resolution (default 300)
  --parallel           run the heuristic detectors on separate threads
  --config FILE        JSON configuration file
  --json               machine-readable output
  --verbose, -v        debug logging";

enum Mode {
    Split {
        input: PathBuf,
        targets: SplitTargets,
    },
    Batch {
        input_dir: PathBuf,
        output_dir: PathBuf,
    },
    Analyze {
        input: PathBuf,
        thresholds: Vec<f64>,
    },
}

struct CliArgs {
    mode: Mode,
    min_confidence: Option<f64>,
    no_ocr: bool,
    dpi: Option<u32>,
    parallel: bool,
    config_file: Option<PathBuf>,
    json: bool,
    verbose: bool,
}

#[derive(Serialize)]
struct AnalysisReport<'a> {
    file: &'a PathBuf,
    pages: usize,
    decision: &'a SplitDecision,
    thresholds: Vec<ThresholdProbe>,
}

fn value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(|s| s.as_str())
        .ok_or_else(|| format!("{} requires a value", flag))
}

fn parse_number<T: std::str::FromStr>(raw: &str, flag: &str) -> Result<T, String> {
    raw.parse()
        .map_err(|_| format!("invalid value for {}: '{}'", flag, raw))
}

impl CliArgs {
    fn parse(args: &[String]) -> Result<Self, String> {
        let mut positional: Vec<String> = Vec::new();
        let mut batch = false;
        let mut analyze = false;
        let mut thresholds = None;
        let mut min_confidence = None;
        let mut no_ocr = false;
        let mut dpi = None;
        let mut parallel = false;
        let mut config_file = None;
        let mut json = false;
        let mut verbose = false;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--batch" => batch = true,
                "--analyze" => analyze = true,
                "--thresholds" => {
                    let raw = value(args, &mut i, "--thresholds")?;
                    let levels = raw
                        .split(',')
                        .map(|level| parse_number::<f64>(level.trim(), "--thresholds"))
                        .collect::<Result<Vec<_>, _>>()?;
                    thresholds = Some(levels);
                },
                "--min-confidence" => {
                    let raw = value(args, &mut i, "--min-confidence")?;
                    min_confidence = Some(parse_number(raw, "--min-confidence")?);
                },
                "--dpi" => {
                    let raw = value(args, &mut i, "--dpi")?;
                    dpi = Some(parse_number(raw, "--dpi")?);
                },
                "--config" => {
                    config_file = Some(PathBuf::from(value(args, &mut i, "--config")?));
                },
                "--no-ocr" => no_ocr = true,
                "--parallel" => parallel = true,
                "--json" => json = true,
                "--verbose" | "-v" => verbose = true,
                flag if flag.starts_with("--") => return Err(format!("unknown option {}", flag)),
                other => positional.push(other.to_string()),
            }
            i += 1;
        }

        let mode = match (batch, analyze, positional.as_slice()) {
            (true, true, _) => return Err("--batch and --analyze are exclusive".to_string()),
            (true, false, [input_dir, output_dir]) => Mode::Batch {
                input_dir: PathBuf::from(input_dir),
                output_dir: PathBuf::from(output_dir),
            },
            (false, true, [input]) => Mode::Analyze {
                input: PathBuf::from(input),
                thresholds: thresholds.unwrap_or_else(|| DEFAULT_THRESHOLDS.to_vec()),
            },
            (false, false, [input, po, router]) => Mode::Split {
                input: PathBuf::from(input),
                targets: SplitTargets::new(po, router),
            },
            _ => return Err("wrong number of arguments".to_string()),
        };

        Ok(Self {
            mode,
            min_confidence,
            no_ocr,
            dpi,
            parallel,
            config_file,
            json,
            verbose,
        })
    }

    fn config(&self) -> po_router_split::Result<SplitterConfig> {
        let mut config = match &self.config_file {
            Some(path) => SplitterConfig::from_json_file(path)?,
            None => SplitterConfig::default(),
        }
        .apply_env()?;

        if let Some(threshold) = self.min_confidence {
            config = config.with_min_confidence(threshold);
        }
        if let Some(dpi) = self.dpi {
            config = config.with_ocr_dpi(dpi);
        }
        if self.no_ocr {
            config = config.with_ocr(false);
        }
        if self.parallel {
            config = config.with_parallel_detectors(true);
        }
        config.validate()?;
        Ok(config)
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error: could not serialize report: {}", e),
    }
}

fn print_report(report: &SplitReport) {
    println!("Result: {}", if report.success() { "SUCCESS" } else { "FAILED" });
    println!("Outcome: {}", report.outcome);
    println!("Explanation: {}", report.explanation);
}

fn print_summary(summary: &BatchSummary) {
    println!("\n{}", "=".repeat(60));
    println!("PO / ROUTER BATCH REPORT");
    println!("{}", "=".repeat(60));
    println!("  Started:        {}", summary.started_at);
    println!("  Processed:      {}", summary.processed);
    println!("  ✓ Split:        {}", summary.split);
    println!("  ✓ Whole PO:     {}", summary.no_split);
    println!("  ✗ Failed:       {}", summary.failed);
    println!("  Total Time:     {:.2}s", summary.elapsed_ms as f64 / 1000.0);

    if !summary.failures.is_empty() {
        println!("\nFailed PDFs:");
        for failure in &summary.failures {
            println!("  {}: {}", failure.file.display(), failure.error);
        }
    }
    println!("{}", "=".repeat(60));
}

fn print_analysis(report: &AnalysisReport<'_>) {
    let decision = report.decision;
    println!("File: {} ({} pages)", report.file.display(), report.pages);
    match decision.split_point {
        Some(page) => println!("Split point: page {} (index {})", page + 1, page),
        None => println!("Split point: none"),
    }
    println!("Confidence: {:.2}", decision.confidence);
    println!("Explanation: {}", decision.explanation);

    if !decision.candidates.is_empty() {
        println!("\nCandidates:");
        for candidate in &decision.candidates {
            println!(
                "  page {:3}  {:.2}  {}",
                candidate.page + 1,
                candidate.confidence,
                candidate.evidence.join(" | ")
            );
        }
    }

    println!("\nThresholds:");
    for probe in &report.thresholds {
        println!(
            "  {:.2}  {}",
            probe.threshold,
            if probe.would_split { "SPLIT" } else { "NO_SPLIT" }
        );
    }
}

fn run(cli: &CliArgs) -> po_router_split::Result<i32> {
    let config = cli.config()?;
    let splitter = PoRouterSplitter::new(config);

    match &cli.mode {
        Mode::Split { input, targets } => {
            let document = loader::load(input)?;
            let report = splitter.split(&document, targets);
            if cli.json {
                print_json(&report);
            } else {
                print_report(&report);
            }
            Ok(if report.success() { 0 } else { 1 })
        },
        Mode::Batch {
            input_dir,
            output_dir,
        } => {
            let summary = BatchRunner::new(splitter).run(input_dir, output_dir)?;
            if cli.json {
                print_json(&summary);
            } else {
                print_summary(&summary);
            }
            Ok(if summary.all_succeeded() { 0 } else { 1 })
        },
        Mode::Analyze { input, thresholds } => {
            let document = loader::load(input)?;
            let decision = splitter.find_optimal_split_point(&document);
            let report = AnalysisReport {
                file: input,
                pages: document.page_count(),
                decision: &decision,
                thresholds: probe_thresholds(&decision, thresholds),
            };
            if cli.json {
                print_json(&report);
            } else {
                print_analysis(&report);
            }
            Ok(0)
        },
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{}", USAGE);
        return;
    }

    let cli = match CliArgs::parse(&args) {
        Ok(cli) => cli,
        Err(message) => {
            eprintln!("Error: {}\n\n{}", message, USAGE);
            process::exit(2);
        },
    };

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(&cli) {
        Ok(code) => process::exit(code),
        Err(e @ po_router_split::Error::InvalidConfig(_)) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        std::iter::once("po_router_split")
            .chain(raw.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_split_mode() {
        let cli = CliArgs::parse(&args(&["in.pdf", "po.pdf", "router.pdf", "--min-confidence", "0.6"]))
            .unwrap();
        match cli.mode {
            Mode::Split { input, targets } => {
                assert_eq!(input, PathBuf::from("in.pdf"));
                assert_eq!(targets.router, PathBuf::from("router.pdf"));
            },
            _ => panic!("expected split mode"),
        }
        assert_eq!(cli.min_confidence, Some(0.6));
    }

    #[test]
    fn test_parse_analyze_thresholds() {
        let cli = CliArgs::parse(&args(&["--analyze", "in.pdf", "--thresholds", "0.5, 0.9"])).unwrap();
        match cli.mode {
            Mode::Analyze { thresholds, .. } => assert_eq!(thresholds, vec![0.5, 0.9]),
            _ => panic!("expected analyze mode"),
        }
    }

    #[test]
    fn test_parse_batch_with_flags() {
        let cli = CliArgs::parse(&args(&["--batch", "in", "out", "--no-ocr", "--json", "-v"])).unwrap();
        assert!(matches!(cli.mode, Mode::Batch { .. }));
        assert!(cli.no_ocr && cli.json && cli.verbose);
    }

    #[test]
    fn test_parse_errors() {
        assert!(CliArgs::parse(&args(&["in.pdf"])).is_err());
        assert!(CliArgs::parse(&args(&["--batch", "--analyze", "a", "b"])).is_err());
        assert!(CliArgs::parse(&args(&["a", "b", "c", "--dpi", "high"])).is_err());
        assert!(CliArgs::parse(&args(&["a", "b", "c", "--min-confidence"])).is_err());
        assert!(CliArgs::parse(&args(&["a", "b", "c", "--bogus"])).is_err());
    }
}

//! One report run: config → parse → index → correlate → write.
//!
//! Returns the process exit code on success. Fatal errors come back as
//! `ReportError` and carry their own exit code.

use crate::cli::Cli;
use crate::site::{write_json, write_site};
use crate::summary::{error_listing, kind_breakdown};
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};
use vgreport_common::error::{EXIT_ERRORS_FOUND, EXIT_SUCCESS};
use vgreport_common::{Correlator, ErrorSet, ParseOptions, ReportConfig, ReportError, Result, TrackedRoot};

fn print(out: &mut dyn Write, text: &str) -> Result<()> {
    out.write_all(text.as_bytes())
        .map_err(|e| ReportError::output("<stdout>", e))
}

/// Run with an explicit working directory and stdout sink.
pub fn run(cli: &Cli, cwd: &Path, out: &mut dyn Write) -> Result<i32> {
    let config = cli.merge(ReportConfig::load(cli.config.as_deref(), cwd)?);

    let source_dir = cwd.join(&config.source_dir);
    if !source_dir.is_dir() {
        warn!(
            "source directory {} does not exist; no error can be anchored",
            source_dir.display()
        );
    }
    let root = TrackedRoot::new(&source_dir).map_err(|source| ReportError::Input {
        path: source_dir.clone(),
        source,
    })?;

    let input = cwd.join(&cli.input);
    let options = ParseOptions {
        substitutions: config.substitute_path.clone(),
    };
    let set = ErrorSet::load(&input, root, &options)?;

    let correlator = Correlator::new(&set, config.window_size());
    let pages = correlator.pages();
    let summary = correlator.summary(&pages);

    let out_dir = cwd.join(&config.output_dir);
    write_site(&out_dir, &pages, &summary)?;
    if config.json {
        write_json(&out_dir, &pages, &summary)?;
    }
    info!(
        "{} errors, {} source files, report in {}",
        summary.total_errors,
        summary.sources.len(),
        out_dir.display()
    );

    if cli.summary {
        let text = if cli.by_kind {
            kind_breakdown(&set)
        } else {
            error_listing(&set)
        };
        print(out, &text)?;
    }
    if cli.number_of_errors {
        print(out, &format!("{}\n", set.count()))?;
    }

    if cli.abort_on_errors && set.count() > 0 {
        return Ok(EXIT_ERRORS_FOUND);
    }
    Ok(EXIT_SUCCESS)
}

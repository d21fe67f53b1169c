//! Report directory writer.
//!
//! Writes one page per correlated source file, `index.html`, and optionally
//! `report.json` holding the same data the pages were rendered from.

use crate::html::{render_index, render_page};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use vgreport_common::model::{RunSummary, SourcePage};
use vgreport_common::{ReportError, Result, INDEX_PAGE};

/// Name of the JSON dump inside the report directory
pub const JSON_REPORT: &str = "report.json";

#[derive(Serialize)]
struct ReportDocument<'a> {
    summary: &'a RunSummary,
    pages: &'a [SourcePage],
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|e| ReportError::output(path, e))
}

/// Write the whole site. Returns the paths written, index last.
pub fn write_site(out_dir: &Path, pages: &[SourcePage], summary: &RunSummary) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir).map_err(|e| ReportError::output(out_dir, e))?;

    let mut written = Vec::with_capacity(pages.len() + 1);
    for page in pages {
        let path = out_dir.join(&page.link);
        debug!("writing {}", path.display());
        write_file(&path, &render_page(page))?;
        written.push(path);
    }

    let index = out_dir.join(INDEX_PAGE);
    write_file(&index, &render_index(summary))?;
    written.push(index);

    info!(
        "wrote {} source pages to {}",
        pages.len(),
        out_dir.display()
    );
    Ok(written)
}

/// Write `report.json` next to the pages.
pub fn write_json(out_dir: &Path, pages: &[SourcePage], summary: &RunSummary) -> Result<PathBuf> {
    let path = out_dir.join(JSON_REPORT);
    let document = ReportDocument { summary, pages };
    let json = serde_json::to_string_pretty(&document).map_err(|e| {
        ReportError::output(&path, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })?;
    write_file(&path, &json)?;
    Ok(path)
}

//! Source correlator: maps errors and their stack frames back to source text.
//!
//! Every frame names its own file, so windows are read per file and never
//! borrowed from the page being rendered. A file that cannot be read turns
//! into an empty window and a warning; it never fails the page or drops the
//! error from the counts.

use crate::error::ReportError;
use crate::index::{ErrorSet, IndexedError};
use crate::locator::{resolve_display_path, TrackedRoot};
use crate::model::{
    ContextWindow, ErrorDetail, Frame, LineClass, RunSummary, SourceLine, SourcePage, StackEntry,
    SummaryEntry,
};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the index page inside the report directory
pub const INDEX_PAGE: &str = "index.html";

/// Lines shown around a location when nothing else is configured.
pub const DEFAULT_CONTEXT_LINES: usize = 3;

/// Size of the context windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    pub before: usize,
    pub after: usize,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            before: DEFAULT_CONTEXT_LINES,
            after: DEFAULT_CONTEXT_LINES,
        }
    }
}

/// Read a source file as lines. Invalid UTF-8 is replaced, not rejected.
pub fn read_source(path: &Path) -> Result<Vec<String>, ReportError> {
    let bytes = std::fs::read(path).map_err(|source| ReportError::ContextRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes)
        .lines()
        .map(str::to_string)
        .collect())
}

/// Window of `lines` around 1-based `line`, clipped to the file.
pub fn context_window(lines: &[String], line: usize, size: WindowSize) -> ContextWindow {
    if line == 0 || lines.is_empty() {
        return ContextWindow::empty();
    }
    let first = line.saturating_sub(size.before).max(1);
    let last = line.saturating_add(size.after).min(lines.len());
    if first > last {
        return ContextWindow::empty();
    }

    ContextWindow {
        first_line: first,
        lines: lines[first - 1..last].to_vec(),
        error_offset: (line <= last).then(|| line - first),
    }
}

/// File name of the page rendered for `relative_path`.
pub fn page_name(relative_path: &str) -> String {
    let flat: String = relative_path
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    format!("{}.html", flat)
}

/// Claim `name`, or `<stem>-2.html`, `<stem>-3.html`, ... when it is taken.
fn claim_page_name(name: String, taken: &mut HashSet<String>) -> String {
    if taken.insert(name.clone()) {
        return name;
    }
    let stem = name.strip_suffix(".html").unwrap_or(&name);
    let mut n = 2;
    loop {
        let candidate = format!("{}-{}.html", stem, n);
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Per-page memo of file contents, `None` for files that could not be read.
#[derive(Default)]
struct SourceCache {
    files: HashMap<PathBuf, Option<Vec<String>>>,
}

impl SourceCache {
    fn lines(&mut self, path: &Path) -> Option<&[String]> {
        self.files
            .entry(path.to_path_buf())
            .or_insert_with(|| match read_source(path) {
                Ok(lines) => Some(lines),
                Err(e) => {
                    warn!("{}; showing empty context", e);
                    None
                }
            })
            .as_deref()
    }
}

/// Builds render-ready pages from an `ErrorSet`.
pub struct Correlator<'a> {
    set: &'a ErrorSet,
    size: WindowSize,
}

impl<'a> Correlator<'a> {
    pub fn new(set: &'a ErrorSet, size: WindowSize) -> Self {
        Self { set, size }
    }

    fn root(&self) -> &TrackedRoot {
        self.set.root()
    }

    fn frame_window(&self, frame: &Frame, cache: &mut SourceCache) -> ContextWindow {
        let (Some(path), Some(line)) = (frame.absolute_path.as_deref(), frame.line) else {
            return ContextWindow::empty();
        };
        if !self.root().contains(path) {
            return ContextWindow::empty();
        }
        match cache.lines(path) {
            Some(lines) => context_window(lines, line, self.size),
            None => ContextWindow::empty(),
        }
    }

    /// Context for one frame, reading its file on demand.
    pub fn window_for(&self, frame: &Frame) -> ContextWindow {
        self.frame_window(frame, &mut SourceCache::default())
    }

    fn detail_with(
        &self,
        entry: &IndexedError,
        errors_on_line: usize,
        cache: &mut SourceCache,
    ) -> ErrorDetail {
        let anchor = entry
            .anchor_frame()
            .map(|frame| self.frame_window(frame, cache))
            .unwrap_or_default();

        let stack = entry
            .outer_frames()
            .iter()
            .map(|frame| StackEntry {
                function: frame.function.clone(),
                label: resolve_display_path(frame, Some(self.root())),
                context: self.frame_window(frame, cache),
            })
            .collect();

        ErrorDetail {
            message: entry.record.what.clone(),
            kind: entry.record.kind.clone(),
            errors_on_line,
            anchor,
            stack,
        }
    }

    /// Detail for a single error: anchor window plus one entry per outer frame.
    pub fn detail(&self, entry: &IndexedError) -> ErrorDetail {
        self.detail_with(entry, 1, &mut SourceCache::default())
    }

    /// Correlate one anchored source file.
    pub fn page(&self, path: &Path) -> SourcePage {
        let mut cache = SourceCache::default();
        let view = self.set.filter_source_file(path);
        let error_lines = view.list_lines();
        let relative_path = self.root().display_name(path);

        let text = cache.lines(path).map(<[String]>::to_vec).unwrap_or_default();
        debug!(
            "correlating {} ({} lines, {} error lines)",
            relative_path,
            text.len(),
            error_lines.len()
        );

        let lines = text
            .into_iter()
            .enumerate()
            .map(|(idx, text)| {
                let number = idx + 1;
                if !error_lines.contains(&number) {
                    return SourceLine {
                        number,
                        text,
                        class: LineClass::Normal,
                        detail: None,
                    };
                }
                // Only the first error on a line is detailed
                let on_line = view.filter_line(number);
                let detail = on_line
                    .first()
                    .map(|entry| self.detail_with(entry, on_line.count(), &mut cache));
                SourceLine {
                    number,
                    text,
                    class: LineClass::Error,
                    detail,
                }
            })
            .collect();

        SourcePage {
            link: page_name(&relative_path),
            relative_path,
            error_count: view.count(),
            lines,
        }
    }

    /// One page per anchored source file, ordered by path.
    ///
    /// Flattened names can clash (`src/a_b.c` and `src_a/b.c`), so later
    /// pages get a numeric suffix. `index.html` is never handed out.
    pub fn pages(&self) -> Vec<SourcePage> {
        let mut taken = HashSet::from([INDEX_PAGE.to_string()]);
        self.set
            .list_source_files()
            .into_iter()
            .map(|path| {
                let mut page = self.page(path);
                let link = std::mem::take(&mut page.link);
                page.link = claim_page_name(link, &mut taken);
                if page.link != page_name(&page.relative_path) {
                    debug!(
                        "{} renamed to {} to avoid a clash",
                        page.relative_path, page.link
                    );
                }
                page
            })
            .collect()
    }

    /// Index page contents for already built pages.
    pub fn summary(&self, pages: &[SourcePage]) -> RunSummary {
        let mut sources: Vec<SummaryEntry> = pages
            .iter()
            .map(|page| SummaryEntry {
                relative_path: page.relative_path.clone(),
                error_count: page.error_count,
                link: page.link.clone(),
            })
            .collect();
        sources.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        RunSummary {
            sources,
            total_errors: self.set.count(),
            unanchored_errors: self.set.unanchored(),
        }
    }
}

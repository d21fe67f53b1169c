//! Error index: the parsed error set and its file → line → kind views.
//!
//! `ErrorSet` owns every record and computes anchors once at construction.
//! A `View` is a plain list of references into the set, so the borrow checker
//! ties its lifetime to the set and no filter can alter the base data.
//! Enumerations come back as `BTreeSet`s, which fixes the order consumers see:
//! lexical paths, numeric lines, lexical kinds.

use crate::error::Result;
use crate::locator::{find_first_source_reference, normalize, TrackedRoot};
use crate::model::{ErrorRecord, Frame};
use crate::parser::{parse_file, ParseOptions};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

/// An error together with the position of its anchor frame.
#[derive(Debug, Clone)]
pub struct IndexedError {
    pub record: ErrorRecord,
    pub anchor: Option<usize>,
}

impl IndexedError {
    pub fn anchor_frame(&self) -> Option<&Frame> {
        self.anchor.map(|idx| &self.record.stack[idx])
    }

    pub fn anchor_path(&self) -> Option<&Path> {
        self.anchor_frame()
            .and_then(|frame| frame.absolute_path.as_deref())
    }

    pub fn anchor_line(&self) -> Option<usize> {
        self.anchor_frame().and_then(|frame| frame.line)
    }

    /// Frames after the anchor (the call chain leading into it).
    pub fn outer_frames(&self) -> &[Frame] {
        match self.anchor {
            Some(idx) => &self.record.stack[idx + 1..],
            None => &[],
        }
    }
}

/// The immutable set of errors of one run, bound to a tracked root.
#[derive(Debug, Clone)]
pub struct ErrorSet {
    root: TrackedRoot,
    entries: Vec<IndexedError>,
}

impl ErrorSet {
    pub fn new(records: Vec<ErrorRecord>, root: TrackedRoot) -> Self {
        let entries: Vec<IndexedError> = records
            .into_iter()
            .map(|mut record| {
                for frame in &mut record.stack {
                    if let Some(path) = frame.absolute_path.take() {
                        frame.absolute_path = Some(normalize(&path));
                    }
                }
                let anchor = find_first_source_reference(&record.stack, &root);
                if anchor.is_none() {
                    debug!("no frame of {:?} lies under {}", record.what, root.path().display());
                }
                IndexedError { record, anchor }
            })
            .collect();

        let set = Self { root, entries };
        info!(
            "indexed {} errors ({} without a source anchor)",
            set.count(),
            set.unanchored()
        );
        set
    }

    /// Parse `path` and index the result against `root`.
    pub fn load(path: &Path, root: TrackedRoot, options: &ParseOptions) -> Result<Self> {
        let records = parse_file(path, options)?;
        Ok(Self::new(records, root))
    }

    pub fn root(&self) -> &TrackedRoot {
        &self.root
    }

    /// Every error, anchored or not.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Errors with no frame under the tracked root.
    pub fn unanchored(&self) -> usize {
        self.entries.iter().filter(|e| e.anchor.is_none()).count()
    }

    pub fn records(&self) -> impl Iterator<Item = &ErrorRecord> {
        self.entries.iter().map(|e| &e.record)
    }

    /// View over the whole set, including unanchored errors.
    pub fn all(&self) -> View<'_> {
        View {
            items: self.entries.iter().collect(),
        }
    }

    pub fn list_source_files(&self) -> BTreeSet<&Path> {
        self.all().list_source_files()
    }

    pub fn filter_source_file(&self, path: &Path) -> View<'_> {
        self.all().filter_source_file(path)
    }
}

/// A read-only filtered subset of an `ErrorSet`, in parse order.
#[derive(Debug, Clone)]
pub struct View<'a> {
    items: Vec<&'a IndexedError>,
}

/// Two views are equal when they reference the same errors in the same order.
impl PartialEq for View<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.items.len() == other.items.len()
            && self
                .items
                .iter()
                .zip(&other.items)
                .all(|(a, b)| std::ptr::eq(*a, *b))
    }
}

impl<'a> View<'a> {
    fn retain(&self, keep: impl Fn(&IndexedError) -> bool) -> View<'a> {
        View {
            items: self.items.iter().copied().filter(|entry| keep(*entry)).collect(),
        }
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a IndexedError> + '_ {
        self.items.iter().copied()
    }

    pub fn first(&self) -> Option<&'a IndexedError> {
        self.items.first().copied()
    }

    pub fn list_source_files(&self) -> BTreeSet<&'a Path> {
        self.iter().filter_map(IndexedError::anchor_path).collect()
    }

    pub fn filter_source_file(&self, path: &Path) -> View<'a> {
        let path = normalize(path);
        self.retain(|e| e.anchor_path() == Some(path.as_path()))
    }

    pub fn list_lines(&self) -> BTreeSet<usize> {
        self.iter().filter_map(IndexedError::anchor_line).collect()
    }

    pub fn filter_line(&self, line: usize) -> View<'a> {
        self.retain(|e| e.anchor_line() == Some(line))
    }

    pub fn list_error_kinds(&self) -> BTreeSet<&'a str> {
        self.iter().map(|e| e.record.kind.as_str()).collect()
    }

    pub fn filter_error_kind(&self, kind: &str) -> View<'a> {
        self.retain(|e| e.record.kind == kind)
    }
}

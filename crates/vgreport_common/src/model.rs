//! Core records and the render contract.
//!
//! `Frame` and `ErrorRecord` are produced by the parser and never mutated
//! afterwards. The `Source*`/`Summary*` types are what the correlator hands
//! to a renderer; they are plain data with no behavior beyond accessors.

use serde::Serialize;
use std::path::PathBuf;

/// One entry of an unwound call stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    /// Function name, or the instruction pointer when symbols are missing
    pub function: String,
    /// `dir/file` as emitted by the tool (after path substitution)
    pub absolute_path: Option<PathBuf>,
    /// 1-based line, only meaningful alongside `absolute_path`
    pub line: Option<usize>,
    /// Shared object the frame belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction_pointer: Option<String>,
}

impl Frame {
    /// A frame with a function name only (library code, no debug info).
    pub fn symbol_only(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            absolute_path: None,
            line: None,
            object: None,
            instruction_pointer: None,
        }
    }

    /// A frame with a known source location.
    pub fn at(function: impl Into<String>, path: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            function: function.into(),
            absolute_path: Some(path.into()),
            line: Some(line),
            object: None,
            instruction_pointer: None,
        }
    }

    /// Source line, if the frame has both a path and a line.
    pub fn source_line(&self) -> Option<usize> {
        self.absolute_path.as_ref().and(self.line)
    }
}

/// A single error reported by the tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    /// `<unique>` identity, when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique: Option<String>,
    /// Classification used by the kind filter (e.g. `InvalidRead`)
    pub kind: String,
    /// Human-readable message
    pub what: String,
    /// Innermost frame first, never empty
    pub stack: Vec<Frame>,
}

impl ErrorRecord {
    pub fn new(kind: impl Into<String>, what: impl Into<String>, stack: Vec<Frame>) -> Self {
        Self {
            unique: None,
            kind: kind.into(),
            what: what.into(),
            stack,
        }
    }
}

/// Classification of one rendered source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineClass {
    Normal,
    Error,
}

impl std::fmt::Display for LineClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A bounded span of source lines around a location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContextWindow {
    /// 1-based number of `lines[0]`; 0 when the window is empty
    pub first_line: usize,
    pub lines: Vec<String>,
    /// Index into `lines` of the faulting line
    pub error_offset: Option<usize>,
}

impl ContextWindow {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// 1-based number of the last line, if any.
    pub fn last_line(&self) -> Option<usize> {
        if self.lines.is_empty() {
            None
        } else {
            Some(self.first_line + self.lines.len() - 1)
        }
    }
}

/// One frame of the call chain below an error's anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackEntry {
    pub function: String,
    /// `relpath:line` for in-tree frames, `<function>` otherwise
    pub label: String,
    pub context: ContextWindow,
}

/// Detail attached to an error line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDetail {
    pub message: String,
    pub kind: String,
    /// Errors anchored on this line; only the first one is detailed
    pub errors_on_line: usize,
    pub anchor: ContextWindow,
    pub stack: Vec<StackEntry>,
}

/// One line of a correlated source page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLine {
    pub number: usize,
    pub text: String,
    pub class: LineClass,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<ErrorDetail>,
}

/// Everything a renderer needs for one source file page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourcePage {
    /// Path relative to the tracked root
    pub relative_path: String,
    pub link: String,
    pub error_count: usize,
    pub lines: Vec<SourceLine>,
}

impl SourcePage {
    pub fn error_lines(&self) -> impl Iterator<Item = &SourceLine> {
        self.lines.iter().filter(|l| l.class == LineClass::Error)
    }
}

/// Index page row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryEntry {
    pub relative_path: String,
    pub error_count: usize,
    pub link: String,
}

/// Index page contents for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Sorted by `relative_path`
    pub sources: Vec<SummaryEntry>,
    /// Every parsed error, anchored or not
    pub total_errors: usize,
    /// Errors with no frame under the tracked root
    pub unanchored_errors: usize,
}

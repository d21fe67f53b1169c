//! Stack locator: anchors errors to the tracked source tree and labels frames.
//!
//! Containment is decided lexically. The tracked root is made absolute and
//! stripped of `.`/`..` once; frame paths get the same treatment before the
//! whole-component prefix test. Symlinks are never resolved, so a frame is
//! "in tree" exactly when its recorded path says so.

use crate::model::Frame;
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};

/// Base source directory that frames are resolved against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedRoot {
    path: PathBuf,
}

impl TrackedRoot {
    /// Build a root from a possibly relative directory.
    pub fn new(dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let absolute = std::path::absolute(dir.as_ref())?;
        Ok(Self {
            path: normalize(&absolute),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `path` lies inside the tracked tree.
    pub fn contains(&self, path: &Path) -> bool {
        path.is_absolute() && normalize(path).starts_with(&self.path)
    }

    /// `path` relative to the root, or `None` when outside it.
    pub fn relative(&self, path: &Path) -> Option<PathBuf> {
        if !path.is_absolute() {
            return None;
        }
        normalize(path)
            .strip_prefix(&self.path)
            .ok()
            .map(Path::to_path_buf)
    }

    /// Relative path as text when inside the root, the full path otherwise.
    pub fn display_name(&self, path: &Path) -> String {
        self.relative(path)
            .map(|rel| rel.display().to_string())
            .unwrap_or_else(|| path.display().to_string())
    }
}

/// Remove `.` and `..` components without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// A `FROM:TO` prefix rewrite applied to frame paths at load time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PathSubstitution {
    pub from: PathBuf,
    pub to: PathBuf,
}

impl PathSubstitution {
    /// Parse the command-line form `FROM:TO`.
    pub fn parse(text: &str) -> Option<Self> {
        let (from, to) = text.split_once(':')?;
        if from.is_empty() {
            return None;
        }
        Some(Self {
            from: PathBuf::from(from),
            to: PathBuf::from(to),
        })
    }

    /// Rewritten path, or `None` when `path` does not start with `from`.
    pub fn apply(&self, path: &Path) -> Option<PathBuf> {
        path.strip_prefix(&self.from)
            .ok()
            .map(|rest| self.to.join(rest))
    }
}

/// Apply the first matching substitution, if any.
pub fn substitute(path: PathBuf, substitutions: &[PathSubstitution]) -> PathBuf {
    substitutions
        .iter()
        .find_map(|s| s.apply(&path))
        .unwrap_or(path)
}

/// Position of the first frame inside the tracked root.
///
/// `None` means the error has no anchor: it stays out of file and line views
/// but is still part of the global count.
pub fn find_first_source_reference(stack: &[Frame], root: &TrackedRoot) -> Option<usize> {
    stack.iter().position(|frame| {
        frame
            .absolute_path
            .as_deref()
            .is_some_and(|path| root.contains(path))
    })
}

/// Display label for a frame.
///
/// Without a base: the raw path, or the function name when the frame has no
/// file. With a base: `relpath:line` for frames in the tree and `<function>`
/// for everything else, so library frames never look like project sources.
pub fn resolve_display_path(frame: &Frame, base: Option<&TrackedRoot>) -> String {
    let Some(base) = base else {
        return match &frame.absolute_path {
            Some(path) => path.display().to_string(),
            None => frame.function.clone(),
        };
    };

    let relative = frame
        .absolute_path
        .as_deref()
        .and_then(|path| base.relative(path));

    match (relative, frame.line) {
        (Some(rel), Some(line)) => format!("{}:{}", rel.display(), line),
        (Some(rel), None) => rel.display().to_string(),
        (None, _) => format!("<{}>", frame.function),
    }
}

//! Error types for vgreport.
//!
//! Input, Parse, Output and Config are fatal for a run. ContextRead is only
//! ever raised inside the correlator, which logs it and degrades the affected
//! window to empty.

use std::path::PathBuf;
use thiserror::Error;

/// Exit code for success
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code when `--abort-on-errors` is set and errors were reported
pub const EXIT_ERRORS_FOUND: i32 = 1;

/// Exit code when the diagnostic XML is malformed or off-schema
pub const EXIT_PARSE_ERROR: i32 = 65;

/// Exit code when the diagnostic XML cannot be read
pub const EXIT_INPUT_ERROR: i32 = 66;

/// Exit code when the report directory cannot be written
pub const EXIT_OUTPUT_ERROR: i32 = 73;

/// Exit code when the configuration file is unusable
pub const EXIT_CONFIG_ERROR: i32 = 78;

/// Exit code for an error that should have been handled inside the library
pub const EXIT_INTERNAL_ERROR: i32 = 70;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("cannot read input {}: {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed diagnostic XML in {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("cannot write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    #[error("cannot read source {}: {source}", path.display())]
    ContextRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReportError {
    pub fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Output {
            path: path.into(),
            source,
        }
    }

    /// Whether this error ends the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ReportError::ContextRead { .. })
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ReportError::Input { .. } => EXIT_INPUT_ERROR,
            ReportError::Parse { .. } => EXIT_PARSE_ERROR,
            ReportError::Output { .. } => EXIT_OUTPUT_ERROR,
            ReportError::Config { .. } => EXIT_CONFIG_ERROR,
            // The correlator recovers these; reaching main is a bug
            ReportError::ContextRead { .. } => EXIT_INTERNAL_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_exit_codes_are_distinct() {
        let errors = [
            ReportError::Input {
                path: "a.xml".into(),
                source: io::Error::new(io::ErrorKind::NotFound, "gone"),
            },
            ReportError::parse("a.xml", "bad"),
            ReportError::output("html", io::Error::new(io::ErrorKind::PermissionDenied, "ro")),
            ReportError::Config {
                path: "vgreport.toml".into(),
                reason: "bad".into(),
            },
        ];
        let mut codes: Vec<i32> = errors.iter().map(|e| e.exit_code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 4);
        assert!(errors.iter().all(|e| e.is_fatal()));
    }

    #[test]
    fn test_context_read_is_recoverable() {
        let err = ReportError::ContextRead {
            path: "/src/missing.c".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("/src/missing.c"));
        assert_ne!(err.exit_code(), EXIT_SUCCESS);
        assert_eq!(err.exit_code(), EXIT_INTERNAL_ERROR);
    }

    #[test]
    fn test_parse_message_names_file() {
        let err = ReportError::parse("vg.xml", "missing <stack>");
        assert_eq!(
            err.to_string(),
            "malformed diagnostic XML in vg.xml: missing <stack>"
        );
    }
}

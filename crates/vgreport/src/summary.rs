//! Plain-text summaries of an error set.
//!
//! Files are listed in path order, lines in numeric order and kinds in
//! lexical order, so the same input always prints the same text.

use std::fmt::Write;
use vgreport_common::ErrorSet;

/// `error` or `errors` for a count.
pub(crate) fn plural(n: usize) -> &'static str {
    if n == 1 {
        "error"
    } else {
        "errors"
    }
}

/// Closing line shared by both summaries.
pub fn total_line(set: &ErrorSet) -> String {
    let total = set.count();
    let unanchored = set.unanchored();
    if unanchored == 0 {
        format!("{} {} in total", total, plural(total))
    } else {
        format!(
            "{} {} in total ({} outside the source tree)",
            total,
            plural(total),
            unanchored
        )
    }
}

/// `--summary` output: per file, its error count and one line per error.
///
/// ```text
/// src/buffer.c
/// 2 errors
///     line 42: Invalid read of size 4
///     line 42: Invalid write of size 4
/// 2 errors in total
/// ```
pub fn error_listing(set: &ErrorSet) -> String {
    let mut out = String::new();
    for path in set.list_source_files() {
        let file_view = set.filter_source_file(path);
        let _ = writeln!(out, "{}", set.root().display_name(path));
        let _ = writeln!(out, "{} {}", file_view.count(), plural(file_view.count()));
        for line in file_view.list_lines() {
            for entry in file_view.filter_line(line).iter() {
                let _ = writeln!(out, "\tline {}: {}", line, entry.record.what);
            }
        }
    }
    let _ = writeln!(out, "{}", total_line(set));
    out
}

/// Counts broken down by file, line and kind.
///
/// ```text
/// src/buffer.c:
/// 3 errors
///     line 42: InvalidRead   (2 errors)
///              InvalidWrite  (1 error)
/// ```
pub fn kind_breakdown(set: &ErrorSet) -> String {
    let mut out = String::new();
    for path in set.list_source_files() {
        let file_view = set.filter_source_file(path);
        let _ = writeln!(out, "{}:", set.root().display_name(path));
        let _ = writeln!(out, "{} {}", file_view.count(), plural(file_view.count()));
        for line in file_view.list_lines() {
            let line_view = file_view.filter_line(line);
            let label = format!("\tline {}:", line);
            let mut prefix = label.clone();
            for kind in line_view.list_error_kinds() {
                let n = line_view.filter_error_kind(kind).count();
                let _ = writeln!(out, "{} {}\t({} {})", prefix, kind, n, plural(n));
                prefix = format!("\t{}", " ".repeat(label.len() - 1));
            }
        }
    }
    let _ = writeln!(out, "{}", total_line(set));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use vgreport_common::{ErrorRecord, Frame, TrackedRoot};

    fn set() -> ErrorSet {
        let at = |kind: &str, what: &str, path: &str, line: usize| {
            ErrorRecord::new(kind, what, vec![Frame::at("f", path, line)])
        };
        ErrorSet::new(
            vec![
                at("InvalidWrite", "Invalid write of size 4", "/p/src/b.c", 3),
                at("InvalidRead", "Invalid read of size 4", "/p/src/b.c", 3),
                at("InvalidRead", "Invalid read of size 8", "/p/src/b.c", 3),
                at("InvalidFree", "Invalid free()", "/p/a.c", 12),
                ErrorRecord::new("Leak_DefinitelyLost", "8 bytes lost", vec![Frame::symbol_only("malloc")]),
            ],
            TrackedRoot::new("/p").unwrap(),
        )
    }

    #[test]
    fn test_error_listing() {
        let text = error_listing(&set());
        let expected = "a.c\n\
                        1 error\n\
                        \tline 12: Invalid free()\n\
                        src/b.c\n\
                        3 errors\n\
                        \tline 3: Invalid write of size 4\n\
                        \tline 3: Invalid read of size 4\n\
                        \tline 3: Invalid read of size 8\n\
                        5 errors in total (1 outside the source tree)\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_kind_breakdown() {
        let text = kind_breakdown(&set());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "a.c:");
        assert_eq!(lines[2], "\tline 12: InvalidFree\t(1 error)");
        assert_eq!(lines[3], "src/b.c:");
        assert_eq!(lines[4], "3 errors");
        assert_eq!(lines[5], "\tline 3: InvalidRead\t(2 errors)");
        assert_eq!(lines[6], "\t        InvalidWrite\t(1 error)");
    }

    #[test]
    fn test_empty_set() {
        let empty = ErrorSet::new(vec![], TrackedRoot::new("/p").unwrap());
        assert_eq!(error_listing(&empty), "0 errors in total\n");
    }
}

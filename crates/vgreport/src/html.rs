//! HTML rendering of correlated pages.
//!
//! Pages are self-contained: the stylesheet is inlined and there is no
//! script. Everything taken from source files or the XML is escaped.

use crate::summary::plural;
use std::fmt::Write;
use vgreport_common::model::{ContextWindow, ErrorDetail, LineClass, RunSummary, SourcePage};
use vgreport_common::INDEX_PAGE;

const STYLE: &str = "\
body { font-family: sans-serif; margin: 1.5em; }
table { border-collapse: collapse; }
td, th { padding: 0 0.6em; text-align: left; }
pre { margin: 0; }
.lineno { color: #888; text-align: right; user-select: none; }
tr.error { background: #fdd; }
.issue { background: #fff4f4; border-left: 3px solid #c33; padding: 0.4em 0.8em; }
.issue .what { font-weight: bold; }
.issue .more { color: #a55; }
.frame { margin-top: 0.5em; }
.frame .label { font-family: monospace; }
.fault { background: #fcc; }
";

/// Escape text for element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn head(out: &mut String, title: &str) {
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>\n{}</style>\n</head>\n<body>\n",
        escape(title),
        STYLE
    );
}

fn window(out: &mut String, context: &ContextWindow) {
    if context.is_empty() {
        return;
    }
    out.push_str("<pre>");
    for (idx, text) in context.lines.iter().enumerate() {
        let number = context.first_line + idx;
        if context.error_offset == Some(idx) {
            let _ = writeln!(out, "<span class=\"fault\">{:>5} {}</span>", number, escape(text));
        } else {
            let _ = writeln!(out, "{:>5} {}", number, escape(text));
        }
    }
    out.push_str("</pre>\n");
}

fn detail(out: &mut String, detail: &ErrorDetail) {
    out.push_str("<tr class=\"detail\"><td></td><td><div class=\"issue\">\n");
    let _ = writeln!(
        out,
        "<div class=\"what\">{}</div>",
        escape(&detail.message)
    );
    if detail.errors_on_line > 1 {
        let _ = writeln!(
            out,
            "<div class=\"more\">{} more {} on this line</div>",
            detail.errors_on_line - 1,
            plural(detail.errors_on_line - 1)
        );
    }
    for entry in &detail.stack {
        out.push_str("<div class=\"frame\">");
        let _ = writeln!(
            out,
            "<div class=\"label\">called from {}</div>",
            escape(&entry.label)
        );
        window(out, &entry.context);
        out.push_str("</div>\n");
    }
    out.push_str("</div></td></tr>\n");
}

/// Full page for one source file.
pub fn render_page(page: &SourcePage) -> String {
    let mut out = String::new();
    head(&mut out, &page.relative_path);
    let _ = writeln!(
        out,
        "<h1>{}</h1>\n<p>{} {}</p>\n<p><a href=\"{}\">back to index</a></p>",
        escape(&page.relative_path),
        page.error_count,
        plural(page.error_count),
        INDEX_PAGE
    );
    out.push_str("<table>\n");
    for line in &page.lines {
        let _ = writeln!(
            out,
            "<tr class=\"{}\" id=\"L{}\"><td class=\"lineno\">{}</td><td><pre>{}</pre></td></tr>",
            line.class,
            line.number,
            line.number,
            escape(&line.text)
        );
        if line.class == LineClass::Error {
            if let Some(d) = &line.detail {
                detail(&mut out, d);
            }
        }
    }
    out.push_str("</table>\n</body>\n</html>\n");
    out
}

/// Index page listing every correlated file.
pub fn render_index(summary: &RunSummary) -> String {
    let mut out = String::new();
    head(&mut out, "Valgrind report");
    let _ = writeln!(out, "<h1>Valgrind report</h1>");
    let _ = writeln!(
        out,
        "<p>{} {}</p>",
        summary.total_errors,
        plural(summary.total_errors)
    );
    if summary.unanchored_errors > 0 {
        let _ = writeln!(
            out,
            "<p>{} {} without a frame in the source tree</p>",
            summary.unanchored_errors,
            plural(summary.unanchored_errors)
        );
    }
    out.push_str("<table>\n<tr><th>File</th><th>Errors</th></tr>\n");
    for entry in &summary.sources {
        let _ = writeln!(
            out,
            "<tr><td><a href=\"{}\">{}</a></td><td>{}</td></tr>",
            escape(&entry.link),
            escape(&entry.relative_path),
            entry.error_count
        );
    }
    out.push_str("</table>\n</body>\n</html>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use vgreport_common::model::{SourceLine, StackEntry, SummaryEntry};

    #[test]
    fn test_escape() {
        assert_eq!(escape("a < b && c > \"d\""), "a &lt; b &amp;&amp; c &gt; &quot;d&quot;");
    }

    #[test]
    fn test_page_marks_error_lines() {
        let page = SourcePage {
            relative_path: "src/a.c".into(),
            link: "src_a.c.html".into(),
            error_count: 2,
            lines: vec![
                SourceLine {
                    number: 1,
                    text: "int *p = 0;".into(),
                    class: LineClass::Normal,
                    detail: None,
                },
                SourceLine {
                    number: 2,
                    text: "if (*p < 1) {}".into(),
                    class: LineClass::Error,
                    detail: Some(ErrorDetail {
                        message: "Invalid read of size 4".into(),
                        kind: "InvalidRead".into(),
                        errors_on_line: 2,
                        anchor: ContextWindow::empty(),
                        stack: vec![StackEntry {
                            function: "main".into(),
                            label: "src/main.c:9".into(),
                            context: ContextWindow {
                                first_line: 8,
                                lines: vec!["{".into(), "  run();".into()],
                                error_offset: Some(1),
                            },
                        }],
                    }),
                },
            ],
        };
        let html = render_page(&page);
        assert!(html.contains("<tr class=\"error\" id=\"L2\">"));
        assert!(html.contains("if (*p &lt; 1) {}"));
        assert!(html.contains("Invalid read of size 4"));
        assert!(html.contains("1 more error on this line"));
        assert!(html.contains("<p>2 errors</p>"));
        assert!(html.contains("called from src/main.c:9"));
        assert!(html.contains("<span class=\"fault\">    9   run();</span>"));
    }

    #[test]
    fn test_counts_use_singular() {
        let summary = RunSummary {
            sources: vec![],
            total_errors: 1,
            unanchored_errors: 3,
        };
        let html = render_index(&summary);
        assert!(html.contains("<p>1 error</p>"));
        assert!(html.contains("<p>3 errors without a frame in the source tree</p>"));
    }

    #[test]
    fn test_index_lists_sources() {
        let summary = RunSummary {
            sources: vec![SummaryEntry {
                relative_path: "a.c".into(),
                error_count: 3,
                link: "a.c.html".into(),
            }],
            total_errors: 4,
            unanchored_errors: 1,
        };
        let html = render_index(&summary);
        assert!(html.contains("<a href=\"a.c.html\">a.c</a></td><td>3</td>"));
        assert!(html.contains("<p>4 errors</p>"));
        assert!(html.contains("1 error without a frame in the source tree"));
    }
}

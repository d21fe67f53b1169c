//! Parser for Valgrind `--xml=yes` output.
//!
//! The document is first deserialized into loose `Raw*` mirrors of the XML
//! and then validated into `ErrorRecord`s. Unknown elements are ignored.
//!
//! ```text
//! <valgrindoutput>
//!   <protocolversion>4</protocolversion>
//!   <error>
//!     <unique>0x0</unique>
//!     <kind>InvalidRead</kind>
//!     <what>Invalid read of size 4</what>
//!     <stack>
//!       <frame><ip>0x4005C4</ip><fn>main</fn><dir>/src</dir><file>a.c</file><line>5</line></frame>
//!     </stack>
//!   </error>
//! </valgrindoutput>
//! ```

use crate::error::{ReportError, Result};
use crate::locator::{normalize, substitute, PathSubstitution};
use crate::model::{ErrorRecord, Frame};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Options applied while turning raw frames into records.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    pub substitutions: Vec<PathSubstitution>,
}

#[derive(Debug, Deserialize)]
struct RawOutput {
    /// Required so that foreign XML documents are rejected
    protocolversion: String,
    #[serde(default, rename = "error")]
    errors: Vec<RawError>,
}

#[derive(Debug, Deserialize)]
struct RawError {
    unique: Option<String>,
    kind: Option<String>,
    what: Option<String>,
    xwhat: Option<RawXWhat>,
    #[serde(default, rename = "stack")]
    stacks: Vec<RawStack>,
}

#[derive(Debug, Deserialize)]
struct RawXWhat {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawStack {
    #[serde(default, rename = "frame")]
    frames: Vec<RawFrame>,
}

#[derive(Debug, Deserialize)]
struct RawFrame {
    ip: Option<String>,
    obj: Option<String>,
    #[serde(rename = "fn")]
    function: Option<String>,
    dir: Option<String>,
    file: Option<String>,
    line: Option<String>,
}

/// Read and parse a diagnostic XML file.
pub fn parse_file(path: &Path, options: &ParseOptions) -> Result<Vec<ErrorRecord>> {
    let xml = std::fs::read_to_string(path).map_err(|source| ReportError::Input {
        path: path.to_path_buf(),
        source,
    })?;
    parse_str(&xml, path, options)
}

/// Parse diagnostic XML already in memory. `origin` is only used in errors.
pub fn parse_str(xml: &str, origin: &Path, options: &ParseOptions) -> Result<Vec<ErrorRecord>> {
    let raw: RawOutput =
        quick_xml::de::from_str(xml).map_err(|e| ReportError::parse(origin, e.to_string()))?;

    debug!(
        "protocol version {} with {} errors in {}",
        raw.protocolversion,
        raw.errors.len(),
        origin.display()
    );

    raw.errors
        .into_iter()
        .enumerate()
        .map(|(idx, err)| {
            convert_error(err, idx + 1, options).map_err(|reason| ReportError::parse(origin, reason))
        })
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn convert_error(
    raw: RawError,
    position: usize,
    options: &ParseOptions,
) -> std::result::Result<ErrorRecord, String> {
    let what = non_empty(raw.what)
        .or_else(|| raw.xwhat.and_then(|x| non_empty(x.text)))
        .ok_or_else(|| format!("error #{} has no <what> or <xwhat> message", position))?;

    // Only the first stack belongs to the error; later ones are aux origins
    let stack = raw
        .stacks
        .into_iter()
        .next()
        .ok_or_else(|| format!("error #{} has no <stack>", position))?;
    if stack.frames.is_empty() {
        return Err(format!("error #{} has an empty <stack>", position));
    }

    let frames = stack
        .frames
        .into_iter()
        .enumerate()
        .map(|(idx, frame)| {
            convert_frame(frame, options)
                .map_err(|reason| format!("error #{}, frame {}: {}", position, idx, reason))
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let kind = non_empty(raw.kind).unwrap_or_else(|| what.clone());

    Ok(ErrorRecord {
        unique: non_empty(raw.unique),
        kind,
        what,
        stack: frames,
    })
}

fn convert_frame(raw: RawFrame, options: &ParseOptions) -> std::result::Result<Frame, String> {
    let ip = non_empty(raw.ip);
    let function = non_empty(raw.function)
        .or_else(|| ip.clone())
        .unwrap_or_else(|| "???".to_string());

    let path = match (non_empty(raw.dir), non_empty(raw.file)) {
        (Some(dir), Some(file)) => Some(PathBuf::from(dir).join(file)),
        (None, Some(file)) => Some(PathBuf::from(file)),
        _ => None,
    }
    // Normalized once so every view keys a file by a single spelling
    .map(|p| normalize(&substitute(p, &options.substitutions)));

    let line = match non_empty(raw.line) {
        Some(text) => match text.parse::<usize>() {
            Ok(n) if n > 0 => Some(n),
            _ => return Err(format!("invalid line number {:?}", text)),
        },
        None => None,
    };

    Ok(Frame {
        function,
        absolute_path: path,
        line,
        object: non_empty(raw.obj),
        instruction_pointer: ip,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0"?>
<valgrindoutput>
<protocolversion>4</protocolversion>
<protocoltool>memcheck</protocoltool>
<status><state>RUNNING</state></status>
<error>
  <unique>0x0</unique>
  <tid>1</tid>
  <kind>InvalidRead</kind>
  <what>Invalid read of size 4</what>
  <stack>
    <frame>
      <ip>0x4C2E0E0</ip>
      <obj>/usr/lib/valgrind/vgpreload_memcheck.so</obj>
      <fn>memcpy</fn>
    </frame>
    <frame>
      <ip>0x10916B</ip>
      <obj>/home/dev/project/a.out</obj>
      <fn>copy_buffer</fn>
      <dir>/home/dev/project/src</dir>
      <file>buffer.c</file>
      <line>42</line>
    </frame>
    <frame>
      <ip>0x1091A0</ip>
      <fn>main</fn>
      <dir>/home/dev/project/src</dir>
      <file>main.c</file>
      <line>7</line>
    </frame>
  </stack>
  <auxwhat>Address 0x4a4b044 is 0 bytes after a block of size 4 alloc'd</auxwhat>
  <stack>
    <frame><ip>0x1</ip><fn>malloc</fn></frame>
  </stack>
</error>
<error>
  <unique>0x1</unique>
  <kind>Leak_DefinitelyLost</kind>
  <xwhat>
    <text>8 bytes in 1 blocks are definitely lost in loss record 1 of 1</text>
    <leakedbytes>8</leakedbytes>
  </xwhat>
  <stack>
    <frame><ip>0x483B7F3</ip></frame>
  </stack>
</error>
<status><state>FINISHED</state></status>
</valgrindoutput>
"#;

    fn parse(xml: &str) -> Result<Vec<ErrorRecord>> {
        parse_str(xml, Path::new("test.xml"), &ParseOptions::default())
    }

    #[test]
    fn test_parse_sample() {
        let errors = parse(SAMPLE).unwrap();
        assert_eq!(errors.len(), 2);

        let first = &errors[0];
        assert_eq!(first.unique.as_deref(), Some("0x0"));
        assert_eq!(first.kind, "InvalidRead");
        assert_eq!(first.what, "Invalid read of size 4");
        assert_eq!(first.stack.len(), 3);
        assert_eq!(first.stack[0].function, "memcpy");
        assert_eq!(first.stack[0].absolute_path, None);
        assert_eq!(first.stack[0].line, None);
        assert_eq!(
            first.stack[1].absolute_path,
            Some(PathBuf::from("/home/dev/project/src/buffer.c"))
        );
        assert_eq!(first.stack[1].line, Some(42));
        assert_eq!(first.stack[2].function, "main");
    }

    #[test]
    fn test_aux_stack_is_ignored() {
        let errors = parse(SAMPLE).unwrap();
        assert!(errors[0].stack.iter().all(|f| f.function != "malloc"));
    }

    #[test]
    fn test_xwhat_and_ip_fallback() {
        let errors = parse(SAMPLE).unwrap();
        let leak = &errors[1];
        assert_eq!(leak.kind, "Leak_DefinitelyLost");
        assert!(leak.what.starts_with("8 bytes in 1 blocks"));
        assert_eq!(leak.stack[0].function, "0x483B7F3");
    }

    #[test]
    fn test_no_errors() {
        let xml = "<valgrindoutput><protocolversion>4</protocolversion></valgrindoutput>";
        assert!(parse(xml).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_xml() {
        let err = parse("<valgrindoutput><error>").unwrap_err();
        assert!(matches!(err, ReportError::Parse { .. }));
    }

    #[test]
    fn test_foreign_document_rejected() {
        let err = parse("<html><body>hi</body></html>").unwrap_err();
        assert!(matches!(err, ReportError::Parse { .. }));
    }

    #[test]
    fn test_error_without_stack_rejected() {
        let xml = r#"<valgrindoutput><protocolversion>4</protocolversion>
<error><kind>InvalidFree</kind><what>Invalid free()</what></error>
</valgrindoutput>"#;
        let err = parse(xml).unwrap_err();
        assert!(err.to_string().contains("no <stack>"));
    }

    #[test]
    fn test_bad_line_number_rejected() {
        let xml = r#"<valgrindoutput><protocolversion>4</protocolversion>
<error><kind>InvalidFree</kind><what>Invalid free()</what>
<stack><frame><fn>f</fn><dir>/a</dir><file>b.c</file><line>zero</line></frame></stack>
</error></valgrindoutput>"#;
        assert!(matches!(parse(xml).unwrap_err(), ReportError::Parse { .. }));
    }

    #[test]
    fn test_frame_paths_are_normalized() {
        let xml = r#"<valgrindoutput><protocolversion>4</protocolversion>
<error><kind>InvalidRead</kind><what>Invalid read</what><stack>
<frame><fn>a</fn><dir>/p/build/../src/./util</dir><file>a.c</file><line>2</line></frame>
<frame><fn>b</fn><dir>/p/src</dir><file>../include/b.h</file><line>9</line></frame>
</stack></error></valgrindoutput>"#;
        let errors = parse(xml).unwrap();
        assert_eq!(
            errors[0].stack[0].absolute_path,
            Some(PathBuf::from("/p/src/util/a.c"))
        );
        assert_eq!(
            errors[0].stack[1].absolute_path,
            Some(PathBuf::from("/p/include/b.h"))
        );
    }

    #[test]
    fn test_missing_file_is_input_error() {
        let err = parse_file(Path::new("/nonexistent/vg.xml"), &ParseOptions::default())
            .unwrap_err();
        assert!(matches!(err, ReportError::Input { .. }));
    }

    #[test]
    fn test_substitution_applied_to_frames() {
        let options = ParseOptions {
            substitutions: vec![PathSubstitution::parse("/home/dev/project:/work").unwrap()],
        };
        let errors = parse_str(SAMPLE, Path::new("test.xml"), &options).unwrap();
        assert_eq!(
            errors[0].stack[1].absolute_path,
            Some(PathBuf::from("/work/src/buffer.c"))
        );
    }
}

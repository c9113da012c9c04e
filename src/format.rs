//! Source formatting for rendered programs
//!
//! [`tidy_source`] normalizes whitespace without any external tools;
//! [`gofmt`] hands the text to the real Go formatter when one is installed.

use crate::error::{Error, Result};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, trace};

/// How long an external formatter may run before it is abandoned
pub const FORMATTER_TIMEOUT: Duration = Duration::from_secs(30);

/// Bracket balance of one line, ignoring strings and `//` comments
#[derive(Debug, Default, PartialEq, Eq)]
struct Brackets {
    opens: usize,
    closes: usize,
    /// Closers before the first other character
    leading: usize,
}

fn scan_brackets(line: &str) -> Brackets {
    let mut brackets = Brackets::default();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut leading = true;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' && q != '`' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '/' if chars.peek() == Some(&'/') => break,
            '{' | '(' | '[' => brackets.opens += 1,
            '}' | ')' | ']' => {
                brackets.closes += 1;
                if leading {
                    brackets.leading += 1;
                }
                continue;
            }
            _ => {}
        }
        leading = false;
    }

    brackets
}

fn is_label(line: &str) -> bool {
    line.starts_with("case ") || line.starts_with("default:")
}

/// Re-indent `source` with tabs by bracket depth.
///
/// Trailing whitespace goes, leading blank lines go, runs of blank lines
/// collapse to one, and blank lines directly inside an opening or before a
/// closing bracket are dropped. `case`/`default` labels sit one level out.
pub fn tidy_source(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut depth = 0usize;
    let mut after_open = true;
    let mut pending_blank = false;

    for raw in source.lines() {
        let line = raw.trim();
        if line.is_empty() {
            pending_blank = !after_open;
            continue;
        }

        let brackets = scan_brackets(line);
        if pending_blank && brackets.leading == 0 {
            out.push('\n');
        }
        pending_blank = false;

        let mut indent = depth.saturating_sub(brackets.leading);
        if is_label(line) {
            indent = indent.saturating_sub(1);
        }
        out.push_str(&"\t".repeat(indent));
        out.push_str(line);
        out.push('\n');

        depth = (depth + brackets.opens).saturating_sub(brackets.closes);
        after_open = line.ends_with('{') || line.ends_with('(');
    }

    if depth != 0 {
        trace!(depth, "Unbalanced brackets left after tidying");
    }

    out
}

/// Run `source` through an external `gofmt`.
pub async fn gofmt(source: &str) -> Result<String> {
    run_formatter("gofmt", &[], source).await
}

/// Pipe `source` through `program`, returning its stdout.
pub async fn run_formatter(program: &str, args: &[&str], source: &str) -> Result<String> {
    debug!("Formatting {} bytes with {}", source.len(), program);

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| Error::Format(format!("failed to start {program}: {e}")))?;

    if let Some(mut stdin) = child.stdin.take() {
        let written = match stdin.write_all(source.as_bytes()).await {
            Ok(()) => stdin.shutdown().await,
            Err(e) => Err(e),
        };
        // An early exit closes the pipe; the exit status below reports why.
        match written {
            Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                trace!("{} closed stdin early", program)
            }
            other => other?,
        }
    }

    let output = match tokio::time::timeout(FORMATTER_TIMEOUT, child.wait_with_output()).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(Error::Format(format!(
                "{program} did not finish within {}s",
                FORMATTER_TIMEOUT.as_secs()
            )))
        }
    };

    if !output.status.success() {
        return Err(Error::Format(format!(
            "{program} exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    String::from_utf8(output.stdout)
        .map_err(|e| Error::Format(format!("{program} produced invalid UTF-8: {e}")))
}

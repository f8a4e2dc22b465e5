//! Documentation blocks in defaults files.
//!
//! A block starts with one or more header comments naming parameters,
//! either `! ### name` or an RST-style title (`! name` followed by a
//! `! ~~~~` underline). The comment lines that follow, up to the next code
//! line or the next header after some text, are the documentation of every
//! name in the block.

use std::collections::HashMap;

use nldoc_core::{fold_name, is_valid_name};

use crate::fortran::comment_body;

/// A recognized header: the folded parameter name and how many physical
/// lines it spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Header {
    pub(crate) name: String,
    pub(crate) consumed: usize,
}

/// Recognizes a header comment whose body is `body`; `next` is the
/// following physical line, needed for underlined titles.
pub(crate) fn doc_header(body: &str, next: Option<&str>) -> Option<Header> {
    let body = body.trim();

    if let Some(rest) = body.strip_prefix("###") {
        let name = header_name(rest.trim())?;
        return Some(Header { name, consumed: 1 });
    }

    let underline = next.and_then(comment_body).map(str::trim)?;
    if underline.len() >= 3 && underline.chars().all(|c| c == '~') {
        let name = header_name(body)?;
        return Some(Header { name, consumed: 2 });
    }
    None
}

/// Extracts a parameter name from header text such as `x_ctrl(1..30)`.
fn header_name(text: &str) -> Option<String> {
    let end = text
        .find(|c: char| c == '(' || c.is_whitespace())
        .unwrap_or(text.len());
    let (name, rest) = text.split_at(end);
    if !is_valid_name(name) {
        return None;
    }
    // `name(...)` may be followed by nothing else
    let rest = rest.trim_start();
    if !rest.is_empty() && !rest.starts_with('(') {
        return None;
    }
    Some(fold_name(name))
}

/// Accumulates documentation blocks while a defaults file is scanned.
#[derive(Debug, Default)]
pub(crate) struct DocCollector {
    names: Vec<String>,
    lines: Vec<String>,
    active: bool,
    docs: HashMap<String, String>,
}

impl DocCollector {
    pub(crate) fn header(&mut self, name: String) {
        if self.has_text() {
            self.flush();
        }
        self.names.push(name);
        self.active = true;
    }

    pub(crate) fn line(&mut self, body: &str) {
        if self.active {
            self.lines.push(body.to_string());
        }
    }

    pub(crate) fn blank(&mut self) {
        if self.active {
            self.lines.push(String::new());
        }
    }

    /// Closes the current block, if any; called on every code line.
    pub(crate) fn end_block(&mut self) {
        if self.active {
            self.flush();
        }
    }

    /// Finishes scanning and returns documentation by folded name.
    pub(crate) fn finish(mut self) -> HashMap<String, String> {
        self.end_block();
        self.docs
    }

    fn has_text(&self) -> bool {
        self.lines.iter().any(|l| !l.trim().is_empty())
    }

    fn flush(&mut self) {
        let text = render(&self.lines);
        for name in self.names.drain(..) {
            self.docs.entry(name).or_insert_with(|| text.clone());
        }
        self.lines.clear();
        self.active = false;
    }
}

/// Dedents the block, trims blank edges and collapses blank runs.
///
/// RST literal-block markers are rendered the way RST shows them: a bare
/// `::` line disappears and a trailing `::` becomes `:`.
fn render(lines: &[String]) -> String {
    let indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty() && l.trim() != "::")
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines {
        let text = if line.trim().is_empty() || line.trim() == "::" {
            String::new()
        } else {
            let text = line.get(indent..).unwrap_or(line.trim_start()).trim_end();
            match text.strip_suffix("::") {
                Some(head) => format!("{}:", head.trim_end()),
                None => text.to_string(),
            }
        };
        if text.is_empty() && out.last().is_none_or(|l| l.is_empty()) {
            continue;
        }
        out.push(text);
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}

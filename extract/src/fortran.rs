//! Fortran source line utilities.
//!
//! Free-form Fortran as found in MESA `.defaults`, `.inc` and `.f90` files:
//! `!` starts a comment unless quoted, a trailing `&` continues a statement
//! on the next non-comment line, and that line may itself start with `&`.

/// A logical code line with comments removed and continuations joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeLine {
    /// 1-based number of the first physical line.
    pub number: usize,
    /// Statement text, trimmed.
    pub text: String,
}

/// Returns `true` if the line is empty or whitespace only.
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Returns `true` if the line is entirely a comment.
pub fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('!')
}

/// Returns the text of a full-line comment without the `!` marker.
///
/// Leading indentation after the marker is preserved so callers can dedent
/// a whole block consistently. Repeated markers (`!!`) are treated as one.
pub fn comment_body(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix('!')?;
    Some(rest.trim_start_matches('!').trim_end())
}

/// Removes a trailing `!` comment, ignoring `!` inside quoted strings.
pub fn strip_inline_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    for (idx, ch) in line.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, '!') => return &line[..idx],
            (None, _) => {}
        }
    }
    line
}

/// Splits on `sep` at nesting depth zero, outside quoted strings.
///
/// # Examples
///
/// ```
/// use nldoc_extract::fortran::split_top_level;
///
/// let parts = split_top_level("a(1,2), b, c = (/1,2/)", ',');
/// assert_eq!(parts, vec!["a(1,2)", " b", " c = (/1,2/)"]);
/// ```
pub fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (idx, ch) in text.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth = depth.saturating_sub(1),
            (None, c) if c == sep && depth == 0 => {
                parts.push(&text[start..idx]);
                start = idx + c.len_utf8();
            }
            (None, _) => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Returns the text between the first `(` and its matching `)`, if any,
/// along with the text before the parenthesis.
pub fn split_parenthesized(text: &str) -> Option<(&str, &str)> {
    let open = text.find('(')?;
    let mut depth = 0usize;
    for (idx, ch) in text[open..].char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&text[..open], &text[open + 1..open + idx]));
                }
            }
            _ => {}
        }
    }
    None
}

/// Counts the rank described by an index or dimension list such as `1:n, 3`.
pub fn rank_of(index_list: &str) -> u8 {
    let rank = split_top_level(index_list, ',').len();
    u8::try_from(rank).unwrap_or(u8::MAX)
}

/// Joins the code statement starting at `lines[start]` with its
/// continuation lines.
///
/// Returns the statement and the number of physical lines consumed.
/// Comment and blank lines between continued lines are skipped.
pub fn join_continuation(lines: &[&str], start: usize) -> (String, usize) {
    let mut text = String::new();
    let mut idx = start;

    loop {
        let code = strip_inline_comment(lines[idx]).trim();
        let code = if idx == start {
            code
        } else {
            code.strip_prefix('&').unwrap_or(code).trim_start()
        };
        idx += 1;

        match code.strip_suffix('&') {
            Some(head) => {
                text.push_str(head.trim_end());
                text.push(' ');
                while idx < lines.len() && (is_blank(lines[idx]) || is_comment(lines[idx])) {
                    idx += 1;
                }
                if idx >= lines.len() {
                    break;
                }
            }
            None => {
                text.push_str(code);
                break;
            }
        }
    }

    (text.trim().to_string(), idx - start)
}

/// Collects logical code lines from Fortran source text.
///
/// Blank and comment-only lines are dropped, inline comments are removed,
/// and continued statements are joined into one line.
///
/// # Examples
///
/// ```
/// use nldoc_extract::fortran::code_lines;
///
/// let src = "! header\nlogical :: a, & ! trailing\n   & b\n\ninteger :: n\n";
/// let lines = code_lines(src);
/// assert_eq!(lines.len(), 2);
/// assert_eq!(lines[0].text, "logical :: a, b");
/// assert_eq!(lines[0].number, 2);
/// assert_eq!(lines[1].text, "integer :: n");
/// ```
pub fn code_lines(text: &str) -> Vec<CodeLine> {
    let lines: Vec<&str> = text.lines().collect();
    let mut out = Vec::new();
    let mut idx = 0;

    while idx < lines.len() {
        let line = lines[idx];
        if is_blank(line) || is_comment(line) {
            idx += 1;
            continue;
        }
        let (joined, consumed) = join_continuation(&lines, idx);
        if !joined.is_empty() {
            out.push(CodeLine {
                number: idx + 1,
                text: joined,
            });
        }
        idx += consumed;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_detection() {
        assert!(is_comment("   ! note"));
        assert!(!is_comment("x = 1 ! note"));
        assert!(is_blank("   \t"));
        assert_eq!(comment_body("   !   indented"), Some("   indented"));
        assert_eq!(comment_body("!!double"), Some("double"));
        assert_eq!(comment_body("x = 1"), None);
    }

    #[test]
    fn test_strip_inline_comment_respects_quotes() {
        assert_eq!(strip_inline_comment("x = 'a!b' ! c"), "x = 'a!b' ");
        assert_eq!(strip_inline_comment("y = \"!\""), "y = \"!\"");
        assert_eq!(strip_inline_comment("z = 1"), "z = 1");
    }

    #[test]
    fn test_split_parenthesized() {
        assert_eq!(split_parenthesized("x_ctrl(1:10)"), Some(("x_ctrl", "1:10")));
        assert_eq!(split_parenthesized("a(f(1), 2)"), Some(("a", "f(1), 2")));
        assert_eq!(split_parenthesized("plain"), None);
        assert_eq!(split_parenthesized("broken(1"), None);
    }

    #[test]
    fn test_rank_of() {
        assert_eq!(rank_of(":"), 1);
        assert_eq!(rank_of("max_species, 3"), 2);
    }

    #[test]
    fn test_join_continuation_skips_interleaved_comments() {
        let lines = vec!["a = 1 + &", "! note", "", "  & 2"];
        let (text, consumed) = join_continuation(&lines, 0);
        assert_eq!(text, "a = 1 + 2");
        assert_eq!(consumed, 4);
    }

    #[test]
    fn test_join_continuation_at_end_of_input() {
        let lines = vec!["a = &"];
        let (text, consumed) = join_continuation(&lines, 0);
        assert_eq!(text, "a =");
        assert_eq!(consumed, 1);
    }
}

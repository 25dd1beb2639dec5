use thiserror::Error;

/// Longest slice of an offending line echoed back in errors
const MAX_ECHO_LEN: usize = 80;

/// The ranking response contained a line that is not a property identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: expected property identifiers, found {found:?}")]
pub struct MalformedIdentifierError {
    /// 1-based line number in the raw response
    pub line: usize,
    pub found: String,
}

/// Parse a ranking response into an ordered list of property identifiers
///
/// Accepted shapes:
/// - one identifier per line (the canonical form)
/// - a single comma-delimited or bracketed list, e.g. `[23, 45, 67]`
/// - either of the above wrapped in one Markdown code fence
///
/// Blank lines are skipped, and a comma may trail the last identifier on a
/// line. Any other empty list slot is malformed. Duplicates are kept in order.
/// The first token that is not an unsigned base-10 integer aborts parsing with
/// no partial result.
pub fn parse_identifiers(text: &str) -> Result<Vec<u64>, MalformedIdentifierError> {
    let mut lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .collect();

    strip_code_fence(&mut lines);
    strip_brackets(&mut lines);

    let mut ids = Vec::with_capacity(lines.len());

    for (line_no, line) in lines {
        if line.is_empty() {
            continue;
        }

        let mut tokens = line.split(',').map(str::trim).peekable();
        let mut parsed_on_line = 0;

        while let Some(token) = tokens.next() {
            // A single trailing comma after an identifier ends the line
            if token.is_empty() && parsed_on_line > 0 && tokens.peek().is_none() {
                break;
            }

            let id = parse_token(token).ok_or_else(|| MalformedIdentifierError {
                line: line_no,
                found: truncate(line),
            })?;
            ids.push(id);
            parsed_on_line += 1;
        }
    }

    Ok(ids)
}

/// Canonical text form of an identifier list, one id per line
pub fn serialize_identifiers(ids: &[u64]) -> String {
    let mut out = String::with_capacity(ids.len() * 4);
    for id in ids {
        out.push_str(&id.to_string());
        out.push('\n');
    }
    out
}

#[inline]
fn parse_token(token: &str) -> Option<u64> {
    // u64::from_str also accepts a leading '+'
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

fn strip_code_fence(lines: &mut Vec<(usize, &str)>) {
    if lines.len() < 2 {
        return;
    }

    let opening = lines[0].1;
    let closing = lines[lines.len() - 1].1;
    let is_fence_open = opening
        .strip_prefix("```")
        .is_some_and(|tag| tag.chars().all(|c| c.is_ascii_alphanumeric()));

    if is_fence_open && closing == "```" {
        lines.pop();
        lines.remove(0);
    }
}

fn strip_brackets<'a>(lines: &mut [(usize, &'a str)]) {
    let Some(last) = lines.len().checked_sub(1) else {
        return;
    };

    if !(lines[0].1.starts_with('[') && lines[last].1.ends_with(']')) {
        return;
    }

    lines[0].1 = lines[0].1[1..].trim_start();
    let tail = lines[last].1;
    lines[last].1 = tail[..tail.len() - 1].trim_end();
}

fn truncate(line: &str) -> String {
    match line.char_indices().nth(MAX_ECHO_LEN) {
        Some((idx, _)) => format!("{}...", &line[..idx]),
        None => line.to_string(),
    }
}

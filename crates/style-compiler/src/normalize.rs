//! Root-rule normalization.
//!
//! A style template may open with bare declarations that apply to the
//! component's root element. Those lines are wrapped in an explicit rule for
//! the root selector so the flattener only ever sees braced rules at the top.

use crate::error::StyleError;

const WRAPPED_INDENT: &str = "  ";

/// Strips comments, dedents the flattened template and wraps a leading bare
/// declaration group under `root_selector`.
///
/// The group runs from the first non-blank line up to the first blank line
/// outside of any braces, so rules and at-rules inside it nest under the root.
/// `export` names the root-class export and is only used for the error
/// reported when the template needs a root selector but has none.
pub fn normalize_root(
    text: &str,
    root_selector: Option<&str>,
    export: &str,
) -> Result<String, StyleError> {
    let text = strip_comments(text);
    let body = text
        .strip_prefix("\r\n")
        .or_else(|| text.strip_prefix('\n'))
        .unwrap_or(&text);

    let raw_lines: Vec<&str> = body.lines().collect();
    let indent = raw_lines
        .iter()
        .find(|line| !line.trim().is_empty())
        .map(|line| leading_whitespace(line))
        .unwrap_or("");
    let lines: Vec<String> = raw_lines
        .iter()
        .map(|line| dedent(line, indent))
        .collect();

    let Some(first) = lines.iter().position(|line| !line.trim().is_empty()) else {
        return Ok(String::new());
    };

    let mut out: Vec<String> = Vec::with_capacity(lines.len() + 2);

    if is_bare_declaration(&lines[first]) {
        let selector = root_selector.ok_or_else(|| StyleError::MissingRootClass {
            export: export.to_string(),
        })?;

        out.push(format!("{selector} {{"));
        let mut depth = 0usize;
        let mut index = first;
        while index < lines.len() {
            let line = &lines[index];
            if line.trim().is_empty() {
                if depth == 0 {
                    break;
                }
                out.push(String::new());
                index += 1;
                continue;
            }
            let closes = line.matches('}').count();
            if closes > depth + line.matches('{').count() {
                break;
            }
            depth = depth + line.matches('{').count() - closes;
            out.push(format!("{WRAPPED_INDENT}{line}"));
            index += 1;
        }
        out.push("}".to_string());
        out.extend(lines[index..].iter().cloned());
    } else {
        out.extend(lines[first..].iter().cloned());
    }

    while out.last().is_some_and(|line| line.trim().is_empty()) {
        out.pop();
    }

    Ok(out.join("\n"))
}

/// Removes `/* ... */` comments outside of strings. Lines left blank by the
/// removal are dropped so a comment never ends a declaration group.
pub fn strip_comments(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut commented = false;
    let mut in_comment = false;
    let mut quote: Option<char> = None;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\n' {
            if !(commented || in_comment) || !line.trim().is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            line.clear();
            commented = in_comment;
            quote = None;
            continue;
        }
        if in_comment {
            if ch == '*' && chars.peek() == Some(&'/') {
                chars.next();
                in_comment = false;
            }
            continue;
        }
        if let Some(open) = quote {
            if ch == open {
                quote = None;
            }
            line.push(ch);
            continue;
        }
        match ch {
            '"' | '\'' => {
                quote = Some(ch);
                line.push(ch);
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                in_comment = true;
                commented = true;
            }
            _ => line.push(ch),
        }
    }

    let mut stripped = lines.join("\n");
    if !(commented || in_comment) || !line.trim().is_empty() {
        if !lines.is_empty() {
            stripped.push('\n');
        }
        stripped.push_str(&line);
    }
    stripped
}

/// A declaration line outside of any braces: no rule opener or closer and not
/// the start of a multi-line selector list.
fn is_bare_declaration(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.contains('{') && !trimmed.contains('}') && !trimmed.ends_with(',')
}

fn leading_whitespace(line: &str) -> &str {
    let end = line.len() - line.trim_start().len();
    &line[..end]
}

fn dedent(line: &str, indent: &str) -> String {
    if line.trim().is_empty() {
        return String::new();
    }
    match line.strip_prefix(indent) {
        Some(rest) => rest.trim_end().to_string(),
        None => line.trim().to_string(),
    }
}

//! Source text access and span-based edits.
//!
//! The parsed component tree is never mutated. Rewrites are recorded as
//! replacements of byte ranges in the original text and applied when a range
//! is rendered.

use std::ops::Range;
use swc_common::{BytePos, Span};

/// The original component source, addressed by swc spans.
#[derive(Debug, Clone, Copy)]
pub struct SourceText<'a> {
    text: &'a str,
    start: BytePos,
}

impl<'a> SourceText<'a> {
    /// Wraps `text`, whose first byte is at `start` in the swc source map.
    pub fn new(text: &'a str, start: BytePos) -> Self {
        Self { text, start }
    }

    /// The full source text.
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Byte range of a span.
    pub fn range(&self, span: Span) -> Range<usize> {
        let lo = (span.lo.0.saturating_sub(self.start.0) as usize).min(self.text.len());
        let hi = (span.hi.0.saturating_sub(self.start.0) as usize).min(self.text.len());
        lo..hi.max(lo)
    }

    /// Byte offset of a position.
    pub fn offset(&self, pos: BytePos) -> usize {
        (pos.0.saturating_sub(self.start.0) as usize).min(self.text.len())
    }

    /// Source text of a span.
    pub fn slice(&self, span: Span) -> &'a str {
        self.slice_range(self.range(span))
    }

    /// Source text of a byte range.
    pub fn slice_range(&self, range: Range<usize>) -> &'a str {
        self.text.get(range).unwrap_or("")
    }

    /// 1-based line and column of a byte offset.
    pub fn line_column(&self, offset: usize) -> (usize, usize) {
        let mut line = 1;
        let mut column = 1;
        let mut current_offset = 0;

        for ch in self.text.chars() {
            if current_offset >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
            current_offset += ch.len_utf8();
        }

        (line, column)
    }

    /// 1-based line and column of the start of a span.
    pub fn position(&self, span: Span) -> (usize, usize) {
        self.line_column(self.offset(span.lo))
    }

    fn line_start(&self, offset: usize) -> usize {
        self.text[..offset.min(self.text.len())]
            .rfind('\n')
            .map_or(0, |i| i + 1)
    }

    /// Leading whitespace of the line containing `offset`.
    pub fn line_indent(&self, offset: usize) -> &'a str {
        let start = self.line_start(offset);
        let line = &self.text[start..];
        let end = line.len() - line.trim_start_matches([' ', '\t']).len();
        &line[..end]
    }

    /// Whether only whitespace precedes `offset` on its line.
    pub fn starts_line(&self, offset: usize) -> bool {
        let start = self.line_start(offset);
        self.text[start..offset.min(self.text.len())]
            .chars()
            .all(|c| c == ' ' || c == '\t')
    }

    /// Column of `offset` counted in characters from the line start.
    pub fn column(&self, offset: usize) -> usize {
        let start = self.line_start(offset);
        self.text[start..offset.min(self.text.len())].chars().count()
    }

    /// The indentation a node's continuation lines are written against: its
    /// own column when it starts a line, else the indentation of its line.
    pub fn block_indent(&self, offset: usize) -> usize {
        if self.starts_line(offset) {
            self.column(offset)
        } else {
            self.line_indent(offset).chars().count()
        }
    }

    /// Expands `range` over the whole lines it occupies when nothing but
    /// whitespace shares those lines, so removing it leaves no blank line.
    pub fn statement_range(&self, range: Range<usize>) -> Range<usize> {
        if !self.starts_line(range.start) {
            return range;
        }
        let mut after = range.end.min(self.text.len());
        for strip in [&[' ', '\t'][..], &[';'][..], &[' ', '\t'][..]] {
            let rest = &self.text[after..];
            after += rest.len() - rest.trim_start_matches(strip).len();
        }
        let end = if self.text[after..].starts_with("\r\n") {
            after + 2
        } else if self.text[after..].starts_with('\n') {
            after + 1
        } else if after >= self.text.len() {
            after
        } else {
            return range;
        };
        self.line_start(range.start)..end
    }

    /// Length of the whitespace run starting at `offset`.
    pub fn whitespace_after(&self, offset: usize) -> usize {
        let rest = &self.text[offset.min(self.text.len())..];
        rest.len() - rest.trim_start().len()
    }
}

/// A replacement of a byte range.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Edit {
    range: Range<usize>,
    text: String,
}

/// A set of replacements over one source text.
///
/// Edits may nest: rendering applies the outermost edit of any nested group
/// and skips the edits inside it.
#[derive(Debug, Clone, Default)]
pub struct EditSet {
    edits: Vec<Edit>,
}

impl EditSet {
    /// Creates an empty edit set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces `range` with `text`.
    pub fn replace(&mut self, range: Range<usize>, text: impl Into<String>) {
        self.edits.push(Edit {
            range,
            text: text.into(),
        });
    }

    /// Removes `range`.
    pub fn remove(&mut self, range: Range<usize>) {
        self.replace(range, String::new());
    }

    /// Renders `range` of `source` with every contained edit applied.
    pub fn render(&self, source: &str, range: Range<usize>) -> String {
        let mut edits: Vec<&Edit> = self
            .edits
            .iter()
            .filter(|e| e.range.start >= range.start && e.range.end <= range.end)
            .collect();
        edits.sort_by(|a, b| {
            a.range
                .start
                .cmp(&b.range.start)
                .then(b.range.end.cmp(&a.range.end))
        });

        let mut out = String::with_capacity(range.len());
        let mut cursor = range.start;
        for edit in edits {
            if edit.range.start < cursor {
                continue;
            }
            out.push_str(source.get(cursor..edit.range.start).unwrap_or(""));
            out.push_str(&edit.text);
            cursor = edit.range.end;
        }
        out.push_str(source.get(cursor..range.end).unwrap_or(""));
        out
    }
}

/// Shifts the continuation lines of `text` from `strip` columns to `prefix`.
///
/// The first line is left untouched. Whitespace-only lines become empty.
pub fn reindent(text: &str, strip: usize, prefix: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (index, line) in text.split('\n').enumerate() {
        if index == 0 {
            out.push_str(line);
            continue;
        }
        out.push('\n');
        if line.trim().is_empty() {
            continue;
        }
        let leading = line.len() - line.trim_start_matches([' ', '\t']).len();
        let cut = leading.min(strip);
        out.push_str(prefix);
        out.push_str(&line[cut..]);
    }
    out
}

/// Drops blank lines directly after a block opener or before a block closer
/// and collapses runs of blank lines.
pub fn tidy_blank_lines(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out: Vec<&str> = Vec::with_capacity(lines.len());

    for (index, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            let after_opener = out
                .last()
                .map(|l| l.trim_end())
                .map_or(true, |l| l.is_empty() || l.ends_with('{') || l.ends_with('('));
            if after_opener {
                continue;
            }
            let next = lines[index + 1..]
                .iter()
                .find(|l| !l.trim().is_empty())
                .map(|l| l.trim_start());
            if next.is_some_and(|l| l.starts_with('}') || l.starts_with(')')) {
                continue;
            }
            out.push("");
        } else {
            out.push(line);
        }
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn source(text: &str) -> SourceText<'_> {
        SourceText::new(text, BytePos(0))
    }

    #[test]
    fn test_line_column() {
        let text = "ab\ncd\nef";
        let source = source(text);
        assert_eq!(source.line_column(0), (1, 1));
        assert_eq!(source.line_column(4), (2, 2));
        assert_eq!(source.line_column(6), (3, 1));
    }

    #[test]
    fn test_indentation_helpers() {
        let text = "a\n    foo(bar);\n  x = <div>";
        let source = source(text);
        assert_eq!(source.line_indent(8), "    ");
        assert!(source.starts_line(6));
        assert!(!source.starts_line(8));
        assert_eq!(source.column(8), 6);

        let div = text.find("<div").unwrap();
        assert_eq!(source.block_indent(div), 2);
        assert_eq!(source.block_indent(6), 4);
    }

    #[test]
    fn test_statement_range() {
        let text = "{\n    remove();\n    keep();\n}";
        let source = source(text);
        let start = text.find("remove").unwrap();
        let range = source.statement_range(start..start + "remove();".len());
        assert_eq!(&text[range], "    remove();\n");

        let inline = "a(); b();";
        let source = SourceText::new(inline, BytePos(0));
        assert_eq!(source.statement_range(5..9), 5..9);
    }

    #[test]
    fn test_nested_edits() {
        let text = "this.setState({ a: this.props.b });";
        let mut edits = EditSet::new();
        let inner = text.find("this.props.b").unwrap();
        edits.replace(inner..inner + "this.props.b".len(), "b");
        assert_eq!(edits.render(text, 0..text.len()), "this.setState({ a: b });");

        edits.replace(0..text.len(), "a = b;");
        assert_eq!(edits.render(text, 0..text.len()), "a = b;");
    }

    #[test]
    fn test_reindent() {
        let text = "{\n      a();\n\n      b();\n    }";
        assert_eq!(reindent(text, 4, "  "), "{\n    a();\n\n    b();\n  }");
        assert_eq!(reindent("x\n y", 4, ""), "x\ny");
    }

    #[test]
    fn test_tidy_blank_lines() {
        let text = "function a() {\n\n  b();\n\n\n  c();\n\n}";
        assert_eq!(tidy_blank_lines(text), "function a() {\n  b();\n\n  c();\n}");
    }
}

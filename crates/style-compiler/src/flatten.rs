//! Nested-selector flattening.
//!
//! The normalized template is tokenized into [`Line`]s and walked by a
//! [`Flattener`], a small state machine holding a stack of open frames. Each
//! frame owns a *segment*: the declarations collected since the frame was
//! opened or since its previous segment was emitted. Segments are emitted as
//! flat [`CssRule`]s when a child rule opens, when the frame closes, or when a
//! blank line ends the rule body. Empty segments are elided, which is how the
//! shells of parent rules that only contain nested rules disappear.

use crate::error::StyleError;
use crate::rule::CssRule;

/// A tokenized template line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// An empty or whitespace-only line.
    Blank,
    /// `selector {`
    Open(String),
    /// `}`
    Close,
    /// A declaration, trimmed.
    Declaration(String),
    /// `selector { declarations }` on a single line.
    InlineRule {
        /// The selector before the brace.
        selector: String,
        /// The text between the braces.
        body: String,
    },
}

/// Splits template text into tokens, tagged with 1-indexed line numbers.
///
/// Lines ending in `,` are accumulated: when the next line opens a rule they
/// form a multi-line selector list, otherwise they continue a declaration.
pub fn tokenize(text: &str) -> Vec<(usize, Line)> {
    let mut tokens = Vec::new();
    let mut pending: Vec<&str> = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line_number = index + 1;
        let trimmed = raw.trim();

        if trimmed.ends_with(',') && !trimmed.contains('{') && !trimmed.contains('}') {
            pending.push(trimmed);
            continue;
        }

        if !pending.is_empty() {
            if trimmed.is_empty() || trimmed.starts_with('}') {
                tokens.push((line_number, Line::Declaration(pending.join(" "))));
                pending.clear();
            } else {
                let combined = format!("{} {}", pending.join(" "), trimmed);
                pending.clear();
                tokenize_line(&combined, line_number, &mut tokens);
                continue;
            }
        }

        tokenize_line(trimmed, line_number, &mut tokens);
    }

    if !pending.is_empty() {
        let line_number = text.lines().count();
        tokens.push((line_number, Line::Declaration(pending.join(" "))));
    }

    tokens
}

fn tokenize_line(line: &str, line_number: usize, tokens: &mut Vec<(usize, Line)>) {
    let line = line.trim();
    if line.is_empty() {
        tokens.push((line_number, Line::Blank));
        return;
    }

    if let Some((selector, body)) = inline_rule(line) {
        tokens.push((
            line_number,
            Line::InlineRule {
                selector: selector.to_string(),
                body: body.to_string(),
            },
        ));
        return;
    }

    let mut buffer = String::new();
    let mut scanner = Scanner::default();
    for ch in line.chars() {
        match ch {
            '{' if scanner.at_top_level() => {
                tokens.push((line_number, Line::Open(buffer.trim().to_string())));
                buffer.clear();
            }
            '}' if scanner.at_top_level() => {
                push_declarations(&buffer, line_number, tokens);
                buffer.clear();
                tokens.push((line_number, Line::Close));
            }
            _ => {
                scanner.advance(ch);
                buffer.push(ch);
            }
        }
    }
    push_declarations(&buffer, line_number, tokens);
}

/// Matches `selector { body }` with no other braces on the line.
fn inline_rule(line: &str) -> Option<(&str, &str)> {
    let open = line.find('{')?;
    let body_and_close = &line[open + 1..];
    let body = body_and_close.strip_suffix('}')?;
    if body.contains('{') || body.contains('}') {
        return None;
    }
    let selector = line[..open].trim();
    if selector.is_empty() {
        return None;
    }
    Some((selector, body.trim()))
}

fn push_declarations(text: &str, line_number: usize, tokens: &mut Vec<(usize, Line)>) {
    for declaration in split_declarations(text) {
        tokens.push((line_number, Line::Declaration(declaration)));
    }
}

/// Splits a run of declarations on top-level `;`, keeping the terminators.
pub fn split_declarations(text: &str) -> Vec<String> {
    let mut declarations = Vec::new();
    let mut current = String::new();
    let mut scanner = Scanner::default();

    for ch in text.chars() {
        if ch == ';' && scanner.at_top_level() {
            current.push(ch);
            let trimmed = current.trim();
            if trimmed != ";" {
                declarations.push(trimmed.to_string());
            }
            current.clear();
            continue;
        }
        scanner.advance(ch);
        current.push(ch);
    }

    let rest = current.trim();
    if !rest.is_empty() {
        declarations.push(rest.to_string());
    }
    declarations
}

/// Splits on top-level commas, outside of parentheses, brackets and strings.
pub fn split_selector_list(selector: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut scanner = Scanner::default();

    for ch in selector.chars() {
        if ch == ',' && scanner.at_top_level() {
            parts.push(current.trim().to_string());
            current.clear();
            continue;
        }
        scanner.advance(ch);
        current.push(ch);
    }
    parts.push(current.trim().to_string());
    parts.retain(|part| !part.is_empty());
    parts
}

/// Tracks nesting of parentheses, brackets and quotes.
#[derive(Default)]
struct Scanner {
    depth: usize,
    quote: Option<char>,
}

impl Scanner {
    fn at_top_level(&self) -> bool {
        self.depth == 0 && self.quote.is_none()
    }

    fn advance(&mut self, ch: char) {
        if let Some(quote) = self.quote {
            if ch == quote {
                self.quote = None;
            }
            return;
        }
        match ch {
            '"' | '\'' => self.quote = Some(ch),
            '(' | '[' => self.depth += 1,
            ')' | ']' => self.depth = self.depth.saturating_sub(1),
            _ => {}
        }
    }
}

/// Joins a nested selector fragment with its parent alternatives.
///
/// `&` is replaced by the parent selector; without `&` the fragment is a
/// descendant of the parent. Comma lists on either side expand pairwise. At
/// the top level a leading bare `&` is stripped.
pub fn join_selector(parents: Option<&[String]>, fragment: &str) -> Vec<String> {
    let fragments = split_selector_list(fragment);

    let Some(parents) = parents else {
        return fragments
            .into_iter()
            .map(|fragment| match fragment.strip_prefix('&') {
                Some(rest) => rest.trim_start().to_string(),
                None => fragment,
            })
            .collect();
    };

    let mut joined = Vec::with_capacity(parents.len() * fragments.len());
    for parent in parents {
        for fragment in &fragments {
            if fragment.contains('&') {
                joined.push(fragment.replace('&', parent));
            } else {
                joined.push(format!("{parent} {fragment}"));
            }
        }
    }
    joined
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FrameKind {
    /// A rule with its flat selector alternatives.
    Selector(Vec<String>),
    /// An at-rule such as `@media (...)`.
    AtRule(String),
}

#[derive(Debug, Clone)]
struct Frame {
    kind: FrameKind,
    segment: Vec<String>,
    /// Opened for stray top-level declarations; closed by the next blank line.
    implicit: bool,
}

/// The flattening state machine.
#[derive(Debug, Default)]
pub struct Flattener {
    stack: Vec<Frame>,
    rules: Vec<CssRule>,
    root_selector: Option<String>,
    previous_blank: bool,
}

impl Flattener {
    /// Creates a flattener. Stray top-level declarations attach to
    /// `root_selector` when one is given.
    pub fn new(root_selector: Option<&str>) -> Self {
        Self {
            root_selector: root_selector.map(str::to_string),
            ..Self::default()
        }
    }

    /// Feeds one token.
    pub fn step(&mut self, line_number: usize, line: Line) -> Result<(), StyleError> {
        let blank = matches!(line, Line::Blank);
        match line {
            Line::Blank => self.blank_line(),
            Line::Open(selector) => self.open_rule(&selector),
            Line::Close => self.close_rule(line_number)?,
            Line::Declaration(text) => self.declaration(text, line_number)?,
            Line::InlineRule { selector, body } => {
                self.open_rule(&selector);
                for declaration in split_declarations(&body) {
                    self.declaration(declaration, line_number)?;
                }
                self.close_rule(line_number)?;
            }
        }
        self.previous_blank = blank;
        Ok(())
    }

    /// Pushes a frame for `fragment`, emitting the parent's open segment first.
    pub fn open_rule(&mut self, fragment: &str) {
        self.close_implicit();
        self.flush_top();

        let kind = if fragment.starts_with('@') {
            FrameKind::AtRule(fragment.to_string())
        } else {
            FrameKind::Selector(join_selector(self.parent_selectors(), fragment))
        };
        self.stack.push(Frame {
            kind,
            segment: Vec::new(),
            implicit: false,
        });
    }

    /// Pops the top frame and emits its open segment.
    pub fn close_rule(&mut self, line_number: usize) -> Result<(), StyleError> {
        self.close_implicit();
        if self.stack.is_empty() {
            return Err(StyleError::UnbalancedBraces { line: line_number });
        }
        self.flush_top();
        self.stack.pop();
        Ok(())
    }

    /// Appends a declaration to the top frame's segment.
    pub fn declaration(&mut self, text: String, line_number: usize) -> Result<(), StyleError> {
        if self.stack.is_empty() {
            let Some(root) = self.root_selector.clone() else {
                return Err(StyleError::StrayDeclaration { line: line_number });
            };
            self.stack.push(Frame {
                kind: FrameKind::Selector(vec![root]),
                segment: Vec::new(),
                implicit: true,
            });
        }

        if let Some(top) = self.stack.last_mut() {
            top.segment.push(text.trim().to_string());
        }
        Ok(())
    }

    /// Handles a blank line.
    ///
    /// Runs of blank lines collapse into one. A blank line after declarations
    /// ends the open segment; declarations that follow start a new one with
    /// the same selector.
    pub fn blank_line(&mut self) {
        if self.previous_blank {
            return;
        }
        if self.close_implicit() {
            return;
        }
        self.flush_top();
    }

    /// Returns the rule unless it has no declarations.
    pub fn elide_empty(rule: CssRule) -> Option<CssRule> {
        if rule.declarations.is_empty() {
            None
        } else {
            Some(rule)
        }
    }

    /// Emits any open segments and returns the flat rules.
    pub fn finish(mut self) -> Vec<CssRule> {
        while !self.stack.is_empty() {
            self.flush_top();
            self.stack.pop();
        }
        self.rules
    }

    fn close_implicit(&mut self) -> bool {
        if self.stack.last().is_some_and(|frame| frame.implicit) {
            self.flush_top();
            self.stack.pop();
            true
        } else {
            false
        }
    }

    /// Selector alternatives of the innermost open selector frame.
    fn parent_selectors(&self) -> Option<&[String]> {
        self.stack.iter().rev().find_map(|frame| match &frame.kind {
            FrameKind::Selector(selectors) => Some(selectors.as_slice()),
            FrameKind::AtRule(_) => None,
        })
    }

    fn flush_top(&mut self) {
        let Some(top_index) = self.stack.len().checked_sub(1) else {
            return;
        };
        let declarations = std::mem::take(&mut self.stack[top_index].segment);

        let frames = &self.stack[..=top_index];
        let selector_frame = frames
            .iter()
            .rposition(|frame| matches!(frame.kind, FrameKind::Selector(_)));

        let (selector, condition_frames) = match selector_frame {
            Some(position) => {
                let selector = match &frames[position].kind {
                    FrameKind::Selector(selectors) => selectors.join(", "),
                    FrameKind::AtRule(prelude) => prelude.clone(),
                };
                (selector, frames)
            }
            // Declarations directly inside a top-level at-rule such as `@font-face`.
            None => {
                let selector = match &frames[top_index].kind {
                    FrameKind::AtRule(prelude) => prelude.clone(),
                    FrameKind::Selector(selectors) => selectors.join(", "),
                };
                (selector, &frames[..top_index])
            }
        };

        let conditions = condition_frames
            .iter()
            .filter_map(|frame| match &frame.kind {
                FrameKind::AtRule(prelude) => Some(prelude.clone()),
                FrameKind::Selector(_) => None,
            })
            .collect();

        let rule = CssRule {
            selector,
            declarations,
            conditions,
        };
        if let Some(rule) = Self::elide_empty(rule) {
            self.rules.push(rule);
        }
    }
}

/// Flattens normalized template text into flat rules.
pub fn flatten_rules(text: &str, root_selector: Option<&str>) -> Result<Vec<CssRule>, StyleError> {
    let mut flattener = Flattener::new(root_selector);
    for (line_number, line) in tokenize(text) {
        flattener.step(line_number, line)?;
    }
    let rules = flattener.finish();
    tracing::trace!(rules = rules.len(), "flattened style rules");
    Ok(rules)
}

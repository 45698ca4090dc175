//! Diagnostic types.

/// A non-fatal finding reported alongside the generated component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The diagnostic code.
    pub code: DiagnosticCode,
    /// The severity level.
    pub severity: Severity,
    /// The diagnostic message.
    pub message: String,
    /// 1-based line in the component source.
    pub line: usize,
    /// 1-based column in the component source.
    pub column: usize,
}

impl Diagnostic {
    /// Creates a new diagnostic with the code's default severity.
    pub fn new(code: DiagnosticCode, message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            severity: code.default_severity(),
            code,
            message: message.into(),
            line,
            column,
        }
    }
}

/// The severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational; the output is complete.
    Hint,
    /// The output needs attention before it is used.
    Warning,
}

impl Severity {
    /// Returns the severity as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Hint => "hint",
            Severity::Warning => "warning",
        }
    }
}

/// Diagnostic codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    /// `unresolved-import`: a rewritten import path does not exist
    UnresolvedImport,
    /// `manual-review`: code was moved into a manual-review block
    ManualReview,
    /// `ambiguous-shadowing`: an iteration local shadows a component symbol
    AmbiguousShadowing,
    /// `unresolved-this`: a `this` reference could not be rewritten
    UnresolvedThis,
    /// `duplicate-output`: two components write the same output file
    DuplicateOutput,
}

impl DiagnosticCode {
    /// Returns the default severity for this diagnostic code.
    pub fn default_severity(&self) -> Severity {
        match self {
            DiagnosticCode::ManualReview => Severity::Hint,
            DiagnosticCode::UnresolvedImport
            | DiagnosticCode::AmbiguousShadowing
            | DiagnosticCode::UnresolvedThis
            | DiagnosticCode::DuplicateOutput => Severity::Warning,
        }
    }

    /// Returns the diagnostic code as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::UnresolvedImport => "unresolved-import",
            DiagnosticCode::ManualReview => "manual-review",
            DiagnosticCode::AmbiguousShadowing => "ambiguous-shadowing",
            DiagnosticCode::UnresolvedThis => "unresolved-this",
            DiagnosticCode::DuplicateOutput => "duplicate-output",
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

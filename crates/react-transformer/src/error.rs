//! Transformation error types.

use camino::Utf8PathBuf;
use style_compiler::StyleError;
use thiserror::Error;

/// An error that aborts the transformation of one component.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The component source could not be parsed.
    #[error("failed to parse {filename}: {message}")]
    Parse {
        /// The component file name.
        filename: String,
        /// The parser message.
        message: String,
    },

    /// The imported style module could not be read.
    #[error("failed to read style module {path}")]
    StyleModuleRead {
        /// The resolved module path, or the specifier when nothing resolved.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The style module failed to compile.
    #[error(transparent)]
    Style(#[from] StyleError),

    /// No class or function component was found.
    #[error("no component found in {filename}")]
    NoComponent {
        /// The component file name.
        filename: String,
    },

    /// More than one style module import.
    #[error("{filename} imports more than one style module (`{first}` and `{second}`)")]
    DuplicateStyleImport {
        /// The component file name.
        filename: String,
        /// The first style import specifier.
        first: String,
        /// The second style import specifier.
        second: String,
    },
}

//! Style compilation error types.

use thiserror::Error;

/// An error that aborts compilation of a style module.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleError {
    /// The style module is not valid JavaScript.
    #[error("failed to parse style module {filename}: {message}")]
    Parse {
        /// The style module file name.
        filename: String,
        /// The parser message.
        message: String,
    },

    /// No `css` tagged template was found in the module.
    #[error("no css tagged template found in {filename}")]
    MissingTemplate {
        /// The style module file name.
        filename: String,
    },

    /// An interpolated variable has neither an exported nor a shared value.
    #[error("style variable `{name}` is not declared with a literal value")]
    UnresolvedVariable {
        /// The referenced identifier.
        name: String,
    },

    /// An interpolation that is not a plain identifier.
    #[error("unsupported style interpolation `${{{expression}}}`")]
    UnsupportedInterpolation {
        /// The interpolated source text.
        expression: String,
    },

    /// Two shared variables map to the same custom property name.
    #[error("style variables `{first}` and `{second}` both map to custom property `--{property}`")]
    CustomPropertyConflict {
        /// The property name without the leading `--`.
        property: String,
        /// The variable that claimed the name first.
        first: String,
        /// The conflicting variable.
        second: String,
    },

    /// The template starts with bare declarations but the module has no root class.
    #[error("bare declarations need an exported `{export}` root class")]
    MissingRootClass {
        /// The export name that was looked up.
        export: String,
    },

    /// A closing brace without a matching open rule.
    #[error("unbalanced closing brace on line {line}")]
    UnbalancedBraces {
        /// 1-indexed line in the flattened template.
        line: usize,
    },

    /// A declaration outside any rule with no root selector to attach it to.
    #[error("declaration outside of any rule on line {line}")]
    StrayDeclaration {
        /// 1-indexed line in the flattened template.
        line: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = StyleError::UnresolvedVariable {
            name: "PRIMARY".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "style variable `PRIMARY` is not declared with a literal value"
        );

        let error = StyleError::UnsupportedInterpolation {
            expression: "theme.color".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "unsupported style interpolation `${theme.color}`"
        );

        let error = StyleError::CustomPropertyConflict {
            property: "main-color".to_string(),
            first: "MAIN_COLOR".to_string(),
            second: "main_color".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "style variables `MAIN_COLOR` and `main_color` both map to custom property `--main-color`"
        );
    }
}

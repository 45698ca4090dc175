//! Component source parsing.

use std::sync::Arc;
use swc_common::{BytePos, FileName, SourceMap};
use swc_ecma_ast::Module;
use swc_ecma_parser::{EsSyntax, Parser, StringInput, Syntax, TsSyntax};

use crate::error::TransformError;

/// The language of a component source, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLanguage {
    /// `.js`, `.jsx` and anything else.
    JavaScript,
    /// `.ts` and `.tsx`.
    TypeScript,
}

impl SourceLanguage {
    /// Chooses the language for a file name.
    pub fn from_filename(filename: &str) -> Self {
        if filename.ends_with(".ts") || filename.ends_with(".tsx") {
            SourceLanguage::TypeScript
        } else {
            SourceLanguage::JavaScript
        }
    }
}

/// A parsed component module.
pub struct ParsedComponent {
    /// The module tree.
    pub module: Module,
    /// Position of the first source byte.
    pub start: BytePos,
    /// The source language.
    pub language: SourceLanguage,
}

/// Parses a component with JSX enabled. Recoverable parser errors are fatal.
pub fn parse_component(source: &str, filename: &str) -> Result<ParsedComponent, TransformError> {
    let cm: Arc<SourceMap> = Default::default();
    let fm = cm.new_source_file(
        FileName::Custom(filename.to_string()).into(),
        source.to_string(),
    );

    let language = SourceLanguage::from_filename(filename);
    let syntax = match language {
        SourceLanguage::TypeScript => Syntax::Typescript(TsSyntax {
            tsx: !filename.ends_with(".ts"),
            decorators: true,
            ..Default::default()
        }),
        SourceLanguage::JavaScript => Syntax::Es(EsSyntax {
            jsx: true,
            decorators: true,
            ..Default::default()
        }),
    };

    let mut parser = Parser::new(syntax, StringInput::from(&*fm), None);
    let module = parser.parse_module().map_err(|e| TransformError::Parse {
        filename: filename.to_string(),
        message: format!("{:?}", e),
    })?;

    if let Some(error) = parser.take_errors().into_iter().next() {
        return Err(TransformError::Parse {
            filename: filename.to_string(),
            message: format!("{:?}", error),
        });
    }

    Ok(ParsedComponent {
        module,
        start: fm.start_pos,
        language,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_jsx() {
        let parsed = parse_component("const A = () => <div />;", "A.jsx").unwrap();
        assert_eq!(parsed.module.body.len(), 1);
        assert_eq!(parsed.language, SourceLanguage::JavaScript);
    }

    #[test]
    fn test_parse_tsx() {
        let source = "const A = (props: { title: string }) => <h1>{props.title}</h1>;";
        let parsed = parse_component(source, "A.tsx").unwrap();
        assert_eq!(parsed.language, SourceLanguage::TypeScript);
    }

    #[test]
    fn test_parse_error() {
        let err = parse_component("const = <div>", "A.jsx").err().unwrap();
        assert!(matches!(err, TransformError::Parse { .. }));
    }
}

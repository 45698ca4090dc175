//! React component to Svelte component transformation.
//!
//! This crate turns one React component module (class or function component,
//! JSX or TSX) into a Svelte single-file component. It handles:
//! - Rewriting imports and compiling the component's style module
//! - Extracting props, state and element references
//! - Rewriting component logic (`this.*`, `setState`, hooks, lifecycles)
//! - Converting the render output into Svelte markup
//! - Moving anything it cannot convert into fenced manual-review blocks
//!
//! # Example
//!
//! ```
//! use react_transformer::{transform, TransformOptions};
//!
//! let source = r#"
//! import React from 'react';
//!
//! export default function Greeting({ name }) {
//!   return <p>Hello {name}</p>;
//! }
//! "#;
//!
//! let result = transform(source, &TransformOptions::default()).unwrap();
//! assert!(result.code.contains("export let name = undefined;"));
//! assert!(result.code.contains("<p>Hello {name}</p>"));
//! ```

mod assemble;
mod component;
mod diagnostic;
mod error;
mod imports;
mod markup;
mod parse;
mod script;
mod source;
mod symbols;
mod transform;
mod types;

pub use assemble::{OutputDocument, ScriptSection};
pub use diagnostic::{Diagnostic, DiagnosticCode, Severity};
pub use error::TransformError;
pub use imports::{
    match_alias, normalize_path, relative_path, resolve_alias, ImportBinding, ImportRecord,
    ModuleReplacement,
};
pub use markup::{
    Attribute, AttributeKind, AttributeValue, BlockBody, Branch, ConditionalBlock, ElementNode,
    IterationBlock, MarkupNode,
};
pub use parse::SourceLanguage;
pub use script::ManualReviewBlock;
pub use symbols::{DeclKind, Declaration, PropDescriptor, RefDescriptor, StateDescriptor};
pub use transform::{transform, TransformOptions, TransformResult, DEFAULT_EXCLUDED_MODULES};
pub use types::component_name_from_path;

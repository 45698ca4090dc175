//! Compiles emotion-style `css` tagged templates into flat CSS.
//!
//! A component's style module declares constants and a nested, interpolated
//! `css` template. This crate turns it into flat rules suitable for a Svelte
//! `<style>` block:
//! - Exported constants are inlined; private constants become CSS custom
//!   properties hoisted into a `:root` rule
//! - Leading bare declarations are wrapped in the root class rule
//! - Nested selectors (`&__title`, `button`, `@media`) are flattened
//!
//! # Example
//!
//! ```
//! use style_compiler::{compile, StyleOptions};
//!
//! let source = r#"
//! import { css } from 'emotion';
//!
//! export const ROOT_CLASS = 'card';
//!
//! export default css`
//!   padding: 1em;
//!
//!   .${ROOT_CLASS}__title {
//!     font-weight: bold;
//!   }
//! `;
//! "#;
//!
//! let sheet = compile(source, &StyleOptions::default()).unwrap();
//! assert_eq!(sheet.rules[0].selector, ".card");
//! assert_eq!(sheet.rules[1].selector, ".card__title");
//! ```

mod error;
mod flatten;
mod module;
mod normalize;
mod rule;
mod template;

pub use error::StyleError;
pub use flatten::{flatten_rules, join_selector, split_declarations, tokenize, Flattener, Line};
pub use module::{StyleModule, StyleTemplate, StyleVariable, TemplateReference};
pub use normalize::normalize_root;
pub use rule::{hoist_custom_properties, CssRule, StyleSheet};
pub use template::{flatten_template, kebab_case, CustomProperty, FlatTemplate};

/// Options for compiling a style module.
#[derive(Debug, Clone)]
pub struct StyleOptions {
    /// Name of the exported constant holding the component's root class.
    pub root_class_export: String,
    /// Fail on interpolations that resolve to no constant instead of
    /// substituting an empty value.
    pub strict_variables: bool,
    /// File name used in error messages and for syntax selection.
    pub filename: String,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            root_class_export: "ROOT_CLASS".to_string(),
            strict_variables: true,
            filename: "styles.js".to_string(),
        }
    }
}

/// Parses and compiles a style module source.
pub fn compile(source: &str, options: &StyleOptions) -> Result<StyleSheet, StyleError> {
    let module = StyleModule::parse(source, &options.filename)?;
    compile_module(&module, options)
}

/// Compiles an already parsed style module.
pub fn compile_module(
    module: &StyleModule,
    options: &StyleOptions,
) -> Result<StyleSheet, StyleError> {
    let flat = flatten_template(module, options.strict_variables)?;

    let root_selector = module
        .exported_value(&options.root_class_export)
        .map(|class| format!(".{class}"));

    let normalized = normalize_root(
        &flat.text,
        root_selector.as_deref(),
        &options.root_class_export,
    )?;
    let rules = flatten_rules(&normalized, root_selector.as_deref())?;
    let rules = hoist_custom_properties(rules, &flat.custom_properties);

    tracing::debug!(
        filename = %options.filename,
        rules = rules.len(),
        custom_properties = flat.custom_properties.len(),
        "compiled style module"
    );

    Ok(StyleSheet {
        rules,
        custom_properties: flat.custom_properties,
    })
}

//! Main transformation logic.

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use style_compiler::StyleOptions;

use crate::assemble::{OutputDocument, ScriptSection};
use crate::component::{convert_component, convert_module_code, convert_statics, locate_component};
use crate::diagnostic::{Diagnostic, DiagnosticCode};
use crate::error::TransformError;
use crate::imports::{process_imports, ImportContext, ModuleReplacement, StyleImport};
use crate::markup::{build_markup, Markup};
use crate::parse::{parse_component, SourceLanguage};
use crate::script::Context;
use crate::source::SourceText;
use crate::types::component_name_from_path;

/// Modules whose imports are dropped from the output.
pub const DEFAULT_EXCLUDED_MODULES: &[&str] = &["react", "react-dom", "prop-types"];

/// Options for the transformation.
#[derive(Debug, Clone)]
pub struct TransformOptions {
    /// The component file path. Relative imports resolve against its directory.
    pub filename: Utf8PathBuf,
    /// The directory generated components are written to.
    pub output_dir: Utf8PathBuf,
    /// Import prefixes mapped to directories, tried in order.
    pub aliases: IndexMap<String, Utf8PathBuf>,
    /// Import path rewrite rules, first match wins.
    pub module_replacements: Vec<ModuleReplacement>,
    /// Import sources that are dropped.
    pub excluded_modules: Vec<String>,
    /// Import paths ending with this suffix are style modules.
    pub style_suffix: String,
    /// Style compilation options.
    pub style: StyleOptions,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            filename: Utf8PathBuf::from("Component.jsx"),
            output_dir: Utf8PathBuf::from("."),
            aliases: IndexMap::new(),
            module_replacements: Vec::new(),
            excluded_modules: DEFAULT_EXCLUDED_MODULES
                .iter()
                .map(|m| m.to_string())
                .collect(),
            style_suffix: "styles".to_string(),
            style: StyleOptions::default(),
        }
    }
}

/// Result of the transformation.
#[derive(Debug, Clone)]
pub struct TransformResult {
    /// The component name, from the file path.
    pub component_name: String,
    /// Where the component should be written.
    pub output_path: Utf8PathBuf,
    /// The generated Svelte component.
    pub code: String,
    /// Non-fatal findings.
    pub diagnostics: Vec<Diagnostic>,
}

/// Transforms a React component into a Svelte component.
pub fn transform(source: &str, options: &TransformOptions) -> Result<TransformResult, TransformError> {
    let component_name = component_name_from_path(&options.filename);
    let _span = tracing::debug_span!("transform", component = %component_name).entered();

    let parsed = parse_component(source, options.filename.as_str())?;
    let text = SourceText::new(source, parsed.start);

    let component_dir = options.filename.parent().unwrap_or(Utf8Path::new(""));
    let import_cx = ImportContext {
        component_name: &component_name,
        component_dir,
        output_dir: &options.output_dir,
        aliases: &options.aliases,
        module_replacements: &options.module_replacements,
        excluded_modules: &options.excluded_modules,
        style_suffix: &options.style_suffix,
        style: &options.style,
    };
    let mut diagnostics = Vec::new();
    let imports = process_imports(&parsed.module, &text, &import_cx, &mut diagnostics)?;

    let mut component =
        locate_component(&parsed.module).ok_or_else(|| TransformError::NoComponent {
            filename: options.filename.to_string(),
        })?;
    tracing::debug!(
        declared = component.name.as_deref().unwrap_or("<anonymous>"),
        "located component"
    );

    let mut cx = Context::new(text, imports.style.as_ref());
    convert_statics(&mut cx, &parsed.module, &mut component);
    convert_module_code(&mut cx, &parsed.module, &component);
    let markup = match convert_component(&mut cx, &component.source) {
        Some(root) => build_markup(&mut cx, root),
        None => Markup::default(),
    };

    if markup.uses_slot && !logic_mentions(&cx, "children") {
        cx.symbols.remove_prop("children");
    }
    if let Some(style) = imports.style.as_ref() {
        declare_style_constants(&mut cx, style, &markup.text);
    }

    let mut declarations = cx.symbols.prop_declarations();
    declarations.extend(cx.symbols.internal_declarations());

    let document = OutputDocument {
        script: ScriptSection {
            svelte_imports: cx.helpers.iter().map(|h| h.to_string()).collect(),
            imports: imports.kept().map(str::to_string).collect(),
            module_code: std::mem::take(&mut cx.module_code),
            declarations,
            reactive: std::mem::take(&mut cx.reactive),
            functions: std::mem::take(&mut cx.functions),
            manual_review: std::mem::take(&mut cx.manual_review),
        },
        typescript: parsed.language == SourceLanguage::TypeScript,
        markup: markup.text,
        style: imports
            .style
            .as_ref()
            .map(|style| style.sheet.to_lines())
            .unwrap_or_default(),
    };

    diagnostics.append(&mut cx.diagnostics);
    tracing::debug!(diagnostics = diagnostics.len(), "transformed component");

    Ok(TransformResult {
        output_path: options.output_dir.join(format!("{component_name}.svelte")),
        component_name,
        code: document.to_code(),
        diagnostics,
    })
}

/// Declares the named style imports still referenced after inlining. A
/// referenced import without a literal export is reported.
fn declare_style_constants(cx: &mut Context<'_>, style: &StyleImport, markup: &str) {
    for (local, imported) in &style.named {
        if !mentions(markup, local) && !logic_mentions(cx, local) {
            continue;
        }
        match style.exported_value(local) {
            Some(value) => cx.symbols.add_style_constant(local, value),
            None => {
                tracing::warn!(name = %imported, module = %style.specifier, "style import has no literal value");
                cx.diagnostic(
                    DiagnosticCode::UnresolvedImport,
                    format!(
                        "`{imported}` is not exported with a literal value by \"{}\"",
                        style.specifier
                    ),
                    style.span,
                );
            }
        }
    }
}

/// Whether any generated script text refers to `name`.
fn logic_mentions(cx: &Context<'_>, name: &str) -> bool {
    let declared = cx
        .symbols
        .prop_declarations()
        .into_iter()
        .chain(cx.symbols.internal_declarations())
        .filter_map(|d| d.value);

    cx.module_code
        .iter()
        .chain(&cx.reactive)
        .chain(&cx.functions)
        .chain(cx.manual_review.iter().map(|b| &b.code))
        .any(|text| mentions(text, name))
        || declared.into_iter().any(|value| mentions(&value, name))
}

/// Whether `text` contains `name` as a whole identifier.
fn mentions(text: &str, name: &str) -> bool {
    let is_ident = |c: char| c.is_alphanumeric() || c == '_' || c == '$';
    text.match_indices(name).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + name.len()..].chars().next();
        !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(source: &str) -> TransformResult {
        let options = TransformOptions {
            filename: Utf8PathBuf::from("src/Widget.jsx"),
            output_dir: Utf8PathBuf::from("out"),
            ..Default::default()
        };
        transform(source, &options).unwrap()
    }

    #[test]
    fn test_mentions() {
        assert!(mentions("x = children;", "children"));
        assert!(!mentions("x = childrenCount;", "children"));
        assert!(!mentions("$children", "children"));
        assert!(mentions("children", "children"));
    }

    #[test]
    fn test_function_component() {
        let source = "\
import React from 'react';

export default function Widget({ title }) {
  return <h1>{title}</h1>;
}
";
        let result = run(source);
        assert_eq!(result.component_name, "Widget");
        assert_eq!(result.output_path, Utf8PathBuf::from("out/Widget.svelte"));
        assert_eq!(
            result.code,
            "<script>\n  export let title = undefined;\n</script>\n\n<h1>{title}</h1>\n"
        );
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_children_become_slot() {
        let source = "\
const Panel = ({ children, title }) => (
  <section>
    <h2>{title}</h2>
    {children}
  </section>
);

export default Panel;
";
        let result = run(source);
        assert_eq!(
            result.code,
            "\
<script>
  export let title = undefined;
</script>

<section>
  <h2>{title}</h2>
  <slot />
</section>
"
        );
    }

    #[test]
    fn test_typescript_script_tag() {
        let options = TransformOptions {
            filename: Utf8PathBuf::from("Badge.tsx"),
            ..Default::default()
        };
        let source = "export default function Badge(props: { label: string }) {\n  return <span>{props.label}</span>;\n}\n";
        let result = transform(source, &options).unwrap();
        assert!(result.code.starts_with("<script lang=\"ts\">\n  export let label = undefined;\n</script>"));
        assert!(result.code.ends_with("<span>{label}</span>\n"));
    }

    #[test]
    fn test_no_component() {
        let options = TransformOptions::default();
        let err = transform("export const x = 1;\n", &options).unwrap_err();
        assert!(matches!(err, TransformError::NoComponent { .. }));
    }
}

//! Style module parsing.
//!
//! A style module is a plain JavaScript module that declares string constants
//! and exports a `css` tagged template:
//!
//! ```text
//! import { css } from 'emotion';
//!
//! const ACCENT = '#a755a4';
//! export const ROOT_CLASS = 'card';
//!
//! export default css`
//!   padding: 1em;
//!
//!   .${ROOT_CLASS}__title {
//!     color: ${ACCENT};
//!   }
//! `;
//! ```
//!
//! Exported constants are substituted literally; module-private ("shared")
//! constants become CSS custom properties.

use indexmap::IndexMap;
use smol_str::SmolStr;
use std::sync::Arc;
use swc_common::{BytePos, FileName, SourceMap, Span, Spanned};
use swc_ecma_ast::{
    Decl, ExportSpecifier, Expr, Lit, MemberProp, Module, ModuleDecl, ModuleExportName, ModuleItem,
    Pat, Stmt, TaggedTpl, VarDecl,
};
use swc_ecma_parser::{EsSyntax, Parser, StringInput, Syntax, TsSyntax};

use crate::error::StyleError;

/// A constant declared in the style module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleVariable {
    /// The literal value as it should appear in CSS.
    pub value: String,
    /// Whether the constant is exported from the module.
    pub exported: bool,
}

/// An interpolation inside the `css` template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateReference {
    /// `${NAME}`
    Variable(SmolStr),
    /// Any other expression, kept as source text for error reporting.
    Unsupported(String),
}

/// The literal segments and interpolations of a `css` template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleTemplate {
    /// Raw literal segments; always one more than `references`.
    pub quasis: Vec<String>,
    /// Interpolations between the literal segments.
    pub references: Vec<TemplateReference>,
}

impl StyleTemplate {
    /// Builds a template from literal text without interpolations.
    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            quasis: vec![text.into()],
            references: Vec::new(),
        }
    }
}

/// A parsed style module.
#[derive(Debug, Clone, Default)]
pub struct StyleModule {
    variables: IndexMap<SmolStr, StyleVariable>,
    template: StyleTemplate,
}

impl StyleModule {
    /// Builds a module from already-known parts.
    pub fn new(variables: IndexMap<SmolStr, StyleVariable>, template: StyleTemplate) -> Self {
        Self {
            variables,
            template,
        }
    }

    /// Parses a style module source.
    pub fn parse(source: &str, filename: &str) -> Result<Self, StyleError> {
        let (module, start) = parse_module(source, filename)?;
        let text = SourceSlice { source, start };

        let mut variables: IndexMap<SmolStr, StyleVariable> = IndexMap::new();
        let mut named_templates: IndexMap<SmolStr, StyleTemplate> = IndexMap::new();
        let mut default_template: Option<StyleTemplate> = None;
        let mut default_ident: Option<SmolStr> = None;
        let mut first_template: Option<StyleTemplate> = None;
        let mut export_aliases: Vec<(SmolStr, SmolStr)> = Vec::new();

        for item in &module.body {
            match item {
                ModuleItem::Stmt(Stmt::Decl(Decl::Var(var_decl))) => {
                    collect_var_decl(
                        var_decl,
                        false,
                        &text,
                        &mut variables,
                        &mut named_templates,
                        &mut first_template,
                    );
                }
                ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export_decl)) => {
                    if let Decl::Var(var_decl) = &export_decl.decl {
                        collect_var_decl(
                            var_decl,
                            true,
                            &text,
                            &mut variables,
                            &mut named_templates,
                            &mut first_template,
                        );
                    }
                }
                ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(export)) => {
                    match unwrap_parens(&export.expr) {
                        Expr::TaggedTpl(tagged) if is_css_tag(&tagged.tag) => {
                            default_template = Some(template_from(tagged, &text));
                        }
                        Expr::Ident(ident) => {
                            default_ident = Some(SmolStr::new(ident.sym.as_str()));
                        }
                        _ => {}
                    }
                }
                ModuleItem::ModuleDecl(ModuleDecl::ExportNamed(named)) => {
                    if named.src.is_some() {
                        continue;
                    }
                    for spec in &named.specifiers {
                        if let ExportSpecifier::Named(spec) = spec {
                            let local = export_name(&spec.orig);
                            let exported = spec
                                .exported
                                .as_ref()
                                .map(export_name)
                                .unwrap_or_else(|| local.clone());
                            export_aliases.push((local, exported));
                        }
                    }
                }
                _ => {}
            }
        }

        for (local, exported) in export_aliases {
            let Some(variable) = variables.get_mut(&local) else {
                continue;
            };
            if local == exported {
                variable.exported = true;
            } else {
                let value = variable.value.clone();
                variables.insert(
                    exported,
                    StyleVariable {
                        value,
                        exported: true,
                    },
                );
            }
        }

        let template = default_template
            .or_else(|| {
                default_ident
                    .as_ref()
                    .and_then(|name| named_templates.get(name).cloned())
            })
            .or(first_template)
            .ok_or_else(|| StyleError::MissingTemplate {
                filename: filename.to_string(),
            })?;

        tracing::debug!(
            filename,
            variables = variables.len(),
            interpolations = template.references.len(),
            "parsed style module"
        );

        Ok(Self {
            variables,
            template,
        })
    }

    /// Returns the `css` template.
    pub fn template(&self) -> &StyleTemplate {
        &self.template
    }

    /// Looks up a constant by name.
    pub fn variable(&self, name: &str) -> Option<&StyleVariable> {
        self.variables.get(name)
    }

    /// Returns the value of an exported constant.
    pub fn exported_value(&self, name: &str) -> Option<&str> {
        self.variables
            .get(name)
            .filter(|v| v.exported)
            .map(|v| v.value.as_str())
    }

    /// Iterates over exported constants in declaration order.
    pub fn exports(&self) -> impl Iterator<Item = (&str, &str)> {
        self.variables
            .iter()
            .filter(|(_, v)| v.exported)
            .map(|(name, v)| (name.as_str(), v.value.as_str()))
    }
}

struct SourceSlice<'a> {
    source: &'a str,
    start: BytePos,
}

impl SourceSlice<'_> {
    fn slice(&self, span: Span) -> &str {
        let lo = span.lo.0.saturating_sub(self.start.0) as usize;
        let hi = span.hi.0.saturating_sub(self.start.0) as usize;
        self.source.get(lo..hi).unwrap_or("")
    }
}

fn parse_module(source: &str, filename: &str) -> Result<(Module, BytePos), StyleError> {
    let cm: Arc<SourceMap> = Default::default();
    let fm = cm.new_source_file(
        FileName::Custom(filename.to_string()).into(),
        source.to_string(),
    );
    let syntax = if filename.ends_with(".ts") || filename.ends_with(".tsx") {
        Syntax::Typescript(TsSyntax {
            tsx: filename.ends_with(".tsx"),
            ..Default::default()
        })
    } else {
        Syntax::Es(EsSyntax {
            jsx: true,
            ..Default::default()
        })
    };

    let mut parser = Parser::new(syntax, StringInput::from(&*fm), None);
    let module = parser.parse_module().map_err(|e| StyleError::Parse {
        filename: filename.to_string(),
        message: format!("{:?}", e),
    })?;

    Ok((module, fm.start_pos))
}

fn collect_var_decl(
    var_decl: &VarDecl,
    exported: bool,
    text: &SourceSlice<'_>,
    variables: &mut IndexMap<SmolStr, StyleVariable>,
    named_templates: &mut IndexMap<SmolStr, StyleTemplate>,
    first_template: &mut Option<StyleTemplate>,
) {
    for decl in &var_decl.decls {
        let Pat::Ident(binding) = &decl.name else {
            continue;
        };
        let Some(init) = decl.init.as_deref() else {
            continue;
        };
        let name = SmolStr::new(binding.id.sym.as_str());

        if let Expr::TaggedTpl(tagged) = unwrap_parens(init) {
            if is_css_tag(&tagged.tag) {
                let template = template_from(tagged, text);
                if first_template.is_none() {
                    *first_template = Some(template.clone());
                }
                named_templates.insert(name, template);
            }
            continue;
        }

        if let Some(value) = literal_value(init, text) {
            variables.insert(name, StyleVariable { value, exported });
        }
    }
}

/// Returns the CSS text of a literal initializer.
fn literal_value(expr: &Expr, text: &SourceSlice<'_>) -> Option<String> {
    match unwrap_parens(expr) {
        Expr::Lit(Lit::Str(s)) => Some(s.value.to_string_lossy().into_owned()),
        Expr::Lit(Lit::Num(n)) => Some(text.slice(n.span).to_string()),
        Expr::Tpl(tpl) if tpl.exprs.is_empty() => {
            Some(tpl.quasis.iter().map(|q| q.raw.to_string()).collect())
        }
        _ => None,
    }
}

fn template_from(tagged: &TaggedTpl, text: &SourceSlice<'_>) -> StyleTemplate {
    let quasis = tagged.tpl.quasis.iter().map(|q| q.raw.to_string()).collect();
    let references = tagged
        .tpl
        .exprs
        .iter()
        .map(|expr| match unwrap_parens(expr) {
            Expr::Ident(ident) => TemplateReference::Variable(SmolStr::new(ident.sym.as_str())),
            other => TemplateReference::Unsupported(text.slice(other.span()).to_string()),
        })
        .collect();

    StyleTemplate { quasis, references }
}

fn is_css_tag(tag: &Expr) -> bool {
    match tag {
        Expr::Ident(ident) => ident.sym.as_str() == "css",
        Expr::Member(member) => {
            matches!(&member.prop, MemberProp::Ident(prop) if prop.sym.as_str() == "css")
        }
        _ => false,
    }
}

fn unwrap_parens(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(paren) => unwrap_parens(&paren.expr),
        other => other,
    }
}

fn export_name(name: &ModuleExportName) -> SmolStr {
    match name {
        ModuleExportName::Ident(ident) => SmolStr::new(ident.sym.as_str()),
        ModuleExportName::Str(value) => SmolStr::new(value.value.to_string_lossy()),
    }
}

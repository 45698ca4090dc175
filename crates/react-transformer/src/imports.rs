//! Import rewriting and style module loading.
//!
//! Every import of the component is either dropped (framework modules), kept
//! with a possibly rewritten path, or consumed as the component's style
//! module. Path rewriting happens in two steps:
//! 1. The first matching module replacement rule
//! 2. Alias prefix resolution to a path relative to the output directory

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use regex::{NoExpand, Regex};
use std::io;
use style_compiler::{compile_module, StyleModule, StyleOptions, StyleSheet};
use swc_common::Span;
use swc_ecma_ast::{ImportDecl, ImportSpecifier, Module, ModuleDecl, ModuleExportName, ModuleItem};

use crate::diagnostic::{Diagnostic, DiagnosticCode};
use crate::error::TransformError;
use crate::source::{EditSet, SourceText};

/// Suffixes probed when checking that a rewritten import exists.
const IMPORT_PROBES: &[&str] = &["", ".js", ".jsx", ".ts", ".tsx", ".svelte", "/index.js"];

/// Suffixes probed when locating a style module.
const STYLE_PROBES: &[&str] = &["", ".js", ".ts", ".jsx", ".tsx", "/index.js"];

/// A module path rewrite rule.
#[derive(Debug, Clone)]
pub struct ModuleReplacement {
    /// Selects the import paths the rule applies to.
    pub pattern: Regex,
    /// The part of the path to replace; the whole path when absent.
    pub token: Option<Regex>,
    /// The replacement text, inserted literally.
    pub replacement: String,
}

impl ModuleReplacement {
    /// Creates a rule.
    pub fn new(pattern: Regex, token: Option<Regex>, replacement: impl Into<String>) -> Self {
        Self {
            pattern,
            token,
            replacement: replacement.into(),
        }
    }

    /// Returns the rewritten path if the rule matches `path`.
    pub fn apply(&self, path: &str) -> Option<String> {
        if !self.pattern.is_match(path) {
            return None;
        }
        Some(match &self.token {
            Some(token) => token
                .replace(path, NoExpand(&self.replacement))
                .into_owned(),
            None => self.replacement.clone(),
        })
    }
}

/// A local binding introduced by an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportBinding {
    /// `import name from '...'`
    Default(String),
    /// `import { imported as local } from '...'`
    Named {
        /// The local name.
        local: String,
        /// The exported name.
        imported: String,
    },
    /// `import * as name from '...'`
    Namespace(String),
}

/// One import of the component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    /// The module path after rewriting.
    pub source_path: String,
    /// The bindings introduced by the import.
    pub bindings: Vec<ImportBinding>,
    /// Whether the import is emitted in the output.
    pub kept: bool,
    /// The import statement as emitted.
    pub text: String,
}

/// The consumed style module import.
#[derive(Debug, Clone)]
pub struct StyleImport {
    /// The import specifier as written.
    pub specifier: String,
    /// The default binding that stands for the generated class name.
    pub placeholder: Option<String>,
    /// Named bindings as `(local, exported)` pairs.
    pub named: Vec<(String, String)>,
    /// The parsed module.
    pub module: StyleModule,
    /// The compiled rules.
    pub sheet: StyleSheet,
    /// The import declaration.
    pub span: Span,
}

impl StyleImport {
    /// Resolves a local binding to the exported value it imports.
    pub fn exported_value(&self, local: &str) -> Option<&str> {
        self.named
            .iter()
            .find(|(name, _)| name == local)
            .and_then(|(_, exported)| self.module.exported_value(exported))
    }

    /// Returns true if `local` is the default style binding.
    pub fn is_placeholder(&self, local: &str) -> bool {
        self.placeholder.as_deref() == Some(local)
    }
}

/// Settings used to resolve imports.
pub struct ImportContext<'a> {
    /// Name of the component being converted.
    pub component_name: &'a str,
    /// Directory containing the component source.
    pub component_dir: &'a Utf8Path,
    /// Directory the output is written to.
    pub output_dir: &'a Utf8Path,
    /// Alias prefixes and the directories they stand for.
    pub aliases: &'a IndexMap<String, Utf8PathBuf>,
    /// Path rewrite rules; the first match applies.
    pub module_replacements: &'a [ModuleReplacement],
    /// Modules whose imports are dropped.
    pub excluded_modules: &'a [String],
    /// Path suffix identifying the style module.
    pub style_suffix: &'a str,
    /// Options for compiling the style module.
    pub style: &'a StyleOptions,
}

/// The result of processing the component's imports.
#[derive(Debug, Default)]
pub struct ImportOutcome {
    /// All imports in source order.
    pub records: Vec<ImportRecord>,
    /// The consumed style module, if any.
    pub style: Option<StyleImport>,
}

impl ImportOutcome {
    /// Emitted import statements in source order.
    pub fn kept(&self) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .filter(|r| r.kept)
            .map(|r| r.text.as_str())
    }
}

/// Processes every import declaration of `module`.
pub fn process_imports(
    module: &Module,
    source: &SourceText<'_>,
    cx: &ImportContext<'_>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<ImportOutcome, TransformError> {
    let mut outcome = ImportOutcome::default();

    for item in &module.body {
        let ModuleItem::ModuleDecl(ModuleDecl::Import(import)) = item else {
            continue;
        };
        let specifier = import.src.value.to_string_lossy().into_owned();
        let bindings = import_bindings(import);

        if is_excluded(&specifier, cx.excluded_modules) {
            tracing::trace!(specifier = %specifier, "dropping framework import");
            outcome.records.push(ImportRecord {
                source_path: specifier,
                bindings,
                kept: false,
                text: String::new(),
            });
            continue;
        }

        let rewritten = rewrite_path(&specifier, cx);

        if specifier.ends_with(cx.style_suffix)
            || rewritten.as_deref().is_some_and(|p| p.ends_with(cx.style_suffix))
        {
            if let Some(existing) = &outcome.style {
                return Err(TransformError::DuplicateStyleImport {
                    filename: cx.component_name.to_string(),
                    first: existing.specifier.clone(),
                    second: specifier,
                });
            }
            outcome.style = Some(load_style_import(&specifier, &bindings, import.span, cx)?);
            outcome.records.push(ImportRecord {
                source_path: rewritten.unwrap_or(specifier),
                bindings,
                kept: false,
                text: String::new(),
            });
            continue;
        }

        let text = match &rewritten {
            Some(path) => {
                check_rewritten_path(path, import, source, cx, diagnostics);
                import_text(import, source, path)
            }
            None => source.slice(import.span).to_string(),
        };

        outcome.records.push(ImportRecord {
            source_path: rewritten.unwrap_or(specifier),
            bindings,
            kept: true,
            text,
        });
    }

    Ok(outcome)
}

fn is_excluded(specifier: &str, excluded: &[String]) -> bool {
    excluded.iter().any(|module| {
        specifier == module
            || specifier
                .strip_prefix(module.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

/// Applies the replacement rules and alias resolution. Returns `None` when
/// neither step changed the path.
fn rewrite_path(specifier: &str, cx: &ImportContext<'_>) -> Option<String> {
    let mut path = specifier.to_string();
    let mut altered = false;

    if let Some(replaced) = cx
        .module_replacements
        .iter()
        .find_map(|rule| rule.apply(&path))
    {
        path = replaced;
        altered = true;
    }

    if let Some(resolved) = resolve_alias(&path, cx.aliases, cx.output_dir) {
        path = resolved;
        altered = true;
    }

    if altered {
        tracing::debug!(from = specifier, to = %path, "rewrote import path");
        Some(path)
    } else {
        None
    }
}

fn check_rewritten_path(
    path: &str,
    import: &ImportDecl,
    source: &SourceText<'_>,
    cx: &ImportContext<'_>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    // The output directory may not exist yet, so `..` is resolved lexically.
    let full = normalize_path(&cx.output_dir.join(path));
    let exists = IMPORT_PROBES
        .iter()
        .any(|suffix| Utf8PathBuf::from(format!("{full}{suffix}")).exists());
    if exists {
        return;
    }

    let (line, column) = source.position(import.src.span);
    tracing::warn!(component = cx.component_name, path = %full, "rewritten import does not resolve");
    diagnostics.push(Diagnostic::new(
        DiagnosticCode::UnresolvedImport,
        format!("\"{}\" won't be able to access \"{full}\"", cx.component_name),
        line,
        column,
    ));
}

/// The import statement with its module path replaced, keeping the quotes.
fn import_text(import: &ImportDecl, source: &SourceText<'_>, path: &str) -> String {
    let quote = source
        .slice(import.src.span)
        .chars()
        .next()
        .filter(|c| *c == '"' || *c == '\'')
        .unwrap_or('\'');

    let mut edits = EditSet::new();
    edits.replace(
        source.range(import.src.span),
        format!("{quote}{path}{quote}"),
    );
    edits.render(source.text(), source.range(import.span))
}

fn import_bindings(import: &ImportDecl) -> Vec<ImportBinding> {
    import
        .specifiers
        .iter()
        .map(|specifier| match specifier {
            ImportSpecifier::Default(default) => {
                ImportBinding::Default(default.local.sym.to_string())
            }
            ImportSpecifier::Namespace(namespace) => {
                ImportBinding::Namespace(namespace.local.sym.to_string())
            }
            ImportSpecifier::Named(named) => {
                let local = named.local.sym.to_string();
                let imported = match &named.imported {
                    Some(ModuleExportName::Ident(ident)) => ident.sym.to_string(),
                    Some(ModuleExportName::Str(value)) => value.value.to_string_lossy().into_owned(),
                    None => local.clone(),
                };
                ImportBinding::Named { local, imported }
            }
        })
        .collect()
}

fn load_style_import(
    specifier: &str,
    bindings: &[ImportBinding],
    span: Span,
    cx: &ImportContext<'_>,
) -> Result<StyleImport, TransformError> {
    let path = locate_style_module(specifier, cx)?;
    let text = std::fs::read_to_string(&path).map_err(|source| TransformError::StyleModuleRead {
        path: path.clone(),
        source,
    })?;

    let options = StyleOptions {
        filename: path.to_string(),
        ..cx.style.clone()
    };
    let module = StyleModule::parse(&text, path.as_str())?;
    let sheet = compile_module(&module, &options)?;

    let mut placeholder = None;
    let mut named = Vec::new();
    for binding in bindings {
        match binding {
            ImportBinding::Default(local) | ImportBinding::Namespace(local) => {
                placeholder = Some(local.clone());
            }
            ImportBinding::Named { local, imported } => {
                named.push((local.clone(), imported.clone()));
            }
        }
    }

    tracing::debug!(path = %path, rules = sheet.rules.len(), "loaded style module");

    Ok(StyleImport {
        specifier: specifier.to_string(),
        placeholder,
        named,
        module,
        sheet,
        span,
    })
}

fn locate_style_module(specifier: &str, cx: &ImportContext<'_>) -> Result<Utf8PathBuf, TransformError> {
    let base = if specifier.starts_with('.') {
        cx.component_dir.join(specifier)
    } else if let Some((target, rest)) = match_alias(specifier, cx.aliases) {
        if rest.is_empty() {
            target.to_path_buf()
        } else {
            target.join(rest)
        }
    } else {
        Utf8PathBuf::from(specifier)
    };

    STYLE_PROBES
        .iter()
        .map(|suffix| Utf8PathBuf::from(format!("{base}{suffix}")))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| TransformError::StyleModuleRead {
            path: base,
            source: io::Error::new(io::ErrorKind::NotFound, "no such style module"),
        })
}

/// Finds the first alias that is a whole leading segment of `path`.
///
/// Returns the alias target and the remainder after the alias segment.
pub fn match_alias<'a, 'p>(
    path: &'p str,
    aliases: &'a IndexMap<String, Utf8PathBuf>,
) -> Option<(&'a Utf8Path, &'p str)> {
    aliases.iter().find_map(|(alias, target)| {
        let rest = path.strip_prefix(alias.as_str())?;
        if rest.is_empty() {
            Some((target.as_path(), rest))
        } else {
            rest.strip_prefix('/').map(|rest| (target.as_path(), rest))
        }
    })
}

/// Resolves an aliased path to a path relative to `output_dir`.
///
/// The result always starts with `./` or `../`.
pub fn resolve_alias(
    path: &str,
    aliases: &IndexMap<String, Utf8PathBuf>,
    output_dir: &Utf8Path,
) -> Option<String> {
    let (target, rest) = match_alias(path, aliases)?;
    let absolute = if rest.is_empty() {
        target.to_path_buf()
    } else {
        target.join(rest)
    };

    let relative = relative_path(output_dir, &absolute);
    let relative = relative.as_str();
    Some(if relative.is_empty() {
        ".".to_string()
    } else if relative == ".." || relative.starts_with("../") || relative.starts_with("./") {
        relative.to_string()
    } else {
        format!("./{relative}")
    })
}

/// Lexically computes the path of `to` relative to the directory `from`.
pub fn relative_path(from: &Utf8Path, to: &Utf8Path) -> Utf8PathBuf {
    let from = normalized_components(from);
    let to = normalized_components(to);

    let common = from
        .iter()
        .zip(&to)
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = Utf8PathBuf::new();
    for _ in common..from.len() {
        relative.push("..");
    }
    for component in &to[common..] {
        relative.push(component.as_str());
    }
    relative
}

/// Lexically removes `.` and `..` components.
pub fn normalize_path(path: &Utf8Path) -> Utf8PathBuf {
    let mut parts: Vec<Utf8Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => match parts.last() {
                Some(Utf8Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Utf8Component::RootDir | Utf8Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    let normalized: Utf8PathBuf = parts.iter().map(|c| c.as_str()).collect();
    if normalized.as_str().is_empty() {
        Utf8PathBuf::from(".")
    } else {
        normalized
    }
}

fn normalized_components(path: &Utf8Path) -> Vec<Utf8Component<'_>> {
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                if matches!(components.last(), Some(Utf8Component::Normal(_))) {
                    components.pop();
                } else {
                    components.push(component);
                }
            }
            other => components.push(other),
        }
    }
    components
}

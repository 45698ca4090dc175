//! Configuration loading.
//!
//! A project is configured by `reactToSvelte.conf.js` or
//! `reactToSvelte.conf.json`. The JavaScript form is never executed: its
//! top-level constants and its `module.exports` (or `export default`) object
//! are evaluated statically. Supported expressions are literals (including
//! regex literals), template literals, `+` concatenation, arrays, objects,
//! `__dirname`, earlier constants and `path.resolve`/`path.join`.

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use react_transformer::{
    normalize_path, ModuleReplacement, TransformOptions, DEFAULT_EXCLUDED_MODULES,
};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::sync::Arc;
use style_compiler::StyleOptions;
use swc_common::{FileName, SourceMap, SourceMapper, Span, Spanned};
use swc_ecma_ast::{
    AssignOp, AssignTarget, BinaryOp, Callee, Decl, EsVersion, Expr, Lit, MemberProp, Module,
    ModuleDecl, ModuleItem, ObjectPatProp, Pat, Prop, PropName, PropOrSpread, SimpleAssignTarget,
    Stmt, VarDeclarator,
};
use swc_ecma_parser::{parse_file_as_module, EsSyntax, Syntax};
use thiserror::Error;

/// Config file names looked up in the working directory, in order.
pub const CONFIG_FILES: &[&str] = &["reactToSvelte.conf.js", "reactToSvelte.conf.json"];

/// Configuration errors. All of them are fatal and reported before any
/// component is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The given config file does not exist.
    #[error("config file not found: {path}")]
    NotFound { path: Utf8PathBuf },

    /// The config file could not be read.
    #[error("failed to read {path}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JavaScript or JSON.
    #[error("failed to parse {path}: {message}")]
    Parse { path: Utf8PathBuf, message: String },

    /// An expression the static evaluator does not understand.
    #[error("{path}:{line}: cannot evaluate `{expression}`")]
    Unsupported {
        path: Utf8PathBuf,
        line: usize,
        expression: String,
    },

    /// A reference to a name that was never declared.
    #[error("{path}:{line}: `{name}` is not defined")]
    Undefined {
        path: Utf8PathBuf,
        line: usize,
        name: String,
    },

    /// The module neither assigns `module.exports` nor has a default export.
    #[error("{path} does not export a configuration object")]
    NoExport { path: Utf8PathBuf },

    /// The exported object has the wrong shape.
    #[error("invalid configuration in {path}: {source}")]
    Invalid {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Neither `outputPath` nor `--output-dir` was given.
    #[error("no output directory: set `outputPath` in the config or pass --output-dir")]
    MissingOutputPath,

    /// A module replacement pattern does not compile.
    #[error("invalid regular expression `{pattern}`")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// The configuration as written, after static evaluation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    #[serde(default)]
    aliases: IndexMap<String, String>,
    #[serde(default)]
    module_replacements: Vec<RawReplacement>,
    output_path: Option<String>,
    excluded_modules: Option<Vec<String>>,
    style_suffix: Option<String>,
    root_class_export: Option<String>,
    strict_style_variables: Option<bool>,
    #[serde(default)]
    ignore: Vec<String>,
}

/// `[pattern, token, replacement]` or `[pattern, replacement]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawReplacement {
    Token(String, Option<String>, String),
    Whole(String, String),
}

/// Resolved project configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// The file the configuration was loaded from.
    pub source: Option<Utf8PathBuf>,
    /// Import prefixes mapped to absolute directories, in declaration order.
    pub aliases: IndexMap<String, Utf8PathBuf>,
    pub module_replacements: Vec<ModuleReplacement>,
    /// Where generated components are written.
    pub output_dir: Option<Utf8PathBuf>,
    pub excluded_modules: Vec<String>,
    pub style_suffix: String,
    pub style: StyleOptions,
    /// Extra discovery ignore globs.
    pub ignore: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: None,
            aliases: IndexMap::new(),
            module_replacements: Vec::new(),
            output_dir: None,
            excluded_modules: DEFAULT_EXCLUDED_MODULES
                .iter()
                .map(|m| m.to_string())
                .collect(),
            style_suffix: "styles".to_string(),
            style: StyleOptions::default(),
            ignore: Vec::new(),
        }
    }
}

impl Config {
    /// Finds the first config file in `dir`.
    pub fn find(dir: &Utf8Path) -> Option<Utf8PathBuf> {
        CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Loads a JavaScript or JSON config file. `path` must be absolute for
    /// relative paths in the config to resolve against its directory.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound {
                path: path.to_owned(),
            });
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;

        let value = if path.extension() == Some("json") {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.to_owned(),
                message: e.to_string(),
            })?
        } else {
            evaluate_js(&content, path)?
        };

        let raw: RawConfig = serde_json::from_value(value).map_err(|source| ConfigError::Invalid {
            path: path.to_owned(),
            source,
        })?;

        let dir = path.parent().unwrap_or(Utf8Path::new("."));
        let mut config = Self::from_raw(raw, dir)?;
        config.source = Some(path.to_owned());
        tracing::debug!(
            path = %path,
            aliases = config.aliases.len(),
            replacements = config.module_replacements.len(),
            "loaded config"
        );
        Ok(config)
    }

    fn from_raw(raw: RawConfig, dir: &Utf8Path) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let aliases = raw
            .aliases
            .into_iter()
            .map(|(alias, target)| (alias, resolve_in(dir, &target)))
            .collect();

        let module_replacements = raw
            .module_replacements
            .into_iter()
            .map(|replacement| match replacement {
                RawReplacement::Token(pattern, token, replacement) => Ok(ModuleReplacement::new(
                    compile_regex(&pattern)?,
                    token.as_deref().map(compile_regex).transpose()?,
                    replacement,
                )),
                RawReplacement::Whole(pattern, replacement) => Ok(ModuleReplacement::new(
                    compile_regex(&pattern)?,
                    None,
                    replacement,
                )),
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self {
            source: None,
            aliases,
            module_replacements,
            output_dir: raw.output_path.map(|path| resolve_in(dir, &path)),
            excluded_modules: raw.excluded_modules.unwrap_or(defaults.excluded_modules),
            style_suffix: raw.style_suffix.unwrap_or(defaults.style_suffix),
            style: StyleOptions {
                root_class_export: raw
                    .root_class_export
                    .unwrap_or(defaults.style.root_class_export),
                strict_variables: raw
                    .strict_style_variables
                    .unwrap_or(defaults.style.strict_variables),
                ..defaults.style
            },
            ignore: raw.ignore,
        })
    }

    /// Transformation options for one component.
    pub fn transform_options(&self, filename: &Utf8Path, output_dir: &Utf8Path) -> TransformOptions {
        TransformOptions {
            filename: filename.to_owned(),
            output_dir: output_dir.to_owned(),
            aliases: self.aliases.clone(),
            module_replacements: self.module_replacements.clone(),
            excluded_modules: self.excluded_modules.clone(),
            style_suffix: self.style_suffix.clone(),
            style: self.style.clone(),
        }
    }
}

fn compile_regex(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidRegex {
        pattern: pattern.to_string(),
        source,
    })
}

/// Resolves `path` against `dir` unless it is absolute.
fn resolve_in(dir: &Utf8Path, path: &str) -> Utf8PathBuf {
    normalize_path(&dir.join(path))
}

/// Translates JavaScript regex flags into inline flags.
fn regex_source(pattern: &str, flags: &str) -> String {
    let inline: String = flags.chars().filter(|f| matches!(f, 'i' | 'm' | 's')).collect();
    if inline.is_empty() {
        pattern.to_string()
    } else {
        format!("(?{inline}){pattern}")
    }
}

/// A statically evaluated JavaScript value.
#[derive(Debug, Clone, PartialEq)]
enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Regex { pattern: String, flags: String },
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
    PathModule,
    PathFunction(PathFunction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathFunction {
    Resolve,
    Join,
}

impl Value {
    fn member(&self, name: &str) -> Option<Value> {
        match (self, name) {
            (Value::PathModule, "resolve") => Some(Value::PathFunction(PathFunction::Resolve)),
            (Value::PathModule, "join") => Some(Value::PathFunction(PathFunction::Join)),
            (Value::Object(entries), _) => entries.get(name).cloned(),
            _ => None,
        }
    }

    fn into_json(self) -> serde_json::Value {
        match self {
            Value::Null | Value::PathModule | Value::PathFunction(_) => serde_json::Value::Null,
            Value::Bool(value) => serde_json::Value::Bool(value),
            Value::Number(value) => serde_json::Number::from_f64(value)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::String(value) => serde_json::Value::String(value),
            Value::Regex { pattern, flags } => {
                serde_json::Value::String(regex_source(&pattern, &flags))
            }
            Value::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(Value::into_json).collect())
            }
            Value::Object(entries) => serde_json::Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, value.into_json()))
                    .collect(),
            ),
        }
    }
}

/// A top-level binding. Declarations that cannot be evaluated only fail
/// when the exported object refers to them.
enum Binding {
    Value(Value),
    Opaque { line: usize, expression: String },
}

fn evaluate_js(source: &str, path: &Utf8Path) -> Result<serde_json::Value, ConfigError> {
    let cm: Arc<SourceMap> = Default::default();
    let fm = cm.new_source_file(
        FileName::Custom(path.to_string()).into(),
        source.to_string(),
    );
    let module = parse_file_as_module(
        &fm,
        Syntax::Es(EsSyntax::default()),
        EsVersion::Es2022,
        None,
        &mut Vec::new(),
    )
    .map_err(|e| ConfigError::Parse {
        path: path.to_owned(),
        message: format!("{:?}", e),
    })?;

    let mut evaluator = Evaluator {
        path,
        dir: path.parent().unwrap_or(Utf8Path::new(".")).to_owned(),
        cm: &cm,
        bindings: HashMap::new(),
    };
    evaluator.module(&module).map(Value::into_json)
}

struct Evaluator<'a> {
    path: &'a Utf8Path,
    dir: Utf8PathBuf,
    cm: &'a SourceMap,
    bindings: HashMap<String, Binding>,
}

impl Evaluator<'_> {
    fn module(&mut self, module: &Module) -> Result<Value, ConfigError> {
        let mut exported = None;
        for item in &module.body {
            match item {
                ModuleItem::Stmt(Stmt::Decl(Decl::Var(var))) => {
                    for declarator in &var.decls {
                        self.declare(declarator);
                    }
                }
                ModuleItem::Stmt(Stmt::Expr(stmt)) => {
                    if let Some(value) = self.module_exports(&stmt.expr)? {
                        exported = Some(value);
                    }
                }
                ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultExpr(export)) => {
                    exported = Some(self.evaluate(&export.expr)?);
                }
                _ => tracing::trace!("skipping config statement"),
            }
        }
        exported.ok_or_else(|| ConfigError::NoExport {
            path: self.path.to_owned(),
        })
    }

    /// Evaluates `module.exports = value`.
    fn module_exports(&mut self, expr: &Expr) -> Result<Option<Value>, ConfigError> {
        let Expr::Assign(assign) = expr else {
            return Ok(None);
        };
        let AssignTarget::Simple(SimpleAssignTarget::Member(member)) = &assign.left else {
            return Ok(None);
        };
        let is_module = matches!(&*member.obj, Expr::Ident(ident) if ident.sym.as_str() == "module");
        let is_exports = matches!(&member.prop, MemberProp::Ident(prop) if prop.sym.as_str() == "exports");
        if assign.op != AssignOp::Assign || !is_module || !is_exports {
            return Ok(None);
        }
        self.evaluate(&assign.right).map(Some)
    }

    fn declare(&mut self, declarator: &VarDeclarator) {
        let Some(init) = declarator.init.as_deref() else {
            return;
        };
        let value = self.evaluate(init);

        match &declarator.name {
            Pat::Ident(binding) => {
                let binding_value = match value {
                    Ok(value) => Binding::Value(value),
                    Err(_) => self.opaque(init.span()),
                };
                self.bindings
                    .insert(binding.id.sym.to_string(), binding_value);
            }
            Pat::Object(pattern) => {
                for prop in &pattern.props {
                    let (key, local) = match prop {
                        ObjectPatProp::Assign(assign) => {
                            (assign.key.id.sym.to_string(), assign.key.id.sym.to_string())
                        }
                        ObjectPatProp::KeyValue(key_value) => {
                            let Pat::Ident(local) = &*key_value.value else {
                                continue;
                            };
                            let Some(key) = prop_key(&key_value.key) else {
                                continue;
                            };
                            (key, local.id.sym.to_string())
                        }
                        ObjectPatProp::Rest(_) => continue,
                    };
                    let member = value.as_ref().ok().and_then(|value| value.member(&key));
                    let binding = match member {
                        Some(member) => Binding::Value(member),
                        None => self.opaque(prop.span()),
                    };
                    self.bindings.insert(local, binding);
                }
            }
            other => tracing::trace!(span = ?other.span(), "skipping config binding"),
        }
    }

    fn opaque(&self, span: Span) -> Binding {
        Binding::Opaque {
            line: self.line(span),
            expression: self.snippet(span),
        }
    }

    fn line(&self, span: Span) -> usize {
        self.cm.lookup_char_pos(span.lo).line
    }

    fn snippet(&self, span: Span) -> String {
        self.cm.span_to_snippet(span).unwrap_or_default()
    }

    fn unsupported(&self, span: Span) -> ConfigError {
        ConfigError::Unsupported {
            path: self.path.to_owned(),
            line: self.line(span),
            expression: self.snippet(span),
        }
    }

    fn evaluate(&self, expr: &Expr) -> Result<Value, ConfigError> {
        match expr {
            Expr::Paren(paren) => self.evaluate(&paren.expr),
            Expr::Lit(Lit::Str(value)) => Ok(Value::String(value.value.to_string_lossy().into_owned())),
            Expr::Lit(Lit::Num(value)) => Ok(Value::Number(value.value)),
            Expr::Lit(Lit::Bool(value)) => Ok(Value::Bool(value.value)),
            Expr::Lit(Lit::Null(_)) => Ok(Value::Null),
            Expr::Lit(Lit::Regex(regex)) => Ok(Value::Regex {
                pattern: regex.exp.to_string(),
                flags: regex.flags.to_string(),
            }),
            Expr::Tpl(tpl) => {
                let mut text = String::new();
                for (i, quasi) in tpl.quasis.iter().enumerate() {
                    text.push_str(&quasi.raw);
                    if let Some(expr) = tpl.exprs.get(i) {
                        let value = self.evaluate(expr)?;
                        text.push_str(&self.text(value, expr.span())?);
                    }
                }
                Ok(Value::String(text))
            }
            Expr::Ident(ident) => match ident.sym.as_str() {
                "__dirname" => Ok(Value::String(self.dir.to_string())),
                "undefined" => Ok(Value::Null),
                name => match self.bindings.get(name) {
                    Some(Binding::Value(value)) => Ok(value.clone()),
                    Some(Binding::Opaque { line, expression }) => Err(ConfigError::Unsupported {
                        path: self.path.to_owned(),
                        line: *line,
                        expression: expression.clone(),
                    }),
                    None => Err(ConfigError::Undefined {
                        path: self.path.to_owned(),
                        line: self.line(ident.span),
                        name: name.to_string(),
                    }),
                },
            },
            Expr::Bin(bin) if bin.op == BinaryOp::Add => {
                match (self.evaluate(&bin.left)?, self.evaluate(&bin.right)?) {
                    (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                    (left, right) => Ok(Value::String(format!(
                        "{}{}",
                        self.text(left, bin.left.span())?,
                        self.text(right, bin.right.span())?
                    ))),
                }
            }
            Expr::Array(array) => {
                let mut items = Vec::with_capacity(array.elems.len());
                for element in &array.elems {
                    let Some(element) = element else {
                        items.push(Value::Null);
                        continue;
                    };
                    let value = self.evaluate(&element.expr)?;
                    match (element.spread, value) {
                        (None, value) => items.push(value),
                        (Some(_), Value::Array(spread)) => items.extend(spread),
                        (Some(_), _) => return Err(self.unsupported(element.expr.span())),
                    }
                }
                Ok(Value::Array(items))
            }
            Expr::Object(object) => {
                let mut entries = IndexMap::new();
                for prop in &object.props {
                    match prop {
                        PropOrSpread::Spread(spread) => match self.evaluate(&spread.expr)? {
                            Value::Object(spread) => entries.extend(spread),
                            _ => return Err(self.unsupported(spread.expr.span())),
                        },
                        PropOrSpread::Prop(prop) => match &**prop {
                            Prop::KeyValue(key_value) => {
                                let key = prop_key(&key_value.key)
                                    .ok_or_else(|| self.unsupported(key_value.key.span()))?;
                                entries.insert(key, self.evaluate(&key_value.value)?);
                            }
                            Prop::Shorthand(ident) => {
                                let value = self.evaluate(&Expr::Ident(ident.clone()))?;
                                entries.insert(ident.sym.to_string(), value);
                            }
                            other => return Err(self.unsupported(other.span())),
                        },
                    }
                }
                Ok(Value::Object(entries))
            }
            Expr::Member(member) => {
                let object = self.evaluate(&member.obj)?;
                let name = match &member.prop {
                    MemberProp::Ident(name) => name.sym.to_string(),
                    MemberProp::Computed(computed) => match self.evaluate(&computed.expr)? {
                        Value::String(name) => name,
                        _ => return Err(self.unsupported(member.span)),
                    },
                    MemberProp::PrivateName(_) => return Err(self.unsupported(member.span)),
                };
                object
                    .member(&name)
                    .ok_or_else(|| self.unsupported(member.span))
            }
            Expr::Call(call) => {
                let Callee::Expr(callee) = &call.callee else {
                    return Err(self.unsupported(call.span));
                };
                if matches!(&**callee, Expr::Ident(ident) if ident.sym.as_str() == "require") {
                    return match call.args.first().map(|arg| self.evaluate(&arg.expr)) {
                        Some(Ok(Value::String(module))) if module == "path" || module == "node:path" => {
                            Ok(Value::PathModule)
                        }
                        _ => Err(self.unsupported(call.span)),
                    };
                }

                let Value::PathFunction(function) = self.evaluate(callee)? else {
                    return Err(self.unsupported(call.span));
                };
                let mut segments = Vec::with_capacity(call.args.len());
                for arg in &call.args {
                    if arg.spread.is_some() {
                        return Err(self.unsupported(call.span));
                    }
                    let value = self.evaluate(&arg.expr)?;
                    segments.push(self.text(value, arg.expr.span())?);
                }
                Ok(Value::String(self.apply(function, &segments).to_string()))
            }
            _ => Err(self.unsupported(expr.span())),
        }
    }

    /// `path.resolve` resolves against the config file's directory.
    fn apply(&self, function: PathFunction, segments: &[String]) -> Utf8PathBuf {
        let mut path = match function {
            PathFunction::Resolve => self.dir.clone(),
            PathFunction::Join => Utf8PathBuf::new(),
        };
        for (i, segment) in segments.iter().enumerate() {
            match function {
                PathFunction::Join if i > 0 => path.push(segment.trim_start_matches('/')),
                _ => path.push(segment),
            }
        }
        normalize_path(&path)
    }

    fn text(&self, value: Value, span: Span) -> Result<String, ConfigError> {
        match value {
            Value::String(text) => Ok(text),
            Value::Number(number) if number.fract() == 0.0 => Ok(format!("{}", number as i64)),
            Value::Number(number) => Ok(number.to_string()),
            Value::Bool(value) => Ok(value.to_string()),
            Value::Null => Ok("null".to_string()),
            _ => Err(self.unsupported(span)),
        }
    }
}

fn prop_key(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(value) => Some(value.value.to_string_lossy().into_owned()),
        PropName::Num(value) => Some(value.value.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write_config(name: &str, content: &str) -> (TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        fs::create_dir_all(root.join("config")).unwrap();
        let path = root.join("config").join(name);
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_js_config() {
        let (_dir, path) = write_config(
            "reactToSvelte.conf.js",
            r#"
const { resolve } = require('path');

const ROOT = resolve(__dirname, '../');
const COMPONENTS = `${ROOT}/react/components`;

module.exports = {
  aliases: {
    COMPONENTS,
    ROOT,
    UTILS: `${ROOT}/utils`,
  },
  moduleReplacements: [
    [/conf\.app$/, /conf\.app$/, 'constants'],
    [/fetch$/, /.*/, '../utils/fetch'],
  ],
  outputPath: COMPONENTS,
};
"#,
        );
        let root = path.parent().unwrap().parent().unwrap().to_owned();

        let config = Config::load(&path).unwrap();
        let aliases: Vec<(&str, Utf8PathBuf)> = config
            .aliases
            .iter()
            .map(|(alias, target)| (alias.as_str(), target.clone()))
            .collect();
        assert_eq!(
            aliases,
            vec![
                ("COMPONENTS", root.join("react/components")),
                ("ROOT", root.clone()),
                ("UTILS", root.join("utils")),
            ]
        );
        assert_eq!(config.output_dir, Some(root.join("react/components")));
        assert_eq!(config.module_replacements.len(), 2);
        assert_eq!(
            config.module_replacements[0].apply("ROOT/conf.app").as_deref(),
            Some("ROOT/constants")
        );
        assert_eq!(
            config.module_replacements[1].apply("UTILS/fetch").as_deref(),
            Some("../utils/fetch")
        );
        assert_eq!(config.style_suffix, "styles");
        assert_eq!(config.source.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_js_config_options() {
        let (_dir, path) = write_config(
            "reactToSvelte.conf.js",
            r#"
const path = require('node:path');
const helper = makeSomething();

export default {
  outputPath: path.join(__dirname, 'out'),
  excludedModules: ['react', 'classnames'],
  styleSuffix: '.styles',
  rootClassExport: 'BLOCK',
  strictStyleVariables: false,
  ignore: ['**/legacy/**'],
  moduleReplacements: [[/^lodash$/i, 'lodash-es']],
};
"#,
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.output_dir, Some(path.parent().unwrap().join("out")));
        assert_eq!(config.excluded_modules, vec!["react", "classnames"]);
        assert_eq!(config.style_suffix, ".styles");
        assert_eq!(config.style.root_class_export, "BLOCK");
        assert!(!config.style.strict_variables);
        assert_eq!(config.ignore, vec!["**/legacy/**"]);
        assert_eq!(
            config.module_replacements[0].apply("LODASH").as_deref(),
            Some("lodash-es")
        );
    }

    #[test]
    fn test_json_config() {
        let (_dir, path) = write_config(
            "reactToSvelte.conf.json",
            r#"{
  "aliases": { "UTILS": "../utils" },
  "moduleReplacements": [["fetch$", null, "./fetch"]],
  "outputPath": "./svelte"
}"#,
        );
        let config_dir = path.parent().unwrap();
        let root = config_dir.parent().unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.aliases["UTILS"], root.join("utils"));
        assert_eq!(config.output_dir, Some(config_dir.join("svelte")));
        assert_eq!(
            config.module_replacements[0].apply("api/fetch").as_deref(),
            Some("./fetch")
        );
    }

    #[test]
    fn test_config_errors() {
        let (_dir, path) = write_config(
            "reactToSvelte.conf.js",
            "module.exports = {\n  outputPath: MISSING,\n};\n",
        );
        match Config::load(&path).unwrap_err() {
            ConfigError::Undefined { name, line, .. } => {
                assert_eq!(name, "MISSING");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }

        let (_dir, path) = write_config(
            "reactToSvelte.conf.js",
            "const out = compute();\nmodule.exports = { outputPath: out };\n",
        );
        match Config::load(&path).unwrap_err() {
            ConfigError::Unsupported { expression, line, .. } => {
                assert_eq!(expression, "compute()");
                assert_eq!(line, 1);
            }
            other => panic!("unexpected error: {other}"),
        }

        let (_dir, path) = write_config(
            "reactToSvelte.conf.js",
            "module.exports = { moduleReplacements: [['(', 'x']] };\n",
        );
        assert!(matches!(
            Config::load(&path).unwrap_err(),
            ConfigError::InvalidRegex { .. }
        ));

        let (_dir, path) = write_config("reactToSvelte.conf.js", "const a = 1;\n");
        assert!(matches!(
            Config::load(&path).unwrap_err(),
            ConfigError::NoExport { .. }
        ));

        assert!(matches!(
            Config::load(Utf8Path::new("/nonexistent/reactToSvelte.conf.js")).unwrap_err(),
            ConfigError::NotFound { .. }
        ));
    }

    #[test]
    fn test_path_functions() {
        let (_dir, path) = write_config(
            "reactToSvelte.conf.js",
            r#"
const { join, resolve } = require('path');

module.exports = {
  aliases: {
    ABS: join(__dirname, '/lib', 'utils'),
    REL: join('shared', '../common'),
    UP: resolve('..', 'src'),
    ROOT: resolve('/srv', 'app'),
  },
};
"#,
        );
        let config_dir = path.parent().unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.aliases["ABS"], config_dir.join("lib/utils"));
        assert_eq!(config.aliases["REL"], config_dir.join("common"));
        assert_eq!(config.aliases["UP"], config_dir.parent().unwrap().join("src"));
        assert_eq!(config.aliases["ROOT"], Utf8PathBuf::from("/srv/app"));
    }

    #[test]
    fn test_regex_source() {
        assert_eq!(regex_source("^a$", "gi"), "(?i)^a$");
        assert_eq!(regex_source("fetch$", ""), "fetch$");
    }
}

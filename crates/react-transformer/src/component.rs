//! Component discovery and conversion.
//!
//! The component is the default export when it names or defines a class or
//! function, else the first class with a `render` method or the first function
//! returning JSX. Class members, constructor statements, hooks and render-body
//! statements are sorted into the [`Context`] sections; anything without a
//! confident translation lands in a manual-review block.

use rustc_hash::FxHashSet;
use swc_common::{BytePos, Spanned};
use swc_ecma_ast::{
    ArrowExpr, AssignOp, AssignTarget, BlockStmt, BlockStmtOrExpr, Callee, Class, ClassMember,
    ClassMethod, ClassProp, Constructor, Decl, DefaultDecl, Expr, ExprStmt, Function, MethodKind,
    Module, ModuleDecl, ModuleItem, ObjectLit, Pat, Prop, PropOrSpread, SimpleAssignTarget, Stmt,
    VarDecl,
};

use crate::script::{
    callee_member, contains_jsx, hook_name, is_literal, member_prop_name, prop_name,
    this_member_name, unwrap_parens, Context,
};
use crate::source::{reindent, tidy_blank_lines};

/// Lifecycle methods without a direct Svelte counterpart.
const UNSUPPORTED_LIFECYCLE: &[&str] = &[
    "componentDidUpdate",
    "componentDidCatch",
    "componentWillMount",
    "componentWillReceiveProps",
    "componentWillUpdate",
    "getSnapshotBeforeUpdate",
    "shouldComponentUpdate",
    "UNSAFE_componentWillMount",
    "UNSAFE_componentWillReceiveProps",
    "UNSAFE_componentWillUpdate",
];

/// Class fields that carry metadata only.
const IGNORED_STATICS: &[&str] = &["propTypes", "displayName", "contextType"];

/// The body of a function component.
#[derive(Clone, Copy)]
pub(crate) enum FunctionBody<'m> {
    Block(&'m BlockStmt),
    Expr(&'m Expr),
}

/// A function component.
pub(crate) struct FunctionSource<'m> {
    params: Vec<&'m Pat>,
    body: FunctionBody<'m>,
}

impl<'m> FunctionSource<'m> {
    fn from_function(function: &'m Function) -> Option<Self> {
        Some(Self {
            params: function.params.iter().map(|param| &param.pat).collect(),
            body: FunctionBody::Block(function.body.as_ref()?),
        })
    }

    fn from_arrow(arrow: &'m ArrowExpr) -> Self {
        Self {
            params: arrow.params.iter().collect(),
            body: match &*arrow.body {
                BlockStmtOrExpr::BlockStmt(block) => FunctionBody::Block(block),
                BlockStmtOrExpr::Expr(expr) => FunctionBody::Expr(expr),
            },
        }
    }

    fn returns_jsx(&self) -> bool {
        match self.body {
            FunctionBody::Expr(expr) => contains_jsx(expr),
            FunctionBody::Block(block) => block.stmts.iter().any(|stmt| match stmt {
                Stmt::Return(ret) => ret.arg.as_deref().is_some_and(|arg| contains_jsx(arg)),
                _ => false,
            }),
        }
    }
}

/// A class or function component.
pub(crate) enum ComponentSource<'m> {
    Class(&'m Class),
    Function(FunctionSource<'m>),
}

impl ComponentSource<'_> {
    fn looks_like_component(&self) -> bool {
        match self {
            ComponentSource::Class(class) => class.body.iter().any(|member| {
                matches!(member, ClassMember::Method(method)
                    if prop_name(&method.key).as_deref() == Some("render"))
            }),
            ComponentSource::Function(function) => function.returns_jsx(),
        }
    }
}

/// The component found in a module.
pub(crate) struct LocatedComponent<'m> {
    /// The declared name, if the component is not anonymous.
    pub name: Option<String>,
    pub source: ComponentSource<'m>,
    /// Indices of module items that belong to the component.
    pub items: FxHashSet<usize>,
}

enum ExportedComponent<'m> {
    Name(String),
    Inline(ComponentSource<'m>),
}

/// Finds the component of a module.
pub(crate) fn locate_component(module: &Module) -> Option<LocatedComponent<'_>> {
    let mut default_export = None;

    for (index, item) in module.body.iter().enumerate() {
        let ModuleItem::ModuleDecl(decl) = item else {
            continue;
        };
        let exported = match decl {
            ModuleDecl::ExportDefaultDecl(export) => match &export.decl {
                DefaultDecl::Class(class) => Some((
                    class.ident.as_ref().map(|ident| ident.sym.to_string()),
                    ExportedComponent::Inline(ComponentSource::Class(&class.class)),
                )),
                DefaultDecl::Fn(function) => FunctionSource::from_function(&function.function)
                    .map(|source| {
                        (
                            function.ident.as_ref().map(|ident| ident.sym.to_string()),
                            ExportedComponent::Inline(ComponentSource::Function(source)),
                        )
                    }),
                DefaultDecl::TsInterfaceDecl(_) => None,
            },
            ModuleDecl::ExportDefaultExpr(export) => {
                exported_component(&export.expr).map(|component| (None, component))
            }
            _ => None,
        };

        match exported {
            Some((name, ExportedComponent::Inline(source))) => {
                return Some(LocatedComponent {
                    name,
                    source,
                    items: FxHashSet::from_iter([index]),
                });
            }
            Some((_, ExportedComponent::Name(name))) => default_export = Some((index, name)),
            None => {}
        }
    }

    if let Some((export_index, name)) = default_export {
        let found = module.body.iter().enumerate().find_map(|(index, item)| {
            item_components(item)
                .into_iter()
                .find(|(declared, _)| *declared == name)
                .map(|(_, source)| (index, source))
        });
        if let Some((index, source)) = found {
            return Some(LocatedComponent {
                name: Some(name),
                source,
                items: FxHashSet::from_iter([index, export_index]),
            });
        }
    }

    module.body.iter().enumerate().find_map(|(index, item)| {
        item_components(item)
            .into_iter()
            .find(|(_, source)| source.looks_like_component())
            .map(|(name, source)| LocatedComponent {
                name: Some(name),
                source,
                items: FxHashSet::from_iter([index]),
            })
    })
}

/// Unwraps wrapper calls such as `memo(Component)` down to the component.
fn exported_component(expr: &Expr) -> Option<ExportedComponent<'_>> {
    match unwrap_parens(expr) {
        Expr::Ident(ident) => Some(ExportedComponent::Name(ident.sym.to_string())),
        Expr::Arrow(arrow) => Some(ExportedComponent::Inline(ComponentSource::Function(
            FunctionSource::from_arrow(arrow),
        ))),
        Expr::Fn(function) => FunctionSource::from_function(&function.function)
            .map(|source| ExportedComponent::Inline(ComponentSource::Function(source))),
        Expr::Class(class) => Some(ExportedComponent::Inline(ComponentSource::Class(&class.class))),
        Expr::Call(call) => call
            .args
            .first()
            .and_then(|arg| exported_component(&arg.expr)),
        _ => None,
    }
}

/// Classes and functions declared by one module item.
fn item_components(item: &ModuleItem) -> Vec<(String, ComponentSource<'_>)> {
    let decl = match item {
        ModuleItem::Stmt(Stmt::Decl(decl)) => decl,
        ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => &export.decl,
        _ => return Vec::new(),
    };

    match decl {
        Decl::Class(class) => vec![(class.ident.sym.to_string(), ComponentSource::Class(&class.class))],
        Decl::Fn(function) => FunctionSource::from_function(&function.function)
            .map(|source| (function.ident.sym.to_string(), ComponentSource::Function(source)))
            .into_iter()
            .collect(),
        Decl::Var(var) => var
            .decls
            .iter()
            .filter_map(|declarator| {
                let Pat::Ident(binding) = &declarator.name else {
                    return None;
                };
                match exported_component(declarator.init.as_deref()?)? {
                    ExportedComponent::Inline(source) => Some((binding.id.sym.to_string(), source)),
                    ExportedComponent::Name(_) => None,
                }
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Consumes `Component.defaultProps = {...}` and similar static assignments.
pub(crate) fn convert_statics(cx: &mut Context<'_>, module: &Module, component: &mut LocatedComponent<'_>) {
    let Some(name) = component.name.clone() else {
        return;
    };

    for (index, item) in module.body.iter().enumerate() {
        let ModuleItem::Stmt(Stmt::Expr(stmt)) = item else {
            continue;
        };
        let Expr::Assign(assign) = unwrap_parens(&stmt.expr) else {
            continue;
        };
        let AssignTarget::Simple(SimpleAssignTarget::Member(member)) = &assign.left else {
            continue;
        };
        let Expr::Ident(object) = unwrap_parens(&member.obj) else {
            continue;
        };
        if object.sym.as_str() != name || assign.op != AssignOp::Assign {
            continue;
        }

        match member_prop_name(member) {
            Some("defaultProps") => match unwrap_parens(&assign.right) {
                Expr::Object(defaults) => register_default_props(cx, defaults),
                _ => continue,
            },
            Some(prop) if IGNORED_STATICS.contains(&prop) => {}
            _ => continue,
        }
        component.items.insert(index);
    }
}

/// Keeps top-level code other than imports and the component, with `export`
/// keywords stripped.
pub(crate) fn convert_module_code(cx: &mut Context<'_>, module: &Module, component: &LocatedComponent<'_>) {
    for (index, item) in module.body.iter().enumerate() {
        if component.items.contains(&index) {
            continue;
        }
        match item {
            ModuleItem::ModuleDecl(ModuleDecl::Import(_)) => {}
            ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => {
                let code = cx.render_dedented(&export.decl);
                cx.module_code.push(code);
            }
            ModuleItem::ModuleDecl(ModuleDecl::ExportNamed(_) | ModuleDecl::ExportAll(_)) => {
                tracing::debug!("dropping re-export");
            }
            ModuleItem::ModuleDecl(other) => {
                let code = cx.render_dedented(other);
                cx.manual_review("module export", code, other.span());
            }
            ModuleItem::Stmt(stmt) => {
                let code = cx.render_dedented(stmt);
                cx.module_code.push(code);
            }
        }
    }
}

/// Converts the component and returns the expression its markup comes from.
pub(crate) fn convert_component<'m>(cx: &mut Context<'_>, component: &ComponentSource<'m>) -> Option<&'m Expr> {
    match component {
        ComponentSource::Class(class) => convert_class(cx, class),
        ComponentSource::Function(function) => convert_function(cx, function),
    }
}

fn convert_class<'m>(cx: &mut Context<'_>, class: &'m Class) -> Option<&'m Expr> {
    collect_class_scope(cx, class);

    let mut markup = None;
    for member in &class.body {
        match member {
            ClassMember::Constructor(constructor) => convert_constructor(cx, constructor),
            ClassMember::ClassProp(prop) => convert_class_field(cx, prop),
            ClassMember::Method(method) => {
                if let Some(root) = convert_method(cx, method) {
                    markup = Some(root);
                }
            }
            ClassMember::Empty(_) => {}
            other => {
                let code = cx.render_dedented(other);
                cx.manual_review("class member", code, other.span());
            }
        }
    }
    markup
}

/// Records methods and element refs before any member is rendered, so that
/// `this.x` resolves the same way wherever it appears.
fn collect_class_scope(cx: &mut Context<'_>, class: &Class) {
    for member in &class.body {
        match member {
            ClassMember::Method(method) if !method.is_static => {
                if let Some(name) = prop_name(&method.key) {
                    cx.scope.methods.insert(name);
                }
            }
            ClassMember::ClassProp(prop) if !prop.is_static => {
                let Some(name) = prop_name(&prop.key) else {
                    continue;
                };
                match prop.value.as_deref().map(unwrap_parens) {
                    Some(Expr::Arrow(_) | Expr::Fn(_)) => {
                        cx.scope.methods.insert(name);
                    }
                    Some(Expr::Call(call)) if hook_name(call) == Some("createRef") => {
                        cx.symbols.add_ref(&name);
                    }
                    _ => {}
                }
            }
            ClassMember::Constructor(constructor) => {
                let stmts = constructor.body.iter().flat_map(|body| &body.stmts);
                for stmt in stmts {
                    if let Some((name, Expr::Call(call))) = this_assignment(stmt)
                        .map(|(name, value)| (name, unwrap_parens(value)))
                    {
                        if hook_name(call) == Some("createRef") {
                            cx.symbols.add_ref(name);
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

/// Matches `this.name = value;`.
fn this_assignment(stmt: &Stmt) -> Option<(&str, &Expr)> {
    let Stmt::Expr(ExprStmt { expr, .. }) = stmt else {
        return None;
    };
    let Expr::Assign(assign) = unwrap_parens(expr) else {
        return None;
    };
    if assign.op != AssignOp::Assign {
        return None;
    }
    let AssignTarget::Simple(SimpleAssignTarget::Member(member)) = &assign.left else {
        return None;
    };
    Some((this_member_name(member)?, &*assign.right))
}

fn is_super_call(stmt: &Stmt) -> bool {
    matches!(stmt, Stmt::Expr(ExprStmt { expr, .. })
        if matches!(unwrap_parens(expr), Expr::Call(call) if matches!(call.callee, Callee::Super(_))))
}

fn convert_constructor(cx: &mut Context<'_>, constructor: &Constructor) {
    let Some(body) = &constructor.body else {
        return;
    };

    let mut leftovers = Vec::new();
    for stmt in &body.stmts {
        if is_super_call(stmt) {
            continue;
        }
        if let Some((name, value)) = this_assignment(stmt) {
            let consumed = match unwrap_parens(value) {
                Expr::Object(object) if name == "state" => register_initial_state(cx, object),
                Expr::Call(call) if hook_name(call) == Some("createRef") => true,
                Expr::Call(call)
                    if callee_member(call).is_some_and(|m| member_prop_name(m) == Some("bind")) =>
                {
                    true
                }
                _ if name != "state" => {
                    let initial = cx.render(value);
                    cx.symbols.add_state(name, Some(initial));
                    true
                }
                _ => false,
            };
            if consumed {
                continue;
            }
        }
        leftovers.push(stmt);
    }

    if let Some(first) = leftovers.first() {
        let span = first.span();
        let code = leftovers
            .iter()
            .map(|stmt| cx.render_dedented(*stmt))
            .collect::<Vec<_>>()
            .join("\n");
        cx.manual_review("constructor", code, span);
    }
}

/// Registers the entries of an initial state object. Returns false without
/// registering anything when the object has entries other than plain keys.
fn register_initial_state(cx: &mut Context<'_>, object: &ObjectLit) -> bool {
    let plain = object.props.iter().all(|prop| {
        matches!(prop, PropOrSpread::Prop(prop)
            if matches!(&**prop, Prop::Shorthand(_))
                || matches!(&**prop, Prop::KeyValue(kv) if prop_name(&kv.key).is_some()))
    });
    if !plain {
        return false;
    }

    for prop in &object.props {
        let PropOrSpread::Prop(prop) = prop else {
            continue;
        };
        match &**prop {
            Prop::KeyValue(key_value) => {
                if let Some(name) = prop_name(&key_value.key) {
                    let initial = cx.render(&*key_value.value);
                    cx.symbols.add_constructor_state(&name, Some(initial));
                }
            }
            Prop::Shorthand(ident) => {
                let initial = cx.render(ident);
                cx.symbols
                    .add_constructor_state(ident.sym.as_str(), Some(initial));
            }
            _ => {}
        }
    }
    true
}

fn register_default_props(cx: &mut Context<'_>, defaults: &ObjectLit) {
    for prop in &defaults.props {
        let PropOrSpread::Prop(prop) = prop else {
            continue;
        };
        match &**prop {
            Prop::KeyValue(key_value) => {
                if let Some(name) = prop_name(&key_value.key) {
                    let value = cx.render(&*key_value.value);
                    cx.symbols.add_prop(&name, Some(value));
                }
            }
            Prop::Shorthand(ident) => {
                cx.symbols
                    .add_prop(ident.sym.as_str(), Some(ident.sym.to_string()));
            }
            _ => {}
        }
    }
}

fn convert_class_field(cx: &mut Context<'_>, prop: &ClassProp) {
    let Some(name) = prop_name(&prop.key) else {
        let code = cx.render_dedented(prop);
        cx.manual_review("computed class field", code, prop.span);
        return;
    };

    if prop.is_static {
        match (name.as_str(), prop.value.as_deref().map(unwrap_parens)) {
            ("defaultProps", Some(Expr::Object(defaults))) => register_default_props(cx, defaults),
            (static_name, _) if IGNORED_STATICS.contains(&static_name) => {}
            _ => {
                let code = cx.render_dedented(prop);
                cx.manual_review(format!("static field `{name}`"), code, prop.span);
            }
        }
        return;
    }

    let Some(value) = prop.value.as_deref() else {
        cx.symbols.add_state(&name, None);
        return;
    };

    match unwrap_parens(value) {
        Expr::Object(object) if name == "state" && register_initial_state(cx, object) => {}
        Expr::Call(call) if hook_name(call) == Some("createRef") => {}
        Expr::Arrow(arrow) => convert_arrow_binding(cx, &name, arrow, prop.span.lo),
        Expr::Fn(function) => {
            let head = function_head(cx, &name, &function.function);
            if let Some(body) = &function.function.body {
                let text = function_text(cx, head, body, prop.span.lo);
                cx.functions.push(text);
            }
        }
        _ => {
            let initial = cx.render(value);
            cx.symbols.add_state(&name, Some(initial));
        }
    }
}

/// Returns the render expression when `method` is `render`.
fn convert_method<'m>(cx: &mut Context<'_>, method: &'m ClassMethod) -> Option<&'m Expr> {
    let Some(name) = prop_name(&method.key) else {
        let code = cx.render_dedented(method);
        cx.manual_review("computed method", code, method.span);
        return None;
    };
    if method.is_static || method.kind != MethodKind::Method {
        let code = cx.render_dedented(method);
        cx.manual_review(format!("method `{name}`"), code, method.span);
        return None;
    }
    let function = &method.function;
    let body = function.body.as_ref()?;

    match name.as_str() {
        "render" => return convert_body(cx, &body.stmts, "render logic"),
        "componentDidMount" => lifecycle(cx, "onMount", function, body, method.span.lo),
        "componentWillUnmount" => lifecycle(cx, "onDestroy", function, body, method.span.lo),
        "componentDidUpdate" if function.params.is_empty() => {
            lifecycle(cx, "afterUpdate", function, body, method.span.lo)
        }
        lifecycle_name if UNSUPPORTED_LIFECYCLE.contains(&lifecycle_name) => {
            let code = cx.render_dedented(method);
            cx.manual_review(format!("lifecycle method `{name}`"), code, method.span);
        }
        _ if contains_jsx(body) => {
            let code = cx.render_dedented(method);
            cx.manual_review(format!("method `{name}` returning markup"), code, method.span);
        }
        _ => {
            let head = function_head(cx, &name, function);
            let text = function_text(cx, head, body, method.span.lo);
            cx.functions.push(text);
        }
    }
    None
}

fn lifecycle(cx: &mut Context<'_>, helper: &'static str, function: &Function, body: &BlockStmt, anchor: BytePos) {
    cx.helpers.insert(helper);
    let head = format!("{helper}({}() =>", if function.is_async { "async " } else { "" });
    let text = function_text(cx, head, body, anchor);
    cx.functions.push(format!("{text});"));
}

fn function_head(cx: &mut Context<'_>, name: &str, function: &Function) -> String {
    let params = function
        .params
        .iter()
        .map(|param| cx.render(param))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{}function{} {name}({params})",
        if function.is_async { "async " } else { "" },
        if function.is_generator { "*" } else { "" },
    )
}

/// `head` followed by the rendered body, shifted so the declaration starts
/// at column 0.
fn function_text(cx: &mut Context<'_>, head: String, body: &BlockStmt, anchor: BytePos) -> String {
    let indent = cx.source.line_indent(cx.source.offset(anchor)).len();
    let body = cx.render(body);
    tidy_blank_lines(&reindent(&format!("{head} {body}"), indent, ""))
}

/// Block-bodied arrows become function declarations, the rest `const`s.
fn convert_arrow_binding(cx: &mut Context<'_>, name: &str, arrow: &ArrowExpr, anchor: BytePos) {
    let text = match &*arrow.body {
        BlockStmtOrExpr::BlockStmt(body) => {
            let params = arrow
                .params
                .iter()
                .map(|param| cx.render(param))
                .collect::<Vec<_>>()
                .join(", ");
            let head = format!(
                "{}function {name}({params})",
                if arrow.is_async { "async " } else { "" }
            );
            function_text(cx, head, body, anchor)
        }
        BlockStmtOrExpr::Expr(_) => {
            let indent = cx.source.line_indent(cx.source.offset(anchor)).len();
            let value = cx.render(arrow);
            reindent(&format!("const {name} = {value};"), indent, "")
        }
    };
    cx.functions.push(text);
}

fn convert_function<'m>(cx: &mut Context<'_>, function: &FunctionSource<'m>) -> Option<&'m Expr> {
    match function.params.first().copied() {
        Some(Pat::Object(pattern)) => cx.register_props_pattern(pattern),
        Some(Pat::Ident(binding)) => cx.scope.props_bag = Some(binding.id.sym.to_string()),
        Some(Pat::Assign(assign)) => {
            if let Pat::Object(pattern) = &*assign.left {
                cx.register_props_pattern(pattern);
            }
        }
        _ => {}
    }

    match function.body {
        FunctionBody::Expr(expr) => Some(expr),
        FunctionBody::Block(block) => {
            for stmt in &block.stmts {
                if let Stmt::Decl(Decl::Var(decl)) = stmt {
                    if is_hook_declaration(decl) {
                        cx.consume_declaration(decl);
                    }
                }
            }
            convert_body(cx, &block.stmts, "component logic")
        }
    }
}

fn is_hook_declaration(decl: &VarDecl) -> bool {
    decl.decls.iter().all(|declarator| {
        matches!(declarator.init.as_deref().map(unwrap_parens), Some(Expr::Call(call))
            if matches!(hook_name(call), Some("useState" | "useRef" | "createRef")))
    })
}

/// Sorts the statements of a render body. Returns the final return value.
fn convert_body<'m>(cx: &mut Context<'_>, stmts: &'m [Stmt], reason: &str) -> Option<&'m Expr> {
    let mut markup = None;
    let mut leftovers: Vec<&Stmt> = Vec::new();
    let last = stmts.len().saturating_sub(1);

    for (index, stmt) in stmts.iter().enumerate() {
        match stmt {
            Stmt::Return(ret) if index == last => markup = ret.arg.as_deref(),
            Stmt::Decl(Decl::Var(decl)) => {
                if !convert_local_declaration(cx, decl) {
                    leftovers.push(stmt);
                }
            }
            Stmt::Decl(Decl::Fn(decl)) => {
                let Some(body) = &decl.function.body else {
                    continue;
                };
                let head = function_head(cx, decl.ident.sym.as_str(), &decl.function);
                let text = function_text(cx, head, body, decl.function.span.lo);
                cx.functions.push(text);
            }
            Stmt::Expr(expr) if convert_effect(cx, expr) => {}
            Stmt::Empty(_) => {}
            _ => leftovers.push(stmt),
        }
    }

    if let Some(first) = leftovers.first() {
        let span = first.span();
        let code = leftovers
            .iter()
            .map(|stmt| cx.render_dedented(*stmt))
            .collect::<Vec<_>>()
            .join("\n");
        cx.manual_review(reason, code, span);
    }
    markup
}

/// Converts a declaration in a render body. Returns false when it has to be
/// reviewed manually.
fn convert_local_declaration(cx: &mut Context<'_>, decl: &VarDecl) -> bool {
    if cx.consume_declaration(decl) {
        return true;
    }
    if !decl.decls.iter().all(|d| matches!(d.name, Pat::Ident(_))) {
        return false;
    }

    for declarator in &decl.decls {
        let Pat::Ident(binding) = &declarator.name else {
            continue;
        };
        let name = binding.id.sym.to_string();
        let Some(init) = declarator.init.as_deref() else {
            cx.symbols.add_state(&name, None);
            continue;
        };

        match unwrap_parens(init) {
            Expr::Arrow(arrow) => convert_arrow_binding(cx, &name, arrow, decl.span.lo),
            Expr::Fn(function) => {
                let head = function_head(cx, &name, &function.function);
                if let Some(body) = &function.function.body {
                    let text = function_text(cx, head, body, decl.span.lo);
                    cx.functions.push(text);
                }
            }
            Expr::Call(call) if hook_name(call) == Some("useCallback") && !call.args.is_empty() => {
                let indent = cx.source.line_indent(cx.source.offset(decl.span.lo)).len();
                let callback = cx.render(&*call.args[0].expr);
                cx.functions
                    .push(reindent(&format!("const {name} = {callback};"), indent, ""));
            }
            Expr::Call(call) if hook_name(call) == Some("useMemo") && !call.args.is_empty() => {
                let factory = cx.render_dedented(&*call.args[0].expr);
                cx.symbols.add_state(&name, None);
                cx.add_reactive(format!("$: {name} = ({factory})();"));
            }
            value if is_literal(value) => {
                let initial = cx.render(init);
                cx.symbols.add_state(&name, Some(initial));
            }
            _ => {
                let value = cx.render_dedented(init);
                cx.symbols.add_state(&name, None);
                cx.add_reactive(format!("$: {name} = {value};"));
            }
        }
    }
    true
}

/// `useEffect(fn, [])` runs on mount and `useEffect(fn)` after every update.
/// Effects with dependencies are reviewed manually.
fn convert_effect(cx: &mut Context<'_>, stmt: &ExprStmt) -> bool {
    let Expr::Call(call) = unwrap_parens(&stmt.expr) else {
        return false;
    };
    if !matches!(hook_name(call), Some("useEffect" | "useLayoutEffect")) {
        return false;
    }
    let Some(callback) = call.args.first() else {
        return false;
    };

    let helper = match call.args.get(1).map(|arg| unwrap_parens(&arg.expr)) {
        None => "afterUpdate",
        Some(Expr::Array(deps)) if deps.elems.is_empty() => "onMount",
        Some(_) => {
            let code = cx.render_dedented(stmt);
            cx.manual_review("effect with dependencies", code, stmt.span);
            return true;
        }
    };

    cx.helpers.insert(helper);
    let indent = cx.source.line_indent(cx.source.offset(stmt.span.lo)).len();
    let callback = cx.render(&*callback.expr);
    cx.functions.push(tidy_blank_lines(&reindent(
        &format!("{helper}({callback});"),
        indent,
        "",
    )));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_component;
    use crate::source::SourceText;
    use pretty_assertions::assert_eq;

    fn located_name(source: &str) -> Option<String> {
        let parsed = parse_component(source, "Test.jsx").unwrap();
        locate_component(&parsed.module).and_then(|component| component.name)
    }

    #[test]
    fn test_locate_default_export_by_name() {
        let source = "class Helper { render() { return <i />; } }\nclass Panel extends React.Component { render() { return <div />; } }\nexport default Panel;";
        assert_eq!(located_name(source).as_deref(), Some("Panel"));
    }

    #[test]
    fn test_locate_wrapped_default_export() {
        let source = "const Card = ({ title }) => <h1>{title}</h1>;\nexport default memo(Card);";
        assert_eq!(located_name(source).as_deref(), Some("Card"));
    }

    #[test]
    fn test_locate_falls_back_to_jsx_function() {
        let source = "const helper = () => 1;\nexport function Badge() { return <span />; }";
        assert_eq!(located_name(source).as_deref(), Some("Badge"));
        assert!(located_name("const x = 1;").is_none());
    }

    fn convert(source: &str) -> (Context<'_>, Option<String>) {
        let parsed = parse_component(source, "Test.jsx").unwrap();
        let text = SourceText::new(source, parsed.start);
        let mut cx = Context::new(text, None);
        let mut component = locate_component(&parsed.module).unwrap();
        convert_statics(&mut cx, &parsed.module, &mut component);
        convert_module_code(&mut cx, &parsed.module, &component);
        let markup = convert_component(&mut cx, &component.source)
            .map(|expr| text.slice(expr.span()).to_string());
        (cx, markup)
    }

    #[test]
    fn test_class_members() {
        let source = r#"const LIMIT = 3;
class Counter extends React.Component {
  static defaultProps = { step: 1 };
  timer = null;
  inputRef = React.createRef();

  constructor(props) {
    super(props);
    this.state = { count: 0 };
    this.increment = this.increment.bind(this);
    console.log('created');
  }

  componentDidMount() {
    this.timer = setInterval(this.increment, 1000);
  }

  componentWillUnmount() {
    clearInterval(this.timer);
  }

  increment() {
    this.setState({ count: this.state.count + this.props.step });
  }

  render() {
    return <input ref={this.inputRef} value={this.state.count} />;
  }
}
export default Counter;
"#;
        let (cx, markup) = convert(source);
        assert_eq!(
            markup.as_deref(),
            Some("<input ref={this.inputRef} value={this.state.count} />")
        );
        assert_eq!(cx.module_code, vec!["const LIMIT = 3;".to_string()]);
        assert_eq!(
            cx.functions,
            vec![
                "onMount(() => {\n  timer = setInterval(increment, 1000);\n});".to_string(),
                "onDestroy(() => {\n  clearInterval(timer);\n});".to_string(),
                "function increment() {\n  count = count + step;\n}".to_string(),
            ]
        );
        assert_eq!(cx.manual_review.len(), 1);
        assert_eq!(cx.manual_review[0].reason, "constructor");
        assert_eq!(cx.manual_review[0].code, "console.log('created');");
        assert!(cx.symbols.is_ref("inputRef"));
        assert!(cx.helpers.contains("onMount"));
        assert!(cx.helpers.contains("onDestroy"));

        let props = cx.symbols.prop_declarations();
        assert_eq!(props[0].to_line(), "export let step = 1;");
        let internal: Vec<String> = cx
            .symbols
            .internal_declarations()
            .iter()
            .map(|d| d.to_line())
            .collect();
        assert_eq!(
            internal,
            vec!["let count = 0;", "let inputRef;", "let timer = null;"]
        );
    }

    #[test]
    fn test_function_component_hooks() {
        let source = r#"export default function Toggle({ label = 'Toggle', onChange }) {
  const [on, setOn] = useState(false);
  const ref = useRef(null);
  const title = 'Switch';
  const upper = label.toUpperCase();

  useEffect(() => {
    ref.current.focus();
  }, []);

  const flip = () => {
    setOn(!on);
    onChange(!on);
  };

  return <button ref={ref} onClick={flip}>{upper}</button>;
}
"#;
        let (cx, markup) = convert(source);
        assert!(markup.unwrap().starts_with("<button"));
        assert_eq!(cx.reactive, vec!["$: upper = label.toUpperCase();".to_string()]);
        assert_eq!(
            cx.functions,
            vec![
                "onMount(() => {\n  ref.focus();\n});".to_string(),
                "function flip() {\n  on = !on;\n  onChange(!on);\n}".to_string(),
            ]
        );
        let internal: Vec<String> = cx
            .symbols
            .internal_declarations()
            .iter()
            .map(|d| d.to_line())
            .collect();
        assert_eq!(
            internal,
            vec!["let on = false;", "let ref;", "let title = 'Switch';", "let upper;"]
        );
        assert!(cx.manual_review.is_empty());
    }

    #[test]
    fn test_effect_with_dependencies_is_reviewed() {
        let source = "function Feed({ id }) {\n  useEffect(() => load(id), [id]);\n  return <ul />;\n}";
        let (cx, _) = convert(source);
        assert!(cx.functions.is_empty());
        assert_eq!(cx.manual_review[0].reason, "effect with dependencies");
        assert_eq!(cx.manual_review[0].code, "useEffect(() => load(id), [id]);");
    }

    #[test]
    fn test_static_default_props_assignment() {
        let source = "function Tag(props) { return <b>{props.text}</b>; }\nTag.defaultProps = { text: 'x' };\nTag.propTypes = {};";
        let (cx, _) = convert(source);
        assert!(cx.module_code.is_empty());
        assert_eq!(cx.symbols.prop_declarations()[0].to_line(), "export let text = 'x';");
        assert_eq!(cx.scope.props_bag.as_deref(), Some("props"));
    }
}

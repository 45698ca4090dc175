//! Script rewriting.
//!
//! [`Context`] accumulates everything the generated `<script>` needs while the
//! component is walked. [`Rewriter`] is the visitor that renders one node of
//! the original source with component-level references rewritten:
//! - `this.props.x`, `props.x` → `x` (registers a prop)
//! - `this.state.x` → `x` (registers state)
//! - `this.ref.current` and hook `ref.current` → `ref`
//! - `this.member` → `member`
//! - `this.setState({...})` and hook setters → plain assignments
//! - prop and state destructuring is removed

use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;
use swc_common::{Span, Spanned};
use swc_ecma_ast::{
    ArrayLit, Callee, CallExpr, Expr, ExprStmt, Ident, JSXElement, JSXElementName, JSXFragment,
    Lit, MemberExpr, MemberProp, ObjectLit, ObjectPat, ObjectPatProp, Pat, Prop, PropName,
    PropOrSpread, Stmt, ThisExpr, UnaryOp, VarDecl, VarDeclarator,
};
use swc_ecma_visit::{Visit, VisitWith};

use crate::diagnostic::{Diagnostic, DiagnosticCode};
use crate::imports::StyleImport;
use crate::source::{reindent, tidy_blank_lines, EditSet, SourceText};
use crate::symbols::SymbolTable;

/// A fenced block of code that could not be converted confidently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualReviewBlock {
    /// Why the code needs review.
    pub reason: String,
    /// The code, dedented to column 0.
    pub code: String,
}

/// Names with special meaning inside the component body.
#[derive(Debug, Default)]
pub struct ComponentScope {
    /// Class methods and function-valued class fields.
    pub methods: FxHashSet<String>,
    /// The props parameter of a function component, e.g. `props`.
    pub props_bag: Option<String>,
    /// Hook setters mapped to their state variable.
    pub setters: FxHashMap<String, String>,
    /// Variables holding `useRef` objects.
    pub hook_refs: FxHashSet<String>,
}

/// Accumulated output of one component transformation.
pub struct Context<'s> {
    pub(crate) source: SourceText<'s>,
    pub(crate) style: Option<&'s StyleImport>,
    pub(crate) symbols: SymbolTable,
    pub(crate) scope: ComponentScope,
    pub(crate) diagnostics: Vec<Diagnostic>,
    /// Primitives imported from `svelte`.
    pub(crate) helpers: BTreeSet<&'static str>,
    /// Top-level statements kept from the component module.
    pub(crate) module_code: Vec<String>,
    /// `$:` statements.
    pub(crate) reactive: Vec<String>,
    /// Function declarations.
    pub(crate) functions: Vec<String>,
    pub(crate) manual_review: Vec<ManualReviewBlock>,
    helper_names: FxHashSet<String>,
    markers: usize,
}

impl<'s> Context<'s> {
    /// Creates an empty context.
    pub fn new(source: SourceText<'s>, style: Option<&'s StyleImport>) -> Self {
        Self {
            source,
            style,
            symbols: SymbolTable::new(),
            scope: ComponentScope::default(),
            diagnostics: Vec::new(),
            helpers: BTreeSet::new(),
            module_code: Vec::new(),
            reactive: Vec::new(),
            functions: Vec::new(),
            manual_review: Vec::new(),
            helper_names: FxHashSet::default(),
            markers: 0,
        }
    }

    /// Renders `node` with every rewrite applied.
    pub fn render<N>(&mut self, node: &N) -> String
    where
        N: Spanned + for<'c> VisitWith<Rewriter<'c, 's>>,
    {
        let source = self.source;
        let range = source.range(node.span());
        let mut rewriter = Rewriter::new(self);
        node.visit_with(&mut rewriter);
        rewriter.edits.render(source.text(), range)
    }

    /// Renders `node` and shifts its continuation lines to column 0.
    pub fn render_dedented<N>(&mut self, node: &N) -> String
    where
        N: Spanned + for<'c> VisitWith<Rewriter<'c, 's>>,
    {
        let offset = self.source.offset(node.span().lo);
        let indent = self.source.line_indent(offset).len();
        let text = self.render(node);
        tidy_blank_lines(&reindent(&text, indent, ""))
    }

    /// Records a diagnostic at the start of `span`.
    pub fn diagnostic(&mut self, code: DiagnosticCode, message: impl Into<String>, span: Span) {
        let (line, column) = self.source.position(span);
        self.diagnostics
            .push(Diagnostic::new(code, message, line, column));
    }

    /// Adds a manual-review block and reports it.
    pub fn manual_review(&mut self, reason: impl Into<String>, code: String, span: Span) {
        let reason = reason.into();
        tracing::debug!(reason = %reason, "deferring code to manual review");
        self.diagnostic(
            DiagnosticCode::ManualReview,
            format!("{reason} needs manual review"),
            span,
        );
        self.manual_review.push(ManualReviewBlock { reason, code });
    }

    /// Returns the next markup marker number.
    pub fn next_marker(&mut self) -> usize {
        self.markers += 1;
        self.markers
    }

    /// Reserves a unique helper function name derived from `base`.
    pub fn helper_name(&mut self, base: &str) -> String {
        let mut name = base.to_string();
        let mut counter = 2;
        while !self.helper_names.insert(name.clone()) {
            name = format!("{base}{counter}");
            counter += 1;
        }
        name
    }

    /// Adds a `$:` statement unless an identical one exists.
    pub fn add_reactive(&mut self, statement: String) {
        if !self.reactive.contains(&statement) {
            self.reactive.push(statement);
        }
    }

    /// Registers the bindings of a props destructuring pattern.
    ///
    /// Defaults become prop defaults, renamed bindings become reactive
    /// aliases and a rest element receives `$$restProps`.
    pub fn register_props_pattern(&mut self, pattern: &ObjectPat) {
        for prop in &pattern.props {
            match prop {
                ObjectPatProp::Assign(assign) => {
                    let name = assign.key.sym.to_string();
                    let default = assign.value.as_ref().map(|value| self.render(&**value));
                    self.symbols.add_prop(&name, default);
                }
                ObjectPatProp::KeyValue(key_value) => {
                    let Some(name) = prop_name(&key_value.key) else {
                        self.diagnostic(
                            DiagnosticCode::ManualReview,
                            "computed prop destructuring needs manual review",
                            key_value.key.span(),
                        );
                        continue;
                    };
                    match &*key_value.value {
                        Pat::Ident(local) => {
                            self.symbols.add_prop(&name, None);
                            if local.id.sym.as_str() != name {
                                self.add_reactive(format!("$: {} = {name};", local.id.sym));
                            }
                        }
                        Pat::Assign(assign) => {
                            let default = Some(self.render(&*assign.right));
                            self.symbols.add_prop(&name, default);
                            if let Pat::Ident(local) = &*assign.left {
                                if local.id.sym.as_str() != name {
                                    self.add_reactive(format!("$: {} = {name};", local.id.sym));
                                }
                            }
                        }
                        other => {
                            self.symbols.add_prop(&name, None);
                            let pattern = self.source.slice(other.span()).to_string();
                            self.add_reactive(format!("$: ({pattern} = {name});"));
                        }
                    }
                }
                ObjectPatProp::Rest(rest) => {
                    if let Pat::Ident(binding) = &*rest.arg {
                        self.symbols
                            .add_state(binding.id.sym.as_str(), Some("$$restProps".to_string()));
                    }
                }
            }
        }
    }

    /// Registers the names of a state destructuring pattern.
    pub fn register_state_pattern(&mut self, pattern: &ObjectPat) {
        for prop in &pattern.props {
            let name = match prop {
                ObjectPatProp::Assign(assign) => Some(assign.key.sym.to_string()),
                ObjectPatProp::KeyValue(key_value) => prop_name(&key_value.key),
                ObjectPatProp::Rest(_) => None,
            };
            if let Some(name) = name {
                self.symbols.add_state(&name, None);
            }
        }
    }

    /// Consumes a declaration that only feeds the symbol table: props or
    /// state destructuring and hook declarations. Returns false, without
    /// side effects, for anything else.
    pub fn consume_declaration(&mut self, decl: &VarDecl) -> bool {
        if decl.decls.is_empty()
            || !decl
                .decls
                .iter()
                .all(|d| self.declarator_role(d).is_some())
        {
            return false;
        }
        for declarator in &decl.decls {
            self.register_declarator(declarator);
        }
        true
    }

    fn declarator_role(&self, declarator: &VarDeclarator) -> Option<DeclaratorRole> {
        let init = unwrap_parens(declarator.init.as_deref()?);
        match (&declarator.name, init) {
            (Pat::Object(_), Expr::Member(member)) if is_this_member(member, "props") => {
                Some(DeclaratorRole::Props)
            }
            (Pat::Object(_), Expr::Ident(ident))
                if self.scope.props_bag.as_deref() == Some(ident.sym.as_str()) =>
            {
                Some(DeclaratorRole::Props)
            }
            (Pat::Object(_), Expr::Member(member)) if is_this_member(member, "state") => {
                Some(DeclaratorRole::State)
            }
            (Pat::Array(_), Expr::Call(call)) if hook_name(call) == Some("useState") => {
                Some(DeclaratorRole::StateHook)
            }
            (Pat::Ident(_), Expr::Call(call)) if hook_name(call) == Some("useRef") => {
                Some(DeclaratorRole::RefHook)
            }
            (Pat::Ident(_), Expr::Call(call)) if hook_name(call) == Some("createRef") => {
                Some(DeclaratorRole::Ref)
            }
            _ => None,
        }
    }

    fn register_declarator(&mut self, declarator: &VarDeclarator) {
        let Some(role) = self.declarator_role(declarator) else {
            return;
        };
        let Some(init) = declarator.init.as_deref().map(unwrap_parens) else {
            return;
        };

        match (role, &declarator.name, init) {
            (DeclaratorRole::Props, Pat::Object(pattern), _) => {
                self.register_props_pattern(pattern)
            }
            (DeclaratorRole::State, Pat::Object(pattern), _) => {
                self.register_state_pattern(pattern)
            }
            (DeclaratorRole::StateHook, Pat::Array(pattern), Expr::Call(call)) => {
                let mut names = pattern.elems.iter().map(|elem| match elem {
                    Some(Pat::Ident(binding)) => Some(binding.id.sym.to_string()),
                    _ => None,
                });
                let Some(Some(state)) = names.next() else {
                    return;
                };
                let setter = names.next().flatten();
                let initial = call.args.first().map(|arg| self.render(&*arg.expr));
                self.symbols.add_state(&state, initial);
                if let Some(setter) = setter {
                    self.scope.setters.insert(setter, state);
                }
            }
            (DeclaratorRole::RefHook, Pat::Ident(binding), _) => {
                let name = binding.id.sym.to_string();
                self.symbols.add_ref(&name);
                self.scope.hook_refs.insert(name);
            }
            (DeclaratorRole::Ref, Pat::Ident(binding), _) => {
                self.symbols.add_ref(binding.id.sym.as_str());
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclaratorRole {
    Props,
    State,
    StateHook,
    RefHook,
    Ref,
}

/// Renders one node of the component source with component references
/// rewritten. Leaf rewrites are recorded as they are visited; structural
/// rewrites are recorded after their children so they can embed the
/// rewritten child text.
pub struct Rewriter<'c, 's> {
    cx: &'c mut Context<'s>,
    edits: EditSet,
    /// Spans of the enclosing statements that sit in a statement list.
    statements: Vec<Span>,
    /// Statements to move into manual review once visited, with the reason.
    deferred: Vec<(Span, String)>,
}

impl<'c, 's> Rewriter<'c, 's> {
    fn new(cx: &'c mut Context<'s>) -> Self {
        Self {
            cx,
            edits: EditSet::new(),
            statements: Vec::new(),
            deferred: Vec::new(),
        }
    }

    fn range(&self, span: Span) -> std::ops::Range<usize> {
        self.cx.source.range(span)
    }

    fn rendered(&self, span: Span) -> String {
        self.edits.render(self.cx.source.text(), self.range(span))
    }

    fn member_replacement(&mut self, member: &MemberExpr) -> Option<String> {
        let prop = member_prop_name(member);
        match unwrap_parens(&member.obj) {
            Expr::This(_) => {
                let name = prop?;
                match name {
                    "props" => Some("$$props".to_string()),
                    "state" | "setState" | "forceUpdate" | "context" | "refs" => None,
                    _ => {
                        if !self.cx.scope.methods.contains(name) && !self.cx.symbols.is_ref(name) {
                            self.cx.symbols.add_state(name, None);
                        }
                        Some(name.to_string())
                    }
                }
            }
            Expr::Member(inner) if is_this_member(inner, "props") => {
                let name = prop?;
                self.cx.symbols.add_prop(name, None);
                Some(name.to_string())
            }
            Expr::Member(inner) if is_this_member(inner, "state") => {
                let name = prop?;
                self.cx.symbols.add_state(name, None);
                Some(name.to_string())
            }
            Expr::Member(inner) if prop == Some("current") => {
                let name = this_member_name(inner)?;
                self.cx.symbols.is_ref(name).then(|| name.to_string())
            }
            Expr::Ident(ident)
                if prop == Some("current") && self.cx.scope.hook_refs.contains(ident.sym.as_str()) =>
            {
                Some(ident.sym.to_string())
            }
            Expr::Ident(ident)
                if self.cx.scope.props_bag.as_deref() == Some(ident.sym.as_str()) =>
            {
                let name = prop?;
                self.cx.symbols.add_prop(name, None);
                Some(name.to_string())
            }
            _ => None,
        }
    }

    /// Rewrites an update call into assignments. The arguments must already
    /// have been visited.
    fn state_update(&mut self, call: &CallExpr) -> Option<StateUpdate> {
        let first = call.args.first()?;
        if first.spread.is_some() {
            return None;
        }
        let Expr::Object(object) = unwrap_parens(&first.expr) else {
            return None;
        };

        let assignments = self.object_assignments(object)?;
        let callback = call.args.get(1).map(|arg| {
            self.cx.helpers.insert("tick");
            format!("tick().then({})", self.rendered(arg.expr.span()))
        });

        Some(StateUpdate {
            assignments,
            callback,
        })
    }

    fn object_assignments(&mut self, object: &ObjectLit) -> Option<Vec<String>> {
        let mut fields = Vec::with_capacity(object.props.len());
        for prop in &object.props {
            let PropOrSpread::Prop(prop) = prop else {
                return None;
            };
            fields.push(match &**prop {
                Prop::KeyValue(key_value) => {
                    (prop_name(&key_value.key)?, self.rendered(key_value.value.span()))
                }
                Prop::Shorthand(ident) => (ident.sym.to_string(), self.rendered(ident.span)),
                _ => return None,
            });
        }

        let assignments = fields
            .into_iter()
            .map(|(name, value)| {
                self.cx.symbols.add_state(&name, None);
                format!("{name} = {value}")
            })
            .collect();
        Some(assignments)
    }

    /// Defers an update call that has no plain assignment form. The
    /// enclosing statement is moved into manual review; without one the call
    /// itself is moved and replaced by `undefined`.
    fn flag_update_call(&mut self, call: &CallExpr) {
        let reason = match call.args.first().map(|arg| unwrap_parens(&arg.expr)) {
            Some(Expr::Arrow(_) | Expr::Fn(_)) => "state update with an updater function",
            Some(Expr::Object(_)) => "state update with spread or computed keys",
            _ => "state update without an object literal",
        };

        match self.statements.last() {
            Some(&span) => {
                if !self.deferred.iter().any(|(deferred, _)| *deferred == span) {
                    self.deferred.push((span, reason.to_string()));
                }
            }
            None => {
                let code = self.rendered(call.span);
                self.cx.manual_review(reason, code, call.span);
                let range = self.range(call.span);
                self.edits.replace(range, "undefined");
            }
        }
    }

    fn move_to_manual_review(&mut self, span: Span, reason: String) {
        let source = self.cx.source;
        let range = source.range(span);
        let indent = source.line_indent(range.start).len();
        let code = tidy_blank_lines(&reindent(&self.rendered(span), indent, ""));
        self.cx.manual_review(reason, code, span);
        self.edits.remove(source.statement_range(range));
    }

    fn is_update_call(call: &CallExpr) -> bool {
        callee_member(call).is_some_and(|callee| is_this_member(callee, "setState"))
    }

    fn hook_setter_assignment(&mut self, call: &CallExpr) -> Option<String> {
        let Callee::Expr(callee) = &call.callee else {
            return None;
        };
        let Expr::Ident(ident) = &**callee else {
            return None;
        };
        let state = self.cx.scope.setters.get(ident.sym.as_str())?.clone();

        for arg in &call.args {
            arg.visit_with(self);
        }

        let Some(arg) = call.args.first() else {
            return Some(format!("{state} = undefined"));
        };
        let value = self.rendered(arg.expr.span());
        Some(match unwrap_parens(&arg.expr) {
            Expr::Arrow(_) | Expr::Fn(_) => format!("{state} = ({value})({state})"),
            _ => format!("{state} = {value}"),
        })
    }
}

struct StateUpdate {
    assignments: Vec<String>,
    callback: Option<String>,
}

impl Visit for Rewriter<'_, '_> {
    fn visit_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            let span = stmt.span();
            self.statements.push(span);
            stmt.visit_with(self);
            self.statements.pop();

            if let Some(index) = self.deferred.iter().position(|(deferred, _)| *deferred == span) {
                let (_, reason) = self.deferred.remove(index);
                self.move_to_manual_review(span, reason);
            }
        }
    }

    fn visit_member_expr(&mut self, member: &MemberExpr) {
        if let Some(replacement) = self.member_replacement(member) {
            let range = self.range(member.span);
            self.edits.replace(range, replacement);
            return;
        }
        member.visit_children_with(self);
    }

    fn visit_expr_stmt(&mut self, stmt: &ExprStmt) {
        let Expr::Call(call) = unwrap_parens(&stmt.expr) else {
            stmt.visit_children_with(self);
            return;
        };
        if !Self::is_update_call(call) {
            stmt.visit_children_with(self);
            return;
        }

        for arg in &call.args {
            arg.visit_with(self);
        }
        let Some(update) = self.state_update(call) else {
            self.flag_update_call(call);
            return;
        };

        let source = self.cx.source;
        let range = source.range(stmt.span);
        let mut lines: Vec<String> = update
            .assignments
            .iter()
            .map(|assignment| format!("{assignment};"))
            .collect();
        if let Some(callback) = update.callback {
            lines.push(format!("{callback};"));
        }

        if lines.is_empty() {
            self.edits.remove(source.statement_range(range));
        } else {
            let indent = source.line_indent(range.start);
            self.edits.replace(range, lines.join(&format!("\n{indent}")));
        }
    }

    fn visit_call_expr(&mut self, call: &CallExpr) {
        if Self::is_update_call(call) {
            for arg in &call.args {
                arg.visit_with(self);
            }
            match self.state_update(call) {
                Some(update) => {
                    let mut parts = update.assignments;
                    parts.extend(update.callback);
                    let range = self.range(call.span);
                    self.edits.replace(range, format!("({})", parts.join(", ")));
                }
                None => self.flag_update_call(call),
            }
            return;
        }

        if let Some(callee) = callee_member(call) {
            let binds_this = member_prop_name(callee) == Some("bind")
                && call.args.len() == 1
                && matches!(&*call.args[0].expr, Expr::This(_));
            if binds_this {
                callee.obj.visit_with(self);
                let text = self.rendered(callee.obj.span());
                let range = self.range(call.span);
                self.edits.replace(range, text);
                return;
            }
        }

        if let Some(assignment) = self.hook_setter_assignment(call) {
            let range = self.range(call.span);
            self.edits.replace(range, assignment);
            return;
        }

        call.visit_children_with(self);
    }

    fn visit_var_decl(&mut self, decl: &VarDecl) {
        if self.cx.consume_declaration(decl) {
            let source = self.cx.source;
            self.edits
                .remove(source.statement_range(source.range(decl.span)));
            return;
        }
        decl.visit_children_with(self);
    }

    fn visit_ident(&mut self, ident: &Ident) {
        if self.cx.scope.props_bag.as_deref() == Some(ident.sym.as_str()) {
            let range = self.range(ident.span);
            self.edits.replace(range, "$$props");
        }
    }

    fn visit_this_expr(&mut self, this: &ThisExpr) {
        self.cx.diagnostic(
            DiagnosticCode::UnresolvedThis,
            "`this` reference could not be rewritten",
            this.span,
        );
    }
}

/// Strips any number of wrapping parentheses.
pub fn unwrap_parens(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(paren) => unwrap_parens(&paren.expr),
        other => other,
    }
}

/// The identifier name of a non-computed member property.
pub fn member_prop_name(member: &MemberExpr) -> Option<&str> {
    match &member.prop {
        MemberProp::Ident(ident) => Some(ident.sym.as_str()),
        _ => None,
    }
}

/// Matches `this.<name>`.
pub fn is_this_member(member: &MemberExpr, name: &str) -> bool {
    this_member_name(member) == Some(name)
}

/// The property name of a `this.<name>` expression.
pub fn this_member_name(member: &MemberExpr) -> Option<&str> {
    match unwrap_parens(&member.obj) {
        Expr::This(_) => member_prop_name(member),
        _ => None,
    }
}

/// The member expression a call is made on.
pub fn callee_member(call: &CallExpr) -> Option<&MemberExpr> {
    match &call.callee {
        Callee::Expr(callee) => match unwrap_parens(callee) {
            Expr::Member(member) => Some(member),
            _ => None,
        },
        _ => None,
    }
}

/// The name of a called function, for both `name()` and `React.name()`.
pub fn hook_name(call: &CallExpr) -> Option<&str> {
    let Callee::Expr(callee) = &call.callee else {
        return None;
    };
    match unwrap_parens(callee) {
        Expr::Ident(ident) => Some(ident.sym.as_str()),
        Expr::Member(member) => match unwrap_parens(&member.obj) {
            Expr::Ident(_) => member_prop_name(member),
            _ => None,
        },
        _ => None,
    }
}

/// The static name of an object key.
pub fn prop_name(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(value) => Some(value.value.to_string_lossy().into_owned()),
        _ => None,
    }
}

/// Whether an initializer is a constant that can be declared directly.
pub fn is_literal(expr: &Expr) -> bool {
    match unwrap_parens(expr) {
        Expr::Lit(Lit::Regex(_)) => false,
        Expr::Lit(_) => true,
        Expr::Tpl(tpl) => tpl.exprs.is_empty(),
        Expr::Unary(unary) => {
            matches!(unary.op, UnaryOp::Minus | UnaryOp::Plus | UnaryOp::Bang)
                && matches!(&*unary.arg, Expr::Lit(Lit::Num(_)) | Expr::Lit(Lit::Bool(_)))
        }
        Expr::Array(ArrayLit { elems, .. }) => elems
            .iter()
            .all(|elem| elem.as_ref().is_some_and(|e| e.spread.is_none() && is_literal(&e.expr))),
        Expr::Object(object) => object.props.iter().all(|prop| match prop {
            PropOrSpread::Prop(prop) => match &**prop {
                Prop::KeyValue(key_value) => is_literal(&key_value.value),
                _ => false,
            },
            PropOrSpread::Spread(_) => false,
        }),
        Expr::Ident(ident) => ident.sym.as_str() == "undefined",
        _ => false,
    }
}

/// Whether a node contains JSX anywhere.
pub fn contains_jsx<N: VisitWith<JsxFinder>>(node: &N) -> bool {
    let mut finder = JsxFinder::default();
    node.visit_with(&mut finder);
    finder.found
}

/// Finds JSX elements and fragments.
#[derive(Default)]
pub struct JsxFinder {
    found: bool,
}

impl Visit for JsxFinder {
    fn visit_jsx_element(&mut self, _: &JSXElement) {
        self.found = true;
    }

    fn visit_jsx_fragment(&mut self, _: &JSXFragment) {
        self.found = true;
    }
}

/// Finds references to one identifier, ignoring element names.
pub struct IdentFinder<'a> {
    name: &'a str,
    found: bool,
}

impl<'a> IdentFinder<'a> {
    /// Creates a finder for `name`.
    pub fn new(name: &'a str) -> Self {
        Self { name, found: false }
    }

    /// Whether the identifier was seen.
    pub fn found(&self) -> bool {
        self.found
    }
}

impl Visit for IdentFinder<'_> {
    fn visit_ident(&mut self, ident: &Ident) {
        if ident.sym.as_str() == self.name {
            self.found = true;
        }
    }

    fn visit_jsx_element_name(&mut self, _: &JSXElementName) {}
}

/// Collects the names bound by a pattern.
pub fn binding_names(pat: &Pat, names: &mut Vec<String>) {
    match pat {
        Pat::Ident(binding) => names.push(binding.id.sym.to_string()),
        Pat::Array(array) => {
            for elem in array.elems.iter().flatten() {
                binding_names(elem, names);
            }
        }
        Pat::Object(object) => {
            for prop in &object.props {
                match prop {
                    ObjectPatProp::KeyValue(key_value) => binding_names(&key_value.value, names),
                    ObjectPatProp::Assign(assign) => names.push(assign.key.sym.to_string()),
                    ObjectPatProp::Rest(rest) => binding_names(&rest.arg, names),
                }
            }
        }
        Pat::Assign(assign) => binding_names(&assign.left, names),
        Pat::Rest(rest) => binding_names(&rest.arg, names),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_component;
    use swc_ecma_ast::ModuleItem;

    fn render_first_statement(source: &str, setup: impl FnOnce(&mut Context<'_>)) -> (String, Context<'_>) {
        let parsed = parse_component(source, "Test.jsx").unwrap();
        let text = SourceText::new(source, parsed.start);
        let mut cx = Context::new(text, None);
        setup(&mut cx);
        let ModuleItem::Stmt(stmt) = &parsed.module.body[0] else {
            panic!("expected a statement");
        };
        let stmt: &Stmt = stmt;
        let rendered = cx.render(stmt);
        (rendered, cx)
    }

    #[test]
    fn test_props_and_state_members() {
        let (rendered, cx) = render_first_statement(
            "this.props.onChange(this.state.value, this.props);",
            |_| {},
        );
        assert_eq!(rendered, "onChange(value, $$props);");
        assert!(cx.symbols.is_prop("onChange"));
        assert!(cx.symbols.is_state("value"));
        assert!(cx.diagnostics.is_empty());
    }

    #[test]
    fn test_ref_current_is_dropped() {
        let (rendered, _) = render_first_statement(
            "this.update(this.inputRef.current.value);",
            |cx| {
                cx.scope.methods.insert("update".to_string());
                cx.symbols.add_ref("inputRef");
            },
        );
        assert_eq!(rendered, "update(inputRef.value);");
    }

    #[test]
    fn test_set_state_statement() {
        let source = "if (x) {\n    this.setState({ a: 1, b: this.props.c });\n}";
        let (rendered, cx) = render_first_statement(source, |_| {});
        assert_eq!(rendered, "if (x) {\n    a = 1;\n    b = c;\n}");
        assert!(cx.symbols.is_state("a"));
        assert!(cx.symbols.is_state("b"));
    }

    #[test]
    fn test_set_state_expression_with_callback() {
        let (rendered, cx) = render_first_statement(
            "const f = () => this.setState({ open: true }, () => done());",
            |_| {},
        );
        assert_eq!(rendered, "const f = () => (open = true, tick().then(() => done()));");
        assert!(cx.helpers.contains("tick"));
    }

    #[test]
    fn test_unconvertible_updates_move_to_manual_review() {
        let source = "function go() {\n  this.setState(prev => ({ a: prev.a + 1 }));\n  if (x) {\n    this.setState({ a, ['b']: 4, ...rest });\n  }\n  done();\n}";
        let (rendered, cx) = render_first_statement(source, |_| {});
        assert_eq!(rendered, "function go() {\n  if (x) {\n  }\n  done();\n}");
        assert!(!rendered.contains("setState"));

        assert_eq!(
            cx.manual_review,
            vec![
                ManualReviewBlock {
                    reason: "state update with an updater function".to_string(),
                    code: "this.setState(prev => ({ a: prev.a + 1 }));".to_string(),
                },
                ManualReviewBlock {
                    reason: "state update with spread or computed keys".to_string(),
                    code: "this.setState({ a, ['b']: 4, ...rest });".to_string(),
                },
            ]
        );
        let codes: Vec<DiagnosticCode> = cx.diagnostics.iter().map(|d| d.code).collect();
        assert_eq!(codes, vec![DiagnosticCode::ManualReview, DiagnosticCode::ManualReview]);
        assert!(!cx.symbols.is_state("a"));
    }

    #[test]
    fn test_update_call_outside_statement_list() {
        let (rendered, cx) = render_first_statement(
            "const f = () => this.setState(s => ({ n: s.n + 1 }));",
            |_| {},
        );
        assert_eq!(rendered, "const f = () => undefined;");
        assert_eq!(cx.manual_review.len(), 1);
        assert_eq!(cx.manual_review[0].code, "this.setState(s => ({ n: s.n + 1 }))");
        assert_eq!(cx.diagnostics[0].code, DiagnosticCode::ManualReview);
    }

    #[test]
    fn test_hook_setters() {
        let (rendered, _) = render_first_statement(
            "function toggle() { setOpen(o => !o); setCount(5); }",
            |cx| {
                cx.scope.setters.insert("setOpen".to_string(), "open".to_string());
                cx.scope.setters.insert("setCount".to_string(), "count".to_string());
            },
        );
        assert_eq!(
            rendered,
            "function toggle() { open = (o => !o)(open); count = 5; }"
        );
    }

    #[test]
    fn test_destructuring_is_removed() {
        let source = "function f() {\n  const { a, b = 2, c: d, ...rest } = this.props;\n  const { s } = this.state;\n  go(a);\n}";
        let (rendered, cx) = render_first_statement(source, |_| {});
        assert_eq!(rendered, "function f() {\n  go(a);\n}");
        let props = cx.symbols.prop_declarations();
        let names: Vec<&str> = props.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(props[1].value.as_deref(), Some("2"));
        assert_eq!(cx.reactive, vec!["$: d = c;".to_string()]);
        assert!(cx.symbols.is_state("s"));
        assert!(cx.symbols.is_state("rest"));
    }

    #[test]
    fn test_bind_and_unresolved_this() {
        let (rendered, cx) = render_first_statement(
            "register(this.save.bind(this), this.context);",
            |cx| {
                cx.scope.methods.insert("save".to_string());
            },
        );
        assert_eq!(rendered, "register(save, this.context);");
        assert_eq!(cx.diagnostics.len(), 1);
        assert_eq!(cx.diagnostics[0].code, DiagnosticCode::UnresolvedThis);
    }

    #[test]
    fn test_props_bag() {
        let (rendered, cx) = render_first_statement("log(props.title, props);", |cx| {
            cx.scope.props_bag = Some("props".to_string());
        });
        assert_eq!(rendered, "log(title, $$props);");
        assert!(cx.symbols.is_prop("title"));
    }

    #[test]
    fn test_is_literal() {
        let parsed = parse_component(
            "a = 1; a = 'x'; a = [1, 'b']; a = { k: true }; a = -1; a = f(); a = `${x}`;",
            "Test.jsx",
        )
        .unwrap();
        let results: Vec<bool> = parsed
            .module
            .body
            .iter()
            .map(|item| match item {
                ModuleItem::Stmt(Stmt::Expr(stmt)) => match &*stmt.expr {
                    Expr::Assign(assign) => is_literal(&assign.right),
                    _ => unreachable!(),
                },
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(results, vec![true, true, true, true, true, false, false]);
    }
}

//! Markup rewriting.
//!
//! The render expression is converted into a [`MarkupNode`] tree and
//! serialized back in source layout: text between tags is copied verbatim,
//! so only the converted constructs change shape. Block constructs are laid
//! out relative to the indentation of the expression container they replace.

use swc_common::{Span, Spanned};
use swc_ecma_ast::{
    BinaryOp, BlockStmtOrExpr, CallExpr, CondExpr, Decl, Expr, JSXAttr, JSXAttrName,
    JSXAttrOrSpread, JSXAttrValue, JSXElement, JSXElementChild, JSXExpr, Lit, Pat, Stmt, Tpl,
};
use swc_ecma_visit::VisitWith;

use crate::diagnostic::DiagnosticCode;
use crate::script::{
    binding_names, callee_member, contains_jsx, member_prop_name, this_member_name,
    unwrap_parens, Context, IdentFinder,
};
use crate::source::reindent;

/// A converted markup node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    /// An HTML element or component.
    Element(ElementNode),
    /// Text copied from the source.
    Text(String),
    /// `{expression}`
    Expression(String),
    /// `<!-- text -->`
    Comment(String),
    /// `{#if}` with optional `{:else if}` and `{:else}` branches.
    Conditional(ConditionalBlock),
    /// `{#each}`
    Iteration(IterationBlock),
    /// `<slot />` standing in for `children`.
    Slot,
    /// Placeholder for an expression moved into a manual-review block.
    ManualReview(usize),
}

/// An element with its attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementNode {
    /// The tag name as written.
    pub tag: String,
    /// Converted attributes.
    pub attributes: Vec<Attribute>,
    /// Converted children.
    pub children: Vec<MarkupNode>,
    /// Whether the element closes itself.
    pub self_closing: bool,
    /// Whitespace between the last attribute and the end of the opening tag.
    pub before_close: String,
}

/// How an attribute was converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeKind {
    /// `className` converted to `class`.
    Class,
    /// An event handler converted to an `on:` directive; holds the event name.
    Event(String),
    /// An element ref converted to `bind:this`.
    Ref,
    /// Any other attribute.
    Plain,
    /// `{...expression}`
    Spread,
}

/// The value of an attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// A boolean attribute.
    None,
    /// A quoted literal, quotes included.
    Literal(String),
    /// `{expression}`
    Expression(String),
    /// A quoted string with `{expression}` parts, quotes excluded.
    Interpolated(String),
}

/// A converted attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub kind: AttributeKind,
    pub name: String,
    pub value: AttributeValue,
    /// Whitespace preceding the attribute in the source.
    pub leading: String,
}

/// The nodes of one block branch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockBody {
    pub nodes: Vec<MarkupNode>,
    /// Column the body's continuation lines are written against.
    pub indent: usize,
}

/// One `{#if}` or `{:else if}` branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub test: String,
    pub body: BlockBody,
}

/// `{#if}` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalBlock {
    pub branches: Vec<Branch>,
    pub otherwise: Option<BlockBody>,
    /// Column the block tags are written at.
    pub base: usize,
}

/// `{#each}` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationBlock {
    pub collection: String,
    pub item: String,
    pub index: Option<String>,
    pub body: BlockBody,
    /// Column the block tags are written at.
    pub base: usize,
}

/// Serialized component markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup {
    /// The markup, starting at column 0.
    pub text: String,
    /// Whether a `<slot />` replaced the `children` prop.
    pub uses_slot: bool,
}

/// Converts the render expression of a component.
pub(crate) fn build_markup(cx: &mut Context<'_>, root: &Expr) -> Markup {
    let mut builder = MarkupBuilder {
        cx,
        uses_slot: false,
    };
    let text = match builder.block_body(root) {
        Some(body) => reindent(&write_nodes(&body.nodes), body.indent, ""),
        None => String::new(),
    };
    Markup {
        text: text.trim_end().to_string(),
        uses_slot: builder.uses_slot,
    }
}

struct MarkupBuilder<'c, 's> {
    cx: &'c mut Context<'s>,
    uses_slot: bool,
}

enum CallbackBody<'a> {
    Expr(&'a Expr),
    Stmts(&'a [Stmt]),
}

enum ClassPiece {
    Text(String),
    Live(String),
}

impl MarkupBuilder<'_, '_> {
    fn offset(&self, span: Span) -> usize {
        self.cx.source.offset(span.lo)
    }

    fn block_indent(&self, span: Span) -> usize {
        self.cx.source.block_indent(self.offset(span))
    }

    /// The nodes an expression renders as, or `None` when it renders nothing.
    fn block_body(&mut self, expr: &Expr) -> Option<BlockBody> {
        let expr = unwrap_parens(expr);
        if is_nullish(expr) {
            return None;
        }
        match expr {
            Expr::JSXElement(element) if is_fragment(self.tag(element)) => {
                self.fragment_body(&element.children)
            }
            Expr::JSXFragment(fragment) => self.fragment_body(&fragment.children),
            Expr::JSXElement(element) => Some(BlockBody {
                nodes: vec![self.element(element, false)],
                indent: self.block_indent(element.span),
            }),
            other => {
                let indent = self.block_indent(other.span());
                Some(BlockBody {
                    nodes: self.expression(other, indent),
                    indent,
                })
            }
        }
    }

    /// Children of a fragment with surrounding whitespace removed.
    fn fragment_body(&mut self, children: &[JSXElementChild]) -> Option<BlockBody> {
        let is_blank = |child: &JSXElementChild| {
            matches!(child, JSXElementChild::JSXText(text) if text.raw.trim().is_empty())
        };
        let first = children.iter().position(|child| !is_blank(child))?;
        let last = children.iter().rposition(|child| !is_blank(child))?;

        let anchor = match &children[first] {
            JSXElementChild::JSXText(text) => {
                let start = self.offset(text.span);
                start + self.cx.source.whitespace_after(start)
            }
            other => self.offset(other.span()),
        };

        let mut nodes = self.children(&children[first..=last]);
        if let Some(MarkupNode::Text(text)) = nodes.first_mut() {
            *text = text.trim_start().to_string();
        }
        if let Some(MarkupNode::Text(text)) = nodes.last_mut() {
            *text = text.trim_end().to_string();
        }

        Some(BlockBody {
            nodes,
            indent: self.cx.source.block_indent(anchor),
        })
    }

    fn tag(&self, element: &JSXElement) -> &str {
        self.cx.source.slice(element.opening.name.span())
    }

    fn children(&mut self, children: &[JSXElementChild]) -> Vec<MarkupNode> {
        let mut nodes = Vec::new();
        for child in children {
            match child {
                JSXElementChild::JSXText(text) => {
                    nodes.push(MarkupNode::Text(self.cx.source.slice(text.span).to_string()))
                }
                JSXElementChild::JSXExprContainer(container) => match &container.expr {
                    JSXExpr::JSXEmptyExpr(_) => nodes.extend(self.comment(container.span)),
                    JSXExpr::Expr(expr) => {
                        let base = self.block_indent(container.span);
                        nodes.extend(self.expression(expr, base));
                    }
                },
                JSXElementChild::JSXElement(element) => {
                    if is_fragment(self.tag(element)) {
                        nodes.extend(self.children(&element.children));
                    } else {
                        nodes.push(self.element(element, false));
                    }
                }
                JSXElementChild::JSXFragment(fragment) => {
                    nodes.extend(self.children(&fragment.children))
                }
                JSXElementChild::JSXSpreadChild(spread) => {
                    nodes.push(self.review(&*spread.expr, "spread children"))
                }
            }
        }
        nodes
    }

    /// `{/* text */}` becomes an HTML comment; other empty containers vanish.
    fn comment(&self, span: Span) -> Option<MarkupNode> {
        let inner = self
            .cx
            .source
            .slice(span)
            .trim_start_matches('{')
            .trim_end_matches('}')
            .trim();
        if let Some(block) = inner
            .strip_prefix("/*")
            .and_then(|rest| rest.strip_suffix("*/"))
        {
            return Some(MarkupNode::Comment(
                block.trim_matches(|c: char| c == '*' || c.is_whitespace()).to_string(),
            ));
        }
        inner
            .strip_prefix("//")
            .map(|line| MarkupNode::Comment(line.trim().to_string()))
    }

    fn expression(&mut self, expr: &Expr, base: usize) -> Vec<MarkupNode> {
        let expr = unwrap_parens(expr);
        if self.is_children(expr) {
            self.uses_slot = true;
            return vec![MarkupNode::Slot];
        }

        match expr {
            Expr::JSXElement(element) if is_fragment(self.tag(element)) => {
                self.children(&element.children)
            }
            Expr::JSXElement(element) => vec![self.element(element, false)],
            Expr::JSXFragment(fragment) => self.children(&fragment.children),
            Expr::Bin(bin) if bin.op == BinaryOp::LogicalAnd && contains_jsx(&*bin.right) => {
                let test = self.cx.render(&*bin.left);
                match self.block_body(&bin.right) {
                    Some(body) => vec![MarkupNode::Conditional(ConditionalBlock {
                        branches: vec![Branch { test, body }],
                        otherwise: None,
                        base,
                    })],
                    None => Vec::new(),
                }
            }
            Expr::Cond(cond) if contains_jsx(cond) => self.conditional(cond, base),
            Expr::Call(call) if is_map_call(call) => match self.iteration(call, base) {
                Some(node) => vec![node],
                None => vec![self.review(expr, "markup expression")],
            },
            _ if contains_jsx(expr) => vec![self.review(expr, "markup expression")],
            _ => vec![MarkupNode::Expression(self.cx.render(expr))],
        }
    }

    fn is_children(&self, expr: &Expr) -> bool {
        match expr {
            Expr::Ident(ident) => {
                ident.sym.as_str() == "children" && self.cx.symbols.is_prop("children")
            }
            Expr::Member(member) if member_prop_name(member) == Some("children") => {
                match unwrap_parens(&member.obj) {
                    Expr::Member(inner) => this_member_name(inner) == Some("props"),
                    Expr::Ident(ident) => {
                        self.cx.scope.props_bag.as_deref() == Some(ident.sym.as_str())
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }

    fn conditional(&mut self, cond: &CondExpr, base: usize) -> Vec<MarkupNode> {
        let mut branches = Vec::new();
        let mut otherwise = None;
        let mut current = cond;

        loop {
            let test = self.cx.render(&*current.test);
            let consequent = unwrap_parens(&current.cons);
            if is_nullish(consequent) {
                if let Some(body) = self.block_body(&current.alt) {
                    branches.push(Branch {
                        test: negate(&test),
                        body,
                    });
                }
                break;
            }

            let body = self.block_body(consequent).unwrap_or_default();
            branches.push(Branch { test, body });

            match unwrap_parens(&current.alt) {
                Expr::Cond(next) => current = next,
                alternate => {
                    otherwise = self.block_body(alternate);
                    break;
                }
            }
        }

        if branches.is_empty() {
            return Vec::new();
        }
        vec![MarkupNode::Conditional(ConditionalBlock {
            branches,
            otherwise,
            base,
        })]
    }

    /// Converts `collection.map(callback)`. Returns `None` for callbacks
    /// that neither return an element directly nor after local declarations.
    fn iteration(&mut self, call: &CallExpr, base: usize) -> Option<MarkupNode> {
        let callee = callee_member(call)?;
        let callback = call.args.first().filter(|arg| arg.spread.is_none())?;

        let (params, body): (Vec<&Pat>, CallbackBody<'_>) = match unwrap_parens(&callback.expr) {
            Expr::Arrow(arrow) => (
                arrow.params.iter().collect(),
                match &*arrow.body {
                    BlockStmtOrExpr::Expr(expr) => CallbackBody::Expr(expr),
                    BlockStmtOrExpr::BlockStmt(block) => CallbackBody::Stmts(&block.stmts),
                },
            ),
            Expr::Fn(function) => (
                function.function.params.iter().map(|param| &param.pat).collect(),
                CallbackBody::Stmts(
                    function
                        .function
                        .body
                        .as_ref()
                        .map_or(&[][..], |block| block.stmts.as_slice()),
                ),
            ),
            _ => return None,
        };
        if params.is_empty() || params.len() > 2 {
            return None;
        }
        let index = match params.get(1) {
            Some(Pat::Ident(binding)) => Some(binding.id.sym.to_string()),
            Some(_) => return None,
            None => None,
        };
        let item = match params[0] {
            Pat::Ident(binding) => binding.id.sym.to_string(),
            other => self.cx.source.slice(other.span()).to_string(),
        };

        let stmts = match body {
            CallbackBody::Expr(expr) => {
                let Expr::JSXElement(element) = unwrap_parens(expr) else {
                    return None;
                };
                let collection = self.cx.render(&*callee.obj);
                return Some(self.each_direct(collection, item, index, element, base));
            }
            CallbackBody::Stmts(stmts) => stmts,
        };

        match stmts {
            [Stmt::Return(ret)] => {
                let Expr::JSXElement(element) = unwrap_parens(ret.arg.as_deref()?) else {
                    return None;
                };
                let collection = self.cx.render(&*callee.obj);
                Some(self.each_direct(collection, item, index, element, base))
            }
            [prefix @ .., Stmt::Return(ret)]
                if matches!(params[0], Pat::Ident(_))
                    && prefix
                        .iter()
                        .all(|stmt| matches!(stmt, Stmt::Decl(Decl::Var(_)))) =>
            {
                let Expr::JSXElement(element) = unwrap_parens(ret.arg.as_deref()?) else {
                    return None;
                };
                let collection = self.cx.render(&*callee.obj);
                Some(self.each_transformed(collection, item, index, prefix, element, call, base))
            }
            _ => None,
        }
    }

    fn each_direct(
        &mut self,
        collection: String,
        item: String,
        index: Option<String>,
        element: &JSXElement,
        base: usize,
    ) -> MarkupNode {
        let index = index.filter(|name| uses_outside_key(element, name));
        MarkupNode::Iteration(IterationBlock {
            collection,
            item,
            index,
            body: self.each_body(element),
            base,
        })
    }

    /// Moves the statements preceding the returned element into a helper
    /// that maps every item to an object of its locals.
    #[allow(clippy::too_many_arguments)]
    fn each_transformed(
        &mut self,
        collection: String,
        item: String,
        index: Option<String>,
        prefix: &[Stmt],
        element: &JSXElement,
        call: &CallExpr,
        base: usize,
    ) -> MarkupNode {
        let mut locals = Vec::new();
        for stmt in prefix {
            if let Stmt::Decl(Decl::Var(decl)) = stmt {
                for declarator in &decl.decls {
                    binding_names(&declarator.name, &mut locals);
                }
            }
        }

        for local in &locals {
            if self.cx.symbols.contains(local) {
                self.cx.diagnostic(
                    DiagnosticCode::AmbiguousShadowing,
                    format!("`{local}` declared in the iteration shadows a component variable"),
                    call.span,
                );
            }
        }

        let helper = self.cx.helper_name(&format!("map{}", pascal_case(last_word(&collection))));
        let params = match &index {
            Some(index) => format!("{item}, {index}"),
            None => item.clone(),
        };
        let mut fields = locals.clone();
        fields.push(item.clone());

        let mut code = format!("function {helper}(items) {{\n  return items.map(({params}) => {{\n");
        for stmt in prefix {
            let statement = self.cx.render_dedented(stmt);
            code.push_str("    ");
            code.push_str(&reindent(&statement, 0, "    "));
            code.push('\n');
        }
        code.push_str(&format!("    return {{ {} }};\n  }});\n}}", fields.join(", ")));
        self.cx
            .manual_review(format!("iteration helper {helper}"), code, call.span);

        let mut destructured = vec![item];
        destructured.extend(locals);
        let index = index.filter(|name| uses_outside_key(element, name));

        MarkupNode::Iteration(IterationBlock {
            collection: format!("{helper}({collection})"),
            item: format!("{{ {} }}", destructured.join(", ")),
            index,
            body: self.each_body(element),
            base,
        })
    }

    fn each_body(&mut self, element: &JSXElement) -> BlockBody {
        if is_fragment(self.tag(element)) {
            return self.fragment_body(&element.children).unwrap_or_default();
        }
        BlockBody {
            nodes: vec![self.element(element, true)],
            indent: self.block_indent(element.span),
        }
    }

    /// Moves an expression into a manual-review block behind a numbered
    /// marker.
    fn review(&mut self, expr: &Expr, reason: &str) -> MarkupNode {
        let marker = self.cx.next_marker();
        let code = self.cx.render_dedented(expr);
        self.cx
            .manual_review(format!("{reason} #{marker}"), code, expr.span());
        MarkupNode::ManualReview(marker)
    }

    fn element(&mut self, element: &JSXElement, strip_key: bool) -> MarkupNode {
        let source = self.cx.source;
        let opening = &element.opening;
        let tag = self.tag(element).to_string();
        let is_component = is_component_tag(&tag);

        let mut attributes = Vec::new();
        let mut cursor = source.offset(opening.name.span().hi);
        for attr in &opening.attrs {
            match attr {
                JSXAttrOrSpread::JSXAttr(attr) => {
                    let range = source.range(attr.span);
                    let leading = source.slice_range(cursor..range.start).to_string();
                    cursor = range.end;
                    if strip_key && attr_name(attr) == "key" {
                        continue;
                    }
                    if let Some(attribute) = self.attribute(attr, is_component, leading) {
                        attributes.push(attribute);
                    }
                }
                JSXAttrOrSpread::SpreadElement(spread) => {
                    let dots = source.offset(spread.dot3_token.lo);
                    let open = source.text()[..dots].rfind('{').unwrap_or(dots);
                    let expr_end = source.offset(spread.expr.span().hi);
                    let close = source.text()[expr_end..]
                        .find('}')
                        .map_or(expr_end, |i| expr_end + i + 1);
                    let leading = source.slice_range(cursor..open).to_string();
                    cursor = close;
                    attributes.push(Attribute {
                        kind: AttributeKind::Spread,
                        name: String::new(),
                        value: AttributeValue::Expression(self.cx.render(&*spread.expr)),
                        leading,
                    });
                }
            }
        }

        let end = source.offset(opening.span.hi);
        let close_len = if opening.self_closing { 2 } else { 1 };
        let tail = source.slice_range(cursor..end.saturating_sub(close_len).max(cursor));
        let before_close = if tail.trim().is_empty() {
            tail.to_string()
        } else {
            String::new()
        };

        let children = if opening.self_closing {
            Vec::new()
        } else {
            self.children(&element.children)
        };

        MarkupNode::Element(ElementNode {
            tag,
            attributes,
            children,
            self_closing: opening.self_closing,
            before_close,
        })
    }

    fn attribute(&mut self, attr: &JSXAttr, is_component: bool, leading: String) -> Option<Attribute> {
        let name = attr_name(attr);
        let expr = match &attr.value {
            Some(JSXAttrValue::JSXExprContainer(container)) => match &container.expr {
                JSXExpr::Expr(expr) => Some(&**expr),
                JSXExpr::JSXEmptyExpr(_) => None,
            },
            _ => None,
        };
        let literal = match &attr.value {
            None | Some(JSXAttrValue::JSXExprContainer(_)) => None,
            Some(other) => Some(self.cx.source.slice(other.span()).to_string()),
        };

        if name == "className" || name == "class" {
            return self.class_attribute(expr, literal, leading);
        }
        if name == "ref" && !is_component {
            if let Some(expr) = expr {
                return Some(self.ref_attribute(expr, leading));
            }
        }

        let value = match (expr, literal) {
            (Some(expr), _) => AttributeValue::Expression(self.cx.render(expr)),
            (None, Some(literal)) => AttributeValue::Literal(literal),
            (None, None) => AttributeValue::None,
        };

        if is_component {
            return Some(Attribute {
                kind: AttributeKind::Plain,
                name,
                value,
                leading,
            });
        }

        if let Some((event, directive)) = event_directive(&name) {
            return Some(Attribute {
                kind: AttributeKind::Event(event),
                name: directive,
                value,
                leading,
            });
        }

        let name = match name.as_str() {
            "htmlFor" => "for".to_string(),
            "defaultValue" => "value".to_string(),
            "defaultChecked" => "checked".to_string(),
            _ => name,
        };
        Some(Attribute {
            kind: AttributeKind::Plain,
            name,
            value,
            leading,
        })
    }

    fn ref_attribute(&mut self, expr: &Expr, leading: String) -> Attribute {
        let target = self.cx.render(expr);
        if is_identifier(&target) {
            self.cx.symbols.add_ref(&target);
            return Attribute {
                kind: AttributeKind::Ref,
                name: "bind:this".to_string(),
                value: AttributeValue::Expression(target),
                leading,
            };
        }

        self.cx.diagnostic(
            DiagnosticCode::ManualReview,
            "ref that is not a plain variable needs manual review",
            expr.span(),
        );
        Attribute {
            kind: AttributeKind::Plain,
            name: "ref".to_string(),
            value: AttributeValue::Expression(target),
            leading,
        }
    }

    /// Inlines style-module class names into `class`. The default style
    /// binding stands for the generated root class and is dropped.
    fn class_attribute(
        &mut self,
        expr: Option<&Expr>,
        literal: Option<String>,
        leading: String,
    ) -> Option<Attribute> {
        let class = |value| Attribute {
            kind: AttributeKind::Class,
            name: "class".to_string(),
            value,
            leading: leading.clone(),
        };

        let pieces = match (expr.map(unwrap_parens), literal) {
            (None, Some(literal)) => return Some(class(AttributeValue::Literal(literal))),
            (None, None) => return None,
            (Some(Expr::Tpl(tpl)), _) => self.template_pieces(tpl),
            (Some(Expr::Lit(Lit::Str(value))), _) => {
                vec![ClassPiece::Text(value.value.to_string_lossy().into_owned())]
            }
            (Some(Expr::Ident(ident)), _) => match self.style_class(ident.sym.as_str()) {
                Some(piece) => vec![piece],
                None => vec![ClassPiece::Live(self.cx.render(ident))],
            },
            (Some(other), _) => {
                return Some(class(AttributeValue::Expression(self.cx.render(other))))
            }
        };

        compose_class(pieces).map(class)
    }

    fn style_class(&self, name: &str) -> Option<ClassPiece> {
        let style = self.cx.style?;
        if style.is_placeholder(name) {
            return Some(ClassPiece::Text(String::new()));
        }
        style
            .exported_value(name)
            .map(|value| ClassPiece::Text(value.to_string()))
    }

    fn template_pieces(&mut self, tpl: &Tpl) -> Vec<ClassPiece> {
        let mut pieces = Vec::new();
        for (i, quasi) in tpl.quasis.iter().enumerate() {
            pieces.push(ClassPiece::Text(quasi.raw.to_string()));
            let Some(expr) = tpl.exprs.get(i) else {
                continue;
            };
            let piece = match unwrap_parens(expr) {
                Expr::Ident(ident) => self.style_class(ident.sym.as_str()),
                _ => None,
            };
            pieces.push(piece.unwrap_or_else(|| ClassPiece::Live(self.cx.render(&**expr))));
        }
        pieces
    }
}

/// Joins class pieces, collapsing whitespace outside interpolations. Returns
/// `None` when nothing remains.
fn compose_class(pieces: Vec<ClassPiece>) -> Option<AttributeValue> {
    let mut text = String::new();
    let mut live = Vec::new();
    for piece in pieces {
        match piece {
            ClassPiece::Text(value) => text.push_str(&value),
            ClassPiece::Live(expr) => {
                text.push_str(&format!("\u{0}{}\u{0}", live.len()));
                live.push(expr);
            }
        }
    }

    let mut collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return None;
    }
    if live.is_empty() {
        return Some(AttributeValue::Literal(format!("\"{collapsed}\"")));
    }
    for (i, expr) in live.iter().enumerate() {
        collapsed = collapsed.replace(&format!("\u{0}{i}\u{0}"), &format!("{{{expr}}}"));
    }
    Some(AttributeValue::Interpolated(collapsed))
}

fn attr_name(attr: &JSXAttr) -> String {
    match &attr.name {
        JSXAttrName::Ident(ident) => ident.sym.to_string(),
        JSXAttrName::JSXNamespacedName(name) => format!("{}:{}", name.ns.sym, name.name.sym),
    }
}

/// Maps `onClick` to `("click", "on:click")`. Capture handlers get the
/// `capture` modifier.
fn event_directive(name: &str) -> Option<(String, String)> {
    let rest = name.strip_prefix("on")?;
    if !rest.starts_with(|c: char| c.is_ascii_uppercase()) {
        return None;
    }
    let (event, capture) = match rest.strip_suffix("Capture") {
        Some(event) if !event.is_empty() => (event, true),
        _ => (rest, false),
    };
    let event = match event.to_ascii_lowercase().as_str() {
        "doubleclick" => "dblclick".to_string(),
        other => other.to_string(),
    };
    let directive = if capture {
        format!("on:{event}|capture")
    } else {
        format!("on:{event}")
    };
    Some((event, directive))
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

fn is_component_tag(tag: &str) -> bool {
    tag.contains('.') || tag.starts_with(|c: char| c.is_ascii_uppercase())
}

fn is_fragment(tag: &str) -> bool {
    tag == "Fragment" || tag == "React.Fragment"
}

fn is_nullish(expr: &Expr) -> bool {
    match unwrap_parens(expr) {
        Expr::Lit(Lit::Null(_)) => true,
        Expr::Lit(Lit::Bool(value)) => !value.value,
        Expr::Ident(ident) => ident.sym.as_str() == "undefined",
        _ => false,
    }
}

fn is_map_call(call: &CallExpr) -> bool {
    callee_member(call).is_some_and(|callee| member_prop_name(callee) == Some("map"))
}

fn negate(test: &str) -> String {
    if test
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '$' || c == '.')
    {
        format!("!{test}")
    } else {
        format!("!({test})")
    }
}

/// Whether `name` is referenced by the element other than in its `key`.
fn uses_outside_key(element: &JSXElement, name: &str) -> bool {
    let mut finder = IdentFinder::new(name);
    for attr in &element.opening.attrs {
        if let JSXAttrOrSpread::JSXAttr(attr) = attr {
            if attr_name(attr) == "key" {
                continue;
            }
        }
        attr.visit_with(&mut finder);
    }
    element.children.visit_with(&mut finder);
    finder.found()
}

fn last_word(expr: &str) -> &str {
    expr.rsplit(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
        .find(|word| !word.is_empty())
        .unwrap_or("items")
}

fn pascal_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn write_nodes(nodes: &[MarkupNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        node.write(&mut out);
    }
    out
}

impl MarkupNode {
    fn write(&self, out: &mut String) {
        match self {
            MarkupNode::Element(element) => element.write(out),
            MarkupNode::Text(text) => out.push_str(text),
            MarkupNode::Expression(expr) => {
                out.push('{');
                out.push_str(expr);
                out.push('}');
            }
            MarkupNode::Comment(text) => out.push_str(&format!("<!-- {text} -->")),
            MarkupNode::Conditional(block) => block.write(out),
            MarkupNode::Iteration(block) => block.write(out),
            MarkupNode::Slot => out.push_str("<slot />"),
            MarkupNode::ManualReview(marker) => {
                out.push_str(&format!("<!-- MANUAL REVIEW #{marker} -->"))
            }
        }
    }
}

impl ElementNode {
    fn write(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for attribute in &self.attributes {
            out.push_str(&attribute.leading);
            attribute.write(out);
        }
        out.push_str(&self.before_close);
        if self.self_closing {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            child.write(out);
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

impl Attribute {
    fn write(&self, out: &mut String) {
        if self.kind == AttributeKind::Spread {
            if let AttributeValue::Expression(expr) = &self.value {
                out.push_str(&format!("{{...{expr}}}"));
            }
            return;
        }
        out.push_str(&self.name);
        match &self.value {
            AttributeValue::None => {}
            AttributeValue::Literal(literal) => {
                out.push('=');
                out.push_str(literal);
            }
            AttributeValue::Expression(expr) => out.push_str(&format!("={{{expr}}}")),
            AttributeValue::Interpolated(text) => out.push_str(&format!("=\"{text}\"")),
        }
    }
}

impl BlockBody {
    /// Writes the body on its own lines, indented one level past `base`.
    fn write(&self, out: &mut String, base: usize) {
        let inner = " ".repeat(base + 2);
        out.push('\n');
        out.push_str(&inner);
        out.push_str(&reindent(&write_nodes(&self.nodes), self.indent, &inner));
        out.push('\n');
        out.push_str(&" ".repeat(base));
    }
}

impl ConditionalBlock {
    fn write(&self, out: &mut String) {
        for (i, branch) in self.branches.iter().enumerate() {
            if i == 0 {
                out.push_str(&format!("{{#if {}}}", branch.test));
            } else {
                out.push_str(&format!("{{:else if {}}}", branch.test));
            }
            branch.body.write(out, self.base);
        }
        if let Some(otherwise) = &self.otherwise {
            out.push_str("{:else}");
            otherwise.write(out, self.base);
        }
        out.push_str("{/if}");
    }
}

impl IterationBlock {
    fn write(&self, out: &mut String) {
        out.push_str(&format!("{{#each {} as {}", self.collection, self.item));
        if let Some(index) = &self.index {
            out.push_str(", ");
            out.push_str(index);
        }
        out.push('}');
        self.body.write(out, self.base);
        out.push_str("{/each}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imports::StyleImport;
    use crate::parse::parse_component;
    use crate::source::SourceText;
    use pretty_assertions::assert_eq;
    use style_compiler::{compile_module, StyleModule, StyleOptions};
    use swc_ecma_ast::{ModuleItem, Stmt};

    /// Converts the expression of the last statement in `source`.
    fn convert_with(source: &str, style: Option<&StyleImport>, setup: impl FnOnce(&mut Context<'_>)) -> (Markup, Vec<String>) {
        let parsed = parse_component(source, "Test.jsx").unwrap();
        let text = SourceText::new(source, parsed.start);
        let mut cx = Context::new(text, style);
        setup(&mut cx);
        let Some(ModuleItem::Stmt(Stmt::Expr(stmt))) = parsed.module.body.last() else {
            panic!("expected an expression statement");
        };
        let markup = build_markup(&mut cx, &stmt.expr);
        let reviews = cx.manual_review.iter().map(|b| b.code.clone()).collect();
        (markup, reviews)
    }

    fn convert(source: &str) -> String {
        convert_with(source, None, |_| {}).0.text
    }

    fn style_import() -> StyleImport {
        let source = "const ROOT_CLASS = 'widget';\nexport const MODIFIER = 'is--on';\nexport { ROOT_CLASS };\nexport default css`\n  color: red;\n`;";
        let module = StyleModule::parse(source, "styles.js").unwrap();
        let sheet = compile_module(&module, &StyleOptions::default()).unwrap();
        StyleImport {
            specifier: "./styles".to_string(),
            placeholder: Some("styles".to_string()),
            named: vec![
                ("ROOT_CLASS".to_string(), "ROOT_CLASS".to_string()),
                ("MODIFIER".to_string(), "MODIFIER".to_string()),
            ],
            module,
            sheet,
            span: Span::default(),
        }
    }

    #[test]
    fn test_class_names_are_inlined() {
        let style = style_import();
        let (markup, _) = convert_with(
            "(<div className={`${ROOT_CLASS} ${styles} extra`} />);",
            Some(&style),
            |_| {},
        );
        assert_eq!(markup.text, "<div class=\"widget extra\" />");

        let (markup, _) = convert_with(
            "(<div className={styles}><b className={`${ROOT_CLASS}__title ${open ? MODIFIER : ''}`}>x</b></div>);",
            Some(&style),
            |_| {},
        );
        assert_eq!(
            markup.text,
            "<div><b class=\"widget__title {open ? MODIFIER : ''}\">x</b></div>"
        );
    }

    #[test]
    fn test_attribute_renames_and_events() {
        let text = convert(
            "(<label htmlFor=\"name\" onClick={this.handleClick} onDoubleClick={f} onKeyDownCapture={g}><Button onClick={h} /></label>);",
        );
        assert_eq!(
            text,
            "<label for=\"name\" on:click={handleClick} on:dblclick={f} on:keydown|capture={g}><Button onClick={h} /></label>"
        );
    }

    #[test]
    fn test_ref_becomes_bind_this() {
        let (markup, _) = convert_with("(<input ref={this.inputRef} />);", None, |cx| {
            cx.symbols.add_ref("inputRef");
        });
        assert_eq!(markup.text, "<input bind:this={inputRef} />");
    }

    #[test]
    fn test_logical_and_becomes_if() {
        let source = "(\n  <div>\n    {open && (\n      <p>\n        hi\n      </p>\n    )}\n  </div>\n);";
        assert_eq!(
            convert(source),
            "<div>\n  {#if open}\n    <p>\n      hi\n    </p>\n  {/if}\n</div>"
        );
    }

    #[test]
    fn test_ternary_chain() {
        let source = "(\n  <div>\n    {a ? <A /> : b ? <B /> : <C />}\n  </div>\n);";
        assert_eq!(
            convert(source),
            "<div>\n  {#if a}\n    <A />\n  {:else if b}\n    <B />\n  {:else}\n    <C />\n  {/if}\n</div>"
        );
    }

    #[test]
    fn test_ternary_with_null_branch() {
        assert_eq!(
            convert("(<div>{busy ? null : <Spinner />}</div>);"),
            "<div>{#if !busy}\n  <Spinner />\n{/if}</div>"
        );
        assert_eq!(
            convert("(<div>{busy ? <Spinner /> : null}</div>);"),
            "<div>{#if busy}\n  <Spinner />\n{/if}</div>"
        );
    }

    #[test]
    fn test_map_with_unused_index() {
        let source = "(\n  <ul>\n    {items.map((item, i) => <li key={i}>{item}</li>)}\n  </ul>\n);";
        assert_eq!(
            convert(source),
            "<ul>\n  {#each items as item}\n    <li>{item}</li>\n  {/each}\n</ul>"
        );
    }

    #[test]
    fn test_map_with_used_index() {
        let source = "(<ol>{rows.map((row, i) => <li key={row.id}>{i}: {row.name}</li>)}</ol>);";
        assert_eq!(
            convert(source),
            "<ol>{#each rows as row, i}\n  <li>{i}: {row.name}</li>\n{/each}</ol>"
        );
    }

    #[test]
    fn test_map_with_locals_uses_helper() {
        let source = "(\n  <ul>\n    {this.props.users.map((user) => {\n      const label = user.name.trim();\n      return <li key={user.id}>{label}</li>;\n    })}\n  </ul>\n);";
        let (markup, reviews) = convert_with(source, None, |cx| {
            cx.symbols.add_state("label", None);
        });
        assert_eq!(
            markup.text,
            "<ul>\n  {#each mapUsers(users) as { user, label }}\n    <li>{label}</li>\n  {/each}\n</ul>"
        );
        assert_eq!(
            reviews,
            vec![
                "function mapUsers(items) {\n  return items.map((user) => {\n    const label = user.name.trim();\n    return { label, user };\n  });\n}"
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_iteration_local_shadowing_a_prop() {
        let source = "(\n  <ul>\n    {this.props.items.map((item) => {\n      const label = item.title;\n      return <li key={item.id}>{label}</li>;\n    })}\n  </ul>\n);";
        let parsed = parse_component(source, "Test.jsx").unwrap();
        let mut cx = Context::new(SourceText::new(source, parsed.start), None);
        cx.symbols.add_prop("label", None);
        let Some(ModuleItem::Stmt(Stmt::Expr(stmt))) = parsed.module.body.last() else {
            panic!("expected an expression statement");
        };
        let markup = build_markup(&mut cx, &stmt.expr);

        assert_eq!(
            markup.text,
            "<ul>\n  {#each mapItems(items) as { item, label }}\n    <li>{label}</li>\n  {/each}\n</ul>"
        );
        let codes: Vec<DiagnosticCode> = cx.diagnostics.iter().map(|d| d.code).collect();
        assert_eq!(
            codes,
            vec![DiagnosticCode::AmbiguousShadowing, DiagnosticCode::ManualReview]
        );
        assert_eq!(
            cx.diagnostics[0].message,
            "`label` declared in the iteration shadows a component variable"
        );
        assert_eq!(cx.manual_review.len(), 1);
        assert_eq!(cx.manual_review[0].reason, "iteration helper mapItems");
    }

    #[test]
    fn test_unconvertible_expression_gets_marker() {
        let (markup, reviews) = convert_with("(<div>{renderRows(<Row />)}</div>);", None, |_| {});
        assert_eq!(markup.text, "<div><!-- MANUAL REVIEW #1 --></div>");
        assert_eq!(reviews, vec!["renderRows(<Row />)".to_string()]);
    }

    #[test]
    fn test_children_become_slot() {
        let (markup, _) = convert_with("(<section>{this.props.children}</section>);", None, |_| {});
        assert_eq!(markup.text, "<section><slot /></section>");
        assert!(markup.uses_slot);
    }

    #[test]
    fn test_fragments_and_comments() {
        let source = "(\n  <>\n    {/* heading */}\n    <h1>Title</h1>\n  </>\n);";
        assert_eq!(convert(source), "<!-- heading -->\n<h1>Title</h1>");
    }

    #[test]
    fn test_event_directive() {
        assert_eq!(
            event_directive("onClick"),
            Some(("click".to_string(), "on:click".to_string()))
        );
        assert_eq!(event_directive("one"), None);
        assert_eq!(
            event_directive("onMouseEnterCapture"),
            Some(("mouseenter".to_string(), "on:mouseenter|capture".to_string()))
        );
    }
}

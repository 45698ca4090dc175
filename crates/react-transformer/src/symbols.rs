//! The component symbol table.
//!
//! Collects the props, state, refs and style constants discovered while the
//! component is rewritten. Every list keeps first-occurrence order; sorting
//! happens when declarations are produced.

use rustc_hash::FxHashSet;

/// A component input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropDescriptor {
    /// The prop name.
    pub name: String,
    /// The default value expression.
    pub default_value: Option<String>,
}

/// An internal, render-affecting variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateDescriptor {
    /// The variable name.
    pub name: String,
    /// The initial value expression.
    pub initial_value: Option<String>,
}

/// An element reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefDescriptor {
    /// The variable bound to the element.
    pub name: String,
}

/// The declaration keyword of a generated variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    /// `export let`
    Prop,
    /// `let`
    Let,
    /// `const`
    Const,
}

impl DeclKind {
    /// The keyword text.
    pub fn keyword(&self) -> &'static str {
        match self {
            DeclKind::Prop => "export let",
            DeclKind::Let => "let",
            DeclKind::Const => "const",
        }
    }
}

/// A generated variable declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// The keyword.
    pub kind: DeclKind,
    /// The variable name.
    pub name: String,
    /// The initializer, if any.
    pub value: Option<String>,
}

impl Declaration {
    /// Serializes the declaration as one statement.
    pub fn to_line(&self) -> String {
        match &self.value {
            Some(value) => format!("{} {} = {};", self.kind.keyword(), self.name, value),
            None => format!("{} {};", self.kind.keyword(), self.name),
        }
    }
}

/// Props, state, refs and style constants of one component.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    props: Vec<PropDescriptor>,
    constructor_state: Vec<StateDescriptor>,
    refs: Vec<RefDescriptor>,
    state: Vec<StateDescriptor>,
    style_constants: Vec<(String, String)>,
}

impl SymbolTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a prop. A default is recorded only if none was seen before.
    pub fn add_prop(&mut self, name: &str, default_value: Option<String>) {
        match self.props.iter_mut().find(|p| p.name == name) {
            Some(existing) => {
                if existing.default_value.is_none() {
                    existing.default_value = default_value;
                }
            }
            None => self.props.push(PropDescriptor {
                name: name.to_string(),
                default_value,
            }),
        }
    }

    /// Removes a prop.
    pub fn remove_prop(&mut self, name: &str) {
        self.props.retain(|p| p.name != name);
    }

    /// Registers state initialized in the constructor or a `state` field.
    pub fn add_constructor_state(&mut self, name: &str, initial_value: Option<String>) {
        add_state_to(&mut self.constructor_state, name, initial_value);
    }

    /// Registers any other state variable.
    pub fn add_state(&mut self, name: &str, initial_value: Option<String>) {
        add_state_to(&mut self.state, name, initial_value);
    }

    /// Registers an element reference.
    pub fn add_ref(&mut self, name: &str) {
        if !self.is_ref(name) {
            self.refs.push(RefDescriptor {
                name: name.to_string(),
            });
        }
    }

    /// Registers a style-module constant that is still referenced.
    pub fn add_style_constant(&mut self, name: &str, value: &str) {
        if !self.style_constants.iter().any(|(n, _)| n == name) {
            self.style_constants
                .push((name.to_string(), value.to_string()));
        }
    }

    /// Whether `name` is a prop.
    pub fn is_prop(&self, name: &str) -> bool {
        self.props.iter().any(|p| p.name == name)
    }

    /// Whether `name` is a registered element reference.
    pub fn is_ref(&self, name: &str) -> bool {
        self.refs.iter().any(|r| r.name == name)
    }

    /// Whether `name` is a state variable of either kind.
    pub fn is_state(&self, name: &str) -> bool {
        self.constructor_state
            .iter()
            .chain(&self.state)
            .any(|s| s.name == name)
    }

    /// Whether `name` is any component symbol.
    pub fn contains(&self, name: &str) -> bool {
        self.is_prop(name) || self.is_ref(name) || self.is_state(name)
    }

    /// `export let` declarations sorted case-insensitively.
    pub fn prop_declarations(&self) -> Vec<Declaration> {
        let mut declarations: Vec<Declaration> = self
            .props
            .iter()
            .map(|prop| Declaration {
                kind: DeclKind::Prop,
                name: prop.name.clone(),
                value: Some(
                    prop.default_value
                        .clone()
                        .unwrap_or_else(|| "undefined".to_string()),
                ),
            })
            .collect();
        sort_case_insensitive(&mut declarations);
        declarations
    }

    /// Internal declarations: constructor state, refs, then other state,
    /// de-duplicated by first occurrence and sorted case-insensitively.
    /// Names that are props are skipped.
    pub fn internal_declarations(&self) -> Vec<Declaration> {
        let mut seen: FxHashSet<&str> = self.props.iter().map(|p| p.name.as_str()).collect();
        let mut declarations = Vec::new();

        let candidates = self
            .style_constants
            .iter()
            .map(|(name, value)| (DeclKind::Const, name, Some(format!("'{value}'"))))
            .chain(
                self.constructor_state
                    .iter()
                    .map(|s| (DeclKind::Let, &s.name, s.initial_value.clone())),
            )
            .chain(self.refs.iter().map(|r| (DeclKind::Let, &r.name, None)))
            .chain(
                self.state
                    .iter()
                    .map(|s| (DeclKind::Let, &s.name, s.initial_value.clone())),
            );

        for (kind, name, value) in candidates {
            if seen.insert(name.as_str()) {
                declarations.push(Declaration {
                    kind,
                    name: name.clone(),
                    value,
                });
            }
        }

        sort_case_insensitive(&mut declarations);
        declarations
    }
}

fn add_state_to(list: &mut Vec<StateDescriptor>, name: &str, initial_value: Option<String>) {
    match list.iter_mut().find(|s| s.name == name) {
        Some(existing) => {
            if existing.initial_value.is_none() {
                existing.initial_value = initial_value;
            }
        }
        None => list.push(StateDescriptor {
            name: name.to_string(),
            initial_value,
        }),
    }
}

fn sort_case_insensitive(declarations: &mut [Declaration]) {
    declarations.sort_by_cached_key(|d| d.name.to_lowercase());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(declarations: &[Declaration]) -> Vec<String> {
        declarations.iter().map(Declaration::to_line).collect()
    }

    #[test]
    fn test_prop_first_default_wins() {
        let mut table = SymbolTable::new();
        table.add_prop("value1", None);
        table.add_prop("items", Some("[]".to_string()));
        table.add_prop("value1", Some("'A'".to_string()));
        table.add_prop("value1", Some("'B'".to_string()));
        table.add_prop("Zeta", None);

        assert_eq!(
            lines(&table.prop_declarations()),
            vec![
                "export let items = [];",
                "export let value1 = 'A';",
                "export let Zeta = undefined;",
            ]
        );
    }

    #[test]
    fn test_internal_declaration_order() {
        let mut table = SymbolTable::new();
        table.add_state("btnDisabled", None);
        table.add_constructor_state("btnDisabled", Some("true".to_string()));
        table.add_ref("inputRef");
        table.add_state("inputRef", None);
        table.add_state("Timer", Some("null".to_string()));
        table.add_style_constant("MODIFIER__DISABLED", "is--disabled");
        table.add_prop("value", None);
        table.add_state("value", None);

        assert_eq!(
            lines(&table.internal_declarations()),
            vec![
                "let btnDisabled = true;",
                "let inputRef;",
                "const MODIFIER__DISABLED = 'is--disabled';",
                "let Timer = null;",
            ]
        );
    }

    #[test]
    fn test_remove_prop() {
        let mut table = SymbolTable::new();
        table.add_prop("children", None);
        assert!(table.contains("children"));
        table.remove_prop("children");
        assert!(!table.contains("children"));
    }
}

//! Style compilation against the component fixtures.

use pretty_assertions::assert_eq;
use smol_str::SmolStr;
use std::fs;
use std::path::PathBuf;
use style_compiler::{
    compile, compile_module, flatten_rules, CssRule, StyleError, StyleModule, StyleOptions,
    StyleTemplate, StyleVariable, TemplateReference,
};

fn fixture(component: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("test-fixtures")
        .join("components")
        .join(component)
        .join("styles.js");
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {path:?}: {e}"))
}

fn rule(selector: &str, declarations: &[&str]) -> CssRule {
    CssRule::new(
        selector,
        declarations.iter().map(|d| d.to_string()).collect(),
    )
}

#[test]
fn search_panel_flattens_nested_rules() {
    let sheet = compile(&fixture("SearchPanel"), &StyleOptions::default()).unwrap();

    assert_eq!(
        sheet.rules,
        vec![
            rule(":root", &["--accent-color: #a755a4;"]),
            rule(".search-panel", &["max-width: 30em;", "overflow: auto;"]),
            rule("h3", &["margin-top: 0;"]),
            rule("[type=\"text\"]", &["width: 100%;", "padding: 0.25em;"]),
            rule("nav", &["margin-top: 0.5em;", "display: flex;"]),
            rule("nav button", &["width: 100%;"]),
            rule("nav button:not(:first-of-type)", &["margin-left: 0.5em;"]),
            rule(
                ".search-panel__results",
                &["border-top: solid 1px var(--accent-color);"]
            ),
            rule(".search-panel__results li", &["padding: 0.25em;"]),
            rule(
                ".search-panel__label",
                &["color: var(--accent-color);", "font-weight: bold;"]
            ),
        ]
    );
    assert_eq!(sheet.custom_properties.len(), 1);
}

#[test]
fn search_panel_serialization() {
    let sheet = compile(&fixture("SearchPanel"), &StyleOptions::default()).unwrap();
    let css = sheet.to_css();

    assert!(css.starts_with(":root {\n  --accent-color: #a755a4;\n}\n\n.search-panel {\n"));
    assert!(css.contains("\n\nnav button {\n  width: 100%;\n}\n"));
    assert!(!css.contains('&'));
    assert!(!css.contains("${"));
}

#[test]
fn flattening_is_idempotent() {
    for component in ["SearchPanel", "Toggle"] {
        let sheet = compile(&fixture(component), &StyleOptions::default()).unwrap();
        let reflattened = flatten_rules(&sheet.to_css(), None).unwrap();
        assert_eq!(reflattened, sheet.rules, "{component}");
    }
}

#[test]
fn toggle_strips_top_level_ampersand() {
    let sheet = compile(&fixture("Toggle"), &StyleOptions::default()).unwrap();
    let selectors: Vec<&str> = sheet.rules.iter().map(|r| r.selector.as_str()).collect();
    assert_eq!(
        selectors,
        vec![".toggle", ".toggle__input", ".toggle__btn", ".is--disabled"]
    );
}

#[test]
fn bare_declarations_and_root_rule_stay_separate() {
    let module = StyleModule::new(
        indexmap_of(&[("ROOT_CLASS", "root")]),
        StyleTemplate::literal("width: 10px;\n\n.root { color: red; }"),
    );

    let sheet = compile_module(&module, &StyleOptions::default()).unwrap();
    assert_eq!(
        sheet.rules,
        vec![
            rule(".root", &["width: 10px;"]),
            rule(".root", &["color: red;"]),
        ]
    );
}

#[test]
fn root_group_nests_rules_and_media_queries() {
    let module = StyleModule::new(
        indexmap_of(&[("ROOT_CLASS", "r")]),
        StyleTemplate::literal(
            "\n  color: red;\n  .child {\n    width: 0;\n  }\n  @media (min-width: 1px) {\n    color: blue;\n  }\n",
        ),
    );

    let sheet = compile_module(&module, &StyleOptions::default()).unwrap();
    assert_eq!(
        sheet.rules,
        vec![
            rule(".r", &["color: red;"]),
            rule(".r .child", &["width: 0;"]),
            CssRule {
                selector: ".r".to_string(),
                declarations: vec!["color: blue;".to_string()],
                conditions: vec!["@media (min-width: 1px)".to_string()],
            },
        ]
    );
}

#[test]
fn comments_are_ignored() {
    let module = StyleModule::new(
        Default::default(),
        StyleTemplate::literal(
            "\n  /* layout */\n  .a {\n    color: red;\n  }\n\n  /* child { */\n\n  .b {\n    /* width: 0; */\n    margin: 0;\n  }\n",
        ),
    );

    let sheet = compile_module(&module, &StyleOptions::default()).unwrap();
    assert_eq!(
        sheet.rules,
        vec![rule(".a", &["color: red;"]), rule(".b", &["margin: 0;"])]
    );
}

#[test]
fn template_without_rules_produces_single_rule() {
    let module = StyleModule::new(
        indexmap_of(&[("ROOT_CLASS", "box")]),
        StyleTemplate::literal("\n  margin: 0;\n  padding: 0;\n"),
    );
    let sheet = compile_module(&module, &StyleOptions::default()).unwrap();
    assert_eq!(sheet.rules, vec![rule(".box", &["margin: 0;", "padding: 0;"])]);
}

#[test]
fn missing_root_class_is_an_error() {
    let module = StyleModule::new(
        Default::default(),
        StyleTemplate::literal("\n  margin: 0;\n"),
    );
    let err = compile_module(&module, &StyleOptions::default()).unwrap_err();
    assert!(matches!(err, StyleError::MissingRootClass { .. }));
}

#[test]
fn unresolved_variable_policy() {
    let module = StyleModule::new(
        indexmap_of(&[("ROOT_CLASS", "box")]),
        StyleTemplate {
            quasis: vec!["\n  color: ".to_string(), ";\n".to_string()],
            references: vec![TemplateReference::Variable(SmolStr::new("THEME"))],
        },
    );

    let err = compile_module(&module, &StyleOptions::default()).unwrap_err();
    assert_eq!(
        err,
        StyleError::UnresolvedVariable {
            name: "THEME".to_string()
        }
    );

    let lenient = StyleOptions {
        strict_variables: false,
        ..StyleOptions::default()
    };
    let sheet = compile_module(&module, &lenient).unwrap();
    assert_eq!(sheet.rules, vec![rule(".box", &["color: ;"])]);
}

fn indexmap_of(exports: &[(&str, &str)]) -> indexmap::IndexMap<SmolStr, StyleVariable> {
    exports
        .iter()
        .map(|(name, value)| {
            (
                SmolStr::new(name),
                StyleVariable {
                    value: value.to_string(),
                    exported: true,
                },
            )
        })
        .collect()
}

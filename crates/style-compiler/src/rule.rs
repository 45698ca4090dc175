//! Flat CSS rules and their serialization.

use crate::template::CustomProperty;

const INDENT: &str = "  ";

/// A flat CSS rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CssRule {
    /// Flat selector text.
    pub selector: String,
    /// Declaration lines in source order, without indentation.
    pub declarations: Vec<String>,
    /// Enclosing at-rule preludes, outermost first.
    pub conditions: Vec<String>,
}

impl CssRule {
    /// Creates an unconditional rule.
    pub fn new(selector: impl Into<String>, declarations: Vec<String>) -> Self {
        Self {
            selector: selector.into(),
            declarations,
            conditions: Vec::new(),
        }
    }

    /// Serializes the rule, wrapped in its at-rule blocks.
    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for (depth, condition) in self.conditions.iter().enumerate() {
            lines.push(format!("{}{condition} {{", INDENT.repeat(depth)));
        }
        self.push_body(self.conditions.len(), &mut lines);
        for depth in (0..self.conditions.len()).rev() {
            lines.push(format!("{}}}", INDENT.repeat(depth)));
        }
        lines
    }

    fn push_body(&self, depth: usize, lines: &mut Vec<String>) {
        let pad = INDENT.repeat(depth);
        lines.push(format!("{pad}{} {{", self.selector));
        for declaration in &self.declarations {
            lines.push(format!("{pad}{INDENT}{declaration}"));
        }
        lines.push(format!("{pad}}}"));
    }
}

/// The compiled style sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSheet {
    /// Rules in output order, including the hoisted `:root` rule.
    pub rules: Vec<CssRule>,
    /// The custom properties referenced by the template.
    pub custom_properties: Vec<CustomProperty>,
}

impl StyleSheet {
    /// Returns true if the sheet has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Serializes the sheet.
    ///
    /// Rules are separated by one blank line. Consecutive rules sharing the
    /// same conditions are grouped in a single at-rule block.
    pub fn to_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = Vec::new();
        let mut index = 0;

        while index < self.rules.len() {
            let conditions = &self.rules[index].conditions;
            let group_end = self.rules[index..]
                .iter()
                .position(|rule| &rule.conditions != conditions)
                .map_or(self.rules.len(), |offset| index + offset);

            if !lines.is_empty() {
                lines.push(String::new());
            }

            for (depth, condition) in conditions.iter().enumerate() {
                lines.push(format!("{}{condition} {{", INDENT.repeat(depth)));
            }
            for (position, rule) in self.rules[index..group_end].iter().enumerate() {
                if position > 0 {
                    lines.push(String::new());
                }
                rule.push_body(conditions.len(), &mut lines);
            }
            for depth in (0..conditions.len()).rev() {
                lines.push(format!("{}}}", INDENT.repeat(depth)));
            }

            index = group_end;
        }

        lines
    }

    /// Serializes the sheet as a single string without a trailing newline.
    pub fn to_css(&self) -> String {
        self.to_lines().join("\n")
    }
}

/// Prepends a `:root` rule declaring every custom property.
///
/// An empty table leaves the rules untouched.
pub fn hoist_custom_properties(
    mut rules: Vec<CssRule>,
    custom_properties: &[CustomProperty],
) -> Vec<CssRule> {
    if custom_properties.is_empty() {
        return rules;
    }

    let declarations = custom_properties
        .iter()
        .map(CustomProperty::declaration)
        .collect();
    rules.insert(0, CssRule::new(":root", declarations));
    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decls(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_rule_to_lines() {
        let rule = CssRule::new(".a", decls(&["color: red;", "width: 0;"]));
        assert_eq!(
            rule.to_lines(),
            decls(&[".a {", "  color: red;", "  width: 0;", "}"])
        );
    }

    #[test]
    fn test_conditional_rule_to_lines() {
        let rule = CssRule {
            selector: ".a".to_string(),
            declarations: decls(&["color: red;"]),
            conditions: decls(&["@media (min-width: 40em)"]),
        };
        assert_eq!(
            rule.to_lines(),
            decls(&[
                "@media (min-width: 40em) {",
                "  .a {",
                "    color: red;",
                "  }",
                "}",
            ])
        );
    }

    #[test]
    fn test_sheet_groups_conditions() {
        let media = decls(&["@media print"]);
        let sheet = StyleSheet {
            rules: vec![
                CssRule::new(".a", decls(&["color: red;"])),
                CssRule {
                    selector: ".b".to_string(),
                    declarations: decls(&["display: none;"]),
                    conditions: media.clone(),
                },
                CssRule {
                    selector: ".c".to_string(),
                    declarations: decls(&["display: none;"]),
                    conditions: media,
                },
            ],
            custom_properties: Vec::new(),
        };
        assert_eq!(
            sheet.to_css(),
            ".a {\n  color: red;\n}\n\n@media print {\n  .b {\n    display: none;\n  }\n\n  .c {\n    display: none;\n  }\n}"
        );
    }

    #[test]
    fn test_hoist_custom_properties() {
        let rules = vec![CssRule::new(".a", decls(&["color: var(--accent);"]))];
        let hoisted = hoist_custom_properties(
            rules.clone(),
            &[CustomProperty {
                name: "accent".to_string(),
                value: "#a755a4".to_string(),
            }],
        );
        assert_eq!(hoisted.len(), 2);
        assert_eq!(hoisted[0], CssRule::new(":root", decls(&["--accent: #a755a4;"])));
        assert_eq!(hoisted[1], rules[0]);

        assert_eq!(hoist_custom_properties(rules.clone(), &[]), rules);
    }
}

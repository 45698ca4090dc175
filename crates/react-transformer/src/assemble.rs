//! Output assembly.
//!
//! A Svelte component is written as up to three sections separated by a
//! blank line: `<script>`, the markup and `<style>`. Empty sections are
//! omitted.

use crate::script::ManualReviewBlock;
use crate::symbols::Declaration;

/// The logic of the generated `<script>` block, in output order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptSection {
    /// Names imported from `svelte`, sorted.
    pub svelte_imports: Vec<String>,
    /// Kept import statements.
    pub imports: Vec<String>,
    /// Top-level code of the component module.
    pub module_code: Vec<String>,
    /// Props followed by internal variables.
    pub declarations: Vec<Declaration>,
    /// `$:` statements.
    pub reactive: Vec<String>,
    pub functions: Vec<String>,
    pub manual_review: Vec<ManualReviewBlock>,
}

impl ScriptSection {
    /// Returns true if the script would be empty.
    pub fn is_empty(&self) -> bool {
        self.svelte_imports.is_empty()
            && self.imports.is_empty()
            && self.module_code.is_empty()
            && self.declarations.is_empty()
            && self.reactive.is_empty()
            && self.functions.is_empty()
            && self.manual_review.is_empty()
    }

    /// Groups of lines, each group separated from the next by a blank line.
    fn groups(&self) -> Vec<String> {
        let mut groups = Vec::new();

        let mut imports = Vec::new();
        if !self.svelte_imports.is_empty() {
            imports.push(format!(
                "import {{ {} }} from 'svelte';",
                self.svelte_imports.join(", ")
            ));
        }
        imports.extend(self.imports.iter().cloned());
        push_group(&mut groups, imports.join("\n"));

        push_group(&mut groups, self.module_code.join("\n"));

        let declarations: Vec<String> = self.declarations.iter().map(Declaration::to_line).collect();
        push_group(&mut groups, declarations.join("\n"));

        push_group(&mut groups, self.reactive.join("\n"));

        for function in &self.functions {
            push_group(&mut groups, function.clone());
        }
        for block in &self.manual_review {
            push_group(&mut groups, fence(block));
        }

        groups
    }

    /// The `<script>` element with its content indented one level.
    pub fn to_element(&self, typescript: bool) -> String {
        let open = if typescript {
            "<script lang=\"ts\">"
        } else {
            "<script>"
        };
        let body = self.groups().join("\n\n");
        format!("{open}\n{}\n</script>", indent(&body))
    }
}

fn push_group(groups: &mut Vec<String>, group: String) {
    if !group.trim().is_empty() {
        groups.push(group);
    }
}

fn fence(block: &ManualReviewBlock) -> String {
    format!(
        "/* ==== MANUAL REVIEW: {} ==== */\n{}\n/* ==== END MANUAL REVIEW ==== */",
        block.reason, block.code
    )
}

/// Indents every non-empty line by two spaces.
fn indent(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("  {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A complete Svelte component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputDocument {
    pub script: ScriptSection,
    /// Whether the script is TypeScript.
    pub typescript: bool,
    pub markup: String,
    /// Style rules, one line each, unindented.
    pub style: Vec<String>,
}

impl OutputDocument {
    /// Serializes the component. The result ends with a newline.
    pub fn to_code(&self) -> String {
        let mut sections = Vec::new();
        if !self.script.is_empty() {
            sections.push(self.script.to_element(self.typescript));
        }
        if !self.markup.trim().is_empty() {
            sections.push(self.markup.clone());
        }
        if !self.style.is_empty() {
            sections.push(format!("<style>\n{}\n</style>", indent(&self.style.join("\n"))));
        }

        let mut code = sections.join("\n\n");
        code.push('\n');
        code
    }
}

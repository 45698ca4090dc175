//! Template flattening: substitutes interpolations into the literal text.

use crate::error::StyleError;
use crate::module::{StyleModule, TemplateReference};
use indexmap::IndexMap;
use smol_str::SmolStr;

/// A CSS custom property hoisted into `:root`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomProperty {
    /// The property name without the leading `--`.
    pub name: String,
    /// The property value.
    pub value: String,
}

impl CustomProperty {
    /// Returns the `--name: value;` declaration line.
    pub fn declaration(&self) -> String {
        format!("--{}: {};", self.name, self.value)
    }
}

/// The flattened template text and the custom properties it references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatTemplate {
    /// Template text with every interpolation substituted.
    pub text: String,
    /// Custom properties in first-reference order.
    pub custom_properties: Vec<CustomProperty>,
}

/// Concatenates the template's literal segments, substituting interpolations.
///
/// Exported variables are inlined; module-private variables become
/// `var(--kebab-name)` references and are recorded as custom properties.
/// With `strict` set, an interpolation that cannot be resolved is an error;
/// otherwise it is replaced by the empty string.
pub fn flatten_template(module: &StyleModule, strict: bool) -> Result<FlatTemplate, StyleError> {
    let template = module.template();
    let mut flat = FlatTemplate::default();
    // Property name to the variable that owns it.
    let mut owners: IndexMap<String, SmolStr> = IndexMap::new();

    for (index, quasi) in template.quasis.iter().enumerate() {
        flat.text.push_str(quasi);

        let Some(reference) = template.references.get(index) else {
            continue;
        };

        match resolve_reference(module, reference, &mut owners, &mut flat.custom_properties) {
            Ok(value) => flat.text.push_str(&value),
            Err(err @ StyleError::CustomPropertyConflict { .. }) => return Err(err),
            Err(err) if strict => return Err(err),
            Err(err) => {
                tracing::warn!("{err}; substituting an empty value");
            }
        }
    }

    Ok(flat)
}

fn resolve_reference(
    module: &StyleModule,
    reference: &TemplateReference,
    owners: &mut IndexMap<String, SmolStr>,
    custom_properties: &mut Vec<CustomProperty>,
) -> Result<String, StyleError> {
    let name = match reference {
        TemplateReference::Variable(name) => name,
        TemplateReference::Unsupported(expression) => {
            return Err(StyleError::UnsupportedInterpolation {
                expression: expression.clone(),
            });
        }
    };

    let variable = module
        .variable(name)
        .ok_or_else(|| StyleError::UnresolvedVariable {
            name: name.to_string(),
        })?;

    if variable.exported {
        return Ok(variable.value.clone());
    }

    let property_name = kebab_case(name);
    match owners.get(&property_name) {
        Some(owner) if owner == name => {}
        Some(owner) => {
            return Err(StyleError::CustomPropertyConflict {
                property: property_name,
                first: owner.to_string(),
                second: name.to_string(),
            });
        }
        None => {
            owners.insert(property_name.clone(), name.clone());
            custom_properties.push(CustomProperty {
                name: property_name.clone(),
                value: variable.value.clone(),
            });
        }
    }

    Ok(format!("var(--{property_name})"))
}

/// Converts an identifier to a custom property name: underscores become
/// hyphens and the result is lower-cased, so `MAIN_COLOR` becomes
/// `main-color`.
pub fn kebab_case(name: &str) -> String {
    name.replace('_', "-").to_lowercase()
}

//! Variable substitution for template content

use std::collections::HashMap;

use thiserror::Error;

/// Rendering failure: a declared variable was not supplied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("Template '{template}' declares variable '{variable}' but it was not supplied")]
    MissingVariable { template: String, variable: String },
}

/// Substitute `{{variable}}` placeholders in template content.
///
/// Every name in `declared` must be a key of `supplied`; the first missing
/// name (in declaration order) fails the whole render. Substitution is
/// literal text replacement, never evaluation. Pure function, no I/O.
pub fn render(
    template_name: &str,
    content: &str,
    declared: &[String],
    supplied: &HashMap<String, String>,
) -> Result<String, RenderError> {
    for name in declared {
        if !supplied.contains_key(name) {
            return Err(RenderError::MissingVariable {
                template: template_name.to_string(),
                variable: name.clone(),
            });
        }
    }

    let mut result = content.to_string();
    for name in declared {
        if let Some(value) = supplied.get(name) {
            let pattern = format!("{{{{{}}}}}", name);
            result = result.replace(&pattern, value);
        }
    }

    Ok(result)
}

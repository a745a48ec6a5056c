//! Template types and request/response shapes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Delivery channel a template is written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TemplateType {
    Email,
    Sms,
}

impl std::fmt::Display for TemplateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateType::Email => write!(f, "EMAIL"),
            TemplateType::Sms => write!(f, "SMS"),
        }
    }
}

/// A reusable notification template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageTemplate {
    /// Unique template identifier
    pub id: Uuid,

    /// Human-readable template name
    pub name: String,

    /// Channel this template renders for
    pub template_type: TemplateType,

    /// Content with {{variable}} placeholders (email body or SMS text)
    pub content: String,

    /// Ordered list of variable names the caller must supply
    #[serde(default)]
    pub variables: Vec<String>,

    /// Creation timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl MessageTemplate {
    /// Validate the template fields
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.is_empty() || self.name.len() > 256 {
            return Err(AppError::Validation(
                "Template name must be 1-256 characters".to_string(),
            ));
        }

        if self.content.is_empty() {
            return Err(AppError::Validation(
                "Template content must not be empty".to_string(),
            ));
        }

        if self.variables.iter().any(|v| v.is_empty()) {
            return Err(AppError::Validation(
                "Declared variable names must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Request to create a new template
#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    /// Human-readable template name
    pub name: String,

    /// Content with {{variable}} placeholders
    pub content: String,

    /// Variable names the caller must supply (optional, defaults to none)
    #[serde(default)]
    pub variables: Vec<String>,
}

impl CreateTemplateRequest {
    /// Build a template for the given channel
    pub fn into_template(self, template_type: TemplateType) -> MessageTemplate {
        let now = Utc::now();
        MessageTemplate {
            id: Uuid::new_v4(),
            name: self.name,
            template_type,
            content: self.content,
            variables: self.variables,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request to update an existing template
#[derive(Debug, Deserialize)]
pub struct UpdateTemplateRequest {
    /// Human-readable template name (optional)
    pub name: Option<String>,

    /// Content with {{variable}} placeholders (optional)
    pub content: Option<String>,

    /// Declared variable names (optional)
    pub variables: Option<Vec<String>>,
}

/// Response for listing templates
#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    /// Templates of the requested channel
    pub templates: Vec<MessageTemplate>,

    /// Total count
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(template_type: TemplateType) -> MessageTemplate {
        CreateTemplateRequest {
            name: "Visit reminder".to_string(),
            content: "Hello {{firstName}}, your visit is on {{visitDate}}.".to_string(),
            variables: vec!["firstName".to_string(), "visitDate".to_string()],
        }
        .into_template(template_type)
    }

    #[test]
    fn test_create_request_builds_template() {
        let template = sample(TemplateType::Sms);
        assert_eq!(template.template_type, TemplateType::Sms);
        assert_eq!(template.variables.len(), 2);
        assert!(template.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_content() {
        let mut template = sample(TemplateType::Email);
        template.content = String::new();
        assert!(template.validate().is_err());
    }

    #[test]
    fn test_template_type_wire_format() {
        let json = serde_json::to_string(&TemplateType::Email).unwrap();
        assert_eq!(json, "\"EMAIL\"");
        let parsed: TemplateType = serde_json::from_str("\"SMS\"").unwrap();
        assert_eq!(parsed, TemplateType::Sms);
    }
}

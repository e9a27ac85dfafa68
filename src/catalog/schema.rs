use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::models::{CardModel, CardTemplateModel};

/// A single attribute value on a card. Closed set of scalar kinds rather
/// than an open document; the owning template declares which kind each key
/// must hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl AttributeValue {
    pub fn kind(&self) -> AttributeKind {
        match self {
            AttributeValue::Flag(_) => AttributeKind::Flag,
            AttributeValue::Number(_) => AttributeKind::Number,
            AttributeValue::Text(_) => AttributeKind::Text,
        }
    }
}

/// Declared kind of an attribute in a template schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    Number,
    Text,
    Flag,
}

impl std::fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeKind::Number => write!(f, "number"),
            AttributeKind::Text => write!(f, "text"),
            AttributeKind::Flag => write!(f, "flag"),
        }
    }
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("attribute {key} is not declared by template {template_id}")]
    UndeclaredAttribute { key: String, template_id: String },

    #[error("attribute {key} expects {expected}, got {found}")]
    KindMismatch {
        key: String,
        expected: AttributeKind,
        found: AttributeKind,
    },
}

/// Checks a card's attribute bag against its template's declared schema.
/// Runs at write time only; draw resolution never re-validates attributes.
/// Keys declared by the schema but absent from the card are allowed.
pub fn validate_attributes(
    template: &CardTemplateModel,
    card: &CardModel,
) -> Result<(), SchemaError> {
    for (key, value) in &card.attributes {
        let expected = template
            .schema
            .get(key)
            .ok_or_else(|| SchemaError::UndeclaredAttribute {
                key: key.clone(),
                template_id: template.id.clone(),
            })?;

        if value.kind() != *expected {
            return Err(SchemaError::KindMismatch {
                key: key.clone(),
                expected: *expected,
                found: value.kind(),
            });
        }
    }

    Ok(())
}

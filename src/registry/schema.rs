//! Property validation against a component's schema.
//!
//! Props may diverge from defaults but must fit the schema: each value's
//! kind, numeric bounds, and select options are checked, recursing into
//! array items and nested objects. Keys the schema doesn't know about are
//! passed through untouched.

use std::collections::BTreeMap;

use serde_json::Value;

use super::{ComponentDefinition, PropertyKind, PropertySchema};
use crate::state::Props;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("property {property} is required")]
    Required { property: String },
    #[error("property {property} expects {expected}, got {found}")]
    WrongKind { property: String, expected: &'static str, found: &'static str },
    #[error("property {property} value {value} is below minimum {min}")]
    BelowMin { property: String, value: f64, min: f64 },
    #[error("property {property} value {value} is above maximum {max}")]
    AboveMax { property: String, value: f64, max: f64 },
    #[error("property {property} is not one of the allowed options")]
    NotAnOption { property: String },
}

/// Validate `props` against `definition`'s property schema.
///
/// A required property may be omitted when the definition supplies a default
/// for it, but never set to `null` or an empty string.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found.
pub fn validate_props(definition: &ComponentDefinition, props: &Props) -> Result<(), ValidationError> {
    validate_fields(&definition.property_schema, props, Some(&definition.default_props), "")
}

fn validate_fields(
    schema: &BTreeMap<String, PropertySchema>,
    values: &Props,
    defaults: Option<&Props>,
    prefix: &str,
) -> Result<(), ValidationError> {
    for (key, field) in schema {
        let path = if prefix.is_empty() { key.clone() } else { format!("{prefix}.{key}") };
        match values.get(key) {
            None => {
                let has_default = defaults.is_some_and(|d| d.contains_key(key)) || field.default.is_some();
                if field.required && !has_default {
                    return Err(ValidationError::Required { property: path });
                }
            }
            Some(value) => validate_value(field, value, &path)?,
        }
    }
    Ok(())
}

fn validate_value(field: &PropertySchema, value: &Value, path: &str) -> Result<(), ValidationError> {
    if field.required && is_blank(value) {
        return Err(ValidationError::Required { property: path.to_owned() });
    }
    if value.is_null() {
        return Ok(());
    }

    match field.kind {
        PropertyKind::String | PropertyKind::Color | PropertyKind::Image | PropertyKind::Textarea => {
            expect_kind(value.is_string(), field, value, path)
        }
        PropertyKind::Boolean => expect_kind(value.is_boolean(), field, value, path),
        PropertyKind::Number => {
            let Some(number) = value.as_f64() else {
                return expect_kind(false, field, value, path);
            };
            if let Some(min) = field.min
                && number < min
            {
                return Err(ValidationError::BelowMin { property: path.to_owned(), value: number, min });
            }
            if let Some(max) = field.max
                && number > max
            {
                return Err(ValidationError::AboveMax { property: path.to_owned(), value: number, max });
            }
            Ok(())
        }
        PropertyKind::Select => {
            if field.options.is_empty() || field.options.iter().any(|o| &o.value == value) {
                Ok(())
            } else {
                Err(ValidationError::NotAnOption { property: path.to_owned() })
            }
        }
        PropertyKind::Array => {
            let Some(items) = value.as_array() else {
                return expect_kind(false, field, value, path);
            };
            if field.item_schema.is_empty() {
                return Ok(());
            }
            for (index, item) in items.iter().enumerate() {
                let item_path = format!("{path}[{index}]");
                let Some(object) = item.as_object() else {
                    return Err(ValidationError::WrongKind {
                        property: item_path,
                        expected: PropertyKind::Object.as_str(),
                        found: json_kind(item),
                    });
                };
                validate_fields(&field.item_schema, object, None, &item_path)?;
            }
            Ok(())
        }
        PropertyKind::Object => {
            let Some(object) = value.as_object() else {
                return expect_kind(false, field, value, path);
            };
            validate_fields(&field.properties, object, None, path)
        }
    }
}

fn expect_kind(ok: bool, field: &PropertySchema, value: &Value, path: &str) -> Result<(), ValidationError> {
    if ok {
        Ok(())
    } else {
        Err(ValidationError::WrongKind { property: path.to_owned(), expected: field.kind.as_str(), found: json_kind(value) })
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "schema_test.rs"]
mod tests;

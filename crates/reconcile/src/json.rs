//! Raw-input boundary: loosely typed values become [`Descriptor`]s here.
//!
//! An object with a truthy `tag` is an element; every other value is text
//! holding the value's string coercion. `attrs` values are coerced too.

use crate::descriptor::{Descriptor, ElementDescriptor, coerce_number};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Number, Value};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DescriptorError {
    /// `children` was present but not an array. `path` is a JSON-pointer-like
    /// location of the offending value, e.g. `/0/children/2/children`.
    ChildrenNotSequence { path: String },
}

impl fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorError::ChildrenNotSequence { path } => {
                write!(f, "children at {path} is not a sequence")
            }
        }
    }
}

impl std::error::Error for DescriptorError {}

impl Descriptor {
    /// Converts a top-level descriptor list. The value itself must be an array.
    pub fn list_from_json(value: &Value) -> Result<Vec<Descriptor>, DescriptorError> {
        let Value::Array(items) = value else {
            return Err(DescriptorError::ChildrenNotSequence {
                path: "/".to_string(),
            });
        };
        items
            .iter()
            .enumerate()
            .map(|(index, item)| convert(item, &format!("/{index}")))
            .collect()
    }
}

impl TryFrom<&Value> for Descriptor {
    type Error = DescriptorError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        convert(value, "")
    }
}

impl TryFrom<Value> for Descriptor {
    type Error = DescriptorError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        convert(&value, "")
    }
}

impl<'de> Deserialize<'de> for Descriptor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Descriptor::try_from(&value).map_err(serde::de::Error::custom)
    }
}

fn convert(value: &Value, path: &str) -> Result<Descriptor, DescriptorError> {
    if let Value::Object(map) = value {
        if let Some(tag) = map.get("tag").filter(|tag| is_truthy(tag)) {
            return convert_element(map, tag, path).map(Descriptor::Element);
        }
    }
    Ok(Descriptor::Text(coerce_value(value)))
}

fn convert_element(
    map: &Map<String, Value>,
    tag: &Value,
    path: &str,
) -> Result<ElementDescriptor, DescriptorError> {
    let mut element = ElementDescriptor::new(coerce_value(tag));
    // Anything but an object carries no attribute names.
    if let Some(Value::Object(attrs)) = map.get("attrs") {
        for (name, value) in attrs {
            element.set_attr(name.as_str(), coerce_value(value));
        }
    }
    match map.get("children") {
        None | Some(Value::Null) => {}
        Some(Value::Array(children)) => {
            for (index, child) in children.iter().enumerate() {
                element.push_child(convert(child, &format!("{path}/children/{index}"))?);
            }
        }
        Some(_) => {
            return Err(DescriptorError::ChildrenNotSequence {
                path: format!("{path}/children"),
            });
        }
    }
    Ok(element)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn coerce_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => coerce_json_number(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => coerce_value(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn coerce_json_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        n.as_f64().map(coerce_number).unwrap_or_default()
    }
}

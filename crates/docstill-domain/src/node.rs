//! The recursive extraction tree and its JSON wire mapping

use crate::field::{Field, FieldValue, Position};
use indexmap::IndexMap;
use serde_json::{json, Map, Number, Value};

/// A node in the extracted data tree
///
/// An explicit tagged union replacing the duck-typed `"value" in x`
/// probing of earlier implementations: consumers pattern-match
/// exhaustively instead of checking for the presence of keys.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractedNode {
    /// A leaf field
    Field(Field),
    /// A sequence of nodes; after normalization, repeating records are
    /// always arrays of `Object` nodes
    Array(Vec<ExtractedNode>),
    /// A named record; key insertion order is preserved for stable output
    Object(IndexMap<String, ExtractedNode>),
}

impl ExtractedNode {
    /// An empty record node
    pub fn empty_object() -> Self {
        ExtractedNode::Object(IndexMap::new())
    }

    /// Wrap a leaf field
    pub fn field(field: Field) -> Self {
        ExtractedNode::Field(field)
    }

    /// Borrow the record map, if this node is an object
    pub fn as_object(&self) -> Option<&IndexMap<String, ExtractedNode>> {
        match self {
            ExtractedNode::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Borrow the leaf field, if this node is one
    pub fn as_field(&self) -> Option<&Field> {
        match self {
            ExtractedNode::Field(f) => Some(f),
            _ => None,
        }
    }

    /// True for an empty object or empty array; fields are never empty
    pub fn is_empty(&self) -> bool {
        match self {
            ExtractedNode::Field(_) => false,
            ExtractedNode::Array(items) => items.is_empty(),
            ExtractedNode::Object(map) => map.is_empty(),
        }
    }

    /// Build a tree from the JSON a model reply parses to
    ///
    /// A JSON object carrying a scalar `value` key is a leaf field; any
    /// other object is a nested record. Bare scalars become fields with
    /// no confidence. Malformed confidence or position data is dropped
    /// rather than rejected - the repairer must not be stricter than the
    /// model is sloppy.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Object(map) => {
                if let Some(field) = field_from_map(map) {
                    return ExtractedNode::Field(field);
                }
                let mut record = IndexMap::with_capacity(map.len());
                for (key, child) in map {
                    record.insert(key.clone(), ExtractedNode::from_json(child));
                }
                ExtractedNode::Object(record)
            }
            Value::Array(items) => {
                ExtractedNode::Array(items.iter().map(ExtractedNode::from_json).collect())
            }
            other => ExtractedNode::Field(Field::new(scalar_value(other))),
        }
    }

    /// Serialize back to the persisted JSON shape
    pub fn to_json(&self) -> Value {
        match self {
            ExtractedNode::Field(field) => field_to_json(field),
            ExtractedNode::Array(items) => {
                Value::Array(items.iter().map(ExtractedNode::to_json).collect())
            }
            ExtractedNode::Object(map) => {
                let mut out = Map::with_capacity(map.len());
                for (key, child) in map {
                    out.insert(key.clone(), child.to_json());
                }
                Value::Object(out)
            }
        }
    }
}

/// Interpret a JSON object as a leaf field, if it has that shape
fn field_from_map(map: &Map<String, Value>) -> Option<Field> {
    let value = map.get("value")?;
    let field_value = match value {
        Value::String(_) | Value::Number(_) | Value::Null | Value::Bool(_) => scalar_value(value),
        // A structured "value" is not a leaf; treat the object as a record
        _ => return None,
    };

    let confidence = map
        .get("confidence")
        .and_then(Value::as_f64)
        .map(|c| c.clamp(0.0, 1.0));

    let position = map.get("position").and_then(position_from_json);

    Some(Field {
        value: field_value,
        confidence,
        position,
    })
}

fn scalar_value(value: &Value) -> FieldValue {
    match value {
        Value::String(s) => FieldValue::Text(s.clone()),
        Value::Number(n) => n.as_f64().map(FieldValue::Number).unwrap_or(FieldValue::Null),
        Value::Bool(b) => FieldValue::Text(b.to_string()),
        _ => FieldValue::Null,
    }
}

fn position_from_json(value: &Value) -> Option<Position> {
    let obj = value.as_object()?;
    let page = obj.get("page_number")?.as_u64()?;
    let bbox = obj.get("bounding_box")?.as_array()?;
    if bbox.len() != 4 {
        return None;
    }
    let mut coords = [0.0; 4];
    for (i, c) in bbox.iter().enumerate() {
        coords[i] = c.as_f64()?;
    }
    Position::new(u32::try_from(page).ok()?, coords).ok()
}

fn field_to_json(field: &Field) -> Value {
    let mut out = Map::new();
    let value = match &field.value {
        FieldValue::Text(s) => Value::String(s.clone()),
        FieldValue::Number(n) => Number::from_f64(*n)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        FieldValue::Null => Value::Null,
    };
    out.insert("value".to_string(), value);

    if let Some(confidence) = field.confidence {
        out.insert("confidence".to_string(), json!(confidence));
    }
    if let Some(position) = &field.position {
        out.insert(
            "position".to_string(),
            json!({
                "page_number": position.page_number,
                "bounding_box": position.bounding_box,
            }),
        );
    }
    Value::Object(out)
}

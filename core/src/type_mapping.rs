#![deny(missing_docs)]

//! # Type Mapping
//!
//! Converts contract type tags into the three target representations:
//! - the emitted source type (`string`, `number`, ...),
//! - the JSON Schema primitive used by the fast schema structure,
//! - the boxed documentation type used by API annotations (`String`, `[Number]`).
//!
//! Every function here is total. Unknown tags fall back to `any`.

use crate::contract::ProtoType;
use std::fmt::Display;

/// Represents the simplified JSON types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    /// A string type.
    String,
    /// An integer type.
    Integer,
    /// A floating point number.
    Number,
    /// A boolean type.
    Boolean,
    /// A JSON object.
    Object,
    /// A JSON array.
    Array,
    /// Anything.
    Any,
}

impl JsonType {
    /// The keyword written into a schema.
    pub fn as_str(&self) -> &'static str {
        match self {
            JsonType::String => "string",
            JsonType::Integer => "integer",
            JsonType::Number => "number",
            JsonType::Boolean => "boolean",
            JsonType::Object => "object",
            JsonType::Array => "array",
            JsonType::Any => "any",
        }
    }
}

impl Display for JsonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a tag to the emitted source type.
pub fn to_target_type(proto: &ProtoType) -> String {
    match proto {
        ProtoType::String
        | ProtoType::Text
        | ProtoType::Date
        | ProtoType::Timestamp
        | ProtoType::Time
        | ProtoType::Uuid
        | ProtoType::Enum => "string".into(),
        ProtoType::Bool | ProtoType::Boolean => "boolean".into(),
        ProtoType::Int32 | ProtoType::Int64 | ProtoType::Float | ProtoType::Double => {
            "number".into()
        }
        ProtoType::Bytes => "Uint8Array".into(),
        ProtoType::BigInt => "bigint".into(),
        ProtoType::Object => "object".into(),
        ProtoType::SimpleArray => "string[]".into(),
        ProtoType::Array(inner) => format!("{}[]", to_target_type(inner)),
        ProtoType::Json | ProtoType::Jsonb | ProtoType::Any | ProtoType::Other(_) => "any".into(),
    }
}

/// Maps a tag to its JSON Schema primitive.
pub fn to_json_type(proto: &ProtoType) -> JsonType {
    match proto {
        ProtoType::Int32 | ProtoType::Int64 | ProtoType::BigInt => JsonType::Integer,
        ProtoType::Float | ProtoType::Double => JsonType::Number,
        ProtoType::Bool | ProtoType::Boolean => JsonType::Boolean,
        ProtoType::Json | ProtoType::Jsonb | ProtoType::Object => JsonType::Object,
        ProtoType::SimpleArray | ProtoType::Array(_) => JsonType::Array,
        ProtoType::String
        | ProtoType::Text
        | ProtoType::Date
        | ProtoType::Timestamp
        | ProtoType::Time
        | ProtoType::Uuid
        | ProtoType::Enum
        | ProtoType::Bytes => JsonType::String,
        ProtoType::Any | ProtoType::Other(_) => JsonType::Any,
    }
}

/// String form of [`to_json_type`], accepting any raw tag.
pub fn to_json_schema_type(tag: &str) -> &'static str {
    to_json_type(&ProtoType::parse(tag)).as_str()
}

/// Maps an emitted source type to its boxed documentation form.
///
/// `number` -> `Number`, `string[]` -> `[String]`, `any` -> `Object`.
pub fn to_doc_type(target: &str) -> String {
    let target = target.trim();
    if let Some(inner) = target.strip_suffix("[]") {
        return format!("[{}]", to_doc_type(inner));
    }
    match target {
        "number" => "Number".into(),
        "string" => "String".into(),
        "boolean" => "Boolean".into(),
        "bigint" => "BigInt".into(),
        "any" | "object" | "" => "Object".into(),
        "Uint8Array" => "Uint8Array".into(),
        other => capitalize(other),
    }
}

/// Uppercases the first character, keeping the rest as written.
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Documentation type of a list-or-scalar value.
///
/// `simpleArray` values take their item type from `array_type`; other list
/// values wrap their scalar doc type.
pub fn doc_type_for(proto: &ProtoType, array_type: Option<&ProtoType>, is_array: bool) -> String {
    match proto {
        ProtoType::SimpleArray => {
            let item = array_type
                .map(to_target_type)
                .unwrap_or_else(|| "string".into());
            format!("[{}]", to_doc_type(&item))
        }
        ProtoType::Array(_) => to_doc_type(&to_target_type(proto)),
        _ if is_array => format!("[{}]", to_doc_type(&to_target_type(proto))),
        _ => to_doc_type(&to_target_type(proto)),
    }
}

//! # Fast Schema Structure
//!
//! Builds the JSON-Schema-like structure emitted next to every model and
//! renders it as an object literal. Linked models are referenced by the name
//! of their own exported structure, so the tree holds identifiers as well as
//! plain JSON values.

use crate::contract::{Contract, Field, ProtoType};
use crate::emitter::field::LinkTarget;
use crate::emitter::{is_identifier, is_reserved_model, literal, EmitContext, INDENT};
use crate::type_mapping::to_json_type;
use serde_json::{json, Value};
use std::collections::HashMap;

/// A node of the schema structure.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// Ordered object members.
    Object(Vec<(String, SchemaNode)>),
    /// Array elements.
    Array(Vec<SchemaNode>),
    /// A plain JSON value.
    Value(Value),
    /// A reference to an identifier in scope.
    Ref(String),
}

impl SchemaNode {
    fn object() -> Self {
        SchemaNode::Object(Vec::new())
    }

    fn with(mut self, key: &str, node: SchemaNode) -> Self {
        if let SchemaNode::Object(members) = &mut self {
            members.push((key.to_string(), node));
        }
        self
    }

    fn with_value(self, key: &str, value: Value) -> Self {
        self.with(key, SchemaNode::Value(value))
    }

    /// Looks up a member of an object node.
    pub fn get(&self, key: &str) -> Option<&SchemaNode> {
        match self {
            SchemaNode::Object(members) => members.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Renders the node as an object literal at the given depth.
    pub fn render(&self, depth: usize) -> String {
        match self {
            SchemaNode::Value(v) => literal(v),
            SchemaNode::Ref(name) => name.clone(),
            SchemaNode::Array(items) if items.iter().all(|i| matches!(i, SchemaNode::Value(_))) => {
                let parts: Vec<String> = items.iter().map(|i| i.render(depth)).collect();
                format!("[{}]", parts.join(", "))
            }
            SchemaNode::Array(items) => {
                let inner = INDENT.repeat(depth + 1);
                let mut out = String::from("[\n");
                for item in items {
                    out.push_str(&format!("{}{},\n", inner, item.render(depth + 1)));
                }
                out.push_str(&format!("{}]", INDENT.repeat(depth)));
                out
            }
            SchemaNode::Object(members) if members.is_empty() => "{}".into(),
            SchemaNode::Object(members) => {
                let inner = INDENT.repeat(depth + 1);
                let mut out = String::from("{\n");
                for (key, node) in members {
                    out.push_str(&format!(
                        "{}{}: {},\n",
                        inner,
                        object_key(key),
                        node.render(depth + 1)
                    ));
                }
                out.push_str(&format!("{}}}", INDENT.repeat(depth)));
                out
            }
        }
    }
}

fn object_key(key: &str) -> String {
    if is_identifier(key) {
        key.to_string()
    } else {
        literal(&Value::String(key.to_string()))
    }
}

/// Name of the exported schema structure of a model.
pub fn structure_name(model_name: &str) -> String {
    format!("{}FastSchemaStructure", model_name)
}

/// Name of the compiled serializer of a model.
pub fn serializer_name(model_name: &str) -> String {
    format!("{}FastSchema", model_name)
}

/// Name of the identity property for a model, if it has one.
pub fn identity_key(model_name: &str, ctx: &EmitContext) -> Option<&'static str> {
    if is_reserved_model(model_name) {
        None
    } else if ctx.uses_document_identity(model_name) {
        Some("_id")
    } else {
        Some("id")
    }
}

/// Builds the schema structure of a contract.
///
/// `links` maps a linked field's `propertyKey` to its resolved target.
pub fn build_schema_structure(
    contract: &Contract,
    links: &HashMap<String, LinkTarget>,
    ctx: &EmitContext,
) -> SchemaNode {
    let model = contract.model_name();
    let mut properties = SchemaNode::object();
    let mut required: Vec<SchemaNode> = Vec::new();

    if let Some(id) = identity_key(model, ctx) {
        properties = properties.with(
            id,
            SchemaNode::object()
                .with_value("type", json!("string"))
                .with_value("nullable", json!(false)),
        );
        required.push(SchemaNode::Value(json!(id)));
    }

    for field in &contract.fields {
        let node = match links.get(&field.property_key) {
            Some(target) => linked_node(field, target, model),
            None => scalar_node(field),
        };
        properties = properties.with(&field.property_key, node);
        if !field.is_nullable() {
            required.push(SchemaNode::Value(json!(field.property_key)));
        }
    }

    SchemaNode::object()
        .with_value("title", json!(format!("{} Schema", model)))
        .with_value("type", json!("object"))
        .with("properties", properties)
        .with("required", SchemaNode::Array(required))
}

fn scalar_node(field: &Field) -> SchemaNode {
    let item_proto = match &field.proto_type {
        ProtoType::SimpleArray => Some(field.array_type.clone().unwrap_or(ProtoType::String)),
        ProtoType::Array(inner) => Some((**inner).clone()),
        other if field.is_array() => Some(other.clone()),
        _ => None,
    };

    let node = match item_proto {
        Some(item) => SchemaNode::object()
            .with_value("type", json!("array"))
            .with_value("nullable", json!(field.is_nullable()))
            .with(
                "items",
                SchemaNode::object().with_value("type", json!(to_json_type(&item).as_str())),
            ),
        None => SchemaNode::object()
            .with_value("type", json!(to_json_type(&field.proto_type).as_str()))
            .with_value("nullable", json!(field.is_nullable())),
    };

    match &field.default_value {
        Some(default) => node.with_value("default", default.clone()),
        None => node,
    }
}

fn linked_node(field: &Field, target: &LinkTarget, current_model: &str) -> SchemaNode {
    // A model cannot reference its own structure while it is being initialised.
    let item = if target.model_name == current_model {
        SchemaNode::object().with_value("type", json!("object"))
    } else {
        SchemaNode::Ref(structure_name(&target.model_name))
    };

    if target.many || field.is_array() {
        SchemaNode::object()
            .with_value("type", json!("array"))
            .with_value("nullable", json!(field.is_nullable()))
            .with("items", item)
    } else {
        SchemaNode::object()
            .with(
                "anyOf",
                SchemaNode::Array(vec![
                    item,
                    SchemaNode::object().with_value("type", json!("string")),
                ]),
            )
            .with_value("nullable", json!(field.is_nullable()))
    }
}

/// Renders the exported structure and its compiled serializer binding.
pub fn render_schema_block(model_name: &str, structure: &SchemaNode) -> String {
    format!(
        "export const {} = {};\n\nexport const {} = fastJson({});\n",
        structure_name(model_name),
        structure.render(0),
        serializer_name(model_name),
        structure_name(model_name)
    )
}

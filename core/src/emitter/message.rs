//! # Message (DTO) Emission
//!
//! Each message becomes a shape interface plus a conversion class with a
//! partial-assignment constructor, `serialize()`, and the `fromPartial` /
//! `fromEntity` factories. Both factories share the same strict projection.

use crate::contract::{Message, MessageProperty, ProtoType};
use crate::emitter::imports::ImportSet;
use crate::emitter::{default_literal, is_identifier, EmitContext, INDENT};
use crate::error::{AppError, AppResult};
use crate::type_mapping::{doc_type_for, to_target_type};

/// Options shared by every `plainToInstance` projection.
pub const PROJECTION_OPTIONS: &str =
    "{ exposeUnsetFields: false, enableImplicitConversion: true, excludeExtraneousValues: true }";

/// Name of the conversion class of a message.
pub fn dto_class_name(message: &Message) -> String {
    format!("{}DTO", message.name)
}

/// Declared type of a message property.
pub fn property_type(property: &MessageProperty) -> String {
    let base = match (&property.ty, &property.array_type) {
        (ProtoType::SimpleArray, Some(item)) => format!("{}[]", to_target_type(item)),
        (ty, _) => to_target_type(ty),
    };
    if property.is_array() && !base.ends_with("[]") {
        format!("{}[]", base)
    } else {
        base
    }
}

/// Emits the interface and conversion class of one message.
pub fn emit_message(message: &Message, ctx: &EmitContext, imports: &mut ImportSet) -> AppResult<String> {
    if !is_identifier(&message.name) {
        return Err(AppError::emission(
            &message.name,
            "message name is not a valid identifier",
        ));
    }
    for key in message.properties.keys() {
        if !is_identifier(key) {
            return Err(AppError::emission(
                key,
                format!("property of message '{}' is not a valid identifier", message.name),
            ));
        }
    }

    let class = dto_class_name(message);
    let mut code = String::new();

    // interface
    code.push_str(&format!("export interface {} {{\n", message.name));
    for (key, prop) in &message.properties {
        let optional = if prop.required == Some(false) { "?" } else { "" };
        code.push_str(&format!(
            "{}{}{}: {};\n",
            INDENT,
            key,
            optional,
            property_type(prop)
        ));
    }
    code.push_str("}\n\n");

    // conversion class
    imports.transformer("Expose");
    imports.transformer("instanceToPlain");
    imports.transformer("plainToInstance");

    code.push_str(&format!(
        "export class {} implements {} {{\n",
        class, message.name
    ));
    for (key, prop) in &message.properties {
        if ctx.capabilities.openapi {
            imports.openapi("ApiProperty");
            let doc = doc_type_for(&prop.ty, prop.array_type.as_ref(), prop.is_array());
            code.push_str(&format!(
                "{}@ApiProperty({{ type: {}, required: {} }})\n",
                INDENT,
                doc,
                prop.required != Some(false)
            ));
        }
        code.push_str(&format!("{}@Expose()\n", INDENT));
        let optional = if prop.required == Some(false) { "?" } else { "" };
        let mut decl = format!("{}{}{}: {}", INDENT, key, optional, property_type(prop));
        if let Some(default) = &prop.default {
            decl.push_str(" = ");
            decl.push_str(&default_literal(default, false));
        }
        decl.push_str(";\n\n");
        code.push_str(&decl);
    }

    code.push_str(&format!(
        "{i}constructor(partial: Partial<{c}>) {{\n{i}{i}Object.assign(this, partial);\n{i}}}\n\n",
        i = INDENT,
        c = class
    ));
    code.push_str(&format!(
        "{i}serialize() {{\n{i}{i}return instanceToPlain(this);\n{i}}}\n\n",
        i = INDENT
    ));
    code.push_str(&factories(&class, None));
    code.push_str("}\n");

    Ok(code)
}

/// Renders the `fromPartial` / `fromEntity` factories of a class.
pub(crate) fn factories(class: &str, modifier: Option<&str>) -> String {
    let prefix = modifier.map(|m| format!("{} ", m)).unwrap_or_default();
    format!(
        "{i}{p}static fromPartial(partial: Partial<{c}>): {c} {{\n\
         {i}{i}return plainToInstance({c}, partial, {o});\n\
         {i}}}\n\n\
         {i}{p}static fromEntity(entity: any): {c} {{\n\
         {i}{i}return plainToInstance({c}, entity, {o});\n\
         {i}}}\n",
        i = INDENT,
        p = prefix,
        c = class,
        o = PROJECTION_OPTIONS
    )
}

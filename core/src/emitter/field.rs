//! # Field Emission
//!
//! Produces the annotation lines and the property declaration of one model
//! field. Annotations are emitted in a fixed order:
//!
//! 1. exposure (`@Expose` / `@Exclude`)
//! 2. required and unique constraints
//! 3. date coercion
//! 4. custom annotations, in declaration order
//! 5. validations, in declaration order
//! 6. documentation / graph annotations, when those modules are present
//! 7. transform callbacks
//!
//! followed by the declaration itself.

use crate::contract::{Field, ProtoType, ValidationKind, ValidationOption};
use crate::emitter::imports::ImportSet;
use crate::emitter::{default_literal, is_identifier, literal, EmitContext, INDENT};
use crate::error::{AppError, AppResult};
use crate::type_mapping::{doc_type_for, to_target_type};
use serde_json::Value;

/// The model a linked field points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    /// Generated model name of the target.
    pub model_name: String,
    /// Whether the relation holds many entities.
    pub many: bool,
}

/// Emits one field, recording the names it needs into `imports`.
///
/// Nothing is recorded when emission fails.
pub fn emit_field(
    field: &Field,
    link: Option<&LinkTarget>,
    ctx: &EmitContext,
    imports: &mut ImportSet,
) -> AppResult<String> {
    let key = field.property_key.as_str();
    if !is_identifier(key) {
        return Err(AppError::emission(key, "propertyKey is not a valid identifier"));
    }
    if field.is_linked() && link.is_none() {
        return Err(AppError::emission(key, "linked field has no resolved target"));
    }

    let mut local = ImportSet::empty(ctx.core_import.clone());
    let mut lines: Vec<String> = Vec::new();

    // 1. exposure
    if field.exclude {
        local.transformer("Exclude");
        if field.to_plain_only {
            lines.push("@Exclude({ toPlainOnly: true })".into());
        } else {
            lines.push("@Exclude()".into());
        }
    } else {
        local.transformer("Expose");
        lines.push("@Expose()".into());
    }

    // 2. constraints
    if field.is_required() {
        local.validator("IsNotEmpty");
        lines.push("@IsNotEmpty()".into());
    }
    if field.unique {
        local.core("IsUnique");
        lines.push("@IsUnique()".into());
    }

    // 3. date coercion
    if field.proto_type == ProtoType::Date {
        local.transformer("Type");
        lines.push("@Type(() => Date)".into());
    }

    // 4. custom annotations
    for (name, decorator) in &field.custom_decorator {
        if !is_identifier(name) {
            return Err(AppError::emission(
                key,
                format!("custom annotation '{}' is not a valid identifier", name),
            ));
        }
        local.custom(&decorator.import, name);
        match &decorator.options {
            Some(options) => lines.push(format!("@{}({})", name, literal(options))),
            None => lines.push(format!("@{}()", name)),
        }
    }

    // 5. validations
    for validation in &field.validations {
        let (name, line) = validation_line(key, validation)?;
        local.validator(&name);
        lines.push(line);
    }

    // 6. documentation / graph
    let doc = field_doc_type(field, link);
    if ctx.capabilities.openapi {
        if field.exclude {
            local.openapi("ApiHideProperty");
            lines.push("@ApiHideProperty()".into());
        } else {
            local.openapi("ApiProperty");
            lines.push(api_property(field, &doc));
        }
    }
    if ctx.capabilities.graphql && !field.exclude {
        local.graphql("Field");
        lines.push(format!(
            "@GraphQLField(() => {}, {{ nullable: {} }})",
            doc,
            field.is_nullable()
        ));
    }

    // 7. transforms
    if let Some(cb) = &field.transform {
        local.core("Callbacks");
        local.transformer("Transform");
        lines.push(format!(
            "@Transform(Callbacks.resolve({}), {{ toClassOnly: true }})",
            literal(&Value::String(cb.clone()))
        ));
    }
    if let Some(cb) = &field.to_plain {
        local.core("Callbacks");
        local.transformer("Transform");
        lines.push(format!(
            "@Transform(Callbacks.resolve({}), {{ toPlainOnly: true }})",
            literal(&Value::String(cb.clone()))
        ));
    }

    // declaration
    let ty = match link {
        Some(target) => {
            let document = ctx.uses_document_identity(&target.model_name);
            if document {
                local.storage();
            }
            linked_type(target, document)
        }
        None => field_type(field),
    };
    let optional = field.is_nullable() || field.default_value.is_some();
    let mut decl = format!("{}{}: {}", key, if optional { "?" } else { "" }, ty);
    if let Some(default) = &field.default_value {
        decl.push_str(" = ");
        decl.push_str(&default_literal(default, field.object_type.is_some()));
    }
    decl.push(';');
    lines.push(decl);

    imports.merge(local);

    let mut code = String::new();
    for line in lines {
        code.push_str(INDENT);
        code.push_str(&line);
        code.push('\n');
    }
    Ok(code)
}

/// Declared type of a non-linked field.
pub fn field_type(field: &Field) -> String {
    let base = match (&field.object_type, &field.proto_type, &field.array_type) {
        (Some(object_type), _, _) => object_type.clone(),
        (None, ProtoType::SimpleArray, Some(item)) => format!("{}[]", to_target_type(item)),
        (None, proto, _) => to_target_type(proto),
    };
    if field.is_array() && !base.ends_with("[]") {
        format!("{}[]", base)
    } else {
        base
    }
}

/// Declared type of a linked field.
fn linked_type(target: &LinkTarget, document: bool) -> String {
    let suffix = if target.many { "[]" } else { "" };
    let mut parts = vec![
        format!("{}{}", target.model_name, suffix),
        format!("string{}", suffix),
    ];
    if document {
        parts.push(format!("ObjectId{}", suffix));
    }
    parts.push("null".into());
    parts.join(" | ")
}

/// Documentation type of a field, linked or not.
pub fn field_doc_type(field: &Field, link: Option<&LinkTarget>) -> String {
    if let Some(target) = link {
        return if target.many {
            format!("[{}]", target.model_name)
        } else {
            target.model_name.clone()
        };
    }
    if let Some(object_type) = &field.object_type {
        let doc = crate::type_mapping::to_doc_type(object_type);
        return if field.is_array() && !doc.starts_with('[') {
            format!("[{}]", doc)
        } else {
            doc
        };
    }
    doc_type_for(&field.proto_type, field.array_type.as_ref(), field.is_array())
}

fn api_property(field: &Field, doc: &str) -> String {
    let mut opts = vec![
        format!("type: {}", doc),
        format!("required: {}", !field.is_nullable()),
    ];
    if field.read_only {
        opts.push("readOnly: true".into());
    }
    if let Some(default) = &field.default_value {
        opts.push(format!("default: {}", literal(default)));
    }
    format!("@ApiProperty({{ {} }})", opts.join(", "))
}

/// Renders one validation annotation, returning its name and line.
fn validation_line(key: &str, validation: &ValidationOption) -> AppResult<(String, String)> {
    let name = validation
        .name()
        .ok_or_else(|| AppError::emission(key, "validation has no name"))?
        .to_string();
    if !is_identifier(&name) {
        return Err(AppError::emission(
            key,
            format!("validation '{}' is not a valid identifier", name),
        ));
    }

    let mut args: Vec<String> = match &validation.kind {
        ValidationKind::Tuple(items) if items.len() > 1 => items[1..].iter().map(literal).collect(),
        _ => validation.value.iter().map(literal).collect(),
    };

    let mut opts = Vec::new();
    if let Some(message) = &validation.message {
        opts.push(format!("message: {}", literal(&Value::String(message.clone()))));
    }
    if let Some(context) = &validation.context {
        opts.push(format!("context: {}", literal(context).replace('"', "")));
    }
    if !opts.is_empty() {
        args.push(format!("{{ {} }}", opts.join(", ")));
    }

    let line = format!("@{}({})", name, args.join(", "));
    Ok((name, line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::CapabilitySet;
    use crate::config::{CompilerConfig, EmissionPolicy, StorageBackend};
    use crate::contract::FieldBuilder;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn ctx(caps: CapabilitySet) -> EmitContext {
        EmitContext::new(&CompilerConfig::default(), caps)
    }

    fn emit(field: Field, caps: CapabilitySet) -> String {
        let mut imports = ImportSet::empty("@contractc/core");
        emit_field(&field, None, &ctx(caps), &mut imports).unwrap()
    }

    #[test]
    fn test_required_unique_string() {
        let code = emit(
            FieldBuilder::new("email", "string").nullable(false).unique().build(),
            CapabilitySet::none(),
        );
        assert_eq!(
            code,
            "    @Expose()\n    @IsNotEmpty()\n    @IsUnique()\n    email: string;\n"
        );
    }

    #[test]
    fn test_optional_with_default() {
        let code = emit(
            FieldBuilder::new("age", "int32")
                .default_value(json!(18))
                .build(),
            CapabilitySet::none(),
        );
        assert!(code.contains("    age?: number = 18;\n"));
        assert!(!code.contains("IsNotEmpty"));

        let code = emit(
            FieldBuilder::new("role", "string")
                .default_value(json!("user"))
                .build(),
            CapabilitySet::none(),
        );
        assert!(code.contains("role?: string = \"user\";"));

        let code = emit(
            FieldBuilder::new("status", "string")
                .object_type("Status")
                .default_value(json!("Status.Active"))
                .build(),
            CapabilitySet::none(),
        );
        assert!(code.contains("status?: Status = Status.Active;"));
    }

    #[test]
    fn test_exclusion_variants() {
        let code = emit(FieldBuilder::new("password", "string").exclude().build(), CapabilitySet::none());
        assert!(code.starts_with("    @Exclude()\n"));

        let code = emit(
            FieldBuilder::new("password", "string").exclude_to_plain_only().build(),
            CapabilitySet::none(),
        );
        assert!(code.starts_with("    @Exclude({ toPlainOnly: true })\n"));
    }

    #[test]
    fn test_date_and_ordering() {
        let code = emit(
            FieldBuilder::new("birth", "date")
                .nullable(false)
                .custom_decorator("Sanitize", "my-lib", Some(json!({ "trim": true })))
                .validation(ValidationOption::named("IsDate"))
                .transform("parseBirth")
                .build(),
            CapabilitySet::none(),
        );
        let expected = [
            "@Expose()",
            "@IsNotEmpty()",
            "@Type(() => Date)",
            "@Sanitize({\"trim\":true})",
            "@IsDate()",
            "@Transform(Callbacks.resolve(\"parseBirth\"), { toClassOnly: true })",
            "birth: string;",
        ];
        let lines: Vec<&str> = code.lines().map(str::trim).collect();
        assert_eq!(lines, expected);
    }

    #[test]
    fn test_validation_rendering() {
        let code = emit(
            FieldBuilder::new("name", "string")
                .validation(ValidationOption::tuple(vec![json!("MinLength"), json!(3)]))
                .validation(ValidationOption::named("Max").with_value(json!(10)))
                .validation(
                    ValidationOption::tuple(vec![json!("Length"), json!(1), json!(5)])
                        .with_message("bad length")
                        .with_context(json!({ "code": "E1" })),
                )
                .build(),
            CapabilitySet::none(),
        );
        assert!(code.contains("@MinLength(3)"));
        assert!(code.contains("@Max(10)"));
        assert!(code.contains("@Length(1, 5, { message: \"bad length\", context: {code:E1} })"));
    }

    #[test]
    fn test_capability_annotations() {
        let caps = CapabilitySet {
            openapi: true,
            graphql: true,
            ..CapabilitySet::none()
        };
        let code = emit(
            FieldBuilder::new("tags", "string").array().nullable(true).read_only().build(),
            caps,
        );
        assert!(code.contains("@ApiProperty({ type: [String], required: false, readOnly: true })"));
        assert!(code.contains("@GraphQLField(() => [String], { nullable: true })"));
        assert!(code.contains("tags?: string[];"));

        let code = emit(
            FieldBuilder::new("scores", "simpleArray").array_type("int32").build(),
            caps,
        );
        assert!(code.contains("type: [Number]"));
        assert!(code.contains("scores: number[];"));
    }

    #[test]
    fn test_custom_object_type_keeps_casing() {
        let caps = CapabilitySet {
            openapi: true,
            ..CapabilitySet::none()
        };
        let code = emit(
            FieldBuilder::new("profile", "object")
                .object_type("UserProfileDTO")
                .nullable(false)
                .build(),
            caps,
        );
        assert!(code.contains("@ApiProperty({ type: UserProfileDTO, required: true })"));
        assert!(code.contains("profile: UserProfileDTO;"));
        assert!(!code.contains("UserProfileDto"));
    }

    #[test]
    fn test_no_capability_annotations_without_modules() {
        let code = emit(FieldBuilder::new("n", "int32").build(), CapabilitySet::none());
        assert!(!code.contains("ApiProperty"));
        assert!(!code.contains("GraphQLField"));
    }

    #[test]
    fn test_linked_field_type() {
        let target = LinkTarget {
            model_name: "Group".into(),
            many: false,
        };
        let mut imports = ImportSet::empty("@contractc/core");
        let field = FieldBuilder::new("group", "string")
            .nullable(true)
            .link(crate::contract::ContractLink::new("Group"))
            .build();
        let code = emit_field(&field, Some(&target), &ctx(CapabilitySet::none()), &mut imports).unwrap();
        assert!(code.contains("group?: Group | string | null;"));

        let doc_ctx = EmitContext {
            capabilities: CapabilitySet::none(),
            backend: StorageBackend::Document,
            core_import: "@contractc/core".into(),
            policy: EmissionPolicy::Strict,
        };
        let many = LinkTarget {
            model_name: "Group".into(),
            many: true,
        };
        let code = emit_field(&field, Some(&many), &doc_ctx, &mut imports).unwrap();
        assert!(code.contains("group?: Group[] | string[] | ObjectId[] | null;"));
        assert!(imports.render().contains("import { ObjectId } from \"mongodb\";"));
    }

    #[test]
    fn test_invalid_inputs_are_emission_errors() {
        let mut imports = ImportSet::empty("@contractc/core");
        let field = FieldBuilder::new("first-name", "string").build();
        let err = emit_field(&field, None, &ctx(CapabilitySet::none()), &mut imports).unwrap_err();
        assert!(matches!(err, AppError::Emission { ref field, .. } if field == "first-name"));

        let field = FieldBuilder::new("x", "string")
            .validation(ValidationOption::tuple(vec![json!(1), json!(2)]))
            .build();
        let err = emit_field(&field, None, &ctx(CapabilitySet::none()), &mut imports).unwrap_err();
        assert!(err.to_string().contains("validation has no name"));

        // failed fields record no imports
        assert_eq!(imports, ImportSet::empty("@contractc/core"));
    }
}

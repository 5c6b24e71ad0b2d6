//! # Model Emission
//!
//! Assembles one complete module per contract: import block, structural
//! interface, conversion class, fast schema structure and the DTO blocks of
//! its messages. Field and message failures are handled according to the
//! configured [`EmissionPolicy`].

use crate::config::EmissionPolicy;
use crate::contract::{Contract, Field};
use crate::emitter::field::{emit_field, field_type, LinkTarget};
use crate::emitter::imports::ImportSet;
use crate::emitter::message::{emit_message, factories};
use crate::emitter::schema::{
    build_schema_structure, identity_key, render_schema_block, serializer_name, structure_name,
};
use crate::emitter::{is_identifier, literal, normalize_whitespace, EmitContext, INDENT};
use crate::error::{AppError, AppResult};
use crate::resolver::{ArtifactKind, ImportResolver};
use crate::validation::validate_contract;
use heck::ToLowerCamelCase;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::{error, warn};

/// Resolves every linked field of `contract` to its target model in `contracts`.
///
/// Fails with a `Schema` error when a link target is unknown or a declared
/// `entityType` names a different model.
pub fn resolve_links(
    contract: &Contract,
    contracts: &[Contract],
) -> AppResult<HashMap<String, LinkTarget>> {
    let mut links = HashMap::new();
    for field in contract.fields.iter().filter(|f| f.is_linked()) {
        let link = &field.link[0];
        let target = find_contract(contracts, &link.contract).ok_or_else(|| {
            AppError::schema(format!(
                "field '{}' links to unknown contract '{}' (contract '{}')",
                field.property_key, link.contract, contract.contract_name
            ))
        })?;
        if let Some(entity) = &field.entity_type {
            let names = [
                target.model_name().to_string(),
                target.contract_name.clone(),
                target.generated_name(),
            ];
            if !names.contains(entity) {
                return Err(AppError::schema(format!(
                    "field '{}' declares entityType '{}' but links to '{}' (contract '{}')",
                    field.property_key,
                    entity,
                    target.model_name(),
                    contract.contract_name
                )));
            }
        }
        links.insert(
            field.property_key.clone(),
            LinkTarget {
                model_name: target.model_name().to_string(),
                many: link.array || field.is_array(),
            },
        );
    }
    Ok(links)
}

fn find_contract<'c>(contracts: &'c [Contract], name: &str) -> Option<&'c Contract> {
    contracts
        .iter()
        .find(|c| c.contract_name == name || c.generated_name() == name)
}

/// Emits model modules for contracts of one compiled set.
pub struct ModelEmitter<'a> {
    contracts: &'a [Contract],
    ctx: &'a EmitContext,
    resolver: &'a dyn ImportResolver,
}

impl<'a> ModelEmitter<'a> {
    /// Emitter over the full contract set, used to resolve links.
    pub fn new(contracts: &'a [Contract], ctx: &'a EmitContext, resolver: &'a dyn ImportResolver) -> Self {
        Self {
            contracts,
            ctx,
            resolver,
        }
    }

    /// Emits the module text of `contract`.
    pub fn emit(&self, contract: &Contract) -> AppResult<String> {
        validate_contract(contract)?;

        let model = contract.model_name();
        let links = resolve_links(contract, self.contracts)?;
        let mut imports = ImportSet::new(self.ctx.core_import.clone());

        if self.ctx.uses_document_identity(model) {
            imports.storage();
        }
        self.linked_imports(contract, &mut imports);
        for spec in &contract.imports {
            namespace_import(spec, &mut imports);
        }

        let interface = self.interface(contract, &links);
        let class = self.class(contract, &links, &mut imports)?;
        let schema = render_schema_block(model, &build_schema_structure(contract, &links, self.ctx));

        let mut dtos = String::new();
        for message in &contract.messages {
            match emit_message(message, self.ctx, &mut imports) {
                Ok(code) => {
                    dtos.push_str(&code);
                    dtos.push('\n');
                }
                Err(err) => dtos.push_str(&self.on_failure(contract, &message.name, err)?),
            }
        }

        let mut code = String::new();
        code.push_str(&format!("// Generated from {}. Do not edit.\n\n", contract.generated_name()));
        code.push_str(&imports.render());
        code.push('\n');
        code.push_str(&interface);
        code.push('\n');
        code.push_str(&class);
        code.push('\n');
        code.push_str(&schema);
        code.push('\n');
        code.push_str(&dtos);

        Ok(normalize_whitespace(&code))
    }

    fn find(&self, name: &str) -> Option<&'a Contract> {
        find_contract(self.contracts, name)
    }

    /// One import per distinct linked contract, in field order.
    fn linked_imports(&self, contract: &Contract, imports: &mut ImportSet) {
        let mut seen = HashSet::new();
        for field in contract.fields.iter().filter(|f| f.is_linked()) {
            let Some(target) = self.find(&field.link[0].contract) else {
                continue;
            };
            if target.model_name() == contract.model_name() || !seen.insert(target.model_name()) {
                continue;
            }
            let alias = contract.is_module_contract() != target.is_module_contract();
            let spec = self
                .resolver
                .resolve(contract, target, ArtifactKind::Model, alias);
            let name = target.model_name();
            imports.linked(&spec, &[name.to_string(), structure_name(name)]);
        }
    }

    fn interface(&self, contract: &Contract, links: &HashMap<String, LinkTarget>) -> String {
        let model = contract.model_name();
        let document = self.ctx.uses_document_identity(model);
        let declared: HashSet<&str> = contract
            .fields
            .iter()
            .map(|f| f.property_key.as_str())
            .collect();

        let mut code = format!("export interface {} {{\n", contract.interface_name());
        match identity_key(model, self.ctx) {
            Some(id) if document => code.push_str(&format!("{}{}?: ObjectId;\n", INDENT, id)),
            Some(id) => code.push_str(&format!("{}{}?: any;\n", INDENT, id)),
            None => {}
        }

        for field in contract.fields.iter().filter(|f| is_identifier(&f.property_key)) {
            let key = &field.property_key;
            if links.contains_key(key) {
                let mut union = vec!["object", "string", "string[]"];
                if document {
                    union.push("ObjectId");
                }
                code.push_str(&format!("{}{}?: {};\n", INDENT, key, union.join(" | ")));
                let companion = format!("{}Id", key);
                if !declared.contains(companion.as_str()) {
                    code.push_str(&format!("{}{}?: string;\n", INDENT, companion));
                }
            } else {
                let optional = field.is_nullable() || field.default_value.is_some();
                code.push_str(&format!(
                    "{}{}{}: {};\n",
                    INDENT,
                    key,
                    if optional { "?" } else { "" },
                    field_type(field)
                ));
            }
        }
        code.push_str("}\n");
        code
    }

    fn class(
        &self,
        contract: &Contract,
        links: &HashMap<String, LinkTarget>,
        imports: &mut ImportSet,
    ) -> AppResult<String> {
        let model = contract.model_name();
        let caps = self.ctx.capabilities;
        let mut code = String::new();

        if caps.graphql {
            imports.graphql("ObjectType");
            code.push_str("@ObjectType()\n");
        }
        code.push_str(&format!(
            "export class {} extends AbstractModel implements {} {{\n",
            model,
            contract.interface_name()
        ));

        if let Some(id) = identity_key(model, self.ctx) {
            imports.validator("IsOptional");
            code.push_str(&format!("{}@Expose()\n{}@IsOptional()\n", INDENT, INDENT));
            if caps.openapi {
                imports.openapi("ApiProperty");
                code.push_str(&format!(
                    "{}@ApiProperty({{ type: String, required: false, readOnly: true }})\n",
                    INDENT
                ));
            }
            if caps.graphql {
                imports.graphql("Field");
                imports.graphql("ID");
                code.push_str(&format!(
                    "{}@GraphQLField(() => ID, {{ nullable: true }})\n",
                    INDENT
                ));
            }
            let ty = if self.ctx.uses_document_identity(model) {
                "ObjectId"
            } else {
                "any"
            };
            code.push_str(&format!("{}{}?: {};\n\n", INDENT, id, ty));
        }

        let mut emitted: Vec<&Field> = Vec::new();
        for field in &contract.fields {
            match emit_field(field, links.get(&field.property_key), self.ctx, imports) {
                Ok(block) => {
                    code.push_str(&block);
                    code.push('\n');
                    emitted.push(field);
                }
                Err(err) => code.push_str(&self.on_failure(contract, &field.property_key, err)?),
            }
        }

        code.push_str(&format!(
            "{i}constructor(partial: Partial<{m}>) {{\n{i}{i}super();\n{i}{i}Object.assign(this, partial);\n{i}}}\n\n",
            i = INDENT,
            m = model
        ));
        code.push_str(&factories(model, Some("public")));
        code.push('\n');

        let hooks: Vec<(&str, &str)> = emitted
            .iter()
            .filter_map(|f| {
                f.after_validation
                    .as_deref()
                    .map(|cb| (f.property_key.as_str(), cb))
            })
            .collect();
        if !hooks.is_empty() {
            imports.core("Callbacks");
            code.push_str(&format!("{}public override afterValidation(item: this) {{\n", INDENT));
            for (key, cb) in hooks {
                code.push_str(&format!(
                    "{i}{i}item.{k} = Callbacks.resolve({cb})(item.{k});\n",
                    i = INDENT,
                    k = key,
                    cb = literal(&Value::String(cb.to_string()))
                ));
            }
            code.push_str(&format!("{i}{i}return item;\n{i}}}\n\n", i = INDENT));
        }

        code.push_str(&format!(
            "{i}public override toString() {{\n{i}{i}return {s}(this);\n{i}}}\n",
            i = INDENT,
            s = serializer_name(model)
        ));
        code.push_str("}\n");
        Ok(code)
    }

    /// Applies the emission policy to a failed field or message.
    fn on_failure(&self, contract: &Contract, name: &str, err: AppError) -> AppResult<String> {
        match self.ctx.policy {
            EmissionPolicy::Strict => {
                error!(contract = %contract.contract_name, field = %name, "{}", err);
                Err(err)
            }
            EmissionPolicy::Placeholder => {
                warn!(contract = %contract.contract_name, field = %name, "{}", err);
                Ok(format!("{}// '{}' omitted: {}\n\n", INDENT, name, err))
            }
        }
    }
}

/// Emits the module text of `contract`, resolving links against `contracts`.
pub fn emit_model(
    contract: &Contract,
    contracts: &[Contract],
    ctx: &EmitContext,
    resolver: &dyn ImportResolver,
) -> AppResult<String> {
    ModelEmitter::new(contracts, ctx, resolver).emit(contract)
}

fn namespace_import(spec: &str, imports: &mut ImportSet) {
    let last = spec.rsplit('/').next().unwrap_or(spec);
    let binding = last.trim_start_matches('@').to_lower_camel_case();
    if is_identifier(&binding) {
        imports.namespace(&binding, spec);
    } else {
        warn!(import = %spec, "skipping import without a usable binding");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::CapabilitySet;
    use crate::config::{CompilerConfig, StorageBackend};
    use crate::contract::{
        ContractBuilder, ContractLink, FieldBuilder, MessageBuilder, MessageProperty,
    };
    use crate::resolver::LayoutResolver;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn ctx(caps: CapabilitySet) -> EmitContext {
        EmitContext::new(&CompilerConfig::default(), caps)
    }

    fn emit(contract: &Contract, all: &[Contract], ctx: &EmitContext) -> AppResult<String> {
        let resolver = LayoutResolver::from_config(&CompilerConfig::default());
        emit_model(contract, all, ctx, &resolver)
    }

    fn user() -> Contract {
        ContractBuilder::new("User", "User")
            .field(FieldBuilder::new("email", "string").nullable(false).unique())
            .build()
            .unwrap()
    }

    #[test]
    fn test_user_email_scenario() {
        let contract = user();
        let code = emit(&contract, std::slice::from_ref(&contract), &ctx(CapabilitySet::none())).unwrap();
        assert!(code.contains("    email: string;\n"));
        assert!(code.contains("@IsUnique()"));
        assert!(code.contains("required: [\"id\", \"email\"],"));
        assert!(code.contains("export interface IUser {\n    id?: any;\n    email: string;\n}"));
        assert!(code.contains("export class User extends AbstractModel implements IUser {"));
        assert!(code.contains("return UserFastSchema(this);"));
        assert!(code.contains("export const UserFastSchema = fastJson(UserFastSchemaStructure);"));
        assert!(code.contains("import { AbstractModel, IsUnique } from \"@contractc/core\";"));
        assert!(!code.contains("mongodb"));
        assert!(!code.contains("afterValidation"));
        assert!(!code.contains("\n\n\n"));
    }

    #[test]
    fn test_idempotent() {
        let contract = user();
        let all = vec![contract.clone()];
        let a = emit(&contract, &all, &ctx(CapabilitySet::none())).unwrap();
        let b = emit(&contract, &all, &ctx(CapabilitySet::none())).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_document_identity() {
        let doc = EmitContext {
            backend: StorageBackend::Document,
            ..ctx(CapabilitySet::none())
        };
        let contract = user();
        let code = emit(&contract, std::slice::from_ref(&contract), &doc).unwrap();
        assert!(code.contains("import { ObjectId } from \"mongodb\";"));
        assert!(code.contains("    _id?: ObjectId;\n"));
        assert!(code.contains("required: [\"_id\", \"email\"],"));

        let migrations = ContractBuilder::new("Migrations", "Migrations")
            .field(FieldBuilder::new("name", "string"))
            .build()
            .unwrap();
        let code = emit(&migrations, std::slice::from_ref(&migrations), &doc).unwrap();
        assert!(!code.contains("mongodb"));
        assert!(!code.contains("_id"));
        assert!(!code.contains("IsOptional"));
    }

    #[test]
    fn test_linked_contracts() {
        let group = ContractBuilder::new("Group", "Group")
            .field(FieldBuilder::new("name", "string"))
            .build()
            .unwrap();
        let member = ContractBuilder::new("Member", "Member")
            .field(
                FieldBuilder::new("group", "string")
                    .nullable(true)
                    .link(ContractLink::new("Group")),
            )
            .field(
                FieldBuilder::new("groups", "string")
                    .nullable(true)
                    .link(ContractLink::new("Group").array()),
            )
            .build()
            .unwrap();
        let all = vec![group, member.clone()];
        let code = emit(&member, &all, &ctx(CapabilitySet::none())).unwrap();

        assert_eq!(
            code.matches("import { Group, GroupFastSchemaStructure } from \"./group.model\";")
                .count(),
            1
        );
        assert!(code.contains("    group?: object | string | string[];\n    groupId?: string;\n"));
        assert!(code.contains("group?: Group | string | null;"));
        assert!(code.contains("groups?: Group[] | string[] | null;"));
        assert!(code.contains("items: GroupFastSchemaStructure,"));
    }

    #[test]
    fn test_unknown_link_target_is_schema_error() {
        let member = ContractBuilder::new("Member", "Member")
            .field(FieldBuilder::new("group", "string").link(ContractLink::new("Nope")))
            .build()
            .unwrap();
        let err = emit(&member, std::slice::from_ref(&member), &ctx(CapabilitySet::none())).unwrap_err();
        assert!(err.is_schema());
        assert!(err.to_string().contains("unknown contract 'Nope'"));
    }

    #[test]
    fn test_entity_type_must_match_link() {
        let group = ContractBuilder::new("Group", "Group")
            .field(FieldBuilder::new("name", "string"))
            .build()
            .unwrap();
        let linked = |entity: &str| {
            ContractBuilder::new("Member", "Member")
                .field(
                    FieldBuilder::new("group", "string")
                        .entity_type(entity)
                        .link(ContractLink::new("Group")),
                )
                .build()
                .unwrap()
        };

        let ok = linked("Group");
        let all = vec![group.clone(), ok.clone()];
        assert!(emit(&ok, &all, &ctx(CapabilitySet::none())).is_ok());

        let bad = linked("Team");
        let all = vec![group, bad.clone()];
        let err = emit(&bad, &all, &ctx(CapabilitySet::none())).unwrap_err();
        assert!(err.is_schema());
        assert!(err.to_string().contains("entityType 'Team'"));
    }

    #[test]
    fn test_resolve_links_without_emitting() {
        let group = ContractBuilder::new("Group", "Group").build().unwrap();
        let member = ContractBuilder::new("Member", "Member")
            .field(
                FieldBuilder::new("groups", "string")
                    .array()
                    .link(ContractLink::new("Group")),
            )
            .build()
            .unwrap();
        let all = vec![group, member.clone()];

        let links = resolve_links(&member, &all).unwrap();
        assert_eq!(links["groups"].model_name, "Group");
        assert!(links["groups"].many);
        assert!(resolve_links(&member, &all[1..]).unwrap_err().is_schema());
    }

    #[test]
    fn test_self_link_has_no_import() {
        let node = ContractBuilder::new("Node", "Node")
            .field(
                FieldBuilder::new("parent", "string")
                    .nullable(true)
                    .link(ContractLink::new("Node")),
            )
            .build()
            .unwrap();
        let code = emit(&node, std::slice::from_ref(&node), &ctx(CapabilitySet::none())).unwrap();
        assert!(!code.contains("./node.model"));
        assert!(!code.contains("NodeFastSchemaStructure,"));
    }

    #[test]
    fn test_after_validation_in_field_order() {
        let contract = ContractBuilder::new("User", "User")
            .field(FieldBuilder::new("email", "string").after_validation("normalizeEmail"))
            .field(FieldBuilder::new("nick", "string"))
            .field(FieldBuilder::new("name", "string").after_validation("trim"))
            .build()
            .unwrap();
        let code = emit(&contract, std::slice::from_ref(&contract), &ctx(CapabilitySet::none())).unwrap();
        let expected = "    public override afterValidation(item: this) {\n        item.email = Callbacks.resolve(\"normalizeEmail\")(item.email);\n        item.name = Callbacks.resolve(\"trim\")(item.name);\n        return item;\n    }\n";
        assert!(code.contains(expected));
        assert!(code.contains("Callbacks"));
    }

    #[test]
    fn test_capability_groups() {
        let caps = CapabilitySet {
            openapi: true,
            graphql: true,
            ..CapabilitySet::none()
        };
        let contract = user();
        let code = emit(&contract, std::slice::from_ref(&contract), &ctx(caps)).unwrap();
        assert!(code.contains("@ObjectType()\nexport class User"));
        assert!(code.contains("@GraphQLField(() => ID, { nullable: true })"));
        assert!(code.contains("import { ApiProperty } from \"@contractc/openapi\";"));
        assert!(code.contains("import { Field as GraphQLField, ID, ObjectType } from \"@contractc/graphql\";"));
    }

    #[test]
    fn test_emission_policy() {
        let contract = ContractBuilder::new("User", "User")
            .field(FieldBuilder::new("first-name", "string"))
            .field(FieldBuilder::new("email", "string"))
            .build()
            .unwrap();
        let all = std::slice::from_ref(&contract);

        let err = emit(&contract, all, &ctx(CapabilitySet::none())).unwrap_err();
        assert!(matches!(err, AppError::Emission { .. }));

        let lenient = EmitContext {
            policy: EmissionPolicy::Placeholder,
            ..ctx(CapabilitySet::none())
        };
        let code = emit(&contract, all, &lenient).unwrap();
        assert!(code.contains("// 'first-name' omitted:"));
        assert!(code.contains("    email: string;\n"));
    }

    #[test]
    fn test_messages_and_imports() {
        let contract = ContractBuilder::new("Auth", "Auth")
            .field(FieldBuilder::new("token", "string"))
            .message(MessageBuilder::new("LoginRequest").property("username", MessageProperty::new("string")))
            .import("crypto")
            .build()
            .unwrap();
        let code = emit(&contract, std::slice::from_ref(&contract), &ctx(CapabilitySet::none())).unwrap();
        assert!(code.contains("export class LoginRequestDTO implements LoginRequest {"));
        assert!(code.contains("import * as crypto from \"crypto\";"));
        assert!(code.contains("instanceToPlain"));
        assert!(code.starts_with("// Generated from AuthContract. Do not edit.\n"));
    }

    #[test]
    fn test_default_value_in_schema() {
        let contract = ContractBuilder::new("Tag", "Tag")
            .field(FieldBuilder::new("weight", "int32").default_value(json!(1)))
            .build()
            .unwrap();
        let code = emit(&contract, std::slice::from_ref(&contract), &ctx(CapabilitySet::none())).unwrap();
        assert!(code.contains("    weight?: number;\n"));
        assert!(code.contains("weight?: number = 1;"));
        assert!(code.contains("default: 1,"));
    }
}

//! # IR Builders
//!
//! Fluent constructors for the Contract IR. Anything able to produce these
//! shapes (builders, parsed contract files) can feed the compiler; no
//! annotation runtime is involved.

use crate::contract::models::{
    CacheOptions, Contract, ContractLink, CustomDecorator, ExtraOptions, Field, Index, Message,
    MessageProperty, ProtoType, Service, ValidationOption,
};
use crate::error::AppResult;
use crate::validation::validate_contract;
use indexmap::IndexMap;
use serde_json::Value;

/// Builds a [`Contract`] and validates it on `build()`.
#[derive(Debug, Clone)]
pub struct ContractBuilder {
    contract: Contract,
}

impl ContractBuilder {
    /// Starts a contract with no fields.
    pub fn new(contract_name: impl Into<String>, controller_name: impl Into<String>) -> Self {
        Self {
            contract: Contract {
                contract_name: contract_name.into(),
                controller_name: controller_name.into(),
                fields: Vec::new(),
                messages: Vec::new(),
                services: Vec::new(),
                indexes: Vec::new(),
                cache: None,
                options: None,
                imports: Vec::new(),
            },
        }
    }

    /// Appends a field.
    pub fn field(mut self, field: impl Into<Field>) -> Self {
        self.contract.fields.push(field.into());
        self
    }

    /// Appends a message.
    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.contract.messages.push(message.into());
        self
    }

    /// Appends a service.
    pub fn service(mut self, service: Service) -> Self {
        self.contract.services.push(service);
        self
    }

    /// Appends an index.
    pub fn index(mut self, name: impl Into<String>, fields: &[&str]) -> Self {
        self.contract.indexes.push(Index {
            name: name.into(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            options: None,
        });
        self
    }

    /// Sets cache directives.
    pub fn cache(mut self, cache: CacheOptions) -> Self {
        self.contract.cache = Some(cache);
        self
    }

    /// Sets contract options.
    pub fn options(mut self, options: ExtraOptions) -> Self {
        self.contract.options = Some(options);
        self
    }

    /// Places the model under the project source tree.
    pub fn module_contract(mut self) -> Self {
        self.contract
            .options
            .get_or_insert_with(ExtraOptions::default)
            .module_contract = true;
        self
    }

    /// Adds an import request.
    pub fn import(mut self, import: impl Into<String>) -> Self {
        self.contract.imports.push(import.into());
        self
    }

    /// Validates and returns the contract.
    pub fn build(self) -> AppResult<Contract> {
        validate_contract(&self.contract)?;
        Ok(self.contract)
    }
}

/// Builds a [`Field`].
#[derive(Debug, Clone)]
pub struct FieldBuilder {
    field: Field,
}

impl FieldBuilder {
    /// A field with the given key and type tag.
    pub fn new(property_key: impl Into<String>, proto_type: impl Into<ProtoType>) -> Self {
        Self {
            field: Field {
                property_key: property_key.into(),
                proto_type: proto_type.into(),
                nullable: None,
                read_only: false,
                unique: false,
                index: false,
                exclude: false,
                to_plain_only: false,
                proto_repeated: false,
                array: false,
                default_value: None,
                object_type: None,
                entity_type: None,
                resolver: None,
                array_type: None,
                validations: Vec::new(),
                link: Vec::new(),
                custom_decorator: IndexMap::new(),
                transform: None,
                to_plain: None,
                after_validation: None,
            },
        }
    }

    /// Sets nullability explicitly.
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.field.nullable = Some(nullable);
        self
    }

    /// Marks the field read-only.
    pub fn read_only(mut self) -> Self {
        self.field.read_only = true;
        self
    }

    /// Marks the field unique.
    pub fn unique(mut self) -> Self {
        self.field.unique = true;
        self
    }

    /// Marks the field indexed.
    pub fn index(mut self) -> Self {
        self.field.index = true;
        self
    }

    /// Excludes the field from exposure.
    pub fn exclude(mut self) -> Self {
        self.field.exclude = true;
        self
    }

    /// Excludes the field only when serializing.
    pub fn exclude_to_plain_only(mut self) -> Self {
        self.field.exclude = true;
        self.field.to_plain_only = true;
        self
    }

    /// Marks the field as a list.
    pub fn array(mut self) -> Self {
        self.field.array = true;
        self
    }

    /// Marks the field as a repeated protocol field.
    pub fn repeated(mut self) -> Self {
        self.field.proto_repeated = true;
        self
    }

    /// Sets the default value.
    pub fn default_value(mut self, value: Value) -> Self {
        self.field.default_value = Some(value);
        self
    }

    /// Overrides the target type.
    pub fn object_type(mut self, ty: impl Into<String>) -> Self {
        self.field.object_type = Some(ty.into());
        self
    }

    /// Sets the linked entity type.
    pub fn entity_type(mut self, ty: impl Into<String>) -> Self {
        self.field.entity_type = Some(ty.into());
        self
    }

    /// Sets the graph resolver name.
    pub fn resolver(mut self, resolver: impl Into<String>) -> Self {
        self.field.resolver = Some(resolver.into());
        self
    }

    /// Sets the item type of a `simpleArray` field.
    pub fn array_type(mut self, ty: impl Into<ProtoType>) -> Self {
        self.field.array_type = Some(ty.into());
        self
    }

    /// Appends a validation.
    pub fn validation(mut self, validation: ValidationOption) -> Self {
        self.field.validations.push(validation);
        self
    }

    /// Appends a link.
    pub fn link(mut self, link: ContractLink) -> Self {
        self.field.link.push(link);
        self
    }

    /// Adds a custom annotation.
    pub fn custom_decorator(
        mut self,
        name: impl Into<String>,
        import: impl Into<String>,
        options: Option<Value>,
    ) -> Self {
        self.field.custom_decorator.insert(
            name.into(),
            CustomDecorator {
                import: import.into(),
                options,
            },
        );
        self
    }

    /// Sets the inbound transform callback key.
    pub fn transform(mut self, key: impl Into<String>) -> Self {
        self.field.transform = Some(key.into());
        self
    }

    /// Sets the outbound transform callback key.
    pub fn to_plain(mut self, key: impl Into<String>) -> Self {
        self.field.to_plain = Some(key.into());
        self
    }

    /// Sets the post-validation callback key.
    pub fn after_validation(mut self, key: impl Into<String>) -> Self {
        self.field.after_validation = Some(key.into());
        self
    }

    /// Returns the field.
    pub fn build(self) -> Field {
        self.field
    }
}

impl From<FieldBuilder> for Field {
    fn from(b: FieldBuilder) -> Self {
        b.build()
    }
}

/// Builds a [`Message`].
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    message: Message,
}

impl MessageBuilder {
    /// An empty message.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            message: Message {
                name: name.into(),
                properties: IndexMap::new(),
            },
        }
    }

    /// Adds or replaces a property.
    pub fn property(mut self, name: impl Into<String>, property: MessageProperty) -> Self {
        self.message.properties.insert(name.into(), property);
        self
    }

    /// Returns the message.
    pub fn build(self) -> Message {
        self.message
    }
}

impl From<MessageBuilder> for Message {
    fn from(b: MessageBuilder) -> Self {
        b.build()
    }
}

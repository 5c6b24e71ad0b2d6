//! # Data Models
//!
//! Definition of the Contract Intermediate Representation (IR).
//!
//! The IR serializes with camelCase keys, which is also the shape written into
//! the consolidated manifest. Map-shaped members use `IndexMap` so declaration
//! order survives a load/emit cycle.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Suffix appended to a contract name to form its generated type name.
pub const CONTRACT_SUFFIX: &str = "Contract";

fn is_false(b: &bool) -> bool {
    !*b
}

/// Protocol-level field type tag.
///
/// Parsing is total: unrecognized tags are kept verbatim in `Other`, so a
/// contract always loads and re-serializes with its original tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProtoType {
    /// `string`
    String,
    /// `text`
    Text,
    /// `bool`
    Bool,
    /// `boolean`
    Boolean,
    /// `int32`
    Int32,
    /// `int64`
    Int64,
    /// `float`
    Float,
    /// `double`
    Double,
    /// `bytes`
    Bytes,
    /// `date`
    Date,
    /// `timestamp`
    Timestamp,
    /// `time`
    Time,
    /// `uuid`
    Uuid,
    /// `json`
    Json,
    /// `jsonb`
    Jsonb,
    /// `bigint`
    BigInt,
    /// `enum`
    Enum,
    /// `any`
    Any,
    /// `object`
    Object,
    /// `simpleArray`: a flat list whose item type comes from `arrayType`.
    SimpleArray,
    /// `<inner>[]`
    Array(Box<ProtoType>),
    /// Any tag not listed above.
    Other(String),
}

impl ProtoType {
    /// Parses a tag. Never fails.
    pub fn parse(tag: &str) -> Self {
        let tag = tag.trim();
        if let Some(inner) = tag.strip_suffix("[]") {
            return ProtoType::Array(Box::new(ProtoType::parse(inner)));
        }
        match tag {
            "string" => ProtoType::String,
            "text" => ProtoType::Text,
            "bool" => ProtoType::Bool,
            "boolean" => ProtoType::Boolean,
            "int32" => ProtoType::Int32,
            "int64" => ProtoType::Int64,
            "float" => ProtoType::Float,
            "double" => ProtoType::Double,
            "bytes" => ProtoType::Bytes,
            "date" => ProtoType::Date,
            "timestamp" => ProtoType::Timestamp,
            "time" => ProtoType::Time,
            "uuid" => ProtoType::Uuid,
            "json" => ProtoType::Json,
            "jsonb" => ProtoType::Jsonb,
            "bigint" => ProtoType::BigInt,
            "enum" => ProtoType::Enum,
            "any" => ProtoType::Any,
            "object" => ProtoType::Object,
            "simpleArray" => ProtoType::SimpleArray,
            other => ProtoType::Other(other.to_string()),
        }
    }

    /// Returns the canonical tag.
    pub fn as_tag(&self) -> String {
        match self {
            ProtoType::String => "string".into(),
            ProtoType::Text => "text".into(),
            ProtoType::Bool => "bool".into(),
            ProtoType::Boolean => "boolean".into(),
            ProtoType::Int32 => "int32".into(),
            ProtoType::Int64 => "int64".into(),
            ProtoType::Float => "float".into(),
            ProtoType::Double => "double".into(),
            ProtoType::Bytes => "bytes".into(),
            ProtoType::Date => "date".into(),
            ProtoType::Timestamp => "timestamp".into(),
            ProtoType::Time => "time".into(),
            ProtoType::Uuid => "uuid".into(),
            ProtoType::Json => "json".into(),
            ProtoType::Jsonb => "jsonb".into(),
            ProtoType::BigInt => "bigint".into(),
            ProtoType::Enum => "enum".into(),
            ProtoType::Any => "any".into(),
            ProtoType::Object => "object".into(),
            ProtoType::SimpleArray => "simpleArray".into(),
            ProtoType::Array(inner) => format!("{}[]", inner.as_tag()),
            ProtoType::Other(s) => s.clone(),
        }
    }

    /// True for `simpleArray` and `<inner>[]` tags.
    pub fn is_array_like(&self) -> bool {
        matches!(self, ProtoType::SimpleArray | ProtoType::Array(_))
    }
}

impl From<String> for ProtoType {
    fn from(s: String) -> Self {
        ProtoType::parse(&s)
    }
}

impl From<&str> for ProtoType {
    fn from(s: &str) -> Self {
        ProtoType::parse(s)
    }
}

impl From<ProtoType> for String {
    fn from(p: ProtoType) -> Self {
        p.as_tag()
    }
}

impl fmt::Display for ProtoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_tag())
    }
}

/// The name part of a validation entry: a bare name or a `[name, ...params]` tuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValidationKind {
    /// e.g. `"IsEmail"`
    Name(String),
    /// e.g. `["MinLength", 3]`
    Tuple(Vec<Value>),
}

/// A single validation annotation applied to a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawValidation")]
pub struct ValidationOption {
    /// Validation name (and, for tuples, its positional parameters).
    #[serde(rename = "type")]
    pub kind: ValidationKind,
    /// Single positional parameter, used when `kind` is a bare name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Custom failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Arbitrary context object forwarded to the validator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

/// Accepted input shapes for a validation entry.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawValidation {
    Bare(String),
    Tuple(Vec<Value>),
    Named {
        #[serde(rename = "type", alias = "name")]
        kind: ValidationKind,
        #[serde(default)]
        value: Option<Value>,
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        context: Option<Value>,
    },
}

impl From<RawValidation> for ValidationOption {
    fn from(raw: RawValidation) -> Self {
        match raw {
            RawValidation::Bare(name) => ValidationOption::named(name),
            RawValidation::Tuple(items) => ValidationOption::tuple(items),
            RawValidation::Named {
                kind,
                value,
                message,
                context,
            } => ValidationOption {
                kind,
                value,
                message,
                context,
            },
        }
    }
}

impl ValidationOption {
    /// A validation referenced by bare name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            kind: ValidationKind::Name(name.into()),
            value: None,
            message: None,
            context: None,
        }
    }

    /// A `[name, ...params]` validation.
    pub fn tuple(items: Vec<Value>) -> Self {
        Self {
            kind: ValidationKind::Tuple(items),
            value: None,
            message: None,
            context: None,
        }
    }

    /// Sets the single positional parameter.
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    /// Sets the failure message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the validator context.
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    /// The validation name, when one can be determined.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            ValidationKind::Name(n) => Some(n.as_str()),
            ValidationKind::Tuple(items) => items.first().and_then(Value::as_str),
        }
    }
}

/// A field's reference to another contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractLink {
    /// `contractName` of the referenced contract.
    pub contract: String,
    /// Entity name on the other side of the relation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    /// Foreign key name.
    #[serde(default)]
    pub field: String,
    /// Whether the relation holds many entities.
    #[serde(default, skip_serializing_if = "is_false")]
    pub array: bool,
    /// Whether the storage layer should create the relationship.
    #[serde(default, skip_serializing_if = "is_false")]
    pub create_relationship: bool,
}

impl ContractLink {
    /// Link to the named contract.
    pub fn new(contract: impl Into<String>) -> Self {
        Self {
            contract: contract.into(),
            entity_name: None,
            field: String::new(),
            array: false,
            create_relationship: false,
        }
    }

    /// Sets the entity name.
    pub fn entity_name(mut self, name: impl Into<String>) -> Self {
        self.entity_name = Some(name.into());
        self
    }

    /// Sets the foreign key name.
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    /// Marks the link as one-to-many.
    pub fn array(mut self) -> Self {
        self.array = true;
        self
    }

    /// Requests relationship creation.
    pub fn create_relationship(mut self) -> Self {
        self.create_relationship = true;
        self
    }
}

/// An extra annotation sourced from a named import location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomDecorator {
    /// Import source of the annotation.
    pub import: String,
    /// Options passed as the annotation's single argument.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

/// One data attribute of a contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Property name, unique within the contract.
    pub property_key: String,
    /// Type tag.
    pub proto_type: ProtoType,
    /// `Some(true)` makes the property optional, `Some(false)` marks it required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    /// Read-only property.
    #[serde(default, skip_serializing_if = "is_false")]
    pub read_only: bool,
    /// Unique constraint.
    #[serde(default, skip_serializing_if = "is_false")]
    pub unique: bool,
    /// Indexed column.
    #[serde(default, skip_serializing_if = "is_false")]
    pub index: bool,
    /// Excluded from exposure.
    #[serde(default, skip_serializing_if = "is_false")]
    pub exclude: bool,
    /// Restricts exclusion to the serialize direction.
    #[serde(default, skip_serializing_if = "is_false")]
    pub to_plain_only: bool,
    /// Repeated field (protocol form).
    #[serde(default, skip_serializing_if = "is_false")]
    pub proto_repeated: bool,
    /// Repeated field.
    #[serde(default, skip_serializing_if = "is_false")]
    pub array: bool,
    /// Default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    /// Explicit target type, overrides the mapped one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
    /// Linked entity type name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    /// Name of a resolver for graph queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolver: Option<String>,
    /// Item type of a `simpleArray` field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_type: Option<ProtoType>,
    /// Validation annotations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validations: Vec<ValidationOption>,
    /// Cross-contract links.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub link: Vec<ContractLink>,
    /// Extra annotations, keyed by annotation name.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub custom_decorator: IndexMap<String, CustomDecorator>,
    /// Callback key applied when converting plain data into the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
    /// Callback key applied when converting the model into plain data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_plain: Option<String>,
    /// Callback key applied after validation succeeds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_validation: Option<String>,
}

impl Field {
    /// True when the property may be absent or null.
    pub fn is_nullable(&self) -> bool {
        self.nullable == Some(true)
    }

    /// True only when nullability was explicitly turned off.
    pub fn is_required(&self) -> bool {
        self.nullable == Some(false)
    }

    /// True when the field holds a list.
    pub fn is_array(&self) -> bool {
        self.proto_repeated || self.array
    }

    /// True when the field links to other contracts.
    pub fn is_linked(&self) -> bool {
        !self.link.is_empty()
    }
}

/// One property of a message (DTO).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageProperty {
    /// Type tag.
    #[serde(rename = "type")]
    pub ty: ProtoType,
    /// `Some(false)` makes the property optional.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    /// Transport parameter kind (e.g. `path`, `query`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
    /// Item type for `simpleArray` properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_type: Option<ProtoType>,
    /// Default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Repeated property (protocol form).
    #[serde(default, skip_serializing_if = "is_false")]
    pub proto_repeated: bool,
    /// Repeated property.
    #[serde(default, skip_serializing_if = "is_false")]
    pub array: bool,
}

impl MessageProperty {
    /// A required property of the given type.
    pub fn new(ty: impl Into<ProtoType>) -> Self {
        Self {
            ty: ty.into(),
            required: None,
            param_type: None,
            array_type: None,
            default: None,
            proto_repeated: false,
            array: false,
        }
    }

    /// Marks the property optional.
    pub fn optional(mut self) -> Self {
        self.required = Some(false);
        self
    }

    /// Sets the item type.
    pub fn array_type(mut self, ty: impl Into<ProtoType>) -> Self {
        self.array_type = Some(ty.into());
        self
    }

    /// Marks the property as a list.
    pub fn repeated(mut self) -> Self {
        self.array = true;
        self
    }

    /// Sets a default value.
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// True when the property holds a list, in any of the supported spellings.
    pub fn is_array(&self) -> bool {
        self.proto_repeated || self.array || self.ty.is_array_like()
    }
}

/// A request/response shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// DTO name.
    pub name: String,
    /// Properties in declaration order.
    #[serde(default)]
    pub properties: IndexMap<String, MessageProperty>,
}

/// HTTP verb of a service endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
    /// PATCH
    Patch,
    /// OPTIONS
    Options,
}

/// Cache directives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheOptions {
    /// Cache key prefix.
    pub key: String,
    /// Time to live in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
    /// Compress cached payloads.
    #[serde(default, skip_serializing_if = "is_false")]
    pub compress: bool,
}

/// A service endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Endpoint name.
    pub name: String,
    /// Route path.
    pub path: String,
    /// HTTP verb.
    pub method: HttpMethod,
    /// Request message name.
    pub request: String,
    /// Response message name.
    pub response: String,
    /// Response cache directives.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheOptions>,
    /// Requires an authenticated caller.
    #[serde(default, skip_serializing_if = "is_false")]
    pub auth: bool,
    /// Restricted to root users.
    #[serde(default, skip_serializing_if = "is_false")]
    pub root_only: bool,
    /// Handler function name override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    /// Whether a handler stub should be generated.
    #[serde(default, skip_serializing_if = "is_false")]
    pub create_boilerplate: bool,
}

/// A storage index over one or more fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    /// Index name.
    pub name: String,
    /// Indexed fields.
    pub fields: Vec<String>,
    /// Backend specific options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

/// Contract-level options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraOptions {
    /// Emit the model under the project source tree instead of the generated dir.
    #[serde(default, skip_serializing_if = "is_false")]
    pub module_contract: bool,
    /// Storage table/collection name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_schema_name: Option<String>,
    /// Track created/updated timestamps.
    #[serde(default, skip_serializing_if = "is_false")]
    pub database_timestamps: bool,
    /// Track the acting user.
    #[serde(default, skip_serializing_if = "is_false")]
    pub database_user_action: bool,
    /// Documentation tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Anything else, preserved verbatim.
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// The root unit of compilation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    /// Logical contract name.
    pub contract_name: String,
    /// Controller name, used for file and model naming.
    pub controller_name: String,
    /// Data attributes.
    pub fields: Vec<Field>,
    /// DTO shapes.
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Service endpoints.
    #[serde(default)]
    pub services: Vec<Service>,
    /// Storage indexes.
    #[serde(default, rename = "indexs", alias = "indexes")]
    pub indexes: Vec<Index>,
    /// Cache directives.
    #[serde(default)]
    pub cache: Option<CacheOptions>,
    /// Contract-level options.
    #[serde(default)]
    pub options: Option<ExtraOptions>,
    /// Extra imports requested by the contract author.
    #[serde(default)]
    pub imports: Vec<String>,
}

impl Contract {
    /// The generated type name: `contractName` with the `Contract` suffix.
    pub fn generated_name(&self) -> String {
        if self.contract_name.ends_with(CONTRACT_SUFFIX) {
            self.contract_name.clone()
        } else {
            format!("{}{}", self.contract_name, CONTRACT_SUFFIX)
        }
    }

    /// Name of the emitted model class.
    pub fn model_name(&self) -> &str {
        &self.controller_name
    }

    /// Name of the emitted model interface.
    pub fn interface_name(&self) -> String {
        format!("I{}", self.controller_name)
    }

    /// Module file stem, e.g. `user.model`.
    pub fn file_stem(&self) -> String {
        format!("{}.model", self.controller_name.to_lowercase())
    }

    /// Whether the model lives in the project source tree.
    pub fn is_module_contract(&self) -> bool {
        self.options.as_ref().is_some_and(|o| o.module_contract)
    }
}

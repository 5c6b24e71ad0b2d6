#![deny(missing_docs)]

//! # Contract IR
//!
//! - **models**: The Contract/Field/Message/Service shapes.
//! - **builder**: Fluent IR construction.
//! - **loader**: Turning JSON/YAML documents into validated contracts.

pub mod builder;
pub mod loader;
pub mod models;

pub use builder::{ContractBuilder, FieldBuilder, MessageBuilder};
pub use loader::{load_contract_value, parse_contracts};
pub use models::{
    CacheOptions, Contract, ContractLink, CustomDecorator, ExtraOptions, Field, HttpMethod, Index,
    Message, MessageProperty, ProtoType, Service, ValidationKind, ValidationOption,
    CONTRACT_SUFFIX,
};

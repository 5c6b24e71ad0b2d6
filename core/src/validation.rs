#![deny(missing_docs)]

//! # Contract Validation
//!
//! Structural precondition checks run on a contract before any emission.
//! A failure is a `Schema` error and abandons that contract's artifact.

use crate::contract::Contract;
use crate::error::{AppError, AppResult};
use serde_json::Value;
use std::collections::HashSet;

/// Checks a raw (untyped) contract value.
///
/// This is where "missing" and "not an array" are observable; once a value has
/// been deserialized into [`Contract`] those shapes are guaranteed by the type.
pub fn validate_raw_contract(value: &Value) -> AppResult<()> {
    let obj = value
        .as_object()
        .ok_or_else(|| AppError::schema("contract must be an object"))?;

    if !is_non_empty_str(obj.get("contractName")) {
        return Err(AppError::schema("contractName is required"));
    }
    let name = obj
        .get("contractName")
        .and_then(Value::as_str)
        .unwrap_or_default();

    if !is_non_empty_str(obj.get("controllerName")) {
        return Err(AppError::schema(format!(
            "controllerName is required (contract '{}')",
            name
        )));
    }
    match obj.get("fields") {
        Some(Value::Array(_)) => Ok(()),
        Some(_) => Err(AppError::schema(format!(
            "fields must be an array (contract '{}')",
            name
        ))),
        None => Err(AppError::schema(format!(
            "fields is required (contract '{}')",
            name
        ))),
    }
}

/// Checks a typed contract.
pub fn validate_contract(contract: &Contract) -> AppResult<()> {
    if contract.contract_name.trim().is_empty() {
        return Err(AppError::schema("contractName is required"));
    }
    if contract.controller_name.trim().is_empty() {
        return Err(AppError::schema(format!(
            "controllerName is required (contract '{}')",
            contract.contract_name
        )));
    }

    let mut seen = HashSet::new();
    for field in &contract.fields {
        if field.property_key.trim().is_empty() {
            return Err(AppError::schema(format!(
                "field propertyKey is required (contract '{}')",
                contract.contract_name
            )));
        }
        if !seen.insert(field.property_key.as_str()) {
            return Err(AppError::schema(format!(
                "duplicate propertyKey '{}' (contract '{}')",
                field.property_key, contract.contract_name
            )));
        }
    }

    Ok(())
}

fn is_non_empty_str(v: Option<&Value>) -> bool {
    v.and_then(Value::as_str).is_some_and(|s| !s.trim().is_empty())
}

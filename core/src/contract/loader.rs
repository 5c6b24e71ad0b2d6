//! # Contract Loading
//!
//! Converts contract documents into validated IR. A document holds either one
//! contract object or a list of them. YAML is accepted as a superset of JSON.

use crate::contract::models::Contract;
use crate::error::{AppError, AppResult};
use crate::validation::{validate_contract, validate_raw_contract};
use serde_json::Value;

/// Validates a raw contract value, then deserializes and re-validates it.
pub fn load_contract_value(value: Value) -> AppResult<Contract> {
    validate_raw_contract(&value)?;
    let contract: Contract = serde_json::from_value(value)
        .map_err(|e| AppError::schema(format!("malformed contract: {}", e)))?;
    validate_contract(&contract)?;
    Ok(contract)
}

/// Parses every contract in a JSON or YAML document, in document order.
///
/// Only an unreadable document fails as a whole. Each entry carries its own
/// result, so one invalid contract never hides its siblings.
pub fn parse_contracts(source: &str) -> AppResult<Vec<AppResult<Contract>>> {
    let doc: Value = serde_yaml::from_str(source)?;
    Ok(match doc {
        Value::Array(items) => items.into_iter().map(load_contract_value).collect(),
        Value::Null => Vec::new(),
        single => vec![load_contract_value(single)],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_yaml_contract() {
        let src = r#"
contractName: User
controllerName: User
fields:
  - propertyKey: email
    protoType: string
    nullable: false
    unique: true
"#;
        let contracts: Vec<Contract> = parse_contracts(src)
            .unwrap()
            .into_iter()
            .collect::<AppResult<_>>()
            .unwrap();
        assert_eq!(contracts.len(), 1);
        assert_eq!(contracts[0].fields[0].property_key, "email");
        assert!(contracts[0].fields[0].unique);
    }

    #[test]
    fn test_parse_json_list_keeps_order() {
        let src = r#"[
            {"contractName": "B", "controllerName": "B", "fields": []},
            {"contractName": "A", "controllerName": "A", "fields": []}
        ]"#;
        let contracts: Vec<Contract> = parse_contracts(src)
            .unwrap()
            .into_iter()
            .collect::<AppResult<_>>()
            .unwrap();
        let names: Vec<_> = contracts.iter().map(|c| c.contract_name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_parse_reports_schema_error() {
        let src = r#"{"controllerName": "User", "fields": []}"#;
        let err = parse_contracts(src).unwrap().remove(0).unwrap_err();
        assert!(err.is_schema());
        assert!(err.to_string().contains("contractName"));
    }

    #[test]
    fn test_malformed_field_is_schema_error() {
        let src = r#"{"contractName": "U", "controllerName": "U", "fields": [{"protoType": "string"}]}"#;
        let err = parse_contracts(src).unwrap().remove(0).unwrap_err();
        assert!(err.is_schema());
    }

    #[test]
    fn test_invalid_entry_keeps_siblings() {
        let src = r#"[
            {"contractName": "A", "controllerName": "A", "fields": []},
            {"controllerName": "B", "fields": []},
            {"contractName": "C", "controllerName": "C", "fields": []}
        ]"#;
        let entries = parse_contracts(src).unwrap();
        assert_eq!(entries.len(), 3);
        let names: Vec<&str> = entries
            .iter()
            .filter_map(|e| e.as_ref().ok())
            .map(|c| c.contract_name.as_str())
            .collect();
        assert_eq!(names, vec!["A", "C"]);
        let err = entries[1].as_ref().unwrap_err();
        assert!(err.is_schema());
        assert!(err.to_string().contains("contractName is required"));
    }

    #[test]
    fn test_unreadable_document_fails_whole() {
        assert!(parse_contracts("[unclosed").is_err());
    }
}

//! # Import Composition
//!
//! Collects the names each emitted module needs and renders the import block.
//! Groups render in a fixed order and names are sorted, so identical inputs
//! always yield identical blocks.

use std::collections::{BTreeMap, BTreeSet};

/// Source of class transformation helpers.
pub const TRANSFORMER_IMPORT: &str = "class-transformer";
/// Source of validation annotations.
pub const VALIDATOR_IMPORT: &str = "class-validator";
/// Source of the fast serializer.
pub const FAST_JSON_IMPORT: &str = "fast-json-stringify";
/// Source of the document identity type.
pub const STORAGE_IMPORT: &str = "mongodb";
/// Source of API documentation annotations.
pub const OPENAPI_IMPORT: &str = "@contractc/openapi";
/// Source of relationship graph annotations.
pub const GRAPHQL_IMPORT: &str = "@contractc/graphql";

/// Names needed by one module, grouped by import source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSet {
    core_import: String,
    core: BTreeSet<String>,
    transformer: BTreeSet<String>,
    validator: BTreeSet<String>,
    openapi: BTreeSet<String>,
    graphql: BTreeSet<String>,
    storage: bool,
    custom: BTreeMap<String, BTreeSet<String>>,
    namespaces: BTreeMap<String, String>,
    linked: Vec<(String, Vec<String>)>,
}

impl ImportSet {
    /// A set holding only the base imports every module carries.
    pub fn new(core_import: impl Into<String>) -> Self {
        let mut set = Self::empty(core_import);
        set.core("AbstractModel");
        set.transformer("Expose");
        set.transformer("plainToInstance");
        set
    }

    /// A set with no names at all.
    pub fn empty(core_import: impl Into<String>) -> Self {
        Self {
            core_import: core_import.into(),
            core: BTreeSet::new(),
            transformer: BTreeSet::new(),
            validator: BTreeSet::new(),
            openapi: BTreeSet::new(),
            graphql: BTreeSet::new(),
            storage: false,
            custom: BTreeMap::new(),
            namespaces: BTreeMap::new(),
            linked: Vec::new(),
        }
    }

    /// Adds a name from the core module.
    pub fn core(&mut self, name: &str) {
        self.core.insert(name.to_string());
    }

    /// Adds a class-transformer name.
    pub fn transformer(&mut self, name: &str) {
        self.transformer.insert(name.to_string());
    }

    /// Adds a class-validator name.
    pub fn validator(&mut self, name: &str) {
        self.validator.insert(name.to_string());
    }

    /// Adds an API documentation name.
    pub fn openapi(&mut self, name: &str) {
        self.openapi.insert(name.to_string());
    }

    /// Adds a relationship graph name (`Field` is aliased to avoid clashes).
    pub fn graphql(&mut self, name: &str) {
        self.graphql.insert(name.to_string());
    }

    /// Requests the storage identity type.
    pub fn storage(&mut self) {
        self.storage = true;
    }

    /// Adds a custom annotation; core-sourced names fold into the core import.
    pub fn custom(&mut self, source: &str, name: &str) {
        if source == self.core_import {
            self.core(name);
        } else {
            self.custom
                .entry(source.to_string())
                .or_default()
                .insert(name.to_string());
        }
    }

    /// Adds a whole-module import bound to `binding`.
    pub fn namespace(&mut self, binding: &str, source: &str) {
        self.namespaces
            .insert(binding.to_string(), source.to_string());
    }

    /// Adds names imported from a linked model module, keeping first-seen order.
    pub fn linked(&mut self, specifier: &str, names: &[String]) {
        if let Some((_, existing)) = self.linked.iter_mut().find(|(s, _)| s == specifier) {
            for n in names {
                if !existing.contains(n) {
                    existing.push(n.clone());
                }
            }
        } else {
            self.linked.push((specifier.to_string(), names.to_vec()));
        }
    }

    /// Merges another set into this one.
    pub fn merge(&mut self, other: ImportSet) {
        self.core.extend(other.core);
        self.transformer.extend(other.transformer);
        self.validator.extend(other.validator);
        self.openapi.extend(other.openapi);
        self.graphql.extend(other.graphql);
        self.storage |= other.storage;
        for (source, names) in other.custom {
            self.custom.entry(source).or_default().extend(names);
        }
        self.namespaces.extend(other.namespaces);
        for (spec, names) in other.linked {
            self.linked(&spec, &names);
        }
    }

    /// Renders the import block, one statement per line.
    pub fn render(&self) -> String {
        let mut code = String::new();
        code.push_str(&format!("import * as fastJson from \"{}\";\n", FAST_JSON_IMPORT));

        push_named(&mut code, &self.core, &self.core_import);
        push_named(&mut code, &self.transformer, TRANSFORMER_IMPORT);
        push_named(&mut code, &self.validator, VALIDATOR_IMPORT);

        if self.storage {
            code.push_str(&format!("import {{ ObjectId }} from \"{}\";\n", STORAGE_IMPORT));
        }

        push_named(&mut code, &self.openapi, OPENAPI_IMPORT);
        if !self.graphql.is_empty() {
            let names: Vec<String> = self
                .graphql
                .iter()
                .map(|n| {
                    if n == "Field" {
                        "Field as GraphQLField".to_string()
                    } else {
                        n.clone()
                    }
                })
                .collect();
            code.push_str(&format!(
                "import {{ {} }} from \"{}\";\n",
                names.join(", "),
                GRAPHQL_IMPORT
            ));
        }

        for (source, names) in &self.custom {
            push_named(&mut code, names, source);
        }

        for (binding, source) in &self.namespaces {
            code.push_str(&format!("import * as {} from \"{}\";\n", binding, source));
        }

        for (spec, names) in &self.linked {
            code.push_str(&format!(
                "import {{ {} }} from \"{}\";\n",
                names.join(", "),
                spec
            ));
        }

        code
    }
}

fn push_named(code: &mut String, names: &BTreeSet<String>, source: &str) {
    if names.is_empty() {
        return;
    }
    let list: Vec<&str> = names.iter().map(String::as_str).collect();
    code.push_str(&format!(
        "import {{ {} }} from \"{}\";\n",
        list.join(", "),
        source
    ));
}

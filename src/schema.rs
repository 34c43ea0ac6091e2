//! Declarative schema tables and the request payloads built from them.
//!
//! A schema file lists collections (each with its fields in creation order),
//! permission grants, and seed records. Two tables ship with the binary:
//! `portfolio` (the current layout) and `legacy` (the original bootstrap
//! layout). Any JSON file with the same shape can be used instead.
use crate::error::{ProvisionError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

pub const PORTFOLIO: &str = "portfolio";
pub const LEGACY: &str = "legacy";

const PORTFOLIO_JSON: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/schemas/portfolio.json"
));
const LEGACY_JSON: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/schemas/legacy.json"
));

const DEFAULT_ICON: &str = "article";
const DEFAULT_DISPLAY_TEMPLATE: &str = "{{title}}";
const SYSTEM_COLLECTION_PREFIX: &str = "directus_";
const IDENTIFIER_PATTERN: &str = r"^[a-z][a-z0-9_]*$";

static IDENTIFIER: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(IDENTIFIER_PATTERN));

fn identifier() -> Result<&'static Regex> {
    IDENTIFIER
        .as_ref()
        .map_err(|err| ProvisionError::Schema(format!("identifier pattern: {err}")))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDef {
    pub collections: Vec<CollectionDef>,
    #[serde(default)]
    pub permissions: Vec<PermissionDef>,
    #[serde(default)]
    pub seeds: Vec<SeedDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectionDef {
    pub name: String,
    pub note: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub display_template: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

/// One field; `meta` and `schema` are overlays on the defaults, and any other
/// key is copied to the top level of the creation payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    pub field: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub meta: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub schema: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `role: null` grants to the built-in public access level; a role name is
/// looked up through `/roles` at grant time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PermissionDef {
    pub collection: String,
    #[serde(default = "default_action")]
    pub action: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub fields: Option<Vec<String>>,
}

fn default_action() -> String {
    "read".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedDef {
    pub collection: String,
    pub item: Map<String, Value>,
}

impl SchemaDef {
    /// Parse and validate a schema table.
    pub fn parse(text: &str) -> Result<Self> {
        let schema: Self = serde_json::from_str(text)
            .map_err(|err| ProvisionError::Schema(format!("parse schema JSON: {err}")))?;
        schema.validate()?;
        Ok(schema)
    }

    /// Load a built-in table by name, or a JSON file by path.
    pub fn load(source: &str) -> Result<Self> {
        if let Some(text) = builtin(source) {
            return Self::parse(text);
        }
        let path = Path::new(source);
        let text = std::fs::read_to_string(path).map_err(|err| {
            ProvisionError::Schema(format!("read schema {}: {err}", path.display()))
        })?;
        Self::parse(&text)
    }

    pub fn collection(&self, name: &str) -> Option<&CollectionDef> {
        self.collections
            .iter()
            .find(|collection| collection.name == name)
    }

    pub fn validate(&self) -> Result<()> {
        let pattern = identifier()?;
        let mut declared = BTreeSet::new();
        for collection in &self.collections {
            if !pattern.is_match(&collection.name) {
                return Err(ProvisionError::Schema(format!(
                    "collection name {:?} must match {}",
                    collection.name,
                    pattern.as_str()
                )));
            }
            if !declared.insert(collection.name.as_str()) {
                return Err(ProvisionError::Schema(format!(
                    "collection {:?} declared twice",
                    collection.name
                )));
            }
            let mut fields = BTreeSet::new();
            for field in &collection.fields {
                if !pattern.is_match(&field.field) {
                    return Err(ProvisionError::Schema(format!(
                        "field name {:?} in {:?} must match {}",
                        field.field,
                        collection.name,
                        pattern.as_str()
                    )));
                }
                if field.field_type.trim().is_empty() {
                    return Err(ProvisionError::Schema(format!(
                        "field {:?} in {:?} has an empty type",
                        field.field, collection.name
                    )));
                }
                if !fields.insert(field.field.as_str()) {
                    return Err(ProvisionError::Schema(format!(
                        "field {:?} declared twice in {:?}",
                        field.field, collection.name
                    )));
                }
            }
        }
        let known =
            |name: &str| declared.contains(name) || name.starts_with(SYSTEM_COLLECTION_PREFIX);
        for permission in &self.permissions {
            if !known(&permission.collection) {
                return Err(ProvisionError::Schema(format!(
                    "permission references undeclared collection {:?}",
                    permission.collection
                )));
            }
            if permission.action.trim().is_empty() {
                return Err(ProvisionError::Schema(format!(
                    "permission on {:?} has an empty action",
                    permission.collection
                )));
            }
        }
        for seed in &self.seeds {
            if !known(&seed.collection) {
                return Err(ProvisionError::Schema(format!(
                    "seed item references undeclared collection {:?}",
                    seed.collection
                )));
            }
        }
        Ok(())
    }
}

pub fn builtin(name: &str) -> Option<&'static str> {
    match name {
        PORTFOLIO => Some(PORTFOLIO_JSON),
        LEGACY => Some(LEGACY_JSON),
        _ => None,
    }
}

/// `POST /collections` body: metadata plus the default system fields.
pub fn collection_payload(collection: &CollectionDef) -> Value {
    let name = collection.name.as_str();
    json!({
        "collection": name,
        "meta": {
            "collection": name,
            "icon": collection.icon.as_deref().unwrap_or(DEFAULT_ICON),
            "note": collection.note,
            "display_template": collection
                .display_template
                .as_deref()
                .unwrap_or(DEFAULT_DISPLAY_TEMPLATE),
        },
        "schema": { "name": name, "comment": collection.note },
        "fields": system_fields(),
    })
}

fn system_fields() -> Value {
    let user_options = json!({ "template": "{{first_name}} {{last_name}}" });
    json!([
        {
            "field": "id",
            "type": "integer",
            "meta": {
                "interface": "input",
                "readonly": true,
                "hidden": true,
                "width": "full",
                "note": "Unique identifier for the record",
            },
            "schema": { "is_primary_key": true, "has_auto_increment": true },
        },
        {
            "field": "status",
            "type": "string",
            "meta": {
                "width": "full",
                "interface": "select-dropdown",
                "options": {
                    "choices": [
                        { "text": "Published", "value": "published" },
                        { "text": "Draft", "value": "draft" },
                        { "text": "Archived", "value": "archived" },
                    ]
                },
                "display": "labels",
            },
            "schema": { "default_value": "draft" },
        },
        {
            "field": "sort",
            "type": "integer",
            "meta": { "interface": "input", "hidden": true },
            "schema": { "is_nullable": true },
        },
        {
            "field": "user_created",
            "type": "string",
            "meta": {
                "special": ["user-created"],
                "interface": "select-dropdown-m2o",
                "options": user_options,
                "display": "user",
                "readonly": true,
                "hidden": true,
                "width": "half",
            },
            "schema": { "is_nullable": true },
        },
        {
            "field": "date_created",
            "type": "timestamp",
            "meta": {
                "special": ["date-created"],
                "interface": "datetime",
                "readonly": true,
                "hidden": true,
                "width": "half",
                "display": "datetime",
            },
            "schema": { "is_nullable": true },
        },
        {
            "field": "user_updated",
            "type": "string",
            "meta": {
                "special": ["user-updated"],
                "interface": "select-dropdown-m2o",
                "options": user_options,
                "display": "user",
                "readonly": true,
                "hidden": true,
                "width": "half",
            },
            "schema": { "is_nullable": true },
        },
        {
            "field": "date_updated",
            "type": "timestamp",
            "meta": {
                "special": ["date-updated"],
                "interface": "datetime",
                "readonly": true,
                "hidden": true,
                "width": "half",
                "display": "datetime",
            },
            "schema": { "is_nullable": true },
        },
    ])
}

/// `POST /fields/{collection}` body with caller overlays merged over defaults.
pub fn field_payload(field: &FieldDef) -> Value {
    let mut meta = Map::new();
    meta.insert("interface".to_string(), json!("input"));
    meta.insert("width".to_string(), json!("full"));
    meta.insert("display".to_string(), json!("raw"));
    meta.extend(field.meta.clone());

    let mut schema = Map::new();
    schema.insert("is_nullable".to_string(), json!(true));
    schema.extend(field.schema.clone());

    let mut payload = Map::new();
    payload.insert("field".to_string(), json!(field.field));
    payload.insert("type".to_string(), json!(field.field_type));
    payload.insert("meta".to_string(), Value::Object(meta));
    payload.insert("schema".to_string(), Value::Object(schema));
    for (key, value) in &field.extra {
        payload.insert(key.clone(), value.clone());
    }
    Value::Object(payload)
}

/// `POST /permissions` body; `role` is the resolved role id, if any.
pub fn permission_payload(permission: &PermissionDef, role: Option<&str>) -> Value {
    let fields = permission
        .fields
        .clone()
        .unwrap_or_else(|| vec!["*".to_string()]);
    json!({
        "role": role,
        "collection": permission.collection,
        "action": permission.action,
        "fields": fields,
        "permissions": {},
        "validation": {},
        "presets": {},
        "policy": null,
    })
}

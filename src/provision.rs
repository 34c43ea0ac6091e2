//! Existence checks and idempotent resource creation.
//!
//! Collections and fields are created at most once per name: a lookup that
//! succeeds skips creation. Lookup failures of any kind read as "absent", so a
//! flaky network leads to a creation attempt rather than a false skip.
//! Permissions have no lookup and are posted on every call; repeated runs add
//! duplicate rules.
//!
//! Creation failures never propagate. They are logged and returned as a
//! failed [`ResourceOutcome`] so the caller can move on to the next resource.
use crate::api::DirectusApi;
use crate::error::{ProvisionError, Result};
use crate::report::{OutcomeStatus, ResourceKind, ResourceOutcome};
use crate::schema::{self, CollectionDef, FieldDef, PermissionDef};
use crate::transport::{HttpResponse, Transport};
use serde_json::Value;

/// Outcome of one provisioning call plus the created representation, if any.
#[derive(Debug, Clone)]
pub struct Provisioned {
    pub outcome: ResourceOutcome,
    pub resource: Option<Value>,
}

impl Provisioned {
    fn skipped(kind: ResourceKind, target: String) -> Self {
        Self {
            outcome: ResourceOutcome::new(kind, target, OutcomeStatus::Skipped),
            resource: None,
        }
    }

    fn from_result(kind: ResourceKind, target: String, result: Result<Value>) -> Self {
        match result {
            Ok(resource) => {
                tracing::info!(%kind, %target, "created");
                Self {
                    outcome: ResourceOutcome::new(kind, target, OutcomeStatus::Created),
                    resource: Some(resource),
                }
            }
            Err(err) => {
                log_failure(kind, &target, &err);
                Self {
                    outcome: ResourceOutcome::failed(kind, target, &err),
                    resource: None,
                }
            }
        }
    }
}

pub(crate) fn log_failure(kind: ResourceKind, target: &str, err: &ProvisionError) {
    match err {
        ProvisionError::RemoteValidation { status, body } => {
            tracing::error!(%kind, %target, status, response = %body, "request rejected");
        }
        other => tracing::error!(%kind, %target, error = %other, "request failed"),
    }
}

fn reports_present(lookup: Result<HttpResponse>) -> bool {
    match lookup {
        Ok(response) => response.is_success(),
        Err(err) => {
            tracing::warn!(error = %err, "existence lookup failed; treating as absent");
            false
        }
    }
}

pub fn collection_exists<T: Transport>(api: &DirectusApi<T>, collection: &str) -> bool {
    reports_present(api.get_collection(collection))
}

pub fn field_exists<T: Transport>(api: &DirectusApi<T>, collection: &str, field: &str) -> bool {
    reports_present(api.get_field(collection, field))
}

pub fn ensure_collection<T: Transport>(api: &DirectusApi<T>, def: &CollectionDef) -> Provisioned {
    let target = def.name.clone();
    if collection_exists(api, &def.name) {
        tracing::info!(collection = %def.name, "collection already exists, skipping creation");
        return Provisioned::skipped(ResourceKind::Collection, target);
    }
    let payload = schema::collection_payload(def);
    Provisioned::from_result(
        ResourceKind::Collection,
        target,
        api.create_collection(&payload),
    )
}

pub fn ensure_field<T: Transport>(
    api: &DirectusApi<T>,
    collection: &str,
    def: &FieldDef,
) -> Provisioned {
    let target = format!("{collection}.{}", def.field);
    if field_exists(api, collection, &def.field) {
        tracing::info!(%collection, field = %def.field, "field already exists, skipping creation");
        return Provisioned::skipped(ResourceKind::Field, target);
    }
    let payload = schema::field_payload(def);
    Provisioned::from_result(
        ResourceKind::Field,
        target,
        api.create_field(collection, &payload),
    )
}

/// Grant a permission rule. Always issues `POST /permissions` once the role
/// resolves; there is no lookup for an existing identical rule.
pub fn grant_permission<T: Transport>(api: &DirectusApi<T>, def: &PermissionDef) -> Provisioned {
    let target = format!("{}:{}", def.collection, def.action);
    let role = match def.role.as_deref() {
        None => None,
        Some(name) => match resolve_role_id(api, name) {
            Ok(id) => Some(id),
            Err(err) => {
                log_failure(ResourceKind::Permission, &target, &err);
                return Provisioned {
                    outcome: ResourceOutcome::failed(ResourceKind::Permission, target, &err),
                    resource: None,
                };
            }
        },
    };
    let payload = schema::permission_payload(def, role.as_deref());
    Provisioned::from_result(
        ResourceKind::Permission,
        target,
        api.create_permission(&payload),
    )
}

fn resolve_role_id<T: Transport>(api: &DirectusApi<T>, name: &str) -> Result<String> {
    let roles = api.list_roles()?;
    roles
        .into_iter()
        .find(|role| role.name.eq_ignore_ascii_case(name))
        .map(|role| role.id)
        .ok_or_else(|| ProvisionError::Decode(format!("role {name:?} not found")))
}

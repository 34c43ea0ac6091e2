//! Run sequencing.
//!
//! Order is fixed: resolve credentials, create every collection, wait once for
//! the remote schema cache to settle, create each collection's fields in table
//! order, grant permissions, insert seed items. Only credential resolution can
//! abort a run; every other failure lands in the [`RunReport`].
use crate::api::DirectusApi;
use crate::auth::resolve_token;
use crate::config::ProvisionConfig;
use crate::error::Result;
use crate::provision::{ensure_collection, ensure_field, grant_permission, log_failure};
use crate::report::{OutcomeStatus, ResourceKind, ResourceOutcome, RunReport};
use crate::schema::SchemaDef;
use crate::seed::insert_seed;
use crate::transport::{HttpResponse, Transport};
use chrono::NaiveDate;
use std::time::Duration;

/// Resolve credentials and wrap the transport in an authenticated API.
pub fn authenticate<T: Transport>(
    transport: T,
    config: &ProvisionConfig,
) -> Result<DirectusApi<T>> {
    let token = resolve_token(&transport, &config.credentials)?;
    Ok(DirectusApi::new(transport, Some(token)))
}

/// Authenticate, then provision `schema`.
pub fn run<T: Transport>(
    transport: T,
    config: &ProvisionConfig,
    schema: &SchemaDef,
) -> Result<RunReport> {
    tracing::info!(base_url = %config.base_url, "setting up collections, fields, and permissions");
    let api = authenticate(transport, config)?;
    let today = chrono::Local::now().date_naive();
    let report = provision(&api, schema, config.settle_delay, today);
    tracing::info!(summary = %report.summary(), "setup finished");
    Ok(report)
}

pub fn provision<T: Transport>(
    api: &DirectusApi<T>,
    schema: &SchemaDef,
    settle_delay: Duration,
    today: NaiveDate,
) -> RunReport {
    let mut report = RunReport::default();

    for collection in &schema.collections {
        report.push(ensure_collection(api, collection).outcome);
    }

    if !schema.collections.is_empty() && !settle_delay.is_zero() {
        tracing::debug!(delay = ?settle_delay, "waiting for schema cache");
        std::thread::sleep(settle_delay);
    }

    for collection in &schema.collections {
        for field in &collection.fields {
            report.push(ensure_field(api, &collection.name, field).outcome);
        }
    }

    for permission in &schema.permissions {
        report.push(grant_permission(api, permission).outcome);
    }

    if !schema.seeds.is_empty() {
        tracing::info!(count = schema.seeds.len(), "adding seed items");
    }
    for seed in &schema.seeds {
        report.push(insert_seed(api, seed, today));
    }

    report
}

/// Read `/items/{collection}` for every schema collection.
pub fn check_access<T: Transport>(api: &DirectusApi<T>, schema: &SchemaDef) -> RunReport {
    let mut report = RunReport::default();
    for collection in &schema.collections {
        let name = collection.name.as_str();
        let outcome = match api.get_items(name).and_then(HttpResponse::into_success) {
            Ok(_) => {
                tracing::info!(collection = %name, "items readable");
                ResourceOutcome::new(ResourceKind::Access, name, OutcomeStatus::Verified)
            }
            Err(err) => {
                log_failure(ResourceKind::Access, name, &err);
                ResourceOutcome::failed(ResourceKind::Access, name, &err)
            }
        };
        report.push(outcome);
    }
    report
}

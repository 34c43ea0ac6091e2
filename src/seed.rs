//! Seed records for freshly provisioned collections.
//!
//! Seeding has no existence check: running it twice inserts the rows twice.
use crate::api::DirectusApi;
use crate::provision::log_failure;
use crate::report::{OutcomeStatus, ResourceKind, ResourceOutcome};
use crate::schema::SeedDef;
use crate::transport::Transport;
use chrono::NaiveDate;
use serde_json::{Map, Value};

/// String values equal to this are replaced with the run date (`YYYY-MM-DD`).
pub const TODAY_PLACEHOLDER: &str = "$TODAY";

pub fn expand_placeholders(item: &Map<String, Value>, today: NaiveDate) -> Map<String, Value> {
    let date = today.format("%Y-%m-%d").to_string();
    item.iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(text) if text == TODAY_PLACEHOLDER => Value::String(date.clone()),
                other => other.clone(),
            };
            (key.clone(), value)
        })
        .collect()
}

pub fn insert_seed<T: Transport>(
    api: &DirectusApi<T>,
    seed: &SeedDef,
    today: NaiveDate,
) -> ResourceOutcome {
    let item = Value::Object(expand_placeholders(&seed.item, today));
    match api.create_item(&seed.collection, &item) {
        Ok(_) => {
            tracing::info!(collection = %seed.collection, "seed item created");
            ResourceOutcome::new(ResourceKind::Item, &seed.collection, OutcomeStatus::Created)
        }
        Err(err) => {
            log_failure(ResourceKind::Item, &seed.collection, &err);
            ResourceOutcome::failed(ResourceKind::Item, &seed.collection, &err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;
    use crate::transport::Method;
    use serde_json::json;

    fn testimonial() -> SeedDef {
        serde_json::from_value(json!({
            "collection": "testimonials",
            "item": {"client_name": "John Doe", "rating": 5, "date": "$TODAY", "note": "$TODAY!"},
        }))
        .expect("seed json")
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 11).expect("valid date")
    }

    #[test]
    fn placeholder_is_replaced_only_on_exact_match() {
        let expanded = expand_placeholders(&testimonial().item, date());
        assert_eq!(expanded["date"], "2025-03-11");
        assert_eq!(expanded["note"], "$TODAY!");
        assert_eq!(expanded["rating"], 5);
    }

    #[test]
    fn reseeding_posts_duplicates() {
        let mock = MockTransport::new();
        let api = DirectusApi::new(&mock, Some("tok".to_string()));

        let first = insert_seed(&api, &testimonial(), date());
        let second = insert_seed(&api, &testimonial(), date());

        assert_eq!(first.status, OutcomeStatus::Created);
        assert_eq!(second.status, OutcomeStatus::Created);
        assert_eq!(mock.count(Method::Post, "/items/testimonials"), 2);
        assert_eq!(mock.count(Method::Get, "/items/testimonials"), 0);
    }

    #[test]
    fn rejected_seed_is_recorded_as_failure() {
        let mock = MockTransport::new();
        mock.respond(
            Method::Post,
            "/items/testimonials",
            403,
            r#"{"errors":[{"message":"You don't have permission to access this."}]}"#,
        );
        let api = DirectusApi::new(&mock, Some("tok".to_string()));

        let outcome = insert_seed(&api, &testimonial(), date());

        assert!(outcome.is_failure());
        assert_eq!(outcome.target, "testimonials");
    }
}

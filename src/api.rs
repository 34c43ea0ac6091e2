//! Resource-addressed Directus REST endpoints.
//!
//! Every call carries the bearer token held by [`DirectusApi`]; a `None` token
//! sends anonymous requests (used for public access checks).
use crate::error::{ProvisionError, Result};
use crate::transport::{HttpResponse, Transport};
use serde::Deserialize;
use serde_json::Value;

pub const LOGIN_PATH: &str = "/auth/login";
pub const COLLECTIONS_PATH: &str = "/collections";
pub const ROLES_PATH: &str = "/roles";
pub const PERMISSIONS_PATH: &str = "/permissions";

pub fn collection_path(collection: &str) -> String {
    format!("{COLLECTIONS_PATH}/{collection}")
}

pub fn fields_path(collection: &str) -> String {
    format!("/fields/{collection}")
}

pub fn field_path(collection: &str, field: &str) -> String {
    format!("/fields/{collection}/{field}")
}

pub fn items_path(collection: &str) -> String {
    format!("/items/{collection}")
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Role {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

pub struct DirectusApi<T> {
    transport: T,
    token: Option<String>,
}

impl<T: Transport> DirectusApi<T> {
    pub fn new(transport: T, token: Option<String>) -> Self {
        Self { transport, token }
    }

    fn bearer(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn get(&self, path: &str) -> Result<HttpResponse> {
        self.transport.get(path, self.bearer())
    }

    /// POST a JSON body and return the `data` member of a 2xx response.
    pub fn create(&self, path: &str, body: &Value) -> Result<Value> {
        let response = self.transport.post(path, self.bearer(), body)?;
        data_member(response)
    }

    pub fn get_collection(&self, collection: &str) -> Result<HttpResponse> {
        self.get(&collection_path(collection))
    }

    pub fn get_field(&self, collection: &str, field: &str) -> Result<HttpResponse> {
        self.get(&field_path(collection, field))
    }

    pub fn get_items(&self, collection: &str) -> Result<HttpResponse> {
        self.get(&items_path(collection))
    }

    pub fn create_collection(&self, payload: &Value) -> Result<Value> {
        self.create(COLLECTIONS_PATH, payload)
    }

    pub fn create_field(&self, collection: &str, payload: &Value) -> Result<Value> {
        self.create(&fields_path(collection), payload)
    }

    pub fn create_permission(&self, payload: &Value) -> Result<Value> {
        self.create(PERMISSIONS_PATH, payload)
    }

    pub fn create_item(&self, collection: &str, payload: &Value) -> Result<Value> {
        self.create(&items_path(collection), payload)
    }

    pub fn list_roles(&self) -> Result<Vec<Role>> {
        let response = self.get(ROLES_PATH)?;
        let data = data_member(response)?;
        serde_json::from_value(data).map_err(|err| ProvisionError::Decode(format!("roles: {err}")))
    }
}

/// Extract `data` from a Directus envelope. Only the status decides success: a
/// 2xx with an empty (204) or non-JSON body yields `null`.
pub fn data_member(response: HttpResponse) -> Result<Value> {
    let response = response.into_success()?;
    let value = response.json().unwrap_or_else(|err| {
        tracing::debug!(status = response.status, error = %err, "success body is not JSON");
        Value::Null
    });
    Ok(match value {
        Value::Object(mut map) => map.remove("data").unwrap_or(Value::Null),
        _ => Value::Null,
    })
}

//! Credential resolution.
use crate::api::{data_member, LOGIN_PATH};
use crate::config::Credentials;
use crate::error::{ProvisionError, Result};
use crate::transport::Transport;
use serde_json::json;

/// Produce a bearer token. Static tokens never touch the network; a login
/// exchange failing in any way yields [`ProvisionError::Authentication`].
pub fn resolve_token<T: Transport>(transport: &T, credentials: &Credentials) -> Result<String> {
    match credentials {
        Credentials::StaticToken(token) => {
            tracing::info!("using provided admin token for authentication");
            Ok(token.clone())
        }
        Credentials::Login { email, password } => {
            let token = login(transport, email, password)?;
            tracing::info!(%email, "logged in with provided email/password");
            Ok(token)
        }
    }
}

fn login<T: Transport>(transport: &T, email: &str, password: &str) -> Result<String> {
    let payload = json!({ "email": email, "password": password });
    let response = transport
        .post(LOGIN_PATH, None, &payload)
        .map_err(|err| ProvisionError::Authentication(err.to_string()))?;
    let data = data_member(response).map_err(|err| match err {
        ProvisionError::RemoteValidation { status, body } => {
            tracing::error!(status, response = %body, "login rejected");
            ProvisionError::Authentication(format!("login returned status {status}"))
        }
        other => ProvisionError::Authentication(other.to_string()),
    })?;
    data.get("access_token")
        .and_then(|token| token.as_str())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            ProvisionError::Authentication("login response has no data.access_token".to_string())
        })
}

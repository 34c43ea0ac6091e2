//! HTTP transport seam.
//!
//! Components talk to Directus only through [`Transport`], so provisioning logic
//! can be exercised against an in-memory recorder in tests and against ureq in
//! the binary. Paths are relative to the configured base URL and may carry a
//! query string.
use crate::error::{ProvisionError, Result};
use serde_json::Value;
use std::fmt;
use ureq::Agent;

#[cfg(test)]
pub(crate) mod mock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// Status and raw body of a completed exchange, whatever the status class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON; an empty body parses as `null`.
    pub fn json(&self) -> Result<Value> {
        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&self.body).map_err(|err| ProvisionError::Decode(err.to_string()))
    }

    /// Turn a non-2xx response into [`ProvisionError::RemoteValidation`].
    pub fn into_success(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        Err(ProvisionError::RemoteValidation {
            status: self.status,
            body: self.body,
        })
    }
}

/// Blocking request/response exchange with the remote service.
///
/// Implementations return `Ok` for every response the server produced,
/// including 4xx/5xx, and reserve `Err` for failures to complete the exchange.
pub trait Transport {
    fn get(&self, path: &str, bearer: Option<&str>) -> Result<HttpResponse>;
    fn post(&self, path: &str, bearer: Option<&str>, body: &Value) -> Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, path: &str, bearer: Option<&str>) -> Result<HttpResponse> {
        (**self).get(path, bearer)
    }

    fn post(&self, path: &str, bearer: Option<&str>, body: &Value) -> Result<HttpResponse> {
        (**self).post(path, bearer, body)
    }
}

/// ureq-backed transport with the client's default timeouts.
pub struct UreqTransport {
    base_url: String,
    agent: Agent,
}

impl UreqTransport {
    pub fn new(base_url: &str) -> Self {
        let config = Agent::config_builder().http_status_as_error(false).build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: Agent::new_with_config(config),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Transport for UreqTransport {
    fn get(&self, path: &str, bearer: Option<&str>) -> Result<HttpResponse> {
        let url = self.url(path);
        let mut request = self.agent.get(&url);
        if let Some(token) = bearer {
            request = request.header("Authorization", format!("Bearer {token}"));
        }
        let response = request.call().map_err(transport_error)?;
        read_response(response)
    }

    fn post(&self, path: &str, bearer: Option<&str>, body: &Value) -> Result<HttpResponse> {
        let url = self.url(path);
        let mut request = self.agent.post(&url);
        if let Some(token) = bearer {
            request = request.header("Authorization", format!("Bearer {token}"));
        }
        let response = request.send_json(body).map_err(transport_error)?;
        read_response(response)
    }
}

fn read_response(mut response: ureq::http::Response<ureq::Body>) -> Result<HttpResponse> {
    let status = response.status().as_u16();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(transport_error)?;
    Ok(HttpResponse { status, body })
}

fn transport_error(err: ureq::Error) -> ProvisionError {
    ProvisionError::Transport(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range_is_2xx_only() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(199, "").is_success());
        assert!(!HttpResponse::new(301, "").is_success());
        assert!(!HttpResponse::new(404, "").is_success());
    }

    #[test]
    fn into_success_keeps_error_body() {
        let err = HttpResponse::new(400, r#"{"errors":[{"message":"bad"}]}"#)
            .into_success()
            .expect_err("400 must fail");
        assert_eq!(
            err,
            ProvisionError::RemoteValidation {
                status: 400,
                body: r#"{"errors":[{"message":"bad"}]}"#.to_string(),
            }
        );
    }

    #[test]
    fn empty_body_parses_as_null() {
        let value = HttpResponse::new(204, "  ").json().expect("empty body");
        assert!(value.is_null());
        assert!(matches!(
            HttpResponse::new(200, "not json").json(),
            Err(ProvisionError::Decode(_))
        ));
    }

    #[test]
    fn url_joins_without_double_slashes() {
        let transport = UreqTransport::new("https://cms.example/");
        assert_eq!(transport.base_url(), "https://cms.example");
        assert_eq!(
            transport.url("/collections/gallery"),
            "https://cms.example/collections/gallery"
        );
        assert_eq!(transport.url("roles"), "https://cms.example/roles");
    }
}

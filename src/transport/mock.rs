//! In-memory transport that records every exchange.
use super::{HttpResponse, Method, Transport};
use crate::error::{ProvisionError, Result};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Instant;

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) bearer: Option<String>,
    pub(crate) body: Option<Value>,
    pub(crate) at: Instant,
}

#[derive(Clone)]
enum Canned {
    Respond(HttpResponse),
    Fail(String),
}

/// Unrouted GETs answer 404 and unrouted POSTs answer 200 `{"data":{}}`.
#[derive(Default)]
pub(crate) struct MockTransport {
    routes: RefCell<HashMap<(Method, String), Canned>>,
    calls: RefCell<Vec<RecordedCall>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, method: Method, path: &str, status: u16, body: &str) -> &Self {
        self.routes.borrow_mut().insert(
            (method, path.to_string()),
            Canned::Respond(HttpResponse::new(status, body)),
        );
        self
    }

    pub(crate) fn fail(&self, method: Method, path: &str, message: &str) -> &Self {
        self.routes.borrow_mut().insert(
            (method, path.to_string()),
            Canned::Fail(message.to_string()),
        );
        self
    }

    pub(crate) fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    pub(crate) fn count(&self, method: Method, path: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.method == method && call.path == path)
            .count()
    }

    pub(crate) fn posts_to(&self, path: &str) -> Vec<Value> {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.method == Method::Post && call.path == path)
            .filter_map(|call| call.body.clone())
            .collect()
    }

    fn answer(&self, method: Method, path: &str) -> Result<HttpResponse> {
        let key = (method, path.to_string());
        let canned = self.routes.borrow().get(&key).cloned();
        match canned {
            Some(Canned::Respond(response)) => Ok(response),
            Some(Canned::Fail(message)) => Err(ProvisionError::Transport(message)),
            None => Ok(match method {
                Method::Get => HttpResponse::new(404, r#"{"errors":[{"message":"not found"}]}"#),
                Method::Post => HttpResponse::new(200, r#"{"data":{}}"#),
            }),
        }
    }

    fn record(&self, method: Method, path: &str, bearer: Option<&str>, body: Option<&Value>) {
        self.calls.borrow_mut().push(RecordedCall {
            method,
            path: path.to_string(),
            bearer: bearer.map(str::to_string),
            body: body.cloned(),
            at: Instant::now(),
        });
    }
}

impl Transport for MockTransport {
    fn get(&self, path: &str, bearer: Option<&str>) -> Result<HttpResponse> {
        self.record(Method::Get, path, bearer, None);
        self.answer(Method::Get, path)
    }

    fn post(&self, path: &str, bearer: Option<&str>, body: &Value) -> Result<HttpResponse> {
        self.record(Method::Post, path, bearer, Some(body));
        self.answer(Method::Post, path)
    }
}

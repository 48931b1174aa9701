//! The request boundary.
//!
//! A handler body is any async function taking an [`ApiRequest`] and a
//! [`Context`] and returning a string payload. [`handler`] wraps such a body
//! so that its outcome always comes back as a [`HandlerResponse`]: the
//! payload with status 200, or a JSON `{"error": ...}` body with status 500.
//! Nothing the body does, including panicking, escapes the wrapper.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

use crate::Error;

/// Inbound request as handed over by the hosting transport.
#[derive(Debug, Clone, Default)]
pub struct ApiRequest {
    pub method: String,
    pub path: String,
    pub path_parameters: HashMap<String, String>,
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_path_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_parameters.insert(name.into(), value.into());
        self
    }

    pub fn path_parameter(&self, name: &str) -> Option<&str> {
        self.path_parameters.get(name).map(String::as_str)
    }

    /// Deserializes the request body as JSON.
    pub fn json_body<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let body = self.body.as_deref().ok_or(Error::MissingBody)?;
        Ok(serde_json::from_str(body)?)
    }
}

/// Per-invocation metadata owned by the host.
#[derive(Debug, Clone)]
pub struct Context {
    pub request_id: String,
    /// Identity resolved by the identity provider, if the caller signed in.
    pub identity_id: Option<String>,
}

impl Context {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            identity_id: None,
        }
    }

    pub fn with_identity(mut self, identity_id: impl Into<String>) -> Self {
        self.identity_id = Some(identity_id.into());
        self
    }

    pub fn identity(&self) -> Result<&str, Error> {
        self.identity_id.as_deref().ok_or(Error::Unauthenticated)
    }
}

/// What a handler body failed with.
///
/// `Error` is a structured error, reported by its `Display` text. `Value` is
/// anything else a body gave up with (a bare message, a panic payload),
/// reported by its string form.
#[derive(Debug)]
pub enum Failure {
    Error(Box<dyn std::error::Error + Send + Sync>),
    Value(Value),
}

impl Failure {
    pub fn message(&self) -> String {
        match self {
            Failure::Error(err) => err.to_string(),
            Failure::Value(Value::String(s)) => s.clone(),
            Failure::Value(other) => other.to_string(),
        }
    }

    fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "handler panicked".to_string()
        };
        Failure::Value(Value::String(message))
    }
}

impl From<Error> for Failure {
    fn from(err: Error) -> Self {
        Failure::Error(Box::new(err))
    }
}

impl From<serde_json::Error> for Failure {
    fn from(err: serde_json::Error) -> Self {
        Failure::Error(Box::new(err))
    }
}

impl From<Value> for Failure {
    fn from(value: Value) -> Self {
        Failure::Value(value)
    }
}

impl From<String> for Failure {
    fn from(message: String) -> Self {
        Failure::Value(Value::String(message))
    }
}

impl From<&str> for Failure {
    fn from(message: &str) -> Self {
        Failure::Value(Value::String(message.to_string()))
    }
}

pub type HandlerResult = Result<String, Failure>;

/// Outbound response: `{"statusCode": 200, "body": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    pub status_code: u16,
    pub body: String,
}

impl HandlerResponse {
    pub fn ok(body: String) -> Self {
        Self {
            status_code: 200,
            body,
        }
    }

    pub fn failure(failure: &Failure) -> Self {
        Self {
            status_code: 500,
            body: json!({ "error": failure.message() }).to_string(),
        }
    }
}

/// Runs `body` once and normalizes its outcome.
pub async fn invoke<F, Fut>(body: &F, request: ApiRequest, context: Context) -> HandlerResponse
where
    F: Fn(ApiRequest, Context) -> Fut,
    Fut: Future<Output = HandlerResult>,
{
    let request_id = context.request_id.clone();

    // Catch panics both while building the future and while polling it.
    let outcome = match panic::catch_unwind(AssertUnwindSafe(|| body(request, context))) {
        Ok(fut) => AssertUnwindSafe(fut)
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(Failure::from_panic(payload))),
        Err(payload) => Err(Failure::from_panic(payload)),
    };

    match outcome {
        Ok(payload) => HandlerResponse::ok(payload),
        Err(failure) => {
            error!(request_id = %request_id, error = %failure.message(), "handler failed");
            HandlerResponse::failure(&failure)
        }
    }
}

/// Wraps a handler body into a function with the same inbound signature that
/// always resolves to a [`HandlerResponse`].
pub fn handler<F, Fut>(
    body: F,
) -> impl Fn(ApiRequest, Context) -> BoxFuture<'static, HandlerResponse> + Clone + Send + Sync + 'static
where
    F: Fn(ApiRequest, Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    let body = Arc::new(body);
    move |request, context| {
        let body = Arc::clone(&body);
        async move { invoke(&*body, request, context).await }.boxed()
    }
}

//! HTTP execution seam

use crate::config::ServiceConfig;
use crate::err::{Result, StaplusError};
use derive_getters::Getters;
use http::header::{CONTENT_TYPE, LOCATION};
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use serde_json::Value;
use std::fmt;
use tap::TapFallible;
use tracing::{error, trace};
use url::Url;

pub const APPLICATION_JSON: &str = "application/json";
pub const APPLICATION_JSON_PATCH: &str = "application/json-patch+json";

/// One outgoing request.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct HttpRequest {
    method: Method,
    url: Url,
    body: Option<Value>,
    content_type: Option<&'static str>,
}

impl HttpRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            body: None,
            content_type: None,
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn delete(url: Url) -> Self {
        Self::new(Method::DELETE, url)
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self.content_type.get_or_insert(APPLICATION_JSON);
        self
    }

    pub fn with_content_type(mut self, content_type: &'static str) -> Self {
        self.content_type = Some(content_type);
        self
    }
}

/// A response of any status. Turning non-2xx into errors is up to the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: http::header::HeaderName, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn with_location(self, location: &str) -> Self {
        self.with_header(LOCATION, location)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: impl http::header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Parses the body as JSON; a broken body is a malformed response, not a
    /// server rejection.
    pub fn json(&self) -> Result<Value> {
        trace!("response body: {}", self.body);
        serde_json::from_str(&self.body)
            .tap_err(|e| error!("could not parse response as JSON: {}", e))
            .map_err(|e| {
                StaplusError::MalformedResponse(format!("cannot find JSON in HTTP response: {}", e))
            })
    }
}

/// The message to surface for a failed request: the body's `message` field,
/// else the raw body, else the status reason.
pub fn error_message(response: &HttpResponse) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&response.body) {
        if let Some(message) = map.get("message").and_then(Value::as_str) {
            return message.to_string();
        }
    }
    if !response.body.trim().is_empty() {
        return response.body.clone();
    }
    StatusCode::from_u16(response.status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("unknown error")
        .to_string()
}

/// Executes requests against a server.
///
/// Implementations block until the exchange completes and return the
/// response whatever its status; only failures to get a response at all are
/// errors.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

/// Credentials added to every request.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Auth {
    #[default]
    None,
    Bearer(String),
    Basic {
        user: String,
        password: String,
    },
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::None => f.write_str("None"),
            Auth::Bearer(_) => f.write_str("Bearer(***)"),
            Auth::Basic { user, .. } => write!(f, "Basic({}:***)", user),
        }
    }
}

/// Blocking reqwest transport.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
    auth: Auth,
}

impl ReqwestTransport {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            auth: config.auth.clone(),
        })
    }
}

impl Transport for ReqwestTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone());

        builder = match &self.auth {
            Auth::None => builder,
            Auth::Bearer(token) => builder.bearer_auth(token),
            Auth::Basic { user, password } => builder.basic_auth(user, Some(password)),
        };

        if let Some(body) = &request.body {
            builder = builder
                .header(
                    CONTENT_TYPE,
                    request.content_type.unwrap_or(APPLICATION_JSON),
                )
                .body(serde_json::to_vec(body)?);
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text()?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_message_field() {
        let response = HttpResponse::new(404, r#"{"code": 404, "type": "error", "message": "not found"}"#);
        assert_eq!(error_message(&response), "not found");
    }

    #[test]
    fn test_error_message_falls_back_to_body_and_reason() {
        assert_eq!(error_message(&HttpResponse::new(500, "boom")), "boom");
        assert_eq!(error_message(&HttpResponse::new(503, "")), "Service Unavailable");
    }

    #[test]
    fn test_json_failure_is_malformed() {
        let err = HttpResponse::new(200, "<html>").json().unwrap_err();
        assert!(err.is_malformed_response());
    }

    #[test]
    fn test_auth_debug_hides_secrets() {
        let auth = Auth::Basic {
            user: "alice".into(),
            password: "hunter2".into(),
        };
        assert_eq!(format!("{:?}", auth), "Basic(alice:***)");
        assert_eq!(format!("{:?}", Auth::Bearer("t0k3n".into())), "Bearer(***)");
    }

    #[test]
    fn test_location_header() {
        let response = HttpResponse::new(201, "").with_location("http://h/v1.1/Things(1)");
        assert_eq!(response.header(LOCATION), Some("http://h/v1.1/Things(1)"));
    }
}

/// Service Transport
///
/// **Core Responsibility:**
/// Deliver one request to the practice service and hand back the raw
/// status and body. Interpreting the body is the callers' job.
///
/// **Implementations:**
/// - `HttpTransport`: reqwest, forwarding session cookies and the CSRF header
/// - `ScriptedTransport`: in-process replay of canned responses for tests
///   and offline demos
///
/// No timeout is applied; failure is whatever the HTTP stack reports.

use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::header::{HeaderValue, COOKIE};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};
use url::Url;

pub const CSRF_HEADER: &str = "X-CSRFToken";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Absolute path on the service origin, e.g. `/api/execute/`
    pub path: String,
    pub body: Option<Value>,
    /// Attach the anti-forgery token read from the session cookies
    pub csrf_protected: bool,
    /// Include session credentials (cookies)
    pub with_credentials: bool,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
            csrf_protected: false,
            with_credentials: true,
        }
    }

    pub fn post_json(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
            csrf_protected: true,
            with_credentials: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(status: u16, body: &Value) -> Self {
        Self::new(status, body.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Value of cookie `name` in a `Cookie` header string, percent-decoded
pub fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies
        .split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .find_map(|pair| {
            url::form_urlencoded::parse(pair.as_bytes())
                .next()
                .filter(|(key, _)| key == name)
                .map(|(_, value)| value.into_owned())
        })
}

pub struct HttpTransport {
    http: reqwest::Client,
    base_url: Url,
    cookies: String,
    csrf_cookie: String,
}

impl HttpTransport {
    pub fn new(base_url: Url, cookies: impl Into<String>, csrf_cookie: impl Into<String>) -> Result<Self, TransportError> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            base_url,
            cookies: cookies.into(),
            csrf_cookie: csrf_cookie.into(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.base_url.join(&request.path)?;
        let mut builder = match request.method {
            Method::Get => self.http.get(url.clone()),
            Method::Post => self.http.post(url.clone()),
        };

        if request.with_credentials && !self.cookies.is_empty() {
            match HeaderValue::from_str(&self.cookies) {
                Ok(value) => builder = builder.header(COOKIE, value),
                Err(e) => warn!(error = %e, "Session cookies are not a valid header value; sending without them"),
            }
        }

        if request.csrf_protected {
            match cookie_value(&self.cookies, &self.csrf_cookie) {
                Some(token) => builder = builder.header(CSRF_HEADER, token),
                None => debug!(cookie = %self.csrf_cookie, "No CSRF cookie in session"),
            }
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(url = %url, status, bytes = body.len(), "Service responded");

        Ok(ApiResponse { status, body })
    }
}

/// Replays queued responses in order and records every request it sees
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<ApiResponse, String>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, response: ApiResponse) -> &Self {
        lock(&self.script).push_back(Ok(response));
        self
    }

    /// Queue a network-level failure
    pub fn fail(&self, message: impl Into<String>) -> &Self {
        lock(&self.script).push_back(Err(message.into()));
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        lock(&self.requests).push(request);
        match lock(&self.script).pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(TransportError::Network(message)),
            None => Err(TransportError::Network("no scripted response".to_string())),
        }
    }
}

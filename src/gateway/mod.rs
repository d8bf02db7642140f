//! The API gateway seam.
//!
//! Everything that reaches the backend goes through [`ApiGateway`]. Production
//! code uses [`HttpGateway`]; tests use the channel-backed gateway from the
//! mock framework.

pub mod http;

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::HttpError;

pub use http::HttpGateway;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        })
    }
}

/// A fully described backend call.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayCall {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl GatewayCall {
    pub fn new(method: Method, path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method,
            path: path.into(),
            body,
        }
    }
}

#[async_trait]
pub trait ApiGateway: Send + Sync {
    /// Issues one request and returns the decoded JSON body.
    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, HttpError>;

    async fn get(&self, path: &str) -> Result<Value, HttpError> {
        self.request(Method::Get, path, None).await
    }

    async fn post(&self, path: &str, body: Option<Value>) -> Result<Value, HttpError> {
        self.request(Method::Post, path, body).await
    }

    async fn put(&self, path: &str, body: Option<Value>) -> Result<Value, HttpError> {
        self.request(Method::Put, path, body).await
    }

    async fn delete(&self, path: &str) -> Result<Value, HttpError> {
        self.request(Method::Delete, path, None).await
    }

    async fn execute(&self, call: GatewayCall) -> Result<Value, HttpError> {
        self.request(call.method, &call.path, call.body).await
    }
}

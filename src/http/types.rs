//! Request and response values exchanged with an `HttpCaller`

use crate::types::{JsonValue, Method, QueryMap, QueryValue, StringMap};
use bytes::Bytes;
use std::fmt;

/// Where a request goes: a path under the caller's base URL, or an
/// absolute URL used verbatim. Exactly one is ever set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Path appended to the base URL (e.g. `/messages`)
    Path(String),
    /// Absolute URL (e.g. a next-page link)
    Url(String),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Path(p) | Target::Url(p) => f.write_str(p),
        }
    }
}

/// How the response body should be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// Parse the body as JSON
    #[default]
    Json,
    /// Keep the raw bytes
    Binary,
}

/// One HTTP request
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// HTTP verb
    pub method: Method,
    /// Path or absolute URL
    pub target: Target,
    /// Query parameters
    pub query: QueryMap,
    /// JSON body
    pub body: Option<JsonValue>,
    /// Request headers
    pub headers: StringMap,
    /// Body encoding of the expected response
    pub encoding: Encoding,
}

impl Request {
    /// Create a request with no query, body or headers
    pub fn new(method: Method, target: Target) -> Self {
        Self {
            method,
            target,
            query: QueryMap::new(),
            body: None,
            headers: StringMap::new(),
            encoding: Encoding::Json,
        }
    }

    /// GET a path under the base URL
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, Target::Path(path.into()))
    }

    /// GET an absolute URL
    pub fn get_url(url: impl Into<String>) -> Self {
        Self::new(Method::GET, Target::Url(url.into()))
    }

    /// DELETE a path under the base URL
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, Target::Path(path.into()))
    }

    /// Add or replace a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Merge a set of query parameters
    #[must_use]
    pub fn queries(mut self, params: QueryMap) -> Self {
        self.query.extend(params);
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    /// Ask for the raw response bytes
    #[must_use]
    pub fn binary(mut self) -> Self {
        self.encoding = Encoding::Binary;
        self
    }

    /// Look up a query parameter
    pub fn query_value(&self, key: &str) -> Option<&QueryValue> {
        self.query.get(key)
    }

    /// Body to put on the wire; an empty JSON object is not sent
    pub fn wire_body(&self) -> Option<&JsonValue> {
        match &self.body {
            Some(JsonValue::Object(map)) if map.is_empty() => None,
            Some(JsonValue::Null) | None => None,
            Some(body) => Some(body),
        }
    }
}

/// Response body as read by the caller
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Parsed JSON
    Json(JsonValue),
    /// Raw bytes
    Binary(Bytes),
    /// No content
    Empty,
}

/// One HTTP response
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Status code
    pub status: u16,
    /// Headers, names lowercased
    pub headers: StringMap,
    /// Body
    pub body: ResponseBody,
}

impl Response {
    /// A 200 response with a JSON body
    pub fn from_json(body: JsonValue) -> Self {
        Self {
            status: 200,
            headers: StringMap::new(),
            body: ResponseBody::Json(body),
        }
    }

    /// A 200 response with raw bytes
    pub fn from_bytes(body: impl Into<Bytes>) -> Self {
        Self {
            status: 200,
            headers: StringMap::new(),
            body: ResponseBody::Binary(body.into()),
        }
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// JSON body, if the response has one
    pub fn json(&self) -> Option<&JsonValue> {
        match &self.body {
            ResponseBody::Json(v) => Some(v),
            _ => None,
        }
    }

    /// Raw body bytes, if the response was read as binary
    pub fn bytes(&self) -> Option<&Bytes> {
        match &self.body {
            ResponseBody::Binary(b) => Some(b),
            _ => None,
        }
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// JSON body, or `Null` when there is none
    pub fn into_json(self) -> JsonValue {
        match self.body {
            ResponseBody::Json(v) => v,
            _ => JsonValue::Null,
        }
    }
}

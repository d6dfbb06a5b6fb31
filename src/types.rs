//! Common types used throughout pagekit
//!
//! Shared type aliases, the HTTP verb enum and query parameter values.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// Generic key-value map with string keys and values
pub type StringMap = HashMap<String, String>;

/// Query parameters, ordered so requests are reproducible
pub type QueryMap = BTreeMap<String, QueryValue>;

// ============================================================================
// HTTP Types
// ============================================================================

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::GET => reqwest::Method::GET,
            Method::POST => reqwest::Method::POST,
            Method::PUT => reqwest::Method::PUT,
            Method::PATCH => reqwest::Method::PATCH,
            Method::DELETE => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::PATCH => "PATCH",
            Method::DELETE => "DELETE",
        };
        f.write_str(verb)
    }
}

impl std::str::FromStr for Method {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::GET),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "PATCH" => Ok(Method::PATCH),
            "DELETE" => Ok(Method::DELETE),
            "" => Err(crate::Error::config("HTTP method must not be empty")),
            other => Err(crate::Error::config(format!(
                "Unsupported HTTP method: {other}"
            ))),
        }
    }
}

// ============================================================================
// Query Values
// ============================================================================

/// A query parameter value: a scalar or a list repeated under one key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    Bool(bool),
    Integer(i64),
    Text(String),
    List(Vec<String>),
}

impl QueryValue {
    /// Integer view of the value, parsing text when needed
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            QueryValue::Integer(n) => u64::try_from(*n).ok(),
            QueryValue::Text(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Flatten into `(key, value)` pairs for the wire
    pub fn to_pairs(&self, key: &str) -> Vec<(String, String)> {
        match self {
            QueryValue::Bool(b) => vec![(key.to_string(), b.to_string())],
            QueryValue::Integer(n) => vec![(key.to_string(), n.to_string())],
            QueryValue::Text(s) => vec![(key.to_string(), s.clone())],
            QueryValue::List(items) => items
                .iter()
                .map(|item| (key.to_string(), item.clone()))
                .collect(),
        }
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Integer(value)
    }
}

impl From<u64> for QueryValue {
    fn from(value: u64) -> Self {
        QueryValue::Integer(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Text(value)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(value: Vec<String>) -> Self {
        QueryValue::List(value)
    }
}

// ============================================================================
// Utilities
// ============================================================================

/// Extension trait for Option<String> to handle empty strings
pub trait OptionStringExt {
    /// Returns None if the string is empty
    fn none_if_empty(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.is_empty())
    }
}

impl OptionStringExt for String {
    fn none_if_empty(self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_conversion() {
        let get: reqwest::Method = Method::GET.into();
        assert_eq!(reqwest::Method::GET, get);
        let delete: reqwest::Method = Method::DELETE.into();
        assert_eq!(reqwest::Method::DELETE, delete);
    }

    #[test]
    fn test_method_parse() {
        assert_eq!("get".parse::<Method>().unwrap(), Method::GET);
        assert_eq!("Delete".parse::<Method>().unwrap(), Method::DELETE);
        assert!("".parse::<Method>().is_err());
        assert!("FETCH".parse::<Method>().is_err());
        assert_eq!(Method::PATCH.to_string(), "PATCH");
    }

    #[test]
    fn test_query_value_pairs() {
        assert_eq!(
            QueryValue::from(100_i64).to_pairs("$top"),
            vec![("$top".to_string(), "100".to_string())]
        );
        assert_eq!(
            QueryValue::from(true).to_pairs("useDomainAdminAccess"),
            vec![("useDomainAdminAccess".to_string(), "true".to_string())]
        );
        assert_eq!(
            QueryValue::from(vec!["a".to_string(), "b".to_string()]).to_pairs("id"),
            vec![
                ("id".to_string(), "a".to_string()),
                ("id".to_string(), "b".to_string())
            ]
        );
    }

    #[test]
    fn test_query_value_as_u64() {
        assert_eq!(QueryValue::from(25_i64).as_u64(), Some(25));
        assert_eq!(QueryValue::from("40").as_u64(), Some(40));
        assert_eq!(QueryValue::from(-1_i64).as_u64(), None);
        assert_eq!(QueryValue::from(true).as_u64(), None);
    }

    #[test]
    fn test_query_value_untagged_serde() {
        let value: QueryValue = serde_json::from_str("10").unwrap();
        assert_eq!(value, QueryValue::Integer(10));
        let value: QueryValue = serde_json::from_str("\"x\"").unwrap();
        assert_eq!(value, QueryValue::Text("x".to_string()));
    }

    #[test]
    fn test_option_string_none_if_empty() {
        assert_eq!(
            Some("test".to_string()).none_if_empty(),
            Some("test".to_string())
        );
        assert_eq!(Some(String::new()).none_if_empty(), None);
        assert_eq!(None::<String>.none_if_empty(), None);
        assert_eq!(String::new().none_if_empty(), None);
    }
}

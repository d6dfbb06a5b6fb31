//! Profile configuration
//!
//! A profile describes one API: its base URL, credentials and transport
//! settings. Profiles are YAML, loaded from a file or from the built-in set
//! by name, and every string is rendered through the template module before
//! use.

use crate::auth::AuthConfig;
use crate::error::{Error, Result};
use crate::http::{HttpCallerConfig, RateLimiterConfig, RestCaller};
use crate::profiles;
use crate::template::{self, TemplateContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Variable that switches a mail profile to a shared mailbox
pub const SHARED_MAILBOX_VAR: &str = "shared_mailbox";

// ============================================================================
// Profile
// ============================================================================

/// API profile loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Profile name (e.g. "outlook")
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: Option<String>,

    /// Base URL that request paths are appended to
    pub base_url: String,

    /// Base URL used instead when `vars.shared_mailbox` is set
    #[serde(default)]
    pub shared_mailbox_base_url: Option<String>,

    /// Credential block, rendered then read as an `AuthConfig`
    #[serde(default)]
    pub auth: Value,

    /// Transport settings
    #[serde(default)]
    pub http: HttpSettings,
}

/// Transport settings of a profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Token bucket pacing
    #[serde(default)]
    pub rate_limit: Option<RateLimiterConfig>,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: None,
            rate_limit: None,
            headers: BTreeMap::new(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// A profile with every template rendered
#[derive(Debug, Clone)]
pub struct ResolvedProfile {
    /// Profile name
    pub name: String,
    /// Transport configuration
    pub caller: HttpCallerConfig,
    /// Credentials
    pub auth: AuthConfig,
}

impl ResolvedProfile {
    /// Build the REST caller this profile describes
    pub fn into_caller(self) -> Result<RestCaller> {
        RestCaller::with_auth(self.caller, self.auth)
    }
}

impl ProfileConfig {
    /// Render templates with the process environment and `vars`.
    pub fn resolve(&self, vars: &Value) -> Result<ResolvedProfile> {
        let ctx = TemplateContext::with_vars(vars.clone());

        let base_url = match (&self.shared_mailbox_base_url, shared_mailbox(vars)) {
            (Some(shared), Some(mailbox)) => {
                debug!(profile = %self.name, mailbox, "Using shared mailbox base URL");
                template::render(shared, &ctx)?
            }
            (None, Some(_)) => {
                return Err(Error::config(format!(
                    "profile '{}' does not support shared mailboxes",
                    self.name
                )))
            }
            _ => template::render(&self.base_url, &ctx)?,
        };

        let auth = if self.auth.is_null() {
            AuthConfig::None
        } else {
            let rendered = template::render_value(&self.auth, &ctx)?;
            serde_json::from_value(rendered).map_err(|e| {
                Error::config(format!("invalid auth block in profile '{}': {e}", self.name))
            })?
        };

        let mut builder = HttpCallerConfig::builder()
            .base_url(base_url)
            .timeout(Duration::from_secs(self.http.timeout_secs));
        if let Some(agent) = &self.http.user_agent {
            builder = builder.user_agent(template::render(agent, &ctx)?);
        }
        if let Some(rate_limit) = &self.http.rate_limit {
            builder = builder.rate_limit(rate_limit.clone());
        }
        for (key, value) in &self.http.headers {
            builder = builder.header(key.clone(), template::render(value, &ctx)?);
        }

        Ok(ResolvedProfile {
            name: self.name.clone(),
            caller: builder.build(),
            auth,
        })
    }
}

fn shared_mailbox(vars: &Value) -> Option<&str> {
    vars.get(SHARED_MAILBOX_VAR)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

// ============================================================================
// Loading
// ============================================================================

/// Load a profile by built-in name or file path.
///
/// Bare names (no path separator, no `.yaml`/`.yml` extension) are looked up
/// in the built-in set first.
pub fn load_profile(name_or_path: impl AsRef<Path>) -> Result<ProfileConfig> {
    let path = name_or_path.as_ref();
    let path_str = path.to_string_lossy();

    if !path_str.contains('/')
        && !path_str.contains('\\')
        && !path_str.ends_with(".yaml")
        && !path_str.ends_with(".yml")
    {
        if let Some(yaml) = profiles::get_builtin(&path_str) {
            return load_profile_from_str(yaml);
        }
    }

    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::config(format!(
                "Profile '{}' not found. Built-in profiles: {}. Or provide a path to a YAML file.",
                path.display(),
                profiles::list_builtin().join(", ")
            ))
        } else {
            Error::config(format!(
                "Failed to read profile file '{}': {e}",
                path.display()
            ))
        }
    })?;
    load_profile_from_str(&content)
}

/// Load a profile from a YAML string
pub fn load_profile_from_str(yaml: &str) -> Result<ProfileConfig> {
    let profile: ProfileConfig = serde_yaml::from_str(yaml)
        .map_err(|e| Error::config(format!("Failed to parse profile YAML: {e}")))?;

    if profile.name.trim().is_empty() {
        return Err(Error::config("profile name must not be empty"));
    }
    if profile.base_url.trim().is_empty() {
        return Err(Error::config(format!(
            "profile '{}' has an empty base_url",
            profile.name
        )));
    }
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::io::Write;

    const PROFILE: &str = r#"
name: mail
base_url: https://graph.example.com/v1.0/me
shared_mailbox_base_url: https://graph.example.com/v1.0/users/{{ vars.shared_mailbox }}
auth:
  type: bearer
  token: "{{ vars.token }}"
http:
  timeout_secs: 5
  rate_limit:
    requests_per_second: 4
  headers:
    Prefer: outlook.body-content-type="text"
"#;

    #[test]
    fn test_parse_profile() {
        let profile = load_profile_from_str(PROFILE).unwrap();
        assert_eq!(profile.name, "mail");
        assert_eq!(profile.http.timeout_secs, 5);
        assert_eq!(
            profile.http.rate_limit.as_ref().map(|r| r.burst_size),
            Some(1)
        );
    }

    #[test]
    fn test_resolve_personal_mailbox() {
        let profile = load_profile_from_str(PROFILE).unwrap();
        let resolved = profile.resolve(&json!({"token": "abc"})).unwrap();

        assert_eq!(resolved.caller.base_url, "https://graph.example.com/v1.0/me");
        assert_eq!(resolved.caller.timeout, Duration::from_secs(5));
        assert_eq!(
            resolved.caller.default_headers.get("Prefer").map(String::as_str),
            Some("outlook.body-content-type=\"text\"")
        );
        assert!(matches!(resolved.auth, AuthConfig::Bearer { ref token } if token == "abc"));
    }

    #[test]
    fn test_resolve_shared_mailbox() {
        let profile = load_profile_from_str(PROFILE).unwrap();
        let vars = json!({"token": "abc", "shared_mailbox": "team@contoso.com"});
        let resolved = profile.resolve(&vars).unwrap();

        assert_eq!(
            resolved.caller.base_url,
            "https://graph.example.com/v1.0/users/team@contoso.com"
        );
    }

    #[test]
    fn test_shared_mailbox_unsupported() {
        let profile = load_profile_from_str("name: x\nbase_url: https://x\n").unwrap();
        let err = profile
            .resolve(&json!({"shared_mailbox": "team@contoso.com"}))
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_missing_variable() {
        let profile = load_profile_from_str(PROFILE).unwrap();
        let err = profile.resolve(&json!({})).unwrap_err();
        assert!(matches!(err, Error::UndefinedVariable { .. }));
    }

    #[test]
    fn test_no_auth_block() {
        let profile = load_profile_from_str("name: x\nbase_url: https://x\n").unwrap();
        let resolved = profile.resolve(&json!({})).unwrap();
        assert!(matches!(resolved.auth, AuthConfig::None));
        assert_eq!(resolved.caller.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_auth_block() {
        let yaml = "name: x\nbase_url: https://x\nauth:\n  type: carrier_pigeon\n";
        let profile = load_profile_from_str(yaml).unwrap();
        assert!(profile.resolve(&json!({})).is_err());
    }

    #[test]
    fn test_empty_base_url_rejected() {
        assert!(load_profile_from_str("name: x\nbase_url: ''\n").is_err());
        assert!(load_profile_from_str("base_url: https://x\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(PROFILE.as_bytes()).unwrap();

        let profile = load_profile(file.path()).unwrap();
        assert_eq!(profile.name, "mail");
    }

    #[test]
    fn test_load_builtin_and_missing() {
        assert_eq!(load_profile("outlook").unwrap().name, "outlook");

        let err = load_profile("no-such-profile").unwrap_err();
        assert!(err.to_string().contains("google-drive"));
    }
}

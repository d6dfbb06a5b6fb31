//! Built-in API profiles embedded in the binary
//!
//! Lets users pass `--profile outlook` instead of a file path.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Built-in profile YAML definitions
pub static BUILTIN_PROFILES: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| {
        let mut m = HashMap::new();

        m.insert("google-drive", include_str!("../profiles/google-drive.yaml"));
        m.insert("drive", include_str!("../profiles/google-drive.yaml"));

        m.insert("outlook", include_str!("../profiles/outlook.yaml"));
        m.insert("microsoft-outlook", include_str!("../profiles/outlook.yaml"));

        m
    });

/// Get a built-in profile by name
pub fn get_builtin(name: &str) -> Option<&'static str> {
    BUILTIN_PROFILES.get(name).copied()
}

/// Check if a name refers to a built-in profile
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_PROFILES.contains_key(name)
}

/// List built-in profile names (primary names only)
pub fn list_builtin() -> Vec<&'static str> {
    vec!["google-drive", "outlook"]
}

/// Profile metadata for display
#[derive(Debug, Clone)]
pub struct ProfileInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub aliases: &'static [&'static str],
    /// Environment variables the profile reads
    pub env: &'static [&'static str],
    pub operations: &'static [&'static str],
}

/// Get detailed info about all built-in profiles
pub fn list_builtin_info() -> Vec<ProfileInfo> {
    vec![
        ProfileInfo {
            name: "google-drive",
            description: "Google Drive shared drives",
            aliases: &["drive"],
            env: &[
                "GOOGLE_CLIENT_ID",
                "GOOGLE_CLIENT_SECRET",
                "GOOGLE_REFRESH_TOKEN",
            ],
            operations: &["drives", "delete-drive"],
        },
        ProfileInfo {
            name: "outlook",
            description: "Outlook mail through Microsoft Graph (set --shared-mailbox for a shared inbox)",
            aliases: &["microsoft-outlook"],
            env: &[
                "OUTLOOK_CLIENT_ID",
                "OUTLOOK_CLIENT_SECRET",
                "OUTLOOK_REFRESH_TOKEN",
            ],
            operations: &["messages", "mime"],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_profile_from_str;

    #[test]
    fn test_builtin_profiles_exist() {
        assert!(get_builtin("google-drive").is_some());
        assert!(get_builtin("outlook").is_some());
        assert!(is_builtin("drive"));
    }

    #[test]
    fn test_aliases_work() {
        assert_eq!(get_builtin("drive"), get_builtin("google-drive"));
        assert_eq!(get_builtin("microsoft-outlook"), get_builtin("outlook"));
    }

    #[test]
    fn test_unknown_profile() {
        assert!(get_builtin("unknown").is_none());
    }

    #[test]
    fn test_info_matches_list() {
        let names: Vec<_> = list_builtin_info().iter().map(|i| i.name).collect();
        assert_eq!(names, list_builtin());
    }

    #[test]
    fn test_builtin_profiles_parse() {
        for name in list_builtin() {
            let yaml = get_builtin(name).unwrap();
            let profile = load_profile_from_str(yaml).unwrap();
            assert_eq!(profile.name, name);
        }
    }

    #[test]
    fn test_outlook_supports_shared_mailbox() {
        let profile = load_profile_from_str(get_builtin("outlook").unwrap()).unwrap();
        assert!(profile.shared_mailbox_base_url.is_some());
    }
}

// Validation predicates shared by the persistence layer and the server

use std::sync::LazyLock;

use regex::Regex;
use uuid::{Uuid, Version};

static PATH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("Invalid regex pattern"));

static NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@#$%^&*]+$").expect("Invalid regex pattern"));

/// Generate a fresh random (v4) identifier
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// True when `id` parses as a UUID whose version nibble is 4
pub fn is_valid_uuid_v4(id: &str) -> bool {
    match Uuid::parse_str(id) {
        Ok(uuid) => uuid.get_version() == Some(Version::Random),
        Err(_) => false,
    }
}

/// Resource path segments: non-empty, ASCII alphanumerics plus '-' and '_'
pub fn is_valid_path(path: &str) -> bool {
    PATH_REGEX.is_match(path)
}

/// Display names may hold anything except a handful of reserved symbols
pub fn is_valid_name(name: &str) -> bool {
    NAME_REGEX.is_match(name)
}

pub fn is_valid_json(text: &str) -> bool {
    serde_json::from_str::<serde::de::IgnoredAny>(text).is_ok()
}

/// Absolute URL with a scheme and a host
pub fn is_valid_url(text: &str) -> bool {
    match url::Url::parse(text) {
        Ok(url) => url.has_host(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_uuid_v4() {
        assert!(is_valid_uuid_v4(&new_id()));
        assert!(is_valid_uuid_v4("9b2e4c7a-1f3d-4a5b-8c6d-0e1f2a3b4c5d"));
        // version 1
        assert!(!is_valid_uuid_v4("c232ab00-9414-11ec-b3c8-9f6bdeced846"));
        assert!(!is_valid_uuid_v4("not-a-uuid"));
        assert!(!is_valid_uuid_v4(""));
    }

    #[test]
    fn test_path() {
        assert!(is_valid_path("users"));
        assert!(is_valid_path("user-profile_v2"));
        assert!(!is_valid_path(""));
        assert!(!is_valid_path("users/profile"));
        assert!(!is_valid_path("{id}"));
        assert!(!is_valid_path("with space"));
    }

    #[test]
    fn test_name() {
        assert!(is_valid_name("Orders API"));
        assert!(!is_valid_name("bad#name"));
        assert!(!is_valid_name(""));
    }

    #[test]
    fn test_json() {
        assert!(is_valid_json("{}"));
        assert!(is_valid_json(r#"{"ok": true, "items": [1, 2]}"#));
        assert!(is_valid_json("42"));
        assert!(!is_valid_json(""));
        assert!(!is_valid_json("{ok: true}"));
    }

    #[test]
    fn test_url() {
        assert!(is_valid_url("https://backend.internal:8443/v1/users"));
        assert!(is_valid_url("http://10.0.0.5"));
        assert!(!is_valid_url("backend.internal/v1"));
        assert!(!is_valid_url(""));
        assert!(!is_valid_url("mailto:ops@example.com"));
    }

    proptest! {
        #[test]
        fn prop_generated_paths_are_accepted(path in "[A-Za-z0-9_-]{1,32}") {
            prop_assert!(is_valid_path(&path));
        }

        #[test]
        fn prop_slash_is_always_rejected(a in "[a-z]{1,8}", b in "[a-z]{1,8}") {
            let joined = format!("{a}/{b}");
            prop_assert!(!is_valid_path(&joined));
        }
    }
}

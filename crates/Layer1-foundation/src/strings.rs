//! String Utilities
//!
//! Shared string handling for Zeyon:
//! - Static constants for built-in event names
//! - Case conversion used by the registry scanner and the router
//!
//! # Usage
//!
//! ```ignore
//! use zeyon_foundation::strings::{to_kebab_case, EVENT_WILDCARD};
//!
//! assert_eq!(to_kebab_case("UserProfileView"), "user-profile-view");
//! assert_eq!(EVENT_WILDCARD, "*");
//! ```

// ============================================================================
// Built-in Event Constants
// ============================================================================

/// Wildcard event: listeners fire after every emission
pub const EVENT_WILDCARD: &str = "*";
/// Emitted once when an emitter is destroyed
pub const EVENT_DESTROYED: &str = "destroyed";

/// Model/Collection change event
pub const EVENT_CHANGE: &str = "change";
/// Collection add event
pub const EVENT_ADD: &str = "add";
/// Collection remove event
pub const EVENT_REMOVE: &str = "remove";
/// Model/Collection reset event
pub const EVENT_RESET: &str = "reset";
/// Collection sort event
pub const EVENT_SORT: &str = "sort";

/// Router navigation event
pub const EVENT_NAVIGATE: &str = "navigate";
/// Router query-only change event
pub const EVENT_QUERY: &str = "query";
/// Router unmatched path event
pub const EVENT_NOT_FOUND: &str = "notfound";

/// View render event
pub const EVENT_RENDER: &str = "render";
/// View attached event
pub const EVENT_ATTACHED: &str = "attached";
/// View detached event
pub const EVENT_DETACHED: &str = "detached";
/// RouteView params/query update event
pub const EVENT_ROUTE: &str = "route";

// ============================================================================
// Case Conversion
// ============================================================================

/// Split an identifier into lowercase words.
///
/// Word boundaries are `-`, `_`, whitespace, a lower→upper transition and the
/// last capital of an acronym run (`HTTPServer` → `http`, `server`).
fn split_words(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c == '-' || c == '_' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }

        current.extend(c.to_lowercase());
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `UserProfileView` → `user-profile-view`
pub fn to_kebab_case(s: &str) -> String {
    split_words(s).join("-")
}

/// `UserProfileView` → `user_profile_view`
pub fn to_snake_case(s: &str) -> String {
    split_words(s).join("_")
}

/// `user-profile-view` → `UserProfileView`
pub fn to_pascal_case(s: &str) -> String {
    split_words(s).iter().map(|w| capitalize(w)).collect()
}

/// `user-profile-view` → `userProfileView`
pub fn to_camel_case(s: &str) -> String {
    let words = split_words(s);
    let mut out = String::new();
    for (i, word) in words.iter().enumerate() {
        if i == 0 {
            out.push_str(word);
        } else {
            out.push_str(&capitalize(word));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_constants() {
        assert_eq!(EVENT_WILDCARD, "*");
        assert_eq!(EVENT_DESTROYED, "destroyed");
    }

    #[test]
    fn test_kebab_case() {
        assert_eq!(to_kebab_case("UserProfileView"), "user-profile-view");
        assert_eq!(to_kebab_case("HTTPServer"), "http-server");
        assert_eq!(to_kebab_case("already-kebab"), "already-kebab");
        assert_eq!(to_kebab_case("snake_case_name"), "snake-case-name");
    }

    #[test]
    fn test_pascal_and_camel() {
        assert_eq!(to_pascal_case("user-profile-view"), "UserProfileView");
        assert_eq!(to_camel_case("user-profile-view"), "userProfileView");
        assert_eq!(to_camel_case("UserProfile"), "userProfile");
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(to_snake_case("RouteView"), "route_view");
        assert_eq!(to_snake_case("Item2List"), "item2_list");
    }

    #[test]
    fn test_empty() {
        assert_eq!(to_kebab_case(""), "");
        assert_eq!(to_pascal_case("--"), "");
    }
}

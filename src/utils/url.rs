//! Joining API paths onto a configured base URL.

/// Strips trailing slashes so endpoints can be appended without doubling
/// them.
///
/// ```
/// use huddle::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("https://coach.example.com/api///"), "https://coach.example.com/api");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

/// ```
/// use huddle::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("https://coach.example.com/api/", "/conversations"),
///     "https://coach.example.com/api/conversations"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let endpoint = endpoint.trim_start_matches('/');
    format!("{}/{}", normalize_base_url(base_url), endpoint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_handles_whitespace_and_bare_slashes() {
        assert_eq!(
            normalize_base_url("  http://localhost:8000/api/ "),
            "http://localhost:8000/api"
        );
        assert_eq!(normalize_base_url("///"), "");
    }

    #[test]
    fn construct_joins_nested_paths() {
        assert_eq!(
            construct_api_url("http://localhost:8000/api", "conversations/c1/messages"),
            "http://localhost:8000/api/conversations/c1/messages"
        );
        assert_eq!(
            construct_api_url("http://localhost:8000/api//", "///auth/me"),
            "http://localhost:8000/api/auth/me"
        );
    }
}

//! URL helpers for building endpoint addresses
//!
//! Base URLs come from config, environment, or the built-in default, with or
//! without trailing slashes; these helpers keep the joined endpoint free of
//! doubled or missing separators.

/// Strip trailing slashes from a base URL.
pub fn normalize_base_url(base_url: &str) -> &str {
    base_url.trim_end_matches('/')
}

/// Join a base URL and an endpoint path with exactly one separator.
///
/// ```
/// use repartee::utils::url::join_endpoint;
///
/// assert_eq!(
///     join_endpoint("https://api.groq.com/openai/v1/", "responses"),
///     "https://api.groq.com/openai/v1/responses"
/// );
/// ```
pub fn join_endpoint(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        normalize_base_url(base_url),
        endpoint.trim_start_matches('/')
    )
}

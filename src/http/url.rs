//! URL helpers.

/// Strip trailing slashes from a base address.
pub fn trim_base_url(base: &str) -> &str {
    base.trim().trim_end_matches('/')
}

/// Join a base address and an endpoint path with exactly one `/` between them.
pub fn join_url(base: &str, endpoint: &str) -> String {
    let base = trim_base_url(base);
    let path = endpoint.trim_start_matches('/');
    if path.is_empty() {
        return base.to_string();
    }
    format!("{base}/{path}")
}

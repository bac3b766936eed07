//! Base URL composition.

const API_PREFIX: &str = "/api/v1";

/// Append the tenant segment to a configured base URL.
///
/// ```
/// use flowpilot_core::client::compose_base_url;
///
/// assert_eq!(
///     compose_base_url("http://localhost:8080/api/v1/", Some("main")),
///     "http://localhost:8080/api/v1/main"
/// );
/// ```
pub fn compose_base_url(base_url: &str, tenant: Option<&str>) -> String {
    let base = base_url.trim_end_matches('/');
    match tenant.map(|t| t.trim_matches('/')).filter(|t| !t.is_empty()) {
        Some(tenant) => format!("{base}/{tenant}"),
        None => base.to_string(),
    }
}

/// The tenant-less API root for a base URL.
///
/// A trailing `/api/v1/<tenant>` is cut back to `/api/v1`; any other URL is
/// returned without its trailing slash.
pub fn root_api_url(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if let Some(idx) = base.rfind(API_PREFIX) {
        let rest = &base[idx + API_PREFIX.len()..];
        let single_segment = rest.starts_with('/') && !rest[1..].is_empty() && !rest[1..].contains('/');
        if single_segment {
            return base[..idx + API_PREFIX.len()].to_string();
        }
    }
    base.to_string()
}

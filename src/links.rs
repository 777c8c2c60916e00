use url::Url;

/// Site that relative match pages, news paths and logos point into.
pub const DEFAULT_LINK_ORIGIN: &str = "https://www.vlr.gg";

/// Turn a protocol-relative or path-only reference into an absolute URL.
///
/// References that already carry a scheme (`https:`, `ftp:`, `mailto:`, ...)
/// are returned untouched. Everything else is joined onto `origin` with the
/// usual relative-reference rules, so `//host/path` borrows the origin's
/// scheme and `/path`, `path`, `?query` and `../path` land on the origin.
pub fn resolve_link(origin: &str, reference: &str) -> String {
    let reference = reference.trim();
    let origin = origin.trim();
    if reference.is_empty() {
        return origin.trim_end_matches('/').to_string();
    }
    if Url::parse(reference).is_ok() {
        return reference.to_string();
    }
    match Url::parse(origin).and_then(|base| base.join(reference)) {
        Ok(joined) => joined.to_string(),
        // Origin itself is not a URL; fall back to plain concatenation.
        Err(_) => format!(
            "{}/{}",
            origin.trim_end_matches('/'),
            reference.trim_start_matches('/')
        ),
    }
}

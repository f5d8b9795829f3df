//! Upstream URL construction.
//!
//! # Responsibilities
//! - Strip the proxied prefix from the inbound path
//! - Decode the inbound query into ordered pairs and re-encode it
//! - Join base URL, path suffix and query without doubling slashes
//!
//! # Design Decisions
//! - The suffix is everything after the prefix, empty and multi-segment included
//! - The suffix is passed through literally (no normalisation, no re-encoding)
//! - An empty query produces no `?`

use url::form_urlencoded;

/// Everything after `prefix`, or `None` if `path` is not under it.
pub fn strip_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    path.strip_prefix(prefix)
}

/// Decode a raw query string into `(key, value)` pairs, repeated keys preserved.
pub fn parse_query(raw: Option<&str>) -> Vec<(String, String)> {
    raw.map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

/// Re-encode query pairs as `k=v&...`, or `None` when there are none.
pub fn encode_query(pairs: &[(String, String)]) -> Option<String> {
    if pairs.is_empty() {
        return None;
    }
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    serializer.extend_pairs(pairs);
    Some(serializer.finish())
}

/// `{base}/{suffix}` followed by `?{query}` when there is a query.
pub fn upstream_url(base: &str, suffix: &str, query: &[(String, String)]) -> String {
    let mut url = format!("{}/{}", base.trim_end_matches('/'), suffix);
    if let Some(qs) = encode_query(query) {
        url.push('?');
        url.push_str(&qs);
    }
    url
}

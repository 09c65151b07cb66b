use http::Version;

use crate::protocol::ServerParams;

/// Rewrites server keys to canonical form and recovers values hosts tend to hide.
///
/// Keys are trimmed, upper-cased and `-` becomes `_`, so `http-user-agent` and
/// `HTTP_USER_AGENT` name the same entry. When a rewrite rule moved the authorization
/// header to `REDIRECT_HTTP_AUTHORIZATION`, it is restored as `HTTP_AUTHORIZATION`.
pub fn normalize_server(server: ServerParams) -> ServerParams {
    let mut normalized: ServerParams = server.into_iter().map(|(key, value)| (canonical_key(&key), value)).collect();

    if !normalized.contains_key("HTTP_AUTHORIZATION")
        && let Some(authorization) = normalized.get("REDIRECT_HTTP_AUTHORIZATION").cloned()
    {
        normalized.insert("HTTP_AUTHORIZATION".to_string(), authorization);
    }

    normalized
}

pub(crate) fn canonical_key(key: &str) -> String {
    key.trim().chars().map(|c| if c == '-' { '_' } else { c.to_ascii_uppercase() }).collect()
}

/// Protocol version announced in `SERVER_PROTOCOL`; HTTP/1.1 when absent or unknown.
pub fn marshal_protocol_version(server: &ServerParams) -> Version {
    match server.get("SERVER_PROTOCOL").map(|protocol| protocol.trim().to_ascii_uppercase()).as_deref() {
        Some("HTTP/0.9") => Version::HTTP_09,
        Some("HTTP/1.0") => Version::HTTP_10,
        Some("HTTP/2" | "HTTP/2.0") => Version::HTTP_2,
        Some("HTTP/3" | "HTTP/3.0") => Version::HTTP_3,
        _ => Version::HTTP_11,
    }
}

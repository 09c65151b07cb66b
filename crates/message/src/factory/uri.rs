//! Reconstruction of the request URI from server params and derived headers.

use std::fmt::Write;

use http::header::HOST;
use http::{HeaderMap, Uri};

use crate::protocol::{InvalidArgument, ServerParams};

/// Rebuilds the full request URI.
///
/// - scheme: `https` when `HTTPS` is set to anything but `off`, or when the
///   `x-forwarded-proto` header says `https`; `http` otherwise
/// - host and port: see [`marshal_host_and_port`]; the scheme's default port is elided
/// - path: see [`marshal_request_uri`], without its query string
/// - query: `QUERY_STRING` without leading `?`
///
/// Without a host only the origin form (`/path?query`) is produced.
pub fn marshal_uri(server: &ServerParams, headers: &HeaderMap) -> Result<Uri, InvalidArgument> {
    let https = server.get("HTTPS").is_some_and(|https| !https.is_empty() && !https.eq_ignore_ascii_case("off"));
    let forwarded_https = headers
        .get("x-forwarded-proto")
        .and_then(|proto| proto.to_str().ok())
        .is_some_and(|proto| proto.trim().eq_ignore_ascii_case("https"));
    let scheme = if https || forwarded_https { "https" } else { "http" };

    let request_uri = marshal_request_uri(server);
    let mut target = encode_unsafe(strip_query_string(&request_uri));
    if !target.starts_with('/') {
        target.insert(0, '/');
    }

    let query = server.get("QUERY_STRING").map_or("", |query| query.trim_start_matches('?'));
    if !query.is_empty() {
        target.push('?');
        target.push_str(&encode_unsafe(query));
    }

    let mut builder = Uri::builder();
    let (host, port) = marshal_host_and_port(server, headers);
    if !host.is_empty() {
        let authority = match port {
            Some(port) if !is_default_port(scheme, port) => format!("{host}:{port}"),
            _ => host,
        };
        builder = builder.scheme(scheme).authority(authority.as_str());
    }

    builder.path_and_query(target.as_str()).build().map_err(InvalidArgument::invalid_uri)
}

/// Host and port of the request.
///
/// The `host` header wins; a trailing `:digits` on it is split off as the port. Otherwise
/// `SERVER_NAME` and `SERVER_PORT` are used. For a bracketed IPv6 `SERVER_NAME` the address
/// is taken from `SERVER_ADDR` instead, and a port that merely repeats the last address
/// group is dropped.
pub fn marshal_host_and_port(server: &ServerParams, headers: &HeaderMap) -> (String, Option<u16>) {
    if let Some(host) = headers.get(HOST).and_then(|host| host.to_str().ok()) {
        return split_host_port(host);
    }

    let Some(server_name) = server.get("SERVER_NAME") else {
        return (String::new(), None);
    };

    let port = server.get("SERVER_PORT").and_then(|port| port.trim().parse::<u16>().ok());

    match server.get("SERVER_ADDR") {
        Some(addr) if is_ipv6_literal(server_name) => {
            let host = format!("[{addr}]");
            let port = port.unwrap_or(80);
            let last_group = host.rsplit(':').next().unwrap_or_default();
            if last_group == format!("{port}]") { (host, None) } else { (host, Some(port)) }
        }
        _ => (server_name.clone(), port),
    }
}

/// The raw request path, query string included.
///
/// Sources, first match wins: `UNENCODED_URL` when `IIS_WASURLREWRITTEN` is `1`,
/// `HTTP_X_ORIGINAL_URL`, `HTTP_X_REWRITE_URL`, `REQUEST_URI` (any `scheme://authority`
/// prefix removed), `ORIG_PATH_INFO`, and finally `/`.
pub fn marshal_request_uri(server: &ServerParams) -> String {
    if server.get("IIS_WASURLREWRITTEN").is_some_and(|rewritten| rewritten == "1")
        && let Some(unencoded) = server.get("UNENCODED_URL").filter(|url| !url.is_empty())
    {
        return unencoded.clone();
    }

    let request_uri = server
        .get("HTTP_X_ORIGINAL_URL")
        .or_else(|| server.get("HTTP_X_REWRITE_URL"))
        .or_else(|| server.get("REQUEST_URI"));
    if let Some(request_uri) = request_uri {
        return strip_scheme_and_authority(request_uri).to_string();
    }

    match server.get("ORIG_PATH_INFO") {
        Some(path_info) if !path_info.is_empty() => path_info.clone(),
        _ => "/".to_string(),
    }
}

/// Everything before the first `?`.
pub fn strip_query_string(path: &str) -> &str {
    path.split_once('?').map_or(path, |(path, _query)| path)
}

fn strip_scheme_and_authority(uri: &str) -> &str {
    let Some((scheme, rest)) = uri.split_once("://") else {
        return uri;
    };
    if scheme.is_empty() || scheme.contains(['/', ':']) {
        return uri;
    }
    rest.find('/').map_or("", |slash| &rest[slash..])
}

fn split_host_port(host: &str) -> (String, Option<u16>) {
    let Some((name, port)) = host.rsplit_once(':') else {
        return (host.to_string(), None);
    };

    // `example.com:` carries an empty port
    if port.is_empty() && !name.is_empty() {
        return (name.to_string(), None);
    }
    if !port.is_empty()
        && port.bytes().all(|b| b.is_ascii_digit())
        && let Ok(port) = port.parse::<u16>()
    {
        return (name.to_string(), Some(port));
    }

    (host.to_string(), None)
}

fn is_ipv6_literal(host: &str) -> bool {
    host.strip_prefix('[')
        .and_then(|host| host.strip_suffix(']'))
        .is_some_and(|inner| !inner.is_empty() && inner.chars().all(|c| c.is_ascii_hexdigit() || c == ':'))
}

fn is_default_port(scheme: &str, port: u16) -> bool {
    matches!((scheme, port), ("http", 80) | ("https", 443))
}

/// Bytes that are visible ASCII but may not appear verbatim in a path or query.
const UNSAFE_GRAPHIC: &[u8] = b"\"#<>\\^`{|}";

/// Percent-encodes bytes a URI may not carry verbatim: spaces, controls, non-ASCII and
/// [`UNSAFE_GRAPHIC`].
fn encode_unsafe(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        if byte.is_ascii_graphic() && !UNSAFE_GRAPHIC.contains(&byte) {
            encoded.push(char::from(byte));
        } else {
            let _ = write!(encoded, "%{byte:02X}");
        }
    }
    encoded
}

//! Conversion between `http` crate messages and the micro-message values.
//!
//! An inbound [`http::Request`] is flattened into the CGI-style [`Environment`] the factory
//! consumes; a [`Response`] is turned back into an [`http::Response`] with a buffered body.

use std::io;

use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, COOKIE};
use http::{HeaderMap, Request, Uri};
use http_body::Body;
use http_body_util::{BodyExt, Full};
use micro_message::factory::Environment;
use micro_message::factory::params::{parse_body, parse_cookies, parse_query};
use micro_message::protocol::{FileParams, HttpMessage, Response, ServerParams, Stream};
use tracing::warn;

/// Describes `request` as an environment bag.
///
/// Server params follow the CGI names: `REQUEST_METHOD`, `REQUEST_URI`, `QUERY_STRING`,
/// `SERVER_PROTOCOL`, `SERVER_NAME`/`SERVER_PORT` and `HTTPS` for absolute URIs,
/// `CONTENT_TYPE`/`CONTENT_LENGTH`, and `HTTP_*` for every other header. Query, cookie and
/// body params are parsed up front; the body bytes become the input stream.
pub fn environment_from_http(request: Request<Bytes>) -> Environment {
    let (parts, body) = request.into_parts();

    let mut server = ServerParams::new();
    server.insert("REQUEST_METHOD".to_string(), parts.method.to_string());
    server.insert("REQUEST_URI".to_string(), request_uri(&parts.uri));
    server.insert("QUERY_STRING".to_string(), parts.uri.query().unwrap_or_default().to_string());
    server.insert("SERVER_PROTOCOL".to_string(), format!("{:?}", parts.version));

    if let Some(host) = parts.uri.host() {
        server.insert("SERVER_NAME".to_string(), host.to_string());
    }
    if let Some(port) = parts.uri.port_u16() {
        server.insert("SERVER_PORT".to_string(), port.to_string());
    }
    if parts.uri.scheme_str() == Some("https") {
        server.insert("HTTPS".to_string(), "on".to_string());
    }

    insert_headers(&mut server, &parts.headers);

    let query = parse_query(parts.uri.query().unwrap_or_default());
    let cookies = parse_cookies(&cookie_header(&parts.headers));
    let content_type = parts.headers.get(CONTENT_TYPE).and_then(|value| value.to_str().ok());
    let body_params = parse_body(content_type, &body);

    Environment {
        server,
        query,
        body: body_params,
        cookies,
        files: FileParams::new(),
        input: Stream::from_bytes(body.to_vec()).into(),
    }
}

/// Like [`environment_from_http`], collecting any [`http_body::Body`] first.
///
/// # Errors
///
/// Returns the body's error when collecting it fails.
pub async fn environment_from_body<B>(request: Request<B>) -> Result<Environment, B::Error>
where
    B: Body,
{
    let (parts, body) = request.into_parts();
    let bytes = body.collect().await?.to_bytes();
    Ok(environment_from_http(Request::from_parts(parts, bytes)))
}

/// Converts `response` into an [`http::Response`], buffering the whole body.
///
/// A custom reason phrase cannot be carried by [`http::Response`] and is dropped.
///
/// # Errors
///
/// Fails when the body stream cannot be read.
pub fn into_http_response(response: &Response) -> io::Result<http::Response<Full<Bytes>>> {
    let body = response.body().to_bytes()?;

    let mut http_response = http::Response::new(Full::new(body));
    *http_response.status_mut() = response.status();
    *http_response.version_mut() = response.protocol_version();
    http_response.headers_mut().clone_from(response.headers());
    Ok(http_response)
}

fn request_uri(uri: &Uri) -> String {
    match uri.path_and_query() {
        Some(path_and_query) if path_and_query.as_str().starts_with('/') => path_and_query.to_string(),
        Some(path_and_query) => format!("/{path_and_query}"),
        None => "/".to_string(),
    }
}

fn insert_headers(server: &mut ServerParams, headers: &HeaderMap) {
    for name in headers.keys() {
        let values: Vec<&str> =
            headers.get_all(name).iter().filter_map(|value| std::str::from_utf8(value.as_bytes()).ok()).collect();
        if values.is_empty() {
            warn!(header = %name, "skip header that is not utf8");
            continue;
        }

        let separator = if name == COOKIE { "; " } else { ", " };
        let key = name.as_str().to_ascii_uppercase().replace('-', "_");
        let key = if name == CONTENT_TYPE || name == CONTENT_LENGTH { key } else { format!("HTTP_{key}") };
        server.insert(key, values.join(separator));
    }
}

fn cookie_header(headers: &HeaderMap) -> String {
    headers.get_all(COOKIE).iter().filter_map(|value| value.to_str().ok()).collect::<Vec<_>>().join("; ")
}

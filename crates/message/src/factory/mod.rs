//! Request Factory: turns an environment bag into a [`ServerRequest`].
//!
//! # Architecture
//!
//! - [`server`]: canonical server keys and the protocol version
//! - [`headers`]: request headers derived from `HTTP_*` and `CONTENT_*` server params
//! - [`uri`]: the request URI rebuilt from server params and the host header
//! - [`params`]: query string, cookie header and body parsing
//! - [`globals`]: fills an [`Environment`] from the running process
//!
//! [`create_request`] is a pure function of its [`Environment`]; only [`Globals`] looks at
//! process state.

pub mod globals;
pub mod headers;
pub mod params;
pub mod server;
pub mod uri;

pub use globals::Globals;

use tracing::debug;

use crate::protocol::{BodySource, FileParams, HttpMessage, InvalidArgument, Params, ServerParams, ServerRequest};
use headers::marshal_headers;
use server::{marshal_protocol_version, normalize_server};
use uri::marshal_uri;

/// Everything the factory needs to know about one inbound call.
///
/// The default environment is empty and reads its body from standard input.
#[derive(Debug, Default)]
pub struct Environment {
    pub server: ServerParams,
    pub query: Params,
    pub body: Params,
    pub cookies: Params,
    pub files: FileParams,
    pub input: BodySource,
}

/// Builds a request from `env`.
///
/// Server keys are normalized first; headers, URI, method and protocol version are all
/// derived from the normalized keys. A missing or empty `REQUEST_METHOD` means GET. The
/// query, cookie and body bags are layered on as given, so the query params are not
/// re-derived from the URI.
///
/// # Errors
///
/// Fails when the server params describe an unsupported method or a URI that cannot be
/// represented, or when the input cannot be opened as a stream.
pub fn create_request(env: Environment) -> Result<ServerRequest, InvalidArgument> {
    let Environment { server, query, body, cookies, files, input } = env;

    let server = normalize_server(server);
    let headers = marshal_headers(&server);
    let uri = marshal_uri(&server, &headers)?;
    let version = marshal_protocol_version(&server);
    let method = server
        .get("REQUEST_METHOD")
        .map(|method| method.trim())
        .filter(|method| !method.is_empty())
        .unwrap_or("GET")
        .to_string();

    debug!(method = %method, uri = %uri, version = ?version, "create server request");

    let request = ServerRequest::new(server, files, uri, Some(&method), input, headers)?;

    Ok(request
        .with_protocol_version(version)
        .with_cookie_params(cookies)
        .with_query_params(query)
        .with_body_params(body))
}

/// Builds a request from the running process, with `globals` overriding any of the bags.
///
/// # Errors
///
/// See [`create_request`].
pub fn from_globals(globals: Globals) -> Result<ServerRequest, InvalidArgument> {
    create_request(globals.into_environment())
}

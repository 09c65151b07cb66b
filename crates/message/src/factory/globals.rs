//! The one place that reads ambient process state.
//!
//! [`Globals`] carries optional overrides for every bag of an [`Environment`]; whatever is
//! not supplied is taken from the process, CGI style: the environment variables are the
//! server params, `QUERY_STRING` and `HTTP_COOKIE` are parsed, and standard input is the
//! body.

use std::env;
use std::io::{self, Read};

use tracing::{debug, warn};

use super::Environment;
use super::params::{is_parsable_body, parse_body, parse_cookies, parse_query};
use crate::protocol::{BodySource, FileParams, Params, ServerParams, Stream};

/// Optional overrides for the ambient request sources.
#[derive(Debug, Default)]
pub struct Globals {
    pub server: Option<ServerParams>,
    pub query: Option<Params>,
    pub body: Option<Params>,
    pub cookies: Option<Params>,
    pub files: Option<FileParams>,
}

impl Globals {
    /// Fills every missing bag from the process and returns the resulting environment.
    ///
    /// Standard input is only read eagerly when body params have to be parsed from it;
    /// the bytes stay readable through the environment's input stream either way.
    pub fn into_environment(self) -> Environment {
        let server = self.server.unwrap_or_else(process_server_params);

        let query = self.query.unwrap_or_else(|| server.get("QUERY_STRING").map(|query| parse_query(query)).unwrap_or_default());
        let cookies =
            self.cookies.unwrap_or_else(|| server.get("HTTP_COOKIE").map(|cookie| parse_cookies(cookie)).unwrap_or_default());

        let (body, input) = match self.body {
            Some(body) => (body, stdin_source(&server)),
            None => read_body_params(&server),
        };

        Environment { server, query, body, cookies, files: self.files.unwrap_or_default(), input }
    }
}

fn process_server_params() -> ServerParams {
    env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

fn content_length(server: &ServerParams) -> Option<u64> {
    server.get("CONTENT_LENGTH").and_then(|length| length.trim().parse().ok())
}

/// Standard input, bounded by `CONTENT_LENGTH` when the host announced one.
fn stdin_source(server: &ServerParams) -> BodySource {
    match content_length(server) {
        Some(length) => Stream::from_reader(io::stdin().take(length)).into(),
        None => BodySource::default(),
    }
}

fn read_body_params(server: &ServerParams) -> (Params, BodySource) {
    let content_type = server.get("CONTENT_TYPE").map(String::as_str);
    if !content_type.is_some_and(is_parsable_body) {
        return (Params::new(), stdin_source(server));
    }

    let mut bytes = Vec::new();
    let read = match content_length(server) {
        Some(length) => io::stdin().lock().take(length).read_to_end(&mut bytes),
        None => io::stdin().lock().read_to_end(&mut bytes),
    };
    if let Err(e) = read {
        warn!(cause = %e, "failed to read request body from stdin");
    }

    debug!(size = bytes.len(), content_type, "parse body params from stdin");
    let params = parse_body(content_type, &bytes);
    (params, Stream::from_bytes(bytes).into())
}

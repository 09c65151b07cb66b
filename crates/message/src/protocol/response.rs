//! The immutable response value.
//!
//! A response is created fresh by a handler, refined through copy-producing mutators and
//! handed to the host for serialization. Its body defaults to a writable in-memory buffer.

use http::{HeaderMap, StatusCode};

use crate::ensure;
use crate::protocol::body::{Body, BodySource, Mode};
use crate::protocol::{HttpMessage, InvalidArgument, MessageParts};

#[derive(Debug, Clone)]
pub struct Response {
    message: MessageParts,
    status: StatusCode,
    reason_phrase: Option<String>,
}

impl Response {
    /// A `200 OK` response with an empty in-memory body and no headers.
    pub fn new() -> Self {
        Self { message: MessageParts::new(HeaderMap::new(), Body::empty()), status: StatusCode::OK, reason_phrase: None }
    }

    /// Builds a response from a body source, a status code and headers.
    ///
    /// Identifiers are opened for reading and writing.
    pub fn with_parts<B: Into<BodySource>>(body: B, status: u16, headers: HeaderMap) -> Result<Self, InvalidArgument> {
        let status = parse_status(status)?;
        let body = Body::from_source(body, Mode::ReadWrite)?;
        Ok(Self { message: MessageParts::new(headers, body), status, reason_phrase: None })
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The custom reason phrase, or the canonical one for the status code.
    pub fn reason_phrase(&self) -> &str {
        match &self.reason_phrase {
            Some(reason) => reason,
            None => self.status.canonical_reason().unwrap_or(""),
        }
    }

    /// Returns a response with status `code`, optionally with a custom reason phrase.
    pub fn with_status(&self, code: u16, reason_phrase: Option<&str>) -> Result<Self, InvalidArgument> {
        let status = parse_status(code)?;
        let mut new = self.clone();
        new.status = status;
        new.reason_phrase = reason_phrase.filter(|reason| !reason.is_empty()).map(str::to_string);
        Ok(new)
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpMessage for Response {
    fn parts(&self) -> &MessageParts {
        &self.message
    }

    fn parts_mut(&mut self) -> &mut MessageParts {
        &mut self.message
    }
}

fn parse_status(code: u16) -> Result<StatusCode, InvalidArgument> {
    ensure!((100..600).contains(&code), InvalidArgument::invalid_status(code));
    StatusCode::from_u16(code).map_err(|_e| InvalidArgument::invalid_status(code))
}

//! CGI response serialization.
//!
//! The host expects a `Status:` line, one `name: value` line per header value, a blank line
//! and then the body, all lines ending in CRLF.

use std::io::{self, Write};

use micro_message::protocol::{HttpMessage, Response};

const CRLF: &[u8] = b"\r\n";

/// Writes `response` to `out` in CGI form and flushes it.
///
/// # Errors
///
/// Fails when the body cannot be read or `out` cannot be written.
pub fn write_response<W: Write>(response: &Response, out: &mut W) -> io::Result<()> {
    let body = response.body().to_bytes()?;

    let reason = response.reason_phrase();
    if reason.is_empty() {
        write!(out, "Status: {}", response.status().as_u16())?;
    } else {
        write!(out, "Status: {} {reason}", response.status().as_u16())?;
    }
    out.write_all(CRLF)?;

    for (name, value) in response.headers() {
        out.write_all(name.as_str().as_bytes())?;
        out.write_all(b": ")?;
        out.write_all(value.as_bytes())?;
        out.write_all(CRLF)?;
    }

    out.write_all(CRLF)?;
    out.write_all(&body)?;
    out.flush()
}

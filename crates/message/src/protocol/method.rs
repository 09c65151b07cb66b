//! HTTP method validation.
//!
//! Only a fixed set of methods is accepted by the message values. Input is matched
//! case-insensitively and always stored upper-cased.

use http::Method;

use crate::protocol::InvalidArgument;

/// The methods a message may carry.
pub const VALID_METHODS: [Method; 8] = [
    Method::CONNECT,
    Method::DELETE,
    Method::GET,
    Method::HEAD,
    Method::OPTIONS,
    Method::POST,
    Method::PUT,
    Method::TRACE,
];

/// Method reported when a message was built without one.
pub(crate) static DEFAULT_METHOD: Method = Method::GET;

/// Upper-cases `method` and checks it against [`VALID_METHODS`].
pub fn parse_method(method: &str) -> Result<Method, InvalidArgument> {
    let upper = method.to_ascii_uppercase();
    VALID_METHODS
        .iter()
        .find(|valid| valid.as_str() == upper)
        .cloned()
        .ok_or_else(|| InvalidArgument::unsupported_method(upper))
}

//! Immutable HTTP server request and response values
//!
//! This crate turns the loose description of an inbound call (server metadata, query,
//! body, cookie and uploaded file maps, plus a body input) into a validated, immutable
//! [`protocol::ServerRequest`]. Every mutator on a message is copy-producing: it returns a
//! new value with exactly one field replaced and leaves the receiver untouched.
//!
//! # Example
//!
//! ```
//! use micro_message::factory::{self, Environment};
//! use micro_message::protocol::{HttpMessage, Stream};
//!
//! let mut env = Environment::default();
//! env.server.insert("REQUEST_METHOD".into(), "post".into());
//! env.server.insert("HTTP_HOST".into(), "example.com".into());
//! env.server.insert("REQUEST_URI".into(), "/users?page=2".into());
//! env.server.insert("QUERY_STRING".into(), "page=2".into());
//! env.server.insert("CONTENT_TYPE".into(), "application/json".into());
//! env.input = Stream::from_bytes(r#"{"name":"zava"}"#).into();
//!
//! let request = factory::create_request(env).unwrap();
//!
//! assert_eq!(request.method().as_str(), "POST");
//! assert_eq!(request.header_line("Content-Type"), "application/json");
//! assert_eq!(request.uri().unwrap().to_string(), "http://example.com/users?page=2");
//!
//! let renamed = request.with_method("put").unwrap();
//! assert_eq!(renamed.method().as_str(), "PUT");
//! assert_eq!(request.method().as_str(), "POST");
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: the message values, the body stream and the validation error
//! - [`factory`]: builds a [`protocol::ServerRequest`] from an explicit
//!   [`factory::Environment`], and reads that environment from the process through
//!   [`factory::Globals`]
//!
//! # Error Handling
//!
//! Every validation failure is a [`protocol::InvalidArgument`], raised at the point of
//! construction or mutation. A message is either fully valid or never returned. Stream
//! operations report plain [`std::io::Error`]s.

pub mod factory;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;

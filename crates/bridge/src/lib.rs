//! Framework glue around the micro-message values
//!
//! This crate hosts [`micro_message`] requests: it routes them to handlers, and moves
//! messages in and out of the `http` crate types and the CGI wire form.
//!
//! # Example
//!
//! ```
//! use micro_bridge::{cgi, controller};
//! use micro_message::protocol::ServerRequest;
//!
//! let kernel = controller::app().unwrap();
//! let request = ServerRequest::builder().uri("/").header("User-Agent", "TestBot/1.0").build().unwrap();
//! let response = kernel.handle(request);
//!
//! let mut out = Vec::new();
//! cgi::write_response(&response, &mut out).unwrap();
//! assert!(out.ends_with(b"Howdy, we received an GET from TestBot/1.0"));
//! ```
//!
//! # Architecture
//!
//! - [`handler`]: the [`Handler`] trait and [`make_handler`] for plain functions
//! - [`router`] and [`kernel`]: path matching, attribute injection and dispatch
//! - [`adapter`]: `http::Request` to [`micro_message::factory::Environment`], and
//!   [`micro_message::protocol::Response`] to `http::Response`
//! - [`cgi`]: response serialization for CGI hosts
//! - [`controller`]: the demonstration greeting handler and its application
//!
//! # Logging
//!
//! Dispatch is logged through `tracing`; handler failures are reported at `error` level
//! with the failing path and cause.

pub mod adapter;
pub mod cgi;
pub mod controller;
pub mod handler;
pub mod kernel;
pub mod response;
pub mod router;

pub use handler::Handler;
pub use handler::HandlerError;
pub use handler::make_handler;
pub use kernel::Kernel;
pub use kernel::KernelBuildError;

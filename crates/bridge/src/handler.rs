use std::error::Error;

use micro_message::protocol::{Response, ServerRequest};

/// Error type every handler reports to the kernel.
pub type HandlerError = Box<dyn Error + Send + Sync>;

/// Turns a request into a response.
///
/// Handlers run synchronously, one request at a time. A returned error is not shown to the
/// client; the kernel logs it and answers `500`.
#[cfg_attr(test, mockall::automock)]
pub trait Handler {
    fn call(&self, request: ServerRequest) -> Result<Response, HandlerError>;
}

#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

impl<F, Err> Handler for HandlerFn<F>
where
    F: Fn(ServerRequest) -> Result<Response, Err>,
    Err: Into<HandlerError>,
{
    fn call(&self, request: ServerRequest) -> Result<Response, HandlerError> {
        (self.f)(request).map_err(Into::into)
    }
}

/// Wraps a plain function or closure as a [`Handler`].
pub fn make_handler<F, Err>(f: F) -> HandlerFn<F>
where
    F: Fn(ServerRequest) -> Result<Response, Err>,
    Err: Into<HandlerError>,
{
    HandlerFn { f }
}

//! Request dispatch.
//!
//! The [`Kernel`] matches the request path against its [`Router`], exposes the match to the
//! handler as request attributes and turns every outcome into a [`Response`]:
//!
//! - matched: the route name is injected as `_route`, each path parameter under its own
//!   name, then the route's handler runs
//! - unmatched: the default handler runs, or `404 not found` when none is configured
//! - handler error: logged, answered with `500 internal server error`

use http::StatusCode;
use micro_message::protocol::{Response, ServerRequest};
use thiserror::Error;
use tracing::{error, info};

use crate::handler::{Handler, HandlerError};
use crate::response::status_response;
use crate::router::{Router, RouterBuilder};

/// Attribute that carries the name of the matched route.
pub const ROUTE_ATTRIBUTE: &str = "_route";

#[derive(Error, Debug)]
pub enum KernelBuildError {
    #[error("route name \"{name}\" is registered twice")]
    DuplicateRouteName { name: String },
    #[error("invalid route \"{path}\": {reason}")]
    InvalidRoute { path: String, reason: String },
}

impl KernelBuildError {
    pub fn invalid_route<S: ToString>(path: &str, reason: S) -> Self {
        Self::InvalidRoute { path: path.to_string(), reason: reason.to_string() }
    }
}

pub struct Kernel {
    router: Router,
    default_handler: Option<Box<dyn Handler>>,
}

impl Kernel {
    pub fn builder() -> KernelBuilder {
        KernelBuilder::new()
    }

    /// Dispatches `request` and always produces a response.
    pub fn handle(&self, request: ServerRequest) -> Response {
        let path = request.uri().map(http::Uri::path).filter(|path| !path.is_empty()).unwrap_or("/").to_string();

        let result = match self.router.at(&path) {
            Some(matched) => {
                let route = matched.route();
                let mut request = request.with_attribute(ROUTE_ATTRIBUTE, route.name());
                for (name, value) in matched.params() {
                    request = request.with_attribute(name, value.as_str());
                }

                info!(method = %request.method(), path = %path, route = route.name(), "dispatch request");
                route.handler().call(request)
            }
            None => match &self.default_handler {
                Some(handler) => {
                    info!(method = %request.method(), path = %path, "dispatch request to default handler");
                    handler.call(request)
                }
                None => {
                    info!(method = %request.method(), path = %path, "no route found");
                    return status_response(StatusCode::NOT_FOUND);
                }
            },
        };

        result.unwrap_or_else(|e| handler_failed(&path, &e))
    }
}

fn handler_failed(path: &str, e: &HandlerError) -> Response {
    error!(cause = %e, path, "handler failed");
    status_response(StatusCode::INTERNAL_SERVER_ERROR)
}

impl std::fmt::Debug for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Kernel")
            .field("router", &self.router)
            .field("default_handler", &self.default_handler.is_some())
            .finish()
    }
}

pub struct KernelBuilder {
    router: RouterBuilder,
    default_handler: Option<Box<dyn Handler>>,
}

impl KernelBuilder {
    fn new() -> Self {
        Self { router: Router::builder(), default_handler: None }
    }

    /// Registers `handler` at the `matchit` pattern `path` under the route name `name`.
    pub fn route<H: Handler + 'static>(mut self, path: impl Into<String>, name: impl Into<String>, handler: H) -> Self {
        self.router = self.router.route(path, name, handler);
        self
    }

    /// Handler for requests no route matches.
    pub fn default_handler<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.default_handler = Some(Box::new(handler));
        self
    }

    /// # Errors
    ///
    /// See [`RouterBuilder::build`].
    pub fn build(self) -> Result<Kernel, KernelBuildError> {
        let router = self.router.build()?;
        Ok(Kernel { router, default_handler: self.default_handler })
    }
}

impl std::fmt::Debug for KernelBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KernelBuilder")
            .field("router", &self.router)
            .field("default_handler", &self.default_handler.is_some())
            .finish()
    }
}

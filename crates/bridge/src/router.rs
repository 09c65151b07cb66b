//! Path routing for the kernel.
//!
//! Routes are `matchit` patterns (`/users/{id}`, `/assets/{*path}`), each bound to a name
//! and a [`Handler`]. Route names are unique; the name of the matched route is what the
//! kernel exposes as the `_route` attribute.

use std::collections::HashSet;
use std::fmt;

use tracing::debug;

use crate::handler::Handler;
use crate::kernel::KernelBuildError;

type InnerRouter<T> = matchit::Router<T>;

/// Maps request paths to named handlers.
pub struct Router {
    inner_router: InnerRouter<Route>,
}

/// A named handler stored in the router.
pub struct Route {
    name: String,
    handler: Box<dyn Handler>,
}

/// Result of matching a path: the route and the path parameters it captured.
pub struct RouteMatch<'router> {
    route: &'router Route,
    params: Vec<(String, String)>,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Matches `path` against the registered routes.
    pub fn at(&self, path: &str) -> Option<RouteMatch<'_>> {
        match self.inner_router.at(path) {
            Ok(matched) => {
                let params = matched.params.iter().map(|(key, value)| (key.to_string(), value.to_string())).collect();
                Some(RouteMatch { route: matched.value, params })
            }
            Err(e) => {
                debug!(path, cause = %e, "no route matched");
                None
            }
        }
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router").finish_non_exhaustive()
    }
}

impl Route {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handler(&self) -> &dyn Handler {
        self.handler.as_ref()
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route").field("name", &self.name).finish_non_exhaustive()
    }
}

impl<'router> RouteMatch<'router> {
    pub fn route(&self) -> &'router Route {
        self.route
    }

    /// Path parameters in pattern order.
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

impl fmt::Debug for RouteMatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMatch").field("route", &self.route.name).field("params", &self.params).finish()
    }
}

pub struct RouterBuilder {
    routes: Vec<(String, Route)>,
}

impl RouterBuilder {
    fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Registers `handler` at `path` under `name`.
    pub fn route<H: Handler + 'static>(mut self, path: impl Into<String>, name: impl Into<String>, handler: H) -> Self {
        self.routes.push((path.into(), Route { name: name.into(), handler: Box::new(handler) }));
        self
    }

    /// Builds the router.
    ///
    /// # Errors
    ///
    /// Fails when two routes share a name, or a path is not a valid pattern or conflicts
    /// with an earlier one.
    pub fn build(self) -> Result<Router, KernelBuildError> {
        let mut inner_router = InnerRouter::new();
        let mut names = HashSet::new();

        for (path, route) in self.routes {
            if !names.insert(route.name.clone()) {
                return Err(KernelBuildError::DuplicateRouteName { name: route.name });
            }

            inner_router.insert(path.as_str(), route).map_err(|e| KernelBuildError::invalid_route(&path, e))?;
        }

        Ok(Router { inner_router })
    }
}

impl fmt::Debug for RouterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let paths: Vec<_> = self.routes.iter().map(|(path, route)| (path.as_str(), route.name.as_str())).collect();
        f.debug_struct("RouterBuilder").field("routes", &paths).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::make_handler;
    use micro_message::protocol::{InvalidArgument, Response, ServerRequest};

    fn ok(_request: ServerRequest) -> Result<Response, InvalidArgument> {
        Ok(Response::new())
    }

    fn router() -> Router {
        Router::builder()
            .route("/", "homepage", make_handler(ok))
            .route("/users/{id}", "user_show", make_handler(ok))
            .route("/files/{*path}", "file_download", make_handler(ok))
            .build()
            .unwrap()
    }

    #[test]
    fn test_route_static() {
        let router = router();
        let matched = router.at("/").unwrap();

        assert_eq!(matched.route().name(), "homepage");
        assert!(matched.params().is_empty());
    }

    #[test]
    fn test_route_params() {
        let router = router();

        let matched = router.at("/users/42").unwrap();
        assert_eq!(matched.route().name(), "user_show");
        assert_eq!(matched.params(), [("id".to_string(), "42".to_string())]);

        let matched = router.at("/files/docs/readme.md").unwrap();
        assert_eq!(matched.route().name(), "file_download");
        assert_eq!(matched.params(), [("path".to_string(), "docs/readme.md".to_string())]);
    }

    #[test]
    fn test_route_missing() {
        assert!(router().at("/nowhere").is_none());
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let err = Router::builder()
            .route("/a", "same", make_handler(ok))
            .route("/b", "same", make_handler(ok))
            .build()
            .unwrap_err();

        assert!(matches!(err, KernelBuildError::DuplicateRouteName { name } if name == "same"));
    }

    #[test]
    fn conflicting_path_is_rejected() {
        let err = Router::builder()
            .route("/users/{id}", "by_id", make_handler(ok))
            .route("/users/{name}", "by_name", make_handler(ok))
            .build()
            .unwrap_err();

        assert!(matches!(err, KernelBuildError::InvalidRoute { path, .. } if path == "/users/{name}"));
    }
}

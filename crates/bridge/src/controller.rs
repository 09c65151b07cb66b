//! The demonstration application: one route that greets the caller.

use http::StatusCode;
use micro_message::protocol::{HttpMessage, InvalidArgument, Response, ServerRequest};

use crate::handler::make_handler;
use crate::kernel::{Kernel, KernelBuildError};
use crate::response::text_response;

/// Answers `200 text/plain` naming the request method and user agent.
///
/// # Errors
///
/// Only fails if the response cannot be assembled.
pub fn index(request: ServerRequest) -> Result<Response, InvalidArgument> {
    let greeting = format!("Howdy, we received an {} from {}", request.method(), request.header_line("User-Agent"));
    text_response(StatusCode::OK, &greeting)
}

/// The kernel with [`index`] mounted at `/` as `homepage`.
///
/// # Errors
///
/// See [`crate::kernel::KernelBuilder::build`].
pub fn app() -> Result<Kernel, KernelBuildError> {
    Kernel::builder().route("/", "homepage", make_handler(index)).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::ROUTE_ATTRIBUTE;
    use serde_json::json;

    #[test]
    fn greets_method_and_user_agent() {
        let request = ServerRequest::builder().method("get").header("User-Agent", "TestBot/1.0").build().unwrap();
        let response = index(request).unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.header_line("Content-Type"), "text/plain");
        assert_eq!(response.body().full_contents().unwrap(), "Howdy, we received an GET from TestBot/1.0");
    }

    #[test]
    fn missing_user_agent_is_blank() {
        let request = ServerRequest::builder().method("POST").build().unwrap();
        let response = index(request).unwrap();

        assert_eq!(response.body().full_contents().unwrap(), "Howdy, we received an POST from ");
    }

    #[test]
    fn homepage_route_accepts_any_method() {
        let kernel = app().unwrap();

        for method in ["GET", "POST", "DELETE", "OPTIONS"] {
            let request = ServerRequest::builder().method(method).uri("/").header("User-Agent", "curl/8.0").build().unwrap();
            let response = kernel.handle(request);

            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.body().full_contents().unwrap(), format!("Howdy, we received an {method} from curl/8.0"));
        }

        assert_eq!(kernel.handle(ServerRequest::builder().uri("/elsewhere").build().unwrap()).status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn route_attribute_is_visible_to_index() {
        let kernel = Kernel::builder()
            .route(
                "/",
                "homepage",
                make_handler(|request: ServerRequest| {
                    assert_eq!(request.attribute(ROUTE_ATTRIBUTE), Some(&json!("homepage")));
                    index(request)
                }),
            )
            .build()
            .unwrap();

        assert_eq!(kernel.handle(ServerRequest::builder().uri("/").build().unwrap()).status(), StatusCode::OK);
    }
}

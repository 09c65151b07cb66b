//! The immutable server-side request value.

use std::borrow::Cow;

use http::{HeaderMap, Method, Uri};
use serde_json::Value;

use crate::protocol::body::{Body, BodySource, Mode, Stream};
use crate::protocol::message::header_pair;
use crate::protocol::method::{DEFAULT_METHOD, parse_method};
use crate::protocol::{Attributes, FileParams, HttpMessage, InvalidArgument, MessageParts, Params, ServerParams};

/// The accepted ways to supply a request URI.
#[derive(Debug, Clone, Default)]
pub enum UriSource {
    #[default]
    None,
    Text(String),
    Uri(Uri),
}

impl UriSource {
    fn into_uri(self) -> Result<Option<Uri>, InvalidArgument> {
        match self {
            UriSource::None => Ok(None),
            UriSource::Text(text) if text.is_empty() => Ok(None),
            UriSource::Text(text) => {
                text.parse::<Uri>().map(Some).map_err(|e| InvalidArgument::invalid_uri(format!("\"{text}\": {e}")))
            }
            UriSource::Uri(uri) => Ok(Some(uri)),
        }
    }
}

impl From<&str> for UriSource {
    fn from(text: &str) -> Self {
        UriSource::Text(text.to_string())
    }
}

impl From<String> for UriSource {
    fn from(text: String) -> Self {
        UriSource::Text(text)
    }
}

impl From<Uri> for UriSource {
    fn from(uri: Uri) -> Self {
        UriSource::Uri(uri)
    }
}

impl From<Option<Uri>> for UriSource {
    fn from(uri: Option<Uri>) -> Self {
        uri.map_or(UriSource::None, UriSource::Uri)
    }
}

/// An incoming request as seen by the server.
///
/// The request never changes after construction. Mutators return a new request with one
/// field replaced; all parameter maps are deep-copied, only the body handle is carried
/// over (see [`crate::protocol::body`]).
///
/// Query params are deliberately independent of the URI: replacing one never updates the
/// other, so callers must not assume they agree.
#[derive(Debug, Clone)]
pub struct ServerRequest {
    message: MessageParts,
    method: Option<Method>,
    uri: Option<Uri>,
    attributes: Attributes,
    query_params: Params,
    body_params: Params,
    cookie_params: Params,
    file_params: FileParams,
    server_params: ServerParams,
}

impl ServerRequest {
    /// Builds a request, validating every argument.
    ///
    /// # Errors
    ///
    /// Fails when the URI text does not parse, the method is not one of
    /// [`crate::protocol::VALID_METHODS`], or the body cannot be turned into a stream.
    pub fn new<U, B>(
        server_params: ServerParams,
        file_params: FileParams,
        uri: U,
        method: Option<&str>,
        body: B,
        headers: HeaderMap,
    ) -> Result<Self, InvalidArgument>
    where
        U: Into<UriSource>,
        B: Into<BodySource>,
    {
        let body = Body::from_source(body, Mode::Read)?;
        let uri = uri.into().into_uri()?;
        let method = method.map(parse_method).transpose()?;

        Ok(Self {
            message: MessageParts::new(headers, body),
            method,
            uri,
            attributes: Attributes::new(),
            query_params: Params::new(),
            body_params: Params::new(),
            cookie_params: Params::new(),
            file_params,
            server_params,
        })
    }

    pub fn builder() -> ServerRequestBuilder {
        ServerRequestBuilder::new()
    }

    /// The request method; GET when none was given.
    pub fn method(&self) -> &Method {
        self.method.as_ref().unwrap_or(&DEFAULT_METHOD)
    }

    /// Returns a request with `method`, upper-cased and validated.
    pub fn with_method(&self, method: &str) -> Result<Self, InvalidArgument> {
        let method = parse_method(method)?;
        let mut new = self.clone();
        new.method = Some(method);
        Ok(new)
    }

    pub fn uri(&self) -> Option<&Uri> {
        self.uri.as_ref()
    }

    #[must_use]
    pub fn with_uri(&self, uri: Uri) -> Self {
        let mut new = self.clone();
        new.uri = Some(uri);
        new
    }

    /// Origin-form target of the request: path and query, `/` without a URI.
    pub fn request_target(&self) -> String {
        match self.uri.as_ref().and_then(Uri::path_and_query) {
            Some(path_and_query) if !path_and_query.path().is_empty() => path_and_query.to_string(),
            Some(path_and_query) => format!("/{path_and_query}"),
            None => "/".to_string(),
        }
    }

    pub fn server_params(&self) -> &ServerParams {
        &self.server_params
    }

    pub fn file_params(&self) -> &FileParams {
        &self.file_params
    }

    pub fn cookie_params(&self) -> &Params {
        &self.cookie_params
    }

    #[must_use]
    pub fn with_cookie_params(&self, cookies: Params) -> Self {
        let mut new = self.clone();
        new.cookie_params = cookies;
        new
    }

    /// Deserialized query arguments. These may not match the URI query.
    pub fn query_params(&self) -> &Params {
        &self.query_params
    }

    /// Returns a request with `query`; the URI and server params are left as they are.
    #[must_use]
    pub fn with_query_params(&self, query: Params) -> Self {
        let mut new = self.clone();
        new.query_params = query;
        new
    }

    pub fn body_params(&self) -> &Params {
        &self.body_params
    }

    #[must_use]
    pub fn with_body_params(&self, params: Params) -> Self {
        let mut new = self.clone();
        new.body_params = params;
        new
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    #[must_use]
    pub fn with_attribute<V: Into<Value>>(&self, name: &str, value: V) -> Self {
        let mut new = self.clone();
        new.attributes.insert(name.to_string(), value.into());
        new
    }

    /// Returns a request without attribute `name`.
    ///
    /// When the attribute is absent nothing is copied: the result borrows `self`.
    pub fn without_attribute(&self, name: &str) -> Cow<'_, Self> {
        if !self.attributes.contains_key(name) {
            return Cow::Borrowed(self);
        }

        let mut new = self.clone();
        new.attributes.remove(name);
        Cow::Owned(new)
    }
}

impl HttpMessage for ServerRequest {
    fn parts(&self) -> &MessageParts {
        &self.message
    }

    fn parts_mut(&mut self) -> &mut MessageParts {
        &mut self.message
    }
}

/// Fluent assembly of [`ServerRequest::new`] arguments.
#[derive(Debug, Default)]
pub struct ServerRequestBuilder {
    server_params: ServerParams,
    file_params: FileParams,
    uri: UriSource,
    method: Option<String>,
    body: Option<BodySource>,
    headers: Vec<(String, String)>,
}

impl ServerRequestBuilder {
    fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    #[must_use]
    pub fn uri(mut self, uri: impl Into<UriSource>) -> Self {
        self.uri = uri.into();
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn server_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.server_params.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn server_params(mut self, server_params: ServerParams) -> Self {
        self.server_params = server_params;
        self
    }

    #[must_use]
    pub fn file_params(mut self, file_params: FileParams) -> Self {
        self.file_params = file_params;
        self
    }

    /// Sets the body; an empty in-memory body is used when never called.
    #[must_use]
    pub fn body(mut self, body: impl Into<BodySource>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn build(self) -> Result<ServerRequest, InvalidArgument> {
        let mut headers = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let (name, value) = header_pair(name, value)?;
            headers.append(name, value);
        }

        let body = self.body.unwrap_or_else(|| BodySource::Stream(Stream::memory()));
        ServerRequest::new(self.server_params, self.file_params, self.uri, self.method.as_deref(), body, headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Version;
    use serde_json::json;

    fn base() -> ServerRequest {
        ServerRequest::builder()
            .method("get")
            .uri("http://example.com/search?q=rust")
            .header("User-Agent", "TestBot/1.0")
            .header("Accept", "text/html")
            .header("accept", "text/plain")
            .server_param("SERVER_NAME", "example.com")
            .body(Stream::from_bytes("payload"))
            .build()
            .unwrap()
    }

    fn params(value: Value) -> Params {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test params must be objects"),
        }
    }

    #[test]
    fn reads_back_constructed_values() {
        let request = base();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.uri().unwrap().host(), Some("example.com"));
        assert_eq!(request.uri().unwrap().query(), Some("q=rust"));
        assert_eq!(request.header("user-agent"), vec!["TestBot/1.0"]);
        assert_eq!(request.header("ACCEPT"), vec!["text/html", "text/plain"]);
        assert_eq!(request.header_line("Accept"), "text/html,text/plain");
        assert_eq!(request.header_line("X-Missing"), "");
        assert!(request.has_header("USER-AGENT"));
        assert_eq!(request.body().contents().unwrap(), "payload");
        assert_eq!(request.server_params().get("SERVER_NAME").map(String::as_str), Some("example.com"));
        assert_eq!(request.protocol_version(), Version::HTTP_11);
    }

    #[test]
    fn method_is_stored_uppercased() {
        let request = ServerRequest::new(
            ServerParams::new(),
            FileParams::new(),
            UriSource::None,
            Some("options"),
            Stream::memory(),
            HeaderMap::new(),
        )
        .unwrap();
        assert_eq!(request.method().as_str(), "OPTIONS");
    }

    #[test]
    fn missing_method_reads_as_get() {
        let request = ServerRequest::new(
            ServerParams::new(),
            FileParams::new(),
            UriSource::None,
            None,
            Stream::memory(),
            HeaderMap::new(),
        )
        .unwrap();
        assert_eq!(request.method(), Method::GET);
        assert!(request.uri().is_none());
        assert_eq!(request.request_target(), "/");
    }

    #[test]
    fn invalid_arguments_fail_construction() {
        let bad_method = ServerRequest::builder().method("patch").build();
        assert!(matches!(bad_method, Err(InvalidArgument::UnsupportedMethod { .. })));

        let bad_uri = ServerRequest::builder().uri("http://exa mple.com/").build();
        assert!(matches!(bad_uri, Err(InvalidArgument::InvalidUri { .. })));

        let bad_body = ServerRequest::builder().body("gopher://example.com/body").build();
        assert!(matches!(bad_body, Err(InvalidArgument::InvalidBody { .. })));

        let bad_header = ServerRequest::builder().header("Bad Header", "x").build();
        assert!(matches!(bad_header, Err(InvalidArgument::InvalidHeader { .. })));
    }

    #[test]
    fn empty_uri_text_means_no_uri() {
        let request = ServerRequest::builder().uri("").build().unwrap();
        assert!(request.uri().is_none());
    }

    #[test]
    fn with_method_leaves_original_untouched() {
        let original = base();
        let changed = original.with_method("post").unwrap();

        assert_eq!(changed.method(), Method::POST);
        assert_eq!(original.method(), Method::GET);
        assert_eq!(changed.uri(), original.uri());
        assert_eq!(changed.headers(), original.headers());
        assert!(changed.body().ptr_eq(original.body()));

        assert!(matches!(original.with_method("fetch"), Err(InvalidArgument::UnsupportedMethod { .. })));
    }

    #[test]
    fn with_uri_and_request_target() {
        let original = base();
        let changed = original.with_uri(Uri::from_static("/users/42?tab=repos"));

        assert_eq!(changed.request_target(), "/users/42?tab=repos");
        assert_eq!(original.request_target(), "/search?q=rust");
    }

    #[test]
    fn query_params_do_not_follow_the_uri() {
        let request = base().with_query_params(params(json!({"q": "python"})));

        assert_eq!(request.query_params().get("q"), Some(&json!("python")));
        assert_eq!(request.uri().unwrap().query(), Some("q=rust"));
        assert!(!request.server_params().contains_key("QUERY_STRING"));

        let moved = request.with_uri(Uri::from_static("/elsewhere?page=3"));
        assert_eq!(moved.query_params().get("q"), Some(&json!("python")));
    }

    #[test]
    fn parameter_setters_are_independent() {
        let original = base();
        let with_cookies = original.with_cookie_params(params(json!({"session": "abc"})));
        let with_body = with_cookies.with_body_params(params(json!({"name": "zava"})));

        assert!(original.cookie_params().is_empty());
        assert!(with_cookies.body_params().is_empty());
        assert_eq!(with_body.cookie_params().get("session"), Some(&json!("abc")));
        assert_eq!(with_body.body_params().get("name"), Some(&json!("zava")));
        assert!(with_body.query_params().is_empty());
    }

    #[test]
    fn attributes_copy_on_write() {
        let original = base();
        let routed = original.with_attribute("_route", "homepage").with_attribute("id", 42);

        assert!(original.attributes().is_empty());
        assert_eq!(routed.attribute("_route"), Some(&json!("homepage")));
        assert_eq!(routed.attribute("id"), Some(&json!(42)));
        assert_eq!(routed.attribute("missing"), None);
    }

    #[test]
    fn without_absent_attribute_returns_self() {
        let request = base().with_attribute("id", 42);
        let same = request.without_attribute("missing");

        assert!(matches!(same, Cow::Borrowed(_)));
        assert!(std::ptr::eq(same.as_ref(), &request));
    }

    #[test]
    fn without_present_attribute_copies() {
        let request = base().with_attribute("id", 42).with_attribute("_route", "homepage");
        let removed = request.without_attribute("id");

        assert!(matches!(removed, Cow::Owned(_)));
        assert_eq!(removed.attribute("id"), None);
        assert_eq!(removed.attribute("_route"), Some(&json!("homepage")));
        assert_eq!(request.attribute("id"), Some(&json!(42)));
    }

    #[test]
    fn header_mutators_copy_on_write() {
        let original = base();
        let replaced = original.with_header("Accept", "application/json").unwrap();
        let added = original.with_added_header("X-Trace", "1").unwrap().with_added_header("x-trace", "2").unwrap();
        let removed = original.without_header("user-agent");

        assert_eq!(replaced.header("accept"), vec!["application/json"]);
        assert_eq!(original.header("accept"), vec!["text/html", "text/plain"]);
        assert_eq!(added.header_line("X-Trace"), "1,2");
        assert!(!removed.has_header("User-Agent"));
        assert!(original.has_header("User-Agent"));

        assert!(original.with_header("X-Bad", "line\nbreak").is_err());
    }

    #[test]
    fn utf8_header_values_read_back() {
        let request = base().with_header("X-Name", "café").unwrap().with_added_header("X-Name", "naïve").unwrap();

        assert_eq!(request.header("x-name"), vec!["café", "naïve"]);
        assert_eq!(request.header_line("X-Name"), "café,naïve");
    }

    #[test]
    fn with_body_moves_the_stream() {
        let request = base();
        let kept = request.with_attribute("kept", true);

        let replaced = request.with_body(Body::new(Stream::from_bytes("replacement")));
        assert_eq!(replaced.body().contents().unwrap(), "replacement");
        assert_eq!(replaced.attribute("kept"), None);
        // copies made before the move still hold the old stream
        assert_eq!(kept.body().contents().unwrap(), "payload");
    }

    #[test]
    fn clone_deep_copies_maps() {
        let original = base().with_attribute("a", 1);
        let copy = original.clone().with_attribute("b", 2);

        assert_eq!(original.attributes().len(), 1);
        assert_eq!(copy.attributes().len(), 2);
    }

    #[test]
    fn protocol_version_copy_on_write() {
        let original = base();
        let http10 = original.with_protocol_version(Version::HTTP_10);

        assert_eq!(http10.protocol_version(), Version::HTTP_10);
        assert_eq!(original.protocol_version(), Version::HTTP_11);
    }
}

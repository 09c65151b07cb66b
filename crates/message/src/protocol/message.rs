use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Version};

use crate::protocol::InvalidArgument;
use crate::protocol::body::Body;

/// State every HTTP message carries: protocol version, headers and body.
#[derive(Debug, Clone)]
pub struct MessageParts {
    version: Version,
    headers: HeaderMap,
    body: Body,
}

impl MessageParts {
    pub fn new(headers: HeaderMap, body: Body) -> Self {
        Self { version: Version::HTTP_11, headers, body }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Body {
        &self.body
    }
}

/// The capability set shared by requests and responses.
///
/// Every `with_*` method is copy-producing: it returns a new message with exactly one
/// field replaced and leaves `self` untouched. Header names are case-insensitive.
pub trait HttpMessage: Clone {
    fn parts(&self) -> &MessageParts;

    fn parts_mut(&mut self) -> &mut MessageParts;

    fn protocol_version(&self) -> Version {
        self.parts().version
    }

    #[must_use]
    fn with_protocol_version(&self, version: Version) -> Self {
        let mut new = self.clone();
        new.parts_mut().version = version;
        new
    }

    fn headers(&self) -> &HeaderMap {
        &self.parts().headers
    }

    fn has_header(&self, name: &str) -> bool {
        self.headers().contains_key(name)
    }

    /// All values of header `name`, in order, decoded as UTF-8. Values holding other bytes
    /// are skipped.
    fn header(&self, name: &str) -> Vec<&str> {
        self.headers().get_all(name).iter().filter_map(|value| std::str::from_utf8(value.as_bytes()).ok()).collect()
    }

    /// All values of header `name` joined by a comma; empty when the header is absent.
    fn header_line(&self, name: &str) -> String {
        self.header(name).join(",")
    }

    /// Replaces every value of header `name` with `value`.
    fn with_header(&self, name: &str, value: &str) -> Result<Self, InvalidArgument> {
        let (name, value) = header_pair(name, value)?;
        let mut new = self.clone();
        new.parts_mut().headers.insert(name, value);
        Ok(new)
    }

    /// Appends `value` to header `name`, keeping existing values.
    fn with_added_header(&self, name: &str, value: &str) -> Result<Self, InvalidArgument> {
        let (name, value) = header_pair(name, value)?;
        let mut new = self.clone();
        new.parts_mut().headers.append(name, value);
        Ok(new)
    }

    #[must_use]
    fn without_header(&self, name: &str) -> Self {
        let mut new = self.clone();
        new.parts_mut().headers.remove(name);
        new
    }

    fn body(&self) -> &Body {
        &self.parts().body
    }

    /// Moves `body` into a new message; the replaced body is dropped with `self`.
    #[must_use]
    fn with_body(mut self, body: Body) -> Self {
        self.parts_mut().body = body;
        self
    }
}

pub(crate) fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), InvalidArgument> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| InvalidArgument::invalid_header(format!("name \"{name}\": {e}")))?;
    let header_value = HeaderValue::from_str(value)
        .map_err(|e| InvalidArgument::invalid_header(format!("value of \"{name}\": {e}")))?;
    Ok((header_name, header_value))
}

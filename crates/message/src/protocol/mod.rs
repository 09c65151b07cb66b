//! HTTP message values and their building blocks.
//!
//! - **Messages** ([`message`]): the [`HttpMessage`] capability set shared by
//!   [`ServerRequest`] and [`Response`], with the common [`MessageParts`]
//! - **Requests** ([`request`]): [`ServerRequest`] plus its parameter bags ([`params`])
//! - **Responses** ([`response`]): [`Response`] with status and reason phrase
//! - **Bodies** ([`body`]): [`Stream`], [`Body`] and the accepted [`BodySource`]s
//! - **Validation** ([`method`], [`error`]): the accepted method set and [`InvalidArgument`]
//!
//! All messages are immutable: every `with_*` call returns a new value.

mod error;
pub use error::InvalidArgument;

mod method;
pub use method::VALID_METHODS;
pub use method::parse_method;

mod message;
pub use message::HttpMessage;
pub use message::MessageParts;

mod params;
pub use params::Attributes;
pub use params::FileParams;
pub use params::Params;
pub use params::ServerParams;
pub use params::UploadError;
pub use params::UploadedFile;

mod request;
pub use request::ServerRequest;
pub use request::ServerRequestBuilder;
pub use request::UriSource;

mod response;
pub use response::Response;

pub mod body;
pub use body::Body;
pub use body::BodySource;
pub use body::Stream;

use thiserror::Error;

/// The single validation failure raised by message construction and mutation.
///
/// The variants only describe which argument was rejected; callers are expected to treat
/// them uniformly as an invalid argument and turn them into an error response.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidArgument {
    #[error("unsupported http method \"{method}\" provided")]
    UnsupportedMethod { method: String },

    #[error("invalid uri provided: {reason}")]
    InvalidUri { reason: String },

    #[error("invalid body stream: {reason}")]
    InvalidBody { reason: String },

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("invalid status code {code}; must be between 100 and 599")]
    InvalidStatus { code: u16 },
}

impl InvalidArgument {
    pub fn unsupported_method<S: ToString>(method: S) -> Self {
        Self::UnsupportedMethod { method: method.to_string() }
    }

    pub fn invalid_uri<S: ToString>(str: S) -> Self {
        Self::InvalidUri { reason: str.to_string() }
    }

    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn invalid_status(code: u16) -> Self {
        Self::InvalidStatus { code }
    }
}

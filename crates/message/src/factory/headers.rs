use http::HeaderMap;
use http::header::{HeaderName, HeaderValue};
use tracing::warn;

use crate::protocol::ServerParams;

const HTTP_PREFIX: &str = "HTTP_";
const CONTENT_PREFIX: &str = "CONTENT_";

/// Derives request headers from canonical server params.
///
/// `HTTP_ACCEPT_LANGUAGE` becomes `accept-language`. The `CONTENT_*` entries
/// (`CONTENT_TYPE`, `CONTENT_LENGTH`, `CONTENT_MD5`) carry no prefix in the environment
/// and map to `content-*`. Empty values are skipped, as are entries that do not form a
/// valid header.
pub fn marshal_headers(server: &ServerParams) -> HeaderMap {
    let mut headers = HeaderMap::new();

    for (key, value) in server {
        if value.is_empty() {
            continue;
        }

        let name = match key.strip_prefix(HTTP_PREFIX) {
            Some(name) => name,
            None if key.starts_with(CONTENT_PREFIX) => key.as_str(),
            None => continue,
        };
        let name = name.replace('_', "-").to_ascii_lowercase();

        match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                headers.append(name, value);
            }
            _ => warn!(key = %key, "skip server param that is not a valid header"),
        }
    }

    headers
}

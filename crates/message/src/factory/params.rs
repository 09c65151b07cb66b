//! Parsing of query strings, cookie headers and request bodies into parameter bags.

use mime::Mime;
use serde_json::Value;
use tracing::{debug, warn};

use crate::protocol::Params;

/// Parses a query string, honoring bracketed nesting (`a[b]=1`, `a[]=1`).
///
/// Input that cannot be read as a nested structure falls back to flat pairs.
pub fn parse_query(query: &str) -> Params {
    let query = query.trim_start_matches('?');
    if query.is_empty() {
        return Params::new();
    }

    match serde_qs::from_str::<Params>(query) {
        Ok(params) => params,
        Err(e) => {
            debug!(cause = %e, "query is not bracket structured, fall back to flat pairs");
            parse_flat(query)
        }
    }
}

/// Parses a `Cookie` header (`a=1; b=2`). Values are url-decoded; the first occurrence of a
/// name wins.
pub fn parse_cookies(header: &str) -> Params {
    let mut cookies = Params::new();

    for pair in header.split(';') {
        let Some((name, value)) = pair.split_once('=') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() || cookies.contains_key(name) {
            continue;
        }

        let value = decode_component(value.trim());
        cookies.insert(name.to_string(), Value::String(value));
    }

    cookies
}

/// Parses a request body according to its content type.
///
/// `application/x-www-form-urlencoded` bodies are read like query strings, JSON objects
/// (`application/json`, `application/*+json`) become their fields. Anything else yields
/// no params.
pub fn parse_body(content_type: Option<&str>, body: &[u8]) -> Params {
    let Some(mime) = content_type.and_then(|content_type| content_type.parse::<Mime>().ok()) else {
        return Params::new();
    };

    if mime.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() {
        return match std::str::from_utf8(body) {
            Ok(form) => parse_query(form),
            Err(e) => {
                warn!(cause = %e, "form body is not utf8");
                Params::new()
            }
        };
    }

    if is_json(&mime) {
        return match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(params)) => params,
            Ok(_) => {
                debug!("json body is not an object, no body params");
                Params::new()
            }
            Err(e) => {
                warn!(cause = %e, "invalid json body");
                Params::new()
            }
        };
    }

    Params::new()
}

/// Returns true when the content type calls for body params to be parsed.
pub fn is_parsable_body(content_type: &str) -> bool {
    content_type.parse::<Mime>().is_ok_and(|mime| {
        mime.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() || is_json(&mime)
    })
}

fn is_json(mime: &Mime) -> bool {
    mime.type_() == mime::APPLICATION && (mime.subtype() == mime::JSON || mime.suffix() == Some(mime::JSON))
}

fn parse_flat(query: &str) -> Params {
    serde_urlencoded::from_str::<Vec<(String, String)>>(query)
        .unwrap_or_default()
        .into_iter()
        .map(|(name, value)| (name, Value::String(value)))
        .collect()
}

fn decode_component(value: &str) -> String {
    let encoded = value.replace('&', "%26").replace('=', "%3D");
    serde_urlencoded::from_str::<Vec<(String, String)>>(&format!("v={encoded}"))
        .ok()
        .and_then(|mut pairs| pairs.pop())
        .map_or_else(|| value.to_string(), |(_name, decoded)| decoded)
}

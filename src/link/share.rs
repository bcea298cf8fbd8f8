//! Share-link assembly and query-parameter extraction.
//!
//! Tokens always travel under the `u` query key.

use std::borrow::Cow;

use super::payload::Personalization;

/// Query key carrying the personalization token.
pub const TOKEN_PARAM: &str = "u";

/// Message prefixed to links shared over WhatsApp.
pub const DEFAULT_SHARE_MESSAGE: &str = "I made a digital ritual for you. Open this: \n";

/// Builds `origin + path + "?u=" + token`.
///
/// A trailing `/` on `origin` is dropped and a missing leading `/` on
/// `path` is added. An empty token produces the bare page link.
#[must_use]
pub fn share_link(origin: &str, path: &str, token: &str) -> String {
    let origin = origin.trim_end_matches('/');
    let path: Cow<'_, str> = if path.is_empty() || path.starts_with('/') {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(format!("/{path}"))
    };

    if token.is_empty() {
        format!("{origin}{path}")
    } else {
        format!("{origin}{path}?{TOKEN_PARAM}={token}")
    }
}

/// Extracts the token from a full URL or a bare query string.
///
/// The first `u` parameter wins. Its value is form-decoded (`+` is a
/// space, `%XX` escapes are expanded). Returns `None` when the parameter
/// is missing, empty, or not valid percent-encoded UTF-8.
#[must_use]
pub fn token_from_query(input: &str) -> Option<String> {
    let without_fragment = input.split_once('#').map_or(input, |(head, _)| head);
    let query = without_fragment
        .split_once('?')
        .map_or(without_fragment, |(_, query)| query);

    let raw = query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        (key == TOKEN_PARAM).then_some(value)
    })?;

    let spaced = raw.replace('+', " ");
    let value = urlencoding::decode(&spaced).ok()?;
    if value.is_empty() {
        None
    } else {
        Some(value.into_owned())
    }
}

/// Builds a `wa.me` link that shares `link` prefixed by `message`.
#[must_use]
pub fn whatsapp_share_url(message: &str, link: &str) -> String {
    format!(
        "https://wa.me/?text={}{}",
        urlencoding::encode(message),
        urlencoding::encode(link)
    )
}

/// Resolves the payload carried by `query`, or `fallback` when the token is
/// absent or does not decode.
pub fn resolve_or<P, F>(query: Option<&str>, fallback: F) -> P
where
    P: Personalization,
    F: FnOnce() -> P,
{
    query
        .and_then(token_from_query)
        .and_then(|token| P::decode(&token))
        .unwrap_or_else(fallback)
}

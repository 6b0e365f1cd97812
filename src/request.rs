//! Request extraction adapter
//!
//! Locates a candidate token string in a transport-level request and hands it
//! to the parser. No validation happens here. The HTTP framework stays on the
//! caller's side of the [`TokenSource`] trait: anything that can surface an
//! Authorization header and named request parameters can feed tokens in.

use crate::error::{RequestError, Result};
use crate::parser::Parser;
use crate::token::Token;

/// Parameter name checked when no bearer header is present
const ACCESS_TOKEN_PARAM: &str = "access_token";

/// A request-like object the adapter can search for a token
pub trait TokenSource {
    /// The Authorization header value, if present
    fn authorization_header(&self) -> Option<&str>;

    /// A form, body, or query parameter by name
    fn parameter(&self, name: &str) -> Option<&str>;
}

/// Find a token in the request and parse it
///
/// Checks the Authorization header for a case-insensitive `Bearer ` prefix
/// first, then falls back to the `access_token` parameter. Fails with
/// [`RequestError::NoToken`] when neither is present.
pub fn parse_from_request<S, F>(
    source: &S,
    parser: &Parser,
    key_fn: F,
) -> std::result::Result<Token, RequestError>
where
    S: TokenSource,
    F: FnOnce(&Token) -> Result<Vec<u8>>,
{
    if let Some(header) = source.authorization_header() {
        if let (Some(prefix), Some(rest)) = (header.get(..7), header.get(7..)) {
            // The remainder is parsed as-is; an empty remainder surfaces as
            // a malformed-token error rather than falling through
            if prefix.eq_ignore_ascii_case("bearer ") {
                return parser.parse(rest, key_fn).map_err(RequestError::from);
            }
        }
    }

    if let Some(token_string) = source.parameter(ACCESS_TOKEN_PARAM) {
        return parser.parse(token_string, key_fn).map_err(RequestError::from);
    }

    Err(RequestError::NoToken)
}

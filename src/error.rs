//! Error types for token processing
//!
//! Two error surfaces exist. [`Error`] covers the mechanical failures of the
//! building blocks: segment decoding, JSON serialization, signing primitives,
//! and key resolution. [`ValidationError`] is the parse-time aggregate: a set
//! of independent failure flags that can co-occur, so callers can distinguish
//! "signature fine but expired" from "signature bad".

use thiserror::Error;

use crate::token::Token;

/// Mechanical errors from codec, serialization, signing, and key resolution
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Base64URL decoding failed (invalid characters or invalid length)
    #[error("base64url decoding failed: {0}")]
    InvalidBase64(String),

    /// JSON parsing failed while decoding a header or claims segment
    #[error("JSON parsing failed: {0}")]
    InvalidJson(String),

    /// JSON serialization failed while building a signing string
    #[error("JSON serialization failed: {0}")]
    Serialization(String),

    /// The signing primitive rejected the operation
    #[error("signing failed: {0}")]
    Signing(String),

    /// The key is unusable for the selected algorithm
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Signature present and checkable but does not match
    #[error("signature verification failed")]
    SignatureInvalid,

    /// The key-resolution callback could not supply a key
    #[error("{0}")]
    KeyResolution(String),
}

/// Result type alias for webtoken operations
pub type Result<T> = std::result::Result<T, Error>;

/// Aggregated outcome of a failed parse
///
/// Each flag is an independent failure category. Structural failures
/// (`malformed`, `unverifiable`) terminate the pipeline at their stage and
/// never combine with later flags; the temporal flags and `signature_invalid`
/// are checked against the same token and may all be set at once.
///
/// The partially-constructed [`Token`] travels inside the error so callers
/// can still inspect header and claims. The single exception is a wrong
/// segment count, where no token exists yet and [`token`](Self::token)
/// returns `None`.
#[derive(Debug, Default, Clone)]
pub struct ValidationError {
    /// Structurally invalid input (segment count, base64, JSON)
    pub malformed: bool,
    /// Verification cannot proceed (unknown/missing algorithm, key failure)
    pub unverifiable: bool,
    /// Signature check ran and failed
    pub signature_invalid: bool,
    /// Current time is past the `exp` claim
    pub expired: bool,
    /// Current time is before the `nbf` claim
    pub not_valid_yet: bool,

    message: String,
    token: Option<Box<Token>>,
}

impl ValidationError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self {
            malformed: true,
            message: message.into(),
            ..Self::default()
        }
    }

    pub(crate) fn unverifiable(message: impl Into<String>) -> Self {
        Self {
            unverifiable: true,
            message: message.into(),
            ..Self::default()
        }
    }

    pub(crate) fn with_token(mut self, token: Token) -> Self {
        self.token = Some(Box::new(token));
        self
    }

    pub(crate) fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    /// True iff no failure flag is set
    pub fn valid(&self) -> bool {
        !(self.malformed
            || self.unverifiable
            || self.signature_invalid
            || self.expired
            || self.not_valid_yet)
    }

    /// The failure message, empty if none was recorded
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The partially-constructed token, if one was built before failure
    pub fn token(&self) -> Option<&Token> {
        self.token.as_deref()
    }

    /// Consume the error and take the partial token
    pub fn into_token(self) -> Option<Token> {
        self.token.map(|t| *t)
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.message.is_empty() {
            write!(f, "token is invalid")
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors from the request extraction adapter
#[derive(Error, Debug)]
pub enum RequestError {
    /// Neither an Authorization bearer header nor an `access_token`
    /// parameter was found
    #[error("no token present in request")]
    NoToken,

    /// The located token string failed to parse or validate
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

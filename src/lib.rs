//! # webtoken - Compact signed-claims tokens
//!
//! **webtoken** implements a compact token format: two JSON objects (header
//! and claims), each base64url-encoded without padding, joined by `.` and
//! followed by a detached signature segment. Tokens carry claims between
//! parties with integrity verification and time-bounded validity.
//!
//! The crate is built around the token lifecycle state machine:
//!
//! ```text
//! Token::new(method)            construct: header {typ, alg} + claims
//!     │ .signing_string()       deterministic two-segment encoding
//!     │ .signed_string(key)     append the method's signature
//!     ▼
//! "xxxxx.yyyyy.zzzzz"
//!     │ Parser::parse(s, key_fn)
//!     ▼
//! segment split → header decode → claims decode → alg resolution
//!     → key resolution → temporal checks + signature check → Token
//! ```
//!
//! Structural and resolution failures terminate the pipeline immediately;
//! the temporal and signature checks accumulate into one [`ValidationError`]
//! whose flags ([`expired`](ValidationError::expired),
//! [`signature_invalid`](ValidationError::signature_invalid), ...) are
//! independently testable, so "signature fine but expired" and "signature
//! bad" stay distinguishable. A failed parse still hands back the partial
//! token through the error.
//!
//! ## Quick start
//!
//! ```
//! use webtoken::{get_signing_method, Parser, Token};
//!
//! let method = get_signing_method("HS256").unwrap();
//! let signed = Token::new(method)
//!     .with_claim("sub", "user123")
//!     .signed_string(b"secret")
//!     .unwrap();
//!
//! let token = Parser::new()
//!     .parse(&signed, |_token| Ok(b"secret".to_vec()))
//!     .unwrap();
//! assert!(token.is_valid());
//! assert_eq!(token.claim_str("sub"), Some("user123"));
//! ```
//!
//! ## Pluggable algorithms
//!
//! Signing algorithms are consumed through the [`SigningMethod`] capability
//! and resolved by `alg` name from a process-wide registry. HS256, HS384,
//! and HS512 ship built in; call [`register_signing_method`] at startup to
//! add more. The registry is effectively immutable after initialization, so
//! concurrent parsing takes only read locks.
//!
//! ## Key resolution
//!
//! [`Parser::parse`] takes a callback receiving the parsed-but-unverified
//! token, so the verification key can be chosen from header fields such as
//! `kid` or from the algorithm name. The callback runs exactly once per
//! parse, after algorithm resolution and before any validation check.
//!
//! ## Time source
//!
//! Temporal validation (`exp`, `nbf`) reads the parser's clock.
//! [`Parser::with_clock`] injects a replacement time source for
//! deterministic testing or skewed environments.

pub mod algorithm;
pub mod error;
pub mod parser;
pub mod request;
pub mod token;
pub mod utils;

pub use algorithm::{get_signing_method, register_signing_method, SigningMethod};
pub use error::{Error, RequestError, Result, ValidationError};
pub use parser::{parse, Clock, Parser};
pub use request::{parse_from_request, TokenSource};
pub use token::{ClaimMap, Token};

//! Token parsing and validation
//!
//! [`Parser::parse`] runs the lifecycle state machine: split the wire string
//! into three segments, decode header and claims, resolve the signing method
//! from the registry, resolve the verification key through the caller's
//! callback, then check temporal claims and the signature.
//!
//! Structural failures (segment count, base64, JSON) and resolution failures
//! (algorithm, key) terminate immediately: nothing downstream can proceed
//! without a decodable token, a method, and a key. Once both are known, the
//! temporal and signature checks are independent properties of the same token
//! and accumulate into one [`ValidationError`], so a caller can tell
//! "signature fine but expired" apart from "signature bad".

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::algorithm::get_signing_method;
use crate::error::{Error, Result, ValidationError};
use crate::token::{ClaimMap, Token};
use crate::utils::base64url;

/// Clock injected into the parser, returning current Unix time in seconds
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

fn system_clock() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Token parser with an injectable time source
///
/// The key-resolution callback passed to [`parse`](Self::parse) receives the
/// parsed but unverified token, so the key can be selected from header fields
/// such as `kid` or from the algorithm name. It is invoked exactly once per
/// parse, after algorithm resolution and before any validation check.
#[derive(Clone)]
pub struct Parser {
    clock: Clock,
}

impl Parser {
    /// Parser reading the system clock
    pub fn new() -> Self {
        Self {
            clock: Arc::new(system_clock),
        }
    }

    /// Parser with a replacement time source, for deterministic validation
    pub fn with_clock<C>(clock: C) -> Self
    where
        C: Fn() -> i64 + Send + Sync + 'static,
    {
        Self {
            clock: Arc::new(clock),
        }
    }

    /// Parse, validate, and return a token
    ///
    /// On failure the [`ValidationError`] carries the partially-constructed
    /// token (with `raw` set) for inspection; the single exception is a wrong
    /// segment count, where no token is constructed at all.
    pub fn parse<F>(&self, token_string: &str, key_fn: F) -> std::result::Result<Token, ValidationError>
    where
        F: FnOnce(&Token) -> Result<Vec<u8>>,
    {
        let parts: Vec<&str> = token_string.split('.').collect();
        if parts.len() != 3 {
            debug!(segments = parts.len(), "rejecting token with wrong segment count");
            return Err(ValidationError::malformed(
                "token contains an invalid number of segments",
            ));
        }

        let mut token = Token::from_raw(token_string);
        token.set_signature(parts[2]);

        // Header
        match decode_map(parts[0]) {
            Ok(header) => token.set_header(header),
            Err(e) => {
                debug!(error = %e, "header segment undecodable");
                return Err(ValidationError::malformed(e.to_string()).with_token(token));
            }
        }

        // Claims
        match decode_map(parts[1]) {
            Ok(claims) => token.set_claims(claims),
            Err(e) => {
                debug!(error = %e, "claims segment undecodable");
                return Err(ValidationError::malformed(e.to_string()).with_token(token));
            }
        }

        // Signing method lookup
        let method = match token.alg() {
            Some(alg) => match get_signing_method(alg) {
                Some(method) => {
                    token.set_method(method.clone());
                    method
                }
                None => {
                    debug!(alg, "no signing method registered for alg");
                    return Err(ValidationError::unverifiable(
                        "signing method (alg) is unavailable",
                    )
                    .with_token(token));
                }
            },
            None => {
                debug!("header carries no string alg entry");
                return Err(
                    ValidationError::unverifiable("signing method (alg) is unspecified")
                        .with_token(token),
                );
            }
        };

        // Key lookup
        let key = match key_fn(&token) {
            Ok(key) => key,
            Err(e) => {
                debug!(error = %e, "key resolution failed");
                return Err(ValidationError::unverifiable(e.to_string()).with_token(token));
            }
        };

        // Temporal checks accumulate; they never short-circuit the
        // signature check below.
        let mut verr = ValidationError::default();
        let now = (self.clock)();

        if let Some(exp) = token.claim_f64("exp") {
            if now > exp as i64 {
                verr.expired = true;
                verr.set_message("token is expired");
            }
        }
        if let Some(nbf) = token.claim_f64("nbf") {
            if now < nbf as i64 {
                verr.not_valid_yet = true;
                verr.set_message("token is not valid yet");
            }
        }

        // Signature check over the raw first two segments
        let signing_input_len = parts[0].len() + 1 + parts[1].len();
        let signing_input = &token_string[..signing_input_len];
        if let Err(e) = method.verify(signing_input, parts[2], &key) {
            debug!(error = %e, "signature verification failed");
            verr.signature_invalid = true;
            verr.set_message(e.to_string());
        }

        if verr.valid() {
            token.mark_valid();
            Ok(token)
        } else {
            Err(verr.with_token(token))
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse with the system clock
///
/// Convenience wrapper over [`Parser::parse`].
pub fn parse<F>(token_string: &str, key_fn: F) -> std::result::Result<Token, ValidationError>
where
    F: FnOnce(&Token) -> Result<Vec<u8>>,
{
    Parser::new().parse(token_string, key_fn)
}

fn decode_map(segment: &str) -> Result<ClaimMap> {
    let bytes = base64url::decode_segment(segment)?;
    serde_json::from_slice(&bytes).map_err(|e| Error::InvalidJson(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::get_signing_method;
    use crate::error::Error;
    use serde_json::json;
    use std::cell::Cell;

    const SECRET: &[u8] = b"test-secret";

    fn signed_token(claims: serde_json::Value) -> String {
        let mut token = Token::new(get_signing_method("HS256").unwrap());
        if let serde_json::Value::Object(map) = claims {
            *token.claims_mut() = map;
        }
        token.signed_string(SECRET).unwrap()
    }

    fn fixed(now: i64) -> Parser {
        Parser::with_clock(move || now)
    }

    fn key(_token: &Token) -> Result<Vec<u8>> {
        Ok(SECRET.to_vec())
    }

    #[test]
    fn test_parse_valid_token() {
        let raw = signed_token(json!({"sub": "1234567890", "exp": 2000000000}));
        let token = fixed(1500000000).parse(&raw, key).unwrap();

        assert!(token.is_valid());
        assert_eq!(token.raw(), raw);
        assert_eq!(token.claim_str("sub"), Some("1234567890"));
        assert_eq!(token.alg(), Some("HS256"));
        assert!(!token.signature().is_empty());
    }

    #[test]
    fn test_wrong_segment_count_skips_key_fn() {
        let called = Cell::new(false);
        let key_fn = |_: &Token| {
            called.set(true);
            Ok(SECRET.to_vec())
        };

        for input in ["one.two", "a.b.c.d", "", "justone"] {
            let err = Parser::new().parse(input, key_fn).unwrap_err();
            assert!(err.malformed, "expected malformed for {input:?}");
            assert!(err.token().is_none());
        }
        assert!(!called.get(), "key_fn must not run on malformed input");
    }

    #[test]
    fn test_undecodable_header_returns_partial_token() {
        let raw = signed_token(json!({"sub": "x"}));
        let mangled = format!("!!!!.{}", raw.split_once('.').unwrap().1);

        let err = Parser::new().parse(&mangled, key).unwrap_err();
        assert!(err.malformed);
        assert!(
            err.message().starts_with("base64url decoding failed"),
            "message: {}",
            err.message()
        );
        let partial = err.token().expect("partial token attached");
        assert_eq!(partial.raw(), mangled);
    }

    #[test]
    fn test_unparsable_claims_json() {
        let header = base64url::encode_segment(br#"{"alg":"HS256","typ":"JWT"}"#);
        let claims = base64url::encode_segment(b"not json");
        let raw = format!("{header}.{claims}.c2ln");

        let err = Parser::new().parse(&raw, key).unwrap_err();
        assert!(err.malformed);
        assert!(
            err.message().starts_with("JSON parsing failed"),
            "message: {}",
            err.message()
        );
        // Header was decoded before the failure
        let partial = err.token().unwrap();
        assert_eq!(partial.header().get("alg"), Some(&json!("HS256")));
    }

    #[test]
    fn test_missing_alg_is_unverifiable() {
        let header = base64url::encode_segment(br#"{"typ":"JWT"}"#);
        let claims = base64url::encode_segment(br#"{"sub":"x"}"#);
        let raw = format!("{header}.{claims}.c2ln");

        let called = Cell::new(false);
        let err = Parser::new()
            .parse(&raw, |_| {
                called.set(true);
                Ok(SECRET.to_vec())
            })
            .unwrap_err();

        assert!(err.unverifiable);
        assert!(!err.signature_invalid);
        assert_eq!(err.message(), "signing method (alg) is unspecified");
        assert!(!called.get());
    }

    #[test]
    fn test_non_string_alg_is_unverifiable() {
        let header = base64url::encode_segment(br#"{"alg":42}"#);
        let claims = base64url::encode_segment(br#"{}"#);
        let raw = format!("{header}.{claims}.c2ln");

        let err = Parser::new().parse(&raw, key).unwrap_err();
        assert!(err.unverifiable);
        assert_eq!(err.message(), "signing method (alg) is unspecified");
    }

    #[test]
    fn test_unregistered_alg_is_unavailable() {
        let header = base64url::encode_segment(br#"{"alg":"XX999"}"#);
        let claims = base64url::encode_segment(br#"{}"#);
        let raw = format!("{header}.{claims}.c2ln");

        let err = Parser::new().parse(&raw, key).unwrap_err();
        assert!(err.unverifiable);
        assert_eq!(err.message(), "signing method (alg) is unavailable");
        assert!(err.token().is_some());
    }

    #[test]
    fn test_key_fn_error_is_unverifiable() {
        let raw = signed_token(json!({"sub": "x"}));
        let err = Parser::new()
            .parse(&raw, |_| {
                Err(Error::KeyResolution("key store offline".to_string()))
            })
            .unwrap_err();

        assert!(err.unverifiable);
        assert_eq!(err.message(), "key store offline");
    }

    #[test]
    fn test_key_fn_sees_header_and_claims() {
        let raw = signed_token(json!({"kid_hint": "primary"}));
        let token = Parser::new()
            .parse(&raw, |t| {
                assert_eq!(t.alg(), Some("HS256"));
                assert_eq!(t.claim_str("kid_hint"), Some("primary"));
                Ok(SECRET.to_vec())
            })
            .unwrap();
        assert!(token.is_valid());
    }

    #[test]
    fn test_expired_token() {
        let raw = signed_token(json!({"sub": "1234567890", "exp": 1300819380}));
        let err = fixed(1500000000).parse(&raw, key).unwrap_err();

        assert!(err.expired);
        assert!(!err.signature_invalid);
        assert!(!err.valid());
        assert_eq!(err.message(), "token is expired");
        // Structurally fine: the token is attached with decoded claims
        assert_eq!(
            err.token().unwrap().claim_f64("exp"),
            Some(1300819380.0)
        );
    }

    #[test]
    fn test_not_valid_yet() {
        let raw = signed_token(json!({"nbf": 2000000000}));
        let err = fixed(1500000000).parse(&raw, key).unwrap_err();

        assert!(err.not_valid_yet);
        assert!(!err.expired);
        assert_eq!(err.message(), "token is not valid yet");
    }

    #[test]
    fn test_exp_boundary_is_inclusive() {
        // now == exp is not yet expired
        let raw = signed_token(json!({"exp": 1500000000}));
        assert!(fixed(1500000000).parse(&raw, key).unwrap().is_valid());
        assert!(fixed(1500000001).parse(&raw, key).is_err());
    }

    #[test]
    fn test_non_numeric_temporal_claims_are_skipped() {
        let raw = signed_token(json!({"exp": "tomorrow", "nbf": "yesterday"}));
        let token = fixed(1500000000).parse(&raw, key).unwrap();
        assert!(token.is_valid());
    }

    #[test]
    fn test_expired_and_tampered_combine() {
        let raw = signed_token(json!({"exp": 1300819380}));
        // Tamper with the signature segment
        let mut parts: Vec<String> = raw.split('.').map(str::to_string).collect();
        parts[2] = format!("x{}", &parts[2][1..]);
        let tampered = parts.join(".");

        let err = fixed(1500000000).parse(&tampered, key).unwrap_err();
        assert!(err.expired);
        assert!(err.signature_invalid);
    }

    #[test]
    fn test_tampered_claims_flip_signature_only() {
        let raw = signed_token(json!({"aa": "bb"}));
        let parts: Vec<&str> = raw.split('.').collect();
        // Re-encode altered claims without re-signing
        let claims = base64url::encode_segment(br#"{"aa":"cc"}"#);
        let tampered = format!("{}.{}.{}", parts[0], claims, parts[2]);

        let err = Parser::new().parse(&tampered, key).unwrap_err();
        assert!(err.signature_invalid);
        assert!(!err.malformed);
        assert!(!err.expired);
        // Structural decode still succeeded
        assert_eq!(err.token().unwrap().claim_str("aa"), Some("cc"));
    }

    #[test]
    fn test_failed_token_is_not_valid() {
        let raw = signed_token(json!({"exp": 1}));
        let err = fixed(1500000000).parse(&raw, key).unwrap_err();
        assert!(!err.into_token().unwrap().is_valid());
    }

    #[test]
    fn test_free_function_parse() {
        let raw = signed_token(json!({"sub": "x"}));
        assert!(parse(&raw, key).unwrap().is_valid());
    }
}

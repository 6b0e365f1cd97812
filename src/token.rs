//! The token entity
//!
//! A [`Token`] is created once per signing or parsing operation. Constructed
//! tokens carry exactly the `{typ, alg}` header plus caller-supplied claims
//! and an empty raw string; parsed tokens additionally carry the original
//! encoded input and the signature segment. The `valid` flag is set exactly
//! once, at the end of a fully clean parse.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::algorithm::SigningMethod;
use crate::error::{Error, Result};
use crate::utils::base64url;

/// Header and claims maps: string keys to arbitrary JSON values
///
/// `serde_json`'s default map is ordered lexicographically by key, so
/// re-serializing an unchanged map reproduces byte-identical output.
pub type ClaimMap = Map<String, Value>;

/// A signed-claims token, either freshly constructed or decoded from the wire
#[derive(Clone, Default)]
pub struct Token {
    raw: String,
    header: ClaimMap,
    claims: ClaimMap,
    method: Option<Arc<dyn SigningMethod>>,
    signature: String,
    valid: bool,
}

impl Token {
    /// Create an unsigned token for the given method
    ///
    /// The header is populated with `typ: "JWT"` and the method's `alg` name.
    pub fn new(method: Arc<dyn SigningMethod>) -> Self {
        let mut header = ClaimMap::new();
        header.insert("typ".to_string(), Value::String("JWT".to_string()));
        header.insert("alg".to_string(), Value::String(method.alg().to_string()));

        Self {
            header,
            method: Some(method),
            ..Self::default()
        }
    }

    /// The original encoded string, empty unless this token was parsed
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The header map
    pub fn header(&self) -> &ClaimMap {
        &self.header
    }

    /// The claims map
    pub fn claims(&self) -> &ClaimMap {
        &self.claims
    }

    /// Mutable claims access, for populating a constructed token
    pub fn claims_mut(&mut self) -> &mut ClaimMap {
        &mut self.claims
    }

    /// Insert a claim, builder style
    pub fn with_claim(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.claims.insert(name.into(), value.into());
        self
    }

    /// The resolved signing method, absent only on tokens that failed
    /// algorithm resolution
    pub fn method(&self) -> Option<&Arc<dyn SigningMethod>> {
        self.method.as_ref()
    }

    /// The encoded signature segment, populated only by parsing
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// True iff the token passed every validation check
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Look up a claim value
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// Look up a claim as a string
    pub fn claim_str(&self, name: &str) -> Option<&str> {
        self.claims.get(name).and_then(Value::as_str)
    }

    /// Look up a claim as a number, following the JSON numeric convention
    /// used for `exp` and `nbf`
    pub fn claim_f64(&self, name: &str) -> Option<f64> {
        self.claims.get(name).and_then(Value::as_f64)
    }

    /// The `alg` header entry, if it is a string
    pub fn alg(&self) -> Option<&str> {
        self.header.get("alg").and_then(Value::as_str)
    }

    /// Build the deterministic signing string: the encoded header and claims
    /// segments joined by `.`
    pub fn signing_string(&self) -> Result<String> {
        let header_json =
            serde_json::to_vec(&self.header).map_err(|e| Error::Serialization(e.to_string()))?;
        let claims_json =
            serde_json::to_vec(&self.claims).map_err(|e| Error::Serialization(e.to_string()))?;

        Ok(format!(
            "{}.{}",
            base64url::encode_segment(&header_json),
            base64url::encode_segment(&claims_json)
        ))
    }

    /// Produce the complete signed wire string for this token
    pub fn signed_string(&self, key: &[u8]) -> Result<String> {
        let method = self
            .method
            .as_ref()
            .ok_or_else(|| Error::Signing("no signing method resolved".to_string()))?;

        let sstr = self.signing_string()?;
        let sig = method
            .sign(&sstr, key)
            .map_err(|e| Error::Signing(e.to_string()))?;

        Ok(format!("{sstr}.{sig}"))
    }

    // Parser-side constructors and mutators. Kept crate-private so the raw
    // string and valid flag stay immutable from the outside.

    pub(crate) fn from_raw(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            ..Self::default()
        }
    }

    pub(crate) fn set_header(&mut self, header: ClaimMap) {
        self.header = header;
    }

    pub(crate) fn set_claims(&mut self, claims: ClaimMap) {
        self.claims = claims;
    }

    pub(crate) fn set_method(&mut self, method: Arc<dyn SigningMethod>) {
        self.method = Some(method);
    }

    pub(crate) fn set_signature(&mut self, signature: &str) {
        self.signature = signature.to_string();
    }

    pub(crate) fn mark_valid(&mut self) {
        self.valid = true;
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("raw", &self.raw)
            .field("header", &self.header)
            .field("claims", &self.claims)
            .field("alg", &self.method.as_ref().map(|m| m.alg()))
            .field("signature", &self.signature)
            .field("valid", &self.valid)
            .finish()
    }
}

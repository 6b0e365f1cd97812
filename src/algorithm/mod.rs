//! Signing algorithm dispatch
//!
//! Algorithms are consumed through the narrow [`SigningMethod`] capability
//! and resolved by name from a process-wide registry. The registry is seeded
//! with the built-in HMAC family and is read-mostly: call
//! [`register_signing_method`] during startup for additional algorithms, then
//! treat it as immutable. Parsing only ever takes read locks.

pub mod hmac;

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

use crate::error::Result;

/// A named sign/verify capability
///
/// `signing_input` is the first two wire segments joined by `.`; signatures
/// cross this boundary in their encoded base64url form.
pub trait SigningMethod: Send + Sync {
    /// The algorithm identifier carried in the `alg` header (e.g. "HS256")
    fn alg(&self) -> &'static str;

    /// Produce a base64url-encoded signature over the signing input
    fn sign(&self, signing_input: &str, key: &[u8]) -> Result<String>;

    /// Check an encoded signature against the signing input
    fn verify(&self, signing_input: &str, signature: &str, key: &[u8]) -> Result<()>;
}

static METHODS: Lazy<RwLock<HashMap<&'static str, Arc<dyn SigningMethod>>>> = Lazy::new(|| {
    let mut methods: HashMap<&'static str, Arc<dyn SigningMethod>> = HashMap::new();
    for method in [
        Arc::new(hmac::HS256) as Arc<dyn SigningMethod>,
        Arc::new(hmac::HS384),
        Arc::new(hmac::HS512),
    ] {
        methods.insert(method.alg(), method);
    }
    RwLock::new(methods)
});

/// Register a signing method under its `alg` name
///
/// Intended to run once per algorithm implementation at process startup.
/// Re-registering a name replaces the previous entry.
pub fn register_signing_method(method: Arc<dyn SigningMethod>) {
    let mut methods = METHODS.write().expect("signing method registry poisoned");
    methods.insert(method.alg(), method);
}

/// Look up a signing method by `alg` name
pub fn get_signing_method(alg: &str) -> Option<Arc<dyn SigningMethod>> {
    let methods = METHODS.read().expect("signing method registry poisoned");
    methods.get(alg).cloned()
}

//! HMAC-SHA signing methods (HS256, HS384, HS512)

use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};

use crate::algorithm::SigningMethod;
use crate::error::{Error, Result};
use crate::utils::base64url;

type HmacSha256 = Hmac<Sha256>;
type HmacSha384 = Hmac<Sha384>;
type HmacSha512 = Hmac<Sha512>;

/// HS256 (HMAC with SHA-256)
pub struct HS256;

/// HS384 (HMAC with SHA-384)
pub struct HS384;

/// HS512 (HMAC with SHA-512)
pub struct HS512;

macro_rules! hmac_method {
    ($name:ident, $alg:literal, $mac:ty) => {
        impl SigningMethod for $name {
            fn alg(&self) -> &'static str {
                $alg
            }

            fn sign(&self, signing_input: &str, key: &[u8]) -> Result<String> {
                let mut mac = <$mac>::new_from_slice(key)
                    .map_err(|_| Error::InvalidKey("invalid HMAC key".to_string()))?;
                mac.update(signing_input.as_bytes());
                Ok(base64url::encode_segment(&mac.finalize().into_bytes()))
            }

            fn verify(&self, signing_input: &str, signature: &str, key: &[u8]) -> Result<()> {
                let provided = base64url::decode_segment(signature)?;

                let mut mac = <$mac>::new_from_slice(key)
                    .map_err(|_| Error::InvalidKey("invalid HMAC key".to_string()))?;
                mac.update(signing_input.as_bytes());
                let expected = mac.finalize().into_bytes();

                // Length check first, then constant-time comparison
                if provided.len() == expected.len() && constant_time_eq(&provided, &expected) {
                    Ok(())
                } else {
                    Err(Error::SignatureInvalid)
                }
            }
        }
    };
}

hmac_method!(HS256, "HS256", HmacSha256);
hmac_method!(HS384, "HS384", HmacSha384);
hmac_method!(HS512, "HS512", HmacSha512);

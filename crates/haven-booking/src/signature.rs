//! # Callback Signature
//!
//! HMAC-SHA512 over the signed transaction fields, lowercase hex.
//!
//! ```text
//! provided hmac ──┐
//!                 ├── constant-time compare ──► valid / SignatureMismatch
//! HMAC-SHA512(secret, concat(SIGNED_FIELDS)) ──┘
//! ```

use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use sha2::Sha512;

use crate::callback::TransactionCallback;
use crate::error::{BookingError, BookingResult};

type HmacSha512 = Hmac<Sha512>;

/// Signs and verifies gateway callbacks with the shared secret.
#[derive(Clone)]
pub struct CallbackSigner {
    /// Keyed once; cloned per signature.
    mac: HmacSha512,
}

impl std::fmt::Debug for CallbackSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackSigner").finish_non_exhaustive()
    }
}

impl CallbackSigner {
    pub fn new(secret: impl AsRef<[u8]>) -> BookingResult<Self> {
        let mac = HmacSha512::new_from_slice(secret.as_ref())
            .map_err(|e| BookingError::InvalidInput(format!("callback secret: {}", e)))?;
        Ok(CallbackSigner { mac })
    }

    /// Lowercase hex HMAC of the callback's signing payload.
    pub fn sign(&self, callback: &TransactionCallback) -> String {
        let mut mac = self.mac.clone();
        mac.update(callback.signing_payload().as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// True when `provided` matches the recomputed signature.
    pub fn verify(&self, callback: &TransactionCallback, provided: &str) -> bool {
        let expected = self.sign(callback);
        let provided = provided.trim().to_ascii_lowercase();
        constant_time_eq(expected.as_bytes(), provided.as_bytes())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

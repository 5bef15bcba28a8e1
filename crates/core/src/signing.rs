//! HMAC-SHA256 key ring for signing envelopes.
//!
//! The current key signs; the current key and any retired keys verify, so a
//! secret can be rotated without logging everybody out at once.

use std::fmt;
use std::sync::Arc;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::config::AuthConfig;

type HmacSha256 = Hmac<Sha256>;

/// Length of an HMAC-SHA256 tag in bytes.
pub const SIGNATURE_LENGTH: usize = 32;

#[derive(Clone)]
pub struct SigningKeys {
    current: Arc<[u8]>,
    previous: Arc<[Arc<[u8]>]>,
}

impl SigningKeys {
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            current: Arc::from(config.signing_secret()),
            previous: config
                .previous_secrets()
                .iter()
                .map(|s| Arc::from(s.as_slice()))
                .collect(),
        }
    }

    /// Sign `data` with the current key.
    pub fn sign(&self, data: &[u8]) -> [u8; SIGNATURE_LENGTH] {
        let mut mac = mac_for(&self.current);
        mac.update(data);
        mac.finalize().into_bytes().into()
    }

    /// Verify `signature` over `data` against every key in the ring.
    ///
    /// Each comparison is constant-time; the number of keys tried is not secret.
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> bool {
        std::iter::once(&self.current)
            .chain(self.previous.iter())
            .any(|key| {
                let mut mac = mac_for(key);
                mac.update(data);
                mac.verify_slice(signature).is_ok()
            })
    }
}

fn mac_for(key: &[u8]) -> HmacSha256 {
    HmacSha256::new_from_slice(key).expect("HMAC accepts any key length")
}

impl fmt::Debug for SigningKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKeys")
            .field("current_len", &self.current.len())
            .field("previous", &self.previous.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    const CURRENT: &str = "current-secret-0123456789abcdefgh";
    const RETIRED: &str = "retired-secret-0123456789abcdefgh";

    fn keys(current: &str, previous: &[&str]) -> SigningKeys {
        let config = AuthConfig::new(current, 1, 256, Duration::days(1))
            .unwrap()
            .with_previous_secrets(previous.iter().map(|s| s.as_bytes().to_vec()).collect())
            .unwrap();
        SigningKeys::from_config(&config)
    }

    #[test]
    fn sign_is_deterministic() {
        let k = keys(CURRENT, &[]);
        assert_eq!(k.sign(b"payload"), k.sign(b"payload"));
        assert_ne!(k.sign(b"payload_a"), k.sign(b"payload_b"));
    }

    #[test]
    fn verify_rejects_other_key() {
        let a = keys(CURRENT, &[]);
        let b = keys(RETIRED, &[]);
        let sig = a.sign(b"payload");
        assert!(a.verify(b"payload", &sig));
        assert!(!b.verify(b"payload", &sig));
    }

    #[test]
    fn retired_key_still_verifies_after_rotation() {
        let before = keys(RETIRED, &[]);
        let after = keys(CURRENT, &[RETIRED]);
        let sig = before.sign(b"payload");
        assert!(after.verify(b"payload", &sig));
        assert_ne!(after.sign(b"payload"), sig, "new signatures use the current key");
    }

    #[test]
    fn truncated_signature_fails() {
        let k = keys(CURRENT, &[]);
        let sig = k.sign(b"payload");
        assert!(!k.verify(b"payload", &sig[..16]));
        assert!(!k.verify(b"payload", &[]));
    }
}

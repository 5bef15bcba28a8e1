//! Session cookie transport.
//!
//! The cookie value is a signed envelope `<payload>.<signature>`, both parts
//! unpadded URL-safe base64. The payload is `<session id>.<expiry unix secs>`
//! and the signature is HMAC-SHA256 over the encoded payload text. Nothing in
//! the payload is secret; the session id only means something to the store.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};

use crate::config::AuthConfig;
use crate::error::CookieError;
use crate::signing::SigningKeys;
use crate::types::{SessionId, Timestamp};

/// Name of the session cookie.
pub const COOKIE_NAME: &str = "session";

/// Attributes every session cookie carries. Not configurable.
const COOKIE_ATTRIBUTES: &str = "Path=/; HttpOnly; Secure; SameSite=Lax";

/// Encodes session ids into cookie values and back.
#[derive(Debug, Clone)]
pub struct CookieCodec {
    keys: SigningKeys,
    ttl: Duration,
}

impl CookieCodec {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            keys: SigningKeys::from_config(config),
            ttl: config.session_ttl(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Wrap `id` in an envelope valid for one TTL from now.
    pub fn encode(&self, id: SessionId) -> String {
        self.encode_at(id, Utc::now())
    }

    /// Wrap `id` in an envelope valid for one TTL from `now`.
    pub fn encode_at(&self, id: SessionId, now: Timestamp) -> String {
        let expires = (now + self.ttl).timestamp();
        let payload = URL_SAFE_NO_PAD.encode(format!("{id}.{expires}"));
        let signature = URL_SAFE_NO_PAD.encode(self.keys.sign(payload.as_bytes()));
        format!("{payload}.{signature}")
    }

    /// Verify a cookie value and return the session id it names.
    pub fn decode(&self, value: &str) -> Result<SessionId, CookieError> {
        self.decode_at(value, Utc::now())
    }

    /// Verify a cookie value as of `now`.
    ///
    /// The signature is checked before the expiry, so an expired result
    /// always refers to an authentic envelope.
    pub fn decode_at(&self, value: &str, now: Timestamp) -> Result<SessionId, CookieError> {
        let (id, expires) = self.open(value)?;
        if now.timestamp() > expires {
            return Err(CookieError::Expired);
        }
        Ok(id)
    }

    /// Recover the session id from an authentic envelope, expired or not.
    ///
    /// Used on logout, where an expired cookie still names a record worth
    /// deleting.
    pub fn decode_ignoring_expiry(&self, value: &str) -> Result<SessionId, CookieError> {
        self.open(value).map(|(id, _)| id)
    }

    fn open(&self, value: &str) -> Result<(SessionId, i64), CookieError> {
        if value.is_empty() {
            return Err(CookieError::Absent);
        }

        let (payload, signature) = value.split_once('.').ok_or(CookieError::Tampered)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| CookieError::Tampered)?;
        if !self.keys.verify(payload.as_bytes(), &signature) {
            return Err(CookieError::Tampered);
        }

        // Authentic from here on; a shape failure means a foreign format.
        let decoded = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| CookieError::Tampered)?;
        let text = std::str::from_utf8(&decoded).map_err(|_| CookieError::Tampered)?;
        let (id, expires) = text.split_once('.').ok_or(CookieError::Tampered)?;
        let id: SessionId = id.parse().map_err(|_| CookieError::Tampered)?;
        let expires: i64 = expires.parse().map_err(|_| CookieError::Tampered)?;
        Ok((id, expires))
    }

    /// `Set-Cookie` value carrying `value` for one TTL.
    pub fn set_cookie(&self, value: &str) -> String {
        format!(
            "{COOKIE_NAME}={value}; Max-Age={}; {COOKIE_ATTRIBUTES}",
            self.ttl.num_seconds()
        )
    }

    /// `Set-Cookie` value that makes the browser drop the session cookie.
    pub fn clear_cookie(&self) -> String {
        format!(
            "{COOKIE_NAME}=; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; {COOKIE_ATTRIBUTES}"
        )
    }
}

/// Extract the session cookie's value from a `Cookie` request header.
///
/// Returns the first non-empty `session=` pair, with surrounding quotes
/// removed.
pub fn session_cookie_value(cookie_header: Option<&str>) -> Option<&str> {
    cookie_header?
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .filter(|(name, _)| name.trim() == COOKIE_NAME)
        .map(|(_, value)| value.trim().trim_matches('"'))
        .find(|value| !value.is_empty())
}

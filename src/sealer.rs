//! Registry credential sealing and session token issuance.

use crate::error::Error;
use crate::types::{SealedRegistryCredential, SessionClaims, SessionToken};

/// Encrypts registry credentials and signs session tokens.
///
/// Implemented by the registry's auth service. [`RegistrySealer`] is the
/// stock implementation.
pub trait CredentialSealer: Send + Sync + 'static {
    /// Encrypt `plaintext` into a base64 transportable credential.
    fn seal(&self, plaintext: &[u8]) -> Result<SealedRegistryCredential, Error>;

    /// Sign `claims` into a session token. The sealer owns the expiry.
    fn issue_session(&self, claims: &SessionClaims) -> Result<SessionToken, Error>;
}

#[cfg(feature = "sealer")]
pub use stock::RegistrySealer;

#[cfg(feature = "sealer")]
mod stock {
    use aes_gcm::aead::{Aead, KeyInit};
    use aes_gcm::{Aes256Gcm, Nonce};
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use jsonwebtoken::{EncodingKey, Header};
    use rand::Rng;
    use serde::Serialize;
    use time::{Duration, OffsetDateTime};

    use super::CredentialSealer;
    use crate::error::Error;
    use crate::types::{SealedRegistryCredential, SessionClaims, SessionToken};

    const KEY_SIZE: usize = 32;
    const NONCE_SIZE: usize = 12;

    #[derive(Serialize)]
    struct IssuedClaims<'a> {
        name: &'a str,
        iat: i64,
        exp: i64,
    }

    /// AES-256-GCM credential sealer with HS256 session tokens.
    ///
    /// Sealed output is `base64(nonce || ciphertext)`.
    #[derive(Clone)]
    pub struct RegistrySealer {
        cipher: Aes256Gcm,
        signing_key: EncodingKey,
        session_ttl: Duration,
    }

    impl RegistrySealer {
        /// Create a sealer from a 32-byte encryption key and an HMAC signing secret.
        ///
        /// # Errors
        ///
        /// Returns [`Error::Config`] if the key is not 32 bytes or the secret is empty.
        pub fn new(encryption_key: &[u8], signing_secret: &[u8]) -> Result<Self, Error> {
            if encryption_key.len() != KEY_SIZE {
                return Err(Error::Config(format!(
                    "invalid encryption key length: expected {KEY_SIZE}, got {}",
                    encryption_key.len()
                )));
            }
            if signing_secret.is_empty() {
                return Err(Error::Config("signing secret is empty".into()));
            }
            let cipher = Aes256Gcm::new_from_slice(encryption_key)
                .map_err(|e| Error::Config(e.to_string()))?;

            Ok(Self {
                cipher,
                signing_key: EncodingKey::from_secret(signing_secret),
                session_ttl: Duration::days(7),
            })
        }

        /// Create a sealer from a hex-encoded encryption key.
        ///
        /// # Errors
        ///
        /// Returns [`Error::Config`] if the hex is invalid or the key has the wrong length.
        pub fn from_hex_key(encryption_key_hex: &str, signing_secret: &[u8]) -> Result<Self, Error> {
            let key = hex::decode(encryption_key_hex.trim())
                .map_err(|e| Error::Config(format!("invalid hex key: {e}")))?;
            Self::new(&key, signing_secret)
        }

        /// Override the session token lifetime (default: 7 days).
        #[must_use]
        pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
            self.session_ttl = ttl;
            self
        }

        /// Reverse [`seal`](CredentialSealer::seal).
        ///
        /// # Errors
        ///
        /// Returns [`Error::Seal`] if the input is not valid base64, is too
        /// short, or fails authentication.
        pub fn unseal(&self, sealed: &SealedRegistryCredential) -> Result<Vec<u8>, Error> {
            let bytes = STANDARD
                .decode(sealed.as_str())
                .map_err(|e| Error::Seal(format!("invalid base64: {e}")))?;
            if bytes.len() <= NONCE_SIZE {
                return Err(Error::Seal("sealed credential too short".into()));
            }
            let (nonce, ciphertext) = bytes.split_at(NONCE_SIZE);
            self.cipher
                .decrypt(Nonce::from_slice(nonce), ciphertext)
                .map_err(|e| Error::Seal(format!("decryption failed: {e}")))
        }
    }

    impl CredentialSealer for RegistrySealer {
        fn seal(&self, plaintext: &[u8]) -> Result<SealedRegistryCredential, Error> {
            let nonce: [u8; NONCE_SIZE] = rand::rng().random();
            let ciphertext = self
                .cipher
                .encrypt(Nonce::from_slice(&nonce), plaintext)
                .map_err(|e| Error::Seal(format!("encryption failed: {e}")))?;

            let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
            out.extend_from_slice(&nonce);
            out.extend_from_slice(&ciphertext);
            Ok(SealedRegistryCredential(STANDARD.encode(out)))
        }

        fn issue_session(&self, claims: &SessionClaims) -> Result<SessionToken, Error> {
            let now = OffsetDateTime::now_utc();
            let issued = IssuedClaims {
                name: &claims.name,
                iat: now.unix_timestamp(),
                exp: (now + self.session_ttl).unix_timestamp(),
            };
            jsonwebtoken::encode(&Header::default(), &issued, &self.signing_key)
                .map(SessionToken)
                .map_err(|e| Error::Seal(format!("session signing failed: {e}")))
        }
    }

    impl std::fmt::Debug for RegistrySealer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("RegistrySealer")
                .field("cipher", &"[REDACTED]")
                .field("session_ttl", &self.session_ttl)
                .finish_non_exhaustive()
        }
    }

}

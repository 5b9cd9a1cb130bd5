//! Client-side session state.
//!
//! After the callback redirect the frontend persists the three values it
//! received and, on every page load, decides whether the user still counts as
//! logged in. That decision only *decodes* the session token's `exp` claim.
//! The signature is not checked here: the signing key stays on the registry,
//! which verifies the token on its own authenticate path.

use std::collections::HashMap;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde_json::Value as JsonValue;
use time::OffsetDateTime;

pub const USERNAME_KEY: &str = "username";
pub const TOKEN_KEY: &str = "token";
pub const NPM_KEY: &str = "npm";

const PAYLOAD_CONFIG: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_decode_padding_mode(DecodePaddingMode::Indifferent)
    .with_decode_allow_trailing_bits(true);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, PAYLOAD_CONFIG);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, PAYLOAD_CONFIG);

/// Key-value capability backing the session (browser local storage, a file, memory).
pub trait SessionStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// In-memory [`SessionStorage`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_owned(), value.to_owned());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// The triple carried by the callback redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    /// Session token (`jwtToken` query parameter).
    pub ui_token: String,
    /// Sealed registry credential (`npmToken` query parameter).
    pub npm_token: String,
}

impl Credentials {
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        ui_token: impl Into<String>,
        npm_token: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            ui_token: ui_token.into(),
            npm_token: npm_token.into(),
        }
    }
}

/// Why a stored session token could not be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedSessionToken {
    #[error("expected three dot-separated segments, found {0}")]
    Segments(usize),
    #[error("payload is not valid base64")]
    Base64,
    #[error("payload is not a JSON object: {0}")]
    Json(String),
    #[error("payload has no numeric exp claim")]
    MissingExpiry,
}

/// Decode the claims segment of a session token without verifying it.
///
/// # Errors
///
/// Returns [`MalformedSessionToken`] describing the first structural problem found.
pub fn decode_claims(token: &str) -> Result<JsonValue, MalformedSessionToken> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(MalformedSessionToken::Segments(segments.len()));
    }

    let payload = URL_SAFE_LENIENT
        .decode(segments[1])
        .or_else(|_| STANDARD_LENIENT.decode(segments[1]))
        .map_err(|_| MalformedSessionToken::Base64)?;

    let claims: JsonValue = serde_json::from_slice(&payload)
        .map_err(|e| MalformedSessionToken::Json(e.to_string()))?;
    if !claims.is_object() {
        return Err(MalformedSessionToken::Json("not an object".into()));
    }
    Ok(claims)
}

/// Read the `exp` claim (seconds since epoch) of a session token.
///
/// # Errors
///
/// Returns [`MalformedSessionToken`] if the token cannot be decoded or `exp`
/// is absent or not a number.
pub fn session_expiry(token: &str) -> Result<f64, MalformedSessionToken> {
    decode_claims(token)?
        .get("exp")
        .and_then(JsonValue::as_f64)
        .ok_or(MalformedSessionToken::MissingExpiry)
}

/// Owner of the persisted credentials triple.
#[derive(Debug, Clone, Default)]
pub struct SessionStore<S> {
    storage: S,
}

impl<S: SessionStorage> SessionStore<S> {
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Persist all three values, overwriting whatever was stored.
    pub fn save(&mut self, credentials: &Credentials) {
        self.storage.set(USERNAME_KEY, &credentials.username);
        self.storage.set(TOKEN_KEY, &credentials.ui_token);
        self.storage.set(NPM_KEY, &credentials.npm_token);
    }

    /// Remove all three values. Safe to call when nothing is stored.
    pub fn clear(&mut self) {
        self.storage.remove(USERNAME_KEY);
        self.storage.remove(TOKEN_KEY);
        self.storage.remove(NPM_KEY);
    }

    /// The stored triple, if every value is present and non-empty.
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        let credentials = Credentials {
            username: self.storage.get(USERNAME_KEY)?,
            ui_token: self.storage.get(TOKEN_KEY)?,
            npm_token: self.storage.get(NPM_KEY)?,
        };
        Self::validate(&credentials).then_some(credentials)
    }

    /// Whether a complete, unexpired session is stored.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.is_logged_in_at(OffsetDateTime::now_utc())
    }

    /// [`is_logged_in`](Self::is_logged_in) evaluated at `now`.
    #[must_use]
    pub fn is_logged_in_at(&self, now: OffsetDateTime) -> bool {
        let Some(credentials) = self.credentials() else {
            return false;
        };

        match session_expiry(&credentials.ui_token) {
            Ok(exp) => exp > unix_seconds(now),
            Err(reason) => {
                tracing::debug!(%reason, "Stored session token is unreadable");
                false
            }
        }
    }

    /// Structural check: every field present and non-empty. Expiry is not inspected.
    #[must_use]
    pub fn validate(credentials: &Credentials) -> bool {
        !credentials.username.is_empty()
            && !credentials.ui_token.is_empty()
            && !credentials.npm_token.is_empty()
    }
}

#[allow(clippy::cast_precision_loss)]
fn unix_seconds(now: OffsetDateTime) -> f64 {
    now.unix_timestamp_nanos() as f64 / 1_000_000_000.0
}

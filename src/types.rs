use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Single-use code the provider hands back after user consent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct AuthorizationCode(pub String);

impl AuthorizationCode {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AuthorizationCode {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Provider bearer token. Used once to fetch the identity, then sealed; never persisted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, From, Into)]
#[serde(transparent)]
pub struct ProviderAccessToken(pub String);

impl ProviderAccessToken {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ProviderAccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ProviderAccessToken([REDACTED])")
    }
}

/// Provider login name, used verbatim as the registry username.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct ProviderIdentity(pub String);

impl ProviderIdentity {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Encrypted `"<identity>:<access token>"` pair, base64 encoded.
///
/// Opaque to this crate once created. Only the registry's authenticate
/// path opens it again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct SealedRegistryCredential(pub String);

impl SealedRegistryCredential {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Signed three-segment session token (`header.payload.signature`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct SessionToken(pub String);

impl SessionToken {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Claims handed to [`CredentialSealer::issue_session`](crate::sealer::CredentialSealer::issue_session).
///
/// Expiry is added by the sealer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub name: String,
}

impl SessionClaims {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

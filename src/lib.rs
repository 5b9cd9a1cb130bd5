#![doc = include_str!("../README.md")]

pub mod error;
#[cfg(feature = "middleware")]
pub mod middleware;
#[cfg(feature = "oauth")]
pub mod oauth;
pub mod sealer;
pub mod secret;
pub mod session;
pub mod types;

// Re-exports for convenient access
pub use error::Error;
#[cfg(feature = "oauth")]
pub use oauth::{AuthClient, OAuthConfig, ProviderUser, TokenResponse};
pub use sealer::CredentialSealer;
#[cfg(feature = "sealer")]
pub use sealer::RegistrySealer;
pub use secret::{require_secret, resolve_secret, resolve_secret_with};
pub use session::{
    Credentials, MalformedSessionToken, MemoryStorage, SessionStorage, SessionStore,
    decode_claims, session_expiry,
};
pub use types::{
    AuthorizationCode, ProviderAccessToken, ProviderIdentity, SealedRegistryCredential,
    SessionClaims, SessionToken,
};

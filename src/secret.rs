//! Resolution of configured secrets.
//!
//! A configured value may either be the secret itself or the *name* of an
//! environment variable holding it. The environment variable wins:
//!
//! ```rust
//! use registry_oauth::resolve_secret_with;
//!
//! let env = |name: &str| (name == "GITHUB_CLIENT_SECRET").then(|| "s3cr3t".to_string());
//! assert_eq!(resolve_secret_with("GITHUB_CLIENT_SECRET", env), "s3cr3t");
//! assert_eq!(resolve_secret_with("literal-secret", env), "literal-secret");
//! ```

use crate::error::Error;

/// Resolves `name` against the process environment.
///
/// Returns the value of the environment variable called `name` if it is set,
/// otherwise `name` itself.
#[must_use]
pub fn resolve_secret(name: &str) -> String {
    resolve_secret_with(name, |key| std::env::var(key).ok())
}

/// Resolves `name` against an arbitrary lookup, with the same precedence as
/// [`resolve_secret`].
pub fn resolve_secret_with<F>(name: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).unwrap_or_else(|| name.to_owned())
}

/// Resolves a required configuration field.
///
/// # Errors
///
/// Returns [`Error::Config`] if the configured value or its resolution is empty.
pub fn require_secret(field: &str, name: &str) -> Result<String, Error> {
    require_secret_with(field, name, |key| std::env::var(key).ok())
}

pub(crate) fn require_secret_with<F>(field: &str, name: &str, lookup: F) -> Result<String, Error>
where
    F: Fn(&str) -> Option<String>,
{
    if name.trim().is_empty() {
        return Err(Error::Config(format!("{field} is not configured")));
    }
    let value = resolve_secret_with(name, lookup);
    if value.is_empty() {
        return Err(Error::Config(format!("{field} resolved to an empty value")));
    }
    Ok(value)
}

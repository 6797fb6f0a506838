//! Secret masking for safe logging
//!
//! Developer tokens and access tokens are held as `secrecy::SecretString`
//! everywhere in the crate. When one has to appear in a log line or an error
//! message, it goes through [`mask_token`] or [`mask_secrets_in_string`].

use secrecy::{ExposeSecret, SecretString};

/// Masks a token for safe logging
///
/// Shows only the first 3 and last 3 characters for identification purposes.
/// Tokens shorter than 10 characters are fully masked as "****".
///
/// # Examples
///
/// ```
/// use ads_reporter::security::mask_token;
///
/// assert_eq!(mask_token("abcdef123456"), "abc...456");
/// assert_eq!(mask_token("short"), "****");
/// ```
pub fn mask_token(token: &str) -> String {
    if token.chars().count() < 10 {
        return "****".to_string();
    }

    let prefix: String = token.chars().take(3).collect();
    let suffix: String = token
        .chars()
        .rev()
        .take(3)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("{}...{}", prefix, suffix)
}

/// Replaces every occurrence of the given secrets in `text` with its mask
///
/// Used on response bodies and transport errors before they are logged or
/// wrapped into an error value.
pub fn mask_secrets_in_string(text: &str, secrets: &[&SecretString]) -> String {
    secrets
        .iter()
        .map(|secret| secret.expose_secret())
        .filter(|secret| !secret.is_empty())
        .fold(text.to_string(), |masked, secret| {
            masked.replace(secret, &mask_token(secret))
        })
}

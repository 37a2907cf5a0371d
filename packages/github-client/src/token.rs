//! GitHub access token.

use std::fmt;

use reqwest::header::{HeaderValue, InvalidHeaderValue};
use secrecy::{ExposeSecret, SecretBox};

/// A personal access or installation token. Kept in a `secrecy` box and
/// only ever read back as a sensitive `Authorization` header.
pub struct Token(SecretBox<str>);

impl Token {
    /// `Authorization: Bearer <token>`, flagged sensitive so reqwest and
    /// hyper never print it.
    pub fn authorization_header(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.0.expose_secret()))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl Clone for Token {
    fn clone(&self) -> Self {
        Self::from(self.0.expose_secret())
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token([REDACTED])")
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self(SecretBox::new(value.into_boxed_str()))
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self(SecretBox::new(Box::from(value)))
    }
}

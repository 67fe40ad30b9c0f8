//! HTTP Basic auth for the analytics endpoints.

use axum::http::{header, HeaderMap};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use weathercore::core::metrics;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Missing credentials")]
    Missing,

    #[error("Malformed Authorization header")]
    Malformed,

    #[error("Invalid credentials")]
    Invalid,

    #[error("Analytics access is not configured")]
    NotConfigured,
}

/// The user name and password the analytics API accepts.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub user: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Both values must be set; otherwise analytics stays closed.
    pub fn from_parts(user: Option<String>, password: Option<SecretString>) -> Option<Self> {
        Some(Self {
            user: user?,
            password: password?,
        })
    }
}

/// Decodes `Authorization: Basic <base64(user:password)>`.
pub fn parse_basic(headers: &HeaderMap) -> Result<(String, String), AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::Missing)?
        .to_str()
        .map_err(|_| AuthError::Malformed)?;

    let encoded = value
        .strip_prefix("Basic ")
        .or_else(|| value.strip_prefix("basic "))
        .ok_or(AuthError::Malformed)?;
    let decoded = STANDARD.decode(encoded.trim()).map_err(|_| AuthError::Malformed)?;
    let decoded = String::from_utf8(decoded).map_err(|_| AuthError::Malformed)?;

    let (user, password) = decoded.split_once(':').ok_or(AuthError::Malformed)?;
    Ok((user.to_string(), password.to_string()))
}

/// Checks the request against the configured credentials, counting rejections.
pub fn authorize(headers: &HeaderMap, expected: Option<&Credentials>) -> Result<(), AuthError> {
    let result = expected.ok_or(AuthError::NotConfigured).and_then(|expected| {
        let (user, password) = parse_basic(headers)?;
        if user == expected.user && password == expected.password.expose_secret() {
            Ok(())
        } else {
            Err(AuthError::Invalid)
        }
    });

    if let Err(e) = &result {
        log::warn!("Analytics request rejected: {}", e);
        metrics::inc(&metrics::UNAUTHORIZED_ACCESS);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use pretty_assertions::assert_eq;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn basic(user: &str, password: &str) -> HeaderMap {
        headers(&format!("Basic {}", STANDARD.encode(format!("{}:{}", user, password))))
    }

    #[test]
    fn test_parse_basic() {
        assert_eq!(
            parse_basic(&basic("admin", "s3:cret")),
            Ok(("admin".to_string(), "s3:cret".to_string()))
        );
        assert_eq!(parse_basic(&HeaderMap::new()), Err(AuthError::Missing));
        assert_eq!(parse_basic(&headers("Bearer abc")), Err(AuthError::Malformed));
        assert_eq!(parse_basic(&headers("Basic !!!")), Err(AuthError::Malformed));
    }

    #[test]
    fn test_authorize() {
        let creds = Credentials::new("admin", "pw");
        assert_eq!(authorize(&basic("admin", "pw"), Some(&creds)), Ok(()));
        assert_eq!(authorize(&basic("admin", "nope"), Some(&creds)), Err(AuthError::Invalid));
        assert_eq!(authorize(&basic("root", "pw"), Some(&creds)), Err(AuthError::Invalid));
        assert_eq!(authorize(&basic("admin", "pw"), None), Err(AuthError::NotConfigured));
    }

    #[test]
    fn test_credentials_need_both_parts() {
        assert!(Credentials::from_parts(Some("a".into()), None).is_none());
        assert!(Credentials::from_parts(None, Some(SecretString::from("b"))).is_none());
        assert!(Credentials::from_parts(Some("a".into()), Some(SecretString::from("b"))).is_some());
    }
}

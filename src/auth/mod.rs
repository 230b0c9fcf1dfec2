use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SessionConfig;

/// Authenticated subject, as asserted by the identity provider for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub subject_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl Identity {
    pub fn new(subject_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            email: email.into(),
            display_name: None,
            avatar_url: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_avatar(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }
}

/// OIDC-style claims carried by the session token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(identity: &Identity, config: &SessionConfig, ttl: Duration) -> Result<Self, SessionError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or(SessionError::InvalidLifetime)?;

        Ok(Self {
            sub: identity.subject_id.clone(),
            email: identity.email.clone(),
            name: identity.display_name.clone(),
            picture: identity.avatar_url.clone(),
            iss: config.issuer.clone(),
            aud: config.audience.clone(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        })
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            subject_id: claims.sub,
            email: claims.email,
            display_name: claims.name,
            avatar_url: claims.picture,
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session secret is not configured")]
    InvalidSecret,

    #[error("Session token is missing a subject")]
    MissingSubject,

    #[error("Session lifetime is out of range")]
    InvalidLifetime,

    #[error("Session token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

/// Source of the authenticated identity for a request
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// `None` when the request carries no valid session
    async fn current_identity(&self, headers: &HeaderMap) -> Option<Identity>;
}

/// Validates HS256 session tokens issued by the identity provider.
///
/// The token is read from `Authorization: Bearer` first, then from the
/// configured session cookie.
pub struct JwtSessionProvider {
    config: SessionConfig,
}

impl JwtSessionProvider {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Decode and verify a token into the identity it asserts
    pub fn validate(&self, token: &str) -> Result<Identity, SessionError> {
        if self.config.secret.is_empty() {
            return Err(SessionError::InvalidSecret);
        }

        let decoding_key = DecodingKey::from_secret(self.config.secret.as_bytes());
        let mut validation = Validation::default();
        if let Some(issuer) = &self.config.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &self.config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        let token_data = decode::<Claims>(token, &decoding_key, &validation)?;
        if token_data.claims.sub.trim().is_empty() {
            return Err(SessionError::MissingSubject);
        }

        Ok(token_data.claims.into())
    }
}

#[async_trait]
impl SessionProvider for JwtSessionProvider {
    async fn current_identity(&self, headers: &HeaderMap) -> Option<Identity> {
        let token = bearer_token(headers).or_else(|| cookie_value(headers, &self.config.cookie_name))?;

        match self.validate(&token) {
            Ok(identity) => Some(identity),
            Err(e) => {
                tracing::debug!("Ignoring invalid session token: {}", e);
                None
            }
        }
    }
}

/// Mint a session token for `identity`, signed with the configured secret
pub fn issue_session_token(
    identity: &Identity,
    config: &SessionConfig,
    ttl: Duration,
) -> Result<String, SessionError> {
    if config.secret.is_empty() {
        return Err(SessionError::InvalidSecret);
    }
    if identity.subject_id.trim().is_empty() {
        return Err(SessionError::MissingSubject);
    }

    let claims = Claims::new(identity, config, ttl)?;
    let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());

    Ok(encode(&Header::default(), &claims, &encoding_key)?)
}

/// Session lifetime from a whole number of hours, rejecting values chrono cannot represent
pub fn session_lifetime(hours: u64) -> Result<Duration, SessionError> {
    i64::try_from(hours)
        .ok()
        .and_then(Duration::try_hours)
        .ok_or(SessionError::InvalidLifetime)
}

/// Extract the token from an `Authorization: Bearer` header
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

/// Find a cookie by name across all `Cookie` headers
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

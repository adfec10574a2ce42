//! # Session Tokens
//!
//! JWT-based session tokens (HS256 with the configured application secret).
//! The verifier is the trust boundary for role strings: an unparseable role
//! claim is logged as an upstream bug and the token is rejected, never
//! passed downstream for later layers to guess at.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

use super::identity::Identity;
use crate::config::AuthConfig;
use crate::constants::Role;

/// Token issuance/validation errors.
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("JWT processing error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid claims: {0}")]
    InvalidClaims(String),
}

/// Claims carried by a session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// Subject (user id).
    pub sub: Uuid,
    /// Caller role, serialized snake_case.
    pub role: String,
    /// Owning customer record, customer-role sessions only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<Uuid>,
    /// Token issuer.
    pub iss: String,
    /// Token audience.
    pub aud: String,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued at time (Unix timestamp).
    pub iat: i64,
}

/// Resolves a raw bearer token to a caller identity.
///
/// Implementations must treat every internal failure as "no identity";
/// the session guard turns that into an unauthenticated denial. There is
/// no code path from a verifier error to an allow.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, raw: &str) -> Option<Identity>;
}

/// HS256 session token issuer/verifier.
#[derive(Clone)]
pub struct JwtVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    ttl_seconds: i64,
}

impl JwtVerifier {
    pub fn from_config(config: &AuthConfig) -> Result<Self, TokenError> {
        if config.session_secret.is_empty() {
            return Err(TokenError::Configuration(
                "session secret not configured".to_string(),
            ));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.session_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.session_secret.as_bytes()),
            issuer: config.jwt_issuer.clone(),
            audience: config.jwt_audience.clone(),
            ttl_seconds: config.token_ttl_seconds,
        })
    }

    /// Issue a session token for an authenticated user (login path).
    pub fn issue(&self, identity: &Identity) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: identity.user_id,
            role: identity.role.to_string(),
            customer_id: identity.customer_id,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            exp: (now + Duration::seconds(self.ttl_seconds)).timestamp(),
            iat: now.timestamp(),
        };

        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    fn decode_claims(&self, raw: &str) -> Result<SessionClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.validate_exp = true;

        let data = decode::<SessionClaims>(raw, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, raw: &str) -> Option<Identity> {
        let claims = match self.decode_claims(raw) {
            Ok(claims) => claims,
            Err(e) => {
                warn!(error = %e, "session token validation failed");
                return None;
            }
        };

        let role = match claims.role.parse::<Role>() {
            Ok(role) => role,
            Err(e) => {
                // A signed token with an unknown role means token issuance
                // is broken, not that the caller overstepped.
                error!(error = %e, sub = %claims.sub, "rejecting token with unknown role claim");
                return None;
            }
        };

        Some(Identity {
            user_id: claims.sub,
            role,
            customer_id: claims.customer_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_verifier() -> JwtVerifier {
        JwtVerifier::from_config(&AuthConfig::for_tests()).unwrap()
    }

    #[test]
    fn issue_and_verify_round_trip() {
        let verifier = test_verifier();
        let identity = Identity::customer(Uuid::new_v4(), Uuid::new_v4());
        let token = verifier.issue(&identity).unwrap();
        assert_eq!(verifier.verify(&token), Some(identity));
    }

    #[test]
    fn garbage_tokens_verify_to_none() {
        let verifier = test_verifier();
        assert_eq!(verifier.verify("not-a-jwt"), None);
        assert_eq!(verifier.verify(""), None);
    }

    #[test]
    fn tokens_from_a_different_secret_are_rejected() {
        let verifier = test_verifier();
        let mut other_config = AuthConfig::for_tests();
        other_config.session_secret = "a-completely-different-secret".to_string();
        let other = JwtVerifier::from_config(&other_config).unwrap();

        let identity = Identity::staff(Uuid::new_v4(), Role::Admin);
        let token = other.issue(&identity).unwrap();
        assert_eq!(verifier.verify(&token), None);
    }

    #[test]
    fn empty_secret_is_a_configuration_error() {
        let mut config = AuthConfig::for_tests();
        config.session_secret = String::new();
        assert!(matches!(
            JwtVerifier::from_config(&config),
            Err(TokenError::Configuration(_))
        ));
    }
}

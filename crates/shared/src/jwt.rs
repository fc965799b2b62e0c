//! JWT token utilities using the HS256 algorithm.
//!
//! Staff tokens are signed with a single deployment secret. The claims carry
//! the staff role and assigned branch so route guards can authorize without
//! a database round trip.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingError(String),

    #[error("Failed to decode token: {0}")]
    DecodingError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid signing secret: {0}")]
    InvalidSecret(String),
}

/// JWT token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (staff user ID)
    pub sub: String,
    /// Staff role (`admin` or `clerk`)
    pub role: String,
    /// Assigned branch, absent for admins without a branch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<i64>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// JWT ID
    pub jti: String,
}

impl Claims {
    /// Parses the subject claim as a numeric user ID.
    pub fn user_id(&self) -> Result<i64, JwtError> {
        self.sub.parse::<i64>().map_err(|_| JwtError::InvalidToken)
    }
}

/// A freshly issued token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: String,
    pub expires_in: i64,
}

/// Configuration for JWT token generation and validation.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// Token lifetime in seconds
    pub access_token_expiry_secs: i64,
    /// Leeway in seconds for clock skew tolerance
    pub leeway_secs: u64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_token_expiry_secs", &self.access_token_expiry_secs)
            .field("leeway_secs", &self.leeway_secs)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Default leeway in seconds for clock skew tolerance
pub const DEFAULT_LEEWAY_SECS: u64 = 30;

impl JwtConfig {
    /// Creates a new JwtConfig from a shared signing secret.
    pub fn new(secret: &str, access_token_expiry_secs: i64) -> Result<Self, JwtError> {
        Self::with_leeway(secret, access_token_expiry_secs, DEFAULT_LEEWAY_SECS)
    }

    /// Creates a new JwtConfig with a custom leeway.
    pub fn with_leeway(
        secret: &str,
        access_token_expiry_secs: i64,
        leeway_secs: u64,
    ) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidSecret("secret must not be empty".into()));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expiry_secs,
            leeway_secs,
        })
    }

    /// Issues an access token for a staff user.
    pub fn generate_access_token(
        &self,
        user_id: i64,
        role: &str,
        branch_id: Option<i64>,
    ) -> Result<IssuedToken, JwtError> {
        let now = Utc::now();
        let jti = Uuid::new_v4().to_string();

        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            branch_id,
            exp: (now + Duration::seconds(self.access_token_expiry_secs)).timestamp(),
            iat: now.timestamp(),
            jti: jti.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))?;

        Ok(IssuedToken {
            token,
            jti,
            expires_in: self.access_token_expiry_secs,
        })
    }

    /// Validates a token and returns its claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway_secs;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidToken,
                _ => JwtError::DecodingError(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> JwtConfig {
        JwtConfig::with_leeway("test_secret_key_for_jwt_testing_12345", 900, 0).unwrap()
    }

    #[test]
    fn test_empty_secret_rejected() {
        let result = JwtConfig::new("", 900);
        assert!(matches!(result, Err(JwtError::InvalidSecret(_))));
    }

    #[test]
    fn test_generate_and_validate_clerk_token() {
        let config = create_test_config();

        let issued = config.generate_access_token(42, "clerk", Some(3)).unwrap();
        assert!(issued.token.contains('.'));
        assert_eq!(issued.expires_in, 900);

        let claims = config.validate_token(&issued.token).unwrap();
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.role, "clerk");
        assert_eq!(claims.branch_id, Some(3));
        assert_eq!(claims.jti, issued.jti);
    }

    #[test]
    fn test_admin_token_without_branch() {
        let config = create_test_config();

        let issued = config.generate_access_token(1, "admin", None).unwrap();
        let claims = config.validate_token(&issued.token).unwrap();

        assert_eq!(claims.role, "admin");
        assert!(claims.branch_id.is_none());
    }

    #[test]
    fn test_expired_token() {
        let mut config = create_test_config();
        config.access_token_expiry_secs = -120;

        let issued = config.generate_access_token(7, "clerk", Some(1)).unwrap();
        let result = config.validate_token(&issued.token);

        assert!(
            matches!(result, Err(JwtError::TokenExpired)),
            "Expected TokenExpired, got: {:?}",
            result
        );
    }

    #[test]
    fn test_token_signed_with_other_secret_rejected() {
        let config = create_test_config();
        let other = JwtConfig::new("a_completely_different_secret_value", 900).unwrap();

        let issued = other.generate_access_token(7, "clerk", Some(1)).unwrap();
        assert!(config.validate_token(&issued.token).is_err());
    }

    #[test]
    fn test_malformed_token() {
        let config = create_test_config();
        assert!(config.validate_token("not_a_jwt").is_err());
    }

    #[test]
    fn test_non_numeric_subject() {
        let claims = Claims {
            sub: "abc".to_string(),
            role: "clerk".to_string(),
            branch_id: None,
            exp: 0,
            iat: 0,
            jti: String::new(),
        };
        assert!(matches!(claims.user_id(), Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_unique_jti_per_token() {
        let config = create_test_config();

        let first = config.generate_access_token(5, "clerk", Some(1)).unwrap();
        let second = config.generate_access_token(5, "clerk", Some(1)).unwrap();

        assert_ne!(first.jti, second.jti);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = create_test_config();
        let debug = format!("{:?}", config);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("test_secret_key"));
    }
}

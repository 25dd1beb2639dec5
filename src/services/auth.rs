use crate::config::AuthSettings;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from password hashing and token handling
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Password hashing failed: {0}")]
    HashError(#[from] bcrypt::BcryptError),

    #[error("Token error: {0}")]
    TokenError(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid token subject: {0}")]
    InvalidSubject(String),
}

/// JWT claims issued at login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// Identity extracted from a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub email: String,
}

/// Password hashing and HS256 session tokens
#[derive(Clone)]
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    token_ttl: chrono::Duration,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(settings: &AuthSettings) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[settings.issuer.as_str()]);

        Self {
            encoding_key: EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
            validation,
            issuer: settings.issuer.clone(),
            // Out-of-range lifetimes collapse to zero rather than overflow
            token_ttl: chrono::Duration::try_hours(settings.token_ttl_hours).unwrap_or_else(chrono::Duration::zero),
            bcrypt_cost: settings.bcrypt_cost,
        }
    }

    /// Hash a password; CPU bound, call from a blocking context
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        Ok(bcrypt::hash(password, self.bcrypt_cost)?)
    }

    /// Check a password against a stored hash; CPU bound like [`Self::hash_password`]
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        Ok(bcrypt::verify(password, hash)?)
    }

    pub fn issue_token(&self, user_id: i64, email: &str) -> Result<String, AuthError> {
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    /// Verify signature, issuer and expiry, then extract the caller's identity
    pub fn verify_token(&self, token: &str) -> Result<Identity, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;

        let user_id = data
            .claims
            .sub
            .parse::<i64>()
            .map_err(|_| AuthError::InvalidSubject(data.claims.sub.clone()))?;

        Ok(Identity {
            user_id,
            email: data.claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> AuthSettings {
        AuthSettings {
            jwt_secret: "test-secret".to_string(),
            bcrypt_cost: 4,
            ..AuthSettings::default()
        }
    }

    #[test]
    fn test_token_round_trip() {
        let auth = AuthService::new(&settings());
        let token = auth.issue_token(42, "renter@example.test").unwrap();

        let identity = auth.verify_token(&token).unwrap();
        assert_eq!(identity.user_id, 42);
        assert_eq!(identity.email, "renter@example.test");
    }

    #[test]
    fn test_token_with_other_secret_rejected() {
        let token = AuthService::new(&settings()).issue_token(1, "a@example.test").unwrap();

        let other = AuthService::new(&AuthSettings {
            jwt_secret: "another-secret".to_string(),
            ..settings()
        });
        assert!(matches!(other.verify_token(&token), Err(AuthError::TokenError(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        let auth = AuthService::new(&AuthSettings {
            token_ttl_hours: -1,
            ..settings()
        });
        let token = auth.issue_token(1, "a@example.test").unwrap();

        assert!(auth.verify_token(&token).is_err());
    }

    #[test]
    fn test_out_of_range_ttl_does_not_overflow() {
        let auth = AuthService::new(&AuthSettings {
            token_ttl_hours: i64::MAX,
            ..settings()
        });
        assert_eq!(auth.token_ttl, chrono::Duration::zero());

        let token = auth.issue_token(1, "a@example.test").unwrap();
        assert_eq!(auth.verify_token(&token).unwrap().user_id, 1);
    }

    #[test]
    fn test_password_hash_and_verify() {
        let auth = AuthService::new(&settings());
        let hash = auth.hash_password("correct horse").unwrap();

        assert_ne!(hash, "correct horse");
        assert!(auth.verify_password("correct horse", &hash).unwrap());
        assert!(!auth.verify_password("battery staple", &hash).unwrap());
    }
}

//! JWT token management

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use taskgate_db::UserRole;
use tracing::debug;

use crate::error::AuthError;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Numeric user ID, read by the web frontend
    pub user_id: i64,
    /// Username
    pub username: String,
    /// User role
    pub role: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// JWT manager for token generation and validation
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry: Duration,
}

impl JwtManager {
    /// Create a new JWT manager
    ///
    /// An expiry too large to represent saturates; issuing then fails with
    /// [`AuthError::TokenIssue`] instead of overflowing.
    pub fn new(secret: &str, token_expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_expiry: Duration::try_hours(token_expiry_hours).unwrap_or(Duration::MAX),
        }
    }

    /// Token validity window in seconds
    pub fn token_expiry_secs(&self) -> i64 {
        self.token_expiry.num_seconds()
    }

    /// Generate a JWT token for a user
    pub fn generate_token(
        &self,
        user_id: i64,
        username: &str,
        role: UserRole,
    ) -> Result<String, AuthError> {
        self.generate_token_at(user_id, username, role, Utc::now())
    }

    /// Generate a token as if issued at `now`
    pub fn generate_token_at(
        &self,
        user_id: i64,
        username: &str,
        role: UserRole,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let exp = now.checked_add_signed(self.token_expiry).ok_or_else(|| {
            AuthError::TokenIssue(format!(
                "expiry of {}h overflows the clock",
                self.token_expiry.num_hours()
            ))
        })?;

        let claims = Claims {
            sub: user_id.to_string(),
            user_id,
            username: username.to_string(),
            role: role.as_str().to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        debug!("Generating token for user: {}", username);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(AuthError::Jwt)
    }

    /// Validate a JWT token and return claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_token_at(token, Utc::now())
    }

    /// Validate a token against the clock reading `now`
    ///
    /// A token is accepted while `now < exp`, with no leeway.
    pub fn validate_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against the supplied clock
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;

        if token_data.claims.exp <= now.timestamp() {
            return Err(AuthError::TokenExpired);
        }

        Ok(token_data.claims)
    }
}

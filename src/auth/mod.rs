//! Session authentication: signed session tokens and request extractors.

mod extractor;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};

use crate::error::{AppError, AppResult};
use crate::models::{SessionClaims, User};

pub use extractor::{AuthError, MaybeSession, SessionUser};

/// Issuer claim stamped on every session token.
pub const SESSION_ISSUER: &str = "testplan";

/// Wrapper type for the session signing secret.
/// Uses `SecretString` to prevent accidental logging and zeroize on drop.
///
/// # Security features
/// - `Debug` prints `[REDACTED]` instead of the actual value
/// - Explicit `.expose_secret()` required to access the value
#[derive(Clone)]
pub struct SessionSecret {
    secret: SecretString,
    ttl_secs: u64,
}

impl SessionSecret {
    pub fn new(secret: SecretString, ttl_secs: u64) -> Self {
        Self { secret, ttl_secs }
    }

    /// Session lifetime in seconds.
    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Sign an HS256 session token for `user`.
    pub fn issue(&self, user: &User) -> AppResult<String> {
        let now = chrono::Utc::now();
        let exp = now + chrono::Duration::seconds(self.ttl_secs as i64);

        let claims = SessionClaims {
            sub: user.id.to_string(),
            iss: SESSION_ISSUER.to_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            iat: now.timestamp() as usize,
            exp: exp.timestamp() as usize,
        };

        let key = EncodingKey::from_secret(self.secret.expose_secret().as_bytes());
        encode(&Header::default(), &claims, &key)
            .map_err(|e| AppError::Internal(format!("Failed to create session token: {}", e)))
    }

    /// Verify a session token and return its claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, String> {
        let key = DecodingKey::from_secret(self.secret.expose_secret().as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[SESSION_ISSUER]);
        validation.validate_aud = false;

        let token_data = decode::<SessionClaims>(token, &key, &validation)
            .map_err(|e| format!("Invalid session token: {}", e))?;

        Ok(token_data.claims)
    }
}

impl std::fmt::Debug for SessionSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SessionSecret([REDACTED], ttl={}s)", self.ttl_secs)
    }
}

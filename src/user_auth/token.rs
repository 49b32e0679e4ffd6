//! Session tokens: HS256 JWTs carrying identity and role claims.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::{Error as JwtError, ErrorKind},
};
use serde::{Deserialize, Serialize};

use super::roles::Role;

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub account_id: i64,
    pub email: String,
    pub role_name: String,
    pub role_id: i32,
    pub iat: usize, // Issued at
    pub exp: usize, // Expiration time (as UTC timestamp)
}

impl Claims {
    pub fn role(&self) -> Role {
        Role::from_id(self.role_id)
    }
}

/// Issues and verifies session tokens with a server-side secret.
#[derive(Clone)]
pub struct SessionTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl SessionTokens {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(
        &self,
        account_id: i64,
        email: &str,
        role_name: &str,
        role_id: i32,
    ) -> Result<String, JwtError> {
        self.issue_at(account_id, email, role_name, role_id, Utc::now())
    }

    /// Issue as if the current time were `now`.
    pub fn issue_at(
        &self,
        account_id: i64,
        email: &str,
        role_name: &str,
        role_id: i32,
        now: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        let claims = Claims {
            account_id,
            email: email.to_string(),
            role_name: role_name.to_string(),
            role_id,
            iat: now.timestamp() as usize,
            exp: (now + self.ttl).timestamp() as usize,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Valid iff the signature verifies and the current time is before `exp`.
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)?.claims;

        // jsonwebtoken accepts exp == now; the session window is half-open
        if claims.exp as i64 <= Utc::now().timestamp() {
            return Err(ErrorKind::ExpiredSignature.into());
        }
        Ok(claims)
    }
}

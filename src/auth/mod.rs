use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub mod password;

/// Identity carried inside an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// `None` when `ttl` pushes the expiry past the representable range.
    pub fn new(identity: &Identity, ttl: Duration) -> Option<Self> {
        let now = Utc::now();
        let exp = now.checked_add_signed(ttl)?;

        Some(Self {
            id: identity.id,
            username: identity.username.clone(),
            email: identity.email.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        })
    }

    pub fn identity(self) -> Identity {
        Identity {
            id: self.id,
            username: self.username,
            email: self.email,
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("JWT generation error: {0}")]
    Signing(String),

    #[error("Invalid JWT token: {0}")]
    Invalid(String),

    #[error("JWT token expired")]
    Expired,
}

/// Signs an HS256 access token for `identity` valid for `ttl`.
pub fn issue(identity: &Identity, secret: &str, ttl: Duration) -> Result<String, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::Signing("JWT secret not configured".to_string()));
    }

    let claims = Claims::new(identity, ttl)
        .ok_or_else(|| TokenError::Signing(format!("token lifetime of {}s is out of range", ttl.num_seconds())))?;
    let encoding_key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::new(Algorithm::HS256), &claims, &encoding_key)
        .map_err(|e| TokenError::Signing(e.to_string()))
}

/// Verifies signature and expiry and returns the identity the token was issued for.
pub fn verify(token: &str, secret: &str) -> Result<Identity, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::Invalid("JWT secret not configured".to_string()));
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid(e.to_string()),
    })?;

    Ok(token_data.claims.identity())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            id: Uuid::new_v4(),
            username: "dj_shadow".to_string(),
            email: "shadow@example.com".to_string(),
        }
    }

    #[test]
    fn issued_token_verifies_to_same_identity() {
        let who = identity();
        let token = issue(&who, "secret", Duration::minutes(10)).unwrap();
        assert_eq!(verify(&token, "secret").unwrap(), who);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue(&identity(), "secret", Duration::minutes(10)).unwrap();
        assert!(matches!(verify(&token, "other"), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue(&identity(), "secret", Duration::seconds(-5)).unwrap();
        assert!(matches!(verify(&token, "secret"), Err(TokenError::Expired)));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(verify("not.a.jwt", "secret"), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn overflowing_lifetime_is_a_signing_error() {
        let ttl = Duration::try_seconds(10_000_000_000_000).unwrap();
        assert!(matches!(issue(&identity(), "secret", ttl), Err(TokenError::Signing(_))));
    }

    #[test]
    fn empty_secret_cannot_sign() {
        assert!(matches!(
            issue(&identity(), "", Duration::minutes(1)),
            Err(TokenError::Signing(_))
        ));
    }
}

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use super::domain::{AuthUser, Claims, TokenPair};
use super::errors::AuthError;

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl KeyPair {
    fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    fn sign(&self, user: &AuthUser, now: i64) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            jti: Uuid::new_v4(),
            iat: now,
            exp: now + self.ttl_secs,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| AuthError::TokenError(e.to_string()))
    }

    fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::Unauthorized)
    }
}

/// HS256 signer/verifier with separate secrets and lifetimes for access and
/// refresh tokens.
pub struct TokenIssuer {
    access: KeyPair,
    refresh: KeyPair,
}

impl TokenIssuer {
    pub fn new(access_secret: &str, access_ttl_secs: i64, refresh_secret: &str, refresh_ttl_secs: i64) -> Self {
        Self {
            access: KeyPair::new(access_secret, access_ttl_secs),
            refresh: KeyPair::new(refresh_secret, refresh_ttl_secs),
        }
    }

    pub fn from_config(cfg: &configs::AuthConfig) -> Self {
        Self::new(&cfg.access_secret, cfg.access_ttl_secs, &cfg.refresh_secret, cfg.refresh_ttl_secs)
    }

    pub fn refresh_ttl_secs(&self) -> i64 {
        self.refresh.ttl_secs
    }

    pub fn issue_pair(&self, user: &AuthUser) -> Result<TokenPair, AuthError> {
        let now = Utc::now().timestamp();
        Ok(TokenPair { access_token: self.access.sign(user, now)?, refresh_token: self.refresh.sign(user, now)? })
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, AuthError> {
        self.access.verify(token)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Claims, AuthError> {
        self.refresh.verify(token)
    }
}

use super::config::JwtConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JwtClaims {
    pub sub: String,  // User ID
    pub email: String,
    pub role: String, // "admin" | "user"
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

/// HS256 token issuer/verifier shared by the auth middleware and the login handler.
#[derive(Clone)]
pub struct JwtAuth {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
    secure_cookies: bool,
}

impl JwtAuth {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl_secs: config.ttl_secs,
            secure_cookies: false,
        }
    }

    /// Mark the `access_token` cookie `Secure` (HTTPS deployments).
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    pub(crate) fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    pub fn issue_token(&self, user_id: Uuid, email: &str, role: &str) -> eyre::Result<String> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            exp: (now + Duration::seconds(self.ttl_secs)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(token)
    }

    /// Verify signature and expiry, returning the decoded claims.
    pub fn verify_token(&self, token: &str) -> eyre::Result<JwtClaims> {
        let data = decode::<JwtClaims>(token, &self.decoding, &Validation::new(Algorithm::HS256))?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("test-secret-key-that-is-at-least-32-chars").unwrap())
    }

    #[test]
    fn test_issued_token_verifies() {
        let auth = auth();
        let id = Uuid::now_v7();

        let token = auth.issue_token(id, "admin@shop.test", "admin").unwrap();
        let claims = auth.verify_token(&token).unwrap();

        assert_eq!(claims.sub, id.to_string());
        assert_eq!(claims.email, "admin@shop.test");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.exp - claims.iat, 86_400);
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let other = JwtAuth::new(&JwtConfig::new("another-secret-key-that-is-32-chars-long").unwrap());
        let token = other.issue_token(Uuid::now_v7(), "a@b.c", "user").unwrap();

        assert!(auth().verify_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let config = JwtConfig::new("test-secret-key-that-is-at-least-32-chars")
            .unwrap()
            .with_ttl(-3600);
        let auth = JwtAuth::new(&config);
        let token = auth.issue_token(Uuid::now_v7(), "a@b.c", "user").unwrap();

        assert!(auth.verify_token(&token).is_err());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(auth().verify_token("not.a.jwt").is_err());
    }
}

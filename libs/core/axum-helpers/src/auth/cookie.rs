use super::jwt::JwtAuth;
use crate::errors::AppError;
use axum::http::HeaderValue;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

impl JwtAuth {
    /// `Set-Cookie` value carrying `token`, valid for the token TTL.
    ///
    /// `Secure` is only set when the deployment serves HTTPS.
    pub fn session_cookie(&self, token: &str) -> Result<HeaderValue, AppError> {
        let secure = if self.secure_cookies() { " Secure;" } else { "" };
        let cookie = format!(
            "{ACCESS_TOKEN_COOKIE}={token}; HttpOnly;{secure} SameSite=Strict; Path=/; Max-Age={}",
            self.ttl_secs()
        );

        HeaderValue::from_str(&cookie)
            .map_err(|e| AppError::InternalServerError(format!("Invalid cookie value: {e}")))
    }

    /// `Set-Cookie` value that expires the session cookie immediately.
    pub fn clear_cookie(&self) -> HeaderValue {
        if self.secure_cookies() {
            HeaderValue::from_static(
                "access_token=; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age=0",
            )
        } else {
            HeaderValue::from_static("access_token=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0")
        }
    }
}

use super::{cookie::ACCESS_TOKEN_COOKIE, jwt::JwtAuth};
use crate::audit::{AuditEvent, AuditOutcome};
use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};
use uuid::Uuid;

pub const ADMIN_ROLE: &str = "admin";

/// Principal attached to the request by [`require_auth`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(unauthorized)
    }
}

fn unauthorized() -> AppError {
    AppError::Unauthorized("Unauthorized".to_string())
}

/// Extract JWT from `Authorization: Bearer` or the `access_token` cookie.
pub fn extract_token_from_request(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == ACCESS_TOKEN_COOKIE && !value.is_empty()).then(|| value.to_string())
        })
}

/// Authentication check.
///
/// Verifies the token and inserts an [`AuthUser`] into the request extensions.
/// Missing or invalid tokens yield 401.
pub async fn require_auth(
    State(auth): State<JwtAuth>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token_from_request(request.headers()).ok_or_else(|| {
        tracing::debug!("No JWT found in Authorization header or cookie");
        unauthorized()
    })?;

    let claims = auth.verify_token(&token).map_err(|e| {
        tracing::debug!("JWT verification failed: {}", e);
        unauthorized()
    })?;

    let id = Uuid::parse_str(&claims.sub).map_err(|_| {
        tracing::warn!(sub = %claims.sub, "JWT subject is not a UUID");
        unauthorized()
    })?;

    request.extensions_mut().insert(AuthUser {
        id,
        email: claims.email,
        role: claims.role,
    });

    Ok(next.run(request).await)
}

/// Admin check. Must run after [`require_auth`].
///
/// Never looks at the token; a missing principal is 401, a non-admin one 403.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(unauthorized)?;

    if !user.is_admin() {
        AuditEvent::new("admin.access", AuditOutcome::Denied)
            .actor(user.id)
            .resource(format!("{} {}", request.method(), request.uri().path()))
            .from_headers(request.headers())
            .log();

        return Err(AppError::Forbidden("Forbidden".to_string()));
    }

    Ok(next.run(request).await)
}

/// Guard a method router with [`require_auth`].
pub fn authenticated<S>(auth: &JwtAuth, route: MethodRouter<S>) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route.route_layer(middleware::from_fn_with_state(auth.clone(), require_auth))
}

/// Guard a method router with [`require_auth`] followed by [`require_admin`].
pub fn admin_only<S>(auth: &JwtAuth, route: MethodRouter<S>) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    // Outermost layer runs first
    route
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(auth.clone(), require_auth))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtConfig;
    use axum::{
        Router,
        body::Body,
        http::{HeaderValue, StatusCode},
        routing::get,
    };
    use tower::ServiceExt;

    fn jwt() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("test-secret-key-that-is-at-least-32-chars").unwrap())
    }

    async fn whoami(user: AuthUser) -> String {
        user.email
    }

    fn app(auth: &JwtAuth) -> Router {
        Router::new()
            .route("/me", authenticated(auth, get(whoami)))
            .route("/admin", admin_only(auth, get(|| async { "ok" })))
            .route("/public", get(|| async { "public" }))
    }

    async fn call(app: Router, uri: &str, token: Option<&str>) -> StatusCode {
        let mut builder = axum::http::Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        app.oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[test]
    fn test_extract_token_prefers_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer header-token"));
        headers.insert(header::COOKIE, HeaderValue::from_static("access_token=cookie-token"));

        assert_eq!(extract_token_from_request(&headers).as_deref(), Some("header-token"));
    }

    #[test]
    fn test_extract_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; access_token=cookie-token; lang=en"),
        );

        assert_eq!(extract_token_from_request(&headers).as_deref(), Some("cookie-token"));
    }

    #[test]
    fn test_extract_token_none() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(extract_token_from_request(&headers), None);
    }

    #[tokio::test]
    async fn test_public_route_needs_no_token() {
        assert_eq!(call(app(&jwt()), "/public", None).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        assert_eq!(call(app(&jwt()), "/me", None).await, StatusCode::UNAUTHORIZED);
        assert_eq!(call(app(&jwt()), "/admin", None).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_token_is_unauthorized() {
        assert_eq!(
            call(app(&jwt()), "/me", Some("garbage")).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_user_role_is_forbidden_on_admin_route() {
        let auth = jwt();
        let token = auth.issue_token(Uuid::now_v7(), "user@shop.test", "user").unwrap();

        assert_eq!(call(app(&auth), "/me", Some(&token)).await, StatusCode::OK);
        assert_eq!(call(app(&auth), "/admin", Some(&token)).await, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_role_passes_admin_route() {
        let auth = jwt();
        let token = auth.issue_token(Uuid::now_v7(), "admin@shop.test", ADMIN_ROLE).unwrap();

        assert_eq!(call(app(&auth), "/admin", Some(&token)).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_admin_check_without_principal_is_unauthorized() {
        let app = Router::new()
            .route("/admin", get(|| async { "ok" }))
            .route_layer(middleware::from_fn(require_admin));

        assert_eq!(call(app, "/admin", None).await, StatusCode::UNAUTHORIZED);
    }
}

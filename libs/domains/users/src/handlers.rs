use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{AppendHeaders, IntoResponse},
    routing::{get, post, put},
};
use axum_helpers::{
    AppError, AuditEvent, AuditOutcome, AuthUser, JwtAuth, JsonBody, UuidPath,
    admin_only, authenticated,
    errors::responses::{
        BadRequestResponse, ConflictResponse, ForbiddenResponse, InternalServerErrorResponse,
        NotFoundResponse, UnauthorizedResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{UserError, UserResult};
use crate::models::{
    LoginRequest, LoginResponse, MessageResponse, RegisterRequest, Role, SetRoleRequest,
    UserMessage, UserResponse,
};
use crate::repository::UserRepository;
use crate::service::UserService;

pub const TAG: &str = "Users";

/// OpenAPI documentation for Users API
#[derive(OpenApi)]
#[openapi(
    paths(
        register,
        login,
        logout,
        me,
        list_users,
        get_user,
        set_role,
        delete_user,
    ),
    components(
        schemas(
            UserResponse,
            Role,
            RegisterRequest,
            LoginRequest,
            SetRoleRequest,
            UserMessage,
            LoginResponse,
            MessageResponse
        ),
        responses(
            BadRequestResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            NotFoundResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Accounts, login and role management")
    )
)]
pub struct ApiDoc;

struct UsersState<R: UserRepository> {
    service: UserService<R>,
    auth: JwtAuth,
}

type SharedState<R> = Arc<UsersState<R>>;

/// Create the user router.
///
/// `register`, `login` and `logout` are public, `me` needs a token, the rest
/// is admin only.
pub fn router<R: UserRepository + 'static>(service: UserService<R>, auth: &JwtAuth) -> Router {
    let state = Arc::new(UsersState {
        service,
        auth: auth.clone(),
    });

    Router::new()
        .route("/register", post(register::<R>))
        .route("/login", post(login::<R>))
        .route("/logout", post(logout::<R>))
        .route("/me", authenticated(auth, get(me::<R>)))
        .route("/all", admin_only(auth, get(list_users::<R>)))
        .route(
            "/{id}",
            admin_only(auth, get(get_user::<R>).delete(delete_user::<R>)),
        )
        .route("/{id}/role", admin_only(auth, put(set_role::<R>)))
        .with_state(state)
}

/// Register a new account (role `user`)
#[utoipa::path(
    post,
    path = "/register",
    tag = TAG,
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserMessage),
        (status = 400, response = BadRequestResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn register<R: UserRepository>(
    State(state): State<SharedState<R>>,
    JsonBody(input): JsonBody<RegisterRequest>,
) -> UserResult<impl IntoResponse> {
    let user = state.service.register(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(UserMessage::new("User registered successfully", user)),
    ))
}

/// Exchange credentials for a JWT, returned in the body and as an HttpOnly cookie
#[utoipa::path(
    post,
    path = "/login",
    tag = TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn login<R: UserRepository>(
    State(state): State<SharedState<R>>,
    headers: HeaderMap,
    JsonBody(input): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = match state.service.verify_credentials(input).await {
        Ok(user) => user,
        Err(e) => {
            if matches!(e, UserError::InvalidCredentials) {
                AuditEvent::new("user.login", AuditOutcome::Failure)
                    .from_headers(&headers)
                    .log();
            }
            return Err(e.into());
        }
    };

    let token = state
        .auth
        .issue_token(user.id, &user.email, &user.role.to_string())
        .map_err(|e| AppError::InternalServerError(format!("Failed to issue token: {e}")))?;
    let cookie = state.auth.session_cookie(&token)?;

    AuditEvent::new("user.login", AuditOutcome::Success)
        .actor(user.id)
        .resource(format!("user:{}", user.id))
        .from_headers(&headers)
        .log();

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Json(LoginResponse {
            message: "Login successful".to_string(),
            user,
            token,
        }),
    ))
}

/// Clear the session cookie
#[utoipa::path(
    post,
    path = "/logout",
    tag = TAG,
    responses(
        (status = 200, description = "Logged out", body = MessageResponse)
    )
)]
async fn logout<R: UserRepository>(State(state): State<SharedState<R>>) -> impl IntoResponse {
    (
        AppendHeaders([(header::SET_COOKIE, state.auth.clear_cookie())]),
        Json(MessageResponse {
            message: "Logged out successfully".to_string(),
        }),
    )
}

/// The authenticated caller's account
#[utoipa::path(
    get,
    path = "/me",
    tag = TAG,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn me<R: UserRepository>(
    State(state): State<SharedState<R>>,
    caller: AuthUser,
) -> UserResult<Json<UserResponse>> {
    let user = state.service.get_user(caller.id).await?;
    Ok(Json(user))
}

/// List all accounts
#[utoipa::path(
    get,
    path = "/all",
    tag = TAG,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All users", body = Vec<UserResponse>),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_users<R: UserRepository>(
    State(state): State<SharedState<R>>,
) -> UserResult<Json<Vec<UserResponse>>> {
    let users = state.service.list_users().await?;
    Ok(Json(users))
}

/// Get an account by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "User id")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_user<R: UserRepository>(
    State(state): State<SharedState<R>>,
    UuidPath(id): UuidPath,
) -> UserResult<Json<UserResponse>> {
    let user = state.service.get_user(id).await?;
    Ok(Json(user))
}

/// Grant or revoke the admin role
#[utoipa::path(
    put,
    path = "/{id}/role",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "User id")
    ),
    request_body = SetRoleRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Role updated", body = UserMessage),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn set_role<R: UserRepository>(
    State(state): State<SharedState<R>>,
    admin: AuthUser,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
    JsonBody(input): JsonBody<SetRoleRequest>,
) -> UserResult<Json<UserMessage>> {
    let user = state.service.set_role(id, input.role).await?;

    AuditEvent::new("user.role.set", AuditOutcome::Success)
        .actor(admin.id)
        .resource(format!("user:{id}"))
        .from_headers(&headers)
        .with_details(serde_json::json!({ "role": input.role }))
        .log();

    Ok(Json(UserMessage::new("User role updated successfully", user)))
}

/// Delete an account
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = Uuid, Path, description = "User id")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn delete_user<R: UserRepository>(
    State(state): State<SharedState<R>>,
    admin: AuthUser,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
) -> UserResult<Json<MessageResponse>> {
    state.service.delete_user(id).await?;

    AuditEvent::new("user.delete", AuditOutcome::Success)
        .actor(admin.id)
        .resource(format!("user:{id}"))
        .from_headers(&headers)
        .log();

    Ok(Json(MessageResponse {
        message: "User deleted successfully".to_string(),
    }))
}

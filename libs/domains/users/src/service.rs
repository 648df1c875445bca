use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{UserError, UserResult};
use crate::models::{LoginRequest, RegisterRequest, Role, User, UserResponse};
use crate::repository::UserRepository;

/// Service layer for User business logic
#[derive(Clone)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Register a self-service account; the role is always `user`
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterRequest) -> UserResult<UserResponse> {
        let input = RegisterRequest {
            name: input.name.trim().to_string(),
            email: normalize_email(&input.email),
            password: input.password,
        };
        input.validate()?;

        self.create_user(input.name, input.email, input.password, Role::User)
            .await
    }

    /// Verify user credentials (for login)
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn verify_credentials(&self, input: LoginRequest) -> UserResult<UserResponse> {
        let input = LoginRequest {
            email: normalize_email(&input.email),
            password: input.password,
        };
        input.validate()?;

        let user = self
            .repository
            .get_by_email(&input.email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !verify_password(input.password, user.password_hash.clone()).await? {
            return Err(UserError::InvalidCredentials);
        }

        Ok(user.into())
    }

    pub async fn get_user(&self, id: Uuid) -> UserResult<UserResponse> {
        let user = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        Ok(user.into())
    }

    pub async fn list_users(&self) -> UserResult<Vec<UserResponse>> {
        let users = self.repository.list().await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn set_role(&self, id: Uuid, role: Role) -> UserResult<UserResponse> {
        let user = self.repository.set_role(id, role).await?;
        Ok(user.into())
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: Uuid) -> UserResult<()> {
        if !self.repository.delete(id).await? {
            return Err(UserError::NotFound(id));
        }
        Ok(())
    }

    /// Create the bootstrap admin unless an account with that email exists.
    ///
    /// Returns `true` when an account was created. An existing account keeps
    /// its role and password.
    #[instrument(skip(self, password))]
    pub async fn ensure_admin(&self, name: &str, email: &str, password: &str) -> UserResult<bool> {
        if self
            .repository
            .get_by_email(&normalize_email(email))
            .await?
            .is_some()
        {
            tracing::debug!("Admin account already exists");
            return Ok(false);
        }

        let request = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        request.validate()?;

        match self
            .create_user(request.name, request.email, request.password, Role::Admin)
            .await
        {
            Ok(admin) => {
                tracing::info!(user_id = %admin.id, "Seeded admin account");
                Ok(true)
            }
            // Another instance seeded it first
            Err(UserError::DuplicateEmail(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn create_user(
        &self,
        name: String,
        email: String,
        password: String,
        role: Role,
    ) -> UserResult<UserResponse> {
        let password_hash = hash_password(password).await?;
        let user = User::new(
            name.trim().to_string(),
            normalize_email(&email),
            password_hash,
            role,
        );

        let created = self.repository.create(user).await?;
        Ok(created.into())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// Password helpers. Argon2 is CPU-bound, so it runs on the blocking pool.

async fn hash_password(password: String) -> UserResult<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| UserError::PasswordHash(e.to_string()))
    })
    .await
    .map_err(|e| UserError::PasswordHash(e.to_string()))?
}

async fn verify_password(password: String, hash: String) -> UserResult<bool> {
    tokio::task::spawn_blocking(move || {
        let parsed_hash =
            PasswordHash::new(&hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    })
    .await
    .map_err(|e| UserError::PasswordHash(e.to_string()))?
}

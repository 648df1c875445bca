use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbBackend, DbErr, FromQueryResult, SqlErr, Statement,
};
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{Role, User};
use crate::repository::UserRepository;

/// PostgreSQL implementation of UserRepository using SeaORM
#[derive(Clone)]
pub struct PostgresUserRepository {
    db: DatabaseConnection,
}

impl PostgresUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn fetch_one(&self, stmt: Statement) -> UserResult<Option<User>> {
        let row = UserRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.map(User::from))
    }
}

/// Helper struct for deserializing user rows from the database
#[derive(Debug, FromQueryResult)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        let role = row.role.parse().unwrap_or_else(|_| {
            tracing::warn!(
                user_id = %row.id,
                role = %row.role,
                "Unknown role in database, treating as user"
            );
            Role::User
        });

        User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let sql = r#"
            INSERT INTO users (id, name, email, password_hash, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
        "#;

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                user.id.into(),
                user.name.clone().into(),
                user.email.clone().into(),
                user.password_hash.clone().into(),
                user.role.to_string().into(),
                user.created_at.into(),
            ],
        );

        let created = self
            .fetch_one(stmt)
            .await
            .map_err(|e| match e {
                UserError::Database(err) => map_insert_err(err, &user.email),
                other => other,
            })?
            .ok_or_else(|| UserError::Database(DbErr::RecordNotInserted))?;

        tracing::info!(user_id = %created.id, "Created user");
        Ok(created)
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let sql = "SELECT * FROM users WHERE id = $1";
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [id.into()]);

        self.fetch_one(stmt).await
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let sql = "SELECT * FROM users WHERE email = $1";
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [email.into()]);

        self.fetch_one(stmt).await
    }

    async fn list(&self) -> UserResult<Vec<User>> {
        let sql = "SELECT * FROM users ORDER BY created_at, id";
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, []);

        let rows = UserRow::find_by_statement(stmt).all(&self.db).await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn set_role(&self, id: Uuid, role: Role) -> UserResult<User> {
        let sql = "UPDATE users SET role = $1 WHERE id = $2 RETURNING *";
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [role.to_string().into(), id.into()],
        );

        let user = self.fetch_one(stmt).await?.ok_or(UserError::NotFound(id))?;

        tracing::info!(user_id = %id, %role, "Changed user role");
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        let sql = "DELETE FROM users WHERE id = $1";
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [id.into()]);

        let result = self.db.execute_raw(stmt).await?;
        let deleted = result.rows_affected() > 0;

        if deleted {
            tracing::info!(user_id = %id, "Deleted user");
        }
        Ok(deleted)
    }
}

fn map_insert_err(err: DbErr, email: &str) -> UserError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => UserError::DuplicateEmail(email.to_string()),
        _ => UserError::Database(err),
    }
}

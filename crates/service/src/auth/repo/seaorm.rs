use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set, SqlErr};
use uuid::Uuid;

use models::user;

use crate::auth::domain::{AuthUser, Credentials};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmAuthRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn repo_err(e: DbErr) -> AuthError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AuthError::Conflict,
        _ => AuthError::Repository(e.to_string()),
    }
}

fn to_auth_user(u: user::Model) -> AuthUser {
    AuthUser { id: u.id, email: u.email, name: u.name, role: u.role }
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(repo_err)?;
        Ok(res.map(to_auth_user))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
        let res = user::Entity::find_by_id(id).one(&self.db).await.map_err(repo_err)?;
        Ok(res.map(to_auth_user))
    }

    async fn create_user(&self, email: &str, name: &str, password_hash: String) -> Result<AuthUser, AuthError> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let am = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email.to_string()),
            password: Set(password_hash),
            name: Set(name.to_string()),
            role: Set(user::Role::default()),
            refresh_token: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = am.insert(&self.db).await.map_err(repo_err)?;
        Ok(to_auth_user(created))
    }

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
        let res = user::Entity::find_by_id(user_id).one(&self.db).await.map_err(repo_err)?;
        Ok(res.map(|u| Credentials { user_id: u.id, password_hash: u.password, refresh_token_hash: u.refresh_token }))
    }

    async fn set_refresh_token_hash(&self, user_id: Uuid, hash: Option<String>) -> Result<(), AuthError> {
        let res = user::Entity::update_many()
            .col_expr(user::Column::RefreshToken, sea_orm::sea_query::Expr::value(hash))
            .col_expr(user::Column::UpdatedAt, sea_orm::sea_query::Expr::value(Utc::now()))
            .filter(user::Column::Id.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(repo_err)?;
        if res.rows_affected == 0 {
            return Err(AuthError::NotFound);
        }
        Ok(())
    }

    async fn rotate_refresh_token_hash(&self, user_id: Uuid, expected: &str, next: String) -> Result<bool, AuthError> {
        let res = user::Entity::update_many()
            .col_expr(user::Column::RefreshToken, sea_orm::sea_query::Expr::value(next))
            .col_expr(user::Column::UpdatedAt, sea_orm::sea_query::Expr::value(Utc::now()))
            .filter(user::Column::Id.eq(user_id))
            .filter(user::Column::RefreshToken.eq(expected))
            .exec(&self.db)
            .await
            .map_err(repo_err)?;
        Ok(res.rows_affected == 1)
    }
}

//! Database operations for users.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::*;

use crate::entity::user;
use crate::error::{AppError, AppResult};
use crate::models::User;

/// Insert a new user. The email must already be lower-cased.
pub async fn create<C: ConnectionTrait>(
    db: &C,
    email: &str,
    password_hash: &str,
    name: Option<&str>,
) -> AppResult<User> {
    let model = user::ActiveModel {
        email: Set(email.to_string()),
        password_hash: Set(password_hash.to_string()),
        name: Set(name.map(|s| s.to_string())),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let inserted = model.insert(db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::InvalidInput("Email already registered".to_string())
        }
        _ => AppError::Database(format!("Failed to insert user: {}", e)),
    })?;

    Ok(model_to_user(inserted))
}

/// Find a user by email, including the stored password hash.
pub async fn find_by_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> AppResult<Option<user::Model>> {
    let result = user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?;
    Ok(result)
}

/// Find a user by ID.
pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<Option<User>> {
    let result = user::Entity::find_by_id(id).one(db).await?;
    Ok(result.map(model_to_user))
}

/// Replace a user's password hash. Returns false when no user has that email.
pub async fn update_password<C: ConnectionTrait>(
    db: &C,
    email: &str,
    password_hash: &str,
) -> AppResult<bool> {
    let result = user::Entity::update_many()
        .col_expr(user::Column::PasswordHash, Expr::value(password_hash))
        .filter(user::Column::Email.eq(email))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// All users, oldest first.
pub async fn list<C: ConnectionTrait>(db: &C) -> AppResult<Vec<User>> {
    let users = user::Entity::find()
        .order_by_asc(user::Column::Id)
        .all(db)
        .await?;
    Ok(users.into_iter().map(model_to_user).collect())
}

pub fn model_to_user(m: user::Model) -> User {
    User {
        id: m.id,
        email: m.email,
        name: m.name,
        created_at: m.created_at,
    }
}

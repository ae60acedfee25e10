use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{NewUser, User};

pub async fn insert_user(user: NewUser, conn: &mut SqliteConnection) -> Result<User, sqlx::Error> {
    let user: User = sqlx::query_as("INSERT INTO users (username, email) VALUES ($1, $2) RETURNING *")
        .bind(user.username)
        .bind(user.email)
        .fetch_one(conn)
        .await?;
    debug!("🗃️ User #{} ({}) created", user.id, user.username);
    Ok(user)
}

pub async fn fetch_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as("SELECT * FROM users WHERE id = $1").bind(user_id).fetch_optional(conn).await?;
    Ok(user)
}

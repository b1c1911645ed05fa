use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

use crate::entities::users;
use crate::models::anime::non_empty;
use crate::models::tracking::TrackedUser;

/// Stored user, as the tracking layer needs it.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub telegram_id: String,
    pub username: Option<String>,
    pub lang: Option<String>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            telegram_id: model.telegram_id,
            username: model.username,
            lang: model.lang,
        }
    }
}

pub struct UserRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> UserRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn get_by_telegram_id(&self, telegram_id: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::TelegramId.eq(telegram_id.trim()))
            .one(self.conn)
            .await
            .context("Failed to query user by telegram id")?;

        Ok(user.map(User::from))
    }

    /// Creates the user or refreshes the profile fields the caller supplied.
    pub async fn ensure(&self, user: &TrackedUser) -> Result<User> {
        let telegram_id = user.telegram_id.trim();
        if telegram_id.is_empty() {
            anyhow::bail!("User id is required");
        }

        let now = chrono::Utc::now().to_rfc3339();
        let existing = users::Entity::find()
            .filter(users::Column::TelegramId.eq(telegram_id))
            .one(self.conn)
            .await
            .context("Failed to query user by telegram id")?;

        let username = non_empty(user.username.as_deref());
        let first_name = non_empty(user.first_name.as_deref());
        let last_name = non_empty(user.last_name.as_deref());
        let lang = non_empty(user.lang.as_deref());

        let model = if let Some(existing) = existing {
            let mut active: users::ActiveModel = existing.into();
            if username.is_some() {
                active.username = Set(username);
            }
            if first_name.is_some() {
                active.first_name = Set(first_name);
            }
            if last_name.is_some() {
                active.last_name = Set(last_name);
            }
            if lang.is_some() {
                active.lang = Set(lang);
            }
            active.updated_at = Set(now);
            active
                .update(self.conn)
                .await
                .context("Failed to update user")?
        } else {
            users::ActiveModel {
                telegram_id: Set(telegram_id.to_string()),
                username: Set(username),
                first_name: Set(first_name),
                last_name: Set(last_name),
                lang: Set(lang),
                created_at: Set(now.clone()),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(self.conn)
            .await
            .context("Failed to create user")?
        };

        Ok(User::from(model))
    }
}

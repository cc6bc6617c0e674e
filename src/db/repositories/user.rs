use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, NotSet,
    PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};

use crate::db::StoreError;
use crate::domain::{NewUser, User, UserId, UserPatch};
use crate::entities::users;

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: UserId::new(model.id),
            display_name: model.display_name,
            credential: model.credential,
            is_admin: model.is_admin,
            tokens_remaining: model.tokens_remaining,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Maps a failed write, turning a violated `credential` unique index into
/// [`StoreError::CredentialTaken`].
fn write_error(err: DbErr) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => StoreError::CredentialTaken,
        _ => StoreError::Database(err),
    }
}

fn new_active_model(user: &NewUser, now: &str) -> users::ActiveModel {
    users::ActiveModel {
        id: NotSet,
        display_name: Set(user.display_name.clone()),
        credential: Set(user.credential.clone()),
        is_admin: Set(user.is_admin),
        tokens_remaining: Set(user.tokens_remaining),
        created_at: Set(now.to_string()),
        updated_at: Set(now.to_string()),
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Get user by exact credential match
    pub async fn get_by_credential(&self, credential: &str) -> Result<Option<User>, StoreError> {
        let user = users::Entity::find()
            .filter(users::Column::Credential.eq(credential))
            .one(&self.conn)
            .await?;

        Ok(user.map(User::from))
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let user = users::Entity::find_by_id(id.value())
            .one(&self.conn)
            .await?;

        Ok(user.map(User::from))
    }

    pub async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        let users = users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(users.into_iter().map(User::from).collect())
    }

    pub async fn count(&self) -> Result<u64, StoreError> {
        Ok(users::Entity::find().count(&self.conn).await?)
    }

    pub async fn insert(&self, user: &NewUser) -> Result<UserId, StoreError> {
        let now = chrono::Utc::now().to_rfc3339();

        let model = new_active_model(user, &now)
            .insert(&self.conn)
            .await
            .map_err(write_error)?;

        Ok(UserId::new(model.id))
    }

    /// Writes only the columns present in `patch`. Returns `false` when no
    /// row has the given id.
    pub async fn update(&self, id: UserId, patch: &UserPatch) -> Result<bool, StoreError> {
        let now = chrono::Utc::now().to_rfc3339();

        let mut update = users::Entity::update_many()
            .col_expr(users::Column::UpdatedAt, Expr::value(now))
            .filter(users::Column::Id.eq(id.value()));

        if let Some(display_name) = &patch.display_name {
            update = update.col_expr(users::Column::DisplayName, Expr::value(display_name.clone()));
        }
        if let Some(credential) = &patch.credential {
            update = update.col_expr(users::Column::Credential, Expr::value(credential.clone()));
        }
        if let Some(is_admin) = patch.is_admin {
            update = update.col_expr(users::Column::IsAdmin, Expr::value(is_admin));
        }
        if let Some(tokens) = patch.tokens_remaining {
            update = update.col_expr(users::Column::TokensRemaining, Expr::value(tokens));
        }

        let result = update.exec(&self.conn).await.map_err(write_error)?;

        Ok(result.rows_affected > 0)
    }

    /// Atomically subtracts `cost` tokens if and only if the balance covers
    /// it. The check and the write are one statement, so concurrent callers
    /// are serialized by the database and the balance never goes negative.
    pub async fn consume_tokens(&self, id: UserId, cost: i64) -> Result<bool, StoreError> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = users::Entity::update_many()
            .col_expr(
                users::Column::TokensRemaining,
                Expr::col(users::Column::TokensRemaining).sub(cost),
            )
            .col_expr(users::Column::UpdatedAt, Expr::value(now))
            .filter(users::Column::Id.eq(id.value()))
            .filter(users::Column::TokensRemaining.gte(cost))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected == 1)
    }

    /// Deletes every user and inserts `seed` in a single transaction.
    pub async fn replace_all(&self, seed: &[NewUser]) -> Result<Vec<UserId>, StoreError> {
        let now = chrono::Utc::now().to_rfc3339();
        let txn = self.conn.begin().await?;

        users::Entity::delete_many().exec(&txn).await?;

        let mut ids = Vec::with_capacity(seed.len());
        for user in seed {
            let model = new_active_model(user, &now)
                .insert(&txn)
                .await
                .map_err(write_error)?;
            ids.push(UserId::new(model.id));
        }

        txn.commit().await?;

        Ok(ids)
    }
}

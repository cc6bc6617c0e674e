use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub display_name: String,

    /// Opaque shared secret presented in the credential header.
    #[sea_orm(unique)]
    pub credential: String,

    pub is_admin: bool,

    /// Never negative; only the conditional decrement and admin updates write it.
    pub tokens_remaining: i64,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

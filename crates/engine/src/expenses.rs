//! Expense records.
//!
//! An `Expense` is one line of a user's ledger. Records are never updated:
//! they are created by an insert and can only disappear through
//! [`Engine::delete_most_recent`](crate::Engine::delete_most_recent).

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use crate::{Amount, EngineError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expense {
    /// Store assigned, strictly increasing, never reused.
    pub id: i64,
    pub user_id: i64,
    pub amount: Amount,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    /// Exact decimal text, see [`Amount`].
    pub amount: String,
    pub category: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            amount: model.amount.parse()?,
            category: model.category,
            created_at: model.created_at,
        })
    }
}

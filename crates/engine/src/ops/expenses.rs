use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{Amount, EngineError, Expense, ResultEngine, expenses};

use super::{Engine, with_tx};

impl Engine {
    /// Append a new expense for `user_id`.
    ///
    /// The id and `created_at` are assigned here. Zero and negative amounts
    /// are stored as given.
    pub async fn insert(
        &self,
        user_id: i64,
        amount: Amount,
        category: &str,
    ) -> ResultEngine<Expense> {
        let category = category.trim();
        if category.is_empty() {
            return Err(EngineError::InvalidCategory(
                "category must not be empty".to_string(),
            ));
        }

        let _guard = self.locks.lock(user_id).await;

        let model = expenses::ActiveModel {
            id: ActiveValue::NotSet,
            user_id: ActiveValue::Set(user_id),
            amount: ActiveValue::Set(amount.to_exact_string()),
            category: ActiveValue::Set(category.to_string()),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(&self.database)
        .await?;

        tracing::debug!(user_id, id = model.id, "expense inserted");
        Expense::try_from(model)
    }

    /// Every expense of `user_id`, newest first.
    ///
    /// With `since`, only records with `created_at >= since` are returned.
    /// Records created in the same instant come back by descending id.
    pub async fn query(
        &self,
        user_id: i64,
        since: Option<DateTime<Utc>>,
    ) -> ResultEngine<Vec<Expense>> {
        let mut query = expenses::Entity::find().filter(expenses::Column::UserId.eq(user_id));
        if let Some(since) = since {
            query = query.filter(expenses::Column::CreatedAt.gte(since));
        }

        let models = query
            .order_by_desc(expenses::Column::CreatedAt)
            .order_by_desc(expenses::Column::Id)
            .all(&self.database)
            .await?;

        models.into_iter().map(Expense::try_from).collect()
    }

    /// Remove the expense of `user_id` with the greatest id and return it.
    ///
    /// Returns `None` when the user has nothing recorded.
    pub async fn delete_most_recent(&self, user_id: i64) -> ResultEngine<Option<Expense>> {
        let _guard = self.locks.lock(user_id).await;

        with_tx!(self, |db_tx| {
            let latest = expenses::Entity::find()
                .filter(expenses::Column::UserId.eq(user_id))
                .order_by_desc(expenses::Column::Id)
                .one(&db_tx)
                .await?;

            match latest {
                None => Ok::<_, EngineError>(None),
                Some(model) => {
                    expenses::Entity::delete_by_id(model.id)
                        .exec(&db_tx)
                        .await?;
                    tracing::debug!(user_id, id = model.id, "expense deleted");
                    Ok(Some(Expense::try_from(model)?))
                }
            }
        })
    }
}

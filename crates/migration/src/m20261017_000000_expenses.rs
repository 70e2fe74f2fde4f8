//! Expense ledger schema.
//!
//! - `expenses`: one row per recorded expense, owned by a telegram user.
//!
//! `id` uses SQLite `AUTOINCREMENT` so deleted ids are never handed out again.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    UserId,
    Amount,
    Category,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::UserId).big_integer().not_null())
                    // Exact decimal text, never a float.
                    .col(ColumnDef::new(Expenses::Amount).string().not_null())
                    .col(ColumnDef::new(Expenses::Category).string().not_null())
                    .col(ColumnDef::new(Expenses::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // Range queries for /today, /week, /month.
        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-user_id-created_at")
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(Expenses::UserId)
                    .col(Expenses::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Most recent lookup for /undo.
        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-user_id-id")
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(Expenses::UserId)
                    .col(Expenses::Id)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await
    }
}

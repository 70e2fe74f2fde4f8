use sea_orm::DatabaseConnection;

use crate::{ResultEngine, locks::UserLocks};

mod expenses;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// The expense ledger.
///
/// Cheap to share behind an `Arc`: every method takes `&self`, writes are
/// serialized per user internally.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    locks: UserLocks,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database. The schema must already be migrated.
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        tracing::debug!("building ledger engine");
        Ok(Engine {
            database: self.database,
            locks: UserLocks::default(),
        })
    }
}

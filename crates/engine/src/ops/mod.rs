use sea_orm::DatabaseConnection;

use crate::ResultEngine;

mod pull;
mod push;
mod records;
mod snapshot;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
///
/// The transaction is rolled back when it is dropped without a commit, which
/// covers both an `Err` result and an early return.
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

/// The sync engine over one household store.
///
/// Every operation is a short unit of work inside a single transaction; the
/// engine keeps no state of its own besides the connection.
#[derive(Clone, Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The underlying connection, for collaborators that open their own
    /// transactions and call [`record_change`](crate::record_change).
    pub fn database(&self) -> &DatabaseConnection {
        &self.database
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`, failing if the store is not reachable.
    pub async fn build(self) -> ResultEngine<Engine> {
        self.database.ping().await?;
        Ok(Engine {
            database: self.database,
        })
    }
}

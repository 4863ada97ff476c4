use sea_orm::DatabaseConnection;

use crate::{EngineError, ResultEngine, auth};

mod accounts;
mod actions;
mod ledger;

pub use actions::{Action, ActionOutcome};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
///
/// An early return through `?` inside the block drops the transaction, which
/// rolls it back.
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

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    bcrypt_cost: u32,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Cost factor used when hashing new passwords.
    pub fn bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost
    }
}

/// The builder for `Engine`
pub struct EngineBuilder {
    database: DatabaseConnection,
    bcrypt_cost: u32,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Cost factor for new password hashes (4..=31).
    pub fn bcrypt_cost(mut self, cost: u32) -> EngineBuilder {
        self.bcrypt_cost = cost;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        if !(auth::MIN_COST..=auth::MAX_COST).contains(&self.bcrypt_cost) {
            return Err(EngineError::InvalidInput(format!(
                "bcrypt cost must be between {} and {}, got {}",
                auth::MIN_COST,
                auth::MAX_COST,
                self.bcrypt_cost
            )));
        }
        Ok(Engine {
            database: self.database,
            bcrypt_cost: self.bcrypt_cost,
        })
    }
}

//! Accounts table.
//!
//! One row per registered user. The username is the primary key; both bucket
//! balances are denormalized onto the row and kept in step with the ledger.
//! `account_number` is handed out in registration order starting at 1.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::{Balances, Bucket, Money};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    #[sea_orm(unique)]
    pub account_number: i64,
    pub display_name: String,
    pub password_hash: String,
    pub current_balance: i64,
    pub savings_balance: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Column holding the balance of `bucket`.
pub(crate) fn balance_column(bucket: Bucket) -> Column {
    match bucket {
        Bucket::Current => Column::CurrentBalance,
        Bucket::Savings => Column::SavingsBalance,
    }
}

impl From<&Model> for Balances {
    fn from(model: &Model) -> Self {
        Balances::new(
            Money::new(model.current_balance),
            Money::new(model.savings_balance),
        )
    }
}

/// A registered account, without its credentials.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub username: String,
    pub account_number: i64,
    pub display_name: String,
    pub balances: Balances,
    pub created_at: DateTime<Utc>,
}

impl From<Model> for Account {
    fn from(model: Model) -> Self {
        let balances = Balances::from(&model);
        Self {
            username: model.username,
            account_number: model.account_number,
            display_name: model.display_name,
            balances,
            created_at: model.created_at,
        }
    }
}

/// Input for [`Engine::register`](crate::Engine::register).
#[derive(Clone, Default)]
pub struct NewAccount {
    pub username: String,
    pub display_name: String,
    pub password: String,
    pub opening_current: Money,
    pub opening_savings: Money,
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("username", &self.username)
            .field("display_name", &self.display_name)
            .field("password", &"<redacted>")
            .field("opening_current", &self.opening_current)
            .field("opening_savings", &self.opening_savings)
            .finish()
    }
}

//! Ledger primitives.
//!
//! A `Record` is one immutable line of the ledger: a single balance change on
//! one bucket of one account. Records are append-only.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};

use crate::{Bucket, EngineError, Money, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Deposit,
    Withdraw,
    TransferOut,
    TransferIn,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
            Self::TransferOut => "transfer_out",
            Self::TransferIn => "transfer_in",
        }
    }

    /// Human label used when printing history.
    pub fn label(self) -> &'static str {
        match self {
            Self::Deposit => "Deposit",
            Self::Withdraw => "Withdrawal",
            Self::TransferOut => "Transfer out",
            Self::TransferIn => "Transfer in",
        }
    }

    /// Whether this kind adds money to its bucket.
    pub fn is_credit(self) -> bool {
        matches!(self, Self::Deposit | Self::TransferIn)
    }
}

impl TryFrom<&str> for RecordKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "deposit" => Ok(Self::Deposit),
            "withdraw" => Ok(Self::Withdraw),
            "transfer_out" => Ok(Self::TransferOut),
            "transfer_in" => Ok(Self::TransferIn),
            other => Err(EngineError::InvalidInput(format!(
                "invalid record kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub id: i64,
    pub username: String,
    pub kind: RecordKind,
    pub bucket: Bucket,
    /// Always positive; the direction comes from `kind`.
    pub amount: Money,
    pub occurred_at: DateTime<Utc>,
}

impl Record {
    /// Amount with the sign applied to its bucket balance.
    pub fn signed_amount(&self) -> Money {
        if self.kind.is_credit() {
            self.amount
        } else {
            -self.amount
        }
    }
}

/// Filters for listing records.
///
/// `since` is inclusive, in UTC. The default filter returns the whole ledger.
#[derive(Clone, Debug, Default)]
pub struct RecordFilter {
    pub since: Option<DateTime<Utc>>,
    pub limit: Option<u64>,
}

impl RecordFilter {
    /// Records from the last `days` days.
    pub fn last_days(days: u32) -> Self {
        Self {
            since: Some(Utc::now() - chrono::Duration::days(i64::from(days))),
            limit: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub username: String,
    pub kind: String,
    pub bucket: String,
    pub amount: i64,
    pub occurred_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Insertable row for a new record; the id is assigned by the database.
pub(crate) fn new_active_model(
    username: &str,
    kind: RecordKind,
    bucket: Bucket,
    amount: Money,
    occurred_at: DateTime<Utc>,
) -> ActiveModel {
    ActiveModel {
        id: ActiveValue::NotSet,
        username: ActiveValue::Set(username.to_string()),
        kind: ActiveValue::Set(kind.as_str().to_string()),
        bucket: ActiveValue::Set(bucket.as_str().to_string()),
        amount: ActiveValue::Set(amount.pence()),
        occurred_at: ActiveValue::Set(occurred_at),
    }
}

impl TryFrom<Model> for Record {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: model.id,
            kind: RecordKind::try_from(model.kind.as_str())?,
            bucket: Bucket::try_from(model.bucket.as_str())?,
            username: model.username,
            amount: Money::new(model.amount),
            occurred_at: model.occurred_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_storage_form() {
        for kind in [
            RecordKind::Deposit,
            RecordKind::Withdraw,
            RecordKind::TransferOut,
            RecordKind::TransferIn,
        ] {
            assert_eq!(RecordKind::try_from(kind.as_str()).unwrap(), kind);
        }
        assert!(RecordKind::try_from("transfer").is_err());
    }

    #[test]
    fn signed_amount_follows_kind() {
        let mut record = Record {
            id: 1,
            username: "alice".to_string(),
            kind: RecordKind::Withdraw,
            bucket: Bucket::Current,
            amount: Money::pounds(30),
            occurred_at: Utc::now(),
        };
        assert_eq!(record.signed_amount(), Money::pounds(-30));
        record.kind = RecordKind::TransferIn;
        assert_eq!(record.signed_amount(), Money::pounds(30));
    }
}

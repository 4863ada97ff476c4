use chrono::{DateTime, Utc};
use sea_orm::{
    DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*,
};

use crate::{
    Bucket, Money, Record, RecordFilter, RecordKind, ResultEngine,
    ledger::{self, new_active_model},
    util::ensure_positive,
};

use super::{Engine, with_tx};

impl Engine {
    /// Append one record to the ledger and return its id.
    pub async fn append_record(
        &self,
        username: &str,
        kind: RecordKind,
        bucket: Bucket,
        amount: Money,
        occurred_at: DateTime<Utc>,
    ) -> ResultEngine<i64> {
        with_tx!(self, |db_tx| {
            self.append_record_tx(&db_tx, username, kind, bucket, amount, occurred_at)
                .await
        })
    }

    /// Lists the records of `username`, newest first.
    ///
    /// Ordering is `(occurred_at DESC, id DESC)`, so records written in the
    /// same instant come back in reverse insertion order. Each call reads a
    /// fresh snapshot. Unknown usernames have an empty ledger.
    pub async fn list_records(
        &self,
        username: &str,
        filter: &RecordFilter,
    ) -> ResultEngine<Vec<Record>> {
        with_tx!(self, |db_tx| {
            let mut query =
                ledger::Entity::find().filter(ledger::Column::Username.eq(username));
            if let Some(since) = filter.since {
                query = query.filter(ledger::Column::OccurredAt.gte(since));
            }
            let models = query
                .order_by_desc(ledger::Column::OccurredAt)
                .order_by_desc(ledger::Column::Id)
                .limit(filter.limit)
                .all(&db_tx)
                .await?;

            models
                .into_iter()
                .map(Record::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    pub(super) async fn append_record_tx(
        &self,
        db_tx: &DatabaseTransaction,
        username: &str,
        kind: RecordKind,
        bucket: Bucket,
        amount: Money,
        occurred_at: DateTime<Utc>,
    ) -> ResultEngine<i64> {
        ensure_positive(amount)?;
        let model = new_active_model(username, kind, bucket, amount, occurred_at)
            .insert(db_tx)
            .await?;
        Ok(model.id)
    }
}

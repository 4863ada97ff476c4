use chrono::Utc;
use sea_orm::{DatabaseTransaction, TransactionTrait};

use crate::{
    Balances, Bucket, EngineError, Money, RecordKind, ResultEngine, util::ensure_positive,
};

use super::{Engine, with_tx};

/// One banking operation on the authenticated user's own account.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Deposit { bucket: Bucket, amount: Money },
    Withdraw { bucket: Bucket, amount: Money },
    Transfer { from: Bucket, to: Bucket, amount: Money },
}

impl Action {
    pub fn amount(&self) -> Money {
        match *self {
            Self::Deposit { amount, .. }
            | Self::Withdraw { amount, .. }
            | Self::Transfer { amount, .. } => amount,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Deposit { .. } => "deposit",
            Self::Withdraw { .. } => "withdraw",
            Self::Transfer { .. } => "transfer",
        }
    }

    /// Checks that do not need the database.
    fn validate(&self) -> ResultEngine<()> {
        ensure_positive(self.amount())?;
        if let Self::Transfer { from, to, .. } = *self
            && from == to
        {
            return Err(EngineError::InvalidAmount(
                "transfer needs two different buckets".to_string(),
            ));
        }
        Ok(())
    }
}

/// Result of a completed action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionOutcome {
    /// Balances after the action committed.
    pub balances: Balances,
    /// Ids of the ledger records written, in insertion order.
    pub record_ids: Vec<i64>,
}

fn ensure_funds(balances: Balances, bucket: Bucket, amount: Money) -> ResultEngine<()> {
    let available = balances.get(bucket);
    if amount > available {
        return Err(EngineError::InvalidAmount(format!(
            "insufficient funds in {bucket}: {available} available, {amount} requested"
        )));
    }
    Ok(())
}

impl Engine {
    /// Execute `action` for `username`.
    ///
    /// Balance changes and their ledger records are written in one DB
    /// transaction: either all of them land or none do.
    pub async fn execute(&self, username: &str, action: Action) -> ResultEngine<ActionOutcome> {
        action.validate()?;

        let result: ResultEngine<ActionOutcome> = with_tx!(self, |db_tx| {
            let record_ids = self.apply_action(&db_tx, username, action).await?;
            let model = self.require_account(&db_tx, username).await?;
            Ok(ActionOutcome {
                balances: Balances::from(&model),
                record_ids,
            })
        });
        let outcome = result?;

        match action {
            Action::Deposit { bucket, amount } | Action::Withdraw { bucket, amount } => {
                tracing::info!(
                    username,
                    action = action.name(),
                    %bucket,
                    %amount,
                    "action committed"
                );
            }
            Action::Transfer { from, to, amount } => {
                tracing::info!(
                    username,
                    action = action.name(),
                    %from,
                    %to,
                    %amount,
                    "action committed"
                );
            }
        }
        Ok(outcome)
    }

    pub async fn deposit(
        &self,
        username: &str,
        bucket: Bucket,
        amount: Money,
    ) -> ResultEngine<ActionOutcome> {
        self.execute(username, Action::Deposit { bucket, amount })
            .await
    }

    pub async fn withdraw(
        &self,
        username: &str,
        bucket: Bucket,
        amount: Money,
    ) -> ResultEngine<ActionOutcome> {
        self.execute(username, Action::Withdraw { bucket, amount })
            .await
    }

    pub async fn transfer(
        &self,
        username: &str,
        from: Bucket,
        to: Bucket,
        amount: Money,
    ) -> ResultEngine<ActionOutcome> {
        self.execute(username, Action::Transfer { from, to, amount })
            .await
    }

    async fn apply_action(
        &self,
        db_tx: &DatabaseTransaction,
        username: &str,
        action: Action,
    ) -> ResultEngine<Vec<i64>> {
        let before = Balances::from(&self.require_account(db_tx, username).await?);
        let occurred_at = Utc::now();

        let ids = match action {
            Action::Deposit { bucket, amount } => {
                self.adjust_balance_tx(db_tx, username, bucket, amount)
                    .await?;
                vec![
                    self.append_record_tx(
                        db_tx,
                        username,
                        RecordKind::Deposit,
                        bucket,
                        amount,
                        occurred_at,
                    )
                    .await?,
                ]
            }
            Action::Withdraw { bucket, amount } => {
                ensure_funds(before, bucket, amount)?;
                self.adjust_balance_tx(db_tx, username, bucket, -amount)
                    .await?;
                vec![
                    self.append_record_tx(
                        db_tx,
                        username,
                        RecordKind::Withdraw,
                        bucket,
                        amount,
                        occurred_at,
                    )
                    .await?,
                ]
            }
            Action::Transfer { from, to, amount } => {
                ensure_funds(before, from, amount)?;
                self.adjust_balance_tx(db_tx, username, from, -amount)
                    .await?;
                self.adjust_balance_tx(db_tx, username, to, amount)
                    .await?;
                let out_id = self
                    .append_record_tx(
                        db_tx,
                        username,
                        RecordKind::TransferOut,
                        from,
                        amount,
                        occurred_at,
                    )
                    .await?;
                let in_id = self
                    .append_record_tx(
                        db_tx,
                        username,
                        RecordKind::TransferIn,
                        to,
                        amount,
                        occurred_at,
                    )
                    .await?;
                vec![out_id, in_id]
            }
        };
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_non_positive_amounts() {
        let zero = Action::Deposit {
            bucket: Bucket::Current,
            amount: Money::ZERO,
        };
        assert!(matches!(zero.validate(), Err(EngineError::InvalidAmount(_))));

        let negative = Action::Withdraw {
            bucket: Bucket::Savings,
            amount: Money::new(-1),
        };
        assert!(matches!(
            negative.validate(),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn validate_rejects_transfer_to_same_bucket() {
        let action = Action::Transfer {
            from: Bucket::Savings,
            to: Bucket::Savings,
            amount: Money::pounds(5),
        };
        assert!(matches!(action.validate(), Err(EngineError::InvalidAmount(_))));
    }

    #[test]
    fn ensure_funds_allows_exact_balance() {
        let balances = Balances::new(Money::pounds(70), Money::ZERO);
        assert!(ensure_funds(balances, Bucket::Current, Money::pounds(70)).is_ok());
        assert!(ensure_funds(balances, Bucket::Current, Money::new(7001)).is_err());
        assert!(ensure_funds(balances, Bucket::Savings, Money::new(1)).is_err());
    }
}
